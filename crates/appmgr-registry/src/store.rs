use appmgr_core::AppRecord;
use parking_lot::RwLock;

use crate::state_file::PersistedApp;

#[derive(Debug, Clone)]
struct StoreEntry {
    live: AppRecord,
    committed: Option<AppRecord>,
    version: Option<String>,
}

/// An entry as it stood before a persisted change, so the change can be
/// undone when the write fails.
#[derive(Debug, Clone)]
pub(crate) struct EntrySnapshot {
    index: usize,
    entry: StoreEntry,
}

/// Insertion-ordered set of app records keyed by name.
///
/// Reads hand out owned snapshots; callers re-fetch to observe later writes.
/// The lock is held only for the duration of one read or one write, so
/// readers never wait on network or disk work done by an operation.
#[derive(Debug, Default)]
pub struct AppStore {
    entries: RwLock<Vec<StoreEntry>>,
}

impl AppStore {
    pub(crate) fn from_persisted(apps: Vec<PersistedApp>) -> Self {
        let entries = apps
            .into_iter()
            .map(|app| StoreEntry {
                live: app.record.clone(),
                committed: Some(app.record),
                version: app.version,
            })
            .collect();
        Self {
            entries: RwLock::new(entries),
        }
    }

    pub fn get(&self, name: &str) -> Option<AppRecord> {
        self.entries
            .read()
            .iter()
            .find(|entry| entry.live.name == name)
            .map(|entry| entry.live.clone())
    }

    pub fn get_all(&self) -> Vec<AppRecord> {
        self.entries
            .read()
            .iter()
            .map(|entry| entry.live.clone())
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries
            .read()
            .iter()
            .any(|entry| entry.live.name == name)
    }

    /// Version of the committed manifest, if one was recorded.
    pub fn version(&self, name: &str) -> Option<String> {
        self.entries
            .read()
            .iter()
            .find(|entry| entry.live.name == name)
            .and_then(|entry| entry.version.clone())
    }

    /// Replaces the live record in place, or appends it when the name is new.
    /// The committed record is left untouched.
    pub fn upsert(&self, record: AppRecord) {
        let mut entries = self.entries.write();
        match entries.iter_mut().find(|entry| entry.live.name == record.name) {
            Some(entry) => entry.live = record,
            None => entries.push(StoreEntry {
                live: record,
                committed: None,
                version: None,
            }),
        }
    }

    /// Applies `change` to the live record and returns the result.
    pub fn modify<F>(&self, name: &str, change: F) -> Option<AppRecord>
    where
        F: FnOnce(&mut AppRecord),
    {
        let mut entries = self.entries.write();
        let entry = entries.iter_mut().find(|entry| entry.live.name == name)?;
        change(&mut entry.live);
        Some(entry.live.clone())
    }

    /// Makes `record` both the live and the committed value.
    pub fn commit(&self, record: AppRecord, version: Option<String>) {
        let mut entries = self.entries.write();
        match entries.iter_mut().find(|entry| entry.live.name == record.name) {
            Some(entry) => {
                entry.live = record.clone();
                entry.committed = Some(record);
                if version.is_some() {
                    entry.version = version;
                }
            }
            None => entries.push(StoreEntry {
                live: record.clone(),
                committed: Some(record),
                version,
            }),
        }
    }

    /// Applies `change` to the live record and commits the result.
    pub fn commit_with<F>(&self, name: &str, version: Option<String>, change: F) -> Option<AppRecord>
    where
        F: FnOnce(&mut AppRecord),
    {
        let mut entries = self.entries.write();
        let entry = entries.iter_mut().find(|entry| entry.live.name == name)?;
        change(&mut entry.live);
        entry.committed = Some(entry.live.clone());
        if version.is_some() {
            entry.version = version;
        }
        Some(entry.live.clone())
    }

    /// Restores the last committed record. Entries that were never committed
    /// are dropped; `None` is returned for them.
    pub fn rollback(&self, name: &str) -> Option<AppRecord> {
        let mut entries = self.entries.write();
        let index = entries.iter().position(|entry| entry.live.name == name)?;
        match entries[index].committed.clone() {
            Some(committed) => {
                entries[index].live = committed.clone();
                Some(committed)
            }
            None => {
                entries.remove(index);
                None
            }
        }
    }

    pub fn remove(&self, name: &str) -> Option<AppRecord> {
        let mut entries = self.entries.write();
        let index = entries.iter().position(|entry| entry.live.name == name)?;
        Some(entries.remove(index).live)
    }

    /// Updates the download policy on both the live and committed record.
    pub fn set_allowed_auto_download(&self, name: &str, allowed: bool) -> Option<AppRecord> {
        let mut entries = self.entries.write();
        let entry = entries.iter_mut().find(|entry| entry.live.name == name)?;
        entry.live.allowed_auto_download = allowed;
        if let Some(committed) = entry.committed.as_mut() {
            committed.allowed_auto_download = allowed;
        }
        Some(entry.live.clone())
    }

    pub(crate) fn snapshot(&self, name: &str) -> Option<EntrySnapshot> {
        let entries = self.entries.read();
        let index = entries.iter().position(|entry| entry.live.name == name)?;
        Some(EntrySnapshot {
            index,
            entry: entries[index].clone(),
        })
    }

    /// Puts `name` back the way `snapshot` saw it. A `None` snapshot means the
    /// app did not exist, so any entry for it is dropped.
    pub(crate) fn restore(&self, name: &str, snapshot: Option<EntrySnapshot>) {
        let mut entries = self.entries.write();
        let current = entries.iter().position(|entry| entry.live.name == name);
        match (current, snapshot) {
            (Some(index), Some(snapshot)) => entries[index] = snapshot.entry,
            (Some(index), None) => {
                entries.remove(index);
            }
            (None, Some(snapshot)) => {
                let index = snapshot.index.min(entries.len());
                entries.insert(index, snapshot.entry);
            }
            (None, None) => {}
        }
    }

    pub(crate) fn persisted_apps(&self) -> Vec<PersistedApp> {
        self.entries
            .read()
            .iter()
            .filter_map(|entry| {
                entry.committed.clone().map(|record| PersistedApp {
                    version: entry.version.clone(),
                    record,
                })
            })
            .collect()
    }
}
