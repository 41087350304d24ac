use appmgr_core::{AppKind, AppRecord, AppStatus, InstallState, LocalOrigin, UpdateState};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::config::PreloadedApp;
use crate::error::{RegistryError, RegistryResult};
use crate::layout::AppsLayout;
use crate::locks::{Operation, OperationGuard, OperationLocks};
use crate::state_file::{load_state_file, save_state_file, RegistryStateFile};
use crate::store::AppStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusReport {
    pub install_state: InstallState,
    pub update_state: UpdateState,
    pub status: AppStatus,
}

impl From<&AppRecord> for StatusReport {
    fn from(record: &AppRecord) -> Self {
        Self {
            install_state: record.install_state,
            update_state: record.update_state,
            status: record.status,
        }
    }
}

/// Records of every tracked app plus the bookkeeping needed to run one
/// operation per app at a time. Shared across threads behind an `Arc`.
#[derive(Debug)]
pub struct AppRegistry {
    layout: AppsLayout,
    origin: LocalOrigin,
    store: AppStore,
    locks: OperationLocks,
    persist_lock: Mutex<()>,
}

impl AppRegistry {
    /// Opens the registry rooted at `layout`, loading any persisted records.
    pub fn open(layout: AppsLayout, origin: LocalOrigin) -> RegistryResult<Self> {
        layout.ensure_base_dirs()?;
        let state = load_state_file(&layout)?;
        info!(
            root = %layout.root().display(),
            apps = state.apps.len(),
            "opened app registry"
        );

        Ok(Self {
            layout,
            origin,
            store: AppStore::from_persisted(state.apps),
            locks: OperationLocks::new(),
            persist_lock: Mutex::new(()),
        })
    }

    pub fn layout(&self) -> &AppsLayout {
        &self.layout
    }

    pub fn origin(&self) -> &LocalOrigin {
        &self.origin
    }

    pub fn store(&self) -> &AppStore {
        &self.store
    }

    pub fn get(&self, name: &str) -> RegistryResult<AppRecord> {
        self.store
            .get(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    pub fn get_all(&self) -> Vec<AppRecord> {
        self.store.get_all()
    }

    pub fn status(&self, name: &str) -> RegistryResult<StatusReport> {
        self.get(name).map(|record| StatusReport::from(&record))
    }

    pub fn begin(&self, name: &str, operation: Operation) -> RegistryResult<OperationGuard<'_>> {
        self.locks.try_acquire(name, operation)
    }

    pub fn operation_in_flight(&self, name: &str) -> Option<Operation> {
        self.locks.in_flight(name)
    }

    /// Registers an app that ships with the system. It is recorded as already
    /// installed and never passes through the install machine.
    pub fn register_preloaded(&self, app: &PreloadedApp) -> RegistryResult<AppRecord> {
        let _guard = self.begin(&app.name, Operation::Install)?;
        if self.store.contains(&app.name) {
            return Err(RegistryError::AlreadyInstalled(app.name.clone()));
        }

        let record = AppRecord::new(
            app.name.clone(),
            self.origin.manifest_url(&app.name, AppKind::Packaged),
            app.update_url.clone(),
        );
        self.commit(record.clone(), None)?;
        info!(app = app.name.as_str(), "registered preloaded app");
        Ok(record)
    }

    /// Registers every preloaded app that is not tracked yet, in order.
    pub fn ensure_preloaded(&self, apps: &[PreloadedApp]) -> RegistryResult<Vec<AppRecord>> {
        let mut registered = Vec::new();
        for app in apps {
            if self.store.contains(&app.name) {
                continue;
            }
            registered.push(self.register_preloaded(app)?);
        }
        Ok(registered)
    }

    pub fn set_auto_download(&self, name: &str, allowed: bool) -> RegistryResult<AppRecord> {
        let record = self.persist_change(name, |store| {
            store.set_allowed_auto_download(name, allowed)
        })?;
        info!(app = name, allowed, "updated auto-download policy");
        Ok(record)
    }

    /// Publishes a transient record so concurrent readers can observe
    /// progress. Nothing is persisted.
    pub fn publish(&self, record: AppRecord) {
        debug!(
            app = record.name.as_str(),
            install_state = record.install_state.as_str(),
            update_state = record.update_state.as_str(),
            status = record.status.as_str(),
            "state transition"
        );
        self.store.upsert(record);
    }

    /// Moves the live record of `name` to a new transient state.
    pub fn transition<F>(&self, name: &str, change: F) -> RegistryResult<AppRecord>
    where
        F: FnOnce(&mut AppRecord),
    {
        let record = self
            .store
            .modify(name, change)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        debug!(
            app = name,
            install_state = record.install_state.as_str(),
            update_state = record.update_state.as_str(),
            status = record.status.as_str(),
            "state transition"
        );
        Ok(record)
    }

    /// Applies `change` to the live record of `name`, commits it as the
    /// steady state and persists it.
    pub fn commit_with<F>(
        &self,
        name: &str,
        version: Option<String>,
        change: F,
    ) -> RegistryResult<AppRecord>
    where
        F: FnOnce(&mut AppRecord),
    {
        let record =
            self.persist_change(name, |store| store.commit_with(name, version, change))?;
        debug!(
            app = name,
            install_state = record.install_state.as_str(),
            update_state = record.update_state.as_str(),
            "committed record"
        );
        Ok(record)
    }

    /// Commits `record` as the app's steady state and persists it.
    pub fn commit(&self, record: AppRecord, version: Option<String>) -> RegistryResult<AppRecord> {
        debug!(
            app = record.name.as_str(),
            install_state = record.install_state.as_str(),
            update_state = record.update_state.as_str(),
            "committing record"
        );
        let name = record.name.clone();
        self.persist_change(&name, |store| {
            store.commit(record.clone(), version);
            Some(record)
        })
    }

    /// Drops any transient state of `name`, returning the committed record if
    /// the app was committed before.
    pub fn rollback(&self, name: &str) -> Option<AppRecord> {
        let restored = self.store.rollback(name);
        debug!(app = name, restored = restored.is_some(), "rolled back record");
        restored
    }

    pub fn remove(&self, name: &str) -> RegistryResult<AppRecord> {
        self.persist_change(name, |store| store.remove(name))
    }

    pub(crate) fn persist(&self) -> RegistryResult<()> {
        let _writer = self.persist_lock.lock();
        self.write_state()
    }

    /// Applies `change` to the store and writes the state file. When the write
    /// fails the entry for `name` is put back, so memory never runs ahead of
    /// disk.
    fn persist_change<F>(&self, name: &str, change: F) -> RegistryResult<AppRecord>
    where
        F: FnOnce(&AppStore) -> Option<AppRecord>,
    {
        let _writer = self.persist_lock.lock();
        let previous = self.store.snapshot(name);
        let record = change(&self.store)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;

        if let Err(err) = self.write_state() {
            self.store.restore(name, previous);
            warn!(app = name, error = ?err, "reverted change after failed persist");
            return Err(err);
        }
        Ok(record)
    }

    fn write_state(&self) -> RegistryResult<()> {
        let state = RegistryStateFile {
            apps: self.store.persisted_apps(),
            ..RegistryStateFile::default()
        };
        save_state_file(&self.layout, &state)?;
        Ok(())
    }
}
