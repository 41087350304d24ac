use serde::{Deserialize, Serialize};

use crate::state::{AppStatus, InstallState, UpdateState};

/// Externally visible state of one tracked application.
///
/// The serialized form is exactly seven fields. An absent update source is
/// written as an empty `updateUrl` string and an empty string reads back as
/// absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AppRecord {
    pub name: String,
    pub install_state: InstallState,
    pub manifest_url: String,
    pub status: AppStatus,
    pub update_state: UpdateState,
    #[serde(with = "empty_url")]
    pub update_url: Option<String>,
    pub allowed_auto_download: bool,
}

impl AppRecord {
    /// A committed, idle record with the default download policy.
    pub fn new(
        name: impl Into<String>,
        manifest_url: impl Into<String>,
        update_url: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            install_state: InstallState::Installed,
            manifest_url: manifest_url.into(),
            status: AppStatus::Idle,
            update_state: UpdateState::Idle,
            update_url: update_url.filter(|url| !url.trim().is_empty()),
            allowed_auto_download: false,
        }
    }

    pub fn has_update_source(&self) -> bool {
        self.update_url.is_some()
    }

    /// True when no operation holds the record in a transient state.
    pub fn is_steady(&self) -> bool {
        self.install_state.is_steady()
            && self.update_state.is_committable()
            && self.status == AppStatus::Idle
    }
}

mod empty_url {
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(value.as_deref().unwrap_or(""))
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if raw.trim().is_empty() {
            Ok(None)
        } else {
            Ok(Some(raw))
        }
    }
}
