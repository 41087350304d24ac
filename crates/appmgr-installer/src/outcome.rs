use appmgr_core::AppRecord;

/// Expected operational failures. These are reported in an outcome, never as
/// an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationFailure {
    DownloadFailed,
    InvalidManifest,
    IntegrityMismatch,
    NameMismatch,
}

impl OperationFailure {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DownloadFailed => "download-failed",
            Self::InvalidManifest => "invalid-manifest",
            Self::IntegrityMismatch => "integrity-mismatch",
            Self::NameMismatch => "name-mismatch",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationResult {
    Installed,
    Updated,
    UpdateAvailable,
    UpToDate,
    Failed(OperationFailure),
}

impl OperationResult {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Installed => "installed",
            Self::Updated => "updated",
            Self::UpdateAvailable => "update-available",
            Self::UpToDate => "up-to-date",
            Self::Failed(failure) => failure.as_str(),
        }
    }
}

/// Result of an install or update. `record` is the app as it stands once the
/// operation settled; it is absent only when the update manifest could not be
/// read, since the app name is unknown then.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationOutcome {
    pub record: Option<AppRecord>,
    pub result: OperationResult,
    pub detail: Option<String>,
}

impl OperationOutcome {
    pub(crate) fn settled(record: AppRecord, result: OperationResult) -> Self {
        Self {
            record: Some(record),
            result,
            detail: None,
        }
    }

    pub(crate) fn failed(
        record: Option<AppRecord>,
        failure: OperationFailure,
        err: &anyhow::Error,
    ) -> Self {
        Self {
            record,
            result: OperationResult::Failed(failure),
            detail: Some(format!("{err:#}")),
        }
    }

    pub fn failure(&self) -> Option<OperationFailure> {
        match self.result {
            OperationResult::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failure().is_none()
    }
}
