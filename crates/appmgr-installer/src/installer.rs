use std::sync::Arc;

use anyhow::Context;
use appmgr_core::{AppManifest, AppRecord, AppStatus};
use appmgr_registry::{AppRegistry, RegistryError, RegistryResult, StatusReport};
use appmgr_security::verify_package;
use tracing::warn;

use crate::fetch::Fetcher;
use crate::fs_utils::{discard_staging, write_app_files, AppFilesSwap};
use crate::outcome::OperationFailure;

/// Drives the install and update machines of an [`AppRegistry`].
///
/// Cloning is cheap and clones share the same registry, so one installer can
/// serve operations on different apps from several threads.
#[derive(Clone)]
pub struct AppInstaller {
    registry: Arc<AppRegistry>,
    fetcher: Arc<dyn Fetcher>,
}

impl AppInstaller {
    pub fn new(registry: Arc<AppRegistry>, fetcher: Arc<dyn Fetcher>) -> Self {
        Self { registry, fetcher }
    }

    pub fn registry(&self) -> &AppRegistry {
        &self.registry
    }

    pub fn get(&self, name: &str) -> RegistryResult<AppRecord> {
        self.registry.get(name)
    }

    pub fn get_all(&self) -> Vec<AppRecord> {
        self.registry.get_all()
    }

    pub fn status(&self, name: &str) -> RegistryResult<StatusReport> {
        self.registry.status(name)
    }

    pub(crate) fn fetch(&self, url: &str) -> Result<Vec<u8>, StepError> {
        self.fetcher
            .fetch(url)
            .map_err(|err| StepError::Failed(OperationFailure::DownloadFailed, err))
    }

    pub(crate) fn fetch_manifest(&self, url: &str) -> Result<AppManifest, StepError> {
        let raw = self.fetch(url)?;
        AppManifest::from_json_slice(&raw)
            .with_context(|| format!("manifest served by {url} is invalid"))
            .map_err(|err| StepError::Failed(OperationFailure::InvalidManifest, err))
    }

    /// Downloads and verifies the package of a packaged app, then swaps the
    /// app into the layout. `enter_apply` runs once the payload is verified
    /// and before anything on disk changes. The returned swap is settled by
    /// [`AppInstaller::commit_applied`].
    pub(crate) fn stage_and_apply<F>(
        &self,
        manifest: &AppManifest,
        manifest_url: &str,
        enter_apply: F,
    ) -> Result<AppFilesSwap, StepError>
    where
        F: FnOnce() -> RegistryResult<()>,
    {
        let name = manifest.name.as_str();
        let package_url = manifest
            .package_url(manifest_url)
            .map_err(|err| StepError::Failed(OperationFailure::InvalidManifest, err))?;
        let package = match package_url {
            Some(package_url) => {
                let package = self.fetch(&package_url)?;
                self.registry
                    .transition(name, |record| record.status = AppStatus::Verifying)?;
                verify_package(&package, manifest.size, manifest.sha256.as_deref())
                    .with_context(|| format!("package for '{name}' failed verification"))
                    .map_err(|err| StepError::Failed(OperationFailure::IntegrityMismatch, err))?;
                Some(package)
            }
            None => None,
        };

        enter_apply()?;
        write_app_files(self.registry.layout(), manifest, package.as_deref()).map_err(|err| {
            discard_staging(self.registry.layout(), name);
            StepError::Registry(RegistryError::Storage(err))
        })
    }

    /// Runs `commit` for files already swapped in. The previous files are put
    /// back when the commit fails, so disk matches the restored record.
    pub(crate) fn commit_applied<F>(
        &self,
        name: &str,
        swap: AppFilesSwap,
        commit: F,
    ) -> Result<AppRecord, StepError>
    where
        F: FnOnce() -> RegistryResult<AppRecord>,
    {
        match commit() {
            Ok(record) => {
                swap.finish();
                Ok(record)
            }
            Err(err) => {
                if let Err(revert_err) = swap.revert() {
                    warn!(app = name, error = ?revert_err, "failed to restore app files");
                }
                Err(StepError::Registry(err))
            }
        }
    }
}

/// Why a step of an operation stopped. Expected failures become part of the
/// outcome; registry errors propagate to the caller.
#[derive(Debug)]
pub(crate) enum StepError {
    Failed(OperationFailure, anyhow::Error),
    Registry(RegistryError),
}

impl From<RegistryError> for StepError {
    fn from(err: RegistryError) -> Self {
        Self::Registry(err)
    }
}
