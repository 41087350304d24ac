use appmgr_core::{AppRecord, AppStatus, InstallState};
use appmgr_registry::{Operation, RegistryError, RegistryResult};
use tracing::{info, warn};

use crate::installer::{AppInstaller, StepError};
use crate::outcome::{OperationOutcome, OperationResult};

impl AppInstaller {
    /// Installs the app described by the manifest at `update_url`.
    ///
    /// The record appears as `Pending` once the manifest names the app, moves
    /// to `Installing` after the package verifies and settles at `Installed`.
    /// On failure the app stays unregistered and the outcome carries the
    /// reason together with the record as it would have been committed.
    pub fn install(&self, update_url: &str) -> RegistryResult<OperationOutcome> {
        info!(url = update_url, "installing app");
        let manifest = match self.fetch_manifest(update_url) {
            Ok(manifest) => manifest,
            Err(StepError::Failed(failure, err)) => {
                warn!(
                    url = update_url,
                    failure = failure.as_str(),
                    error = ?err,
                    "install aborted"
                );
                return Ok(OperationOutcome::failed(None, failure, &err));
            }
            Err(StepError::Registry(err)) => return Err(err),
        };

        let name = manifest.name.clone();
        let _guard = self.registry().begin(&name, Operation::Install)?;
        if self.registry().store().contains(&name) {
            return Err(RegistryError::AlreadyInstalled(name));
        }

        let manifest_url = self.registry().origin().manifest_url(&name, manifest.kind());
        let baseline = AppRecord::new(name.clone(), manifest_url, Some(update_url.to_string()));
        let mut pending = baseline.clone();
        pending.install_state = InstallState::Pending;
        pending.status = AppStatus::Downloading;
        self.registry().publish(pending);

        let applied = self
            .stage_and_apply(&manifest, update_url, || {
                self.registry().transition(&name, |record| {
                    record.install_state = InstallState::Installing;
                    record.status = AppStatus::Applying;
                })?;
                Ok(())
            })
            .and_then(|swap| {
                self.commit_applied(&name, swap, || {
                    self.registry()
                        .commit_with(&name, manifest.version.clone(), |record| {
                            record.install_state = InstallState::Installed;
                            record.status = AppStatus::Idle;
                        })
                })
            });

        match applied {
            Ok(record) => {
                info!(
                    app = name.as_str(),
                    kind = manifest.kind().as_str(),
                    version = manifest.version.as_deref().unwrap_or("unversioned"),
                    "installed app"
                );
                Ok(OperationOutcome::settled(record, OperationResult::Installed))
            }
            Err(StepError::Failed(failure, err)) => {
                self.registry().rollback(&name);
                warn!(
                    app = name.as_str(),
                    failure = failure.as_str(),
                    error = ?err,
                    "install failed"
                );
                Ok(OperationOutcome::failed(Some(baseline), failure, &err))
            }
            Err(StepError::Registry(err)) => {
                self.registry().rollback(&name);
                Err(err)
            }
        }
    }
}
