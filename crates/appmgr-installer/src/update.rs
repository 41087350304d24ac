use anyhow::anyhow;
use appmgr_core::{AppManifest, AppStatus, UpdateState};
use appmgr_registry::{Operation, RegistryError, RegistryResult};
use tracing::{debug, info, warn};

use crate::installer::{AppInstaller, StepError};
use crate::outcome::{OperationFailure, OperationOutcome, OperationResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UpdateTrigger {
    /// Unattended check; applies only when the app allows auto download.
    Check,
    /// The user asked for the update; applies whenever one is available.
    Confirmed,
}

impl AppInstaller {
    /// Looks for a newer version of `name`. An available update is applied
    /// right away only when the app allows auto download; otherwise the record
    /// settles at `Available`.
    pub fn check_for_update(&self, name: &str) -> RegistryResult<OperationOutcome> {
        self.run_update(name, UpdateTrigger::Check)
    }

    /// Checks for and applies an update to `name`.
    pub fn update(&self, name: &str) -> RegistryResult<OperationOutcome> {
        self.run_update(name, UpdateTrigger::Confirmed)
    }

    fn run_update(&self, name: &str, trigger: UpdateTrigger) -> RegistryResult<OperationOutcome> {
        let record = self.registry().get(name)?;
        let Some(update_url) = record.update_url.clone() else {
            return Err(RegistryError::NoUpdateSource(name.to_string()));
        };

        let _guard = self.registry().begin(name, Operation::Update)?;
        info!(app = name, url = update_url.as_str(), ?trigger, "checking for update");
        self.registry().transition(name, |record| {
            record.update_state = UpdateState::Checking;
            record.status = AppStatus::Fetching;
        })?;

        match self.check_and_apply(name, &update_url, trigger) {
            Ok(outcome) => Ok(outcome),
            Err(StepError::Failed(failure, err)) => {
                let restored = self.registry().rollback(name);
                warn!(
                    app = name,
                    failure = failure.as_str(),
                    error = ?err,
                    "update failed"
                );
                Ok(OperationOutcome::failed(restored, failure, &err))
            }
            Err(StepError::Registry(err)) => {
                self.registry().rollback(name);
                Err(err)
            }
        }
    }

    fn check_and_apply(
        &self,
        name: &str,
        update_url: &str,
        trigger: UpdateTrigger,
    ) -> Result<OperationOutcome, StepError> {
        let manifest = self.fetch_manifest(update_url)?;
        if manifest.name != name {
            return Err(StepError::Failed(
                OperationFailure::NameMismatch,
                anyhow!(
                    "manifest at {update_url} describes '{}' instead of '{name}'",
                    manifest.name
                ),
            ));
        }

        let installed_version = self.registry().store().version(name);
        if !manifest.is_newer_than(installed_version.as_deref()) {
            let record = self.registry().commit_with(name, None, |record| {
                record.update_state = UpdateState::Idle;
                record.status = AppStatus::Idle;
            })?;
            debug!(app = name, "app is up to date");
            return Ok(OperationOutcome::settled(record, OperationResult::UpToDate));
        }

        let available = self.registry().transition(name, |record| {
            record.update_state = UpdateState::Available;
            record.status = AppStatus::Idle;
        })?;
        if trigger == UpdateTrigger::Check && !available.allowed_auto_download {
            let record = self.registry().commit_with(name, None, |_| {})?;
            info!(
                app = name,
                version = manifest.version.as_deref().unwrap_or("unversioned"),
                "update available"
            );
            return Ok(OperationOutcome::settled(
                record,
                OperationResult::UpdateAvailable,
            ));
        }

        self.apply_update(name, update_url, &manifest)
    }

    fn apply_update(
        &self,
        name: &str,
        update_url: &str,
        manifest: &AppManifest,
    ) -> Result<OperationOutcome, StepError> {
        self.registry().transition(name, |record| {
            record.update_state = UpdateState::Downloading;
            record.status = AppStatus::Downloading;
        })?;

        let swap = self.stage_and_apply(manifest, update_url, || {
            self.registry().transition(name, |record| {
                record.update_state = UpdateState::Applying;
                record.status = AppStatus::Applying;
            })?;
            Ok(())
        })?;

        let record = self.commit_applied(name, swap, || {
            self.registry()
                .commit_with(name, manifest.version.clone(), |record| {
                    record.update_state = UpdateState::Idle;
                    record.status = AppStatus::Idle;
                })
        })?;
        info!(
            app = name,
            version = manifest.version.as_deref().unwrap_or("unversioned"),
            "updated app"
        );
        Ok(OperationOutcome::settled(record, OperationResult::Updated))
    }
}
