use anyhow::Context;
use appmgr_core::AppRecord;
use appmgr_registry::{Operation, RegistryResult};
use tracing::info;

use crate::fs_utils::remove_dir_if_exists;
use crate::installer::AppInstaller;

impl AppInstaller {
    /// Removes `name` from the registry along with its files on disk. The
    /// record goes first; files are only deleted once that is persisted.
    pub fn uninstall(&self, name: &str) -> RegistryResult<AppRecord> {
        self.registry().get(name)?;
        let _guard = self.registry().begin(name, Operation::Uninstall)?;

        let removed = self.registry().remove(name)?;
        let app_dir = self.registry().layout().app_dir(name);
        remove_dir_if_exists(&app_dir)
            .with_context(|| format!("failed to remove app dir: {}", app_dir.display()))?;
        info!(app = name, "uninstalled app");
        Ok(removed)
    }
}
