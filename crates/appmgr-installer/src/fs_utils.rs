use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use appmgr_core::AppManifest;
use appmgr_registry::AppsLayout;

pub(crate) fn remove_dir_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}

/// A new app directory that has been moved into place while the previous one,
/// if any, is kept aside until the registry commits.
#[derive(Debug)]
#[must_use = "an app files swap must be finished or reverted"]
pub(crate) struct AppFilesSwap {
    name: String,
    app_dir: PathBuf,
    backup: Option<PathBuf>,
}

impl AppFilesSwap {
    /// Drops the previous copy of the app.
    pub(crate) fn finish(self) {
        if let Some(backup) = &self.backup {
            if let Err(err) = remove_dir_if_exists(backup) {
                tracing::warn!(
                    app = self.name.as_str(),
                    path = %backup.display(),
                    error = %err,
                    "failed to remove previous app dir"
                );
            }
        }
    }

    /// Removes the new app directory and moves the previous one back.
    pub(crate) fn revert(self) -> Result<()> {
        remove_dir_if_exists(&self.app_dir)
            .with_context(|| format!("failed to remove app dir: {}", self.app_dir.display()))?;
        if let Some(backup) = &self.backup {
            fs::rename(backup, &self.app_dir).with_context(|| {
                format!(
                    "failed to restore previous app dir: {} -> {}",
                    backup.display(),
                    self.app_dir.display()
                )
            })?;
        }
        Ok(())
    }
}

/// Writes the manifest and optional package into a staging directory, then
/// swaps it in place of the app's current directory. The current directory is
/// moved aside first and restored if the swap fails.
pub(crate) fn write_app_files(
    layout: &AppsLayout,
    manifest: &AppManifest,
    package: Option<&[u8]>,
) -> Result<AppFilesSwap> {
    let name = manifest.name.as_str();
    let staging = layout.staging_dir(name);
    remove_dir_if_exists(&staging)
        .with_context(|| format!("failed to clear staging dir: {}", staging.display()))?;
    fs::create_dir_all(&staging)
        .with_context(|| format!("failed to create staging dir: {}", staging.display()))?;

    let staged_manifest = staging.join("manifest.webapp");
    fs::write(&staged_manifest, manifest.to_json_vec()?).with_context(|| {
        format!("failed to write manifest: {}", staged_manifest.display())
    })?;
    if let Some(package) = package {
        let staged_package = staging.join("application.zip");
        fs::write(&staged_package, package).with_context(|| {
            format!("failed to write package: {}", staged_package.display())
        })?;
    }

    let app_dir = layout.app_dir(name);
    let backup_dir = layout.backup_dir(name);
    remove_dir_if_exists(&backup_dir)
        .with_context(|| format!("failed to clear backup dir: {}", backup_dir.display()))?;
    let backup = if app_dir.exists() {
        fs::rename(&app_dir, &backup_dir).with_context(|| {
            format!(
                "failed to move current app aside: {} -> {}",
                app_dir.display(),
                backup_dir.display()
            )
        })?;
        Some(backup_dir)
    } else {
        None
    };

    if let Err(err) = fs::rename(&staging, &app_dir) {
        let err = anyhow::Error::new(err).context(format!(
            "failed to move staged app into place: {} -> {}",
            staging.display(),
            app_dir.display()
        ));
        if let Some(backup) = &backup {
            if let Err(restore_err) = fs::rename(backup, &app_dir) {
                return Err(err.context(format!(
                    "previous app left at {}: {restore_err}",
                    backup.display()
                )));
            }
        }
        return Err(err);
    }

    Ok(AppFilesSwap {
        name: name.to_string(),
        app_dir,
        backup,
    })
}

pub(crate) fn discard_staging(layout: &AppsLayout, name: &str) {
    let staging = layout.staging_dir(name);
    if let Err(err) = remove_dir_if_exists(&staging) {
        tracing::warn!(
            app = name,
            path = %staging.display(),
            error = %err,
            "failed to discard staging dir"
        );
    }
}
