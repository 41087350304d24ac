use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppsLayout {
    root: PathBuf,
}

impl AppsLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn apps_dir(&self) -> PathBuf {
        self.root.join("apps")
    }

    pub fn state_dir(&self) -> PathBuf {
        self.root.join("state")
    }

    pub fn tmp_dir(&self) -> PathBuf {
        self.state_dir().join("tmp")
    }

    pub fn registry_state_path(&self) -> PathBuf {
        self.state_dir().join("apps.toml")
    }

    pub fn app_dir(&self, name: &str) -> PathBuf {
        self.apps_dir().join(name)
    }

    pub fn app_manifest_path(&self, name: &str) -> PathBuf {
        self.app_dir(name).join("manifest.webapp")
    }

    pub fn app_package_path(&self, name: &str) -> PathBuf {
        self.app_dir(name).join("application.zip")
    }

    pub fn staging_dir(&self, name: &str) -> PathBuf {
        self.tmp_dir().join(format!("{name}.staging"))
    }

    /// Where the previous copy of an app waits while a new one is swapped in.
    pub fn backup_dir(&self, name: &str) -> PathBuf {
        self.tmp_dir().join(format!("{name}.previous"))
    }

    pub fn ensure_base_dirs(&self) -> Result<()> {
        for dir in [self.apps_dir(), self.state_dir(), self.tmp_dir()] {
            fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
        Ok(())
    }
}

pub fn default_apps_root() -> Result<PathBuf> {
    if cfg!(windows) {
        let app_data = std::env::var("LOCALAPPDATA")
            .context("LOCALAPPDATA is not set; cannot resolve Windows apps root")?;
        return Ok(PathBuf::from(app_data).join("Appmgr"));
    }

    let home = std::env::var("HOME").context("HOME is not set; cannot resolve apps root")?;
    Ok(PathBuf::from(home).join(".appmgr"))
}
