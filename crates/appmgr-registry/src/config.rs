use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use appmgr_core::{validate_app_name, LocalOrigin};
use serde::{Deserialize, Serialize};

use crate::layout::default_apps_root;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreloadedApp {
    pub name: String,
    pub update_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    pub root: Option<PathBuf>,
    #[serde(default = "http_timeout_secs_default")]
    pub http_timeout_secs: u64,
    #[serde(default)]
    pub origin: LocalOrigin,
    #[serde(default)]
    pub preloaded: Vec<PreloadedApp>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            root: None,
            http_timeout_secs: http_timeout_secs_default(),
            origin: LocalOrigin::default(),
            preloaded: Vec::new(),
        }
    }
}

impl RegistryConfig {
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: Self = toml::from_str(input).context("failed to parse appmgr config")?;
        if config.http_timeout_secs == 0 {
            anyhow::bail!("http_timeout_secs must be greater than zero");
        }
        if config.origin.domain.trim().is_empty() {
            anyhow::bail!("origin.domain must not be empty");
        }

        let mut seen = HashSet::new();
        for app in &config.preloaded {
            validate_app_name(&app.name)
                .with_context(|| format!("invalid preloaded app name '{}'", app.name))?;
            if !seen.insert(app.name.as_str()) {
                anyhow::bail!("duplicate preloaded app '{}'", app.name);
            }
        }
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed reading config: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("failed loading config: {}", path.display()))
    }

    pub fn resolve_root(&self) -> Result<PathBuf> {
        match &self.root {
            Some(root) => Ok(root.clone()),
            None => default_apps_root(),
        }
    }
}

fn http_timeout_secs_default() -> u64 {
    30
}
