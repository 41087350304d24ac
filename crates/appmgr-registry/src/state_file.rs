use std::collections::HashSet;
use std::fs;
use std::io;

use anyhow::{Context, Result};
use appmgr_core::AppRecord;
use serde::{Deserialize, Serialize};

use crate::layout::AppsLayout;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct PersistedApp {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) version: Option<String>,
    pub(crate) record: AppRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RegistryStateFile {
    #[serde(default = "state_file_version")]
    pub(crate) version: u32,
    #[serde(default)]
    pub(crate) apps: Vec<PersistedApp>,
}

impl Default for RegistryStateFile {
    fn default() -> Self {
        Self {
            version: state_file_version(),
            apps: Vec::new(),
        }
    }
}

pub(crate) fn load_state_file(layout: &AppsLayout) -> Result<RegistryStateFile> {
    let path = layout.registry_state_path();
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Ok(RegistryStateFile::default())
        }
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed reading registry state: {}", path.display()));
        }
    };

    parse_state_file(&content)
        .with_context(|| format!("failed parsing registry state: {}", path.display()))
}

pub(crate) fn save_state_file(layout: &AppsLayout, state: &RegistryStateFile) -> Result<()> {
    let dir = layout.state_dir();
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed creating registry state dir: {}", dir.display()))?;

    let path = layout.registry_state_path();
    let content = toml::to_string(state)
        .with_context(|| format!("failed serializing registry state: {}", path.display()))?;

    let part_path = path.with_extension("toml.part");
    fs::write(&part_path, content)
        .with_context(|| format!("failed writing registry state: {}", part_path.display()))?;
    fs::rename(&part_path, &path)
        .with_context(|| format!("failed replacing registry state: {}", path.display()))
}

pub(crate) fn parse_state_file(content: &str) -> Result<RegistryStateFile> {
    let state: RegistryStateFile = toml::from_str(content)?;
    let expected = state_file_version();
    if state.version != expected {
        anyhow::bail!(
            "unsupported registry state version {} (expected {})",
            state.version,
            expected
        );
    }

    let mut seen = HashSet::new();
    for app in &state.apps {
        if !seen.insert(app.record.name.as_str()) {
            anyhow::bail!("duplicate app '{}' in registry state", app.record.name);
        }
        if !app.record.is_steady() {
            anyhow::bail!(
                "app '{}' was persisted in a transient state",
                app.record.name
            );
        }
    }
    Ok(state)
}

fn state_file_version() -> u32 {
    1
}
