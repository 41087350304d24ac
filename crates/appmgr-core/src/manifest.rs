use anyhow::{anyhow, Context};
use semver::Version;
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppKind {
    Packaged,
    Hosted,
}

impl AppKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Packaged => "packaged",
            Self::Hosted => "hosted",
        }
    }
}

/// Document served at an app's update URL: a mini manifest pointing at a
/// package for packaged apps, or the web manifest itself for hosted apps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppManifest {
    pub name: String,
    pub version: Option<String>,
    pub description: Option<String>,
    pub start_url: Option<String>,
    pub package_path: Option<String>,
    pub size: Option<u64>,
    pub sha256: Option<String>,
}

impl AppManifest {
    pub fn from_json_slice(input: &[u8]) -> anyhow::Result<Self> {
        let manifest: Self =
            serde_json::from_slice(input).context("failed to parse app manifest")?;
        validate_app_name(&manifest.name)
            .with_context(|| format!("invalid app name '{}'", manifest.name))?;
        if let Some(package_path) = &manifest.package_path {
            if package_path.trim().is_empty() {
                return Err(anyhow!(
                    "package_path must not be empty for app '{}'",
                    manifest.name
                ));
            }
        }
        if let Some(sha256) = &manifest.sha256 {
            if sha256.len() != 64 || !sha256.chars().all(|ch| ch.is_ascii_hexdigit()) {
                return Err(anyhow!(
                    "sha256 must be 64 hex characters for app '{}'",
                    manifest.name
                ));
            }
        }
        Ok(manifest)
    }

    pub fn to_json_vec(&self) -> anyhow::Result<Vec<u8>> {
        serde_json::to_vec_pretty(self).context("failed to serialize app manifest")
    }

    pub fn kind(&self) -> AppKind {
        if self.package_path.is_some() {
            AppKind::Packaged
        } else {
            AppKind::Hosted
        }
    }

    /// Absolute URL of the package, resolved against the URL this manifest was
    /// fetched from.
    /// `None` for hosted apps.
    pub fn package_url(&self, manifest_url: &str) -> anyhow::Result<Option<String>> {
        let Some(path) = self.package_path.as_deref() else {
            return Ok(None);
        };
        let base = Url::parse(manifest_url)
            .with_context(|| format!("invalid manifest url: {manifest_url}"))?;
        let resolved = base
            .join(path.trim())
            .with_context(|| format!("invalid package_path '{path}' for app '{}'", self.name))?;
        Ok(Some(resolved.into()))
    }

    /// Whether this manifest describes a version other than `installed` that
    /// should replace it.
    pub fn is_newer_than(&self, installed: Option<&str>) -> bool {
        let Some(candidate) = self.version.as_deref() else {
            return false;
        };
        let Some(installed) = installed else {
            return true;
        };

        match (parse_lenient_version(candidate), parse_lenient_version(installed)) {
            (Some(candidate), Some(installed)) => candidate > installed,
            _ => candidate.trim() != installed.trim(),
        }
    }
}

pub fn validate_app_name(name: &str) -> anyhow::Result<()> {
    if name.is_empty() || name.len() > 64 {
        return Err(anyhow!("app name must be 1 to 64 characters"));
    }

    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(anyhow!("app name must not be empty"));
    };
    if !first.is_ascii_alphanumeric() {
        return Err(anyhow!("app name must start with an ASCII letter or digit"));
    }
    if chars.any(|ch| !(ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')) {
        return Err(anyhow!("app name contains invalid character(s)"));
    }

    Ok(())
}

fn parse_lenient_version(raw: &str) -> Option<Version> {
    let trimmed = raw.trim();
    if let Ok(version) = Version::parse(trimmed) {
        return Some(version);
    }

    let padded = match trimmed.matches('.').count() {
        0 => format!("{trimmed}.0.0"),
        1 => format!("{trimmed}.0"),
        _ => return None,
    };
    Version::parse(&padded).ok()
}
