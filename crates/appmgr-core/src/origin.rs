use serde::{Deserialize, Serialize};

use crate::manifest::AppKind;

/// Origin under which installed apps are served locally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocalOrigin {
    #[serde(default = "default_local_domain")]
    pub domain: String,
    #[serde(default = "default_local_port")]
    pub port: u16,
}

impl Default for LocalOrigin {
    fn default() -> Self {
        Self {
            domain: default_local_domain(),
            port: default_local_port(),
        }
    }
}

impl LocalOrigin {
    pub fn manifest_url(&self, name: &str, kind: AppKind) -> String {
        match kind {
            AppKind::Packaged => format!(
                "https://{name}.{}:{}/manifest.webapp",
                self.domain, self.port
            ),
            AppKind::Hosted => format!(
                "https://cached.{}:{}/{name}/manifest.webapp",
                self.domain, self.port
            ),
        }
    }
}

fn default_local_domain() -> String {
    "local".to_string()
}

fn default_local_port() -> u16 {
    4443
}
