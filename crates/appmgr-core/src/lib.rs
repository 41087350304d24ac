mod manifest;
mod origin;
mod record;
mod state;

pub use manifest::{validate_app_name, AppKind, AppManifest};
pub use origin::LocalOrigin;
pub use record::AppRecord;
pub use state::{AppStatus, InstallState, UpdateState};

#[cfg(test)]
mod tests;
