mod config;
mod error;
mod layout;
mod locks;
mod registry;
mod state_file;
mod store;

pub use config::{PreloadedApp, RegistryConfig};
pub use error::{RegistryError, RegistryResult};
pub use layout::{default_apps_root, AppsLayout};
pub use locks::{Operation, OperationGuard, OperationLocks};
pub use registry::{AppRegistry, StatusReport};
pub use store::AppStore;
