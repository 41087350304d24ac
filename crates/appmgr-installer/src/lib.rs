mod fetch;
mod fs_utils;
mod install;
mod installer;
mod outcome;
mod uninstall;
mod update;

pub use fetch::{Fetcher, HttpFetcher};
pub use installer::AppInstaller;
pub use outcome::{OperationFailure, OperationOutcome, OperationResult};
