use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("app '{0}' not found")]
    NotFound(String),
    #[error("app '{0}' has no update source")]
    NoUpdateSource(String),
    #[error("app '{name}' is busy: {operation} already in progress")]
    Conflict { name: String, operation: String },
    #[error("app '{0}' is already installed")]
    AlreadyInstalled(String),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub type RegistryResult<T> = Result<T, RegistryError>;
