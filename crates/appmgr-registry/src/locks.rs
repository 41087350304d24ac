use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::debug;

use crate::error::{RegistryError, RegistryResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Install,
    Update,
    Uninstall,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Update => "update",
            Self::Uninstall => "uninstall",
        }
    }
}

/// Tracks which app names have an operation in flight.
#[derive(Debug, Default)]
pub struct OperationLocks {
    in_flight: Mutex<HashMap<String, Operation>>,
}

impl OperationLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `name` for `operation`. A name that is already claimed is
    /// rejected rather than queued.
    pub fn try_acquire(&self, name: &str, operation: Operation) -> RegistryResult<OperationGuard<'_>> {
        let mut in_flight = self.in_flight.lock();
        if let Some(existing) = in_flight.get(name) {
            return Err(RegistryError::Conflict {
                name: name.to_string(),
                operation: existing.as_str().to_string(),
            });
        }
        in_flight.insert(name.to_string(), operation);
        debug!(app = name, operation = operation.as_str(), "operation lock acquired");

        Ok(OperationGuard {
            locks: self,
            name: name.to_string(),
            operation,
        })
    }

    pub fn in_flight(&self, name: &str) -> Option<Operation> {
        self.in_flight.lock().get(name).copied()
    }
}

#[derive(Debug)]
pub struct OperationGuard<'a> {
    locks: &'a OperationLocks,
    name: String,
    operation: Operation,
}

impl OperationGuard<'_> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        self.locks.in_flight.lock().remove(&self.name);
        debug!(
            app = self.name.as_str(),
            operation = self.operation.as_str(),
            "operation lock released"
        );
    }
}
