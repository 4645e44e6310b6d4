//! Cloud declaration error types

use thiserror::Error;

/// Errors raised while declaring, planning or applying resources
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Resource already declared: {0}")]
    DuplicateResource(String),

    #[error("Circular dependency detected: {0}")]
    CircularDependency(String),

    #[error("Provisioning engine not found: {0}")]
    EngineNotFound(String),

    #[error("Engine command failed: {0}")]
    CommandFailed(String),

    #[error("State file error: {0}")]
    StateError(String),

    #[error("Lock acquisition failed: {0}")]
    LockError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CloudError>;
