use std::path::PathBuf;
use thiserror::Error;

/// Custom error types for blurrify
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Required external tool '{0}' not found in PATH")]
    DependencyNotFound(String),

    #[error("Failed to start command '{0}': {1}")]
    CommandStart(String, #[source] std::io::Error),

    #[error("Command '{0}' exited with status {1}")]
    CommandFailed(String, std::process::ExitStatus),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Media probe failed for '{path}': {message}")]
    Probe { path: PathBuf, message: String },

    #[error("Checkpoint ledger error: {0}")]
    Checkpoint(String),

    #[error("Detector error: {0}")]
    Detector(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

/// Result type for blurrify operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;
