//! Error types for host service setup

use std::path::PathBuf;

/// Error type for host service operations
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// A required service was not supplied by the host
    #[error("Host service not provided: {0}")]
    MissingService(&'static str),

    /// Config directory is unusable (empty or not a directory)
    #[error("Invalid config directory: {0:?}")]
    InvalidConfigDirectory(PathBuf),

    /// Invalid internal plugin name (empty or contains path separators)
    #[error("Invalid internal name: {0:?}")]
    InvalidInternalName(String),

    /// Plugin already loaded
    #[error("Plugin already initialized")]
    AlreadyInitialized,
}

/// Result type for host operations
pub type HostResult<T> = Result<T, HostError>;
