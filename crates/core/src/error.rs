//! Error types for the Tenantry bootstrap layer.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each failure class has its own error type; [`Error`] wraps them all.

use std::path::PathBuf;
use thiserror::Error;

/// The top-level error type for all Tenantry operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Configuration errors ---
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    // --- Environment errors ---
    #[error("System error: {0}")]
    System(#[from] SystemError),

    // --- Repository errors ---
    #[error("{0}")]
    UnknownComponent(#[from] UnknownComponentError),

    // --- Storage errors ---
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl Error {
    /// Whether the caller may handle this error locally and keep going.
    ///
    /// Only repository lookups qualify. Configuration and system failures
    /// mean the process cannot start.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::UnknownComponent(_))
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// A malformed, missing or semantically invalid configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("the configuration file '{}' doesn't exist", path.display())]
    NotFound { path: PathBuf },

    #[error("unable to open the configuration file '{}': {reason}", path.display())]
    Unreadable { path: PathBuf, reason: String },

    #[error("the configuration file '{}' is corrupted: {reason}", path.display())]
    Corrupted { path: PathBuf, reason: String },

    #[error("invalid configuration version")]
    InvalidVersion,

    #[error("the specified path '{}' does not exist", path.display())]
    PathNotFound { path: PathBuf },

    #[error("the specified path '{}' is not a directory", path.display())]
    NotADirectory { path: PathBuf },

    #[error("invalid value for '{field}': {reason}")]
    InvalidField { field: String, reason: String },

    #[error("no storages configured")]
    NoStorages,

    #[error("mandatory 'core' storage has not been configured")]
    MissingCoreStorage,

    #[error("storage '{0}' has not been configured")]
    UnknownStorage(String),
}

/// A failure of the host environment, independent of the config file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SystemError {
    #[error("failed to determine the hostname: {0}")]
    Hostname(String),
}

/// A component kind that has no factory registered for the requested capability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {capability} component '{kind}'")]
pub struct UnknownComponentError {
    pub capability: &'static str,
    pub kind: String,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid storage key '{0}'")]
    InvalidKey(String),

    #[error("invalid storage arguments: {0}")]
    InvalidArgs(String),

    #[error("I/O failure on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupted object at '{}': {reason}", path.display())]
    Corrupted { path: PathBuf, reason: String },
}
