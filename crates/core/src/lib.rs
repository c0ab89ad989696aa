//! # Tenantry Core
//!
//! Domain types, capability traits, and error definitions shared by every
//! Tenantry crate. Nothing here touches the filesystem or spawns work; it
//! defines the vocabulary the bootstrap layer is written against.
//!
//! ## Layout
//!
//! - [`error`]: the error taxonomy (configuration, system, unknown component,
//!   storage) and the crate-wide [`Result`] alias
//! - [`plugin`]: the opaque per-component configuration blob
//! - [`storage`]: the storage capability every backend implements
//! - [`logging`]: the logging sink abstraction plus the void and tracing sinks

pub mod error;
pub mod logging;
pub mod plugin;
pub mod storage;

// Re-export key types at crate root for ergonomics
pub use error::{ConfigError, Error, Result, StorageError, SystemError, UnknownComponentError};
pub use logging::{Logger, LoggingSink, Priority, TracingSink, VoidSink};
pub use plugin::PluginConfig;
pub use storage::Storage;
