//! Built-in storage backends for Tenantry.
//!
//! Only the file backend ships with the runtime; other kinds are registered
//! by plugins through the component repository.

pub mod files;

pub use files::FileStorage;

/// Component kind the file backend is registered under.
pub const FILES_KIND: &str = "files";
