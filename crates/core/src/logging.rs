//! Named loggers handed out by the context.
//!
//! A [`LoggingSink`] is the synchronization boundary for log emission: the
//! context calls [`LoggingSink::get`] from any thread and never adds locking
//! of its own. Two sinks ship here:
//! - [`VoidSink`]: discards everything, substituted when no sink is supplied
//! - [`TracingSink`]: forwards records to `tracing` events

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

/// Severity of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::Debug => "debug",
            Priority::Info => "info",
            Priority::Warning => "warning",
            Priority::Error => "error",
        };
        f.write_str(s)
    }
}

/// A named logger.
pub trait Logger: Send + Sync {
    /// The name this logger was requested under.
    fn name(&self) -> &str;

    /// Emit a single record.
    fn emit(&self, priority: Priority, message: &str);

    fn debug(&self, message: &str) {
        self.emit(Priority::Debug, message);
    }

    fn info(&self, message: &str) {
        self.emit(Priority::Info, message);
    }

    fn warning(&self, message: &str) {
        self.emit(Priority::Warning, message);
    }

    fn error(&self, message: &str) {
        self.emit(Priority::Error, message);
    }
}

/// Source of named loggers.
///
/// Implementations may cache one logger per name or build a fresh one on every
/// call; callers only rely on getting a usable logger back.
pub trait LoggingSink: Send + Sync {
    fn get(&self, name: &str) -> Arc<dyn Logger>;
}

/// A sink whose loggers drop every record.
#[derive(Debug, Default, Clone, Copy)]
pub struct VoidSink;

impl LoggingSink for VoidSink {
    fn get(&self, name: &str) -> Arc<dyn Logger> {
        Arc::new(VoidLogger { name: name.to_string() })
    }
}

/// Logger produced by [`VoidSink`].
#[derive(Debug)]
pub struct VoidLogger {
    name: String,
}

impl Logger for VoidLogger {
    fn name(&self) -> &str {
        &self.name
    }

    fn emit(&self, _priority: Priority, _message: &str) {}
}

/// A sink that forwards records to the `tracing` ecosystem.
///
/// Loggers are cached per name, so repeated lookups return the same instance.
#[derive(Default)]
pub struct TracingSink {
    loggers: Mutex<HashMap<String, Arc<TracingLogger>>>,
}

impl TracingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LoggingSink for TracingSink {
    fn get(&self, name: &str) -> Arc<dyn Logger> {
        // A poisoned map only means another thread panicked mid-insert; the
        // cached loggers are still valid.
        let mut loggers = self
            .loggers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let logger = loggers
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(TracingLogger { name: name.to_string() }));
        logger.clone()
    }
}

/// Logger produced by [`TracingSink`].
#[derive(Debug)]
pub struct TracingLogger {
    name: String,
}

impl Logger for TracingLogger {
    fn name(&self) -> &str {
        &self.name
    }

    fn emit(&self, priority: Priority, message: &str) {
        match priority {
            Priority::Debug => tracing::debug!(logger = %self.name, "{message}"),
            Priority::Info => tracing::info!(logger = %self.name, "{message}"),
            Priority::Warning => tracing::warn!(logger = %self.name, "{message}"),
            Priority::Error => tracing::error!(logger = %self.name, "{message}"),
        }
    }
}
