//! Built-in defaults, bundled into one injectable value.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// Every built-in constant the runtime falls back to.
///
/// [`Config`](crate::Config) is built against one of these and keeps a copy,
/// so overriding a field here is enough to change the behaviour of a whole
/// process (or a single test).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Defaults {
    /// Directory plugins are loaded from
    pub plugin_path: PathBuf,

    /// Directory for spooled app packages and default file storage roots
    pub spool_path: PathBuf,

    /// Directory for IPC endpoints
    pub ipc_path: PathBuf,

    /// How long a slave may stay silent before it is considered dead
    pub heartbeat_timeout: Duration,

    /// How long an idle slave lives before it exits on its own
    pub suicide_timeout: Duration,

    /// Maximum number of slaves per app
    pub pool_limit: u32,

    /// Maximum number of queued jobs per app
    pub queue_limit: u32,

    /// Messages drained per I/O iteration; also the messaging channel capacity
    pub io_bulk_size: u32,

    /// Name of the slave binary
    pub slave: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            plugin_path: PathBuf::from("/usr/lib/cocaine"),
            spool_path: PathBuf::from("/var/spool/cocaine"),
            ipc_path: PathBuf::from("/var/run/cocaine"),
            heartbeat_timeout: Duration::from_secs(30),
            suicide_timeout: Duration::from_secs(600),
            pool_limit: 10,
            queue_limit: 100,
            io_bulk_size: 100,
            slave: "cocaine-slave".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_values() {
        let defaults = Defaults::default();
        assert_eq!(defaults.plugin_path, PathBuf::from("/usr/lib/cocaine"));
        assert_eq!(defaults.heartbeat_timeout, Duration::from_secs(30));
        assert_eq!(defaults.pool_limit, 10);
        assert_eq!(defaults.slave, "cocaine-slave");
    }
}
