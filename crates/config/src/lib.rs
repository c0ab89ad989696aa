//! Configuration loading and validation for Tenantry.
//!
//! Loads the JSON configuration document, validates it against a fixed schema
//! in a fixed order, and materializes an immutable [`Config`]. A `Config`
//! either passed every check or was never constructed.

pub mod defaults;
pub mod document;
pub mod hostname;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};
use tenantry_core::{ConfigError, PluginConfig, Result, SystemError};

pub use defaults::Defaults;
pub use document::{load_document, parse_document};
pub use hostname::local_hostname;

/// The only document version this build understands.
pub const CONFIG_VERSION: u64 = 1;

/// Name of the storage every deployment must configure.
pub const CORE_STORAGE: &str = "core";

/// A validated, immutable runtime configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    config_path: PathBuf,
    plugin_path: PathBuf,
    spool_path: PathBuf,
    ipc_path: PathBuf,
    storages: BTreeMap<String, StorageInfo>,
    runtime: RuntimeInfo,
    defaults: Defaults,
}

/// Which component kind implements a named storage, and with what arguments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageInfo {
    /// Registered component kind (e.g. "files"). May be empty when the
    /// document omitted it; the repository rejects it at creation time.
    pub backend_type: String,

    pub plugin_config: PluginConfig,
}

/// Facts about the host, resolved once at load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuntimeInfo {
    pub hostname: String,
}

impl Config {
    /// Load and validate the document at `path` with the built-in defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with(path, Defaults::default())
    }

    /// Load and validate the document at `path` against injected defaults.
    pub fn load_with(path: impl AsRef<Path>, defaults: Defaults) -> Result<Self> {
        let path = path.as_ref();
        let document = load_document(path)?;
        let config = Self::from_document(path, &document, defaults, local_hostname)?;
        tracing::info!(
            path = %path.display(),
            storages = config.storages.len(),
            hostname = %config.runtime.hostname,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Validate an already-parsed document.
    ///
    /// Checks run in a fixed order and stop at the first violation: version,
    /// paths, storages, the mandatory core storage, then hostname resolution.
    pub fn from_document<F>(
        config_path: impl Into<PathBuf>,
        document: &Value,
        defaults: Defaults,
        resolve_hostname: F,
    ) -> Result<Self>
    where
        F: FnOnce() -> std::result::Result<String, SystemError>,
    {
        check_version(document)?;

        let paths = section(document, "paths")?;
        let plugin_path = resolve_path(paths, "plugins", &defaults.plugin_path)?;
        let spool_path = resolve_path(paths, "spool", &defaults.spool_path)?;
        let ipc_path = resolve_path(paths, "ipc", &defaults.ipc_path)?;

        let storages = parse_storages(document)?;
        if !storages.contains_key(CORE_STORAGE) {
            return Err(ConfigError::MissingCoreStorage.into());
        }

        let hostname = resolve_hostname()?;

        Ok(Self {
            config_path: config_path.into(),
            plugin_path,
            spool_path,
            ipc_path,
            storages,
            runtime: RuntimeInfo { hostname },
            defaults,
        })
    }

    /// The file this configuration was loaded from.
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn plugin_path(&self) -> &Path {
        &self.plugin_path
    }

    pub fn spool_path(&self) -> &Path {
        &self.spool_path
    }

    pub fn ipc_path(&self) -> &Path {
        &self.ipc_path
    }

    /// All configured storages, keyed by storage name.
    pub fn storages(&self) -> &BTreeMap<String, StorageInfo> {
        &self.storages
    }

    /// A single configured storage.
    pub fn storage(&self, name: &str) -> Option<&StorageInfo> {
        self.storages.get(name)
    }

    pub fn runtime(&self) -> &RuntimeInfo {
        &self.runtime
    }

    pub fn hostname(&self) -> &str {
        &self.runtime.hostname
    }

    /// The defaults this configuration was validated against.
    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }
}

/// An integral float (`1.0`) counts as its integer value.
fn check_version(document: &Value) -> std::result::Result<(), ConfigError> {
    let supported = match document.get("version") {
        Some(Value::Number(number)) => {
            number.as_u64() == Some(CONFIG_VERSION)
                || number.as_f64() == Some(CONFIG_VERSION as f64)
        }
        _ => false,
    };
    if supported {
        Ok(())
    } else {
        Err(ConfigError::InvalidVersion)
    }
}

/// An optional top-level object. Absent and `null` both mean "not given".
fn section<'a>(
    document: &'a Value,
    name: &str,
) -> std::result::Result<Option<&'a Map<String, Value>>, ConfigError> {
    match document.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(ConfigError::InvalidField {
            field: name.into(),
            reason: "expected an object".into(),
        }),
    }
}

fn resolve_path(
    paths: Option<&Map<String, Value>>,
    key: &str,
    default: &Path,
) -> std::result::Result<PathBuf, ConfigError> {
    let path = match paths.and_then(|p| p.get(key)) {
        None | Some(Value::Null) => default.to_path_buf(),
        Some(Value::String(s)) => PathBuf::from(s),
        Some(_) => {
            return Err(ConfigError::InvalidField {
                field: format!("paths.{key}"),
                reason: "expected a string".into(),
            });
        }
    };

    validate_path(&path)?;
    Ok(path)
}

fn validate_path(path: &Path) -> std::result::Result<(), ConfigError> {
    if !path.exists() {
        return Err(ConfigError::PathNotFound {
            path: path.to_path_buf(),
        });
    }
    if !path.is_dir() {
        return Err(ConfigError::NotADirectory {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

fn parse_storages(
    document: &Value,
) -> std::result::Result<BTreeMap<String, StorageInfo>, ConfigError> {
    let members = match document.get("storages") {
        Some(Value::Object(map)) if !map.is_empty() => map,
        _ => return Err(ConfigError::NoStorages),
    };

    let mut storages = BTreeMap::new();
    for (name, entry) in members {
        let entry = entry.as_object().ok_or_else(|| ConfigError::InvalidField {
            field: format!("storages.{name}"),
            reason: "expected an object".into(),
        })?;

        let backend_type = match entry.get("type") {
            None | Some(Value::Null) => {
                tracing::warn!(storage = %name, "Storage has no type; it cannot be instantiated");
                String::new()
            }
            Some(Value::String(s)) => s.clone(),
            Some(_) => {
                return Err(ConfigError::InvalidField {
                    field: format!("storages.{name}.type"),
                    reason: "expected a string".into(),
                });
            }
        };

        let args = match entry.get("args") {
            None | Some(Value::Null) => Value::Object(Map::new()),
            Some(args) => args.clone(),
        };

        tracing::debug!(storage = %name, backend = %backend_type, "Storage configured");
        storages.insert(
            name.clone(),
            StorageInfo {
                backend_type,
                plugin_config: PluginConfig::new(name.clone(), args),
            },
        );
    }

    Ok(storages)
}
