//! Per-component configuration handed to factories.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Configuration blob forwarded to a component factory.
///
/// `args` is never interpreted by the bootstrap layer; each backend decides
/// what it accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginConfig {
    /// The name the component was configured under (e.g. "core")
    pub name: String,

    /// Backend-specific arguments
    #[serde(default = "empty_args")]
    pub args: Value,
}

fn empty_args() -> Value {
    Value::Object(serde_json::Map::new())
}

impl PluginConfig {
    pub fn new(name: impl Into<String>, args: Value) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// A config with an empty argument object.
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name, empty_args())
    }

    /// Look up a single string argument.
    pub fn arg_str(&self, key: &str) -> Option<&str> {
        self.args.get(key).and_then(Value::as_str)
    }
}
