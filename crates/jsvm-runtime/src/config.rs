//! Runtime configuration.

use serde::{Deserialize, Serialize};

/// Name used for scripts constructed from text.
pub const INLINE_SCRIPT_NAME: &str = "<inline>";

/// Default function invoked by [`Runtime::run`](crate::Runtime::run).
pub const DEFAULT_ENTRY_POINT: &str = "main";

/// Options applied when a runtime is constructed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Label used in errors and log fields.
    pub script_name: String,

    /// Function called by `run`.
    pub entry_point: String,

    /// Which built-in modules to bind.
    pub builtins: BuiltinsConfig,
}

/// Built-in module switches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BuiltinsConfig {
    /// Bind `console` (log, info, warn, error, debug, trace).
    pub console: bool,

    /// Bind `regex` (test, find, findAll, captures, replaceAll).
    pub regex: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            script_name: INLINE_SCRIPT_NAME.to_string(),
            entry_point: DEFAULT_ENTRY_POINT.to_string(),
            builtins: BuiltinsConfig::default(),
        }
    }
}

impl Default for BuiltinsConfig {
    fn default() -> Self {
        Self {
            console: true,
            regex: true,
        }
    }
}

impl RuntimeConfig {
    /// Set the script label.
    pub fn with_script_name(mut self, name: impl Into<String>) -> Self {
        self.script_name = name.into();
        self
    }

    /// Set the function called by `run`.
    pub fn with_entry_point(mut self, name: impl Into<String>) -> Self {
        self.entry_point = name.into();
        self
    }

    /// Disable every built-in module.
    pub fn without_builtins(mut self) -> Self {
        self.builtins = BuiltinsConfig {
            console: false,
            regex: false,
        };
        self
    }
}
