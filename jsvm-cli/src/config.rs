//! CLI configuration.
//!
//! `[log]` sets the default log level and `[runtime]` is handed to every
//! runtime the CLI builds.

use anyhow::{Context, Result};
use jsvm_runtime::{LogLevel, RuntimeConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main CLI configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
    /// Options applied to every runtime the CLI builds
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    /// Default: "warn"
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

/// File name looked up inside the user config directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Written on first use so the options are discoverable.
const DEFAULT_CONFIG: &str = r#"# jsvm Configuration

[log]
# Log level: trace, debug, info, warn, error
# RUST_LOG overrides this when set.
# Default: "warn"
level = "warn"

[runtime]
# Function called by `jsvm run` when --function is not given
# Default: "main"
entry_point = "main"

[runtime.builtins]
# Bind the `console` module (log, info, warn, error, debug, trace)
console = true

# Bind the `regex` module (test, find, findAll, captures, replaceAll)
regex = true
"#;

impl Config {
    /// Read and validate a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("cannot read config {}", path.display()))?;
        let config: Config = toml::from_str(&text)
            .with_context(|| format!("invalid config {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Load the per-user config, writing the commented default on first use.
    pub fn load_default() -> Result<Self> {
        let path = Self::default_config_path()?;
        if !path.exists() {
            Self::create_default_file(&path)?;
        }
        Self::load(path)
    }

    /// `$XDG_CONFIG_HOME/jsvm/config.toml` on Linux, the platform's config
    /// directory elsewhere.
    pub fn default_config_path() -> Result<PathBuf> {
        directories::ProjectDirs::from("", "", "jsvm")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
            .context("no home directory for the jsvm config")
    }

    pub fn create_default_file(path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("cannot create {}", dir.display()))?;
        }
        fs::write(path, DEFAULT_CONFIG)
            .with_context(|| format!("cannot write {}", path.display()))?;

        tracing::info!(path = %path.display(), "Wrote default jsvm config");
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.log_level()?;

        if self.runtime.entry_point.trim().is_empty() {
            anyhow::bail!("runtime.entry_point cannot be empty");
        }

        Ok(())
    }

    /// Parsed log level
    pub fn log_level(&self) -> Result<LogLevel> {
        self.log
            .level
            .parse::<LogLevel>()
            .map_err(|e| anyhow::anyhow!("Invalid log level: {}", e))
    }
}
