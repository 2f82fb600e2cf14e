//! Logger reference shared between a runtime and its host.
//!
//! The host owns the logger and may swap it at any time through
//! [`LoggerHandle::set`]; modules holding a clone of the handle pick up the
//! replacement on their next write.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, RwLock};

/// Log level for script-originated messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level: {}", other)),
        }
    }
}

/// Sink for messages written by scripts.
pub trait Logger: Send + Sync {
    fn log(&self, level: LogLevel, message: &str);
}

/// Default logger forwarding to `tracing`.
#[derive(Debug, Clone)]
pub struct TracingLogger {
    script: String,
}

impl TracingLogger {
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
        }
    }
}

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Trace => tracing::trace!(script = %self.script, "{}", message),
            LogLevel::Debug => tracing::debug!(script = %self.script, "{}", message),
            LogLevel::Info => tracing::info!(script = %self.script, "{}", message),
            LogLevel::Warn => tracing::warn!(script = %self.script, "{}", message),
            LogLevel::Error => tracing::error!(script = %self.script, "{}", message),
        }
    }
}

/// Swappable, shared logger slot.
#[derive(Clone)]
pub struct LoggerHandle {
    inner: Arc<RwLock<Arc<dyn Logger>>>,
}

impl LoggerHandle {
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(logger)),
        }
    }

    /// Current logger.
    pub fn get(&self) -> Arc<dyn Logger> {
        // A poisoned slot still holds a valid logger.
        match self.inner.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Replace the logger for every holder of this handle.
    pub fn set(&self, logger: Arc<dyn Logger>) {
        match self.inner.write() {
            Ok(mut guard) => *guard = logger,
            Err(poisoned) => *poisoned.into_inner() = logger,
        }
    }

    pub fn log(&self, level: LogLevel, message: &str) {
        self.get().log(level, message);
    }
}

impl fmt::Debug for LoggerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerHandle").finish_non_exhaustive()
    }
}

/// Logger that keeps every message in memory.
///
/// Useful for hosts that want to surface script output themselves, and in
/// tests.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    records: RwLock<Vec<(LogLevel, String)>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded messages.
    pub fn records(&self) -> Vec<(LogLevel, String)> {
        match self.records.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Logger for MemoryLogger {
    fn log(&self, level: LogLevel, message: &str) {
        match self.records.write() {
            Ok(mut guard) => guard.push((level, message.to_string())),
            Err(poisoned) => poisoned.into_inner().push((level, message.to_string())),
        }
    }
}
