//! Error types for the jsvm runtime.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building a runtime or calling into a script.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The script path is missing, a directory, or not a regular file.
    #[error("Not a regular file: {}", path.display())]
    NotRegularFile { path: PathBuf },

    /// Reading the script file failed.
    #[error("Failed to read script {}: {source}", path.display())]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A module value could not be bound into the global namespace.
    #[error("Failed to register module '{name}': {reason}")]
    ModuleRegistration { name: String, reason: String },

    /// The interpreter or one of the built-in modules failed to initialize.
    #[error("Runtime initialization failed for {script}: {reason}")]
    Initialization { script: String, reason: String },

    /// The script could not be parsed or its top-level code threw.
    #[error("Script {script} failed: {message}")]
    ScriptExecution { script: String, message: String },

    /// No global binding exists under the requested name.
    #[error("Function <{name}> not found")]
    FunctionNotFound { name: String },

    /// A global binding exists but cannot be called as a function.
    #[error("Function <{name}> cannot be exported: {reason}")]
    Export { name: String, reason: String },

    /// The function threw or otherwise faulted while running.
    #[error("Function {name} run failed - {message}")]
    FunctionRuntime { name: String, message: String },

    /// A value could not be translated between host and script.
    #[error("Value conversion failed: {0}")]
    Conversion(String),
}

impl RuntimeError {
    /// Name of the function an invocation error refers to, if any.
    pub fn function_name(&self) -> Option<&str> {
        match self {
            RuntimeError::FunctionNotFound { name }
            | RuntimeError::Export { name, .. }
            | RuntimeError::FunctionRuntime { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = std::result::Result<T, RuntimeError>;
