//! # jsvm-runtime
//!
//! Embedded JavaScript runtime for host applications.
//!
//! This crate provides:
//! - Script loading from text or a regular file
//! - Module registration into the script's global namespace
//! - Protected invocation of script functions by name
//! - Translation of results into `serde_json::Value`
//!
//! ## Usage
//!
//! ```ignore
//! use jsvm_runtime::Runtime;
//! use serde_json::json;
//!
//! let runtime = Runtime::new("function main(a, b) { return a + b; }")?;
//! assert_eq!(runtime.run(&[json!(3), json!(4)])?, json!(7));
//! ```
//!
//! ## Fault Model
//!
//! Exceptions thrown by script code and panics raised by host callbacks are
//! caught at the call boundary and returned as [`RuntimeError`] values.
//! There is no timeout: a script that never returns blocks its caller.

pub mod config;
pub mod convert;
pub mod error;
mod invoke;
pub mod loader;
pub mod logger;
pub mod module;
pub mod runtime;

pub use config::{BuiltinsConfig, RuntimeConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use loader::load_script_file;
pub use logger::{LogLevel, Logger, LoggerHandle, MemoryLogger, TracingLogger};
pub use module::{ConsoleModule, Module, NativeModule, RegexModule};
pub use runtime::Runtime;

pub use rquickjs;
