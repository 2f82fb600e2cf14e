//! Host capabilities exposed to scripts.
//!
//! A module is any host value that can install itself into an interpreter
//! context. The runtime binds the installed value as a global, so a module
//! registered as `"console"` is reachable from script code as `console`.
//!
//! Built-in modules:
//! - [`ConsoleModule`] (`console`) - writes to the runtime's logger
//! - [`RegexModule`] (`regex`) - pattern matching backed by the `regex` crate

pub mod console;
pub mod native;
pub mod pattern;

pub use console::ConsoleModule;
pub use native::NativeModule;
pub use pattern::RegexModule;

use crate::convert::to_js;
use rquickjs::{Ctx, Value};

/// Global name of the console module.
pub const CONSOLE_MODULE: &str = "console";

/// Global name of the regex module.
pub const REGEX_MODULE: &str = "regex";

/// A capability that can be bound into a script's global namespace.
pub trait Module {
    /// Build the script value for this module inside `ctx`.
    fn install<'js>(&self, ctx: &Ctx<'js>) -> rquickjs::Result<Value<'js>>;
}

/// Plain data is a module: it is converted and bound as-is.
impl Module for serde_json::Value {
    fn install<'js>(&self, ctx: &Ctx<'js>) -> rquickjs::Result<Value<'js>> {
        to_js(ctx, self)
    }
}

impl<M: Module> Module for &M {
    fn install<'js>(&self, ctx: &Ctx<'js>) -> rquickjs::Result<Value<'js>> {
        (**self).install(ctx)
    }
}
