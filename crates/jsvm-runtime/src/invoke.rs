//! Function lookup and protected invocation.
//!
//! Functions are resolved by name on every call. A script that rebinds a
//! global between calls changes what the next call runs.

use crate::convert::display_js;
use crate::error::{RuntimeError, RuntimeResult};
use rquickjs::function::Rest;
use rquickjs::{CatchResultExt, CaughtError, Ctx, Function, Value};
use std::any::Any;
use tracing::debug;

/// A resolved script function, consumed by its single invocation.
pub(crate) struct ScriptFunction<'js> {
    name: String,
    func: Function<'js>,
}

/// Resolve `name` in the global scope of `ctx`.
pub(crate) fn locate_function<'js>(ctx: &Ctx<'js>, name: &str) -> RuntimeResult<ScriptFunction<'js>> {
    let not_found = || RuntimeError::FunctionNotFound {
        name: name.to_string(),
    };

    let value = ctx.globals().get::<_, Value>(name).catch(ctx).map_err(|e| {
        debug!("Lookup of '{}' faulted: {}", name, caught_message(e));
        not_found()
    })?;

    if value.is_undefined() {
        return Err(not_found());
    }

    let type_name = format!("{:?}", value.type_of()).to_lowercase();
    match value.into_function() {
        Some(func) => Ok(ScriptFunction {
            name: name.to_string(),
            func,
        }),
        None => Err(RuntimeError::Export {
            name: name.to_string(),
            reason: format!("value of type {} is not callable", type_name),
        }),
    }
}

impl<'js> ScriptFunction<'js> {
    /// Call the function with already converted arguments.
    ///
    /// Anything the script throws comes back as `FunctionRuntime`.
    pub(crate) fn invoke(self, ctx: &Ctx<'js>, args: Vec<Value<'js>>) -> RuntimeResult<Value<'js>> {
        let name = self.name;
        self.func
            .call::<_, Value>((Rest(args),))
            .catch(ctx)
            .map_err(|e| RuntimeError::FunctionRuntime {
                name,
                message: caught_message(e),
            })
    }
}

/// Render a caught interpreter fault as a plain message.
///
/// Error objects render as `"<name>: <message>"`; any other thrown value is
/// rendered the way `console` would print it.
pub(crate) fn caught_message(err: CaughtError<'_>) -> String {
    match err {
        CaughtError::Exception(exception) => {
            let message = exception.message().unwrap_or_default();
            let kind = exception
                .as_object()
                .get::<_, Option<String>>("name")
                .ok()
                .flatten();
            match kind {
                Some(kind) if message.is_empty() => kind,
                Some(kind) => format!("{}: {}", kind, message),
                None => message,
            }
        }
        CaughtError::Value(value) => display_js(&value),
        CaughtError::Error(error) => error.to_string(),
    }
}

/// Extract the message from a panic payload.
pub(crate) fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("host panic: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("host panic: {}", s)
    } else {
        "host panic".to_string()
    }
}
