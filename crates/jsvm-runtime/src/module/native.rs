//! Host-defined modules built from plain Rust closures.
//!
//! Functions receive their arguments as host values and return a host value.
//! An `Err` returned by a host function is thrown into the script as an
//! `Error` whose message is `"<function>: <error>"`.

use super::Module;
use crate::convert::{from_js, to_js};
use rquickjs::function::Rest;
use rquickjs::{Ctx, Exception, Function, Object, Value};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

type HostFn = Rc<dyn Fn(Vec<JsonValue>) -> anyhow::Result<JsonValue>>;

/// A module made of named host functions and constant values.
///
/// ```ignore
/// let math = NativeModule::new()
///     .value("pi", json!(3.14159))
///     .function("double", |args| {
///         let n = args.first().and_then(|v| v.as_f64()).unwrap_or(0.0);
///         Ok(json!(n * 2.0))
///     });
/// runtime.register_module("math", &math)?;
/// ```
#[derive(Default, Clone)]
pub struct NativeModule {
    functions: BTreeMap<String, HostFn>,
    values: BTreeMap<String, JsonValue>,
}

impl NativeModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a function. A later function with the same name replaces it.
    pub fn function<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Vec<JsonValue>) -> anyhow::Result<JsonValue> + 'static,
    {
        self.functions.insert(name.into(), Rc::new(f));
        self
    }

    /// Add a constant property.
    pub fn value(mut self, name: impl Into<String>, value: JsonValue) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    /// Names of all functions in the module.
    pub fn function_names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }
}

impl fmt::Debug for NativeModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeModule")
            .field("functions", &self.functions.keys().collect::<Vec<_>>())
            .field("values", &self.values)
            .finish()
    }
}

impl Module for NativeModule {
    fn install<'js>(&self, ctx: &Ctx<'js>) -> rquickjs::Result<Value<'js>> {
        let object = Object::new(ctx.clone())?;

        for (name, value) in &self.values {
            object.set(name.as_str(), to_js(ctx, value)?)?;
        }

        for (name, host_fn) in &self.functions {
            let host_fn = Rc::clone(host_fn);
            let fn_name = name.clone();
            let func = Function::new(
                ctx.clone(),
                move |ctx: Ctx<'js>, args: Rest<Value<'js>>| -> rquickjs::Result<Value<'js>> {
                    let mut host_args = Vec::with_capacity(args.0.len());
                    for arg in &args.0 {
                        let arg = from_js(arg).map_err(|e| {
                            Exception::throw_type(&ctx, &format!("{}: {}", fn_name, e))
                        })?;
                        host_args.push(arg);
                    }

                    match host_fn(host_args) {
                        Ok(result) => to_js(&ctx, &result),
                        Err(e) => Err(Exception::throw_message(
                            &ctx,
                            &format!("{}: {:#}", fn_name, e),
                        )),
                    }
                },
            )?;
            object.set(name.as_str(), func)?;
        }

        Ok(object.into_value())
    }
}
