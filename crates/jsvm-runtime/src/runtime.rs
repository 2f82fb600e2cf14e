//! The script runtime.
//!
//! A [`Runtime`] owns one QuickJS interpreter, the script it was built from,
//! and a logger slot shared with its modules. Construction either produces a
//! ready runtime (modules bound, top-level code executed) or an error; there
//! is no half-built state visible to the host.
//!
//! A runtime is single-threaded and not `Send`. Callers serialize their calls;
//! independent runtimes can live on separate threads.

use crate::config::{RuntimeConfig, INLINE_SCRIPT_NAME};
use crate::convert::{args_to_js, translate, ConvertFault};
use crate::error::{RuntimeError, RuntimeResult};
use crate::invoke::{caught_message, locate_function, panic_message};
use crate::loader::load_script_file;
use crate::logger::{Logger, LoggerHandle, TracingLogger};
use crate::module::{ConsoleModule, Module, RegexModule, CONSOLE_MODULE, REGEX_MODULE};
use rquickjs::{CatchResultExt, Context, Ctx, Value};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// An embedded script with its interpreter and registered modules.
pub struct Runtime {
    context: Context,
    _engine: rquickjs::Runtime,
    script: String,
    config: RuntimeConfig,
    logger: LoggerHandle,
}

impl Runtime {
    /// Build a runtime from script text with default configuration.
    pub fn new(script: impl Into<String>) -> RuntimeResult<Self> {
        Self::with_config(script, RuntimeConfig::default())
    }

    /// Build a runtime from script text.
    ///
    /// Creates the interpreter, binds the enabled built-in modules and runs
    /// the script's top-level code.
    pub fn with_config(script: impl Into<String>, config: RuntimeConfig) -> RuntimeResult<Self> {
        let logger = Arc::new(TracingLogger::new(config.script_name.clone()));
        Self::with_logger(script, config, logger)
    }

    /// Build a runtime whose logger is in place before top-level code runs.
    pub fn with_logger(
        script: impl Into<String>,
        config: RuntimeConfig,
        logger: Arc<dyn Logger>,
    ) -> RuntimeResult<Self> {
        let script = script.into();
        let script_name = config.script_name.clone();
        let init_err = |reason: String| RuntimeError::Initialization {
            script: script_name.clone(),
            reason,
        };

        let engine = rquickjs::Runtime::new().map_err(|e| init_err(e.to_string()))?;
        let context = Context::full(&engine).map_err(|e| init_err(e.to_string()))?;
        let logger = LoggerHandle::new(logger);

        let runtime = Self {
            context,
            _engine: engine,
            script,
            config,
            logger,
        };

        runtime
            .register_builtins()
            .map_err(|e| init_err(e.to_string()))?;
        runtime.execute_script()?;

        info!(
            "Loaded script {} ({} bytes)",
            runtime.config.script_name,
            runtime.script.len()
        );
        Ok(runtime)
    }

    /// Build a runtime from a script file with default configuration.
    pub fn from_file(path: impl AsRef<Path>) -> RuntimeResult<Self> {
        Self::from_file_with_config(path, RuntimeConfig::default())
    }

    /// Build a runtime from a script file.
    ///
    /// The path must name an existing regular file. Scripts without a
    /// configured name are named after the path; a configured name is kept,
    /// and construction errors carry both as `"{name} ({path})"`.
    pub fn from_file_with_config(
        path: impl AsRef<Path>,
        mut config: RuntimeConfig,
    ) -> RuntimeResult<Self> {
        let path = path.as_ref();
        let script = load_script_file(path)?;

        if config.script_name == INLINE_SCRIPT_NAME {
            config.script_name = path.display().to_string();
            return Self::with_config(script, config);
        }

        Self::with_config(script, config).map_err(|err| match err {
            RuntimeError::ScriptExecution { script, message } => RuntimeError::ScriptExecution {
                script: format!("{} ({})", script, path.display()),
                message,
            },
            RuntimeError::Initialization { script, reason } => RuntimeError::Initialization {
                script: format!("{} ({})", script, path.display()),
                reason,
            },
            other => other,
        })
    }

    fn register_builtins(&self) -> RuntimeResult<()> {
        if self.config.builtins.console {
            self.register_module(CONSOLE_MODULE, &ConsoleModule::new(self.logger_handle()))?;
        }
        if self.config.builtins.regex {
            self.register_module(REGEX_MODULE, &RegexModule::new())?;
        }
        Ok(())
    }

    fn execute_script(&self) -> RuntimeResult<()> {
        let script_err = |message: String| RuntimeError::ScriptExecution {
            script: self.config.script_name.clone(),
            message,
        };

        self.protected(|ctx| {
            ctx.eval::<(), _>(self.script.as_str())
                .catch(&ctx)
                .map_err(|e| script_err(caught_message(e)))
        })
        .unwrap_or_else(|panic| Err(script_err(panic)))
    }

    /// Run `f` inside the interpreter, turning a host panic into `Err`.
    fn protected<R, F>(&self, f: F) -> Result<R, String>
    where
        F: for<'js> FnOnce(Ctx<'js>) -> R,
    {
        panic::catch_unwind(AssertUnwindSafe(|| self.context.with(f))).map_err(panic_message)
    }

    /// Bind `module` into the global namespace under `name`.
    ///
    /// An existing binding with the same name is replaced.
    pub fn register_module<M: Module>(&self, name: &str, module: &M) -> RuntimeResult<()> {
        let registration_err = |reason: String| RuntimeError::ModuleRegistration {
            name: name.to_string(),
            reason,
        };

        self.protected(|ctx| {
            let value = module
                .install(&ctx)
                .catch(&ctx)
                .map_err(|e| registration_err(caught_message(e)))?;
            ctx.globals()
                .set(name, value)
                .catch(&ctx)
                .map_err(|e| registration_err(caught_message(e)))
        })
        .unwrap_or_else(|panic| Err(registration_err(panic)))?;

        debug!(script = %self.config.script_name, "Registered module '{}'", name);
        Ok(())
    }

    /// Bind a serializable host value under `name`.
    ///
    /// Property names are the value's serde field names.
    pub fn register_value<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> RuntimeResult<()> {
        let value = serde_json::to_value(value).map_err(|e| RuntimeError::ModuleRegistration {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        self.register_module(name, &value)
    }

    /// Call the configured entry point (`main` by default).
    pub fn run(&self, args: &[JsonValue]) -> RuntimeResult<JsonValue> {
        self.run_func(&self.config.entry_point, args)
    }

    /// Call the global function `name` with `args`.
    ///
    /// With no arguments a single `undefined` is passed, so the function
    /// always receives at least one argument. Script code that throws while
    /// the result is read (a getter, a proxy trap) is reported as
    /// `FunctionRuntime`, like a throw from the function itself.
    pub fn run_func(&self, name: &str, args: &[JsonValue]) -> RuntimeResult<JsonValue> {
        debug!(script = %self.config.script_name, "Calling function {}", name);

        let result = self
            .protected(|ctx| {
                let mut js_args = args_to_js(&ctx, args).catch(&ctx).map_err(|e| {
                    RuntimeError::Conversion(format!(
                        "arguments for {}: {}",
                        name,
                        caught_message(e)
                    ))
                })?;
                if js_args.is_empty() {
                    js_args.push(Value::new_undefined(ctx.clone()));
                }

                let function = locate_function(&ctx, name)?;
                let value = function.invoke(&ctx, js_args)?;
                translate(&value).map_err(|fault| match fault {
                    ConvertFault::Thrown(message) => RuntimeError::FunctionRuntime {
                        name: name.to_string(),
                        message,
                    },
                    ConvertFault::Unsupported(reason) => RuntimeError::Conversion(reason),
                })
            })
            .unwrap_or_else(|panic| {
                Err(RuntimeError::FunctionRuntime {
                    name: name.to_string(),
                    message: panic,
                })
            });

        if let Err(e) = &result {
            debug!(script = %self.config.script_name, "Function {} failed: {}", name, e);
        }
        result
    }

    /// Evaluate more source against the global scope and return its
    /// completion value.
    pub fn eval(&self, source: &str) -> RuntimeResult<JsonValue> {
        let script_err = |message: String| RuntimeError::ScriptExecution {
            script: self.config.script_name.clone(),
            message,
        };

        self.protected(|ctx| {
            let value = ctx
                .eval::<Value, _>(source)
                .catch(&ctx)
                .map_err(|e| script_err(caught_message(e)))?;
            translate(&value).map_err(|fault| match fault {
                ConvertFault::Thrown(message) => script_err(message),
                ConvertFault::Unsupported(reason) => RuntimeError::Conversion(reason),
            })
        })
        .unwrap_or_else(|panic| Err(script_err(panic)))
    }

    /// The script text this runtime was built from.
    pub fn script(&self) -> &str {
        &self.script
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// The current logger.
    pub fn logger(&self) -> Arc<dyn Logger> {
        self.logger.get()
    }

    /// Replace the logger used by `console` and other holders of the handle.
    pub fn set_logger(&self, logger: Arc<dyn Logger>) -> &Self {
        self.logger.set(logger);
        self
    }

    /// Shared logger slot, for modules that write to the runtime's logger.
    pub fn logger_handle(&self) -> LoggerHandle {
        self.logger.clone()
    }

    /// The underlying interpreter context.
    pub fn context(&self) -> &Context {
        &self.context
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("config", &self.config)
            .field("script_len", &self.script.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_run_main() {
        let runtime = Runtime::new("function main(a, b) { return a + b; }").unwrap();
        assert_eq!(runtime.run(&[json!(3), json!(4)]).unwrap(), json!(7));
    }

    #[test]
    fn test_custom_entry_point() {
        let config = RuntimeConfig::default().with_entry_point("start");
        let runtime = Runtime::with_config("function start() { return 'go'; }", config).unwrap();
        assert_eq!(runtime.run(&[]).unwrap(), json!("go"));
    }

    #[test]
    fn test_empty_args_pass_single_placeholder() {
        let runtime = Runtime::new(
            "function count() { return [arguments.length, typeof arguments[0]]; }",
        )
        .unwrap();
        assert_eq!(runtime.run_func("count", &[]).unwrap(), json!([1, "undefined"]));
        assert_eq!(runtime.run_func("count", &[json!(1), json!(2)]).unwrap(), json!([2, "number"]));
    }

    #[test]
    fn test_eval_and_accessors() {
        let script = "var counter = 41;";
        let runtime = Runtime::new(script).unwrap();
        assert_eq!(runtime.eval("counter + 1").unwrap(), json!(42));
        assert_eq!(runtime.script(), script);
        assert_eq!(runtime.config().script_name, "<inline>");

        let err = runtime.eval("counter +").unwrap_err();
        assert!(matches!(err, RuntimeError::ScriptExecution { .. }));
    }

    #[test]
    fn test_fault_while_reading_result_is_a_function_fault() {
        let runtime = Runtime::new(
            "function main() { return { get a() { throw new Error('getter boom'); } }; }",
        )
        .unwrap();

        match runtime.run(&[]) {
            Err(RuntimeError::FunctionRuntime { name, message }) => {
                assert_eq!(name, "main");
                assert_eq!(message, "Error: getter boom");
            }
            other => panic!("unexpected result: {:?}", other),
        }

        let err = runtime
            .eval("({ get a() { throw new TypeError('eval boom'); } })")
            .unwrap_err();
        assert!(
            matches!(err, RuntimeError::ScriptExecution { ref message, .. } if message == "TypeError: eval boom")
        );
    }

    #[test]
    fn test_host_panic_is_contained() {
        use crate::module::NativeModule;

        let runtime = Runtime::new("function main() { return host.explode(); }").unwrap();
        let module = NativeModule::new().function("explode", |_| panic!("host bug"));
        runtime.register_module("host", &module).unwrap();

        match runtime.run(&[]) {
            Err(RuntimeError::FunctionRuntime { name, message }) => {
                assert_eq!(name, "main");
                assert!(message.contains("host bug"), "message: {}", message);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
