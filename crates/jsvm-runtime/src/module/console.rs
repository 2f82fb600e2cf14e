//! The `console` module.

use super::Module;
use crate::convert::display_js;
use crate::logger::{LogLevel, LoggerHandle};
use rquickjs::function::Rest;
use rquickjs::{Ctx, Function, Object, Value};

const METHODS: [(&str, LogLevel); 6] = [
    ("log", LogLevel::Info),
    ("info", LogLevel::Info),
    ("warn", LogLevel::Warn),
    ("error", LogLevel::Error),
    ("debug", LogLevel::Debug),
    ("trace", LogLevel::Trace),
];

/// Writes script messages to the runtime's current logger.
///
/// Arguments are joined with a single space. Strings are written verbatim,
/// other values as compact JSON.
pub struct ConsoleModule {
    logger: LoggerHandle,
}

impl ConsoleModule {
    pub fn new(logger: LoggerHandle) -> Self {
        Self { logger }
    }
}

impl Module for ConsoleModule {
    fn install<'js>(&self, ctx: &Ctx<'js>) -> rquickjs::Result<Value<'js>> {
        let console = Object::new(ctx.clone())?;

        for (method, level) in METHODS {
            let logger = self.logger.clone();
            let func = Function::new(ctx.clone(), move |args: Rest<Value<'js>>| {
                let line = args.0.iter().map(display_js).collect::<Vec<_>>().join(" ");
                logger.log(level, &line);
            })?;
            console.set(method, func)?;
        }

        Ok(console.into_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::MemoryLogger;
    use rquickjs::{Context, Runtime};
    use std::sync::Arc;

    #[test]
    fn test_console_levels() {
        let memory = Arc::new(MemoryLogger::new());
        let module = ConsoleModule::new(LoggerHandle::new(memory.clone()));

        let runtime = Runtime::new().unwrap();
        let context = Context::full(&runtime).unwrap();
        context.with(|ctx| {
            let console = module.install(&ctx).unwrap();
            ctx.globals().set("console", console).unwrap();
            ctx.eval::<(), _>(
                r#"
                console.log("hello", 42, {a: 1});
                console.warn("careful");
                console.error();
                "#,
            )
            .unwrap();
        });

        assert_eq!(
            memory.records(),
            vec![
                (LogLevel::Info, r#"hello 42 {"a":1}"#.to_string()),
                (LogLevel::Warn, "careful".to_string()),
                (LogLevel::Error, String::new()),
            ]
        );
    }
}
