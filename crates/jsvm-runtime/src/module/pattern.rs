//! The `regex` module.
//!
//! Patterns use the syntax of the `regex` crate, not ECMAScript regular
//! expressions. Every function takes the pattern as its first argument; an
//! invalid pattern throws an `Error` in script code.

use super::Module;
use crate::convert::to_js;
use regex::Regex;
use rquickjs::{Ctx, Exception, Function, Object, Value};
use serde_json::Value as JsonValue;

/// Pattern matching exposed to scripts.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegexModule;

impl RegexModule {
    pub fn new() -> Self {
        Self
    }
}

fn compile(ctx: &Ctx<'_>, pattern: &str) -> rquickjs::Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| Exception::throw_message(ctx, &format!("invalid pattern /{}/: {}", pattern, e)))
}

impl Module for RegexModule {
    fn install<'js>(&self, ctx: &Ctx<'js>) -> rquickjs::Result<Value<'js>> {
        let regex = Object::new(ctx.clone())?;

        regex.set(
            "test",
            Function::new(
                ctx.clone(),
                |ctx: Ctx<'js>, pattern: String, text: String| -> rquickjs::Result<bool> {
                    Ok(compile(&ctx, &pattern)?.is_match(&text))
                },
            )?,
        )?;

        regex.set(
            "find",
            Function::new(
                ctx.clone(),
                |ctx: Ctx<'js>, pattern: String, text: String| -> rquickjs::Result<Value<'js>> {
                    let found = compile(&ctx, &pattern)?
                        .find(&text)
                        .map(|m| JsonValue::from(m.as_str()))
                        .unwrap_or(JsonValue::Null);
                    to_js(&ctx, &found)
                },
            )?,
        )?;

        regex.set(
            "findAll",
            Function::new(
                ctx.clone(),
                |ctx: Ctx<'js>, pattern: String, text: String| -> rquickjs::Result<Vec<String>> {
                    Ok(compile(&ctx, &pattern)?
                        .find_iter(&text)
                        .map(|m| m.as_str().to_string())
                        .collect())
                },
            )?,
        )?;

        regex.set(
            "captures",
            Function::new(
                ctx.clone(),
                |ctx: Ctx<'js>, pattern: String, text: String| -> rquickjs::Result<Value<'js>> {
                    let groups = match compile(&ctx, &pattern)?.captures(&text) {
                        Some(caps) => JsonValue::Array(
                            caps.iter()
                                .map(|g| {
                                    g.map(|m| JsonValue::from(m.as_str()))
                                        .unwrap_or(JsonValue::Null)
                                })
                                .collect(),
                        ),
                        None => JsonValue::Null,
                    };
                    to_js(&ctx, &groups)
                },
            )?,
        )?;

        regex.set(
            "replaceAll",
            Function::new(
                ctx.clone(),
                |ctx: Ctx<'js>,
                 pattern: String,
                 text: String,
                 replacement: String|
                 -> rquickjs::Result<String> {
                    Ok(compile(&ctx, &pattern)?
                        .replace_all(&text, replacement.as_str())
                        .into_owned())
                },
            )?,
        )?;

        Ok(regex.into_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::from_js;
    use rquickjs::{CatchResultExt, Context, Runtime};
    use serde_json::json;

    fn eval_with_regex(source: &str) -> Result<JsonValue, String> {
        let runtime = Runtime::new().unwrap();
        let context = Context::full(&runtime).unwrap();
        context.with(|ctx| {
            let module = RegexModule::new().install(&ctx).unwrap();
            ctx.globals().set("regex", module).unwrap();
            ctx.eval::<Value, _>(source)
                .catch(&ctx)
                .map(|v| from_js(&v).unwrap())
                .map_err(|e| e.to_string())
        })
    }

    #[test]
    fn test_matching() {
        assert_eq!(eval_with_regex(r#"regex.test("^a+$", "aaa")"#), Ok(json!(true)));
        assert_eq!(eval_with_regex(r#"regex.find("\\d+", "ab 12 34")"#), Ok(json!("12")));
        assert_eq!(eval_with_regex(r#"regex.find("\\d+", "none")"#), Ok(JsonValue::Null));
        assert_eq!(
            eval_with_regex(r#"regex.findAll("\\d+", "ab 12 34")"#),
            Ok(json!(["12", "34"]))
        );
    }

    #[test]
    fn test_captures_and_replace() {
        assert_eq!(
            eval_with_regex(r#"regex.captures("(\\w+)@(\\w+)?", "user@")"#),
            Ok(json!(["user@", "user", null]))
        );
        assert_eq!(
            eval_with_regex(r#"regex.replaceAll("(\\w+)=(\\w+)", "a=1 b=2", "$2=$1")"#),
            Ok(json!("1=a 2=b"))
        );
    }

    #[test]
    fn test_invalid_pattern_throws() {
        let err = eval_with_regex(r#"regex.test("(", "x")"#).unwrap_err();
        assert!(err.contains("invalid pattern"), "unexpected error: {}", err);

        let caught = eval_with_regex(
            r#"(function () { try { regex.test("(", "x"); return "no"; } catch (e) { return "caught"; } })()"#,
        );
        assert_eq!(caught, Ok(json!("caught")));
    }
}
