//! Host <-> script value conversion.
//!
//! Host values are `serde_json::Value`. Host structs reach the script through
//! `serde::Serialize`, so the property names a script sees are exactly the
//! serde field names (including any `#[serde(rename = "...")]`).
//!
//! Script values map back as follows:
//!
//! | Script                         | Host                     |
//! |--------------------------------|--------------------------|
//! | `undefined`, `null`            | `null`                   |
//! | boolean                        | bool                     |
//! | number                         | number (`null` if NaN/∞) |
//! | string                         | string                   |
//! | Array                          | array                    |
//! | BigInt                         | number if it fits `i64`  |
//! | Date                           | ISO-8601 string          |
//! | function, symbol               | `null`                   |
//! | any other object               | own enumerable props     |
//!
//! Objects whose state is internal (Promise, Map, Set, RegExp) have no own
//! enumerable properties and come back as `{}`. A BigInt outside the `i64`
//! range is a `Conversion` error rather than a truncated number.

use crate::error::{RuntimeError, RuntimeResult};
use crate::invoke::caught_message;
use rquickjs::function::This;
use rquickjs::{Array, CatchResultExt, CaughtError, Coerced, Ctx, Function, IntoJs, Object, Value};
use serde_json::{Map, Number, Value as JsonValue};

/// Maximum nesting depth followed when converting script values.
pub const MAX_DEPTH: usize = 64;

/// Convert a host value into a script value.
pub fn to_js<'js>(ctx: &Ctx<'js>, value: &JsonValue) -> rquickjs::Result<Value<'js>> {
    match value {
        JsonValue::Null => Ok(Value::new_null(ctx.clone())),
        JsonValue::Bool(b) => Ok(Value::new_bool(ctx.clone(), *b)),
        JsonValue::Number(n) => Ok(number_to_js(ctx, n)),
        JsonValue::String(s) => s.as_str().into_js(ctx),
        JsonValue::Array(items) => {
            let array = Array::new(ctx.clone())?;
            for (i, item) in items.iter().enumerate() {
                array.set(i, to_js(ctx, item)?)?;
            }
            Ok(array.into_value())
        }
        JsonValue::Object(map) => {
            let object = Object::new(ctx.clone())?;
            for (key, item) in map {
                object.set(key.as_str(), to_js(ctx, item)?)?;
            }
            Ok(object.into_value())
        }
    }
}

fn number_to_js<'js>(ctx: &Ctx<'js>, n: &Number) -> Value<'js> {
    if let Some(i) = n.as_i64().and_then(|i| i32::try_from(i).ok()) {
        return Value::new_int(ctx.clone(), i);
    }
    Value::new_float(ctx.clone(), n.as_f64().unwrap_or(f64::NAN))
}

/// Convert a slice of host values into script values.
pub fn args_to_js<'js>(ctx: &Ctx<'js>, args: &[JsonValue]) -> rquickjs::Result<Vec<Value<'js>>> {
    args.iter().map(|arg| to_js(ctx, arg)).collect()
}

/// Convert a script value into a host value.
///
/// Every failure, including a fault thrown by a getter while the value is
/// read, is reported as `Conversion`.
pub fn from_js(value: &Value<'_>) -> RuntimeResult<JsonValue> {
    translate(value).map_err(|fault| match fault {
        ConvertFault::Thrown(message) | ConvertFault::Unsupported(message) => {
            RuntimeError::Conversion(message)
        }
    })
}

/// Why a script value could not be translated.
#[derive(Debug)]
pub(crate) enum ConvertFault {
    /// Script code (a getter, a proxy trap) threw while the value was read.
    Thrown(String),
    /// The value has no host representation.
    Unsupported(String),
}

/// Convert a script value into a host value, keeping thrown faults apart.
pub(crate) fn translate(value: &Value<'_>) -> Result<JsonValue, ConvertFault> {
    from_js_at(value.ctx(), value, 0)
}

fn from_js_at<'js>(
    ctx: &Ctx<'js>,
    value: &Value<'js>,
    depth: usize,
) -> Result<JsonValue, ConvertFault> {
    if depth > MAX_DEPTH {
        return Err(ConvertFault::Unsupported(format!(
            "value nested deeper than {} levels (cyclic?)",
            MAX_DEPTH
        )));
    }

    if value.is_undefined() || value.is_null() {
        return Ok(JsonValue::Null);
    }
    if let Some(b) = value.as_bool() {
        return Ok(JsonValue::Bool(b));
    }
    if let Some(i) = value.as_int() {
        return Ok(JsonValue::from(i));
    }
    if let Some(f) = value.as_float() {
        return Ok(float_to_json(f));
    }
    if let Some(s) = value.as_string() {
        let s = s.to_string().catch(ctx).map_err(fault)?;
        return Ok(JsonValue::String(s));
    }
    if value.as_big_int().is_some() {
        let Coerced(digits) = value.get::<Coerced<String>>().catch(ctx).map_err(fault)?;
        return digits.parse::<i64>().map(JsonValue::from).map_err(|_| {
            ConvertFault::Unsupported(format!("BigInt {} does not fit in i64", digits))
        });
    }
    if value.is_function() || value.is_symbol() {
        return Ok(JsonValue::Null);
    }
    if let Some(array) = value.as_array() {
        let mut items = Vec::with_capacity(array.len());
        for item in array.iter::<Value>() {
            let item = item.catch(ctx).map_err(fault)?;
            items.push(from_js_at(ctx, &item, depth + 1)?);
        }
        return Ok(JsonValue::Array(items));
    }
    if let Some(object) = value.as_object() {
        if is_date(ctx, object) {
            return date_to_json(ctx, object);
        }
        let mut map = Map::new();
        for prop in object.props::<String, Value>() {
            let (key, item) = prop.catch(ctx).map_err(fault)?;
            map.insert(key, from_js_at(ctx, &item, depth + 1)?);
        }
        return Ok(JsonValue::Object(map));
    }

    Ok(JsonValue::Null)
}

fn is_date<'js>(ctx: &Ctx<'js>, object: &Object<'js>) -> bool {
    match ctx.globals().get::<_, Object>("Date") {
        Ok(date) => object.is_instance_of(&date),
        Err(_) => false,
    }
}

/// Dates become ISO-8601 strings; an invalid date becomes `null`.
fn date_to_json<'js>(ctx: &Ctx<'js>, date: &Object<'js>) -> Result<JsonValue, ConvertFault> {
    let call = |method: &str| -> Result<Value<'js>, ConvertFault> {
        date.get::<_, Function>(method)
            .and_then(|f| f.call::<_, Value>((This(date.clone()),)))
            .catch(ctx)
            .map_err(fault)
    };

    let time = call("getTime")?;
    if time.as_number().map_or(true, f64::is_nan) {
        return Ok(JsonValue::Null);
    }
    let iso = call("toISOString")?;
    match iso.as_string() {
        Some(s) => s.to_string().catch(ctx).map(JsonValue::String).map_err(fault),
        None => Ok(JsonValue::Null),
    }
}

/// JS numbers have no int/float split; integral floats come back as integers.
///
/// `i64::MAX as f64` rounds up to 2^63, which is already out of range, so the
/// upper bound is exclusive.
fn float_to_json(f: f64) -> JsonValue {
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        return JsonValue::from(f as i64);
    }
    Number::from_f64(f)
        .map(JsonValue::Number)
        .unwrap_or(JsonValue::Null)
}

fn fault(err: CaughtError<'_>) -> ConvertFault {
    match err {
        CaughtError::Error(e) => ConvertFault::Unsupported(e.to_string()),
        thrown => ConvertFault::Thrown(caught_message(thrown)),
    }
}

/// Render a script value the way `console` prints it.
///
/// Strings are written verbatim, `undefined` as `undefined`, functions as
/// `[function]` and everything else as compact JSON.
pub fn display_js(value: &Value<'_>) -> String {
    if value.is_undefined() {
        return "undefined".to_string();
    }
    if value.is_function() {
        return "[function]".to_string();
    }
    if let Some(s) = value.as_string() {
        return s.to_string().unwrap_or_default();
    }
    match from_js(value) {
        Ok(JsonValue::String(s)) => s,
        Ok(json) => json.to_string(),
        Err(e) => format!("[unprintable: {}]", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rquickjs::{Context, Runtime};
    use serde_json::json;

    fn with_ctx<F: FnOnce(Ctx<'_>)>(f: F) {
        let runtime = Runtime::new().unwrap();
        let context = Context::full(&runtime).unwrap();
        context.with(f);
    }

    #[test]
    fn test_host_object_round_trips_through_script() {
        with_ctx(|ctx| {
            let host = json!({"name": "widget", "tags": ["a", "b"], "count": 3, "ok": true});
            let value = to_js(&ctx, &host).unwrap();
            ctx.globals().set("input", value).unwrap();

            let name: String = ctx.eval("input.name + ':' + input.tags.length").unwrap();
            assert_eq!(name, "widget:2");

            let back = from_js(&ctx.globals().get::<_, Value>("input").unwrap()).unwrap();
            assert_eq!(back, host);
        });
    }

    #[test]
    fn test_script_numbers() {
        with_ctx(|ctx| {
            let v: Value = ctx.eval("1.5 + 1.5").unwrap();
            assert_eq!(from_js(&v).unwrap(), json!(3));

            let v: Value = ctx.eval("0.25").unwrap();
            assert_eq!(from_js(&v).unwrap(), json!(0.25));

            let v: Value = ctx.eval("NaN").unwrap();
            assert_eq!(from_js(&v).unwrap(), JsonValue::Null);

            let v = to_js(&ctx, &json!(5_000_000_000i64)).unwrap();
            assert_eq!(from_js(&v).unwrap(), json!(5_000_000_000i64));
        });
    }

    #[test]
    fn test_integral_floats_past_i64_stay_floats() {
        with_ctx(|ctx| {
            let v: Value = ctx.eval("2 ** 63").unwrap();
            assert_eq!(from_js(&v).unwrap(), json!(9.223372036854776e18));

            let v: Value = ctx.eval("-(2 ** 63)").unwrap();
            assert_eq!(from_js(&v).unwrap(), json!(i64::MIN));
        });
    }

    #[test]
    fn test_big_int_range() {
        with_ctx(|ctx| {
            let v: Value = ctx.eval("2n ** 40n").unwrap();
            assert_eq!(from_js(&v).unwrap(), json!(1_099_511_627_776i64));

            let v: Value = ctx.eval("-9223372036854775808n").unwrap();
            assert_eq!(from_js(&v).unwrap(), json!(i64::MIN));

            let v: Value = ctx.eval("2n ** 64n + 5n").unwrap();
            match from_js(&v) {
                Err(RuntimeError::Conversion(message)) => {
                    assert!(message.contains("18446744073709551621"), "message: {}", message)
                }
                other => panic!("unexpected result: {:?}", other),
            }
        });
    }

    #[test]
    fn test_dates_become_iso_strings() {
        with_ctx(|ctx| {
            let v: Value = ctx
                .eval("({at: new Date(0), bad: new Date(NaN), pending: Promise.resolve(1)})")
                .unwrap();
            assert_eq!(
                from_js(&v).unwrap(),
                json!({"at": "1970-01-01T00:00:00.000Z", "bad": null, "pending": {}})
            );
        });
    }

    #[test]
    fn test_throwing_getter_keeps_message() {
        with_ctx(|ctx| {
            let v: Value = ctx
                .eval("({ get a() { throw new Error('getter boom'); } })")
                .unwrap();
            match translate(&v) {
                Err(ConvertFault::Thrown(message)) => assert_eq!(message, "Error: getter boom"),
                other => panic!("unexpected result: {:?}", other),
            }

            // The fault was taken out of the context; later work is unaffected.
            let ok: i32 = ctx.eval("1 + 1").unwrap();
            assert_eq!(ok, 2);
        });
    }

    #[test]
    fn test_no_value_markers_become_null() {
        with_ctx(|ctx| {
            for src in ["undefined", "null", "(function () {})", "Symbol('s')"] {
                let v: Value = ctx.eval(src).unwrap();
                assert_eq!(from_js(&v).unwrap(), JsonValue::Null, "source: {}", src);
            }
        });
    }

    #[test]
    fn test_cyclic_object_is_rejected() {
        with_ctx(|ctx| {
            let v: Value = ctx.eval("var a = {}; a.self = a; a").unwrap();
            let err = from_js(&v).unwrap_err();
            assert!(matches!(err, RuntimeError::Conversion(_)));
        });
    }

    #[test]
    fn test_display_js() {
        with_ctx(|ctx| {
            let v: Value = ctx.eval("'plain'").unwrap();
            assert_eq!(display_js(&v), "plain");

            let v: Value = ctx.eval("({a: [1, 2]})").unwrap();
            assert_eq!(display_js(&v), r#"{"a":[1,2]}"#);

            let v: Value = ctx.eval("undefined").unwrap();
            assert_eq!(display_js(&v), "undefined");
        });
    }
}
