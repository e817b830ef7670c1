//! The utility namespace available to binding expressions.
//!
//! These are the only callable names in the expression language. Each helper
//! is total over its argument count contract - `get` in particular never
//! fails, it simply yields `null` for anything it cannot reach.

use super::ExprError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{SecondsFormat, Utc};
use rand::Rng;
use serde_json::Value;
use uuid::Uuid;

/// Dispatches a whitelisted utility call.
///
/// # Supported functions
///
/// - `get(target, "dot.path" [, default])` - safe nested lookup; `null` (or
///   the default) when any step is missing
/// - `uuid()` - a fresh v4 UUID string
/// - `timestamp()` - current Unix timestamp in seconds
/// - `datetime(format)` - current datetime, `"iso8601"` or `"rfc1123"`
/// - `random_int(min, max)` - uniform integer in `[min, max]`
/// - `to_base64(value)` - base64 of a string, or of the JSON serialization
///   of any other value
pub fn call(name: &str, args: &[Value]) -> Result<Value, ExprError> {
    match name {
        "get" => get(args),
        "uuid" => {
            expect_args(name, args, 0)?;
            Ok(Value::String(Uuid::new_v4().to_string()))
        }
        "timestamp" => {
            expect_args(name, args, 0)?;
            Ok(Value::from(Utc::now().timestamp()))
        }
        "datetime" => datetime(args),
        "random_int" => random_int(args),
        "to_base64" => to_base64(args),
        other => Err(ExprError::Eval(format!("'{}' is not a function", other))),
    }
}

fn expect_args(name: &str, args: &[Value], count: usize) -> Result<(), ExprError> {
    if args.len() != count {
        return Err(ExprError::Eval(format!(
            "{}() takes {} argument(s) but {} were given",
            name,
            count,
            args.len()
        )));
    }
    Ok(())
}

/// Safe nested lookup: `get(target, "a.b[0].c")`.
fn get(args: &[Value]) -> Result<Value, ExprError> {
    let (target, path, default) = match args {
        [target, path] => (target, path, None),
        [target, path, default] => (target, path, Some(default)),
        _ => {
            return Err(ExprError::Eval(format!(
                "get() takes 2 or 3 arguments but {} were given",
                args.len()
            )))
        }
    };
    let path = path.as_str().ok_or_else(|| {
        ExprError::Eval("get() path argument must be a string".to_string())
    })?;

    let mut current = target;
    for step in split_path(path) {
        current = match (current, &step) {
            (Value::Object(map), PathStep::Key(key)) => match map.get(key.as_str()) {
                Some(value) => value,
                None => return Ok(resolved_default(default)),
            },
            (Value::Array(items), PathStep::Index(index)) => match items.get(*index) {
                Some(value) => value,
                None => return Ok(resolved_default(default)),
            },
            _ => return Ok(resolved_default(default)),
        };
    }

    if current.is_null() {
        return Ok(resolved_default(default));
    }
    Ok(current.clone())
}

fn resolved_default(default: Option<&Value>) -> Value {
    default.cloned().unwrap_or(Value::Null)
}

enum PathStep {
    Key(String),
    Index(usize),
}

// Splits "a.b[0].c" into its key/index steps. Malformed bracket text is
// treated as a key so the lookup stays total.
fn split_path(path: &str) -> Vec<PathStep> {
    let mut steps = Vec::new();
    for part in path.split('.') {
        if part.is_empty() {
            continue;
        }
        let mut rest = part;
        if let Some(bracket) = rest.find('[') {
            if bracket > 0 {
                steps.push(PathStep::Key(rest[..bracket].to_string()));
            }
            rest = &rest[bracket..];
            while let Some(stripped) = rest.strip_prefix('[') {
                match stripped.find(']') {
                    Some(end) => {
                        let token = &stripped[..end];
                        match token.parse::<usize>() {
                            Ok(index) => steps.push(PathStep::Index(index)),
                            Err(_) => steps.push(PathStep::Key(
                                token.trim_matches(|c| c == '"' || c == '\'').to_string(),
                            )),
                        }
                        rest = &stripped[end + 1..];
                    }
                    None => {
                        steps.push(PathStep::Key(rest.to_string()));
                        rest = "";
                    }
                }
            }
            if !rest.is_empty() {
                steps.push(PathStep::Key(rest.to_string()));
            }
        } else {
            steps.push(PathStep::Key(rest.to_string()));
        }
    }
    steps
}

fn datetime(args: &[Value]) -> Result<Value, ExprError> {
    expect_args("datetime", args, 1)?;
    let format = args[0].as_str().ok_or_else(|| {
        ExprError::Eval("datetime() format argument must be a string".to_string())
    })?;
    let now = Utc::now();
    match format {
        "rfc1123" => Ok(Value::String(now.to_rfc2822())),
        "iso8601" => Ok(Value::String(
            now.to_rfc3339_opts(SecondsFormat::Millis, true),
        )),
        other => Err(ExprError::Eval(format!(
            "Unknown datetime format: {}. Use 'rfc1123' or 'iso8601'",
            other
        ))),
    }
}

fn random_int(args: &[Value]) -> Result<Value, ExprError> {
    expect_args("random_int", args, 2)?;
    let min = integer_arg("random_int", &args[0])?;
    let max = integer_arg("random_int", &args[1])?;
    if min > max {
        return Err(ExprError::Eval(format!(
            "random_int() requires min <= max, got {} and {}",
            min, max
        )));
    }
    let mut rng = rand::thread_rng();
    Ok(Value::from(rng.gen_range(min..=max)))
}

fn integer_arg(name: &str, value: &Value) -> Result<i64, ExprError> {
    value.as_i64().ok_or_else(|| {
        ExprError::Eval(format!("{}() arguments must be integers, got {}", name, value))
    })
}

fn to_base64(args: &[Value]) -> Result<Value, ExprError> {
    expect_args("to_base64", args, 1)?;
    let encoded = match &args[0] {
        Value::String(text) => STANDARD.encode(text),
        other => STANDARD.encode(other.to_string()),
    };
    Ok(Value::String(encoded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_nested_path() {
        let target = json!({"data": {"items": [{"name": "Bruno"}]}});
        let result = call("get", &[target, json!("data.items[0].name")]).unwrap();
        assert_eq!(result, json!("Bruno"));
    }

    #[test]
    fn test_get_missing_path_yields_null() {
        let target = json!({"data": {}});
        assert_eq!(
            call("get", &[target.clone(), json!("data.absent.deeper")]).unwrap(),
            Value::Null
        );
        assert_eq!(call("get", &[Value::Null, json!("anything")]).unwrap(), Value::Null);
    }

    #[test]
    fn test_get_with_default() {
        let target = json!({"a": 1});
        assert_eq!(
            call("get", &[target, json!("b"), json!("fallback")]).unwrap(),
            json!("fallback")
        );
    }

    #[test]
    fn test_get_non_string_path_is_an_error() {
        assert!(call("get", &[json!({}), json!(1)]).is_err());
    }

    #[test]
    fn test_uuid_shape() {
        let value = call("uuid", &[]).unwrap();
        let text = value.as_str().unwrap();
        assert_eq!(text.len(), 36);
        assert_eq!(text.chars().filter(|&c| c == '-').count(), 4);
    }

    #[test]
    fn test_timestamp_is_a_plausible_integer() {
        let value = call("timestamp", &[]).unwrap();
        let ts = value.as_i64().unwrap();
        // After 2020-01-01 in any environment running these tests.
        assert!(ts > 1_577_836_800);
    }

    #[test]
    fn test_datetime_formats() {
        let iso = call("datetime", &[json!("iso8601")]).unwrap();
        assert!(iso.as_str().unwrap().contains('T'));

        let rfc = call("datetime", &[json!("rfc1123")]).unwrap();
        assert!(rfc.as_str().unwrap().contains(','));

        assert!(call("datetime", &[json!("stardate")]).is_err());
    }

    #[test]
    fn test_random_int_range() {
        for _ in 0..50 {
            let value = call("random_int", &[json!(1), json!(100)]).unwrap();
            let n = value.as_i64().unwrap();
            assert!((1..=100).contains(&n));
        }
        assert!(call("random_int", &[json!(5), json!(1)]).is_err());
    }

    #[test]
    fn test_to_base64() {
        assert_eq!(
            call("to_base64", &[json!("user:pass")]).unwrap(),
            json!("dXNlcjpwYXNz")
        );
        // Non-strings are encoded from their JSON serialization.
        assert_eq!(call("to_base64", &[json!(42)]).unwrap(), json!("NDI="));
    }

    #[test]
    fn test_unknown_function() {
        let err = call("fetch", &[]).unwrap_err();
        assert_eq!(err, ExprError::Eval("'fetch' is not a function".to_string()));
    }

    #[test]
    fn test_wrong_arity() {
        assert!(call("uuid", &[json!(1)]).is_err());
        assert!(call("get", &[json!(1)]).is_err());
        assert!(call("datetime", &[]).is_err());
    }
}
