//! Response body transforms.
//!
//! A response body may carry matcher wrappers describing how loosely a
//! provider's real response has to match. The mock server itself answers
//! with plain example values, so the body is passed through a
//! [`ValueTransform`] once when the response descriptor is built.

use serde_json::{Map, Value};

/// Key marking a matcher wrapper object.
pub const MATCHER_TYPE_KEY: &str = "pactum_type";

/// Pure body -> body transformation applied once per response.
pub trait ValueTransform: Send + Sync {
    fn transform(&self, body: &Value) -> Value;
}

/// Returns the body unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityTransform;

impl ValueTransform for IdentityTransform {
    fn transform(&self, body: &Value) -> Value {
        body.clone()
    }
}

/// Replaces matcher wrappers with their example value.
///
/// `{"pactum_type": "LIKE", "value": {...}}` becomes `{...}`; an `ARRAY_LIKE`
/// or `EACH_LIKE` wrapper becomes a one element array holding the example.
/// Wrappers nested inside the example are resolved too.
#[derive(Debug, Default, Clone, Copy)]
pub struct MatcherValues;

impl ValueTransform for MatcherValues {
    fn transform(&self, body: &Value) -> Value {
        resolve(body)
    }
}

fn resolve(value: &Value) -> Value {
    match value {
        Value::Object(map) => match map.get(MATCHER_TYPE_KEY).and_then(Value::as_str) {
            Some(matcher) => {
                let example = map.get("value").map(resolve).unwrap_or(Value::Null);
                match matcher {
                    "ARRAY_LIKE" | "EACH_LIKE" if !example.is_array() => {
                        Value::Array(vec![example])
                    }
                    _ => example,
                }
            }
            None => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), resolve(v)))
                    .collect::<Map<String, Value>>(),
            ),
        },
        Value::Array(items) => Value::Array(items.iter().map(resolve).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identity_is_a_copy() {
        let body = json!({"id": 1});
        assert_eq!(IdentityTransform.transform(&body), body);
    }

    #[test]
    fn test_like_wrapper_is_unwrapped() {
        let body = json!({
            "id": {"pactum_type": "LIKE", "value": 42},
            "name": "snow"
        });
        assert_eq!(MatcherValues.transform(&body), json!({"id": 42, "name": "snow"}));
    }

    #[test]
    fn test_each_like_becomes_array() {
        let body = json!({
            "pactum_type": "EACH_LIKE",
            "value": {"id": {"pactum_type": "LIKE", "value": 1}}
        });
        assert_eq!(MatcherValues.transform(&body), json!([{"id": 1}]));
    }

    #[test]
    fn test_regex_wrapper_keeps_example() {
        let body = json!([{"pactum_type": "REGEX", "value": "2020-01-01", "pattern": "\\d+"}]);
        assert_eq!(MatcherValues.transform(&body), json!(["2020-01-01"]));
    }
}
