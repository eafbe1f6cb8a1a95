//! Helpers over the dynamic document value.
//!
//! Documents are plain `serde_json::Value` trees. `Value::Null` doubles as the
//! absent marker: a missing key and an explicit `null` look the same to every
//! rule.

use serde_json::{Number, Value};

/// Returns true when the value is the absent marker.
pub fn is_absent(value: &Value) -> bool {
    value.is_null()
}

/// Structural equality with numbers compared by their numeric value.
///
/// `serde_json` keeps integers and floats apart (`1 != 1.0`), which would make
/// a coerced number stop matching the literal a caller wrote.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).map_or(false, |y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

/// Float representation of a number value, if it can be carried by JSON.
pub(crate) fn float_value(n: f64) -> Option<Value> {
    Number::from_f64(n).map(Value::Number)
}

/// Compact rendering of a list of candidate values, e.g. `["on","off"]`.
pub(crate) fn render_list(values: &[Value]) -> String {
    Value::Array(values.to_vec()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_is_null() {
        assert!(is_absent(&Value::Null));
        assert!(!is_absent(&json!(false)));
        assert!(!is_absent(&json!("")));
    }

    #[test]
    fn integers_equal_floats() {
        assert!(values_equal(&json!(1), &json!(1.0)));
        assert!(!values_equal(&json!(1), &json!(1.5)));
        assert!(values_equal(&json!([1, "a"]), &json!([1.0, "a"])));
        assert!(values_equal(&json!({"a": 2}), &json!({"a": 2.0})));
        assert!(!values_equal(&json!({"a": 2}), &json!({"b": 2})));
    }

    #[test]
    fn mixed_kinds_never_equal() {
        assert!(!values_equal(&json!("1"), &json!(1)));
        assert!(!values_equal(&json!(true), &json!(1)));
    }

    #[test]
    fn float_value_rejects_non_finite() {
        assert!(float_value(f64::NAN).is_none());
        assert!(float_value(f64::INFINITY).is_none());
        assert_eq!(float_value(1.5), Some(json!(1.5)));
    }
}
