//! # Value Model Semantics
//!
//! The engine consumes already-parsed `serde_json::Value` trees. This
//! module pins down the semantics JSON Schema needs on top of them:
//!
//! - **Type names.** [`PrimitiveType`] is the closed set of names the
//!   `type` keyword may use.
//! - **Integer-ness.** `i64`/`u64` numbers are integers. An `f64` is an
//!   integer iff its remainder against `1` is exactly zero, so `2.0` is an
//!   integer and `2.5` is not. No epsilon is applied.
//! - **Numeric order and equality** by mathematical value across the
//!   integer and floating representations (`1 == 1.0`).
//! - **Structural equality** for `enum`/`const`, independent of object
//!   key order.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use thiserror::Error;

/// A `type` keyword value that names no JSON Schema type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown type name '{0}'")]
pub struct UnknownType(pub String);

/// The seven JSON Schema type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    /// `null`
    Null,
    /// `true` / `false`
    Boolean,
    /// Whole numbers, including floating literals with zero fraction.
    Integer,
    /// Any number.
    Number,
    /// UTF-8 strings.
    String,
    /// Ordered sequences.
    Array,
    /// Key/value maps.
    Object,
}

impl PrimitiveType {
    /// Returns the keyword spelling of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }

    /// The most specific type of `value`. Integral numbers report
    /// [`PrimitiveType::Integer`].
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(n) if is_integer(n) => Self::Integer,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }

    /// True if `value` is an instance of this type. `number` accepts
    /// integers; `integer` accepts only integral numbers.
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Number, Value::Number(_)) => true,
            (Self::Integer, Value::Number(n)) => is_integer(n),
            _ => Self::of(value) == *self,
        }
    }
}

impl FromStr for PrimitiveType {
    type Err = UnknownType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "null" => Ok(Self::Null),
            "boolean" => Ok(Self::Boolean),
            "integer" => Ok(Self::Integer),
            "number" => Ok(Self::Number),
            "string" => Ok(Self::String),
            "array" => Ok(Self::Array),
            "object" => Ok(Self::Object),
            other => Err(UnknownType(other.to_string())),
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// True if `n` is a whole number.
pub fn is_integer(n: &Number) -> bool {
    if n.is_i64() || n.is_u64() {
        return true;
    }
    n.as_f64().is_some_and(|f| f % 1.0 == 0.0)
}

fn as_i128(n: &Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}

/// Compare two numbers by mathematical value.
///
/// Exact when both are stored as integers; otherwise compared as `f64`.
pub fn compare_numbers(a: &Number, b: &Number) -> Option<Ordering> {
    match (as_i128(a), as_i128(b)) {
        (Some(x), Some(y)) => Some(x.cmp(&y)),
        _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
    }
}

/// True if `value` is an integer multiple of `divisor`.
///
/// Integral operands use an exact remainder. Otherwise the quotient must
/// be within `f64::EPSILON` (relative) of a whole number, which accepts
/// `0.3 / 0.1` despite binary rounding.
pub fn is_multiple_of(value: &Number, divisor: &Number) -> bool {
    if let (Some(v), Some(d)) = (as_i128(value), as_i128(divisor)) {
        return d != 0 && v % d == 0;
    }
    let (Some(v), Some(d)) = (value.as_f64(), divisor.as_f64()) else {
        return false;
    };
    let quotient = v / d;
    if !quotient.is_finite() {
        return false;
    }
    (quotient - quotient.round()).abs() <= f64::EPSILON * quotient.abs().max(1.0)
}

/// Structural equality as JSON Schema defines it for `enum` and `const`.
pub fn json_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => compare_numbers(x, y) == Some(Ordering::Equal),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| json_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| json_equal(x, y)))
        }
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn num(v: Value) -> Number {
        match v {
            Value::Number(n) => n,
            other => panic!("not a number: {other}"),
        }
    }

    #[test]
    fn test_integer_boundary() {
        assert!(is_integer(&num(json!(2))));
        assert!(is_integer(&num(json!(2.0))));
        assert!(is_integer(&num(json!(-0.0))));
        assert!(!is_integer(&num(json!(2.5))));
        assert!(!is_integer(&num(json!(1e-300))));
        assert!(is_integer(&num(json!(u64::MAX))));
    }

    #[test]
    fn test_type_of_and_matches() {
        assert_eq!(PrimitiveType::of(&json!(2.0)), PrimitiveType::Integer);
        assert_eq!(PrimitiveType::of(&json!(2.5)), PrimitiveType::Number);
        assert!(PrimitiveType::Number.matches(&json!(7)));
        assert!(PrimitiveType::Integer.matches(&json!(7.0)));
        assert!(!PrimitiveType::Integer.matches(&json!(7.1)));
        assert!(!PrimitiveType::String.matches(&json!(null)));
        assert!(PrimitiveType::Object.matches(&json!({})));
    }

    #[test]
    fn test_type_names_round_trip_through_from_str() {
        for name in ["null", "boolean", "integer", "number", "string", "array", "object"] {
            let t: PrimitiveType = name.parse().unwrap();
            assert_eq!(t.as_str(), name);
        }
        assert_eq!(
            "float".parse::<PrimitiveType>(),
            Err(UnknownType("float".to_string()))
        );
    }

    #[test]
    fn test_compare_numbers_across_representations() {
        assert_eq!(compare_numbers(&num(json!(1)), &num(json!(1.0))), Some(Ordering::Equal));
        assert_eq!(compare_numbers(&num(json!(-1)), &num(json!(u64::MAX))), Some(Ordering::Less));
        assert_eq!(compare_numbers(&num(json!(2.5)), &num(json!(2))), Some(Ordering::Greater));
    }

    #[test]
    fn test_multiple_of() {
        assert!(is_multiple_of(&num(json!(10)), &num(json!(5))));
        assert!(!is_multiple_of(&num(json!(7)), &num(json!(5))));
        assert!(is_multiple_of(&num(json!(0.3)), &num(json!(0.1))));
        assert!(is_multiple_of(&num(json!(-4.5)), &num(json!(1.5))));
        assert!(!is_multiple_of(&num(json!(0.35)), &num(json!(0.1))));
        assert!(!is_multiple_of(&num(json!(1e308)), &num(json!(1e-308))));
    }

    #[test]
    fn test_json_equal_numbers_and_key_order() {
        assert!(json_equal(&json!(1), &json!(1.0)));
        assert!(json_equal(&json!({"a": 1, "b": [1, 2]}), &json!({"b": [1.0, 2], "a": 1})));
        assert!(!json_equal(&json!([1, 2]), &json!([2, 1])));
        assert!(!json_equal(&json!({"a": 1}), &json!({"a": 1, "b": 2})));
        assert!(!json_equal(&json!("1"), &json!(1)));
        assert!(!json_equal(&json!(false), &json!(0)));
    }
}
