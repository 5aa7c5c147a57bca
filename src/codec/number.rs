use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};
use tracing::debug;

use super::error::DecodeError;

/// How decode treats numbers that do not fit an integer field exactly.
///
/// Float fields are unaffected, any JSON number converts to `f64`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum NumericPolicy {
    /// Fractional or out-of-range values fail the decode.
    #[default]
    Reject,
    /// Fractional values are truncated toward zero, out-of-range values still fail.
    Truncate,
    /// Fractional values are truncated toward zero and out-of-range values are
    /// clamped to the bounds of the field.
    Saturate,
}

/// Inclusive range of an integer field.
#[derive(Debug, Clone, Copy)]
pub(crate) struct IntBounds {
    pub min: i64,
    pub max: i64,
    pub name: &'static str,
}

impl IntBounds {
    pub const I32: IntBounds = IntBounds {
        min: i32::MIN as i64,
        max: i32::MAX as i64,
        name: "32-bit integer",
    };

    pub const I64: IntBounds = IntBounds {
        min: i64::MIN,
        max: i64::MAX,
        name: "64-bit integer",
    };
}

/// Short description of a JSON value for error messages.
pub(crate) fn describe_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {b}"),
        Value::Number(n) => format!("number {n}"),
        Value::String(s) => format!("string {s:?}"),
        Value::Array(_) => "array".to_string(),
        Value::Object(_) => "object".to_string(),
    }
}

/// Converts a JSON value into an integer within `bounds`, applying `policy`.
pub(crate) fn coerce_integer(
    value: &Value,
    bounds: IntBounds,
    policy: NumericPolicy,
    field: &str,
) -> Result<i64, DecodeError> {
    let Value::Number(number) = value else {
        return Err(DecodeError::mismatch(field, bounds.name, describe_value(value)));
    };

    let out_of_range = |clamped: i64| {
        if policy == NumericPolicy::Saturate {
            debug!(field, original = %number, coerced = clamped, "saturated numeric value");
            Ok(clamped)
        } else {
            Err(DecodeError::mismatch(
                field,
                bounds.name,
                format!("out-of-range number {number}"),
            ))
        }
    };

    if let Some(i) = number.as_i64() {
        return if i < bounds.min {
            out_of_range(bounds.min)
        } else if i > bounds.max {
            out_of_range(bounds.max)
        } else {
            Ok(i)
        };
    }

    if number.as_u64().is_some() {
        // Only reachable for values above i64::MAX.
        return out_of_range(bounds.max);
    }

    let Some(float) = number.as_f64() else {
        return Err(DecodeError::mismatch(field, bounds.name, describe_value(value)));
    };

    let truncated = float.trunc();
    if truncated != float && policy == NumericPolicy::Reject {
        return Err(DecodeError::mismatch(
            field,
            bounds.name,
            format!("fractional number {number}"),
        ));
    }

    if truncated < bounds.min as f64 {
        return out_of_range(bounds.min);
    }
    // `max as f64 + 1.0` is exact for i32 and rounds to 2^63 for i64.
    if truncated >= bounds.max as f64 + 1.0 {
        return out_of_range(bounds.max);
    }

    let coerced = truncated as i64;
    if truncated != float {
        debug!(field, original = float, coerced, "truncated fractional value");
    }
    Ok(coerced)
}
