//! Conversion between the JSON `system/info` payload and [`TelemetryRecord`].

use chrono::DateTime;
use serde_json::{Map, Value};
use strum::IntoEnumIterator;
use tracing::{debug, trace};

use crate::data::telemetry::TelemetryRecord;

pub mod envelope;
pub mod error;
pub mod fields;
pub mod number;

pub use error::{DecodeError, EncodeError};
pub use fields::{FieldKind, WireField};
pub use number::NumericPolicy;

use fields::{get_by_key, unknown_keys};
use number::{IntBounds, coerce_integer, describe_value};

/// Decodes and encodes telemetry payloads.
///
/// The default codec is strict: integer fields only accept exact integers and
/// the body must be bare JSON.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TelemetryCodec {
    numeric_policy: NumericPolicy,
    unwrap_envelope: bool,
}

impl TelemetryCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how integer fields treat fractional or out-of-range numbers
    pub fn with_numeric_policy(mut self, policy: NumericPolicy) -> Self {
        self.numeric_policy = policy;
        self
    }

    /// Look for the JSON object inside HTML-wrapped bodies
    pub fn with_envelope_unwrapping(mut self, enabled: bool) -> Self {
        self.unwrap_envelope = enabled;
        self
    }

    pub fn numeric_policy(&self) -> NumericPolicy {
        self.numeric_policy
    }

    pub fn unwraps_envelope(&self) -> bool {
        self.unwrap_envelope
    }

    /// Decode a raw payload into a record.
    ///
    /// The collection timestamp stays unset unless the payload was produced by
    /// [`TelemetryCodec::encode`] with one attached.
    pub fn decode(&self, bytes: &[u8]) -> Result<TelemetryRecord, DecodeError> {
        let object = if self.unwrap_envelope {
            let body = std::str::from_utf8(bytes)
                .map_err(|e| DecodeError::malformed(format!("payload is not UTF-8: {e}")))?;
            envelope::extract_object(body)
                .ok_or_else(|| DecodeError::malformed("no JSON object found in payload"))?
        } else {
            match serde_json::from_slice::<Value>(bytes) {
                Ok(Value::Object(object)) => object,
                Ok(other) => {
                    return Err(DecodeError::malformed(format!(
                        "expected a JSON object, found {}",
                        describe_value(&other)
                    )));
                }
                Err(e) => return Err(DecodeError::malformed(e.to_string())),
            }
        };

        self.decode_object(&object)
    }

    /// Decode an already parsed JSON value, such as the response of a web API client.
    pub fn decode_value(&self, value: &Value) -> Result<TelemetryRecord, DecodeError> {
        match value {
            Value::Object(object) => self.decode_object(object),
            other => Err(DecodeError::malformed(format!(
                "expected a JSON object, found {}",
                describe_value(other)
            ))),
        }
    }

    fn decode_object(&self, object: &Map<String, Value>) -> Result<TelemetryRecord, DecodeError> {
        for key in unknown_keys(object) {
            trace!(key, "ignoring unrecognized payload key");
        }

        let normalized = self.normalize(object)?;
        debug!(
            recognized = normalized.len(),
            total = object.len(),
            policy = %self.numeric_policy,
            "decoded telemetry payload"
        );

        // `normalize` has checked every value against `WireField::kind`, so this
        // only fails if the field table and `TelemetryRecord` disagree.
        serde_json::from_value(Value::Object(normalized))
            .map_err(|e| DecodeError::mismatch("record", "telemetry record", e.to_string()))
    }

    /// Checks every recognized field against its declared kind and rewrites
    /// integers into exact form. Unknown and null keys are dropped.
    fn normalize(&self, object: &Map<String, Value>) -> Result<Map<String, Value>, DecodeError> {
        let mut normalized = Map::new();

        for field in WireField::iter() {
            let Some(value) = get_by_key(object, field) else {
                continue;
            };
            let name = field.wire_name();
            let kind = field.kind();

            let converted = match kind {
                FieldKind::Float if value.is_number() => value.clone(),
                FieldKind::Text if value.is_string() => value.clone(),
                FieldKind::Int32 => {
                    Value::from(coerce_integer(value, IntBounds::I32, self.numeric_policy, name)?)
                }
                FieldKind::Int64 => {
                    Value::from(coerce_integer(value, IntBounds::I64, self.numeric_policy, name)?)
                }
                FieldKind::RejectReasons => self.normalize_reasons(value)?,
                FieldKind::Timestamp => match value.as_str() {
                    Some(text) if DateTime::parse_from_rfc3339(text).is_ok() => value.clone(),
                    _ => return Err(DecodeError::mismatch(name, kind.describe(), describe_value(value))),
                },
                FieldKind::Float | FieldKind::Text => {
                    return Err(DecodeError::mismatch(name, kind.describe(), describe_value(value)));
                }
            };

            normalized.insert(name.to_string(), converted);
        }

        Ok(normalized)
    }

    fn normalize_reasons(&self, value: &Value) -> Result<Value, DecodeError> {
        let field = WireField::SharesRejectedReasons;
        let Value::Array(entries) = value else {
            return Err(DecodeError::mismatch(
                field.wire_name(),
                field.kind().describe(),
                describe_value(value),
            ));
        };

        let mut reasons = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            let path = format!("{}[{index}]", field.wire_name());
            let Value::Object(entry) = entry else {
                return Err(DecodeError::mismatch(path, "rejection reason object", describe_value(entry)));
            };

            let mut reason = Map::new();
            if let Some(message) = entry.get("message").filter(|v| !v.is_null()) {
                if !message.is_string() {
                    return Err(DecodeError::mismatch(
                        format!("{path}.message"),
                        FieldKind::Text.describe(),
                        describe_value(message),
                    ));
                }
                reason.insert("message".to_string(), message.clone());
            }
            if let Some(count) = entry.get("count").filter(|v| !v.is_null()) {
                let count = coerce_integer(
                    count,
                    IntBounds::I32,
                    self.numeric_policy,
                    &format!("{path}.count"),
                )?;
                reason.insert("count".to_string(), Value::from(count));
            }

            reasons.push(Value::Object(reason));
        }

        Ok(Value::Array(reasons))
    }

    /// Encode a record as compact JSON, keys in schema declaration order.
    pub fn encode(&self, record: &TelemetryRecord) -> Result<Vec<u8>, EncodeError> {
        Ok(serde_json::to_vec(record)?)
    }

    /// Like [`TelemetryCodec::encode`] but indented for humans.
    pub fn encode_pretty(&self, record: &TelemetryRecord) -> Result<Vec<u8>, EncodeError> {
        Ok(serde_json::to_vec_pretty(record)?)
    }
}

/// Decode with the default, strict codec.
pub fn decode(bytes: &[u8]) -> Result<TelemetryRecord, DecodeError> {
    TelemetryCodec::default().decode(bytes)
}

/// Encode with the default codec.
pub fn encode(record: &TelemetryRecord) -> Result<Vec<u8>, EncodeError> {
    TelemetryCodec::default().encode(record)
}
