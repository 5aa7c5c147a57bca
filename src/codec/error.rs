use thiserror::Error;

/// Reasons a payload could not be turned into a `TelemetryRecord`.
///
/// Decoding is all-or-nothing, no partial record accompanies either variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The bytes are not a well-formed JSON object.
    #[error("malformed payload: {reason}")]
    MalformedPayload { reason: String },
    /// A recognized field is present but its value cannot become the declared type.
    #[error("field `{field}` expected {expected}, found {found}")]
    FieldTypeMismatch {
        field: String,
        expected: &'static str,
        found: String,
    },
}

impl DecodeError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        DecodeError::MalformedPayload {
            reason: reason.into(),
        }
    }

    pub(crate) fn mismatch(
        field: impl Into<String>,
        expected: &'static str,
        found: impl Into<String>,
    ) -> Self {
        DecodeError::FieldTypeMismatch {
            field: field.into(),
            expected,
            found: found.into(),
        }
    }

    /// The wire name (or nested path) of the offending field, for mismatches.
    pub fn field(&self) -> Option<&str> {
        match self {
            DecodeError::FieldTypeMismatch { field, .. } => Some(field),
            DecodeError::MalformedPayload { .. } => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("failed to serialize telemetry record: {0}")]
    Serialize(#[from] serde_json::Error),
}
