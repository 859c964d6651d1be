//! Errors raised while encoding or decoding a heartbeat.
//!
//! Every error is scoped to a single message. The transport decides whether
//! to drop, log or retry; nothing here is fatal to the process. Unknown enum
//! ordinals are not errors, they decode to `Unrecognized`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WireError {
    /// Structural or wire-type mismatch, or a value outside its legal range.
    #[error("malformed heartbeat payload: {reason}")]
    MalformedPayload {
        reason: String,
        #[source]
        source: Option<prost::DecodeError>,
    },

    /// A field the contract requires was absent after decode.
    #[error("required field {message}.{field} (tag {tag}) is missing")]
    RequiredFieldMissing {
        message: &'static str,
        field: &'static str,
        tag: u32,
    },

    /// Payload or frame exceeds the configured limit.
    #[error("payload of {len} bytes exceeds limit of {max} bytes")]
    PayloadTooLarge { len: usize, max: usize },
}

impl WireError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedPayload {
            reason: reason.into(),
            source: None,
        }
    }
}

impl From<prost::DecodeError> for WireError {
    fn from(err: prost::DecodeError) -> Self {
        Self::MalformedPayload {
            reason: err.to_string(),
            source: Some(err),
        }
    }
}
