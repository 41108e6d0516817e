//! Error types for ABI event decoding.
//!
//! Decoding is delegated to an external engine; these errors cover both the
//! engine itself and the mapping from decoded fields to typed events.

/// Errors that can occur while turning a message body into a typed event.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The decoding engine failed to load.
    #[error("Decoding engine failed to load: {details}")]
    EngineUnavailable {
        /// Details reported by the engine
        details: String,
    },

    /// The engine rejected the message body.
    #[error("Failed to decode {event} event: {details}")]
    InvalidBody {
        /// Event that was being decoded
        event: String,
        /// Details about why the decode failed
        details: String,
    },

    /// The body did not contain the expected event.
    #[error("Message body is not a {event} event")]
    UnexpectedEvent {
        /// Event that was expected
        event: String,
    },

    /// A decoded field was missing or had the wrong shape.
    #[error("Field `{field}` of {event} event is invalid: {details}")]
    InvalidField {
        /// Event that was being decoded
        event: String,
        /// Field name as emitted by the ABI
        field: String,
        /// Details about what was wrong
        details: String,
    },
}

impl DecodeError {
    /// Create an `InvalidBody` error with details.
    pub fn invalid_body(event: impl Into<String>, details: impl Into<String>) -> Self {
        DecodeError::InvalidBody {
            event: event.into(),
            details: details.into(),
        }
    }

    /// Create an `InvalidField` error with details.
    pub fn invalid_field(
        event: impl Into<String>,
        field: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        DecodeError::InvalidField {
            event: event.into(),
            field: field.into(),
            details: details.into(),
        }
    }
}
