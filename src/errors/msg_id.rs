//! Error types for the message-id codec.

/// Errors that can occur when decoding an encoded [`MsgId`](crate::MsgId).
///
/// All variants are contract violations: the input was not produced by this
/// codec for this blockchain family. Callers handling ids from several
/// families match on [`MsgIdError::FamilyMismatch`] to skip foreign ids.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum MsgIdError {
    /// The input is not valid base64.
    #[error("Message id is not valid base64: {details}")]
    InvalidEncoding {
        /// Details reported by the base64 decoder
        details: String,
    },

    /// The leading framing bit is not set.
    #[error("Message id framing bit is not set")]
    InvalidFraming,

    /// The id belongs to another blockchain family.
    #[error("Message id family {found:#06b} does not match expected {expected:#06b}")]
    FamilyMismatch {
        /// Family tag this codec accepts
        expected: u8,
        /// Family tag found in the input
        found: u8,
    },

    /// The contract id is not a canonical, in-range varint.
    #[error("Message id contract id is invalid: {details}")]
    InvalidContractId {
        /// Details about what was wrong
        details: String,
    },

    /// The input is too short or too long for the layout.
    #[error("Message id has invalid length: expected {expected} bytes, got {found}")]
    InvalidLength {
        /// Byte length implied by the header
        expected: usize,
        /// Byte length of the input
        found: usize,
    },

    /// Padding bits after the on-chain id are not zero.
    #[error("Message id has non-zero padding")]
    NonZeroPadding,
}
