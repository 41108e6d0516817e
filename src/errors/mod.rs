//! Error types for the ever-mailbox library.
//!
//! This module follows a hybrid approach:
//!
//! - **Module-specific errors** for fine-grained handling ([`TransportError`],
//!   [`ExecutorError`], [`ReaderError`], ...)
//! - **Unified error type** ([`MailboxError`]) for convenience when you don't
//!   need to distinguish between error sources
//!
//! # Taxonomy
//!
//! - Transport exhaustion: [`TransportError::NoEndpointAvailable`] and
//!   [`ExecutorError::Exhausted`]. Surfaced to the caller, never retried
//!   beyond the endpoint probing rounds and the provider binding list.
//! - Content corruption: not an error. Reported as
//!   [`MessageContent::Corrupted`](crate::MessageContent::Corrupted) so callers
//!   can tell "absent" from "present but broken".
//! - Contract violations: [`ReaderError::MalformedBound`], [`MsgIdError`],
//!   [`ReaderError::UnknownContract`]. Programmer errors, fatal.
//!
//! # Examples
//!
//! ```rust,ignore
//! use ever_mailbox::{MailboxError, MsgId};
//!
//! async fn fetch(reader: &Reader, raw_id: &str) -> Result<(), MailboxError> {
//!     let id: MsgId = raw_id.parse()?;
//!     let content = reader.retrieve_content(&id).await?;
//!     // Errors automatically convert to MailboxError via From implementations
//!     Ok(())
//! }
//! ```

mod config;
mod decode;
mod executor;
mod msg_id;
mod reader;
mod transport;

pub use config::ConfigError;
pub use decode::DecodeError;
pub use executor::{AttemptError, BindingFailure, BoxError, ExecutorError};
pub use msg_id::MsgIdError;
pub use reader::ReaderError;
pub use transport::TransportError;

/// Unified error type for all ever-mailbox operations.
///
/// All module-specific error types convert to `MailboxError` via `From`
/// implementations, so `?` propagates them naturally.
#[derive(Debug, thiserror::Error)]
pub enum MailboxError {
    /// Error from configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error from the GraphQL transport.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Error from the query executor.
    #[error("Executor error: {0}")]
    Executor(#[from] ExecutorError),

    /// Error from event decoding.
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Error from the message-id codec.
    #[error("Message id error: {0}")]
    MsgId(#[from] MsgIdError),

    /// Error from listing or content retrieval.
    #[error("Reader error: {0}")]
    Reader(#[from] ReaderError),
}
