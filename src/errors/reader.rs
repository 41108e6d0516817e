//! Error types for mailbox reading operations.
//!
//! This module provides the error type for the pagination and content
//! retrieval operations of [`MailboxReader`](crate::MailboxReader).

use super::{ExecutorError, MsgIdError};

/// Errors that can occur while listing or retrieving mailbox content.
///
/// Content corruption is not an error: it is reported as
/// [`MessageContent::Corrupted`](crate::MessageContent::Corrupted).
///
/// # Examples
///
/// ```rust,ignore
/// use ever_mailbox::{ReaderError, ListRequest, Direction};
///
/// match reader.list(request).await {
///     Ok(events) => println!("Fetched {} events", events.len()),
///     Err(ReaderError::MalformedBound { bound }) => {
///         eprintln!("Caller passed a `{bound}` bound without a cursor");
///     }
///     Err(ReaderError::Executor(e)) => eprintln!("All providers failed: {e}"),
///     Err(e) => eprintln!("Other error: {e}"),
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    /// A pagination bound is missing its cursor.
    #[error("Malformed `{bound}` bound: cursor is required")]
    MalformedBound {
        /// Which bound was malformed (`from` or `to`)
        bound: &'static str,
    },

    /// No contract with this id is registered.
    #[error("Unknown contract id {id}")]
    UnknownContract {
        /// The contract id looked up
        id: u16,
    },

    /// The message id could not be decoded.
    #[error("Invalid message id: {0}")]
    MsgId(#[from] MsgIdError),

    /// Every provider binding failed.
    #[error("Query execution failed: {0}")]
    Executor(#[from] ExecutorError),
}

impl ReaderError {
    pub(crate) fn malformed_bound(bound: &'static str) -> Self {
        ReaderError::MalformedBound { bound }
    }
}
