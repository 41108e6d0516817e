//! Span creation helpers for ever-mailbox operations.
//!
//! Telemetry is kept apart from business logic: instead of `#[instrument]`
//! attributes, each instrumented operation has a span helper here.
//!
//! Usage pattern:
//! ```rust,ignore
//! pub async fn my_operation(&self, param: Type) -> Result<T> {
//!     let span = spans::my_operation(param_value);
//!     async move {
//!         // Business logic here
//!     }
//!     .instrument(span)
//!     .await
//! }
//! ```

use tracing::{Level, Span};

use crate::msg_id::MsgId;
use crate::types::bound::Direction;

/// Create span for one GraphQL call.
///
/// `duration_ms` is recorded by the logging service once the call completes.
#[inline]
pub(crate) fn gql_call(endpoint: &str, operation: &str) -> Span {
    tracing::debug_span!(
        "ever_mailbox.gql_call",
        endpoint = %endpoint,
        operation = %operation,
        duration_ms = tracing::field::Empty,
    )
}

/// Create span for an endpoint selection.
///
/// Children: probe_endpoint spans (one per candidate per round)
#[inline]
pub(crate) fn select_endpoint(candidates: usize) -> Span {
    tracing::debug_span!("ever_mailbox.select_endpoint", candidates = candidates)
}

#[inline]
pub(crate) fn probe_endpoint(endpoint: &str, round: u32) -> Span {
    tracing::trace_span!("ever_mailbox.probe_endpoint", endpoint = %endpoint, round = round)
}

/// Create span for a query executed against the provider binding list.
#[inline]
pub(crate) fn executor_operation(bindings: usize) -> Span {
    tracing::debug_span!("ever_mailbox.executor_operation", bindings = bindings)
}

/// Create span for a paginated listing.
///
/// Parent: list_messages span when listing a mailbox
/// Children: fetch_page spans
#[inline]
pub(crate) fn list_events(contract: &str, direction: Direction, limit: Option<usize>) -> Span {
    tracing::span!(
        Level::INFO,
        "ever_mailbox.list_events",
        contract = %contract,
        direction = ?direction,
        limit = ?limit,
    )
}

#[inline]
pub(crate) fn fetch_page(page: usize, requested: usize) -> Span {
    tracing::trace_span!("ever_mailbox.fetch_page", page = page, requested = requested)
}

/// Create span for listing a recipient's or feed's messages.
#[inline]
pub(crate) fn list_messages(contract_id: u16, destination: &str) -> Span {
    tracing::span!(
        Level::INFO,
        "ever_mailbox.list_messages",
        contract_id = contract_id,
        destination = %destination,
    )
}

/// Create span for fetching and reassembling a message's content.
#[inline]
pub(crate) fn retrieve_content(msg_id: &MsgId) -> Span {
    tracing::span!(
        Level::INFO,
        "ever_mailbox.retrieve_content",
        msg_id = %msg_id,
        contract_id = msg_id.contract_id,
    )
}
