// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Cursor pagination over a contract's external messages
//!
//! The log source returns at most [`MAX_PAGE_SIZE`] events per request, so
//! listings are assembled page by page. Pages are anchored on the logical
//! time of the last event seen and de-duplicated by cursor: many events can
//! share one logical time, so the anchor is inclusive and cursors already
//! returned are filtered out. Events already returned at the anchor's
//! logical time come back first, so each continuation asks for that many
//! extra events. A tie group larger than [`MAX_PAGE_SIZE`] cannot be drained
//! this way; the anchor then moves past it with a warning.
//!
//! The `to` bound is matched by cursor identity: the page is cut at the
//! event carrying `to`'s cursor, and that event and everything after it are
//! excluded.

use std::collections::HashSet;

use tracing::{debug, warn, Instrument};

use super::query::{parse_page, PageQuery};
use super::transport_attempt_error;
use crate::config::constants::MAX_PAGE_SIZE;
use crate::decoder::AbiDecoder;
use crate::errors::{AttemptError, ReaderError};
use crate::executor::QueryExecutor;
use crate::spans;
use crate::types::bound::{Direction, PageBound, QueryBound, Window};
use crate::types::wire::WireEvent;

/// What to list
///
/// # Example
///
/// ```
/// use ever_mailbox::{Direction, ListRequest, LogicalTime, PageBound, QueryBound};
///
/// let request = ListRequest::new("0:01", Direction::Desc)
///     .counterparty(":02")
///     .from(PageBound::exclusive(QueryBound::new("c9", LogicalTime::new(9))))
///     .limit(20);
/// assert_eq!(request.limit, Some(20));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    pub direction: Direction,
    /// Contract whose external messages are listed
    pub contract_address: String,
    /// Only messages sent to this destination
    pub counterparty: Option<String>,
    pub from: Option<PageBound>,
    pub to: Option<PageBound>,
    /// `None` lists until the source is exhausted
    pub limit: Option<usize>,
}

impl ListRequest {
    pub fn new(contract_address: impl Into<String>, direction: Direction) -> Self {
        Self {
            direction,
            contract_address: contract_address.into(),
            counterparty: None,
            from: None,
            to: None,
            limit: None,
        }
    }

    #[must_use]
    pub fn counterparty(mut self, destination: impl Into<String>) -> Self {
        self.counterparty = Some(destination.into());
        self
    }

    #[must_use]
    pub fn from(mut self, bound: PageBound) -> Self {
        self.from = Some(bound);
        self
    }

    #[must_use]
    pub fn to(mut self, bound: PageBound) -> Self {
        self.to = Some(bound);
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn validate(&self) -> Result<(), ReaderError> {
        if self.from.as_ref().is_some_and(|b| b.bound.cursor.is_empty()) {
            return Err(ReaderError::malformed_bound("from"));
        }
        if self.to.as_ref().is_some_and(|b| b.bound.cursor.is_empty()) {
            return Err(ReaderError::malformed_bound("to"));
        }
        Ok(())
    }
}

/// Drives page requests through a [`QueryExecutor`]
#[derive(Debug)]
pub struct Paginator<'a, D> {
    executor: &'a QueryExecutor<D>,
    page_size: usize,
}

impl<'a, D: AbiDecoder> Paginator<'a, D> {
    /// `page_size` is clamped to `1..=`[`MAX_PAGE_SIZE`]
    pub fn new(executor: &'a QueryExecutor<D>, page_size: usize) -> Self {
        Self {
            executor,
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// List events in `request.direction` within its bounds
    ///
    /// # Errors
    ///
    /// - [`ReaderError::MalformedBound`] before any request if a bound has
    ///   no cursor
    /// - [`ReaderError::Executor`] if a page cannot be fetched from any
    ///   provider binding
    pub async fn list(&self, request: &ListRequest) -> Result<Vec<WireEvent>, ReaderError> {
        request.validate()?;

        let span = spans::list_events(
            &request.contract_address,
            request.direction,
            request.limit,
        );
        self.list_pages(request).instrument(span).await
    }

    async fn list_pages(&self, request: &ListRequest) -> Result<Vec<WireEvent>, ReaderError> {
        let direction = request.direction;
        let window = Window {
            direction,
            from: request.from.clone(),
            to: request.to.clone(),
        };

        let mut events: Vec<WireEvent> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut anchor = request.from.clone();
        let mut page_number = 0usize;

        loop {
            let remaining = request.limit.map(|limit| limit.saturating_sub(events.len()));
            if remaining == Some(0) {
                break;
            }
            let wanted = remaining.map_or(self.page_size, |r| r.min(self.page_size));
            let overlap = anchor
                .as_ref()
                .filter(|anchor| anchor.inclusive)
                .map_or(0, |anchor| tied_with(&events, anchor));
            let requested = (overlap + wanted).min(MAX_PAGE_SIZE);
            page_number += 1;

            let query = PageQuery {
                contract: &request.contract_address,
                counterparty: request.counterparty.as_deref(),
                direction,
                from: anchor.as_ref(),
                to: request.to.as_ref(),
                limit: requested,
            };
            let page = self
                .fetch_page(&query)
                .instrument(spans::fetch_page(page_number, requested))
                .await?;

            let full = page.len() >= requested;
            let last = page.last().map(QueryBound::from);
            let mut added = 0usize;
            let mut reached_to = false;

            for event in page {
                if request.to.as_ref().is_some_and(|to| to.bound.matches(&event)) {
                    reached_to = true;
                    break;
                }

                if !window.contains(event.created_lt) {
                    debug!(cursor = event.cursor(), lt = %event.created_lt, "Dropping event outside window");
                    continue;
                }
                if events
                    .last()
                    .is_some_and(|prev| direction.precedes(event.created_lt, prev.created_lt))
                {
                    warn!(cursor = event.cursor(), lt = %event.created_lt, "Dropping out-of-order event");
                    continue;
                }
                if !seen.insert(event.cursor().to_string()) {
                    continue;
                }

                events.push(event);
                added += 1;
                if request.limit.is_some_and(|limit| events.len() >= limit) {
                    break;
                }
            }

            debug!(
                page = page_number,
                overlap = overlap,
                added = added,
                total = events.len(),
                full = full,
                "Fetched page"
            );

            if reached_to || !full {
                break;
            }
            let Some(last) = last else {
                break;
            };
            anchor = Some(if added == 0 {
                warn!(
                    lt = %last.logical_time,
                    requested = requested,
                    "Page yielded no new events, moving past its logical time"
                );
                PageBound::exclusive(last)
            } else {
                PageBound::inclusive(last)
            });
        }

        Ok(events)
    }

    async fn fetch_page(&self, query: &PageQuery<'_>) -> Result<Vec<WireEvent>, ReaderError> {
        let request = query.to_request();

        let page = self
            .executor
            .operation(|attempt| {
                let request = request.clone();
                async move {
                    let data = attempt
                        .binding
                        .query(&request)
                        .await
                        .map_err(transport_attempt_error)?;
                    parse_page(&data).map_err(AttemptError::retryable)
                }
            })
            .await?;
        Ok(page)
    }
}

/// Number of listed events sharing the anchor's logical time
///
/// `events` is ordered, so they form its tail.
fn tied_with(events: &[WireEvent], anchor: &PageBound) -> usize {
    events
        .iter()
        .rev()
        .take_while(|event| event.created_lt == anchor.logical_time())
        .count()
}
