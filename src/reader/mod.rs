// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Mailbox reading
//!
//! [`MailboxReader`] is the entry point: it lists a contract's raw events,
//! lists a recipient's or feed's messages, and fetches and reassembles a
//! message's content chunks.
//!
//! # Example
//!
//! ```rust,ignore
//! use ever_mailbox::{Direction, Mailbox, MailboxConfig, MailboxReader, Network};
//!
//! let config = MailboxConfig::for_network(Network::Mainnet);
//! let reader = MailboxReader::from_config(&config, Nekoton::default())?;
//!
//! let inbox = reader
//!     .list_messages(1, Mailbox::Recipient(my_key), Direction::Desc, None, None, Some(20))
//!     .await?;
//! for event in &inbox {
//!     let content = reader.retrieve_and_verify_message_content(event).await?;
//!     println!("{}: {:?}", event.msg_id, content.map(|c| c.is_intact()));
//! }
//! ```

mod pagination;
mod query;

pub use pagination::{ListRequest, Paginator};

use std::sync::Arc;

use tracing::{debug, warn, Instrument};

use crate::config::MailboxConfig;
use crate::content::{reassemble, ContentChunk, CorruptionReason, MessageContent};
use crate::contracts::{
    external_destination, normalize_address, ContractCache, ContractDescriptor, ContractRegistry,
};
use crate::decoder::{AbiDecoder, DecoderHandle};
use crate::errors::{AttemptError, DecodeError, MailboxError, ReaderError, TransportError};
use crate::executor::QueryExecutor;
use crate::msg_id::MsgId;
use crate::provider::{GqlProvider, ProviderBinding};
use crate::spans;
use crate::types::bound::{Direction, PageBound};
use crate::types::mail::{MailEvent, Mailbox};
use crate::types::wire::WireEvent;

/// A rejected query fails the same way on every binding; anything else may
/// be endpoint specific.
fn transport_attempt_error(error: TransportError) -> AttemptError {
    match error {
        TransportError::Graphql { .. } => AttemptError::fatal(error),
        other => AttemptError::retryable(other),
    }
}

/// Reads mailboxes and message content of the registered mailer contracts
#[derive(Debug)]
pub struct MailboxReader<D> {
    executor: QueryExecutor<D>,
    registry: ContractRegistry,
    contracts: ContractCache,
    page_size: usize,
}

impl<D: AbiDecoder> MailboxReader<D> {
    /// Create a reader over explicit provider bindings
    ///
    /// # Errors
    ///
    /// Returns an error if `bindings` is empty or two configured contracts
    /// share an id
    pub fn new(
        config: &MailboxConfig,
        bindings: Vec<Arc<dyn ProviderBinding>>,
        decoder: D,
    ) -> Result<Self, MailboxError> {
        let executor = QueryExecutor::new(bindings, DecoderHandle::new(decoder))?;
        let registry = ContractRegistry::new(config.contracts.clone())?;

        Ok(Self {
            executor,
            registry,
            contracts: ContractCache::new(),
            page_size: config.effective_page_size(),
        })
    }

    /// Create a reader with one HTTP provider over the configured endpoints
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid
    pub fn from_config(config: &MailboxConfig, decoder: D) -> Result<Self, MailboxError> {
        let provider: Arc<dyn ProviderBinding> =
            Arc::new(GqlProvider::http(config.network.to_string(), config)?);
        Self::new(config, vec![provider], decoder)
    }

    #[must_use]
    pub fn executor(&self) -> &QueryExecutor<D> {
        &self.executor
    }

    #[must_use]
    pub fn registry(&self) -> &ContractRegistry {
        &self.registry
    }

    #[must_use]
    pub fn contract_cache(&self) -> &ContractCache {
        &self.contracts
    }

    fn paginator(&self) -> Paginator<'_, D> {
        Paginator::new(&self.executor, self.page_size)
    }

    fn contract(&self, id: u16) -> Result<&ContractDescriptor, ReaderError> {
        self.registry
            .by_id(id)
            .ok_or(ReaderError::UnknownContract { id })
    }

    /// List raw events of a contract
    ///
    /// Events come back ordered by logical time in `request.direction`,
    /// without duplicates, and within the requested bounds.
    ///
    /// # Errors
    ///
    /// See [`Paginator::list`]
    pub async fn list(&self, request: &ListRequest) -> Result<Vec<WireEvent>, ReaderError> {
        self.paginator().list(request).await
    }

    /// List the push (recipient) or broadcast (feed) messages of a mailbox
    ///
    /// `limit` caps the raw events fetched; events that fail to decode are
    /// skipped, so fewer messages may be returned.
    ///
    /// # Errors
    ///
    /// - [`ReaderError::UnknownContract`] if `contract_id` is not registered
    /// - see [`Paginator::list`] for the rest
    pub async fn list_messages(
        &self,
        contract_id: u16,
        mailbox: Mailbox,
        direction: Direction,
        from: Option<PageBound>,
        to: Option<PageBound>,
        limit: Option<usize>,
    ) -> Result<Vec<MailEvent>, ReaderError> {
        let contract = self.contract(contract_id)?;
        let destination = mailbox.destination();
        let span = spans::list_messages(contract_id, &destination);

        async move {
            let mut request = ListRequest::new(contract.address.clone(), direction)
                .counterparty(destination);
            request.from = from;
            request.to = to;
            request.limit = limit;

            let events = self.paginator().list(&request).await?;
            let broadcast = mailbox.is_broadcast();

            let messages = self
                .executor
                .operation(|attempt| {
                    let binding = self.contracts.get(contract, attempt.binding.identity());
                    let events = &events;
                    async move {
                        let messages: Vec<MailEvent> = events
                            .iter()
                            .filter_map(|event| {
                                match binding.decode_mail_event(&*attempt.decoder, event, broadcast) {
                                    Ok(message) => Some(message),
                                    Err(e) => {
                                        warn!(cursor = event.cursor(), error = %e, "Skipping undecodable event");
                                        None
                                    }
                                }
                            })
                            .collect();
                        Ok::<_, AttemptError>(messages)
                    }
                })
                .await?;

            debug!(
                events = events.len(),
                messages = messages.len(),
                "Listed mailbox"
            );
            Ok::<_, ReaderError>(messages)
        }
        .instrument(span)
        .await
    }

    /// Fetch and reassemble the content chunks of a message
    ///
    /// Returns `Ok(None)` when no chunk exists. Corruption is reported as
    /// [`MessageContent::Corrupted`], not as an error. Chunks that belong to a
    /// different message are ignored.
    ///
    /// # Errors
    ///
    /// - [`ReaderError::UnknownContract`] if the id's contract is not registered
    /// - [`ReaderError::Executor`] if the chunks cannot be fetched
    pub async fn retrieve_content(
        &self,
        msg_id: &MsgId,
    ) -> Result<Option<MessageContent>, ReaderError> {
        let contract = self.contract(msg_id.contract_id)?;

        async move {
            let request = ListRequest::new(contract.address.clone(), Direction::Asc)
                .counterparty(external_destination(&msg_id.on_chain_id));
            let events = self.paginator().list(&request).await?;
            debug!(chunks = events.len(), "Fetched content events");

            let chunks = self
                .executor
                .operation(|attempt| {
                    let binding = self.contracts.get(contract, attempt.binding.identity());
                    let events = &events;
                    async move {
                        let chunks = events
                            .iter()
                            .filter_map(|event| {
                                let chunk = binding.decode_content(&*attempt.decoder, event);
                                own_chunk(msg_id, event, chunk)
                            })
                            .collect::<Vec<_>>();
                        Ok::<_, AttemptError>(chunks)
                    }
                })
                .await?;

            Ok::<_, ReaderError>(reassemble(chunks))
        }
        .instrument(spans::retrieve_content(msg_id))
        .await
    }

    /// [`retrieve_content`](Self::retrieve_content), then check that the
    /// content's author is the event's sender
    ///
    /// # Errors
    ///
    /// Same as [`retrieve_content`](Self::retrieve_content)
    pub async fn retrieve_and_verify_message_content(
        &self,
        event: &MailEvent,
    ) -> Result<Option<MessageContent>, ReaderError> {
        let content = self.retrieve_content(&event.msg_id).await?;

        Ok(content.map(|content| {
            let author_mismatch = match &content {
                MessageContent::Intact { sender, .. } => {
                    normalize_address(sender) != normalize_address(&event.sender)
                }
                MessageContent::Corrupted { .. } => false,
            };
            if !author_mismatch {
                return content;
            }
            warn!(
                msg_id = %event.msg_id,
                sender = %event.sender,
                "Content author differs from message sender"
            );
            content.into_corrupted(CorruptionReason::NonIntegrityParts)
        }))
    }
}

/// Keep decode failures and chunks of `msg_id`; drop chunks of other messages
fn own_chunk(
    msg_id: &MsgId,
    event: &WireEvent,
    chunk: Result<ContentChunk, DecodeError>,
) -> Option<(u64, Result<ContentChunk, DecodeError>)> {
    match chunk {
        Ok(chunk) if chunk.msg_id != msg_id.on_chain_id => {
            warn!(
                cursor = event.cursor(),
                expected = %msg_id.on_chain_id,
                found = %chunk.msg_id,
                "Ignoring chunk of another message"
            );
            None
        }
        other => Some((event.created_at, other)),
    }
}
