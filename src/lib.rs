// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Read-only mailbox access for Everscale mailer contracts.
//!
//! - [`MailboxReader`] lists a contract's events, a recipient's or feed's
//!   messages, and reassembles message content from its chunks
//! - [`EndpointSelector`](transport::EndpointSelector) keeps requests on the
//!   fastest live GraphQL endpoint of a pool
//! - [`QueryExecutor`] fails over between provider bindings
//! - [`MsgId`] is the compact, base64 rendered message identifier

pub mod config;
pub mod content;
pub mod contracts;
mod decoder;
pub mod errors;
mod executor;
pub mod msg_id;
pub mod provider;
pub mod reader;
mod spans;
pub mod transport;
pub mod types;

pub use config::{MailboxConfig, MailboxConfigBuilder, Network};
pub use content::{ContentChunk, CorruptionReason, MessageContent};
pub use contracts::{ContractDescriptor, MailerVersion};
pub use decoder::{AbiDecoder, DecodedFields, DecoderHandle};
pub use errors::*;
pub use executor::{Attempt, QueryExecutor};
pub use msg_id::MsgId;
pub use provider::{GqlProvider, ProviderBinding};
pub use reader::{ListRequest, MailboxReader, Paginator};
pub use types::bound::{Direction, PageBound, QueryBound, Window};
pub use types::mail::{MailEvent, Mailbox};
pub use types::wire::{LogicalTime, WireEvent};
