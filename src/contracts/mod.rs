// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Mailer contracts and their version-specific event layouts
//!
//! Every deployed mailer contract is described by a [`ContractDescriptor`]:
//! a small numeric id (the one packed into [`MsgId`]), its address, its
//! [`MailerVersion`] and its ABI. The version is a dispatch table: it names
//! the events and says how their fields are encoded, so listing and
//! reassembly are written once for all versions.
//!
//! # Event routing
//!
//! Mailers emit events as external outbound messages whose destination is an
//! external address derived from a 256-bit key:
//!
//! - pushes go to `":" + hex(recipient)`
//! - broadcasts go to `":" + hex(feed)`
//! - content chunks go to `":" + hex(on_chain_id)` of the message they belong to

mod cache;
mod fields;
mod registry;

pub use cache::{ContractCache, MailerContract};
pub use registry::ContractRegistry;

use std::sync::Arc;

use alloy_primitives::{hex, B256};

/// Mailer contract generations with distinct event layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MailerVersion {
    /// First public mailer; content event is `MailContent`
    V5,
    /// Same layout as V5 with `MessageContent`
    V6,
    /// Ids rendered as hex, broadcast event renamed
    V7,
    /// Same layout as V7
    V8,
}

/// How 256-bit ids are rendered by the decoding engine for a version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IdRadix {
    Decimal,
    Hex,
}

impl MailerVersion {
    /// Name of the push event
    #[must_use]
    pub fn push_event(&self) -> &'static str {
        "MailPush"
    }

    /// Name of the broadcast event
    #[must_use]
    pub fn broadcast_event(&self) -> &'static str {
        match self {
            MailerVersion::V5 | MailerVersion::V6 => "MailBroadcast",
            MailerVersion::V7 | MailerVersion::V8 => "MessageBroadcast",
        }
    }

    /// Name of the content chunk event
    #[must_use]
    pub fn content_event(&self) -> &'static str {
        match self {
            MailerVersion::V5 => "MailContent",
            MailerVersion::V6 | MailerVersion::V7 | MailerVersion::V8 => "MessageContent",
        }
    }

    /// Whether broadcast events carry a `feedId` field
    #[must_use]
    pub fn has_feed_id(&self) -> bool {
        matches!(self, MailerVersion::V7 | MailerVersion::V8)
    }

    pub(crate) fn id_radix(&self) -> IdRadix {
        match self {
            MailerVersion::V5 | MailerVersion::V6 => IdRadix::Decimal,
            MailerVersion::V7 | MailerVersion::V8 => IdRadix::Hex,
        }
    }
}

/// A deployed mailer contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractDescriptor {
    /// Id packed into [`MsgId`](crate::MsgId)s of this contract
    pub id: u16,
    /// Contract address (`workchain:hex`)
    pub address: String,
    /// Event layout generation
    pub version: MailerVersion,
    /// ABI JSON handed to the decoding engine
    pub abi: Arc<str>,
}

impl ContractDescriptor {
    /// Describe a contract
    pub fn new(
        id: u16,
        address: impl Into<String>,
        version: MailerVersion,
        abi: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            id,
            address: normalize_address(&address.into()),
            version,
            abi: abi.into(),
        }
    }
}

/// External destination address events keyed by `key` are sent to
///
/// # Example
///
/// ```
/// use alloy_primitives::B256;
/// use ever_mailbox::contracts::external_destination;
///
/// let dst = external_destination(&B256::repeat_byte(0x0f));
/// assert_eq!(dst, format!(":{}", "0f".repeat(32)));
/// ```
#[must_use]
pub fn external_destination(key: &B256) -> String {
    format!(":{}", hex::encode(key))
}

/// Lowercase, trimmed address so comparisons are textual
pub(crate) fn normalize_address(address: &str) -> String {
    address.trim().to_ascii_lowercase()
}
