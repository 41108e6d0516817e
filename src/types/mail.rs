// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Logical mailbox events

use alloy_primitives::B256;

use super::bound::QueryBound;
use super::wire::LogicalTime;
use crate::contracts::external_destination;
use crate::msg_id::MsgId;

/// Whose messages to list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mailbox {
    /// Messages pushed to a recipient key
    Recipient(B256),
    /// Messages broadcast to a feed
    Feed(B256),
}

impl Mailbox {
    /// External address the mailer sends this mailbox's events to
    #[must_use]
    pub fn destination(&self) -> String {
        match self {
            Mailbox::Recipient(key) | Mailbox::Feed(key) => external_destination(key),
        }
    }

    #[must_use]
    pub fn is_broadcast(&self) -> bool {
        matches!(self, Mailbox::Feed(_))
    }
}

/// A decoded push or broadcast event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailEvent {
    pub msg_id: MsgId,
    /// Author address
    pub sender: String,
    /// Unix seconds
    pub created_at: u64,
    pub logical_time: LogicalTime,
    /// Continuation token of the underlying wire event
    pub cursor: String,
    /// Recipient's encrypted key; empty for broadcasts
    pub key: Vec<u8>,
}

impl MailEvent {
    /// Bound to continue listing from this event
    #[must_use]
    pub fn bound(&self) -> QueryBound {
        QueryBound::new(self.cursor.clone(), self.logical_time)
    }
}
