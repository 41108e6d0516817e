// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Raw log records as returned by the GraphQL log source
//!
//! [`WireEvent`] mirrors the fields of the `messages` collection. Its body is
//! opaque here; version-specific strategies in [`contracts`](crate::contracts)
//! decode it.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Per-account logical time of a message (`created_lt`)
///
/// Logical time is a monotonically increasing counter, not a wall clock. The
/// log source renders it as a `0x`-prefixed hex string by default and as a
/// decimal string on request; both forms are accepted.
///
/// # Examples
///
/// ```
/// use ever_mailbox::LogicalTime;
///
/// let lt: LogicalTime = "0x1a".parse().unwrap();
/// assert_eq!(lt, LogicalTime::new(26));
/// assert_eq!("26".parse::<LogicalTime>().unwrap(), lt);
/// assert_eq!(lt.to_query_value(), "0x1a");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LogicalTime(u64);

impl LogicalTime {
    /// Create a logical time from its numeric value
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Numeric value
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Render the value the way the log source expects it in filters
    #[must_use]
    pub fn to_query_value(&self) -> String {
        format!("{:#x}", self.0)
    }
}

impl fmt::Display for LogicalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LogicalTime {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let value = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => u64::from_str_radix(hex, 16)?,
            None => s.parse::<u64>()?,
        };
        Ok(Self(value))
    }
}

impl Serialize for LogicalTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_query_value())
    }
}

impl<'de> Deserialize<'de> for LogicalTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(text) => text.parse().map_err(de::Error::custom),
            Raw::Number(value) => Ok(Self(value)),
        }
    }
}

/// One raw message from the log source
///
/// Immutable once read. `cursor` is an opaque continuation token; sources
/// that do not provide one fall back to the message `id`, which is a unique
/// hash, see [`WireEvent::cursor`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireEvent {
    /// Message hash
    pub id: String,
    /// Unix timestamp (seconds) of the producing transaction
    pub created_at: u64,
    /// Logical time of the message within the source account
    pub created_lt: LogicalTime,
    /// Emitting contract address
    pub src: String,
    /// Destination, an external address for events
    pub dst: String,
    /// Encoded message body
    #[serde(default)]
    pub body: Option<String>,
    /// Source-defined continuation token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

impl WireEvent {
    /// Continuation token identifying this event's position in the log
    #[must_use]
    pub fn cursor(&self) -> &str {
        self.cursor.as_deref().unwrap_or(&self.id)
    }

    /// Message body, empty when the source returned none
    #[must_use]
    pub fn body(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }
}
