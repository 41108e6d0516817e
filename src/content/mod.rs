// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Message content chunks and their reassembly
//!
//! Long messages are stored on chain as a series of content events, each
//! carrying one part of the (still encrypted) payload. [`reassemble`] turns
//! whatever chunks the log source returned into a [`MessageContent`]:
//! either the intact payload or a [`CorruptionReason`] explaining why the
//! set cannot be trusted. Corruption is a value, never an error.

mod reassembly;

pub use reassembly::reassemble;

use std::fmt;

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

/// One decoded content event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentChunk {
    /// Address of the message author
    pub sender: String,
    /// On-chain id of the message the chunk belongs to
    pub msg_id: B256,
    /// Number of parts the author announced
    pub part_count: u16,
    /// Zero-based position of this part
    pub part_index: u16,
    /// Raw part bytes
    pub payload: Vec<u8>,
}

/// Why a chunk set was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CorruptionReason {
    /// At least one chunk body could not be decoded
    NonDecryptable,
    /// Chunks disagree on sender or part count, or the sender is not the author
    NonIntegrityParts,
    /// Some part index in `[0, part_count)` is missing
    NotAllParts,
    /// More chunks than announced parts
    DoubledParts,
}

impl fmt::Display for CorruptionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            CorruptionReason::NonDecryptable => "non-decryptable",
            CorruptionReason::NonIntegrityParts => "non-integrity parts",
            CorruptionReason::NotAllParts => "not all parts",
            CorruptionReason::DoubledParts => "doubled parts",
        };
        f.write_str(text)
    }
}

/// Result of reassembling a chunk set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageContent {
    /// All parts present and consistent
    Intact {
        /// Author shared by every chunk
        sender: String,
        /// Earliest chunk timestamp (unix seconds)
        created_at: u64,
        /// Number of parts
        part_count: u16,
        /// Parts concatenated in index order
        payload: Vec<u8>,
        /// Timestamps of the chunks, in the order they were received
        chunk_timestamps: Vec<u64>,
    },
    /// The set cannot be trusted
    Corrupted {
        reason: CorruptionReason,
        chunk_timestamps: Vec<u64>,
    },
}

impl MessageContent {
    #[must_use]
    pub fn is_intact(&self) -> bool {
        matches!(self, MessageContent::Intact { .. })
    }

    /// Corruption reason, if any
    #[must_use]
    pub fn corruption(&self) -> Option<CorruptionReason> {
        match self {
            MessageContent::Intact { .. } => None,
            MessageContent::Corrupted { reason, .. } => Some(*reason),
        }
    }

    #[must_use]
    pub fn chunk_timestamps(&self) -> &[u64] {
        match self {
            MessageContent::Intact {
                chunk_timestamps, ..
            }
            | MessageContent::Corrupted {
                chunk_timestamps, ..
            } => chunk_timestamps,
        }
    }

    /// Downgrade to `Corrupted`, keeping the chunk timestamps
    #[must_use]
    pub(crate) fn into_corrupted(self, reason: CorruptionReason) -> Self {
        let chunk_timestamps = match self {
            MessageContent::Intact {
                chunk_timestamps, ..
            }
            | MessageContent::Corrupted {
                chunk_timestamps, ..
            } => chunk_timestamps,
        };
        MessageContent::Corrupted {
            reason,
            chunk_timestamps,
        }
    }
}
