// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use tracing::debug;

use super::{ContentChunk, CorruptionReason, MessageContent};
use crate::errors::DecodeError;

/// Reassemble a message from its chunks
///
/// Each entry pairs the chunk's creation timestamp with the outcome of
/// decoding it. Checks run in a fixed order and the first failing one
/// decides the reason:
///
/// 1. no chunks: `None`
/// 2. any decode failure: [`CorruptionReason::NonDecryptable`]
/// 3. chunks disagree on sender or part count: [`CorruptionReason::NonIntegrityParts`]
/// 4. an index in `[0, part_count)` is missing: [`CorruptionReason::NotAllParts`]
/// 5. more chunks than parts: [`CorruptionReason::DoubledParts`]
///
/// Otherwise parts are concatenated in index order and `created_at` is the
/// earliest chunk timestamp.
///
/// # Example
///
/// ```
/// use alloy_primitives::B256;
/// use ever_mailbox::content::{reassemble, ContentChunk, MessageContent};
///
/// let chunk = |index: u16, bytes: &[u8]| ContentChunk {
///     sender: "0:aa".to_string(),
///     msg_id: B256::ZERO,
///     part_count: 2,
///     part_index: index,
///     payload: bytes.to_vec(),
/// };
///
/// let content = reassemble(vec![(20, Ok(chunk(1, b"lo"))), (10, Ok(chunk(0, b"hel")))]);
/// match content {
///     Some(MessageContent::Intact { payload, created_at, .. }) => {
///         assert_eq!(payload, b"hello");
///         assert_eq!(created_at, 10);
///     }
///     other => panic!("unexpected {other:?}"),
/// }
/// ```
pub fn reassemble(
    chunks: Vec<(u64, Result<ContentChunk, DecodeError>)>,
) -> Option<MessageContent> {
    if chunks.is_empty() {
        return None;
    }

    let chunk_timestamps: Vec<u64> = chunks.iter().map(|(ts, _)| *ts).collect();
    let corrupted = |reason: CorruptionReason| {
        debug!(%reason, chunks = chunk_timestamps.len(), "Content rejected");
        Some(MessageContent::Corrupted {
            reason,
            chunk_timestamps: chunk_timestamps.clone(),
        })
    };

    let mut decoded = Vec::with_capacity(chunks.len());
    for (_, chunk) in chunks {
        match chunk {
            Ok(chunk) => decoded.push(chunk),
            Err(e) => {
                debug!(error = %e, "Content chunk failed to decode");
                return corrupted(CorruptionReason::NonDecryptable);
            }
        }
    }

    let (sender, part_count) = match decoded.first() {
        Some(first) => (first.sender.clone(), first.part_count),
        None => return None,
    };
    if decoded
        .iter()
        .any(|c| c.sender != sender || c.part_count != part_count)
    {
        return corrupted(CorruptionReason::NonIntegrityParts);
    }

    let all_present =
        (0..part_count).all(|index| decoded.iter().any(|c| c.part_index == index));
    if !all_present {
        return corrupted(CorruptionReason::NotAllParts);
    }

    if decoded.len() > usize::from(part_count) {
        return corrupted(CorruptionReason::DoubledParts);
    }

    decoded.sort_by_key(|c| c.part_index);
    let payload = decoded.into_iter().flat_map(|c| c.payload).collect();
    let created_at = chunk_timestamps.iter().copied().min().unwrap_or_default();

    Some(MessageContent::Intact {
        sender,
        created_at,
        part_count,
        payload,
        chunk_timestamps,
    })
}
