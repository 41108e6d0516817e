// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Compact external message identifiers
//!
//! A [`MsgId`] packs a broadcast flag, the blockchain family tag, a small
//! contract id and the 256-bit on-chain id into a short byte string, rendered
//! as standard base64 for transport.
//!
//! # Layout
//!
//! Bits are packed most significant first:
//!
//! ```text
//! | 1 | b | f f f f | varint(contract_id) | on_chain_id (256) | zero padding |
//! ```
//!
//! - `1`: framing bit, always set
//! - `b`: broadcast flag
//! - `ffff`: family tag, [`EVERSCALE_FAMILY`] for ids produced here
//! - varint: groups of 7 value bits, each preceded by a continuation bit,
//!   most significant group first, no leading zero group
//!
//! # Example
//!
//! ```
//! use alloy_primitives::B256;
//! use ever_mailbox::MsgId;
//!
//! let id = MsgId::new(false, 3, B256::repeat_byte(0xab));
//! let encoded = id.encode();
//! assert_eq!(MsgId::decode(&encoded).unwrap(), id);
//! ```

mod bits;

use std::fmt;
use std::str::FromStr;

use alloy_primitives::B256;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::config::constants::EVERSCALE_FAMILY;
use crate::errors::MsgIdError;
use bits::{BitReader, BitWriter};

const HEADER_BITS: usize = 6;
const VARINT_GROUP_BITS: u32 = 7;
const VARINT_MAX_GROUPS: usize = 3;
const ON_CHAIN_ID_BITS: usize = 256;

/// Compact identifier of a pushed or broadcast message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MsgId {
    /// Whether the message was broadcast to a feed rather than pushed to a recipient
    pub is_broadcast: bool,
    /// Id of the contract that emitted the message
    pub contract_id: u16,
    /// On-chain message id
    pub on_chain_id: B256,
}

impl MsgId {
    /// Create a message id
    pub const fn new(is_broadcast: bool, contract_id: u16, on_chain_id: B256) -> Self {
        Self {
            is_broadcast,
            contract_id,
            on_chain_id,
        }
    }

    /// Pack into bytes
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = BitWriter::new();
        writer.write_bit(true);
        writer.write_bit(self.is_broadcast);
        writer.write_bits(u32::from(EVERSCALE_FAMILY), 4);
        write_varint(&mut writer, self.contract_id);
        writer.write_bytes(self.on_chain_id.as_slice());
        writer.into_bytes()
    }

    /// Unpack from bytes
    ///
    /// # Errors
    ///
    /// Returns an error if the framing bit, family tag, contract id, length or
    /// padding do not match what [`MsgId::to_bytes`] produces
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MsgIdError> {
        let min_len = byte_len(1);
        let mut reader = BitReader::new(bytes);
        let short = || MsgIdError::InvalidLength {
            expected: min_len,
            found: bytes.len(),
        };

        if !reader.read_bit().ok_or_else(short)? {
            return Err(MsgIdError::InvalidFraming);
        }
        let is_broadcast = reader.read_bit().ok_or_else(short)?;
        let family = reader.read_bits(4).ok_or_else(short)? as u8;
        if family != EVERSCALE_FAMILY {
            return Err(MsgIdError::FamilyMismatch {
                expected: EVERSCALE_FAMILY,
                found: family,
            });
        }

        let (contract_id, groups) = read_varint(&mut reader).ok_or_else(short)??;

        let expected = byte_len(groups);
        if bytes.len() != expected {
            return Err(MsgIdError::InvalidLength {
                expected,
                found: bytes.len(),
            });
        }

        let on_chain_id = reader.read_bytes::<32>().ok_or_else(short)?;

        let padding = reader.remaining() as u32;
        if reader.read_bits(padding) != Some(0) {
            return Err(MsgIdError::NonZeroPadding);
        }

        Ok(Self::new(is_broadcast, contract_id, B256::from(on_chain_id)))
    }

    /// Encode as base64 text
    #[must_use]
    pub fn encode(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }

    /// Decode from base64 text
    ///
    /// # Errors
    ///
    /// Returns [`MsgIdError::FamilyMismatch`] for ids of another blockchain
    /// family and other [`MsgIdError`] variants for malformed input
    pub fn decode(encoded: &str) -> Result<Self, MsgIdError> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| MsgIdError::InvalidEncoding {
                details: e.to_string(),
            })?;
        Self::from_bytes(&bytes)
    }
}

impl fmt::Display for MsgId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for MsgId {
    type Err = MsgIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

fn byte_len(varint_groups: usize) -> usize {
    let bits = HEADER_BITS + varint_groups * (1 + VARINT_GROUP_BITS as usize) + ON_CHAIN_ID_BITS;
    bits.div_ceil(8)
}

fn write_varint(writer: &mut BitWriter, value: u16) {
    let value = u32::from(value);
    let mut groups = 1;
    while groups < VARINT_MAX_GROUPS && value >> (VARINT_GROUP_BITS * groups as u32) != 0 {
        groups += 1;
    }

    for index in (0..groups).rev() {
        writer.write_bit(index > 0);
        let group = (value >> (VARINT_GROUP_BITS * index as u32)) & 0x7f;
        writer.write_bits(group, VARINT_GROUP_BITS);
    }
}

/// Returns `None` when the input ends early.
fn read_varint(reader: &mut BitReader<'_>) -> Option<Result<(u16, usize), MsgIdError>> {
    let mut value = 0u32;
    for groups in 1..=VARINT_MAX_GROUPS {
        let more = reader.read_bit()?;
        let group = reader.read_bits(VARINT_GROUP_BITS)?;

        if groups == 1 && more && group == 0 {
            return Some(Err(MsgIdError::InvalidContractId {
                details: "leading zero group".to_string(),
            }));
        }

        value = (value << VARINT_GROUP_BITS) | group;
        if !more {
            return Some(match u16::try_from(value) {
                Ok(id) => Ok((id, groups)),
                Err(_) => Err(MsgIdError::InvalidContractId {
                    details: format!("{value} exceeds u16"),
                }),
            });
        }
    }

    Some(Err(MsgIdError::InvalidContractId {
        details: format!("more than {VARINT_MAX_GROUPS} groups"),
    }))
}
