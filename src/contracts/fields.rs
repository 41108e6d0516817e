// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Typed access to decoded ABI fields

use alloy_primitives::{B256, U256};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;

use super::{normalize_address, IdRadix};
use crate::decoder::DecodedFields;
use crate::errors::DecodeError;

/// Accessor bound to one event's decoded fields
pub(crate) struct Fields<'a> {
    event: &'a str,
    values: &'a DecodedFields,
}

impl<'a> Fields<'a> {
    pub(crate) fn new(event: &'a str, values: &'a DecodedFields) -> Self {
        Self { event, values }
    }

    fn raw(&self, name: &str) -> Result<&'a Value, DecodeError> {
        self.values
            .get(name)
            .filter(|v| !v.is_null())
            .ok_or_else(|| DecodeError::invalid_field(self.event, name, "missing"))
    }

    fn text(&self, name: &str) -> Result<&'a str, DecodeError> {
        self.raw(name)?
            .as_str()
            .ok_or_else(|| DecodeError::invalid_field(self.event, name, "expected a string"))
    }

    pub(crate) fn address(&self, name: &str) -> Result<String, DecodeError> {
        let address = normalize_address(self.text(name)?);
        if address.is_empty() {
            return Err(DecodeError::invalid_field(self.event, name, "empty address"));
        }
        Ok(address)
    }

    /// 256-bit id rendered in the version's radix
    pub(crate) fn uint256(&self, name: &str, radix: IdRadix) -> Result<B256, DecodeError> {
        let text = self.text(name)?.trim();
        let parsed = match radix {
            IdRadix::Decimal => U256::from_str_radix(text, 10),
            IdRadix::Hex => {
                let digits = text
                    .strip_prefix("0x")
                    .or_else(|| text.strip_prefix("0X"))
                    .unwrap_or(text);
                U256::from_str_radix(digits, 16)
            }
        };
        let value =
            parsed.map_err(|e| DecodeError::invalid_field(self.event, name, e.to_string()))?;
        Ok(B256::from(value.to_be_bytes::<32>()))
    }

    /// Small integers come back either as JSON numbers or decimal strings
    pub(crate) fn u16(&self, name: &str) -> Result<u16, DecodeError> {
        let raw = self.raw(name)?;
        let value = match raw {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse::<u64>().ok(),
            _ => None,
        };
        value
            .and_then(|v| u16::try_from(v).ok())
            .ok_or_else(|| {
                DecodeError::invalid_field(self.event, name, format!("expected u16, got {raw}"))
            })
    }

    /// Byte strings are base64 encoded by the engine
    pub(crate) fn bytes(&self, name: &str) -> Result<Vec<u8>, DecodeError> {
        STANDARD
            .decode(self.text(name)?)
            .map_err(|e| DecodeError::invalid_field(self.event, name, e.to_string()))
    }
}
