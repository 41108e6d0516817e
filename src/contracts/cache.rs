// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Per-provider contract bindings
//!
//! A [`MailerContract`] binds a [`ContractDescriptor`] to one provider and
//! knows how to turn that contract's wire events into typed values using the
//! descriptor's [`MailerVersion`](super::MailerVersion). Bindings are cheap
//! but created often, so [`ContractCache`] memoises them by
//! `(contract address, provider identity)`.
//!
//! # Example
//!
//! ```
//! use ever_mailbox::contracts::{ContractCache, ContractDescriptor, MailerVersion};
//! use std::sync::Arc;
//!
//! let cache = ContractCache::new();
//! let descriptor = ContractDescriptor::new(1, "0:01", MailerVersion::V7, "{}");
//!
//! let a = cache.get(&descriptor, "mainnet.evercloud.dev");
//! let b = cache.get(&descriptor, "mainnet.evercloud.dev");
//! assert!(Arc::ptr_eq(&a, &b));
//! assert_eq!(cache.len(), 1);
//! ```

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use alloy_primitives::B256;
use tracing::debug;

use super::fields::Fields;
use super::ContractDescriptor;
use crate::content::ContentChunk;
use crate::decoder::{AbiDecoder, DecodedFields};
use crate::errors::DecodeError;
use crate::msg_id::MsgId;
use crate::types::mail::MailEvent;
use crate::types::wire::WireEvent;

/// A contract descriptor bound to a provider
#[derive(Debug)]
pub struct MailerContract {
    descriptor: ContractDescriptor,
    provider: String,
}

impl MailerContract {
    /// Bind `descriptor` to `provider`
    pub fn new(descriptor: ContractDescriptor, provider: impl Into<String>) -> Self {
        Self {
            descriptor,
            provider: provider.into(),
        }
    }

    #[must_use]
    pub fn descriptor(&self) -> &ContractDescriptor {
        &self.descriptor
    }

    /// Identity of the provider this binding belongs to
    #[must_use]
    pub fn provider(&self) -> &str {
        &self.provider
    }

    fn decode<D: AbiDecoder + ?Sized>(
        &self,
        decoder: &D,
        event: &WireEvent,
        event_name: &str,
    ) -> Result<DecodedFields, DecodeError> {
        decoder
            .decode_event(event.body(), &self.descriptor.abi, event_name)?
            .ok_or_else(|| DecodeError::UnexpectedEvent {
                event: event_name.to_string(),
            })
    }

    /// Decode a content event into a chunk
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] if the body is not this version's content event
    /// or one of its fields is malformed
    pub fn decode_content<D: AbiDecoder + ?Sized>(
        &self,
        decoder: &D,
        event: &WireEvent,
    ) -> Result<ContentChunk, DecodeError> {
        let version = self.descriptor.version;
        let name = version.content_event();
        let values = self.decode(decoder, event, name)?;
        let fields = Fields::new(name, &values);

        Ok(ContentChunk {
            sender: fields.address("sender")?,
            msg_id: fields.uint256("msgId", version.id_radix())?,
            part_count: fields.u16("parts")?,
            part_index: fields.u16("partIdx")?,
            payload: fields.bytes("content")?,
        })
    }

    /// Decode a push (or, with `broadcast`, a broadcast) event
    ///
    /// From V7 broadcast events name their feed; it must be the feed the
    /// event was delivered to.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] if the body is not the expected event or one of
    /// its fields is malformed
    pub fn decode_mail_event<D: AbiDecoder + ?Sized>(
        &self,
        decoder: &D,
        event: &WireEvent,
        broadcast: bool,
    ) -> Result<MailEvent, DecodeError> {
        let version = self.descriptor.version;
        let radix = version.id_radix();
        let name = if broadcast {
            version.broadcast_event()
        } else {
            version.push_event()
        };
        let values = self.decode(decoder, event, name)?;
        let fields = Fields::new(name, &values);

        let on_chain_id = fields.uint256("msgId", radix)?;
        let key = if broadcast {
            if version.has_feed_id() {
                let feed: B256 = fields.uint256("feedId", radix)?;
                let expected = super::external_destination(&feed);
                if expected != event.dst {
                    return Err(DecodeError::invalid_field(
                        name,
                        "feedId",
                        format!("event delivered to {}, not {expected}", event.dst),
                    ));
                }
            }
            Vec::new()
        } else {
            fields.bytes("key")?
        };

        Ok(MailEvent {
            msg_id: MsgId::new(broadcast, self.descriptor.id, on_chain_id),
            sender: fields.address("sender")?,
            created_at: event.created_at,
            logical_time: event.created_lt,
            cursor: event.cursor().to_string(),
            key,
        })
    }
}

/// Memoised [`MailerContract`] bindings
///
/// Entries are created on first use and never evicted.
#[derive(Debug, Default)]
pub struct ContractCache {
    bindings: RwLock<HashMap<(String, String), Arc<MailerContract>>>,
}

impl ContractCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binding for `descriptor` on `provider`, created if absent
    ///
    /// Concurrent callers asking for the same key get the same binding.
    pub fn get(&self, descriptor: &ContractDescriptor, provider: &str) -> Arc<MailerContract> {
        let key = (descriptor.address.clone(), provider.to_string());

        if let Some(binding) = self
            .bindings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return binding.clone();
        }

        let mut bindings = self
            .bindings
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        bindings
            .entry(key)
            .or_insert_with(|| {
                debug!(
                    contract = %descriptor.address,
                    provider = provider,
                    "Created contract binding"
                );
                Arc::new(MailerContract::new(descriptor.clone(), provider))
            })
            .clone()
    }

    /// Number of cached bindings
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings
            .read()
            .map(|bindings| bindings.len())
            .unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::MailerVersion;
    use crate::types::wire::LogicalTime;
    use serde_json::{json, Value};

    /// Body is the JSON `{"event": name, "fields": {...}}`
    struct JsonDecoder;

    #[async_trait::async_trait]
    impl AbiDecoder for JsonDecoder {
        async fn load(&self) -> Result<(), DecodeError> {
            Ok(())
        }

        fn decode_event(
            &self,
            body: &str,
            _abi: &str,
            event_name: &str,
        ) -> Result<Option<DecodedFields>, DecodeError> {
            let value: Value = serde_json::from_str(body)
                .map_err(|e| DecodeError::invalid_body(event_name, e.to_string()))?;
            if value["event"] != event_name {
                return Ok(None);
            }
            Ok(Some(value["fields"].clone()))
        }
    }

    fn wire(dst: &str, body: Value) -> WireEvent {
        WireEvent {
            id: "m1".to_string(),
            created_at: 1_700_000_000,
            created_lt: LogicalTime::new(77),
            src: "0:01".to_string(),
            dst: dst.to_string(),
            body: Some(body.to_string()),
            cursor: None,
        }
    }

    fn contract(version: MailerVersion) -> MailerContract {
        MailerContract::new(ContractDescriptor::new(9, "0:01", version, "{}"), "p")
    }

    #[test]
    fn test_cache_keys_by_address_and_provider() {
        let cache = ContractCache::new();
        let a = ContractDescriptor::new(1, "0:01", MailerVersion::V7, "{}");
        let b = ContractDescriptor::new(2, "0:02", MailerVersion::V7, "{}");

        let first = cache.get(&a, "p1");
        assert!(Arc::ptr_eq(&first, &cache.get(&a, "p1")));
        assert!(!Arc::ptr_eq(&first, &cache.get(&a, "p2")));
        cache.get(&b, "p1");

        assert_eq!(cache.len(), 3);
        assert_eq!(first.provider(), "p1");
    }

    #[test]
    fn test_concurrent_get_yields_one_binding() {
        let cache = Arc::new(ContractCache::new());
        let descriptor = ContractDescriptor::new(1, "0:01", MailerVersion::V8, "{}");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                let descriptor = descriptor.clone();
                std::thread::spawn(move || cache.get(&descriptor, "p"))
            })
            .collect();
        let bindings: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert!(bindings.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_decode_content_v5_decimal_id() {
        let event = wire(
            ":00",
            json!({
                "event": "MailContent",
                "fields": {
                    "sender": "0:AA",
                    "msgId": "258",
                    "parts": 2,
                    "partIdx": "1",
                    "content": "aGk=",
                }
            }),
        );

        let chunk = contract(MailerVersion::V5)
            .decode_content(&JsonDecoder, &event)
            .unwrap();
        assert_eq!(chunk.sender, "0:aa");
        assert_eq!(&chunk.msg_id.as_slice()[30..], &[1, 2]);
        assert_eq!((chunk.part_count, chunk.part_index), (2, 1));
        assert_eq!(chunk.payload, b"hi");
    }

    #[test]
    fn test_decode_content_wrong_event_name() {
        let event = wire(":00", json!({ "event": "MailContent", "fields": {} }));
        assert!(matches!(
            contract(MailerVersion::V7).decode_content(&JsonDecoder, &event),
            Err(DecodeError::UnexpectedEvent { .. })
        ));
    }

    #[test]
    fn test_decode_push_event() {
        let event = wire(
            ":11",
            json!({
                "event": "MailPush",
                "fields": { "sender": "0:bb", "msgId": "0x0102", "key": "a2V5" }
            }),
        );

        let mail = contract(MailerVersion::V7)
            .decode_mail_event(&JsonDecoder, &event, false)
            .unwrap();
        assert!(!mail.msg_id.is_broadcast);
        assert_eq!(mail.msg_id.contract_id, 9);
        assert_eq!(mail.key, b"key");
        assert_eq!(mail.cursor, "m1");
        assert_eq!(mail.logical_time, LogicalTime::new(77));
    }

    #[test]
    fn test_decode_broadcast_checks_feed_from_v7() {
        let feed = B256::repeat_byte(0x22);
        let fields = json!({
            "sender": "0:bb",
            "msgId": "0x05",
            "feedId": alloy_primitives::hex::encode_prefixed(feed),
        });
        let body = json!({ "event": "MessageBroadcast", "fields": fields });

        let delivered = wire(&crate::contracts::external_destination(&feed), body.clone());
        let mail = contract(MailerVersion::V8)
            .decode_mail_event(&JsonDecoder, &delivered, true)
            .unwrap();
        assert!(mail.msg_id.is_broadcast);
        assert!(mail.key.is_empty());

        let misdelivered = wire(":00", body);
        assert!(matches!(
            contract(MailerVersion::V8).decode_mail_event(&JsonDecoder, &misdelivered, true),
            Err(DecodeError::InvalidField { .. })
        ));
    }

    #[test]
    fn test_decode_broadcast_v6_has_no_feed() {
        let event = wire(
            ":33",
            json!({ "event": "MailBroadcast", "fields": { "sender": "0:bb", "msgId": "5" } }),
        );
        let mail = contract(MailerVersion::V6)
            .decode_mail_event(&JsonDecoder, &event, true)
            .unwrap();
        assert_eq!(mail.msg_id.on_chain_id.as_slice()[31], 5);
    }
}
