// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Test helpers for ever-mailbox integration tests
//!
//! Provides an in-memory log source that evaluates `messages` queries and a
//! JSON decoder standing in for the ABI decoding engine.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use alloy_primitives::{hex, B256};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ever_mailbox::contracts::external_destination;
use ever_mailbox::transport::{GqlRequest, GqlTransport};
use ever_mailbox::{
    AbiDecoder, ContractDescriptor, DecodeError, DecodedFields, LogicalTime, MailboxConfig,
    MailboxConfigBuilder, MailboxReader, MailerVersion, ProviderBinding, TransportError,
    WireEvent,
};
use serde_json::{json, Value};
use url::Url;

pub const MAILER: &str = "0:0000000000000000000000000000000000000000000000000000000000000001";
pub const CONTRACT_ID: u16 = 1;

/// In-memory `messages` collection
///
/// Applies the `src`, `dst` and `created_lt` filters, the `created_lt`
/// ordering and the limit of each query, like the real log source.
///
/// # Example
///
/// ```rust,ignore
/// let source = FakeLogSource::new("primary").with_events(events);
/// source.fail_next(2); // next two queries answer 503
/// ```
#[derive(Debug)]
pub struct FakeLogSource {
    name: String,
    events: Mutex<Vec<WireEvent>>,
    queries: AtomicUsize,
    fail_next: AtomicUsize,
    down: AtomicBool,
    limits: Mutex<Vec<usize>>,
}

impl FakeLogSource {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            events: Mutex::new(Vec::new()),
            queries: AtomicUsize::new(0),
            fail_next: AtomicUsize::new(0),
            down: AtomicBool::new(false),
            limits: Mutex::new(Vec::new()),
        }
    }

    pub fn with_events(self, events: Vec<WireEvent>) -> Self {
        self.events.lock().unwrap().extend(events);
        self
    }

    pub fn push(&self, event: WireEvent) {
        self.events.lock().unwrap().push(event);
    }

    /// Fail the next `n` queries with HTTP 503
    pub fn fail_next(&self, n: usize) {
        self.fail_next.store(n, Ordering::SeqCst);
    }

    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    /// Number of queries received, failed ones included
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// `limit` of every `messages` query, in order
    pub fn limits(&self) -> Vec<usize> {
        self.limits.lock().unwrap().clone()
    }

    fn answer(&self, request: &GqlRequest) -> Result<Value, TransportError> {
        self.queries.fetch_add(1, Ordering::SeqCst);

        let unavailable = TransportError::Status {
            endpoint: self.name.clone(),
            status: 503,
        };
        if self.down.load(Ordering::SeqCst) {
            return Err(unavailable);
        }
        if self
            .fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(unavailable);
        }

        if request.query.contains("info") {
            return Ok(json!({ "info": { "version": "0.59.0", "time": 0, "latency": 0 } }));
        }

        let vars = &request.variables;
        let filter = &vars["filter"];
        let limit = vars["limit"].as_u64().unwrap_or(50) as usize;
        let descending = vars["orderBy"][0]["direction"] == "DESC";
        self.limits.lock().unwrap().push(limit);

        let lt_bound = |op: &str| -> Option<LogicalTime> {
            filter["created_lt"][op].as_str().map(|s| s.parse().unwrap())
        };
        let (lt, le, gt, ge) = (lt_bound("lt"), lt_bound("le"), lt_bound("gt"), lt_bound("ge"));

        let mut matching: Vec<WireEvent> = self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| filter["src"]["eq"].as_str().is_none_or(|src| e.src == src))
            .filter(|e| filter["dst"]["eq"].as_str().is_none_or(|dst| e.dst == dst))
            .filter(|e| lt.is_none_or(|b| e.created_lt < b))
            .filter(|e| le.is_none_or(|b| e.created_lt <= b))
            .filter(|e| gt.is_none_or(|b| e.created_lt > b))
            .filter(|e| ge.is_none_or(|b| e.created_lt >= b))
            .cloned()
            .collect();

        // Stable: events sharing a logical time keep insertion order
        if descending {
            matching.sort_by(|a, b| b.created_lt.cmp(&a.created_lt));
        } else {
            matching.sort_by(|a, b| a.created_lt.cmp(&b.created_lt));
        }
        matching.truncate(limit);

        Ok(json!({ "messages": matching }))
    }
}

#[async_trait]
impl ProviderBinding for FakeLogSource {
    fn identity(&self) -> &str {
        &self.name
    }

    async fn query(&self, request: &GqlRequest) -> Result<Value, TransportError> {
        self.answer(request)
    }
}

#[async_trait]
impl GqlTransport for FakeLogSource {
    async fn post(&self, _endpoint: &Url, request: &GqlRequest) -> Result<Value, TransportError> {
        self.answer(request)
    }
}

/// JSON stand-in for the ABI decoding engine
///
/// A body is the JSON `{"event": name, "fields": {...}}`. Bodies that are not
/// JSON fail to decode.
#[derive(Debug, Default)]
pub struct JsonDecoder {
    pub loads: AtomicUsize,
}

#[async_trait]
impl AbiDecoder for JsonDecoder {
    async fn load(&self) -> Result<(), DecodeError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
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

/// A bare mailer event; `id` doubles as the cursor
pub fn wire_event(id: &str, lt: u64, dst: &str, body: Value) -> WireEvent {
    WireEvent {
        id: id.to_string(),
        created_at: 1_700_000_000 + lt,
        created_lt: LogicalTime::new(lt),
        src: MAILER.to_string(),
        dst: dst.to_string(),
        body: Some(body.to_string()),
        cursor: None,
    }
}

/// Events `e{lt}` for each logical time, addressed to `dst`
pub fn events_at(lts: &[u64], dst: &str) -> Vec<WireEvent> {
    lts.iter()
        .enumerate()
        .map(|(i, lt)| wire_event(&format!("e{i}-{lt}"), *lt, dst, json!({})))
        .collect()
}

/// V7 content chunk of `msg_id`
pub fn content_event(
    id: &str,
    lt: u64,
    msg_id: B256,
    sender: &str,
    parts: u16,
    index: u16,
    payload: &[u8],
) -> WireEvent {
    wire_event(
        id,
        lt,
        &external_destination(&msg_id),
        json!({
            "event": "MessageContent",
            "fields": {
                "sender": sender,
                "msgId": hex::encode_prefixed(msg_id),
                "parts": parts,
                "partIdx": index,
                "content": STANDARD.encode(payload),
            }
        }),
    )
}

/// V7 push of `msg_id` to `recipient`
pub fn push_event(id: &str, lt: u64, recipient: B256, msg_id: B256, sender: &str) -> WireEvent {
    wire_event(
        id,
        lt,
        &external_destination(&recipient),
        json!({
            "event": "MailPush",
            "fields": {
                "sender": sender,
                "msgId": hex::encode_prefixed(msg_id),
                "key": STANDARD.encode(b"encrypted key"),
            }
        }),
    )
}

/// V7 broadcast of `msg_id` to `feed`
pub fn broadcast_event(id: &str, lt: u64, feed: B256, msg_id: B256, sender: &str) -> WireEvent {
    wire_event(
        id,
        lt,
        &external_destination(&feed),
        json!({
            "event": "MessageBroadcast",
            "fields": {
                "sender": sender,
                "msgId": hex::encode_prefixed(msg_id),
                "feedId": hex::encode_prefixed(feed),
            }
        }),
    )
}

pub fn config(page_size: usize) -> MailboxConfig {
    MailboxConfigBuilder::new()
        .endpoint("localhost")
        .page_size(page_size)
        .contract(ContractDescriptor::new(
            CONTRACT_ID,
            MAILER,
            MailerVersion::V7,
            "{}",
        ))
        .build()
        .unwrap()
}

/// Reader over the given sources, tried in order
pub fn reader(
    page_size: usize,
    sources: &[Arc<FakeLogSource>],
) -> MailboxReader<JsonDecoder> {
    let bindings = sources
        .iter()
        .map(|s| s.clone() as Arc<dyn ProviderBinding>)
        .collect();
    MailboxReader::new(&config(page_size), bindings, JsonDecoder::default()).unwrap()
}

/// Initialise a test subscriber once; honours `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
