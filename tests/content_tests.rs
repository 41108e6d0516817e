// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for content retrieval and mailbox listing

mod helpers;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use alloy_primitives::B256;
use ever_mailbox::{
    CorruptionReason, Direction, Mailbox, MessageContent, MsgId, ReaderError,
};
use helpers::{
    broadcast_event, content_event, push_event, reader, wire_event, FakeLogSource, CONTRACT_ID,
};
use serde_json::json;

const ALICE: &str = "0:aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
const MALLORY: &str = "0:bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

fn msg(byte: u8) -> B256 {
    B256::repeat_byte(byte)
}

fn msg_id(on_chain_id: B256) -> MsgId {
    MsgId::new(false, CONTRACT_ID, on_chain_id)
}

#[tokio::test]
async fn test_retrieve_intact_content() {
    helpers::init_tracing();
    let id = msg(0x11);
    let source = Arc::new(FakeLogSource::new("primary").with_events(vec![
        content_event("c2", 30, id, ALICE, 3, 2, b"!"),
        content_event("c0", 10, id, ALICE, 3, 0, b"hello"),
        content_event("c1", 20, id, ALICE, 3, 1, b", world"),
    ]));
    let reader = reader(50, &[source]);

    let content = reader.retrieve_content(&msg_id(id)).await.unwrap().unwrap();

    match content {
        MessageContent::Intact {
            sender,
            created_at,
            part_count,
            payload,
            chunk_timestamps,
        } => {
            assert_eq!(sender, ALICE);
            assert_eq!(part_count, 3);
            assert_eq!(payload, b"hello, world!");
            assert_eq!(created_at, 1_700_000_010);
            // listed ascending by logical time
            assert_eq!(chunk_timestamps, vec![1_700_000_010, 1_700_000_020, 1_700_000_030]);
        }
        other => panic!("unexpected content: {other:?}"),
    }
}

#[tokio::test]
async fn test_no_chunks_is_none() {
    let source = Arc::new(FakeLogSource::new("primary"));
    let reader = reader(50, &[source]);

    assert!(reader.retrieve_content(&msg_id(msg(0x22))).await.unwrap().is_none());
}

#[tokio::test]
async fn test_missing_part() {
    let id = msg(0x33);
    let source = Arc::new(FakeLogSource::new("primary").with_events(vec![
        content_event("c0", 10, id, ALICE, 3, 0, b"a"),
        content_event("c2", 30, id, ALICE, 3, 2, b"c"),
    ]));
    let reader = reader(50, &[source]);

    let content = reader.retrieve_content(&msg_id(id)).await.unwrap().unwrap();
    assert_eq!(content.corruption(), Some(CorruptionReason::NotAllParts));
    assert_eq!(content.chunk_timestamps().len(), 2);
}

#[tokio::test]
async fn test_doubled_part() {
    let id = msg(0x44);
    let source = Arc::new(FakeLogSource::new("primary").with_events(vec![
        content_event("c0", 10, id, ALICE, 2, 0, b"a"),
        content_event("c1", 20, id, ALICE, 2, 1, b"b"),
        content_event("c1-again", 30, id, ALICE, 2, 1, b"b"),
    ]));
    let reader = reader(50, &[source]);

    let content = reader.retrieve_content(&msg_id(id)).await.unwrap().unwrap();
    assert_eq!(content.corruption(), Some(CorruptionReason::DoubledParts));
}

#[tokio::test]
async fn test_mixed_senders_are_non_integrity() {
    let id = msg(0x55);
    let source = Arc::new(FakeLogSource::new("primary").with_events(vec![
        content_event("c0", 10, id, ALICE, 2, 0, b"a"),
        content_event("c1", 20, id, MALLORY, 2, 1, b"b"),
    ]));
    let reader = reader(50, &[source]);

    let content = reader.retrieve_content(&msg_id(id)).await.unwrap().unwrap();
    assert_eq!(content.corruption(), Some(CorruptionReason::NonIntegrityParts));
}

#[tokio::test]
async fn test_undecodable_chunk_is_non_decryptable() {
    let id = msg(0x66);
    let mut broken = content_event("c1", 20, id, ALICE, 2, 1, b"b");
    broken.body = Some("not json".to_string());
    let source = Arc::new(FakeLogSource::new("primary").with_events(vec![
        content_event("c0", 10, id, ALICE, 2, 0, b"a"),
        broken,
    ]));
    let reader = reader(50, &[source]);

    let content = reader.retrieve_content(&msg_id(id)).await.unwrap().unwrap();
    assert_eq!(content.corruption(), Some(CorruptionReason::NonDecryptable));
}

#[tokio::test]
async fn test_chunk_of_another_message_is_ignored() {
    let id = msg(0x77);
    // Delivered to this message's destination but naming another message
    let mut stray = content_event("stray", 15, msg(0x78), MALLORY, 1, 0, b"zzz");
    stray.dst = content_event("x", 0, id, ALICE, 1, 0, b"").dst;
    let source = Arc::new(FakeLogSource::new("primary").with_events(vec![
        content_event("c0", 10, id, ALICE, 1, 0, b"only"),
        stray,
    ]));
    let reader = reader(50, &[source]);

    let content = reader.retrieve_content(&msg_id(id)).await.unwrap().unwrap();
    match content {
        MessageContent::Intact { payload, chunk_timestamps, .. } => {
            assert_eq!(payload, b"only");
            assert_eq!(chunk_timestamps.len(), 1);
        }
        other => panic!("unexpected content: {other:?}"),
    }
}

#[tokio::test]
async fn test_unknown_contract() {
    let reader = reader(50, &[Arc::new(FakeLogSource::new("primary"))]);

    let error = reader
        .retrieve_content(&MsgId::new(false, 99, msg(0x01)))
        .await
        .unwrap_err();
    assert!(matches!(error, ReaderError::UnknownContract { id: 99 }));

    let error = reader
        .list_messages(99, Mailbox::Recipient(msg(0x01)), Direction::Desc, None, None, None)
        .await
        .unwrap_err();
    assert!(matches!(error, ReaderError::UnknownContract { id: 99 }));
}

#[tokio::test]
async fn test_list_inbox_then_verify_content() {
    let me = msg(0xe1);
    let id = msg(0x88);
    let source = Arc::new(FakeLogSource::new("primary").with_events(vec![
        push_event("p1", 5, me, id, ALICE),
        content_event("c0", 6, id, ALICE, 1, 0, b"hi"),
    ]));
    let reader = reader(50, &[source]);

    let inbox = reader
        .list_messages(CONTRACT_ID, Mailbox::Recipient(me), Direction::Desc, None, None, None)
        .await
        .unwrap();
    assert_eq!(inbox.len(), 1);
    let event = &inbox[0];
    assert_eq!(event.msg_id, MsgId::new(false, CONTRACT_ID, id));
    assert_eq!(event.sender, ALICE);
    assert_eq!(event.key, b"encrypted key");
    assert_eq!(event.cursor, "p1");

    let content = reader
        .retrieve_and_verify_message_content(event)
        .await
        .unwrap()
        .unwrap();
    assert!(content.is_intact());
}

#[tokio::test]
async fn test_forged_author_is_non_integrity() {
    let me = msg(0xe2);
    let id = msg(0x99);
    // The push claims Mallory, the content was written by Alice
    let source = Arc::new(FakeLogSource::new("primary").with_events(vec![
        push_event("p1", 5, me, id, MALLORY),
        content_event("c0", 6, id, ALICE, 1, 0, b"hi"),
    ]));
    let reader = reader(50, &[source]);

    let inbox = reader
        .list_messages(CONTRACT_ID, Mailbox::Recipient(me), Direction::Desc, None, None, None)
        .await
        .unwrap();
    let content = reader
        .retrieve_and_verify_message_content(&inbox[0])
        .await
        .unwrap()
        .unwrap();

    assert_eq!(content.corruption(), Some(CorruptionReason::NonIntegrityParts));
    assert_eq!(content.chunk_timestamps(), &[1_700_000_006]);
}

#[tokio::test]
async fn test_list_feed_broadcasts() {
    let feed = msg(0xf0);
    let source = Arc::new(FakeLogSource::new("primary").with_events(vec![
        broadcast_event("b1", 1, feed, msg(0x01), ALICE),
        broadcast_event("b2", 2, feed, msg(0x02), MALLORY),
        push_event("p3", 3, msg(0xe3), msg(0x03), ALICE),
    ]));
    let reader = reader(50, &[source]);

    let feed_messages = reader
        .list_messages(CONTRACT_ID, Mailbox::Feed(feed), Direction::Asc, None, None, None)
        .await
        .unwrap();

    let ids: Vec<MsgId> = feed_messages.iter().map(|m| m.msg_id).collect();
    assert_eq!(
        ids,
        vec![
            MsgId::new(true, CONTRACT_ID, msg(0x01)),
            MsgId::new(true, CONTRACT_ID, msg(0x02)),
        ]
    );
    assert!(feed_messages.iter().all(|m| m.key.is_empty()));
}

#[tokio::test]
async fn test_undecodable_events_are_skipped() {
    let me = msg(0xe4);
    let mut garbage = push_event("p2", 2, me, msg(0x02), ALICE);
    garbage.body = Some(json!({ "event": "MailPush", "fields": {} }).to_string());
    let unrelated = wire_event("x3", 3, &Mailbox::Recipient(me).destination(), json!({ "event": "Other" }));
    let source = Arc::new(FakeLogSource::new("primary").with_events(vec![
        push_event("p1", 1, me, msg(0x01), ALICE),
        garbage,
        unrelated,
        push_event("p4", 4, me, msg(0x04), ALICE),
    ]));
    let reader = reader(50, &[source]);

    let inbox = reader
        .list_messages(CONTRACT_ID, Mailbox::Recipient(me), Direction::Desc, None, None, Some(3))
        .await
        .unwrap();

    // The limit caps raw events (4, 3, 2); only 4 decodes
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].msg_id.on_chain_id, msg(0x04));
}

#[tokio::test]
async fn test_inbox_continuation_from_last_message() {
    let me = msg(0xe5);
    let events = (1..=7u8)
        .map(|i| push_event(&format!("p{i}"), u64::from(i), me, msg(i), ALICE))
        .collect();
    let source = Arc::new(FakeLogSource::new("primary").with_events(events));
    let reader = reader(2, &[source]);

    let first = reader
        .list_messages(CONTRACT_ID, Mailbox::Recipient(me), Direction::Desc, None, None, Some(3))
        .await
        .unwrap();
    let from = ever_mailbox::PageBound::exclusive(first.last().unwrap().bound());
    let rest = reader
        .list_messages(CONTRACT_ID, Mailbox::Recipient(me), Direction::Desc, Some(from), None, None)
        .await
        .unwrap();

    let lts: Vec<u64> = first
        .iter()
        .chain(rest.iter())
        .map(|m| m.logical_time.as_u64())
        .collect();
    assert_eq!(lts, vec![7, 6, 5, 4, 3, 2, 1]);
}

#[tokio::test]
async fn test_decoder_loaded_once_across_operations() {
    let id = msg(0x12);
    let source = Arc::new(FakeLogSource::new("primary").with_events(vec![
        content_event("c0", 10, id, ALICE, 1, 0, b"x"),
    ]));
    let reader = reader(50, &[source]);

    for _ in 0..3 {
        reader.retrieve_content(&msg_id(id)).await.unwrap();
    }

    let decoder = reader.executor().decoder().init().await.unwrap();
    assert_eq!(decoder.loads.load(Ordering::SeqCst), 1);
    assert_eq!(reader.contract_cache().len(), 1);
}

#[tokio::test]
async fn test_author_check_ignores_case_and_padding() {
    let me = msg(0xe6);
    let id = msg(0x13);
    let source = Arc::new(FakeLogSource::new("primary").with_events(vec![
        push_event("p1", 5, me, id, ALICE),
        content_event("c0", 6, id, ALICE, 1, 0, b"hi"),
    ]));
    let reader = reader(50, &[source]);

    let inbox = reader
        .list_messages(CONTRACT_ID, Mailbox::Recipient(me), Direction::Desc, None, None, None)
        .await
        .unwrap();
    let mut event = inbox[0].clone();
    event.sender = format!("  {}\n", ALICE.to_ascii_uppercase());

    let content = reader
        .retrieve_and_verify_message_content(&event)
        .await
        .unwrap()
        .unwrap();
    assert!(content.is_intact());
}
