mod support;

use std::time::Duration;

use rowsync::checkpoint::{CHECKPOINT_FILE_NAME, CheckpointStore};
use rowsync::error::ErrorKind;
use rowsync::handler::{Handler, MemoryHandler};
use rowsync::processor::Processor;
use rowsync::source::MemorySource;
use rowsync::types::{Event, ScalarValue, StreamPosition};
use rowsync_telemetry::init_test_tracing;
use tempfile::TempDir;
use tokio::time::timeout;

use crate::support::{
    ChannelSource, FailingHandler, orders_insert, orders_metadata, rotation_boundary,
    rotation_echo, wait_for_record_count,
};

#[tokio::test(flavor = "multi_thread")]
async fn test_row_mutations_reach_every_handler_in_order() {
    init_test_tracing();

    let (source, events_tx) = ChannelSource::new();
    let metadata = orders_metadata().await;
    let first = MemoryHandler::new();
    let second = MemoryHandler::new();
    let checkpoint_dir = TempDir::new().unwrap();
    let checkpoint_store = CheckpointStore::new(checkpoint_dir.path()).await.unwrap();

    let mut processor = Processor::new(
        source,
        metadata,
        vec![
            Box::new(first.clone()) as Box<dyn Handler>,
            Box::new(second.clone()),
        ],
        checkpoint_store,
        StreamPosition::new("binlog.000001", 4),
        false,
    );
    processor.start().await.unwrap();

    // Bookkeeping events are interleaved with the mutations, as on a real stream.
    events_tx.send(Event::Other).await.unwrap();
    events_tx
        .send(orders_insert(1, "alice", None))
        .await
        .unwrap();
    events_tx.send(Event::Other).await.unwrap();
    events_tx
        .send(orders_insert(2, "bob", Some("priority")))
        .await
        .unwrap();

    let first_records = wait_for_record_count(&first, 2).await;
    let second_records = wait_for_record_count(&second, 2).await;
    assert_eq!(first_records, second_records);

    // The serialized record is the sink contract: named columns, explicit nulls.
    let json = serde_json::to_value(&first_records[0]).unwrap();
    assert_eq!(json["schema"], "shop");
    assert_eq!(json["table"], "orders");
    assert_eq!(json["type"], "insert");
    assert_eq!(json["data"]["id"], 1);
    assert_eq!(json["data"]["name"], "alice");
    assert!(json["data"].as_object().unwrap().contains_key("note"));
    assert!(json["data"]["note"].is_null());

    assert_eq!(first_records[1].data["id"], ScalarValue::Int(2));
    assert_eq!(first_records[1].data["note"], ScalarValue::from("priority"));

    processor.shutdown_and_wait().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rotation_boundaries_are_checkpointed_after_warm_up() {
    init_test_tracing();

    let (source, events_tx) = ChannelSource::new();
    let metadata = orders_metadata().await;
    let handler = MemoryHandler::new();
    let checkpoint_dir = TempDir::new().unwrap();
    let checkpoint_store = CheckpointStore::new(checkpoint_dir.path()).await.unwrap();

    let mut processor = Processor::new(
        source,
        metadata,
        vec![Box::new(handler) as Box<dyn Handler>],
        checkpoint_store,
        StreamPosition::new("binlog.000002", 4),
        true,
    );
    processor.start().await.unwrap();

    // The first boundary after startup re-announces the segment the stream opened
    // in and must not be persisted.
    events_tx
        .send(rotation_boundary("binlog.000002"))
        .await
        .unwrap();
    // Renegotiation echoes carry a non-zero header position and are not boundaries.
    events_tx
        .send(rotation_echo("binlog.000002", 1570))
        .await
        .unwrap();
    events_tx
        .send(rotation_boundary("binlog.000003"))
        .await
        .unwrap();
    events_tx
        .send(rotation_boundary("binlog.000004"))
        .await
        .unwrap();
    drop(events_tx);

    // Closing the feed surfaces as a stream-closed error from the consumer.
    let err = processor.wait().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SourceStreamClosed);

    let content =
        std::fs::read_to_string(checkpoint_dir.path().join(CHECKPOINT_FILE_NAME)).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines, vec!["binlog.000003", "binlog.000004"]);

    let reopened = CheckpointStore::new(checkpoint_dir.path()).await.unwrap();
    assert_eq!(reopened.load().await, Some("binlog.000004".to_owned()));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_resume_prefers_checkpointed_segment() {
    init_test_tracing();

    let checkpoint_dir = TempDir::new().unwrap();
    let checkpoint_store = CheckpointStore::new(checkpoint_dir.path()).await.unwrap();
    checkpoint_store.save("binlog.000007").await.unwrap();

    let source = MemorySource::new(vec![]);
    let metadata = orders_metadata().await;
    let handler = MemoryHandler::new();

    let mut processor = Processor::new(
        source.clone(),
        metadata,
        vec![Box::new(handler) as Box<dyn Handler>],
        checkpoint_store,
        StreamPosition::new("binlog.000001", 4),
        true,
    );
    processor.start().await.unwrap();

    // Resumed segments are re-entered from the start, replaying their row events.
    assert_eq!(
        source.connected_at().await,
        Some(StreamPosition::segment_start("binlog.000007"))
    );

    let err = processor.wait().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SourceStreamClosed);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_resume_without_checkpoint_uses_configured_position() {
    init_test_tracing();

    let checkpoint_dir = TempDir::new().unwrap();
    let checkpoint_store = CheckpointStore::new(checkpoint_dir.path()).await.unwrap();

    let source = MemorySource::new(vec![]);
    let metadata = orders_metadata().await;
    let handler = MemoryHandler::new();

    let mut processor = Processor::new(
        source.clone(),
        metadata,
        vec![Box::new(handler) as Box<dyn Handler>],
        checkpoint_store,
        StreamPosition::new("binlog.000001", 4),
        true,
    );
    processor.start().await.unwrap();

    assert_eq!(
        source.connected_at().await,
        Some(StreamPosition::new("binlog.000001", 4))
    );

    let err = processor.wait().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SourceStreamClosed);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_configured_position_wins_when_resume_is_disabled() {
    init_test_tracing();

    let checkpoint_dir = TempDir::new().unwrap();
    let checkpoint_store = CheckpointStore::new(checkpoint_dir.path()).await.unwrap();
    checkpoint_store.save("binlog.000007").await.unwrap();

    let source = MemorySource::new(vec![]);
    let metadata = orders_metadata().await;
    let handler = MemoryHandler::new();

    let mut processor = Processor::new(
        source.clone(),
        metadata,
        vec![Box::new(handler) as Box<dyn Handler>],
        checkpoint_store,
        StreamPosition::new("binlog.000001", 4),
        false,
    );
    processor.start().await.unwrap();

    assert_eq!(
        source.connected_at().await,
        Some(StreamPosition::new("binlog.000001", 4))
    );

    let err = processor.wait().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SourceStreamClosed);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_shutdown_stops_a_blocked_processor() {
    init_test_tracing();

    // The feed side stays alive and silent, so the consumer is parked on the
    // stream when the shutdown signal lands.
    let (source, _events_tx) = ChannelSource::new();
    let metadata = orders_metadata().await;
    let handler = MemoryHandler::new();
    let checkpoint_dir = TempDir::new().unwrap();
    let checkpoint_store = CheckpointStore::new(checkpoint_dir.path()).await.unwrap();

    let mut processor = Processor::new(
        source,
        metadata,
        vec![Box::new(handler) as Box<dyn Handler>],
        checkpoint_store,
        StreamPosition::new("binlog.000001", 4),
        false,
    );
    processor.start().await.unwrap();

    timeout(Duration::from_secs(5), processor.shutdown_and_wait())
        .await
        .expect("processor did not stop within the timeout")
        .unwrap();

    // Nothing rotated, so nothing was checkpointed.
    assert!(!checkpoint_dir.path().join(CHECKPOINT_FILE_NAME).exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failing_handler_does_not_stop_the_others() {
    init_test_tracing();

    let (source, events_tx) = ChannelSource::new();
    let metadata = orders_metadata().await;
    let memory = MemoryHandler::new();
    let checkpoint_dir = TempDir::new().unwrap();
    let checkpoint_store = CheckpointStore::new(checkpoint_dir.path()).await.unwrap();

    let mut processor = Processor::new(
        source,
        metadata,
        vec![
            Box::new(FailingHandler) as Box<dyn Handler>,
            Box::new(memory.clone()),
        ],
        checkpoint_store,
        StreamPosition::new("binlog.000001", 4),
        false,
    );
    processor.start().await.unwrap();

    events_tx
        .send(orders_insert(1, "alice", None))
        .await
        .unwrap();
    events_tx
        .send(orders_insert(2, "bob", None))
        .await
        .unwrap();

    let records = wait_for_record_count(&memory, 2).await;
    assert_eq!(records[0].data["id"], ScalarValue::Int(1));
    assert_eq!(records[1].data["id"], ScalarValue::Int(2));

    processor.shutdown_and_wait().await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_starting_twice_is_rejected() {
    init_test_tracing();

    let (source, _events_tx) = ChannelSource::new();
    let metadata = orders_metadata().await;
    let handler = MemoryHandler::new();
    let checkpoint_dir = TempDir::new().unwrap();
    let checkpoint_store = CheckpointStore::new(checkpoint_dir.path()).await.unwrap();

    let mut processor = Processor::new(
        source,
        metadata,
        vec![Box::new(handler) as Box<dyn Handler>],
        checkpoint_store,
        StreamPosition::new("binlog.000001", 4),
        false,
    );
    processor.start().await.unwrap();

    let err = processor.start().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);

    processor.shutdown_and_wait().await.unwrap();
}
