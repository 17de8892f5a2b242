use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::*;
use crate::constants::CLUSTER_TYPE;
use crate::constants::LISTENER_TYPE;
use crate::test_utils::request;

fn response(type_url: &str) -> Response {
    Response {
        request: request(type_url),
        version: "1".to_string(),
        resources: vec![],
    }
}

/// Register a watch whose task just waits for its token
fn register_idle(
    registry: &WatchRegistry,
    type_url: &str,
) -> (u64, CancellationToken) {
    let (id, token) = registry.allocate();
    let task_token = token.clone();
    let task = tokio::spawn(async move { task_token.cancelled().await });
    registry.insert(id, request(type_url), token.clone(), task);
    (id, token)
}

#[test]
fn test_allocate_ids_are_unique_and_increasing() {
    let registry = WatchRegistry::new(CancellationToken::new());

    let ids: Vec<u64> = (0..5).map(|_| registry.allocate().0).collect();

    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_allocated_tokens_follow_parent() {
    let parent = CancellationToken::new();
    let registry = WatchRegistry::new(parent.clone());
    let (_, first) = registry.allocate();
    let (_, second) = registry.allocate();

    first.cancel();
    assert!(!second.is_cancelled());
    assert!(!parent.is_cancelled());

    parent.cancel();
    assert!(second.is_cancelled());
}

#[tokio::test]
async fn test_register_and_unregister() {
    let registry = WatchRegistry::new(CancellationToken::new());
    let (cluster_id, cluster_token) = register_idle(&registry, CLUSTER_TYPE);
    let (listener_id, _) = register_idle(&registry, LISTENER_TYPE);
    register_idle(&registry, LISTENER_TYPE);

    assert_eq!(registry.len(), 3);
    assert_eq!(registry.watch_count(CLUSTER_TYPE), 1);
    assert_eq!(registry.watch_count(LISTENER_TYPE), 2);

    assert!(registry.unregister(cluster_id));
    assert!(cluster_token.is_cancelled());
    assert!(!registry.contains(cluster_id));
    assert!(registry.contains(listener_id));

    // second removal is a no-op
    assert!(!registry.unregister(cluster_id));
    assert_eq!(registry.len(), 2);
}

#[tokio::test]
async fn test_insert_already_cancelled_watch() {
    let registry = WatchRegistry::new(CancellationToken::new());
    let (id, token) = registry.allocate();
    token.cancel();

    registry.insert(id, request(CLUSTER_TYPE), token, tokio::spawn(async {}));

    assert!(!registry.contains(id));
    assert!(registry.is_empty());
}

#[tokio::test]
async fn test_shutdown_stops_every_task() {
    let parent = CancellationToken::new();
    let registry = WatchRegistry::new(parent.clone());
    let tokens: Vec<_> = (0..4)
        .map(|_| register_idle(&registry, CLUSTER_TYPE).1)
        .collect();

    tokio::time::timeout(Duration::from_secs(1), registry.shutdown())
        .await
        .expect("shutdown should not hang");

    assert!(registry.is_empty());
    // the caller's token is left alone
    assert!(!parent.is_cancelled());
    assert!(tokens.iter().all(CancellationToken::is_cancelled));
}

#[tokio::test]
async fn test_stream_yields_in_order() {
    let token = CancellationToken::new();
    let (tx, rx) = mpsc::channel(2);
    let mut stream = WatchStream::new(7, rx, token);

    tx.send(response(CLUSTER_TYPE)).await.unwrap();
    tx.send(response(LISTENER_TYPE)).await.unwrap();
    drop(tx);

    assert_eq!(stream.id(), 7);
    assert_eq!(stream.recv().await.unwrap().type_url(), CLUSTER_TYPE);
    assert_eq!(stream.next().await.unwrap().type_url(), LISTENER_TYPE);
    assert!(stream.recv().await.is_none());
}

#[tokio::test]
async fn test_stream_drops_buffered_value_after_cancel() {
    let token = CancellationToken::new();
    let (tx, rx) = mpsc::channel(1);
    let mut stream = WatchStream::new(1, rx, token.clone());

    tx.send(response(CLUSTER_TYPE)).await.unwrap();
    token.cancel();

    assert!(stream.recv().await.is_none());
    assert!(stream.next().await.is_none());
    // the channel is closed for the producer as well
    assert!(tx.send(response(CLUSTER_TYPE)).await.is_err());
}

#[tokio::test]
async fn test_stream_recv_wakes_on_cancel() {
    let token = CancellationToken::new();
    let (_tx, rx) = mpsc::channel::<Response>(1);
    let mut stream = WatchStream::new(1, rx, token.clone());

    let waiter = tokio::spawn(async move { stream.recv().await });
    token.cancel();

    let received = tokio::time::timeout(Duration::from_secs(1), waiter)
        .await
        .expect("recv should return after cancel")
        .unwrap();
    assert!(received.is_none());
}

#[tokio::test]
async fn test_cancel_is_idempotent_and_isolated() {
    let registry = Arc::new(WatchRegistry::new(CancellationToken::new()));
    let (first_id, first_token) = register_idle(&registry, CLUSTER_TYPE);
    let (second_id, second_token) = register_idle(&registry, CLUSTER_TYPE);
    let cancel = WatchCancel::new(first_id, first_token, registry.clone());

    assert_eq!(cancel.id(), first_id);
    cancel.cancel();
    cancel.clone().cancel();

    assert!(cancel.is_cancelled());
    assert!(!registry.contains(first_id));
    assert!(registry.contains(second_id));
    assert!(!second_token.is_cancelled());
    assert_eq!(registry.len(), 1);
}
