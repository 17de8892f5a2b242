use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tonic::Code;
use voyager_xds::constants::ANY_TYPE;
use voyager_xds::constants::CLUSTER_TYPE;
use voyager_xds::constants::ENDPOINT_TYPE;
use voyager_xds::constants::LISTENER_TYPE;
use voyager_xds::proto::Cluster;
use voyager_xds::proto::DiscoveryRequest;
use voyager_xds::proto::Listener;
use voyager_xds::DiscoveryServer;
use voyager_xds::LoggingCallbacks;
use voyager_xds::SessionConfig;

use crate::commons::cache;
use crate::commons::request;
use crate::commons::upstream_host;

fn server(
    hosts: &[&str],
    shutdown: CancellationToken,
) -> DiscoveryServer {
    DiscoveryServer::new(
        cache(hosts, shutdown.clone()),
        Arc::new(LoggingCallbacks),
        SessionConfig::default(),
        shutdown,
    )
    .unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_aggregated_stream_serves_clusters_and_listeners() {
    let shutdown = CancellationToken::new();
    let server = server(&["voyager-server", "voyager-server-fallback"], shutdown.clone());
    let (tx, rx) = mpsc::channel(4);
    let mut responses = server.stream_aggregated(ReceiverStream::new(rx)).unwrap();

    tx.send(Ok(request(CLUSTER_TYPE))).await.unwrap();
    tx.send(Ok(request(LISTENER_TYPE))).await.unwrap();

    let mut clusters = Vec::new();
    let mut listeners = 0;
    let mut nonces = Vec::new();
    while clusters.len() < 2 {
        let response = responses.next().await.unwrap().unwrap();
        nonces.push(response.nonce.clone());
        if response.type_url == CLUSTER_TYPE {
            let cluster: Cluster = response.resources[0].unpack().unwrap();
            clusters.push(upstream_host(&cluster).to_string());
            // acknowledge so the watch stays open
            let mut ack = request(CLUSTER_TYPE);
            ack.version_info = response.version_info.clone();
            ack.response_nonce = response.nonce.clone();
            tx.send(Ok(ack)).await.unwrap();
        } else {
            assert_eq!(response.type_url, LISTENER_TYPE);
            assert!(response.resources[0].is::<Listener>());
            listeners += 1;
        }
    }

    assert_eq!(clusters, vec!["voyager-server", "voyager-server-fallback"]);
    assert!(listeners >= 1);
    let mut unique = nonces.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), nonces.len());

    shutdown.cancel();
    assert!(responses.next().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_closing_request_stream_ends_responses() {
    let server = server(&["a"], CancellationToken::new());
    let (tx, rx) = mpsc::channel::<Result<DiscoveryRequest, tonic::Status>>(4);
    let mut responses = server.stream_clusters(ReceiverStream::new(rx)).unwrap();

    tx.send(Ok(request(ANY_TYPE))).await.unwrap();
    drop(tx);

    assert!(responses.next().await.is_none());
}

#[tokio::test]
async fn test_fetch_over_server() {
    let server = server(&["a"], CancellationToken::new());

    let response = server.fetch(request(ANY_TYPE), CLUSTER_TYPE).await.unwrap();
    assert_eq!(response.type_url, CLUSTER_TYPE);

    let status = server
        .fetch(request(ENDPOINT_TYPE), ENDPOINT_TYPE)
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::Unavailable);
}
