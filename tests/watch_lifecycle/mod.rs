use std::collections::HashSet;
use std::time::Duration;

use tokio::time::timeout;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use voyager_xds::constants::CLUSTER_TYPE;
use voyager_xds::constants::ENDPOINT_TYPE;
use voyager_xds::constants::LISTENER_TYPE;
use voyager_xds::constants::SERVICE_CLUSTER_NAME;
use voyager_xds::proto::HttpConnectionManager;
use voyager_xds::Cache;
use voyager_xds::Resource;

use crate::commons::cache;
use crate::commons::cluster_of;
use crate::commons::request;
use crate::commons::upstream_host;
use crate::commons::REFRESH;

#[tokio::test(start_paused = true)]
async fn test_cluster_watch_follows_rotation_until_cancelled() {
    let shutdown = CancellationToken::new();
    let cache = cache(&["voyager-server", "voyager-server-fallback"], shutdown);
    let start = Instant::now();

    let (mut watch, cancel) = cache.create_watch(request(CLUSTER_TYPE));

    let first = watch.recv().await.expect("first snapshot");
    assert!(start.elapsed() >= REFRESH);
    let cluster = cluster_of(&first.resources);
    assert_eq!(cluster.name, SERVICE_CLUSTER_NAME);
    assert_eq!(upstream_host(cluster), "voyager-server");

    let second = watch.recv().await.expect("second snapshot");
    assert_eq!(upstream_host(cluster_of(&second.resources)), "voyager-server-fallback");

    cancel.cancel();
    cancel.cancel();
    assert!(watch.recv().await.is_none());
    assert!(cache.registry().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_watches_never_share_a_slot() {
    let cache = cache(&["a", "b"], CancellationToken::new());
    let (mut first, _c1) = cache.create_watch(request(CLUSTER_TYPE));
    let (mut second, _c2) = cache.create_watch(request(CLUSTER_TYPE));

    let a = first.recv().await.unwrap();
    let b = second.recv().await.unwrap();

    let hosts: HashSet<_> = [
        upstream_host(cluster_of(&a.resources)).to_string(),
        upstream_host(cluster_of(&b.resources)).to_string(),
    ]
    .into();
    assert_eq!(hosts.len(), 2);
    assert_ne!(a.version, b.version);
}

#[tokio::test(start_paused = true)]
async fn test_listener_watch_embeds_routing_config() {
    let cache = cache(&["a"], CancellationToken::new());
    let (mut watch, _cancel) = cache.create_watch(request(LISTENER_TYPE));

    let response = watch.recv().await.unwrap();
    let wire = response.to_discovery_response("1");

    assert_eq!(wire.type_url, LISTENER_TYPE);
    let listener = match &response.resources[..] {
        [Resource::Listener(listener)] => listener,
        other => panic!("unexpected resources {other:?}"),
    };
    let manager: HttpConnectionManager = listener.filter_chains[0].filters[0]
        .typed_config
        .as_ref()
        .unwrap()
        .unpack()
        .unwrap();
    let route_config = manager.route_config.unwrap();
    assert_eq!(
        route_config.virtual_hosts[0].routes[0].route.as_ref().unwrap().cluster,
        SERVICE_CLUSTER_NAME
    );
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_token_ends_all_watches() {
    let shutdown = CancellationToken::new();
    let cache = cache(&["a"], shutdown.clone());
    let mut watches: Vec<_> = [CLUSTER_TYPE, LISTENER_TYPE, ENDPOINT_TYPE]
        .into_iter()
        .map(|type_url| cache.create_watch(request(type_url)).0)
        .collect();

    shutdown.cancel();

    for watch in watches.iter_mut() {
        let ended = timeout(Duration::from_secs(1), watch.recv())
            .await
            .expect("watch should end promptly");
        assert!(ended.is_none());
    }
    cache.shutdown().await;
    assert!(cache.registry().is_empty());
}

#[tokio::test]
async fn test_fetch_matches_request() {
    let cache = cache(&["a"], CancellationToken::new());
    let mut req = request(CLUSTER_TYPE);
    req.resource_names = vec![SERVICE_CLUSTER_NAME.to_string()];

    let response = cache.fetch(req.clone()).await.unwrap().unwrap();
    assert_eq!(response.request, req);

    assert!(cache.fetch(request(ENDPOINT_TYPE)).await.unwrap().is_none());
}
