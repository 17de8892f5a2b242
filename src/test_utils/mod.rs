//! Helpers shared by the unit tests of every module
use std::time::Duration;

use crate::proto::Cluster;
use crate::proto::DiscoveryRequest;
use crate::proto::HttpConnectionManager;
use crate::proto::Listener;
use crate::CacheConfig;
use crate::DeliveryPolicy;
use crate::Resource;
use crate::ResourcesConfig;

pub(crate) const TEST_NODE_ID: &str = "test-node";

pub(crate) fn request(type_url: &str) -> DiscoveryRequest {
    DiscoveryRequest::new(TEST_NODE_ID, type_url)
}

pub(crate) fn ack(
    type_url: &str,
    version: &str,
    nonce: &str,
) -> DiscoveryRequest {
    DiscoveryRequest {
        version_info: version.to_string(),
        response_nonce: nonce.to_string(),
        ..request(type_url)
    }
}

pub(crate) fn resources_config(hosts: &[&str]) -> ResourcesConfig {
    ResourcesConfig {
        upstream_hosts: hosts.iter().map(|h| h.to_string()).collect(),
        ..Default::default()
    }
}

pub(crate) fn cache_config(
    refresh_interval: Duration,
    delivery_policy: DeliveryPolicy,
) -> CacheConfig {
    CacheConfig {
        refresh_interval_ms: refresh_interval.as_millis() as u64,
        delivery_policy,
    }
}

/// Upstream host a cluster sends traffic to
pub(crate) fn cluster_host(cluster: &Cluster) -> &str {
    cluster
        .load_assignment
        .as_ref()
        .and_then(|la| la.endpoints.first())
        .and_then(|locality| locality.lb_endpoints.first())
        .and_then(|lb| lb.endpoint.as_ref())
        .and_then(|endpoint| endpoint.address.as_ref())
        .and_then(|address| address.socket_address.as_ref())
        .map(|socket| socket.address.as_str())
        .expect("cluster without endpoint address")
}

pub(crate) fn only_cluster(resources: &[Resource]) -> &Cluster {
    match resources {
        [Resource::Cluster(cluster)] => cluster,
        other => panic!("expected a single cluster, got {other:?}"),
    }
}

pub(crate) fn only_listener(resources: &[Resource]) -> &Listener {
    match resources {
        [Resource::Listener(listener)] => listener,
        other => panic!("expected a single listener, got {other:?}"),
    }
}

/// Decode the connection manager embedded in a listener's first filter
pub(crate) fn listener_connection_manager(listener: &Listener) -> HttpConnectionManager {
    listener.filter_chains[0].filters[0]
        .typed_config
        .as_ref()
        .expect("filter without typed config")
        .unpack::<HttpConnectionManager>()
        .expect("typed config is not a connection manager")
}
