use super::*;
use crate::constants::ANY_TYPE;
use crate::constants::CLUSTER_TYPE;
use crate::constants::LISTENER_TYPE;
use crate::proto::Cluster;
use crate::proto::Listener;
use crate::test_utils::request;

#[test]
fn test_type_url_round_trip() {
    for resource_type in ResourceType::ALL {
        assert_eq!(
            ResourceType::from_type_url(resource_type.type_url()),
            Some(resource_type)
        );
    }
}

#[test]
fn test_empty_type_url_is_aggregated() {
    assert_eq!(ResourceType::from_type_url(ANY_TYPE), Some(ResourceType::Aggregated));
}

#[test]
fn test_unknown_type_url() {
    assert_eq!(ResourceType::from_type_url("type.googleapis.com/unknown.Type"), None);
    // v2 url of a known type is not recognized
    assert_eq!(
        ResourceType::from_type_url("type.googleapis.com/envoy.api.v2.Cluster"),
        None
    );
}

#[test]
fn test_display() {
    assert_eq!(ResourceType::Cluster.to_string(), "cluster");
    assert_eq!(ResourceType::Aggregated.to_string(), "aggregated");
}

#[test]
fn test_resource_accessors() {
    let cluster = Resource::Cluster(Cluster {
        name: "c".to_string(),
        ..Default::default()
    });
    let listener = Resource::Listener(Listener {
        name: "l".to_string(),
        ..Default::default()
    });

    assert_eq!(cluster.resource_type(), ResourceType::Cluster);
    assert_eq!(cluster.name(), "c");
    assert_eq!(listener.resource_type(), ResourceType::Listener);
    assert_eq!(listener.name(), "l");
}

#[test]
fn test_to_discovery_response() {
    let cluster = Cluster {
        name: "c".to_string(),
        ..Default::default()
    };
    let response = Response {
        request: request(CLUSTER_TYPE),
        version: "3".to_string(),
        resources: vec![Resource::Cluster(cluster.clone())],
    };

    let wire = response.to_discovery_response("nonce-1");

    assert_eq!(wire.version_info, "3");
    assert_eq!(wire.nonce, "nonce-1");
    assert_eq!(wire.type_url, CLUSTER_TYPE);
    assert_eq!(wire.resources.len(), 1);
    assert!(!wire.resources[0].is::<Listener>());
    assert_eq!(wire.resources[0].unpack::<Cluster>().unwrap(), cluster);
    assert_eq!(response.type_url(), CLUSTER_TYPE);
}

#[test]
fn test_response_type_url_follows_request() {
    let response = Response {
        request: request(LISTENER_TYPE),
        version: "1".to_string(),
        resources: vec![],
    };
    assert_eq!(response.type_url(), LISTENER_TYPE);
    assert!(response.to_discovery_response("n").resources.is_empty());
}
