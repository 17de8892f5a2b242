use std::fmt;

use crate::constants::ANY_TYPE;
use crate::constants::CLUSTER_TYPE;
use crate::constants::ENDPOINT_TYPE;
use crate::constants::LISTENER_TYPE;
use crate::constants::ROUTE_TYPE;
use crate::constants::RUNTIME_TYPE;
use crate::constants::SECRET_TYPE;
use crate::proto::Cluster;
use crate::proto::DiscoveryRequest;
use crate::proto::DiscoveryResponse;
use crate::proto::Listener;
use crate::proto::TypedPayload;

/// Closed set of configuration categories recognized by the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    Endpoint,
    Cluster,
    Route,
    Listener,
    Secret,
    Runtime,
    /// Every type multiplexed on one stream. Never generated directly.
    Aggregated,
}

impl ResourceType {
    pub const ALL: [ResourceType; 7] = [
        ResourceType::Endpoint,
        ResourceType::Cluster,
        ResourceType::Route,
        ResourceType::Listener,
        ResourceType::Secret,
        ResourceType::Runtime,
        ResourceType::Aggregated,
    ];

    pub fn type_url(&self) -> &'static str {
        match self {
            ResourceType::Endpoint => ENDPOINT_TYPE,
            ResourceType::Cluster => CLUSTER_TYPE,
            ResourceType::Route => ROUTE_TYPE,
            ResourceType::Listener => LISTENER_TYPE,
            ResourceType::Secret => SECRET_TYPE,
            ResourceType::Runtime => RUNTIME_TYPE,
            ResourceType::Aggregated => ANY_TYPE,
        }
    }

    /// Returns `None` for type URLs outside the closed set.
    pub fn from_type_url(type_url: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.type_url() == type_url)
    }
}

impl fmt::Display for ResourceType {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let name = match self {
            ResourceType::Endpoint => "endpoint",
            ResourceType::Cluster => "cluster",
            ResourceType::Route => "route",
            ResourceType::Listener => "listener",
            ResourceType::Secret => "secret",
            ResourceType::Runtime => "runtime",
            ResourceType::Aggregated => "aggregated",
        };
        f.write_str(name)
    }
}

/// A generated resource, immutable once constructed
#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    Cluster(Cluster),
    Listener(Listener),
}

impl Resource {
    pub fn resource_type(&self) -> ResourceType {
        match self {
            Resource::Cluster(_) => ResourceType::Cluster,
            Resource::Listener(_) => ResourceType::Listener,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Resource::Cluster(c) => &c.name,
            Resource::Listener(l) => &l.name,
        }
    }

    pub fn to_payload(&self) -> TypedPayload {
        match self {
            Resource::Cluster(c) => TypedPayload::pack(c),
            Resource::Listener(l) => TypedPayload::pack(l),
        }
    }
}

/// Versioned snapshot of one resource type, answering one request
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// The request this snapshot answers, kept for correlation
    pub request: DiscoveryRequest,
    /// Monotonic per resource type
    pub version: String,
    pub resources: Vec<Resource>,
}

impl Response {
    pub fn type_url(&self) -> &str {
        &self.request.type_url
    }

    /// Pack the snapshot into its wire form.
    pub fn to_discovery_response(
        &self,
        nonce: impl Into<String>,
    ) -> DiscoveryResponse {
        DiscoveryResponse {
            version_info: self.version.clone(),
            resources: self.resources.iter().map(Resource::to_payload).collect(),
            canary: false,
            type_url: self.request.type_url.clone(),
            nonce: nonce.into(),
        }
    }
}
