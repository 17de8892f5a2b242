//! Resource generation policy.
//!
//! Maps a resource type and the shared generator state to a snapshot. The
//! cluster snapshot rotates through the configured upstream hosts, the
//! listener snapshot routes every request to that cluster. All other types
//! produce nothing.

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::trace;
use tracing::warn;

use super::Resource;
use super::ResourceType;
use super::Response;
use crate::constants::CATCH_ALL_DOMAIN;
use crate::constants::CATCH_ALL_PREFIX;
use crate::constants::HTTP_CONNECTION_MANAGER_FILTER;
use crate::constants::HTTP_CONNECTION_MANAGER_TYPE;
use crate::constants::LISTENER_NAME;
use crate::constants::LOAD_ASSIGNMENT_CLUSTER_NAME;
use crate::constants::ROUTER_FILTER;
use crate::constants::ROUTE_CONFIG_NAME;
use crate::constants::SERVICE_CLUSTER_NAME;
use crate::constants::STAT_PREFIX;
use crate::constants::VIRTUAL_HOST_NAME;
use crate::proto::Address;
use crate::proto::Cluster;
use crate::proto::ClusterLoadAssignment;
use crate::proto::CodecType;
use crate::proto::DiscoveryRequest;
use crate::proto::DiscoveryType;
use crate::proto::Endpoint;
use crate::proto::Filter;
use crate::proto::FilterChain;
use crate::proto::Http2ProtocolOptions;
use crate::proto::HttpConnectionManager;
use crate::proto::HttpFilter;
use crate::proto::LbEndpoint;
use crate::proto::LbPolicy;
use crate::proto::Listener;
use crate::proto::LocalityLbEndpoints;
use crate::proto::Route;
use crate::proto::RouteAction;
use crate::proto::RouteConfiguration;
use crate::proto::RouteMatch;
use crate::proto::TypedPayload;
use crate::proto::VirtualHost;
use crate::GenerationError;
use crate::ResourcesConfig;
use crate::Result;
use crate::GENERATION_FAILURES;

/// Counters advanced by every successful generation
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GeneratorState {
    /// Number of cluster snapshots produced so far; doubles as rotation index
    pub cluster_refresh_count: u64,
    versions: HashMap<ResourceType, u64>,
}

impl GeneratorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last version handed out for `resource_type`, 0 if none yet
    pub fn version(
        &self,
        resource_type: ResourceType,
    ) -> u64 {
        self.versions.get(&resource_type).copied().unwrap_or(0)
    }

    fn next_version(
        &mut self,
        resource_type: ResourceType,
    ) -> u64 {
        let version = self.versions.entry(resource_type).or_insert(0);
        *version += 1;
        *version
    }
}

/// Generate the resources of `resource_type`.
///
/// Returns `Ok(None)` when the type has nothing to serve. The state is only
/// mutated when resources are produced.
///
/// # Errors
/// Returns [`GenerationError::Serialization`] if the listener's nested filter
/// configuration cannot be packed.
pub fn generate_resources(
    resource_type: ResourceType,
    config: &ResourcesConfig,
    state: &mut GeneratorState,
) -> Result<Option<Vec<Resource>>> {
    let resources = match resource_type {
        ResourceType::Cluster => {
            let hosts = &config.upstream_hosts;
            if hosts.is_empty() {
                warn!("No upstream hosts configured, skipping cluster generation");
                return Ok(None);
            }
            let index = (state.cluster_refresh_count % hosts.len() as u64) as usize;
            let address = &hosts[index];
            info!(
                cluster_refresh_count = state.cluster_refresh_count,
                address = %address,
                "Cluster refresh selected upstream"
            );
            let cluster = build_cluster(config, address);
            state.cluster_refresh_count += 1;
            vec![Resource::Cluster(cluster)]
        }
        ResourceType::Listener => vec![Resource::Listener(build_listener(config)?)],
        ResourceType::Endpoint => {
            trace!("Endpoints are served inside the cluster load assignment");
            return Ok(None);
        }
        ResourceType::Route
        | ResourceType::Secret
        | ResourceType::Runtime
        | ResourceType::Aggregated => return Ok(None),
    };

    state.next_version(resource_type);
    Ok(Some(resources))
}

pub(crate) fn build_cluster(
    config: &ResourcesConfig,
    address: &str,
) -> Cluster {
    Cluster {
        name: SERVICE_CLUSTER_NAME.to_string(),
        r#type: DiscoveryType::StrictDns as i32,
        connect_timeout: Some(config.connect_timeout().into()),
        lb_policy: LbPolicy::RoundRobin as i32,
        http2_protocol_options: Some(Http2ProtocolOptions {}),
        load_assignment: Some(ClusterLoadAssignment {
            cluster_name: LOAD_ASSIGNMENT_CLUSTER_NAME.to_string(),
            endpoints: vec![LocalityLbEndpoints {
                lb_endpoints: vec![LbEndpoint {
                    endpoint: Some(Endpoint {
                        address: Some(Address::tcp(address, config.upstream_port)),
                    }),
                }],
            }],
        }),
    }
}

pub(crate) fn build_http_connection_manager() -> HttpConnectionManager {
    HttpConnectionManager {
        codec_type: CodecType::Http2 as i32,
        stat_prefix: STAT_PREFIX.to_string(),
        route_config: Some(RouteConfiguration {
            name: ROUTE_CONFIG_NAME.to_string(),
            virtual_hosts: vec![VirtualHost {
                name: VIRTUAL_HOST_NAME.to_string(),
                domains: vec![CATCH_ALL_DOMAIN.to_string()],
                routes: vec![Route {
                    r#match: Some(RouteMatch {
                        prefix: CATCH_ALL_PREFIX.to_string(),
                    }),
                    route: Some(RouteAction {
                        cluster: SERVICE_CLUSTER_NAME.to_string(),
                    }),
                }],
            }],
        }),
        http_filters: vec![HttpFilter {
            name: ROUTER_FILTER.to_string(),
        }],
    }
}

pub(crate) fn build_listener(config: &ResourcesConfig) -> Result<Listener> {
    let manager = build_http_connection_manager();
    let typed_config = TypedPayload::pack_bounded(&manager, config.max_typed_config_bytes)
        .map_err(|source| {
            error!(error = %source, "Failed to pack http connection manager");
            GENERATION_FAILURES
                .with_label_values(&[ResourceType::Listener.type_url()])
                .inc();
            GenerationError::Serialization {
                resource: LISTENER_NAME,
                type_url: HTTP_CONNECTION_MANAGER_TYPE,
                source,
            }
        })?;

    Ok(Listener {
        name: LISTENER_NAME.to_string(),
        address: Some(Address::tcp(
            config.listener_address.clone(),
            config.listener_port,
        )),
        filter_chains: vec![FilterChain {
            filters: vec![Filter {
                name: HTTP_CONNECTION_MANAGER_FILTER.to_string(),
                typed_config: Some(typed_config),
            }],
        }],
    })
}

/// Serializes every generation behind one mutex so that concurrent watch
/// ticks never select the same rotation slot twice.
#[derive(Debug)]
pub struct ResourceGenerator {
    config: ResourcesConfig,
    state: Mutex<GeneratorState>,
}

impl ResourceGenerator {
    pub fn new(config: ResourcesConfig) -> Self {
        Self {
            config,
            state: Mutex::new(GeneratorState::new()),
        }
    }

    /// Produce a snapshot answering `request`.
    ///
    /// Unknown type URLs are a valid request for nothing and yield `Ok(None)`.
    pub fn generate(
        &self,
        request: &DiscoveryRequest,
    ) -> Result<Option<Response>> {
        let Some(resource_type) = ResourceType::from_type_url(&request.type_url) else {
            debug!(type_url = %request.type_url, "Unknown resource type requested");
            return Ok(None);
        };

        let mut state = self.state.lock();
        let Some(resources) = generate_resources(resource_type, &self.config, &mut state)? else {
            return Ok(None);
        };

        Ok(Some(Response {
            request: request.clone(),
            version: state.version(resource_type).to_string(),
            resources,
        }))
    }

    /// Snapshot of the current counters
    pub fn state(&self) -> GeneratorState {
        self.state.lock().clone()
    }

    pub fn config(&self) -> &ResourcesConfig {
        &self.config
    }
}
