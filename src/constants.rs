// -
// Resource type URLs

pub(crate) const TYPE_URL_PREFIX: &str = "type.googleapis.com/";

pub const ENDPOINT_TYPE: &str = "type.googleapis.com/envoy.config.endpoint.v3.ClusterLoadAssignment";
pub const CLUSTER_TYPE: &str = "type.googleapis.com/envoy.config.cluster.v3.Cluster";
pub const ROUTE_TYPE: &str = "type.googleapis.com/envoy.config.route.v3.RouteConfiguration";
pub const LISTENER_TYPE: &str = "type.googleapis.com/envoy.config.listener.v3.Listener";
pub const SECRET_TYPE: &str =
    "type.googleapis.com/envoy.extensions.transport_sockets.tls.v3.Secret";
pub const RUNTIME_TYPE: &str = "type.googleapis.com/envoy.service.runtime.v3.Runtime";

/// Aggregated streams carry every type; requests on them must name one.
pub const ANY_TYPE: &str = "";

pub const HTTP_CONNECTION_MANAGER_TYPE: &str =
    "type.googleapis.com/envoy.config.filter.network.http_connection_manager.v2.HttpConnectionManager";

// -
// Generated resource names

pub const SERVICE_CLUSTER_NAME: &str = "voyager_server_service";
pub(crate) const LOAD_ASSIGNMENT_CLUSTER_NAME: &str = "local_service";
pub const LISTENER_NAME: &str = "listener_voyager_server";
pub(crate) const HTTP_CONNECTION_MANAGER_FILTER: &str = "envoy.http_connection_manager";
pub(crate) const ROUTER_FILTER: &str = "envoy.router";
pub(crate) const STAT_PREFIX: &str = "voyager_server_egress";
pub(crate) const ROUTE_CONFIG_NAME: &str = "local_route";
pub(crate) const VIRTUAL_HOST_NAME: &str = "local_service";
pub(crate) const CATCH_ALL_DOMAIN: &str = "*";
pub(crate) const CATCH_ALL_PREFIX: &str = "/";
