use super::TypedMessage;
use crate::constants::HTTP_CONNECTION_MANAGER_TYPE;
use crate::constants::ROUTE_TYPE;

#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct RouteConfiguration {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(message, repeated, tag = "2")]
    pub virtual_hosts: Vec<VirtualHost>,
}

impl TypedMessage for RouteConfiguration {
    const TYPE_URL: &'static str = ROUTE_TYPE;
}

#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct VirtualHost {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, repeated, tag = "2")]
    pub domains: Vec<String>,
    #[prost(message, repeated, tag = "3")]
    pub routes: Vec<Route>,
}

#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct Route {
    #[prost(message, optional, tag = "1")]
    pub r#match: Option<RouteMatch>,
    #[prost(message, optional, tag = "2")]
    pub route: Option<RouteAction>,
}

#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct RouteMatch {
    #[prost(string, tag = "1")]
    pub prefix: String,
}

#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct RouteAction {
    #[prost(string, tag = "1")]
    pub cluster: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum CodecType {
    Auto = 0,
    Http1 = 1,
    Http2 = 2,
}

#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct HttpFilter {
    #[prost(string, tag = "1")]
    pub name: String,
}

/// Network filter configuration embedded in listeners as a typed payload.
#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct HttpConnectionManager {
    #[prost(enumeration = "CodecType", tag = "1")]
    pub codec_type: i32,
    #[prost(string, tag = "2")]
    pub stat_prefix: String,
    #[prost(message, optional, tag = "4")]
    pub route_config: Option<RouteConfiguration>,
    #[prost(message, repeated, tag = "5")]
    pub http_filters: Vec<HttpFilter>,
}

impl TypedMessage for HttpConnectionManager {
    const TYPE_URL: &'static str = HTTP_CONNECTION_MANAGER_TYPE;
}
