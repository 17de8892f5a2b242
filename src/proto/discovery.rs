use super::TypedPayload;

/// Identity of the data-plane node issuing a request.
#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct Node {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub cluster: String,
}

#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct DiscoveryRequest {
    /// Version of the last response the client applied (empty on first request)
    #[prost(string, tag = "1")]
    pub version_info: String,
    #[prost(message, optional, tag = "2")]
    pub node: Option<Node>,
    /// Requested resource names; empty means every resource of the type
    #[prost(string, repeated, tag = "3")]
    pub resource_names: Vec<String>,
    #[prost(string, tag = "4")]
    pub type_url: String,
    /// Nonce of the response this request acknowledges
    #[prost(string, tag = "5")]
    pub response_nonce: String,
}

impl DiscoveryRequest {
    pub fn new(
        node_id: impl Into<String>,
        type_url: impl Into<String>,
    ) -> Self {
        Self {
            node: Some(Node {
                id: node_id.into(),
                cluster: String::new(),
            }),
            type_url: type_url.into(),
            ..Default::default()
        }
    }

    pub fn node_id(&self) -> &str {
        self.node.as_ref().map(|n| n.id.as_str()).unwrap_or_default()
    }
}

#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct DiscoveryResponse {
    #[prost(string, tag = "1")]
    pub version_info: String,
    #[prost(message, repeated, tag = "2")]
    pub resources: Vec<TypedPayload>,
    #[prost(bool, tag = "3")]
    pub canary: bool,
    #[prost(string, tag = "4")]
    pub type_url: String,
    #[prost(string, tag = "5")]
    pub nonce: String,
}
