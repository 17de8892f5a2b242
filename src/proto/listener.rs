use super::Address;
use super::TypedMessage;
use super::TypedPayload;
use crate::constants::LISTENER_TYPE;

#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct Listener {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(message, optional, tag = "2")]
    pub address: Option<Address>,
    #[prost(message, repeated, tag = "3")]
    pub filter_chains: Vec<FilterChain>,
}

impl TypedMessage for Listener {
    const TYPE_URL: &'static str = LISTENER_TYPE;
}

#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct FilterChain {
    #[prost(message, repeated, tag = "3")]
    pub filters: Vec<Filter>,
}

#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct Filter {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(message, optional, tag = "4")]
    pub typed_config: Option<TypedPayload>,
}
