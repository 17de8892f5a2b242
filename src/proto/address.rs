#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum SocketProtocol {
    Tcp = 0,
    Udp = 1,
}

#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct SocketAddress {
    #[prost(enumeration = "SocketProtocol", tag = "1")]
    pub protocol: i32,
    #[prost(string, tag = "2")]
    pub address: String,
    #[prost(uint32, tag = "3")]
    pub port_value: u32,
    #[prost(string, tag = "5")]
    pub resolver_name: String,
    #[prost(bool, tag = "6")]
    pub ipv4_compat: bool,
}

#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct Address {
    #[prost(message, optional, tag = "1")]
    pub socket_address: Option<SocketAddress>,
}

impl Address {
    pub fn tcp(
        address: impl Into<String>,
        port_value: u32,
    ) -> Self {
        Self {
            socket_address: Some(SocketAddress {
                protocol: SocketProtocol::Tcp as i32,
                address: address.into(),
                port_value,
                resolver_name: String::new(),
                ipv4_compat: false,
            }),
        }
    }
}

/// Wire compatible with `google.protobuf.Duration`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, ::prost::Message)]
pub struct Duration {
    #[prost(int64, tag = "1")]
    pub seconds: i64,
    #[prost(int32, tag = "2")]
    pub nanos: i32,
}

impl From<std::time::Duration> for Duration {
    fn from(d: std::time::Duration) -> Self {
        Self {
            seconds: d.as_secs() as i64,
            nanos: d.subsec_nanos() as i32,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct Http2ProtocolOptions {}
