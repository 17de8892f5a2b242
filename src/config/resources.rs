use std::net::IpAddr;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Inputs of the resource generator
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ResourcesConfig {
    /// Backend hosts the generated cluster rotates through, in order
    #[serde(default = "default_upstream_hosts")]
    pub upstream_hosts: Vec<String>,

    #[serde(default = "default_upstream_port")]
    pub upstream_port: u32,

    /// Address the generated listener binds on the data plane
    #[serde(default = "default_listener_address")]
    pub listener_address: String,

    #[serde(default = "default_listener_port")]
    pub listener_port: u32,

    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Upper bound for a nested filter config packed into a listener
    #[serde(default = "default_max_typed_config_bytes")]
    pub max_typed_config_bytes: usize,
}

impl Default for ResourcesConfig {
    fn default() -> Self {
        Self {
            upstream_hosts: default_upstream_hosts(),
            upstream_port: default_upstream_port(),
            listener_address: default_listener_address(),
            listener_port: default_listener_port(),
            connect_timeout_ms: default_connect_timeout_ms(),
            max_typed_config_bytes: default_max_typed_config_bytes(),
        }
    }
}

impl ResourcesConfig {
    /// Validates generator inputs
    /// # Errors
    /// Returns `Error::InvalidConfig` when:
    /// - No upstream host is configured, or one is blank
    /// - A port is outside 1..=65535
    /// - The listener address is not an IP address
    /// - The connect timeout or payload limit is zero
    pub fn validate(&self) -> Result<()> {
        if self.upstream_hosts.is_empty() {
            return Err(Error::InvalidConfig(
                "upstream_hosts must contain at least one host".into(),
            ));
        }

        if let Some(pos) = self.upstream_hosts.iter().position(|h| h.trim().is_empty()) {
            return Err(Error::InvalidConfig(format!(
                "upstream_hosts[{}] cannot be empty",
                pos
            )));
        }

        validate_port(self.upstream_port, "upstream_port")?;
        validate_port(self.listener_port, "listener_port")?;

        if self.listener_address.parse::<IpAddr>().is_err() {
            return Err(Error::InvalidConfig(format!(
                "listener_address {} is not a valid IP address",
                self.listener_address
            )));
        }

        if self.connect_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "connect_timeout_ms must be greater than 0".into(),
            ));
        }

        if self.max_typed_config_bytes == 0 {
            return Err(Error::InvalidConfig(
                "max_typed_config_bytes must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

fn validate_port(
    port: u32,
    name: &str,
) -> Result<()> {
    if port == 0 || port > u16::MAX as u32 {
        return Err(Error::InvalidConfig(format!(
            "{} {} is outside 1..=65535",
            name, port
        )));
    }
    Ok(())
}

fn default_upstream_hosts() -> Vec<String> {
    vec![
        "voyager-server".to_string(),
        "voyager-server-fallback".to_string(),
    ]
}
fn default_upstream_port() -> u32 {
    4891
}
fn default_listener_address() -> String {
    "127.0.0.1".to_string()
}
fn default_listener_port() -> u32 {
    4891
}
fn default_connect_timeout_ms() -> u64 {
    250
}
fn default_max_typed_config_bytes() -> usize {
    64 * 1024
}
