use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// When a watch hands a freshly generated snapshot to its consumer
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryPolicy {
    /// Deliver every generated snapshot
    #[default]
    Always,
    /// Skip snapshots whose resources equal the last one delivered on the watch
    OnChange,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CacheConfig {
    /// Tick period of every watch. Bounds how stale a subscriber can get.
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,

    #[serde(default)]
    pub delivery_policy: DeliveryPolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: default_refresh_interval_ms(),
            delivery_policy: DeliveryPolicy::default(),
        }
    }
}

impl CacheConfig {
    /// # Errors
    /// Returns `Error::InvalidConfig` if the refresh interval is zero
    pub fn validate(&self) -> Result<()> {
        if self.refresh_interval_ms == 0 {
            return Err(Error::InvalidConfig(
                "refresh_interval_ms must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }
}

fn default_refresh_interval_ms() -> u64 {
    120_000
}
