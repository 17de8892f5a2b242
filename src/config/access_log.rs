use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AccessLogConfig {
    #[serde(default = "default_dump_interval_ms")]
    pub dump_interval_ms: u64,
}

impl Default for AccessLogConfig {
    fn default() -> Self {
        Self {
            dump_interval_ms: default_dump_interval_ms(),
        }
    }
}

impl AccessLogConfig {
    pub fn validate(&self) -> Result<()> {
        if self.dump_interval_ms == 0 {
            return Err(Error::InvalidConfig(
                "dump_interval_ms must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    pub fn dump_interval(&self) -> Duration {
        Duration::from_millis(self.dump_interval_ms)
    }
}

fn default_dump_interval_ms() -> u64 {
    1000
}
