use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionConfig {
    /// Responses queued per discovery stream before the session waits on the transport
    #[serde(default = "default_response_buffer_size")]
    pub response_buffer_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            response_buffer_size: default_response_buffer_size(),
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.response_buffer_size == 0 {
            return Err(Error::InvalidConfig(
                "response_buffer_size must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

fn default_response_buffer_size() -> usize {
    16
}
