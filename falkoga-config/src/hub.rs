//! Broadcast hub configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Hub parameters.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct HubConfig {
    /// Per-subscriber frame buffer. A subscriber whose buffer is full is
    /// skipped for that frame, never queued against.
    #[validate(range(min = 8, max = 65_536))]
    #[serde(default = "default_subscriber_buffer")]
    pub subscriber_buffer: usize,
}

fn default_subscriber_buffer() -> usize {
    256
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            subscriber_buffer: default_subscriber_buffer(),
        }
    }
}
