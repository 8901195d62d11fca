//! External relay configuration.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

/// Relay (NATS pub/sub) parameters.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct RelayConfig {
    /// Disable the relay entirely.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// NATS server URL.
    #[validate(custom(function = validation::validate_non_empty))]
    #[serde(default = "default_url")]
    pub url: String,

    /// Subject each attack event is published to.
    #[validate(custom(function = validation::validate_non_empty))]
    #[serde(default = "default_subject")]
    pub subject: String,

    /// Bound on the initial connection attempt (milliseconds). On
    /// expiry publishing becomes a no-op.
    #[validate(range(min = 100, max = 60_000))]
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

fn default_enabled() -> bool {
    true
}
fn default_url() -> String {
    "nats://127.0.0.1:4222".into()
}
fn default_subject() -> String {
    "falkoga.attacks".into()
}
fn default_connect_timeout_ms() -> u64 {
    2000
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            url: default_url(),
            subject: default_subject(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}
