//! Serving boundary configuration.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

/// HTTP/WebSocket boundary parameters.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct ServerConfig {
    /// Socket address to listen on.
    #[validate(custom(function = validation::validate_socket_addr))]
    #[serde(default = "default_listen")]
    pub listen: String,
}

fn default_listen() -> String {
    "0.0.0.0:3001".into()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}
