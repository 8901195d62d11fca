//! # Falköga Configuration System
//!
//! Hierarchical configuration for every pipeline component.
//!
//! ## Features
//! - **Unified Configuration**: single source of truth across all crates
//! - **Validation**: runtime validation of critical parameters
//! - **Environment Awareness**: per-environment overlay files and
//!   `FALKOGA_*` environment variables

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

mod error;
mod generator;
mod hub;
mod relay;
mod server;
mod sink;
mod stats;
mod storage;
mod validation;

pub use error::ConfigError;
pub use generator::{BurstConfig, GeneratorConfig};
pub use hub::HubConfig;
pub use relay::RelayConfig;
pub use server::ServerConfig;
pub use sink::SinkConfig;
pub use stats::StatsConfig;
pub use storage::StorageConfig;

/// Top-level configuration container for all Falköga components.
#[derive(Debug, Serialize, Deserialize, Validate, Default, Clone)]
pub struct FalkogaConfig {
    /// Synthetic event generation (base rate, bursts, sampling).
    #[validate(nested)]
    pub generator: GeneratorConfig,

    /// Broadcast hub parameters.
    #[validate(nested)]
    pub hub: HubConfig,

    /// Batch sink flush cadence.
    #[validate(nested)]
    pub sink: SinkConfig,

    /// Durable event store connection.
    #[validate(nested)]
    pub storage: StorageConfig,

    /// External pub/sub relay.
    #[validate(nested)]
    pub relay: RelayConfig,

    /// Statistics aggregation cadences and windows.
    #[validate(nested)]
    pub stats: StatsConfig,

    /// Serving boundary (HTTP/WebSocket).
    #[validate(nested)]
    pub server: ServerConfig,
}

impl FalkogaConfig {
    /// Load configuration from default files and environment.
    ///
    /// Hierarchy:
    /// 1. Default values
    /// 2. `config/falkoga.yaml` - base settings. If missing, defaults are used.
    /// 3. `config/<environment>.yaml` - environment-specific overrides.
    /// 4. `FALKOGA_*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(FalkogaConfig::default()));

        if Path::new("config/falkoga.yaml").exists() {
            figment = figment.merge(Yaml::file("config/falkoga.yaml"));
        }

        let env = std::env::var("FALKOGA_ENV").unwrap_or_else(|_| "production".into());
        let env_file = format!("config/{}.yaml", env);
        if Path::new(&env_file).exists() {
            figment = figment.merge(Yaml::file(env_file));
        }

        figment
            .merge(Env::prefixed("FALKOGA_").split("__"))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }

    /// Load configuration from a specific path.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(PathBuf::from(
                path.to_string_lossy().to_string(),
            )));
        }

        Figment::from(Serialized::defaults(FalkogaConfig::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed("FALKOGA_").split("__"))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_config_validation() {
        let config = FalkogaConfig::default();
        config.validate().expect("Default config should validate");
    }

    #[test]
    fn environment_override() {
        std::env::set_var("FALKOGA_SINK__FLUSH_INTERVAL_SECS", "9");
        let config = FalkogaConfig::load().unwrap();
        assert_eq!(config.sink.flush_interval_secs, 9);
        std::env::remove_var("FALKOGA_SINK__FLUSH_INTERVAL_SECS");
    }
}
