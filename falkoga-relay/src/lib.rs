//! # falkoga-relay
//!
//! Best-effort forwarding of individual attack events to an external
//! pub/sub channel (NATS).
//!
//! Failures are intentionally unobservable to callers: a relay that never
//! came up publishes into the void, and a publish error is logged at
//! debug level and otherwise dropped. The live pipeline must keep moving
//! whether or not anyone is listening on the other side.

use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, info, warn};

use falkoga_config::RelayConfig;
use falkoga_core::events::AttackEvent;

/// Fire-and-forget publisher for one named subject.
pub struct RelayPublisher {
    client: Option<async_nats::Client>,
    subject: String,
}

impl RelayPublisher {
    /// Attempts the connection once, bounded by the configured timeout.
    /// Any failure degrades to a disabled publisher; the failure is
    /// logged here and never again per call.
    pub async fn connect(config: &RelayConfig) -> Self {
        if !config.enabled {
            info!("relay disabled by configuration");
            return Self::disabled();
        }

        let attempt = async_nats::connect(config.url.as_str());
        match tokio::time::timeout(Duration::from_millis(config.connect_timeout_ms), attempt).await
        {
            Ok(Ok(client)) => {
                info!(url = %config.url, subject = %config.subject, "relay connected");
                Self {
                    client: Some(client),
                    subject: config.subject.clone(),
                }
            }
            Ok(Err(e)) => {
                warn!(url = %config.url, error = %e, "relay unavailable, continuing without it");
                Self::disabled()
            }
            Err(_) => {
                warn!(url = %config.url, "relay connect timed out, continuing without it");
                Self::disabled()
            }
        }
    }

    pub fn disabled() -> Self {
        Self {
            client: None,
            subject: String::new(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.client.is_some()
    }

    /// Publishes one serialized event. Never errors, never retries, never
    /// blocks beyond the single send attempt. No-op when disabled.
    pub async fn publish(&self, event: &AttackEvent) {
        let Some(client) = &self.client else {
            return;
        };
        let payload = match serde_json::to_vec(event) {
            Ok(payload) => Bytes::from(payload),
            Err(_) => return,
        };
        if let Err(e) = client.publish(self.subject.clone(), payload).await {
            debug!(error = %e, "relay publish failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use falkoga_core::events::{AttackType, Protocol};
    use uuid::Uuid;

    fn event() -> AttackEvent {
        AttackEvent {
            id: Uuid::new_v4(),
            source_ip: "203.0.113.1".into(),
            target_ip: "198.51.100.1".into(),
            source_lat: 0.0,
            source_lon: 0.0,
            target_lat: 0.0,
            target_lon: 0.0,
            source_country: "UA".into(),
            target_country: "NL".into(),
            attack_type: AttackType::Phishing,
            severity: 2,
            port: 25,
            protocol: Protocol::Tcp,
            timestamp_ms: 5,
        }
    }

    #[tokio::test]
    async fn disabled_publisher_swallows_publishes() {
        let relay = RelayPublisher::disabled();
        assert!(!relay.is_connected());
        // must neither panic nor block
        relay.publish(&event()).await;
    }

    #[tokio::test]
    async fn unreachable_server_degrades_to_disabled() {
        let config = RelayConfig {
            enabled: true,
            url: "nats://127.0.0.1:1".into(),
            subject: "falkoga.attacks".into(),
            connect_timeout_ms: 200,
        };
        let relay = RelayPublisher::connect(&config).await;
        assert!(!relay.is_connected());
        relay.publish(&event()).await;
    }

    #[tokio::test]
    async fn disabled_by_configuration_never_dials() {
        let config = RelayConfig {
            enabled: false,
            ..RelayConfig::default()
        };
        let relay = RelayPublisher::connect(&config).await;
        assert!(!relay.is_connected());
    }
}
