//! Serialized message shapes pushed to live subscribers.
//!
//! A batch of exactly one event uses the distinguished single-event shape;
//! anything larger uses the batch shape. The distinction is part of the
//! wire contract with the front end, not an optimization.

use serde::Serialize;

use super::AttackEvent;

/// Outbound subscriber frame: `{"type": "attack"|"batch", "data": ...}`.
#[derive(Debug, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Frame<'a> {
    Attack(&'a AttackEvent),
    Batch(&'a [AttackEvent]),
}

impl<'a> Frame<'a> {
    /// Picks the frame shape for a non-empty slice of events.
    pub fn for_events(events: &'a [AttackEvent]) -> Frame<'a> {
        if events.len() == 1 {
            Frame::Attack(&events[0])
        } else {
            Frame::Batch(events)
        }
    }

    /// Serializes the frame once; the hub shares the result across subscribers.
    pub fn encode(&self) -> String {
        serde_json::to_string(self).expect("wire frame serialization cannot fail")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{AttackType, Protocol};
    use uuid::Uuid;

    fn event(ty: AttackType) -> AttackEvent {
        AttackEvent {
            id: Uuid::new_v4(),
            source_ip: "10.0.0.1".into(),
            target_ip: "10.0.0.2".into(),
            source_lat: 0.0,
            source_lon: 0.0,
            target_lat: 1.0,
            target_lon: 1.0,
            source_country: "CN".into(),
            target_country: "US".into(),
            attack_type: ty,
            severity: 5,
            port: 22,
            protocol: Protocol::Udp,
            timestamp_ms: 1,
        }
    }

    #[test]
    fn single_event_uses_attack_shape() {
        let events = vec![event(AttackType::Ddos)];
        let value: serde_json::Value =
            serde_json::from_str(&Frame::for_events(&events).encode()).unwrap();
        assert_eq!(value["type"], "attack");
        assert_eq!(value["data"]["type"], "ddos");
    }

    #[test]
    fn multiple_events_use_batch_shape() {
        let events = vec![event(AttackType::Ddos), event(AttackType::Phishing)];
        let value: serde_json::Value =
            serde_json::from_str(&Frame::for_events(&events).encode()).unwrap();
        assert_eq!(value["type"], "batch");
        assert_eq!(value["data"].as_array().unwrap().len(), 2);
    }
}
