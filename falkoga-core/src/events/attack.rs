//! The attack event value type and its closed enumerations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Raised when a stored string does not map back onto a closed enumeration.
#[derive(Debug, Error)]
#[error("unknown {kind} value: {value}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

/// Attack classification. Closed set; serialized snake_case on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackType {
    BruteForce,
    Ddos,
    Malware,
    Scanning,
    Phishing,
}

impl AttackType {
    pub const ALL: [AttackType; 5] = [
        AttackType::BruteForce,
        AttackType::Ddos,
        AttackType::Malware,
        AttackType::Scanning,
        AttackType::Phishing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AttackType::BruteForce => "brute_force",
            AttackType::Ddos => "ddos",
            AttackType::Malware => "malware",
            AttackType::Scanning => "scanning",
            AttackType::Phishing => "phishing",
        }
    }
}

impl FromStr for AttackType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "brute_force" => Ok(AttackType::BruteForce),
            "ddos" => Ok(AttackType::Ddos),
            "malware" => Ok(AttackType::Malware),
            "scanning" => Ok(AttackType::Scanning),
            "phishing" => Ok(AttackType::Phishing),
            other => Err(ParseEnumError {
                kind: "attack type",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for AttackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport protocol of the simulated attack. Serialized upper-case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    Tcp,
    Udp,
    Icmp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
            Protocol::Icmp => "ICMP",
        }
    }
}

impl FromStr for Protocol {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TCP" => Ok(Protocol::Tcp),
            "UDP" => Ok(Protocol::Udp),
            "ICMP" => Ok(Protocol::Icmp),
            other => Err(ParseEnumError {
                kind: "protocol",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One attack occurrence. Created by the generator, immutable thereafter.
///
/// Field names follow the camelCase wire contract consumed by the
/// visualization front end; `timestamp` is epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackEvent {
    pub id: Uuid,
    pub source_ip: String,
    pub target_ip: String,
    pub source_lat: f64,
    pub source_lon: f64,
    pub target_lat: f64,
    pub target_lon: f64,
    /// ISO-3166 alpha-2 code. Always differs from `target_country`.
    pub source_country: String,
    pub target_country: String,
    #[serde(rename = "type")]
    pub attack_type: AttackType,
    /// 1..=10.
    pub severity: u8,
    pub port: u16,
    pub protocol: Protocol,
    /// Epoch milliseconds, assigned at creation time.
    #[serde(rename = "timestamp")]
    pub timestamp_ms: i64,
}

/// Derived per-country tally. Recomputed on each refresh, never persisted
/// as authoritative state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryCount {
    pub country: String,
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event() -> AttackEvent {
        AttackEvent {
            id: Uuid::new_v4(),
            source_ip: "203.0.113.7".into(),
            target_ip: "198.51.100.23".into(),
            source_lat: 35.86,
            source_lon: 104.2,
            target_lat: 37.09,
            target_lon: -95.71,
            source_country: "CN".into(),
            target_country: "US".into(),
            attack_type: AttackType::BruteForce,
            severity: 7,
            port: 443,
            protocol: Protocol::Tcp,
            timestamp_ms: 1_700_000_000_000,
        }
    }

    #[test]
    fn serializes_camel_case_wire_fields() {
        let value = serde_json::to_value(sample_event()).unwrap();
        let obj = value.as_object().unwrap();
        for key in [
            "id",
            "sourceIp",
            "targetIp",
            "sourceLat",
            "sourceLon",
            "targetLat",
            "targetLon",
            "sourceCountry",
            "targetCountry",
            "type",
            "severity",
            "port",
            "protocol",
            "timestamp",
        ] {
            assert!(obj.contains_key(key), "missing wire field {key}");
        }
        assert_eq!(obj["type"], "brute_force");
        assert_eq!(obj["protocol"], "TCP");
    }

    #[test]
    fn event_round_trips_through_json() {
        let event = sample_event();
        let json = serde_json::to_string(&event).unwrap();
        let back: AttackEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn attack_type_str_round_trip() {
        for ty in AttackType::ALL {
            assert_eq!(ty.as_str().parse::<AttackType>().unwrap(), ty);
        }
        assert!("tsunami".parse::<AttackType>().is_err());
    }

    #[test]
    fn protocol_str_round_trip() {
        for proto in [Protocol::Tcp, Protocol::Udp, Protocol::Icmp] {
            assert_eq!(proto.as_str().parse::<Protocol>().unwrap(), proto);
        }
        assert!("SCTP".parse::<Protocol>().is_err());
    }
}
