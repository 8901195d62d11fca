//! Attack event types, static geography tables, and wire frames.

mod attack;
mod geo;
mod wire;

pub use attack::{AttackEvent, AttackType, CountryCount, ParseEnumError, Protocol};
pub use geo::{CountryProfile, COUNTRY_PROFILES, PROTOCOLS, WELL_KNOWN_PORTS};
pub use wire::Frame;
