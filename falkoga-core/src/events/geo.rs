//! Static geography and port tables driving event synthesis.
//!
//! Source and target weights bias random country selection independently,
//! modeling the geographic skew of common attack origins and victims.
//! Centroids are country centers; the generator jitters around them so
//! arcs do not render on exactly overlapping points.

use super::Protocol;

/// One row of the country weight table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CountryProfile {
    /// ISO-3166 alpha-2 code.
    pub code: &'static str,
    pub lat: f64,
    pub lon: f64,
    /// Relative likelihood of appearing as the attack source.
    pub source_weight: u32,
    /// Relative likelihood of appearing as the attack target.
    pub target_weight: u32,
}

const fn profile(
    code: &'static str,
    lat: f64,
    lon: f64,
    source_weight: u32,
    target_weight: u32,
) -> CountryProfile {
    CountryProfile {
        code,
        lat,
        lon,
        source_weight,
        target_weight,
    }
}

pub const COUNTRY_PROFILES: [CountryProfile; 20] = [
    profile("CN", 35.86, 104.2, 20, 3),
    profile("RU", 61.52, 105.32, 15, 4),
    profile("US", 37.09, -95.71, 10, 25),
    profile("BR", -14.24, -51.93, 8, 5),
    profile("IN", 20.59, 78.96, 7, 4),
    profile("DE", 51.17, 10.45, 4, 10),
    profile("GB", 55.38, -3.44, 3, 8),
    profile("JP", 36.2, 138.25, 2, 7),
    profile("FR", 46.23, 2.21, 3, 6),
    profile("KR", 35.91, 127.77, 4, 5),
    profile("NL", 52.13, 5.29, 3, 5),
    profile("UA", 48.38, 31.17, 5, 3),
    profile("IR", 32.43, 53.69, 4, 2),
    profile("VN", 14.06, 108.28, 3, 2),
    profile("AU", -25.27, 133.78, 2, 4),
    profile("CA", 56.13, -106.35, 2, 4),
    profile("SG", 1.35, 103.82, 2, 3),
    profile("ZA", -30.56, 22.94, 2, 2),
    profile("AR", -38.42, -63.62, 1, 1),
    profile("NG", 9.08, 8.68, 3, 1),
];

/// The fixed set of ports attacks are drawn against.
pub const WELL_KNOWN_PORTS: [u16; 12] = [
    22, 80, 443, 3389, 8080, 25, 53, 445, 1433, 3306, 5432, 27017,
];

pub const PROTOCOLS: [Protocol; 3] = [Protocol::Tcp, Protocol::Udp, Protocol::Icmp];
