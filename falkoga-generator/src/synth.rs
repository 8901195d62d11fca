//! Per-event synthesis: weighted country and type sampling, coordinate
//! jitter, and the bounded rejection loop keeping source and target
//! countries distinct.

use chrono::Utc;
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::seq::IndexedRandom;
use rand::Rng;
use uuid::Uuid;

use falkoga_config::GeneratorConfig;
use falkoga_core::events::{
    AttackEvent, AttackType, CountryProfile, COUNTRY_PROFILES, PROTOCOLS, WELL_KNOWN_PORTS,
};

/// Relative likelihood of each attack type when not forced.
const TYPE_WEIGHTS: [(AttackType, u32); 5] = [
    (AttackType::BruteForce, 35),
    (AttackType::Scanning, 25),
    (AttackType::Ddos, 15),
    (AttackType::Malware, 15),
    (AttackType::Phishing, 10),
];

/// Precomputed samplers for one generator instance.
pub struct Synthesizer {
    countries: &'static [CountryProfile],
    source_index: WeightedIndex<u32>,
    target_index: WeightedIndex<u32>,
    type_index: WeightedIndex<u32>,
    jitter_degrees: f64,
    target_retry_limit: u32,
}

impl Synthesizer {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self::with_countries(config, &COUNTRY_PROFILES)
    }

    /// Build against an explicit country table. Tests use this to probe
    /// the rejection-loop bound with adversarial tables.
    pub fn with_countries(config: &GeneratorConfig, countries: &'static [CountryProfile]) -> Self {
        let source_index = WeightedIndex::new(countries.iter().map(|c| c.source_weight))
            .expect("country table has positive source weights");
        let target_index = WeightedIndex::new(countries.iter().map(|c| c.target_weight))
            .expect("country table has positive target weights");
        let type_index = WeightedIndex::new(TYPE_WEIGHTS.iter().map(|(_, w)| *w))
            .expect("attack type table has positive weights");
        Self {
            countries,
            source_index,
            target_index,
            type_index,
            jitter_degrees: config.jitter_degrees,
            target_retry_limit: config.target_retry_limit,
        }
    }

    /// Synthesizes a batch, preserving generation order.
    pub fn batch(&self, count: usize, forced: Option<AttackType>) -> Vec<AttackEvent> {
        (0..count).map(|_| self.generate(forced)).collect()
    }

    /// Synthesizes one event.
    ///
    /// # Panics
    /// If no distinct target country is found within the configured retry
    /// bound. The shipped weight table always offers an alternative, so
    /// hitting the bound is a programming error, not a runtime condition.
    pub fn generate(&self, forced: Option<AttackType>) -> AttackEvent {
        let mut rng = rand::rng();

        let source = &self.countries[self.source_index.sample(&mut rng)];
        let mut target = &self.countries[self.target_index.sample(&mut rng)];
        let mut attempts = 0u32;
        while target.code == source.code {
            attempts += 1;
            assert!(
                attempts <= self.target_retry_limit,
                "no distinct target country within {} draws; weight table is defective",
                self.target_retry_limit
            );
            target = &self.countries[self.target_index.sample(&mut rng)];
        }

        let attack_type = forced.unwrap_or_else(|| TYPE_WEIGHTS[self.type_index.sample(&mut rng)].0);

        AttackEvent {
            id: Uuid::new_v4(),
            source_ip: random_ip(&mut rng),
            target_ip: random_ip(&mut rng),
            source_lat: self.jitter(source.lat, &mut rng),
            source_lon: self.jitter(source.lon, &mut rng),
            target_lat: self.jitter(target.lat, &mut rng),
            target_lon: self.jitter(target.lon, &mut rng),
            source_country: source.code.to_string(),
            target_country: target.code.to_string(),
            attack_type,
            severity: rng.random_range(1..=10),
            port: *WELL_KNOWN_PORTS
                .choose(&mut rng)
                .expect("port table is non-empty"),
            protocol: *PROTOCOLS
                .choose(&mut rng)
                .expect("protocol table is non-empty"),
            timestamp_ms: Utc::now().timestamp_millis(),
        }
    }

    fn jitter(&self, value: f64, rng: &mut impl Rng) -> f64 {
        value + (rng.random::<f64>() - 0.5) * self.jitter_degrees * 2.0
    }
}

fn random_ip(rng: &mut impl Rng) -> String {
    format!(
        "{}.{}.{}.{}",
        rng.random_range(1..=223u16),
        rng.random_range(0..=255u16),
        rng.random_range(0..=255u16),
        rng.random_range(0..=255u16)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use falkoga_core::events::Protocol;
    use proptest::prelude::*;

    fn synthesizer() -> Synthesizer {
        Synthesizer::new(&GeneratorConfig::default())
    }

    fn is_dotted_quad(ip: &str) -> bool {
        let octets: Vec<_> = ip.split('.').collect();
        octets.len() == 4 && octets.iter().all(|o| o.parse::<u8>().is_ok())
    }

    proptest! {
        #[test]
        fn generated_events_satisfy_schema_invariants(_seed in 0u32..200) {
            let synth = synthesizer();
            let event = synth.generate(None);

            prop_assert_ne!(&event.source_country, &event.target_country);
            prop_assert!((1..=10).contains(&event.severity));
            prop_assert!(WELL_KNOWN_PORTS.contains(&event.port));
            prop_assert!(matches!(
                event.protocol,
                Protocol::Tcp | Protocol::Udp | Protocol::Icmp
            ));
            prop_assert!(AttackType::ALL.contains(&event.attack_type));
            prop_assert!(is_dotted_quad(&event.source_ip));
            prop_assert!(is_dotted_quad(&event.target_ip));
        }

        #[test]
        fn coordinates_stay_within_jitter_of_centroids(_seed in 0u32..200) {
            let config = GeneratorConfig::default();
            let synth = Synthesizer::new(&config);
            let event = synth.generate(None);

            let source = COUNTRY_PROFILES
                .iter()
                .find(|c| c.code == event.source_country)
                .unwrap();
            prop_assert!((event.source_lat - source.lat).abs() <= config.jitter_degrees);
            prop_assert!((event.source_lon - source.lon).abs() <= config.jitter_degrees);
        }
    }

    #[test]
    fn forced_type_overrides_weighted_sampling() {
        let synth = synthesizer();
        for event in synth.batch(50, Some(AttackType::Ddos)) {
            assert_eq!(event.attack_type, AttackType::Ddos);
        }
    }

    #[test]
    fn batch_has_requested_length() {
        assert_eq!(synthesizer().batch(17, None).len(), 17);
    }

    static LONELY_COUNTRY: [CountryProfile; 1] = [CountryProfile {
        code: "SE",
        lat: 60.13,
        lon: 18.64,
        source_weight: 1,
        target_weight: 1,
    }];

    #[test]
    #[should_panic(expected = "weight table is defective")]
    fn single_country_table_trips_the_retry_bound() {
        let mut config = GeneratorConfig::default();
        config.target_retry_limit = 8;
        let synth = Synthesizer::with_countries(&config, &LONELY_COUNTRY);
        synth.generate(None);
    }
}
