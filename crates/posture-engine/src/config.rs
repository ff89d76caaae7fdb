//! Simulation tuning knobs

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tuning parameters for the drift scheduler and incident simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Period between scheduler ticks
    #[serde(with = "duration_secs")]
    pub tick_period: Duration,

    /// Base drift added per tick before automation scaling
    pub drift_base_rate: f64,

    /// Drift factor at which a compliant control breaches
    pub drift_threshold: f64,

    /// Chance per tick of a spontaneous archetype incident
    pub incident_probability: f64,

    /// Synthesize a low/medium incident when drift breaches
    pub synthesize_drift_incidents: bool,

    /// Review cadence applied when a control is promoted back to compliant
    pub review_interval_days: i64,

    /// Fixed RNG seed; None draws from entropy
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_period: Duration::from_secs(10),
            drift_base_rate: 0.02,
            drift_threshold: 0.7,
            incident_probability: 0.15,
            synthesize_drift_incidents: true,
            review_interval_days: 90,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Deterministic config for tests: seeded RNG, no spontaneous events
    pub fn deterministic(seed: u64) -> Self {
        Self {
            incident_probability: 0.0,
            synthesize_drift_incidents: false,
            seed: Some(seed),
            ..Self::default()
        }
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where S: Serializer {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where D: Deserializer<'de> {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_roundtrips_through_json() {
        let config = SimulationConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: SimulationConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.tick_period, Duration::from_secs(10));
        assert_eq!(back.drift_threshold, 0.7);
    }

    #[test]
    fn deterministic_disables_randomness() {
        let config = SimulationConfig::deterministic(7);
        assert_eq!(config.incident_probability, 0.0);
        assert!(!config.synthesize_drift_incidents);
        assert_eq!(config.seed, Some(7));
    }
}
