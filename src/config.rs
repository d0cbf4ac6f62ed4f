// Configuration - Model constants with environment overrides
// Reads a .env file when present, then ORBITCORE_* variables

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

use crate::debris::DebrisSettings;
use crate::maneuver::ManeuverModel;

pub const ENV_REFERENCE_MASS_KG: &str = "ORBITCORE_REFERENCE_MASS_KG";
pub const ENV_DURATION_SCALE: &str = "ORBITCORE_DURATION_SCALE";
pub const ENV_FUEL_RATE: &str = "ORBITCORE_FUEL_RATE";
pub const ENV_FUEL_BASELINE_KG: &str = "ORBITCORE_FUEL_BASELINE_KG";
pub const ENV_DEBRIS_BATCH_SIZE: &str = "ORBITCORE_DEBRIS_BATCH_SIZE";
pub const ENV_HIGH_RISK_THRESHOLD: &str = "ORBITCORE_HIGH_RISK_THRESHOLD";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {key}")]
    Invalid { key: String, value: String },
    #[error("configuration out of range: {0}")]
    OutOfRange(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CoreConfig {
    pub maneuver: ManeuverModel,
    pub debris: DebrisSettings,
}

impl CoreConfig {
    /// Load from the process environment, after merging a `.env` file if one exists
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is not an error
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let (m, d) = (defaults.maneuver, defaults.debris);

        let maneuver = ManeuverModel {
            reference_mass_kg: read(&lookup, ENV_REFERENCE_MASS_KG, m.reference_mass_kg)?,
            duration_scale: read(&lookup, ENV_DURATION_SCALE, m.duration_scale)?,
            fuel_consumption_rate: read(&lookup, ENV_FUEL_RATE, m.fuel_consumption_rate)?,
            fuel_baseline_kg: read(&lookup, ENV_FUEL_BASELINE_KG, m.fuel_baseline_kg)?,
        };

        let debris = DebrisSettings {
            batch_size: read(&lookup, ENV_DEBRIS_BATCH_SIZE, d.batch_size)?,
            high_risk_threshold: read(&lookup, ENV_HIGH_RISK_THRESHOLD, d.high_risk_threshold)?,
            ..d
        };

        let config = Self { maneuver, debris };
        config.validate()?;

        debug!(?config, "Loaded orbit core configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let m = &self.maneuver;
        if !(m.reference_mass_kg.is_finite() && m.reference_mass_kg > 0.0) {
            return Err(ConfigError::OutOfRange(format!(
                "reference mass must be positive (got {})",
                m.reference_mass_kg
            )));
        }
        if !(m.duration_scale.is_finite() && m.duration_scale > 0.0) {
            return Err(ConfigError::OutOfRange(format!(
                "duration scale must be positive (got {})",
                m.duration_scale
            )));
        }
        if !(m.fuel_consumption_rate.is_finite() && m.fuel_consumption_rate >= 0.0) {
            return Err(ConfigError::OutOfRange(format!(
                "fuel consumption rate must be non-negative (got {})",
                m.fuel_consumption_rate
            )));
        }
        if !m.fuel_baseline_kg.is_finite() {
            return Err(ConfigError::OutOfRange("fuel baseline must be finite".to_string()));
        }

        let d = &self.debris;
        if d.batch_size == 0 {
            return Err(ConfigError::OutOfRange("debris batch size must be at least 1".to_string()));
        }
        if !(1..=10).contains(&d.high_risk_threshold) {
            return Err(ConfigError::OutOfRange(format!(
                "high risk threshold must be within 1..=10 (got {})",
                d.high_risk_threshold
            )));
        }
        if !(d.min_altitude_km >= 0.0 && d.min_altitude_km < d.max_altitude_km) {
            return Err(ConfigError::OutOfRange(format!(
                "debris altitude band [{}, {}] km is empty",
                d.min_altitude_km, d.max_altitude_km
            )));
        }
        if !(0.0..=1.0).contains(&d.max_collision_probability) {
            return Err(ConfigError::OutOfRange(format!(
                "collision probability cap must be within [0, 1] (got {})",
                d.max_collision_probability
            )));
        }
        Ok(())
    }
}

fn read<T, F>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => {
            raw.trim().parse::<T>().map_err(|_| ConfigError::Invalid {
                key: key.to_string(),
                value: raw,
            })
        }
        _ => Ok(default),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debris::DEFAULT_BATCH_SIZE;
    use crate::maneuver::{DURATION_SCALE, REFERENCE_MASS_KG};
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = CoreConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.maneuver.reference_mass_kg, REFERENCE_MASS_KG);
        assert_eq!(config.maneuver.duration_scale, DURATION_SCALE);
        assert_eq!(config.debris.batch_size, DEFAULT_BATCH_SIZE);
    }

    #[test]
    fn test_overrides() {
        let config = CoreConfig::from_lookup(lookup_from(&[
            (ENV_REFERENCE_MASS_KG, "250"),
            (ENV_DEBRIS_BATCH_SIZE, " 12 "),
            (ENV_HIGH_RISK_THRESHOLD, "9"),
            (ENV_FUEL_BASELINE_KG, ""),
        ]))
        .unwrap();

        assert_eq!(config.maneuver.reference_mass_kg, 250.0);
        assert_eq!(config.debris.batch_size, 12);
        assert_eq!(config.debris.high_risk_threshold, 9);
        assert_eq!(config.maneuver.fuel_baseline_kg, 100.0);
    }

    #[test]
    fn test_unparsable_value() {
        let err = CoreConfig::from_lookup(lookup_from(&[(ENV_FUEL_RATE, "lots")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                key: ENV_FUEL_RATE.to_string(),
                value: "lots".to_string(),
            }
        );
    }

    #[test]
    fn test_out_of_range_values() {
        assert!(matches!(
            CoreConfig::from_lookup(lookup_from(&[(ENV_REFERENCE_MASS_KG, "0")])),
            Err(ConfigError::OutOfRange(_))
        ));
        assert!(matches!(
            CoreConfig::from_lookup(lookup_from(&[(ENV_DEBRIS_BATCH_SIZE, "0")])),
            Err(ConfigError::OutOfRange(_))
        ));
        assert!(matches!(
            CoreConfig::from_lookup(lookup_from(&[(ENV_HIGH_RISK_THRESHOLD, "11")])),
            Err(ConfigError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_inverted_altitude_band() {
        let mut config = CoreConfig::default();
        config.debris.min_altitude_km = 900.0;
        config.debris.max_altitude_km = 500.0;
        assert!(config.validate().is_err());
    }
}
