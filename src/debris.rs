// Debris Threat Generator - Synthetic debris population around a mission
// Band placement, circular-orbit kinematics, heuristic risk scoring and stats

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::time::Duration;
use tracing::debug;

use crate::physics_engine::{Vector3D, EARTH_RADIUS_KM, MU_EARTH_SIMPLIFIED_KM3_S2};

/// Threats produced per query
pub const DEFAULT_BATCH_SIZE: usize = 8;

/// Danger level at or above which a threat counts as high risk
pub const HIGH_RISK_DANGER_LEVEL: u8 = 7;

/// Upper bound of the heuristic collision probability
pub const MAX_COLLISION_PROBABILITY: f64 = 0.8;

/// First catalog number handed out within a batch
const CATALOG_BASE: usize = 10000;

// Attribute ranges [min, max)
const SIZE_RANGE_M: (f64, f64) = (0.5, 5.5);
const MASS_RANGE_KG: (f64, f64) = (100.0, 1100.0);
const CLOSEST_DISTANCE_RANGE_KM: (f64, f64) = (1.0, 51.0);
const MAX_TIME_TO_CLOSEST_MS: f64 = 2.0 * 3600.0 * 1000.0;

// =============================================================================
// DEBRIS RECORDS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebrisThreat {
    pub id: String,
    #[serde(rename = "norad_id")]
    pub catalog_id: String,
    pub name: String,
    pub position: Vector3D, // km
    pub velocity: Vector3D, // km/s
    #[serde(rename = "size")]
    pub size_meters: f64,
    #[serde(rename = "mass")]
    pub mass_kg: f64,
    /// Heuristic severity, 1-10
    pub danger_level: u8,
    #[serde(rename = "time_to_closest", with = "duration_millis")]
    pub time_to_closest_approach: Duration,
    #[serde(rename = "closest_distance")]
    pub closest_distance_km: f64,
    /// Heuristic score in [0, 0.8], not a physical probability
    pub collision_probability: f64,
    pub detected_at: DateTime<Utc>,
}

impl DebrisThreat {
    pub fn is_high_risk(&self, threshold: u8) -> bool {
        self.danger_level >= threshold
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DebrisStats {
    pub total_threats: usize,
    pub high_risk_count: usize,
    #[serde(rename = "collision_probability_avg")]
    pub average_collision_probability: f64,
    #[serde(rename = "avg_danger_level")]
    pub average_danger_level: f64,
}

impl DebrisStats {
    pub fn high_risk_fraction(&self) -> f64 {
        if self.total_threats == 0 {
            0.0
        } else {
            self.high_risk_count as f64 / self.total_threats as f64
        }
    }
}

// =============================================================================
// GENERATOR SETTINGS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DebrisSettings {
    pub batch_size: usize,
    pub high_risk_threshold: u8,
    pub min_altitude_km: f64,
    pub max_altitude_km: f64,
    /// Half-width of the cross-track position offset (km)
    pub cross_track_spread_km: f64,
    /// Half-width of the cross-track velocity perturbation (km/s)
    pub cross_track_velocity_spread_km_s: f64,
    pub max_collision_probability: f64,
}

impl Default for DebrisSettings {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            high_risk_threshold: HIGH_RISK_DANGER_LEVEL,
            min_altitude_km: 400.0,
            max_altitude_km: 1000.0,
            cross_track_spread_km: 100.0,
            cross_track_velocity_spread_km_s: 0.25,
            max_collision_probability: MAX_COLLISION_PROBABILITY,
        }
    }
}

impl DebrisSettings {
    /// Generate a fresh batch of threats for `mission_id`.
    ///
    /// Threats sit evenly spaced by angle on a circular band in the x-z plane,
    /// y being the cross-track axis. Each call is an independent sample; ids are
    /// unique within the batch only.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        mission_id: &str,
        detected_at: DateTime<Utc>,
        rng: &mut R,
    ) -> Vec<DebrisThreat> {
        let count = self.batch_size;
        let mut threats = Vec::with_capacity(count);

        for i in 0..count {
            // Placement
            let altitude = self.min_altitude_km
                + rng.gen::<f64>() * (self.max_altitude_km - self.min_altitude_km);
            let angle = (i as f64 / count as f64) * 2.0 * PI;
            let radius = EARTH_RADIUS_KM + altitude;
            let position = Vector3D::new(
                angle.cos() * radius,
                (rng.gen::<f64>() - 0.5) * 2.0 * self.cross_track_spread_km,
                angle.sin() * radius,
            );

            // Kinematics: circular speed along the band tangent
            let orbital_speed = (MU_EARTH_SIMPLIFIED_KM3_S2 / radius).sqrt();
            let velocity = Vector3D::new(
                -angle.sin() * orbital_speed,
                (rng.gen::<f64>() - 0.5) * 2.0 * self.cross_track_velocity_spread_km_s,
                angle.cos() * orbital_speed,
            );

            // Scoring
            let danger_level: u8 = rng.gen_range(1..=10);
            let collision_probability = f64::from(danger_level) / 10.0
                * rng.gen::<f64>()
                * self.max_collision_probability;
            let time_to_closest_approach =
                Duration::from_millis((rng.gen::<f64>() * MAX_TIME_TO_CLOSEST_MS) as u64);
            let closest_distance_km = uniform(rng, CLOSEST_DISTANCE_RANGE_KM);

            threats.push(DebrisThreat {
                id: format!("{}_debris_{}", mission_id, i),
                catalog_id: format!("NORAD-{}", CATALOG_BASE + i),
                name: format!("Debris {}", i + 1),
                position,
                velocity,
                size_meters: uniform(rng, SIZE_RANGE_M),
                mass_kg: uniform(rng, MASS_RANGE_KG),
                danger_level,
                time_to_closest_approach,
                closest_distance_km,
                collision_probability,
                detected_at,
            });
        }

        debug!(mission_id = %mission_id, count = threats.len(), "Generated debris threats");
        threats
    }

    /// Fold a threat set into summary statistics using this high-risk threshold
    pub fn compute_stats(&self, threats: &[DebrisThreat]) -> DebrisStats {
        if threats.is_empty() {
            return DebrisStats::default();
        }

        let (high_risk_count, probability_sum, danger_sum) =
            threats
                .iter()
                .fold((0usize, 0.0f64, 0u64), |(high, prob, danger), threat| {
                    (
                        high + usize::from(threat.is_high_risk(self.high_risk_threshold)),
                        prob + threat.collision_probability,
                        danger + u64::from(threat.danger_level),
                    )
                });

        let total = threats.len();
        DebrisStats {
            total_threats: total,
            high_risk_count,
            average_collision_probability: probability_sum / total as f64,
            average_danger_level: danger_sum as f64 / total as f64,
        }
    }
}

fn uniform<R: Rng + ?Sized>(rng: &mut R, (min, max): (f64, f64)) -> f64 {
    min + rng.gen::<f64>() * (max - min)
}

/// Generate threats with the default settings
pub fn generate_threats<R: Rng + ?Sized>(
    mission_id: &str,
    detected_at: DateTime<Utc>,
    rng: &mut R,
) -> Vec<DebrisThreat> {
    DebrisSettings::default().generate(mission_id, detected_at, rng)
}

/// Summary statistics with the default high-risk threshold (danger level 7)
pub fn compute_stats(threats: &[DebrisThreat]) -> DebrisStats {
    DebrisSettings::default().compute_stats(threats)
}

/// Serializes a `Duration` as integer milliseconds
mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

// =============================================================================
// TESTS
// =============================================================================
