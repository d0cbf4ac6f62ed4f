// Maneuver Engine - Impulsive thrust application
// Delta-v, fuel cost and the resulting orbit state for a commanded burn

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::orbit::{compute_altitude, derive_elements, OrbitElements, OrbitState};
use crate::physics_engine::Vector3D;

// =============================================================================
// MANEUVER MODEL CONSTANTS
// =============================================================================

/// Fixed reference spacecraft mass (kg)
pub const REFERENCE_MASS_KG: f64 = 1000.0;

/// Factor applied to the burn duration before integrating acceleration.
/// Kept at 1/1000 so results stay numerically identical to the existing service.
pub const DURATION_SCALE: f64 = 1.0 / 1000.0;

/// Fuel consumed per newton-second of thrust (kg/(N·s))
pub const FUEL_CONSUMPTION_RATE: f64 = 0.01;

/// Nominal fuel pool each maneuver is measured against (kg)
pub const FUEL_BASELINE_KG: f64 = 100.0;

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Error, PartialEq)]
pub enum ManeuverError {
    #[error("invalid maneuver input: {0}")]
    InvalidInput(String),
    #[error("delta-v of {requested_ms:.3} m/s exceeds the {limit_ms:.3} m/s limit")]
    ExcessiveDeltaV { requested_ms: f64, limit_ms: f64 },
    #[error("burn needs {required_kg:.3} kg of fuel but only {available_kg:.3} kg remain")]
    InsufficientFuel { required_kg: f64, available_kg: f64 },
    #[error("no fuel record for satellite '{0}'")]
    UnknownSatellite(String),
}

// =============================================================================
// MANEUVER REQUEST / RESULT
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Maneuver {
    pub satellite_id: String,
    /// Thrust vector (N)
    pub thrust_vector: Vector3D,
    #[serde(rename = "duration")]
    pub duration_seconds: f64,
    #[serde(rename = "start_time")]
    pub requested_at: DateTime<Utc>,
}

impl Maneuver {
    pub fn new(
        satellite_id: impl Into<String>,
        thrust_vector: Vector3D,
        duration_seconds: f64,
        requested_at: DateTime<Utc>,
    ) -> Self {
        Self {
            satellite_id: satellite_id.into(),
            thrust_vector,
            duration_seconds,
            requested_at,
        }
    }

    /// Identifier reported back to the caller, keyed by request second
    pub fn maneuver_id(&self) -> String {
        format!("maneuver_{}", self.requested_at.timestamp())
    }

    /// Field checks for the calling layer. `ManeuverModel::execute` assumes
    /// input that already passed these.
    pub fn validate(&self) -> Result<(), ManeuverError> {
        if self.satellite_id.trim().is_empty() {
            return Err(ManeuverError::InvalidInput(
                "satellite_id must not be empty".to_string(),
            ));
        }
        if !self.thrust_vector.is_finite() {
            return Err(ManeuverError::InvalidInput(format!(
                "thrust vector has non-finite components: {:?}",
                self.thrust_vector
            )));
        }
        if !self.duration_seconds.is_finite() || self.duration_seconds < 0.0 {
            return Err(ManeuverError::InvalidInput(format!(
                "duration must be a finite, non-negative number of seconds (got {})",
                self.duration_seconds
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManeuverResult {
    pub success: bool,
    pub maneuver_id: String,
    pub new_velocity: Vector3D, // km/s
    #[serde(rename = "new_altitude")]
    pub new_altitude_km: f64,
    #[serde(rename = "fuel_consumed")]
    pub fuel_consumed_kg: f64,
    #[serde(rename = "fuel_remaining")]
    pub fuel_remaining_kg: f64,
    /// Delta-v magnitude (m/s)
    #[serde(rename = "delta_v")]
    pub delta_v_ms: f64,
    #[serde(rename = "orbit_elements")]
    pub new_elements: OrbitElements,
}

impl ManeuverResult {
    /// Orbit state after the burn. Position is unchanged under the impulse model.
    pub fn resulting_state(&self, current: &OrbitState) -> OrbitState {
        OrbitState {
            position: current.position,
            velocity: self.new_velocity,
            elements: self.new_elements.clone(),
        }
    }
}

/// Opt-in failure modes for `ManeuverModel::execute_checked`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ManeuverLimits {
    pub max_delta_v_ms: Option<f64>,
    pub enforce_fuel_budget: bool,
}

impl Default for ManeuverLimits {
    fn default() -> Self {
        Self {
            max_delta_v_ms: None,
            enforce_fuel_budget: true,
        }
    }
}

// =============================================================================
// MANEUVER MODEL
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ManeuverModel {
    pub reference_mass_kg: f64,
    pub duration_scale: f64,
    pub fuel_consumption_rate: f64,
    pub fuel_baseline_kg: f64,
}

impl Default for ManeuverModel {
    fn default() -> Self {
        Self {
            reference_mass_kg: REFERENCE_MASS_KG,
            duration_scale: DURATION_SCALE,
            fuel_consumption_rate: FUEL_CONSUMPTION_RATE,
            fuel_baseline_kg: FUEL_BASELINE_KG,
        }
    }
}

impl ManeuverModel {
    /// Δv = (F / m) * (t * duration_scale), in km/s
    pub fn delta_v(&self, thrust: &Vector3D, duration_seconds: f64) -> Vector3D {
        let acceleration = thrust.scale(1.0 / self.reference_mass_kg);
        acceleration.scale(duration_seconds * self.duration_scale)
    }

    pub fn fuel_consumption(&self, thrust_magnitude: f64, duration_seconds: f64) -> f64 {
        thrust_magnitude * duration_seconds * self.fuel_consumption_rate
    }

    /// Apply a burn to `current`. Every maneuver succeeds on this path and fuel
    /// is measured against the nominal baseline, so `fuel_remaining_kg` can go
    /// negative for long burns.
    pub fn execute(&self, maneuver: &Maneuver, current: &OrbitState) -> ManeuverResult {
        let fuel_consumed =
            self.fuel_consumption(maneuver.thrust_vector.magnitude(), maneuver.duration_seconds);
        let fuel_remaining = self.fuel_baseline_kg - fuel_consumed;

        if fuel_remaining < 0.0 {
            warn!(
                satellite_id = %maneuver.satellite_id,
                fuel_consumed_kg = fuel_consumed,
                baseline_kg = self.fuel_baseline_kg,
                "Burn exceeds nominal fuel baseline"
            );
        }

        self.build_result(maneuver, current, fuel_consumed, fuel_remaining)
    }

    /// Like `execute`, but rejects invalid input, oversized burns and burns the
    /// available fuel cannot cover.
    pub fn execute_checked(
        &self,
        maneuver: &Maneuver,
        current: &OrbitState,
        limits: &ManeuverLimits,
        available_fuel_kg: f64,
    ) -> Result<ManeuverResult, ManeuverError> {
        maneuver.validate()?;

        let delta_v_ms =
            self.delta_v(&maneuver.thrust_vector, maneuver.duration_seconds).magnitude() * 1000.0;
        if let Some(limit_ms) = limits.max_delta_v_ms {
            if delta_v_ms > limit_ms {
                warn!(
                    satellite_id = %maneuver.satellite_id,
                    delta_v_ms,
                    limit_ms,
                    "Maneuver rejected"
                );
                return Err(ManeuverError::ExcessiveDeltaV {
                    requested_ms: delta_v_ms,
                    limit_ms,
                });
            }
        }

        let fuel_consumed =
            self.fuel_consumption(maneuver.thrust_vector.magnitude(), maneuver.duration_seconds);
        if limits.enforce_fuel_budget && fuel_consumed > available_fuel_kg {
            warn!(
                satellite_id = %maneuver.satellite_id,
                required_kg = fuel_consumed,
                available_kg = available_fuel_kg,
                "Maneuver rejected"
            );
            return Err(ManeuverError::InsufficientFuel {
                required_kg: fuel_consumed,
                available_kg: available_fuel_kg,
            });
        }

        Ok(self.build_result(
            maneuver,
            current,
            fuel_consumed,
            available_fuel_kg - fuel_consumed,
        ))
    }

    fn build_result(
        &self,
        maneuver: &Maneuver,
        current: &OrbitState,
        fuel_consumed_kg: f64,
        fuel_remaining_kg: f64,
    ) -> ManeuverResult {
        let delta_v = self.delta_v(&maneuver.thrust_vector, maneuver.duration_seconds);
        let new_velocity = current.velocity.add(&delta_v);
        let new_elements = derive_elements(&current.position, &new_velocity, maneuver.requested_at);

        debug!(
            satellite_id = %maneuver.satellite_id,
            delta_v_km_s = delta_v.magnitude(),
            fuel_consumed_kg,
            semi_major_axis_km = new_elements.semi_major_axis,
            "Maneuver applied"
        );

        ManeuverResult {
            success: true,
            maneuver_id: maneuver.maneuver_id(),
            new_velocity,
            new_altitude_km: compute_altitude(&current.position),
            fuel_consumed_kg,
            fuel_remaining_kg,
            delta_v_ms: delta_v.magnitude() * 1000.0,
            new_elements,
        }
    }
}

/// Apply a maneuver with the default model constants
pub fn execute_maneuver(maneuver: &Maneuver, current: &OrbitState) -> ManeuverResult {
    ManeuverModel::default().execute(maneuver, current)
}

// =============================================================================
// TESTS
// =============================================================================
