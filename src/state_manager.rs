// State Manager - Caller-facing operations and explicit satellite state
// The models stay pure; per-satellite fuel lives in a ledger owned by the caller

use chrono::Utc;
use parking_lot::RwLock;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::{ConfigError, CoreConfig};
use crate::debris::{DebrisStats, DebrisThreat};
use crate::maneuver::{Maneuver, ManeuverError, ManeuverLimits, ManeuverResult};
use crate::orbit::{get_current_orbit, OrbitState};

// =============================================================================
// FUEL LEDGER
// =============================================================================

/// Remaining fuel per satellite (kg)
#[derive(Debug, Clone, Default)]
pub struct FuelLedger {
    fuel_kg: HashMap<String, f64>,
}

/// Ledger shared between worker threads of the service layer
pub type SharedFuelLedger = Arc<RwLock<FuelLedger>>;

impl FuelLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(self) -> SharedFuelLedger {
        Arc::new(RwLock::new(self))
    }

    /// Set the fuel on board, replacing any previous record
    pub fn register(&mut self, satellite_id: impl Into<String>, fuel_kg: f64) {
        self.fuel_kg.insert(satellite_id.into(), fuel_kg);
    }

    pub fn remaining(&self, satellite_id: &str) -> Option<f64> {
        self.fuel_kg.get(satellite_id).copied()
    }

    /// Subtract `amount_kg` and return the new balance.
    ///
    /// Errors are `ManeuverError` because a debit only happens as the fuel
    /// check of a burn, and the tracked maneuver path returns them unchanged.
    pub fn debit(&mut self, satellite_id: &str, amount_kg: f64) -> Result<f64, ManeuverError> {
        let fuel = self
            .fuel_kg
            .get_mut(satellite_id)
            .ok_or_else(|| ManeuverError::UnknownSatellite(satellite_id.to_string()))?;
        if amount_kg > *fuel {
            return Err(ManeuverError::InsufficientFuel {
                required_kg: amount_kg,
                available_kg: *fuel,
            });
        }
        *fuel -= amount_kg;
        Ok(*fuel)
    }

    pub fn len(&self) -> usize {
        self.fuel_kg.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fuel_kg.is_empty()
    }
}

// =============================================================================
// FLIGHT DYNAMICS FACADE
// =============================================================================

/// Entry point for the service layer. Holds only immutable configuration, so
/// one instance can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct FlightDynamics {
    config: CoreConfig,
}

impl FlightDynamics {
    pub fn new(config: CoreConfig) -> Self {
        Self { config }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(CoreConfig::from_env()?))
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn get_current_orbit(&self, satellite_id: &str) -> OrbitState {
        get_current_orbit(satellite_id, Utc::now())
    }

    /// Run a maneuver against the satellite's current orbit
    pub fn execute_maneuver(&self, maneuver: &Maneuver) -> ManeuverResult {
        let current = get_current_orbit(&maneuver.satellite_id, maneuver.requested_at);
        self.config.maneuver.execute(maneuver, &current)
    }

    /// Generate threats with a generator seeded from OS entropy for this call only
    pub fn generate_debris_threats(&self, mission_id: &str) -> Vec<DebrisThreat> {
        let mut rng = StdRng::from_entropy();
        self.generate_debris_threats_with(mission_id, &mut rng)
    }

    pub fn generate_debris_threats_with<R: Rng + ?Sized>(
        &self,
        mission_id: &str,
        rng: &mut R,
    ) -> Vec<DebrisThreat> {
        self.config.debris.generate(mission_id, Utc::now(), rng)
    }

    pub fn compute_debris_stats(&self, threats: &[DebrisThreat]) -> DebrisStats {
        self.config.debris.compute_stats(threats)
    }

    /// Execute a maneuver against the fuel recorded in `ledger` and debit it on
    /// success. The write lock covers lookup, execution and debit so concurrent
    /// burns for one satellite cannot overdraw it.
    pub fn execute_tracked_maneuver(
        &self,
        maneuver: &Maneuver,
        ledger: &SharedFuelLedger,
        limits: &ManeuverLimits,
    ) -> Result<ManeuverResult, ManeuverError> {
        let current = get_current_orbit(&maneuver.satellite_id, maneuver.requested_at);

        let mut ledger = ledger.write();
        let available = ledger
            .remaining(&maneuver.satellite_id)
            .ok_or_else(|| ManeuverError::UnknownSatellite(maneuver.satellite_id.clone()))?;

        let result =
            self.config
                .maneuver
                .execute_checked(maneuver, &current, limits, available)?;

        if limits.enforce_fuel_budget {
            ledger.debit(&maneuver.satellite_id, result.fuel_consumed_kg)?;
        } else {
            // Unenforced budgets may run the balance negative
            ledger.register(maneuver.satellite_id.clone(), result.fuel_remaining_kg);
        }

        info!(
            satellite_id = %maneuver.satellite_id,
            maneuver_id = %result.maneuver_id,
            fuel_consumed_kg = result.fuel_consumed_kg,
            fuel_remaining_kg = result.fuel_remaining_kg,
            "Fuel ledger debited"
        );
        debug!(delta_v_ms = result.delta_v_ms, "Tracked maneuver complete");

        Ok(result)
    }
}

// =============================================================================
// TESTS
// =============================================================================
