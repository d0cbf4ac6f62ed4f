// OrbitCore - Satellite orbit state, maneuver and debris threat models
// Library entry point for the mission service layer

pub mod config;
pub mod debris;
pub mod maneuver;
pub mod orbit;
pub mod physics_engine;
pub mod state_manager;

pub use config::{ConfigError, CoreConfig};
pub use debris::{compute_stats, generate_threats, DebrisSettings, DebrisStats, DebrisThreat};
pub use maneuver::{
    execute_maneuver, Maneuver, ManeuverError, ManeuverLimits, ManeuverModel, ManeuverResult,
};
pub use orbit::{
    compute_altitude, derive_classical_elements, derive_elements, get_current_orbit,
    ElementDerivation, OrbitElements, OrbitState,
};
pub use physics_engine::Vector3D;
pub use state_manager::{FlightDynamics, FuelLedger, SharedFuelLedger};
