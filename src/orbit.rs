// Orbit State Model - Position/velocity state and classical orbital elements
// Altitude, vis-viva semi-major axis, and full two-body element derivation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::debug;

use crate::physics_engine::{
    Vector3D, EARTH_RADIUS_KM, MU_EARTH_KM3_S2, REFERENCE_ORBIT_RADIUS_KM,
    REFERENCE_ORBIT_SPEED_KM_S,
};

/// Placeholder eccentricity reported by the vis-viva derivation
pub const PLACEHOLDER_ECCENTRICITY: f64 = 0.001;

/// Placeholder inclination reported by the vis-viva derivation (deg)
pub const PLACEHOLDER_INCLINATION_DEG: f64 = 51.6;

/// Below this, eccentricity and node-line magnitude are treated as zero
const SINGULARITY_TOLERANCE: f64 = 1e-9;

// =============================================================================
// KEPLERIAN ORBITAL ELEMENTS
// =============================================================================

/// How the shape and orientation elements of an `OrbitElements` were produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementDerivation {
    /// Only the semi-major axis comes from the state; the rest are fixed values
    VisVivaPlaceholder,
    /// Every element is computed from the position and velocity vectors
    TwoBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitElements {
    /// Semi-major axis (km), negative for unbound states
    pub semi_major_axis: f64,
    pub eccentricity: f64,
    /// Inclination (deg)
    pub inclination: f64,
    /// Right ascension of the ascending node (deg)
    pub raan: f64,
    /// Argument of perigee (deg)
    #[serde(rename = "argument_perigee")]
    pub argument_of_perigee: f64,
    /// True anomaly (deg)
    pub true_anomaly: f64,
    pub epoch: DateTime<Utc>,
    pub derivation: ElementDerivation,
}

impl OrbitElements {
    /// Orbital period in seconds, `None` when the orbit is not bound
    pub fn period_seconds(&self) -> Option<f64> {
        if self.semi_major_axis <= 0.0 || self.eccentricity >= 1.0 {
            return None;
        }
        Some(2.0 * PI * (self.semi_major_axis.powi(3) / MU_EARTH_KM3_S2).sqrt())
    }

    /// True when every element was computed from the state vectors
    pub fn is_physically_derived(&self) -> bool {
        self.derivation == ElementDerivation::TwoBody
    }
}

// =============================================================================
// ORBIT STATE (Position + Velocity + Elements)
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitState {
    pub position: Vector3D, // km, inertial frame
    pub velocity: Vector3D, // km/s
    pub elements: OrbitElements,
}

impl OrbitState {
    pub fn altitude_km(&self) -> f64 {
        compute_altitude(&self.position)
    }

    pub fn speed_km_s(&self) -> f64 {
        self.velocity.magnitude()
    }
}

/// Current orbit of a satellite.
///
/// There is no telemetry source behind this yet: every satellite gets the same
/// reference circular LEO state (r = 6800 km, v = 7.66 km/s tangential) and only
/// the element epoch follows `at`. `satellite_id` is accepted so callers already
/// route per-satellite requests through here.
pub fn get_current_orbit(satellite_id: &str, at: DateTime<Utc>) -> OrbitState {
    debug!(satellite_id = %satellite_id, epoch = %at, "Resolving reference orbit");

    OrbitState {
        position: Vector3D::new(REFERENCE_ORBIT_RADIUS_KM, 0.0, 0.0),
        velocity: Vector3D::new(0.0, REFERENCE_ORBIT_SPEED_KM_S, 0.0),
        elements: OrbitElements {
            semi_major_axis: REFERENCE_ORBIT_RADIUS_KM,
            eccentricity: PLACEHOLDER_ECCENTRICITY,
            inclination: PLACEHOLDER_INCLINATION_DEG,
            raan: 0.0,
            argument_of_perigee: 0.0,
            true_anomaly: 0.0,
            epoch: at,
            derivation: ElementDerivation::VisVivaPlaceholder,
        },
    }
}

/// Height above the mean Earth radius (km)
pub fn compute_altitude(position: &Vector3D) -> f64 {
    position.magnitude() - EARTH_RADIUS_KM
}

/// Specific orbital energy ε = v²/2 - μ/r (km²/s²)
pub fn specific_energy(position: &Vector3D, velocity: &Vector3D) -> f64 {
    let r = position.magnitude();
    let v = velocity.magnitude();
    v * v / 2.0 - MU_EARTH_KM3_S2 / r
}

/// Elements from the vis-viva relation.
///
/// Only the semi-major axis a = -μ/(2ε) is computed from the state. Eccentricity,
/// inclination and the angles are fixed placeholder values, and the record is
/// tagged `ElementDerivation::VisVivaPlaceholder` so it cannot be mistaken for a
/// full derivation. Use `derive_classical_elements` for real geometry.
pub fn derive_elements(
    position: &Vector3D,
    velocity: &Vector3D,
    epoch: DateTime<Utc>,
) -> OrbitElements {
    let energy = specific_energy(position, velocity);

    OrbitElements {
        semi_major_axis: -MU_EARTH_KM3_S2 / (2.0 * energy),
        eccentricity: PLACEHOLDER_ECCENTRICITY,
        inclination: PLACEHOLDER_INCLINATION_DEG,
        raan: 0.0,
        argument_of_perigee: 0.0,
        true_anomaly: 0.0,
        epoch,
        derivation: ElementDerivation::VisVivaPlaceholder,
    }
}

/// Full classical elements from a two-body state vector.
///
/// Uses the specific angular momentum h = r × v, the node vector n = k × h and
/// the eccentricity vector. Angles that are undefined for circular or equatorial
/// orbits fall back as follows:
/// - equatorial: RAAN = 0, argument of perigee is the longitude of perigee
/// - circular inclined: argument of perigee = 0, true anomaly is the argument of latitude
/// - circular equatorial: both 0, true anomaly is the true longitude
pub fn derive_classical_elements(
    position: &Vector3D,
    velocity: &Vector3D,
    epoch: DateTime<Utc>,
) -> OrbitElements {
    let mu = MU_EARTH_KM3_S2;
    let r = position.magnitude();
    let v = velocity.magnitude();
    let r_dot_v = position.dot(velocity);

    let h = position.cross(velocity);
    let h_mag = h.magnitude();
    let node = Vector3D::new(-h.y, h.x, 0.0);
    let node_mag = node.magnitude();

    let e_vec = position
        .scale(v * v - mu / r)
        .subtract(&velocity.scale(r_dot_v))
        .scale(1.0 / mu);
    let e = e_vec.magnitude();

    let energy = v * v / 2.0 - mu / r;
    let semi_major_axis = -mu / (2.0 * energy);

    let inclination = if h_mag > 0.0 {
        acos_deg(h.z / h_mag)
    } else {
        0.0
    };

    let equatorial = h_mag == 0.0 || node_mag / h_mag < SINGULARITY_TOLERANCE;
    let circular = e < SINGULARITY_TOLERANCE;

    let raan = if equatorial {
        0.0
    } else {
        let angle = acos_deg(node.x / node_mag);
        if node.y < 0.0 {
            360.0 - angle
        } else {
            angle
        }
    };

    let argument_of_perigee = match (circular, equatorial) {
        (true, _) => 0.0,
        (false, false) => {
            let angle = acos_deg(node.dot(&e_vec) / (node_mag * e));
            if e_vec.z < 0.0 {
                360.0 - angle
            } else {
                angle
            }
        }
        (false, true) => {
            let longitude = e_vec.y.atan2(e_vec.x).to_degrees();
            let longitude = if h.z < 0.0 { -longitude } else { longitude };
            wrap_degrees(longitude)
        }
    };

    let true_anomaly = match (circular, equatorial) {
        (false, _) => {
            let angle = acos_deg(e_vec.dot(position) / (e * r));
            if r_dot_v < 0.0 {
                360.0 - angle
            } else {
                angle
            }
        }
        (true, false) => {
            let angle = acos_deg(node.dot(position) / (node_mag * r));
            if position.z < 0.0 {
                360.0 - angle
            } else {
                angle
            }
        }
        (true, true) => {
            let angle = acos_deg(position.x / r);
            let prograde_side = if h.z < 0.0 { -position.y } else { position.y };
            if prograde_side < 0.0 {
                360.0 - angle
            } else {
                angle
            }
        }
    };

    OrbitElements {
        semi_major_axis,
        eccentricity: e,
        inclination,
        raan,
        argument_of_perigee,
        true_anomaly,
        epoch,
        derivation: ElementDerivation::TwoBody,
    }
}

fn acos_deg(cosine: f64) -> f64 {
    cosine.clamp(-1.0, 1.0).acos().to_degrees()
}

fn wrap_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 4, 12, 0, 0).unwrap()
    }

    fn circular_speed(radius_km: f64) -> f64 {
        (MU_EARTH_KM3_S2 / radius_km).sqrt()
    }

    #[test]
    fn test_altitude_of_reference_radius() {
        let alt = compute_altitude(&Vector3D::new(6800.0, 0.0, 0.0));
        assert_relative_eq!(alt, 429.0, epsilon = 1e-9);
    }

    #[test]
    fn test_altitude_uses_full_magnitude() {
        let alt = compute_altitude(&Vector3D::new(3600.0, 4800.0, 3200.0));
        assert_relative_eq!(alt, 6800.0 - EARTH_RADIUS_KM, epsilon = 1e-9);
    }

    #[test]
    fn test_current_orbit_ignores_satellite_id() {
        let a = get_current_orbit("SAT-1", epoch());
        let b = get_current_orbit("STARLINK-32713", epoch());
        assert_eq!(a, b);
        assert_relative_eq!(a.altitude_km(), 429.0, epsilon = 1e-9);
        assert_relative_eq!(a.speed_km_s(), 7.66);
        assert_eq!(a.elements.epoch, epoch());
        assert_eq!(a.elements.derivation, ElementDerivation::VisVivaPlaceholder);
    }

    #[test]
    fn test_vis_viva_semi_major_axis() {
        let r = 7000.0;
        let position = Vector3D::new(r, 0.0, 0.0);
        let velocity = Vector3D::new(0.0, circular_speed(r), 0.0);
        let elements = derive_elements(&position, &velocity, epoch());

        assert_relative_eq!(elements.semi_major_axis, r, max_relative = 1e-12);
        assert_relative_eq!(elements.eccentricity, PLACEHOLDER_ECCENTRICITY);
        assert_relative_eq!(elements.inclination, PLACEHOLDER_INCLINATION_DEG);
        assert!(!elements.is_physically_derived());
    }

    #[test]
    fn test_vis_viva_faster_means_larger_orbit() {
        let position = Vector3D::new(6800.0, 0.0, 0.0);
        let slow = derive_elements(&position, &Vector3D::new(0.0, 7.66, 0.0), epoch());
        let fast = derive_elements(&position, &Vector3D::new(0.1, 7.66, 0.0), epoch());
        assert!(fast.semi_major_axis > slow.semi_major_axis);
    }

    #[test]
    fn test_unbound_state_has_no_period() {
        let position = Vector3D::new(6800.0, 0.0, 0.0);
        let escape = (2.0 * MU_EARTH_KM3_S2 / 6800.0).sqrt();
        let elements = derive_elements(&position, &Vector3D::new(0.0, escape * 1.1, 0.0), epoch());
        assert!(elements.semi_major_axis < 0.0);
        assert!(elements.period_seconds().is_none());
    }

    #[test]
    fn test_period_of_reference_orbit() {
        let state = get_current_orbit("SAT-1", epoch());
        let period = state.elements.period_seconds().unwrap();
        // ~93 minutes for a 6800 km orbit
        assert_relative_eq!(period / 60.0, 93.01, epsilon = 0.01);
    }

    #[test]
    fn test_classical_reference_state() {
        let state = get_current_orbit("SAT-1", epoch());
        let elements = derive_classical_elements(&state.position, &state.velocity, epoch());

        assert!(elements.is_physically_derived());
        assert!(elements.eccentricity > 0.0009 && elements.eccentricity < 0.0011);
        assert_relative_eq!(elements.inclination, 0.0, epsilon = 1e-9);
        assert_relative_eq!(elements.raan, 0.0);
        // Slightly super-circular, so the current point is perigee
        assert_relative_eq!(elements.argument_of_perigee, 0.0, epsilon = 1e-6);
        assert_relative_eq!(elements.true_anomaly, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_classical_inclined_circular() {
        let r = 7000.0;
        let inc = 51.6_f64.to_radians();
        let v = circular_speed(r);
        let position = Vector3D::new(0.0, r, 0.0);
        let velocity = Vector3D::new(-v * inc.cos(), 0.0, v * inc.sin());
        let elements = derive_classical_elements(&position, &velocity, epoch());

        assert_relative_eq!(elements.semi_major_axis, r, max_relative = 1e-9);
        assert!(elements.eccentricity < 1e-9);
        assert_relative_eq!(elements.inclination, 51.6, epsilon = 1e-9);
        assert_relative_eq!(elements.raan, 90.0, epsilon = 1e-9);
        assert_relative_eq!(elements.argument_of_perigee, 0.0);
        // Sitting on the ascending node
        assert_relative_eq!(elements.true_anomaly, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_classical_eccentric_at_perigee() {
        let r = 7000.0;
        let position = Vector3D::new(r, 0.0, 0.0);
        let velocity = Vector3D::new(0.0, 1.1 * circular_speed(r), 0.0);
        let elements = derive_classical_elements(&position, &velocity, epoch());

        assert_relative_eq!(elements.eccentricity, 0.21, epsilon = 1e-9);
        assert_relative_eq!(elements.semi_major_axis, r / (1.0 - 0.21), max_relative = 1e-9);
        assert_relative_eq!(elements.true_anomaly, 0.0, epsilon = 1e-6);
        assert_relative_eq!(elements.argument_of_perigee, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_classical_true_anomaly_after_apogee() {
        // Moving toward Earth on an eccentric orbit: true anomaly in (180, 360)
        let position = Vector3D::new(7000.0, 0.0, 0.0);
        let velocity = Vector3D::new(-1.0, 7.9, 0.0);
        let elements = derive_classical_elements(&position, &velocity, epoch());
        assert!(elements.true_anomaly > 180.0 && elements.true_anomaly < 360.0);
    }

    #[test]
    fn test_wrap_degrees() {
        assert_relative_eq!(wrap_degrees(-90.0), 270.0);
        assert_relative_eq!(wrap_degrees(360.0), 0.0);
        assert_relative_eq!(wrap_degrees(45.0), 45.0);
    }
}
