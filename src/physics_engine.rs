// Physics Engine - Constants and 3D vector algebra
// Shared by the orbit, maneuver and debris models

use serde::{Deserialize, Serialize};

// =============================================================================
// PHYSICAL CONSTANTS (km, km/s)
// =============================================================================

/// Mean Earth radius used for altitude (km)
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Earth's gravitational parameter μ = G * M_earth (km³/s²)
pub const MU_EARTH_KM3_S2: f64 = 398600.4418;

/// Rounded μ used by the debris band placement (km³/s²)
pub const MU_EARTH_SIMPLIFIED_KM3_S2: f64 = 398600.0;

/// Orbital radius of the reference circular LEO state (km)
pub const REFERENCE_ORBIT_RADIUS_KM: f64 = 6800.0;

/// Tangential speed of the reference circular LEO state (km/s)
pub const REFERENCE_ORBIT_SPEED_KM_S: f64 = 7.66;

// =============================================================================
// 3D VECTOR MATHEMATICS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Vector3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3D {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Unit vector in the same direction. The zero vector maps to itself
    /// instead of producing NaN components.
    pub fn normalize(&self) -> Self {
        let mag = self.magnitude();
        if mag == 0.0 {
            return Self::zero();
        }
        self.scale(1.0 / mag)
    }

    pub fn dot(&self, other: &Vector3D) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Vector3D) -> Vector3D {
        Vector3D {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn scale(&self, s: f64) -> Self {
        Self {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }

    pub fn add(&self, other: &Vector3D) -> Vector3D {
        Vector3D {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }

    pub fn subtract(&self, other: &Vector3D) -> Vector3D {
        Vector3D {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }

    /// True when no component is NaN or infinite
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

// Operator forms of the methods above. Kept as fully-qualified impls so that
// `a.add(&b)` keeps resolving to the by-reference method.

impl std::ops::Add for Vector3D {
    type Output = Vector3D;

    fn add(self, rhs: Vector3D) -> Vector3D {
        Vector3D::add(&self, &rhs)
    }
}

impl std::ops::Sub for Vector3D {
    type Output = Vector3D;

    fn sub(self, rhs: Vector3D) -> Vector3D {
        self.subtract(&rhs)
    }
}

impl std::ops::Mul<f64> for Vector3D {
    type Output = Vector3D;

    fn mul(self, s: f64) -> Vector3D {
        self.scale(s)
    }
}

impl std::ops::Neg for Vector3D {
    type Output = Vector3D;

    fn neg(self) -> Vector3D {
        self.scale(-1.0)
    }
}

// =============================================================================
// TESTS
// =============================================================================
