//! Local-frame geometry value types.
//!
//! All coordinates are in the superlayer local frame, in centimeters.
//! The local z axis points away from the interaction region, so the polar
//! angle of a direction is measured from +z.

use std::ops::{Add, Mul, Sub};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A point in the local frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LocalPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl LocalPoint {
    /// Creates a new point.
    #[inline]
    #[must_use]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// A displacement or direction in the local frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LocalVector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl LocalVector {
    /// Creates a new vector.
    #[inline]
    #[must_use]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean length, without overflow for large finite components.
    #[inline]
    #[must_use]
    pub fn mag(&self) -> f64 {
        self.x.hypot(self.y).hypot(self.z)
    }

    /// Returns the vector scaled to unit length, or `None` for a zero or
    /// non-finite vector.
    #[must_use]
    pub fn unit(&self) -> Option<Self> {
        let mag = self.mag();
        if mag > 0.0 && mag.is_finite() {
            Some(*self * (1.0 / mag))
        } else {
            None
        }
    }

    /// Cosine of the polar angle (angle to local +z).
    ///
    /// NaN for the zero vector.
    #[inline]
    #[must_use]
    pub fn cos_theta(&self) -> f64 {
        self.z / self.mag()
    }
}

impl Add<LocalVector> for LocalPoint {
    type Output = LocalPoint;

    fn add(self, rhs: LocalVector) -> LocalPoint {
        LocalPoint::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for LocalPoint {
    type Output = LocalVector;

    fn sub(self, rhs: LocalPoint) -> LocalVector {
        LocalVector::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for LocalVector {
    type Output = LocalVector;

    fn mul(self, rhs: f64) -> LocalVector {
        LocalVector::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Symmetric 2D position covariance in the local (x, y) plane, in cm^2.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LocalError {
    pub xx: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub xy: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub yy: f64,
}

impl LocalError {
    /// Creates a new covariance.
    #[inline]
    #[must_use]
    pub fn new(xx: f64, xy: f64, yy: f64) -> Self {
        Self { xx, xy, yy }
    }

    /// Diagonal covariance with only the x variance set.
    #[inline]
    #[must_use]
    pub fn from_xx(xx: f64) -> Self {
        Self { xx, xy: 0.0, yy: 0.0 }
    }

    /// Standard deviation along local x.
    #[inline]
    #[must_use]
    pub fn sigma_x(&self) -> f64 {
        self.xx.sqrt()
    }
}
