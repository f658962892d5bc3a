//! Shared domain models.

use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

/// A point in the perceptual map, `(performance, size)`.
///
/// Serialised as a two-element array so scenario files can write
/// `"starting_point": [2.5, 17.5]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Coords {
    /// Horizontal axis.
    pub performance: f64,
    /// Vertical axis.
    pub size: f64,
}

impl Coords {
    /// Build a point from its performance and size components.
    pub const fn new(performance: f64, size: f64) -> Self {
        Self { performance, size }
    }

    /// Squared Euclidean distance to `other`.
    pub fn distance_squared(self, other: Coords) -> f64 {
        let d = self - other;
        d.performance * d.performance + d.size * d.size
    }

    /// Euclidean distance to `other`.
    pub fn distance(self, other: Coords) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// True when both components are strictly positive.
    pub fn is_positive(self) -> bool {
        self.performance > 0.0 && self.size > 0.0
    }

    /// Component-wise closeness within `tolerance`.
    pub fn approx_eq(self, other: Coords, tolerance: f64) -> bool {
        (self.performance - other.performance).abs() <= tolerance
            && (self.size - other.size).abs() <= tolerance
    }
}

impl Add for Coords {
    type Output = Coords;

    fn add(self, rhs: Coords) -> Coords {
        Coords::new(self.performance + rhs.performance, self.size + rhs.size)
    }
}

impl Sub for Coords {
    type Output = Coords;

    fn sub(self, rhs: Coords) -> Coords {
        Coords::new(self.performance - rhs.performance, self.size - rhs.size)
    }
}

impl Mul<f64> for Coords {
    type Output = Coords;

    fn mul(self, rhs: f64) -> Coords {
        Coords::new(self.performance * rhs, self.size * rhs)
    }
}

impl From<(f64, f64)> for Coords {
    fn from((performance, size): (f64, f64)) -> Self {
        Self::new(performance, size)
    }
}

impl From<Coords> for (f64, f64) {
    fn from(value: Coords) -> Self {
        (value.performance, value.size)
    }
}
