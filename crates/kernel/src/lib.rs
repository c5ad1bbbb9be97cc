pub mod geometry;
pub mod topology;
pub mod traits;

use serde::{Deserialize, Serialize};

use geometry::point::Point3d;
use geometry::vector::Vec3;

// Re-export key traits at crate root for convenience.
pub use traits::{CurveEval, SurfaceEval};

/// Tolerances for geometric comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerance {
    /// Points closer than this are considered coincident (model units).
    pub coincidence: f64,
    /// Angles smaller than this (radians) are considered zero.
    pub angular: f64,
    /// Parameter-space tolerance for curve/surface evaluations.
    pub parametric: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            coincidence: 1e-7,
            angular: 1e-9,
            parametric: 1e-10,
        }
    }
}

impl Tolerance {
    pub fn points_coincident(&self, a: &Point3d, b: &Point3d) -> bool {
        a.distance_to(b) < self.coincidence
    }

    pub fn is_zero_length(&self, length: f64) -> bool {
        length.abs() < self.coincidence
    }

    pub fn is_zero_angle(&self, angle: f64) -> bool {
        angle.abs() < self.angular
    }

    /// Same or opposite direction, within the angular tolerance.
    pub fn vectors_parallel(&self, a: &Vec3, b: &Vec3) -> bool {
        let scale = a.length() * b.length();
        scale > 0.0 && a.cross(b).length() <= self.angular * scale
    }

    pub fn vectors_perpendicular(&self, a: &Vec3, b: &Vec3) -> bool {
        let scale = a.length() * b.length();
        scale > 0.0 && a.dot(b).abs() <= self.angular * scale
    }
}

/// Default tolerance used by kernel constructors.
pub fn default_tolerance() -> Tolerance {
    Tolerance::default()
}
