#![warn(missing_docs)]

//! Math types for the curvenet planar curve engine.
//!
//! Thin wrappers around nalgebra providing the point/vector/direction
//! types shared by the geometry and database crates, plus the tolerance
//! constants used for point identity and parameter comparisons.

use nalgebra::{Unit, Vector2, Vector3};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// A point in 2D placement coordinates.
pub type Point2 = nalgebra::Point2<f64>;

/// A vector in 2D placement coordinates.
pub type Vec2 = Vector2<f64>;

/// Tolerance constants for geometric comparisons.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Linear distance tolerance in mm.
    pub linear: f64,
    /// Angular tolerance for direction parallelism (1 - |cos|).
    pub angular: f64,
    /// Curve parameter tolerance (minimum fragment span).
    pub parametric: f64,
}

impl Tolerance {
    /// Default tolerances: 1e-6 mm linear, 1e-9 angular, 1e-6 parametric.
    pub const DEFAULT: Self = Self {
        linear: 1e-6,
        angular: 1e-9,
        parametric: 1e-6,
    };

    /// Check if two 3D points are coincident within tolerance.
    pub fn points_equal(&self, a: &Point3, b: &Point3) -> bool {
        (a - b).norm() < self.linear
    }

    /// Check if two 2D points are coincident within tolerance.
    pub fn points2_equal(&self, a: &Point2, b: &Point2) -> bool {
        (a - b).norm() < self.linear
    }

    /// Check if a scalar distance is effectively zero.
    pub fn is_zero(&self, d: f64) -> bool {
        d.abs() < self.linear
    }

    /// Check if two curve parameters are effectively equal.
    pub fn params_equal(&self, a: f64, b: f64) -> bool {
        (a - b).abs() < self.parametric
    }

    /// Check if two directions are parallel (or anti-parallel).
    pub fn dirs_parallel(&self, a: &Dir3, b: &Dir3) -> bool {
        1.0 - a.dot(b).abs() < self.angular
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_equal() {
        let tol = Tolerance::DEFAULT;
        let a = Point3::new(1.0, 2.0, 3.0);
        let b = Point3::new(1.0 + 1e-7, 2.0, 3.0);
        assert!(tol.points_equal(&a, &b));
        let c = Point3::new(1.001, 2.0, 3.0);
        assert!(!tol.points_equal(&a, &c));
    }

    #[test]
    fn test_params_equal() {
        let tol = Tolerance::DEFAULT;
        assert!(tol.params_equal(0.5, 0.5 + 1e-8));
        assert!(!tol.params_equal(0.5, 0.5001));
    }

    #[test]
    fn test_dirs_parallel() {
        let tol = Tolerance::DEFAULT;
        let z = Dir3::new_normalize(Vec3::z());
        let neg_z = Dir3::new_normalize(-Vec3::z());
        let x = Dir3::new_normalize(Vec3::x());
        assert!(tol.dirs_parallel(&z, &z));
        assert!(tol.dirs_parallel(&z, &neg_z));
        assert!(!tol.dirs_parallel(&z, &x));
    }
}
