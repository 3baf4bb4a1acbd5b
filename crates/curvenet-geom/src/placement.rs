//! Canonical plane frames used to group and compare coplanar curves.

use curvenet_math::{Dir3, Point2, Point3, Tolerance, Vec3};

/// A plane frame: an origin point plus an orthonormal in-plane basis.
///
/// Placements are the identity under which coplanar curves are grouped:
/// the curve network keeps a canonical set of placements and assigns each
/// curve to the matching one, so that curves on the same plane always
/// share a single placement instance.
#[derive(Debug, Clone)]
pub struct Placement {
    /// Origin point on the plane.
    pub origin: Point3,
    /// Unit vector along the local X axis.
    pub x_dir: Dir3,
    /// Unit vector along the local Y axis.
    pub y_dir: Dir3,
    /// Unit normal (x_dir × y_dir).
    pub normal: Dir3,
}

impl Placement {
    /// Create a placement from origin and two direction vectors.
    /// The vectors do not need to be normalized.
    pub fn new(origin: Point3, x_dir: Vec3, y_dir: Vec3) -> Self {
        let x = Dir3::new_normalize(x_dir);
        let y = Dir3::new_normalize(y_dir);
        let n = Dir3::new_normalize(x_dir.cross(&y_dir));
        Self {
            origin,
            x_dir: x,
            y_dir: y,
            normal: n,
        }
    }

    /// Create a placement from origin and normal. The in-plane basis is
    /// chosen arbitrarily.
    pub fn from_normal(origin: Point3, normal: Vec3) -> Self {
        let n = Dir3::new_normalize(normal);
        // Pick an arbitrary perpendicular vector
        let arbitrary = if n.as_ref().x.abs() < 0.9 {
            Vec3::x()
        } else {
            Vec3::y()
        };
        let x = Dir3::new_normalize(arbitrary.cross(n.as_ref()));
        let y = Dir3::new_normalize(n.as_ref().cross(x.as_ref()));
        Self {
            origin,
            x_dir: x,
            y_dir: y,
            normal: n,
        }
    }

    /// XY plane at the origin.
    pub fn xy() -> Self {
        Self::new(Point3::origin(), Vec3::x(), Vec3::y())
    }

    /// Project a 3D point into this placement's (u, v) coordinates.
    pub fn project(&self, p: &Point3) -> Point2 {
        let d = p - self.origin;
        Point2::new(d.dot(self.x_dir.as_ref()), d.dot(self.y_dir.as_ref()))
    }

    /// Map a 2D point in placement coordinates back to 3D.
    pub fn lift(&self, p: &Point2) -> Point3 {
        self.origin + p.x * self.x_dir.as_ref() + p.y * self.y_dir.as_ref()
    }

    /// Signed distance from a point to this plane.
    pub fn signed_distance(&self, p: &Point3) -> f64 {
        (p - self.origin).dot(self.normal.as_ref())
    }

    /// Tolerance-based same-plane test, independent of the in-plane basis.
    ///
    /// Two placements describe the same plane when their normals are
    /// parallel (either orientation) and the other origin lies on this
    /// plane within linear tolerance.
    pub fn is_same_plane(&self, other: &Placement, tol: &Tolerance) -> bool {
        tol.dirs_parallel(&self.normal, &other.normal)
            && tol.is_zero(self.signed_distance(&other.origin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_lift_round_trip() {
        let pl = Placement::new(Point3::new(1.0, 2.0, 3.0), Vec3::x(), Vec3::y());
        let p = Point3::new(4.0, 7.0, 3.0);
        let uv = pl.project(&p);
        let back = pl.lift(&uv);
        assert!((back - p).norm() < 1e-12);
    }

    #[test]
    fn test_same_plane_opposite_normals() {
        let tol = Tolerance::DEFAULT;
        let a = Placement::from_normal(Point3::origin(), Vec3::z());
        let b = Placement::from_normal(Point3::new(5.0, -2.0, 0.0), -Vec3::z());
        assert!(a.is_same_plane(&b, &tol));
    }

    #[test]
    fn test_different_offset_plane() {
        let tol = Tolerance::DEFAULT;
        let a = Placement::from_normal(Point3::origin(), Vec3::z());
        let b = Placement::from_normal(Point3::new(0.0, 0.0, 0.5), Vec3::z());
        assert!(!a.is_same_plane(&b, &tol));
    }

    #[test]
    fn test_same_plane_within_tolerance() {
        let tol = Tolerance::DEFAULT;
        let a = Placement::from_normal(Point3::origin(), Vec3::z());
        let b = Placement::from_normal(Point3::new(10.0, 10.0, 1e-7), Vec3::z());
        assert!(a.is_same_plane(&b, &tol));
    }

    #[test]
    fn test_signed_distance() {
        let pl = Placement::xy();
        assert!((pl.signed_distance(&Point3::new(3.0, 4.0, 2.5)) - 2.5).abs() < 1e-12);
        assert!((pl.signed_distance(&Point3::new(3.0, 4.0, -1.0)) + 1.0).abs() < 1e-12);
    }
}
