//! Spatial (3D) curve types tracked by the curve network.

use std::any::Any;
use std::f64::consts::PI;

use curvenet_math::{Dir3, Point3, Tolerance, Vec3};

use crate::placement::Placement;
use crate::planar::{Arc2, Contour2, PlanarCurve, Segment2};

/// Planarity slack factor: projection accepts points up to ten times the
/// linear tolerance off the placement plane, since the canonical placement
/// a curve is assigned to may itself sit up to the linear tolerance away
/// from the curve's own best-fit plane.
const PLANAR_SLACK: f64 = 10.0;

/// The kind of a spatial curve (for match-based dispatch).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveKind {
    /// Straight line segment.
    Line,
    /// Circular arc or full circle.
    Arc,
    /// Raw polyline (must be converted to a contour before planarization).
    Polyline,
    /// Multi-segment contour with corner introspection.
    Contour,
    /// Externally-supplied curve with no special-case handling.
    Generic,
}

/// A parametric curve in 3D space.
///
/// Curves that live on a plane can report a best-fit placement and project
/// themselves into that placement's 2D coordinates; curves that cannot are
/// excluded from the planar curve network entirely.
pub trait SpatialCurve: Send + Sync + std::fmt::Debug {
    /// The kind of this curve.
    fn kind(&self) -> CurveKind;

    /// Evaluate the curve at parameter `t` to get a 3D point.
    fn evaluate(&self, t: f64) -> Point3;

    /// Tangent vector at parameter `t`.
    fn tangent(&self, t: f64) -> Vec3;

    /// Parameter domain `(t_min, t_max)`.
    fn domain(&self) -> (f64, f64);

    /// True if the curve closes back onto its start.
    fn is_closed(&self) -> bool;

    /// Best-fit plane for this curve, or `None` if the curve is not
    /// representable planarly.
    fn best_fit_placement(&self) -> Option<Placement>;

    /// Project this curve into the given placement's 2D coordinates.
    ///
    /// Returns `None` when the curve does not lie on the placement's plane
    /// (within tolerance) or has no planar representation.
    fn project_onto(&self, placement: &Placement, tol: &Tolerance) -> Option<PlanarCurve>;

    /// Clone into a boxed trait object.
    fn clone_box(&self) -> Box<dyn SpatialCurve>;

    /// Downcast to a concrete type via `Any`.
    fn as_any(&self) -> &dyn Any;
}

impl Clone for Box<dyn SpatialCurve> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

// =============================================================================
// LineSegment3
// =============================================================================

/// A bounded 3D line segment.
///
/// Parameterization: `P(t) = start + t * (end - start)`, `t ∈ [0, 1]`.
#[derive(Debug, Clone)]
pub struct LineSegment3 {
    /// Starting point.
    pub start: Point3,
    /// End point.
    pub end: Point3,
}

impl LineSegment3 {
    /// Create a segment from two endpoints.
    pub fn from_points(start: Point3, end: Point3) -> Self {
        Self { start, end }
    }
}

impl SpatialCurve for LineSegment3 {
    fn kind(&self) -> CurveKind {
        CurveKind::Line
    }

    fn evaluate(&self, t: f64) -> Point3 {
        self.start + t * (self.end - self.start)
    }

    fn tangent(&self, _t: f64) -> Vec3 {
        self.end - self.start
    }

    fn domain(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    fn is_closed(&self) -> bool {
        false
    }

    fn best_fit_placement(&self) -> Option<Placement> {
        let d = self.end - self.start;
        if d.norm() < Tolerance::DEFAULT.linear {
            return None;
        }
        let dir = d.normalize();
        // A line does not determine a plane by itself; pick the containing
        // plane deterministically so parallel constructions agree.
        let arbitrary = if dir.x.abs() < 0.9 { Vec3::x() } else { Vec3::y() };
        let n = Dir3::new_normalize(dir.cross(&arbitrary));
        let y = n.as_ref().cross(&dir);
        Some(Placement::new(self.start, dir, y))
    }

    fn project_onto(&self, placement: &Placement, tol: &Tolerance) -> Option<PlanarCurve> {
        let slack = PLANAR_SLACK * tol.linear;
        if placement.signed_distance(&self.start).abs() > slack
            || placement.signed_distance(&self.end).abs() > slack
        {
            return None;
        }
        Some(PlanarCurve::Segment(Segment2 {
            start: placement.project(&self.start),
            end: placement.project(&self.end),
        }))
    }

    fn clone_box(&self) -> Box<dyn SpatialCurve> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// =============================================================================
// Arc3
// =============================================================================

/// A circular arc (or full circle) in 3D space.
///
/// Parameterization: `P(t) = center + radius * (cos(θ) * x_dir + sin(θ) * y_dir)`
/// with `θ = start_angle + t * sweep` and `t ∈ [0, 1]`. A sweep of `±2π`
/// makes the curve closed.
#[derive(Debug, Clone)]
pub struct Arc3 {
    /// Center of the arc's circle.
    pub center: Point3,
    /// Radius.
    pub radius: f64,
    /// Reference direction for angle 0.
    pub x_dir: Dir3,
    /// Second in-plane direction.
    pub y_dir: Dir3,
    /// Normal to the arc plane (x_dir × y_dir).
    pub normal: Dir3,
    /// Angle at `t = 0`, in radians.
    pub start_angle: f64,
    /// Signed angular extent, in radians.
    pub sweep: f64,
}

impl Arc3 {
    /// Create a full circle with the given center, normal, and radius.
    pub fn circle(center: Point3, normal: Vec3, radius: f64) -> Self {
        Self::arc(center, normal, radius, 0.0, 2.0 * PI)
    }

    /// Create an arc spanning `sweep` radians starting at `start_angle`.
    pub fn arc(center: Point3, normal: Vec3, radius: f64, start_angle: f64, sweep: f64) -> Self {
        let n = Dir3::new_normalize(normal);
        let arbitrary = if n.as_ref().x.abs() < 0.9 {
            Vec3::x()
        } else {
            Vec3::y()
        };
        let x = Dir3::new_normalize(arbitrary.cross(n.as_ref()));
        let y = Dir3::new_normalize(n.as_ref().cross(x.as_ref()));
        Self {
            center,
            radius,
            x_dir: x,
            y_dir: y,
            normal: n,
            start_angle,
            sweep,
        }
    }

    fn angle_at(&self, t: f64) -> f64 {
        self.start_angle + t * self.sweep
    }
}

impl SpatialCurve for Arc3 {
    fn kind(&self) -> CurveKind {
        CurveKind::Arc
    }

    fn evaluate(&self, t: f64) -> Point3 {
        let (sin_a, cos_a) = self.angle_at(t).sin_cos();
        self.center + self.radius * (cos_a * self.x_dir.as_ref() + sin_a * self.y_dir.as_ref())
    }

    fn tangent(&self, t: f64) -> Vec3 {
        let (sin_a, cos_a) = self.angle_at(t).sin_cos();
        self.radius * self.sweep * (-sin_a * self.x_dir.as_ref() + cos_a * self.y_dir.as_ref())
    }

    fn domain(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    fn is_closed(&self) -> bool {
        self.sweep.abs() >= 2.0 * PI - 1e-9
    }

    fn best_fit_placement(&self) -> Option<Placement> {
        Some(Placement::new(
            self.center,
            *self.x_dir.as_ref(),
            *self.y_dir.as_ref(),
        ))
    }

    fn project_onto(&self, placement: &Placement, tol: &Tolerance) -> Option<PlanarCurve> {
        let slack = PLANAR_SLACK * tol.linear;
        for p in [&self.center, &self.evaluate(0.0), &self.evaluate(0.37)] {
            if placement.signed_distance(p).abs() > slack {
                return None;
            }
        }
        let center = placement.project(&self.center);
        let start = placement.project(&self.evaluate(0.0));
        let v = start - center;
        if v.norm() < tol.linear {
            return None;
        }
        // The placement basis may be rotated or flipped relative to the
        // arc's own frame; the sweep direction follows the normals.
        let orient = self.normal.dot(&placement.normal);
        let sweep = if orient >= 0.0 { self.sweep } else { -self.sweep };
        Some(PlanarCurve::Arc(Arc2 {
            center,
            radius: self.radius,
            start_angle: v.y.atan2(v.x),
            sweep,
            closed: self.is_closed(),
        }))
    }

    fn clone_box(&self) -> Box<dyn SpatialCurve> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// =============================================================================
// Polyline3 / Contour3
// =============================================================================

/// A raw polyline: straight segments through a vertex list.
///
/// Polylines carry no corner introspection; the curve network converts
/// them to [`Contour3`] via [`polyline_to_contour`] before planarization.
#[derive(Debug, Clone)]
pub struct Polyline3 {
    /// Vertex list. For closed polylines the last vertex connects back to
    /// the first without being repeated.
    pub points: Vec<Point3>,
    /// True if the last vertex connects back to the first.
    pub closed: bool,
}

impl Polyline3 {
    /// Create a polyline from a vertex list.
    pub fn new(points: Vec<Point3>, closed: bool) -> Self {
        Self { points, closed }
    }

    fn segment_count(&self) -> usize {
        if self.closed {
            self.points.len()
        } else {
            self.points.len().saturating_sub(1)
        }
    }
}

impl SpatialCurve for Polyline3 {
    fn kind(&self) -> CurveKind {
        CurveKind::Polyline
    }

    fn evaluate(&self, t: f64) -> Point3 {
        polyline_point(&self.points, self.closed, t)
    }

    fn tangent(&self, t: f64) -> Vec3 {
        polyline_tangent(&self.points, self.closed, t)
    }

    fn domain(&self) -> (f64, f64) {
        (0.0, self.segment_count() as f64)
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    fn best_fit_placement(&self) -> Option<Placement> {
        newell_placement(&self.points)
    }

    fn project_onto(&self, _placement: &Placement, _tol: &Tolerance) -> Option<PlanarCurve> {
        // Raw polylines lack corner introspection; convert to a contour first.
        None
    }

    fn clone_box(&self) -> Box<dyn SpatialCurve> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A multi-segment contour: a polyline with corner introspection, produced
/// by [`polyline_to_contour`].
#[derive(Debug, Clone)]
pub struct Contour3 {
    /// Vertex list; closed contours connect the last vertex back to the first.
    pub points: Vec<Point3>,
    /// True if the last vertex connects back to the first.
    pub closed: bool,
}

impl Contour3 {
    fn segment_count(&self) -> usize {
        if self.closed {
            self.points.len()
        } else {
            self.points.len().saturating_sub(1)
        }
    }
}

impl SpatialCurve for Contour3 {
    fn kind(&self) -> CurveKind {
        CurveKind::Contour
    }

    fn evaluate(&self, t: f64) -> Point3 {
        polyline_point(&self.points, self.closed, t)
    }

    fn tangent(&self, t: f64) -> Vec3 {
        polyline_tangent(&self.points, self.closed, t)
    }

    fn domain(&self) -> (f64, f64) {
        (0.0, self.segment_count() as f64)
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    fn best_fit_placement(&self) -> Option<Placement> {
        newell_placement(&self.points)
    }

    fn project_onto(&self, placement: &Placement, tol: &Tolerance) -> Option<PlanarCurve> {
        let slack = PLANAR_SLACK * tol.linear;
        if self
            .points
            .iter()
            .any(|p| placement.signed_distance(p).abs() > slack)
        {
            return None;
        }
        if self.segment_count() == 0 {
            return None;
        }
        Some(PlanarCurve::Contour(Contour2 {
            points: self.points.iter().map(|p| placement.project(p)).collect(),
            closed: self.closed,
        }))
    }

    fn clone_box(&self) -> Box<dyn SpatialCurve> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Convert a raw polyline into its contour representation.
///
/// Returns `None` if the curve is not a polyline.
pub fn polyline_to_contour(curve: &dyn SpatialCurve) -> Option<Contour3> {
    let poly = curve.as_any().downcast_ref::<Polyline3>()?;
    Some(Contour3 {
        points: poly.points.clone(),
        closed: poly.closed,
    })
}

fn polyline_point(points: &[Point3], closed: bool, t: f64) -> Point3 {
    let n = if closed {
        points.len()
    } else {
        points.len().saturating_sub(1)
    };
    if n == 0 {
        return points.first().copied().unwrap_or_else(Point3::origin);
    }
    let mut t = t;
    if closed {
        t = t.rem_euclid(n as f64);
    }
    let i = (t.floor().max(0.0) as usize).min(n - 1);
    let s = t - i as f64;
    let a = points[i % points.len()];
    let b = points[(i + 1) % points.len()];
    a + s * (b - a)
}

fn polyline_tangent(points: &[Point3], closed: bool, t: f64) -> Vec3 {
    let n = if closed {
        points.len()
    } else {
        points.len().saturating_sub(1)
    };
    if n == 0 {
        return Vec3::zeros();
    }
    let mut t = t;
    if closed {
        t = t.rem_euclid(n as f64);
    }
    let i = (t.floor().max(0.0) as usize).min(n - 1);
    points[(i + 1) % points.len()] - points[i % points.len()]
}

/// Best-fit plane through a vertex list via Newell's method, with the
/// centroid as origin. Falls back to a line-style plane for collinear
/// input; `None` for degenerate input.
fn newell_placement(points: &[Point3]) -> Option<Placement> {
    if points.len() < 2 {
        return None;
    }
    if points.len() == 2 {
        return LineSegment3::from_points(points[0], points[1]).best_fit_placement();
    }
    let mut c = Vec3::zeros();
    for p in points {
        c += p.coords;
    }
    let centroid = Point3::from(c / points.len() as f64);
    let mut n = Vec3::zeros();
    for i in 0..points.len() {
        let a = points[i] - centroid;
        let b = points[(i + 1) % points.len()] - centroid;
        n += a.cross(&b);
    }
    if n.norm() < 1e-12 {
        // Collinear (or zero-area) vertex list
        let seg = LineSegment3::from_points(points[0], *points.last()?);
        return seg
            .best_fit_placement()
            .or_else(|| LineSegment3::from_points(points[0], points[1]).best_fit_placement());
    }
    let n = n.normalize();
    let arbitrary = if n.x.abs() < 0.9 { Vec3::x() } else { Vec3::y() };
    let x = arbitrary.cross(&n);
    let y = n.cross(&x);
    Some(Placement::new(centroid, x, y))
}
