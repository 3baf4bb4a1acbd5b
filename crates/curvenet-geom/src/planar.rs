//! Planar (2D) curve representations used for intersection and trimming.
//!
//! Every tracked curve is projected into its canonical placement's 2D
//! coordinates; all intersection math and fragment trimming happens on
//! these representations.

use std::f64::consts::PI;

use curvenet_math::{Point2, Tolerance, Vec2};

/// A bounded 2D line segment, `t ∈ [0, 1]`.
#[derive(Debug, Clone)]
pub struct Segment2 {
    /// Starting point.
    pub start: Point2,
    /// End point.
    pub end: Point2,
}

/// A 2D circular arc, `t ∈ [0, 1]` over the signed sweep. A sweep of `±2π`
/// with `closed` set makes the curve a full circle.
#[derive(Debug, Clone)]
pub struct Arc2 {
    /// Center of the arc's circle.
    pub center: Point2,
    /// Radius.
    pub radius: f64,
    /// Angle at `t = 0`, in radians.
    pub start_angle: f64,
    /// Signed angular extent, in radians.
    pub sweep: f64,
    /// True if the arc closes into a full circle.
    pub closed: bool,
}

impl Arc2 {
    /// Angle at parameter `t`.
    pub fn angle_at(&self, t: f64) -> f64 {
        self.start_angle + t * self.sweep
    }

    /// Point on the circle at the given angle.
    pub fn point_at_angle(&self, angle: f64) -> Point2 {
        let (sin_a, cos_a) = angle.sin_cos();
        self.center + self.radius * Vec2::new(cos_a, sin_a)
    }

    /// Parameter for a given angle, or `None` if the angle falls outside
    /// the arc's angular range (with `eps` slack in parameter units).
    pub fn param_of_angle(&self, angle: f64, eps: f64) -> Option<f64> {
        let span = self.sweep.abs();
        if span < 1e-12 {
            return None;
        }
        let delta = if self.sweep >= 0.0 {
            (angle - self.start_angle).rem_euclid(2.0 * PI)
        } else {
            (self.start_angle - angle).rem_euclid(2.0 * PI)
        };
        let t = delta / span;
        if t <= 1.0 + eps {
            Some(t.min(1.0))
        } else if (2.0 * PI - delta) / span <= eps {
            // wrapped just below the start angle
            Some(0.0)
        } else {
            None
        }
    }
}

/// A 2D multi-segment contour, `t ∈ [0, n]` with one parameter unit per
/// segment; corners sit at integer parameters.
#[derive(Debug, Clone)]
pub struct Contour2 {
    /// Vertex list; closed contours connect the last vertex back to the first.
    pub points: Vec<Point2>,
    /// True if the last vertex connects back to the first.
    pub closed: bool,
}

impl Contour2 {
    /// Number of segments.
    pub fn segment_count(&self) -> usize {
        if self.closed {
            self.points.len()
        } else {
            self.points.len().saturating_sub(1)
        }
    }

    pub(crate) fn vertex(&self, i: usize) -> Point2 {
        self.points[i % self.points.len()]
    }
}

/// A planar curve: the 2D representation a tracked curve is reduced to for
/// intersection and trimming.
#[derive(Debug, Clone)]
pub enum PlanarCurve {
    /// A line segment.
    Segment(Segment2),
    /// A circular arc or full circle.
    Arc(Arc2),
    /// A multi-segment contour.
    Contour(Contour2),
}

impl PlanarCurve {
    /// Parameter domain `(t_min, t_max)`.
    pub fn domain(&self) -> (f64, f64) {
        match self {
            PlanarCurve::Segment(_) | PlanarCurve::Arc(_) => (0.0, 1.0),
            PlanarCurve::Contour(c) => (0.0, c.segment_count() as f64),
        }
    }

    /// True if the curve closes back onto its start.
    pub fn is_closed(&self) -> bool {
        match self {
            PlanarCurve::Segment(_) => false,
            PlanarCurve::Arc(a) => a.closed,
            PlanarCurve::Contour(c) => c.closed,
        }
    }

    /// Domain span for closed curves (the wrap period).
    pub fn period(&self) -> Option<f64> {
        if self.is_closed() {
            let (t_min, t_max) = self.domain();
            Some(t_max - t_min)
        } else {
            None
        }
    }

    /// Evaluate at parameter `t`. Closed curves wrap `t` by the period.
    pub fn evaluate(&self, t: f64) -> Point2 {
        match self {
            PlanarCurve::Segment(s) => s.start + t * (s.end - s.start),
            PlanarCurve::Arc(a) => {
                let t = if a.closed { t.rem_euclid(1.0) } else { t };
                a.point_at_angle(a.angle_at(t))
            }
            PlanarCurve::Contour(c) => {
                let n = c.segment_count();
                if n == 0 {
                    return c.points.first().copied().unwrap_or_else(Point2::origin);
                }
                let mut t = t;
                if c.closed {
                    t = t.rem_euclid(n as f64);
                }
                let i = (t.floor().max(0.0) as usize).min(n - 1);
                let s = t - i as f64;
                let a = c.vertex(i);
                let b = c.vertex(i + 1);
                a + s * (b - a)
            }
        }
    }

    /// Tangent vector at parameter `t`.
    pub fn tangent(&self, t: f64) -> Vec2 {
        match self {
            PlanarCurve::Segment(s) => s.end - s.start,
            PlanarCurve::Arc(a) => {
                let t = if a.closed { t.rem_euclid(1.0) } else { t };
                let (sin_a, cos_a) = a.angle_at(t).sin_cos();
                a.radius * a.sweep * Vec2::new(-sin_a, cos_a)
            }
            PlanarCurve::Contour(c) => {
                let n = c.segment_count();
                if n == 0 {
                    return Vec2::zeros();
                }
                let mut t = t;
                if c.closed {
                    t = t.rem_euclid(n as f64);
                }
                let i = (t.floor().max(0.0) as usize).min(n - 1);
                c.vertex(i + 1) - c.vertex(i)
            }
        }
    }

    /// Corner parameters: interior corners for open contours, every vertex
    /// (including the `t = 0` start) for closed contours. Empty for
    /// segments and arcs.
    pub fn corner_parameters(&self) -> Vec<f64> {
        match self {
            PlanarCurve::Segment(_) | PlanarCurve::Arc(_) => Vec::new(),
            PlanarCurve::Contour(c) => {
                let n = c.segment_count();
                if c.closed {
                    (0..n).map(|i| i as f64).collect()
                } else {
                    (1..n).map(|i| i as f64).collect()
                }
            }
        }
    }

    /// Trim to the sub-range `[start, stop]` of the parameter domain.
    ///
    /// On closed curves `stop` may exceed the domain end by up to one
    /// period, producing a fragment across the seam. Returns `None` for
    /// degenerate (near-zero span) trims.
    pub fn trim(&self, start: f64, stop: f64, tol: &Tolerance) -> Option<PlanarCurve> {
        if stop - start < tol.parametric {
            return None;
        }
        match self {
            PlanarCurve::Segment(_) => Some(PlanarCurve::Segment(Segment2 {
                start: self.evaluate(start),
                end: self.evaluate(stop),
            })),
            PlanarCurve::Arc(a) => {
                if a.closed && stop - start >= 1.0 - 1e-9 {
                    return Some(self.clone());
                }
                Some(PlanarCurve::Arc(Arc2 {
                    center: a.center,
                    radius: a.radius,
                    start_angle: a.angle_at(start),
                    sweep: a.sweep * (stop - start),
                    closed: false,
                }))
            }
            PlanarCurve::Contour(c) => {
                let n = c.segment_count() as f64;
                if c.closed && stop - start >= n - 1e-9 {
                    return Some(self.clone());
                }
                let mut pts = vec![self.evaluate(start)];
                let mut k = start.floor() + 1.0;
                while k < stop - tol.parametric {
                    pts.push(self.evaluate(k));
                    k += 1.0;
                }
                pts.push(self.evaluate(stop));
                // collapse corner-coincident endpoints
                let mut dedup: Vec<Point2> = Vec::with_capacity(pts.len());
                for p in pts {
                    if dedup.last().map_or(true, |q| !tol.points2_equal(&p, q)) {
                        dedup.push(p);
                    }
                }
                match dedup.len() {
                    0 | 1 => None,
                    2 => Some(PlanarCurve::Segment(Segment2 {
                        start: dedup[0],
                        end: dedup[1],
                    })),
                    _ => Some(PlanarCurve::Contour(Contour2 {
                        points: dedup,
                        closed: false,
                    })),
                }
            }
        }
    }
}
