//! Analytic curve-curve intersection for planar curves.
//!
//! Curves decompose into segment and arc primitives carrying their global
//! parameter ranges; primitive pairs intersect analytically and the hits
//! map back to curve parameters. Near-duplicate hits (contour edges share
//! vertices) are filtered.

use curvenet_math::{Point2, Tolerance, Vec2};

use crate::planar::{Arc2, PlanarCurve};

/// One intersection between two planar curves.
#[derive(Debug, Clone)]
pub struct PlanarIntersection {
    /// Parameter on the first curve.
    pub t_a: f64,
    /// Parameter on the second curve.
    pub t_b: f64,
    /// Intersection point.
    pub point: Point2,
}

/// Intersect two planar curves, returning hits sorted by `t_a`.
pub fn intersect_planar(
    a: &PlanarCurve,
    b: &PlanarCurve,
    tol: &Tolerance,
) -> Vec<PlanarIntersection> {
    let pa = primitives(a);
    let pb = primitives(b);
    let mut hits = Vec::new();
    for qa in &pa {
        for qb in &pb {
            prim_prim(qa, qb, tol, &mut hits);
        }
    }
    hits.sort_by(|x, y| x.t_a.total_cmp(&y.t_a).then(x.t_b.total_cmp(&y.t_b)));
    hits.dedup_by(|x, y| tol.params_equal(x.t_a, y.t_a) && tol.params_equal(x.t_b, y.t_b));
    hits
}

enum Prim {
    Seg {
        a: Point2,
        b: Point2,
        t0: f64,
        t1: f64,
    },
    Arc {
        arc: Arc2,
        t0: f64,
        t1: f64,
    },
}

fn primitives(c: &PlanarCurve) -> Vec<Prim> {
    match c {
        PlanarCurve::Segment(s) => vec![Prim::Seg {
            a: s.start,
            b: s.end,
            t0: 0.0,
            t1: 1.0,
        }],
        PlanarCurve::Arc(a) => vec![Prim::Arc {
            arc: a.clone(),
            t0: 0.0,
            t1: 1.0,
        }],
        PlanarCurve::Contour(c) => (0..c.segment_count())
            .map(|i| Prim::Seg {
                a: c.vertex(i),
                b: c.vertex(i + 1),
                t0: i as f64,
                t1: (i + 1) as f64,
            })
            .collect(),
    }
}

fn prim_prim(qa: &Prim, qb: &Prim, tol: &Tolerance, out: &mut Vec<PlanarIntersection>) {
    match (qa, qb) {
        (
            Prim::Seg {
                a: a0,
                b: a1,
                t0: at0,
                t1: at1,
            },
            Prim::Seg {
                a: b0,
                b: b1,
                t0: bt0,
                t1: bt1,
            },
        ) => {
            if let Some((s, u, point)) = seg_seg(*a0, *a1, *b0, *b1, tol) {
                out.push(PlanarIntersection {
                    t_a: at0 + s * (at1 - at0),
                    t_b: bt0 + u * (bt1 - bt0),
                    point,
                });
            }
        }
        (
            Prim::Seg {
                a: a0,
                b: a1,
                t0: at0,
                t1: at1,
            },
            Prim::Arc { arc, t0, t1 },
        ) => {
            for (s, point) in seg_circle(*a0, *a1, arc.center, arc.radius, tol) {
                if let Some(frac) = param_on_arc(arc, &point, tol) {
                    out.push(PlanarIntersection {
                        t_a: at0 + s * (at1 - at0),
                        t_b: t0 + frac * (t1 - t0),
                        point,
                    });
                }
            }
        }
        (
            Prim::Arc { arc, t0, t1 },
            Prim::Seg {
                a: b0,
                b: b1,
                t0: bt0,
                t1: bt1,
            },
        ) => {
            for (u, point) in seg_circle(*b0, *b1, arc.center, arc.radius, tol) {
                if let Some(frac) = param_on_arc(arc, &point, tol) {
                    out.push(PlanarIntersection {
                        t_a: t0 + frac * (t1 - t0),
                        t_b: bt0 + u * (bt1 - bt0),
                        point,
                    });
                }
            }
        }
        (
            Prim::Arc {
                arc: aa,
                t0: at0,
                t1: at1,
            },
            Prim::Arc {
                arc: ab,
                t0: bt0,
                t1: bt1,
            },
        ) => {
            for point in circle_circle(aa.center, aa.radius, ab.center, ab.radius, tol) {
                let (fa, fb) = (param_on_arc(aa, &point, tol), param_on_arc(ab, &point, tol));
                if let (Some(fa), Some(fb)) = (fa, fb) {
                    out.push(PlanarIntersection {
                        t_a: at0 + fa * (at1 - at0),
                        t_b: bt0 + fb * (bt1 - bt0),
                        point,
                    });
                }
            }
        }
    }
}

/// Segment-segment intersection. Parallel and collinear pairs produce no
/// hits; overlap decomposition is unsupported.
fn seg_seg(
    a0: Point2,
    a1: Point2,
    b0: Point2,
    b1: Point2,
    tol: &Tolerance,
) -> Option<(f64, f64, Point2)> {
    let d1 = a1 - a0;
    let d2 = b1 - b0;
    let denom = d1.x * d2.y - d1.y * d2.x;
    if denom.abs() < 1e-12 * (d1.norm() * d2.norm()).max(1.0) {
        return None;
    }
    let r = b0 - a0;
    let s = (r.x * d2.y - r.y * d2.x) / denom;
    let u = (r.x * d1.y - r.y * d1.x) / denom;
    let eps_s = tol.linear / d1.norm().max(tol.linear);
    let eps_u = tol.linear / d2.norm().max(tol.linear);
    if s < -eps_s || s > 1.0 + eps_s || u < -eps_u || u > 1.0 + eps_u {
        return None;
    }
    let s = s.clamp(0.0, 1.0);
    let u = u.clamp(0.0, 1.0);
    Some((s, u, a0 + s * d1))
}

/// Segment against a full circle: parameter/point pairs on the segment.
fn seg_circle(
    a0: Point2,
    a1: Point2,
    center: Point2,
    radius: f64,
    tol: &Tolerance,
) -> Vec<(f64, Point2)> {
    let d = a1 - a0;
    let qa = d.dot(&d);
    if qa < 1e-18 {
        return Vec::new();
    }
    let f = a0 - center;
    let qb = 2.0 * f.dot(&d);
    let qc = f.dot(&f) - radius * radius;
    let disc = qb * qb - 4.0 * qa * qc;
    // tangency slack scales with the circle size
    let slack = 4.0 * qa * radius * tol.linear;
    let roots: Vec<f64> = if disc < -slack {
        Vec::new()
    } else if disc <= slack {
        vec![-qb / (2.0 * qa)]
    } else {
        let sq = disc.sqrt();
        vec![(-qb - sq) / (2.0 * qa), (-qb + sq) / (2.0 * qa)]
    };
    let eps = tol.linear / qa.sqrt().max(tol.linear);
    roots
        .into_iter()
        .filter(|s| *s >= -eps && *s <= 1.0 + eps)
        .map(|s| {
            let s = s.clamp(0.0, 1.0);
            (s, a0 + s * d)
        })
        .collect()
}

/// Intersection points of two full circles.
fn circle_circle(c1: Point2, r1: f64, c2: Point2, r2: f64, tol: &Tolerance) -> Vec<Point2> {
    let dv = c2 - c1;
    let d = dv.norm();
    if d < tol.linear {
        // concentric: either identical (overlap unsupported) or disjoint
        return Vec::new();
    }
    if d > r1 + r2 + tol.linear || d < (r1 - r2).abs() - tol.linear {
        return Vec::new();
    }
    let a = (r1 * r1 - r2 * r2 + d * d) / (2.0 * d);
    let h2 = r1 * r1 - a * a;
    let base = c1 + (a / d) * dv;
    if h2 <= tol.linear * tol.linear {
        return vec![base];
    }
    let h = h2.sqrt();
    let perp = Vec2::new(-dv.y, dv.x) * (h / d);
    vec![base + perp, base - perp]
}

fn param_on_arc(arc: &Arc2, point: &Point2, tol: &Tolerance) -> Option<f64> {
    let v = point - arc.center;
    if v.norm() < tol.linear {
        return None;
    }
    arc.param_of_angle(v.y.atan2(v.x), tol.parametric)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planar::{Contour2, Segment2};
    use std::f64::consts::PI;

    fn tol() -> Tolerance {
        Tolerance::DEFAULT
    }

    fn seg(ax: f64, ay: f64, bx: f64, by: f64) -> PlanarCurve {
        PlanarCurve::Segment(Segment2 {
            start: Point2::new(ax, ay),
            end: Point2::new(bx, by),
        })
    }

    fn circle(cx: f64, cy: f64, r: f64) -> PlanarCurve {
        PlanarCurve::Arc(Arc2 {
            center: Point2::new(cx, cy),
            radius: r,
            start_angle: 0.0,
            sweep: 2.0 * PI,
            closed: true,
        })
    }

    #[test]
    fn test_crossing_segments() {
        let a = seg(-1.0, 0.0, 1.0, 0.0);
        let b = seg(0.0, -1.0, 0.0, 1.0);
        let hits = intersect_planar(&a, &b, &tol());
        assert_eq!(hits.len(), 1);
        assert!((hits[0].t_a - 0.5).abs() < 1e-12);
        assert!((hits[0].t_b - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_shared_endpoint() {
        let a = seg(0.0, 0.0, 1.0, 0.0);
        let b = seg(1.0, 0.0, 0.5, 1.0);
        let hits = intersect_planar(&a, &b, &tol());
        assert_eq!(hits.len(), 1);
        assert!((hits[0].t_a - 1.0).abs() < 1e-9);
        assert!(hits[0].t_b.abs() < 1e-9);
    }

    #[test]
    fn test_parallel_segments_no_hit() {
        let a = seg(0.0, 0.0, 1.0, 0.0);
        let b = seg(0.0, 1.0, 1.0, 1.0);
        assert!(intersect_planar(&a, &b, &tol()).is_empty());
    }

    #[test]
    fn test_disjoint_segments_no_hit() {
        let a = seg(0.0, 0.0, 1.0, 0.0);
        let b = seg(2.0, -1.0, 2.0, 1.0);
        assert!(intersect_planar(&a, &b, &tol()).is_empty());
    }

    #[test]
    fn test_line_through_circle() {
        let line = seg(-2.0, 0.0, 2.0, 0.0);
        let circ = circle(0.0, 0.0, 1.0);
        let hits = intersect_planar(&line, &circ, &tol());
        assert_eq!(hits.len(), 2);
        // x = -1 at t 0.25, x = +1 at t 0.75
        assert!((hits[0].t_a - 0.25).abs() < 1e-9);
        assert!((hits[1].t_a - 0.75).abs() < 1e-9);
        // circle params: angle π at t 0.5, angle 0 at t 0
        assert!((hits[0].t_b - 0.5).abs() < 1e-9);
        assert!(hits[1].t_b.abs() < 1e-9);
    }

    #[test]
    fn test_tangent_line_single_hit() {
        let line = seg(-2.0, 1.0, 2.0, 1.0);
        let circ = circle(0.0, 0.0, 1.0);
        let hits = intersect_planar(&line, &circ, &tol());
        assert_eq!(hits.len(), 1);
        assert!((hits[0].point.y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_two_circles_crossing() {
        let a = circle(0.0, 0.0, 1.0);
        let b = circle(1.0, 0.0, 1.0);
        let hits = intersect_planar(&a, &b, &tol());
        assert_eq!(hits.len(), 2);
        for h in &hits {
            assert!(((h.point - Point2::new(0.0, 0.0)).norm() - 1.0).abs() < 1e-9);
            assert!(((h.point - Point2::new(1.0, 0.0)).norm() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_contour_square_vs_segment() {
        let square = PlanarCurve::Contour(Contour2 {
            points: vec![
                Point2::new(0.0, 0.0),
                Point2::new(2.0, 0.0),
                Point2::new(2.0, 2.0),
                Point2::new(0.0, 2.0),
            ],
            closed: true,
        });
        let line = seg(-1.0, 1.0, 3.0, 1.0);
        let hits = intersect_planar(&square, &line, &tol());
        // crosses the right edge (t ∈ [1,2]) and the left edge (t ∈ [3,4])
        assert_eq!(hits.len(), 2);
        assert!((hits[0].t_a - 1.5).abs() < 1e-9);
        assert!((hits[1].t_a - 3.5).abs() < 1e-9);
    }

    #[test]
    fn test_arc_range_excludes_far_side() {
        // Upper half-circle only; a vertical line below must miss it
        let half = PlanarCurve::Arc(Arc2 {
            center: Point2::origin(),
            radius: 1.0,
            start_angle: 0.0,
            sweep: PI,
            closed: false,
        });
        let below = seg(0.0, -2.0, 0.0, -0.5);
        assert!(intersect_planar(&half, &below, &tol()).is_empty());
        let through = seg(0.0, 0.5, 0.0, 2.0);
        let hits = intersect_planar(&half, &through, &tol());
        assert_eq!(hits.len(), 1);
        assert!((hits[0].t_a - 0.5).abs() < 1e-9);
    }
}
