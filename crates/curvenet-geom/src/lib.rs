#![warn(missing_docs)]

//! Geometry primitives for the curvenet planar curve engine.
//!
//! Provides the spatial curve types tracked by the curve network
//! ([`LineSegment3`], [`Arc3`], [`Polyline3`], [`Contour3`]), canonical
//! plane frames ([`Placement`]), the planar (2D) curve model used for
//! intersection and trimming ([`PlanarCurve`]), and analytic curve-curve
//! intersection ([`intersect_planar`]).

mod curve;
mod intersect;
mod placement;
mod planar;

pub use curve::{
    polyline_to_contour, Arc3, Contour3, CurveKind, LineSegment3, Polyline3, SpatialCurve,
};
pub use intersect::{intersect_planar, PlanarIntersection};
pub use placement::Placement;
pub use planar::{Arc2, Contour2, PlanarCurve, Segment2};
