//! Per-curve bookkeeping for the planar curve network.

use std::collections::HashSet;

use curvenet_store::ItemId;

/// Identity of a curve's canonical planar projection.
///
/// Planar curve ids are synthetic: negative, descending from -1, so they
/// can never collide with store-assigned item ids (positive).
pub type PlanarCurveId = i64;

/// A parameter-space reference to a point on a curve.
#[derive(Debug, Clone)]
pub struct PointOnCurve {
    /// The curve's identity.
    pub curve: ItemId,
    /// Parameter of the point.
    pub t: f64,
    /// Domain start of the curve.
    pub t_min: f64,
    /// Domain end of the curve.
    pub t_max: f64,
}

/// A tangency linkage between two curve endpoints.
///
/// Joints are only recorded when an intersection sits exactly on a curve's
/// domain boundary; interior crossings never produce joints.
#[derive(Debug, Clone)]
pub struct Joint {
    /// The boundary point on the owning curve.
    pub on_curve: PointOnCurve,
    /// The coincident point on the neighboring curve.
    pub on_other: PointOnCurve,
}

/// The joints recorded at a curve's two ends. A curve end joins at most
/// one neighbor at a time (last write wins).
#[derive(Debug, Clone, Default)]
pub struct Joints {
    /// Joint at the domain start, if any.
    pub start: Option<Joint>,
    /// Joint at the domain end, if any.
    pub stop: Option<Joint>,
}

/// Bookkeeping for one tracked curve.
#[derive(Debug, Clone)]
pub struct CurveInfo {
    /// Identity of the curve's planar projection.
    pub planar_id: PlanarCurveId,
    /// Index of the curve's canonical placement.
    pub placement: usize,
    /// Curves this curve currently intersects.
    pub touched: HashSet<ItemId>,
    /// Fragment items currently materialized in the store for this curve.
    /// Replaced wholesale on every re-trim.
    pub fragments: Vec<ItemId>,
    /// End-point tangency linkages.
    pub joints: Joints,
}

impl CurveInfo {
    pub(crate) fn new(planar_id: PlanarCurveId, placement: usize) -> Self {
        Self {
            planar_id,
            placement,
            touched: HashSet::new(),
            fragments: Vec::new(),
            joints: Joints::default(),
        }
    }
}

/// Allocator for synthetic planar curve identities: injective, negative,
/// disjoint from store item ids. Never reset, so ids minted after a
/// memento restore cannot collide with ids held inside any snapshot.
#[derive(Debug)]
pub(crate) struct SyntheticIds {
    next: PlanarCurveId,
}

impl SyntheticIds {
    pub(crate) fn new() -> Self {
        Self { next: -1 }
    }

    pub(crate) fn next_id(&mut self) -> PlanarCurveId {
        let id = self.next;
        self.next -= 1;
        id
    }
}
