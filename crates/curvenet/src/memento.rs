//! Registry snapshots for undo/redo.

use std::collections::HashMap;

use curvenet_geom::{Placement, PlanarCurve};
use curvenet_store::ItemId;

use crate::info::{CurveInfo, PlanarCurveId};

/// An immutable snapshot of the curve registry.
///
/// Snapshots are copy-on-save and copy-on-restore: mutating the live
/// registry never corrupts a held snapshot, and a snapshot stays reusable
/// for repeated restores (redo after undo).
#[derive(Debug, Clone)]
pub struct CurveMemento {
    pub(crate) curve2info: HashMap<ItemId, CurveInfo>,
    pub(crate) id2planar: HashMap<PlanarCurveId, PlanarCurve>,
    pub(crate) placements: Vec<Placement>,
}

impl CurveMemento {
    /// Number of tracked curves in the snapshot.
    pub fn curve_count(&self) -> usize {
        self.curve2info.len()
    }
}
