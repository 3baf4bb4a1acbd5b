//! The planar curve database.
//!
//! Maintains a consistent decomposition of every tracked curve into planar
//! fragments split at each mutual intersection, together with the touched
//! relation that drives cascading edits.

use std::collections::{HashMap, HashSet, VecDeque};

use curvenet_geom::{
    intersect_planar, polyline_to_contour, CurveKind, Placement, PlanarCurve, SpatialCurve,
};
use curvenet_math::Tolerance;
use curvenet_store::{FragmentProvenance, GeometryStore, ItemGeometry, ItemId, Origin};

use crate::info::{CurveInfo, Joint, Joints, PlanarCurveId, PointOnCurve, SyntheticIds};
use crate::memento::CurveMemento;
use crate::transaction::Transaction;
use crate::CurveNetError;

/// One pending split point on the curve being processed. Pseudo splits
/// (contour corners, open domain ends) carry no neighbor.
#[derive(Debug, Clone)]
struct Hit {
    t: f64,
    other: Option<PointOnCurve>,
}

/// A parameter span scheduled to become one fragment.
#[derive(Debug, Clone, Copy)]
struct TrimRange {
    start: f64,
    stop: f64,
}

/// Registry of tracked curves and their planar decomposition.
///
/// Each tracked curve is projected onto a canonical placement, intersected
/// against every other curve on the same placement, and materialized in the
/// store as a set of trimmed fragments. Adding or removing a curve re-trims
/// exactly the curves transitively touched by the change.
#[derive(Debug)]
pub struct PlanarCurveDatabase {
    curve2info: HashMap<ItemId, CurveInfo>,
    id2planar: HashMap<PlanarCurveId, PlanarCurve>,
    placements: Vec<Placement>,
    ids: SyntheticIds,
    tol: Tolerance,
}

impl Default for PlanarCurveDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl PlanarCurveDatabase {
    /// Create an empty database with the default tolerance.
    pub fn new() -> Self {
        Self::with_tolerance(Tolerance::DEFAULT)
    }

    /// Create an empty database with an explicit tolerance.
    pub fn with_tolerance(tol: Tolerance) -> Self {
        Self {
            curve2info: HashMap::new(),
            id2planar: HashMap::new(),
            placements: Vec::new(),
            ids: SyntheticIds::new(),
            tol,
        }
    }

    // =========================================================================
    // Add
    // =========================================================================

    /// Track a source curve and re-trim everything it intersects.
    ///
    /// Curves with no planar representation are silently excluded: the call
    /// succeeds but the curve is not tracked. Fragment replacement is
    /// batched after the intersection walk settles, so the store never sees
    /// a half-trimmed intermediate state.
    pub fn add(&mut self, store: &mut GeometryStore, id: ItemId) -> Result<(), CurveNetError> {
        debug_assert!(
            !self.curve2info.contains_key(&id),
            "curve {id} is already tracked"
        );
        let item = store.lookup(id)?;
        let curve: Box<dyn SpatialCurve> = match &item.geometry {
            ItemGeometry::Spatial(c) => c.clone_box(),
            ItemGeometry::Fragment { .. } => return Err(CurveNetError::NotASourceCurve(id)),
        };
        // Polylines lack corner introspection; work on the contour form.
        let curve: Box<dyn SpatialCurve> = match curve.kind() {
            CurveKind::Polyline => match polyline_to_contour(curve.as_ref()) {
                Some(contour) => Box::new(contour),
                None => curve,
            },
            _ => curve,
        };
        // Exclude non-planar curves before touching the placement set.
        let Some(best_fit) = curve.best_fit_placement() else {
            return Ok(());
        };
        if curve.project_onto(&best_fit, &self.tol).is_none() {
            return Ok(());
        }
        let placement = self.normalize_placement(&best_fit);
        let planar = curve
            .project_onto(&self.placements[placement], &self.tol)
            .ok_or(CurveNetError::ProjectionFailed(id))?;

        let mut candidates: Vec<ItemId> = self
            .curve2info
            .iter()
            .filter(|(_, info)| info.placement == placement)
            .map(|(cid, _)| *cid)
            .collect();
        candidates.sort_unstable();
        let planar_id = self.ids.next_id();
        self.id2planar.insert(planar_id, planar);
        self.curve2info
            .insert(id, CurveInfo::new(planar_id, placement));
        candidates.push(id);

        // Worklist: the new curve first, then every neighbor a split lands
        // on, transitively. Replacement is deferred until the walk settles.
        let mut visited: HashSet<ItemId> = HashSet::new();
        let mut queue: VecDeque<ItemId> = VecDeque::from([id]);
        let mut scheduled: Vec<(ItemId, Vec<TrimRange>)> = Vec::new();
        while let Some(cur) = queue.pop_front() {
            if !visited.insert(cur) {
                continue;
            }
            let trims = self.process_curve(cur, &candidates, &mut queue)?;
            scheduled.push((cur, trims));
        }
        for (cur, trims) in scheduled {
            self.replace_fragments(store, cur, &trims)?;
        }
        Ok(())
    }

    /// Find the canonical placement this plane maps to, registering a new
    /// one if no existing placement is the same plane within tolerance.
    fn normalize_placement(&mut self, candidate: &Placement) -> usize {
        for (i, existing) in self.placements.iter().enumerate() {
            if existing.is_same_plane(candidate, &self.tol) {
                return i;
            }
        }
        self.placements.push(candidate.clone());
        self.placements.len() - 1
    }

    /// Intersect one curve against the candidate set and derive its trim
    /// spans. Records touched entries and joints, and enqueues every
    /// neighbor hit so the walk revisits it.
    fn process_curve(
        &mut self,
        cur: ItemId,
        candidates: &[ItemId],
        queue: &mut VecDeque<ItemId>,
    ) -> Result<Vec<TrimRange>, CurveNetError> {
        let planar = self.planar_of(cur)?.clone();
        let (t_min, t_max) = planar.domain();
        let mut hits: Vec<Hit> = Vec::new();
        for &other in candidates {
            if other == cur {
                continue;
            }
            let other_planar = self.planar_of(other)?;
            let (o_min, o_max) = other_planar.domain();
            for isect in intersect_planar(&planar, other_planar, &self.tol) {
                hits.push(Hit {
                    t: isect.t_a,
                    other: Some(PointOnCurve {
                        curve: other,
                        t: isect.t_b,
                        t_min: o_min,
                        t_max: o_max,
                    }),
                });
            }
        }
        // Contour corners always split, even without a crossing there.
        for corner in planar.corner_parameters() {
            hits.push(Hit {
                t: corner,
                other: None,
            });
        }
        if hits.is_empty() {
            return Ok(vec![TrimRange {
                start: t_min,
                stop: t_max,
            }]);
        }
        hits.sort_by(|a, b| a.t.total_cmp(&b.t));

        for hit in &hits {
            if let Some(p) = &hit.other {
                self.touch(cur, p.curve);
                queue.push_back(p.curve);
            }
        }

        if let Some(period) = planar.period() {
            // Closed curves have no boundary: the last fragment wraps from
            // the final split back to the first.
            let first = hits[0].clone();
            hits.push(Hit {
                t: first.t + period,
                other: first.other,
            });
        } else {
            for hit in &hits {
                self.record_boundary_joint(cur, t_min, t_max, hit);
            }
            hits.insert(
                0,
                Hit {
                    t: t_min,
                    other: None,
                },
            );
            hits.push(Hit {
                t: t_max,
                other: None,
            });
        }

        let mut trims = Vec::new();
        for w in hits.windows(2) {
            // Degenerate spans (splits at a shared point, boundary hits)
            // produce no fragment.
            if w[1].t - w[0].t < self.tol.parametric {
                continue;
            }
            trims.push(TrimRange {
                start: w[0].t,
                stop: w[1].t,
            });
        }
        Ok(trims)
    }

    /// Record a joint where a crossing sits on a participant's domain
    /// boundary. Interior crossings and closed participants record nothing.
    fn record_boundary_joint(&mut self, cur: ItemId, t_min: f64, t_max: f64, hit: &Hit) {
        let Some(other) = &hit.other else {
            return;
        };
        let here = PointOnCurve {
            curve: cur,
            t: hit.t,
            t_min,
            t_max,
        };
        if self.tol.params_equal(hit.t, t_min) {
            if let Some(info) = self.curve2info.get_mut(&cur) {
                info.joints.start = Some(Joint {
                    on_curve: here.clone(),
                    on_other: other.clone(),
                });
            }
        } else if self.tol.params_equal(hit.t, t_max) {
            if let Some(info) = self.curve2info.get_mut(&cur) {
                info.joints.stop = Some(Joint {
                    on_curve: here.clone(),
                    on_other: other.clone(),
                });
            }
        }
        if !self.curve_is_open(other.curve) {
            return;
        }
        if self.tol.params_equal(other.t, other.t_min) {
            if let Some(info) = self.curve2info.get_mut(&other.curve) {
                info.joints.start = Some(Joint {
                    on_curve: other.clone(),
                    on_other: here.clone(),
                });
            }
        } else if self.tol.params_equal(other.t, other.t_max) {
            if let Some(info) = self.curve2info.get_mut(&other.curve) {
                info.joints.stop = Some(Joint {
                    on_curve: other.clone(),
                    on_other: here,
                });
            }
        }
    }

    fn curve_is_open(&self, id: ItemId) -> bool {
        self.curve2info
            .get(&id)
            .and_then(|info| self.id2planar.get(&info.planar_id))
            .map(|planar| !planar.is_closed())
            .unwrap_or(false)
    }

    fn touch(&mut self, a: ItemId, b: ItemId) {
        if let Some(info) = self.curve2info.get_mut(&a) {
            info.touched.insert(b);
        }
        if let Some(info) = self.curve2info.get_mut(&b) {
            info.touched.insert(a);
        }
    }

    fn planar_of(&self, id: ItemId) -> Result<&PlanarCurve, CurveNetError> {
        let info = self
            .curve2info
            .get(&id)
            .ok_or(CurveNetError::UnknownCurve(id))?;
        self.id2planar
            .get(&info.planar_id)
            .ok_or(CurveNetError::UnknownCurve(id))
    }

    /// Replace a curve's materialized fragments wholesale: remove every
    /// stale fragment item, then create one item per trim span.
    fn replace_fragments(
        &mut self,
        store: &mut GeometryStore,
        cur: ItemId,
        trims: &[TrimRange],
    ) -> Result<(), CurveNetError> {
        let info = self
            .curve2info
            .get(&cur)
            .ok_or(CurveNetError::UnknownCurve(cur))?;
        let placement = self
            .placements
            .get(info.placement)
            .cloned()
            .ok_or(CurveNetError::UnknownCurve(cur))?;
        let planar = self
            .id2planar
            .get(&info.planar_id)
            .cloned()
            .ok_or(CurveNetError::UnknownCurve(cur))?;
        let stale = info.fragments.clone();
        for fid in stale {
            store.remove(fid, Origin::Automatic)?;
        }
        let mut fresh = Vec::with_capacity(trims.len());
        for range in trims {
            let Some(trimmed) = planar.trim(range.start, range.stop, &self.tol) else {
                continue;
            };
            let fid = store.add_fragment(
                trimmed,
                placement.clone(),
                FragmentProvenance {
                    parent: cur,
                    start: range.start,
                    stop: range.stop,
                },
                Origin::Automatic,
            )?;
            fresh.push(fid);
        }
        if let Some(info) = self.curve2info.get_mut(&cur) {
            info.fragments = fresh;
        }
        Ok(())
    }

    // =========================================================================
    // Cascade / commit / remove
    // =========================================================================

    /// Collect the consequences of deleting a curve into a transaction:
    /// the curve itself into `deleted`, and the transitive closure of its
    /// touched relation into `dirty`.
    pub fn cascade(&self, id: ItemId, tx: &mut Transaction) {
        tx.deleted.insert(id);
        let Some(info) = self.curve2info.get(&id) else {
            return;
        };
        let mut walk: Vec<ItemId> = info.touched.iter().copied().collect();
        while let Some(c) = walk.pop() {
            if !tx.dirty.insert(c) {
                continue;
            }
            if let Some(ci) = self.curve2info.get(&c) {
                walk.extend(ci.touched.iter().copied());
            }
        }
    }

    /// Apply a transaction: tear down every dirty and deleted curve, then
    /// re-add the survivors and the newly created curves.
    ///
    /// All teardowns happen before any re-add, so every re-add sees a
    /// candidate set with no stale fragments. There is no rollback; a
    /// failure mid-commit leaves earlier teardowns applied.
    pub fn commit(
        &mut self,
        store: &mut GeometryStore,
        tx: Transaction,
    ) -> Result<(), CurveNetError> {
        for id in &tx.dirty {
            self.teardown(store, *id)?;
        }
        for id in &tx.deleted {
            if !tx.dirty.contains(id) {
                self.teardown(store, *id)?;
            }
        }
        for id in &tx.dirty {
            if !tx.deleted.contains(id) {
                self.add(store, *id)?;
            }
        }
        for id in &tx.added {
            if !tx.deleted.contains(id) && !tx.dirty.contains(id) {
                self.add(store, *id)?;
            }
        }
        Ok(())
    }

    /// Stop tracking a curve, re-trimming everything it touched.
    ///
    /// Composes [`cascade`](Self::cascade) and [`commit`](Self::commit).
    /// The source item itself stays in the store; deleting it is the
    /// caller's decision.
    pub fn remove(&mut self, store: &mut GeometryStore, id: ItemId) -> Result<(), CurveNetError> {
        let mut tx = Transaction::new();
        self.cascade(id, &mut tx);
        self.commit(store, tx)
    }

    /// Forget a curve's registry state and remove its fragments from the
    /// store. Tolerates curves that are not tracked.
    fn teardown(&mut self, store: &mut GeometryStore, id: ItemId) -> Result<(), CurveNetError> {
        let Some(info) = self.curve2info.remove(&id) else {
            return Ok(());
        };
        self.id2planar.remove(&info.planar_id);
        for fid in info.fragments {
            store.remove(fid, Origin::Automatic)?;
        }
        Ok(())
    }

    // =========================================================================
    // Mementos
    // =========================================================================

    /// Snapshot the registry for later restore.
    pub fn save_to_memento(&self) -> CurveMemento {
        CurveMemento {
            curve2info: self.curve2info.clone(),
            id2planar: self.id2planar.clone(),
            placements: self.placements.clone(),
        }
    }

    /// Restore the registry from a snapshot.
    ///
    /// The snapshot is cloned, not consumed, so it stays valid for a later
    /// redo. The synthetic id allocator is deliberately not reset. Fragment
    /// items referenced by the snapshot are not re-created here; the caller's
    /// undo layer restores the store alongside the registry.
    pub fn restore_from_memento(&mut self, memento: &CurveMemento) {
        self.curve2info = memento.curve2info.clone();
        self.id2planar = memento.id2planar.clone();
        self.placements = memento.placements.clone();
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Bookkeeping for one tracked curve.
    pub fn info(&self, id: ItemId) -> Option<&CurveInfo> {
        self.curve2info.get(&id)
    }

    /// True if the curve is tracked.
    pub fn is_tracked(&self, id: ItemId) -> bool {
        self.curve2info.contains_key(&id)
    }

    /// The curve's current fragment items.
    pub fn fragments(&self, id: ItemId) -> Option<&[ItemId]> {
        self.curve2info.get(&id).map(|i| i.fragments.as_slice())
    }

    /// The curves this curve currently intersects.
    pub fn touched(&self, id: ItemId) -> Option<&HashSet<ItemId>> {
        self.curve2info.get(&id).map(|i| &i.touched)
    }

    /// The curve's end-point joints.
    pub fn joints(&self, id: ItemId) -> Option<&Joints> {
        self.curve2info.get(&id).map(|i| &i.joints)
    }

    /// The canonical placement the curve lives on.
    pub fn placement_of(&self, id: ItemId) -> Option<&Placement> {
        self.curve2info
            .get(&id)
            .and_then(|i| self.placements.get(i.placement))
    }

    /// The curve's planar projection.
    pub fn planar_curve(&self, id: ItemId) -> Option<&PlanarCurve> {
        self.curve2info
            .get(&id)
            .and_then(|i| self.id2planar.get(&i.planar_id))
    }

    /// Number of distinct canonical placements registered so far.
    pub fn placement_count(&self) -> usize {
        self.placements.len()
    }

    /// Iterate over all tracked curve ids.
    pub fn curves(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.curve2info.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;

    use curvenet_geom::{Arc3, LineSegment3, Polyline3};
    use curvenet_math::{Point3, Vec3};

    fn setup() -> (GeometryStore, PlanarCurveDatabase) {
        (GeometryStore::new(), PlanarCurveDatabase::new())
    }

    fn segment(store: &mut GeometryStore, a: [f64; 3], b: [f64; 3]) -> ItemId {
        store.add_curve(
            Box::new(LineSegment3::from_points(
                Point3::new(a[0], a[1], a[2]),
                Point3::new(b[0], b[1], b[2]),
            )),
            Origin::User,
        )
    }

    fn store_fragment_count(store: &GeometryStore) -> usize {
        store.iter().filter(|i| i.provenance.is_some()).count()
    }

    #[test]
    fn test_crossing_segments_split_in_two() {
        let (mut store, mut db) = setup();
        let a = segment(&mut store, [-1.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
        let b = segment(&mut store, [0.0, -1.0, 0.0], [0.0, 1.0, 0.0]);
        db.add(&mut store, a).unwrap();
        assert_eq!(db.fragments(a).unwrap().len(), 1);

        db.add(&mut store, b).unwrap();
        assert_eq!(db.fragments(a).unwrap().len(), 2);
        assert_eq!(db.fragments(b).unwrap().len(), 2);
        assert!(db.touched(a).unwrap().contains(&b));
        assert!(db.touched(b).unwrap().contains(&a));
        assert_eq!(store_fragment_count(&store), 4);
        assert_eq!(db.placement_count(), 1);
    }

    #[test]
    fn test_third_curve_splits_both() {
        let (mut store, mut db) = setup();
        let l1 = segment(&mut store, [-2.0, 0.0, 0.0], [2.0, 0.0, 0.0]);
        let l2 = segment(&mut store, [0.0, -2.0, 0.0], [0.0, 2.0, 0.0]);
        // y = x + 1: crosses l1 at (-1, 0) and l2 at (0, 1)
        let l3 = segment(&mut store, [-2.0, -1.0, 0.0], [2.0, 3.0, 0.0]);
        db.add(&mut store, l1).unwrap();
        db.add(&mut store, l2).unwrap();
        db.add(&mut store, l3).unwrap();

        assert_eq!(db.fragments(l1).unwrap().len(), 3);
        assert_eq!(db.fragments(l2).unwrap().len(), 3);
        assert_eq!(db.fragments(l3).unwrap().len(), 3);
        assert_eq!(store_fragment_count(&store), 9);
        for (x, y) in [(l1, l2), (l1, l3), (l2, l3)] {
            assert!(db.touched(x).unwrap().contains(&y));
            assert!(db.touched(y).unwrap().contains(&x));
        }
    }

    #[test]
    fn test_lone_circle_single_fragment() {
        let (mut store, mut db) = setup();
        let circle = store.add_curve(
            Box::new(Arc3::circle(Point3::origin(), Vec3::z(), 1.0)),
            Origin::User,
        );
        db.add(&mut store, circle).unwrap();

        // Nothing to intersect: one fragment spanning the whole closed
        // domain, still closed.
        let frags = db.fragments(circle).unwrap();
        assert_eq!(frags.len(), 1);
        assert!(db.touched(circle).unwrap().is_empty());
        let item = store.lookup(frags[0]).unwrap();
        let prov = item.provenance.as_ref().unwrap();
        assert!(prov.start.abs() < 1e-9);
        assert!((prov.stop - 1.0).abs() < 1e-9);
        match &item.geometry {
            ItemGeometry::Fragment { curve, .. } => assert!(curve.is_closed()),
            other => panic!("expected fragment geometry, got {other:?}"),
        }
    }

    #[test]
    fn test_crossed_circle_fragments_cover_full_period() {
        let (mut store, mut db) = setup();
        let circle = store.add_curve(
            Box::new(Arc3::circle(Point3::origin(), Vec3::z(), 1.0)),
            Origin::User,
        );
        let line = segment(&mut store, [-2.0, 0.0, 0.0], [2.0, 0.0, 0.0]);
        db.add(&mut store, circle).unwrap();
        db.add(&mut store, line).unwrap();

        let mut spans: Vec<(f64, f64)> = db
            .fragments(circle)
            .unwrap()
            .iter()
            .map(|fid| {
                let p = store.lookup(*fid).unwrap().provenance.as_ref().unwrap().clone();
                (p.start, p.stop)
            })
            .collect();
        spans.sort_by(|a, b| a.0.total_cmp(&b.0));
        // Contiguous spans starting at the first split, summing to the
        // full period; the last one wraps past the domain end.
        let total: f64 = spans.iter().map(|s| s.1 - s.0).sum();
        assert!((total - 1.0).abs() < 1e-9);
        for w in spans.windows(2) {
            assert!((w[0].1 - w[1].0).abs() < 1e-9, "gap in {spans:?}");
        }
        let first = spans.first().unwrap();
        let last = spans.last().unwrap();
        assert!((last.1 - (first.0 + 1.0)).abs() < 1e-9);
    }

    #[test]
    fn test_circle_and_line() {
        let (mut store, mut db) = setup();
        let circle = store.add_curve(
            Box::new(Arc3::circle(Point3::origin(), Vec3::z(), 1.0)),
            Origin::User,
        );
        let line = segment(&mut store, [-2.0, 0.0, 0.0], [2.0, 0.0, 0.0]);
        db.add(&mut store, circle).unwrap();
        db.add(&mut store, line).unwrap();

        // The line crosses the circle twice: the circle splits into two
        // arcs, the line into three segments.
        assert_eq!(db.fragments(circle).unwrap().len(), 2);
        assert_eq!(db.fragments(line).unwrap().len(), 3);
        assert!(db.touched(circle).unwrap().contains(&line));
    }

    #[test]
    fn test_shared_endpoint_records_joints() {
        let (mut store, mut db) = setup();
        let a = segment(&mut store, [0.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
        let b = segment(&mut store, [1.0, 0.0, 0.0], [2.0, 1.0, 0.0]);
        db.add(&mut store, a).unwrap();
        db.add(&mut store, b).unwrap();

        // Meeting only at the shared endpoint: no interior split.
        assert_eq!(db.fragments(a).unwrap().len(), 1);
        assert_eq!(db.fragments(b).unwrap().len(), 1);
        assert!(db.touched(a).unwrap().contains(&b));

        let ja = db.joints(a).unwrap();
        assert!(ja.start.is_none());
        let stop = ja.stop.as_ref().unwrap();
        assert_eq!(stop.on_other.curve, b);
        assert!(stop.on_other.t.abs() < 1e-9);

        let jb = db.joints(b).unwrap();
        let start = jb.start.as_ref().unwrap();
        assert_eq!(start.on_other.curve, a);
        assert!((start.on_other.t - 1.0).abs() < 1e-9);
        assert!(jb.stop.is_none());
    }

    #[test]
    fn test_triangle_joints_link_all_corners() {
        let (mut store, mut db) = setup();
        let a = segment(&mut store, [0.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
        let b = segment(&mut store, [1.0, 0.0, 0.0], [0.5, 1.0, 0.0]);
        let c = segment(&mut store, [0.5, 1.0, 0.0], [0.0, 0.0, 0.0]);
        db.add(&mut store, a).unwrap();
        db.add(&mut store, b).unwrap();
        db.add(&mut store, c).unwrap();

        let expect = [(a, c, b), (b, a, c), (c, b, a)];
        for (id, at_start, at_stop) in expect {
            let joints = db.joints(id).unwrap();
            assert_eq!(joints.start.as_ref().unwrap().on_other.curve, at_start);
            assert_eq!(joints.stop.as_ref().unwrap().on_other.curve, at_stop);
            assert_eq!(db.fragments(id).unwrap().len(), 1);
        }
    }

    #[test]
    fn test_interior_crossing_records_no_joints() {
        let (mut store, mut db) = setup();
        let a = segment(&mut store, [-1.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
        let b = segment(&mut store, [0.0, -1.0, 0.0], [0.0, 1.0, 0.0]);
        db.add(&mut store, a).unwrap();
        db.add(&mut store, b).unwrap();
        for id in [a, b] {
            let joints = db.joints(id).unwrap();
            assert!(joints.start.is_none());
            assert!(joints.stop.is_none());
        }
    }

    #[test]
    fn test_remove_retrims_neighbors() {
        let (mut store, mut db) = setup();
        let l1 = segment(&mut store, [-2.0, 0.0, 0.0], [2.0, 0.0, 0.0]);
        let l3 = segment(&mut store, [-2.0, 1.0, 0.0], [2.0, 1.0, 0.0]);
        let l2 = segment(&mut store, [0.0, -2.0, 0.0], [0.0, 2.0, 0.0]);
        db.add(&mut store, l1).unwrap();
        db.add(&mut store, l3).unwrap();
        db.add(&mut store, l2).unwrap();
        assert_eq!(db.fragments(l1).unwrap().len(), 2);
        assert_eq!(db.fragments(l2).unwrap().len(), 3);
        assert_eq!(db.fragments(l3).unwrap().len(), 2);

        db.remove(&mut store, l2).unwrap();
        assert!(!db.is_tracked(l2));
        assert_eq!(db.fragments(l1).unwrap().len(), 1);
        assert_eq!(db.fragments(l3).unwrap().len(), 1);
        assert!(db.touched(l1).unwrap().is_empty());
        assert!(db.touched(l3).unwrap().is_empty());
        // No orphan fragments survive the removal.
        for item in store.iter() {
            if let Some(p) = &item.provenance {
                assert_ne!(p.parent, l2);
            }
        }
        // The source item itself is untouched.
        assert!(store.contains(l2));
    }

    #[test]
    fn test_cascade_collects_transitive_closure() {
        let (mut store, mut db) = setup();
        // A chain: l1 crosses l2, l2 crosses l3, l1 and l3 never meet.
        let l1 = segment(&mut store, [-2.0, 0.0, 0.0], [2.0, 0.0, 0.0]);
        let l2 = segment(&mut store, [1.0, -1.0, 0.0], [1.0, 3.0, 0.0]);
        let l3 = segment(&mut store, [-1.0, 2.0, 0.0], [3.0, 2.0, 0.0]);
        db.add(&mut store, l1).unwrap();
        db.add(&mut store, l2).unwrap();
        db.add(&mut store, l3).unwrap();
        assert!(!db.touched(l1).unwrap().contains(&l3));

        let mut tx = Transaction::new();
        db.cascade(l1, &mut tx);
        assert!(tx.deleted.contains(&l1));
        // Dirty reaches l3 through l2 even though l1 never touches it.
        assert!(tx.dirty.contains(&l2));
        assert!(tx.dirty.contains(&l3));
    }

    #[test]
    fn test_commit_applies_adds_and_deletes_together() {
        let (mut store, mut db) = setup();
        let l1 = segment(&mut store, [-2.0, 0.0, 0.0], [2.0, 0.0, 0.0]);
        let l2 = segment(&mut store, [0.0, -2.0, 0.0], [0.0, 2.0, 0.0]);
        db.add(&mut store, l1).unwrap();
        db.add(&mut store, l2).unwrap();

        // Replace l2 with a parallel line that misses l1.
        let l4 = segment(&mut store, [-2.0, 1.0, 0.0], [2.0, 1.0, 0.0]);
        let mut tx = Transaction::new();
        db.cascade(l2, &mut tx);
        tx.add(l4);
        db.commit(&mut store, tx).unwrap();

        assert!(!db.is_tracked(l2));
        assert_eq!(db.fragments(l1).unwrap().len(), 1);
        assert_eq!(db.fragments(l4).unwrap().len(), 1);
        assert!(db.touched(l1).unwrap().is_empty());
    }

    #[test]
    fn test_placements_are_deduplicated() {
        let (mut store, mut db) = setup();
        let a = segment(&mut store, [-1.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
        let b = segment(&mut store, [0.0, -1.0, 0.0], [0.0, 1.0, 0.0]);
        let high = store.add_curve(
            Box::new(Arc3::circle(Point3::new(0.0, 0.0, 5.0), Vec3::z(), 1.0)),
            Origin::User,
        );
        let near = store.add_curve(
            Box::new(Arc3::circle(Point3::new(3.0, 0.0, 5.0 + 1e-8), Vec3::z(), 1.0)),
            Origin::User,
        );
        db.add(&mut store, a).unwrap();
        db.add(&mut store, b).unwrap();
        db.add(&mut store, high).unwrap();
        db.add(&mut store, near).unwrap();

        // a and b share z = 0, both circles share z = 5 within tolerance.
        assert_eq!(db.placement_count(), 2);
        assert_eq!(
            db.info(a).unwrap().placement,
            db.info(b).unwrap().placement
        );
    }

    #[test]
    fn test_open_polyline_splits_at_corner() {
        let (mut store, mut db) = setup();
        let poly = store.add_curve(
            Box::new(Polyline3::new(
                vec![
                    Point3::origin(),
                    Point3::new(2.0, 0.0, 0.0),
                    Point3::new(2.0, 2.0, 0.0),
                ],
                false,
            )),
            Origin::User,
        );
        db.add(&mut store, poly).unwrap();
        // One corner, no neighbors: two fragments.
        assert_eq!(db.fragments(poly).unwrap().len(), 2);
    }

    #[test]
    fn test_closed_polyline_splits_at_every_corner() {
        let (mut store, mut db) = setup();
        let square = store.add_curve(
            Box::new(Polyline3::new(
                vec![
                    Point3::origin(),
                    Point3::new(2.0, 0.0, 0.0),
                    Point3::new(2.0, 2.0, 0.0),
                    Point3::new(0.0, 2.0, 0.0),
                ],
                true,
            )),
            Origin::User,
        );
        db.add(&mut store, square).unwrap();
        assert_eq!(db.fragments(square).unwrap().len(), 4);
    }

    #[derive(Debug, Clone)]
    struct Helix;

    impl SpatialCurve for Helix {
        fn kind(&self) -> CurveKind {
            CurveKind::Generic
        }
        fn evaluate(&self, t: f64) -> Point3 {
            Point3::new(t.cos(), t.sin(), t)
        }
        fn tangent(&self, t: f64) -> Vec3 {
            Vec3::new(-t.sin(), t.cos(), 1.0)
        }
        fn domain(&self) -> (f64, f64) {
            (0.0, 10.0)
        }
        fn is_closed(&self) -> bool {
            false
        }
        fn best_fit_placement(&self) -> Option<Placement> {
            None
        }
        fn project_onto(&self, _placement: &Placement, _tol: &Tolerance) -> Option<PlanarCurve> {
            None
        }
        fn clone_box(&self) -> Box<dyn SpatialCurve> {
            Box::new(self.clone())
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_nonplanar_curve_is_silently_excluded() {
        let (mut store, mut db) = setup();
        let helix = store.add_curve(Box::new(Helix), Origin::User);
        db.add(&mut store, helix).unwrap();
        assert!(!db.is_tracked(helix));
        assert_eq!(db.placement_count(), 0);
        assert_eq!(store_fragment_count(&store), 0);
    }

    #[test]
    fn test_fragments_cover_parent_domain() {
        let (mut store, mut db) = setup();
        let l1 = segment(&mut store, [-2.0, 0.0, 0.0], [2.0, 0.0, 0.0]);
        let l2 = segment(&mut store, [0.0, -2.0, 0.0], [0.0, 2.0, 0.0]);
        let l3 = segment(&mut store, [-2.0, -1.0, 0.0], [2.0, 3.0, 0.0]);
        db.add(&mut store, l1).unwrap();
        db.add(&mut store, l2).unwrap();
        db.add(&mut store, l3).unwrap();

        for id in [l1, l2, l3] {
            let mut spans: Vec<(f64, f64)> = db
                .fragments(id)
                .unwrap()
                .iter()
                .map(|fid| {
                    let item = store.lookup(*fid).unwrap();
                    let p = item.provenance.as_ref().unwrap();
                    (p.start, p.stop)
                })
                .collect();
            spans.sort_by(|a, b| a.0.total_cmp(&b.0));
            assert!(spans.first().unwrap().0.abs() < 1e-9);
            assert!((spans.last().unwrap().1 - 1.0).abs() < 1e-9);
            for w in spans.windows(2) {
                assert!((w[0].1 - w[1].0).abs() < 1e-9, "gap in {id}: {spans:?}");
            }
        }
    }

    #[test]
    fn test_memento_round_trip() {
        let (mut store, mut db) = setup();
        let a = segment(&mut store, [-1.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
        let b = segment(&mut store, [0.0, -1.0, 0.0], [0.0, 1.0, 0.0]);
        db.add(&mut store, a).unwrap();
        db.add(&mut store, b).unwrap();
        let snapshot = db.save_to_memento();
        assert_eq!(snapshot.curve_count(), 2);

        db.remove(&mut store, a).unwrap();
        assert!(!db.is_tracked(a));
        assert_eq!(db.fragments(b).unwrap().len(), 1);

        db.restore_from_memento(&snapshot);
        assert!(db.is_tracked(a));
        assert_eq!(db.fragments(a).unwrap().len(), 2);
        assert!(db.touched(b).unwrap().contains(&a));

        // The snapshot survives the restore and can be applied again.
        db.restore_from_memento(&snapshot);
        assert_eq!(db.fragments(a).unwrap().len(), 2);
    }

    #[test]
    fn test_fragment_item_cannot_be_tracked() {
        let (mut store, mut db) = setup();
        let a = segment(&mut store, [-1.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
        db.add(&mut store, a).unwrap();
        let frag = db.fragments(a).unwrap()[0];
        let err = db.add(&mut store, frag);
        assert!(matches!(err, Err(CurveNetError::NotASourceCurve(_))));
    }
}
