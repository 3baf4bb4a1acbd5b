#![warn(missing_docs)]

//! Geometry item store for the curvenet engine.
//!
//! Holds every visible curve entity: source curves added by the user and
//! the planar fragments the curve network generates from them. Items are
//! keyed by a stable positive integer identity; fragments carry provenance
//! back to their parent curve's parameter range. Every mutation is tagged
//! with an [`Origin`] and journaled so the caller's undo layer can group
//! system-generated writes separately from user actions.

use std::collections::HashMap;

use curvenet_geom::{Placement, PlanarCurve, SpatialCurve};
use thiserror::Error;

/// Stable identity of a store item.
///
/// The store allocates positive ids ascending from 1; negative ids are
/// reserved for synthetic identities minted elsewhere (they never appear
/// as store keys).
pub type ItemId = i64;

/// Who caused a store mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// A direct user action.
    User,
    /// A system-generated write (e.g. fragment maintenance).
    Automatic,
}

/// Errors from store operations.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// No item with the given identity exists.
    #[error("no item with id {0}")]
    MissingItem(ItemId),

    /// A fragment referenced a parent item that does not exist.
    #[error("fragment parent {0} is not in the store")]
    MissingParent(ItemId),

    /// A fragment's parameter span is degenerate.
    #[error("degenerate fragment span [{start}, {stop}] on parent {parent}")]
    DegenerateFragment {
        /// Parent curve identity.
        parent: ItemId,
        /// Span start parameter.
        start: f64,
        /// Span stop parameter.
        stop: f64,
    },
}

/// Provenance of a generated fragment: the parameter range it covers on
/// its parent curve.
#[derive(Debug, Clone)]
pub struct FragmentProvenance {
    /// The source curve this fragment was trimmed from.
    pub parent: ItemId,
    /// Start parameter on the parent curve.
    pub start: f64,
    /// Stop parameter on the parent curve.
    pub stop: f64,
}

/// The geometry an item holds.
#[derive(Debug, Clone)]
pub enum ItemGeometry {
    /// A source curve added by a caller.
    Spatial(Box<dyn SpatialCurve>),
    /// A generated planar fragment on a canonical placement.
    Fragment {
        /// The trimmed planar curve.
        curve: PlanarCurve,
        /// The placement the fragment lives on.
        placement: Placement,
    },
}

/// One entity in the store.
#[derive(Debug, Clone)]
pub struct Item {
    /// Stable identity.
    pub id: ItemId,
    /// The geometry this item holds.
    pub geometry: ItemGeometry,
    /// Who created this item.
    pub origin: Origin,
    /// Provenance, present on generated fragments only.
    pub provenance: Option<FragmentProvenance>,
}

/// A journaled store mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    /// An item was added.
    Added {
        /// The item's identity.
        id: ItemId,
        /// Who added it.
        origin: Origin,
    },
    /// An item was removed.
    Removed {
        /// The item's identity.
        id: ItemId,
        /// Who removed it.
        origin: Origin,
    },
}

/// Storage for all curve entities, keyed by identity.
#[derive(Debug)]
pub struct GeometryStore {
    items: HashMap<ItemId, Item>,
    next_id: ItemId,
    events: Vec<StoreEvent>,
}

impl Default for GeometryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GeometryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            items: HashMap::new(),
            next_id: 1,
            events: Vec::new(),
        }
    }

    /// Add a source curve and return its identity.
    pub fn add_curve(&mut self, curve: Box<dyn SpatialCurve>, origin: Origin) -> ItemId {
        let id = self.next_id;
        self.next_id += 1;
        self.items.insert(
            id,
            Item {
                id,
                geometry: ItemGeometry::Spatial(curve),
                origin,
                provenance: None,
            },
        );
        self.events.push(StoreEvent::Added { id, origin });
        id
    }

    /// Add a generated planar fragment and return its identity.
    ///
    /// Fails if the provenance parent is not in the store or the span is
    /// degenerate.
    pub fn add_fragment(
        &mut self,
        curve: PlanarCurve,
        placement: Placement,
        provenance: FragmentProvenance,
        origin: Origin,
    ) -> Result<ItemId, StoreError> {
        if !self.items.contains_key(&provenance.parent) {
            return Err(StoreError::MissingParent(provenance.parent));
        }
        if provenance.stop - provenance.start < 1e-12 {
            return Err(StoreError::DegenerateFragment {
                parent: provenance.parent,
                start: provenance.start,
                stop: provenance.stop,
            });
        }
        let id = self.next_id;
        self.next_id += 1;
        self.items.insert(
            id,
            Item {
                id,
                geometry: ItemGeometry::Fragment { curve, placement },
                origin,
                provenance: Some(provenance),
            },
        );
        self.events.push(StoreEvent::Added { id, origin });
        Ok(id)
    }

    /// Look up an item by identity.
    pub fn lookup(&self, id: ItemId) -> Result<&Item, StoreError> {
        self.items.get(&id).ok_or(StoreError::MissingItem(id))
    }

    /// True if the store holds an item with this identity.
    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains_key(&id)
    }

    /// Remove an item, journaling who removed it.
    pub fn remove(&mut self, id: ItemId, origin: Origin) -> Result<Item, StoreError> {
        let item = self.items.remove(&id).ok_or(StoreError::MissingItem(id))?;
        self.events.push(StoreEvent::Removed { id, origin });
        Ok(item)
    }

    /// Number of items in the store.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over all items.
    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    /// Drain the mutation journal (consumed by the caller's undo layer).
    pub fn drain_events(&mut self) -> Vec<StoreEvent> {
        std::mem::take(&mut self.events)
    }
}
