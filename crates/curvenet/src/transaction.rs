//! Batch descriptors for cascading multi-curve edits.

use std::collections::HashSet;

use curvenet_store::ItemId;

/// A batched edit: produced by cascade, consumed by commit.
///
/// `dirty` is the transitive-touch closure of everything invalidated by
/// the deletions; `added` holds curves newly created by the edit.
#[derive(Debug, Clone, Default)]
pub struct Transaction {
    /// Curves whose fragments must be recomputed.
    pub dirty: HashSet<ItemId>,
    /// Curves being deleted.
    pub deleted: HashSet<ItemId>,
    /// Curves newly created by this edit.
    pub added: HashSet<ItemId>,
}

impl Transaction {
    /// Create an empty transaction.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a curve as newly created by this edit.
    pub fn add(&mut self, id: ItemId) {
        self.added.insert(id);
    }
}
