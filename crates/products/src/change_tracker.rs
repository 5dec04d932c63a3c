//! Dirty-field bookkeeping for partial persistence.

use std::collections::BTreeSet;

/// Set of logical fields changed since the owning aggregate was built or loaded.
///
/// Purely in-memory; never persisted. Marking is idempotent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeTracker<F: Ord> {
    dirty: BTreeSet<F>,
}

impl<F: Ord> Default for ChangeTracker<F> {
    fn default() -> Self {
        Self {
            dirty: BTreeSet::new(),
        }
    }
}

impl<F: Ord + Copy> ChangeTracker<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_dirty(&mut self, field: F) {
        self.dirty.insert(field);
    }

    pub fn is_dirty(&self, field: F) -> bool {
        self.dirty.contains(&field)
    }

    pub fn has_changes(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Dirty fields in their natural order.
    pub fn dirty_fields(&self) -> impl Iterator<Item = F> + '_ {
        self.dirty.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.dirty.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirty.is_empty()
    }
}
