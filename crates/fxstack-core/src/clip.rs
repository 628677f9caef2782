//! Clips and their filter sequences.

use std::sync::Arc;

use parking_lot::RwLock;
use uuid::Uuid;

use crate::filter::SharedFilter;

/// A clip on the timeline, owning an ordered filter sequence.
///
/// Sequence order is stack order is render order.
#[derive(Debug, Clone)]
pub struct Clip {
    /// Unique clip ID
    pub id: Uuid,
    /// Clip name (displayed in UI)
    pub name: String,
    /// Attached filters, first applied first.
    pub filters: Vec<SharedFilter>,
}

impl Clip {
    /// Create a clip with no filters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            filters: Vec::new(),
        }
    }

    pub fn with_filters(mut self, filters: Vec<SharedFilter>) -> Self {
        self.filters = filters;
        self
    }

    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }

    /// Position of `filter` in the sequence, by identity.
    pub fn index_of(&self, filter: &SharedFilter) -> Option<usize> {
        self.filters.iter().position(|f| Arc::ptr_eq(f, filter))
    }

    /// Service ids in stack order.
    pub fn service_ids(&self) -> Vec<String> {
        self.filters
            .iter()
            .map(|f| f.read().service_id().to_string())
            .collect()
    }

    /// Whether any attached filter is a mask filter.
    pub fn has_mask_filter(&self) -> bool {
        self.filters.iter().any(|f| f.read().is_mask_filter())
    }

    /// First and last indices carrying a mask marker.
    ///
    /// A clip holds at most one mask pair, so these are its two halves.
    pub fn mask_pair_indices(&self) -> Option<(usize, usize)> {
        let mut first = None;
        let mut last = None;
        for (i, f) in self.filters.iter().enumerate() {
            if f.read().is_mask_filter() {
                if first.is_none() {
                    first = Some(i);
                } else {
                    last = Some(i);
                }
            }
        }
        first.zip(last)
    }

    /// Insert a filter, clamping `index` to the sequence length.
    pub fn insert_filter(&mut self, index: usize, filter: SharedFilter) -> usize {
        let index = index.min(self.filters.len());
        self.filters.insert(index, filter);
        index
    }

    /// Remove the filter at `index`.
    pub fn remove_filter(&mut self, index: usize) -> Option<SharedFilter> {
        (index < self.filters.len()).then(|| self.filters.remove(index))
    }

    /// Remove the filter at `delete_index` and reinsert it at `insert_index`.
    ///
    /// Returns the final position, or `None` when `delete_index` is out of range.
    pub fn move_filter(&mut self, insert_index: usize, delete_index: usize) -> Option<usize> {
        let filter = self.remove_filter(delete_index)?;
        Some(self.insert_filter(insert_index, filter))
    }
}

/// A clip shared between the timeline model and the editor.
pub type SharedClip = Arc<RwLock<Clip>>;

/// Wrap a clip for sharing.
pub fn shared_clip(clip: Clip) -> SharedClip {
    Arc::new(RwLock::new(clip))
}
