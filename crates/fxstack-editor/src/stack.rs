//! The filter stack of the clip being edited.
//!
//! Rows are a view derived from the clip's filter sequence; the clip stays
//! the source of truth for positions.

use std::sync::Arc;

use fxstack_core::{Clip, ClipLocation, SharedClip, SharedFilter};

use crate::editors::{EditorPanel, PropertyEditorBuilder};

/// One filter's row: header state plus its editor panel.
#[derive(Debug, Clone)]
pub struct StackRow {
    pub filter: SharedFilter,
    /// Service id at build time, for change detection.
    service_id: String,
    pub panel: EditorPanel,
    pub expanded: bool,
}

impl StackRow {
    fn build(filter: &SharedFilter, index: usize, builder: &dyn PropertyEditorBuilder) -> Self {
        let guard = filter.read();
        Self {
            filter: filter.clone(),
            service_id: guard.service_id().to_string(),
            panel: builder.build(&guard, index),
            expanded: false,
        }
    }

    pub fn service_id(&self) -> &str {
        &self.service_id
    }
}

/// Rows for every filter of one clip, in stack order.
#[derive(Debug)]
pub struct FilterStack {
    clip: SharedClip,
    location: ClipLocation,
    rows: Vec<StackRow>,
}

impl FilterStack {
    /// Build one row per filter of `clip`.
    pub fn build(
        clip: SharedClip,
        location: ClipLocation,
        builder: &dyn PropertyEditorBuilder,
    ) -> Self {
        let rows = clip
            .read()
            .filters
            .iter()
            .enumerate()
            .map(|(i, filter)| StackRow::build(filter, i, builder))
            .collect();
        Self {
            clip,
            location,
            rows,
        }
    }

    pub fn clip(&self) -> &SharedClip {
        &self.clip
    }

    pub fn location(&self) -> ClipLocation {
        self.location
    }

    /// Whether this stack edits `clip` (by identity).
    pub fn is_clip(&self, clip: &SharedClip) -> bool {
        Arc::ptr_eq(&self.clip, clip)
    }

    pub fn rows(&self) -> &[StackRow] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [StackRow] {
        &mut self.rows
    }

    pub fn row(&self, index: usize) -> Option<&StackRow> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Filters in row order.
    pub fn filters(&self) -> Vec<SharedFilter> {
        self.rows.iter().map(|r| r.filter.clone()).collect()
    }

    /// Position of `filter` in the clip's current filter sequence.
    pub fn index_of(&self, filter: &SharedFilter) -> Option<usize> {
        self.clip.read().index_of(filter)
    }

    /// Whether `clip`'s filters no longer match the rows: a different count,
    /// or a different service id at some position.
    pub fn changed(&self, clip: &Clip) -> bool {
        clip.filters.len() != self.rows.len()
            || clip
                .filters
                .iter()
                .zip(&self.rows)
                .any(|(filter, row)| filter.read().service_id() != row.service_id)
    }

    /// Rebuild the row of `filter`, leaving it expanded.
    ///
    /// Returns `false` when the filter has no row.
    pub fn reinit_row(&mut self, filter: &SharedFilter, builder: &dyn PropertyEditorBuilder) -> bool {
        let Some(index) = self.rows.iter().position(|r| Arc::ptr_eq(&r.filter, filter)) else {
            return false;
        };
        let mut row = StackRow::build(filter, index, builder);
        row.expanded = true;
        self.rows[index] = row;
        true
    }

    pub fn set_expanded(&mut self, index: usize, expanded: bool) {
        if let Some(row) = self.rows.get_mut(index) {
            row.expanded = expanded;
        }
    }
}
