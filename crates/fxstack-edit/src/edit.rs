//! Structural filter edits with undo/redo support.
//!
//! Uses the Command pattern: every change to a clip's filter sequence is a
//! `FilterEdit` that knows how to apply itself and produce its inverse for
//! undo. `EditHistory` applies edits, keeps the undo/redo stacks and tells
//! an `EditListener` about every completed edit, undo and redo.

use std::sync::Arc;

use fxstack_core::{
    shared, Clip, Filter, FilterInfo, FilterRenderer, FxStackError, NullRenderer, Result,
    SharedClip, SharedFilter,
};
use tracing::{debug, warn};

// ── Edit commands ───────────────────────────────────────────────

/// A reversible edit of one clip's filter sequence.
#[derive(Debug, Clone)]
pub enum FilterEdit {
    /// Append a new filter of the given type.
    AddFilter {
        info: Arc<FilterInfo>,
        /// Populated when executed; redo reinserts the same filter.
        added: Option<(usize, SharedFilter)>,
    },
    /// Insert an existing filter at `index`.
    InsertFilter { index: usize, filter: SharedFilter },
    /// Remove the filter at `index`.
    RemoveFilter {
        index: usize,
        /// Stored for undo.
        removed: Option<SharedFilter>,
    },
    /// Insert new filters of two types: the first at `index_1`, then the
    /// second at `index_2` (counted after the first insert).
    AddTwoFilters {
        info_1: Arc<FilterInfo>,
        info_2: Arc<FilterInfo>,
        index_1: usize,
        index_2: usize,
        /// Populated when executed.
        added: Option<(SharedFilter, SharedFilter)>,
    },
    /// Insert two existing filters, same index rules as `AddTwoFilters`.
    InsertTwoFilters {
        index_1: usize,
        index_2: usize,
        filters: (SharedFilter, SharedFilter),
    },
    /// Remove the filters at `index_1 < index_2` atomically.
    RemoveTwoFilters {
        index_1: usize,
        index_2: usize,
        /// Stored for undo, in (`index_1`, `index_2`) order.
        removed: Option<(SharedFilter, SharedFilter)>,
    },
    /// Remove the filter at `delete_index` and reinsert it at `insert_index`.
    ///
    /// `insert_index` is normalised to the final position when executed.
    MoveFilter {
        insert_index: usize,
        delete_index: usize,
    },
    /// A batch of edits applied atomically.
    Batch(Vec<FilterEdit>),
}

impl FilterEdit {
    pub fn add(info: Arc<FilterInfo>) -> Self {
        Self::AddFilter { info, added: None }
    }

    pub fn remove(index: usize) -> Self {
        Self::RemoveFilter {
            index,
            removed: None,
        }
    }

    pub fn remove_two(index_1: usize, index_2: usize) -> Self {
        Self::RemoveTwoFilters {
            index_1: index_1.min(index_2),
            index_2: index_1.max(index_2),
            removed: None,
        }
    }

    pub fn add_two(
        info_1: Arc<FilterInfo>,
        info_2: Arc<FilterInfo>,
        index_1: usize,
        index_2: usize,
    ) -> Self {
        Self::AddTwoFilters {
            info_1,
            info_2,
            index_1,
            index_2,
            added: None,
        }
    }

    pub fn move_filter(insert_index: usize, delete_index: usize) -> Self {
        Self::MoveFilter {
            insert_index,
            delete_index,
        }
    }

    /// Short name for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::AddFilter { .. } => "add filter",
            Self::InsertFilter { .. } => "insert filter",
            Self::RemoveFilter { .. } => "remove filter",
            Self::AddTwoFilters { .. } => "add two filters",
            Self::InsertTwoFilters { .. } => "insert two filters",
            Self::RemoveTwoFilters { .. } => "remove two filters",
            Self::MoveFilter { .. } => "move filter",
            Self::Batch(_) => "batch",
        }
    }

    /// Apply this edit to a clip, mutating it in place.
    ///
    /// Indices are validated before anything changes, so a failed edit leaves
    /// the clip untouched. Returns the index the editor should select
    /// afterwards, `None` when the stack is left empty.
    ///
    /// New filters get `renderer` attached.
    pub fn apply(
        &mut self,
        clip: &mut Clip,
        renderer: &Arc<dyn FilterRenderer>,
    ) -> Result<Option<usize>> {
        let len = clip.filters.len();
        match self {
            Self::AddFilter { info, added } => {
                let filter = match added {
                    Some((_, filter)) => filter.clone(),
                    None => new_filter(info, renderer),
                };
                let index = clip.insert_filter(len, filter.clone());
                *added = Some((index, filter));
                Ok(Some(index))
            }
            Self::InsertFilter { index, filter } => {
                check_index(*index, len + 1)?;
                Ok(Some(clip.insert_filter(*index, filter.clone())))
            }
            Self::RemoveFilter { index, removed } => {
                check_index(*index, len)?;
                *removed = clip.remove_filter(*index);
                Ok(last_index(clip))
            }
            Self::AddTwoFilters {
                info_1,
                info_2,
                index_1,
                index_2,
                added,
            } => {
                check_pair(*index_1, *index_2, len + 2)?;
                let (first, second) = match added {
                    Some(pair) => pair.clone(),
                    None => (new_filter(info_1, renderer), new_filter(info_2, renderer)),
                };
                clip.insert_filter(*index_1, first.clone());
                clip.insert_filter(*index_2, second.clone());
                *added = Some((first, second));
                Ok(Some((*index_1 + 1).min(clip.filters.len() - 1)))
            }
            Self::InsertTwoFilters {
                index_1,
                index_2,
                filters,
            } => {
                check_pair(*index_1, *index_2, len + 2)?;
                clip.insert_filter(*index_1, filters.0.clone());
                clip.insert_filter(*index_2, filters.1.clone());
                Ok(Some((*index_1 + 1).min(clip.filters.len() - 1)))
            }
            Self::RemoveTwoFilters {
                index_1,
                index_2,
                removed,
            } => {
                check_pair(*index_1, *index_2, len)?;
                let second = clip.remove_filter(*index_2);
                let first = clip.remove_filter(*index_1);
                *removed = first.zip(second);
                Ok(last_index(clip))
            }
            Self::MoveFilter {
                insert_index,
                delete_index,
            } => {
                check_index(*delete_index, len)?;
                let position = clip
                    .move_filter(*insert_index, *delete_index)
                    .ok_or(FxStackError::InvalidIndex {
                        index: *delete_index,
                        len,
                    })?;
                *insert_index = position;
                Ok(Some(position))
            }
            Self::Batch(edits) => {
                let mut selected = last_index(clip);
                for i in 0..edits.len() {
                    match edits[i].apply(clip, renderer) {
                        Ok(sel) => selected = sel,
                        Err(e) => {
                            // Roll back what already went through.
                            for done in edits[..i].iter().rev() {
                                if let Some(mut inverse) = done.inverse() {
                                    let _ = inverse.apply(clip, renderer);
                                }
                            }
                            return Err(e);
                        }
                    }
                }
                Ok(selected)
            }
        }
    }

    /// Produce the inverse edit (for undo).
    ///
    /// `None` for edits that have not been executed yet, since their
    /// inverse depends on data recorded during execution.
    pub fn inverse(&self) -> Option<Self> {
        let inverse = match self {
            Self::AddFilter { added, .. } => {
                let (index, _) = added.as_ref()?;
                Self::remove(*index)
            }
            Self::InsertFilter { index, .. } => Self::remove(*index),
            Self::RemoveFilter { index, removed } => Self::InsertFilter {
                index: *index,
                filter: removed.clone()?,
            },
            Self::AddTwoFilters {
                index_1,
                index_2,
                added,
                ..
            } => {
                added.as_ref()?;
                Self::remove_two(*index_1, *index_2)
            }
            Self::InsertTwoFilters {
                index_1, index_2, ..
            } => Self::remove_two(*index_1, *index_2),
            Self::RemoveTwoFilters {
                index_1,
                index_2,
                removed,
            } => Self::InsertTwoFilters {
                index_1: *index_1,
                index_2: *index_2,
                filters: removed.clone()?,
            },
            Self::MoveFilter {
                insert_index,
                delete_index,
            } => Self::move_filter(*delete_index, *insert_index),
            Self::Batch(edits) => Self::Batch(
                edits
                    .iter()
                    .rev()
                    .map(|e| e.inverse())
                    .collect::<Option<Vec<_>>>()?,
            ),
        };
        Some(inverse)
    }
}

// ── Helpers ──────────────────────────────────────────────────────

fn new_filter(info: &Arc<FilterInfo>, renderer: &Arc<dyn FilterRenderer>) -> SharedFilter {
    let filter = Filter::new(info.clone()).with_renderer(renderer.clone());
    filter.update_all_properties();
    shared(filter)
}

fn check_index(index: usize, len: usize) -> Result<()> {
    if index < len {
        Ok(())
    } else {
        Err(FxStackError::InvalidIndex { index, len })
    }
}

fn check_pair(index_1: usize, index_2: usize, len: usize) -> Result<()> {
    check_index(index_2, len)?;
    if index_1 < index_2 {
        Ok(())
    } else {
        Err(FxStackError::InvalidIndex {
            index: index_1,
            len: index_2,
        })
    }
}

fn last_index(clip: &Clip) -> Option<usize> {
    clip.filters.len().checked_sub(1)
}

// ── Completion notification ─────────────────────────────────────

/// Outcome of an edit, undo or redo.
#[derive(Debug, Clone)]
pub struct EditDone {
    /// The clip whose filters changed.
    pub clip: SharedClip,
    /// Filter the editor should select, `None` when the stack is empty.
    pub selected: Option<usize>,
}

/// Receives every completed edit, undo and redo.
pub trait EditListener {
    fn filter_edit_done(&mut self, done: &EditDone);
}

impl<F: FnMut(&EditDone)> EditListener for F {
    fn filter_edit_done(&mut self, done: &EditDone) {
        self(done)
    }
}

// ── Undo stack ──────────────────────────────────────────────────

/// An executed edit and the clip it was applied to.
#[derive(Debug, Clone)]
struct HistoryEntry {
    clip: SharedClip,
    edit: FilterEdit,
}

/// Undo/redo history stack.
#[derive(Debug)]
struct UndoStack {
    /// Edits that have been executed (most recent last).
    undo: Vec<HistoryEntry>,
    /// Edits that have been undone (most recent last).
    redo: Vec<HistoryEntry>,
    /// Maximum history depth.
    max_depth: usize,
}

impl UndoStack {
    fn new(max_depth: usize) -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            max_depth,
        }
    }

    /// Push an executed edit. Clears the redo stack.
    fn push(&mut self, entry: HistoryEntry) {
        self.redo.clear();
        self.undo.push(entry);
        if self.undo.len() > self.max_depth {
            self.undo.remove(0);
        }
    }
}

/// Applies filter edits and records them for undo/redo.
pub struct EditHistory {
    stack: UndoStack,
    renderer: Arc<dyn FilterRenderer>,
}

impl EditHistory {
    /// Create a history with the given maximum depth.
    pub fn new(max_depth: usize) -> Self {
        Self {
            stack: UndoStack::new(max_depth),
            renderer: Arc::new(NullRenderer),
        }
    }

    /// Renderer attached to filters created by edits.
    pub fn with_renderer(mut self, renderer: Arc<dyn FilterRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Apply `edit` to `clip`, record it and notify `listener`.
    ///
    /// A failed edit changes nothing, is not recorded and notifies nobody.
    pub fn submit(
        &mut self,
        clip: &SharedClip,
        mut edit: FilterEdit,
        listener: &mut dyn EditListener,
    ) -> Result<EditDone> {
        let selected = {
            let mut clip = clip.write();
            edit.apply(&mut clip, &self.renderer)?
        };
        debug!(edit = edit.label(), ?selected, "filter edit applied");

        self.stack.push(HistoryEntry {
            clip: clip.clone(),
            edit,
        });
        let done = EditDone {
            clip: clip.clone(),
            selected,
        };
        listener.filter_edit_done(&done);
        Ok(done)
    }

    /// Undo the most recent edit. `Ok(None)` when there is nothing to undo.
    pub fn undo(&mut self, listener: &mut dyn EditListener) -> Result<Option<EditDone>> {
        let Some(entry) = self.stack.undo.pop() else {
            return Ok(None);
        };
        let Some(mut inverse) = entry.edit.inverse() else {
            warn!(edit = entry.edit.label(), "dropping history entry without inverse");
            return Ok(None);
        };

        let applied = {
            let mut clip = entry.clip.write();
            inverse.apply(&mut clip, &self.renderer)
        };
        let selected = match applied {
            Ok(selected) => selected,
            Err(e) => {
                self.stack.undo.push(entry);
                return Err(e);
            }
        };
        debug!(edit = entry.edit.label(), "filter edit undone");

        let done = EditDone {
            clip: entry.clip.clone(),
            selected,
        };
        self.stack.redo.push(entry);
        listener.filter_edit_done(&done);
        Ok(Some(done))
    }

    /// Re-apply the most recently undone edit.
    pub fn redo(&mut self, listener: &mut dyn EditListener) -> Result<Option<EditDone>> {
        let Some(mut entry) = self.stack.redo.pop() else {
            return Ok(None);
        };

        let applied = {
            let mut clip = entry.clip.write();
            entry.edit.apply(&mut clip, &self.renderer)
        };
        let selected = match applied {
            Ok(selected) => selected,
            Err(e) => {
                self.stack.redo.push(entry);
                return Err(e);
            }
        };
        debug!(edit = entry.edit.label(), "filter edit redone");

        let done = EditDone {
            clip: entry.clip.clone(),
            selected,
        };
        self.stack.undo.push(entry);
        listener.filter_edit_done(&done);
        Ok(Some(done))
    }

    /// Check if undo is available.
    pub fn can_undo(&self) -> bool {
        !self.stack.undo.is_empty()
    }

    /// Check if redo is available.
    pub fn can_redo(&self) -> bool {
        !self.stack.redo.is_empty()
    }

    /// Number of undo steps available.
    pub fn undo_count(&self) -> usize {
        self.stack.undo.len()
    }

    /// Number of redo steps available.
    pub fn redo_count(&self) -> usize {
        self.stack.redo.len()
    }

    /// Clear all history.
    pub fn clear(&mut self) {
        self.stack.undo.clear();
        self.stack.redo.clear();
    }
}

impl Default for EditHistory {
    fn default() -> Self {
        Self::new(200)
    }
}

// ── Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use fxstack_core::{shared_clip, MASK_END_MARKER};

    fn info(name: &str) -> Arc<FilterInfo> {
        Arc::new(FilterInfo::new(name, name.to_lowercase()))
    }

    fn clip_with(names: &[&str]) -> SharedClip {
        let filters = names.iter().map(|n| shared(Filter::new(info(n)))).collect();
        shared_clip(Clip::new("clip").with_filters(filters))
    }

    fn names(clip: &SharedClip) -> Vec<String> {
        clip.read()
            .filters
            .iter()
            .map(|f| f.read().name().to_string())
            .collect()
    }

    fn ignore(_: &EditDone) {}

    #[test]
    fn test_add_appends_and_selects() {
        let clip = clip_with(&["Blur"]);
        let mut history = EditHistory::default();
        let done = history
            .submit(&clip, FilterEdit::add(info("Color")), &mut ignore)
            .unwrap();
        assert_eq!(names(&clip), ["Blur", "Color"]);
        assert_eq!(done.selected, Some(1));
        assert!(Arc::ptr_eq(&done.clip, &clip));
    }

    #[test]
    fn test_undo_redo_add_keeps_identity() {
        let clip = clip_with(&[]);
        let mut history = EditHistory::default();
        history
            .submit(&clip, FilterEdit::add(info("Blur")), &mut ignore)
            .unwrap();
        let added = clip.read().filters[0].clone();

        let undone = history.undo(&mut ignore).unwrap().unwrap();
        assert!(clip.read().filters.is_empty());
        assert_eq!(undone.selected, None);
        assert!(history.can_redo());

        history.redo(&mut ignore).unwrap();
        assert!(Arc::ptr_eq(&clip.read().filters[0], &added));
    }

    #[test]
    fn test_remove_and_undo_restores_position() {
        let clip = clip_with(&["A", "B", "C"]);
        let mut history = EditHistory::default();
        history.submit(&clip, FilterEdit::remove(1), &mut ignore).unwrap();
        assert_eq!(names(&clip), ["A", "C"]);

        history.undo(&mut ignore).unwrap();
        assert_eq!(names(&clip), ["A", "B", "C"]);
    }

    #[test]
    fn test_remove_out_of_range_changes_nothing() {
        let clip = clip_with(&["A"]);
        let mut history = EditHistory::default();
        let mut calls = 0;
        let result = history.submit(&clip, FilterEdit::remove(3), &mut |_: &EditDone| calls += 1);
        assert!(matches!(result, Err(FxStackError::InvalidIndex { index: 3, len: 1 })));
        assert_eq!(calls, 0);
        assert!(!history.can_undo());
    }

    #[test]
    fn test_add_two_brackets_single_filter() {
        let clip = clip_with(&["A", "B", "C"]);
        let start = Arc::new(FilterInfo::new("Mask - Shape", "mask_start").with_mask_marker("Mask - Shape"));
        let end = Arc::new(FilterInfo::new("Mask - End", "mask_apply").with_mask_marker(MASK_END_MARKER));
        let mut history = EditHistory::default();

        let done = history
            .submit(&clip, FilterEdit::add_two(start, end, 1, 3), &mut ignore)
            .unwrap();
        assert_eq!(names(&clip), ["A", "Mask - Shape", "B", "Mask - End", "C"]);
        assert_eq!(done.selected, Some(2));

        history.undo(&mut ignore).unwrap();
        assert_eq!(names(&clip), ["A", "B", "C"]);
    }

    #[test]
    fn test_add_two_brackets_whole_stack() {
        let clip = clip_with(&["A", "B"]);
        let len = clip.read().filters.len();
        let mut history = EditHistory::default();
        history
            .submit(&clip, FilterEdit::add_two(info("S"), info("E"), 0, len + 1), &mut ignore)
            .unwrap();
        assert_eq!(names(&clip), ["S", "A", "B", "E"]);
    }

    #[test]
    fn test_remove_two_and_undo() {
        let clip = clip_with(&["Blur", "Start", "Color", "End"]);
        let mut history = EditHistory::default();
        history
            .submit(&clip, FilterEdit::remove_two(3, 1), &mut ignore)
            .unwrap();
        assert_eq!(names(&clip), ["Blur", "Color"]);

        history.undo(&mut ignore).unwrap();
        assert_eq!(names(&clip), ["Blur", "Start", "Color", "End"]);
    }

    #[test]
    fn test_move_and_inverse() {
        let clip = clip_with(&["A", "B", "C", "D"]);
        let mut history = EditHistory::default();
        let done = history
            .submit(&clip, FilterEdit::move_filter(0, 3), &mut ignore)
            .unwrap();
        assert_eq!(names(&clip), ["D", "A", "B", "C"]);
        assert_eq!(done.selected, Some(0));

        history.undo(&mut ignore).unwrap();
        assert_eq!(names(&clip), ["A", "B", "C", "D"]);
    }

    #[test]
    fn test_move_clamped_insert_undoes_cleanly() {
        let clip = clip_with(&["A", "B", "C"]);
        let mut history = EditHistory::default();
        history
            .submit(&clip, FilterEdit::move_filter(10, 0), &mut ignore)
            .unwrap();
        assert_eq!(names(&clip), ["B", "C", "A"]);
        history.undo(&mut ignore).unwrap();
        assert_eq!(names(&clip), ["A", "B", "C"]);
    }

    #[test]
    fn test_batch_rolls_back_on_failure() {
        let clip = clip_with(&["A", "B"]);
        let mut history = EditHistory::default();
        let batch = FilterEdit::Batch(vec![FilterEdit::remove(0), FilterEdit::remove(5)]);
        assert!(history.submit(&clip, batch, &mut ignore).is_err());
        assert_eq!(names(&clip), ["A", "B"]);
    }

    #[test]
    fn test_batch_inverse_reverses_order() {
        let clip = clip_with(&["A", "B", "C"]);
        let mut history = EditHistory::default();
        let batch = FilterEdit::Batch(vec![
            FilterEdit::move_filter(0, 2),
            FilterEdit::remove(1),
        ]);
        history.submit(&clip, batch, &mut ignore).unwrap();
        assert_eq!(names(&clip), ["C", "B"]);
        history.undo(&mut ignore).unwrap();
        assert_eq!(names(&clip), ["A", "B", "C"]);
    }

    #[test]
    fn test_unexecuted_edits_have_no_inverse() {
        assert!(FilterEdit::add(info("A")).inverse().is_none());
        assert!(FilterEdit::remove(0).inverse().is_none());
        assert!(FilterEdit::move_filter(0, 2).inverse().is_some());
    }

    #[test]
    fn test_listener_sees_undo_and_redo() {
        let clip = clip_with(&["A"]);
        let mut history = EditHistory::default();
        let mut seen = Vec::new();
        let mut record = |done: &EditDone| seen.push(done.selected);
        history.submit(&clip, FilterEdit::remove(0), &mut record).unwrap();
        history.undo(&mut record).unwrap();
        history.redo(&mut record).unwrap();
        assert_eq!(seen, [None, Some(0), None]);
    }

    #[test]
    fn test_max_depth() {
        let clip = clip_with(&[]);
        let mut history = EditHistory::new(3);
        for _ in 0..5 {
            history
                .submit(&clip, FilterEdit::add(info("A")), &mut ignore)
                .unwrap();
        }
        assert_eq!(history.undo_count(), 3);
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let clip = clip_with(&["A", "B"]);
        let mut history = EditHistory::default();
        history.submit(&clip, FilterEdit::remove(0), &mut ignore).unwrap();
        history.undo(&mut ignore).unwrap();
        assert!(history.can_redo());
        history.submit(&clip, FilterEdit::remove(1), &mut ignore).unwrap();
        assert!(!history.can_redo());
        assert_eq!(history.redo_count(), 0);
    }
}
