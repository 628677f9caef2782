//! Filter stack controller: turns user gestures into filter edits and keeps
//! the stack view in step with the edited clip.
//!
//! Structural changes (add, delete, masks, reorder) are submitted to the
//! [`EditHistory`] and refreshed from its completion callback. Toggling,
//! resetting and loading values change filters in place and are not undoable.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fxstack_core::{
    ClipLocation, CompositingMode, FilterCatalog, FilterInfo, FilterRenderer, FxStackError,
    Result, SharedClip, SharedFilter, ALPHA_GROUP,
};
use fxstack_edit::{EditDone, EditHistory, EditListener, EffectValues, FilterEdit};
use tracing::{debug, info, warn};

use crate::editors::{PropertyEditorBuilder, SchemaEditorBuilder};
use crate::events::{ChangeFlag, TimelineSink};
use crate::poller::PropertyPoller;
use crate::prefs::EditorPrefs;
use crate::stack::FilterStack;

/// Moves closer than this to the dragged row are dropped.
pub const MIN_MOVE_DISTANCE: usize = 2;

/// Status shown when no clip is being edited.
pub const NO_CLIP_TEXT: &str = "No Clip";
/// Status shown when the edited clip has no filters.
pub const NO_FILTERS_TEXT: &str = "Clip Has No Filters";

/// What a filter mask should cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskTarget {
    /// Every filter of the clip.
    FullStack,
    /// The filter at this index.
    Filter(usize),
}

/// A message waiting for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Alpha filters only show with a compositor that uses alpha.
    AlphaInfo,
    Warning { title: String, message: String },
}

impl Notice {
    pub const ALPHA_INFO_TITLE: &'static str = "Alpha Filters work with Alpha Compositors";
    pub const ALPHA_INFO_TEXT: &'static str = "Alpha filters have a visible effect only when \
        the track compositing mode uses alpha. In Standard Full Track mode they do nothing.";
}

/// Drives the filter stack of the clip being edited.
pub struct FilterStackController {
    catalog: FilterCatalog,
    history: EditHistory,
    builder: Box<dyn PropertyEditorBuilder>,
    session: Option<FilterStack>,
    poller: Option<PropertyPoller>,
    prefs: EditorPrefs,
    prefs_path: Option<PathBuf>,
    compositing_mode: CompositingMode,
    block_stack_update: bool,
    notices: VecDeque<Notice>,
    focus_requested: bool,
    changes: ChangeFlag,
    sink: Arc<dyn TimelineSink>,
    tline_frame: i64,
    clip_start: i64,
}

impl FilterStackController {
    pub fn new(
        catalog: FilterCatalog,
        renderer: Arc<dyn FilterRenderer>,
        sink: Arc<dyn TimelineSink>,
    ) -> Self {
        Self {
            catalog,
            history: EditHistory::default().with_renderer(renderer),
            builder: Box::new(SchemaEditorBuilder),
            session: None,
            poller: None,
            prefs: EditorPrefs::default(),
            prefs_path: None,
            compositing_mode: CompositingMode::default(),
            block_stack_update: false,
            notices: VecDeque::new(),
            focus_requested: false,
            changes: ChangeFlag::new(),
            sink,
            tline_frame: 0,
            clip_start: 0,
        }
    }

    /// Use preferences, saving changes back to `path` when given.
    pub fn with_prefs(mut self, prefs: EditorPrefs, path: Option<PathBuf>) -> Self {
        self.prefs = prefs;
        self.prefs_path = path;
        self
    }

    pub fn with_editor_builder(mut self, builder: Box<dyn PropertyEditorBuilder>) -> Self {
        self.builder = builder;
        self
    }

    pub fn set_compositing_mode(&mut self, mode: CompositingMode) {
        self.compositing_mode = mode;
    }

    pub fn catalog(&self) -> &FilterCatalog {
        &self.catalog
    }

    pub fn prefs(&self) -> &EditorPrefs {
        &self.prefs
    }

    pub fn history(&self) -> &EditHistory {
        &self.history
    }

    /// Flag set whenever filter values change.
    pub fn changes(&self) -> &ChangeFlag {
        &self.changes
    }

    pub fn stack(&self) -> Option<&FilterStack> {
        self.session.as_ref()
    }

    // ── Session ─────────────────────────────────────────────────

    /// Start editing `clip`.
    ///
    /// Nothing happens when that clip at that location is already being
    /// edited and `show_tab` is false.
    pub fn set_clip(&mut self, clip: SharedClip, location: ClipLocation, show_tab: bool) {
        let same = self
            .session
            .as_ref()
            .is_some_and(|s| s.is_clip(&clip) && s.location() == location);
        if same && !show_tab {
            return;
        }

        self.stop_poller();
        let name = clip.read().name.clone();
        self.session = Some(FilterStack::build(clip, location, self.builder.as_ref()));
        self.sync_editors();
        if show_tab {
            self.focus_requested = true;
        }
        self.start_poller();
        info!(clip = %name, ?location, "editing clip filters");
    }

    /// Stop editing.
    pub fn clear_clip(&mut self) {
        self.stop_poller();
        if self.session.take().is_some() {
            info!("filter editing cleared");
        }
    }

    pub fn clip_is_being_edited(&self, clip: &SharedClip) -> bool {
        self.session.as_ref().is_some_and(|s| s.is_clip(clip))
    }

    pub fn edited_clip(&self) -> Option<SharedClip> {
        self.session.as_ref().map(|s| s.clip().clone())
    }

    /// Status line for the stack area, `None` while filters are shown.
    pub fn status_text(&self) -> Option<&'static str> {
        match &self.session {
            None => Some(NO_CLIP_TEXT),
            Some(stack) if stack.is_empty() => Some(NO_FILTERS_TEXT),
            Some(_) => None,
        }
    }

    /// Returns and clears a pending focus request.
    pub fn take_focus_request(&mut self) -> bool {
        std::mem::take(&mut self.focus_requested)
    }

    /// Rebuild the stack if the clip's filters no longer match it, or always
    /// when `force` is set. Returns whether a rebuild happened.
    pub fn reinit_stack_if_needed(&mut self, force: bool) -> bool {
        let Some(stack) = &self.session else {
            return false;
        };
        if !force && !stack.changed(&stack.clip().read()) {
            return false;
        }
        self.rebuild_stack(None);
        true
    }

    pub fn set_filter_item_expanded(&mut self, index: usize) {
        if let Some(stack) = &mut self.session {
            stack.set_expanded(index, true);
        }
    }

    pub fn set_filter_item_collapsed(&mut self, index: usize) {
        if let Some(stack) = &mut self.session {
            stack.set_expanded(index, false);
        }
    }

    fn rebuild_stack(&mut self, selected: Option<usize>) {
        let Some(old) = self.session.take() else {
            return;
        };
        self.stop_poller();
        let mut stack = FilterStack::build(old.clip().clone(), old.location(), self.builder.as_ref());
        if let Some(index) = selected {
            stack.set_expanded(index, true);
        }
        debug!(filters = stack.len(), ?selected, "filter stack rebuilt");
        self.session = Some(stack);
        self.sync_editors();
        self.start_poller();
    }

    // ── Poller ──────────────────────────────────────────────────

    fn start_poller(&mut self) {
        if !self.prefs.poll_fallback {
            return;
        }
        let Some(stack) = &self.session else {
            return;
        };
        match PropertyPoller::start(
            stack.filters(),
            self.prefs.poll_interval(),
            self.sink.clone(),
            self.changes.clone(),
        ) {
            Ok(poller) => self.poller = Some(poller),
            Err(e) => warn!(error = %e, "property polling unavailable"),
        }
    }

    fn stop_poller(&mut self) {
        if let Some(mut poller) = self.poller.take() {
            poller.shutdown();
        }
    }

    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().is_some_and(PropertyPoller::is_running)
    }

    // ── Structural edits ────────────────────────────────────────

    fn submit(&mut self, edit: FilterEdit) -> Result<()> {
        let Some(clip) = self.edited_clip() else {
            debug!(edit = edit.label(), "no clip being edited");
            return Ok(());
        };
        let mut history = std::mem::take(&mut self.history);
        let result = history.submit(&clip, edit, self);
        self.history = history;
        result.map(|_| ())
    }

    /// Undo the last filter edit.
    pub fn undo(&mut self) -> Result<bool> {
        let mut history = std::mem::take(&mut self.history);
        let result = history.undo(self);
        self.history = history;
        result.map(|done| done.is_some())
    }

    /// Redo the last undone filter edit.
    pub fn redo(&mut self) -> Result<bool> {
        let mut history = std::mem::take(&mut self.history);
        let result = history.redo(self);
        self.history = history;
        result.map(|done| done.is_some())
    }

    /// Append a filter of type `info` to the edited clip.
    pub fn add_filter(&mut self, info: Arc<FilterInfo>) -> Result<()> {
        if self.session.is_none() {
            debug!(filter = %info.name, "add filter without a clip");
            return Ok(());
        }
        if info.group == ALPHA_GROUP
            && self.prefs.show_alpha_info_message
            && self.compositing_mode != CompositingMode::StandardFullTrack
            && !self.notices.contains(&Notice::AlphaInfo)
        {
            self.notices.push_back(Notice::AlphaInfo);
        }
        info!(filter = %info.name, "adding filter");
        self.submit(FilterEdit::add(info))
    }

    /// Delete `filter`; a mask filter takes its partner with it.
    pub fn delete_filter(&mut self, filter: &SharedFilter) -> Result<()> {
        let Some(stack) = &self.session else {
            debug!("delete filter without a clip");
            return Ok(());
        };
        let clip = stack.clip().read();
        let index = clip.index_of(filter).ok_or_else(|| {
            FxStackError::NotFound(format!("{} is not on the edited clip", filter.read().name()))
        })?;
        let edit = match clip.mask_pair_indices() {
            Some((first, last)) if filter.read().is_mask_filter() => {
                FilterEdit::remove_two(first, last)
            }
            _ => FilterEdit::remove(index),
        };
        drop(clip);
        info!(edit = edit.label(), index, "deleting filter");
        self.submit(edit)
    }

    /// Whether a filter mask can be added. A clip carries one mask pair at most.
    pub fn can_add_filter_mask(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| !s.clip().read().has_mask_filter())
    }

    /// Bracket `target` with a `start` mask filter and the mask end filter.
    pub fn add_filter_mask(&mut self, start: Arc<FilterInfo>, target: MaskTarget) -> Result<()> {
        if !self.can_add_filter_mask() {
            debug!("filter mask not available");
            return Ok(());
        }
        let end = self
            .catalog
            .mask_end()
            .ok_or_else(|| FxStackError::NotFound("mask end filter".into()))?;
        let len = self.session.as_ref().map_or(0, FilterStack::len);
        let (index_1, index_2) = match target {
            MaskTarget::FullStack => (0, len + 1),
            MaskTarget::Filter(i) if i < len => (i, i + 2),
            MaskTarget::Filter(i) => return Err(FxStackError::InvalidIndex { index: i, len }),
        };
        info!(mask = %start.name, ?target, "adding filter mask");
        self.submit(FilterEdit::add_two(start, end, index_1, index_2))
    }

    /// Move the filter at `delete_index` to `insert_index`.
    ///
    /// Returns `false` when the move is too short to be a real move.
    pub fn request_move(&mut self, insert_index: usize, delete_index: usize) -> Result<bool> {
        if insert_index.abs_diff(delete_index) < MIN_MOVE_DISTANCE {
            return Ok(false);
        }
        if self.session.is_none() {
            debug!("move filter without a clip");
            return Ok(false);
        }
        self.submit(FilterEdit::move_filter(insert_index, delete_index))?;
        Ok(true)
    }

    /// Swap the filter at `index` with the one above it.
    ///
    /// Unlike drag moves these are never too short. Returns `false` at the top.
    pub fn move_filter_up(&mut self, index: usize) -> Result<bool> {
        if index == 0 || self.filter_at(index).is_none() {
            return Ok(false);
        }
        self.submit(FilterEdit::move_filter(index - 1, index))?;
        Ok(true)
    }

    /// Swap the filter at `index` with the one below it. Returns `false` at
    /// the bottom.
    pub fn move_filter_down(&mut self, index: usize) -> Result<bool> {
        let len = self.session.as_ref().map_or(0, FilterStack::len);
        if index + 1 >= len {
            return Ok(false);
        }
        self.submit(FilterEdit::move_filter(index + 1, index))?;
        Ok(true)
    }

    /// Run `f` with stack rebuilds held back, then rebuild once.
    pub fn batch<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let outer = self.block_stack_update;
        self.block_stack_update = true;
        let result = f(self);
        self.block_stack_update = outer;
        if !outer {
            self.rebuild_stack(None);
        }
        result
    }

    // ── In-place value changes ──────────────────────────────────

    fn filter_at(&self, index: usize) -> Option<SharedFilter> {
        self.session
            .as_ref()
            .and_then(|s| s.row(index))
            .map(|r| r.filter.clone())
    }

    fn values_changed(&self) {
        self.changes.mark();
        self.sink.timeline_changed();
    }

    /// Flip one filter's active state. Returns the new state.
    pub fn toggle_filter_active(&mut self, index: usize) -> Option<bool> {
        let filter = self.filter_at(index)?;
        let active = filter.write().toggle_active();
        debug!(index, active, "filter toggled");
        self.values_changed();
        Some(active)
    }

    /// Flip the active state of every filter on the edited clip.
    pub fn toggle_all(&mut self) {
        let Some(stack) = &self.session else {
            return;
        };
        for filter in stack.clip().read().filters.iter() {
            filter.write().toggle_active();
        }
        debug!("all filters toggled");
        self.values_changed();
        self.rebuild_stack(None);
    }

    /// Restore a filter's default values.
    pub fn reset_filter(&mut self, index: usize) {
        let Some(filter) = self.filter_at(index) else {
            return;
        };
        filter.write().reset_to_defaults();
        self.reinit_row(&filter);
        info!(filter = %filter.read().name(), "filter reset to defaults");
        self.values_changed();
    }

    /// Set a property through the editor.
    ///
    /// The change is announced here, and the poller is told not to report it
    /// a second time.
    pub fn set_property_value(&mut self, index: usize, name: &str, value: &str) -> bool {
        let Some(filter) = self.filter_at(index) else {
            return false;
        };
        let write = |filter: &SharedFilter| {
            let mut f = filter.write();
            let changed = f.set_property(name, value);
            if changed {
                f.update_all_properties();
            }
            changed
        };
        let changed = match &self.poller {
            Some(poller) => poller.write_through(index, write).unwrap_or(false),
            None => write(&filter),
        };
        if changed {
            self.values_changed();
        }
        changed
    }

    fn reinit_row(&mut self, filter: &SharedFilter) {
        if let Some(stack) = &mut self.session {
            stack.reinit_row(filter, self.builder.as_ref());
        }
        self.sync_editors();
    }

    // ── Effect values ───────────────────────────────────────────

    /// Suggested file name for saving the values of the filter at `index`.
    pub fn default_save_name(&self, index: usize) -> Option<String> {
        let filter = self.filter_at(index)?;
        let name = EffectValues::default_file_name(&filter.read());
        Some(name)
    }

    /// Save the values of the filter at `index`.
    pub fn save_effect_values(&self, index: usize, path: &Path) -> Result<()> {
        let filter = self.filter_at(index).ok_or(FxStackError::InvalidIndex {
            index,
            len: self.session.as_ref().map_or(0, FilterStack::len),
        })?;
        let values = EffectValues::capture(&filter.read());
        values.save(path)
    }

    /// Load saved values onto the filter at `index`.
    ///
    /// Values saved from a different filter type are rejected with a warning
    /// notice and `Ok(false)`; the filter keeps its values.
    pub fn load_effect_values(&mut self, index: usize, path: &Path) -> Result<bool> {
        let filter = self.filter_at(index).ok_or(FxStackError::InvalidIndex {
            index,
            len: self.session.as_ref().map_or(0, FilterStack::len),
        })?;
        let values = EffectValues::load(path)?;
        let applied = values.apply_to(&mut filter.write());
        match applied {
            Ok(()) => {
                self.reinit_row(&filter);
                self.values_changed();
                Ok(true)
            }
            Err(e @ FxStackError::Incompatible { .. }) => {
                warn!(error = %e, "effect values rejected");
                self.notices.push_back(Notice::Warning {
                    title: "Effect Values Load Failed".into(),
                    message: e.to_string(),
                });
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    // ── Playhead ────────────────────────────────────────────────

    /// Show the values at a timeline frame in every keyframe editor.
    pub fn display_tline_frame(&mut self, tline_frame: i64) {
        self.tline_frame = tline_frame;
        self.sync_editors();
    }

    /// The edited clip now starts at `clip_start` on the timeline.
    pub fn update_kf_editor_positions(&mut self, clip_start: i64) {
        self.clip_start = clip_start;
        self.sync_editors();
    }

    fn sync_editors(&mut self) {
        let (clip_start, tline_frame) = (self.clip_start, self.tline_frame);
        let Some(stack) = &mut self.session else {
            return;
        };
        for row in stack.rows_mut() {
            for editor in row.panel.keyframe_editors_mut() {
                editor.update_clip_pos(clip_start);
                editor.display_tline_frame(tline_frame);
            }
        }
    }

    // ── Notices ─────────────────────────────────────────────────

    /// Oldest message waiting for the user.
    pub fn notice(&self) -> Option<&Notice> {
        self.notices.front()
    }

    pub fn dismiss_notice(&mut self) {
        self.notices.pop_front();
    }

    /// Close the alpha notice, optionally turning it off for good.
    pub fn dismiss_alpha_info(&mut self, dont_show_again: bool) -> Result<()> {
        self.notices.retain(|n| *n != Notice::AlphaInfo);
        if !dont_show_again {
            return Ok(());
        }
        self.prefs.show_alpha_info_message = false;
        if let Some(path) = &self.prefs_path {
            self.prefs.save(path)?;
        }
        Ok(())
    }
}

impl EditListener for FilterStackController {
    /// Rebuild the stack when the edit touched the clip being edited.
    fn filter_edit_done(&mut self, done: &EditDone) {
        if self.block_stack_update {
            return;
        }
        if !self.clip_is_being_edited(&done.clip) {
            debug!("edit on a clip that is not being edited");
            return;
        }
        self.rebuild_stack(done.selected);
        self.values_changed();
    }
}

impl Drop for FilterStackController {
    fn drop(&mut self) {
        self.stop_poller();
    }
}
