//! Property editor panels built per filter.
//!
//! Each editor is tagged at construction with what it can do, so the
//! controller knows which editors follow the timeline playhead without
//! inspecting them later.

use fxstack_core::{EditorKind, Filter, KeyframeTrack};
use tracing::trace;

/// What an editor does with the playhead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorCapability {
    /// Shows a fixed value.
    Simple,
    /// Shows the keyframed value at the current playhead frame.
    Keyframed,
}

impl EditorCapability {
    /// Resolve from the declared editor and the property's current value.
    ///
    /// A slider holding a keyframe string is treated as keyframed.
    pub fn resolve(kind: EditorKind, value: &str) -> Self {
        if kind.is_keyframe_editor()
            || (kind == EditorKind::Slider && KeyframeTrack::is_keyframe_string(value))
        {
            Self::Keyframed
        } else {
            Self::Simple
        }
    }
}

/// One editor in a filter's panel.
#[derive(Debug, Clone)]
pub struct EditorRow {
    pub property: String,
    pub kind: EditorKind,
    pub capability: EditorCapability,
    /// Edits a UI-only property.
    pub extra: bool,
    clip_start: i64,
    tline_frame: i64,
}

impl EditorRow {
    pub fn new(property: impl Into<String>, kind: EditorKind, value: &str, extra: bool) -> Self {
        Self {
            property: property.into(),
            kind,
            capability: EditorCapability::resolve(kind, value),
            extra,
            clip_start: 0,
            tline_frame: 0,
        }
    }

    pub fn is_keyframed(&self) -> bool {
        self.capability == EditorCapability::Keyframed
    }

    /// Move the displayed frame to a timeline frame.
    pub fn display_tline_frame(&mut self, tline_frame: i64) {
        if self.is_keyframed() {
            self.tline_frame = tline_frame;
        }
    }

    /// Update where the clip starts on the timeline.
    pub fn update_clip_pos(&mut self, clip_start: i64) {
        if self.is_keyframed() {
            self.clip_start = clip_start;
        }
    }

    /// Playhead position relative to the clip start.
    pub fn clip_frame(&self) -> i64 {
        self.tline_frame.saturating_sub(self.clip_start)
    }

    /// Value to show for this editor.
    pub fn displayed_value(&self, filter: &Filter) -> Option<String> {
        let raw = filter.property(&self.property)?;
        if !self.is_keyframed() || !KeyframeTrack::is_keyframe_string(raw) {
            return Some(raw.to_string());
        }

        let track = KeyframeTrack::parse(raw).ok()?;
        let frame = self.clip_frame();
        if let Some(v) = track.value_at(frame) {
            return Some(format!("{v:.3}"));
        }
        // Non-numeric values (geometry) show the active keyframe as is.
        let index = track.active_index(frame).unwrap_or(0);
        track.keyframes().get(index).map(|kf| kf.value.clone())
    }
}

/// Editors for one filter, render properties first, then extra editors.
#[derive(Debug, Clone, Default)]
pub struct EditorPanel {
    pub editors: Vec<EditorRow>,
    /// The filter has nothing the user can edit.
    pub no_editable_parameters: bool,
}

impl EditorPanel {
    pub fn new(editors: Vec<EditorRow>) -> Self {
        let no_editable_parameters = editors.is_empty();
        Self {
            editors,
            no_editable_parameters,
        }
    }

    pub fn keyframe_editors_mut(&mut self) -> impl Iterator<Item = &mut EditorRow> {
        self.editors.iter_mut().filter(|e| e.is_keyframed())
    }

    pub fn has_keyframe_editors(&self) -> bool {
        self.editors.iter().any(EditorRow::is_keyframed)
    }
}

/// Builds the editor panel for a filter at a stack position.
pub trait PropertyEditorBuilder: Send + Sync {
    fn build(&self, filter: &Filter, filter_index: usize) -> EditorPanel;
}

/// Builds editors from the editor kinds declared in the filter's descriptor.
///
/// Properties declared `NoEditor` are skipped.
#[derive(Debug, Default, Clone, Copy)]
pub struct SchemaEditorBuilder;

impl PropertyEditorBuilder for SchemaEditorBuilder {
    fn build(&self, filter: &Filter, filter_index: usize) -> EditorPanel {
        let info = &filter.info;
        let render = filter
            .properties
            .iter()
            .map(|(name, value)| (name, value, false));
        let extra = filter
            .non_mlt_properties
            .iter()
            .map(|(name, value)| (name, value, true));

        let editors: Vec<EditorRow> = render
            .chain(extra)
            .filter_map(|(name, value, extra)| {
                let kind = info.editor_for(name);
                (kind != EditorKind::NoEditor).then(|| EditorRow::new(name, kind, value, extra))
            })
            .collect();

        trace!(filter = %info.name, filter_index, editors = editors.len(), "editor panel built");
        EditorPanel::new(editors)
    }
}
