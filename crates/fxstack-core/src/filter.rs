//! Filter descriptors and the per-filter value store.
//!
//! A [`FilterInfo`] is the immutable type descriptor of a filter (what the
//! catalog lists); a [`Filter`] is one instance attached to a clip, holding
//! the values the user edits. Render-side state is reached through the
//! [`FilterRenderer`] proxy so the value store never knows about the engine.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ordered property name → value mapping, as consumed by the render engine.
pub type PropertyMap = IndexMap<String, String>;

/// Mask marker carried by the filter closing a mask range.
pub const MASK_END_MARKER: &str = "Mask - End";

// ── Editor kinds ────────────────────────────────────────────────

/// Editor declared for a property in the filter schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorKind {
    #[default]
    Slider,
    Checkbox,
    Combo,
    Color,
    KeyframeEditor,
    KeyframeEditorRelease,
    KeyframeEditorClip,
    KeyframeEditorClipFade,
    FilterRectGeometry,
    /// Property is edited only through an extra editor, or not at all.
    NoEditor,
}

impl EditorKind {
    /// Editors that follow the timeline playhead.
    pub fn is_keyframe_editor(self) -> bool {
        matches!(
            self,
            Self::KeyframeEditor
                | Self::KeyframeEditorRelease
                | Self::KeyframeEditorClip
                | Self::KeyframeEditorClipFade
                | Self::FilterRectGeometry
        )
    }
}

// ── Filter type descriptor ──────────────────────────────────────

/// Immutable description of a filter type.
///
/// Equality is field-for-field; two descriptors with the same name but a
/// different property schema are different types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterInfo {
    /// Display name.
    pub name: String,
    /// Render engine service id.
    pub service_id: String,
    /// Catalog category.
    #[serde(default)]
    pub group: String,
    /// Non-empty for the start/end filters of a filter mask.
    #[serde(default)]
    pub filter_mask_filter: String,
    /// Edited state includes an opaque composite value.
    #[serde(default)]
    pub multipart_filter: bool,
    /// Default render properties.
    #[serde(default)]
    pub properties: PropertyMap,
    /// Default UI-only properties.
    #[serde(default)]
    pub non_mlt_properties: PropertyMap,
    /// Editor per property; properties not listed use a slider.
    #[serde(default)]
    pub editors: IndexMap<String, EditorKind>,
}

impl FilterInfo {
    /// Create a descriptor with no properties.
    pub fn new(name: impl Into<String>, service_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            service_id: service_id.into(),
            group: String::new(),
            filter_mask_filter: String::new(),
            multipart_filter: false,
            properties: PropertyMap::new(),
            non_mlt_properties: PropertyMap::new(),
            editors: IndexMap::new(),
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, default: impl Into<String>) -> Self {
        self.properties.insert(name.into(), default.into());
        self
    }

    pub fn with_non_mlt_property(
        mut self,
        name: impl Into<String>,
        default: impl Into<String>,
    ) -> Self {
        self.non_mlt_properties.insert(name.into(), default.into());
        self
    }

    pub fn with_editor(mut self, property: impl Into<String>, kind: EditorKind) -> Self {
        self.editors.insert(property.into(), kind);
        self
    }

    pub fn with_mask_marker(mut self, marker: impl Into<String>) -> Self {
        self.filter_mask_filter = marker.into();
        self
    }

    pub fn multipart(mut self) -> Self {
        self.multipart_filter = true;
        self
    }

    /// Whether this is one half of a filter mask pair.
    pub fn is_mask_filter(&self) -> bool {
        !self.filter_mask_filter.is_empty()
    }

    /// Editor declared for `property`.
    pub fn editor_for(&self, property: &str) -> EditorKind {
        self.editors.get(property).copied().unwrap_or_default()
    }
}

// ── Render proxy ────────────────────────────────────────────────

/// Pushes in-memory filter state into the render pipeline.
///
/// Implementations must be callable from any thread.
pub trait FilterRenderer: Send + Sync {
    /// Reflect the filter's enabled state into the engine's disabled flag.
    fn set_disabled(&self, filter_id: Uuid, disabled: bool);

    /// Replace every engine-side property of the filter.
    fn set_properties(&self, filter_id: Uuid, properties: &PropertyMap);
}

/// Renderer that drops every update. Used until an engine is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl FilterRenderer for NullRenderer {
    fn set_disabled(&self, _filter_id: Uuid, _disabled: bool) {}

    fn set_properties(&self, _filter_id: Uuid, _properties: &PropertyMap) {}
}

// ── Filter instance ─────────────────────────────────────────────

/// One filter attached to a clip.
#[derive(Clone)]
pub struct Filter {
    id: Uuid,
    /// Type descriptor.
    pub info: Arc<FilterInfo>,
    /// Disabled filters stay in the stack but are skipped by the renderer.
    pub active: bool,
    /// Values passed to the render engine.
    pub properties: PropertyMap,
    /// Values only the editor uses.
    pub non_mlt_properties: PropertyMap,
    /// Composite payload, present only for multipart filters.
    pub value: Option<String>,
    renderer: Arc<dyn FilterRenderer>,
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter")
            .field("id", &self.id)
            .field("name", &self.info.name)
            .field("active", &self.active)
            .field("properties", &self.properties)
            .field("non_mlt_properties", &self.non_mlt_properties)
            .field("value", &self.value)
            .finish()
    }
}

impl Filter {
    /// Create a filter with its type's default values.
    pub fn new(info: Arc<FilterInfo>) -> Self {
        let value = info.multipart_filter.then(String::new);
        Self {
            id: Uuid::new_v4(),
            properties: info.properties.clone(),
            non_mlt_properties: info.non_mlt_properties.clone(),
            info,
            active: true,
            value,
            renderer: Arc::new(NullRenderer),
        }
    }

    /// Attach a render proxy.
    pub fn with_renderer(mut self, renderer: Arc<dyn FilterRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn service_id(&self) -> &str {
        &self.info.service_id
    }

    pub fn is_mask_filter(&self) -> bool {
        self.info.is_mask_filter()
    }

    /// Push `active` into the engine's disabled flag.
    pub fn update_disabled_flag(&self) {
        self.renderer.set_disabled(self.id, !self.active);
    }

    /// Push every render property into the engine.
    pub fn update_all_properties(&self) {
        self.renderer.set_properties(self.id, &self.properties);
    }

    /// Flip `active` and sync the engine. Returns the new state.
    pub fn toggle_active(&mut self) -> bool {
        self.active = !self.active;
        self.update_disabled_flag();
        self.active
    }

    /// Restore the type's declared defaults and sync the engine.
    ///
    /// The composite value of multipart filters is left untouched.
    pub fn reset_to_defaults(&mut self) {
        self.properties = self.info.properties.clone();
        self.non_mlt_properties = self.info.non_mlt_properties.clone();
        self.update_all_properties();
    }

    /// Set one property value. Returns `true` when the stored value changed.
    ///
    /// Looks in render properties first, then UI-only properties; unknown
    /// names are added to the render properties.
    pub fn set_property(&mut self, name: &str, value: impl Into<String>) -> bool {
        let value = value.into();
        let map = if self.non_mlt_properties.contains_key(name)
            && !self.properties.contains_key(name)
        {
            &mut self.non_mlt_properties
        } else {
            &mut self.properties
        };
        if map.get(name) == Some(&value) {
            return false;
        }
        map.insert(name.to_string(), value);
        true
    }

    /// Look up a value in render properties, then UI-only properties.
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .get(name)
            .or_else(|| self.non_mlt_properties.get(name))
            .map(String::as_str)
    }
}

/// A filter shared between the clip, the editor and the poller.
///
/// Identity (`Arc::ptr_eq`) is what "the same filter" means.
pub type SharedFilter = Arc<RwLock<Filter>>;

/// Wrap a filter for sharing.
pub fn shared(filter: Filter) -> SharedFilter {
    Arc::new(RwLock::new(filter))
}

// ── Tests ───────────────────────────────────────────────────────
