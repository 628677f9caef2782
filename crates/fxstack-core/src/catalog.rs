//! Filter catalog: available filter types grouped by category.

use std::sync::Arc;

use crate::error::{FxStackError, Result};
use crate::filter::{EditorKind, FilterInfo, MASK_END_MARKER};

/// Category holding the filters that open and close filter masks.
pub const MASK_GROUP: &str = "Filter Mask";

/// Category whose filters trigger the alpha compositing notice.
pub const ALPHA_GROUP: &str = "Alpha";

/// A named group of filter types.
#[derive(Debug, Clone)]
pub struct FilterGroup {
    pub name: String,
    pub filters: Vec<Arc<FilterInfo>>,
}

/// All filter types the user can add, in display order.
#[derive(Debug, Clone, Default)]
pub struct FilterCatalog {
    groups: Vec<FilterGroup>,
}

impl FilterCatalog {
    /// Build a catalog from descriptors, grouping by `FilterInfo::group`
    /// in first-seen order.
    pub fn from_filters(filters: impl IntoIterator<Item = FilterInfo>) -> Self {
        let mut groups: Vec<FilterGroup> = Vec::new();
        for info in filters {
            let info = Arc::new(info);
            match groups.iter_mut().find(|g| g.name == info.group) {
                Some(group) => group.filters.push(info),
                None => groups.push(FilterGroup {
                    name: info.group.clone(),
                    filters: vec![info],
                }),
            }
        }
        Self { groups }
    }

    /// Parse a JSON array of filter descriptors.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let filters: Vec<FilterInfo> = serde_json::from_slice(data)
            .map_err(|e| FxStackError::Serialization(format!("Invalid filter catalog: {}", e)))?;
        Ok(Self::from_filters(filters))
    }

    /// Load a catalog file.
    pub fn load_from_file(path: &std::path::Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_json(&data)
    }

    pub fn groups(&self) -> &[FilterGroup] {
        &self.groups
    }

    pub fn group(&self, index: usize) -> Option<&FilterGroup> {
        self.groups.get(index)
    }

    fn all(&self) -> impl Iterator<Item = &Arc<FilterInfo>> {
        self.groups.iter().flat_map(|g| g.filters.iter())
    }

    /// Find a filter type by display name.
    pub fn find(&self, name: &str) -> Option<Arc<FilterInfo>> {
        self.all().find(|f| f.name == name).cloned()
    }

    /// Filters that can open a mask range.
    pub fn mask_start_filters(&self) -> Vec<Arc<FilterInfo>> {
        self.all()
            .filter(|f| f.is_mask_filter() && f.filter_mask_filter != MASK_END_MARKER)
            .cloned()
            .collect()
    }

    /// Look up a mask filter by its marker.
    pub fn mask_filter(&self, marker: &str) -> Option<Arc<FilterInfo>> {
        self.all().find(|f| f.filter_mask_filter == marker).cloned()
    }

    /// The filter closing every mask range.
    pub fn mask_end(&self) -> Option<Arc<FilterInfo>> {
        self.mask_filter(MASK_END_MARKER)
    }

    /// Default filter set.
    pub fn builtin() -> Self {
        Self::from_filters([
            FilterInfo::new("Blur", "avfilter.boxblur")
                .with_group("Blur")
                .with_property("av.luma_radius", "2")
                .with_property("av.luma_power", "1"),
            FilterInfo::new("Motion Blur", "avfilter.tmix")
                .with_group("Blur")
                .with_property("av.frames", "3"),
            FilterInfo::new("Color Correct", "frei0r.colgate")
                .with_group("Color")
                .with_property("Neutral Color", "#7f7f7f")
                .with_property("Color Temperature", "0.433333")
                .with_editor("Neutral Color", EditorKind::Color),
            FilterInfo::new("Saturation", "frei0r.saturat0r")
                .with_group("Color")
                .with_property("Saturation", "0=0.125")
                .with_editor("Saturation", EditorKind::KeyframeEditor),
            FilterInfo::new("Curves", "frei0r.curves")
                .with_group("Color")
                .with_property("Channel", "0.5")
                .with_non_mlt_property("curve_points", "0/0;255/255")
                .with_editor("Channel", EditorKind::Combo)
                .with_editor("curve_points", EditorKind::NoEditor)
                .multipart(),
            FilterInfo::new("Alpha Gradient", "frei0r.alphagrad")
                .with_group(ALPHA_GROUP)
                .with_property("Position", "0.5")
                .with_property("Transition width", "0.2"),
            FilterInfo::new("Alpha Shape", "frei0r.alphaspot")
                .with_group(ALPHA_GROUP)
                .with_property("Shape", "0")
                .with_property("rect", "0=0 0 1920 1080")
                .with_editor("rect", EditorKind::FilterRectGeometry),
            FilterInfo::new("Fade In", "brightness")
                .with_group("Fade")
                .with_property("level", "0=0;10=1")
                .with_editor("level", EditorKind::KeyframeEditorClipFade),
            FilterInfo::new("Volume", "volume")
                .with_group("Audio")
                .with_property("gain", "0=1")
                .with_property("mute", "0")
                .with_editor("gain", EditorKind::KeyframeEditorRelease)
                .with_editor("mute", EditorKind::Checkbox),
            FilterInfo::new("Mask - Shape", "mask_start")
                .with_group(MASK_GROUP)
                .with_property("filter", "shape")
                .with_property("filter.mix", "50")
                .with_editor("filter", EditorKind::NoEditor)
                .with_mask_marker("Mask - Shape"),
            FilterInfo::new("Mask - Color", "mask_start")
                .with_group(MASK_GROUP)
                .with_property("filter", "chroma")
                .with_property("filter.key", "#00ff00")
                .with_editor("filter", EditorKind::NoEditor)
                .with_editor("filter.key", EditorKind::Color)
                .with_mask_marker("Mask - Color"),
            FilterInfo::new("Mask - End", "mask_apply")
                .with_group(MASK_GROUP)
                .with_mask_marker(MASK_END_MARKER),
        ])
    }
}
