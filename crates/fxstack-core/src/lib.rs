//! FxStack Core - filter value store and clip model
//!
//! This crate provides the types every other FxStack crate edits:
//! - Filter type descriptors and per-filter values (`FilterInfo`, `Filter`)
//! - Clips owning ordered filter sequences, and tracks owning clips
//! - The render proxy seam (`FilterRenderer`)
//! - The filter catalog and keyframe value strings

pub mod catalog;
pub mod clip;
pub mod error;
pub mod filter;
pub mod fs;
pub mod keyframe;
pub mod track;

pub use catalog::{FilterCatalog, FilterGroup, ALPHA_GROUP, MASK_GROUP};
pub use clip::{shared_clip, Clip, SharedClip};
pub use error::{FxStackError, Result};
pub use filter::{
    shared, EditorKind, Filter, FilterInfo, FilterRenderer, NullRenderer, PropertyMap,
    SharedFilter, MASK_END_MARKER,
};
pub use keyframe::{Keyframe, KeyframeTrack, KeyframeType};
pub use track::{ClipLocation, CompositingMode, Track};
