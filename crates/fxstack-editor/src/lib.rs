//! FxStack Editor - the filter stack of the clip being edited
//!
//! Toolkit-agnostic state behind the filter stack panel:
//! - Stack rows and their property editor panels
//! - The controller turning user gestures into filter edits
//! - Playhead sync for keyframe editors
//! - Background polling for property writes that bypass the editor
//! - Editor preferences

pub mod controller;
pub mod editors;
pub mod events;
pub mod poller;
pub mod prefs;
pub mod stack;

pub use controller::{FilterStackController, MaskTarget, Notice, MIN_MOVE_DISTANCE};
pub use editors::{
    EditorCapability, EditorPanel, EditorRow, PropertyEditorBuilder, SchemaEditorBuilder,
};
pub use events::{ChangeFlag, NullSink, TimelineSink};
pub use poller::PropertyPoller;
pub use prefs::EditorPrefs;
pub use stack::{FilterStack, StackRow};
