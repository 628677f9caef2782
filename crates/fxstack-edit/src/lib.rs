//! FxStack Edit - structural filter edits and effect value files
//!
//! Provides:
//! - Filter edits (add, remove, mask pairs, move) with undo/redo
//! - Completion notification for every applied edit
//! - Saving and loading one filter's values

pub mod edit;
pub mod snapshot;

pub use edit::{EditDone, EditHistory, EditListener, FilterEdit};
pub use snapshot::{EffectValues, EffectValuesFile};
