//! FxStack UI - egui panels for filter editing
//!
//! Provides:
//! - Filter catalog grouped by category
//! - Filter stack rows with property editors and footer actions
//! - Theme

pub mod catalog_panel;
pub mod stack_panel;
pub mod theme;
pub mod widgets;

pub use catalog_panel::{show_catalog_panel, CatalogPanelState};
pub use stack_panel::{show_stack_panel, StackAction};
pub use theme::Theme;
