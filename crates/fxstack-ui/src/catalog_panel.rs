//! Filter catalog panel with collapsible categories.

use std::collections::HashSet;
use std::sync::Arc;

use egui::{self, Color32, Rounding, Vec2};
use fxstack_core::{FilterCatalog, FilterInfo, ALPHA_GROUP, MASK_GROUP};

use crate::theme::Theme;

// ── State ──────────────────────────────────────────────────────

/// Which categories are collapsed.
#[derive(Debug, Default)]
pub struct CatalogPanelState {
    collapsed: HashSet<String>,
}

impl CatalogPanelState {
    pub fn is_expanded(&self, group: &str) -> bool {
        !self.collapsed.contains(group)
    }

    pub fn toggle(&mut self, group: &str) {
        if !self.collapsed.remove(group) {
            self.collapsed.insert(group.to_string());
        }
    }
}

// ── Rendering ──────────────────────────────────────────────────

/// Draw the catalog. Returns the filter type the user picked, if any.
///
/// Mask filters are added through the mask menus and are not listed.
pub fn show_catalog_panel(
    ui: &mut egui::Ui,
    catalog: &FilterCatalog,
    state: &mut CatalogPanelState,
    enabled: bool,
) -> Option<Arc<FilterInfo>> {
    let mut picked = None;
    ui.spacing_mut().item_spacing = Vec2::new(0.0, 2.0);

    for group in catalog.groups().iter().filter(|g| g.name != MASK_GROUP) {
        let is_expanded = state.is_expanded(&group.name);
        let chevron = if is_expanded { "\u{25BE}" } else { "\u{25B8}" };

        let header = ui
            .horizontal(|ui| {
                ui.spacing_mut().item_spacing = Vec2::new(6.0, 0.0);
                ui.label(egui::RichText::new(chevron).size(8.0).color(Theme::t3()));
                ui.label(
                    egui::RichText::new(group.name.to_uppercase())
                        .size(9.5)
                        .color(Theme::t2())
                        .strong(),
                );

                // Count badge
                egui::Frame::none()
                    .fill(Color32::from_rgba_premultiplied(2, 2, 2, 8))
                    .rounding(Rounding::same(6.0))
                    .inner_margin(egui::Margin::symmetric(5.0, 1.0))
                    .show(ui, |ui| {
                        ui.label(
                            egui::RichText::new(group.filters.len().to_string())
                                .size(8.0)
                                .color(Theme::t3()),
                        );
                    });
            })
            .response;
        let header = ui.interact(header.rect, header.id.with("toggle"), egui::Sense::click());
        if header.clicked() {
            state.toggle(&group.name);
        }

        if is_expanded {
            for info in &group.filters {
                let color = if group.name == ALPHA_GROUP {
                    Theme::with_alpha(Theme::accent(), 204)
                } else {
                    Theme::t1()
                };

                let item = egui::Frame::none()
                    .rounding(Rounding::same(7.0))
                    .inner_margin(egui::Margin {
                        left: 16.0,
                        right: 8.0,
                        top: 4.0,
                        bottom: 4.0,
                    })
                    .show(ui, |ui| {
                        ui.label(egui::RichText::new(&info.name).size(10.5).color(color));
                    })
                    .response;

                let item = ui.interact(
                    item.rect,
                    ui.id().with(("catalog_item", &group.name, &info.name)),
                    egui::Sense::click(),
                );
                if item.hovered() && enabled {
                    ui.painter().rect_filled(
                        item.rect,
                        Rounding::same(7.0),
                        Color32::from_rgba_premultiplied(2, 2, 2, 10),
                    );
                }
                if item.clicked() && enabled {
                    picked = Some(info.clone());
                }
            }
        }

        ui.add_space(4.0);
    }

    picked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_start_expanded_and_toggle() {
        let mut state = CatalogPanelState::default();
        assert!(state.is_expanded("Blur"));
        state.toggle("Blur");
        assert!(!state.is_expanded("Blur"));
        state.toggle("Blur");
        assert!(state.is_expanded("Blur"));
    }
}
