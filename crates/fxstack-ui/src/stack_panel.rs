//! Filter stack panel: one collapsible row per filter of the edited clip.
//!
//! The panel only reads controller state. Gestures come back as
//! [`StackAction`]s for the caller to apply, since some of them need file
//! dialogs first.

use std::sync::Arc;

use egui::collapsing_header::CollapsingState;
use egui::{self, Vec2};
use fxstack_core::{FilterInfo, SharedFilter};
use fxstack_editor::{FilterStackController, MaskTarget, StackRow};

use crate::theme::Theme;
use crate::widgets::{active_toggle, property_editor};

/// A user gesture on the stack panel.
#[derive(Debug, Clone)]
pub enum StackAction {
    ToggleActive(usize),
    ToggleAll,
    Delete(SharedFilter),
    SetExpanded { index: usize, expanded: bool },
    SetProperty { index: usize, name: String, value: String },
    Move { insert_index: usize, delete_index: usize },
    MoveUp(usize),
    MoveDown(usize),
    AddMask { start: Arc<FilterInfo>, target: MaskTarget },
    Reset(usize),
    SaveValues(usize),
    LoadValues(usize),
    Undo,
    Redo,
}

/// Dragged row index.
#[derive(Debug, Clone, Copy)]
struct DraggedRow(usize);

/// Move for a row dropped onto row `target` of a `len` row stack.
///
/// Dropping onto the last row moves to the end. Other drops one row away
/// fall under the controller's minimum move distance; the row's up/down
/// buttons cover those.
fn drop_move(target: usize, dragged: usize, len: usize) -> StackAction {
    let insert_index = if target + 1 == len { len } else { target };
    StackAction::Move {
        insert_index,
        delete_index: dragged,
    }
}

fn mask_menu(
    ui: &mut egui::Ui,
    label: &str,
    starts: &[Arc<FilterInfo>],
    target: MaskTarget,
    actions: &mut Vec<StackAction>,
) {
    ui.menu_button(label, |ui| {
        for start in starts {
            if ui.button(&start.name).clicked() {
                actions.push(StackAction::AddMask {
                    start: start.clone(),
                    target,
                });
                ui.close_menu();
            }
        }
    });
}

fn show_row(
    ui: &mut egui::Ui,
    index: usize,
    len: usize,
    row: &StackRow,
    mask_starts: &[Arc<FilterInfo>],
    actions: &mut Vec<StackAction>,
) {
    let filter = row.filter.read();
    let frame = Theme::row_frame(filter.active, filter.is_mask_filter());

    let framed = frame.show(ui, |ui| {
        let id = ui.make_persistent_id(("fxstack_row", filter.id()));
        let mut state = CollapsingState::load_with_default_open(ui.ctx(), id, row.expanded);
        state.set_open(row.expanded);

        let header = state.show_header(ui, |ui| {
            ui.spacing_mut().item_spacing = Vec2::new(6.0, 0.0);

            let handle = ui
                .add(egui::Label::new("\u{2261}").sense(egui::Sense::drag()))
                .on_hover_text("Drag to reorder");
            handle.dnd_set_drag_payload(DraggedRow(index));

            if active_toggle(ui, filter.active) {
                actions.push(StackAction::ToggleActive(index));
            }
            let name = egui::RichText::new(filter.name()).size(Theme::FONT_SM);
            let name = if filter.is_mask_filter() {
                name.color(Theme::mask())
            } else if filter.active {
                name.color(Theme::t1())
            } else {
                name.color(Theme::t3())
            };
            ui.label(name);

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let trash = egui::RichText::new("\u{1F5D1}").color(Theme::red());
                if ui.small_button(trash).on_hover_text("Delete filter").clicked() {
                    actions.push(StackAction::Delete(row.filter.clone()));
                }
                let down = ui.add_enabled(index + 1 < len, egui::Button::new("\u{2193}").small());
                if down.on_hover_text("Move down").clicked() {
                    actions.push(StackAction::MoveDown(index));
                }
                let up = ui.add_enabled(index > 0, egui::Button::new("\u{2191}").small());
                if up.on_hover_text("Move up").clicked() {
                    actions.push(StackAction::MoveUp(index));
                }
            });
        });

        let (toggle, _, _) = header.body(|ui| {
            if row.panel.no_editable_parameters {
                ui.label(
                    egui::RichText::new("No editable parameters")
                        .size(Theme::FONT_XS)
                        .color(Theme::t3()),
                );
            }
            for editor in &row.panel.editors {
                if let Some(value) = property_editor(ui, editor, &filter) {
                    actions.push(StackAction::SetProperty {
                        index,
                        name: editor.property.clone(),
                        value,
                    });
                }
            }

            ui.add_space(Theme::SPACE_XS);
            ui.horizontal(|ui| {
                if ui.small_button("Save").on_hover_text("Save effect values").clicked() {
                    actions.push(StackAction::SaveValues(index));
                }
                if ui.small_button("Load").on_hover_text("Load effect values").clicked() {
                    actions.push(StackAction::LoadValues(index));
                }
                if ui.small_button("Reset").on_hover_text("Reset to defaults").clicked() {
                    actions.push(StackAction::Reset(index));
                }
                if !mask_starts.is_empty() {
                    mask_menu(ui, "Mask", mask_starts, MaskTarget::Filter(index), actions);
                }
            });
        });

        if toggle.clicked() {
            actions.push(StackAction::SetExpanded {
                index,
                expanded: !row.expanded,
            });
        }
    });

    if let Some(dragged) = framed.response.dnd_release_payload::<DraggedRow>() {
        actions.push(drop_move(index, dragged.0, len));
    }
}

/// Draw the stack of the edited clip and collect the user's gestures.
pub fn show_stack_panel(ui: &mut egui::Ui, controller: &FilterStackController) -> Vec<StackAction> {
    let mut actions = Vec::new();

    ui.horizontal(|ui| {
        ui.label(
            egui::RichText::new("FILTER STACK")
                .size(Theme::FONT_MD)
                .color(Theme::t2())
                .strong(),
        );
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let history = controller.history();
            if ui.add_enabled(history.can_redo(), egui::Button::new("Redo")).clicked() {
                actions.push(StackAction::Redo);
            }
            if ui.add_enabled(history.can_undo(), egui::Button::new("Undo")).clicked() {
                actions.push(StackAction::Undo);
            }
        });
    });
    Theme::draw_separator(ui);

    if let Some(status) = controller.status_text() {
        ui.add_space(Theme::SPACE_MD);
        ui.vertical_centered(|ui| {
            ui.label(egui::RichText::new(status).color(Theme::t3()));
        });
    }

    let Some(stack) = controller.stack() else {
        return actions;
    };
    let mask_starts = if controller.can_add_filter_mask() {
        controller.catalog().mask_start_filters()
    } else {
        Vec::new()
    };

    egui::ScrollArea::vertical()
        .id_salt("fxstack_stack_scroll")
        .auto_shrink([false, true])
        .max_height((ui.available_height() - 32.0).max(0.0))
        .show(ui, |ui| {
            let len = stack.len();
            for (index, row) in stack.rows().iter().enumerate() {
                show_row(ui, index, len, row, &mask_starts, &mut actions);
                ui.add_space(Theme::SPACE_XS);
            }
        });

    Theme::draw_separator(ui);
    ui.horizontal(|ui| {
        if ui
            .add_enabled(!stack.is_empty(), egui::Button::new("Toggle All"))
            .clicked()
        {
            actions.push(StackAction::ToggleAll);
        }
        if !mask_starts.is_empty() {
            mask_menu(ui, "Mask Full Stack", &mask_starts, MaskTarget::FullStack, &mut actions);
        }
    });

    actions
}
