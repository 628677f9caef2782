//! Small widgets: the active toggle and per-kind property editors.

use egui::{self, Pos2, Rounding, Stroke, Vec2};
use fxstack_core::{EditorKind, Filter};
use fxstack_editor::EditorRow;

use crate::theme::Theme;

/// Toggle switch for a filter's active state. Returns `true` if clicked.
pub fn active_toggle(ui: &mut egui::Ui, on: bool) -> bool {
    let (resp, painter) = ui.allocate_painter(Vec2::new(30.0, 16.0), egui::Sense::click());
    let rect = resp.rect;

    let pill = Rounding::same(rect.height() / 2.0);
    let (bg, border) = if on {
        (
            Theme::with_alpha(Theme::accent(), 90),
            Theme::with_alpha(Theme::accent(), 130),
        )
    } else {
        (Theme::bg(), Theme::t3())
    };
    painter.rect_filled(rect, pill, bg);
    painter.rect_stroke(rect, pill, Stroke::new(0.5, border));

    let radius = 6.0;
    let t = ui
        .ctx()
        .animate_bool_with_time(resp.id.with("active_anim"), on, 0.15);
    let x = egui::lerp(rect.left() + radius + 2.0..=rect.right() - radius - 2.0, t);
    let thumb = if on { Theme::accent() } else { Theme::t2() };
    painter.circle_filled(Pos2::new(x, rect.center().y), radius, thumb);

    resp.on_hover_text(if on { "Disable filter" } else { "Enable filter" })
        .clicked()
}

fn parse_hex(value: &str) -> Option<[u8; 3]> {
    let hex = value.strip_prefix('#')?;
    if hex.len() < 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

/// Draw the editor for one property. Returns the new value when edited.
pub fn property_editor(ui: &mut egui::Ui, editor: &EditorRow, filter: &Filter) -> Option<String> {
    let raw = filter.property(&editor.property)?.to_string();
    let mut edited = None;

    ui.horizontal(|ui| {
        let label = egui::RichText::new(&editor.property).size(Theme::FONT_XS);
        let label = if editor.extra {
            label.italics().color(Theme::t3())
        } else {
            label.color(Theme::t2())
        };
        ui.label(label);

        if editor.is_keyframed() {
            let shown = editor.displayed_value(filter).unwrap_or_default();
            ui.label(
                egui::RichText::new(format!("@{} {}", editor.clip_frame(), shown))
                    .monospace()
                    .color(Theme::keyframe()),
            );
            let mut text = raw.clone();
            if ui.text_edit_singleline(&mut text).changed() {
                edited = Some(text);
            }
            return;
        }

        match editor.kind {
            EditorKind::Checkbox => {
                let mut on = raw == "1";
                if ui.checkbox(&mut on, "").changed() {
                    edited = Some(if on { "1" } else { "0" }.to_string());
                }
            }
            EditorKind::Color => match parse_hex(&raw) {
                Some(mut rgb) => {
                    if ui.color_edit_button_srgb(&mut rgb).changed() {
                        edited = Some(format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2]));
                    }
                }
                None => {
                    let mut text = raw.clone();
                    if ui.text_edit_singleline(&mut text).changed() {
                        edited = Some(text);
                    }
                }
            },
            EditorKind::Slider => match raw.parse::<f64>() {
                Ok(mut v) => {
                    if ui.add(egui::DragValue::new(&mut v).speed(0.01)).changed() {
                        edited = Some(v.to_string());
                    }
                }
                Err(_) => {
                    let mut text = raw.clone();
                    if ui.text_edit_singleline(&mut text).changed() {
                        edited = Some(text);
                    }
                }
            },
            _ => {
                let mut text = raw.clone();
                if ui.text_edit_singleline(&mut text).changed() {
                    edited = Some(text);
                }
            }
        }
    });

    edited
}
