//! FxStack - clip filter stack editor
//!
//! Entry point and main application loop.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use eframe::egui;
use fxstack_core::{
    shared, shared_clip, Clip, CompositingMode, Filter, FilterCatalog, FilterRenderer,
    PropertyMap, SharedClip, Track,
};
use fxstack_editor::{EditorPrefs, FilterStackController, Notice, TimelineSink};
use fxstack_ui::{show_catalog_panel, show_stack_panel, CatalogPanelState, StackAction, Theme};
use tracing::{info, trace, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use uuid::Uuid;

/// Frames per demo clip.
const CLIP_LENGTH: i64 = 100;

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("FxStack starting...");

    // Optional catalog file as the first argument
    let catalog = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => FilterCatalog::load_from_file(&path)
            .with_context(|| format!("loading filter catalog {}", path.display()))?,
        None => FilterCatalog::builtin(),
    };

    let prefs_path = EditorPrefs::default_path();
    let prefs = EditorPrefs::load(&prefs_path).unwrap_or_else(|e| {
        warn!(error = %e, "using default editor preferences");
        EditorPrefs::default()
    });

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 720.0])
            .with_title("FxStack"),
        renderer: eframe::Renderer::Wgpu,
        ..Default::default()
    };

    eframe::run_native(
        "FxStack",
        options,
        Box::new(move |cc| Ok(Box::new(FxStackApp::new(cc, catalog, prefs, prefs_path)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))?;

    Ok(())
}

/// Stands in for a render engine: logs what would be pushed.
struct LoggingRenderer;

impl FilterRenderer for LoggingRenderer {
    fn set_disabled(&self, filter_id: Uuid, disabled: bool) {
        trace!(%filter_id, disabled, "render disabled flag");
    }

    fn set_properties(&self, filter_id: Uuid, properties: &PropertyMap) {
        trace!(%filter_id, count = properties.len(), "render properties");
    }
}

/// Repaints the window when filter values change behind the editor's back.
struct RepaintSink(egui::Context);

impl TimelineSink for RepaintSink {
    fn timeline_changed(&self) {
        self.0.request_repaint();
    }
}

struct FxStackApp {
    controller: FilterStackController,
    catalog_state: CatalogPanelState,
    track: Track,
    compositing_mode: CompositingMode,
    tline_frame: i64,
    show_stack: bool,
    dont_show_alpha_again: bool,
    error: Option<String>,
}

impl FxStackApp {
    fn new(
        cc: &eframe::CreationContext<'_>,
        catalog: FilterCatalog,
        prefs: EditorPrefs,
        prefs_path: PathBuf,
    ) -> Self {
        Theme::apply(&cc.egui_ctx);

        let renderer: Arc<dyn FilterRenderer> = Arc::new(LoggingRenderer);
        let sink = Arc::new(RepaintSink(cc.egui_ctx.clone()));
        let track = demo_track(&catalog, &renderer);
        let controller = FilterStackController::new(catalog, renderer, sink)
            .with_prefs(prefs, Some(prefs_path));

        Self {
            controller,
            catalog_state: CatalogPanelState::default(),
            track,
            compositing_mode: CompositingMode::default(),
            tline_frame: 0,
            show_stack: true,
            dont_show_alpha_again: false,
            error: None,
        }
    }

    fn select_clip(&mut self, index: usize) {
        let Some(clip) = self.track.clip_at(index).cloned() else {
            return;
        };
        let Some(location) = self.track.location_of(&clip) else {
            return;
        };
        self.controller.set_clip(clip, location, true);
        self.controller
            .update_kf_editor_positions(index as i64 * CLIP_LENGTH);
        self.controller.display_tline_frame(self.tline_frame);
    }

    fn apply(&mut self, action: StackAction) -> fxstack_core::Result<()> {
        let c = &mut self.controller;
        match action {
            StackAction::ToggleActive(index) => {
                c.toggle_filter_active(index);
            }
            StackAction::ToggleAll => c.toggle_all(),
            StackAction::Delete(filter) => c.delete_filter(&filter)?,
            StackAction::SetExpanded { index, expanded } => {
                if expanded {
                    c.set_filter_item_expanded(index);
                } else {
                    c.set_filter_item_collapsed(index);
                }
            }
            StackAction::SetProperty { index, name, value } => {
                c.set_property_value(index, &name, &value);
            }
            StackAction::Move {
                insert_index,
                delete_index,
            } => {
                c.request_move(insert_index, delete_index)?;
            }
            StackAction::MoveUp(index) => {
                c.move_filter_up(index)?;
            }
            StackAction::MoveDown(index) => {
                c.move_filter_down(index)?;
            }
            StackAction::AddMask { start, target } => c.add_filter_mask(start, target)?,
            StackAction::Reset(index) => c.reset_filter(index),
            StackAction::SaveValues(index) => {
                let name = c.default_save_name(index).unwrap_or_default();
                if let Some(path) = rfd::FileDialog::new()
                    .set_title("Save Effect Values Data")
                    .set_file_name(name)
                    .add_filter("Effect values", &["data"])
                    .save_file()
                {
                    c.save_effect_values(index, &path)?;
                }
            }
            StackAction::LoadValues(index) => {
                if let Some(path) = rfd::FileDialog::new()
                    .set_title("Load Effect Values Data")
                    .add_filter("Effect values", &["data"])
                    .pick_file()
                {
                    c.load_effect_values(index, &path)?;
                }
            }
            StackAction::Undo => {
                c.undo()?;
            }
            StackAction::Redo => {
                c.redo()?;
            }
        }
        Ok(())
    }

    fn show_notices(&mut self, ctx: &egui::Context) {
        if let Some(error) = self.error.clone() {
            egui::Window::new("Error")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label(error);
                    if ui.button("OK").clicked() {
                        self.error = None;
                    }
                });
            return;
        }

        let Some(notice) = self.controller.notice().cloned() else {
            return;
        };
        let (title, message) = match &notice {
            Notice::AlphaInfo => (
                Notice::ALPHA_INFO_TITLE.to_string(),
                Notice::ALPHA_INFO_TEXT.to_string(),
            ),
            Notice::Warning { title, message } => (title.clone(), message.clone()),
        };

        egui::Window::new(title)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(message);
                if notice == Notice::AlphaInfo {
                    ui.checkbox(&mut self.dont_show_alpha_again, "Don't show this message again");
                }
                if ui.button("OK").clicked() {
                    if notice == Notice::AlphaInfo {
                        if let Err(e) = self.controller.dismiss_alpha_info(self.dont_show_alpha_again)
                        {
                            warn!(error = %e, "could not save preferences");
                        }
                    } else {
                        self.controller.dismiss_notice();
                    }
                }
            });
    }
}

impl eframe::App for FxStackApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Undo / redo shortcuts
        let (undo, redo) = ctx.input(|i| {
            let z = i.modifiers.command && i.key_pressed(egui::Key::Z);
            (z && !i.modifiers.shift, z && i.modifiers.shift)
        });
        let mut actions = Vec::new();
        if undo {
            actions.push(StackAction::Undo);
        }
        if redo {
            actions.push(StackAction::Redo);
        }

        // Menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
                ui.menu_button("View", |ui| {
                    ui.checkbox(&mut self.show_stack, "Filter Stack");
                });

                ui.separator();
                let before = self.compositing_mode;
                egui::ComboBox::from_label("Compositing")
                    .selected_text(format!("{:?}", self.compositing_mode))
                    .show_ui(ui, |ui| {
                        for mode in [
                            CompositingMode::TopDownFreeMove,
                            CompositingMode::StandardAutoFollow,
                            CompositingMode::StandardFullTrack,
                        ] {
                            ui.selectable_value(&mut self.compositing_mode, mode, format!("{mode:?}"));
                        }
                    });
                if before != self.compositing_mode {
                    self.controller.set_compositing_mode(self.compositing_mode);
                }

                if self.controller.changes().is_set() {
                    ui.label(egui::RichText::new("\u{25CF} unsaved").color(Theme::mask()));
                }
            });
        });

        // Timeline at bottom
        egui::TopBottomPanel::bottom("timeline_panel")
            .resizable(false)
            .show(ctx, |ui| {
                let end = self.track.clips.len() as i64 * CLIP_LENGTH;
                ui.horizontal(|ui| {
                    ui.label("Playhead");
                    let slider = egui::Slider::new(&mut self.tline_frame, 0..=end.max(1));
                    if ui.add(slider).changed() {
                        self.controller.display_tline_frame(self.tline_frame);
                    }
                });
                let mut selected = None;
                ui.horizontal(|ui| {
                    for (index, clip) in self.track.clips.iter().enumerate() {
                        let clip_ref = clip.read();
                        let editing = self.controller.clip_is_being_edited(clip);
                        let label = format!("{} ({})", clip_ref.name, clip_ref.filter_count());
                        if ui.selectable_label(editing, label).clicked() {
                            selected = Some(index);
                        }
                    }
                });
                if let Some(index) = selected {
                    self.select_clip(index);
                }
            });

        // Catalog on left
        egui::SidePanel::left("catalog_panel")
            .resizable(true)
            .default_width(200.0)
            .frame(Theme::panel_frame())
            .show(ctx, |ui| {
                let enabled = self.controller.edited_clip().is_some();
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let picked = show_catalog_panel(
                        ui,
                        self.controller.catalog(),
                        &mut self.catalog_state,
                        enabled,
                    );
                    if let Some(info) = picked {
                        if let Err(e) = self.controller.add_filter(info) {
                            self.error = Some(e.to_string());
                        }
                    }
                });
            });

        // Filter stack fills the rest
        if self.controller.take_focus_request() {
            self.show_stack = true;
        }
        egui::CentralPanel::default()
            .frame(Theme::panel_frame())
            .show(ctx, |ui| {
                if self.show_stack {
                    actions.extend(show_stack_panel(ui, &self.controller));
                }
            });

        for action in actions {
            if let Err(e) = self.apply(action) {
                warn!(error = %e, "filter action failed");
                self.error = Some(e.to_string());
            }
        }
        self.controller.reinit_stack_if_needed(false);

        self.show_notices(ctx);
    }
}

/// A track with a few clips to edit.
fn demo_track(catalog: &FilterCatalog, renderer: &Arc<dyn FilterRenderer>) -> Track {
    let clip = |name: &str, filters: &[&str]| -> SharedClip {
        let filters = filters
            .iter()
            .filter_map(|n| catalog.find(n))
            .map(|info| shared(Filter::new(info).with_renderer(renderer.clone())))
            .collect();
        shared_clip(Clip::new(name).with_filters(filters))
    };

    let mut track = Track::new_video("V1");
    track.append_clip(clip("Intro", &["Fade In", "Color Correct"]));
    track.append_clip(clip("Interview", &["Blur", "Saturation", "Curves"]));
    track.append_clip(clip("B-Roll", &[]));
    track
}
