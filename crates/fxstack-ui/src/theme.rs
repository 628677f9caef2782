//! Dark theme for the filter panels.

use egui::{Color32, Rounding, Stroke, Vec2};

/// Colors and metrics shared by the panels.
pub struct Theme;

impl Theme {
    // ── Typography ─────────────────────────────────────────────
    pub const FONT_XS: f32 = 11.0; // badges, status
    pub const FONT_SM: f32 = 13.0; // rows, editors
    pub const FONT_MD: f32 = 15.0; // section headers

    // ── Spacing ────────────────────────────────────────────────
    pub const SPACE_XS: f32 = 4.0;
    pub const SPACE_SM: f32 = 8.0;
    pub const SPACE_MD: f32 = 16.0;

    pub const RADIUS: f32 = 6.0;
    pub const STROKE_SUBTLE: f32 = 0.5;

    // ── Backgrounds ────────────────────────────────────────────
    pub const fn bg() -> Color32 {
        Color32::from_rgb(18, 18, 22)
    }
    pub const fn bg1() -> Color32 {
        Color32::from_rgb(28, 28, 34)
    }
    pub const fn bg2() -> Color32 {
        Color32::from_rgb(35, 35, 42)
    }
    pub const fn bg3() -> Color32 {
        Color32::from_rgb(45, 45, 55)
    }

    // ── Text ───────────────────────────────────────────────────
    pub const fn t1() -> Color32 {
        Color32::from_rgba_premultiplied(235, 235, 235, 235)
    }
    pub const fn t2() -> Color32 {
        Color32::from_rgba_premultiplied(153, 153, 153, 153)
    }
    pub const fn t3() -> Color32 {
        Color32::from_rgba_premultiplied(89, 89, 89, 89)
    }

    // ── Accents ────────────────────────────────────────────────
    pub const fn accent() -> Color32 {
        Color32::from_rgb(86, 130, 255)
    }
    /// Mask filter rows.
    pub const fn mask() -> Color32 {
        Color32::from_rgb(255, 184, 48)
    }
    /// Keyframed editors.
    pub const fn keyframe() -> Color32 {
        Color32::from_rgb(34, 211, 238)
    }
    pub const fn red() -> Color32 {
        Color32::from_rgb(255, 88, 85)
    }
    pub const fn divider() -> Color32 {
        Color32::from_rgba_premultiplied(15, 15, 15, 15)
    }

    /// Return a color with replaced alpha.
    pub const fn with_alpha(c: Color32, a: u8) -> Color32 {
        Color32::from_rgba_premultiplied(
            (c.r() as u16 * a as u16 / 255) as u8,
            (c.g() as u16 * a as u16 / 255) as u8,
            (c.b() as u16 * a as u16 / 255) as u8,
            a,
        )
    }

    // ── Frames ─────────────────────────────────────────────────

    pub fn panel_frame() -> egui::Frame {
        egui::Frame::none()
            .fill(Self::bg1())
            .inner_margin(egui::Margin::same(Self::SPACE_SM))
    }

    /// Frame around one filter row. Disabled filters are dimmed.
    pub fn row_frame(active: bool, mask: bool) -> egui::Frame {
        let stroke = if mask {
            Stroke::new(1.0, Self::with_alpha(Self::mask(), 120))
        } else {
            Stroke::new(Self::STROKE_SUBTLE, Self::divider())
        };
        egui::Frame::none()
            .fill(if active { Self::bg2() } else { Self::bg() })
            .stroke(stroke)
            .rounding(Rounding::same(Self::RADIUS))
            .inner_margin(egui::Margin::symmetric(Self::SPACE_SM, Self::SPACE_XS))
    }

    pub fn draw_separator(ui: &mut egui::Ui) {
        let width = ui.available_width();
        let (resp, painter) = ui.allocate_painter(Vec2::new(width, 1.0), egui::Sense::hover());
        painter.rect_filled(resp.rect, 0.0, Self::divider());
    }

    /// Apply the theme to an egui context.
    pub fn apply(ctx: &egui::Context) {
        let mut style = (*ctx.style()).clone();
        let visuals = &mut style.visuals;
        *visuals = egui::Visuals::dark();

        visuals.panel_fill = Self::bg1();
        visuals.window_fill = Self::bg2();
        visuals.extreme_bg_color = Self::bg();
        visuals.faint_bg_color = Self::bg2();

        visuals.widgets.inactive.bg_fill = Self::bg3();
        visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, Self::t2());
        visuals.widgets.inactive.rounding = Rounding::same(Self::RADIUS);
        visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, Self::t1());
        visuals.widgets.hovered.rounding = Rounding::same(Self::RADIUS);
        visuals.widgets.active.fg_stroke = Stroke::new(1.0, Self::accent());
        visuals.widgets.active.rounding = Rounding::same(Self::RADIUS);

        visuals.selection.stroke = Stroke::new(1.0, Self::accent());
        style.interaction.tooltip_delay = 0.4;

        ctx.set_style(style);
    }
}
