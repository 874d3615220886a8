//! Application theme and color definitions.
//!
//! Light and dark palettes with monospace fonts, following the system
//! preference.

use eframe::egui::{
    self, style::WidgetVisuals, Color32, FontFamily, FontId, Rounding, Stroke, TextStyle, Visuals,
};

/// Color palette for the dark theme.
pub mod dark {
    use eframe::egui::Color32;

    pub const BG_DARK: Color32 = Color32::from_rgb(0x1a, 0x1a, 0x1a);
    pub const BG_PANEL: Color32 = Color32::from_rgb(0x1f, 0x1f, 0x1f);
    pub const BG_HEADER: Color32 = Color32::from_rgb(0x25, 0x25, 0x25);
    pub const BG_INPUT: Color32 = Color32::from_rgb(0x2a, 0x2a, 0x2a);

    pub const BORDER: Color32 = Color32::from_rgb(0x33, 0x33, 0x33);
    pub const BORDER_LIGHT: Color32 = Color32::from_rgb(0x44, 0x44, 0x44);

    pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(0xe0, 0xe0, 0xe0);
    pub const TEXT_MUTED: Color32 = Color32::from_rgb(0x88, 0x88, 0x88);

    pub const BUTTON_BG: Color32 = Color32::from_rgb(0x33, 0x33, 0x33);
    pub const BUTTON_HOVER: Color32 = Color32::from_rgb(0x3a, 0x3a, 0x3a);
}

/// Color palette for the light theme.
pub mod light {
    use eframe::egui::Color32;

    pub const BG_DARK: Color32 = Color32::from_rgb(0xf5, 0xf5, 0xf5);
    pub const BG_PANEL: Color32 = Color32::from_rgb(0xff, 0xff, 0xff);
    pub const BG_HEADER: Color32 = Color32::from_rgb(0xfa, 0xfa, 0xfa);
    pub const BG_INPUT: Color32 = Color32::from_rgb(0xf0, 0xf0, 0xf0);

    pub const BORDER: Color32 = Color32::from_rgb(0xd0, 0xd0, 0xd0);
    pub const BORDER_LIGHT: Color32 = Color32::from_rgb(0xc0, 0xc0, 0xc0);

    pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(0x1a, 0x1a, 0x1a);
    pub const TEXT_MUTED: Color32 = Color32::from_rgb(0x66, 0x66, 0x66);

    pub const BUTTON_BG: Color32 = Color32::from_rgb(0xe8, 0xe8, 0xe8);
    pub const BUTTON_HOVER: Color32 = Color32::from_rgb(0xdd, 0xdd, 0xdd);
}

/// Accent colors shared by both themes.
pub mod accent {
    use eframe::egui::Color32;

    pub const BLUE: Color32 = Color32::from_rgb(0x4a, 0x9e, 0xff);
    pub const GREEN: Color32 = Color32::from_rgb(0x10, 0xb9, 0x81);
    pub const RED: Color32 = Color32::from_rgb(0xef, 0x44, 0x44);
    pub const AMBER: Color32 = Color32::from_rgb(0xf5, 0x9e, 0x0b);
    /// Sun body color.
    pub const SUN: Color32 = Color32::from_rgb(0xff, 0xb3, 0x00);
    /// Moon body color.
    pub const MOON: Color32 = Color32::from_rgb(0xa0, 0xb4, 0xd0);
}

/// Theme-aware color accessor.
#[derive(Clone, Copy)]
pub struct ThemeColors {
    pub bg_dark: Color32,
    pub bg_panel: Color32,
    pub bg_header: Color32,
    pub bg_input: Color32,
    pub border: Color32,
    pub border_light: Color32,
    pub text_primary: Color32,
    pub text_muted: Color32,
    pub button_bg: Color32,
    pub button_hover: Color32,
}

impl ThemeColors {
    pub fn from_ctx(ctx: &egui::Context) -> Self {
        Self::from_dark_mode(ctx.style().visuals.dark_mode)
    }

    pub fn from_ui(ui: &egui::Ui) -> Self {
        Self::from_dark_mode(ui.visuals().dark_mode)
    }

    pub fn from_dark_mode(is_dark: bool) -> Self {
        if is_dark {
            Self {
                bg_dark: dark::BG_DARK,
                bg_panel: dark::BG_PANEL,
                bg_header: dark::BG_HEADER,
                bg_input: dark::BG_INPUT,
                border: dark::BORDER,
                border_light: dark::BORDER_LIGHT,
                text_primary: dark::TEXT_PRIMARY,
                text_muted: dark::TEXT_MUTED,
                button_bg: dark::BUTTON_BG,
                button_hover: dark::BUTTON_HOVER,
            }
        } else {
            Self {
                bg_dark: light::BG_DARK,
                bg_panel: light::BG_PANEL,
                bg_header: light::BG_HEADER,
                bg_input: light::BG_INPUT,
                border: light::BORDER,
                border_light: light::BORDER_LIGHT,
                text_primary: light::TEXT_PRIMARY,
                text_muted: light::TEXT_MUTED,
                button_bg: light::BUTTON_BG,
                button_hover: light::BUTTON_HOVER,
            }
        }
    }
}

fn set_widget(widget: &mut WidgetVisuals, fill: Color32, fg: Color32, stroke: Color32) {
    widget.bg_fill = fill;
    widget.fg_stroke = Stroke::new(1.0, fg);
    widget.bg_stroke = Stroke::new(1.0, stroke);
    widget.rounding = Rounding::same(4.0);
}

fn build_visuals(is_dark: bool) -> Visuals {
    let c = ThemeColors::from_dark_mode(is_dark);
    let mut visuals = if is_dark {
        Visuals::dark()
    } else {
        Visuals::light()
    };

    visuals.window_fill = c.bg_panel;
    visuals.panel_fill = c.bg_panel;
    visuals.faint_bg_color = c.bg_dark;
    visuals.extreme_bg_color = c.bg_input;

    let w = &mut visuals.widgets;
    set_widget(&mut w.noninteractive, c.bg_input, c.text_muted, c.border);
    set_widget(&mut w.inactive, c.bg_input, c.text_primary, c.border_light);
    set_widget(&mut w.hovered, c.button_hover, c.text_primary, accent::BLUE);
    set_widget(&mut w.active, accent::BLUE, Color32::WHITE, accent::BLUE);
    set_widget(&mut w.open, c.bg_input, c.text_primary, c.border_light);

    visuals.selection.bg_fill = accent::BLUE.gamma_multiply(if is_dark { 0.3 } else { 0.2 });
    visuals.selection.stroke = Stroke::new(1.0, accent::BLUE);
    visuals
}

/// Configure egui style for the current dark/light mode.
pub fn configure_style(ctx: &egui::Context) {
    ctx.set_visuals(build_visuals(ctx.style().visuals.dark_mode));

    let mut style = (*ctx.style()).clone();
    style.text_styles = [
        (TextStyle::Small, FontId::new(10.0, FontFamily::Monospace)),
        (TextStyle::Body, FontId::new(12.0, FontFamily::Monospace)),
        (TextStyle::Button, FontId::new(12.0, FontFamily::Monospace)),
        (TextStyle::Heading, FontId::new(14.0, FontFamily::Monospace)),
        (
            TextStyle::Monospace,
            FontId::new(12.0, FontFamily::Monospace),
        ),
    ]
    .into();
    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    style.spacing.button_padding = egui::vec2(10.0, 6.0);
    style.spacing.indent = 16.0;
    ctx.set_style(style);
}

/// Start action button.
pub fn primary_button(text: &str) -> egui::Button<'_> {
    egui::Button::new(egui::RichText::new(text).color(Color32::WHITE))
        .fill(accent::GREEN)
        .rounding(Rounding::same(4.0))
}

/// Stop action button.
pub fn danger_button(text: &str) -> egui::Button<'_> {
    egui::Button::new(egui::RichText::new(text).color(Color32::WHITE))
        .fill(accent::RED)
        .rounding(Rounding::same(4.0))
}

/// Secondary/ghost button (theme-aware).
pub fn secondary_button<'a>(ui: &egui::Ui, text: &'a str) -> egui::Button<'a> {
    let colors = ThemeColors::from_ui(ui);
    egui::Button::new(egui::RichText::new(text).color(colors.text_primary))
        .fill(colors.button_bg)
        .stroke(Stroke::new(1.0, colors.border_light))
        .rounding(Rounding::same(4.0))
}

pub fn section_header(text: &str) -> egui::RichText {
    egui::RichText::new(text.to_uppercase()).size(11.0).strong()
}

pub fn form_label(text: &str) -> egui::RichText {
    egui::RichText::new(text.to_uppercase()).size(10.0)
}

pub fn stat_label(text: &str) -> egui::RichText {
    egui::RichText::new(text).size(11.0).weak()
}

pub fn stat_value(text: &str) -> egui::RichText {
    egui::RichText::new(text).size(11.0)
}

/// Highlighted stat value, e.g. the suggested drift.
pub fn stat_value_highlight(text: &str) -> egui::RichText {
    egui::RichText::new(text)
        .size(11.0)
        .color(accent::GREEN)
        .strong()
}

static LAST_DARK_MODE: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);
static THEME_INITIALIZED: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(false);

/// Re-applies the styling when the system switches between dark and light.
/// Called once per frame.
pub fn apply_system_theme(ctx: &egui::Context) {
    use std::sync::atomic::Ordering;

    let is_dark = ctx.style().visuals.dark_mode;
    let was_initialized = THEME_INITIALIZED.swap(true, Ordering::Relaxed);
    let last_dark = LAST_DARK_MODE.swap(is_dark, Ordering::Relaxed);
    if !was_initialized || last_dark != is_dark {
        configure_style(ctx);
    }
}
