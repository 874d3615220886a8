//! Top bar: branding, tabs and connection indicator.

use eframe::egui::{self, RichText};

use super::theme::{accent, ThemeColors};
use crate::app::Solys2TrackerApp;
use crate::state::Tab;

impl Solys2TrackerApp {
    pub(crate) fn render_top_panel(&mut self, ctx: &egui::Context) {
        let colors = ThemeColors::from_ctx(ctx);

        egui::TopBottomPanel::top("top_bar")
            .frame(
                egui::Frame::none()
                    .fill(colors.bg_header)
                    .inner_margin(egui::Margin {
                        left: 16.0,
                        right: 16.0,
                        top: 8.0,
                        bottom: 8.0,
                    }),
            )
            .show(ctx, |ui| {
                ui.set_min_height(32.0);
                ui.with_layout(egui::Layout::left_to_right(egui::Align::Center), |ui| {
                    ui.spacing_mut().item_spacing = egui::vec2(10.0, 0.0);
                    ui.label(
                        RichText::new("SOLYS2TRACKER")
                            .size(14.0)
                            .strong()
                            .color(accent::BLUE),
                    );
                    ui.separator();
                    for tab in Tab::ALL {
                        let label = RichText::new(tab.label()).strong();
                        ui.selectable_value(&mut self.ui_state.tab, tab, label);
                    }
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        self.render_connection_indicator(ui, colors);
                    });
                });
            });
    }

    fn render_connection_indicator(&self, ui: &mut egui::Ui, colors: ThemeColors) {
        let (text, color) = if self.operation.is_connecting {
            ("CONNECTING", accent::AMBER)
        } else if self.status.is_connected() {
            ("CONNECTED", accent::GREEN)
        } else {
            ("DISCONNECTED", accent::RED)
        };
        ui.label(RichText::new(text).size(11.0).strong().color(color));
        let address = self.status.params().address();
        ui.label(RichText::new(address).size(11.0).color(colors.text_muted));
        if let Some((body, kind)) = self.operation.running {
            let body_color = match body {
                solys2tracker_core::Body::Sun => accent::SUN,
                solys2tracker_core::Body::Moon => accent::MOON,
            };
            ui.label(
                RichText::new(format!("{kind} {body}").to_uppercase())
                    .size(11.0)
                    .color(body_color),
            );
        }
    }
}
