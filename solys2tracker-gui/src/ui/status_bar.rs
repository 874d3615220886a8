//! Bottom status bar with sweep progress and the event log.

use eframe::egui::{self, RichText};

use super::theme::{accent, ThemeColors};
use crate::app::Solys2TrackerApp;
use crate::util::format_duration;

impl Solys2TrackerApp {
    pub(crate) fn render_status_bar(&mut self, ctx: &egui::Context) {
        let colors = ThemeColors::from_ctx(ctx);

        egui::TopBottomPanel::bottom("status_bar")
            .frame(
                egui::Frame::none()
                    .fill(colors.bg_header)
                    .inner_margin(egui::Margin::symmetric(16.0, 6.0)),
            )
            .show(ctx, |ui| {
                egui::CollapsingHeader::new(RichText::new("Events").size(11.0))
                    .default_open(false)
                    .show(ui, |ui| {
                        egui::ScrollArea::vertical()
                            .max_height(140.0)
                            .stick_to_bottom(true)
                            .show(ui, |ui| {
                                for line in &self.operation.log {
                                    let color = if line.warning {
                                        accent::AMBER
                                    } else {
                                        colors.text_muted
                                    };
                                    ui.label(RichText::new(&line.text).size(10.0).color(color));
                                }
                            });
                    });

                ui.horizontal(|ui| {
                    if self.operation.is_busy() {
                        ui.spinner();
                    }
                    ui.label(
                        RichText::new(&self.operation.status_text)
                            .size(11.0)
                            .color(colors.text_primary),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if let Some(remaining) = self.operation.countdown {
                            ui.label(
                                RichText::new(format!("MEASURE {}", format_duration(remaining)))
                                    .size(11.0)
                                    .strong()
                                    .color(accent::GREEN),
                            );
                        }
                        let sweeping = self
                            .operation
                            .running
                            .is_some_and(|(_, kind)| kind.sweep_kind().is_some());
                        if sweeping {
                            ui.add(
                                egui::ProgressBar::new(self.operation.progress)
                                    .desired_width(180.0)
                                    .show_percentage(),
                            );
                        }
                    });
                });
            });
    }
}
