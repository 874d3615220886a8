//! Configuration tab: connection, SPICE kernels, log folder and adjustment.

use std::path::PathBuf;

use eframe::egui::{self, RichText};
use rfd::FileDialog;
use serde_json::Value;
use solys2tracker_control::MAX_ADJUSTMENT_STEP;
use solys2tracker_ephem::EphemerisProvider;
use solys2tracker_io::{KernelKind, SettingKey};

use super::theme::{
    accent, form_label, primary_button, secondary_button, section_header, stat_label,
    stat_value, ThemeColors,
};
use crate::app::Solys2TrackerApp;
use crate::state::ConfTab;

/// Adjustment value, or `?` before the first read.
fn adjustment_text(value: Option<f64>) -> String {
    value.map_or_else(|| "?".to_string(), |v| format!("{v:+.4}°"))
}

impl Solys2TrackerApp {
    pub(crate) fn render_conf_tab(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            for tab in ConfTab::ALL {
                ui.selectable_value(&mut self.ui_state.conf_tab, tab, tab.label());
            }
        });
        ui.separator();
        ui.add_space(6.0);
        match self.ui_state.conf_tab {
            ConfTab::Connection => self.render_connection(ui),
            ConfTab::Ephemeris => self.render_kernels(ui),
            ConfTab::Log => self.render_log_folder(ui),
            ConfTab::Adjust => self.render_adjust(ui),
        }
    }

    fn render_connection(&mut self, ui: &mut egui::Ui) {
        let busy = self.operation.is_connecting || self.operation.running.is_some();
        ui.label(section_header("Solys2 connection"));
        ui.add_space(4.0);
        egui::Grid::new("connection_form")
            .num_columns(2)
            .spacing([16.0, 6.0])
            .show(ui, |ui| {
                ui.label(form_label("IP"));
                ui.text_edit_singleline(&mut self.conf.ip);
                ui.end_row();
                ui.label(form_label("Port"));
                ui.add(egui::DragValue::new(&mut self.conf.port).range(1..=u16::MAX));
                ui.end_row();
                ui.label(form_label("Password"));
                ui.add(egui::TextEdit::singleline(&mut self.conf.password).password(true));
                ui.end_row();
            });
        ui.add_space(8.0);
        ui.horizontal(|ui| {
            let can_connect = !busy && !self.conf.ip.trim().is_empty();
            if ui.add_enabled(can_connect, primary_button("CONNECT")).clicked() {
                self.start_connect();
            }
            if self.operation.is_connecting {
                ui.spinner();
            }
        });
        if self.operation.running.is_some() {
            ui.label(stat_label("Stop the running operation to reconnect."));
        }
    }

    fn render_kernels(&mut self, ui: &mut egui::Ui) {
        let colors = ThemeColors::from_ui(ui);
        ui.label(section_header("SPICE kernels"));
        ui.add_space(4.0);

        let mut apply = None;
        ui.horizontal(|ui| {
            ui.label(form_label("Kernels path"));
            ui.text_edit_singleline(&mut self.conf.kernels_path);
            if ui.add(secondary_button(ui, "Browse...")).clicked() {
                if let Some(dir) = FileDialog::new().pick_folder() {
                    self.conf.kernels_path = dir.display().to_string();
                    apply = Some(dir);
                }
            }
            if ui.add(secondary_button(ui, "Apply")).clicked() {
                apply = Some(PathBuf::from(self.conf.kernels_path.trim()));
            }
        });
        if let Some(path) = apply {
            self.save_setting(
                SettingKey::KernelsPath,
                Value::from(path.display().to_string()),
            );
            self.status.kernels_path = path;
            self.reload_kernels();
        }

        ui.add_space(6.0);
        ui.horizontal(|ui| {
            ui.label(form_label("Observer height"));
            let response = ui.add(
                egui::DragValue::new(&mut self.conf.height)
                    .speed(1.0)
                    .range(-500.0..=9000.0)
                    .suffix(" m"),
            );
            if response.drag_stopped() || response.lost_focus() {
                self.save_setting(SettingKey::Height, Value::from(self.conf.height));
            }
        });

        ui.add_space(10.0);
        ui.label(stat_label(&format!("Ephemeris: {}", self.ephemeris.name())));
        match &self.kernels {
            Some(dir) if !dir.is_empty() => {
                egui::Grid::new("kernel_counts")
                    .num_columns(2)
                    .spacing([16.0, 4.0])
                    .show(ui, |ui| {
                        for kind in KernelKind::ALL {
                            ui.label(stat_label(kind.label()));
                            ui.label(stat_value(&dir.count(kind).to_string()));
                            ui.end_row();
                        }
                    });
                egui::ScrollArea::vertical()
                    .max_height(200.0)
                    .show(ui, |ui| {
                        for (_, path) in dir.files() {
                            let name = path
                                .strip_prefix(dir.root())
                                .unwrap_or(path.as_path())
                                .display()
                                .to_string();
                            ui.label(RichText::new(name).size(10.0).color(colors.text_muted));
                        }
                    });
            }
            _ => {
                ui.label(
                    RichText::new("No kernels found: using the built-in leap second table.")
                        .size(11.0)
                        .color(accent::AMBER),
                );
            }
        }
    }

    fn render_log_folder(&mut self, ui: &mut egui::Ui) {
        ui.label(section_header("Session logs"));
        ui.add_space(4.0);
        let mut apply = None;
        ui.horizontal(|ui| {
            ui.label(form_label("Log folder"));
            ui.text_edit_singleline(&mut self.conf.logfolder);
            if ui.add(secondary_button(ui, "Browse...")).clicked() {
                if let Some(dir) = FileDialog::new().pick_folder() {
                    self.conf.logfolder = dir.display().to_string();
                    apply = Some(dir);
                }
            }
            if ui.add(secondary_button(ui, "Apply")).clicked() {
                apply = Some(PathBuf::from(self.conf.logfolder.trim()));
            }
        });
        if let Some(path) = apply {
            self.save_setting(
                SettingKey::Logfolder,
                Value::from(path.display().to_string()),
            );
            self.status.logfolder = path;
        }
        ui.add_space(4.0);
        ui.label(stat_label(&format!(
            "Every operation writes a CSV file in {}.",
            self.status.logfolder.display()
        )));
        ui.label(stat_label(&format!(
            "Settings are stored in {}.",
            self.store.path().display()
        )));
    }

    fn render_adjust(&mut self, ui: &mut egui::Ui) {
        ui.label(section_header("Instrument adjustment"));
        ui.add_space(4.0);
        let connected = self.status.is_connected();
        let idle = !self.operation.is_adjusting && self.operation.running.is_none();
        egui::Grid::new("adjust_current")
            .num_columns(2)
            .spacing([16.0, 6.0])
            .show(ui, |ui| {
                let current = self.conf.current_adjustment;
                ui.label(form_label("Azimuth"));
                ui.label(stat_value(&adjustment_text(current.map(|c| c.azimuth))));
                ui.end_row();
                ui.label(form_label("Zenith"));
                ui.label(stat_value(&adjustment_text(current.map(|c| c.zenith))));
                ui.end_row();
            });
        ui.add_space(8.0);
        ui.label(section_header("Add adjustments"));
        ui.add_space(4.0);
        let bound = -MAX_ADJUSTMENT_STEP..=MAX_ADJUSTMENT_STEP;
        egui::Grid::new("adjust_form")
            .num_columns(2)
            .spacing([16.0, 6.0])
            .show(ui, |ui| {
                ui.label(form_label("Azimuth"));
                ui.add(
                    egui::DragValue::new(&mut self.conf.add_azimuth)
                        .range(bound.clone())
                        .speed(0.001)
                        .max_decimals(4)
                        .suffix("°"),
                );
                ui.end_row();
                ui.label(form_label("Zenith"));
                ui.add(
                    egui::DragValue::new(&mut self.conf.add_zenith)
                        .range(bound)
                        .speed(0.001)
                        .max_decimals(4)
                        .suffix("°"),
                );
                ui.end_row();
            });
        ui.add_space(8.0);
        ui.horizontal(|ui| {
            if ui
                .add_enabled(connected && idle, secondary_button(ui, "READ"))
                .clicked()
            {
                self.start_read_adjustment();
            }
            if ui
                .add_enabled(connected && idle, primary_button("SEND"))
                .clicked()
            {
                self.start_send_adjustment();
            }
            if self.operation.is_adjusting {
                ui.spinner();
            }
        });
        if !connected {
            ui.label(RichText::new("Not connected").size(11.0).color(accent::RED));
        }
    }
}
