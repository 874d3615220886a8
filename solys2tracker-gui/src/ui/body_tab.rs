//! Sun and Moon tabs: operation forms, live position and analysis.

use std::ops::RangeInclusive;

use eframe::egui::{self, RichText};
use rfd::FileDialog;
use solys2tracker_core::Body;
use solys2tracker_ephem::EphemerisProvider;

use super::theme::{
    accent, danger_button, form_label, primary_button, secondary_button, section_header,
    stat_label, stat_value, ThemeColors,
};
use crate::app::Solys2TrackerApp;
use crate::pipeline::AnalysisKind;
use crate::state::{BodyForm, OperationKind};
use crate::util::format_duration;

/// What the user asked for while rendering the tab.
enum BodyAction {
    Start,
    Stop,
    Analyse(AnalysisKind),
}

fn drag(
    ui: &mut egui::Ui,
    value: &mut f64,
    speed: f64,
    range: RangeInclusive<f64>,
    suffix: &str,
) {
    ui.add(
        egui::DragValue::new(value)
            .speed(speed)
            .range(range)
            .max_decimals(4)
            .suffix(suffix),
    );
}

fn render_form(ui: &mut egui::Ui, form: &mut BodyForm, editable: bool) {
    ui.add_enabled_ui(editable, |ui| {
        ui.horizontal(|ui| {
            ui.label(form_label("Mode"));
            for kind in OperationKind::ALL {
                ui.selectable_value(&mut form.kind, kind, kind.to_string());
            }
        });
        ui.add_space(6.0);
        egui::Grid::new("body_form")
            .num_columns(2)
            .spacing([16.0, 6.0])
            .show(ui, |ui| {
                if form.kind == OperationKind::Track {
                    ui.label(form_label("Interval"));
                    drag(ui, &mut form.interval, 0.5, 1.0..=3600.0, " s");
                    ui.end_row();
                } else {
                    ui.label(form_label("Range"));
                    drag(ui, &mut form.range, 0.01, 0.01..=10.0, "°");
                    ui.end_row();
                    ui.label(form_label("Step"));
                    drag(ui, &mut form.step, 0.01, 0.001..=10.0, "°");
                    ui.end_row();
                    ui.label(form_label("Countdown"));
                    drag(ui, &mut form.countdown, 0.5, 0.0..=600.0, " s");
                    ui.end_row();
                    ui.label(form_label("Rest"));
                    drag(ui, &mut form.rest, 0.5, 0.0..=600.0, " s");
                    ui.end_row();
                }
                ui.label(form_label("Drift azimuth"));
                drag(ui, &mut form.drift_azimuth, 0.001, -10.0..=10.0, "°");
                ui.end_row();
                ui.label(form_label("Drift zenith"));
                drag(ui, &mut form.drift_zenith, 0.001, -10.0..=10.0, "°");
                ui.end_row();
            });
    });
}

impl Solys2TrackerApp {
    pub(crate) fn render_body_tab(&mut self, ui: &mut egui::Ui, body: Body) {
        let colors = ThemeColors::from_ui(ui);
        let running_here = self.operation.is_running(body);
        let can_start = self.operation.running.is_none() && self.status.is_connected();
        let mut action = None;

        ui.columns(2, |cols| {
            let ui = &mut cols[0];
            ui.label(section_header(&format!("{body} operation")));
            ui.add_space(4.0);
            let editable = !running_here;
            render_form(ui, self.form_mut(body), editable);
            ui.add_space(6.0);

            let form = self.form(body);
            if let Some(kind) = form.kind.sweep_kind() {
                if let Ok(plan) = form.sweep_plan(body) {
                    ui.label(stat_label(&format!(
                        "{} points, at least {}",
                        plan.total_points(kind),
                        format_duration(plan.estimated_duration(kind))
                    )));
                }
            }
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if running_here {
                    if ui.add(danger_button("STOP")).clicked() {
                        action = Some(BodyAction::Stop);
                    }
                } else if ui
                    .add_enabled(can_start, primary_button("START"))
                    .clicked()
                {
                    action = Some(BodyAction::Start);
                }
                if !self.status.is_connected() {
                    ui.label(
                        RichText::new("Not connected")
                            .size(11.0)
                            .color(accent::RED),
                    );
                }
            });

            let ui = &mut cols[1];
            ui.label(section_header("Position"));
            ui.add_space(4.0);
            self.render_live_position(ui, body, colors);
            ui.add_space(12.0);
            ui.label(section_header("Analysis"));
            ui.add_space(4.0);
            ui.label(stat_label(
                "Load the ASD exports of a sweep with the range and drift above.",
            ));
            ui.horizontal(|ui| {
                let idle = !self.operation.is_analysing;
                for kind in [AnalysisKind::Cross, AnalysisKind::Mesh, AnalysisKind::Spectrum] {
                    let label = format!("{kind}...");
                    if ui.add_enabled(idle, secondary_button(ui, &label)).clicked() {
                        action = Some(BodyAction::Analyse(kind));
                    }
                }
            });
        });

        match action {
            Some(BodyAction::Start) => self.start_operation(body),
            Some(BodyAction::Stop) => self.stop_operation(),
            Some(BodyAction::Analyse(kind)) => {
                let picked = match kind {
                    AnalysisKind::Spectrum => FileDialog::new().pick_file(),
                    AnalysisKind::Cross | AnalysisKind::Mesh => FileDialog::new().pick_folder(),
                };
                if let Some(path) = picked {
                    self.start_analysis(body, kind, path);
                }
            }
            None => {}
        }
    }

    /// Ephemeris in use and the last move of the running operation.
    fn render_live_position(&self, ui: &mut egui::Ui, body: Body, colors: ThemeColors) {
        egui::Grid::new("live_position")
            .num_columns(2)
            .spacing([16.0, 4.0])
            .show(ui, |ui| {
                ui.label(stat_label("Ephemeris"));
                ui.label(stat_value(self.ephemeris.name()));
                ui.end_row();

                if self.operation.is_running(body) {
                    if let Some(target) = self.operation.last_target {
                        ui.label(stat_label("Target"));
                        ui.label(stat_value(&format!(
                            "az {:.4}°  ze {:.4}°",
                            target.azimuth, target.zenith
                        )));
                        ui.end_row();
                    }
                    if let Some(measured) = self.operation.last_measured {
                        ui.label(stat_label("Instrument"));
                        ui.label(stat_value(&format!(
                            "az {:.4}°  ze {:.4}°",
                            measured.azimuth, measured.zenith
                        )));
                        ui.end_row();
                    }
                    if let Some((point, total)) = self.operation.point {
                        ui.label(stat_label("Point"));
                        ui.label(stat_value(&format!("{point} / {total}")));
                        ui.end_row();
                    }
                }
            });

        if !self.operation.is_running(body) {
            ui.label(
                RichText::new("Positions are shown while an operation runs.")
                    .size(10.0)
                    .color(colors.text_muted),
            );
        }
    }
}
