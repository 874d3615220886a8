//! Analysis results window: Cross profiles, Mesh heat map or a spectrum.

use eframe::egui::{self, Color32, RichText};
use egui_plot::{
    Legend, Line, MarkerShape, Plot, PlotImage, PlotPoint, PlotPoints, Points, VLine,
};
use solys2tracker_core::{
    CrossProfile, MeshGrid, NextStep, Spectrum, DETECTOR_BANDS, DETECTOR_COUNT,
};

use super::theme::{
    accent, primary_button, section_header, stat_label, stat_value, stat_value_highlight,
};
use crate::app::Solys2TrackerApp;
use crate::pipeline::AnalysisData;
use crate::util::{f64_to_f32, usize_to_f64};
use crate::viewer::{grid_image, Colormap};

const DETECTOR_NAMES: [&str; DETECTOR_COUNT] = ["VNIR", "SWIR1", "SWIR2"];

fn zip_points(xs: &[f64], ys: &[f64]) -> Vec<[f64; 2]> {
    xs.iter().zip(ys).map(|(&x, &y)| [x, y]).collect()
}

fn render_cross_plot(ui: &mut egui::Ui, profile: &CrossProfile, detector: usize, normalize: bool) {
    let (az, ze) = if normalize {
        profile.normalized(detector, None)
    } else {
        (
            profile.azimuth[detector].clone(),
            profile.zenith[detector].clone(),
        )
    };
    let peak = profile.detector_peak(detector);
    Plot::new("cross_plot")
        .legend(Legend::default())
        .x_axis_label("Offset (°)")
        .y_axis_label(if normalize { "Normalised signal" } else { "Signal" })
        .height(300.0)
        .show(ui, |plot_ui| {
            let az_points = zip_points(&profile.offsets, &az);
            let ze_points = zip_points(&profile.offsets, &ze);
            plot_ui.line(
                Line::new(PlotPoints::new(az_points.clone()))
                    .color(accent::BLUE)
                    .name("Azimuth"),
            );
            plot_ui.points(
                Points::new(PlotPoints::new(az_points))
                    .color(accent::BLUE)
                    .radius(3.0),
            );
            plot_ui.line(
                Line::new(PlotPoints::new(ze_points.clone()))
                    .color(accent::AMBER)
                    .name("Zenith"),
            );
            plot_ui.points(
                Points::new(PlotPoints::new(ze_points))
                    .color(accent::AMBER)
                    .radius(3.0),
            );
            if let Some(peak) = peak {
                plot_ui.vline(VLine::new(peak.azimuth).color(accent::BLUE).width(1.0));
                plot_ui.vline(VLine::new(peak.zenith).color(accent::AMBER).width(1.0));
            }
        });
}

fn render_mesh_plot(
    ui: &mut egui::Ui,
    grid: &MeshGrid,
    detector: usize,
    texture: &egui::TextureHandle,
) {
    let n = grid.size();
    let (first, last) = match (grid.offsets.first(), grid.offsets.last()) {
        (Some(&a), Some(&b)) => (a, b),
        _ => return,
    };
    let cell = if n > 1 {
        (last - first) / usize_to_f64(n - 1)
    } else {
        1.0
    };
    let side = f64_to_f32(last - first + cell);
    let center = PlotPoint::new((first + last) / 2.0, (first + last) / 2.0);
    let peak = grid.detector_peak(detector);
    Plot::new("mesh_plot")
        .x_axis_label("Zenith offset (°)")
        .y_axis_label("Azimuth offset (°)")
        .data_aspect(1.0)
        .height(320.0)
        .show(ui, |plot_ui| {
            plot_ui.image(PlotImage::new(texture, center, [side, side]));
            if let Some(peak) = peak {
                plot_ui.points(
                    Points::new(PlotPoints::new(vec![[peak.zenith, peak.azimuth]]))
                        .shape(MarkerShape::Cross)
                        .radius(8.0)
                        .color(Color32::WHITE)
                        .name("Peak"),
                );
            }
        });
}

fn render_spectrum_plot(ui: &mut egui::Ui, spectrum: &Spectrum) {
    Plot::new("spectrum_plot")
        .x_axis_label("Wavelength (nm)")
        .y_axis_label("Value")
        .height(300.0)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::new(zip_points(
                    &spectrum.wavelengths,
                    &spectrum.values,
                )))
                .color(accent::BLUE),
            );
            for (lo, hi) in DETECTOR_BANDS {
                plot_ui.vline(VLine::new((lo + hi) / 2.0).color(accent::GREEN).width(1.0));
            }
        });
}

fn render_next_step(ui: &mut egui::Ui, next: Option<&NextStep>) -> bool {
    let Some(next) = next else {
        ui.label(RichText::new("No peak found in the captures.").color(accent::RED));
        return false;
    };
    egui::Grid::new("next_step")
        .num_columns(2)
        .spacing([16.0, 4.0])
        .show(ui, |ui| {
            ui.label(stat_label("Peak"));
            ui.label(stat_value(&format!(
                "az {:+.4}°  ze {:+.4}°",
                next.peak.azimuth, next.peak.zenith
            )));
            ui.end_row();
            ui.label(stat_label("Suggested drift"));
            ui.label(stat_value_highlight(&format!(
                "az {:+.4}°  ze {:+.4}°",
                next.suggested_drift.azimuth, next.suggested_drift.zenith
            )));
            ui.end_row();
        });
    ui.label(stat_label(&next.message()));
    ui.add(primary_button("USE SUGGESTED DRIFT")).clicked()
}

impl Solys2TrackerApp {
    /// Rebuilds the mesh texture when the detector or colormap changed.
    fn ensure_mesh_texture(&mut self, ctx: &egui::Context) {
        let Some(AnalysisData::Mesh(grid)) = self.analysis.as_ref().map(|r| &r.data) else {
            self.mesh_texture = None;
            return;
        };
        let key = (self.ui_state.detector, self.colormap);
        if self.mesh_texture.as_ref().is_some_and(|(k, _)| *k == key) {
            return;
        }
        let image = grid_image(&grid.grids[key.0], key.1);
        let texture = ctx.load_texture("mesh_heatmap", image, egui::TextureOptions::NEAREST);
        self.mesh_texture = Some((key, texture));
    }

    pub(crate) fn render_results_window(&mut self, ctx: &egui::Context) {
        if !self.ui_state.show_results || self.analysis.is_none() {
            return;
        }
        self.ensure_mesh_texture(ctx);

        let mut open = true;
        let mut use_drift = false;
        let analysis = self.analysis.as_ref();
        let title = analysis.map_or_else(String::new, |r| {
            format!("{} analysis: {}", r.request.kind, r.request.body)
        });

        egui::Window::new(title)
            .id(egui::Id::new("results_window"))
            .open(&mut open)
            .default_width(560.0)
            .show(ctx, |ui| {
                let Some(result) = analysis else {
                    return;
                };
                ui.label(stat_label(&format!(
                    "{} file(s) from {}",
                    result.files,
                    result.request.path.display()
                )));
                ui.add_space(4.0);

                if !matches!(result.data, AnalysisData::Spectrum(_)) {
                    ui.horizontal(|ui| {
                        for (d, name) in DETECTOR_NAMES.iter().enumerate() {
                            ui.selectable_value(&mut self.ui_state.detector, d, *name);
                        }
                        ui.separator();
                        match result.data {
                            AnalysisData::Cross(_) => {
                                ui.checkbox(&mut self.ui_state.normalize, "Normalise");
                            }
                            _ => {
                                for cmap in Colormap::ALL {
                                    ui.selectable_value(&mut self.colormap, cmap, cmap.to_string());
                                }
                            }
                        }
                    });
                }

                match &result.data {
                    AnalysisData::Cross(profile) => render_cross_plot(
                        ui,
                        profile,
                        self.ui_state.detector,
                        self.ui_state.normalize,
                    ),
                    AnalysisData::Mesh(grid) => {
                        if let Some((_, texture)) = &self.mesh_texture {
                            render_mesh_plot(ui, grid, self.ui_state.detector, texture);
                        }
                    }
                    AnalysisData::Spectrum(spectrum) => render_spectrum_plot(ui, spectrum),
                }

                if !matches!(result.data, AnalysisData::Spectrum(_)) {
                    ui.add_space(6.0);
                    ui.label(section_header("Next step"));
                    use_drift = render_next_step(ui, result.next_step.as_ref());
                }
            });

        if use_drift {
            if let Some(result) = &self.analysis {
                if let Some(next) = result.next_step {
                    let body = result.request.body;
                    self.form_mut(body).set_drift(next.suggested_drift);
                    self.operation.status_text = format!("{body} drift updated");
                }
            }
        }
        self.ui_state.show_results = open;
    }
}
