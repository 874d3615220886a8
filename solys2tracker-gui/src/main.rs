//! Solys2Tracker GUI application entry point.
//!
//! An optional first argument overrides the SPICE kernels directory.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod message;
mod pipeline;
mod state;
mod ui;
mod util;
mod viewer;

use std::path::PathBuf;

use anyhow::Context;
use app::Solys2TrackerApp;
use eframe::egui;
use solys2tracker_io::SettingsStore;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let kernels_override = std::env::args_os().nth(1).map(PathBuf::from);
    let store = SettingsStore::open_default().context("cannot locate the settings directory")?;
    let app = Solys2TrackerApp::new(store, kernels_override);

    let opts = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([960.0, 720.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Solys2Tracker",
        opts,
        Box::new(move |cc| {
            ui::theme::configure_style(&cc.egui_ctx);
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow::anyhow!("GUI failed: {e}"))
}
