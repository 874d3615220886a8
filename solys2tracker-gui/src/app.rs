//! Main application state and update loop.
//!
//! Contains the `Solys2TrackerApp` struct which holds all application state
//! and implements the eframe update loop. Long operations run on worker
//! threads and report back through channels drained once per frame.

use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;
use std::time::Duration;

use eframe::egui;
use log::{info, warn};
use serde_json::Value;
use solys2tracker_control::{build_ephemeris, ControlEvent, EventSender, TrackerEphemeris};
use solys2tracker_core::{Body, SessionStatus};
use solys2tracker_io::{KernelDirectory, SettingKey, SettingsStore};

use crate::message::AppMessage;
use crate::pipeline::{
    connect_worker, operation_worker, read_adjustment_worker, run_analysis_worker,
    send_adjustment_worker, AnalysisKind, AnalysisRequest, AnalysisResult, OperationPlan,
};
use crate::state::{BodyForm, ConfForm, OperationState, UiState};
use crate::viewer::Colormap;

/// Main application state.
pub struct Solys2TrackerApp {
    pub(crate) store: SettingsStore,
    pub(crate) status: SessionStatus,
    pub(crate) conf: ConfForm,
    pub(crate) sun: BodyForm,
    pub(crate) moon: BodyForm,

    pub(crate) operation: OperationState,
    pub(crate) ui_state: UiState,

    /// Ephemeris used for the live position readout.
    pub(crate) ephemeris: TrackerEphemeris,
    pub(crate) kernels: Option<KernelDirectory>,

    pub(crate) analysis: Option<AnalysisResult>,
    /// Heat map of the selected detector, keyed by detector and colormap.
    pub(crate) mesh_texture: Option<((usize, Colormap), egui::TextureHandle)>,
    pub(crate) colormap: Colormap,

    pub(crate) rx: Receiver<AppMessage>,
    pub(crate) tx: Sender<AppMessage>,
}

impl Solys2TrackerApp {
    /// Builds the app from the persisted settings. `kernels_override` takes
    /// precedence over the stored kernels path for this run.
    pub fn new(store: SettingsStore, kernels_override: Option<PathBuf>) -> Self {
        let (tx, rx) = channel();
        let settings = store.load();
        let mut status = settings.session_status();
        if let Some(path) = kernels_override {
            info!("Using kernels from {}", path.display());
            status.kernels_path = path;
        }
        let conf = ConfForm::from_status(&status, &settings);
        let ephemeris = build_ephemeris(&status.kernels_path);
        let kernels = KernelDirectory::scan(&status.kernels_path).ok();
        Self {
            store,
            status,
            conf,
            sun: BodyForm::default(),
            moon: BodyForm::default(),
            operation: OperationState::default(),
            ui_state: UiState::default(),
            ephemeris,
            kernels,
            analysis: None,
            mesh_texture: None,
            colormap: Colormap::default(),
            rx,
            tx,
        }
    }

    pub(crate) fn form(&self, body: Body) -> &BodyForm {
        match body {
            Body::Sun => &self.sun,
            Body::Moon => &self.moon,
        }
    }

    pub(crate) fn form_mut(&mut self, body: Body) -> &mut BodyForm {
        match body {
            Body::Sun => &mut self.sun,
            Body::Moon => &mut self.moon,
        }
    }

    /// Persists one setting, reporting failures in the status bar.
    pub(crate) fn save_setting(&mut self, key: SettingKey, value: Value) {
        if let Err(e) = self.store.save_value(key, value) {
            warn!("Could not save {key}: {e}");
            self.operation.status_text = format!("Could not save {key}: {e}");
        }
    }

    /// Checks the connection with the parameters in the form.
    pub(crate) fn start_connect(&mut self) {
        let params = self.conf.params();
        self.status.set_params(params.clone());
        self.operation.is_connecting = true;
        self.operation.status_text = format!("Connecting to {}...", params.address());
        let tx = self.tx.clone();
        thread::spawn(move || connect_worker(&params, &tx));
    }

    pub(crate) fn start_read_adjustment(&mut self) {
        let params = self.status.params().clone();
        self.operation.is_adjusting = true;
        let tx = self.tx.clone();
        thread::spawn(move || read_adjustment_worker(&params, &tx));
    }

    pub(crate) fn start_send_adjustment(&mut self) {
        let params = self.status.params().clone();
        let step = self.conf.adjustment_step();
        self.operation.is_adjusting = true;
        let tx = self.tx.clone();
        thread::spawn(move || send_adjustment_worker(&params, step, &tx));
    }

    /// Starts the operation selected in the body tab.
    pub(crate) fn start_operation(&mut self, body: Body) {
        if self.operation.running.is_some() {
            return;
        }
        if !self.status.is_connected() {
            self.operation.status_text = "Connect to the Solys2 first".to_string();
            return;
        }
        let form = self.form(body);
        let kind = form.kind;
        let plan = match kind.sweep_kind() {
            None => form.track_plan(body).map(OperationPlan::Track),
            Some(sweep) => form.sweep_plan(body).map(|p| OperationPlan::Sweep(p, sweep)),
        };
        let plan = match plan {
            Ok(plan) => plan,
            Err(e) => {
                self.operation.status_text = format!("Invalid parameters: {e}");
                return;
            }
        };

        let (event_tx, event_rx) = channel();
        self.operation.begin(body, kind, event_rx);
        let events = EventSender::new(event_tx);
        let cancel = self.operation.cancel.clone();
        let status = self.status.clone();
        let height = self.conf.height;
        let tx = self.tx.clone();
        thread::spawn(move || operation_worker(&status, &plan, height, &events, &cancel, &tx));
    }

    pub(crate) fn stop_operation(&mut self) {
        if self.operation.running.is_some() {
            self.operation.cancel.cancel();
            self.operation.status_text = "Stopping...".to_string();
        }
    }

    /// Analyses a capture folder (or export file) with the body tab values.
    pub(crate) fn start_analysis(&mut self, body: Body, kind: AnalysisKind, path: PathBuf) {
        let form = self.form(body);
        let request = AnalysisRequest {
            body,
            kind,
            path,
            range: form.range,
            drift: form.drift(),
        };
        self.operation.is_analysing = true;
        self.operation.status_text = format!("Analysing {}...", request.path.display());
        let tx = self.tx.clone();
        thread::spawn(move || run_analysis_worker(request, &tx));
    }

    /// Reloads the ephemeris and the kernel listing after a path change.
    pub(crate) fn reload_kernels(&mut self) {
        self.ephemeris = build_ephemeris(&self.status.kernels_path);
        self.kernels = match KernelDirectory::scan(&self.status.kernels_path) {
            Ok(dir) => Some(dir),
            Err(e) => {
                warn!("Cannot list kernels: {e}");
                None
            }
        };
    }

    /// Drains worker messages and operation events.
    pub(crate) fn handle_messages(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            match msg {
                AppMessage::ConnectResult(outcome) => {
                    self.operation.is_connecting = false;
                    self.status.record_attempt(&outcome.params, outcome.success);
                    if outcome.success && outcome.params == *self.status.params() {
                        if let Err(e) = self.store.remember_connection(&outcome.params) {
                            warn!("Could not save the connection settings: {e}");
                        }
                    }
                    self.operation.push_log(outcome.message.clone(), !outcome.success);
                    self.operation.status_text = outcome.message;
                }
                AppMessage::AdjustmentLoaded(current) => {
                    self.operation.is_adjusting = false;
                    self.conf.adjustment_reported(current, false);
                    self.operation.status_text = "Adjustment loaded".to_string();
                }
                AppMessage::AdjustmentSent(current) => {
                    self.operation.is_adjusting = false;
                    self.conf.adjustment_reported(current, true);
                    self.operation.status_text = format!(
                        "Adjustment is now azimuth {:+.4}, zenith {:+.4}",
                        current.azimuth, current.zenith
                    );
                }
                AppMessage::AdjustError(e) => {
                    self.operation.is_adjusting = false;
                    self.operation.status_text = format!("Adjustment failed: {e}");
                    self.operation.push_log(e, true);
                }
                AppMessage::OperationComplete(summary) => {
                    self.drain_events();
                    self.operation.end();
                    if let Some(path) = summary.log_path {
                        self.operation
                            .push_log(format!("Session log: {}", path.display()), false);
                    }
                }
                AppMessage::OperationError(e) => {
                    self.drain_events();
                    self.operation.end();
                    self.operation.status_text = format!("Error: {e}");
                }
                AppMessage::AnalysisComplete(result) => {
                    self.operation.is_analysing = false;
                    self.operation.status_text = match &result.next_step {
                        Some(next) => next.message(),
                        None => format!("{} analysed: no peak found", result.request.kind),
                    };
                    self.mesh_texture = None;
                    self.analysis = Some(*result);
                    self.ui_state.show_results = true;
                }
                AppMessage::AnalysisError(e) => {
                    self.operation.is_analysing = false;
                    self.operation.status_text = format!("Analysis failed: {e}");
                    self.operation.push_log(e, true);
                }
            }
        }
        self.drain_events();
    }

    fn drain_events(&mut self) {
        let Some(rx) = &self.operation.events else {
            return;
        };
        let events: Vec<ControlEvent> = rx.try_iter().collect();
        for event in events {
            self.operation.apply_event(event);
        }
    }
}

impl eframe::App for Solys2TrackerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        crate::ui::theme::apply_system_theme(ctx);
        self.handle_messages();

        if self.operation.is_busy() {
            ctx.request_repaint_after(Duration::from_millis(100));
        } else {
            // live ephemeris readout
            ctx.request_repaint_after(Duration::from_secs(1));
        }

        self.render_top_panel(ctx);
        self.render_status_bar(ctx);
        egui::CentralPanel::default().show(ctx, |ui| match self.ui_state.tab.body() {
            Some(body) => self.render_body_tab(ui, body),
            None => self.render_conf_tab(ui),
        });
        self.render_results_window(ctx);
    }
}
