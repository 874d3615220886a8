//! Capture analysis worker.
//!
//! Loads a folder of ASD exports (or a single export), reduces every
//! capture to its detector means and reshapes them into a Cross profile or a
//! Mesh grid.

use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::time::Instant;

use anyhow::Context;
use log::info;
use solys2tracker_core::{
    BandMeans, Body, CrossProfile, MeshGrid, NextStep, Offset, Spectrum,
};
use solys2tracker_io::{read_asd, read_capture_folder};

use crate::message::AppMessage;

/// What to analyse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisKind {
    Cross,
    Mesh,
    Spectrum,
}

impl std::fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisKind::Cross => write!(f, "Cross"),
            AnalysisKind::Mesh => write!(f, "Mesh"),
            AnalysisKind::Spectrum => write!(f, "Spectrum"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub body: Body,
    pub kind: AnalysisKind,
    /// Capture folder, or the export file for [`AnalysisKind::Spectrum`].
    pub path: PathBuf,
    /// Half-width of the analysed sweep in degrees.
    pub range: f64,
    /// Drift the analysed sweep was run with.
    pub drift: Offset,
}

#[derive(Debug, Clone)]
pub enum AnalysisData {
    Cross(CrossProfile),
    Mesh(MeshGrid),
    Spectrum(Spectrum),
}

#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub request: AnalysisRequest,
    pub files: usize,
    pub data: AnalysisData,
    pub next_step: Option<NextStep>,
}

/// Runs the analysis described by `request`.
pub fn analyse(request: AnalysisRequest) -> anyhow::Result<AnalysisResult> {
    let start = Instant::now();
    let (files, data, next_step) = if request.kind == AnalysisKind::Spectrum {
        let spectrum = read_asd(&request.path)
            .with_context(|| format!("cannot read {}", request.path.display()))?;
        (1, AnalysisData::Spectrum(spectrum), None)
    } else {
        let captures = read_capture_folder(&request.path)
            .with_context(|| format!("cannot load captures from {}", request.path.display()))?;
        let means: Vec<BandMeans> = captures.iter().map(|c| c.band_means()).collect();
        if request.kind == AnalysisKind::Cross {
            let profile = CrossProfile::from_measurements(&means, request.range)
                .context("captures do not form a Cross sweep")?;
            let next = profile.next_step(request.drift);
            (captures.len(), AnalysisData::Cross(profile), next)
        } else {
            let grid = MeshGrid::from_measurements(&means, request.range)
                .context("captures do not form a Mesh sweep")?;
            let next = grid.next_step(request.drift);
            (captures.len(), AnalysisData::Mesh(grid), next)
        }
    };
    info!(
        "{} analysis of {} files in {:.0?}",
        request.kind,
        files,
        start.elapsed()
    );
    Ok(AnalysisResult {
        request,
        files,
        data,
        next_step,
    })
}

/// Runs [`analyse`] and reports the outcome to the UI thread.
pub fn run_analysis_worker(request: AnalysisRequest, tx: &Sender<AppMessage>) {
    let message = match analyse(request) {
        Ok(result) => AppMessage::AnalysisComplete(Box::new(result)),
        Err(e) => AppMessage::AnalysisError(format!("{e:#}")),
    };
    let _ = tx.send(message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Write;
    use tempfile::TempDir;

    fn write_capture(dir: &TempDir, index: usize, level: f64) {
        let mut text = String::from("ASD\nh2\nh3\nWavelength\tValue\n");
        for wl in [550, 1640, 2200] {
            let _ = writeln!(text, "{wl}\t{}", format!("{level}").replace('.', ","));
        }
        std::fs::write(dir.path().join(format!("capture{index:03}.asd.txt")), text).unwrap();
    }

    fn request(dir: &TempDir, kind: AnalysisKind) -> AnalysisRequest {
        AnalysisRequest {
            body: Body::Moon,
            kind,
            path: dir.path().to_path_buf(),
            range: 1.0,
            drift: Offset::ZERO,
        }
    }

    #[test]
    fn test_cross_folder() {
        let dir = TempDir::new().unwrap();
        let levels = [1.0, 5.0, 1.0, 1.0, 5.0, 1.0];
        for (i, level) in levels.iter().enumerate() {
            write_capture(&dir, i, *level);
        }
        let result = analyse(request(&dir, AnalysisKind::Cross)).unwrap();
        assert_eq!(result.files, 6);
        assert!(matches!(result.data, AnalysisData::Cross(_)));
        let next = result.next_step.unwrap();
        assert!(next.peak.azimuth.abs() < 1e-9);
        assert!(next.peak.zenith.abs() < 1e-9);
    }

    #[test]
    fn test_mesh_needs_square_count() {
        let dir = TempDir::new().unwrap();
        for i in 0..5 {
            write_capture(&dir, i, 1.0);
        }
        let err = analyse(request(&dir, AnalysisKind::Mesh)).unwrap_err();
        assert!(format!("{err:#}").contains("Mesh"));
    }

    #[test]
    fn test_worker_reports_missing_folder() {
        let dir = TempDir::new().unwrap();
        let mut req = request(&dir, AnalysisKind::Cross);
        req.path = dir.path().join("missing");
        let (tx, rx) = std::sync::mpsc::channel();
        run_analysis_worker(req, &tx);
        assert!(matches!(rx.recv().unwrap(), AppMessage::AnalysisError(_)));
    }
}
