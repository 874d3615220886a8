//! Reading sweep capture folders into analysis profiles.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use approx::assert_relative_eq;
use solys2tracker_core::{BandMeans, CrossProfile, MeshGrid, Offset};
use solys2tracker_io::{read_capture_folder, Error};
use tempfile::TempDir;

/// Writes an ASD export whose three detector windows all read `value`.
fn write_capture(dir: &Path, name: &str, value: f64) {
    let mut text = String::from("ASD\nFieldSpec\n136 ms\nWavelength\tRadiance\n");
    for wavelength in [350.0, 550.0, 1640.0, 2200.0, 2500.0] {
        let inside = wavelength > 400.0 && wavelength < 2400.0;
        let v = if inside { value } else { -99.0 };
        let line = format!("{wavelength}\t{v}").replace('.', ",");
        writeln!(text, "{line}").unwrap();
    }
    fs::write(dir.join(name), text).unwrap();
}

fn means(folder: &Path) -> Vec<BandMeans> {
    read_capture_folder(folder)
        .unwrap()
        .iter()
        .map(solys2tracker_io::Capture::band_means)
        .collect()
}

#[test]
fn test_cross_folder_peak() {
    let dir = TempDir::new().unwrap();
    let azimuth = [1.0, 1.0, 4.0, 7.0, 4.0];
    let zenith = [1.0, 4.0, 7.0, 4.0, 1.0];
    for (i, v) in azimuth.iter().chain(&zenith).enumerate() {
        write_capture(dir.path(), &format!("cross_{i:02}.asd.txt"), *v);
    }
    fs::write(dir.path().join(".DS_Store"), "junk").unwrap();
    fs::create_dir(dir.path().join("plots")).unwrap();

    let means = means(dir.path());
    assert_eq!(means.len(), 10);
    assert_relative_eq!(means[3].detector(1), 7.0);

    let profile = CrossProfile::from_measurements(&means, 0.4).unwrap();
    assert_relative_eq!(profile.offsets[0], -0.4);
    assert_relative_eq!(profile.offsets[4], 0.4, epsilon = 1e-12);

    let step = profile.next_step(Offset::new(0.05, 0.0)).unwrap();
    assert_relative_eq!(step.peak.azimuth, 0.2, epsilon = 1e-12);
    assert_relative_eq!(step.peak.zenith, 0.0, epsilon = 1e-12);
    assert_relative_eq!(step.suggested_drift.azimuth, -0.15, epsilon = 1e-12);
}

#[test]
fn test_mesh_folder_needs_square_count() {
    let dir = TempDir::new().unwrap();
    for i in 0..6 {
        write_capture(dir.path(), &format!("mesh_{i:02}"), 1.0);
    }
    assert!(MeshGrid::from_measurements(&means(dir.path()), 0.5).is_err());

    write_capture(dir.path(), "mesh_06", 1.0);
    write_capture(dir.path(), "mesh_07", 1.0);
    write_capture(dir.path(), "mesh_08", 9.0);
    let grid = MeshGrid::from_measurements(&means(dir.path()), 0.5).unwrap();
    assert_eq!(grid.size(), 3);
    // Last capture is row 2 (azimuth +0.5), column 2 (zenith +0.5)
    let peak = grid.detector_peak(0).unwrap();
    assert_relative_eq!(peak.azimuth, 0.5);
    assert_relative_eq!(peak.zenith, 0.5);
}

#[test]
fn test_empty_folder() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        read_capture_folder(dir.path()),
        Err(Error::EmptyFolder(_))
    ));
}

#[test]
fn test_bad_capture_fails_folder() {
    let dir = TempDir::new().unwrap();
    write_capture(dir.path(), "a", 1.0);
    fs::write(dir.path().join("b"), "h\nh\nh\nh\nnot a number\n").unwrap();
    assert!(matches!(
        read_capture_folder(dir.path()),
        Err(Error::InvalidFormat { line: 5, .. })
    ));
}
