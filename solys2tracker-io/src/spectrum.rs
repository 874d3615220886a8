//! ASD spectrometer text exports.
//!
//! The exports start with a fixed header followed by one
//! `wavelength<TAB>value` row per sample. Numbers use a comma as the decimal
//! separator.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use rayon::prelude::*;
use solys2tracker_core::{BandMeans, Spectrum};

use crate::{Error, Result};

/// Header lines preceding the samples.
pub const ASD_HEADER_LINES: usize = 4;

/// One capture file of a sweep.
#[derive(Debug, Clone)]
pub struct Capture {
    pub path: PathBuf,
    pub spectrum: Spectrum,
}

impl Capture {
    #[must_use]
    pub fn band_means(&self) -> BandMeans {
        self.spectrum.band_means()
    }

    /// File name for display.
    #[must_use]
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map_or_else(String::new, |n| n.to_string_lossy().into_owned())
    }
}

fn parse_number(token: &str) -> Option<f64> {
    token.trim().replace(',', ".").parse().ok()
}

/// Parses an ASD export. `source` names the input in error messages.
pub fn parse_asd(text: &str, source: &str) -> Result<Spectrum> {
    let mut spectrum = Spectrum::with_capacity(2151);
    for (lineno, line) in text.lines().enumerate().skip(ASD_HEADER_LINES) {
        if line.trim().is_empty() {
            continue;
        }
        let mut fields = line.split('\t');
        let parsed = match (fields.next(), fields.next()) {
            (Some(w), Some(v)) => parse_number(w).zip(parse_number(v)),
            _ => None,
        };
        let (wavelength, value) = parsed.ok_or_else(|| Error::InvalidFormat {
            path: source.to_string(),
            line: lineno + 1,
            message: format!("expected wavelength<TAB>value, got {line:?}"),
        })?;
        spectrum.push(wavelength, value);
    }
    Ok(spectrum)
}

/// Reads one ASD export file.
pub fn read_asd<P: AsRef<Path>>(path: P) -> Result<Spectrum> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    parse_asd(&text, &path.display().to_string())
}

/// Reads every capture in `folder`, ordered by file name.
///
/// Hidden files and subdirectories are ignored. Files are parsed in parallel.
pub fn read_capture_folder<P: AsRef<Path>>(folder: P) -> Result<Vec<Capture>> {
    let folder = folder.as_ref();
    let mut paths = Vec::new();
    for entry in fs::read_dir(folder)? {
        let entry = entry?;
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if !hidden && entry.file_type()?.is_file() {
            paths.push(entry.path());
        }
    }
    if paths.is_empty() {
        return Err(Error::EmptyFolder(folder.to_path_buf()));
    }
    paths.sort();
    debug!("Reading {} captures from {}", paths.len(), folder.display());

    paths
        .into_par_iter()
        .map(|path| {
            let spectrum = read_asd(&path)?;
            Ok(Capture { path, spectrum })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SAMPLE: &str = "ASD export\nInstrument: FieldSpec 4\nIntegration: 136 ms\nWavelength\tIrradiance\n550,5\t0,123\n551\t0,2\n\n";

    #[test]
    fn test_parse_skips_header() {
        let spectrum = parse_asd(SAMPLE, "sample").unwrap();
        assert_eq!(spectrum.len(), 2);
        assert_relative_eq!(spectrum.wavelengths[0], 550.5);
        assert_relative_eq!(spectrum.values[0], 0.123);
    }

    #[test]
    fn test_parse_reports_line() {
        let text = "h\nh\nh\nh\n350\t1,0\n351 1,0\n";
        match parse_asd(text, "bad.asd") {
            Err(Error::InvalidFormat { path, line, .. }) => {
                assert_eq!(path, "bad.asd");
                assert_eq!(line, 6);
            }
            other => panic!("expected InvalidFormat, got {other:?}"),
        }
    }

    #[test]
    fn test_header_only_is_empty() {
        let spectrum = parse_asd("a\nb\nc\nd\n", "x").unwrap();
        assert!(spectrum.is_empty());
    }
}
