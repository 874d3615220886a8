//! SPICE kernel directory scanner.
//!
//! Classifies the files of a kernels directory by NAIF extension. The
//! leapseconds kernel drives the UTC to TT conversion of the ephemeris; the
//! other kernel kinds are listed for the user to check the installation.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use solys2tracker_ephem::LeapSeconds;

use crate::Result;

/// NAIF kernel kinds recognised by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KernelKind {
    /// `.tls` text leapseconds kernel.
    Leapseconds,
    /// `.bsp` binary SPK ephemeris.
    Spk,
    /// `.tpc` / `.bpc` planetary constants.
    Pck,
    /// `.tf` frame kernel.
    Frame,
}

impl KernelKind {
    pub const ALL: [KernelKind; 4] = [
        KernelKind::Leapseconds,
        KernelKind::Spk,
        KernelKind::Pck,
        KernelKind::Frame,
    ];

    /// Kind implied by the file extension, ignoring case.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "tls" => Some(KernelKind::Leapseconds),
            "bsp" => Some(KernelKind::Spk),
            "tpc" | "bpc" => Some(KernelKind::Pck),
            "tf" => Some(KernelKind::Frame),
            _ => None,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            KernelKind::Leapseconds => "leapseconds",
            KernelKind::Spk => "ephemeris (SPK)",
            KernelKind::Pck => "planetary constants",
            KernelKind::Frame => "frames",
        }
    }
}

/// Kernel files found in a directory, sorted by path.
#[derive(Debug, Clone, Default)]
pub struct KernelDirectory {
    root: PathBuf,
    files: Vec<(KernelKind, PathBuf)>,
}

impl KernelDirectory {
    /// Scans `root` (not recursively).
    pub fn scan<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let mut files = Vec::new();
        for entry in fs::read_dir(&root)? {
            let path = entry?.path();
            if let Some(kind) = KernelKind::from_path(&path) {
                if path.is_file() {
                    files.push((kind, path));
                }
            }
        }
        files.sort_by(|a, b| a.1.cmp(&b.1));
        debug!("Found {} kernels in {}", files.len(), root.display());
        Ok(Self { root, files })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn files(&self) -> impl Iterator<Item = &(KernelKind, PathBuf)> {
        self.files.iter()
    }

    #[must_use]
    pub fn count(&self, kind: KernelKind) -> usize {
        self.files.iter().filter(|(k, _)| *k == kind).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Leapseconds kernel to use. NAIF names them `naifNNNN.tls`, so the last
    /// one by name is the newest.
    #[must_use]
    pub fn leapseconds_file(&self) -> Option<&Path> {
        self.files
            .iter()
            .filter(|(k, _)| *k == KernelKind::Leapseconds)
            .map(|(_, p)| p.as_path())
            .next_back()
    }

    /// Loads the leapseconds kernel, if the directory has one.
    pub fn load_leapseconds(&self) -> Result<Option<LeapSeconds>> {
        match self.leapseconds_file() {
            Some(path) => {
                let table = LeapSeconds::from_file(path)?;
                info!(
                    "Loaded {} leap seconds from {}",
                    table.len(),
                    path.display()
                );
                Ok(Some(table))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(
            KernelKind::from_path(Path::new("naif0012.TLS")),
            Some(KernelKind::Leapseconds)
        );
        assert_eq!(
            KernelKind::from_path(Path::new("de421.bsp")),
            Some(KernelKind::Spk)
        );
        assert_eq!(
            KernelKind::from_path(Path::new("earth_latest_high_prec.bpc")),
            Some(KernelKind::Pck)
        );
        assert_eq!(KernelKind::from_path(Path::new("readme.txt")), None);
        assert_eq!(KernelKind::from_path(Path::new("tls")), None);
    }

    #[test]
    fn test_scan_and_pick_newest_lsk() {
        let dir = TempDir::new().unwrap();
        for name in ["naif0011.tls", "naif0012.tls", "de421.bsp", "notes.md"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        fs::create_dir(dir.path().join("old.tls")).unwrap();

        let kernels = KernelDirectory::scan(dir.path()).unwrap();
        assert_eq!(kernels.count(KernelKind::Leapseconds), 2);
        assert_eq!(kernels.count(KernelKind::Spk), 1);
        assert_eq!(
            kernels.leapseconds_file().and_then(Path::file_name),
            Some(std::ffi::OsStr::new("naif0012.tls"))
        );
    }

    #[test]
    fn test_missing_directory() {
        assert!(KernelDirectory::scan("/definitely/not/a/kernels/dir").is_err());
    }

    #[test]
    fn test_no_lsk() {
        let dir = TempDir::new().unwrap();
        let kernels = KernelDirectory::scan(dir.path()).unwrap();
        assert!(kernels.is_empty());
        assert!(kernels.load_leapseconds().unwrap().is_none());
    }
}
