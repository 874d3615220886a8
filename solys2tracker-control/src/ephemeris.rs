use std::path::Path;

use log::{info, warn};
use solys2tracker_core::Observer;
use solys2tracker_ephem::{AlmanacEphemeris, AnalyticEphemeris, EphemerisProvider, SafeEphemeris};
use solys2tracker_io::KernelDirectory;
use solys2tracker_proto::{Solys2Client, Transport};

use crate::Result;

/// Ephemeris used by the operations.
///
/// The primary is the full series with the kernel leap-second table. The
/// fallback is the kernel-free almanac series, which still answers for
/// instants outside the primary's validity window or when the primary
/// produces a non-finite position.
pub type TrackerEphemeris = SafeEphemeris<AnalyticEphemeris, AlmanacEphemeris>;

/// Builds the ephemeris for a kernels directory.
///
/// A missing directory or leapseconds kernel is not fatal: the built-in
/// leap-second table is used for the primary too.
#[must_use]
pub fn build_ephemeris(kernels_path: &Path) -> TrackerEphemeris {
    let loaded = KernelDirectory::scan(kernels_path).and_then(|dir| dir.load_leapseconds());
    let primary = match loaded {
        Ok(Some(table)) => AnalyticEphemeris::new(table),
        Ok(None) => {
            warn!(
                "No leapseconds kernel in {}, using the built-in table",
                kernels_path.display()
            );
            AnalyticEphemeris::default()
        }
        Err(e) => {
            warn!(
                "Cannot use kernels in {}: {e}; using the built-in table",
                kernels_path.display()
            );
            AnalyticEphemeris::default()
        }
    };
    let fallback = AlmanacEphemeris::default();
    info!("Ephemeris: {}, fallback {}", primary.name(), fallback.name());
    SafeEphemeris::new(primary, fallback)
}

/// Observer at the location configured in the instrument.
pub fn observer_from_device<T: Transport>(
    client: &mut Solys2Client<T>,
    height: f64,
) -> Result<Observer> {
    let (latitude, longitude) = client.location()?;
    Ok(Observer::new(latitude, longitude, height)?)
}
