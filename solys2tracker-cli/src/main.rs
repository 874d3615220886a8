//! solys2tracker CLI
//!
//! Command-line control of a Solys2 tracker: connection checks, adjustment,
//! tracking, Cross and Mesh sweeps, ephemeris tables and sweep analysis.
#![allow(
    clippy::uninlined_format_args,
    clippy::cast_precision_loss,
    clippy::too_many_lines,
    clippy::needless_pass_by_value
)]

use std::io::{self, BufRead, IsTerminal};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use clap::{Args, Parser, Subcommand};
use log::debug;
use serde_json::json;
use thiserror::Error;

use solys2tracker_control::{
    build_ephemeris, go_home, instrument_info, read_adjustment, run_sweep, run_track,
    send_adjustment, try_connect, validate_adjustment_step, CancelToken, ControlEvent,
    EventSender, LogHook, OperationSummary,
};
use solys2tracker_core::{
    Body, CrossProfile, MeshGrid, NextStep, Observer, Offset, SessionStatus, SweepKind, SweepPlan,
    TrackPlan, DETECTOR_COUNT,
};
use solys2tracker_ephem::positions_over;
use solys2tracker_io::{read_asd, read_capture_folder, SettingKey, SettingsStore};
use solys2tracker_proto::DEFAULT_TIMEOUT;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] solys2tracker_io::Error),

    #[error("Core error: {0}")]
    Core(#[from] solys2tracker_core::Error),

    #[error("{0}")]
    Control(#[from] solys2tracker_control::Error),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("No Solys2 address configured: pass --ip or run `solys2tracker config set ip <address>`")]
    NoAddress,

    #[error("Operation thread panicked")]
    WorkerPanicked,
}

/// Solys2 sun and moon tracker control.
#[derive(Parser)]
#[command(name = "solys2tracker")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings file (defaults to the user configuration directory)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Solys2 IP address (overrides the stored one)
    #[arg(long, global = true)]
    ip: Option<String>,

    /// Solys2 TCP port
    #[arg(long, global = true)]
    port: Option<u16>,

    /// Solys2 password
    #[arg(long, global = true)]
    password: Option<String>,

    /// Verbose output (protocol traffic)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Copy)]
struct DriftArgs {
    /// Azimuth drift in degrees, subtracted from every target
    #[arg(long, default_value = "0.0", allow_negative_numbers = true)]
    drift_az: f64,

    /// Zenith drift in degrees, subtracted from every target
    #[arg(long, default_value = "0.0", allow_negative_numbers = true)]
    drift_ze: f64,
}

impl DriftArgs {
    fn offset(self) -> Offset {
        Offset::new(self.drift_az, self.drift_ze)
    }
}

#[derive(Args)]
struct SweepArgs {
    /// Body to sweep around (sun or moon)
    body: Body,

    /// Half-width of the sweep (degrees)
    #[arg(long, default_value = "0.8")]
    range: f64,

    /// Distance between points (degrees)
    #[arg(long, default_value = "0.1")]
    step: f64,

    /// Measurement window at each point (seconds)
    #[arg(long, default_value = "5")]
    countdown: f64,

    /// Pause after each measurement (seconds)
    #[arg(long, default_value = "1")]
    rest: f64,

    /// Instrument height above sea level (metres)
    #[arg(long)]
    height: Option<f64>,

    #[command(flatten)]
    drift: DriftArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the connection and remember it on success
    Connect,

    /// Show firmware, position, adjustment and location
    Info,

    /// Read or write the instrument adjustment
    Adjust {
        #[command(subcommand)]
        action: AdjustAction,
    },

    /// Send the instrument to its home position
    Home,

    /// Track a body
    Track {
        /// Body to track (sun or moon)
        body: Body,

        /// Seconds between repositionings
        #[arg(short, long, default_value = "15")]
        interval: f64,

        /// Stop after this many updates (default: run until interrupted)
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// Instrument height above sea level (metres)
        #[arg(long)]
        height: Option<f64>,

        #[command(flatten)]
        drift: DriftArgs,
    },

    /// Cross sweep: azimuth pass, then zenith pass
    Cross(SweepArgs),

    /// Mesh sweep: full azimuth x zenith grid
    Mesh(SweepArgs),

    /// Print computed body positions
    Position {
        /// Body (sun or moon)
        body: Body,

        /// Observer latitude (degrees north)
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        /// Observer longitude (degrees east)
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        /// Observer height (metres)
        #[arg(long, default_value = "0")]
        height: f64,

        /// First instant, RFC 3339 (default: now)
        #[arg(long)]
        at: Option<DateTime<Utc>>,

        /// Number of rows
        #[arg(long, default_value = "1")]
        steps: u32,

        /// Minutes between rows
        #[arg(long, default_value = "10")]
        every: u32,
    },

    /// Analyse ASD captures
    Analyze {
        #[command(subcommand)]
        kind: AnalyzeKind,
    },

    /// Show or edit the stored settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum AdjustAction {
    /// Print the current adjustment
    Show,
    /// Add an increment of at most ±0.2° to both adjustments
    #[command(alias = "set")]
    Add {
        #[arg(long, allow_negative_numbers = true, default_value_t = 0.0)]
        azimuth: f64,
        #[arg(long, allow_negative_numbers = true, default_value_t = 0.0)]
        zenith: f64,
    },
}

#[derive(Subcommand)]
enum AnalyzeKind {
    /// Folder of Cross captures, sorted by name
    Cross {
        folder: PathBuf,

        /// Half-width the sweep was run with (degrees)
        #[arg(long, default_value = "0.8")]
        range: f64,

        /// Normalise both passes jointly to [0, 1]
        #[arg(long)]
        normalize: bool,

        /// Fixed minimum per detector for normalisation (VNIR,SWIR1,SWIR2)
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
        min: Vec<f64>,

        #[command(flatten)]
        drift: DriftArgs,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Folder of Mesh captures, sorted by name
    Mesh {
        folder: PathBuf,

        #[arg(long, default_value = "0.8")]
        range: f64,

        #[command(flatten)]
        drift: DriftArgs,

        #[arg(long)]
        json: bool,
    },
    /// A single ASD export
    Spectrum { file: PathBuf },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print every stored setting
    Show,
    /// Store one setting
    Set { key: SettingKey, value: String },
    /// Print the settings file location
    Path,
}

const DETECTOR_NAMES: [&str; DETECTOR_COUNT] = ["VNIR", "SWIR1", "SWIR2"];

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn require_address(status: &SessionStatus) -> Result<()> {
    if status.params().ip.trim().is_empty() {
        return Err(CliError::NoAddress);
    }
    Ok(())
}

fn seconds(value: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(value)
        .map_err(|e| solys2tracker_core::Error::InvalidSweep(format!("{value} s: {e}")).into())
}

fn print_event(event: &ControlEvent) {
    match event {
        ControlEvent::Info(msg) => println!("{msg}"),
        ControlEvent::Warning(msg) => eprintln!("warning: {msg}"),
        ControlEvent::Progress { index, total } => println!("Point {}/{}", index + 1, total),
        ControlEvent::Moved {
            offset,
            target,
            measured,
            ..
        } => {
            let measured = measured.map_or_else(
                || "n/a".to_string(),
                |p| format!("{:.3} {:.3}", p.azimuth, p.zenith),
            );
            println!(
                "  offset {:+.3} {:+.3}  target {:.3} {:.3}  measured {}",
                offset.azimuth, offset.zenith, target.azimuth, target.zenith, measured
            );
        }
        ControlEvent::Skipped { target, .. } => {
            eprintln!("warning: target below the horizon (zenith {:.2}), skipped", target.zenith);
        }
        ControlEvent::Countdown { remaining, .. } => {
            println!("  measuring... {} s", remaining.as_secs_f64().ceil());
        }
        ControlEvent::Measured { .. } => {}
        ControlEvent::Finished(msg) => println!("{msg}"),
        ControlEvent::Cancelled => println!("Cancelled."),
        // Returned as the operation error
        ControlEvent::Failed(_) => {}
    }
}

/// Reads `input` until a `q` line, or end of input when `stop_on_eof` is
/// set, then cancels. Returns whether it cancelled.
fn watch_for_quit<R: BufRead>(input: R, cancel: &CancelToken, stop_on_eof: bool) -> bool {
    for line in input.lines() {
        match line {
            Ok(line) if matches!(line.trim(), "q" | "quit") => {
                cancel.cancel();
                return true;
            }
            Ok(_) => {}
            Err(e) => {
                debug!("stdin closed: {e}");
                return false;
            }
        }
    }
    if stop_on_eof {
        cancel.cancel();
    }
    stop_on_eof
}

/// Token cancelled when the user types `q` (or Ctrl-D on a terminal).
fn stdin_cancel_token() -> CancelToken {
    let cancel = CancelToken::new();
    let watcher = cancel.clone();
    let interactive = io::stdin().is_terminal();
    if interactive {
        println!("Type q and Enter to stop.");
    }
    thread::spawn(move || watch_for_quit(io::stdin().lock(), &watcher, interactive));
    cancel
}

/// Runs `op` on a worker thread, printing its events as they arrive.
fn run_with_events<F>(op: F) -> Result<OperationSummary>
where
    F: FnOnce(&EventSender) -> solys2tracker_control::Result<OperationSummary> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let handle = thread::spawn(move || {
        let events = EventSender::new(tx);
        op(&events)
    });
    for event in rx {
        print_event(&event);
    }
    let summary = handle.join().map_err(|_| CliError::WorkerPanicked)??;
    if let Some(path) = &summary.log_path {
        println!("Session log: {}", path.display());
    }
    Ok(summary)
}

fn print_next_step(next: Option<NextStep>, json: bool, files: usize) {
    if json {
        let value = match next {
            Some(step) => json!({
                "files": files,
                "peak": { "azimuth": step.peak.azimuth, "zenith": step.peak.zenith },
                "suggested_drift": {
                    "azimuth": step.suggested_drift.azimuth,
                    "zenith": step.suggested_drift.zenith
                },
            }),
            None => json!({ "files": files, "peak": null, "suggested_drift": null }),
        };
        println!("{value}");
        return;
    }
    match next {
        Some(step) => println!("{}", step.message()),
        None => println!("No clear signal peak found."),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let store = match &cli.settings {
        Some(path) => SettingsStore::new(path),
        None => SettingsStore::open_default()?,
    };
    debug!("Settings file: {}", store.path().display());
    let settings = store.load();
    let mut status = settings.session_status();
    let mut params = status.params().clone();
    if let Some(ip) = cli.ip {
        params.ip = ip;
    }
    if let Some(port) = cli.port {
        params.port = port;
    }
    if let Some(password) = cli.password {
        params.password = password;
    }
    status.set_params(params);
    let stored_height = settings.height().unwrap_or(0.0);

    match cli.command {
        Commands::Connect => {
            require_address(&status)?;
            let outcome = try_connect(status.params(), DEFAULT_TIMEOUT);
            status.record_attempt(&outcome.params, outcome.success);
            if !status.is_connected() {
                return Err(CliError::Connection(outcome.message));
            }
            store.remember_connection(&outcome.params)?;
            println!("{}", outcome.message);
        }

        Commands::Info => {
            require_address(&status)?;
            let info = instrument_info(status.params())?;
            println!("Solys2: {}", status.params().address());
            println!("Firmware: {}", info.version);
            println!(
                "Position: azimuth {:.4}, zenith {:.4}",
                info.position.azimuth, info.position.zenith
            );
            println!(
                "Planned: azimuth {:.4}, zenith {:.4}",
                info.planned.azimuth, info.planned.zenith
            );
            println!(
                "Adjustment: azimuth {:+.4}, zenith {:+.4}",
                info.adjustment.azimuth, info.adjustment.zenith
            );
            println!(
                "Location: lat {:.4}, lon {:.4}",
                info.location.0, info.location.1
            );
        }

        Commands::Adjust { action } => {
            require_address(&status)?;
            match action {
                AdjustAction::Show => {
                    let adj = read_adjustment(status.params())?;
                    println!("Azimuth: {:+.4}", adj.azimuth);
                    println!("Zenith: {:+.4}", adj.zenith);
                }
                AdjustAction::Add { azimuth, zenith } => {
                    let step = Offset::new(azimuth, zenith);
                    validate_adjustment_step(step)?;
                    let now = send_adjustment(status.params(), step)?;
                    println!("Azimuth: {:+.4}", now.azimuth);
                    println!("Zenith: {:+.4}", now.zenith);
                }
            }
        }

        Commands::Home => {
            require_address(&status)?;
            go_home(status.params())?;
            println!("Going home.");
        }

        Commands::Track {
            body,
            interval,
            count,
            height,
            drift,
        } => {
            require_address(&status)?;
            let plan = TrackPlan {
                body,
                interval: seconds(interval)?,
                drift: drift.offset(),
            };
            plan.validate()?;
            let height = height.unwrap_or(stored_height);
            let cancel = stdin_cancel_token();
            let summary = run_with_events(move |events| {
                run_track(&status, &plan, height, count, events, &cancel)
            })?;
            println!(
                "{} updates, {} skipped, {} failed",
                summary.completed, summary.skipped, summary.failed_ticks
            );
        }

        Commands::Cross(args) => {
            require_address(&status)?;
            sweep(status, args, SweepKind::Cross, stored_height)?;
        }

        Commands::Mesh(args) => {
            require_address(&status)?;
            sweep(status, args, SweepKind::Mesh, stored_height)?;
        }

        Commands::Position {
            body,
            lat,
            lon,
            height,
            at,
            steps,
            every,
        } => {
            let observer = Observer::new(lat, lon, height)?;
            let ephemeris = build_ephemeris(&status.kernels_path);
            let start = at.unwrap_or_else(Utc::now);
            let times: Vec<DateTime<Utc>> = (0..steps.max(1))
                .map(|i| start + TimeDelta::minutes(i64::from(i) * i64::from(every)))
                .collect();
            println!(
                "{:<25} | {:>10} | {:>10} | {:>10}",
                "Time (UTC)", "Azimuth", "Zenith", "Elevation"
            );
            println!("{:-<64}", "");
            let positions = positions_over(&ephemeris, body, &observer, &times);
            for (time, result) in times.iter().zip(positions) {
                match result {
                    Ok(p) => println!(
                        "{:<25} | {:>10.4} | {:>10.4} | {:>10.4}",
                        time.format("%Y-%m-%d %H:%M:%S"),
                        p.azimuth,
                        p.zenith,
                        p.elevation()
                    ),
                    Err(e) => println!("{:<25} | {}", time.format("%Y-%m-%d %H:%M:%S"), e),
                }
            }
        }

        Commands::Analyze { kind } => analyze(kind)?,

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                println!("# {}", store.path().display());
                if settings.is_empty() {
                    println!("(no settings stored)");
                }
                for (key, value) in settings.iter() {
                    println!("{key} = {value}");
                }
            }
            ConfigAction::Set { key, value } => {
                store.save_text(key, &value)?;
                println!("{key} = {value}");
            }
            ConfigAction::Path => println!("{}", store.path().display()),
        },
    }

    Ok(())
}

fn sweep(
    status: SessionStatus,
    args: SweepArgs,
    kind: SweepKind,
    stored_height: f64,
) -> Result<()> {
    let plan = SweepPlan {
        body: args.body,
        range: args.range,
        step: args.step,
        countdown: seconds(args.countdown)?,
        rest: seconds(args.rest)?,
        drift: args.drift.offset(),
    };
    plan.validate()?;
    let height = args.height.unwrap_or(stored_height);
    let total = plan.total_points(kind);
    let cancel = stdin_cancel_token();
    let summary = run_with_events(move |events| {
        let mut hook = LogHook;
        run_sweep(&status, &plan, kind, height, &mut hook, events, &cancel)
    })?;
    if summary.cancelled {
        println!("{} of {} points measured.", summary.completed, total);
    }
    Ok(())
}

fn analyze(kind: AnalyzeKind) -> Result<()> {
    match kind {
        AnalyzeKind::Cross {
            folder,
            range,
            normalize,
            min,
            drift,
            json,
        } => {
            let captures = read_capture_folder(&folder)?;
            let means: Vec<_> = captures.iter().map(|c| c.band_means()).collect();
            let profile = CrossProfile::from_measurements(&means, range)?;
            if !json {
                for (d, name) in DETECTOR_NAMES.iter().enumerate() {
                    let (az, ze) = if normalize {
                        profile.normalized(d, min.get(d).copied())
                    } else {
                        (profile.azimuth[d].clone(), profile.zenith[d].clone())
                    };
                    println!("{name}");
                    println!("{:>10} | {:>14} | {:>14}", "Offset", "Azimuth", "Zenith");
                    println!("{:-<44}", "");
                    for (i, offset) in profile.offsets.iter().enumerate() {
                        println!("{:>10.3} | {:>14.6} | {:>14.6}", offset, az[i], ze[i]);
                    }
                    println!();
                }
            }
            print_next_step(profile.next_step(drift.offset()), json, captures.len());
        }

        AnalyzeKind::Mesh {
            folder,
            range,
            drift,
            json,
        } => {
            let captures = read_capture_folder(&folder)?;
            let means: Vec<_> = captures.iter().map(|c| c.band_means()).collect();
            let grid = MeshGrid::from_measurements(&means, range)?;
            if !json {
                for (d, name) in DETECTOR_NAMES.iter().enumerate() {
                    println!("{name} (rows: azimuth, columns: zenith)");
                    print!("{:>8} |", "");
                    for ze in &grid.offsets {
                        print!(" {:>10.3}", ze);
                    }
                    println!();
                    for (i, az) in grid.offsets.iter().enumerate() {
                        print!("{:>8.3} |", az);
                        for value in grid.grids[d].row(i) {
                            print!(" {:>10.4}", value);
                        }
                        println!();
                    }
                    println!();
                }
            }
            print_next_step(grid.next_step(drift.offset()), json, captures.len());
        }

        AnalyzeKind::Spectrum { file } => {
            let spectrum = read_asd(&file)?;
            println!("{:>12} | {:>14}", "Wavelength", "Value");
            println!("{:-<29}", "");
            for (w, v) in spectrum.wavelengths.iter().zip(&spectrum.values) {
                println!("{:>12.1} | {:>14.6}", w, v);
            }
            let means = spectrum.band_means();
            for (d, name) in DETECTOR_NAMES.iter().enumerate() {
                println!("{name} mean: {:.6}", means.detector(d));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_quit_line_cancels() {
        let cancel = CancelToken::new();
        assert!(watch_for_quit(Cursor::new("status\n q \n"), &cancel, false));
        assert!(cancel.is_cancelled());
    }

    #[test]
    fn test_eof_cancels_only_when_interactive() {
        let cancel = CancelToken::new();
        assert!(!watch_for_quit(Cursor::new(""), &cancel, false));
        assert!(!cancel.is_cancelled());
        assert!(watch_for_quit(Cursor::new("\n"), &cancel, true));
        assert!(cancel.is_cancelled());
    }

    #[test]
    fn test_adjust_add_parses_negative_zenith() {
        let args = ["solys2tracker", "adjust", "add", "--zenith", "-0.1"];
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Adjust {
                action: AdjustAction::Add { azimuth, zenith },
            } => {
                assert_eq!(azimuth, 0.0);
                assert_eq!(zenith, -0.1);
                assert!(validate_adjustment_step(Offset::new(azimuth, zenith)).is_ok());
            }
            _ => panic!("expected adjust add"),
        }
        assert!(validate_adjustment_step(Offset::new(0.3, 0.0)).is_err());
    }
}
