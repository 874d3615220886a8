//! CSV session logs.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use log::info;
use solys2tracker_core::{Body, Offset, Position};

use crate::Result;

/// Column header written at the top of every session log.
pub const SESSION_LOG_HEADER: &str =
    "time_utc,op,body,index,az_offset,ze_offset,target_az,target_ze,measured_az,measured_ze";

/// One logged instrument movement.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub time: DateTime<Utc>,
    pub index: usize,
    pub offset: Offset,
    pub target: Position,
    /// Position read back after the move, if the read succeeded.
    pub measured: Option<Position>,
}

/// Writer for one operation's session log.
///
/// Rows are flushed as they are written so a crash loses at most the
/// current point.
pub struct SessionLogWriter {
    writer: BufWriter<File>,
    path: PathBuf,
    op: String,
    body: Body,
}

impl SessionLogWriter {
    /// Log file name for an operation started at `started`.
    #[must_use]
    pub fn file_name(body: Body, op: &str, started: DateTime<Utc>) -> String {
        format!(
            "solys2tracker_{}_{}_{}.csv",
            body.as_str(),
            op,
            started.format("%Y%m%dT%H%M%SZ")
        )
    }

    /// Creates the log in `folder`, creating the folder if needed.
    pub fn create<P: AsRef<Path>>(
        folder: P,
        body: Body,
        op: &str,
        started: DateTime<Utc>,
    ) -> Result<Self> {
        let folder = folder.as_ref();
        fs::create_dir_all(folder)?;
        let path = folder.join(Self::file_name(body, op, started));
        let file = File::create(&path)?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "{SESSION_LOG_HEADER}")?;
        writer.flush()?;
        info!("Logging {op} session to {}", path.display());
        Ok(Self {
            writer,
            path,
            op: op.to_string(),
            body,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one row.
    pub fn write_record(&mut self, record: &LogRecord) -> Result<()> {
        let (measured_az, measured_ze) = record
            .measured
            .map_or((String::new(), String::new()), |p| {
                (format!("{:.4}", p.azimuth), format!("{:.4}", p.zenith))
            });
        writeln!(
            self.writer,
            "{},{},{},{},{:.4},{:.4},{:.4},{:.4},{},{}",
            record.time.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.op,
            self.body.as_str(),
            record.index,
            record.offset.azimuth,
            record.offset.zenith,
            record.target.azimuth,
            record.target.zenith,
            measured_az,
            measured_ze
        )?;
        self.writer.flush()?;
        Ok(())
    }

    /// Flushes the writer.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[test]
    fn test_file_name() {
        let t = Utc.with_ymd_and_hms(2022, 3, 1, 10, 5, 9).unwrap();
        assert_eq!(
            SessionLogWriter::file_name(Body::Moon, "cross", t),
            "solys2tracker_moon_cross_20220301T100509Z.csv"
        );
    }

    #[test]
    fn test_write_records() {
        let dir = TempDir::new().unwrap();
        let t = Utc.with_ymd_and_hms(2022, 3, 1, 10, 0, 0).unwrap();
        let mut log =
            SessionLogWriter::create(dir.path().join("logs"), Body::Sun, "track", t).unwrap();
        log.write_record(&LogRecord {
            time: t,
            index: 0,
            offset: Offset::ZERO,
            target: Position::new(120.5, 40.25),
            measured: Some(Position::new(120.5, 40.2)),
        })
        .unwrap();
        log.write_record(&LogRecord {
            time: t,
            index: 1,
            offset: Offset::new(0.1, 0.0),
            target: Position::new(121.0, 40.0),
            measured: None,
        })
        .unwrap();

        let content = fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], SESSION_LOG_HEADER);
        assert_eq!(
            lines[1],
            "2022-03-01T10:00:00.000Z,track,sun,0,0.0000,0.0000,120.5000,40.2500,120.5000,40.2000"
        );
        assert!(lines[2].ends_with(",121.0000,40.0000,,"));
    }
}
