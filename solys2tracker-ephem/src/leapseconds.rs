//! Leap-second table (TAI − UTC) and NAIF leapseconds kernel parsing.
//!
//! A leapseconds kernel (`.tls`) is a text kernel whose data section holds
//! the assignment
//!
//! ```text
//! DELTET/DELTA_AT = ( 10, @1972-JAN-1
//!                     11, @1972-JUL-1
//!                     ...                )
//! ```
//!
//! Only `DELTET/DELTA_T_A` and `DELTET/DELTA_AT` are read.

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};

use crate::{Error, Result};

/// TT − TAI in seconds.
pub const TT_MINUS_TAI: f64 = 32.184;

/// Leap seconds known at build time (same content as `naif0012.tls`).
const BUILTIN: [(i32, u32, f64); 28] = [
    (1972, 1, 10.0),
    (1972, 7, 11.0),
    (1973, 1, 12.0),
    (1974, 1, 13.0),
    (1975, 1, 14.0),
    (1976, 1, 15.0),
    (1977, 1, 16.0),
    (1978, 1, 17.0),
    (1979, 1, 18.0),
    (1980, 1, 19.0),
    (1981, 7, 20.0),
    (1982, 7, 21.0),
    (1983, 7, 22.0),
    (1985, 7, 23.0),
    (1988, 1, 24.0),
    (1990, 1, 25.0),
    (1991, 1, 26.0),
    (1992, 7, 27.0),
    (1993, 7, 28.0),
    (1994, 7, 29.0),
    (1996, 1, 30.0),
    (1997, 7, 31.0),
    (1999, 1, 32.0),
    (2006, 1, 33.0),
    (2009, 1, 34.0),
    (2012, 7, 35.0),
    (2015, 7, 36.0),
    (2017, 1, 37.0),
];

/// Table of TAI − UTC values and the date each one takes effect.
#[derive(Debug, Clone, PartialEq)]
pub struct LeapSeconds {
    /// Sorted by date.
    entries: Vec<(NaiveDate, f64)>,
    delta_t_a: f64,
    source: String,
}

impl Default for LeapSeconds {
    fn default() -> Self {
        Self::builtin()
    }
}

impl LeapSeconds {
    /// Table compiled into the crate.
    #[must_use]
    pub fn builtin() -> Self {
        let entries = BUILTIN
            .iter()
            .filter_map(|&(y, m, v)| NaiveDate::from_ymd_opt(y, m, 1).map(|d| (d, v)))
            .collect();
        Self {
            entries,
            delta_t_a: TT_MINUS_TAI,
            source: "builtin".to_string(),
        }
    }

    /// Loads a leapseconds kernel file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let mut table = Self::from_kernel_str(&text)?;
        table.source = path.display().to_string();
        Ok(table)
    }

    /// Parses the text of a leapseconds kernel.
    pub fn from_kernel_str(text: &str) -> Result<Self> {
        let data = data_sections(text);

        let delta_t_a = match find_assignment(&data, "DELTET/DELTA_T_A") {
            Some(value) => parse_kernel_number(value.trim())
                .ok_or_else(|| Error::InvalidKernel(format!("bad DELTET/DELTA_T_A: {value}")))?,
            None => TT_MINUS_TAI,
        };

        let list = find_assignment(&data, "DELTET/DELTA_AT")
            .ok_or_else(|| Error::InvalidKernel("missing DELTET/DELTA_AT".into()))?;
        let inner = list
            .trim()
            .strip_prefix('(')
            .and_then(|s| s.split(')').next())
            .ok_or_else(|| Error::InvalidKernel("DELTET/DELTA_AT is not a list".into()))?;

        let tokens: Vec<&str> = inner
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
            .collect();
        if tokens.is_empty() || tokens.len() % 2 != 0 {
            return Err(Error::InvalidKernel(format!(
                "DELTET/DELTA_AT has {} tokens, expected value/date pairs",
                tokens.len()
            )));
        }

        let mut entries = Vec::with_capacity(tokens.len() / 2);
        for pair in tokens.chunks_exact(2) {
            let value = parse_kernel_number(pair[0])
                .ok_or_else(|| Error::InvalidKernel(format!("bad leap value: {}", pair[0])))?;
            let date = parse_kernel_date(pair[1])
                .ok_or_else(|| Error::InvalidKernel(format!("bad leap date: {}", pair[1])))?;
            entries.push((date, value));
        }
        entries.sort_by_key(|(d, _)| *d);

        Ok(Self {
            entries,
            delta_t_a,
            source: "kernel".to_string(),
        })
    }

    /// Where the table came from: `builtin` or the kernel path.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// TAI − UTC at `time`. Zero before the first entry.
    #[must_use]
    pub fn delta_at(&self, time: DateTime<Utc>) -> f64 {
        let date = time.date_naive();
        self.entries
            .iter()
            .take_while(|(d, _)| *d <= date)
            .last()
            .map_or(0.0, |(_, v)| *v)
    }

    /// TT − UTC at `time`, in seconds.
    #[must_use]
    pub fn delta_t(&self, time: DateTime<Utc>) -> f64 {
        self.delta_t_a + self.delta_at(time)
    }
}

/// Concatenates the `\begindata` sections of a text kernel.
fn data_sections(text: &str) -> String {
    let mut out = String::new();
    let mut in_data = false;
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("\\begindata") {
            in_data = true;
        } else if trimmed.starts_with("\\begintext") {
            in_data = false;
        } else if in_data {
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

/// Returns the text after `name =` up to the next assignment.
fn find_assignment<'a>(data: &'a str, name: &str) -> Option<&'a str> {
    let start = data.find(name)? + name.len();
    let rest = data[start..].trim_start().strip_prefix('=')?;
    let end = rest.find("DELTET/").unwrap_or(rest.len());
    Some(&rest[..end])
}

/// Parses a kernel number, which may use `D` as the exponent marker.
fn parse_kernel_number(token: &str) -> Option<f64> {
    token.replace(['D', 'd'], "E").parse().ok()
}

/// Parses a kernel date such as `@1972-JAN-1`.
fn parse_kernel_date(token: &str) -> Option<NaiveDate> {
    let mut parts = token.strip_prefix('@')?.split('-');
    let year: i32 = parts.next()?.parse().ok()?;
    let month = match parts.next()?.to_ascii_uppercase().as_str() {
        "JAN" => 1,
        "FEB" => 2,
        "MAR" => 3,
        "APR" => 4,
        "MAY" => 5,
        "JUN" => 6,
        "JUL" => 7,
        "AUG" => 8,
        "SEP" => 9,
        "OCT" => 10,
        "NOV" => 11,
        "DEC" => 12,
        _ => return None,
    };
    let day: u32 = parts.next()?.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    const KERNEL: &str = r"
KPL/LSK

Some commentary that mentions DELTET/DELTA_AT outside the data block.

\begindata

DELTET/DELTA_T_A       =   32.184
DELTET/K               =    1.657D-3
DELTET/DELTA_AT        = ( 10,   @1972-JAN-1
                           11,   @1972-JUL-1
                           36,   @2015-JUL-1
                           37,   @2017-JAN-1
                           38,   @2030-JAN-1 )

\begintext
";

    #[test]
    fn test_builtin_table() {
        let table = LeapSeconds::builtin();
        assert_eq!(table.len(), 28);
        let t = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        assert_relative_eq!(table.delta_at(t), 37.0);
        assert_relative_eq!(table.delta_t(t), 69.184, epsilon = 1e-9);
        let t = Utc.with_ymd_and_hms(2016, 6, 1, 0, 0, 0).unwrap();
        assert_relative_eq!(table.delta_at(t), 36.0);
        let t = Utc.with_ymd_and_hms(1960, 1, 1, 0, 0, 0).unwrap();
        assert_relative_eq!(table.delta_at(t), 0.0);
    }

    #[test]
    fn test_parse_kernel() {
        let table = LeapSeconds::from_kernel_str(KERNEL).unwrap();
        assert_eq!(table.len(), 5);
        let t = Utc.with_ymd_and_hms(2031, 1, 1, 0, 0, 0).unwrap();
        assert_relative_eq!(table.delta_at(t), 38.0);
        let t = Utc.with_ymd_and_hms(1972, 3, 1, 0, 0, 0).unwrap();
        assert_relative_eq!(table.delta_at(t), 10.0);
    }

    #[test]
    fn test_kernel_without_data_is_rejected() {
        assert!(LeapSeconds::from_kernel_str("KPL/LSK\nno data here\n").is_err());
        let broken = "\\begindata\nDELTET/DELTA_AT = ( 10, @1972-FOO-1 )\n";
        assert!(LeapSeconds::from_kernel_str(broken).is_err());
    }

    #[test]
    fn test_kernel_number_exponent() {
        assert_relative_eq!(parse_kernel_number("1.657D-3").unwrap(), 0.001_657);
    }
}
