//! Numeric conversion and formatting helpers for the GUI.

use std::time::Duration;

/// Convert usize to f32 with allowed precision loss.
#[allow(clippy::cast_precision_loss)]
pub fn usize_to_f32(value: usize) -> f32 {
    value as f32
}

/// Convert usize to f64 with allowed precision loss.
#[allow(clippy::cast_precision_loss)]
pub fn usize_to_f64(value: usize) -> f64 {
    value as f64
}

/// Convert f64 to f32 for display.
#[allow(clippy::cast_possible_truncation)]
pub fn f64_to_f32(value: f64) -> f32 {
    value as f32
}

/// Convert f32 to u8 with clamping to [0, 255].
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn f32_to_u8(value: f32) -> u8 {
    let clamped = value.clamp(0.0, 255.0);
    clamped.round() as u8
}

/// `done / total` clamped to [0, 1]; zero when `total` is zero.
pub fn ratio(done: usize, total: usize) -> f32 {
    if total == 0 {
        0.0
    } else {
        (usize_to_f32(done) / usize_to_f32(total)).clamp(0.0, 1.0)
    }
}

/// Formats a duration as `1h 02m 03s`, dropping leading zero units.
#[must_use]
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    let (h, m, s) = (secs / 3600, (secs / 60) % 60, secs % 60);
    if h > 0 {
        format!("{h}h {m:02}m {s:02}s")
    } else if m > 0 {
        format!("{m}m {s:02}s")
    } else {
        format!("{s}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio() {
        assert!((ratio(1, 4) - 0.25).abs() < f32::EPSILON);
        assert!(ratio(3, 0).abs() < f32::EPSILON);
        assert!((ratio(9, 4) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(4)), "4s");
        assert_eq!(format_duration(Duration::from_secs(204)), "3m 24s");
        assert_eq!(format_duration(Duration::from_secs(3723)), "1h 02m 03s");
    }

    #[test]
    fn test_f32_to_u8_clamps() {
        assert_eq!(f32_to_u8(-3.0), 0);
        assert_eq!(f32_to_u8(300.0), 255);
        assert_eq!(f32_to_u8(127.6), 128);
    }
}
