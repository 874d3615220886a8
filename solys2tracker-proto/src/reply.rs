//! Solys2 reply decoding.

use crate::command::Command;
use crate::error::DeviceError;
use crate::{Error, Result};

/// Decodes the reply line to `command`, returning the value tokens that
/// follow the echoed command code.
pub fn parse_reply(command: &Command, line: &str) -> Result<Vec<String>> {
    let mut tokens = line.split_whitespace();
    let head = tokens.next().ok_or_else(|| Error::UnexpectedReply {
        expected: command.code(),
        got: line.to_string(),
    })?;

    if head.eq_ignore_ascii_case("NO") {
        // Missing or unparsable codes are reported as code 0
        let code = tokens.next().and_then(|c| c.parse().ok()).unwrap_or(0);
        return Err(Error::Device {
            command: command.code(),
            error: DeviceError::from_code(code),
        });
    }

    if !head.eq_ignore_ascii_case(command.code()) {
        return Err(Error::UnexpectedReply {
            expected: command.code(),
            got: line.to_string(),
        });
    }

    Ok(tokens.map(str::to_string).collect())
}

/// Parses the value token at `index` as a finite number.
pub fn parse_f64(values: &[String], index: usize) -> Result<f64> {
    let token = values
        .get(index)
        .ok_or_else(|| Error::Parse(format!("missing value #{index} in {values:?}")))?;
    let value: f64 = token
        .parse()
        .map_err(|_| Error::Parse(format!("not a number: {token:?}")))?;
    if !value.is_finite() {
        return Err(Error::Parse(format!("not a finite number: {token:?}")));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Motor;

    #[test]
    fn test_parse_values() {
        let values = parse_reply(&Command::CurrentPosition, "CP 10.5 20.25").unwrap();
        assert_eq!(values, vec!["10.5", "20.25"]);
        assert!((parse_f64(&values, 1).unwrap() - 20.25).abs() < f64::EPSILON);
        assert!(parse_f64(&values, 2).is_err());
    }

    #[test]
    fn test_device_error() {
        let err = parse_reply(&Command::SetPosition(Motor::Zenith, 120.0), "NO 2").unwrap_err();
        assert!(matches!(
            err,
            Error::Device {
                command: "PO",
                error: DeviceError::InvalidParameter
            }
        ));
        let err = parse_reply(&Command::Password("x".into()), "NO 3").unwrap_err();
        assert!(err.is_auth_failure());
        let err = parse_reply(&Command::Home, "NO 77").unwrap_err();
        assert!(matches!(
            err,
            Error::Device {
                error: DeviceError::Other(77),
                ..
            }
        ));
    }

    #[test]
    fn test_mismatched_reply() {
        assert!(matches!(
            parse_reply(&Command::Adjustment, "CP 1 2"),
            Err(Error::UnexpectedReply { expected: "AD", .. })
        ));
        assert!(parse_reply(&Command::Adjustment, "   ").is_err());
    }

    #[test]
    fn test_non_numeric_value() {
        let values = parse_reply(&Command::Location, "LL north 4.7").unwrap();
        assert!(matches!(parse_f64(&values, 0), Err(Error::Parse(_))));
    }

    #[test]
    fn test_non_finite_value_rejected() {
        let values = parse_reply(&Command::CurrentPosition, "CP NaN inf").unwrap();
        assert!(matches!(parse_f64(&values, 0), Err(Error::Parse(_))));
        assert!(matches!(parse_f64(&values, 1), Err(Error::Parse(_))));
        let values = parse_reply(&Command::Adjustment, "AD -infinity 1e400").unwrap();
        assert!(parse_f64(&values, 0).is_err());
        assert!(parse_f64(&values, 1).is_err());
    }
}
