//! Solys2 request encoding.

/// Motor axis selector used by the `PO` and `AD` commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Motor {
    Azimuth = 0,
    Zenith = 1,
}

impl Motor {
    #[must_use]
    pub fn index(self) -> u8 {
        self as u8
    }
}

/// A Solys2 request.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `PW <password>`: authenticate the session.
    Password(String),
    /// `VE`: firmware version.
    Version,
    /// `CP`: current measured position.
    CurrentPosition,
    /// `PO`: planned (target) position.
    PlannedPosition,
    /// `PO <motor> <degrees>`: move one motor.
    SetPosition(Motor, f64),
    /// `AD`: current adjustment.
    Adjustment,
    /// `AD <motor> <degrees>`: set one motor's adjustment.
    SetAdjustment(Motor, f64),
    /// `HO`: go to the home position.
    Home,
    /// `LL`: configured latitude and longitude.
    Location,
}

impl Command {
    /// Two-letter command code, echoed back in the reply.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Command::Password(_) => "PW",
            Command::Version => "VE",
            Command::CurrentPosition => "CP",
            Command::PlannedPosition | Command::SetPosition(..) => "PO",
            Command::Adjustment | Command::SetAdjustment(..) => "AD",
            Command::Home => "HO",
            Command::Location => "LL",
        }
    }

    /// Request line without the terminator.
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Command::Password(pw) => format!("PW {pw}"),
            Command::SetPosition(motor, deg) | Command::SetAdjustment(motor, deg) => {
                format!("{} {} {:.4}", self.code(), motor.index(), deg)
            }
            _ => self.code().to_string(),
        }
    }

    /// Request line with masked secrets, for logging.
    #[must_use]
    pub fn redacted(&self) -> String {
        match self {
            Command::Password(_) => "PW ****".to_string(),
            _ => self.encode(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode() {
        assert_eq!(Command::Password("solys".into()).encode(), "PW solys");
        assert_eq!(Command::CurrentPosition.encode(), "CP");
        assert_eq!(
            Command::SetPosition(Motor::Azimuth, 123.456_78).encode(),
            "PO 0 123.4568"
        );
        assert_eq!(
            Command::SetAdjustment(Motor::Zenith, -0.05).encode(),
            "AD 1 -0.0500"
        );
    }

    #[test]
    fn test_redacted_password() {
        let cmd = Command::Password("secret".into());
        assert!(!cmd.redacted().contains("secret"));
        assert_eq!(Command::Home.redacted(), "HO");
    }
}
