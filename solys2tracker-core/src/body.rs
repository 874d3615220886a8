//! Celestial bodies the tracker can follow.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Error;

/// Body targeted by a tracking or sweep operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Body {
    Sun,
    Moon,
}

impl Body {
    /// All supported bodies.
    pub const ALL: [Body; 2] = [Body::Sun, Body::Moon];

    /// Lowercase name used in file names and logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Body::Sun => "sun",
            Body::Moon => "moon",
        }
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Sun => write!(f, "SUN"),
            Body::Moon => write!(f, "MOON"),
        }
    }
}

impl FromStr for Body {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sun" => Ok(Body::Sun),
            "moon" => Ok(Body::Moon),
            other => Err(Error::UnknownBody(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_parse() {
        assert_eq!("SUN".parse::<Body>().unwrap(), Body::Sun);
        assert_eq!(" moon ".parse::<Body>().unwrap(), Body::Moon);
        assert!("mars".parse::<Body>().is_err());
    }

    #[test]
    fn test_body_display() {
        assert_eq!(Body::Sun.to_string(), "SUN");
        assert_eq!(Body::Moon.as_str(), "moon");
    }
}
