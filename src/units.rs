use std::fmt;

use crate::error::Error;

/// Units system requested from the API.
///
/// Sent as a single-letter code:
/// - [`Units::Metric`] -> `m` (Celsius, km/h, hPa)
/// - [`Units::Imperial`] -> `e` (Fahrenheit, mph, inHg)
/// - [`Units::Hybrid`] -> `h` (Celsius with mph)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Units {
    #[default]
    Metric,
    Imperial,
    Hybrid,
}

impl Units {
    pub const fn code(&self) -> char {
        match self {
            Units::Metric => 'm',
            Units::Imperial => 'e',
            Units::Hybrid => 'h',
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
            Units::Hybrid => "hybrid",
        }
    }

    pub const fn all() -> &'static [Units] {
        &[Units::Metric, Units::Imperial, Units::Hybrid]
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Units {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "metric" | "m" => Ok(Units::Metric),
            "imperial" | "english" | "e" => Ok(Units::Imperial),
            "hybrid" | "h" => Ok(Units::Hybrid),
            _ => Err(Error::Config(format!(
                "unknown units '{value}' (supported: metric, imperial, hybrid)"
            ))),
        }
    }
}
