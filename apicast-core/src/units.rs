//! Unit systems, temperature conversion and compass headings.

use std::fmt;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

/// Unit system requested from OpenWeather.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    /// Value of the `units` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    pub fn temperature_symbol(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
        }
    }

    pub fn speed_unit(&self) -> &'static str {
        match self {
            Units::Metric => "м/с",
            Units::Imperial => "mph",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Units {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            _ => Err(anyhow!("Unknown unit system '{value}'. Supported: metric, imperial.")),
        }
    }
}

/// Target scale for [`convert_temperature`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureUnit {
    Celsius,
    Fahrenheit,
    Kelvin,
}

impl TemperatureUnit {
    /// Unrecognised names fall back to Celsius.
    pub fn parse_lossy(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "fahrenheit" | "f" => TemperatureUnit::Fahrenheit,
            "kelvin" | "k" => TemperatureUnit::Kelvin,
            _ => TemperatureUnit::Celsius,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "celsius",
            TemperatureUnit::Fahrenheit => "fahrenheit",
            TemperatureUnit::Kelvin => "kelvin",
        }
    }
}

/// Convert a Celsius reading and render it with one decimal and the unit suffix.
pub fn convert_temperature(celsius: f64, target: TemperatureUnit) -> String {
    match target {
        TemperatureUnit::Fahrenheit => format!("{:.1}°F", celsius * 9.0 / 5.0 + 32.0),
        TemperatureUnit::Kelvin => format!("{:.1}K", celsius + 273.15),
        TemperatureUnit::Celsius => format!("{celsius:.1}°C"),
    }
}

const COMPASS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

/// Eight-point compass label for a heading in degrees.
///
/// Exact half-way headings round to the even bucket, so 22.5° is `N` and
/// 112.5° is `E`.
pub fn wind_direction_label(degrees: f64) -> &'static str {
    let bucket = (degrees / 45.0).round_ties_even() as i64;
    COMPASS[bucket.rem_euclid(8) as usize]
}
