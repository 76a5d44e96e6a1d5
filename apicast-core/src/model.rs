use serde::{Deserialize, Serialize};

use crate::units::Units;

pub const DEFAULT_LANG: &str = "ua";

const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherQuery {
    pub city: String,
    pub units: Units,
    pub lang: String,
}

impl WeatherQuery {
    pub fn new(city: impl Into<String>) -> Self {
        Self { city: city.into(), units: Units::Metric, lang: DEFAULT_LANG.to_string() }
    }

    pub fn with_units(mut self, units: Units) -> Self {
        self.units = units;
        self
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }
}

/// Token counts and derived cost for one chat completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageReport {
    pub response: String,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
    pub total_cost_usd: f64,
    pub model: String,
}

/// Current-weather payload as delivered by OpenWeather.
///
/// Every field is optional; use the accessor methods, which apply the default
/// table (numbers default to 0, names and descriptions to "Unknown").
///
/// Decoding is lenient per field: a value of the wrong type is treated as
/// absent instead of failing the whole payload, and numeric strings such as
/// `"48"` are accepted as numbers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherObservation {
    #[serde(deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient::nested")]
    pub main: Option<OwMain>,
    #[serde(deserialize_with = "lenient::list")]
    pub weather: Option<Vec<OwCondition>>,
    #[serde(deserialize_with = "lenient::nested")]
    pub wind: Option<OwWind>,
    #[serde(deserialize_with = "lenient::nested")]
    pub clouds: Option<OwClouds>,
    #[serde(deserialize_with = "lenient::number")]
    pub visibility: Option<f64>,
    #[serde(deserialize_with = "lenient::nested")]
    pub sys: Option<OwSys>,
    #[serde(deserialize_with = "lenient::integer")]
    pub timezone: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OwMain {
    #[serde(deserialize_with = "lenient::number")]
    pub temp: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub feels_like: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub temp_min: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub temp_max: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub pressure: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub humidity: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OwCondition {
    #[serde(deserialize_with = "lenient::text")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OwWind {
    #[serde(deserialize_with = "lenient::number")]
    pub speed: Option<f64>,
    #[serde(deserialize_with = "lenient::number")]
    pub deg: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OwClouds {
    #[serde(deserialize_with = "lenient::number")]
    pub all: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OwSys {
    #[serde(deserialize_with = "lenient::text")]
    pub country: Option<String>,
    #[serde(deserialize_with = "lenient::integer")]
    pub sunrise: Option<i64>,
    #[serde(deserialize_with = "lenient::integer")]
    pub sunset: Option<i64>,
}

/// Value-or-absent field decoders for upstream payloads.
mod lenient {
    use serde::{Deserialize, Deserializer, de::DeserializeOwned};
    use serde_json::Value;

    pub fn number<'de, D: Deserializer<'de>>(de: D) -> Result<Option<f64>, D::Error> {
        Ok(match Value::deserialize(de)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        })
    }

    pub fn integer<'de, D: Deserializer<'de>>(de: D) -> Result<Option<i64>, D::Error> {
        Ok(match Value::deserialize(de)? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|v| v as i64)),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        })
    }

    pub fn text<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(de)? {
            Value::String(s) => Some(s),
            _ => None,
        })
    }

    pub fn nested<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(match Value::deserialize(de)? {
            value @ Value::Object(_) => T::deserialize(value).ok(),
            _ => None,
        })
    }

    /// Keeps the entries that decode and drops the rest.
    pub fn list<'de, D, T>(de: D) -> Result<Option<Vec<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(match Value::deserialize(de)? {
            Value::Array(items) => {
                Some(items.into_iter().filter_map(|item| T::deserialize(item).ok()).collect())
            }
            _ => None,
        })
    }
}

impl WeatherObservation {
    pub fn city_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNKNOWN)
    }

    pub fn country(&self) -> &str {
        self.sys.as_ref().and_then(|s| s.country.as_deref()).unwrap_or("")
    }

    /// Description of the first reported condition.
    pub fn description(&self) -> &str {
        self.weather
            .as_ref()
            .and_then(|w| w.first())
            .and_then(|c| c.description.as_deref())
            .unwrap_or(UNKNOWN)
    }

    pub fn temperature(&self) -> f64 {
        self.main_field(|m| m.temp)
    }

    pub fn feels_like(&self) -> f64 {
        self.main_field(|m| m.feels_like)
    }

    pub fn temp_min(&self) -> f64 {
        self.main_field(|m| m.temp_min)
    }

    pub fn temp_max(&self) -> f64 {
        self.main_field(|m| m.temp_max)
    }

    pub fn pressure(&self) -> f64 {
        self.main_field(|m| m.pressure)
    }

    pub fn humidity(&self) -> f64 {
        self.main_field(|m| m.humidity)
    }

    pub fn wind_speed(&self) -> f64 {
        self.wind.as_ref().and_then(|w| w.speed).unwrap_or(0.0)
    }

    pub fn wind_deg(&self) -> f64 {
        self.wind.as_ref().and_then(|w| w.deg).unwrap_or(0.0)
    }

    pub fn cloudiness(&self) -> f64 {
        self.clouds.as_ref().and_then(|c| c.all).unwrap_or(0.0)
    }

    pub fn visibility_m(&self) -> f64 {
        self.visibility.unwrap_or(0.0)
    }

    pub fn sunrise(&self) -> i64 {
        self.sys.as_ref().and_then(|s| s.sunrise).unwrap_or(0)
    }

    pub fn sunset(&self) -> i64 {
        self.sys.as_ref().and_then(|s| s.sunset).unwrap_or(0)
    }

    pub fn timezone_offset_secs(&self) -> i64 {
        self.timezone.unwrap_or(0)
    }

    fn main_field(&self, pick: impl Fn(&OwMain) -> Option<f64>) -> f64 {
        self.main.as_ref().and_then(pick).unwrap_or(0.0)
    }
}
