use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::DashError;

/// Unit system sent to the weather service and used for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    /// e.g. "°C"
    pub fn temperature_symbol(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
        }
    }

    pub fn wind_speed_unit(&self) -> &'static str {
        match self {
            Units::Metric => "m/s",
            Units::Imperial => "mph",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Units::Metric => Units::Imperial,
            Units::Imperial => Units::Metric,
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Units {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            _ => Err(anyhow::anyhow!(
                "Unknown unit system '{value}'. Supported: metric, imperial."
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Icon shown on the theme toggle.
    pub fn icon(&self) -> &'static str {
        match self {
            Theme::Light => "🌞",
            Theme::Dark => "🌙",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(anyhow::anyhow!("Unknown theme '{value}'. Supported: light, dark.")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lon)
    }
}

/// One geocoding match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceCandidate {
    pub name: String,
    pub state: Option<String>,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
}

impl PlaceCandidate {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lon)
    }

    /// "Springfield, Illinois"
    pub fn short_label(&self) -> String {
        match &self.state {
            Some(state) => format!("{}, {}", self.name, state),
            None => self.name.clone(),
        }
    }

    /// "Springfield, Illinois • US", as shown in the suggestion list.
    pub fn suggestion_label(&self) -> String {
        format!("{} • {}", self.short_label(), self.country)
    }
}

impl fmt::Display for PlaceCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.suggestion_label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub name: String,
    pub coordinates: Coordinates,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity_pct: u8,
    pub wind_speed: f64,
    /// hPa
    pub pressure: u32,
    /// Metres; the service omits it for some stations.
    pub visibility: Option<u32>,
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
    pub observed_at: DateTime<Utc>,
    /// OpenWeather icon code, e.g. "10d".
    pub icon: String,
    pub description: String,
}

/// A single 3-hourly forecast reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawForecastSample {
    pub timestamp: DateTime<Utc>,
    pub temperature: f64,
    pub icon: String,
    pub description: String,
}

impl RawForecastSample {
    pub fn validate(&self) -> Result<(), DashError> {
        if !self.temperature.is_finite() {
            return Err(DashError::InvalidSample(format!(
                "sample at {} has non-finite temperature {}",
                self.timestamp, self.temperature
            )));
        }
        if self.icon.trim().is_empty() {
            return Err(DashError::InvalidSample(format!(
                "sample at {} has no weather code",
                self.timestamp
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub average_temperature: f64,
    pub icon: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteEntry {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl FavoriteEntry {
    pub fn new(name: impl Into<String>, coordinates: Coordinates) -> Self {
        Self {
            name: name.into(),
            lat: coordinates.lat,
            lon: coordinates.lon,
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lon)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Preferences {
    pub unit: Units,
    pub theme: Theme,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample(temp: f64, icon: &str) -> RawForecastSample {
        RawForecastSample {
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            temperature: temp,
            icon: icon.into(),
            description: "clear sky".into(),
        }
    }

    #[test]
    fn units_parse_and_toggle() {
        assert_eq!("Imperial".parse::<Units>().unwrap(), Units::Imperial);
        assert_eq!(Units::Metric.toggled(), Units::Imperial);
        assert_eq!(Units::Imperial.temperature_symbol(), "°F");
        assert!("kelvin".parse::<Units>().is_err());
    }

    #[test]
    fn theme_toggle_and_icon() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.icon(), "🌙");
        assert_eq!("dark".parse::<Theme>().unwrap(), Theme::Dark);
    }

    #[test]
    fn preferences_default_to_metric_light() {
        let prefs = Preferences::default();
        assert_eq!(prefs.unit, Units::Metric);
        assert_eq!(prefs.theme, Theme::Light);
    }

    #[test]
    fn candidate_labels_skip_missing_state() {
        let mut place = PlaceCandidate {
            name: "Springfield".into(),
            state: Some("Illinois".into()),
            country: "US".into(),
            lat: 39.8,
            lon: -89.6,
        };
        assert_eq!(place.suggestion_label(), "Springfield, Illinois • US");

        place.state = None;
        assert_eq!(place.short_label(), "Springfield");
        assert_eq!(place.suggestion_label(), "Springfield • US");
    }

    #[test]
    fn sample_validation_rejects_malformed_values() {
        assert!(sample(12.5, "01d").validate().is_ok());
        assert!(matches!(
            sample(f64::NAN, "01d").validate(),
            Err(DashError::InvalidSample(_))
        ));
        assert!(matches!(sample(12.5, " ").validate(), Err(DashError::InvalidSample(_))));
    }
}
