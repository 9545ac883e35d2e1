//! Pure view descriptions for each dashboard panel.
//!
//! Nothing here performs I/O; front ends turn these structs into pixels or
//! terminal text.

use chrono::TimeZone;
use serde::Serialize;

use crate::model::{CurrentConditions, DaySummary, FavoriteEntry, Units};

pub const LOADING_MESSAGE: &str = "Loading weather…";
pub const LOAD_FAILED_MESSAGE: &str = "Could not load weather. Try again.";
pub const NO_FAVORITES_MESSAGE: &str = "No favorites yet";

const ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentCard {
    pub temperature: i64,
    pub unit_symbol: &'static str,
    /// "Oslo · Light Rain"
    pub headline: String,
    pub feels_like: i64,
    pub humidity_pct: u8,
    pub wind_speed: i64,
    pub wind_unit: &'static str,
    pub icon_url: String,
    pub icon_alt: String,
    pub is_favorite: bool,
}

impl CurrentCard {
    /// Label of the favorite toggle button.
    pub fn favorite_label(&self) -> String {
        format!("{} Favorite", if self.is_favorite { '★' } else { '☆' })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailRow {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastTile {
    /// "Mon 14"
    pub label: String,
    pub icon_url: String,
    pub description: String,
    pub temperature: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub label: String,
    pub labels: Vec<String>,
    pub values: Vec<i64>,
}

impl ChartSeries {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// (min, max) of the series, if any.
    pub fn range(&self) -> Option<(i64, i64)> {
        let min = *self.values.iter().min()?;
        let max = *self.values.iter().max()?;
        Some((min, max))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FavoritesView {
    Empty(&'static str),
    Items(Vec<String>),
}

pub fn render_current(current: &CurrentConditions, units: Units, is_favorite: bool) -> CurrentCard {
    CurrentCard {
        temperature: round_half_up(current.temperature),
        unit_symbol: units.temperature_symbol(),
        headline: format!("{} · {}", current.name, capitalize_words(&current.description)),
        feels_like: round_half_up(current.feels_like),
        humidity_pct: current.humidity_pct,
        wind_speed: round_half_up(current.wind_speed),
        wind_unit: units.wind_speed_unit(),
        icon_url: format!("{ICON_BASE_URL}/{}@2x.png", current.icon),
        icon_alt: current.description.clone(),
        is_favorite,
    }
}

/// Pressure, visibility and sun times, the latter in `local` time.
pub fn render_details<Tz>(current: &CurrentConditions, local: &Tz) -> Vec<DetailRow>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let visibility_km = round_half_up(f64::from(current.visibility.unwrap_or(0)) / 1000.0);
    let time = |t: &chrono::DateTime<chrono::Utc>| t.with_timezone(local).format("%H:%M:%S").to_string();

    vec![
        DetailRow {
            label: "Pressure",
            value: format!("{} hPa", current.pressure),
        },
        DetailRow {
            label: "Visibility",
            value: format!("{visibility_km} km"),
        },
        DetailRow {
            label: "Sunrise",
            value: time(&current.sunrise),
        },
        DetailRow {
            label: "Sunset",
            value: time(&current.sunset),
        },
    ]
}

pub fn render_forecast(days: &[DaySummary]) -> Vec<ForecastTile> {
    days.iter()
        .map(|d| ForecastTile {
            label: d.date.format("%a %-d").to_string(),
            icon_url: format!("{ICON_BASE_URL}/{}.png", d.icon),
            description: d.description.clone(),
            temperature: round_half_up(d.average_temperature),
        })
        .collect()
}

pub fn render_chart(days: &[DaySummary], units: Units) -> ChartSeries {
    ChartSeries {
        label: format!("Temp ({})", units.temperature_symbol()),
        labels: days.iter().map(|d| d.date.format("%a").to_string()).collect(),
        values: days.iter().map(|d| round_half_up(d.average_temperature)).collect(),
    }
}

pub fn render_favorites(favorites: &[FavoriteEntry]) -> FavoritesView {
    if favorites.is_empty() {
        FavoritesView::Empty(NO_FAVORITES_MESSAGE)
    } else {
        FavoritesView::Items(favorites.iter().map(|f| f.name.clone()).collect())
    }
}

/// Rounds .5 toward positive infinity, so -2.5 becomes -2.
pub fn round_half_up(value: f64) -> i64 {
    let floor = value.floor();
    let rounded = if value - floor >= 0.5 { floor + 1.0 } else { floor };
    rounded as i64
}

/// Upper-cases the first character of every word.
pub fn capitalize_words(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_is_word = false;

    for c in s.chars() {
        let is_word = c.is_alphanumeric() || c == '_';
        if is_word && !prev_is_word {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        prev_is_word = is_word;
    }

    out
}
