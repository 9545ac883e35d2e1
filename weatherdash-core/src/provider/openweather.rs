use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    DashError,
    model::{Coordinates, CurrentConditions, PlaceCandidate, RawForecastSample, Units},
};

use super::{GEOCODE_LIMIT, WeatherProvider};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

const GEOCODE_PATH: &str = "/geo/1.0/direct";
const CURRENT_PATH: &str = "/data/2.5/weather";
const FORECAST_PATH: &str = "/data/2.5/forecast";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        service: &'static str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, DashError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, service, "sending request");

        let res = self
            .http
            .get(&url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(DashError::Http {
                service,
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(|source| DashError::Parse { what: service, source })
    }
}

#[derive(Debug, Deserialize)]
struct OwGeoPlace {
    name: String,
    state: Option<String>,
    #[serde(default)]
    country: String,
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    pressure: u32,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    sunrise: i64,
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: i64,
    coord: OwCoord,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: OwWind,
    visibility: Option<u32>,
    sys: OwSys,
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: Option<OwForecastMain>,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

impl From<OwGeoPlace> for PlaceCandidate {
    fn from(p: OwGeoPlace) -> Self {
        PlaceCandidate {
            name: p.name,
            state: p.state.filter(|s| !s.is_empty()),
            country: p.country,
            lat: p.lat,
            lon: p.lon,
        }
    }
}

impl TryFrom<OwCurrentResponse> for CurrentConditions {
    type Error = DashError;

    fn try_from(r: OwCurrentResponse) -> Result<Self, Self::Error> {
        let weather = r.weather.into_iter().next().ok_or_else(|| {
            DashError::InvalidSample(format!("current conditions for '{}' have no weather entry", r.name))
        })?;

        Ok(CurrentConditions {
            coordinates: Coordinates::new(r.coord.lat, r.coord.lon),
            temperature: r.main.temp,
            feels_like: r.main.feels_like,
            humidity_pct: r.main.humidity,
            wind_speed: r.wind.speed,
            pressure: r.main.pressure,
            visibility: r.visibility,
            sunrise: unix_to_utc(r.sys.sunrise)?,
            sunset: unix_to_utc(r.sys.sunset)?,
            observed_at: unix_to_utc(r.dt)?,
            icon: weather.icon,
            description: weather.description,
            name: r.name,
        })
    }
}

impl TryFrom<OwForecastEntry> for RawForecastSample {
    type Error = DashError;

    fn try_from(e: OwForecastEntry) -> Result<Self, Self::Error> {
        let timestamp = unix_to_utc(e.dt)?;

        let temperature = e.main.and_then(|m| m.temp).ok_or_else(|| {
            DashError::InvalidSample(format!("forecast sample at {timestamp} has no temperature"))
        })?;

        let weather = e.weather.into_iter().next().ok_or_else(|| {
            DashError::InvalidSample(format!("forecast sample at {timestamp} has no weather code"))
        })?;

        Ok(RawForecastSample {
            timestamp,
            temperature,
            icon: weather.icon,
            description: weather.description,
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn geocode(&self, query: &str) -> Result<Vec<PlaceCandidate>, DashError> {
        let places: Vec<OwGeoPlace> = self
            .get_json(
                "OpenWeather geocoding",
                GEOCODE_PATH,
                &[("q", query.to_string()), ("limit", GEOCODE_LIMIT.to_string())],
            )
            .await?;

        Ok(places.into_iter().take(GEOCODE_LIMIT).map(PlaceCandidate::from).collect())
    }

    async fn current_conditions(
        &self,
        at: Coordinates,
        units: Units,
    ) -> Result<CurrentConditions, DashError> {
        let parsed: OwCurrentResponse = self
            .get_json("OpenWeather current", CURRENT_PATH, &location_query(at, units))
            .await?;

        CurrentConditions::try_from(parsed)
    }

    async fn forecast(
        &self,
        at: Coordinates,
        units: Units,
    ) -> Result<Vec<RawForecastSample>, DashError> {
        let parsed: OwForecastResponse = self
            .get_json("OpenWeather forecast", FORECAST_PATH, &location_query(at, units))
            .await?;

        parsed.list.into_iter().map(RawForecastSample::try_from).collect()
    }
}

fn location_query(at: Coordinates, units: Units) -> [(&'static str, String); 3] {
    [
        ("lat", at.lat.to_string()),
        ("lon", at.lon.to_string()),
        ("units", units.as_str().to_string()),
    ]
}

fn unix_to_utc(ts: i64) -> Result<DateTime<Utc>, DashError> {
    DateTime::from_timestamp(ts, 0)
        .ok_or_else(|| DashError::InvalidSample(format!("timestamp {ts} is out of range")))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
