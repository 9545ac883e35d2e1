use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

use crate::{
    Config, DashError,
    model::{Coordinates, CurrentConditions, PlaceCandidate, RawForecastSample, Units},
    provider::openweather::OpenWeatherProvider,
};

pub mod openweather;

/// Maximum number of geocoding candidates requested per query.
pub const GEOCODE_LIMIT: usize = 6;

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Resolve free text to at most [`GEOCODE_LIMIT`] places.
    async fn geocode(&self, query: &str) -> Result<Vec<PlaceCandidate>, DashError>;

    async fn current_conditions(
        &self,
        at: Coordinates,
        units: Units,
    ) -> Result<CurrentConditions, DashError>;

    /// Chronological 3-hourly samples covering roughly five days.
    async fn forecast(
        &self,
        at: Coordinates,
        units: Units,
    ) -> Result<Vec<RawForecastSample>, DashError>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> Result<Arc<dyn WeatherProvider>, DashError> {
    let api_key = config.api_key().ok_or(DashError::MissingApiKey)?;

    let provider = match config.api_base_url.as_deref() {
        Some(base) => OpenWeatherProvider::with_base_url(api_key, base),
        None => OpenWeatherProvider::new(api_key),
    };

    Ok(Arc::new(provider))
}
