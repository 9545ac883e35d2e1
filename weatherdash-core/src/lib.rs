//! Core library for the `weatherdash` dashboard.
//!
//! This crate defines:
//! - Configuration and persisted preferences/favorites
//! - The OpenWeather adapter behind the `WeatherProvider` trait
//! - Forecast aggregation into per-day summaries
//! - Pure view rendering and the dashboard application state
//! - Debounced place search and the static asset cache
//!
//! It is used by `weatherdash-cli`, but can also drive other front ends.

pub mod aggregate;
pub mod asset_cache;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod favorites;
pub mod location;
pub mod map;
pub mod model;
pub mod preferences;
pub mod provider;
pub mod render;
pub mod search;
pub mod storage;

pub use aggregate::{MAX_FORECAST_DAYS, group_forecast_to_days};
pub use config::{Config, NamedLocation};
pub use dashboard::{Dashboard, DashboardView, LoadState, WeatherPanel};
pub use error::DashError;
pub use model::{
    Coordinates, CurrentConditions, DaySummary, FavoriteEntry, PlaceCandidate, Preferences,
    RawForecastSample, Theme, Units,
};
pub use provider::{WeatherProvider, provider_from_config};
pub use search::{SuggestionSearch, Suggestions};
