//! Application state for one dashboard session.
//!
//! `Dashboard` is the single writer for preferences, favorites, the map and
//! the last loaded weather. Rendering reads that state through [`Dashboard::view`].

use chrono::{Local, TimeZone};
use serde::Serialize;
use std::{fmt::Display, sync::Arc, time::Duration};

use crate::{
    DashError,
    aggregate::group_forecast_to_days,
    config::NamedLocation,
    favorites::FavoritesStore,
    location::{DEVICE_LOCATION_LABEL, Geolocator, fallback_location, locate_within},
    map::MapViewport,
    model::{
        Coordinates, CurrentConditions, DaySummary, FavoriteEntry, PlaceCandidate, Theme,
        Units,
    },
    preferences::PreferenceStore,
    provider::WeatherProvider,
    render::{
        self, ChartSeries, CurrentCard, DetailRow, FavoritesView, ForecastTile, LOAD_FAILED_MESSAGE,
        LOADING_MESSAGE,
    },
    storage::KeyValueStore,
};

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedWeather {
    pub current: CurrentConditions,
    pub days: Vec<DaySummary>,
    pub units: Units,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Idle,
    Loading,
    Loaded(Box<LoadedWeather>),
    /// Holds the user-facing reason; the panel shows a fixed placeholder.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum WeatherPanel {
    Placeholder(&'static str),
    /// Fixed placeholder plus the reason the last load failed.
    Failed {
        placeholder: &'static str,
        reason: String,
    },
    Weather {
        current: CurrentCard,
        details: Vec<DetailRow>,
        forecast: Vec<ForecastTile>,
        chart: ChartSeries,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub unit: Units,
    pub theme: Theme,
    pub theme_icon: &'static str,
    pub panel: WeatherPanel,
    pub favorites: FavoritesView,
    pub map: MapViewport,
}

/// `Tz` is the zone used for representative forecast hours and sun times.
pub struct Dashboard<Tz: TimeZone = Local> {
    provider: Arc<dyn WeatherProvider>,
    preferences: PreferenceStore,
    favorites: FavoritesStore,
    map: MapViewport,
    local: Tz,
    default_location: NamedLocation,
    state: LoadState,
}

impl<Tz> Dashboard<Tz>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    pub fn new(
        provider: Arc<dyn WeatherProvider>,
        storage: Arc<dyn KeyValueStore>,
        default_location: NamedLocation,
        local: Tz,
    ) -> Self {
        Self {
            provider,
            preferences: PreferenceStore::load(storage.clone()),
            favorites: FavoritesStore::load(storage),
            map: MapViewport::default(),
            local,
            default_location,
            state: LoadState::Idle,
        }
    }

    pub fn favorites(&self) -> &[FavoriteEntry] {
        self.favorites.list()
    }

    pub fn map(&self) -> &MapViewport {
        &self.map
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Fetch current conditions and forecast for `at` and replace the shown
    /// weather. Failures leave the dashboard usable with a placeholder.
    /// Returns whether the load succeeded.
    pub async fn load_weather(&mut self, at: Coordinates, label: Option<&str>) -> bool {
        self.state = LoadState::Loading;
        let units = self.preferences.unit();

        match self.fetch(at, units).await {
            Ok(loaded) => {
                let label = label.unwrap_or(&loaded.current.name).to_string();
                self.map.focus(at, Some(&label));
                tracing::info!(%at, %label, days = loaded.days.len(), "weather loaded");
                self.state = LoadState::Loaded(Box::new(loaded));
                true
            }
            Err(e) => {
                if e.is_fetch_failure() {
                    tracing::error!(%at, error = %e, "could not load weather");
                } else {
                    tracing::error!(%at, error = %e, "weather data rejected");
                }
                self.state = LoadState::Failed(e.user_message());
                false
            }
        }
    }

    async fn fetch(&self, at: Coordinates, units: Units) -> Result<LoadedWeather, DashError> {
        let (current, samples) = tokio::try_join!(
            self.provider.current_conditions(at, units),
            self.provider.forecast(at, units),
        )?;

        let days = group_forecast_to_days(&samples, &self.local)?;

        Ok(LoadedWeather {
            current,
            days,
            units,
        })
    }

    pub async fn select_place(&mut self, place: &PlaceCandidate) -> bool {
        self.load_weather(place.coordinates(), Some(&place.name)).await
    }

    /// Initial load: device location if it arrives within `timeout`,
    /// otherwise the first favorite, otherwise the default location.
    pub async fn start(&mut self, geolocator: &dyn Geolocator, timeout: Duration) -> bool {
        match locate_within(geolocator, timeout).await {
            Ok(at) => self.load_weather(at, Some(DEVICE_LOCATION_LABEL)).await,
            Err(e) => {
                tracing::warn!(error = %e, "geolocation failed, using fallback location");
                let (at, name) = fallback_location(self.favorites.list(), &self.default_location);
                self.load_weather(at, Some(&name)).await
            }
        }
    }

    /// Switch unit system and reload at the marker.
    pub async fn toggle_unit(&mut self) -> Result<Units, DashError> {
        let unit = self.preferences.toggle_unit()?;
        self.reload().await;
        Ok(unit)
    }

    async fn reload(&mut self) -> bool {
        match self.map.marker_position() {
            Some(at) => self.load_weather(at, None).await,
            None => {
                let default = self.default_location.clone();
                self.load_weather(default.coordinates(), Some(&default.name)).await
            }
        }
    }

    pub fn toggle_theme(&mut self) -> Result<Theme, DashError> {
        self.preferences.toggle_theme()
    }

    /// Toggle the loaded location in favorites. `None` when nothing is loaded.
    pub fn toggle_favorite(&mut self) -> Result<Option<bool>, DashError> {
        let LoadState::Loaded(loaded) = &self.state else {
            return Ok(None);
        };

        let entry = FavoriteEntry::new(loaded.current.name.clone(), loaded.current.coordinates);
        self.favorites.toggle(entry).map(Some)
    }

    pub fn view(&self) -> DashboardView {
        let prefs = self.preferences.preferences();

        let panel = match &self.state {
            LoadState::Idle | LoadState::Loading => WeatherPanel::Placeholder(LOADING_MESSAGE),
            LoadState::Failed(reason) => WeatherPanel::Failed {
                placeholder: LOAD_FAILED_MESSAGE,
                reason: reason.clone(),
            },
            LoadState::Loaded(loaded) => {
                let is_favorite = self.favorites.contains(&loaded.current.name);
                WeatherPanel::Weather {
                    current: render::render_current(&loaded.current, loaded.units, is_favorite),
                    details: render::render_details(&loaded.current, &self.local),
                    forecast: render::render_forecast(&loaded.days),
                    chart: render::render_chart(&loaded.days, loaded.units),
                }
            }
        };

        DashboardView {
            unit: prefs.unit,
            theme: prefs.theme,
            theme_icon: prefs.theme.icon(),
            panel,
            favorites: render::render_favorites(self.favorites.list()),
            map: self.map.clone(),
        }
    }
}
