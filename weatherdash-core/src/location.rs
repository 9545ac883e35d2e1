//! Device location sources and the startup fallback chain.

use async_trait::async_trait;
use std::time::Duration;

use crate::{
    DashError,
    config::NamedLocation,
    model::{Coordinates, FavoriteEntry},
};

/// Label used when the weather is loaded for the device location.
pub const DEVICE_LOCATION_LABEL: &str = "Your location";

#[async_trait]
pub trait Geolocator: Send + Sync {
    async fn locate(&self) -> Result<Coordinates, DashError>;
}

/// Reports a fixed position, typically the `home` entry of the config file.
#[derive(Debug, Clone, Default)]
pub struct StaticGeolocator {
    position: Option<Coordinates>,
}

impl StaticGeolocator {
    pub fn new(position: Option<Coordinates>) -> Self {
        Self { position }
    }
}

#[async_trait]
impl Geolocator for StaticGeolocator {
    async fn locate(&self) -> Result<Coordinates, DashError> {
        self.position
            .ok_or_else(|| DashError::Geolocation("no home location configured".to_string()))
    }
}

/// Wait at most `timeout` for a position.
pub async fn locate_within(
    geolocator: &dyn Geolocator,
    timeout: Duration,
) -> Result<Coordinates, DashError> {
    match tokio::time::timeout(timeout, geolocator.locate()).await {
        Ok(result) => result,
        Err(_) => Err(DashError::Geolocation(format!(
            "timed out after {}s",
            timeout.as_secs_f32()
        ))),
    }
}

/// Where to start when the device location is unknown: the first favorite,
/// otherwise `default`.
pub fn fallback_location(
    favorites: &[FavoriteEntry],
    default: &NamedLocation,
) -> (Coordinates, String) {
    match favorites.first() {
        Some(fav) => (fav.coordinates(), fav.name.clone()),
        None => (default.coordinates(), default.name.clone()),
    }
}
