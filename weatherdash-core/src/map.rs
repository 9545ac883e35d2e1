//! Map viewport and marker state.

use serde::Serialize;
use std::f64::consts::PI;

use crate::model::Coordinates;

pub const TILE_URL_TEMPLATE: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const TILE_ATTRIBUTION: &str = "© OpenStreetMap";
pub const MAX_ZOOM: u8 = 19;

const INITIAL_CENTER: Coordinates = Coordinates {
    lat: 20.5937,
    lon: 78.9629,
};
const INITIAL_ZOOM: u8 = 5;
const FOCUS_ZOOM: u8 = 10;
const DEFAULT_MARKER_LABEL: &str = "Location";
const SUBDOMAINS: [char; 3] = ['a', 'b', 'c'];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub position: Coordinates,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapViewport {
    pub center: Coordinates,
    pub zoom: u8,
    pub marker: Option<Marker>,
}

impl Default for MapViewport {
    fn default() -> Self {
        Self {
            center: INITIAL_CENTER,
            zoom: INITIAL_ZOOM,
            marker: Some(Marker {
                position: INITIAL_CENTER,
                label: None,
            }),
        }
    }
}

impl MapViewport {
    /// Centre on `at` and move the marker there with a popup label.
    pub fn focus(&mut self, at: Coordinates, label: Option<&str>) {
        self.center = at;
        self.zoom = FOCUS_ZOOM;
        self.marker = Some(Marker {
            position: at,
            label: Some(label.unwrap_or(DEFAULT_MARKER_LABEL).to_string()),
        });
    }

    pub fn marker_position(&self) -> Option<Coordinates> {
        self.marker.as_ref().map(|m| m.position)
    }

    /// URL of the tile containing the viewport centre.
    pub fn center_tile_url(&self) -> String {
        let (x, y) = tile_for(self.center, self.zoom);
        tile_url(self.zoom, x, y)
    }
}

/// Web-mercator tile indices containing `at` at `zoom`.
pub fn tile_for(at: Coordinates, zoom: u8) -> (u32, u32) {
    let zoom = zoom.min(MAX_ZOOM);
    let n = f64::from(1u32 << zoom);
    let lat = at.lat.clamp(-85.0511, 85.0511).to_radians();

    let x = ((at.lon + 180.0) / 360.0 * n).floor();
    let y = ((1.0 - lat.tan().asinh() / PI) / 2.0 * n).floor();

    let max = n - 1.0;
    (x.clamp(0.0, max) as u32, y.clamp(0.0, max) as u32)
}

pub fn tile_url(zoom: u8, x: u32, y: u32) -> String {
    let subdomain = SUBDOMAINS[((x + y) % SUBDOMAINS.len() as u32) as usize];
    TILE_URL_TEMPLATE
        .replace("{s}", &subdomain.to_string())
        .replace("{z}", &zoom.to_string())
        .replace("{x}", &x.to_string())
        .replace("{y}", &y.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_view_has_marker_at_center() {
        let map = MapViewport::default();
        assert_eq!(map.zoom, 5);
        assert_eq!(map.marker_position(), Some(Coordinates::new(20.5937, 78.9629)));
    }

    #[test]
    fn focus_moves_marker_and_zooms_in() {
        let mut map = MapViewport::default();
        map.focus(Coordinates::new(59.91, 10.75), Some("Oslo"));

        assert_eq!(map.zoom, 10);
        assert_eq!(map.center, Coordinates::new(59.91, 10.75));
        assert_eq!(map.marker.as_ref().unwrap().label.as_deref(), Some("Oslo"));

        map.focus(Coordinates::new(1.0, 2.0), None);
        assert_eq!(map.marker.unwrap().label.as_deref(), Some("Location"));
    }

    #[test]
    fn tile_indices_match_known_values() {
        assert_eq!(tile_for(Coordinates::new(0.0, 0.0), 1), (1, 1));
        assert_eq!(tile_for(Coordinates::new(51.5074, -0.1278), 10), (511, 340));
        assert_eq!(tile_for(Coordinates::new(-90.0, 180.0), 2), (3, 3));
    }

    #[test]
    fn tile_url_fills_template() {
        assert_eq!(tile_url(10, 511, 340), "https://c.tile.openstreetmap.org/10/511/340.png");
    }
}
