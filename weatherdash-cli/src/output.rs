//! Terminal rendering of dashboard views.

use weatherdash_core::{
    DashboardView, WeatherPanel,
    map::{MapViewport, TILE_ATTRIBUTION},
    render::{ChartSeries, FavoritesView},
};

const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Join rendered lines, each terminated by a newline.
fn block(lines: Vec<String>) -> String {
    lines.into_iter().map(|l| l + "\n").collect()
}

pub fn dashboard(view: &DashboardView) -> String {
    let mut lines = vec![
        format!("weatherdash {}  [{}]", view.theme_icon, view.unit.temperature_symbol()),
        String::new(),
    ];

    match &view.panel {
        WeatherPanel::Placeholder(message) => lines.push(format!("  {message}")),
        WeatherPanel::Failed { placeholder, reason } => {
            lines.push(format!("  {placeholder}"));
            lines.push(format!("  ({reason})"));
        }
        WeatherPanel::Weather {
            current,
            details,
            forecast,
            chart,
        } => {
            lines.push(format!("  {}{}  {}", current.temperature, current.unit_symbol, current.headline));
            lines.push(format!(
                "  Feels like {}° • Humidity {}% • Wind {} {}",
                current.feels_like, current.humidity_pct, current.wind_speed, current.wind_unit
            ));
            lines.push(format!("  {}   {}", current.favorite_label(), current.icon_url));
            lines.push(String::new());

            lines.extend(
                details
                    .iter()
                    .map(|row| format!("  {:<11}{}", format!("{}:", row.label), row.value)),
            );
            lines.push(String::new());

            lines.push("  Forecast".to_string());
            lines.extend(
                forecast
                    .iter()
                    .map(|tile| format!("  {:<8}{:>4}°  {}", tile.label, tile.temperature, tile.description)),
            );
            lines.push(String::new());

            lines.push(self::chart(chart).trim_end().to_string());
        }
    }

    lines.push(String::new());
    lines.push(map(&view.map).trim_end().to_string());
    lines.push(String::new());
    lines.push(favorites(&view.favorites).trim_end().to_string());

    block(lines)
}

pub fn chart(series: &ChartSeries) -> String {
    let mut lines = vec![format!("  {}", series.label)];

    if let Some((min, max)) = series.range() {
        let span = (max - min).max(1) as f64;
        let bars: String = series
            .values
            .iter()
            .map(|v| {
                let idx = ((*v - min) as f64 / span * (BARS.len() - 1) as f64).round() as usize;
                BARS[idx.min(BARS.len() - 1)]
            })
            .collect();

        lines.push(format!("  {bars}  {min}°..{max}°"));
        lines.push(format!("  {}", series.labels.join(" ")));
    }

    block(lines)
}

pub fn map(map: &MapViewport) -> String {
    let mut lines = vec![format!("  Map: {} (zoom {})", map.center, map.zoom)];
    if let Some(marker) = &map.marker {
        let label = marker.label.as_deref().unwrap_or("-");
        lines.push(format!("  Marker: {label} at {}", marker.position));
    }
    lines.push(format!("  Tile: {}  {}", map.center_tile_url(), TILE_ATTRIBUTION));
    block(lines)
}

pub fn favorites(view: &FavoritesView) -> String {
    let mut lines = vec!["  Favorites".to_string()];
    match view {
        FavoritesView::Empty(message) => lines.push(format!("    {message}")),
        FavoritesView::Items(names) => lines.extend(names.iter().map(|name| format!("    • {name}"))),
    }
    block(lines)
}
