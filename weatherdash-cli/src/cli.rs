use anyhow::{Context, anyhow};
use chrono::Local;
use clap::{Parser, Subcommand};
use inquire::{Password, Select, Text};
use std::{io::Write, sync::Arc};

use weatherdash_core::{
    Config, Coordinates, Dashboard, PlaceCandidate, SuggestionSearch, Suggestions, Units,
    asset_cache::AssetCache,
    favorites::FavoritesStore,
    location::StaticGeolocator,
    preferences::PreferenceStore,
    provider_from_config,
    render::render_favorites,
    storage::{FileStore, KeyValueStore, MemoryStore},
};

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherdash", version, about = "Weather dashboard in your terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and an optional home location.
    Configure,

    /// Show the dashboard for a place, or for your location when omitted.
    Show {
        /// Place name to search for.
        query: Option<String>,

        /// Add the shown place to favorites, or remove it if already there.
        #[arg(long)]
        favorite: bool,
    },

    /// Set the unit system, or toggle it when no value is given.
    Unit {
        /// "metric" or "imperial".
        unit: Option<String>,
    },

    /// Toggle between light and dark theme.
    Theme,

    /// List or edit favorite places.
    Favorites {
        #[command(subcommand)]
        action: Option<FavoritesAction>,
    },

    /// Manage the offline copy of the dashboard shell.
    Assets {
        /// Origin serving the shell, e.g. "https://weather.example.com".
        #[arg(long)]
        origin: Option<String>,

        #[command(subcommand)]
        action: AssetsAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum FavoritesAction {
    List,
    Remove { name: String },
}

#[derive(Debug, Subcommand)]
pub enum AssetsAction {
    /// Download every shell asset into the cache.
    Install,
    /// Fetch one asset, falling back to the cache when offline.
    Get { path: String },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;

        match self.command {
            Command::Configure => configure(config)?,
            Command::Show { query, favorite } => show(&config, query, favorite).await?,
            Command::Unit { unit } => {
                let mut prefs = PreferenceStore::load(open_storage());
                let unit = match unit {
                    Some(value) => {
                        let unit: Units = value.parse()?;
                        prefs.set_unit(unit)?;
                        unit
                    }
                    None => prefs.toggle_unit()?,
                };
                println!("Units: {unit} ({})", unit.temperature_symbol());
            }
            Command::Theme => {
                let mut prefs = PreferenceStore::load(open_storage());
                let theme = prefs.toggle_theme()?;
                println!("Theme: {theme} {}", theme.icon());
            }
            Command::Favorites { action } => {
                let mut favorites = FavoritesStore::load(open_storage());
                match action.unwrap_or(FavoritesAction::List) {
                    FavoritesAction::List => {
                        print!("{}", output::favorites(&render_favorites(favorites.list())));
                    }
                    FavoritesAction::Remove { name } => {
                        if favorites.remove(&name)? {
                            println!("Removed '{name}' from favorites.");
                        } else {
                            println!("'{name}' is not a favorite.");
                        }
                    }
                }
            }
            Command::Assets { origin, action } => {
                let origin = origin.or_else(|| config.asset_origin.clone()).ok_or_else(|| {
                    anyhow!(
                        "No asset origin given.\n\
                         Hint: pass --origin or set `asset_origin` in {}.",
                        Config::config_file_path()
                            .map(|p| p.display().to_string())
                            .unwrap_or_else(|_| "the config file".to_string())
                    )
                })?;
                let cache = AssetCache::new(&origin, &Config::asset_cache_dir()?);

                match action {
                    AssetsAction::Install => {
                        let count = cache.install().await?;
                        println!("Cached {count} assets in {}", cache.dir().display());
                    }
                    AssetsAction::Get { path } => {
                        let res = cache.fetch(&path).await?;
                        eprintln!("{} ({:?}, HTTP {})", path, res.source, res.status);
                        std::io::stdout()
                            .write_all(&res.body)
                            .context("Failed to write asset to stdout")?;
                    }
                }
            }
        }

        Ok(())
    }
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    config.set_api_key(api_key.trim().to_string());

    let home = Text::new("Home location as \"lat, lon\" (empty to skip):")
        .prompt()
        .context("Failed to read home location")?;
    if !home.trim().is_empty() {
        config.home = Some(parse_coordinates(&home)?);
    }

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(config: &Config, query: Option<String>, favorite: bool) -> anyhow::Result<()> {
    let provider = provider_from_config(config)?;
    let mut dashboard = Dashboard::new(
        provider.clone(),
        open_storage(),
        config.default_location.clone(),
        Local,
    );

    match query {
        Some(query) => {
            let search = SuggestionSearch::new(provider, config.search_debounce());
            let places = match search.suggest(&query).await {
                Suggestions::Show(places) => places,
                Suggestions::Hidden | Suggestions::Superseded => {
                    println!("No places found for '{query}'.");
                    return Ok(());
                }
            };
            let place = pick_place(places)?;
            dashboard.select_place(&place).await;
        }
        None => {
            let geolocator = StaticGeolocator::new(config.home);
            dashboard.start(&geolocator, config.geolocation_timeout()).await;
        }
    }

    if favorite {
        match dashboard.toggle_favorite()? {
            Some(true) => println!("Added to favorites."),
            Some(false) => println!("Removed from favorites."),
            None => println!("Nothing loaded to add to favorites."),
        }
    }

    print!("{}", output::dashboard(&dashboard.view()));
    Ok(())
}

fn pick_place(mut places: Vec<PlaceCandidate>) -> anyhow::Result<PlaceCandidate> {
    if places.len() == 1 {
        return Ok(places.remove(0));
    }

    Select::new("Select a place:", places)
        .prompt()
        .context("No place selected")
}

fn parse_coordinates(input: &str) -> anyhow::Result<Coordinates> {
    let (lat, lon) = input
        .split_once(',')
        .ok_or_else(|| anyhow!("Expected \"lat, lon\", got '{input}'"))?;

    let lat: f64 = lat.trim().parse().with_context(|| format!("Invalid latitude '{lat}'"))?;
    let lon: f64 = lon.trim().parse().with_context(|| format!("Invalid longitude '{lon}'"))?;

    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(anyhow!("Coordinates out of range: {lat}, {lon}"));
    }

    Ok(Coordinates::new(lat, lon))
}

/// Preferences and favorites on disk, or in memory when the platform has no
/// data directory.
fn open_storage() -> Arc<dyn KeyValueStore> {
    let opened = Config::state_file_path()
        .map_err(|e| e.to_string())
        .and_then(|path| FileStore::open(path).map_err(|e| e.to_string()));

    match opened {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::warn!(error = %e, "state file unavailable, preferences will not persist");
            Arc::new(MemoryStore::new())
        }
    }
}
