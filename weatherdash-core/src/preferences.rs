use std::sync::Arc;

use crate::{
    DashError,
    model::{Preferences, Theme, Units},
    storage::KeyValueStore,
};

pub const UNIT_KEY: &str = "wd_unit";
pub const THEME_KEY: &str = "wd_theme";

/// Unit and theme preferences, cached in memory and written through.
pub struct PreferenceStore {
    storage: Arc<dyn KeyValueStore>,
    current: Preferences,
}

impl PreferenceStore {
    /// Load preferences; absent or unrecognised values fall back to the
    /// defaults (metric, light).
    pub fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let unit = storage
            .get(UNIT_KEY)
            .and_then(|v| v.parse::<Units>().ok())
            .unwrap_or_default();
        let theme = storage
            .get(THEME_KEY)
            .and_then(|v| v.parse::<Theme>().ok())
            .unwrap_or_default();

        Self {
            storage,
            current: Preferences { unit, theme },
        }
    }

    pub fn preferences(&self) -> Preferences {
        self.current
    }

    pub fn unit(&self) -> Units {
        self.current.unit
    }

    pub fn theme(&self) -> Theme {
        self.current.theme
    }

    pub fn set_unit(&mut self, unit: Units) -> Result<(), DashError> {
        self.storage.set(UNIT_KEY, unit.as_str())?;
        self.current.unit = unit;
        Ok(())
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<(), DashError> {
        self.storage.set(THEME_KEY, theme.as_str())?;
        self.current.theme = theme;
        Ok(())
    }

    pub fn toggle_unit(&mut self) -> Result<Units, DashError> {
        let next = self.current.unit.toggled();
        self.set_unit(next)?;
        Ok(next)
    }

    pub fn toggle_theme(&mut self) -> Result<Theme, DashError> {
        let next = self.current.theme.toggled();
        self.set_theme(next)?;
        Ok(next)
    }
}
