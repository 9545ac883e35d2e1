use std::sync::Arc;

use crate::{DashError, model::FavoriteEntry, storage::KeyValueStore};

pub const FAVORITES_KEY: &str = "wd_favs";

/// Ordered list of bookmarked places, unique by name.
pub struct FavoritesStore {
    storage: Arc<dyn KeyValueStore>,
    entries: Vec<FavoriteEntry>,
}

impl FavoritesStore {
    pub fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let entries = match storage.get(FAVORITES_KEY) {
            Some(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "stored favorites are unreadable, starting empty");
                Vec::new()
            }),
            None => Vec::new(),
        };

        Self { storage, entries }
    }

    pub fn list(&self) -> &[FavoriteEntry] {
        &self.entries
    }

    pub fn first(&self) -> Option<&FavoriteEntry> {
        self.entries.first()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|f| f.name == name)
    }

    /// Append `entry` unless a favorite with the same name exists.
    /// Returns whether the list changed.
    pub fn add(&mut self, entry: FavoriteEntry) -> Result<bool, DashError> {
        if self.contains(&entry.name) {
            return Ok(false);
        }
        let mut next = self.entries.clone();
        next.push(entry);
        self.commit(next)?;
        Ok(true)
    }

    /// Returns whether anything was removed.
    pub fn remove(&mut self, name: &str) -> Result<bool, DashError> {
        if !self.contains(name) {
            return Ok(false);
        }
        let next = self
            .entries
            .iter()
            .filter(|f| f.name != name)
            .cloned()
            .collect();
        self.commit(next)?;
        Ok(true)
    }

    /// Remove the entry if its name is present, otherwise append it.
    /// Returns true when the entry is a favorite afterwards.
    pub fn toggle(&mut self, entry: FavoriteEntry) -> Result<bool, DashError> {
        if self.contains(&entry.name) {
            self.remove(&entry.name)?;
            Ok(false)
        } else {
            self.add(entry)?;
            Ok(true)
        }
    }

    /// Persist `next`, then make it the in-memory list.
    fn commit(&mut self, next: Vec<FavoriteEntry>) -> Result<(), DashError> {
        let json = serde_json::to_string(&next)
            .map_err(|e| DashError::Storage(format!("failed to serialize favorites: {e}")))?;
        self.storage.set(FAVORITES_KEY, &json)?;
        self.entries = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{model::Coordinates, storage::MemoryStore};

    fn entry(name: &str, lat: f64, lon: f64) -> FavoriteEntry {
        FavoriteEntry::new(name, Coordinates::new(lat, lon))
    }

    fn store() -> (Arc<dyn KeyValueStore>, FavoritesStore) {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let favorites = FavoritesStore::load(storage.clone());
        (storage, favorites)
    }

    #[test]
    fn add_appends_in_order_and_ignores_duplicate_names() {
        let (_, mut favs) = store();

        assert!(favs.add(entry("Oslo", 59.9, 10.7)).unwrap());
        assert!(favs.add(entry("Lima", -12.0, -77.0)).unwrap());
        assert!(!favs.add(entry("Oslo", 0.0, 0.0)).unwrap());

        let names: Vec<_> = favs.list().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Oslo", "Lima"]);
        assert_eq!(favs.list()[0].lat, 59.9);
    }

    #[test]
    fn uniqueness_is_by_name_not_coordinates() {
        let (_, mut favs) = store();

        favs.add(entry("Home", 1.0, 1.0)).unwrap();
        favs.add(entry("Office", 1.0, 1.0)).unwrap();
        assert_eq!(favs.list().len(), 2);
    }

    #[test]
    fn toggle_twice_restores_original_contents() {
        let (storage, mut favs) = store();
        favs.add(entry("Oslo", 59.9, 10.7)).unwrap();
        let original = favs.list().to_vec();

        assert!(favs.toggle(entry("Lima", -12.0, -77.0)).unwrap());
        assert!(favs.contains("Lima"));
        assert!(!favs.toggle(entry("Lima", -12.0, -77.0)).unwrap());

        assert_eq!(favs.list(), original.as_slice());
        assert_eq!(FavoritesStore::load(storage).list(), original.as_slice());
    }

    #[test]
    fn remove_missing_name_is_noop() {
        let (_, mut favs) = store();
        favs.add(entry("Oslo", 59.9, 10.7)).unwrap();
        assert!(!favs.remove("Paris").unwrap());
        assert_eq!(favs.list().len(), 1);
    }

    #[test]
    fn persisted_format_is_a_json_array() {
        let (storage, mut favs) = store();
        favs.add(entry("Oslo", 59.9, 10.7)).unwrap();

        let raw = storage.get(FAVORITES_KEY).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[0]["name"], "Oslo");
        assert_eq!(value[0]["lon"], 10.7);
    }

    struct ReadOnlyStore(MemoryStore);

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, key: &str) -> Option<String> {
            self.0.get(key)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), DashError> {
            Err(DashError::Storage("read-only".into()))
        }
    }

    #[test]
    fn failed_save_leaves_list_unchanged() {
        let inner = MemoryStore::new();
        let json = serde_json::to_string(&[entry("Oslo", 59.9, 10.7)]).unwrap();
        inner.set(FAVORITES_KEY, &json).unwrap();
        let mut favs = FavoritesStore::load(Arc::new(ReadOnlyStore(inner)));

        assert!(favs.toggle(entry("Lima", -12.0, -77.0)).is_err());
        assert!(!favs.contains("Lima"));
        assert_eq!(favs.list().len(), 1);

        assert!(favs.remove("Oslo").is_err());
        assert!(favs.contains("Oslo"));
    }

    #[test]
    fn unreadable_favorites_load_empty() {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        storage.set(FAVORITES_KEY, "not json").unwrap();

        let favs = FavoritesStore::load(storage);
        assert!(favs.list().is_empty());
        assert!(favs.first().is_none());
    }
}
