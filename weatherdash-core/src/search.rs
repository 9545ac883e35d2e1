//! Debounced place suggestions.
//!
//! Each call supersedes the previous one: its cancellation token fires,
//! which drops both a pending debounce timer and an in-flight geocoding
//! request.

use parking_lot::Mutex;
use std::{sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;

use crate::{model::PlaceCandidate, provider::WeatherProvider};

/// Queries shorter than this hide the suggestion list.
pub const MIN_QUERY_CHARS: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub enum Suggestions {
    /// Nothing to show: query too short, no matches, or lookup failed.
    Hidden,
    Show(Vec<PlaceCandidate>),
    /// A newer query replaced this one before it completed.
    Superseded,
}

pub struct SuggestionSearch {
    provider: Arc<dyn WeatherProvider>,
    debounce: Duration,
    pending: Mutex<Option<CancellationToken>>,
}

impl SuggestionSearch {
    pub fn new(provider: Arc<dyn WeatherProvider>, debounce: Duration) -> Self {
        Self {
            provider,
            debounce,
            pending: Mutex::new(None),
        }
    }

    /// Cancel whatever lookup is pending.
    pub fn cancel(&self) {
        if let Some(token) = self.pending.lock().take() {
            token.cancel();
        }
    }

    pub async fn suggest(&self, query: &str) -> Suggestions {
        let token = CancellationToken::new();
        if let Some(previous) = self.pending.lock().replace(token.clone()) {
            previous.cancel();
        }

        let query = query.trim();
        if query.chars().count() < MIN_QUERY_CHARS {
            return Suggestions::Hidden;
        }

        let lookup = async {
            tokio::time::sleep(self.debounce).await;
            self.provider.geocode(query).await
        };

        tokio::select! {
            _ = token.cancelled() => {
                tracing::debug!(query, "suggestion lookup superseded");
                Suggestions::Superseded
            }
            result = lookup => match result {
                Ok(places) if places.is_empty() => Suggestions::Hidden,
                Ok(places) => Suggestions::Show(places),
                Err(e) => {
                    tracing::warn!(query, error = %e, "geocoding failed");
                    Suggestions::Hidden
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        DashError,
        model::{Coordinates, CurrentConditions, RawForecastSample, Units},
    };
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct FakeGeocoder {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl WeatherProvider for FakeGeocoder {
        async fn geocode(&self, query: &str) -> Result<Vec<PlaceCandidate>, DashError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DashError::Http {
                    service: "geocoding",
                    status: 500,
                    body: String::new(),
                });
            }
            if query == "zz" {
                return Ok(Vec::new());
            }
            Ok(vec![PlaceCandidate {
                name: query.to_string(),
                state: None,
                country: "XX".into(),
                lat: 1.0,
                lon: 2.0,
            }])
        }

        async fn current_conditions(
            &self,
            _at: Coordinates,
            _units: Units,
        ) -> Result<CurrentConditions, DashError> {
            unimplemented!("not used by search")
        }

        async fn forecast(
            &self,
            _at: Coordinates,
            _units: Units,
        ) -> Result<Vec<RawForecastSample>, DashError> {
            unimplemented!("not used by search")
        }
    }

    fn search(geocoder: Arc<FakeGeocoder>) -> Arc<SuggestionSearch> {
        Arc::new(SuggestionSearch::new(geocoder, Duration::from_millis(350)))
    }

    #[tokio::test(start_paused = true)]
    async fn short_query_hides_without_lookup() {
        let geocoder = Arc::new(FakeGeocoder::default());
        let search = search(geocoder.clone());

        assert_eq!(search.suggest("O").await, Suggestions::Hidden);
        assert_eq!(search.suggest("  ").await, Suggestions::Hidden);
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn lookup_runs_after_debounce() {
        let geocoder = Arc::new(FakeGeocoder::default());
        let search = search(geocoder.clone());

        match search.suggest("Oslo").await {
            Suggestions::Show(places) => assert_eq!(places[0].name, "Oslo"),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn newer_keystroke_supersedes_pending_lookup() {
        let geocoder = Arc::new(FakeGeocoder::default());
        let search = search(geocoder.clone());

        let first = tokio::spawn({
            let search = search.clone();
            async move { search.suggest("Os").await }
        });
        // Let the first call register its token and start waiting.
        tokio::time::sleep(Duration::from_millis(100)).await;

        let second = search.suggest("Oslo").await;

        assert_eq!(first.await.unwrap(), Suggestions::Superseded);
        assert!(matches!(second, Suggestions::Show(ref p) if p[0].name == "Oslo"));
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failures_and_empty_results_hide_suggestions() {
        let failing = Arc::new(FakeGeocoder {
            fail: true,
            ..FakeGeocoder::default()
        });
        assert_eq!(search(failing).suggest("Oslo").await, Suggestions::Hidden);

        let empty = Arc::new(FakeGeocoder::default());
        assert_eq!(search(empty).suggest("zz").await, Suggestions::Hidden);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_drops_pending_lookup() {
        let geocoder = Arc::new(FakeGeocoder::default());
        let search = search(geocoder.clone());

        let pending = tokio::spawn({
            let search = search.clone();
            async move { search.suggest("Lima").await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        search.cancel();

        assert_eq!(pending.await.unwrap(), Suggestions::Superseded);
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 0);
    }
}
