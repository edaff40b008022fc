//! Genre-driven catalog recommendations.
//!
//! Fed by the upload pipeline with a predicted genre; queries the catalog
//! and holds the current track collection. Fetch failures are logged only
//! and never surface to the user: the previous collection stays in place,
//! which the UI renders as "no new results" rather than an error.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::catalog::{CatalogClient, CredentialCache};
use crate::config::Config;
use crate::models::TrackSummary;

/// Fetches and holds catalog tracks for a predicted genre.
pub struct RecommendationFetcher {
    catalog: CatalogClient,
    credentials: Arc<CredentialCache>,
    limit: u8,
    results: Mutex<Vec<TrackSummary>>,
    generation: AtomicU64,
}

impl RecommendationFetcher {
    /// Create a fetcher sharing the process-wide credential cache.
    pub fn new(catalog: CatalogClient, credentials: Arc<CredentialCache>, config: &Config) -> Self {
        Self {
            catalog,
            credentials,
            limit: config.recommend_limit,
            results: Mutex::new(Vec::new()),
            generation: AtomicU64::new(0),
        }
    }

    /// Query the catalog for tracks matching `genre`.
    ///
    /// No-op when no token is available. On success the collection is
    /// replaced wholesale; on failure it is left untouched. A response that
    /// was superseded by a newer fetch or a reset is discarded on arrival.
    pub async fn fetch_by_genre(&self, genre: &str) {
        let Some(token) = self.credentials.token().await else {
            tracing::debug!(genre = %genre, "No catalog token; skipping recommendation fetch");
            return;
        };

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let query = format!("genre:\"{genre}\"");

        match self.catalog.search_tracks(&token, &query, self.limit).await {
            Ok(tracks) => {
                if self.generation.load(Ordering::SeqCst) == generation {
                    tracing::info!(
                        genre = %genre,
                        count = tracks.len(),
                        "Catalog recommendations updated"
                    );
                    *self.results.lock() = tracks;
                } else {
                    tracing::debug!(genre = %genre, "Discarding stale recommendation response");
                }
            }
            Err(error) => {
                tracing::warn!(error = %error, genre = %genre, "Recommendation fetch failed");
            }
        }
    }

    /// Current track collection, in provider order.
    pub fn results(&self) -> Vec<TrackSummary> {
        self.results.lock().clone()
    }

    /// Empty the collection and supersede any in-flight fetch.
    pub fn clear(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.results.lock().clear();
    }
}
