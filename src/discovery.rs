//! Standalone similarity feed surface.
//!
//! The sibling of the catalog-driven recommendation fetcher: it queries the
//! classification backend's own pre-ranked feed, carries fully independent
//! busy/error/data state, and is triggered by explicit user action rather
//! than chained to the upload pipeline.

use parking_lot::Mutex;

use crate::classifier::ClassifierClient;
use crate::models::GenreRecommendations;

/// Generic user-facing message for a failed feed refresh.
const FETCH_FAILED: &str = "Failed to fetch recommendations";

/// Snapshot of the feed surface's state.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryState {
    /// A refresh is in flight.
    pub loading: bool,
    /// User-facing error from the last refresh, if it failed.
    pub error: Option<String>,
    /// The feed from the last successful refresh.
    pub feed: Option<GenreRecommendations>,
}

/// Explicitly-triggered similarity feed backed by the classification backend.
pub struct DiscoveryFeed {
    classifier: ClassifierClient,
    state: Mutex<DiscoveryState>,
}

impl DiscoveryFeed {
    pub fn new(classifier: ClassifierClient) -> Self {
        Self {
            classifier,
            state: Mutex::new(DiscoveryState::default()),
        }
    }

    /// Refresh the feed.
    ///
    /// Clears prior data and error up front; stores either the new feed or
    /// the generic failure message. Loading clears in all cases.
    pub async fn refresh(&self) {
        {
            let mut state = self.state.lock();
            state.loading = true;
            state.error = None;
            state.feed = None;
        }

        let outcome = self.classifier.recommend().await;

        let mut state = self.state.lock();
        match outcome {
            Ok(feed) => {
                tracing::info!(
                    genre = %feed.predicted_genre,
                    count = feed.recommendations.len(),
                    "Similarity feed refreshed"
                );
                state.feed = Some(feed);
            }
            Err(error) => {
                tracing::warn!(error = %error, "Similarity feed refresh failed");
                state.error = Some(FETCH_FAILED.to_string());
            }
        }
        state.loading = false;
    }

    /// Current state of the surface.
    pub fn state(&self) -> DiscoveryState {
        self.state.lock().clone()
    }
}
