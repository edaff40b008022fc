//! Debounced track search.
//!
//! Raw keystrokes come in on every input change; a single pending lookup
//! fires only after the quiescence interval passes with no further input.
//! An empty query clears results immediately without scheduling anything.
//! Generation counting guarantees at most one lookup's results are applied
//! and that a slow stale response can never overwrite newer ones.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::catalog::{CatalogClient, CredentialCache};
use crate::config::Config;
use crate::models::TrackSummary;

struct SearchInner {
    catalog: CatalogClient,
    credentials: Arc<CredentialCache>,
    limit: u8,
    results: Mutex<Vec<TrackSummary>>,
    searching: AtomicBool,
    generation: AtomicU64,
    version: watch::Sender<u64>,
}

impl SearchInner {
    async fn run_lookup(&self, query: String, generation: u64) {
        let Some(token) = self.credentials.token().await else {
            tracing::debug!(query = %query, "No catalog token; skipping search");
            return;
        };

        self.searching.store(true, Ordering::SeqCst);
        let outcome = self.catalog.search_tracks(&token, &query, self.limit).await;

        if self.generation.load(Ordering::SeqCst) == generation {
            match outcome {
                Ok(tracks) => {
                    tracing::debug!(query = %query, count = tracks.len(), "Search results applied");
                    *self.results.lock() = tracks;
                    self.version.send_modify(|v| *v += 1);
                }
                Err(error) => {
                    tracing::warn!(error = %error, query = %query, "Track search failed");
                }
            }
        } else {
            tracing::debug!(query = %query, "Discarding stale search response");
        }
        self.searching.store(false, Ordering::SeqCst);
    }
}

/// Converts raw keystroke input into throttled catalog queries.
pub struct DebouncedSearch {
    inner: Arc<SearchInner>,
    pending: Mutex<Option<JoinHandle<()>>>,
    quiescence: Duration,
}

impl DebouncedSearch {
    /// Create a debouncer sharing the process-wide credential cache.
    pub fn new(catalog: CatalogClient, credentials: Arc<CredentialCache>, config: &Config) -> Self {
        let (version, _) = watch::channel(0);
        Self {
            inner: Arc::new(SearchInner {
                catalog,
                credentials,
                limit: config.search_limit,
                results: Mutex::new(Vec::new()),
                searching: AtomicBool::new(false),
                generation: AtomicU64::new(0),
                version,
            }),
            pending: Mutex::new(None),
            quiescence: config.debounce(),
        }
    }

    /// Feed the current query text; call on every keystroke.
    ///
    /// Each call cancels and reschedules the pending lookup, so only a
    /// sustained pause lets one fire. Whitespace-only input counts as empty.
    pub fn input(&self, query: &str) {
        if let Some(pending) = self.pending.lock().take() {
            pending.abort();
        }

        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let query = query.trim().to_string();

        if query.is_empty() {
            self.inner.results.lock().clear();
            self.inner.searching.store(false, Ordering::SeqCst);
            self.inner.version.send_modify(|v| *v += 1);
            return;
        }

        let inner = Arc::clone(&self.inner);
        let quiescence = self.quiescence;
        *self.pending.lock() = Some(tokio::spawn(async move {
            tokio::time::sleep(quiescence).await;
            inner.run_lookup(query, generation).await;
        }));
    }

    /// Current result set, in provider order.
    pub fn results(&self) -> Vec<TrackSummary> {
        self.inner.results.lock().clone()
    }

    /// A lookup is currently in flight.
    pub fn is_searching(&self) -> bool {
        self.inner.searching.load(Ordering::SeqCst)
    }

    /// Subscribe to result-set versions; bumps whenever results change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.version.subscribe()
    }
}

impl Drop for DebouncedSearch {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.lock().take() {
            pending.abort();
        }
    }
}
