//! Preview playback coordination.
//!
//! One coordinator object owns every audio handle the application opens and
//! enforces the process-wide invariant that at most one stream plays at any
//! time, no matter which UI surface asked for playback. Surfaces never
//! touch audio handles directly; they call [`PlaybackCoordinator::toggle_play`].

pub mod output;

pub use output::{AudioOutput, AudioSink, RodioOutput};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::config::Config;
use crate::error::AppResult;
use crate::models::TrackSummary;

const USER_AGENT: &str = concat!("tunescout/", env!("CARGO_PKG_VERSION"));

/// Poll interval of the end-of-stream watcher.
const END_POLL: Duration = Duration::from_millis(200);

/// What a [`PlaybackCoordinator::toggle_play`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Playback of the requested track started.
    Playing,
    /// The requested track was active and has been paused.
    Paused,
    /// No preview is available for the track, or opening it failed;
    /// everything is paused and the coordinator is idle.
    Unavailable,
}

struct ActiveStream {
    track_id: String,
    handle: Arc<dyn AudioSink>,
}

#[derive(Default)]
struct CoordinatorState {
    active: Option<ActiveStream>,
    handles: Vec<Arc<dyn AudioSink>>,
}

struct CoordinatorInner {
    output: Arc<dyn AudioOutput>,
    http: reqwest::Client,
    state: Mutex<CoordinatorState>,
    generation: AtomicU64,
}

/// Single-owner coordinator for preview playback.
#[derive(Clone)]
pub struct PlaybackCoordinator {
    inner: Arc<CoordinatorInner>,
}

impl PlaybackCoordinator {
    /// Create a coordinator over the given audio output seam.
    pub fn new(output: Arc<dyn AudioOutput>, config: &Config) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.http_timeout())
            .build()?;

        Ok(Self {
            inner: Arc::new(CoordinatorInner {
                output,
                http,
                state: Mutex::new(CoordinatorState::default()),
                generation: AtomicU64::new(0),
            }),
        })
    }

    /// Identifier of the track currently playing, if any.
    pub fn currently_playing(&self) -> Option<String> {
        self.inner
            .state
            .lock()
            .active
            .as_ref()
            .map(|a| a.track_id.clone())
    }

    /// Toggle playback for a track.
    ///
    /// If the track is the active one, it is paused and the coordinator goes
    /// idle. Otherwise every known handle is paused first, and only then,
    /// if the track carries a preview URL, a new stream is opened and
    /// recorded as active. Preview download or decode failures are logged
    /// and leave the coordinator idle.
    pub async fn toggle_play(&self, track: &TrackSummary) -> ToggleOutcome {
        let generation = {
            let mut state = self.inner.state.lock();
            state.handles.retain(|handle| !handle.is_finished());

            let was_active = state
                .active
                .as_ref()
                .is_some_and(|active| active.track_id == track.id);

            // Blanket pause: the active handle and every other handle this
            // coordinator ever opened.
            if let Some(active) = state.active.take() {
                active.handle.pause();
            }
            for handle in &state.handles {
                handle.pause();
            }

            let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
            if was_active {
                return ToggleOutcome::Paused;
            }
            generation
        };

        let Some(url) = track.preview_url.as_deref() else {
            return ToggleOutcome::Unavailable;
        };

        let payload = match self.fetch_preview(url).await {
            Ok(payload) => payload,
            Err(error) => {
                tracing::warn!(error = %error, track = %track.id, "Preview download failed");
                return ToggleOutcome::Unavailable;
            }
        };

        let handle = match self.inner.output.open(payload) {
            Ok(handle) => handle,
            Err(error) => {
                tracing::warn!(error = %error, track = %track.id, "Preview playback failed");
                return ToggleOutcome::Unavailable;
            }
        };

        {
            let mut state = self.inner.state.lock();
            if self.inner.generation.load(Ordering::SeqCst) != generation {
                // A newer toggle happened while the preview was downloading.
                handle.pause();
                return ToggleOutcome::Unavailable;
            }
            state.handles.push(Arc::clone(&handle));
            state.active = Some(ActiveStream {
                track_id: track.id.clone(),
                handle: Arc::clone(&handle),
            });
        }

        tracing::debug!(track = %track.id, "Preview playback started");
        self.spawn_end_watcher(generation, handle);
        ToggleOutcome::Playing
    }

    /// Watch the active handle and go idle when it finishes on its own.
    fn spawn_end_watcher(&self, generation: u64, handle: Arc<dyn AudioSink>) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(END_POLL).await;

                if inner.generation.load(Ordering::SeqCst) != generation {
                    // A newer toggle owns the state now.
                    return;
                }

                if handle.is_finished() {
                    let mut state = inner.state.lock();
                    if inner.generation.load(Ordering::SeqCst) == generation {
                        state.active = None;
                        state.handles.retain(|h| !h.is_finished());
                    }
                    return;
                }
            }
        });
    }

    async fn fetch_preview(&self, url: &str) -> AppResult<Vec<u8>> {
        let response = self.inner.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(crate::error::AppError::upstream(status));
        }
        Ok(response.bytes().await?.to_vec())
    }
}
