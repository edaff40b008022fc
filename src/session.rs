//! Upload/classify pipeline.
//!
//! The stateful heart of the orchestrator: validates a selected file,
//! submits it for classification, runs the simulated progress alongside the
//! request, and chains the predicted genre into the recommendation fetcher.
//! A generation counter makes superseded submissions inert: their responses
//! are discarded on arrival instead of overwriting newer state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::classifier::ClassifierClient;
use crate::config::Config;
use crate::error::UploadError;
use crate::models::{ClassificationResult, SelectedFile, ACCEPTED_MEDIA_TYPE};
use crate::progress::SimulatedProgress;
use crate::recommendations::RecommendationFetcher;

#[derive(Default)]
struct UploadState {
    selected: Option<SelectedFile>,
    result: Option<ClassificationResult>,
    error: Option<UploadError>,
    busy: bool,
}

/// Point-in-time view of the pipeline, safe to hand to a renderer.
#[derive(Debug, Clone)]
pub struct UploadSnapshot {
    /// Name of the currently selected file, if any.
    pub file_name: Option<String>,
    /// Size in bytes of the currently selected file, if any.
    pub file_size: Option<u64>,
    /// Result of the last successful submission.
    pub result: Option<ClassificationResult>,
    /// Current user-facing error, if any.
    pub error: Option<UploadError>,
    /// A submission is in flight.
    pub busy: bool,
    /// Simulated upload progress, 0..=100.
    pub progress: u8,
}

/// The upload/classify session orchestrator.
pub struct UploadSession {
    classifier: ClassifierClient,
    recommendations: Arc<RecommendationFetcher>,
    progress: SimulatedProgress,
    state: Mutex<UploadState>,
    generation: AtomicU64,
}

impl UploadSession {
    /// Create a session around a classifier client and a shared fetcher.
    pub fn new(
        classifier: ClassifierClient,
        recommendations: Arc<RecommendationFetcher>,
        config: &Config,
    ) -> Self {
        Self {
            classifier,
            recommendations,
            progress: SimulatedProgress::new(config.progress_duration(), config.progress_tick()),
            state: Mutex::new(UploadState::default()),
            generation: AtomicU64::new(0),
        }
    }

    /// Offer a candidate file to the pipeline.
    ///
    /// Only a declared media type of exactly `audio/wav` is admitted; the
    /// check is declared-type only, content is never inspected. Rejection
    /// sets the validation error and leaves any prior selection untouched.
    /// Acceptance replaces the selection and clears result, error, and all
    /// recommendation state.
    pub fn select_file(&self, candidate: SelectedFile) -> Result<(), UploadError> {
        if candidate.media_type != ACCEPTED_MEDIA_TYPE {
            tracing::warn!(
                media_type = %candidate.media_type,
                name = %candidate.name,
                "Rejected file with unsupported media type"
            );
            self.state.lock().error = Some(UploadError::UnsupportedMediaType);
            return Err(UploadError::UnsupportedMediaType);
        }

        // Supersede any in-flight submission before installing the new file.
        self.generation.fetch_add(1, Ordering::SeqCst);

        let mut state = self.state.lock();
        tracing::debug!(name = %candidate.name, size_bytes = candidate.size(), "File selected");
        state.selected = Some(candidate);
        state.result = None;
        state.error = None;
        drop(state);

        self.recommendations.clear();
        Ok(())
    }

    /// Reset the pipeline to its empty state. Idempotent.
    pub fn clear(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);

        let mut state = self.state.lock();
        state.selected = None;
        state.result = None;
        state.error = None;
        drop(state);

        self.progress.reset();
        self.recommendations.clear();
    }

    /// Submit the selected file for classification.
    ///
    /// With no file selected this fails immediately without touching the
    /// network. Otherwise: busy is set, prior result/error cleared, the
    /// simulated progress starts concurrently with (and independent of) the
    /// upload, and one classification request is issued. On success the
    /// result is stored and the recommendation fetcher is invoked once with
    /// the predicted genre, sequentially after the classification response.
    /// On failure a generic error is stored. Busy clears in all cases and
    /// nothing retries automatically.
    pub async fn submit(&self) -> Result<(), UploadError> {
        let (file, generation) = {
            let mut state = self.state.lock();
            if state.busy {
                tracing::debug!("Submission already in flight; ignoring");
                return Ok(());
            }
            let Some(file) = state.selected.clone() else {
                state.error = Some(UploadError::NoFileSelected);
                return Err(UploadError::NoFileSelected);
            };
            state.busy = true;
            state.result = None;
            state.error = None;
            (file, self.generation.fetch_add(1, Ordering::SeqCst) + 1)
        };

        self.recommendations.clear();
        self.progress.start();

        match self.classifier.classify(&file).await {
            Ok(result) => {
                let genre = result.predicted_genre.clone();
                let fresh = {
                    let mut state = self.state.lock();
                    let fresh = self.generation.load(Ordering::SeqCst) == generation;
                    if fresh {
                        state.result = Some(result);
                    }
                    state.busy = false;
                    fresh
                };

                if !fresh {
                    tracing::debug!("Discarding superseded classification response");
                    return Ok(());
                }

                self.recommendations.fetch_by_genre(&genre).await;
                Ok(())
            }
            Err(error) => {
                tracing::error!(error = %error, "Classification submission failed");
                let mut state = self.state.lock();
                if self.generation.load(Ordering::SeqCst) == generation {
                    state.error = Some(UploadError::ClassificationFailed);
                }
                state.busy = false;
                Err(UploadError::ClassificationFailed)
            }
        }
    }

    /// Current pipeline state.
    pub fn snapshot(&self) -> UploadSnapshot {
        let state = self.state.lock();
        UploadSnapshot {
            file_name: state.selected.as_ref().map(|f| f.name.clone()),
            file_size: state.selected.as_ref().map(|f| f.size()),
            result: state.result.clone(),
            error: state.error,
            busy: state.busy,
            progress: self.progress.value(),
        }
    }

    /// Simulated upload progress, 0..=100.
    pub fn progress(&self) -> u8 {
        self.progress.value()
    }
}
