//! Domain models shared across the orchestrator.

use serde::Deserialize;

/// The only media type admitted into pipeline state.
///
/// Acceptance is by declared type alone; file content is never sniffed.
pub const ACCEPTED_MEDIA_TYPE: &str = "audio/wav";

/// A user-chosen audio asset, held until submission or reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// Display name (usually the original file name).
    pub name: String,
    /// Declared media type, e.g. `audio/wav`.
    pub media_type: String,
    /// Raw file payload.
    pub payload: Vec<u8>,
}

impl SelectedFile {
    /// Create a selected file from its name, declared type, and payload.
    pub fn new(
        name: impl Into<String>,
        media_type: impl Into<String>,
        payload: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            payload,
        }
    }

    /// Payload size in bytes.
    pub fn size(&self) -> u64 {
        self.payload.len() as u64
    }

    /// Payload size in megabytes, for display.
    pub fn size_megabytes(&self) -> f64 {
        self.payload.len() as f64 / 1024.0 / 1024.0
    }
}

/// Response of a successful classification submission.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClassificationResult {
    /// Human-readable status message from the backend.
    pub message: String,
    /// Echoed name of the submitted file.
    pub filename: String,
    /// Clip duration in seconds; absent means unknown.
    #[serde(default)]
    pub duration: Option<f64>,
    /// Predicted genre label, free text, case preserved as returned.
    pub predicted_genre: String,
}

/// A single catalog search result, mapped into display form.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackSummary {
    /// Stable catalog identifier.
    pub id: String,
    /// Track title.
    pub title: String,
    /// Artist names, in catalog order.
    pub artists: Vec<String>,
    /// Album title.
    pub album: String,
    /// Artwork URLs, in catalog order (largest first).
    pub artwork: Vec<String>,
    /// External deep link into the catalog.
    pub link: String,
    /// Short preview-audio URL; absent means no playback control is offered.
    pub preview_url: Option<String>,
}

impl TrackSummary {
    /// All artist names joined for single-line display.
    pub fn artist_line(&self) -> String {
        self.artists.join(", ")
    }
}

/// Pre-ranked similarity feed returned by the classification backend.
///
/// Entries arrive sorted descending by score; no re-sorting happens here.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GenreRecommendations {
    /// Genre the feed was built for.
    pub predicted_genre: String,
    /// Ranked recommendations, backend order preserved.
    pub recommendations: Vec<RecommendedTrack>,
}

/// One entry of the backend similarity feed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RecommendedTrack {
    /// Artist name.
    pub artist: String,
    /// Track title.
    pub name: String,
    /// Similarity score as a percentage.
    pub similarity: f64,
}
