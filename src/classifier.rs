//! Classification backend client.
//!
//! Covers the two endpoints the backend exposes: multipart upload for
//! genre prediction, and the pre-ranked similarity feed.

use reqwest::multipart;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{ClassificationResult, GenreRecommendations, SelectedFile};

const USER_AGENT: &str = concat!("tunescout/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the classification backend.
#[derive(Debug, Clone)]
pub struct ClassifierClient {
    http: reqwest::Client,
    base_url: String,
}

impl ClassifierClient {
    /// Create a client from configuration.
    pub fn new(config: &Config) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.http_timeout())
            .build()?;

        Ok(Self {
            http,
            base_url: config.classifier_url.trim_end_matches('/').to_string(),
        })
    }

    /// Submit an audio payload for genre prediction.
    ///
    /// Issues one `POST /api/predict` with the file under the multipart
    /// field name `file`. Any non-success status is an error; no retry.
    pub async fn classify(&self, file: &SelectedFile) -> AppResult<ClassificationResult> {
        let part = multipart::Part::bytes(file.payload.clone())
            .file_name(file.name.clone())
            .mime_str(&file.media_type)?;
        let form = multipart::Form::new().part("file", part);

        tracing::debug!(
            filename = %file.name,
            size_bytes = file.size(),
            "Submitting audio for classification"
        );

        let response = self
            .http
            .post(format!("{}/api/predict", self.base_url))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Classification request rejected");
            return Err(AppError::upstream(status));
        }

        let result: ClassificationResult = response.json().await?;

        tracing::info!(
            filename = %result.filename,
            genre = %result.predicted_genre,
            "Classification succeeded"
        );

        Ok(result)
    }

    /// Fetch the backend's pre-ranked similarity feed.
    ///
    /// Entries are returned in backend order, assumed sorted descending by
    /// similarity score.
    pub async fn recommend(&self) -> AppResult<GenreRecommendations> {
        let response = self
            .http
            .get(format!("{}/api/recommend", self.base_url))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::upstream(status));
        }

        Ok(response.json().await?)
    }
}
