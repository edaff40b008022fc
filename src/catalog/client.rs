//! Authenticated catalog search client.
//!
//! Wire shapes mirror the provider's nested search response; they are
//! flattened into [`TrackSummary`] display models at the boundary.

use serde::Deserialize;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::TrackSummary;

const USER_AGENT: &str = concat!("tunescout/", env!("CARGO_PKG_VERSION"));

/// Catalog search response envelope.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    tracks: Option<TrackPage>,
}

#[derive(Debug, Deserialize)]
struct TrackPage {
    #[serde(default)]
    items: Vec<TrackItem>,
}

/// One track as the provider returns it.
#[derive(Debug, Deserialize)]
struct TrackItem {
    id: String,
    name: String,
    #[serde(default)]
    artists: Vec<ArtistRef>,
    album: AlbumRef,
    external_urls: ExternalUrls,
    #[serde(default)]
    preview_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArtistRef {
    name: String,
}

#[derive(Debug, Deserialize)]
struct AlbumRef {
    name: String,
    #[serde(default)]
    images: Vec<ImageRef>,
}

#[derive(Debug, Deserialize)]
struct ImageRef {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ExternalUrls {
    #[serde(default)]
    spotify: String,
}

impl From<TrackItem> for TrackSummary {
    fn from(item: TrackItem) -> Self {
        Self {
            id: item.id,
            title: item.name,
            artists: item.artists.into_iter().map(|a| a.name).collect(),
            album: item.album.name,
            artwork: item.album.images.into_iter().map(|i| i.url).collect(),
            link: item.external_urls.spotify,
            preview_url: item.preview_url,
        }
    }
}

/// HTTP client for the catalog search endpoint.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: String,
}

impl CatalogClient {
    /// Create a client from configuration.
    pub fn new(config: &Config) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.http_timeout())
            .build()?;

        Ok(Self {
            http,
            base_url: config.catalog_url.trim_end_matches('/').to_string(),
        })
    }

    /// Search the catalog for tracks matching `query`.
    ///
    /// Results are returned in provider order, capped at `limit`. A response
    /// without a track page maps to an empty list, not an error.
    pub async fn search_tracks(
        &self,
        token: &str,
        query: &str,
        limit: u8,
    ) -> AppResult<Vec<TrackSummary>> {
        let response = self
            .http
            .get(format!("{}/v1/search", self.base_url))
            .query(&[
                ("q", query),
                ("type", "track"),
                ("limit", limit.to_string().as_str()),
            ])
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), query = %query, "Catalog search rejected");
            return Err(AppError::upstream(status));
        }

        let body: SearchResponse = response.json().await?;
        let items = body.tracks.map(|page| page.items).unwrap_or_default();

        Ok(items.into_iter().map(TrackSummary::from).collect())
    }
}
