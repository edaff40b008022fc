//! Catalog bearer-token cache.
//!
//! One process-wide cache performs the client-credentials exchange and
//! hands the opaque token to every catalog-querying component. Acquisition
//! failure is silent towards the user: it is logged, the cache stays empty,
//! and downstream queries become no-ops.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::config::Config;
use crate::error::{AppError, AppResult};

const USER_AGENT: &str = concat!("tunescout/", env!("CARGO_PKG_VERSION"));

/// Fallback validity window when the token response omits `expires_in`.
const DEFAULT_EXPIRY_SECS: i64 = 3600;

/// Tokens within this margin of expiry are treated as already expired, so a
/// query never goes out with a credential about to lapse mid-flight.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Token endpoint response body.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// A stored token with its computed expiry instant.
#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn from_response(response: TokenResponse) -> Self {
        let validity = response.expires_in.unwrap_or(DEFAULT_EXPIRY_SECS);
        Self {
            access_token: response.access_token,
            expires_at: Utc::now() + Duration::seconds(validity),
        }
    }

    /// Check whether the token has passed (or is about to pass) its expiry.
    fn is_expired(&self) -> bool {
        Utc::now() + Duration::seconds(EXPIRY_MARGIN_SECS) >= self.expires_at
    }
}

/// Process-wide bearer-token cache for the catalog API.
pub struct CredentialCache {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    state: Mutex<Option<CachedToken>>,
}

impl CredentialCache {
    /// Build the cache and perform the single initial token acquisition.
    ///
    /// Acquisition failure is logged and leaves the cache empty; it is not
    /// an error at this level. The returned cache is shared by reference
    /// with every catalog-querying component.
    pub async fn connect(config: &Config) -> AppResult<Arc<Self>> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.http_timeout())
            .build()?;

        let cache = Arc::new(Self {
            http,
            token_url: format!("{}/api/token", config.accounts_url.trim_end_matches('/')),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            state: Mutex::new(None),
        });

        match cache.acquire().await {
            Ok(token) => {
                tracing::info!(expires_at = %token.expires_at, "Catalog token acquired");
                *cache.state.lock().await = Some(token);
            }
            Err(error) => {
                tracing::warn!(
                    error = %error,
                    "Catalog token acquisition failed; catalog queries disabled"
                );
            }
        }

        Ok(cache)
    }

    /// Current token for read-only use, or `None` when unavailable.
    ///
    /// A token past its expiry window triggers exactly one refresh attempt;
    /// a failed refresh empties the cache and stays silent. A cache whose
    /// initial acquisition failed never retries.
    pub async fn token(&self) -> Option<String> {
        let mut state = self.state.lock().await;

        let current = state.as_ref()?;
        if !current.is_expired() {
            return Some(current.access_token.clone());
        }

        tracing::debug!("Catalog token expired; refreshing");
        match self.acquire().await {
            Ok(token) => {
                let access_token = token.access_token.clone();
                *state = Some(token);
                Some(access_token)
            }
            Err(error) => {
                tracing::warn!(error = %error, "Catalog token refresh failed");
                *state = None;
                None
            }
        }
    }

    /// Perform one client-credentials exchange against the token endpoint.
    async fn acquire(&self) -> AppResult<CachedToken> {
        let basic = BASE64.encode(format!("{}:{}", self.client_id, self.client_secret));

        let response = self
            .http
            .post(&self.token_url)
            .header(reqwest::header::AUTHORIZATION, format!("Basic {basic}"))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::TokenAcquisition(format!(
                "status {}: {}",
                status.as_u16(),
                body
            )));
        }

        let body: TokenResponse = response.json().await?;
        Ok(CachedToken::from_response(body))
    }
}
