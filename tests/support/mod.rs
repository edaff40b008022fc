//! Mock upstream services for integration tests.
//!
//! Tiny axum routers bound to ephemeral ports stand in for the
//! classification backend and the catalog provider. Each mock exposes hit
//! counters and failure switches so tests can assert exactly which calls
//! went out.
#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use tunescout::config::{Config, LogFormat};

/// Mock classification backend.
pub struct MockClassifier {
    pub base_url: String,
    pub predict_hits: Arc<AtomicUsize>,
    pub recommend_hits: Arc<AtomicUsize>,
    pub fail_predict: Arc<AtomicBool>,
    pub fail_recommend: Arc<AtomicBool>,
    /// Artificial delay before the predict response, in milliseconds.
    pub predict_delay_ms: Arc<AtomicU64>,
}

#[derive(Clone)]
struct ClassifierCtx {
    predict_hits: Arc<AtomicUsize>,
    recommend_hits: Arc<AtomicUsize>,
    fail_predict: Arc<AtomicBool>,
    fail_recommend: Arc<AtomicBool>,
    predict_delay_ms: Arc<AtomicU64>,
}

pub async fn spawn_classifier() -> MockClassifier {
    let ctx = ClassifierCtx {
        predict_hits: Arc::new(AtomicUsize::new(0)),
        recommend_hits: Arc::new(AtomicUsize::new(0)),
        fail_predict: Arc::new(AtomicBool::new(false)),
        fail_recommend: Arc::new(AtomicBool::new(false)),
        predict_delay_ms: Arc::new(AtomicU64::new(0)),
    };

    let router = Router::new()
        .route("/api/predict", post(predict))
        .route("/api/recommend", get(recommend))
        .layer(DefaultBodyLimit::max(16 * 1024 * 1024))
        .with_state(ctx.clone());

    let addr = serve(router).await;

    MockClassifier {
        base_url: format!("http://{addr}"),
        predict_hits: ctx.predict_hits,
        recommend_hits: ctx.recommend_hits,
        fail_predict: ctx.fail_predict,
        fail_recommend: ctx.fail_recommend,
        predict_delay_ms: ctx.predict_delay_ms,
    }
}

async fn predict(
    State(ctx): State<ClassifierCtx>,
    mut multipart: Multipart,
) -> (StatusCode, Json<Value>) {
    ctx.predict_hits.fetch_add(1, Ordering::SeqCst);

    let mut filename = String::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        if field.name() == Some("file") {
            filename = field.file_name().unwrap_or_default().to_string();
            let _ = field.bytes().await.unwrap();
        }
    }

    let delay = ctx.predict_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    if ctx.fail_predict.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "classification unavailable"})),
        );
    }

    (
        StatusCode::OK,
        Json(json!({
            "message": "ok",
            "filename": filename,
            "duration": 12.5,
            "predicted_genre": "jazz"
        })),
    )
}

async fn recommend(State(ctx): State<ClassifierCtx>) -> (StatusCode, Json<Value>) {
    ctx.recommend_hits.fetch_add(1, Ordering::SeqCst);

    if ctx.fail_recommend.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "feed unavailable"})),
        );
    }

    (
        StatusCode::OK,
        Json(json!({
            "predicted_genre": "jazz",
            "recommendations": [
                {"artist": "Miles Davis", "name": "So What", "similarity": 97.2},
                {"artist": "John Coltrane", "name": "Giant Steps", "similarity": 93.8}
            ]
        })),
    )
}

/// Mock catalog provider (token + search + preview bytes).
pub struct MockCatalog {
    pub base_url: String,
    pub token_hits: Arc<AtomicUsize>,
    pub search_hits: Arc<AtomicUsize>,
    /// Every `q` parameter the search endpoint received, in order.
    pub queries: Arc<Mutex<Vec<String>>>,
    /// The Authorization header the token endpoint last received.
    pub token_auth: Arc<Mutex<Option<String>>>,
    pub fail_token: Arc<AtomicBool>,
    pub fail_search: Arc<AtomicBool>,
    /// Return an empty item list from search.
    pub empty_search: Arc<AtomicBool>,
    /// Artificial delay before the search response, in milliseconds.
    pub search_delay_ms: Arc<AtomicU64>,
}

impl MockCatalog {
    pub fn preview_url(&self, id: &str) -> String {
        format!("{}/preview/{id}", self.base_url)
    }
}

#[derive(Clone)]
struct CatalogCtx {
    base_url: String,
    expires_in: i64,
    token_hits: Arc<AtomicUsize>,
    search_hits: Arc<AtomicUsize>,
    queries: Arc<Mutex<Vec<String>>>,
    token_auth: Arc<Mutex<Option<String>>>,
    fail_token: Arc<AtomicBool>,
    fail_search: Arc<AtomicBool>,
    empty_search: Arc<AtomicBool>,
    search_delay_ms: Arc<AtomicU64>,
}

/// Spawn a catalog mock whose tokens report the given validity window.
pub async fn spawn_catalog(expires_in: i64) -> MockCatalog {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{addr}");

    let ctx = CatalogCtx {
        base_url: base_url.clone(),
        expires_in,
        token_hits: Arc::new(AtomicUsize::new(0)),
        search_hits: Arc::new(AtomicUsize::new(0)),
        queries: Arc::new(Mutex::new(Vec::new())),
        token_auth: Arc::new(Mutex::new(None)),
        fail_token: Arc::new(AtomicBool::new(false)),
        fail_search: Arc::new(AtomicBool::new(false)),
        empty_search: Arc::new(AtomicBool::new(false)),
        search_delay_ms: Arc::new(AtomicU64::new(0)),
    };

    let router = Router::new()
        .route("/api/token", post(token))
        .route("/v1/search", get(search))
        .route("/preview/:id", get(preview))
        .with_state(ctx.clone());

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    MockCatalog {
        base_url,
        token_hits: ctx.token_hits,
        search_hits: ctx.search_hits,
        queries: ctx.queries,
        token_auth: ctx.token_auth,
        fail_token: ctx.fail_token,
        fail_search: ctx.fail_search,
        empty_search: ctx.empty_search,
        search_delay_ms: ctx.search_delay_ms,
    }
}

#[derive(Deserialize)]
struct TokenForm {
    grant_type: String,
}

async fn token(
    State(ctx): State<CatalogCtx>,
    headers: HeaderMap,
    Form(form): Form<TokenForm>,
) -> (StatusCode, Json<Value>) {
    let hits = ctx.token_hits.fetch_add(1, Ordering::SeqCst) + 1;

    let auth = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string());
    *ctx.token_auth.lock().unwrap() = auth.clone();

    if ctx.fail_token.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "server_error"})),
        );
    }
    if !auth.is_some_and(|value| value.starts_with("Basic ")) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "invalid_client"})),
        );
    }
    if form.grant_type != "client_credentials" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "unsupported_grant_type"})),
        );
    }

    (
        StatusCode::OK,
        Json(json!({
            "access_token": format!("test-token-{hits}"),
            "token_type": "Bearer",
            "expires_in": ctx.expires_in
        })),
    )
}

async fn search(
    State(ctx): State<CatalogCtx>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    ctx.search_hits.fetch_add(1, Ordering::SeqCst);

    let query = params.get("q").cloned().unwrap_or_default();
    ctx.queries.lock().unwrap().push(query.clone());

    let authorized = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("Bearer "));
    if !authorized {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "no token"})));
    }

    let delay = ctx.search_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    if ctx.fail_search.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "search unavailable"})),
        );
    }

    let items = if ctx.empty_search.load(Ordering::SeqCst) {
        json!([])
    } else {
        json!([
            {
                "id": "t1",
                "name": format!("{query} #1"),
                "artists": [{"name": "Artist One"}],
                "album": {
                    "name": "Album One",
                    "images": [{"url": "https://img/640"}, {"url": "https://img/64"}]
                },
                "external_urls": {"spotify": "https://open.spotify.com/track/t1"},
                "preview_url": format!("{}/preview/t1", ctx.base_url)
            },
            {
                "id": "t2",
                "name": format!("{query} #2"),
                "artists": [{"name": "Artist Two"}],
                "album": {"name": "Album Two", "images": []},
                "external_urls": {"spotify": "https://open.spotify.com/track/t2"},
                "preview_url": null
            }
        ])
    };

    (StatusCode::OK, Json(json!({"tracks": {"items": items}})))
}

async fn preview(Path(_id): Path<String>) -> Vec<u8> {
    vec![0u8; 2048]
}

async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// Configuration pointed at the mocks, with short timers for fast tests.
pub fn test_config(classifier_url: &str, catalog: &MockCatalog) -> Config {
    Config {
        classifier_url: classifier_url.to_string(),
        accounts_url: catalog.base_url.clone(),
        catalog_url: catalog.base_url.clone(),
        client_id: "client-id".to_string(),
        client_secret: "client-secret".to_string(),
        search_limit: 5,
        recommend_limit: 40,
        debounce_ms: 120,
        progress_duration_ms: 300,
        progress_tick_ms: 30,
        http_timeout_secs: 5,
        log_level: "warn".to_string(),
        log_format: LogFormat::Pretty,
    }
}
