//! HTTP surface for the horticulture dashboard.
//!
//! | Method | Path | Auth | Description |
//! |--------|------|------|-------------|
//! | `POST` | `/existing` | yes | Historical production for `{komoditas}` |
//! | `POST` | `/forecast` | yes | Forecast production for `{komoditas}` |
//! | `GET`  | `/news` | yes | Today's agriculture news (cached per day) |
//! | `GET`  | `/llm-analysis` | yes | Streamed summary of today's news |
//! | `GET`  | `/health` | no | Liveness probe |
//!
//! Authentication is a single shared secret sent verbatim in the
//! `Authorization` header. CORS is open to every origin, method and header.

pub mod auth;
pub mod commodity_routes;
pub mod config;
pub mod news_routes;


use agri_core::{AgriError, CompletionProvider, NewsSearchProvider};
use anyhow::Context;
use axum::{
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use commodity_store::{CommodityRepository, DocumentStore, MongoStore};
use llm_client::{LlmConfig, VllmClient};
use serde_json::json;
use serpapi_client::{NewsService, SerpApiClient};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use config::Settings;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub commodities: CommodityRepository,
    pub news: Arc<NewsService>,
    pub completions: Arc<dyn CompletionProvider>,
}

impl AppState {
    pub fn new(
        settings: Arc<Settings>,
        store: Arc<dyn DocumentStore>,
        search: Arc<dyn NewsSearchProvider>,
        completions: Arc<dyn CompletionProvider>,
    ) -> Self {
        let news = Arc::new(NewsService::new(search, settings.news_cache_capacity));
        Self {
            settings,
            commodities: CommodityRepository::new(store),
            news,
            completions,
        }
    }

    /// Wires the production collaborators: MongoDB, SerpAPI and vLLM.
    pub async fn connect(settings: Arc<Settings>) -> anyhow::Result<Self> {
        let store = MongoStore::connect(&settings.mongodb_url, &settings.mongodb_database)
            .await
            .context("Failed to configure MongoDB client")?;

        let search = SerpApiClient::new(settings.serpapi_api_key.clone())
            .context("Failed to configure news search client")?;

        let completions = VllmClient::new(LlmConfig::new(
            settings.vllm_api_key.clone(),
            settings.vllm_api_base.clone(),
            settings.vllm_model_name.clone(),
        ))
        .context("Failed to configure completion client")?;

        Ok(Self::new(
            settings,
            Arc::new(store),
            Arc::new(search),
            Arc::new(completions),
        ))
    }
}

/// Error type for route handlers.
#[derive(Debug)]
pub enum AppError {
    Agri(AgriError),
    Internal(anyhow::Error),
}

impl From<AgriError> for AppError {
    fn from(err: AgriError) -> Self {
        AppError::Agri(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Agri(AgriError::UpstreamUnavailable(_)) => StatusCode::BAD_GATEWAY,
            AppError::Agri(AgriError::Store(_) | AgriError::InvalidRecord(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Agri(err) => err.to_string(),
            AppError::Internal(err) => format!("{:#}", err),
        };
        tracing::error!("Request failed ({}): {}", status, message);

        (
            status,
            Json(json!({
                "success": false,
                "error": message,
            })),
        )
            .into_response()
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Builds the full router. Every route except `/health` sits behind the
/// API-key middleware.
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .merge(commodity_routes::commodity_routes())
        .merge(news_routes::news_routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    Router::new()
        .route("/health", get(health))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Installs the global tracing subscriber. `RUST_LOG_FORMAT=json` switches
/// to JSON lines.
pub fn init_tracing() {
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

pub async fn run_server(settings: Settings) -> anyhow::Result<()> {
    let settings = Arc::new(settings);
    tracing::info!("Configuration loaded: {:?}", settings);

    let state = AppState::connect(settings.clone()).await?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", settings.bind_addr))?;
    tracing::info!("API server listening on http://{}", settings.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
