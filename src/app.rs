/// Application state and router builder
///
/// # Middleware Stack
///
/// Applied outermost first:
/// 1. Security headers (so even 429s and 404s get them)
/// 2. Request logging (tower-http TraceLayer)
/// 3. Per-IP rate limiting
///
/// # Example
///
/// ```no_run
/// use banner_api::app::{build_router, AppState};
/// use banner_api::config::Config;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(config);
/// let app = build_router(state);
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```
use crate::{
    config::Config,
    middleware::{
        rate_limit::{self, RateLimiter},
        security::SecurityHeadersLayer,
    },
    routes::{self, banner::BannerPicker},
};
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor; cheap
/// because everything inside is behind an `Arc`. The picker and limiter are
/// plain fields so tests can inject seeded or tightened instances.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,

    /// Random banner selection
    pub banners: BannerPicker,

    /// Per-IP request quota tracking
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Creates state with an entropy-seeded picker and the default quota
    /// of 100 requests per minute per IP.
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            banners: BannerPicker::new(),
            rate_limiter: Arc::new(RateLimiter::default()),
        }
    }
}

/// Builds the Axum router with all routes and middleware
///
/// ```text
/// /
/// ├── /email-banner   # random banner (rate limited)
/// └── /health         # liveness probe (rate limited)
/// ```
pub fn build_router(state: AppState) -> Router {
    let enable_hsts = state.config.server.enable_hsts;

    Router::new()
        .route("/email-banner", get(routes::banner::serve_banner))
        .route("/health", get(routes::health::health_check))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit::rate_limit_layer,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SecurityHeadersLayer::new(enable_hsts))
        .with_state(state)
}
