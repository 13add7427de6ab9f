/// Common test utilities for integration tests
///
/// Provides a `TestContext` that wires the full router against a temporary
/// banners directory, with a seeded picker and an inspectable rate limiter.
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use banner_api::app::{build_router, AppState};
use banner_api::config::{BannerConfig, Config, ServerConfig, BANNER_FILES};
use banner_api::middleware::rate_limit::RateLimiter;
use banner_api::routes::banner::BannerPicker;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Test context containing the router and its injected collaborators
pub struct TestContext {
    pub app: axum::Router,
    /// Owns the temporary banners directory; dropping it deletes the files.
    pub banners_dir: TempDir,
    pub rate_limiter: Arc<RateLimiter>,
}

impl TestContext {
    /// Context with the production quota (100/minute).
    pub fn new() -> Self {
        Self::with_rate_limit(100, Duration::from_secs(60))
    }

    /// Context with a custom quota, for rate limit tests that should not
    /// need 100 requests or a 60 second wait.
    pub fn with_rate_limit(max_requests: u32, window: Duration) -> Self {
        let banners_dir = TempDir::new().expect("failed to create temp banners dir");
        for (index, name) in BANNER_FILES.iter().enumerate() {
            std::fs::write(banners_dir.path().join(name), banner_bytes(index))
                .expect("failed to write banner fixture");
        }

        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                enable_hsts: false,
            },
            banners: BannerConfig {
                dir: banners_dir.path().to_path_buf(),
            },
        };

        let rate_limiter = Arc::new(RateLimiter::new(max_requests, window));
        let state = AppState {
            config: Arc::new(config),
            banners: BannerPicker::seeded(42),
            rate_limiter: rate_limiter.clone(),
        };

        Self {
            app: build_router(state),
            banners_dir,
            rate_limiter,
        }
    }

    /// Deletes every banner file, leaving the directory empty.
    pub fn empty_banners_dir(&self) {
        for name in BANNER_FILES {
            std::fs::remove_file(self.banners_dir.path().join(name))
                .expect("failed to remove banner fixture");
        }
    }
}

/// Distinct bytes per banner so a response body identifies which file was
/// served. The prefix is a JPEG magic number for good measure.
pub fn banner_bytes(index: usize) -> Vec<u8> {
    vec![0xFF, 0xD8, 0xFF, 0xE0, index as u8]
}

/// GET request with no client identification; passes the rate limiter
/// uncounted, which keeps high-volume tests out of the quota.
pub fn get(path: &str) -> Request<Body> {
    Request::builder()
        .uri(path)
        .body(Body::empty())
        .expect("failed to build request")
}

/// GET request attributed to `ip` via X-Forwarded-For.
pub fn get_from(path: &str, ip: &str) -> Request<Body> {
    Request::builder()
        .uri(path)
        .header("x-forwarded-for", ip)
        .body(Body::empty())
        .expect("failed to build request")
}

/// Collects a response body into bytes.
pub async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body")
        .to_vec()
}
