/// Random banner endpoint
///
/// ```text
/// GET /email-banner  ->  200 image/jpeg, no-cache headers
/// ```
///
/// Each request picks one entry from the whitelist uniformly at random
/// (independent draws, no memory across requests) and streams that file
/// from the banners directory. Cache-disabling headers make mail clients
/// re-fetch on every open, which is what rotates the banner.
///
/// The endpoint takes no parameters; query strings and bodies are ignored,
/// so no request can influence which file is read.
use crate::app::AppState;
use crate::config::BANNER_FILES;
use crate::error::{ApiError, ApiResult};
use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::Response,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio_util::io::ReaderStream;

/// Uniform random choice over the banner whitelist.
///
/// Wraps a seedable RNG so tests can fix the draw sequence; production use
/// seeds from OS entropy.
#[derive(Clone)]
pub struct BannerPicker {
    rng: Arc<Mutex<StdRng>>,
}

impl BannerPicker {
    pub fn new() -> Self {
        Self {
            rng: Arc::new(Mutex::new(StdRng::from_entropy())),
        }
    }

    /// Deterministic picker for tests.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Arc::new(Mutex::new(StdRng::seed_from_u64(seed))),
        }
    }

    /// Draws one whitelisted filename uniformly at random.
    pub fn pick(&self) -> &'static str {
        let mut rng = self.rng.lock().expect("banner picker mutex poisoned");
        BANNER_FILES[rng.gen_range(0..BANNER_FILES.len())]
    }
}

impl Default for BannerPicker {
    fn default() -> Self {
        Self::new()
    }
}

/// Joins `filename` onto the banners directory, refusing anything that is
/// not a single plain path component.
///
/// Unreachable while the whitelist is a compile-time constant of bare
/// filenames; kept as defense in depth should the whitelist ever become
/// configurable.
fn resolve_banner(dir: &Path, filename: &str) -> Option<PathBuf> {
    let name = Path::new(filename);
    let mut components = name.components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Some(dir.join(name)),
        _ => None,
    }
}

/// Banner handler
///
/// Error bodies are always the generic `Server error`; the real cause (a
/// missing file, usually) is only logged.
pub async fn serve_banner(State(state): State<AppState>) -> ApiResult<Response> {
    let filename = state.banners.pick();

    let path = resolve_banner(&state.config.banners.dir, filename).ok_or_else(|| {
        ApiError::Internal(format!("banner {filename} escapes the banners directory"))
    })?;

    // Open directly rather than checking existence first; a file deleted
    // between check and open would otherwise slip past the check.
    let file = tokio::fs::File::open(&path).await.map_err(|e| {
        ApiError::Internal(format!("failed to open banner {}: {e}", path.display()))
    })?;

    // Streamed body: an I/O error after this point aborts the connection
    // mid-transfer instead of producing a late 500.
    let stream = ReaderStream::new(file);

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "image/jpeg")
        .header(
            header::CACHE_CONTROL,
            "no-store, no-cache, must-revalidate, proxy-revalidate",
        )
        .header(header::PRAGMA, "no-cache")
        .header(header::EXPIRES, "0")
        .body(Body::from_stream(stream))
        .map_err(|e| ApiError::Internal(format!("failed to build banner response: {e}")))?;

    Ok(response)
}
