/// Per-IP rate limiting middleware
///
/// Fixed-window counting: each client IP gets at most `max_requests` requests
/// per `window`. The first request after a window elapses resets the counter
/// and starts a new window. State is an in-memory map, process-local and
/// lost on restart; it is not shared across instances.
///
/// # Headers
///
/// Responses carry the standard draft-RFC rate limit headers:
/// - `RateLimit-Limit`: requests allowed per window
/// - `RateLimit-Remaining`: requests left in the current window
/// - `RateLimit-Reset`: seconds until the window resets
/// - `Retry-After`: seconds to wait (429 responses only)
///
/// # Client identification
///
/// The first entry of `X-Forwarded-For` when present, otherwise the socket
/// peer address. Requests with no identifiable client (neither header nor
/// connect info, as with some in-process test setups) pass through
/// uncounted rather than failing.
use crate::app::AppState;
use crate::error::ApiError;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Default quota: 100 requests per minute per IP.
pub const DEFAULT_MAX_REQUESTS: u32 = 100;
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug)]
struct Window {
    count: u32,
    started: Instant,
}

/// In-memory fixed-window counter store, keyed by client IP.
///
/// Held in `AppState` as an explicit value (not a module-level singleton) so
/// tests can construct one with a small limit and short window, inspect it,
/// and reset it.
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    windows: Mutex<HashMap<IpAddr, Window>>,
}

/// Outcome of a single rate limit check
#[derive(Debug, Clone, Copy)]
pub struct Decision {
    /// Whether the request may proceed
    pub allowed: bool,

    /// Requests allowed per window
    pub limit: u32,

    /// Requests left in the current window
    pub remaining: u32,

    /// Time until the client's window resets
    pub reset_after: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Records a request from `ip` and decides whether it may proceed.
    pub fn check(&self, ip: IpAddr) -> Decision {
        let now = Instant::now();
        let mut windows = self.windows.lock().expect("rate limiter mutex poisoned");

        // Evict every expired window, not just this client's. Keys come from
        // client-controlled input (X-Forwarded-For), so the map must not
        // retain an entry per address ever seen.
        windows.retain(|_, w| now.duration_since(w.started) < self.window);

        let entry = windows.entry(ip).or_insert(Window {
            count: 0,
            started: now,
        });

        let reset_after = self
            .window
            .saturating_sub(now.duration_since(entry.started));

        if entry.count < self.max_requests {
            entry.count += 1;
            Decision {
                allowed: true,
                limit: self.max_requests,
                remaining: self.max_requests - entry.count,
                reset_after,
            }
        } else {
            Decision {
                allowed: false,
                limit: self.max_requests,
                remaining: 0,
                reset_after,
            }
        }
    }

    /// Request count recorded for `ip` in its current window.
    pub fn count(&self, ip: IpAddr) -> u32 {
        let windows = self.windows.lock().expect("rate limiter mutex poisoned");
        windows.get(&ip).map(|w| w.count).unwrap_or(0)
    }

    /// Number of client IPs with a live window.
    pub fn tracked_clients(&self) -> usize {
        let windows = self.windows.lock().expect("rate limiter mutex poisoned");
        windows.len()
    }

    /// Drops all recorded windows.
    pub fn reset(&self) {
        let mut windows = self.windows.lock().expect("rate limiter mutex poisoned");
        windows.clear();
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW)
    }
}

/// Resolves the client IP for a request.
fn client_ip(request: &Request, peer: Option<SocketAddr>) -> Option<IpAddr> {
    let forwarded = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse::<IpAddr>().ok());

    forwarded.or_else(|| peer.map(|addr| addr.ip()))
}

/// Rate limiting middleware layer
///
/// Checks the quota before the handler runs; over-limit requests get a 429
/// with `Retry-After` and never reach the handler. Allowed responses are
/// annotated with the `RateLimit-*` headers.
pub async fn rate_limit_layer(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(ip) = client_ip(&request, peer.map(|ConnectInfo(addr)| addr)) else {
        return Ok(next.run(request).await);
    };

    let decision = state.rate_limiter.check(ip);
    if !decision.allowed {
        tracing::warn!(client = %ip, "rate limit exceeded");
        return Err(ApiError::RateLimited {
            limit: decision.limit,
            retry_after: decision.reset_after.as_secs().max(1),
        });
    }

    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    headers.insert("RateLimit-Limit", HeaderValue::from(decision.limit));
    headers.insert("RateLimit-Remaining", HeaderValue::from(decision.remaining));
    headers.insert(
        "RateLimit-Reset",
        HeaderValue::from(decision.reset_after.as_secs()),
    );

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_allows_up_to_limit() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        let client = ip("203.0.113.1");

        for expected_remaining in [2, 1, 0] {
            let decision = limiter.check(client);
            assert!(decision.allowed);
            assert_eq!(decision.remaining, expected_remaining);
        }

        let decision = limiter.check(client);
        assert!(!decision.allowed);
        assert_eq!(decision.remaining, 0);
        assert_eq!(decision.limit, 3);
    }

    #[test]
    fn test_ips_are_independent() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));

        assert!(limiter.check(ip("203.0.113.1")).allowed);
        assert!(!limiter.check(ip("203.0.113.1")).allowed);
        assert!(limiter.check(ip("203.0.113.2")).allowed);
    }

    #[test]
    fn test_window_elapses() {
        let limiter = RateLimiter::new(2, Duration::from_millis(50));
        let client = ip("203.0.113.1");

        assert!(limiter.check(client).allowed);
        assert!(limiter.check(client).allowed);
        assert!(!limiter.check(client).allowed);

        std::thread::sleep(Duration::from_millis(70));

        let decision = limiter.check(client);
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 1);
    }

    #[test]
    fn test_default_quota_is_100_per_minute() {
        assert_eq!(DEFAULT_MAX_REQUESTS, 100);
        assert_eq!(DEFAULT_WINDOW, Duration::from_secs(60));

        let limiter = RateLimiter::default();
        assert_eq!(limiter.max_requests, 100);
        assert_eq!(limiter.window, Duration::from_secs(60));
    }

    #[test]
    fn test_stale_entries_are_evicted() {
        let limiter = RateLimiter::new(5, Duration::from_millis(20));

        // Spoofed X-Forwarded-For values mean arbitrary keys; the map must
        // shed them once their windows expire.
        for octet in 0..100u8 {
            limiter.check(IpAddr::from([203, 0, 113, octet]));
        }
        assert_eq!(limiter.tracked_clients(), 100);

        std::thread::sleep(Duration::from_millis(40));

        limiter.check(ip("198.51.100.1"));
        assert_eq!(limiter.tracked_clients(), 1);
        assert_eq!(limiter.count(ip("203.0.113.0")), 0);
    }

    #[test]
    fn test_count_and_reset() {
        let limiter = RateLimiter::new(10, Duration::from_secs(60));
        let client = ip("203.0.113.1");

        assert_eq!(limiter.count(client), 0);
        limiter.check(client);
        limiter.check(client);
        assert_eq!(limiter.count(client), 2);

        limiter.reset();
        assert_eq!(limiter.count(client), 0);
    }

    #[test]
    fn test_reset_after_never_exceeds_window() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let decision = limiter.check(ip("203.0.113.1"));
        assert!(decision.reset_after <= Duration::from_secs(60));
    }

    #[test]
    fn test_client_ip_prefers_forwarded_header() {
        let request = Request::builder()
            .uri("/")
            .header("x-forwarded-for", "203.0.113.9, 10.0.0.1")
            .body(Body::empty())
            .unwrap();
        let peer: SocketAddr = "192.0.2.1:5000".parse().unwrap();

        assert_eq!(client_ip(&request, Some(peer)), Some(ip("203.0.113.9")));
    }

    #[test]
    fn test_client_ip_falls_back_to_peer() {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let peer: SocketAddr = "192.0.2.1:5000".parse().unwrap();

        assert_eq!(client_ip(&request, Some(peer)), Some(ip("192.0.2.1")));
        assert_eq!(client_ip(&request, None), None);
    }

    #[test]
    fn test_client_ip_ignores_garbage_header() {
        let request = Request::builder()
            .uri("/")
            .header("x-forwarded-for", "not-an-ip")
            .body(Body::empty())
            .unwrap();

        assert_eq!(client_ip(&request, None), None);
    }
}
