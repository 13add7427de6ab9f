/// Health check endpoint
///
/// ```text
/// GET /health  ->  200 "OK"
/// ```
///
/// Unconditional: performs no checks, so load balancers get a liveness
/// signal even when the banner directory is broken.
pub async fn health_check() -> &'static str {
    "OK"
}
