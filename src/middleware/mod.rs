/// Middleware for the banner server
///
/// - Security headers applied to every response
/// - Per-IP rate limiting
pub mod rate_limit;
pub mod security;
