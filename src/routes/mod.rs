/// Route handlers
///
/// - `banner`: the random banner endpoint
/// - `health`: liveness probe
pub mod banner;
pub mod health;
