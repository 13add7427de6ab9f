//! # Email Banner API
//!
//! A small HTTP service that returns a randomly selected banner image for
//! embedding in email signatures:
//!
//! ```html
//! <img src="https://yourcompany.com/email-banner" width="600">
//! ```
//!
//! Every response carries cache-disabling headers so mail clients fetch a
//! fresh (randomly chosen) banner on each open. The service is stateless
//! apart from an in-memory per-IP rate limiter.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management and the banner whitelist
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Security headers and rate limiting
//! - `routes`: Route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
