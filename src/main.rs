//! # Email Banner API server
//!
//! Binds the configured address and serves the banner routes until the
//! process is stopped. See the library crate for the actual behavior.

use banner_api::app::{build_router, AppState};
use banner_api::config::Config;
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "banner_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let addr = config.bind_address();

    tracing::info!(
        banners_dir = %config.banners.dir.display(),
        "Email banner API v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let state = AppState::new(config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{addr}");

    // ConnectInfo gives the rate limiter a peer address to key on when no
    // proxy sets X-Forwarded-For.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
