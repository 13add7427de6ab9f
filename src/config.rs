/// Configuration management for the banner server
///
/// Loads configuration from environment variables into a type-safe struct.
///
/// # Environment Variables
///
/// - `HOST`: Address to bind to (default: 0.0.0.0)
/// - `PORT`: Port to bind to (default: 3000)
/// - `BANNERS_DIR`: Directory holding the banner files (default: public/banners)
/// - `ENABLE_HSTS`: Set to `true` to emit the HSTS header (default: false)
/// - `RUST_LOG`: Log level (default: info)
///
/// # Example
///
/// ```no_run
/// use banner_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// The banner whitelist. Fixed at compile time, never user-supplied; the
/// banner endpoint serves nothing outside this set.
pub const BANNER_FILES: [&str; 5] = [
    "banner1.jpg",
    "banner2.jpg",
    "banner3.jpg",
    "banner4.jpg",
    "banner5.jpg",
];

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Banner storage configuration
    pub banners: BannerConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Whether to emit the Strict-Transport-Security header
    ///
    /// Enable only when the service is reached over HTTPS.
    pub enable_hsts: bool,
}

/// Banner storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BannerConfig {
    /// Absolute path of the directory holding the whitelisted banner files
    ///
    /// A missing directory or missing file is not a startup failure; it
    /// surfaces as a 500 on the affected request only.
    pub dir: PathBuf,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// Relative `BANNERS_DIR` values are resolved against the working
    /// directory so the rest of the code only ever sees an absolute path.
    ///
    /// # Errors
    ///
    /// Returns an error if `PORT` is set but not a valid port number, or if
    /// the working directory cannot be determined.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()?;

        let enable_hsts = env::var("ENABLE_HSTS")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let dir = env::var("BANNERS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("public/banners"));
        let dir = if dir.is_absolute() {
            dir
        } else {
            env::current_dir()?.join(dir)
        };

        Ok(Self {
            server: ServerConfig {
                host,
                port,
                enable_hsts,
            },
            banners: BannerConfig { dir },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
