use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Externally visible origin used when building short links,
    /// e.g. `https://foodgram.example`. Falls back to the request `Host`.
    #[serde(default)]
    pub public_url: Option<String>,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default)]
    pub sqlx_logging: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MediaConfig {
    /// Directory holding uploaded images.
    pub root: PathBuf,
    /// URL prefix under which images are served.
    pub base_url: String,
    /// Maximum decoded image size in bytes.
    pub max_image_size: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PaginationConfig {
    pub default_limit: u64,
    pub max_limit: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub media: MediaConfig,
    pub pagination: PaginationConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("auth.token_ttl_hours", 24 * 7)?
            .set_default("media.root", "./media")?
            .set_default("media.base_url", "/media")?
            .set_default("media.max_image_size", 5 * 1024 * 1024)?
            .set_default("pagination.default_limit", 6)?
            .set_default("pagination.max_limit", 100)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., FOODGRAM__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("FOODGRAM").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
