use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::ServiceExt;
use axum::extract::Request;
use common::media::filesystem::FilesystemMediaStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

use foodgram::config::AppConfig;
use foodgram::state::AppState;
use foodgram::{build_app, database, seed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load().context("Failed to load config")?;

    let db = database::init_db(&config.database)
        .await
        .context("Failed to initialize database")?;
    seed::ensure_indexes(&db)
        .await
        .context("Failed to create indexes")?;

    let media = FilesystemMediaStore::new(config.media.root.clone(), config.media.max_image_size)
        .await
        .context("Failed to initialize media store")?;
    info!(root = %config.media.root.display(), "Media store ready");

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let state = AppState {
        db,
        config: Arc::new(config),
        media: Arc::new(media),
    };
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", addr);
    info!("Swagger UI at http://{}/swagger-ui", addr);

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app)).await?;

    Ok(())
}
