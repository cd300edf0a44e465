use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use tracing_subscriber::EnvFilter;

use foodgram::config::DatabaseConfig;
use foodgram::database::init_db;
use foodgram::seed::{IngredientFixture, TagFixture, import_ingredients, import_tags};

#[derive(Parser, Debug)]
#[command(author, version, about = "Foodgram administration tasks")]
struct Cli {
    /// PostgreSQL connection URL.
    #[arg(long, env = "FOODGRAM__DATABASE__URL")]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load `[{"name", "measurement_unit"}]` from a JSON file.
    ImportIngredients { file: PathBuf },
    /// Load `[{"name", "slug"}]` from a JSON file.
    ImportTags { file: PathBuf },
}

fn read_fixture<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let items: Vec<T> = serde_json::from_str(&raw)
        .with_context(|| format!("Malformed fixture {}", path.display()))?;
    tracing::info!(file = %path.display(), entries = items.len(), "Loaded fixture");
    Ok(items)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let db = init_db(&DatabaseConfig {
        url: cli.database_url,
        sqlx_logging: false,
    })
    .await
    .context("Failed to connect to database")?;

    match cli.command {
        Command::ImportIngredients { file } => {
            let items: Vec<IngredientFixture> = read_fixture(&file)?;
            import_ingredients(&db, &items).await?;
        }
        Command::ImportTags { file } => {
            let items: Vec<TagFixture> = read_fixture(&file)?;
            import_tags(&db, &items).await?;
        }
    }

    Ok(())
}
