//! roistot-importer - Command-line entry point
//!
//! Reads a delimited table of story records, loads it into an entity graph
//! and persists it under a new version. Also lists and activates versions.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use roistot_common::config::{ConfigOverrides, ImporterConfig};
use roistot_common::db::{init_database, SqliteStore, VersionRepository};
use roistot_common::ContentHasher;
use roistot_importer::{read_table_file, Importer};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{reload, EnvFilter};

/// Command-line arguments for roistot-importer
#[derive(Parser, Debug)]
#[command(name = "roistot-importer")]
#[command(about = "Imports the story, author, publication and villain table")]
#[command(version)]
struct Args {
    /// SQLite database file
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import a table file under a new version
    Import {
        /// Delimited text file, header row first
        file: PathBuf,

        /// Salt appended to content hash inputs
        #[arg(long)]
        salt: Option<String>,

        /// Maximum rows per bulk insert
        #[arg(long)]
        bulk_size: Option<usize>,

        /// Field delimiter of the table file
        #[arg(long)]
        delimiter: Option<char>,

        /// Activate the new version once everything is persisted
        #[arg(long)]
        activate: bool,
    },

    /// List versions, oldest first
    Versions,

    /// Make a version the active one
    Activate {
        /// Version id
        id: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Tracing first: config loading may warn
    let env_filter = EnvFilter::try_from_default_env().ok();
    let from_rust_log = env_filter.is_some();
    let (filter, filter_handle) = reload::Layer::new(
        env_filter.unwrap_or_else(|| EnvFilter::new(args.log_level.as_deref().unwrap_or("info"))),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut overrides = ConfigOverrides {
        database_path: args.database,
        log_level: args.log_level,
        ..Default::default()
    };
    if let Command::Import {
        salt,
        bulk_size,
        delimiter,
        ..
    } = &args.command
    {
        overrides.hash_salt = salt.clone();
        overrides.max_bulk_create_size = *bulk_size;
        overrides.delimiter = *delimiter;
    }
    let config = ImporterConfig::load(overrides).context("Invalid configuration")?;
    if !from_rust_log {
        filter_handle
            .reload(EnvFilter::new(&config.log_level))
            .context("Failed to apply log level")?;
    }

    info!("Database path: {}", config.database_path.display());
    let pool = init_database(&config.database_path)
        .await
        .context("Failed to open database")?;
    let versions = VersionRepository::new(pool.clone());

    match args.command {
        Command::Import { file, activate, .. } => {
            let table = read_table_file(&file, config.delimiter)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            info!(file = %file.display(), rows = table.rows.len(), "Table read");

            let mut importer = Importer::new(&table.header, ContentHasher::new(config.hash_salt.clone()));
            importer.load_data(&table.rows)?;

            let store = SqliteStore::new(pool);
            let summary = importer
                .persist_data(&store, config.max_bulk_create_size)
                .await?;

            if activate {
                versions.set_active(summary.version.id).await?;
            }
            println!(
                "Imported version {}: {} stories, {} authors, {} publications, {} villains",
                summary.version.id, summary.stories, summary.authors, summary.publications, summary.villains
            );
        }
        Command::Versions => {
            for version in versions.list().await? {
                println!(
                    "{}\t{}\t{}",
                    version.id,
                    version.created_at.to_rfc3339(),
                    if version.is_active { "active" } else { "" }
                );
            }
        }
        Command::Activate { id } => {
            versions.set_active(id).await?;
            println!("Activated version {}", id);
        }
    }

    Ok(())
}
