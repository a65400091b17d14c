//! Database initialization
//!
//! Creates the database file on first run and the import schema
//! idempotently on every start.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// Open (creating if needed) the database at `db_path` and ensure the schema
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_schema(&pool).await?;

    Ok(pool)
}

/// Private in-memory database with the full schema
///
/// The pool holds a single connection that is never recycled, since the
/// database lives only as long as that connection.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create every import table (idempotent)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_versions_table(pool).await?;
    create_authors_table(pool).await?;
    create_publications_table(pool).await?;
    create_stories_table(pool).await?;

    // Linking tables
    create_authors_in_stories_table(pool).await?;
    create_stories_in_publications_table(pool).await?;

    create_villains_table(pool).await?;
    create_villains_in_stories_table(pool).await?;

    Ok(())
}

async fn create_versions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS versions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            created_at INTEGER NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_authors_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS authors (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            hash TEXT NOT NULL,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            is_writer INTEGER NOT NULL DEFAULT 0,
            is_drawer INTEGER NOT NULL DEFAULT 0,
            is_inventor INTEGER NOT NULL DEFAULT 0,
            version INTEGER NOT NULL REFERENCES versions(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_authors_version_hash ON authors(version, hash)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_publications_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS publications (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            hash TEXT NOT NULL,
            type TEXT NOT NULL,
            year INTEGER,
            issue TEXT NOT NULL,
            version INTEGER NOT NULL REFERENCES versions(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_publications_version_hash ON publications(version, hash)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_stories_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS stories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            hash TEXT NOT NULL,
            order_num INTEGER,
            version INTEGER NOT NULL REFERENCES versions(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_stories_version_hash ON stories(version, hash)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_authors_in_stories_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS authors_in_stories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            story INTEGER NOT NULL REFERENCES stories(id) ON DELETE CASCADE,
            author INTEGER NOT NULL REFERENCES authors(id) ON DELETE CASCADE,
            type TEXT NOT NULL CHECK (type IN ('writer', 'drawer', 'inventor')),
            version INTEGER NOT NULL REFERENCES versions(id) ON DELETE CASCADE,
            UNIQUE (story, author, type)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_stories_in_publications_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS stories_in_publications (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            story INTEGER NOT NULL REFERENCES stories(id) ON DELETE CASCADE,
            publication INTEGER NOT NULL REFERENCES publications(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            version INTEGER NOT NULL REFERENCES versions(id) ON DELETE CASCADE,
            UNIQUE (story, publication)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_villains_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS villains (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            hash TEXT NOT NULL,
            ranks TEXT NOT NULL DEFAULT '[]',
            first_names TEXT NOT NULL DEFAULT '[]',
            last_name TEXT NOT NULL,
            version INTEGER NOT NULL REFERENCES versions(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_villains_version_hash ON villains(version, hash)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_villains_in_stories_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS villains_in_stories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            villain INTEGER NOT NULL REFERENCES villains(id) ON DELETE CASCADE,
            story INTEGER NOT NULL REFERENCES stories(id) ON DELETE CASCADE,
            hash TEXT NOT NULL,
            nicknames TEXT NOT NULL DEFAULT '[]',
            aliases TEXT NOT NULL DEFAULT '[]',
            roles TEXT NOT NULL DEFAULT '[]',
            destiny TEXT NOT NULL DEFAULT '[]',
            version INTEGER NOT NULL REFERENCES versions(id) ON DELETE CASCADE,
            UNIQUE (villain, story)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
