//! Version records
//!
//! Every import run writes under a fresh, inactive version. Activating a
//! version makes it the one readers see; removing it drops everything the
//! run wrote.

use super::models::Version;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;

#[derive(Debug, Clone)]
pub struct VersionRepository {
    pool: SqlitePool,
}

fn decode_version(row: &SqliteRow) -> Result<Version> {
    let created_at: i64 = row.try_get("created_at")?;
    Ok(Version {
        id: row.try_get("id")?,
        created_at: DateTime::<Utc>::from_timestamp(created_at, 0)
            .ok_or_else(|| Error::Internal(format!("Invalid version timestamp: {}", created_at)))?,
        is_active: row.try_get("is_active")?,
    })
}

impl VersionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new inactive version
    pub async fn create(&self) -> Result<Version> {
        let id = sqlx::query("INSERT INTO versions (created_at, is_active) VALUES (?, 0)")
            .bind(Utc::now().timestamp())
            .execute(&self.pool)
            .await?
            .last_insert_rowid();

        let version = self
            .read(id)
            .await?
            .ok_or_else(|| Error::Internal(format!("Created version {} not readable", id)))?;

        info!(version_id = version.id, "Created import version");
        Ok(version)
    }

    pub async fn read(&self, id: i64) -> Result<Option<Version>> {
        let row = sqlx::query("SELECT id, created_at, is_active FROM versions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(decode_version).transpose()
    }

    /// All versions, oldest first
    pub async fn list(&self) -> Result<Vec<Version>> {
        let rows = sqlx::query("SELECT id, created_at, is_active FROM versions ORDER BY created_at, id")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(decode_version).collect()
    }

    /// The single active version
    pub async fn get_active(&self) -> Result<Version> {
        let rows = sqlx::query("SELECT id, created_at, is_active FROM versions WHERE is_active = 1")
            .fetch_all(&self.pool)
            .await?;
        match rows.as_slice() {
            [row] => decode_version(row),
            [] => Err(Error::NotFound("No active version".to_string())),
            _ => Err(Error::Internal(format!("Invalid number of active versions: {}", rows.len()))),
        }
    }

    /// Make `id` the only active version
    pub async fn set_active(&self, id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM versions WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(Error::NotFound(format!("Version {}", id)));
        }

        sqlx::query("UPDATE versions SET is_active = 0 WHERE id != ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE versions SET is_active = 1 WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(version_id = id, "Activated version");
        Ok(())
    }

    /// Delete a version together with every row written under it
    pub async fn remove(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM versions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Version {}", id)));
        }

        info!(version_id = id, "Removed version");
        Ok(())
    }
}
