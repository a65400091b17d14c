//! SQLite implementation of the storage capabilities

use super::bulk::{bulk_insert, BulkInsert};
use super::models::{DecodeRow, EncodeRow, Version};
use super::repository::{BulkCreate, CreateVersion, List, Read};
use super::versions::VersionRepository;
use crate::Result;
use async_trait::async_trait;
use sqlx::SqlitePool;

/// Storage backend over a SQLite pool
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl CreateVersion for SqliteStore {
    async fn create_version(&self) -> Result<Version> {
        VersionRepository::new(self.pool.clone()).create().await
    }
}

#[async_trait]
impl<T: EncodeRow + Send + Sync> BulkCreate<T> for SqliteStore {
    async fn bulk_create(&self, items: &[T], version: &Version) -> Result<u64> {
        let mut columns: Vec<&str> = T::COLUMNS.to_vec();
        columns.push("version");

        let mut values = Vec::with_capacity(items.len());
        for item in items {
            let mut row = item.encode()?;
            row.push(version.id.into());
            values.push(row);
        }

        bulk_insert(
            &self.pool,
            BulkInsert {
                table: T::TABLE,
                columns,
                values,
            },
        )
        .await
    }
}

#[async_trait]
impl<T: DecodeRow + Send + 'static> List<T> for SqliteStore {
    async fn list(&self, version: &Version) -> Result<Vec<T>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE version = ? ORDER BY id ASC",
            T::SELECT,
            T::TABLE
        );
        let rows = sqlx::query(&sql).bind(version.id).fetch_all(&self.pool).await?;
        rows.iter().map(T::decode).collect()
    }

    async fn list_latest(&self, version: &Version, limit: usize) -> Result<Vec<T>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE version = ? ORDER BY id DESC LIMIT ?",
            T::SELECT,
            T::TABLE
        );
        let rows = sqlx::query(&sql)
            .bind(version.id)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(T::decode).collect()
    }
}

#[async_trait]
impl<T: DecodeRow + Send + 'static> Read<T> for SqliteStore {
    async fn read(&self, id: i64) -> Result<Option<T>> {
        let sql = format!("SELECT {} FROM {} WHERE id = ?", T::SELECT, T::TABLE);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(T::decode).transpose()
    }
}
