//! Storage capabilities
//!
//! The import engine only talks to storage through these traits. Each
//! record kind gets its own `BulkCreate`, `List` and `Read` implementation;
//! `SqliteStore` provides all of them for the SQLite backend.

use super::models::Version;
use crate::Result;
use async_trait::async_trait;

/// Insert rows of one kind for a run; returns the affected row count
#[async_trait]
pub trait BulkCreate<T: Send + Sync>: Send + Sync {
    async fn bulk_create(&self, items: &[T], version: &Version) -> Result<u64>;
}

/// List stored records of one kind belonging to a run
#[async_trait]
pub trait List<T>: Send + Sync {
    /// All records of the run, oldest first
    async fn list(&self, version: &Version) -> Result<Vec<T>>;

    /// The `limit` most recently inserted records of the run, newest first
    async fn list_latest(&self, version: &Version, limit: usize) -> Result<Vec<T>>;
}

/// Read one stored record by durable id
#[async_trait]
pub trait Read<T>: Send + Sync {
    async fn read(&self, id: i64) -> Result<Option<T>>;
}

/// Open a new, inactive run to group everything written by one import
#[async_trait]
pub trait CreateVersion: Send + Sync {
    async fn create_version(&self) -> Result<Version>;
}
