//! Bulk insert primitive
//!
//! Inserts many rows into one table with a single multi-row INSERT inside a
//! transaction. Either every row is written or none is.

use crate::{Error, Result};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

/// Most bound parameters SQLite accepts in one statement
pub const MAX_BIND_PARAMETERS: usize = 32766;

/// Single cell value of a bulk insert row
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Integer(i64),
    Text(String),
    Bool(bool),
    Null,
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Integer(value)
    }
}

impl From<Option<i64>> for SqlValue {
    fn from(value: Option<i64>) -> Self {
        value.map_or(SqlValue::Null, SqlValue::Integer)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

/// Parameters of one bulk insert call
#[derive(Debug, Clone)]
pub struct BulkInsert<'a> {
    pub table: &'a str,
    pub columns: Vec<&'a str>,
    pub values: Vec<Vec<SqlValue>>,
}

/// Insert all rows atomically and return the number of rows affected
///
/// An empty value list is a no-op returning 0. Every row must have exactly
/// one value per column, and rows times columns must not exceed
/// `MAX_BIND_PARAMETERS`.
pub async fn bulk_insert(pool: &SqlitePool, params: BulkInsert<'_>) -> Result<u64> {
    if params.values.is_empty() {
        return Ok(0);
    }
    if params.columns.is_empty() {
        return Err(Error::InvalidInput(format!("No columns given for table '{}'", params.table)));
    }
    if let Some((index, row)) = params
        .values
        .iter()
        .enumerate()
        .find(|(_, row)| row.len() != params.columns.len())
    {
        return Err(Error::InvalidInput(format!(
            "Row {} for table '{}' has {} values, expected {}",
            index,
            params.table,
            row.len(),
            params.columns.len()
        )));
    }

    let row_count = params.values.len();
    let parameters = row_count * params.columns.len();
    if parameters > MAX_BIND_PARAMETERS {
        return Err(Error::InvalidInput(format!(
            "{} rows for table '{}' bind {} parameters, limit is {}",
            row_count, params.table, parameters, MAX_BIND_PARAMETERS
        )));
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
        "INSERT INTO {} ({}) ",
        params.table,
        params.columns.join(", ")
    ));
    builder.push_values(params.values, |mut b, row| {
        for value in row {
            match value {
                SqlValue::Integer(v) => {
                    b.push_bind(v);
                }
                SqlValue::Text(v) => {
                    b.push_bind(v);
                }
                SqlValue::Bool(v) => {
                    b.push_bind(v);
                }
                SqlValue::Null => {
                    b.push_bind(None::<i64>);
                }
            }
        }
    });

    let mut tx = pool.begin().await?;
    let result = builder.build().execute(&mut *tx).await?;
    tx.commit().await?;

    debug!(
        table = params.table,
        rows = row_count,
        affected = result.rows_affected(),
        "Bulk insert committed"
    );

    Ok(result.rows_affected())
}
