//! Query execution against the MySQL store
//!
//! One connection per call: connect, run the single validated statement,
//! fetch every row, close. Release is paired with acquisition on the failure
//! path as well. No pooling and no retries.

use crate::config::DbConfig;
use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::mysql::{MySqlConnection, MySqlRow};
use sqlx::{Column, Connection, Row, TypeInfo};
use tracing::info;

/// One row of scalar column values, in select order.
pub type ResultRow = Vec<Value>;
/// Ordered rows, as fetched.
pub type ResultSet = Vec<ResultRow>;

/// Capability interface over the data store; tests inject canned rows.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(&self, sql: &str) -> Result<ResultSet>;
}

/// Executor holding connection parameters only. Connections live for exactly
/// one `execute` call.
pub struct MySqlExecutor {
    config: DbConfig,
}

impl MySqlExecutor {
    pub fn new(config: DbConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl QueryExecutor for MySqlExecutor {
    async fn execute(&self, sql: &str) -> Result<ResultSet> {
        let mut conn = MySqlConnection::connect(&self.config.url()).await?;
        let fetched = sqlx::query(sql).fetch_all(&mut conn).await;
        // Close before surfacing any fetch error; a fetch failure must not
        // leave the connection open.
        let closed = conn.close().await;
        let rows = fetched?;
        closed?;

        info!("Query returned {} rows", rows.len());
        Ok(rows.iter().map(decode_row).collect())
    }
}

fn decode_row(row: &MySqlRow) -> ResultRow {
    (0..row.columns().len())
        .map(|idx| decode_scalar(row, idx))
        .collect()
}

/// Decode one column to a JSON scalar by driver type name. Types outside the
/// gravity_books vocabulary fall back to a string read, then to NULL.
fn decode_scalar(row: &MySqlRow, idx: usize) -> Value {
    match row.column(idx).type_info().name() {
        "VARCHAR" | "CHAR" | "TEXT" | "ENUM" => row
            .try_get::<String, _>(idx)
            .map(Value::String)
            .unwrap_or(Value::Null),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => row
            .try_get::<i64, _>(idx)
            .map(Value::from)
            .unwrap_or(Value::Null),
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
        | "BIGINT UNSIGNED" => row
            .try_get::<u64, _>(idx)
            .map(Value::from)
            .unwrap_or(Value::Null),
        "FLOAT" | "DOUBLE" => row
            .try_get::<f64, _>(idx)
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        "DECIMAL" => row
            .try_get::<rust_decimal::Decimal, _>(idx)
            .map(|d| Value::String(d.to_string()))
            .unwrap_or(Value::Null),
        "DATE" => row
            .try_get::<chrono::NaiveDate, _>(idx)
            .map(|d| Value::String(d.to_string()))
            .unwrap_or(Value::Null),
        "DATETIME" => row
            .try_get::<chrono::NaiveDateTime, _>(idx)
            .map(|d| Value::String(d.to_string()))
            .unwrap_or(Value::Null),
        "TIMESTAMP" => row
            .try_get::<chrono::DateTime<chrono::Utc>, _>(idx)
            .map(|d| Value::String(d.to_rfc3339()))
            .unwrap_or(Value::Null),
        "BOOLEAN" => row
            .try_get::<bool, _>(idx)
            .map(Value::Bool)
            .unwrap_or(Value::Null),
        _ => row
            .try_get::<String, _>(idx)
            .map(Value::String)
            .unwrap_or(Value::Null),
    }
}
