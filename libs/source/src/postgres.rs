//! Postgres table source.
//!
//! Reads the prospect ID column of a project boundary table. The same row
//! filter as every other source is applied in SQL and again in Rust.

use std::time::Duration;

use async_trait::async_trait;
use prospect_id::ProspectId;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use crate::{normalize, IdSource, SourceError};

/// Default table holding issued prospect IDs.
pub const DEFAULT_TABLE: &str = "apex_project_boundary";

/// Database configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Database connection URL.
    pub database_url: String,

    /// Table with a `prospect_id` column.
    pub table: String,

    /// Maximum number of connections in the pool.
    pub max_connections: u32,

    /// Connection acquire timeout.
    pub acquire_timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            database_url: "postgres://localhost/prospects".to_string(),
            table: DEFAULT_TABLE.to_string(),
            max_connections: 2,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

impl DbConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let database_url = std::env::var("PROSPECT_DATABASE_URL").unwrap_or(defaults.database_url);

        let table = std::env::var("PROSPECT_TABLE").unwrap_or(defaults.table);

        let max_connections = std::env::var("PROSPECT_DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_connections);

        Self {
            database_url,
            table,
            max_connections,
            ..defaults
        }
    }
}

/// Reads issued IDs from a Postgres table.
#[derive(Debug, Clone)]
pub struct PgSource {
    pool: PgPool,
    table: String,
}

impl PgSource {
    /// Connects to the database described by `config`.
    pub async fn connect(config: &DbConfig) -> Result<Self, SourceError> {
        validate_table_name(&config.table)?;

        info!(
            table = %config.table,
            max_connections = config.max_connections,
            "Connecting to database"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.database_url)
            .await
            .map_err(SourceError::Connect)?;

        Ok(Self {
            pool,
            table: config.table.clone(),
        })
    }

    /// Wraps an existing pool.
    pub fn from_pool(pool: PgPool, table: impl Into<String>) -> Result<Self, SourceError> {
        let table = table.into();
        validate_table_name(&table)?;
        Ok(Self { pool, table })
    }
}

#[async_trait]
impl IdSource for PgSource {
    async fn fetch(&self) -> Result<Vec<ProspectId>, SourceError> {
        let rows = sqlx::query_scalar::<_, String>(&select_query(&self.table))
            .fetch_all(&self.pool)
            .await
            .map_err(SourceError::Query)?;

        Ok(normalize(rows, &self.describe()))
    }

    fn describe(&self) -> String {
        format!("postgres:{}", self.table)
    }
}

/// Builds the select statement for a validated table name.
fn select_query(table: &str) -> String {
    format!(
        r#"
        SELECT prospect_id
        FROM {table}
        WHERE length(prospect_id) = 9
          AND left(prospect_id, 8) ~ '^[0-9]{{8}}$'
          AND left(prospect_id, 8) <> '00000000'
          AND right(prospect_id, 1) ~ '^[a-zA-Z]$'
        ORDER BY prospect_id
        "#
    )
}

/// Accepts `name` or `schema.name` made of `[A-Za-z_][A-Za-z0-9_]*` parts.
fn validate_table_name(table: &str) -> Result<(), SourceError> {
    let valid_part = |part: &str| {
        let mut chars = part.chars();
        chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    };

    let parts: Vec<&str> = table.split('.').collect();
    if parts.len() <= 2 && parts.iter().all(|part| valid_part(part)) {
        Ok(())
    } else {
        Err(SourceError::InvalidTableName(table.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_table_name() {
        assert!(validate_table_name("apex_project_boundary").is_ok());
        assert!(validate_table_name("gis.apex_project_boundary").is_ok());
        assert!(validate_table_name("_t1").is_ok());
        assert!(validate_table_name("").is_err());
        assert!(validate_table_name("1table").is_err());
        assert!(validate_table_name("a.b.c").is_err());
        assert!(validate_table_name("t; DROP TABLE t").is_err());
    }

    #[test]
    fn test_select_query_filters_rows() {
        let query = select_query("gis.boundaries");
        assert!(query.contains("FROM gis.boundaries"));
        assert!(query.contains("'^[0-9]{8}$'"));
        assert!(query.contains("ORDER BY prospect_id"));
    }

    #[test]
    fn test_db_config_defaults() {
        let config = DbConfig::default();
        assert_eq!(config.table, DEFAULT_TABLE);
        assert!(config.max_connections > 0);
    }
}
