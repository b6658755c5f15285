//! SQL-backed migration units
//!
//! A [`SqlMigration`] holds raw up/down SQL and executes it statement by
//! statement against a Postgres pool.

use async_trait::async_trait;
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;
use sqlx::PgPool;

use crate::error::MigrationResult;
use crate::migration::Migration;

/// Migration unit defined by raw SQL
#[derive(Debug, Clone)]
pub struct SqlMigration {
    name: String,
    up_sql: String,
    down_sql: String,
}

impl SqlMigration {
    pub fn new(
        name: impl Into<String>,
        up_sql: impl Into<String>,
        down_sql: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            up_sql: up_sql.into(),
            down_sql: down_sql.into(),
        }
    }

    /// Human-readable name, derived from the source words
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn up_sql(&self) -> &str {
        &self.up_sql
    }

    pub fn down_sql(&self) -> &str {
        &self.down_sql
    }

    async fn execute(&self, pool: &PgPool, sql: &str) -> MigrationResult<()> {
        for statement in split_sql_statements(sql) {
            sqlx::query(&statement).execute(pool).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Migration<PgPool> for SqlMigration {
    async fn up(&self, store: &PgPool) -> MigrationResult<()> {
        self.execute(store, &self.up_sql).await
    }

    async fn down(&self, store: &PgPool) -> MigrationResult<()> {
        self.execute(store, &self.down_sql).await
    }
}

/// Split a SQL string into individual statements
///
/// Parses with sqlparser; on parse failure falls back to naive semicolon
/// splitting so dialect-specific statements still run.
pub fn split_sql_statements(sql: &str) -> Vec<String> {
    let dialect = GenericDialect {};
    match Parser::parse_sql(&dialect, sql) {
        Ok(statements) => statements
            .into_iter()
            .map(|statement| format!("{};", statement))
            .collect(),
        Err(e) => {
            tracing::warn!("SQL parsing failed, using naive semicolon splitting: {}", e);
            sql.split(';')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| format!("{};", s))
                .collect()
        }
    }
}
