//! Applied-migration ledger
//!
//! Persistent record of which migration names have been applied, in which
//! batch, and when. Records are created by the executor on successful `up`
//! and deleted by the rollback engine on successful `down`; nothing else
//! mutates them.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Row};

use crate::error::{MigrationError, MigrationResult};

/// One ledger row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerRecord {
    /// Surrogate key, insertion order
    pub id: i64,
    /// Canonical migration identifier, unique across the ledger
    pub name: String,
    /// Batch the migration was applied in
    pub batch: i32,
    /// When the migration was applied
    pub applied_at: DateTime<Utc>,
}

/// Ledger contract against the backing store
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Idempotently create the record store if absent
    async fn ensure_schema(&self) -> MigrationResult<()>;

    /// `max(batch) + 1`, or 1 on an empty ledger; pure read, the caller
    /// uses the value for every record it writes in the same run
    async fn next_batch(&self) -> MigrationResult<i32>;

    /// All currently recorded names
    async fn applied_names(&self) -> MigrationResult<HashSet<String>>;

    /// All records in insertion order
    async fn applied_records(&self) -> MigrationResult<Vec<LedgerRecord>>;

    /// Insert a record with the current time
    async fn record(&self, name: &str, batch: i32) -> MigrationResult<()>;

    /// Delete the record for `name`
    async fn remove(&self, name: &str) -> MigrationResult<()>;

    /// Names of the maximum batch, reverse application order (descending
    /// insertion id); empty on an empty ledger
    async fn last_batch_names(&self) -> MigrationResult<Vec<String>>;
}

/// Postgres-backed ledger
pub struct PgLedger {
    pool: PgPool,
    table: String,
}

impl PgLedger {
    /// Ledger over the default `migrations` table
    pub fn new(pool: PgPool) -> Self {
        Self::with_table(pool, "migrations")
    }

    /// Ledger over a custom table name
    pub fn with_table(pool: PgPool, table: impl Into<String>) -> Self {
        Self {
            pool,
            table: table.into(),
        }
    }

    fn create_table_sql(&self) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    \
                id BIGSERIAL PRIMARY KEY,\n    \
                migration VARCHAR(255) NOT NULL UNIQUE,\n    \
                batch INTEGER NOT NULL,\n    \
                created_at TIMESTAMPTZ NOT NULL\n\
            );",
            self.table
        )
    }

    fn next_batch_sql(&self) -> String {
        format!("SELECT COALESCE(MAX(batch), 0) + 1 FROM {}", self.table)
    }

    fn applied_names_sql(&self) -> String {
        format!("SELECT migration FROM {}", self.table)
    }

    fn applied_records_sql(&self) -> String {
        format!(
            "SELECT id, migration, batch, created_at FROM {} ORDER BY id",
            self.table
        )
    }

    fn exists_sql(&self) -> String {
        format!("SELECT migration FROM {} WHERE migration = $1", self.table)
    }

    fn insert_sql(&self) -> String {
        format!(
            "INSERT INTO {} (migration, batch, created_at) VALUES ($1, $2, $3)",
            self.table
        )
    }

    fn delete_sql(&self) -> String {
        format!("DELETE FROM {} WHERE migration = $1", self.table)
    }

    fn last_batch_sql(&self) -> String {
        format!(
            "SELECT migration FROM {table} \
             WHERE batch = (SELECT MAX(batch) FROM {table}) \
             ORDER BY id DESC",
            table = self.table
        )
    }
}

#[async_trait]
impl Ledger for PgLedger {
    async fn ensure_schema(&self) -> MigrationResult<()> {
        sqlx::query(&self.create_table_sql())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn next_batch(&self) -> MigrationResult<i32> {
        let row = sqlx::query(&self.next_batch_sql())
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get(0)?)
    }

    async fn applied_names(&self) -> MigrationResult<HashSet<String>> {
        let rows = sqlx::query(&self.applied_names_sql())
            .fetch_all(&self.pool)
            .await?;

        let mut names = HashSet::with_capacity(rows.len());
        for row in rows {
            names.insert(row.try_get("migration")?);
        }
        Ok(names)
    }

    async fn applied_records(&self) -> MigrationResult<Vec<LedgerRecord>> {
        let rows = sqlx::query(&self.applied_records_sql())
            .fetch_all(&self.pool)
            .await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(LedgerRecord {
                id: row.try_get("id")?,
                name: row.try_get("migration")?,
                batch: row.try_get("batch")?,
                applied_at: row.try_get("created_at")?,
            });
        }
        Ok(records)
    }

    async fn record(&self, name: &str, batch: i32) -> MigrationResult<()> {
        // check-then-insert relies on the single-writer assumption; the
        // UNIQUE column backstops concurrent writers
        let existing = sqlx::query(&self.exists_sql())
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(MigrationError::DuplicateName(name.to_string()));
        }

        sqlx::query(&self.insert_sql())
            .bind(name)
            .bind(batch)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn remove(&self, name: &str) -> MigrationResult<()> {
        let result = sqlx::query(&self.delete_sql())
            .bind(name)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(MigrationError::LedgerInconsistency(name.to_string()));
        }
        Ok(())
    }

    async fn last_batch_names(&self) -> MigrationResult<Vec<String>> {
        let rows = sqlx::query(&self.last_batch_sql())
            .fetch_all(&self.pool)
            .await?;

        let mut names = Vec::with_capacity(rows.len());
        for row in rows {
            names.push(row.try_get("migration")?);
        }
        Ok(names)
    }
}
