//! Executor - applies pending migrations
//!
//! Walks discovered units in ascending identifier order, skips the ones the
//! ledger already records, runs `up` for the rest and records each success
//! under a single batch number. The first failure aborts the run; the
//! ledger keeps everything that completed.

use std::collections::HashMap;
use std::time::Instant;

use chrono::{DateTime, Utc};

use crate::error::{MigrationError, MigrationResult};
use crate::ledger::Ledger;
use crate::migration::MigrationDirection;
use crate::registry::Registry;

/// Migration executor holding the registry, ledger and store handle
///
/// The store handle is a required constructor argument; an executor cannot
/// exist without one.
pub struct Executor<S, L> {
    registry: Registry<S>,
    ledger: L,
    store: S,
}

/// Outcome of an apply run
#[derive(Debug)]
pub struct ApplyReport {
    /// Batch the applied migrations were recorded under; `None` when
    /// nothing was pending
    pub batch: Option<i32>,
    /// Identifiers applied by this run, in application order
    pub applied: Vec<String>,
    /// Units skipped because the ledger already records them
    pub skipped: usize,
    /// Total execution time in milliseconds
    pub execution_time_ms: u128,
}

/// Applied/pending state of a single migration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationStatus {
    /// Not yet applied
    Pending,
    /// Recorded in the ledger
    Applied {
        batch: i32,
        applied_at: DateTime<Utc>,
    },
}

impl<S, L: Ledger> Executor<S, L> {
    pub fn new(registry: Registry<S>, ledger: L, store: S) -> Self {
        Self {
            registry,
            ledger,
            store,
        }
    }

    pub fn registry(&self) -> &Registry<S> {
        &self.registry
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Apply all pending migrations in ascending identifier order
    ///
    /// Fail-fast: the first failing unit aborts the run with no record
    /// written for it and no further units attempted. Re-running is
    /// idempotent for everything already recorded.
    pub async fn apply(&self) -> MigrationResult<ApplyReport> {
        let start = Instant::now();

        self.ledger.ensure_schema().await?;
        let batch = self.ledger.next_batch().await?;
        let applied = self.ledger.applied_names().await?;

        let units = self.registry.discover()?;

        let mut applied_now = Vec::new();
        let mut skipped = 0;
        for unit in &units {
            if applied.contains(unit.identifier()) {
                tracing::debug!(migration = unit.identifier(), "already applied, skipping");
                skipped += 1;
                continue;
            }

            tracing::info!(migration = unit.identifier(), batch, "applying migration");
            unit.up(&self.store)
                .await
                .map_err(|source| MigrationError::UnitFailed {
                    name: unit.identifier().to_string(),
                    direction: MigrationDirection::Up,
                    source: Box::new(source),
                })?;
            self.ledger.record(unit.identifier(), batch).await?;
            applied_now.push(unit.identifier().to_string());
        }

        Ok(ApplyReport {
            batch: if applied_now.is_empty() {
                None
            } else {
                Some(batch)
            },
            applied: applied_now,
            skipped,
            execution_time_ms: start.elapsed().as_millis(),
        })
    }

    /// Applied/pending status for every discovered unit, ascending order
    pub async fn status(&self) -> MigrationResult<Vec<(String, MigrationStatus)>> {
        self.ledger.ensure_schema().await?;
        let records: HashMap<String, (i32, DateTime<Utc>)> = self
            .ledger
            .applied_records()
            .await?
            .into_iter()
            .map(|record| (record.name, (record.batch, record.applied_at)))
            .collect();

        let mut statuses = Vec::new();
        for unit in self.registry.discover()? {
            let status = match records.get(unit.identifier()) {
                Some(&(batch, applied_at)) => MigrationStatus::Applied { batch, applied_at },
                None => MigrationStatus::Pending,
            };
            statuses.push((unit.identifier().to_string(), status));
        }
        Ok(statuses)
    }
}
