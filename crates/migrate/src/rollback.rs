//! Rollback engine - reverts the most recent batch
//!
//! Reads the last batch from the ledger, resolves each recorded name back
//! to a unit through the registry, and reverts in reverse application
//! order, deleting each record after its `down` succeeds.

use std::collections::HashMap;
use std::time::Instant;

use crate::error::{MigrationError, MigrationResult};
use crate::executor::Executor;
use crate::ledger::Ledger;
use crate::migration::{MigrationDirection, MigrationUnit};

/// Outcome of a rollback run
#[derive(Debug)]
pub struct RollbackReport {
    /// Identifiers reverted by this run, in reversion order
    pub rolled_back: Vec<String>,
    /// Total execution time in milliseconds
    pub execution_time_ms: u128,
}

/// Extension trait adding batch rollback to [`Executor`]
pub trait BatchRollback {
    /// Revert the most recently applied batch
    async fn rollback_last_batch(&self) -> MigrationResult<RollbackReport>;
}

impl<S, L: Ledger> BatchRollback for Executor<S, L> {
    /// Fail-fast: a failing `down` aborts the run, leaving already-reverted
    /// units reverted. Every recorded name must still be resolvable before
    /// the first `down` runs, so an unresolvable name deletes nothing.
    async fn rollback_last_batch(&self) -> MigrationResult<RollbackReport> {
        let start = Instant::now();

        self.ledger().ensure_schema().await?;
        let names = self.ledger().last_batch_names().await?;
        if names.is_empty() {
            tracing::info!("nothing to roll back");
            return Ok(RollbackReport {
                rolled_back: Vec::new(),
                execution_time_ms: start.elapsed().as_millis(),
            });
        }

        let units: HashMap<String, MigrationUnit<S>> = self
            .registry()
            .discover()?
            .into_iter()
            .map(|unit| (unit.identifier().to_string(), unit))
            .collect();

        for name in &names {
            if !units.contains_key(name) {
                return Err(MigrationError::MissingUnit(name.clone()));
            }
        }

        let mut rolled_back = Vec::new();
        for name in &names {
            let unit = &units[name];

            tracing::info!(migration = name.as_str(), "rolling back migration");
            unit.down(self.store())
                .await
                .map_err(|source| MigrationError::UnitFailed {
                    name: name.clone(),
                    direction: MigrationDirection::Down,
                    source: Box::new(source),
                })?;
            self.ledger().remove(name).await?;
            rolled_back.push(name.clone());
        }

        Ok(RollbackReport {
            rolled_back,
            execution_time_ms: start.elapsed().as_millis(),
        })
    }
}
