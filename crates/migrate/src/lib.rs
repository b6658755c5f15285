//! Batch-oriented schema migration engine
//!
//! Applies ordered, reversible schema-change units against a persistent
//! store and durably records which units have run. Migrations applied in
//! one run share a batch number; rollback reverts exactly the most recent
//! batch, in reverse application order.
//!
//! The engine is store-agnostic: units implement [`Migration`] over an
//! opaque store handle, the [`Registry`] discovers and orders them, and a
//! [`Ledger`] keeps the applied-migration record. [`SqlMigration`] and
//! [`PgLedger`] provide the Postgres-backed production pieces.

pub mod config;
pub mod error;
pub mod executor;
pub mod ledger;
pub mod loader;
pub mod migration;
pub mod naming;
pub mod registry;
pub mod rollback;
pub mod sql;
pub mod template;

pub use config::MigrationConfig;
pub use error::{MigrationError, MigrationResult};
pub use executor::{ApplyReport, Executor, MigrationStatus};
pub use ledger::{Ledger, LedgerRecord, PgLedger};
pub use loader::DirectoryLoader;
pub use migration::{Migration, MigrationDirection, MigrationEntry, MigrationUnit};
pub use registry::{MigrationLoader, Registry, StaticLoader};
pub use rollback::{BatchRollback, RollbackReport};
pub use sql::SqlMigration;
