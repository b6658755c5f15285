//! Error types for the migration engine
//!
//! Every failure aborts the current apply/rollback run; no compensating
//! rollback is performed. The ledger reflects exactly what completed.

use thiserror::Error;

use crate::migration::MigrationDirection;

/// Result type alias for migration operations
pub type MigrationResult<T> = Result<T, MigrationError>;

/// Error types for migration discovery, bookkeeping and execution
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Migration source could not be read or loaded
    #[error("failed to read migration source: {0}")]
    Discovery(String),

    /// Source name does not follow the `<timestamp>_<snake_case_name>` convention
    #[error("migration source '{0}' does not follow the <timestamp>_<name> naming convention")]
    Naming(String),

    /// Discovered entry lacks a usable up/down pair
    #[error("migration '{0}' does not provide a usable up/down pair")]
    Binding(String),

    /// Two sources resolve to the same identifier; order would be nondeterministic
    #[error("migration sources '{0}' and '{1}' resolve to the same identifier")]
    AmbiguousOrder(String, String),

    /// Ledger uniqueness violated
    #[error("migration '{0}' is already recorded in the ledger")]
    DuplicateName(String),

    /// Expected ledger record missing on delete
    #[error("no ledger record found for migration '{0}'")]
    LedgerInconsistency(String),

    /// Rollback target is recorded but no longer resolvable in the registry
    #[error("migration '{0}' is recorded in the ledger but not available in the registry")]
    MissingUnit(String),

    /// Underlying database call failed
    #[error("store operation failed: {0}")]
    Store(String),

    /// File system error while creating or reading migration files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing engine configuration
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A unit's up/down operation failed; carries the causing migration name
    #[error("migration '{name}' failed during {direction}: {source}")]
    UnitFailed {
        name: String,
        direction: MigrationDirection,
        #[source]
        source: Box<MigrationError>,
    },
}

impl From<sqlx::Error> for MigrationError {
    fn from(err: sqlx::Error) -> Self {
        MigrationError::Store(err.to_string())
    }
}
