//! Migration unit types
//!
//! A migration is a named, ordered, reversible schema change. The `up`/`down`
//! capability runs against an opaque store handle `S`; production code uses
//! `sqlx::PgPool`, tests substitute their own store.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::MigrationResult;

/// Forward/reverse operations of a single migration
#[async_trait]
pub trait Migration<S>: Send + Sync {
    /// Apply the schema change
    async fn up(&self, store: &S) -> MigrationResult<()>;

    /// Reverse the schema change
    async fn down(&self, store: &S) -> MigrationResult<()>;
}

/// A discovered migration definition before identifier derivation
///
/// `migration` is `None` when the loader found the entry but could not bind
/// an up/down pair to it; the registry reports that as a binding error.
pub struct MigrationEntry<S> {
    /// Source name, `<timestamp>_<snake_case_name>` from the definition
    pub source: String,
    /// The bound capability, if any
    pub migration: Option<Arc<dyn Migration<S>>>,
}

impl<S> MigrationEntry<S> {
    /// Entry with a bound up/down capability
    pub fn bound(source: impl Into<String>, migration: impl Migration<S> + 'static) -> Self {
        Self {
            source: source.into(),
            migration: Some(Arc::new(migration)),
        }
    }

    /// Entry whose up/down pair could not be bound
    pub fn unbound(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            migration: None,
        }
    }
}

impl<S> Clone for MigrationEntry<S> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            migration: self.migration.clone(),
        }
    }
}

/// A migration unit bound to its canonical identifier
///
/// Immutable once discovered; identifiers derive from the source name alone,
/// never from a runtime type.
pub struct MigrationUnit<S> {
    identifier: String,
    ops: Arc<dyn Migration<S>>,
}

impl<S> MigrationUnit<S> {
    pub(crate) fn new(identifier: String, ops: Arc<dyn Migration<S>>) -> Self {
        Self { identifier, ops }
    }

    /// Canonical identifier, `<timestamp><CamelCaseWords>`
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Run the forward operation
    pub async fn up(&self, store: &S) -> MigrationResult<()> {
        self.ops.up(store).await
    }

    /// Run the reverse operation
    pub async fn down(&self, store: &S) -> MigrationResult<()> {
        self.ops.down(store).await
    }
}

impl<S> Clone for MigrationUnit<S> {
    fn clone(&self) -> Self {
        Self {
            identifier: self.identifier.clone(),
            ops: self.ops.clone(),
        }
    }
}

impl<S> fmt::Debug for MigrationUnit<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationUnit")
            .field("identifier", &self.identifier)
            .finish()
    }
}

/// Direction of a migration operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationDirection {
    /// Apply the migration
    Up,
    /// Reverse the migration
    Down,
}

impl fmt::Display for MigrationDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationDirection::Up => write!(f, "up"),
            MigrationDirection::Down => write!(f, "down"),
        }
    }
}
