//! Migration registry
//!
//! Discovers available migration units through a pluggable loader and
//! returns them in a deterministic total order, ascending by identifier.

use std::sync::Arc;

use crate::error::{MigrationError, MigrationResult};
use crate::migration::{Migration, MigrationEntry, MigrationUnit};
use crate::naming;

/// External loading collaborator that produces migration entries
pub trait MigrationLoader<S>: Send + Sync {
    fn load(&self) -> MigrationResult<Vec<MigrationEntry<S>>>;
}

/// Build-time registration list of migration units
///
/// The preferred loader for statically linked migrations: each unit is
/// registered explicitly under its source name.
pub struct StaticLoader<S> {
    entries: Vec<MigrationEntry<S>>,
}

impl<S> StaticLoader<S> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register a migration under its source name
    pub fn register(
        mut self,
        source: impl Into<String>,
        migration: impl Migration<S> + 'static,
    ) -> Self {
        self.entries.push(MigrationEntry::bound(source, migration));
        self
    }
}

impl<S> Default for StaticLoader<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> MigrationLoader<S> for StaticLoader<S> {
    fn load(&self) -> MigrationResult<Vec<MigrationEntry<S>>> {
        Ok(self.entries.clone())
    }
}

/// Discovers and orders migration units
///
/// Units are owned by the registry for the duration of a run; discovery
/// re-derives every identifier from its source name.
pub struct Registry<S> {
    loader: Box<dyn MigrationLoader<S>>,
}

impl<S> Registry<S> {
    pub fn new(loader: impl MigrationLoader<S> + 'static) -> Self {
        Self {
            loader: Box::new(loader),
        }
    }

    /// All available units, ascending by identifier
    ///
    /// Equal identifiers are never resolved silently; they abort discovery,
    /// since the resulting order would be nondeterministic.
    pub fn discover(&self) -> MigrationResult<Vec<MigrationUnit<S>>> {
        let entries = self.loader.load()?;

        let mut bound: Vec<(String, String, Arc<dyn Migration<S>>)> =
            Vec::with_capacity(entries.len());
        for entry in entries {
            let identifier = naming::derive_identifier(&entry.source)?;
            let ops = match entry.migration {
                Some(ops) => ops,
                None => return Err(MigrationError::Binding(entry.source)),
            };
            bound.push((identifier, entry.source, ops));
        }

        bound.sort_by(|a, b| a.0.cmp(&b.0));
        for pair in bound.windows(2) {
            if pair[0].0 == pair[1].0 {
                return Err(MigrationError::AmbiguousOrder(
                    pair[0].1.clone(),
                    pair[1].1.clone(),
                ));
            }
        }

        Ok(bound
            .into_iter()
            .map(|(identifier, _, ops)| MigrationUnit::new(identifier, ops))
            .collect())
    }

    /// Find a single unit by its canonical identifier
    pub fn resolve(&self, name: &str) -> MigrationResult<MigrationUnit<S>> {
        self.discover()?
            .into_iter()
            .find(|unit| unit.identifier() == name)
            .ok_or_else(|| MigrationError::MissingUnit(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Noop;

    #[async_trait]
    impl Migration<()> for Noop {
        async fn up(&self, _store: &()) -> MigrationResult<()> {
            Ok(())
        }

        async fn down(&self, _store: &()) -> MigrationResult<()> {
            Ok(())
        }
    }

    #[test]
    fn discovery_orders_by_identifier() {
        let loader = StaticLoader::new()
            .register("20240601000200_add_phone_to_users", Noop)
            .register("20240601000000_create_users_table", Noop)
            .register("20240601000100_create_products_table", Noop);

        let units = Registry::new(loader).discover().unwrap();
        let identifiers: Vec<_> = units.iter().map(|u| u.identifier()).collect();
        assert_eq!(
            identifiers,
            vec![
                "20240601000000CreateUsersTable",
                "20240601000100CreateProductsTable",
                "20240601000200AddPhoneToUsers",
            ]
        );
    }

    #[test]
    fn unbound_entry_is_a_binding_error() {
        struct Unbound;

        impl MigrationLoader<()> for Unbound {
            fn load(&self) -> MigrationResult<Vec<MigrationEntry<()>>> {
                Ok(vec![MigrationEntry::unbound("20240601000000_create_users")])
            }
        }

        let err = Registry::new(Unbound).discover().unwrap_err();
        assert!(matches!(err, MigrationError::Binding(source) if source.ends_with("create_users")));
    }

    #[test]
    fn malformed_source_is_a_naming_error() {
        let loader = StaticLoader::new().register("create_users_table", Noop);
        let err = Registry::new(loader).discover().unwrap_err();
        assert!(matches!(err, MigrationError::Naming(_)));
    }

    #[test]
    fn equal_identifiers_are_ambiguous() {
        let loader = StaticLoader::new()
            .register("20240601000000_create_users", Noop)
            .register("20240601000000_create_users", Noop);

        let err = Registry::new(loader).discover().unwrap_err();
        assert!(matches!(err, MigrationError::AmbiguousOrder(_, _)));
    }

    #[test]
    fn resolve_finds_unit_or_reports_missing() {
        let loader = StaticLoader::new().register("20240601000000_create_users", Noop);
        let registry = Registry::new(loader);

        let unit = registry.resolve("20240601000000CreateUsers").unwrap();
        assert_eq!(unit.identifier(), "20240601000000CreateUsers");

        let err = registry.resolve("20240601000100Missing").unwrap_err();
        assert!(matches!(err, MigrationError::MissingUnit(_)));
    }
}
