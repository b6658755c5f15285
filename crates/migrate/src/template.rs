//! Migration file generation for `make:migration`

use std::fs;
use std::path::PathBuf;

use chrono::Utc;

use crate::config::MigrationConfig;
use crate::error::{MigrationError, MigrationResult};
use crate::naming;

/// Create a new timestamped migration stub in the configured directory
///
/// The user-supplied name is normalized to snake_case and stamped with the
/// current time, so the resulting file already follows the discovery
/// naming convention.
pub fn create_migration_file(config: &MigrationConfig, name: &str) -> MigrationResult<PathBuf> {
    let normalized = naming::snake_case(name);
    if normalized.is_empty() {
        return Err(MigrationError::Naming(name.to_string()));
    }

    fs::create_dir_all(&config.migrations_dir)?;

    let source = format!("{}_{}", naming::timestamp(), normalized);
    let path = config.migrations_dir.join(format!("{}.sql", source));
    fs::write(&path, migration_template(&normalized))?;

    Ok(path)
}

fn migration_template(name: &str) -> String {
    format!(
        "-- Migration: {}\n\
         -- Created: {}\n\n\
         -- Up\n\n\n\
         -- Down\n\n",
        name,
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config(dir: &TempDir) -> MigrationConfig {
        MigrationConfig {
            migrations_dir: dir.path().to_path_buf(),
            migrations_table: "migrations".to_string(),
        }
    }

    #[test]
    fn creates_stub_following_naming_convention() {
        let dir = TempDir::new().unwrap();
        let path = create_migration_file(&config(&dir), "Create Users Table").unwrap();

        let stem = path.file_stem().unwrap().to_str().unwrap();
        assert!(stem.ends_with("_create_users_table"));
        // the generated source name must round-trip through discovery naming
        let identifier = naming::derive_identifier(stem).unwrap();
        assert!(identifier.ends_with("CreateUsersTable"));

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("-- Migration: create_users_table"));
        assert!(content.contains("-- Up"));
        assert!(content.contains("-- Down"));
    }

    #[test]
    fn creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let mut config = config(&dir);
        config.migrations_dir = dir.path().join("db").join("migrations");

        let path = create_migration_file(&config, "add phone").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn blank_name_is_rejected() {
        let dir = TempDir::new().unwrap();
        let err = create_migration_file(&config(&dir), "   ").unwrap_err();
        assert!(matches!(err, MigrationError::Naming(_)));
    }
}
