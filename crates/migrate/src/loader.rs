//! File system loader for SQL migrations
//!
//! Scans a directory for `*.sql` files and parses each into an entry whose
//! up/down capability is a [`SqlMigration`]. A missing directory loads as
//! empty; a fresh project has no migrations yet.

use std::fs;
use std::path::{Path, PathBuf};

use sqlx::PgPool;

use crate::error::{MigrationError, MigrationResult};
use crate::migration::MigrationEntry;
use crate::naming;
use crate::registry::MigrationLoader;
use crate::sql::SqlMigration;

/// Loads migration entries from `*.sql` files in a directory
pub struct DirectoryLoader {
    dir: PathBuf,
}

impl DirectoryLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn load_file(&self, path: &Path) -> MigrationResult<MigrationEntry<PgPool>> {
        let source = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| {
                MigrationError::Discovery(format!("invalid migration filename: {}", path.display()))
            })?
            .to_string();

        let content = fs::read_to_string(path).map_err(|e| {
            MigrationError::Discovery(format!("failed to read {}: {}", path.display(), e))
        })?;

        Ok(match parse_sections(&content) {
            Some((up_sql, down_sql)) => {
                let name = source
                    .get(naming::TIMESTAMP_LEN + 1..)
                    .unwrap_or(&source)
                    .replace('_', " ");
                MigrationEntry::bound(source, SqlMigration::new(name, up_sql, down_sql))
            }
            // no up/down pair to bind; the registry reports this
            None => MigrationEntry::unbound(source),
        })
    }
}

impl MigrationLoader<PgPool> for DirectoryLoader {
    fn load(&self) -> MigrationResult<Vec<MigrationEntry<PgPool>>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let dir = fs::read_dir(&self.dir).map_err(|e| {
            MigrationError::Discovery(format!("failed to read {}: {}", self.dir.display(), e))
        })?;

        let mut entries = Vec::new();
        for entry in dir {
            let entry = entry.map_err(|e| {
                MigrationError::Discovery(format!("failed to read directory entry: {}", e))
            })?;
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "sql") {
                entries.push(self.load_file(&path)?);
            }
        }
        Ok(entries)
    }
}

/// Extract the `-- Up` and `-- Down` sections of a migration file
///
/// Returns `None` unless both section markers are present. Comment and
/// blank lines are dropped; empty sections are allowed.
fn parse_sections(content: &str) -> Option<(String, String)> {
    enum Section {
        None,
        Up,
        Down,
    }

    let mut section = Section::None;
    let mut seen_up = false;
    let mut seen_down = false;
    let mut up_lines: Vec<&str> = Vec::new();
    let mut down_lines: Vec<&str> = Vec::new();

    for line in content.lines() {
        let trimmed = line.trim().to_lowercase();
        if trimmed.starts_with("-- up") {
            section = Section::Up;
            seen_up = true;
            continue;
        }
        if trimmed.starts_with("-- down") {
            section = Section::Down;
            seen_down = true;
            continue;
        }
        if trimmed.is_empty() || trimmed.starts_with("--") {
            continue;
        }
        match section {
            Section::Up => up_lines.push(line),
            Section::Down => down_lines.push(line),
            Section::None => {}
        }
    }

    if seen_up && seen_down {
        Some((up_lines.join("\n"), down_lines.join("\n")))
    } else {
        None
    }
}
