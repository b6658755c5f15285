//! Identifier derivation and generation
//!
//! Source names follow `<14-digit-timestamp>_<snake_case_words>`; the
//! canonical identifier is `<timestamp><CamelCaseWords>`, regenerated
//! deterministically from the source name alone.

use chrono::Utc;

use crate::error::{MigrationError, MigrationResult};

/// Length of the `YYYYMMDDHHMMSS` timestamp prefix
pub const TIMESTAMP_LEN: usize = 14;

/// Derive the canonical identifier from a source name
///
/// `20240601000000_create_users_table` becomes
/// `20240601000000CreateUsersTable`.
pub fn derive_identifier(source: &str) -> MigrationResult<String> {
    let timestamp = source
        .get(..TIMESTAMP_LEN)
        .filter(|t| t.bytes().all(|b| b.is_ascii_digit()))
        .ok_or_else(|| MigrationError::Naming(source.to_string()))?;

    if source.as_bytes().get(TIMESTAMP_LEN) != Some(&b'_') {
        return Err(MigrationError::Naming(source.to_string()));
    }

    let words = &source[TIMESTAMP_LEN + 1..];
    if words.is_empty() {
        return Err(MigrationError::Naming(source.to_string()));
    }

    let mut identifier = String::with_capacity(source.len());
    identifier.push_str(timestamp);
    for word in words.split('_') {
        if word.is_empty()
            || !word
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        {
            return Err(MigrationError::Naming(source.to_string()));
        }
        let mut chars = word.chars();
        // non-empty, checked above
        if let Some(first) = chars.next() {
            identifier.push(first.to_ascii_uppercase());
            identifier.push_str(chars.as_str());
        }
    }

    Ok(identifier)
}

/// Normalize a user-supplied migration name to snake_case
pub fn snake_case(name: &str) -> String {
    name.split_whitespace()
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Current time as a 14-digit `YYYYMMDDHHMMSS` timestamp
pub fn timestamp() -> String {
    Utc::now().format("%Y%m%d%H%M%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_camel_case_identifier() {
        let id = derive_identifier("20240601000000_create_users_table").unwrap();
        assert_eq!(id, "20240601000000CreateUsersTable");
    }

    #[test]
    fn derives_single_word_and_digit_words() {
        assert_eq!(
            derive_identifier("20240601000100_products").unwrap(),
            "20240601000100Products"
        );
        assert_eq!(
            derive_identifier("20240601000200_add_v2_columns").unwrap(),
            "20240601000200AddV2Columns"
        );
    }

    #[test]
    fn rejects_short_or_non_numeric_timestamp() {
        assert!(matches!(
            derive_identifier("2024_create_users"),
            Err(MigrationError::Naming(_))
        ));
        assert!(matches!(
            derive_identifier("2024060100000x_create_users"),
            Err(MigrationError::Naming(_))
        ));
    }

    #[test]
    fn rejects_missing_name_part() {
        assert!(matches!(
            derive_identifier("20240601000000"),
            Err(MigrationError::Naming(_))
        ));
        assert!(matches!(
            derive_identifier("20240601000000_"),
            Err(MigrationError::Naming(_))
        ));
    }

    #[test]
    fn rejects_non_snake_case_words() {
        assert!(matches!(
            derive_identifier("20240601000000_Create_users"),
            Err(MigrationError::Naming(_))
        ));
        assert!(matches!(
            derive_identifier("20240601000000_create__users"),
            Err(MigrationError::Naming(_))
        ));
    }

    #[test]
    fn snake_cases_whitespace_separated_words() {
        assert_eq!(snake_case("Create Users Table"), "create_users_table");
        assert_eq!(snake_case("  add   phone  "), "add_phone");
    }

    #[test]
    fn timestamp_is_fourteen_digits() {
        let ts = timestamp();
        assert_eq!(ts.len(), TIMESTAMP_LEN);
        assert!(ts.bytes().all(|b| b.is_ascii_digit()));
    }
}
