//! # Primary-Key Resolver
//!
//! Maps a table name to the column that identifies a single row. Read-only
//! process-wide configuration, safe for unsynchronized concurrent reads.

use std::collections::HashMap;

/// Conventional identifying column used when no override exists.
pub const DEFAULT_ID_COLUMN: &str = "id";

/// Table-name to identifying-column mapping. Absence of an override is not
/// an error.
#[derive(Debug, Clone)]
pub struct PrimaryKeys {
    overrides: HashMap<String, String>,
}

impl Default for PrimaryKeys {
    fn default() -> Self {
        Self::new()
    }
}

impl PrimaryKeys {
    /// The built-in override set: quizzes are addressed by their
    /// human-readable slug rather than a surrogate key.
    pub fn new() -> Self {
        Self::from_map(HashMap::from([(
            "quizzes".to_string(),
            "slug".to_string(),
        )]))
    }

    /// A resolver with no overrides; every table uses the default column.
    pub fn empty() -> Self {
        Self {
            overrides: HashMap::new(),
        }
    }

    /// Builds a resolver from a configuration mapping.
    pub fn from_map(overrides: HashMap<String, String>) -> Self {
        Self { overrides }
    }

    /// Adds or replaces an override.
    pub fn with_override(mut self, table: &str, column: &str) -> Self {
        self.overrides.insert(table.to_string(), column.to_string());
        self
    }

    /// Resolves the identifying column for a table. Infallible.
    pub fn resolve(&self, table: &str) -> &str {
        self.overrides
            .get(table)
            .map(String::as_str)
            .unwrap_or(DEFAULT_ID_COLUMN)
    }
}
