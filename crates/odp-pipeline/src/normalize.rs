//! Identifier normalization
//!
//! The platform restricts identifiers to lowercase `[a-z0-9_]` with
//! different length limits for table and column names. Normalization is a
//! pure function and idempotent: re-normalizing an already-normalized name
//! is a no-op.

use crate::error::{PipelineError, Result};

/// Maximum length of a normalized table name
pub const MAX_TABLE_NAME_LEN: usize = 55;

/// Maximum length of a normalized column name
pub const MAX_COLUMN_NAME_LEN: usize = 65;

/// The kind of identifier being normalized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Table,
    Column,
}

impl NameKind {
    /// Length limit for this identifier kind
    pub fn max_len(self) -> usize {
        match self {
            NameKind::Table => MAX_TABLE_NAME_LEN,
            NameKind::Column => MAX_COLUMN_NAME_LEN,
        }
    }
}

/// Normalize an identifier to the platform's constraints
///
/// Lowercases the input, replaces every run of characters outside
/// `[a-z0-9_]` with a single underscore, collapses repeated underscores,
/// strips leading and trailing underscores, and truncates to the kind's
/// length limit (trimming any underscore the cut leaves at the end).
///
/// Fails with [`PipelineError::InvalidName`] when nothing remains.
pub fn normalize(name: &str, kind: NameKind) -> Result<String> {
    let mut out = String::with_capacity(name.len());

    // underscores and disallowed runs both collapse to a single underscore
    for c in name.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            out.push(c);
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }

    let trimmed = out.trim_matches('_');
    let mut result: String = trimmed.chars().take(kind.max_len()).collect();
    while result.ends_with('_') {
        result.pop();
    }

    if result.is_empty() {
        return Err(PipelineError::InvalidName(name.to_string()));
    }

    Ok(result)
}
