//! Shared helpers for the query modules.

use taxa_core::errors::StorageError;

/// Map a rusqlite error into the storage error enum.
pub fn sqlite_err(e: rusqlite::Error) -> StorageError {
    StorageError::SqliteError {
        message: e.to_string(),
    }
}

/// Escape a user-supplied substring for use in a LIKE pattern with
/// `ESCAPE '\'`. SQLite's LIKE is ASCII-case-insensitive by default, which
/// is exactly the search contract.
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// A `%term%` containment pattern, escaped.
pub fn contains_pattern(term: &str) -> String {
    format!("%{}%", escape_like(term))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("50%_done"), "50\\%\\_done");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn test_contains_pattern() {
        assert_eq!(contains_pattern("ar"), "%ar%");
        assert_eq!(contains_pattern("a%b"), "%a\\%b%");
    }
}
