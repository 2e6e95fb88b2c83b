//! Common type definitions.
//!
//! Entity IDs are SQLite integer rowids wrapped in type aliases so signatures say what they hold.

// Type aliases for IDs
pub type UserId = i64;
pub type ScoreId = i64;

/// Lowest score a user may record for a day.
pub const MIN_SCORE: i64 = 1;

/// Highest score a user may record for a day.
pub const MAX_SCORE: i64 = 10;

/// Abbreviate an opaque credential to its first 8 characters for logs and traces.
/// Example: "Zm9vYmFyYmF6cXV4..." -> "Zm9vYmFy"
pub fn abbrev_secret(secret: &str) -> String {
    secret.chars().take(8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abbrev_secret() {
        assert_eq!(abbrev_secret("abcdefghijklmnop"), "abcdefgh");
        assert_eq!(abbrev_secret("abc"), "abc");
        assert_eq!(abbrev_secret(""), "");
    }
}
