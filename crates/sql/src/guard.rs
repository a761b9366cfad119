//! Read-only safety gate applied before any query reaches the store.

/// Returned instead of running a rejected query.
pub const BLOCKED_MESSAGE: &str = "Query blocked: only SELECT statements are permitted.";

/// Substrings that disqualify a query outright.
pub const BLOCKED_KEYWORDS: [&str; 7] = [
    "insert", "update", "delete", "drop", "alter", "create", "replace",
];

/// A query is safe when it starts with `select` and mentions no mutating keyword.
///
/// Matching is on raw substrings, so a column named `last_update` is rejected
/// too. Only internally authored templates are expected here.
pub fn is_safe(sql: &str) -> bool {
    let normalized = sql.trim().to_lowercase();

    normalized.starts_with("select")
        && !BLOCKED_KEYWORDS
            .iter()
            .any(|keyword| normalized.contains(keyword))
}
