//! # Identifier Sanitizer
//!
//! Table and column names originate from caller input (path segments and
//! query-string keys) and cannot be bound as statement parameters, so every
//! identifier is reduced to `[A-Za-z0-9_]` before it reaches statement text.
//! Values never pass through this module.

/// Reserved SQL keywords that must be quoted when used as a table name.
const RESERVED_KEYWORDS: &[&str] = &[
    "all", "alter", "and", "as", "between", "by", "case", "check", "column",
    "constraint", "create", "default", "delete", "distinct", "drop", "else",
    "end", "exists", "foreign", "from", "group", "having", "in", "index",
    "insert", "into", "is", "join", "key", "like", "limit", "not", "null",
    "offset", "on", "or", "order", "primary", "references", "select", "set",
    "table", "then", "transaction", "union", "unique", "update", "values",
    "when", "where",
];

/// Removes every character outside `[A-Za-z0-9_]`.
///
/// Pure and total; an empty result is valid (if useless) output.
pub fn sanitize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

/// Sanitizes a table name and quotes it with the ANSI identifier delimiter
/// when it collides with a reserved SQL keyword.
pub fn table_ident(name: &str) -> String {
    let safe = sanitize(name);
    if is_reserved(&safe) {
        format!("\"{}\"", safe)
    } else {
        safe
    }
}

fn is_reserved(name: &str) -> bool {
    RESERVED_KEYWORDS
        .iter()
        .any(|kw| kw.eq_ignore_ascii_case(name))
}
