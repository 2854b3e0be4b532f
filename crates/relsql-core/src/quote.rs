//! Identifier and string-literal quoting.
//!
//! These are the only places where user-supplied text is made safe for
//! inclusion in SQL. Every function is pure and total: empty input,
//! embedded quote characters, NUL bytes and multi-byte sequences are all
//! passed through unchanged apart from the documented escapes.

/// Quotes an identifier with double quotes, doubling embedded `"`.
///
/// Used by the PostgreSQL and SQLite renderers.
///
/// ```rust
/// use relsql_core::quote::quote_double;
///
/// assert_eq!(quote_double("users"), "\"users\"");
/// assert_eq!(quote_double("we\"ird"), "\"we\"\"ird\"");
/// ```
#[must_use]
pub fn quote_double(s: &str) -> String {
    quote_with(s, '"')
}

/// Quotes an identifier with backticks, doubling embedded `` ` ``.
///
/// Used by the MySQL renderer.
#[must_use]
pub fn quote_backtick(s: &str) -> String {
    quote_with(s, '`')
}

fn quote_with(s: &str, quote: char) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        if c == quote {
            out.push(quote);
        }
        out.push(c);
    }
    out.push(quote);
    out
}

/// Escapes a string for use inside a single-quoted SQL literal.
///
/// Backslashes are doubled first, then single quotes are doubled. The
/// surrounding quotes are not added.
///
/// ```rust
/// use relsql_core::quote::escape_string;
///
/// assert_eq!(escape_string("O'Brien"), "O''Brien");
/// assert_eq!(escape_string(r"a\b"), r"a\\b");
/// ```
#[must_use]
pub fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "''")
}

/// Escapes `LIKE` wildcards so the pattern matches literally.
///
/// `\` becomes `\\`, then `%` becomes `\%`, then `_` becomes `\_`.
#[must_use]
pub fn escape_like_pattern(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
