//! Free constructors for AST nodes.
//!
//! ```rust
//! use relsql_core::{PostgresRenderer, Renderer, count_star, func, table};
//!
//! let users = table("users");
//! let mut r = PostgresRenderer::new();
//! assert_eq!(r.render(&count_star()), "COUNT(*)");
//! assert_eq!(
//!     r.render(&func("COALESCE", [users.attr("nick"), users.attr("name")])),
//!     "COALESCE(\"users\".\"nick\", \"users\".\"name\")"
//! );
//! ```

use crate::ast::{
    AggregateFunc, Case, ExtractField, GroupingSetKind, Node, SqlValue, WindowDefinition,
};

use super::nodes;

/// Creates a table reference.
#[must_use]
pub fn table(name: impl Into<String>) -> Node {
    Node::table(name)
}

/// Creates a raw SQL fragment.
///
/// **Warning**: the text is emitted verbatim. Only use this for SQL
/// fragments that don't contain user input.
#[must_use]
pub fn sql(text: impl Into<String>) -> Node {
    Node::raw(text)
}

/// Creates a raw SQL fragment that carries bind values.
///
/// The values are appended to the parameter list in order; the text
/// itself is responsible for containing matching placeholders.
#[must_use]
pub fn sql_with_binds<I, T>(text: impl Into<String>, binds: I) -> Node
where
    I: IntoIterator<Item = T>,
    T: Into<SqlValue>,
{
    Node::raw_with_binds(text, binds.into_iter().map(Into::into).collect())
}

/// Creates a bind parameter.
#[must_use]
pub fn bind(value: impl Into<SqlValue>) -> Node {
    Node::bind(value)
}

/// Creates a literal.
#[must_use]
pub fn literal(value: impl Into<SqlValue>) -> Node {
    Node::literal(value)
}

/// Creates a NULL literal.
#[must_use]
pub fn null() -> Node {
    Node::null()
}

/// Creates `CAST(value AS type_name)`.
///
/// # Panics
///
/// If `type_name` fails the type-name whitelist.
#[must_use]
pub fn casted(value: impl Into<SqlValue>, type_name: impl Into<String>) -> Node {
    Node::casted(value, type_name)
}

/// Creates an unqualified `*`.
#[must_use]
pub fn star() -> Node {
    Node::star()
}

/// Creates a call to a named function.
///
/// # Panics
///
/// If `name` contains anything other than letters, digits and `_`.
#[must_use]
pub fn func<I, T>(name: impl Into<String>, args: I) -> Node
where
    I: IntoIterator<Item = T>,
    T: Into<Node>,
{
    Node::function(name, args)
}

/// `COUNT(*)`.
#[must_use]
pub fn count_star() -> Node {
    Node::aggregate(AggregateFunc::Count, None, false)
}

/// `COUNT(expr)`.
#[must_use]
pub fn count(expr: impl Into<Node>) -> Node {
    Node::aggregate(AggregateFunc::Count, Some(expr.into()), false)
}

/// `SUM(expr)`.
#[must_use]
pub fn sum(expr: impl Into<Node>) -> Node {
    Node::aggregate(AggregateFunc::Sum, Some(expr.into()), false)
}

/// `AVG(expr)`.
#[must_use]
pub fn avg(expr: impl Into<Node>) -> Node {
    Node::aggregate(AggregateFunc::Avg, Some(expr.into()), false)
}

/// `MIN(expr)`.
#[must_use]
pub fn min(expr: impl Into<Node>) -> Node {
    Node::aggregate(AggregateFunc::Min, Some(expr.into()), false)
}

/// `MAX(expr)`.
#[must_use]
pub fn max(expr: impl Into<Node>) -> Node {
    Node::aggregate(AggregateFunc::Max, Some(expr.into()), false)
}

/// `EXTRACT(field FROM expr)`.
#[must_use]
pub fn extract(field: ExtractField, expr: impl Into<Node>) -> Node {
    Node::extract(field, expr)
}

/// Starts a searched `CASE WHEN cond THEN ... END`.
#[must_use]
pub const fn searched_case() -> Case {
    Case::new(None)
}

/// Starts a simple `CASE operand WHEN value THEN ... END`.
#[must_use]
pub fn simple_case(operand: impl Into<Node>) -> Case {
    Case::new(Some(operand.into()))
}

/// `CUBE(columns)`.
#[must_use]
pub fn cube<I, T>(columns: I) -> Node
where
    I: IntoIterator<Item = T>,
    T: Into<Node>,
{
    Node::grouping_columns(GroupingSetKind::Cube, nodes(columns).collect())
}

/// `ROLLUP(columns)`.
#[must_use]
pub fn rollup<I, T>(columns: I) -> Node
where
    I: IntoIterator<Item = T>,
    T: Into<Node>,
{
    Node::grouping_columns(GroupingSetKind::Rollup, nodes(columns).collect())
}

/// `GROUPING SETS((a, b), (c), ())`.
#[must_use]
pub fn grouping_sets<S, I, T>(sets: S) -> Node
where
    S: IntoIterator<Item = I>,
    I: IntoIterator<Item = T>,
    T: Into<Node>,
{
    Node::grouping_sets(sets.into_iter().map(|set| nodes(set).collect()).collect())
}

/// Starts an anonymous window for `OVER (...)`.
#[must_use]
pub fn window() -> WindowDefinition {
    WindowDefinition::new()
}

/// Starts a named window for the `WINDOW` clause.
#[must_use]
pub fn named_window(name: impl Into<String>) -> WindowDefinition {
    WindowDefinition::named(name)
}

/// `EXISTS (query)`.
#[must_use]
pub fn exists(query: impl Into<Node>) -> Node {
    Node::exists(query, false)
}

/// `NOT EXISTS (query)`.
#[must_use]
pub fn not_exists(query: impl Into<Node>) -> Node {
    Node::exists(query, true)
}
