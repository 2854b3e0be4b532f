//! PostgreSQL dialect.

use crate::quote::quote_double;
use crate::render::{RenderOptions, RenderState, Renderer};

/// Renders PostgreSQL: `"ident"`, `$1` placeholders, `~` for regex
/// matching and `LOWER(l) = LOWER(r)` for case-insensitive equality.
#[derive(Debug, Clone, Default)]
pub struct PostgresRenderer {
    state: RenderState,
}

impl PostgresRenderer {
    /// Creates a parameterising renderer.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(RenderOptions::default())
    }

    /// Creates a renderer with the given options.
    #[must_use]
    pub const fn with_options(options: RenderOptions) -> Self {
        Self {
            state: RenderState::new(options),
        }
    }
}

impl Renderer for PostgresRenderer {
    fn dialect_name(&self) -> &'static str {
        "postgres"
    }

    fn quote_identifier(&self, name: &str) -> String {
        quote_double(name)
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${index}")
    }

    fn state(&self) -> &RenderState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut RenderState {
        &mut self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Node, SqlValue};

    #[test]
    fn test_placeholders_are_numbered() {
        let t = Node::table("t");
        let pred = t.attr("a").eq(1).and(t.attr("b").eq(2)).and(t.attr("c").eq(3));
        let mut r = PostgresRenderer::new();
        assert_eq!(
            r.render(&pred),
            "\"t\".\"a\" = $1 AND \"t\".\"b\" = $2 AND \"t\".\"c\" = $3"
        );
        r.reset();
        assert_eq!(r.render(&t.attr("a").eq(9)), "\"t\".\"a\" = $1");
        assert_eq!(r.state().params(), &[SqlValue::Int(9)]);
    }

    #[test]
    fn test_regex_and_case_operators() {
        let t = Node::table("t");
        let mut r = PostgresRenderer::with_options(RenderOptions::inline());
        assert_eq!(r.render(&t.attr("n").matches_regexp("^a")), "\"t\".\"n\" ~ '^a'");
        assert_eq!(
            r.render(&t.attr("n").does_not_match_regexp("^a")),
            "\"t\".\"n\" !~ '^a'"
        );
        assert_eq!(r.render(&t.attr("n").case_sensitive_eq("A")), "\"t\".\"n\" = 'A'");
        assert_eq!(
            r.render(&t.attr("n").case_insensitive_eq("A")),
            "LOWER(\"t\".\"n\") = LOWER('A')"
        );
    }

    #[test]
    fn test_default_renderer_binds_values() {
        let users = Node::table("users");
        let mut r = PostgresRenderer::default();
        assert_eq!(
            r.render(&users.attr("name").eq("x' OR 1=1 --")),
            "\"users\".\"name\" = $1"
        );
        assert_eq!(r.state().params(), &[SqlValue::from("x' OR 1=1 --")]);
    }

    #[test]
    fn test_quoting_doubles_quotes() {
        let mut r = PostgresRenderer::new();
        assert_eq!(r.render(&Node::table("we\"ird")), "\"we\"\"ird\"");
    }
}
