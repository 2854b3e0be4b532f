//! SQLite dialect.

use crate::ast::ComparisonOp;
use crate::quote::quote_double;
use crate::render::{RenderOptions, RenderState, Renderer, common_comparison};

/// Renders SQLite: `"ident"`, `?` placeholders, `REGEXP`, and
/// `COLLATE` for the case-sensitivity operators.
#[derive(Debug, Clone, Default)]
pub struct SqliteRenderer {
    state: RenderState,
}

impl SqliteRenderer {
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

impl Renderer for SqliteRenderer {
    fn dialect_name(&self) -> &'static str {
        "sqlite"
    }

    fn quote_identifier(&self, name: &str) -> String {
        quote_double(name)
    }

    fn placeholder(&self, _index: usize) -> String {
        String::from("?")
    }

    fn state(&self) -> &RenderState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut RenderState {
        &mut self.state
    }

    fn render_comparison(&mut self, op: ComparisonOp, left: &str, right: &str) -> String {
        match op {
            ComparisonOp::RegexMatch => format!("{left} REGEXP {right}"),
            ComparisonOp::RegexNotMatch => format!("{left} NOT REGEXP {right}"),
            ComparisonOp::CaseSensitiveEq => format!("{left} = {right} COLLATE BINARY"),
            ComparisonOp::CaseInsensitiveEq => format!("{left} = {right} COLLATE NOCASE"),
            _ => common_comparison(op, left, right),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Node;

    #[test]
    fn test_case_insensitive_eq() {
        let t = Node::table("t");
        let mut r = SqliteRenderer::with_options(RenderOptions::inline());
        assert_eq!(
            r.render(&t.attr("name").case_insensitive_eq("alice")),
            "\"t\".\"name\" = 'alice' COLLATE NOCASE"
        );
        assert_eq!(
            r.render(&t.attr("name").case_sensitive_eq("alice")),
            "\"t\".\"name\" = 'alice' COLLATE BINARY"
        );
    }

    #[test]
    fn test_regexp() {
        let t = Node::table("t");
        let mut r = SqliteRenderer::new();
        assert_eq!(r.render(&t.attr("n").matches_regexp("x")), "\"t\".\"n\" REGEXP ?");
        assert_eq!(
            r.render(&t.attr("n").does_not_match_regexp("x")),
            "\"t\".\"n\" NOT REGEXP ?"
        );
    }
}
