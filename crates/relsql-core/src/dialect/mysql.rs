//! MySQL dialect.

use crate::ast::ComparisonOp;
use crate::quote::quote_backtick;
use crate::render::{RenderOptions, RenderState, Renderer, common_comparison};

/// Renders MySQL: `` `ident` ``, `?` placeholders, `REGEXP`, and
/// `BINARY` for case-sensitive equality.
#[derive(Debug, Clone, Default)]
pub struct MysqlRenderer {
    state: RenderState,
}

impl MysqlRenderer {
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

impl Renderer for MysqlRenderer {
    fn dialect_name(&self) -> &'static str {
        "mysql"
    }

    fn quote_identifier(&self, name: &str) -> String {
        quote_backtick(name)
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
            ComparisonOp::CaseSensitiveEq => format!("{left} = BINARY {right}"),
            // Comparisons are case-insensitive under MySQL's default collations.
            ComparisonOp::CaseInsensitiveEq => format!("{left} = {right}"),
            _ => common_comparison(op, left, right),
        }
    }
}
