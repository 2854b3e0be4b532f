//! UPDATE façade.

use tracing::debug;

use crate::ast::{Assignment, Node, StatementKind, UpdateStatement};
use crate::error::{Result, TransformError};
use crate::render::QueryRenderer;
use crate::transform::{Pipeline, Transformer};

use super::{Rendered, nodes, render_root};

/// Builds an UPDATE.
///
/// The left side of each assignment renders qualified, as
/// `"users"."name" = $1`.
#[derive(Debug, Clone)]
pub struct UpdateManager {
    stmt: UpdateStatement,
    pipeline: Pipeline,
}

impl UpdateManager {
    /// Creates an UPDATE of `table`.
    #[must_use]
    pub fn new(table: impl Into<Node>) -> Self {
        Self {
            stmt: UpdateStatement::new(table),
            pipeline: Pipeline::new(),
        }
    }

    /// Returns the statement root.
    #[must_use]
    pub const fn statement(&self) -> &UpdateStatement {
        &self.stmt
    }

    /// Adds `column = value`.
    #[must_use]
    pub fn set(mut self, column: impl Into<Node>, value: impl Into<Node>) -> Self {
        self.stmt.assignments.push(Assignment::new(column, value));
        self
    }

    /// Appends a WHERE predicate.
    #[must_use]
    pub fn where_clause(mut self, predicate: impl Into<Node>) -> Self {
        self.stmt.wheres.push(predicate.into());
        self
    }

    /// Appends several WHERE predicates, skipping `None`s.
    #[must_use]
    pub fn wheres<I, T>(mut self, predicates: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Option<Node>>,
    {
        self.stmt
            .wheres
            .extend(predicates.into_iter().filter_map(Into::into));
        self
    }

    /// Appends RETURNING expressions.
    #[must_use]
    pub fn returning<I, T>(mut self, exprs: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Node>,
    {
        self.stmt.returning.extend(nodes(exprs));
        self
    }

    /// Registers a transformer.
    #[must_use]
    pub fn use_transformer(mut self, transformer: impl Transformer + 'static) -> Self {
        self.pipeline.push(transformer);
        self
    }

    /// Renders the statement after running the transformers on a copy.
    ///
    /// # Errors
    ///
    /// Returns the first transformer error, or
    /// [`TransformError::MissingConfiguration`] if no assignment is left
    /// once the transformers have run.
    pub fn to_sql(&self, renderer: &mut dyn QueryRenderer) -> Result<Rendered> {
        debug!(
            kind = "UPDATE",
            transformers = self.pipeline.len(),
            "rendering statement"
        );
        let update = self.pipeline.apply_update(&self.stmt)?;
        if update.assignments.is_empty() {
            return Err(TransformError::MissingConfiguration(String::from(
                "UPDATE without SET assignments",
            )));
        }
        Ok(render_root(StatementKind::Update, &update.into_node(), renderer))
    }
}
