//! DELETE façade.

use tracing::debug;

use crate::ast::{DeleteStatement, Node, StatementKind};
use crate::error::Result;
use crate::render::QueryRenderer;
use crate::transform::{Pipeline, Transformer};

use super::{Rendered, nodes, render_root};

/// Builds a DELETE.
#[derive(Debug, Clone)]
pub struct DeleteManager {
    stmt: DeleteStatement,
    pipeline: Pipeline,
}

impl DeleteManager {
    /// Creates a DELETE from `from`.
    #[must_use]
    pub fn new(from: impl Into<Node>) -> Self {
        Self {
            stmt: DeleteStatement::new(from),
            pipeline: Pipeline::new(),
        }
    }

    /// Returns the statement root.
    #[must_use]
    pub const fn statement(&self) -> &DeleteStatement {
        &self.stmt
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
    /// Returns the first transformer error.
    pub fn to_sql(&self, renderer: &mut dyn QueryRenderer) -> Result<Rendered> {
        debug!(
            kind = "DELETE",
            transformers = self.pipeline.len(),
            "rendering statement"
        );
        let delete = self.pipeline.apply_delete(&self.stmt)?;
        Ok(render_root(StatementKind::Delete, &delete.into_node(), renderer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::SqlValue;
    use crate::builder::{SelectManager, table};
    use crate::dialect::{PostgresRenderer, SqliteRenderer};

    #[test]
    fn test_delete_without_where() {
        let (sql, params) = DeleteManager::new(table("sessions"))
            .to_sql(&mut SqliteRenderer::new())
            .unwrap();
        assert_eq!(sql, "DELETE FROM \"sessions\"");
        assert_eq!(params, Some(vec![]));
    }

    #[test]
    fn test_delete_with_subquery() {
        let sessions = table("sessions");
        let users = table("users");
        let banned = SelectManager::new(&users)
            .project([users.attr("id")])
            .where_clause(users.attr("banned").eq(true));
        let (sql, params) = DeleteManager::new(&sessions)
            .where_clause(sessions.attr("user_id").in_query(&banned))
            .returning([sessions.attr("id")])
            .to_sql(&mut PostgresRenderer::new())
            .unwrap();
        assert_eq!(
            sql,
            "DELETE FROM \"sessions\" WHERE \"sessions\".\"user_id\" IN (SELECT \"users\".\"id\" \
             FROM \"users\" WHERE \"users\".\"banned\" = $1) RETURNING \"sessions\".\"id\""
        );
        assert_eq!(params, Some(vec![SqlValue::Bool(true)]));
    }

    #[test]
    fn test_rendering_twice_is_identical() {
        let sessions = table("sessions");
        let manager = DeleteManager::new(&sessions).where_clause(sessions.attr("id").lt(100));
        let mut r = PostgresRenderer::new();
        let first = manager.to_sql(&mut r).unwrap();
        let second = manager.to_sql(&mut r).unwrap();
        assert_eq!(first, second);
    }
}
