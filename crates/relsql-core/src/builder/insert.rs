//! INSERT façade.

use tracing::debug;

use crate::ast::{Assignment, ConflictAction, InsertStatement, Node, OnConflict, StatementKind};
use crate::error::Result;
use crate::render::QueryRenderer;
use crate::transform::{Pipeline, Transformer};

use super::{Rendered, nodes, render_root};

/// Builds an INSERT.
///
/// ```rust
/// use relsql_core::{InsertManager, SqliteRenderer, table};
///
/// let users = table("users");
/// let (sql, params) = InsertManager::new(&users)
///     .columns([users.attr("name"), users.attr("email")])
///     .values(["Ann", "ann@example.com"])
///     .to_sql(&mut SqliteRenderer::new())
///     .unwrap();
/// assert_eq!(sql, "INSERT INTO \"users\" (\"name\", \"email\") VALUES (?, ?)");
/// assert_eq!(params.map(|p| p.len()), Some(2));
/// ```
#[derive(Debug, Clone)]
pub struct InsertManager {
    stmt: InsertStatement,
    pipeline: Pipeline,
}

impl InsertManager {
    /// Creates an INSERT into `into`.
    #[must_use]
    pub fn new(into: impl Into<Node>) -> Self {
        Self {
            stmt: InsertStatement::new(into),
            pipeline: Pipeline::new(),
        }
    }

    /// Returns the statement root.
    #[must_use]
    pub const fn statement(&self) -> &InsertStatement {
        &self.stmt
    }

    /// Appends target columns. Columns render unqualified.
    #[must_use]
    pub fn columns<I, T>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Node>,
    {
        self.stmt.columns.extend(nodes(columns));
        self
    }

    /// Appends a row of values.
    #[must_use]
    pub fn values<I, T>(mut self, row: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Node>,
    {
        self.stmt.values.push(nodes(row).collect());
        self
    }

    /// Inserts the rows of a query instead of literal rows.
    #[must_use]
    pub fn select(mut self, query: impl Into<Node>) -> Self {
        self.stmt.select = Some(query.into());
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

    /// Starts an `ON CONFLICT` clause on the given target columns.
    /// An empty target renders a bare `ON CONFLICT`.
    #[must_use]
    pub fn on_conflict<I, T>(self, columns: I) -> OnConflictBuilder
    where
        I: IntoIterator<Item = T>,
        T: Into<Node>,
    {
        OnConflictBuilder {
            manager: self,
            columns: nodes(columns).collect(),
        }
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
            kind = "INSERT",
            transformers = self.pipeline.len(),
            "rendering statement"
        );
        let insert = self.pipeline.apply_insert(&self.stmt)?;
        Ok(render_root(StatementKind::Insert, &insert.into_node(), renderer))
    }
}

/// Picks the conflict action.
#[derive(Debug, Clone)]
#[must_use = "the conflict clause is only added once an action is chosen"]
pub struct OnConflictBuilder {
    manager: InsertManager,
    columns: Vec<Node>,
}

impl OnConflictBuilder {
    /// `ON CONFLICT (...) DO NOTHING`.
    pub fn do_nothing(self) -> InsertManager {
        self.finish(ConflictAction::DoNothing)
    }

    /// Starts `ON CONFLICT (...) DO UPDATE SET ...`.
    pub fn do_update(self) -> DoUpdateBuilder {
        DoUpdateBuilder {
            conflict: self,
            assignments: Vec::new(),
            wheres: Vec::new(),
        }
    }

    fn finish(mut self, action: ConflictAction) -> InsertManager {
        self.manager.stmt.on_conflict = Some(OnConflict {
            columns: self.columns,
            action,
        });
        self.manager
    }
}

/// Collects the `DO UPDATE` assignments.
#[derive(Debug, Clone)]
#[must_use = "call `finish` to add the conflict clause"]
pub struct DoUpdateBuilder {
    conflict: OnConflictBuilder,
    assignments: Vec<Assignment>,
    wheres: Vec<Node>,
}

impl DoUpdateBuilder {
    /// Adds `column = value`.
    pub fn set(mut self, column: impl Into<Node>, value: impl Into<Node>) -> Self {
        self.assignments.push(Assignment::new(column, value));
        self
    }

    /// Adds a predicate to the `DO UPDATE ... WHERE` clause.
    pub fn where_clause(mut self, predicate: impl Into<Node>) -> Self {
        self.wheres.push(predicate.into());
        self
    }

    /// Adds the clause to the INSERT. Without any assignment the action
    /// falls back to `DO NOTHING`.
    pub fn finish(self) -> InsertManager {
        if self.assignments.is_empty() {
            return self.conflict.finish(ConflictAction::DoNothing);
        }
        self.conflict.finish(ConflictAction::DoUpdate {
            assignments: self.assignments,
            wheres: self.wheres,
        })
    }
}
