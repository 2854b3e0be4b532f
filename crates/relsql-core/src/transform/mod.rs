//! Statement rewriting before rendering.
//!
//! A [`Transformer`] receives a copy of a statement root and returns the
//! rewritten root or an error. A [`Pipeline`] runs transformers in
//! registration order on a fresh shallow copy, so the caller's statement
//! is never touched.
//!
//! ```rust
//! use relsql_core::transform::{Transformer, collect_tables};
//! use relsql_core::{SelectCore, error::Result};
//!
//! struct OnlyPublished;
//!
//! impl Transformer for OnlyPublished {
//!     fn name(&self) -> &str {
//!         "only_published"
//!     }
//!
//!     fn transform_select(&self, mut select: SelectCore) -> Result<SelectCore> {
//!         for (relation, _) in collect_tables(&select) {
//!             select.wheres.push(relation.attr("published").eq(true));
//!         }
//!         Ok(select)
//!     }
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::ast::{
    DeleteStatement, InsertStatement, Node, NodeKind, SelectCore, StatementKind, UpdateStatement,
};
use crate::error::Result;
use crate::render::Attribution;

/// A statement rewriter.
///
/// Every method defaults to returning its input unchanged, so
/// implementors override only the statement kinds they care about.
pub trait Transformer: Send + Sync {
    /// Returns the name used in logs and graph clusters.
    fn name(&self) -> &str {
        "transformer"
    }

    /// Rewrites a SELECT.
    fn transform_select(&self, select: SelectCore) -> Result<SelectCore> {
        Ok(select)
    }

    /// Rewrites an INSERT.
    fn transform_insert(&self, insert: InsertStatement) -> Result<InsertStatement> {
        Ok(insert)
    }

    /// Rewrites an UPDATE.
    fn transform_update(&self, update: UpdateStatement) -> Result<UpdateStatement> {
        Ok(update)
    }

    /// Rewrites a DELETE.
    fn transform_delete(&self, delete: DeleteStatement) -> Result<DeleteStatement> {
        Ok(delete)
    }
}

impl<T: Transformer + ?Sized> Transformer for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn transform_select(&self, select: SelectCore) -> Result<SelectCore> {
        (**self).transform_select(select)
    }

    fn transform_insert(&self, insert: InsertStatement) -> Result<InsertStatement> {
        (**self).transform_insert(insert)
    }

    fn transform_update(&self, update: UpdateStatement) -> Result<UpdateStatement> {
        (**self).transform_update(update)
    }

    fn transform_delete(&self, delete: DeleteStatement) -> Result<DeleteStatement> {
        (**self).transform_delete(delete)
    }
}

/// An ordered list of transformers.
#[derive(Clone, Default)]
pub struct Pipeline {
    transformers: Vec<Arc<dyn Transformer>>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.transformers.iter().map(|t| t.name()))
            .finish()
    }
}

impl Pipeline {
    /// Creates an empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a transformer.
    pub fn push(&mut self, transformer: impl Transformer + 'static) {
        self.transformers.push(Arc::new(transformer));
    }

    /// Appends a shared transformer.
    pub fn push_shared(&mut self, transformer: Arc<dyn Transformer>) {
        self.transformers.push(transformer);
    }

    /// Returns the number of transformers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.transformers.len()
    }

    /// Returns true if no transformer is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transformers.is_empty()
    }

    /// Returns the transformer names in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.transformers.iter().map(|t| t.name()).collect()
    }

    fn run<S>(
        &self,
        kind: StatementKind,
        root: &S,
        apply: impl Fn(&dyn Transformer, S) -> Result<S>,
    ) -> Result<S>
    where
        S: Clone,
    {
        let mut current = root.clone();
        for t in &self.transformers {
            debug!(transformer = t.name(), kind = kind.as_str(), "applying transformer");
            current = apply(t.as_ref(), current).inspect_err(|err| {
                warn!(transformer = t.name(), kind = kind.as_str(), error = %err, "transformer aborted rendering");
            })?;
        }
        Ok(current)
    }

    /// Runs every transformer on a copy of `select`.
    ///
    /// # Errors
    ///
    /// Returns the first transformer error; later transformers are not run.
    pub fn apply_select(&self, select: &SelectCore) -> Result<SelectCore> {
        self.run(StatementKind::Select, select, |t, s| t.transform_select(s))
    }

    /// Runs every transformer on a copy of `insert`.
    ///
    /// # Errors
    ///
    /// Returns the first transformer error.
    pub fn apply_insert(&self, insert: &InsertStatement) -> Result<InsertStatement> {
        self.run(StatementKind::Insert, insert, |t, s| t.transform_insert(s))
    }

    /// Runs every transformer on a copy of `update`.
    ///
    /// # Errors
    ///
    /// Returns the first transformer error.
    pub fn apply_update(&self, update: &UpdateStatement) -> Result<UpdateStatement> {
        self.run(StatementKind::Update, update, |t, s| t.transform_update(s))
    }

    /// Runs every transformer on a copy of `delete`.
    ///
    /// # Errors
    ///
    /// Returns the first transformer error.
    pub fn apply_delete(&self, delete: &DeleteStatement) -> Result<DeleteStatement> {
        self.run(StatementKind::Delete, delete, |t, s| t.transform_delete(s))
    }

    /// Like [`Pipeline::apply_select`], also recording which WHERE and
    /// JOIN items each transformer appended.
    ///
    /// # Errors
    ///
    /// Returns the first transformer error.
    pub fn apply_select_attributed(
        &self,
        select: &SelectCore,
    ) -> Result<(SelectCore, Vec<Attribution>)> {
        let mut current = select.clone();
        let mut attributions = Vec::with_capacity(self.transformers.len());
        for t in &self.transformers {
            let (wheres_before, joins_before) = (current.wheres.len(), current.joins.len());
            debug!(transformer = t.name(), kind = "SELECT", "applying transformer");
            current = t.transform_select(current).inspect_err(|err| {
                warn!(transformer = t.name(), kind = "SELECT", error = %err, "transformer aborted rendering");
            })?;
            attributions.push(Attribution {
                name: t.name().to_string(),
                wheres: wheres_before..current.wheres.len().max(wheres_before),
                joins: joins_before..current.joins.len().max(joins_before),
            });
        }
        Ok((current, attributions))
    }
}

/// Returns every FROM and JOIN source of `select` as
/// `(relation, underlying table name)`.
///
/// The relation keeps any alias, so predicates built from it qualify
/// columns the way the query does; the name looks through the alias.
/// Subqueries and raw joins are skipped.
#[must_use]
pub fn collect_tables(select: &SelectCore) -> Vec<(Node, String)> {
    let sources = select
        .from
        .iter()
        .chain(select.joins.iter().map(|j| &j.right));
    let mut tables = Vec::new();
    for source in sources {
        if !matches!(source.kind(), NodeKind::Table(_) | NodeKind::TableAlias(_)) {
            continue;
        }
        if let Some(name) = source.underlying_table_name() {
            tables.push((source.clone(), name.to_string()));
        }
    }
    tables
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Join, JoinType};
    use crate::error::TransformError;

    struct AppendWhere(&'static str);

    impl Transformer for AppendWhere {
        fn name(&self) -> &str {
            self.0
        }

        fn transform_select(&self, mut select: SelectCore) -> Result<SelectCore> {
            for (relation, _) in collect_tables(&select) {
                select.wheres.push(relation.attr(self.0).is_null());
            }
            Ok(select)
        }
    }

    struct Deny;

    impl Transformer for Deny {
        fn transform_select(&self, _select: SelectCore) -> Result<SelectCore> {
            Err(TransformError::access_denied("users", "nope"))
        }
    }

    fn users_posts() -> SelectCore {
        let users = Node::table("users");
        let posts = Node::table("posts").aliased("p");
        let mut select = SelectCore::from_relation(&users);
        select.joins.push(
            Join::new(JoinType::Inner, &posts).on(users.attr("id").eq(posts.attr("author_id"))),
        );
        select
    }

    #[test]
    fn test_collect_tables_sees_aliases() {
        let select = users_posts();
        let tables = collect_tables(&select);
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].1, "users");
        assert_eq!(tables[1].1, "posts");
        assert_eq!(tables[1].0.relation_name(), Some("p"));
    }

    #[test]
    fn test_collect_tables_skips_subqueries() {
        let mut select = SelectCore::from_relation(SelectCore::new());
        select.joins.push(Join::string("NATURAL JOIN x"));
        assert!(collect_tables(&select).is_empty());

        let aliased_subquery = SelectCore::new().into_node().aliased("s");
        let select = SelectCore::from_relation(aliased_subquery);
        assert!(collect_tables(&select).is_empty());
    }

    #[test]
    fn test_pipeline_order_and_isolation() {
        let original = users_posts();
        let mut pipeline = Pipeline::new();
        pipeline.push(AppendWhere("deleted_at"));
        pipeline.push(AppendWhere("archived_at"));
        assert_eq!(pipeline.names(), vec!["deleted_at", "archived_at"]);

        let out = pipeline.apply_select(&original).expect("no errors");
        assert_eq!(out.wheres.len(), 4);
        assert!(original.wheres.is_empty());
    }

    #[test]
    fn test_pipeline_short_circuits() {
        let mut pipeline = Pipeline::new();
        pipeline.push(Deny);
        pipeline.push(AppendWhere("deleted_at"));
        let err = pipeline.apply_select(&users_posts()).unwrap_err();
        assert!(matches!(err, TransformError::AccessDenied { .. }));
    }

    #[test]
    fn test_attributed_ranges() {
        let mut pipeline = Pipeline::new();
        pipeline.push(AppendWhere("deleted_at"));
        pipeline.push(AppendWhere("archived_at"));
        let (out, attributions) = pipeline.apply_select_attributed(&users_posts()).expect("ok");
        assert_eq!(out.wheres.len(), 4);
        assert_eq!(attributions[0].wheres, 0..2);
        assert_eq!(attributions[1].wheres, 2..4);
        assert_eq!(attributions[1].name, "archived_at");
    }

    #[test]
    fn test_default_methods_are_identity() {
        struct Noop;
        impl Transformer for Noop {}
        let delete = DeleteStatement::new(Node::table("t"));
        assert_eq!(Noop.transform_delete(delete.clone()).expect("ok"), delete);
        assert_eq!(Noop.name(), "transformer");
    }
}
