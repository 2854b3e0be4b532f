//! SELECT façade.

use tracing::debug;

use crate::ast::{
    Cte, Join, JoinType, LockMode, Node, SelectCore, SetOpType, SetOperation, StatementKind,
    WindowDefinition,
};
use crate::error::Result;
use crate::render::{GraphRenderer, QueryRenderer};
use crate::transform::{Pipeline, Transformer};

use super::{Rendered, nodes, render_root};

/// Builds a SELECT and renders it through the transformer pipeline.
///
/// ```rust
/// use relsql_core::{PostgresRenderer, SelectManager, SqlValue, table};
///
/// let users = table("users");
/// let (sql, params) = SelectManager::new(&users)
///     .limit(10)
///     .offset(20)
///     .to_sql(&mut PostgresRenderer::new())
///     .unwrap();
/// assert_eq!(sql, "SELECT * FROM \"users\" LIMIT $1 OFFSET $2");
/// assert_eq!(params, Some(vec![SqlValue::UInt(10), SqlValue::UInt(20)]));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SelectManager {
    core: SelectCore,
    pipeline: Pipeline,
}

impl SelectManager {
    /// Creates a SELECT reading from `from`.
    #[must_use]
    pub fn new(from: impl Into<Node>) -> Self {
        Self {
            core: SelectCore::from_relation(from),
            pipeline: Pipeline::new(),
        }
    }

    /// Wraps an existing root.
    #[must_use]
    pub fn from_core(core: SelectCore) -> Self {
        Self {
            core,
            pipeline: Pipeline::new(),
        }
    }

    /// Returns the statement root.
    #[must_use]
    pub const fn core(&self) -> &SelectCore {
        &self.core
    }

    /// Returns the statement root, dropping the pipeline.
    #[must_use]
    pub fn into_core(self) -> SelectCore {
        self.core
    }

    /// Returns the registered transformers.
    #[must_use]
    pub const fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Replaces the FROM source.
    #[must_use]
    pub fn from(mut self, relation: impl Into<Node>) -> Self {
        self.core.from = Some(relation.into());
        self
    }

    /// Appends projections.
    #[must_use]
    pub fn project<I, T>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Node>,
    {
        self.core.projections.extend(nodes(columns));
        self
    }

    /// Appends a WHERE predicate. Predicates are AND-ed.
    #[must_use]
    pub fn where_clause(mut self, predicate: impl Into<Node>) -> Self {
        self.core.wheres.push(predicate.into());
        self
    }

    /// Appends several WHERE predicates, skipping `None`s so the result
    /// of an empty composite predication is a no-op.
    #[must_use]
    pub fn wheres<I, T>(mut self, predicates: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Option<Node>>,
    {
        self.core
            .wheres
            .extend(predicates.into_iter().filter_map(Into::into));
        self
    }

    /// Starts an INNER JOIN. The join is added once `on` is called.
    #[must_use]
    pub fn join(self, right: impl Into<Node>) -> JoinContext {
        self.join_with(right, JoinType::Inner)
    }

    /// Starts a LEFT OUTER JOIN.
    #[must_use]
    pub fn left_join(self, right: impl Into<Node>) -> JoinContext {
        self.join_with(right, JoinType::LeftOuter)
    }

    /// Starts a RIGHT OUTER JOIN.
    #[must_use]
    pub fn right_join(self, right: impl Into<Node>) -> JoinContext {
        self.join_with(right, JoinType::RightOuter)
    }

    /// Starts a FULL OUTER JOIN.
    #[must_use]
    pub fn full_join(self, right: impl Into<Node>) -> JoinContext {
        self.join_with(right, JoinType::FullOuter)
    }

    /// Starts a join of the given type.
    #[must_use]
    pub fn join_with(self, right: impl Into<Node>, join_type: JoinType) -> JoinContext {
        JoinContext {
            manager: self,
            join: Join::new(join_type, right),
        }
    }

    /// Starts a LATERAL join of the given type.
    #[must_use]
    pub fn lateral_join(self, right: impl Into<Node>, join_type: JoinType) -> JoinContext {
        JoinContext {
            manager: self,
            join: Join::new(join_type, right).lateral(),
        }
    }

    /// Appends a CROSS JOIN, which takes no ON predicate.
    #[must_use]
    pub fn cross_join(mut self, right: impl Into<Node>) -> Self {
        self.core.joins.push(Join::new(JoinType::Cross, right));
        self
    }

    /// Appends a join written as raw SQL, keyword included.
    ///
    /// **Warning**: the text is emitted verbatim.
    #[must_use]
    pub fn string_join(mut self, sql: impl Into<String>) -> Self {
        self.core.joins.push(Join::string(sql));
        self
    }

    /// Appends GROUP BY expressions.
    #[must_use]
    pub fn group<I, T>(mut self, exprs: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Node>,
    {
        self.core.groups.extend(nodes(exprs));
        self
    }

    /// Appends a HAVING predicate. Predicates are AND-ed.
    #[must_use]
    pub fn having(mut self, predicate: impl Into<Node>) -> Self {
        self.core.havings.push(predicate.into());
        self
    }

    /// Appends ORDER BY expressions.
    #[must_use]
    pub fn order<I, T>(mut self, exprs: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Node>,
    {
        self.core.orders.extend(nodes(exprs));
        self
    }

    /// Appends a named window to the WINDOW clause.
    #[must_use]
    pub fn window(mut self, def: WindowDefinition) -> Self {
        self.core.windows.push(def);
        self
    }

    /// Appends an optimiser hint.
    #[must_use]
    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.core.hints.push(hint.into());
        self
    }

    /// Sets the leading block comment.
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.core.comment = Some(comment.into());
        self
    }

    /// Adds a CTE.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, query: impl Into<Node>) -> Self {
        self.core.ctes.push(Cte::new(name, query));
        self
    }

    /// Adds a recursive CTE. The whole prefix becomes `WITH RECURSIVE`.
    #[must_use]
    pub fn with_recursive(mut self, name: impl Into<String>, query: impl Into<Node>) -> Self {
        self.core.ctes.push(Cte::recursive(name, query));
        self
    }

    /// Adds a prepared CTE, for example one with a column list.
    #[must_use]
    pub fn with_cte(mut self, cte: Cte) -> Self {
        self.core.ctes.push(cte);
        self
    }

    /// Sets `DISTINCT`.
    #[must_use]
    pub const fn distinct(self) -> Self {
        self.set_distinct(true)
    }

    /// Sets or clears `DISTINCT`.
    #[must_use]
    pub const fn set_distinct(mut self, distinct: bool) -> Self {
        self.core.distinct = distinct;
        self
    }

    /// Appends `DISTINCT ON` expressions. Takes precedence over
    /// `DISTINCT`.
    #[must_use]
    pub fn distinct_on<I, T>(mut self, exprs: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Node>,
    {
        self.core.distinct_on.extend(nodes(exprs));
        self
    }

    /// Sets LIMIT. The count is a bind parameter.
    #[must_use]
    pub fn limit(mut self, n: u64) -> Self {
        self.core.limit = Some(Node::bind(n));
        self
    }

    /// Alias for [`SelectManager::limit`].
    #[must_use]
    pub fn take(self, n: u64) -> Self {
        self.limit(n)
    }

    /// Sets OFFSET. The count is a bind parameter.
    #[must_use]
    pub fn offset(mut self, n: u64) -> Self {
        self.core.offset = Some(Node::bind(n));
        self
    }

    const fn lock(mut self, mode: LockMode) -> Self {
        self.core.lock = Some(mode);
        self
    }

    /// `FOR UPDATE`.
    #[must_use]
    pub const fn for_update(self) -> Self {
        self.lock(LockMode::ForUpdate)
    }

    /// `FOR SHARE`.
    #[must_use]
    pub const fn for_share(self) -> Self {
        self.lock(LockMode::ForShare)
    }

    /// `FOR NO KEY UPDATE`.
    #[must_use]
    pub const fn for_no_key_update(self) -> Self {
        self.lock(LockMode::ForNoKeyUpdate)
    }

    /// `FOR KEY SHARE`.
    #[must_use]
    pub const fn for_key_share(self) -> Self {
        self.lock(LockMode::ForKeyShare)
    }

    /// Adds `SKIP LOCKED` after the lock clause.
    #[must_use]
    pub const fn skip_locked(mut self) -> Self {
        self.core.skip_locked = true;
        self
    }

    /// Registers a transformer. Transformers run in registration order.
    #[must_use]
    pub fn use_transformer(mut self, transformer: impl Transformer + 'static) -> Self {
        self.pipeline.push(transformer);
        self
    }

    fn set_operation(self, op: SetOpType, other: impl Into<Node>) -> SetOperation {
        SetOperation::new(self, op, other)
    }

    /// `(self) UNION (other)`.
    #[must_use]
    pub fn union(self, other: impl Into<Node>) -> SetOperation {
        self.set_operation(SetOpType::Union, other)
    }

    /// `(self) UNION ALL (other)`.
    #[must_use]
    pub fn union_all(self, other: impl Into<Node>) -> SetOperation {
        self.set_operation(SetOpType::UnionAll, other)
    }

    /// `(self) INTERSECT (other)`.
    #[must_use]
    pub fn intersect(self, other: impl Into<Node>) -> SetOperation {
        self.set_operation(SetOpType::Intersect, other)
    }

    /// `(self) INTERSECT ALL (other)`.
    #[must_use]
    pub fn intersect_all(self, other: impl Into<Node>) -> SetOperation {
        self.set_operation(SetOpType::IntersectAll, other)
    }

    /// `(self) EXCEPT (other)`.
    #[must_use]
    pub fn except(self, other: impl Into<Node>) -> SetOperation {
        self.set_operation(SetOpType::Except, other)
    }

    /// `(self) EXCEPT ALL (other)`.
    #[must_use]
    pub fn except_all(self, other: impl Into<Node>) -> SetOperation {
        self.set_operation(SetOpType::ExceptAll, other)
    }

    /// Wraps the query as an aliased subquery: `(SELECT ...) "name"`.
    ///
    /// The subquery's own transformers are not applied.
    #[must_use]
    pub fn alias(&self, name: impl Into<String>) -> Node {
        Node::table_alias(self, name)
    }

    /// Renders the statement.
    ///
    /// The root is copied, the copy goes through every transformer in
    /// registration order, and the result is rendered. The manager is
    /// left unchanged.
    ///
    /// # Errors
    ///
    /// Returns the first transformer error. No SQL is produced then.
    pub fn to_sql(&self, renderer: &mut dyn QueryRenderer) -> Result<Rendered> {
        debug!(
            kind = "SELECT",
            transformers = self.pipeline.len(),
            "rendering statement"
        );
        let select = self.pipeline.apply_select(&self.core)?;
        Ok(render_root(StatementKind::Select, &select.into_node(), renderer))
    }

    /// Renders the statement as a Graphviz digraph. WHERE and JOIN items
    /// added by each transformer are grouped in a cluster named after it.
    ///
    /// # Errors
    ///
    /// Returns the first transformer error.
    pub fn to_graph(&self) -> Result<String> {
        let (select, attributions) = self.pipeline.apply_select_attributed(&self.core)?;
        let mut graph = GraphRenderer::new();
        Ok(graph.render_with_attributions(&select.into_node(), &attributions))
    }
}

impl From<SelectManager> for Node {
    fn from(manager: SelectManager) -> Self {
        manager.core.into_node()
    }
}

impl From<&SelectManager> for Node {
    fn from(manager: &SelectManager) -> Self {
        manager.core.clone().into_node()
    }
}

/// A pending join. Call [`JoinContext::on`] to add it.
#[derive(Debug, Clone)]
#[must_use = "a join is only added once `on` is called"]
pub struct JoinContext {
    manager: SelectManager,
    join: Join,
}

impl JoinContext {
    /// Completes the join with its ON predicate.
    pub fn on(mut self, predicate: impl Into<Node>) -> SelectManager {
        self.manager.core.joins.push(self.join.on(predicate));
        self.manager
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::SqlValue;
    use crate::builder::{count_star, func, named_window, table};
    use crate::dialect::{PostgresRenderer, SqliteRenderer};
    use crate::render::{RenderOptions, Renderer};

    fn inline() -> PostgresRenderer {
        PostgresRenderer::with_options(RenderOptions::inline())
    }

    #[test]
    fn test_simple_select_inline() {
        let users = table("users");
        let (sql, params) = SelectManager::new(&users)
            .where_clause(users.attr("active").eq(true))
            .to_sql(&mut inline())
            .unwrap();
        assert_eq!(sql, "SELECT * FROM \"users\" WHERE \"users\".\"active\" = TRUE");
        assert_eq!(params, Some(vec![]));
    }

    #[test]
    fn test_clause_order() {
        let users = table("users");
        let query = SelectManager::new(&users)
            .comment("list */ users")
            .hint("SeqScan(users)")
            .distinct()
            .project([users.attr("role"), count_star().alias("n")])
            .where_clause(users.attr("active").eq(true))
            .group([users.attr("role")])
            .having(count_star().gt(1))
            .order([users.attr("role").asc()])
            .limit(5)
            .offset(10)
            .for_update()
            .skip_locked();
        let (sql, _) = query.to_sql(&mut inline()).unwrap();
        assert_eq!(
            sql,
            "/* list * / users */ SELECT /*+ SeqScan(users) */ DISTINCT \"users\".\"role\", \
             COUNT(*) AS \"n\" FROM \"users\" WHERE \"users\".\"active\" = TRUE \
             GROUP BY \"users\".\"role\" HAVING COUNT(*) > 1 ORDER BY \"users\".\"role\" ASC \
             LIMIT 5 OFFSET 10 FOR UPDATE SKIP LOCKED"
        );
    }

    #[test]
    fn test_distinct_on_wins() {
        let users = table("users");
        let (sql, _) = SelectManager::new(&users)
            .distinct()
            .distinct_on([users.attr("email")])
            .to_sql(&mut inline())
            .unwrap();
        assert_eq!(sql, "SELECT DISTINCT ON (\"users\".\"email\") * FROM \"users\"");
    }

    #[test]
    fn test_ctes() {
        let users = table("users");
        let active = SelectManager::new(&users).where_clause(users.attr("active").eq(true));
        let a = table("active_users");
        let (sql, _) = SelectManager::new(&a)
            .with("active_users", &active)
            .to_sql(&mut inline())
            .unwrap();
        assert_eq!(
            sql,
            "WITH \"active_users\" AS (SELECT * FROM \"users\" WHERE \"users\".\"active\" = TRUE) \
             SELECT * FROM \"active_users\""
        );

        let tree = table("tree");
        let (sql, _) = SelectManager::new(&tree)
            .with("base", SelectManager::new(&users))
            .with_recursive("tree", SelectManager::new(&users))
            .to_sql(&mut inline())
            .unwrap();
        assert!(sql.starts_with("WITH RECURSIVE \"base\" AS ("));
        assert!(sql.contains("), \"tree\" AS ("));
    }

    #[test]
    fn test_joins() {
        let users = table("users");
        let posts = table("posts");
        let tags = table("tags");
        let (sql, _) = SelectManager::new(&users)
            .left_join(&posts)
            .on(users.attr("id").eq(posts.attr("author_id")))
            .cross_join(&tags)
            .string_join("NATURAL JOIN profiles")
            .to_sql(&mut inline())
            .unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM \"users\" LEFT OUTER JOIN \"posts\" ON \"users\".\"id\" = \
             \"posts\".\"author_id\" CROSS JOIN \"tags\" NATURAL JOIN profiles"
        );
    }

    #[test]
    fn test_lateral_subquery_join() {
        let users = table("users");
        let posts = table("posts");
        let latest = SelectManager::new(&posts)
            .where_clause(posts.attr("author_id").eq(users.attr("id")))
            .limit(1)
            .alias("latest");
        let (sql, params) = SelectManager::new(&users)
            .lateral_join(latest, JoinType::LeftOuter)
            .on(sql_true())
            .to_sql(&mut PostgresRenderer::new())
            .unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM \"users\" LEFT OUTER JOIN LATERAL (SELECT * FROM \"posts\" WHERE \
             \"posts\".\"author_id\" = \"users\".\"id\" LIMIT $1) \"latest\" ON TRUE"
        );
        assert_eq!(params, Some(vec![SqlValue::UInt(1)]));
    }

    fn sql_true() -> Node {
        crate::builder::sql("TRUE")
    }

    #[test]
    fn test_windows() {
        let sales = table("sales");
        let (sql, _) = SelectManager::new(&sales)
            .project([func("ROW_NUMBER", Vec::<Node>::new()).over_named("w")])
            .window(named_window("w").partition([sales.attr("region")]))
            .to_sql(&mut inline())
            .unwrap();
        assert_eq!(
            sql,
            "SELECT ROW_NUMBER() OVER \"w\" FROM \"sales\" WINDOW \"w\" AS (PARTITION BY \"sales\".\"region\")"
        );
    }

    #[test]
    fn test_set_operation_applies_to_combined() {
        let a = table("a");
        let b = table("b");
        let op = SelectManager::new(&a)
            .union_all(SelectManager::new(&b))
            .order([a.attr("id").desc()])
            .limit(3);
        let mut r = SqliteRenderer::new();
        assert_eq!(
            r.render(&op.into_node()),
            "(SELECT * FROM \"a\") UNION ALL (SELECT * FROM \"b\") ORDER BY \"a\".\"id\" DESC LIMIT ?"
        );
    }

    #[test]
    fn test_to_sql_leaves_manager_unchanged() {
        struct AddWhere;
        impl Transformer for AddWhere {
            fn transform_select(&self, mut select: SelectCore) -> Result<SelectCore> {
                select.wheres.push(crate::builder::sql("1 = 1"));
                Ok(select)
            }
        }
        let users = table("users");
        let query = SelectManager::new(&users).use_transformer(AddWhere);
        let before = query.core().clone();
        let (sql, _) = query.to_sql(&mut inline()).unwrap();
        assert_eq!(sql, "SELECT * FROM \"users\" WHERE 1 = 1");
        assert_eq!(query.core(), &before);
        let (again, _) = query.to_sql(&mut inline()).unwrap();
        assert_eq!(again, sql);
    }

    #[test]
    fn test_wheres_skips_none() {
        let users = table("users");
        let (sql, _) = SelectManager::new(&users)
            .wheres([users.attr("id").eq_any(Vec::<i32>::new()), Some(users.attr("id").gt(0))])
            .to_sql(&mut inline())
            .unwrap();
        assert_eq!(sql, "SELECT * FROM \"users\" WHERE \"users\".\"id\" > 0");
    }

    #[test]
    fn test_to_graph_renders_digraph() {
        let users = table("users");
        let dot = SelectManager::new(&users)
            .where_clause(users.attr("id").eq(1))
            .to_graph()
            .unwrap();
        assert!(dot.starts_with("digraph AST {"));
        assert!(dot.contains("SelectCore"));
    }
}
