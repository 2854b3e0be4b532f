//! Statement roots and the clause payloads they are built from.
//!
//! Every root derives `Clone`. Because slots hold [`Node`] handles,
//! cloning a root allocates fresh `Vec`s while the nodes inside stay
//! shared with the original, which is exactly the copy the transformer
//! pipeline makes before handing a statement to a transformer.

use super::expression::{Node, NodeKind};
use super::ops::{JoinType, LockMode, SetOpType, StatementKind};
use super::window::WindowDefinition;

/// A SELECT statement.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectCore {
    /// FROM source: a table, an alias, or a subquery.
    pub from: Option<Node>,
    pub projections: Vec<Node>,
    pub wheres: Vec<Node>,
    pub joins: Vec<Join>,
    pub groups: Vec<Node>,
    pub havings: Vec<Node>,
    /// Named windows listed in the `WINDOW` clause.
    pub windows: Vec<WindowDefinition>,
    pub orders: Vec<Node>,
    pub limit: Option<Node>,
    pub offset: Option<Node>,
    pub distinct: bool,
    pub distinct_on: Vec<Node>,
    pub lock: Option<LockMode>,
    pub skip_locked: bool,
    /// Leading block comment.
    pub comment: Option<String>,
    /// Optimiser hints rendered as `/*+ ... */` after `SELECT`.
    pub hints: Vec<String>,
    pub ctes: Vec<Cte>,
}

impl SelectCore {
    /// Creates an empty SELECT.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a SELECT reading from `from`.
    #[must_use]
    pub fn from_relation(from: impl Into<Node>) -> Self {
        Self {
            from: Some(from.into()),
            ..Self::default()
        }
    }

    /// Wraps the statement in a node, for use as a subquery.
    #[must_use]
    pub fn into_node(self) -> Node {
        Node::new(NodeKind::Select(self))
    }
}

impl From<SelectCore> for Node {
    fn from(select: SelectCore) -> Self {
        select.into_node()
    }
}

/// An INSERT statement.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    pub into: Node,
    /// Target columns, rendered unqualified.
    pub columns: Vec<Node>,
    pub values: Vec<Vec<Node>>,
    /// `INSERT ... SELECT` source. Takes precedence over `values`.
    pub select: Option<Node>,
    pub returning: Vec<Node>,
    pub on_conflict: Option<OnConflict>,
}

impl InsertStatement {
    /// Creates an INSERT into `into` with no columns or rows.
    #[must_use]
    pub fn new(into: impl Into<Node>) -> Self {
        Self {
            into: into.into(),
            columns: Vec::new(),
            values: Vec::new(),
            select: None,
            returning: Vec::new(),
            on_conflict: None,
        }
    }

    /// Wraps the statement in a node.
    #[must_use]
    pub fn into_node(self) -> Node {
        Node::new(NodeKind::Insert(self))
    }
}

impl From<InsertStatement> for Node {
    fn from(stmt: InsertStatement) -> Self {
        stmt.into_node()
    }
}

/// An UPDATE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    pub table: Node,
    pub assignments: Vec<Assignment>,
    pub wheres: Vec<Node>,
    pub returning: Vec<Node>,
}

impl UpdateStatement {
    /// Creates an UPDATE of `table` with no assignments.
    #[must_use]
    pub fn new(table: impl Into<Node>) -> Self {
        Self {
            table: table.into(),
            assignments: Vec::new(),
            wheres: Vec::new(),
            returning: Vec::new(),
        }
    }

    /// Wraps the statement in a node.
    #[must_use]
    pub fn into_node(self) -> Node {
        Node::new(NodeKind::Update(self))
    }
}

impl From<UpdateStatement> for Node {
    fn from(stmt: UpdateStatement) -> Self {
        stmt.into_node()
    }
}

/// A DELETE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    pub from: Node,
    pub wheres: Vec<Node>,
    pub returning: Vec<Node>,
}

impl DeleteStatement {
    /// Creates an unfiltered DELETE from `from`.
    #[must_use]
    pub fn new(from: impl Into<Node>) -> Self {
        Self {
            from: from.into(),
            wheres: Vec::new(),
            returning: Vec::new(),
        }
    }

    /// Wraps the statement in a node.
    #[must_use]
    pub fn into_node(self) -> Node {
        Node::new(NodeKind::Delete(self))
    }
}

impl From<DeleteStatement> for Node {
    fn from(stmt: DeleteStatement) -> Self {
        stmt.into_node()
    }
}

/// Any of the four statement roots.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select(SelectCore),
    Insert(InsertStatement),
    Update(UpdateStatement),
    Delete(DeleteStatement),
}

impl Statement {
    /// Returns the statement kind.
    #[must_use]
    pub const fn kind(&self) -> StatementKind {
        match self {
            Self::Select(_) => StatementKind::Select,
            Self::Insert(_) => StatementKind::Insert,
            Self::Update(_) => StatementKind::Update,
            Self::Delete(_) => StatementKind::Delete,
        }
    }

    /// Wraps the statement in a node.
    #[must_use]
    pub fn into_node(self) -> Node {
        match self {
            Self::Select(s) => s.into_node(),
            Self::Insert(s) => s.into_node(),
            Self::Update(s) => s.into_node(),
            Self::Delete(s) => s.into_node(),
        }
    }
}

/// A join clause.
///
/// The left side is whatever precedes the join in the FROM list, so only
/// the right side is stored. For [`JoinType::String`] joins `right` is a
/// raw fragment that carries its own join keyword.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub join_type: JoinType,
    pub right: Node,
    pub on: Option<Node>,
    pub lateral: bool,
}

impl Join {
    /// Creates a join without an ON predicate.
    #[must_use]
    pub fn new(join_type: JoinType, right: impl Into<Node>) -> Self {
        Self {
            join_type,
            right: right.into(),
            on: None,
            lateral: false,
        }
    }

    /// Creates a join whose whole text is `sql`.
    #[must_use]
    pub fn string(sql: impl Into<String>) -> Self {
        Self::new(JoinType::String, Node::raw(sql))
    }

    /// Sets the ON predicate.
    #[must_use]
    pub fn on(mut self, predicate: impl Into<Node>) -> Self {
        self.on = Some(predicate.into());
        self
    }

    /// Marks the join LATERAL.
    #[must_use]
    pub const fn lateral(mut self) -> Self {
        self.lateral = true;
        self
    }
}

impl From<Join> for Node {
    fn from(join: Join) -> Self {
        Self::new(NodeKind::Join(join))
    }
}

/// A common table expression: `"name" ("a", "b") AS (query)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Cte {
    pub name: String,
    pub columns: Vec<String>,
    pub query: Node,
    pub recursive: bool,
}

impl Cte {
    /// Creates a non-recursive CTE.
    #[must_use]
    pub fn new(name: impl Into<String>, query: impl Into<Node>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            query: query.into(),
            recursive: false,
        }
    }

    /// Creates a recursive CTE.
    #[must_use]
    pub fn recursive(name: impl Into<String>, query: impl Into<Node>) -> Self {
        Self {
            recursive: true,
            ..Self::new(name, query)
        }
    }

    /// Sets the column-name list.
    #[must_use]
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }
}

impl From<Cte> for Node {
    fn from(cte: Cte) -> Self {
        Self::new(NodeKind::Cte(cte))
    }
}

/// A set operation. `orders`, `limit` and `offset` apply to the
/// combined result.
#[derive(Debug, Clone, PartialEq)]
pub struct SetOperation {
    pub left: Node,
    pub op: SetOpType,
    pub right: Node,
    pub orders: Vec<Node>,
    pub limit: Option<Node>,
    pub offset: Option<Node>,
}

impl SetOperation {
    /// Combines two queries.
    #[must_use]
    pub fn new(left: impl Into<Node>, op: SetOpType, right: impl Into<Node>) -> Self {
        Self {
            left: left.into(),
            op,
            right: right.into(),
            orders: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Adds ORDER BY expressions applied to the combined result.
    #[must_use]
    pub fn order<I, T>(mut self, exprs: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Node>,
    {
        self.orders.extend(exprs.into_iter().map(Into::into));
        self
    }

    /// Limits the combined result. The count is a bind parameter.
    #[must_use]
    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(Node::bind(n));
        self
    }

    /// Skips rows of the combined result. The count is a bind parameter.
    #[must_use]
    pub fn offset(mut self, n: u64) -> Self {
        self.offset = Some(Node::bind(n));
        self
    }

    /// Wraps the operation in a node.
    #[must_use]
    pub fn into_node(self) -> Node {
        Node::new(NodeKind::SetOperation(self))
    }
}

impl From<SetOperation> for Node {
    fn from(op: SetOperation) -> Self {
        op.into_node()
    }
}

/// `column = value`. The column renders fully qualified.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub left: Node,
    pub right: Node,
}

impl Assignment {
    /// Creates an assignment.
    #[must_use]
    pub fn new(left: impl Into<Node>, right: impl Into<Node>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }
}

impl From<Assignment> for Node {
    fn from(assignment: Assignment) -> Self {
        Self::new(NodeKind::Assignment(assignment))
    }
}

/// `ON CONFLICT (columns) DO ...`.
#[derive(Debug, Clone, PartialEq)]
pub struct OnConflict {
    /// Conflict target columns, rendered unqualified.
    pub columns: Vec<Node>,
    pub action: ConflictAction,
}

/// What to do on a conflict. `DoNothing` carries no assignments.
#[derive(Debug, Clone, PartialEq)]
pub enum ConflictAction {
    DoNothing,
    DoUpdate {
        assignments: Vec<Assignment>,
        wheres: Vec<Node>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_is_shallow() {
        let users = Node::table("users");
        let pred = users.attr("active").eq(true);
        let mut original = SelectCore::from_relation(&users);
        original.wheres.push(pred.clone());

        let mut copy = original.clone();
        copy.wheres.push(users.attr("id").gt(1));

        assert_eq!(original.wheres.len(), 1);
        assert_eq!(copy.wheres.len(), 2);
        assert!(Node::ptr_eq(&original.wheres[0], &copy.wheres[0]));
    }

    #[test]
    fn test_statement_kind() {
        let t = Node::table("t");
        assert_eq!(Statement::Select(SelectCore::new()).kind(), StatementKind::Select);
        assert_eq!(
            Statement::Delete(DeleteStatement::new(&t)).kind(),
            StatementKind::Delete
        );
    }

    #[test]
    fn test_cte_builder() {
        let q = SelectCore::new();
        let cte = Cte::recursive("tree", q).columns(["id", "parent"]);
        assert!(cte.recursive);
        assert_eq!(cte.columns, vec!["id", "parent"]);
    }

    #[test]
    fn test_set_operation_limit_is_bound() {
        let op = SetOperation::new(SelectCore::new(), SetOpType::Union, SelectCore::new()).limit(5);
        assert_eq!(op.limit, Some(Node::bind(5_u64)));
    }
}
