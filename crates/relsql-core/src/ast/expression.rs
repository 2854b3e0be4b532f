//! The AST node model.
//!
//! Every AST element is a [`Node`]: a cheap-to-clone shared handle to an
//! immutable [`NodeKind`]. Cloning a node never copies the tree, so
//! statement roots can be shallow-copied by cloning their `Vec<Node>`
//! slots while the elements stay shared with the caller.

use std::fmt;
use std::sync::Arc;

use super::ops::{
    AggregateFunc, ComparisonOp, ExtractField, GroupingSetKind, InfixOp, NullOrdering,
    OrderDirection, UnaryMathOp, UnaryPredicateOp,
};
use super::statement::{
    Assignment, Cte, DeleteStatement, InsertStatement, Join, SelectCore, SetOperation,
    UpdateStatement,
};
use super::validate::{assert_function_name, assert_type_name};
use super::value::SqlValue;
use super::window::{Over, WindowDefinition};

/// A shared, immutable AST node.
#[derive(Clone, PartialEq)]
pub struct Node(Arc<NodeKind>);

impl Node {
    /// Wraps a node kind.
    #[must_use]
    pub fn new(kind: NodeKind) -> Self {
        Self(Arc::new(kind))
    }

    /// Returns the tagged variant behind this handle.
    #[must_use]
    pub fn kind(&self) -> &NodeKind {
        &self.0
    }

    /// Returns true if both handles point at the same node.
    #[must_use]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    /// Returns the variant name, used in logs and graph labels.
    #[must_use]
    pub fn variant_name(&self) -> &'static str {
        self.kind().variant_name()
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<NodeKind> for Node {
    fn from(kind: NodeKind) -> Self {
        Self::new(kind)
    }
}

impl From<&Self> for Node {
    fn from(node: &Self) -> Self {
        node.clone()
    }
}

impl From<SqlValue> for Node {
    fn from(value: SqlValue) -> Self {
        Self::literal(value)
    }
}

macro_rules! impl_node_from_value {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Node {
                fn from(v: $t) -> Self {
                    Self::literal(SqlValue::from(v))
                }
            }
        )*
    };
}

impl_node_from_value!(
    bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, &str, String, &String
);

impl<T: Into<SqlValue>> From<Option<T>> for Node {
    fn from(v: Option<T>) -> Self {
        Self::literal(v.map_or(SqlValue::Null, Into::into))
    }
}

/// Every node variant.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A base table.
    Table(Table),
    /// A table or subquery with an alias.
    TableAlias(TableAlias),
    /// A column reference bound to a relation.
    Attribute(Attribute),
    /// `*` or `"t".*`.
    Star(Star),
    /// A literal value.
    Literal(SqlValue),
    /// A value that is always a placeholder when parameterising.
    BindParam(SqlValue),
    /// `CAST(value AS type)`.
    Casted(Casted),
    /// Verbatim SQL with bind values.
    Raw(RawFragment),
    /// `left op right`.
    Comparison(Comparison),
    /// `expr IS [NOT] NULL`.
    UnaryPredicate(UnaryPredicate),
    /// `left AND right`.
    And(Node, Node),
    /// `left OR right`.
    Or(Node, Node),
    /// `NOT (expr)`.
    Not(Node),
    /// `(expr)`.
    Grouping(Node),
    /// `expr [NOT] IN (...)`.
    In(In),
    /// `expr [NOT] BETWEEN low AND high`.
    Between(Between),
    /// `[NOT] EXISTS (subquery)`.
    Exists(Exists),
    /// Arithmetic, bitwise and concatenation operators.
    Infix(Infix),
    /// Prefix arithmetic.
    UnaryMath(UnaryMath),
    /// `name(args...)`.
    NamedFunction(NamedFunction),
    /// `COUNT`/`SUM`/`AVG`/`MIN`/`MAX`.
    Aggregate(Aggregate),
    /// `EXTRACT(field FROM expr)`.
    Extract(Extract),
    /// `expr ASC|DESC [NULLS FIRST|LAST]`.
    Ordering(Ordering),
    /// A window definition, named or inline.
    Window(WindowDefinition),
    /// `expr OVER (...)`.
    Over(Over),
    /// `expr AS "name"`.
    Alias(Alias),
    /// `CASE ... END`.
    Case(Case),
    /// `CUBE`, `ROLLUP` or `GROUPING SETS`.
    GroupingSet(GroupingSet),
    /// `UNION`, `INTERSECT`, `EXCEPT` and their `ALL` forms.
    SetOperation(SetOperation),
    /// A common table expression.
    Cte(Cte),
    /// `column = value` in SET lists.
    Assignment(Assignment),
    /// A join clause.
    Join(Join),
    /// A SELECT statement, usable as a subquery.
    Select(SelectCore),
    /// An INSERT statement.
    Insert(InsertStatement),
    /// An UPDATE statement.
    Update(UpdateStatement),
    /// A DELETE statement.
    Delete(DeleteStatement),
}

impl NodeKind {
    /// Returns the variant name.
    #[must_use]
    pub const fn variant_name(&self) -> &'static str {
        match self {
            Self::Table(_) => "Table",
            Self::TableAlias(_) => "TableAlias",
            Self::Attribute(_) => "Attribute",
            Self::Star(_) => "Star",
            Self::Literal(_) => "Literal",
            Self::BindParam(_) => "BindParam",
            Self::Casted(_) => "Casted",
            Self::Raw(_) => "Raw",
            Self::Comparison(_) => "Comparison",
            Self::UnaryPredicate(_) => "UnaryPredicate",
            Self::And(..) => "And",
            Self::Or(..) => "Or",
            Self::Not(_) => "Not",
            Self::Grouping(_) => "Grouping",
            Self::In(_) => "In",
            Self::Between(_) => "Between",
            Self::Exists(_) => "Exists",
            Self::Infix(_) => "Infix",
            Self::UnaryMath(_) => "UnaryMath",
            Self::NamedFunction(_) => "NamedFunction",
            Self::Aggregate(_) => "Aggregate",
            Self::Extract(_) => "Extract",
            Self::Ordering(_) => "Ordering",
            Self::Window(_) => "Window",
            Self::Over(_) => "Over",
            Self::Alias(_) => "Alias",
            Self::Case(_) => "Case",
            Self::GroupingSet(_) => "GroupingSet",
            Self::SetOperation(_) => "SetOperation",
            Self::Cte(_) => "Cte",
            Self::Assignment(_) => "Assignment",
            Self::Join(_) => "Join",
            Self::Select(_) => "SelectCore",
            Self::Insert(_) => "InsertStatement",
            Self::Update(_) => "UpdateStatement",
            Self::Delete(_) => "DeleteStatement",
        }
    }
}

/// A base table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// Table name.
    pub name: String,
}

/// A relation with an alias. `relation` is a table or a query.
#[derive(Debug, Clone, PartialEq)]
pub struct TableAlias {
    pub relation: Node,
    pub alias: String,
}

/// A column reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    /// The owning relation: a [`Table`] or [`TableAlias`] node.
    pub relation: Node,
    /// Column name.
    pub name: String,
    /// SQL type used to coerce raw values compared against this column.
    pub type_name: Option<String>,
}

/// `*`, optionally qualified by a relation.
#[derive(Debug, Clone, PartialEq)]
pub struct Star {
    pub relation: Option<Node>,
}

/// `CAST(value AS type_name)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Casted {
    pub value: SqlValue,
    pub type_name: String,
}

/// Verbatim SQL text plus the bind values it carries.
///
/// **Warning**: the text is emitted unescaped. Only use this for SQL
/// fragments that don't contain user input.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFragment {
    pub sql: String,
    pub binds: Vec<SqlValue>,
}

/// A binary comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub left: Node,
    pub op: ComparisonOp,
    pub right: Node,
}

/// A postfix predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryPredicate {
    pub expr: Node,
    pub op: UnaryPredicateOp,
}

/// IN / NOT IN.
#[derive(Debug, Clone, PartialEq)]
pub struct In {
    pub expr: Node,
    pub values: Vec<Node>,
    pub negated: bool,
}

/// BETWEEN / NOT BETWEEN.
#[derive(Debug, Clone, PartialEq)]
pub struct Between {
    pub expr: Node,
    pub low: Node,
    pub high: Node,
    pub negated: bool,
}

/// EXISTS / NOT EXISTS.
#[derive(Debug, Clone, PartialEq)]
pub struct Exists {
    pub subquery: Node,
    pub negated: bool,
}

/// An infix arithmetic expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Infix {
    pub left: Node,
    pub op: InfixOp,
    pub right: Node,
}

/// A prefix arithmetic expression.
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryMath {
    pub expr: Node,
    pub op: UnaryMathOp,
}

/// A call to a named SQL function.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedFunction {
    /// Function name. Must pass the function-name whitelist.
    pub name: String,
    pub args: Vec<Node>,
    pub distinct: bool,
}

/// An aggregate call. `expr: None` is `COUNT(*)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub func: AggregateFunc,
    pub expr: Option<Node>,
    pub distinct: bool,
    /// `FILTER (WHERE ...)` predicate.
    pub filter: Option<Node>,
}

/// `EXTRACT(field FROM expr)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Extract {
    pub field: ExtractField,
    pub expr: Node,
}

/// An ORDER BY item.
#[derive(Debug, Clone, PartialEq)]
pub struct Ordering {
    pub expr: Node,
    pub direction: OrderDirection,
    pub nulls: NullOrdering,
}

/// `expr AS "name"`.
#[derive(Debug, Clone, PartialEq)]
pub struct Alias {
    pub expr: Node,
    pub name: String,
}

/// A CASE expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Case {
    /// `CASE operand WHEN ...` form when set.
    pub operand: Option<Node>,
    /// WHEN/THEN pairs.
    pub whens: Vec<(Node, Node)>,
    /// ELSE value.
    pub default: Option<Node>,
}

impl Case {
    /// Starts a CASE expression. `operand` selects the simple
    /// `CASE x WHEN v THEN ...` form.
    #[must_use]
    pub const fn new(operand: Option<Node>) -> Self {
        Self {
            operand,
            whens: Vec::new(),
            default: None,
        }
    }

    /// Adds a `WHEN condition THEN result` branch.
    #[must_use]
    pub fn when(mut self, condition: impl Into<Node>, result: impl Into<Node>) -> Self {
        self.whens.push((condition.into(), result.into()));
        self
    }

    /// Sets the ELSE value.
    #[must_use]
    pub fn otherwise(mut self, value: impl Into<Node>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Finishes the expression.
    #[must_use]
    pub fn end(self) -> Node {
        Node::new(NodeKind::Case(self))
    }
}

impl From<Case> for Node {
    fn from(case: Case) -> Self {
        case.end()
    }
}

/// CUBE / ROLLUP / GROUPING SETS.
///
/// `CUBE` and `ROLLUP` render `columns`; `GROUPING SETS` renders `sets`.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupingSet {
    pub kind: GroupingSetKind,
    pub columns: Vec<Node>,
    pub sets: Vec<Vec<Node>>,
}

impl Node {
    /// Creates a table node.
    #[must_use]
    pub fn table(name: impl Into<String>) -> Self {
        Self::new(NodeKind::Table(Table { name: name.into() }))
    }

    /// Creates an alias for a table or a query.
    #[must_use]
    pub fn table_alias(relation: impl Into<Self>, alias: impl Into<String>) -> Self {
        Self::new(NodeKind::TableAlias(TableAlias {
            relation: relation.into(),
            alias: alias.into(),
        }))
    }

    /// Creates an attribute of `relation`.
    #[must_use]
    pub fn attribute(relation: &Self, name: impl Into<String>) -> Self {
        Self::new(NodeKind::Attribute(Attribute {
            relation: relation.clone(),
            name: name.into(),
            type_name: None,
        }))
    }

    /// Creates an attribute carrying a SQL type used for value coercion.
    ///
    /// # Panics
    ///
    /// If `type_name` fails the type-name whitelist.
    #[must_use]
    pub fn typed_attribute(
        relation: &Self,
        name: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Self {
        let type_name = type_name.into();
        assert_type_name(&type_name);
        Self::new(NodeKind::Attribute(Attribute {
            relation: relation.clone(),
            name: name.into(),
            type_name: Some(type_name),
        }))
    }

    /// Creates an unqualified `*`.
    #[must_use]
    pub fn star() -> Self {
        Self::new(NodeKind::Star(Star { relation: None }))
    }

    /// Creates a literal.
    #[must_use]
    pub fn literal(value: impl Into<SqlValue>) -> Self {
        Self::new(NodeKind::Literal(value.into()))
    }

    /// Creates a NULL literal.
    #[must_use]
    pub fn null() -> Self {
        Self::literal(SqlValue::Null)
    }

    /// Creates a bind parameter.
    #[must_use]
    pub fn bind(value: impl Into<SqlValue>) -> Self {
        Self::new(NodeKind::BindParam(value.into()))
    }

    /// Creates `CAST(value AS type_name)`.
    ///
    /// # Panics
    ///
    /// If `type_name` fails the type-name whitelist.
    #[must_use]
    pub fn casted(value: impl Into<SqlValue>, type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        assert_type_name(&type_name);
        Self::new(NodeKind::Casted(Casted {
            value: value.into(),
            type_name,
        }))
    }

    /// Creates a raw SQL fragment without binds.
    ///
    /// **Warning**: Only use this for SQL fragments that don't contain
    /// user input.
    #[must_use]
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::raw_with_binds(sql, Vec::new())
    }

    /// Creates a raw SQL fragment carrying bind values.
    #[must_use]
    pub fn raw_with_binds(sql: impl Into<String>, binds: Vec<SqlValue>) -> Self {
        Self::new(NodeKind::Raw(RawFragment {
            sql: sql.into(),
            binds,
        }))
    }

    /// Creates a call to a named function.
    ///
    /// # Panics
    ///
    /// If `name` fails the function-name whitelist.
    #[must_use]
    pub fn function<I, T>(name: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Self>,
    {
        Self::function_with(name, args, false)
    }

    /// Creates a call to a named function with `DISTINCT` arguments.
    ///
    /// # Panics
    ///
    /// If `name` fails the function-name whitelist.
    #[must_use]
    pub fn function_distinct<I, T>(name: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Self>,
    {
        Self::function_with(name, args, true)
    }

    fn function_with<I, T>(name: impl Into<String>, args: I, distinct: bool) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Self>,
    {
        let name = name.into();
        assert_function_name(&name);
        Self::new(NodeKind::NamedFunction(NamedFunction {
            name,
            args: args.into_iter().map(Into::into).collect(),
            distinct,
        }))
    }

    /// Creates an aggregate call.
    ///
    /// # Panics
    ///
    /// If `expr` is `None` for anything other than `COUNT`.
    #[must_use]
    pub fn aggregate(func: AggregateFunc, expr: Option<Self>, distinct: bool) -> Self {
        assert!(
            expr.is_some() || func == AggregateFunc::Count,
            "{}(*) is not valid SQL; only COUNT accepts a missing expression",
            func.as_str()
        );
        Self::new(NodeKind::Aggregate(Aggregate {
            func,
            expr,
            distinct,
            filter: None,
        }))
    }

    /// Creates `EXTRACT(field FROM expr)`.
    #[must_use]
    pub fn extract(field: ExtractField, expr: impl Into<Self>) -> Self {
        Self::new(NodeKind::Extract(Extract {
            field,
            expr: expr.into(),
        }))
    }

    /// Creates a CUBE or ROLLUP over `columns`.
    #[must_use]
    pub fn grouping_columns(kind: GroupingSetKind, columns: Vec<Self>) -> Self {
        Self::new(NodeKind::GroupingSet(GroupingSet {
            kind,
            columns,
            sets: Vec::new(),
        }))
    }

    /// Creates `GROUPING SETS (...)`.
    #[must_use]
    pub fn grouping_sets(sets: Vec<Vec<Self>>) -> Self {
        Self::new(NodeKind::GroupingSet(GroupingSet {
            kind: GroupingSetKind::GroupingSets,
            columns: Vec::new(),
            sets,
        }))
    }

    /// Creates `[NOT] EXISTS (subquery)`.
    #[must_use]
    pub fn exists(subquery: impl Into<Self>, negated: bool) -> Self {
        Self::new(NodeKind::Exists(Exists {
            subquery: subquery.into(),
            negated,
        }))
    }

    /// Creates a grouping around `expr`.
    #[must_use]
    pub fn grouping(expr: impl Into<Self>) -> Self {
        Self::new(NodeKind::Grouping(expr.into()))
    }

    /// Returns true for [`NodeKind::Literal`] holding NULL.
    #[must_use]
    pub fn is_null_literal(&self) -> bool {
        matches!(self.kind(), NodeKind::Literal(SqlValue::Null))
    }

    /// Returns true for nodes that are queries: SELECTs and set operations.
    #[must_use]
    pub fn is_query(&self) -> bool {
        matches!(self.kind(), NodeKind::Select(_) | NodeKind::SetOperation(_))
    }

    /// Returns true for nodes that are relations (tables and aliases).
    #[must_use]
    pub fn is_relation(&self) -> bool {
        matches!(self.kind(), NodeKind::Table(_) | NodeKind::TableAlias(_))
    }

    /// Returns the name an attribute of this relation is qualified with:
    /// the table name, or the alias.
    #[must_use]
    pub fn relation_name(&self) -> Option<&str> {
        match self.kind() {
            NodeKind::Table(t) => Some(&t.name),
            NodeKind::TableAlias(a) => Some(&a.alias),
            _ => None,
        }
    }

    /// Looks through aliases to the underlying table name. Subqueries
    /// have none.
    #[must_use]
    pub fn underlying_table_name(&self) -> Option<&str> {
        match self.kind() {
            NodeKind::Table(t) => Some(&t.name),
            NodeKind::TableAlias(a) => a.relation.underlying_table_name(),
            _ => None,
        }
    }

    /// Returns an attribute of this relation.
    ///
    /// # Panics
    ///
    /// If this node is not a table or a table alias.
    #[must_use]
    pub fn attr(&self, name: impl Into<String>) -> Self {
        assert!(
            self.is_relation(),
            "attributes can only be taken from tables and aliases, not {}",
            self.variant_name()
        );
        Self::attribute(self, name)
    }

    /// Returns a typed attribute of this relation.
    ///
    /// # Panics
    ///
    /// If this node is not a table or a table alias, or `type_name` fails
    /// the whitelist.
    #[must_use]
    pub fn typed_attr(&self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        assert!(
            self.is_relation(),
            "attributes can only be taken from tables and aliases, not {}",
            self.variant_name()
        );
        Self::typed_attribute(self, name, type_name)
    }

    /// Returns `"relation".*`.
    #[must_use]
    pub fn all_columns(&self) -> Self {
        Self::new(NodeKind::Star(Star {
            relation: Some(self.clone()),
        }))
    }

    /// Aliases this table or query as a relation: `"users" "u"`.
    #[must_use]
    pub fn aliased(&self, alias: impl Into<String>) -> Self {
        Self::table_alias(self, alias)
    }
}
