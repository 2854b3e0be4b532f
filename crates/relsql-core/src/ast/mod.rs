//! Abstract Syntax Tree (AST) types for SQL statements.
//!
//! The tree is a closed sum, [`NodeKind`], behind a shared handle,
//! [`Node`]. Statement roots ([`SelectCore`], [`InsertStatement`],
//! [`UpdateStatement`], [`DeleteStatement`]) own `Vec`s of nodes and are
//! the only values mutated after construction.

mod expression;
mod ops;
mod predication;
mod statement;
pub mod validate;
mod value;
mod window;

pub use expression::{
    Aggregate, Alias, Attribute, Between, Case, Casted, Comparison, Exists, Extract, GroupingSet,
    In, Infix, NamedFunction, Node, NodeKind, Ordering, RawFragment, Star, Table, TableAlias,
    UnaryMath, UnaryPredicate,
};
pub use ops::{
    AggregateFunc, ComparisonOp, ExtractField, FrameType, GroupingSetKind, InfixOp, JoinType,
    LockMode, NullOrdering, OrderDirection, SetOpType, StatementKind, UnaryMathOp,
    UnaryPredicateOp,
};
pub use statement::{
    Assignment, ConflictAction, Cte, DeleteStatement, InsertStatement, Join, OnConflict,
    SelectCore, SetOperation, Statement, UpdateStatement,
};
pub use value::{SqlValue, ToSqlValue, format_float};
pub use window::{FrameBound, Over, OverWindow, WindowDefinition, WindowFrame};
