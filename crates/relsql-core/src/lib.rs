//! # relsql-core
//!
//! A relational-algebra SQL builder: queries are trees of [`Node`]s,
//! rendered to SQL text by a dialect renderer that collects bind
//! parameters along the way.
//!
//! This crate provides:
//! - An immutable, shareable AST built through chainable predicate methods
//! - PostgreSQL, MySQL and SQLite renderers, plus a multi-line
//!   [`FormattedRenderer`] and a Graphviz [`GraphRenderer`]
//! - A [`Transformer`] pipeline that rewrites a copy of each statement
//!   just before rendering (soft-delete filters, tenant scoping, access
//!   policies)
//! - Façades for SELECT, INSERT, UPDATE and DELETE
//!
//! ## Building a query
//!
//! ```rust
//! use relsql_core::{PostgresRenderer, SelectManager, SqlValue, table};
//!
//! let users = table("users");
//! let (sql, params) = SelectManager::new(&users)
//!     .project([users.attr("id"), users.attr("name")])
//!     .where_clause(users.attr("age").gt_eq(18).and(users.attr("name").like("A%")))
//!     .order([users.attr("name").asc()])
//!     .to_sql(&mut PostgresRenderer::new())
//!     .unwrap();
//!
//! assert_eq!(
//!     sql,
//!     "SELECT \"users\".\"id\", \"users\".\"name\" FROM \"users\" \
//!      WHERE \"users\".\"age\" >= $1 AND \"users\".\"name\" LIKE $2 \
//!      ORDER BY \"users\".\"name\" ASC"
//! );
//! assert_eq!(params, Some(vec![SqlValue::Int(18), SqlValue::from("A%")]));
//! ```
//!
//! ## SQL Injection Prevention
//!
//! Values never reach the SQL text while parameterisation is on (the
//! default). Identifiers are quoted, function and cast type names are
//! checked against a whitelist.
//!
//! ```rust
//! use relsql_core::{SelectManager, SqliteRenderer, SqlValue, table};
//!
//! let user_input = "'; DROP TABLE users; --";
//! let users = table("users");
//! let (sql, params) = SelectManager::new(&users)
//!     .where_clause(users.attr("name").eq(user_input))
//!     .to_sql(&mut SqliteRenderer::new())
//!     .unwrap();
//!
//! assert_eq!(sql, "SELECT * FROM \"users\" WHERE \"users\".\"name\" = ?");
//! assert_eq!(params, Some(vec![SqlValue::from(user_input)]));
//! ```
//!
//! ## Choosing a dialect at runtime
//!
//! ```rust
//! use relsql_core::{Dialect, RenderOptions, SelectManager, table};
//!
//! let mut renderer = Dialect::Mysql.renderer(RenderOptions::default());
//! let (sql, _) = SelectManager::new(table("t")).to_sql(&mut renderer).unwrap();
//! assert_eq!(sql, "SELECT * FROM `t`");
//! ```

pub mod ast;
pub mod builder;
pub mod dialect;
pub mod error;
pub mod quote;
pub mod render;
pub mod transform;

pub use ast::{
    Assignment, Case, ConflictAction, Cte, DeleteStatement, FrameBound, InsertStatement, Join,
    JoinType, Node, NodeKind, OnConflict, SelectCore, SetOpType, SetOperation, SqlValue,
    Statement, StatementKind, UpdateStatement, WindowDefinition,
};
pub use builder::{
    DeleteManager, DoUpdateBuilder, InsertManager, JoinContext, OnConflictBuilder, Rendered,
    SelectManager, UpdateManager, avg, bind, casted, count, count_star, cube, exists, extract,
    func, grouping_sets, literal, max, min, named_window, not_exists, null, rollup,
    searched_case, simple_case, sql, sql_with_binds, star, sum, table, window,
};
pub use dialect::{Dialect, MysqlRenderer, PostgresRenderer, SqliteRenderer};
pub use error::TransformError;
pub use render::{
    Attribution, FormattedRenderer, GraphRenderer, QueryRenderer, RenderOptions, RenderState,
    Renderer,
};
pub use transform::{Pipeline, Transformer, collect_tables};
