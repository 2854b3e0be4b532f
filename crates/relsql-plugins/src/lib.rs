//! # relsql-plugins
//!
//! Ready-made [`Transformer`](relsql_core::Transformer)s for
//! `relsql-core`.
//!
//! - [`SoftDelete`] hides rows whose `deleted_at` is set.
//! - [`TenantScope`] confines statements to one tenant and stamps the
//!   tenant on inserted rows.
//! - [`AccessPolicy`] asks a [`PolicyEvaluator`] about every table a
//!   statement touches, then denies the statement or filters its rows.
//!
//! Transformers run in registration order on a copy of the statement,
//! so a manager can be rendered again with the same result.
//!
//! ## Example
//!
//! ```rust
//! use relsql_core::{PostgresRenderer, SelectManager, SqlValue, table};
//! use relsql_plugins::{AccessPolicy, Condition, SoftDelete, StaticPolicy, TenantScope};
//!
//! let invoices = table("invoices");
//! let policy = StaticPolicy::new().filter("invoices", Condition::eq("status", "sent"));
//!
//! let (sql, params) = SelectManager::new(&invoices)
//!     .project([invoices.attr("id")])
//!     .use_transformer(SoftDelete::new())
//!     .use_transformer(TenantScope::new(3))
//!     .use_transformer(AccessPolicy::new(policy))
//!     .to_sql(&mut PostgresRenderer::new())
//!     .unwrap();
//!
//! assert_eq!(
//!     sql,
//!     "SELECT \"invoices\".\"id\" FROM \"invoices\" \
//!      WHERE \"invoices\".\"deleted_at\" IS NULL \
//!      AND \"invoices\".\"tenant_id\" = $1 \
//!      AND \"invoices\".\"status\" = $2"
//! );
//! assert_eq!(params, Some(vec![SqlValue::Int(3), SqlValue::from("sent")]));
//! ```

pub mod policy;
pub mod soft_delete;
pub mod tenant;

pub use policy::{
    AccessPolicy, Condition, Decision, PolicyError, PolicyEvaluator, Rule, StaticPolicy,
};
pub use soft_delete::SoftDelete;
pub use tenant::TenantScope;
