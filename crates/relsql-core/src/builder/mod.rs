//! Statement façades.
//!
//! Each manager owns one statement root plus a [`Pipeline`]. Builder
//! methods only append to the root's lists or set single fields; all
//! the work happens in `to_sql`, which copies the root, runs the
//! pipeline on the copy and hands the result to a renderer.
//!
//! # Example
//!
//! ```rust
//! use relsql_core::{MysqlRenderer, SelectManager, SqlValue, table};
//!
//! let users = table("users");
//! let posts = table("posts");
//! let (sql, params) = SelectManager::new(&users)
//!     .project([users.attr("name"), users.attr("email")])
//!     .join(&posts)
//!     .on(users.attr("id").eq(posts.attr("author_id")))
//!     .where_clause(users.attr("active").eq(true))
//!     .where_clause(posts.attr("published").eq(true))
//!     .to_sql(&mut MysqlRenderer::new())
//!     .unwrap();
//!
//! assert_eq!(
//!     sql,
//!     "SELECT `users`.`name`, `users`.`email` FROM `users` \
//!      INNER JOIN `posts` ON `users`.`id` = `posts`.`author_id` \
//!      WHERE `users`.`active` = ? AND `posts`.`published` = ?"
//! );
//! assert_eq!(params, Some(vec![SqlValue::Bool(true), SqlValue::Bool(true)]));
//! ```

mod delete;
mod expr;
mod insert;
mod select;
mod update;

pub use delete::DeleteManager;
pub use expr::{
    avg, bind, casted, count, count_star, cube, exists, extract, func, grouping_sets, literal,
    max, min, named_window, not_exists, null, rollup, searched_case, simple_case, sql,
    sql_with_binds, star, sum, table, window,
};
pub use insert::{DoUpdateBuilder, InsertManager, OnConflictBuilder};
pub use select::{JoinContext, SelectManager};
pub use update::UpdateManager;

use tracing::debug;

use crate::ast::{Node, SqlValue, StatementKind};
use crate::render::QueryRenderer;

/// SQL text plus the parameters, `None` when the renderer does not
/// collect them.
pub type Rendered = (String, Option<Vec<SqlValue>>);

/// Renders a transformed statement root with a fresh renderer state.
fn render_root(kind: StatementKind, root: &Node, renderer: &mut dyn QueryRenderer) -> Rendered {
    renderer.reset_state();
    let sql = renderer.render_statement(root);
    let params = renderer.params();
    debug!(
        kind = kind.as_str(),
        sql_len = sql.len(),
        params = params.as_ref().map_or(0, Vec::len),
        "rendered statement"
    );
    (sql, params)
}

/// Collects nodes from an iterator of anything convertible.
fn nodes<I, T>(items: I) -> impl Iterator<Item = Node>
where
    I: IntoIterator<Item = T>,
    T: Into<Node>,
{
    items.into_iter().map(Into::into)
}
