//! Soft-delete filtering.

use std::collections::BTreeSet;

use relsql_core::error::Result;
use relsql_core::transform::{Transformer, collect_tables};
use relsql_core::{DeleteStatement, Node, SelectCore, UpdateStatement};
use tracing::debug;

/// Hides soft-deleted rows by appending `T.deleted_at IS NULL` for every
/// table a statement reads or writes.
///
/// SELECTs get one predicate per FROM and JOIN table; UPDATEs and
/// DELETEs get one for their target. INSERTs are left alone.
///
/// ```rust
/// use relsql_core::{PostgresRenderer, SelectManager, table};
/// use relsql_plugins::SoftDelete;
///
/// let users = table("users");
/// let (sql, _) = SelectManager::new(&users)
///     .use_transformer(SoftDelete::new())
///     .to_sql(&mut PostgresRenderer::new())
///     .unwrap();
/// assert_eq!(sql, "SELECT * FROM \"users\" WHERE \"users\".\"deleted_at\" IS NULL");
/// ```
#[derive(Debug, Clone)]
pub struct SoftDelete {
    column: String,
    tables: Option<BTreeSet<String>>,
}

impl Default for SoftDelete {
    fn default() -> Self {
        Self {
            column: String::from("deleted_at"),
            tables: None,
        }
    }
}

impl SoftDelete {
    /// Creates a filter on `deleted_at` for every table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the timestamp column.
    #[must_use]
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }

    /// Restricts the filter to the named tables. Other tables are not
    /// soft-deletable and are left unfiltered.
    #[must_use]
    pub fn only_tables<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tables = Some(tables.into_iter().map(Into::into).collect());
        self
    }

    /// Returns true if rows of `table` are filtered.
    #[must_use]
    pub fn applies_to(&self, table: &str) -> bool {
        self.tables.as_ref().is_none_or(|t| t.contains(table))
    }

    fn filter(&self, relation: &Node) -> Option<Node> {
        let table = relation.underlying_table_name()?;
        if !self.applies_to(table) {
            return None;
        }
        debug!(table, column = %self.column, "hiding soft-deleted rows");
        Some(relation.attr(&self.column).is_null())
    }
}

impl Transformer for SoftDelete {
    fn name(&self) -> &str {
        "soft_delete"
    }

    fn transform_select(&self, mut select: SelectCore) -> Result<SelectCore> {
        for (relation, _) in collect_tables(&select) {
            select.wheres.extend(self.filter(&relation));
        }
        Ok(select)
    }

    fn transform_update(&self, mut update: UpdateStatement) -> Result<UpdateStatement> {
        if let Some(pred) = self.filter(&update.table) {
            update.wheres.push(pred);
        }
        Ok(update)
    }

    fn transform_delete(&self, mut delete: DeleteStatement) -> Result<DeleteStatement> {
        if let Some(pred) = self.filter(&delete.from) {
            delete.wheres.push(pred);
        }
        Ok(delete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relsql_core::{
        DeleteManager, InsertManager, MysqlRenderer, PostgresRenderer, SelectManager,
        UpdateManager, table,
    };

    #[test]
    fn test_select_filters_every_table() {
        let users = table("users");
        let posts = table("posts").aliased("p");
        let (sql, _) = SelectManager::new(&users)
            .join(&posts)
            .on(users.attr("id").eq(posts.attr("author_id")))
            .use_transformer(SoftDelete::new())
            .to_sql(&mut MysqlRenderer::new())
            .unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM `users` INNER JOIN `posts` `p` ON `users`.`id` = `p`.`author_id` \
             WHERE `users`.`deleted_at` IS NULL AND `p`.`deleted_at` IS NULL"
        );
    }

    #[test]
    fn test_allow_list_and_column() {
        let users = table("users");
        let logs = table("logs");
        let (sql, _) = SelectManager::new(&users)
            .cross_join(&logs)
            .use_transformer(SoftDelete::new().column("removed_on").only_tables(["users"]))
            .to_sql(&mut PostgresRenderer::new())
            .unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM \"users\" CROSS JOIN \"logs\" WHERE \"users\".\"removed_on\" IS NULL"
        );
    }

    #[test]
    fn test_update_and_delete_targets() {
        let users = table("users");
        let (sql, _) = UpdateManager::new(&users)
            .set(users.attr("name"), "x")
            .where_clause(users.attr("id").eq(1))
            .use_transformer(SoftDelete::new())
            .to_sql(&mut PostgresRenderer::new())
            .unwrap();
        assert_eq!(
            sql,
            "UPDATE \"users\" SET \"users\".\"name\" = $1 WHERE \"users\".\"id\" = $2 \
             AND \"users\".\"deleted_at\" IS NULL"
        );

        let (sql, _) = DeleteManager::new(&users)
            .use_transformer(SoftDelete::new())
            .to_sql(&mut PostgresRenderer::new())
            .unwrap();
        assert_eq!(sql, "DELETE FROM \"users\" WHERE \"users\".\"deleted_at\" IS NULL");
    }

    #[test]
    fn test_insert_untouched() {
        let users = table("users");
        let (sql, _) = InsertManager::new(&users)
            .columns([users.attr("name")])
            .values(["a"])
            .use_transformer(SoftDelete::new())
            .to_sql(&mut PostgresRenderer::new())
            .unwrap();
        assert_eq!(sql, "INSERT INTO \"users\" (\"name\") VALUES ($1)");
    }

    #[test]
    fn test_subqueries_are_not_filtered() {
        let users = table("users");
        let inner = SelectManager::new(&users).alias("u");
        let (sql, _) = SelectManager::new(inner)
            .use_transformer(SoftDelete::new())
            .to_sql(&mut PostgresRenderer::new())
            .unwrap();
        assert_eq!(sql, "SELECT * FROM (SELECT * FROM \"users\") \"u\"");
    }
}
