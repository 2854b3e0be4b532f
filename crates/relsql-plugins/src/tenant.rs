//! Multi-tenant scoping.

use std::collections::BTreeSet;

use relsql_core::error::{Result, TransformError};
use relsql_core::transform::{Transformer, collect_tables};
use relsql_core::{
    DeleteStatement, InsertStatement, Node, NodeKind, SelectCore, SqlValue, UpdateStatement,
};
use tracing::debug;

/// Restricts statements to one tenant's rows.
///
/// Reads, updates and deletes get `T.tenant_id = <tenant>` for every
/// scoped table. INSERT ... VALUES with an explicit column list gets the
/// tenant column and value appended to each row unless the column is
/// already listed. Positional inserts without a column list are left
/// alone.
///
/// A scope built with [`TenantScope::unscoped`] has no tenant yet and
/// refuses every statement until one is set.
///
/// ```rust
/// use relsql_core::{PostgresRenderer, SelectManager, SqlValue, table};
/// use relsql_plugins::TenantScope;
///
/// let orders = table("orders");
/// let (sql, params) = SelectManager::new(&orders)
///     .use_transformer(TenantScope::new(42))
///     .to_sql(&mut PostgresRenderer::new())
///     .unwrap();
/// assert_eq!(sql, "SELECT * FROM \"orders\" WHERE \"orders\".\"tenant_id\" = $1");
/// assert_eq!(params, Some(vec![SqlValue::Int(42)]));
/// ```
#[derive(Debug, Clone)]
pub struct TenantScope {
    column: String,
    tenant: Option<SqlValue>,
    tables: Option<BTreeSet<String>>,
}

impl TenantScope {
    /// Creates a scope for `tenant` on the `tenant_id` column.
    #[must_use]
    pub fn new(tenant: impl Into<SqlValue>) -> Self {
        Self::unscoped().tenant(tenant)
    }

    /// Creates a scope without a tenant.
    #[must_use]
    pub fn unscoped() -> Self {
        Self {
            column: String::from("tenant_id"),
            tenant: None,
            tables: None,
        }
    }

    /// Sets the tenant. A null tenant counts as missing.
    #[must_use]
    pub fn tenant(mut self, tenant: impl Into<SqlValue>) -> Self {
        self.tenant = Some(tenant.into()).filter(|t| !t.is_null());
        self
    }

    /// Sets the tenant column.
    #[must_use]
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }

    /// Restricts scoping to the named tables. Shared tables outside the
    /// list are left unfiltered.
    #[must_use]
    pub fn only_tables<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tables = Some(tables.into_iter().map(Into::into).collect());
        self
    }

    /// Returns true if `table` is scoped.
    #[must_use]
    pub fn applies_to(&self, table: &str) -> bool {
        self.tables.as_ref().is_none_or(|t| t.contains(table))
    }

    fn current_tenant(&self) -> Result<&SqlValue> {
        self.tenant.as_ref().ok_or_else(|| {
            TransformError::MissingConfiguration(format!(
                "tenant scope on column '{}' has no tenant",
                self.column
            ))
        })
    }

    fn predicate(&self, relation: &Node) -> Result<Option<Node>> {
        let Some(table) = relation.underlying_table_name() else {
            return Ok(None);
        };
        if !self.applies_to(table) {
            return Ok(None);
        }
        let tenant = self.current_tenant()?;
        debug!(table, column = %self.column, "scoping to tenant");
        Ok(Some(relation.attr(&self.column).eq(Node::bind(tenant.clone()))))
    }

    fn lists_column(&self, columns: &[Node]) -> bool {
        columns
            .iter()
            .any(|c| matches!(c.kind(), NodeKind::Attribute(a) if a.name == self.column))
    }
}

impl Transformer for TenantScope {
    fn name(&self) -> &str {
        "tenant_scope"
    }

    fn transform_select(&self, mut select: SelectCore) -> Result<SelectCore> {
        for (relation, _) in collect_tables(&select) {
            if let Some(pred) = self.predicate(&relation)? {
                select.wheres.push(pred);
            }
        }
        Ok(select)
    }

    fn transform_insert(&self, mut insert: InsertStatement) -> Result<InsertStatement> {
        let Some(table) = insert.into.underlying_table_name() else {
            return Ok(insert);
        };
        if !self.applies_to(table)
            || insert.select.is_some()
            || insert.values.is_empty()
            || insert.columns.is_empty()
            || self.lists_column(&insert.columns)
        {
            return Ok(insert);
        }
        let tenant = self.current_tenant()?;
        debug!(
            table,
            column = %self.column,
            rows = insert.values.len(),
            "stamping tenant on insert"
        );
        insert.columns.push(insert.into.attr(&self.column));
        for row in &mut insert.values {
            row.push(Node::bind(tenant.clone()));
        }
        Ok(insert)
    }

    fn transform_update(&self, mut update: UpdateStatement) -> Result<UpdateStatement> {
        if let Some(pred) = self.predicate(&update.table)? {
            update.wheres.push(pred);
        }
        Ok(update)
    }

    fn transform_delete(&self, mut delete: DeleteStatement) -> Result<DeleteStatement> {
        if let Some(pred) = self.predicate(&delete.from)? {
            delete.wheres.push(pred);
        }
        Ok(delete)
    }
}
