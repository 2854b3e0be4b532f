#![allow(dead_code)]

use relsql_core::error::{Result, TransformError};
use relsql_core::transform::{Transformer, collect_tables};
use relsql_core::{
    DeleteStatement, Node, PostgresRenderer, RenderOptions, SelectCore, SelectManager, SqlValue,
    UpdateStatement, table,
};

pub fn users() -> Node {
    table("users")
}

pub fn posts() -> Node {
    table("posts")
}

/// `SELECT * FROM users INNER JOIN posts ON users.id = posts.author_id`.
pub fn users_with_posts() -> SelectManager {
    let users = users();
    let posts = posts();
    SelectManager::new(&users)
        .join(&posts)
        .on(users.attr("id").eq(posts.attr("author_id")))
}

pub fn inline_pg() -> PostgresRenderer {
    PostgresRenderer::with_options(RenderOptions::inline())
}

/// Counts `?` placeholders outside quoted identifiers and strings.
pub fn count_question_marks(sql: &str) -> usize {
    let mut count = 0;
    let mut quote: Option<char> = None;
    for c in sql.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '"' | '`' | '\'' => quote = Some(c),
                '?' => count += 1,
                _ => {}
            },
        }
    }
    count
}

/// Returns the `$N` placeholder numbers in order of appearance.
pub fn dollar_placeholders(sql: &str) -> Vec<usize> {
    let bytes = sql.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'$' {
            let start = i + 1;
            let mut end = start;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
            if end > start {
                out.push(sql[start..end].parse().unwrap());
            }
            i = end.max(start);
        } else {
            i += 1;
        }
    }
    out
}

/// Appends `T.deleted_at IS NULL` for every table.
pub struct SoftDeleteFilter;

impl Transformer for SoftDeleteFilter {
    fn name(&self) -> &str {
        "soft_delete"
    }

    fn transform_select(&self, mut select: SelectCore) -> Result<SelectCore> {
        for (relation, _) in collect_tables(&select) {
            select.wheres.push(relation.attr("deleted_at").is_null());
        }
        Ok(select)
    }

    fn transform_update(&self, mut update: UpdateStatement) -> Result<UpdateStatement> {
        update.wheres.push(update.table.attr("deleted_at").is_null());
        Ok(update)
    }

    fn transform_delete(&self, mut delete: DeleteStatement) -> Result<DeleteStatement> {
        delete.wheres.push(delete.from.attr("deleted_at").is_null());
        Ok(delete)
    }
}

/// Appends `T.tenant_id = <tenant>` for every table.
pub struct TenantFilter(pub i64);

impl Transformer for TenantFilter {
    fn name(&self) -> &str {
        "tenant"
    }

    fn transform_select(&self, mut select: SelectCore) -> Result<SelectCore> {
        for (relation, _) in collect_tables(&select) {
            select
                .wheres
                .push(relation.attr("tenant_id").eq(SqlValue::Int(self.0)));
        }
        Ok(select)
    }
}

/// Rejects every SELECT touching `table`.
pub struct DenyTable(pub &'static str);

impl Transformer for DenyTable {
    fn name(&self) -> &str {
        "deny"
    }

    fn transform_select(&self, select: SelectCore) -> Result<SelectCore> {
        if collect_tables(&select).iter().any(|(_, name)| name == self.0) {
            return Err(TransformError::access_denied(self.0, "blocked by test policy"));
        }
        Ok(select)
    }
}
