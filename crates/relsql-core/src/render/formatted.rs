//! Multi-line SQL output.

use crate::ast::{
    ComparisonOp, DeleteStatement, InsertStatement, Node, SelectCore, SetOperation,
    UpdateStatement,
};

use super::{RenderState, Renderer, sanitize_comment};

/// Wraps a dialect renderer and lays statements out over several lines.
///
/// Quoting, placeholders, parameter state and comparison spelling all
/// come from the inner renderer; only the five statement methods are
/// overridden. List continuations start with a tab and a leading comma,
/// boolean continuations with a tab and `AND `.
///
/// ```rust
/// use relsql_core::{FormattedRenderer, PostgresRenderer, SelectManager, table};
///
/// let users = table("users");
/// let query = SelectManager::new(&users)
///     .project([users.attr("id"), users.attr("name")])
///     .where_clause(users.attr("active").eq(true));
///
/// let mut r = FormattedRenderer::new(PostgresRenderer::new());
/// let (sql, _) = query.to_sql(&mut r).unwrap();
/// assert_eq!(
///     sql,
///     "SELECT \"users\".\"id\"\n\t,\"users\".\"name\"\nFROM \"users\"\nWHERE \"users\".\"active\" = $1"
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct FormattedRenderer<R> {
    inner: R,
}

impl<R: Renderer> FormattedRenderer<R> {
    /// Wraps `inner`.
    #[must_use]
    pub const fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Returns the wrapped renderer.
    #[must_use]
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// `KEYWORD first` followed by `\t,item` lines.
    fn comma_block(&mut self, keyword: &str, items: &[Node]) -> String {
        let rendered: Vec<String> = items.iter().map(|n| self.render(n)).collect();
        continuation_block(keyword, &rendered, "\t,")
    }

    /// `KEYWORD first` followed by `\tAND item` lines.
    fn and_block(&mut self, keyword: &str, items: &[Node]) -> String {
        let rendered: Vec<String> = items.iter().map(|n| self.render(n)).collect();
        continuation_block(keyword, &rendered, "\tAND ")
    }
}

fn continuation_block(keyword: &str, items: &[String], prefix: &str) -> String {
    let mut out = String::from(keyword);
    for (i, item) in items.iter().enumerate() {
        if i == 0 {
            if !keyword.is_empty() {
                out.push(' ');
            }
        } else {
            out.push('\n');
            out.push_str(prefix);
        }
        out.push_str(item);
    }
    out
}

fn indent(block: &str) -> String {
    block
        .lines()
        .map(|line| format!("\t{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

impl<R: Renderer> Renderer for FormattedRenderer<R> {
    fn dialect_name(&self) -> &'static str {
        self.inner.dialect_name()
    }

    fn quote_identifier(&self, name: &str) -> String {
        self.inner.quote_identifier(name)
    }

    fn placeholder(&self, index: usize) -> String {
        self.inner.placeholder(index)
    }

    fn state(&self) -> &RenderState {
        self.inner.state()
    }

    fn state_mut(&mut self) -> &mut RenderState {
        self.inner.state_mut()
    }

    fn render_comparison(&mut self, op: ComparisonOp, left: &str, right: &str) -> String {
        self.inner.render_comparison(op, left, right)
    }

    fn visit_select(&mut self, select: &SelectCore) -> String {
        let mut lines = Vec::new();
        if let Some(with) = self.render_with(&select.ctes) {
            lines.push(with);
        }
        if let Some(comment) = &select.comment {
            lines.push(format!("/* {} */", sanitize_comment(comment)));
        }
        let head = self.render_select_head(select);
        if select.projections.is_empty() {
            lines.push(format!("{head} *"));
        } else {
            lines.push(self.comma_block(&head, &select.projections));
        }
        if let Some(from) = &select.from {
            lines.push(format!("FROM {}", self.render_operand(from)));
        }
        for join in &select.joins {
            lines.push(self.visit_join(join));
        }
        if !select.wheres.is_empty() {
            lines.push(self.and_block("WHERE", &select.wheres));
        }
        if !select.groups.is_empty() {
            lines.push(self.comma_block("GROUP BY", &select.groups));
        }
        if !select.havings.is_empty() {
            lines.push(self.and_block("HAVING", &select.havings));
        }
        if !select.windows.is_empty() {
            let windows: Vec<String> = select.windows.iter().map(|w| self.visit_window(w)).collect();
            lines.push(continuation_block("WINDOW", &windows, "\t,"));
        }
        if !select.orders.is_empty() {
            lines.push(self.comma_block("ORDER BY", &select.orders));
        }
        if let Some(limit) = &select.limit {
            lines.push(format!("LIMIT {}", self.render(limit)));
        }
        if let Some(offset) = &select.offset {
            lines.push(format!("OFFSET {}", self.render(offset)));
        }
        if let Some(lock) = self.render_lock(select) {
            lines.push(lock);
        }
        lines.join("\n")
    }

    fn visit_set_operation(&mut self, node: &SetOperation) -> String {
        let left = self.render(&node.left);
        let right = self.render(&node.right);
        let mut lines = vec![
            String::from("("),
            indent(&left),
            String::from(")"),
            String::from(node.op.as_str()),
            String::from("("),
            indent(&right),
            String::from(")"),
        ];
        if !node.orders.is_empty() {
            lines.push(self.comma_block("ORDER BY", &node.orders));
        }
        if let Some(limit) = &node.limit {
            lines.push(format!("LIMIT {}", self.render(limit)));
        }
        if let Some(offset) = &node.offset {
            lines.push(format!("OFFSET {}", self.render(offset)));
        }
        lines.join("\n")
    }

    fn visit_insert(&mut self, insert: &InsertStatement) -> String {
        let mut head = format!("INSERT INTO {}", self.render(&insert.into));
        if !insert.columns.is_empty() {
            head.push(' ');
            head.push_str(&self.render_column_list(&insert.columns));
        }
        let mut lines = vec![head];
        if let Some(select) = &insert.select {
            lines.push(self.render(select));
        } else if insert.values.is_empty() {
            lines.push(String::from("DEFAULT VALUES"));
        } else {
            let rows: Vec<String> = insert
                .values
                .iter()
                .map(|row| self.render_values_row(row))
                .collect();
            lines.push(continuation_block("VALUES", &rows, "\t,"));
        }
        if let Some(conflict) = &insert.on_conflict {
            lines.push(self.visit_on_conflict(conflict));
        }
        if !insert.returning.is_empty() {
            lines.push(self.comma_block("RETURNING", &insert.returning));
        }
        lines.join("\n")
    }

    fn visit_update(&mut self, update: &UpdateStatement) -> String {
        let mut lines = vec![format!("UPDATE {}", self.render(&update.table))];
        let sets: Vec<String> = update
            .assignments
            .iter()
            .map(|a| self.visit_assignment(a))
            .collect();
        lines.push(continuation_block("SET", &sets, "\t,"));
        if !update.wheres.is_empty() {
            lines.push(self.and_block("WHERE", &update.wheres));
        }
        if !update.returning.is_empty() {
            lines.push(self.comma_block("RETURNING", &update.returning));
        }
        lines.join("\n")
    }

    fn visit_delete(&mut self, delete: &DeleteStatement) -> String {
        let mut lines = vec![format!("DELETE FROM {}", self.render(&delete.from))];
        if !delete.wheres.is_empty() {
            lines.push(self.and_block("WHERE", &delete.wheres));
        }
        if !delete.returning.is_empty() {
            lines.push(self.comma_block("RETURNING", &delete.returning));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Assignment, SetOpType};
    use crate::dialect::{MysqlRenderer, PostgresRenderer};
    use crate::render::RenderOptions;

    #[test]
    fn test_continuation_block() {
        let items = vec![String::from("a"), String::from("b"), String::from("c")];
        assert_eq!(continuation_block("SELECT", &items, "\t,"), "SELECT a\n\t,b\n\t,c");
        assert_eq!(continuation_block("WHERE", &items[..1], "\tAND "), "WHERE a");
    }

    #[test]
    fn test_formatted_select() {
        let users = Node::table("users");
        let mut select = SelectCore::from_relation(&users);
        select.wheres.push(users.attr("active").eq(true));
        select.wheres.push(users.attr("age").gt(18));
        select.orders.push(users.attr("name").asc());

        let mut r = FormattedRenderer::new(PostgresRenderer::with_options(RenderOptions::inline()));
        assert_eq!(
            r.visit_select(&select),
            "SELECT *\nFROM \"users\"\nWHERE \"users\".\"active\" = TRUE\n\tAND \"users\".\"age\" > 18\nORDER BY \"users\".\"name\" ASC"
        );
    }

    #[test]
    fn test_formatted_update_delegates_dialect() {
        let users = Node::table("users");
        let mut update = UpdateStatement::new(&users);
        update.assignments.push(Assignment::new(users.attr("name"), "x"));
        update.assignments.push(Assignment::new(users.attr("age"), 3));
        update.wheres.push(users.attr("id").eq(1));

        let mut r = FormattedRenderer::new(MysqlRenderer::new());
        assert_eq!(
            r.visit_update(&update),
            "UPDATE `users`\nSET `users`.`name` = ?\n\t,`users`.`age` = ?\nWHERE `users`.`id` = ?"
        );
        assert_eq!(r.state().params().len(), 3);
    }

    #[test]
    fn test_formatted_set_operation() {
        let a = SelectCore::from_relation(Node::table("a"));
        let b = SelectCore::from_relation(Node::table("b"));
        let op = SetOperation::new(a, SetOpType::Union, b);
        let mut r = FormattedRenderer::new(PostgresRenderer::new());
        assert_eq!(
            r.visit_set_operation(&op),
            "(\n\tSELECT *\n\tFROM \"a\"\n)\nUNION\n(\n\tSELECT *\n\tFROM \"b\"\n)"
        );
    }
}
