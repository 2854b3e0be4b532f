//! Rendering an AST to SQL.
//!
//! [`Renderer`] has one `visit_*` method per node variant. Every method
//! has a default that produces the common (PostgreSQL-style) output and
//! recurses through `self.render(child)`, so a dialect that overrides a
//! method sees the override used for nested nodes as well. Dialects only
//! supply quoting, placeholders, per-render state, and the comparison
//! operators whose spelling differs.

mod formatted;
mod graph;

pub use formatted::FormattedRenderer;
pub use graph::{Attribution, GraphRenderer};

use serde::{Deserialize, Serialize};

use crate::ast::validate::{assert_function_name, assert_type_name};
use crate::ast::{
    Aggregate, Alias, Assignment, Attribute, Between, Case, Casted, Comparison, ComparisonOp,
    ConflictAction, Cte, DeleteStatement, Exists, Extract, FrameBound, GroupingSet,
    GroupingSetKind, In, Infix, InsertStatement, Join, JoinType, NamedFunction, Node, NodeKind,
    OnConflict, Ordering, Over, OverWindow, RawFragment, SelectCore, SetOperation, SqlValue, Star,
    Table, TableAlias, UnaryMath, UnaryPredicate, UpdateStatement, WindowDefinition, WindowFrame,
};

/// Renderer options.
///
/// ```rust
/// use relsql_core::RenderOptions;
///
/// let opts: RenderOptions = serde_json::from_str("{}").unwrap();
/// assert!(opts.parameterise);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Emit placeholders and collect values separately.
    ///
    /// **Warning**: turning this off interpolates values into the SQL
    /// text and disables SQL-injection protection. Use it for debugging
    /// and inspection only.
    pub parameterise: bool,
}

impl RenderOptions {
    /// Options with parameterisation switched off.
    #[must_use]
    pub const fn inline() -> Self {
        Self {
            parameterise: false,
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { parameterise: true }
    }
}

/// Mutable per-render state: the collected parameters and the index of
/// the last placeholder emitted.
#[derive(Debug, Clone)]
pub struct RenderState {
    params: Vec<SqlValue>,
    index: usize,
    parameterise: bool,
}

impl Default for RenderState {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}

impl RenderState {
    /// Creates empty state.
    #[must_use]
    pub const fn new(options: RenderOptions) -> Self {
        Self {
            params: Vec::new(),
            index: 0,
            parameterise: options.parameterise,
        }
    }

    /// Clears parameters and restarts numbering.
    pub fn reset(&mut self) {
        self.params.clear();
        self.index = 0;
    }

    /// Records a parameter and returns its 1-based index.
    pub fn push(&mut self, value: SqlValue) -> usize {
        self.params.push(value);
        self.index += 1;
        self.index
    }

    /// Returns the parameters collected so far, in encounter order.
    #[must_use]
    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }

    /// Returns the index of the last placeholder emitted.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Returns true when values become placeholders.
    #[must_use]
    pub const fn is_parameterised(&self) -> bool {
        self.parameterise
    }
}

/// Rewrites `*/` so caller text cannot close a block comment early.
#[must_use]
pub fn sanitize_comment(text: &str) -> String {
    text.replace("*/", "* /")
}

/// Renders a comparison the way PostgreSQL spells it.
#[must_use]
pub fn common_comparison(op: ComparisonOp, left: &str, right: &str) -> String {
    match op {
        ComparisonOp::CaseInsensitiveEq => format!("LOWER({left}) = LOWER({right})"),
        _ => format!("{left} {} {right}", op.as_str()),
    }
}

/// A SQL renderer.
///
/// Implementors provide the five required methods; everything else has
/// a default. The trait is object safe, so `Box<dyn Renderer>` works
/// wherever a renderer is expected.
pub trait Renderer {
    /// Returns the dialect name.
    fn dialect_name(&self) -> &'static str;

    /// Quotes an identifier.
    fn quote_identifier(&self, name: &str) -> String;

    /// Formats the placeholder for the 1-based parameter `index`.
    fn placeholder(&self, index: usize) -> String;

    /// Returns the per-render state.
    fn state(&self) -> &RenderState;

    /// Returns the per-render state mutably.
    fn state_mut(&mut self) -> &mut RenderState;

    /// Renders `left op right` from already-rendered operands.
    ///
    /// This is the dialect hook: only the regex and case-sensitivity
    /// operators differ between dialects.
    fn render_comparison(&mut self, op: ComparisonOp, left: &str, right: &str) -> String {
        common_comparison(op, left, right)
    }

    /// Clears per-render state.
    fn reset(&mut self) {
        self.state_mut().reset();
    }

    /// Renders any node.
    fn render(&mut self, node: &Node) -> String {
        match node.kind() {
            NodeKind::Table(t) => self.visit_table(t),
            NodeKind::TableAlias(a) => self.visit_table_alias(a),
            NodeKind::Attribute(a) => self.visit_attribute(a),
            NodeKind::Star(s) => self.visit_star(s),
            NodeKind::Literal(v) => self.visit_literal(v),
            NodeKind::BindParam(v) => self.visit_bind_param(v),
            NodeKind::Casted(c) => self.visit_casted(c),
            NodeKind::Raw(r) => self.visit_raw(r),
            NodeKind::Comparison(c) => self.visit_comparison(c),
            NodeKind::UnaryPredicate(p) => self.visit_unary_predicate(p),
            NodeKind::And(l, r) => self.visit_and(l, r),
            NodeKind::Or(l, r) => self.visit_or(l, r),
            NodeKind::Not(e) => self.visit_not(e),
            NodeKind::Grouping(e) => self.visit_grouping(e),
            NodeKind::In(i) => self.visit_in(i),
            NodeKind::Between(b) => self.visit_between(b),
            NodeKind::Exists(e) => self.visit_exists(e),
            NodeKind::Infix(i) => self.visit_infix(i),
            NodeKind::UnaryMath(u) => self.visit_unary_math(u),
            NodeKind::NamedFunction(f) => self.visit_named_function(f),
            NodeKind::Aggregate(a) => self.visit_aggregate(a),
            NodeKind::Extract(e) => self.visit_extract(e),
            NodeKind::Ordering(o) => self.visit_ordering(o),
            NodeKind::Window(w) => self.visit_window(w),
            NodeKind::Over(o) => self.visit_over(o),
            NodeKind::Alias(a) => self.visit_alias(a),
            NodeKind::Case(c) => self.visit_case(c),
            NodeKind::GroupingSet(g) => self.visit_grouping_set(g),
            NodeKind::SetOperation(s) => self.visit_set_operation(s),
            NodeKind::Cte(c) => self.visit_cte(c),
            NodeKind::Assignment(a) => self.visit_assignment(a),
            NodeKind::Join(j) => self.visit_join(j),
            NodeKind::Select(s) => self.visit_select(s),
            NodeKind::Insert(s) => self.visit_insert(s),
            NodeKind::Update(s) => self.visit_update(s),
            NodeKind::Delete(s) => self.visit_delete(s),
        }
    }

    /// Renders a node in expression position: queries are wrapped in
    /// parentheses.
    fn render_operand(&mut self, node: &Node) -> String {
        if node.is_query() {
            format!("({})", self.render(node))
        } else {
            self.render(node)
        }
    }

    /// Renders `nodes` joined by `sep`.
    fn render_list(&mut self, nodes: &[Node], sep: &str) -> String {
        let parts: Vec<String> = nodes.iter().map(|n| self.render(n)).collect();
        parts.join(sep)
    }

    /// Renders a value as a placeholder or inline literal. NULL is
    /// always the keyword and never takes a parameter slot.
    fn render_value(&mut self, value: &SqlValue) -> String {
        if value.is_null() {
            return String::from("NULL");
        }
        if self.state().is_parameterised() {
            let index = self.state_mut().push(value.clone());
            self.placeholder(index)
        } else {
            value.to_sql_inline()
        }
    }

    /// Renders a column name without its relation.
    fn render_unqualified(&mut self, column: &Node) -> String {
        match column.kind() {
            NodeKind::Attribute(a) => self.quote_identifier(&a.name),
            _ => self.render(column),
        }
    }

    fn visit_table(&mut self, table: &Table) -> String {
        self.quote_identifier(&table.name)
    }

    fn visit_table_alias(&mut self, alias: &TableAlias) -> String {
        let relation = self.render_operand(&alias.relation);
        format!("{relation} {}", self.quote_identifier(&alias.alias))
    }

    fn visit_attribute(&mut self, attr: &Attribute) -> String {
        match attr.relation.relation_name() {
            Some(rel) => format!(
                "{}.{}",
                self.quote_identifier(rel),
                self.quote_identifier(&attr.name)
            ),
            None => self.quote_identifier(&attr.name),
        }
    }

    fn visit_star(&mut self, star: &Star) -> String {
        match star.relation.as_ref().and_then(Node::relation_name) {
            Some(rel) => format!("{}.*", self.quote_identifier(rel)),
            None => String::from("*"),
        }
    }

    fn visit_literal(&mut self, value: &SqlValue) -> String {
        self.render_value(value)
    }

    fn visit_bind_param(&mut self, value: &SqlValue) -> String {
        self.render_value(value)
    }

    fn visit_casted(&mut self, casted: &Casted) -> String {
        assert_type_name(&casted.type_name);
        let value = self.render_value(&casted.value);
        format!("CAST({value} AS {})", casted.type_name)
    }

    fn visit_raw(&mut self, raw: &RawFragment) -> String {
        if self.state().is_parameterised() {
            for bind in &raw.binds {
                self.state_mut().push(bind.clone());
            }
        }
        raw.sql.clone()
    }

    fn visit_comparison(&mut self, cmp: &Comparison) -> String {
        let left = self.render_operand(&cmp.left);
        let right = self.render_operand(&cmp.right);
        self.render_comparison(cmp.op, &left, &right)
    }

    fn visit_unary_predicate(&mut self, pred: &UnaryPredicate) -> String {
        let expr = self.render_operand(&pred.expr);
        format!("{expr} {}", pred.op.as_str())
    }

    fn visit_and(&mut self, left: &Node, right: &Node) -> String {
        let l = self.render(left);
        let r = self.render(right);
        format!("{l} AND {r}")
    }

    fn visit_or(&mut self, left: &Node, right: &Node) -> String {
        let l = self.render(left);
        let r = self.render(right);
        format!("{l} OR {r}")
    }

    fn visit_not(&mut self, expr: &Node) -> String {
        format!("NOT ({})", self.render(expr))
    }

    fn visit_grouping(&mut self, expr: &Node) -> String {
        format!("({})", self.render(expr))
    }

    fn visit_in(&mut self, node: &In) -> String {
        if node.values.is_empty() {
            return String::from(if node.negated { "1=1" } else { "1=0" });
        }
        let expr = self.render_operand(&node.expr);
        let values = match node.values.as_slice() {
            [single] => self.render(single),
            many => {
                let parts: Vec<String> = many.iter().map(|v| self.render_operand(v)).collect();
                parts.join(", ")
            }
        };
        let op = if node.negated { "NOT IN" } else { "IN" };
        format!("{expr} {op} ({values})")
    }

    fn visit_between(&mut self, node: &Between) -> String {
        let expr = self.render_operand(&node.expr);
        let low = self.render_operand(&node.low);
        let high = self.render_operand(&node.high);
        let op = if node.negated { "NOT BETWEEN" } else { "BETWEEN" };
        format!("{expr} {op} {low} AND {high}")
    }

    fn visit_exists(&mut self, node: &Exists) -> String {
        let query = self.render(&node.subquery);
        let op = if node.negated { "NOT EXISTS" } else { "EXISTS" };
        format!("{op} ({query})")
    }

    fn visit_infix(&mut self, node: &Infix) -> String {
        let left = render_arithmetic_operand(self, &node.left);
        let right = render_arithmetic_operand(self, &node.right);
        format!("{left} {} {right}", node.op.as_str())
    }

    fn visit_unary_math(&mut self, node: &UnaryMath) -> String {
        let expr = render_arithmetic_operand(self, &node.expr);
        format!("{}{expr}", node.op.as_str())
    }

    fn visit_named_function(&mut self, func: &NamedFunction) -> String {
        assert_function_name(&func.name);
        let args = self.render_list(&func.args, ", ");
        let distinct = if func.distinct { "DISTINCT " } else { "" };
        format!("{}({distinct}{args})", func.name)
    }

    fn visit_aggregate(&mut self, agg: &Aggregate) -> String {
        let arg = match &agg.expr {
            Some(e) => self.render(e),
            None => String::from("*"),
        };
        let distinct = if agg.distinct { "DISTINCT " } else { "" };
        let mut sql = format!("{}({distinct}{arg})", agg.func.as_str());
        if let Some(filter) = &agg.filter {
            sql.push_str(&format!(" FILTER (WHERE {})", self.render(filter)));
        }
        sql
    }

    fn visit_extract(&mut self, node: &Extract) -> String {
        let expr = self.render(&node.expr);
        format!("EXTRACT({} FROM {expr})", node.field.as_str())
    }

    fn visit_ordering(&mut self, node: &Ordering) -> String {
        let expr = self.render_operand(&node.expr);
        let mut sql = format!("{expr} {}", node.direction.as_str());
        let nulls = node.nulls.as_str();
        if !nulls.is_empty() {
            sql.push(' ');
            sql.push_str(nulls);
        }
        sql
    }

    /// Renders the body of a window: `PARTITION BY ... ORDER BY ... frame`.
    fn visit_window_definition(&mut self, def: &WindowDefinition) -> String {
        let mut parts = Vec::new();
        if !def.partition_by.is_empty() {
            parts.push(format!(
                "PARTITION BY {}",
                self.render_list(&def.partition_by, ", ")
            ));
        }
        if !def.order_by.is_empty() {
            parts.push(format!("ORDER BY {}", self.render_list(&def.order_by, ", ")));
        }
        if let Some(frame) = &def.frame {
            parts.push(self.visit_window_frame(frame));
        }
        parts.join(" ")
    }

    fn visit_window_frame(&mut self, frame: &WindowFrame) -> String {
        let start = self.visit_frame_bound(&frame.start);
        match &frame.end {
            Some(end) => {
                let end = self.visit_frame_bound(end);
                format!("{} BETWEEN {start} AND {end}", frame.frame_type.as_str())
            }
            None => format!("{} {start}", frame.frame_type.as_str()),
        }
    }

    fn visit_frame_bound(&mut self, bound: &FrameBound) -> String {
        match bound.offset() {
            Some(offset) => format!("{} {}", self.render(offset), bound.keyword()),
            None => String::from(bound.keyword()),
        }
    }

    /// Renders a window as a `WINDOW` clause entry: `"w" AS (...)`.
    /// Anonymous windows render as the parenthesised body.
    fn visit_window(&mut self, def: &WindowDefinition) -> String {
        let body = self.visit_window_definition(def);
        match &def.name {
            Some(name) => format!("{} AS ({body})", self.quote_identifier(name)),
            None => format!("({body})"),
        }
    }

    fn visit_over(&mut self, node: &Over) -> String {
        let expr = self.render(&node.expr);
        match &node.window {
            OverWindow::Inline(def) => {
                let body = self.visit_window_definition(def);
                format!("{expr} OVER ({body})")
            }
            OverWindow::Named(name) => format!("{expr} OVER {}", self.quote_identifier(name)),
        }
    }

    fn visit_alias(&mut self, node: &Alias) -> String {
        let expr = self.render_operand(&node.expr);
        format!("{expr} AS {}", self.quote_identifier(&node.name))
    }

    fn visit_case(&mut self, node: &Case) -> String {
        let mut sql = String::from("CASE");
        if let Some(operand) = &node.operand {
            sql.push(' ');
            sql.push_str(&self.render_operand(operand));
        }
        for (when, then) in &node.whens {
            let when = self.render_operand(when);
            let then = self.render_operand(then);
            sql.push_str(&format!(" WHEN {when} THEN {then}"));
        }
        if let Some(default) = &node.default {
            sql.push_str(&format!(" ELSE {}", self.render_operand(default)));
        }
        sql.push_str(" END");
        sql
    }

    fn visit_grouping_set(&mut self, node: &GroupingSet) -> String {
        match node.kind {
            GroupingSetKind::Cube | GroupingSetKind::Rollup => {
                let cols = self.render_list(&node.columns, ", ");
                format!("{}({cols})", node.kind.as_str())
            }
            GroupingSetKind::GroupingSets => {
                let sets: Vec<String> = node
                    .sets
                    .iter()
                    .map(|set| format!("({})", self.render_list(set, ", ")))
                    .collect();
                format!("{}({})", node.kind.as_str(), sets.join(", "))
            }
        }
    }

    fn visit_set_operation(&mut self, node: &SetOperation) -> String {
        let left = self.render(&node.left);
        let right = self.render(&node.right);
        let mut sql = format!("({left}) {} ({right})", node.op.as_str());
        if !node.orders.is_empty() {
            sql.push_str(&format!(" ORDER BY {}", self.render_list(&node.orders, ", ")));
        }
        if let Some(limit) = &node.limit {
            sql.push_str(&format!(" LIMIT {}", self.render(limit)));
        }
        if let Some(offset) = &node.offset {
            sql.push_str(&format!(" OFFSET {}", self.render(offset)));
        }
        sql
    }

    fn visit_cte(&mut self, cte: &Cte) -> String {
        let mut sql = self.quote_identifier(&cte.name);
        if !cte.columns.is_empty() {
            let cols: Vec<String> = cte.columns.iter().map(|c| self.quote_identifier(c)).collect();
            sql.push_str(&format!(" ({})", cols.join(", ")));
        }
        let query = self.render(&cte.query);
        sql.push_str(&format!(" AS ({query})"));
        sql
    }

    /// Renders `column = value`. The column keeps its relation.
    fn visit_assignment(&mut self, node: &Assignment) -> String {
        let left = self.render(&node.left);
        let right = self.render_operand(&node.right);
        format!("{left} = {right}")
    }

    fn visit_join(&mut self, join: &Join) -> String {
        if join.join_type == JoinType::String {
            return self.render(&join.right);
        }
        let mut sql = String::from(join.join_type.as_str());
        if join.lateral {
            sql.push_str(" LATERAL");
        }
        sql.push(' ');
        sql.push_str(&self.render_operand(&join.right));
        if let Some(on) = &join.on {
            sql.push_str(&format!(" ON {}", self.render(on)));
        }
        sql
    }

    /// Renders the `WITH` prefix, or `None` without CTEs.
    fn render_with(&mut self, ctes: &[Cte]) -> Option<String> {
        if ctes.is_empty() {
            return None;
        }
        let keyword = if ctes.iter().any(|c| c.recursive) {
            "WITH RECURSIVE"
        } else {
            "WITH"
        };
        let parts: Vec<String> = ctes.iter().map(|c| self.visit_cte(c)).collect();
        Some(format!("{keyword} {}", parts.join(", ")))
    }

    /// Renders `SELECT [hints] [DISTINCT ...]` up to the projections.
    fn render_select_head(&mut self, select: &SelectCore) -> String {
        let mut head = String::from("SELECT");
        if !select.hints.is_empty() {
            head.push_str(&format!(" /*+ {} */", sanitize_comment(&select.hints.join(" "))));
        }
        if !select.distinct_on.is_empty() {
            let cols = self.render_list(&select.distinct_on, ", ");
            head.push_str(&format!(" DISTINCT ON ({cols})"));
        } else if select.distinct {
            head.push_str(" DISTINCT");
        }
        head
    }

    /// Renders the lock clause, or `None` without one.
    fn render_lock(&mut self, select: &SelectCore) -> Option<String> {
        let lock = select.lock?;
        let mut sql = String::from(lock.as_str());
        if select.skip_locked {
            sql.push_str(" SKIP LOCKED");
        }
        Some(sql)
    }

    fn visit_select(&mut self, select: &SelectCore) -> String {
        let mut parts = Vec::new();
        if let Some(with) = self.render_with(&select.ctes) {
            parts.push(with);
        }
        if let Some(comment) = &select.comment {
            parts.push(format!("/* {} */", sanitize_comment(comment)));
        }
        parts.push(self.render_select_head(select));
        if select.projections.is_empty() {
            parts.push(String::from("*"));
        } else {
            parts.push(self.render_list(&select.projections, ", "));
        }
        if let Some(from) = &select.from {
            parts.push(format!("FROM {}", self.render_operand(from)));
        }
        for join in &select.joins {
            parts.push(self.visit_join(join));
        }
        if !select.wheres.is_empty() {
            parts.push(format!("WHERE {}", self.render_list(&select.wheres, " AND ")));
        }
        if !select.groups.is_empty() {
            parts.push(format!("GROUP BY {}", self.render_list(&select.groups, ", ")));
        }
        if !select.havings.is_empty() {
            parts.push(format!("HAVING {}", self.render_list(&select.havings, " AND ")));
        }
        if !select.windows.is_empty() {
            let windows: Vec<String> = select.windows.iter().map(|w| self.visit_window(w)).collect();
            parts.push(format!("WINDOW {}", windows.join(", ")));
        }
        if !select.orders.is_empty() {
            parts.push(format!("ORDER BY {}", self.render_list(&select.orders, ", ")));
        }
        if let Some(limit) = &select.limit {
            parts.push(format!("LIMIT {}", self.render(limit)));
        }
        if let Some(offset) = &select.offset {
            parts.push(format!("OFFSET {}", self.render(offset)));
        }
        if let Some(lock) = self.render_lock(select) {
            parts.push(lock);
        }
        parts.join(" ")
    }

    /// Renders `("a", "b")` from column nodes, unqualified.
    fn render_column_list(&mut self, columns: &[Node]) -> String {
        let cols: Vec<String> = columns.iter().map(|c| self.render_unqualified(c)).collect();
        format!("({})", cols.join(", "))
    }

    /// Renders one `VALUES` row.
    fn render_values_row(&mut self, row: &[Node]) -> String {
        let values: Vec<String> = row.iter().map(|v| self.render_operand(v)).collect();
        format!("({})", values.join(", "))
    }

    fn visit_on_conflict(&mut self, conflict: &OnConflict) -> String {
        let mut sql = String::from("ON CONFLICT");
        if !conflict.columns.is_empty() {
            sql.push(' ');
            sql.push_str(&self.render_column_list(&conflict.columns));
        }
        match &conflict.action {
            ConflictAction::DoNothing => sql.push_str(" DO NOTHING"),
            ConflictAction::DoUpdate {
                assignments,
                wheres,
            } => {
                let sets: Vec<String> =
                    assignments.iter().map(|a| self.visit_assignment(a)).collect();
                sql.push_str(&format!(" DO UPDATE SET {}", sets.join(", ")));
                if !wheres.is_empty() {
                    sql.push_str(&format!(" WHERE {}", self.render_list(wheres, " AND ")));
                }
            }
        }
        sql
    }

    fn visit_insert(&mut self, insert: &InsertStatement) -> String {
        let mut parts = vec![format!("INSERT INTO {}", self.render(&insert.into))];
        if !insert.columns.is_empty() {
            parts.push(self.render_column_list(&insert.columns));
        }
        if let Some(select) = &insert.select {
            parts.push(self.render(select));
        } else if insert.values.is_empty() {
            parts.push(String::from("DEFAULT VALUES"));
        } else {
            let rows: Vec<String> = insert
                .values
                .iter()
                .map(|row| self.render_values_row(row))
                .collect();
            parts.push(format!("VALUES {}", rows.join(", ")));
        }
        if let Some(conflict) = &insert.on_conflict {
            parts.push(self.visit_on_conflict(conflict));
        }
        if !insert.returning.is_empty() {
            parts.push(format!(
                "RETURNING {}",
                self.render_list(&insert.returning, ", ")
            ));
        }
        parts.join(" ")
    }

    fn visit_update(&mut self, update: &UpdateStatement) -> String {
        let mut parts = vec![format!("UPDATE {}", self.render(&update.table))];
        let sets: Vec<String> = update
            .assignments
            .iter()
            .map(|a| self.visit_assignment(a))
            .collect();
        parts.push(format!("SET {}", sets.join(", ")));
        if !update.wheres.is_empty() {
            parts.push(format!("WHERE {}", self.render_list(&update.wheres, " AND ")));
        }
        if !update.returning.is_empty() {
            parts.push(format!(
                "RETURNING {}",
                self.render_list(&update.returning, ", ")
            ));
        }
        parts.join(" ")
    }

    fn visit_delete(&mut self, delete: &DeleteStatement) -> String {
        let mut parts = vec![format!("DELETE FROM {}", self.render(&delete.from))];
        if !delete.wheres.is_empty() {
            parts.push(format!("WHERE {}", self.render_list(&delete.wheres, " AND ")));
        }
        if !delete.returning.is_empty() {
            parts.push(format!(
                "RETURNING {}",
                self.render_list(&delete.returning, ", ")
            ));
        }
        parts.join(" ")
    }
}

/// Arithmetic children that are themselves arithmetic are always
/// parenthesised; no precedence analysis is done.
fn render_arithmetic_operand<R: Renderer + ?Sized>(r: &mut R, node: &Node) -> String {
    match node.kind() {
        NodeKind::Infix(_) | NodeKind::UnaryMath(_) => format!("({})", r.render(node)),
        _ => r.render_operand(node),
    }
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn dialect_name(&self) -> &'static str {
        (**self).dialect_name()
    }

    fn quote_identifier(&self, name: &str) -> String {
        (**self).quote_identifier(name)
    }

    fn placeholder(&self, index: usize) -> String {
        (**self).placeholder(index)
    }

    fn state(&self) -> &RenderState {
        (**self).state()
    }

    fn state_mut(&mut self) -> &mut RenderState {
        (**self).state_mut()
    }

    fn render_comparison(&mut self, op: ComparisonOp, left: &str, right: &str) -> String {
        (**self).render_comparison(op, left, right)
    }

    fn render(&mut self, node: &Node) -> String {
        (**self).render(node)
    }
}

/// The surface shared by every renderer family: SQL dialects, the
/// formatted wrapper and the graph renderer.
pub trait QueryRenderer {
    /// Clears per-render state.
    fn reset_state(&mut self);

    /// Renders a statement.
    fn render_statement(&mut self, node: &Node) -> String;

    /// Returns the collected parameters, or `None` for renderers that
    /// do not collect them.
    fn params(&self) -> Option<Vec<SqlValue>>;
}

impl<R: Renderer + ?Sized> QueryRenderer for R {
    fn reset_state(&mut self) {
        self.reset();
    }

    fn render_statement(&mut self, node: &Node) -> String {
        self.render(node)
    }

    fn params(&self) -> Option<Vec<SqlValue>> {
        Some(self.state().params().to_vec())
    }
}
