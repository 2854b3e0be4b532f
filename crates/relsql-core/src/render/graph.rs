//! Graphviz rendering of an AST.
//!
//! The output is a `digraph` with one filled box per node and one
//! labelled edge per parent/child link. Plugins can be credited with
//! the WHERE and JOIN items they added: each [`Attribution`] becomes a
//! dashed cluster around the boxes created while those items were
//! visited.

use std::ops::Range;

use crate::ast::{
    ConflictAction, FrameBound, Join, Node, NodeKind, OverWindow, SelectCore, SqlValue,
    WindowDefinition,
};

use super::QueryRenderer;

const CLUSTER_COLORS: [&str; 6] = ["red", "blue", "darkgreen", "purple", "orange", "brown"];

/// WHERE and JOIN indices of the root SELECT credited to one plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribution {
    /// Cluster label, usually the transformer name.
    pub name: String,
    /// Indices into `SelectCore::wheres`.
    pub wheres: Range<usize>,
    /// Indices into `SelectCore::joins`.
    pub joins: Range<usize>,
}

#[derive(Debug, Clone)]
struct GraphNode {
    label: String,
    color: &'static str,
}

#[derive(Debug, Clone)]
struct GraphEdge {
    from: usize,
    to: usize,
    label: &'static str,
}

#[derive(Debug, Clone)]
struct Cluster {
    label: String,
    color: &'static str,
    members: Vec<usize>,
}

/// Renders an AST as a Graphviz digraph.
///
/// It does not produce SQL and collects no parameters.
#[derive(Debug, Clone, Default)]
pub struct GraphRenderer {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    clusters: Vec<Cluster>,
    where_ids: Vec<Range<usize>>,
    join_ids: Vec<Range<usize>>,
}

impl GraphRenderer {
    /// Creates an empty graph renderer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the graph.
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.clusters.clear();
        self.where_ids.clear();
        self.join_ids.clear();
    }

    /// Returns the number of boxes drawn so far.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of edges drawn so far.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Renders `node` as a digraph.
    pub fn render_graph(&mut self, node: &Node) -> String {
        self.reset();
        self.visit(node);
        self.to_dot()
    }

    /// Renders `node` with one cluster per attribution.
    ///
    /// Attributions refer to the WHERE and JOIN items of `node` itself,
    /// which must be a SELECT for them to claim anything.
    pub fn render_with_attributions(&mut self, node: &Node, attributions: &[Attribution]) -> String {
        self.reset();
        self.visit(node);
        for attribution in attributions {
            self.attribute(attribution);
        }
        self.to_dot()
    }

    fn attribute(&mut self, attribution: &Attribution) {
        let mut members = Vec::new();
        for i in attribution.wheres.clone() {
            if let Some(ids) = self.where_ids.get(i) {
                members.extend(ids.clone());
            }
        }
        for i in attribution.joins.clone() {
            if let Some(ids) = self.join_ids.get(i) {
                members.extend(ids.clone());
            }
        }
        if members.is_empty() {
            return;
        }
        let color = CLUSTER_COLORS[self.clusters.len() % CLUSTER_COLORS.len()];
        self.clusters.push(Cluster {
            label: attribution.name.clone(),
            color,
            members,
        });
    }

    /// Emits the accumulated graph.
    #[must_use]
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph AST {\n");
        out.push_str("  rankdir=TB;\n");
        out.push_str("  node [shape=box, style=filled, fontname=\"Helvetica\"];\n");
        for (id, node) in self.nodes.iter().enumerate() {
            out.push_str(&format!(
                "  n{id} [label=\"{}\", fillcolor=\"{}\"];\n",
                escape_label(&node.label),
                node.color
            ));
        }
        for edge in &self.edges {
            out.push_str(&format!(
                "  n{} -> n{} [label=\"{}\"];\n",
                edge.from, edge.to, edge.label
            ));
        }
        for (i, cluster) in self.clusters.iter().enumerate() {
            out.push_str(&format!("  subgraph cluster_{i} {{\n"));
            out.push_str(&format!("    label=\"{}\";\n", escape_label(&cluster.label)));
            out.push_str("    style=dashed;\n");
            out.push_str(&format!("    color=\"{}\";\n", cluster.color));
            for id in &cluster.members {
                out.push_str(&format!("    n{id};\n"));
            }
            out.push_str("  }\n");
        }
        out.push_str("}\n");
        out
    }

    fn add(&mut self, label: String, color: &'static str) -> usize {
        self.nodes.push(GraphNode { label, color });
        self.nodes.len() - 1
    }

    fn edge(&mut self, from: usize, to: usize, label: &'static str) {
        self.edges.push(GraphEdge { from, to, label });
    }

    fn child(&mut self, parent: usize, node: &Node, label: &'static str) {
        let id = self.visit(node);
        self.edge(parent, id, label);
    }

    fn children(&mut self, parent: usize, nodes: &[Node], label: &'static str) {
        for node in nodes {
            self.child(parent, node, label);
        }
    }

    /// Draws `node` and its subtree, returning the id of its box.
    pub fn visit(&mut self, node: &Node) -> usize {
        match node.kind() {
            NodeKind::Table(t) => self.add(format!("Table\n{}", t.name), "lightblue"),
            NodeKind::TableAlias(a) => {
                let id = self.add(format!("TableAlias\n{}", a.alias), "lightblue");
                self.child(id, &a.relation, "relation");
                id
            }
            NodeKind::Attribute(a) => {
                let label = match a.relation.relation_name() {
                    Some(rel) => format!("Attribute\n{rel}.{}", a.name),
                    None => format!("Attribute\n{}", a.name),
                };
                self.add(label, "lightyellow")
            }
            NodeKind::Star(s) => {
                let label = match s.relation.as_ref().and_then(Node::relation_name) {
                    Some(rel) => format!("Star\n{rel}.*"),
                    None => String::from("Star\n*"),
                };
                self.add(label, "lightyellow")
            }
            NodeKind::Literal(v) => self.add(value_label("Literal", v), "white"),
            NodeKind::BindParam(v) => self.add(value_label("BindParam", v), "white"),
            NodeKind::Casted(c) => self.add(
                format!("Casted\n{} AS {}", c.value.to_sql_inline(), c.type_name),
                "white",
            ),
            NodeKind::Raw(r) => self.add(format!("Raw\n{}", r.sql), "white"),
            NodeKind::Comparison(c) => {
                let id = self.add(format!("Comparison\n{:?}", c.op), "lightpink");
                self.child(id, &c.left, "left");
                self.child(id, &c.right, "right");
                id
            }
            NodeKind::UnaryPredicate(p) => {
                let id = self.add(format!("UnaryPredicate\n{}", p.op.as_str()), "lightpink");
                self.child(id, &p.expr, "expr");
                id
            }
            NodeKind::And(l, r) | NodeKind::Or(l, r) => {
                let id = self.add(String::from(node.variant_name()), "lightpink");
                self.child(id, l, "left");
                self.child(id, r, "right");
                id
            }
            NodeKind::Not(e) | NodeKind::Grouping(e) => {
                let id = self.add(String::from(node.variant_name()), "lightpink");
                self.child(id, e, "expr");
                id
            }
            NodeKind::In(i) => {
                let label = if i.negated { "NotIn" } else { "In" };
                let id = self.add(String::from(label), "lightpink");
                self.child(id, &i.expr, "expr");
                self.children(id, &i.values, "value");
                id
            }
            NodeKind::Between(b) => {
                let label = if b.negated { "NotBetween" } else { "Between" };
                let id = self.add(String::from(label), "lightpink");
                self.child(id, &b.expr, "expr");
                self.child(id, &b.low, "low");
                self.child(id, &b.high, "high");
                id
            }
            NodeKind::Exists(e) => {
                let label = if e.negated { "NotExists" } else { "Exists" };
                let id = self.add(String::from(label), "lightpink");
                self.child(id, &e.subquery, "subquery");
                id
            }
            NodeKind::Infix(i) => {
                let id = self.add(format!("Infix\n{}", i.op.as_str()), "lightgreen");
                self.child(id, &i.left, "left");
                self.child(id, &i.right, "right");
                id
            }
            NodeKind::UnaryMath(u) => {
                let id = self.add(format!("UnaryMath\n{}", u.op.as_str()), "lightgreen");
                self.child(id, &u.expr, "expr");
                id
            }
            NodeKind::NamedFunction(f) => {
                let id = self.add(format!("Function\n{}", f.name), "lightgreen");
                self.children(id, &f.args, "arg");
                id
            }
            NodeKind::Aggregate(a) => {
                let id = self.add(format!("Aggregate\n{}", a.func.as_str()), "lightgreen");
                if let Some(expr) = &a.expr {
                    self.child(id, expr, "expr");
                }
                if let Some(filter) = &a.filter {
                    self.child(id, filter, "filter");
                }
                id
            }
            NodeKind::Extract(e) => {
                let id = self.add(format!("Extract\n{}", e.field.as_str()), "lightgreen");
                self.child(id, &e.expr, "expr");
                id
            }
            NodeKind::Ordering(o) => {
                let id = self.add(format!("Ordering\n{}", o.direction.as_str()), "lightgreen");
                self.child(id, &o.expr, "expr");
                id
            }
            NodeKind::Window(w) => self.visit_window(w),
            NodeKind::Over(o) => {
                let id = self.add(String::from("Over"), "lightgreen");
                self.child(id, &o.expr, "expr");
                let window = match &o.window {
                    OverWindow::Inline(def) => self.visit_window(def),
                    OverWindow::Named(name) => self.add(format!("WindowRef\n{name}"), "white"),
                };
                self.edge(id, window, "window");
                id
            }
            NodeKind::Alias(a) => {
                let id = self.add(format!("Alias\n{}", a.name), "lightgreen");
                self.child(id, &a.expr, "expr");
                id
            }
            NodeKind::Case(c) => {
                let id = self.add(String::from("Case"), "lightgreen");
                if let Some(operand) = &c.operand {
                    self.child(id, operand, "operand");
                }
                for (when, then) in &c.whens {
                    self.child(id, when, "when");
                    self.child(id, then, "then");
                }
                if let Some(default) = &c.default {
                    self.child(id, default, "else");
                }
                id
            }
            NodeKind::GroupingSet(g) => {
                let id = self.add(format!("GroupingSet\n{}", g.kind.as_str()), "lightgreen");
                self.children(id, &g.columns, "column");
                for set in &g.sets {
                    let set_id = self.add(String::from("Set"), "white");
                    self.edge(id, set_id, "set");
                    self.children(set_id, set, "column");
                }
                id
            }
            NodeKind::SetOperation(s) => {
                let id = self.add(format!("SetOperation\n{}", s.op.as_str()), "lightgrey");
                self.child(id, &s.left, "left");
                self.child(id, &s.right, "right");
                self.children(id, &s.orders, "order");
                if let Some(limit) = &s.limit {
                    self.child(id, limit, "limit");
                }
                if let Some(offset) = &s.offset {
                    self.child(id, offset, "offset");
                }
                id
            }
            NodeKind::Cte(c) => {
                let id = self.add(format!("Cte\n{}", c.name), "lightgrey");
                self.child(id, &c.query, "query");
                id
            }
            NodeKind::Assignment(a) => {
                let id = self.add(String::from("Assignment"), "lightgreen");
                self.child(id, &a.left, "left");
                self.child(id, &a.right, "right");
                id
            }
            NodeKind::Join(j) => self.visit_join(j),
            NodeKind::Select(s) => self.visit_select(s),
            NodeKind::Insert(s) => {
                let id = self.add(String::from("InsertStatement"), "lightgrey");
                self.child(id, &s.into, "into");
                self.children(id, &s.columns, "column");
                for row in &s.values {
                    let row_id = self.add(String::from("Row"), "white");
                    self.edge(id, row_id, "values");
                    self.children(row_id, row, "value");
                }
                if let Some(select) = &s.select {
                    self.child(id, select, "select");
                }
                if let Some(conflict) = &s.on_conflict {
                    let label = match conflict.action {
                        ConflictAction::DoNothing => "OnConflict\nDO NOTHING",
                        ConflictAction::DoUpdate { .. } => "OnConflict\nDO UPDATE",
                    };
                    let oc = self.add(String::from(label), "lightgrey");
                    self.edge(id, oc, "on_conflict");
                    self.children(oc, &conflict.columns, "column");
                    if let ConflictAction::DoUpdate {
                        assignments,
                        wheres,
                    } = &conflict.action
                    {
                        for a in assignments {
                            let a_id = self.add(String::from("Assignment"), "lightgreen");
                            self.edge(oc, a_id, "set");
                            self.child(a_id, &a.left, "left");
                            self.child(a_id, &a.right, "right");
                        }
                        self.children(oc, wheres, "where");
                    }
                }
                self.children(id, &s.returning, "returning");
                id
            }
            NodeKind::Update(s) => {
                let id = self.add(String::from("UpdateStatement"), "lightgrey");
                self.child(id, &s.table, "table");
                for a in &s.assignments {
                    let a_id = self.add(String::from("Assignment"), "lightgreen");
                    self.edge(id, a_id, "set");
                    self.child(a_id, &a.left, "left");
                    self.child(a_id, &a.right, "right");
                }
                self.children(id, &s.wheres, "where");
                self.children(id, &s.returning, "returning");
                id
            }
            NodeKind::Delete(s) => {
                let id = self.add(String::from("DeleteStatement"), "lightgrey");
                self.child(id, &s.from, "from");
                self.children(id, &s.wheres, "where");
                self.children(id, &s.returning, "returning");
                id
            }
        }
    }

    fn visit_window(&mut self, def: &WindowDefinition) -> usize {
        let label = def
            .name
            .as_ref()
            .map_or_else(|| String::from("Window"), |n| format!("Window\n{n}"));
        let id = self.add(label, "lightgreen");
        self.children(id, &def.partition_by, "partition");
        self.children(id, &def.order_by, "order");
        if let Some(frame) = &def.frame {
            let frame_id = self.add(format!("Frame\n{}", frame.frame_type.as_str()), "white");
            self.edge(id, frame_id, "frame");
            let start = self.visit_bound(&frame.start);
            self.edge(frame_id, start, "start");
            if let Some(end) = &frame.end {
                let end = self.visit_bound(end);
                self.edge(frame_id, end, "end");
            }
        }
        id
    }

    fn visit_bound(&mut self, bound: &FrameBound) -> usize {
        let id = self.add(format!("FrameBound\n{}", bound.keyword()), "white");
        if let Some(offset) = bound.offset() {
            self.child(id, offset, "offset");
        }
        id
    }

    fn visit_join(&mut self, join: &Join) -> usize {
        let keyword = join.join_type.as_str();
        let label = if keyword.is_empty() {
            String::from("Join\nSTRING")
        } else if join.lateral {
            format!("Join\n{keyword} LATERAL")
        } else {
            format!("Join\n{keyword}")
        };
        let id = self.add(label, "lightblue");
        self.child(id, &join.right, "right");
        if let Some(on) = &join.on {
            self.child(id, on, "on");
        }
        id
    }

    fn visit_select(&mut self, select: &SelectCore) -> usize {
        // Only the statement being graphed owns the attributed items.
        let root = self.nodes.is_empty();
        let id = self.add(String::from("SelectCore"), "lightgrey");
        for cte in &select.ctes {
            let cte_id = self.add(format!("Cte\n{}", cte.name), "lightgrey");
            self.edge(id, cte_id, "cte");
            self.child(cte_id, &cte.query, "query");
        }
        self.children(id, &select.projections, "projection");
        if let Some(from) = &select.from {
            self.child(id, from, "from");
        }
        for join in &select.joins {
            let start = self.nodes.len();
            let join_id = self.visit_join(join);
            self.edge(id, join_id, "join");
            if root {
                self.join_ids.push(start..self.nodes.len());
            }
        }
        for pred in &select.wheres {
            let start = self.nodes.len();
            self.child(id, pred, "where");
            if root {
                self.where_ids.push(start..self.nodes.len());
            }
        }
        self.children(id, &select.groups, "group");
        self.children(id, &select.havings, "having");
        for window in &select.windows {
            let w = self.visit_window(window);
            self.edge(id, w, "window");
        }
        self.children(id, &select.orders, "order");
        if let Some(limit) = &select.limit {
            self.child(id, limit, "limit");
        }
        if let Some(offset) = &select.offset {
            self.child(id, offset, "offset");
        }
        id
    }
}

fn value_label(kind: &str, value: &SqlValue) -> String {
    format!("{kind}\n{}", value.to_sql_inline())
}

/// Escapes a label for a double-quoted DOT string.
fn escape_label(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for c in label.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

impl QueryRenderer for GraphRenderer {
    fn reset_state(&mut self) {
        self.reset();
    }

    fn render_statement(&mut self, node: &Node) -> String {
        self.render_graph(node)
    }

    fn params(&self) -> Option<Vec<SqlValue>> {
        None
    }
}
