//! Access-policy gating.
//!
//! An [`AccessPolicy`] asks a [`PolicyEvaluator`] about every table a
//! statement touches. The evaluator allows the access, denies it, or
//! allows it on a residual [`Condition`] that is translated into a WHERE
//! predicate on that table.
//!
//! Residual conditions are plain JSON, so they can come straight from an
//! external policy engine:
//!
//! ```rust
//! use relsql_plugins::Condition;
//!
//! let cond: Condition = serde_json::from_str(
//!     r#"{"op": "or", "conditions": [
//!         {"op": "eq", "column": "owner_id", "value": 7},
//!         {"op": "eq", "column": "public", "value": true}
//!     ]}"#,
//! )
//! .unwrap();
//! assert!(matches!(cond, Condition::Or { .. }));
//! ```

use relsql_core::error::{Result, TransformError};
use relsql_core::transform::{Transformer, collect_tables};
use relsql_core::{
    DeleteStatement, InsertStatement, Node, SelectCore, SqlValue, StatementKind, UpdateStatement,
    sql,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Errors raised while evaluating a policy.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    /// The evaluator could not reach a decision.
    #[error("policy evaluation failed: {0}")]
    Evaluation(String),

    /// A policy document could not be parsed.
    #[error("invalid policy document: {0}")]
    Document(#[from] serde_json::Error),

    /// A condition compares a column with a JSON array or object.
    #[error("unsupported value for column '{column}': {value}")]
    UnsupportedValue {
        /// Column the value was compared with.
        column: String,
        /// The offending JSON.
        value: Value,
    },
}

impl From<PolicyError> for TransformError {
    fn from(err: PolicyError) -> Self {
        Self::Evaluator(err.to_string())
    }
}

/// A residual row condition, relative to one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Condition {
    /// `column = value`, or `column IS NULL` for a null value.
    Eq { column: String, value: Value },
    /// `column != value`, or `column IS NOT NULL` for a null value.
    Neq { column: String, value: Value },
    /// `column IN (values)`.
    In { column: String, values: Vec<Value> },
    /// `column IS NULL`.
    IsNull { column: String },
    /// Every condition holds. Empty means always true.
    And { conditions: Vec<Condition> },
    /// Any condition holds. Empty means always false.
    Or { conditions: Vec<Condition> },
    /// The condition does not hold.
    Not { condition: Box<Condition> },
}

impl Condition {
    /// `column = value`.
    #[must_use]
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq {
            column: column.into(),
            value: value.into(),
        }
    }

    /// `column IN (values)`.
    #[must_use]
    pub fn in_values<I, V>(column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::In {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Translates the condition into a predicate on `relation`.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::UnsupportedValue`] for array or object
    /// values.
    pub fn to_predicate(&self, relation: &Node) -> std::result::Result<Node, PolicyError> {
        let pred = match self {
            Self::Eq { column, value } => {
                let attr = relation.attr(column);
                match json_to_sql(column, value)? {
                    SqlValue::Null => attr.is_null(),
                    v => attr.eq(v),
                }
            }
            Self::Neq { column, value } => {
                let attr = relation.attr(column);
                match json_to_sql(column, value)? {
                    SqlValue::Null => attr.is_not_null(),
                    v => attr.not_eq(v),
                }
            }
            Self::In { column, values } => {
                let values = values
                    .iter()
                    .map(|v| json_to_sql(column, v))
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                relation.attr(column).in_list(values)
            }
            Self::IsNull { column } => relation.attr(column).is_null(),
            Self::And { conditions } => {
                return combine(conditions, relation, "1=1", |acc, p| {
                    Node::grouping(acc.and(p))
                });
            }
            Self::Or { conditions } => {
                return combine(conditions, relation, "1=0", |acc, p| acc.or(p));
            }
            Self::Not { condition } => condition.to_predicate(relation)?.not(),
        };
        Ok(pred)
    }
}

fn combine(
    conditions: &[Condition],
    relation: &Node,
    empty: &str,
    join: impl Fn(Node, Node) -> Node,
) -> std::result::Result<Node, PolicyError> {
    let mut preds = conditions.iter().map(|c| c.to_predicate(relation));
    let Some(first) = preds.next() else {
        return Ok(sql(empty));
    };
    let mut acc = first?;
    for pred in preds {
        acc = join(acc, pred?);
    }
    Ok(acc)
}

fn json_to_sql(column: &str, value: &Value) -> std::result::Result<SqlValue, PolicyError> {
    match value {
        Value::Null => Ok(SqlValue::Null),
        Value::Bool(b) => Ok(SqlValue::Bool(*b)),
        Value::Number(n) => n
            .as_i64()
            .map(SqlValue::Int)
            .or_else(|| n.as_u64().map(SqlValue::UInt))
            .or_else(|| n.as_f64().map(SqlValue::Float))
            .ok_or_else(|| PolicyError::UnsupportedValue {
                column: column.to_string(),
                value: value.clone(),
            }),
        Value::String(s) => Ok(SqlValue::Text(s.clone())),
        Value::Array(_) | Value::Object(_) => Err(PolicyError::UnsupportedValue {
            column: column.to_string(),
            value: value.clone(),
        }),
    }
}

/// What a policy decided for one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Decision {
    /// Access is allowed unconditionally.
    Allow,
    /// Access is refused.
    Deny { reason: String },
    /// Access is allowed to the rows matching `condition`.
    Filter { condition: Condition },
}

impl Decision {
    /// Creates a [`Decision::Deny`].
    #[must_use]
    pub fn deny(reason: impl Into<String>) -> Self {
        Self::Deny {
            reason: reason.into(),
        }
    }
}

/// Decides whether a statement kind may touch a table.
pub trait PolicyEvaluator: Send + Sync {
    /// Returns the decision for `kind` on `table`.
    ///
    /// # Errors
    ///
    /// Returns a [`PolicyError`] if no decision can be reached.
    fn evaluate(
        &self,
        kind: StatementKind,
        table: &str,
    ) -> std::result::Result<Decision, PolicyError>;
}

impl<F> PolicyEvaluator for F
where
    F: Fn(StatementKind, &str) -> std::result::Result<Decision, PolicyError> + Send + Sync,
{
    fn evaluate(
        &self,
        kind: StatementKind,
        table: &str,
    ) -> std::result::Result<Decision, PolicyError> {
        self(kind, table)
    }
}

/// One rule of a [`StaticPolicy`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Table name, or `*` for every table.
    pub table: String,
    /// Statement kinds the rule covers. Empty covers all.
    #[serde(default)]
    pub actions: Vec<StatementKind>,
    pub decision: Decision,
}

impl Rule {
    fn matches(&self, kind: StatementKind, table: &str) -> bool {
        (self.table == "*" || self.table == table)
            && (self.actions.is_empty() || self.actions.contains(&kind))
    }
}

/// An in-memory evaluator: the first matching rule wins, otherwise
/// the default decision applies.
///
/// ```rust
/// use relsql_plugins::{Decision, StaticPolicy};
/// use relsql_core::StatementKind;
///
/// let policy = StaticPolicy::from_json(
///     r#"{
///         "rules": [
///             {"table": "audit", "actions": ["select"], "decision": {"effect": "allow"}},
///             {"table": "audit", "decision": {"effect": "deny", "reason": "append-only"}}
///         ],
///         "default": {"effect": "allow"}
///     }"#,
/// )
/// .unwrap();
/// assert_eq!(policy.decide(StatementKind::Select, "audit"), &Decision::Allow);
/// assert_eq!(policy.decide(StatementKind::Delete, "audit"), &Decision::deny("append-only"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticPolicy {
    #[serde(default)]
    rules: Vec<Rule>,
    #[serde(default = "deny_unlisted")]
    default: Decision,
}

fn deny_unlisted() -> Decision {
    Decision::deny("no policy rule matches")
}

impl Default for StaticPolicy {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            default: deny_unlisted(),
        }
    }
}

impl StaticPolicy {
    /// Creates a policy that denies everything not allowed by a rule.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a policy from JSON. A missing `default` denies.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::Document`] if the JSON does not describe
    /// a policy.
    pub fn from_json(json: &str) -> std::result::Result<Self, PolicyError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Sets the decision used when no rule matches.
    #[must_use]
    pub fn default_decision(mut self, decision: Decision) -> Self {
        self.default = decision;
        self
    }

    /// Appends a rule.
    #[must_use]
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Allows every statement on `table`.
    #[must_use]
    pub fn allow(self, table: impl Into<String>) -> Self {
        self.rule(Rule {
            table: table.into(),
            actions: Vec::new(),
            decision: Decision::Allow,
        })
    }

    /// Denies every statement on `table`.
    #[must_use]
    pub fn deny(self, table: impl Into<String>, reason: impl Into<String>) -> Self {
        self.rule(Rule {
            table: table.into(),
            actions: Vec::new(),
            decision: Decision::deny(reason),
        })
    }

    /// Allows every statement on `table`, restricted to rows matching
    /// `condition`.
    #[must_use]
    pub fn filter(self, table: impl Into<String>, condition: Condition) -> Self {
        self.rule(Rule {
            table: table.into(),
            actions: Vec::new(),
            decision: Decision::Filter { condition },
        })
    }

    /// Allows reads of `table` and denies writes.
    #[must_use]
    pub fn read_only(self, table: impl Into<String>) -> Self {
        let table = table.into();
        self.rule(Rule {
            table: table.clone(),
            actions: vec![StatementKind::Select],
            decision: Decision::Allow,
        })
        .deny(table, "read-only")
    }

    /// Returns the decision for `kind` on `table`.
    #[must_use]
    pub fn decide(&self, kind: StatementKind, table: &str) -> &Decision {
        self.rules
            .iter()
            .find(|r| r.matches(kind, table))
            .map_or(&self.default, |r| &r.decision)
    }
}

impl PolicyEvaluator for StaticPolicy {
    fn evaluate(
        &self,
        kind: StatementKind,
        table: &str,
    ) -> std::result::Result<Decision, PolicyError> {
        Ok(self.decide(kind, table).clone())
    }
}

/// Gates statements through a [`PolicyEvaluator`].
///
/// SELECTs consult the evaluator for every FROM and JOIN table,
/// UPDATEs and DELETEs for their target. A `Deny` aborts rendering with
/// [`TransformError::AccessDenied`]; a `Filter` appends the translated
/// condition to WHERE. INSERTs only honour `Deny`, since there are no
/// existing rows to filter.
#[derive(Debug, Clone)]
pub struct AccessPolicy<E> {
    evaluator: E,
}

impl<E: PolicyEvaluator> AccessPolicy<E> {
    /// Wraps `evaluator`.
    #[must_use]
    pub const fn new(evaluator: E) -> Self {
        Self { evaluator }
    }

    /// Returns the wrapped evaluator.
    #[must_use]
    pub const fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Evaluates one table and returns the predicate to append, if any.
    fn check(&self, kind: StatementKind, relation: &Node, table: &str) -> Result<Option<Node>> {
        let decision = self.evaluator.evaluate(kind, table).inspect_err(|err| {
            warn!(kind = kind.as_str(), table, error = %err, "policy evaluation failed");
        })?;
        match decision {
            Decision::Allow => {
                debug!(kind = kind.as_str(), table, "policy allows");
                Ok(None)
            }
            Decision::Deny { reason } => {
                warn!(kind = kind.as_str(), table, reason = %reason, "policy denies");
                Err(TransformError::access_denied(table, reason))
            }
            Decision::Filter { condition } => {
                debug!(kind = kind.as_str(), table, ?condition, "policy filters rows");
                Ok(Some(condition.to_predicate(relation)?))
            }
        }
    }

    fn check_target(&self, kind: StatementKind, relation: &Node) -> Result<Option<Node>> {
        match relation.underlying_table_name() {
            Some(table) => self.check(kind, relation, table),
            None => Ok(None),
        }
    }
}

impl<E: PolicyEvaluator> Transformer for AccessPolicy<E> {
    fn name(&self) -> &str {
        "access_policy"
    }

    fn transform_select(&self, mut select: SelectCore) -> Result<SelectCore> {
        for (relation, table) in collect_tables(&select) {
            if let Some(pred) = self.check(StatementKind::Select, &relation, &table)? {
                select.wheres.push(pred);
            }
        }
        Ok(select)
    }

    fn transform_insert(&self, insert: InsertStatement) -> Result<InsertStatement> {
        self.check_target(StatementKind::Insert, &insert.into)?;
        Ok(insert)
    }

    fn transform_update(&self, mut update: UpdateStatement) -> Result<UpdateStatement> {
        if let Some(pred) = self.check_target(StatementKind::Update, &update.table)? {
            update.wheres.push(pred);
        }
        Ok(update)
    }

    fn transform_delete(&self, mut delete: DeleteStatement) -> Result<DeleteStatement> {
        if let Some(pred) = self.check_target(StatementKind::Delete, &delete.from)? {
            delete.wheres.push(pred);
        }
        Ok(delete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relsql_core::{
        DeleteManager, InsertManager, PostgresRenderer, RenderOptions, Renderer, SelectManager,
        UpdateManager, table,
    };
    use serde_json::json;

    fn inline() -> PostgresRenderer {
        PostgresRenderer::with_options(RenderOptions::inline())
    }

    #[test]
    fn test_condition_translation() {
        let docs = table("docs");
        let mut r = inline();
        let cond = Condition::And {
            conditions: vec![
                Condition::eq("owner_id", 7),
                Condition::Not {
                    condition: Box::new(Condition::IsNull {
                        column: String::from("published_at"),
                    }),
                },
                Condition::in_values("status", ["draft", "live"]),
            ],
        };
        assert_eq!(
            r.render(&cond.to_predicate(&docs).unwrap()),
            "((\"docs\".\"owner_id\" = 7 AND NOT (\"docs\".\"published_at\" IS NULL)) \
             AND \"docs\".\"status\" IN ('draft', 'live'))"
        );
    }

    #[test]
    fn test_null_and_empty_conditions() {
        let docs = table("docs");
        let mut r = inline();
        assert_eq!(
            r.render(&Condition::eq("x", Value::Null).to_predicate(&docs).unwrap()),
            "\"docs\".\"x\" IS NULL"
        );
        let neq = Condition::Neq {
            column: String::from("x"),
            value: Value::Null,
        };
        assert_eq!(
            r.render(&neq.to_predicate(&docs).unwrap()),
            "\"docs\".\"x\" IS NOT NULL"
        );
        let none = Condition::Or { conditions: vec![] };
        assert_eq!(r.render(&none.to_predicate(&docs).unwrap()), "1=0");
        let all = Condition::And { conditions: vec![] };
        assert_eq!(r.render(&all.to_predicate(&docs).unwrap()), "1=1");
    }

    #[test]
    fn test_unsupported_value() {
        let err = Condition::eq("tags", json!(["a"]))
            .to_predicate(&table("docs"))
            .unwrap_err();
        assert!(matches!(err, PolicyError::UnsupportedValue { .. }));
        let transform: TransformError = err.into();
        assert!(matches!(transform, TransformError::Evaluator(_)));
    }

    #[test]
    fn test_condition_json_round_trip() {
        let cond = Condition::Or {
            conditions: vec![Condition::eq("a", 1), Condition::eq("b", "x")],
        };
        let json = serde_json::to_value(&cond).unwrap();
        assert_eq!(json["op"], "or");
        assert_eq!(json["conditions"][1]["value"], "x");
        let back: Condition = serde_json::from_value(json).unwrap();
        assert_eq!(back, cond);
    }

    #[test]
    fn test_filter_appends_predicate() {
        let docs = table("docs");
        let users = table("users");
        let policy = StaticPolicy::new()
            .filter("docs", Condition::eq("owner_id", 7))
            .allow("users");
        let (sql, params) = SelectManager::new(&docs)
            .join(&users)
            .on(docs.attr("owner_id").eq(users.attr("id")))
            .use_transformer(AccessPolicy::new(policy))
            .to_sql(&mut PostgresRenderer::new())
            .unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM \"docs\" INNER JOIN \"users\" ON \"docs\".\"owner_id\" = \"users\".\"id\" \
             WHERE \"docs\".\"owner_id\" = $1"
        );
        assert_eq!(params, Some(vec![SqlValue::Int(7)]));
    }

    #[test]
    fn test_default_denies() {
        let err = SelectManager::new(table("secrets"))
            .use_transformer(AccessPolicy::new(StaticPolicy::new()))
            .to_sql(&mut PostgresRenderer::new())
            .unwrap_err();
        match err {
            TransformError::AccessDenied { table, reason } => {
                assert_eq!(table, "secrets");
                assert_eq!(reason, "no policy rule matches");
            }
            other => panic!("expected denial, got {other:?}"),
        }
    }

    #[test]
    fn test_read_only_table() {
        let audit = table("audit");
        let policy = AccessPolicy::new(StaticPolicy::new().read_only("audit"));
        assert!(
            SelectManager::new(&audit)
                .use_transformer(policy.clone())
                .to_sql(&mut inline())
                .is_ok()
        );
        let err = InsertManager::new(&audit)
            .values([1])
            .use_transformer(policy.clone())
            .to_sql(&mut inline())
            .unwrap_err();
        assert_eq!(err.to_string(), "access denied to 'audit': read-only");
        assert!(
            DeleteManager::new(&audit)
                .use_transformer(policy)
                .to_sql(&mut inline())
                .is_err()
        );
    }

    #[test]
    fn test_update_gets_filter() {
        let docs = table("docs");
        let policy = StaticPolicy::new().filter("docs", Condition::eq("locked", false));
        let (sql, _) = UpdateManager::new(&docs)
            .set(docs.attr("title"), "x")
            .use_transformer(AccessPolicy::new(policy))
            .to_sql(&mut inline())
            .unwrap();
        assert_eq!(
            sql,
            "UPDATE \"docs\" SET \"docs\".\"title\" = 'x' WHERE \"docs\".\"locked\" = FALSE"
        );
    }

    #[test]
    fn test_closure_evaluator_errors() {
        let failing = |_: StatementKind, _: &str| -> std::result::Result<Decision, PolicyError> {
            Err(PolicyError::Evaluation(String::from("engine unreachable")))
        };
        let err = SelectManager::new(table("docs"))
            .use_transformer(AccessPolicy::new(failing))
            .to_sql(&mut inline())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "evaluator error: policy evaluation failed: engine unreachable"
        );
    }

    #[test]
    fn test_policy_from_json() {
        let policy = StaticPolicy::from_json(
            r#"{"rules": [{"table": "*", "actions": ["select"],
                "decision": {"effect": "filter",
                             "condition": {"op": "eq", "column": "tenant", "value": "acme"}}}]}"#,
        )
        .unwrap();
        assert!(matches!(
            policy.decide(StatementKind::Select, "anything"),
            Decision::Filter { .. }
        ));
        assert!(matches!(
            policy.decide(StatementKind::Update, "anything"),
            Decision::Deny { .. }
        ));
        assert!(matches!(
            StaticPolicy::from_json("{\"rules\": 3}"),
            Err(PolicyError::Document(_))
        ));
    }
}
