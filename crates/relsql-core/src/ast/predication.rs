//! Predication, arithmetic and combinator methods on [`Node`].
//!
//! These are inherent methods so that `a.eq(b)` builds a comparison
//! node rather than resolving to `PartialEq::eq`. Any argument that is
//! not already a node is wrapped in a `Literal` through `Into<Node>`.
//!
//! ```rust
//! use relsql_core::{Node, PostgresRenderer, Renderer};
//!
//! let users = Node::table("users");
//! let pred = users.attr("age").gt_eq(18).and(users.attr("active").eq(true));
//!
//! let mut r = PostgresRenderer::new();
//! assert_eq!(
//!     r.render(&pred),
//!     "\"users\".\"age\" >= $1 AND \"users\".\"active\" = $2"
//! );
//! ```

use super::expression::{
    Aggregate, Alias, Between, Comparison, In, Infix, NamedFunction, Node, NodeKind, Ordering,
    UnaryMath, UnaryPredicate,
};
use super::ops::{
    ComparisonOp, InfixOp, NullOrdering, OrderDirection, UnaryMathOp, UnaryPredicateOp,
};
use super::window::{Over, OverWindow, WindowDefinition};

#[allow(clippy::should_implement_trait)]
impl Node {
    /// Coerces a literal compared against a typed attribute into a cast.
    fn coerce(&self, other: Self) -> Self {
        let NodeKind::Attribute(attr) = self.kind() else {
            return other;
        };
        let Some(type_name) = &attr.type_name else {
            return other;
        };
        match other.kind() {
            NodeKind::Literal(v) if !v.is_null() => Self::casted(v.clone(), type_name.clone()),
            _ => other,
        }
    }

    fn compare(&self, op: ComparisonOp, other: impl Into<Self>) -> Self {
        let right = self.coerce(other.into());
        Self::new(NodeKind::Comparison(Comparison {
            left: self.clone(),
            op,
            right,
        }))
    }

    fn infix(&self, op: InfixOp, other: impl Into<Self>) -> Self {
        Self::new(NodeKind::Infix(Infix {
            left: self.clone(),
            op,
            right: other.into(),
        }))
    }

    /// `self = other`.
    #[must_use]
    pub fn eq(&self, other: impl Into<Self>) -> Self {
        self.compare(ComparisonOp::Eq, other)
    }

    /// `self != other`.
    #[must_use]
    pub fn not_eq(&self, other: impl Into<Self>) -> Self {
        self.compare(ComparisonOp::NotEq, other)
    }

    /// `self > other`.
    #[must_use]
    pub fn gt(&self, other: impl Into<Self>) -> Self {
        self.compare(ComparisonOp::Gt, other)
    }

    /// `self >= other`.
    #[must_use]
    pub fn gt_eq(&self, other: impl Into<Self>) -> Self {
        self.compare(ComparisonOp::GtEq, other)
    }

    /// `self < other`.
    #[must_use]
    pub fn lt(&self, other: impl Into<Self>) -> Self {
        self.compare(ComparisonOp::Lt, other)
    }

    /// `self <= other`.
    #[must_use]
    pub fn lt_eq(&self, other: impl Into<Self>) -> Self {
        self.compare(ComparisonOp::LtEq, other)
    }

    /// `self LIKE pattern`.
    #[must_use]
    pub fn like(&self, pattern: impl Into<Self>) -> Self {
        self.compare(ComparisonOp::Like, pattern)
    }

    /// `self NOT LIKE pattern`.
    #[must_use]
    pub fn not_like(&self, pattern: impl Into<Self>) -> Self {
        self.compare(ComparisonOp::NotLike, pattern)
    }

    /// Regular-expression match. The operator depends on the dialect.
    #[must_use]
    pub fn matches_regexp(&self, pattern: impl Into<Self>) -> Self {
        self.compare(ComparisonOp::RegexMatch, pattern)
    }

    /// Regular-expression non-match.
    #[must_use]
    pub fn does_not_match_regexp(&self, pattern: impl Into<Self>) -> Self {
        self.compare(ComparisonOp::RegexNotMatch, pattern)
    }

    /// `self IS DISTINCT FROM other`.
    #[must_use]
    pub fn is_distinct_from(&self, other: impl Into<Self>) -> Self {
        self.compare(ComparisonOp::IsDistinctFrom, other)
    }

    /// `self IS NOT DISTINCT FROM other`.
    #[must_use]
    pub fn is_not_distinct_from(&self, other: impl Into<Self>) -> Self {
        self.compare(ComparisonOp::IsNotDistinctFrom, other)
    }

    /// Equality that honours case in every dialect.
    #[must_use]
    pub fn case_sensitive_eq(&self, other: impl Into<Self>) -> Self {
        self.compare(ComparisonOp::CaseSensitiveEq, other)
    }

    /// Equality that ignores case in every dialect.
    #[must_use]
    pub fn case_insensitive_eq(&self, other: impl Into<Self>) -> Self {
        self.compare(ComparisonOp::CaseInsensitiveEq, other)
    }

    /// `self @> other`.
    #[must_use]
    pub fn contains(&self, other: impl Into<Self>) -> Self {
        self.compare(ComparisonOp::Contains, other)
    }

    /// `self && other`.
    #[must_use]
    pub fn overlaps(&self, other: impl Into<Self>) -> Self {
        self.compare(ComparisonOp::Overlaps, other)
    }

    fn membership<I, T>(&self, values: I, negated: bool) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Self>,
    {
        let values = values
            .into_iter()
            .map(|v| self.coerce(v.into()))
            .collect();
        Self::new(NodeKind::In(In {
            expr: self.clone(),
            values,
            negated,
        }))
    }

    /// `self IN (values...)`. A single query value renders as a subquery.
    #[must_use]
    pub fn in_list<I, T>(&self, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Self>,
    {
        self.membership(values, false)
    }

    /// `self NOT IN (values...)`.
    #[must_use]
    pub fn not_in_list<I, T>(&self, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Self>,
    {
        self.membership(values, true)
    }

    /// `self IN (subquery)`.
    #[must_use]
    pub fn in_query(&self, query: impl Into<Self>) -> Self {
        self.membership([query.into()], false)
    }

    /// `self NOT IN (subquery)`.
    #[must_use]
    pub fn not_in_query(&self, query: impl Into<Self>) -> Self {
        self.membership([query.into()], true)
    }

    fn range(&self, low: Self, high: Self, negated: bool) -> Self {
        Self::new(NodeKind::Between(Between {
            expr: self.clone(),
            low: self.coerce(low),
            high: self.coerce(high),
            negated,
        }))
    }

    /// `self BETWEEN low AND high`.
    #[must_use]
    pub fn between(&self, low: impl Into<Self>, high: impl Into<Self>) -> Self {
        self.range(low.into(), high.into(), false)
    }

    /// `self NOT BETWEEN low AND high`.
    #[must_use]
    pub fn not_between(&self, low: impl Into<Self>, high: impl Into<Self>) -> Self {
        self.range(low.into(), high.into(), true)
    }

    /// `self IS NULL`.
    #[must_use]
    pub fn is_null(&self) -> Self {
        Self::new(NodeKind::UnaryPredicate(UnaryPredicate {
            expr: self.clone(),
            op: UnaryPredicateOp::IsNull,
        }))
    }

    /// `self IS NOT NULL`.
    #[must_use]
    pub fn is_not_null(&self) -> Self {
        Self::new(NodeKind::UnaryPredicate(UnaryPredicate {
            expr: self.clone(),
            op: UnaryPredicateOp::IsNotNull,
        }))
    }

    // Composite predications. Each returns `None` for an empty input.

    fn any_of<I, F>(&self, items: I, f: F) -> Option<Self>
    where
        I: IntoIterator,
        F: Fn(&Self, I::Item) -> Self,
    {
        let chained = items
            .into_iter()
            .map(|item| f(self, item))
            .reduce(|acc, p| Self::new(NodeKind::Or(acc, p)))?;
        Some(Self::grouping(chained))
    }

    fn all_of<I, F>(&self, items: I, f: F) -> Option<Self>
    where
        I: IntoIterator,
        F: Fn(&Self, I::Item) -> Self,
    {
        let chained = items
            .into_iter()
            .map(|item| f(self, item))
            .reduce(|acc, p| Self::new(NodeKind::And(acc, p)))?;
        Some(Self::grouping(chained))
    }

    /// `(self = v1 OR self = v2 ...)`.
    #[must_use]
    pub fn eq_any<I, T>(&self, values: I) -> Option<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<Self>,
    {
        self.any_of(values, |e, v| e.eq(v))
    }

    /// `(self = v1 AND self = v2 ...)`.
    #[must_use]
    pub fn eq_all<I, T>(&self, values: I) -> Option<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<Self>,
    {
        self.all_of(values, |e, v| e.eq(v))
    }

    /// `(self LIKE p1 OR self LIKE p2 ...)`.
    #[must_use]
    pub fn matches_any<I, T>(&self, patterns: I) -> Option<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<Self>,
    {
        self.any_of(patterns, |e, p| e.like(p))
    }

    /// `(self LIKE p1 AND self LIKE p2 ...)`.
    #[must_use]
    pub fn matches_all<I, T>(&self, patterns: I) -> Option<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<Self>,
    {
        self.all_of(patterns, |e, p| e.like(p))
    }

    /// `(self IN (...) OR self IN (...) ...)`, one IN per list.
    #[must_use]
    pub fn in_any<L, I, T>(&self, lists: L) -> Option<Self>
    where
        L: IntoIterator<Item = I>,
        I: IntoIterator<Item = T>,
        T: Into<Self>,
    {
        self.any_of(lists, |e, list| e.in_list(list))
    }

    /// `(self IN (...) AND self IN (...) ...)`.
    #[must_use]
    pub fn in_all<L, I, T>(&self, lists: L) -> Option<Self>
    where
        L: IntoIterator<Item = I>,
        I: IntoIterator<Item = T>,
        T: Into<Self>,
    {
        self.all_of(lists, |e, list| e.in_list(list))
    }

    // Boolean combinators.

    /// `self AND other`.
    #[must_use]
    pub fn and(&self, other: impl Into<Self>) -> Self {
        Self::new(NodeKind::And(self.clone(), other.into()))
    }

    /// `(self OR other)`. Always grouped.
    #[must_use]
    pub fn or(&self, other: impl Into<Self>) -> Self {
        Self::grouping(Self::new(NodeKind::Or(self.clone(), other.into())))
    }

    /// `NOT (self)`.
    #[must_use]
    pub fn not(&self) -> Self {
        Self::new(NodeKind::Not(self.clone()))
    }

    // Arithmetic.

    /// `self + other`.
    #[must_use]
    pub fn plus(&self, other: impl Into<Self>) -> Self {
        self.infix(InfixOp::Add, other)
    }

    /// `self - other`.
    #[must_use]
    pub fn minus(&self, other: impl Into<Self>) -> Self {
        self.infix(InfixOp::Sub, other)
    }

    /// `self * other`.
    #[must_use]
    pub fn multiply(&self, other: impl Into<Self>) -> Self {
        self.infix(InfixOp::Mul, other)
    }

    /// `self / other`.
    #[must_use]
    pub fn divide(&self, other: impl Into<Self>) -> Self {
        self.infix(InfixOp::Div, other)
    }

    /// `self & other`.
    #[must_use]
    pub fn bitwise_and(&self, other: impl Into<Self>) -> Self {
        self.infix(InfixOp::BitAnd, other)
    }

    /// `self | other`.
    #[must_use]
    pub fn bitwise_or(&self, other: impl Into<Self>) -> Self {
        self.infix(InfixOp::BitOr, other)
    }

    /// `self ^ other`.
    #[must_use]
    pub fn bitwise_xor(&self, other: impl Into<Self>) -> Self {
        self.infix(InfixOp::BitXor, other)
    }

    /// `self << other`.
    #[must_use]
    pub fn shift_left(&self, other: impl Into<Self>) -> Self {
        self.infix(InfixOp::ShiftLeft, other)
    }

    /// `self >> other`.
    #[must_use]
    pub fn shift_right(&self, other: impl Into<Self>) -> Self {
        self.infix(InfixOp::ShiftRight, other)
    }

    /// `self || other`.
    #[must_use]
    pub fn concat(&self, other: impl Into<Self>) -> Self {
        self.infix(InfixOp::Concat, other)
    }

    /// `~self`.
    #[must_use]
    pub fn bitwise_not(&self) -> Self {
        Self::new(NodeKind::UnaryMath(UnaryMath {
            expr: self.clone(),
            op: UnaryMathOp::BitNot,
        }))
    }

    // Ordering and naming.

    fn ordering(&self, direction: OrderDirection) -> Self {
        Self::new(NodeKind::Ordering(Ordering {
            expr: self.clone(),
            direction,
            nulls: NullOrdering::Default,
        }))
    }

    /// `self ASC`.
    #[must_use]
    pub fn asc(&self) -> Self {
        self.ordering(OrderDirection::Asc)
    }

    /// `self DESC`.
    #[must_use]
    pub fn desc(&self) -> Self {
        self.ordering(OrderDirection::Desc)
    }

    fn with_nulls(&self, nulls: NullOrdering) -> Self {
        match self.kind() {
            NodeKind::Ordering(o) => Self::new(NodeKind::Ordering(Ordering {
                nulls,
                ..o.clone()
            })),
            _ => Self::new(NodeKind::Ordering(Ordering {
                expr: self.clone(),
                direction: OrderDirection::Asc,
                nulls,
            })),
        }
    }

    /// Adds `NULLS FIRST`. A non-ordering node is ordered ascending.
    #[must_use]
    pub fn nulls_first(&self) -> Self {
        self.with_nulls(NullOrdering::First)
    }

    /// Adds `NULLS LAST`. A non-ordering node is ordered ascending.
    #[must_use]
    pub fn nulls_last(&self) -> Self {
        self.with_nulls(NullOrdering::Last)
    }

    /// `self AS "name"`.
    #[must_use]
    pub fn alias(&self, name: impl Into<String>) -> Self {
        Self::new(NodeKind::Alias(Alias {
            expr: self.clone(),
            name: name.into(),
        }))
    }

    // Window functions.

    /// `self OVER (window)`.
    #[must_use]
    pub fn over(&self, window: WindowDefinition) -> Self {
        Self::new(NodeKind::Over(Over {
            expr: self.clone(),
            window: OverWindow::Inline(window),
        }))
    }

    /// `self OVER "name"`, referencing a window of the `WINDOW` clause.
    #[must_use]
    pub fn over_named(&self, name: impl Into<String>) -> Self {
        Self::new(NodeKind::Over(Over {
            expr: self.clone(),
            window: OverWindow::Named(name.into()),
        }))
    }

    // Function modifiers.

    /// Marks a function or aggregate call `DISTINCT`.
    ///
    /// # Panics
    ///
    /// If this node is not a function or aggregate call.
    #[must_use]
    pub fn distinct(&self) -> Self {
        match self.kind() {
            NodeKind::Aggregate(a) => Self::new(NodeKind::Aggregate(Aggregate {
                distinct: true,
                ..a.clone()
            })),
            NodeKind::NamedFunction(f) => Self::new(NodeKind::NamedFunction(NamedFunction {
                distinct: true,
                ..f.clone()
            })),
            other => panic!("DISTINCT applies to function calls, not {}", other.variant_name()),
        }
    }

    /// Adds `FILTER (WHERE predicate)` to an aggregate.
    ///
    /// # Panics
    ///
    /// If this node is not an aggregate.
    #[must_use]
    pub fn filter(&self, predicate: impl Into<Self>) -> Self {
        let NodeKind::Aggregate(a) = self.kind() else {
            panic!("FILTER applies to aggregates, not {}", self.variant_name());
        };
        Self::new(NodeKind::Aggregate(Aggregate {
            filter: Some(predicate.into()),
            ..a.clone()
        }))
    }
}
