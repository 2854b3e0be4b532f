//! Operator and keyword enums.
//!
//! Each enum is total over its SQL tokens through `as_str`, so adding an
//! operator is a one-line change in the enum and one in its table.

use serde::{Deserialize, Serialize};

/// Binary comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    /// `=`
    Eq,
    /// `!=`
    NotEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `LIKE`
    Like,
    /// `NOT LIKE`
    NotLike,
    /// Regular-expression match. Dialect specific.
    RegexMatch,
    /// Regular-expression non-match. Dialect specific.
    RegexNotMatch,
    /// `IS DISTINCT FROM`
    IsDistinctFrom,
    /// `IS NOT DISTINCT FROM`
    IsNotDistinctFrom,
    /// Case-sensitive equality. Dialect specific.
    CaseSensitiveEq,
    /// Case-insensitive equality. Dialect specific.
    CaseInsensitiveEq,
    /// `@>`
    Contains,
    /// `&&`
    Overlaps,
}

impl ComparisonOp {
    /// Returns the operator token used by the common (PostgreSQL-style)
    /// rendering.
    ///
    /// The two case-sensitivity operators have no single token; they
    /// return the `=` they are built around.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Eq | Self::CaseSensitiveEq | Self::CaseInsensitiveEq => "=",
            Self::NotEq => "!=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
            Self::RegexMatch => "~",
            Self::RegexNotMatch => "!~",
            Self::IsDistinctFrom => "IS DISTINCT FROM",
            Self::IsNotDistinctFrom => "IS NOT DISTINCT FROM",
            Self::Contains => "@>",
            Self::Overlaps => "&&",
        }
    }
}

/// Postfix predicate operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryPredicateOp {
    /// `IS NULL`
    IsNull,
    /// `IS NOT NULL`
    IsNotNull,
}

impl UnaryPredicateOp {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::IsNull => "IS NULL",
            Self::IsNotNull => "IS NOT NULL",
        }
    }
}

/// Arithmetic, bitwise and string infix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InfixOp {
    Add,
    Sub,
    Mul,
    Div,
    BitAnd,
    BitOr,
    BitXor,
    ShiftLeft,
    ShiftRight,
    Concat,
}

impl InfixOp {
    /// Returns the SQL representation of the operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::ShiftLeft => "<<",
            Self::ShiftRight => ">>",
            Self::Concat => "||",
        }
    }
}

/// Prefix arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryMathOp {
    /// Bitwise NOT (`~`).
    BitNot,
}

impl UnaryMathOp {
    /// Returns the SQL representation of the operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BitNot => "~",
        }
    }
}

/// Aggregate functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateFunc {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateFunc {
    /// Returns the SQL function name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Count => "COUNT",
            Self::Sum => "SUM",
            Self::Avg => "AVG",
            Self::Min => "MIN",
            Self::Max => "MAX",
        }
    }
}

/// Fields accepted by `EXTRACT(field FROM expr)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractField {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    Dow,
    Doy,
    Epoch,
    Quarter,
    Week,
}

impl ExtractField {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Year => "YEAR",
            Self::Month => "MONTH",
            Self::Day => "DAY",
            Self::Hour => "HOUR",
            Self::Minute => "MINUTE",
            Self::Second => "SECOND",
            Self::Dow => "DOW",
            Self::Doy => "DOY",
            Self::Epoch => "EPOCH",
            Self::Quarter => "QUARTER",
            Self::Week => "WEEK",
        }
    }
}

/// Order direction for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrderDirection {
    /// Ascending order (default).
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl OrderDirection {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Null ordering for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NullOrdering {
    /// Whatever the database does by default; nothing is emitted.
    #[default]
    Default,
    /// NULLs come first.
    First,
    /// NULLs come last.
    Last,
}

impl NullOrdering {
    /// Returns the SQL representation, empty for [`NullOrdering::Default`].
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "",
            Self::First => "NULLS FIRST",
            Self::Last => "NULLS LAST",
        }
    }
}

/// Join type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinType {
    /// INNER JOIN.
    Inner,
    /// LEFT OUTER JOIN.
    LeftOuter,
    /// RIGHT OUTER JOIN.
    RightOuter,
    /// FULL OUTER JOIN.
    FullOuter,
    /// CROSS JOIN.
    Cross,
    /// A raw SQL fragment that supplies its own join keyword.
    String,
}

impl JoinType {
    /// Returns the join keyword. [`JoinType::String`] has none.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::LeftOuter => "LEFT OUTER JOIN",
            Self::RightOuter => "RIGHT OUTER JOIN",
            Self::FullOuter => "FULL OUTER JOIN",
            Self::Cross => "CROSS JOIN",
            Self::String => "",
        }
    }
}

/// Row-locking clause of a SELECT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockMode {
    ForUpdate,
    ForShare,
    ForNoKeyUpdate,
    ForKeyShare,
}

impl LockMode {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ForUpdate => "FOR UPDATE",
            Self::ForShare => "FOR SHARE",
            Self::ForNoKeyUpdate => "FOR NO KEY UPDATE",
            Self::ForKeyShare => "FOR KEY SHARE",
        }
    }
}

/// Set operations combining two queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetOpType {
    Union,
    UnionAll,
    Intersect,
    IntersectAll,
    Except,
    ExceptAll,
}

impl SetOpType {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Union => "UNION",
            Self::UnionAll => "UNION ALL",
            Self::Intersect => "INTERSECT",
            Self::IntersectAll => "INTERSECT ALL",
            Self::Except => "EXCEPT",
            Self::ExceptAll => "EXCEPT ALL",
        }
    }
}

/// Window frame unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameType {
    Rows,
    Range,
}

impl FrameType {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Rows => "ROWS",
            Self::Range => "RANGE",
        }
    }
}

/// Kinds of grouping-set constructs usable in GROUP BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupingSetKind {
    Cube,
    Rollup,
    GroupingSets,
}

impl GroupingSetKind {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cube => "CUBE",
            Self::Rollup => "ROLLUP",
            Self::GroupingSets => "GROUPING SETS",
        }
    }
}

/// Statement kinds, used for logging and by transformers that dispatch
/// on the statement they are handed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
}

impl StatementKind {
    /// Returns the SQL verb.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Select => "SELECT",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparison_tokens() {
        assert_eq!(ComparisonOp::Eq.as_str(), "=");
        assert_eq!(ComparisonOp::NotEq.as_str(), "!=");
        assert_eq!(ComparisonOp::RegexMatch.as_str(), "~");
        assert_eq!(ComparisonOp::RegexNotMatch.as_str(), "!~");
        assert_eq!(ComparisonOp::IsNotDistinctFrom.as_str(), "IS NOT DISTINCT FROM");
        assert_eq!(ComparisonOp::Contains.as_str(), "@>");
        assert_eq!(ComparisonOp::Overlaps.as_str(), "&&");
    }

    #[test]
    fn test_join_type() {
        assert_eq!(JoinType::Inner.as_str(), "INNER JOIN");
        assert_eq!(JoinType::LeftOuter.as_str(), "LEFT OUTER JOIN");
        assert_eq!(JoinType::String.as_str(), "");
    }

    #[test]
    fn test_set_op_keywords() {
        assert_eq!(SetOpType::UnionAll.as_str(), "UNION ALL");
        assert_eq!(SetOpType::ExceptAll.as_str(), "EXCEPT ALL");
    }

    #[test]
    fn test_null_ordering_default_is_empty() {
        assert_eq!(NullOrdering::default().as_str(), "");
        assert_eq!(OrderDirection::default(), OrderDirection::Asc);
    }
}
