//! Window definitions, frames and `OVER` clauses.

use super::expression::{Node, NodeKind};
use super::ops::FrameType;

/// A window specification: `PARTITION BY ... ORDER BY ... frame`.
///
/// When `name` is set the definition can be listed in a SELECT's
/// `WINDOW` clause and referenced by name from `OVER`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WindowDefinition {
    pub name: Option<String>,
    pub partition_by: Vec<Node>,
    pub order_by: Vec<Node>,
    pub frame: Option<WindowFrame>,
}

impl WindowDefinition {
    /// Creates an anonymous, empty window.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty window named `name`.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Adds PARTITION BY expressions.
    #[must_use]
    pub fn partition<I, T>(mut self, exprs: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Node>,
    {
        self.partition_by.extend(exprs.into_iter().map(Into::into));
        self
    }

    /// Adds ORDER BY expressions.
    #[must_use]
    pub fn order<I, T>(mut self, exprs: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Node>,
    {
        self.order_by.extend(exprs.into_iter().map(Into::into));
        self
    }

    /// Sets a `ROWS` frame.
    #[must_use]
    pub fn rows(mut self, start: FrameBound, end: Option<FrameBound>) -> Self {
        self.frame = Some(WindowFrame::new(FrameType::Rows, start, end));
        self
    }

    /// Sets a `RANGE` frame.
    #[must_use]
    pub fn range(mut self, start: FrameBound, end: Option<FrameBound>) -> Self {
        self.frame = Some(WindowFrame::new(FrameType::Range, start, end));
        self
    }

    /// Wraps the definition in a node.
    #[must_use]
    pub fn into_node(self) -> Node {
        Node::new(NodeKind::Window(self))
    }
}

impl From<WindowDefinition> for Node {
    fn from(def: WindowDefinition) -> Self {
        def.into_node()
    }
}

/// `ROWS|RANGE <start>` or `ROWS|RANGE BETWEEN <start> AND <end>`.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowFrame {
    pub frame_type: FrameType,
    pub start: FrameBound,
    pub end: Option<FrameBound>,
}

impl WindowFrame {
    /// Creates a frame.
    #[must_use]
    pub const fn new(frame_type: FrameType, start: FrameBound, end: Option<FrameBound>) -> Self {
        Self {
            frame_type,
            start,
            end,
        }
    }
}

/// One end of a window frame. Offsets are expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameBound {
    UnboundedPreceding,
    Preceding(Node),
    CurrentRow,
    Following(Node),
    UnboundedFollowing,
}

impl FrameBound {
    /// `<n> PRECEDING`.
    #[must_use]
    pub fn preceding(offset: impl Into<Node>) -> Self {
        Self::Preceding(offset.into())
    }

    /// `<n> FOLLOWING`.
    #[must_use]
    pub fn following(offset: impl Into<Node>) -> Self {
        Self::Following(offset.into())
    }

    /// Returns the keyword that follows the offset, or the whole bound
    /// for bounds without one.
    #[must_use]
    pub const fn keyword(&self) -> &'static str {
        match self {
            Self::UnboundedPreceding => "UNBOUNDED PRECEDING",
            Self::Preceding(_) => "PRECEDING",
            Self::CurrentRow => "CURRENT ROW",
            Self::Following(_) => "FOLLOWING",
            Self::UnboundedFollowing => "UNBOUNDED FOLLOWING",
        }
    }

    /// Returns the offset expression, if any.
    #[must_use]
    pub const fn offset(&self) -> Option<&Node> {
        match self {
            Self::Preceding(n) | Self::Following(n) => Some(n),
            _ => None,
        }
    }
}

/// The window an `OVER` clause refers to.
#[derive(Debug, Clone, PartialEq)]
pub enum OverWindow {
    /// `OVER (PARTITION BY ...)`.
    Inline(WindowDefinition),
    /// `OVER "name"`.
    Named(String),
}

/// `expr OVER window`.
#[derive(Debug, Clone, PartialEq)]
pub struct Over {
    pub expr: Node,
    pub window: OverWindow,
}
