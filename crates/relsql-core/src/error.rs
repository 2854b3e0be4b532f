//! Error types for the transformer pipeline.
//!
//! Rendering itself cannot fail. The recoverable errors come from
//! transformers, which may refuse a statement or lack what they need to
//! rewrite it, and from an UPDATE left without any assignment.

/// Errors a transformer can return to abort rendering.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// A policy denied access to a table.
    #[error("access denied to '{table}': {reason}")]
    AccessDenied {
        /// The table that was refused.
        table: String,
        /// Why access was refused.
        reason: String,
    },

    /// The transformer was not given the configuration it needs.
    #[error("missing configuration: {0}")]
    MissingConfiguration(String),

    /// An external evaluator failed.
    #[error("evaluator error: {0}")]
    Evaluator(String),

    /// Any other failure.
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl TransformError {
    /// Creates an [`TransformError::AccessDenied`].
    #[must_use]
    pub fn access_denied(table: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::AccessDenied {
            table: table.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for transformer operations.
pub type Result<T> = std::result::Result<T, TransformError>;
