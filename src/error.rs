//! Error type shared by every stage of a contraction.
use crate::symbolic::{EvaluationError, ExprParseError};
use crate::types::NodeId;

/// Any failure aborts the whole contraction; the caller only ever sees one of
/// these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContractionError {
    /// Structurally invalid input: wrong shapes, lengths or references.
    #[error("validation error: {0}")]
    Validation(String),
    /// Text that could not be read as an expression or a matrix.
    #[error("parse error: {0}")]
    Parse(String),
    /// Arithmetic the symbolic evaluator cannot carry out.
    #[error("evaluation error: {0}")]
    Evaluation(#[from] EvaluationError),
}

impl ContractionError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Prefixes the message with the node it concerns.
    pub(crate) fn in_node(self, node: &NodeId) -> Self {
        match self {
            Self::Validation(message) => Self::Validation(format!("node `{node}`: {message}")),
            Self::Parse(message) => Self::Parse(format!("node `{node}`: {message}")),
            Self::Evaluation(_) => self,
        }
    }
}

impl From<ExprParseError> for ContractionError {
    fn from(err: ExprParseError) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<serde_json::Error> for ContractionError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
