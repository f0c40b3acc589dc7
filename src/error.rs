use thiserror::Error;

use crate::engine::ExpressionError;

/// Node-level errors.
///
/// Only the parse/compile/evaluate variants ever reach the host, and they are
/// reported through the event channel rather than returned: the node's
/// `handle` contract is infallible and always forwards the message.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("JSON parse error: {0}")]
    JsonParse(String),
    #[error("Expression compile error: {0}")]
    Compile(ExpressionError),
    #[error("Expression evaluation error: {0}")]
    Evaluate(ExpressionError),
}

impl From<serde_json::Error> for NodeError {
    fn from(e: serde_json::Error) -> Self {
        NodeError::JsonParse(e.to_string())
    }
}

/// Convenience alias for node-level results.
pub type NodeResult<T> = Result<T, NodeError>;
