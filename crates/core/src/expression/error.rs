//! Error types for expression parsing and evaluation.

use thiserror::Error;

/// Errors raised while parsing or evaluating an expression.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpressionError {
    /// The expression text is not valid syntax.
    #[error("cannot parse expression '{expression}': {reason}")]
    Parse { expression: String, reason: String },

    /// An operand or result had the wrong type.
    #[error("expression '{expression}' expected {expected}, found {found}")]
    TypeMismatch {
        expression: String,
        expected: &'static str,
        found: &'static str,
    },
}
