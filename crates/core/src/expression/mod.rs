//! Expressions evaluated against a message view.
//!
//! Configured processes describe their decisions as short expressions:
//!
//! ```text
//! request.value > 0 && data.enabled
//! replies.lookup == null ? 'lookup' : null
//! { service: 'db', message: 'find', request: { id: request.id } }
//! ```
//!
//! Paths are resolved against the view handed to [`Expression::evaluate`];
//! a path that does not exist evaluates to `null`.

mod ast;
mod error;
mod parser;

pub use error::ExpressionError;

pub(crate) use ast::kind;
use ast::{Evaluator, Expr};
use mp_protocol::message::Message;
use serde_json::Value;
use std::fmt;

/// A parsed expression.
///
/// # Example
///
/// ```
/// use mp_core::expression::Expression;
/// use mp_protocol::message::Message;
///
/// let expr = Expression::parse("request.value + 1").unwrap();
/// let view = Message::new().with("request", Message::new().with("value", 41));
/// assert_eq!(expr.evaluate(&view).unwrap(), serde_json::json!(42));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: String,
    root: Expr,
}

impl Expression {
    /// Parse expression text.
    ///
    /// # Errors
    ///
    /// Returns [`ExpressionError::Parse`] describing where parsing stopped.
    pub fn parse(source: &str) -> Result<Self, ExpressionError> {
        match parser::parse_expression(source) {
            Ok((_, root)) => Ok(Self {
                source: source.to_string(),
                root,
            }),
            Err(e) => {
                let reason = match e {
                    nom::Err::Error(inner) | nom::Err::Failure(inner) => {
                        if inner.input.trim().is_empty() {
                            "unexpected end of expression".to_string()
                        } else {
                            format!("unexpected input at '{}'", inner.input.trim())
                        }
                    }
                    nom::Err::Incomplete(_) => "incomplete expression".to_string(),
                };
                Err(ExpressionError::Parse {
                    expression: source.to_string(),
                    reason,
                })
            }
        }
    }

    /// The text the expression was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluate against a message view.
    pub fn evaluate(&self, view: &Message) -> Result<Value, ExpressionError> {
        Evaluator {
            source: &self.source,
            view,
        }
        .eval(&self.root)
    }

    /// Evaluate, requiring a boolean result.
    pub fn evaluate_bool(&self, view: &Message) -> Result<bool, ExpressionError> {
        match self.evaluate(view)? {
            Value::Bool(b) => Ok(b),
            other => Err(self.mismatch("boolean", &other)),
        }
    }

    /// Evaluate, requiring a string or null result.
    pub fn evaluate_name(&self, view: &Message) -> Result<Option<String>, ExpressionError> {
        match self.evaluate(view)? {
            Value::String(s) => Ok(Some(s)),
            Value::Null => Ok(None),
            other => Err(self.mismatch("string or null", &other)),
        }
    }

    /// Evaluate, requiring a mapping result.
    pub fn evaluate_message(&self, view: &Message) -> Result<Message, ExpressionError> {
        match self.evaluate(view)? {
            Value::Object(map) => Ok(Message::from(map)),
            other => Err(self.mismatch("mapping", &other)),
        }
    }

    fn mismatch(&self, expected: &'static str, found: &Value) -> ExpressionError {
        ExpressionError::TypeMismatch {
            expression: self.source.clone(),
            expected,
            found: kind(found),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
