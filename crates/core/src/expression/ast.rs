//! Expression syntax tree and evaluation.

use super::error::ExpressionError;
use mp_protocol::message::Message;
use serde_json::{Map, Number, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
}

/// Short-circuiting operators; the right operand is only evaluated when needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LogicalOp {
    Or,
    And,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Literal(Value),
    /// Dotted field path resolved against the message view; missing fields are null.
    Path(Vec<String>),
    Object(Vec<(String, Expr)>),
    Not(Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Logical(LogicalOp, Box<Expr>, Box<Expr>),
    Conditional(Box<Expr>, Box<Expr>, Box<Expr>),
}

/// Name of a value's type, for error messages.
pub(crate) fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

pub(crate) struct Evaluator<'a> {
    pub source: &'a str,
    pub view: &'a Message,
}

impl Evaluator<'_> {
    pub fn eval(&self, expr: &Expr) -> Result<Value, ExpressionError> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Path(segments) => Ok(self.lookup(segments)),
            Expr::Object(entries) => {
                let mut map = Map::new();
                for (key, entry) in entries {
                    map.insert(key.clone(), self.eval(entry)?);
                }
                Ok(Value::Object(map))
            }
            Expr::Not(inner) => Ok(Value::Bool(!self.eval_bool(inner)?)),
            Expr::Logical(LogicalOp::And, lhs, rhs) => {
                Ok(Value::Bool(self.eval_bool(lhs)? && self.eval_bool(rhs)?))
            }
            Expr::Logical(LogicalOp::Or, lhs, rhs) => {
                Ok(Value::Bool(self.eval_bool(lhs)? || self.eval_bool(rhs)?))
            }
            Expr::Binary(op, lhs, rhs) => {
                let lhs = self.eval(lhs)?;
                let rhs = self.eval(rhs)?;
                self.binary(*op, lhs, rhs)
            }
            Expr::Conditional(condition, then, otherwise) => {
                if self.eval_bool(condition)? {
                    self.eval(then)
                } else {
                    self.eval(otherwise)
                }
            }
        }
    }

    fn eval_bool(&self, expr: &Expr) -> Result<bool, ExpressionError> {
        match self.eval(expr)? {
            Value::Bool(b) => Ok(b),
            other => Err(self.mismatch("boolean", &other)),
        }
    }

    fn lookup(&self, segments: &[String]) -> Value {
        let Some((first, rest)) = segments.split_first() else {
            return Value::Null;
        };
        let mut current = match self.view.get(first) {
            Some(value) => value,
            None => return Value::Null,
        };
        for segment in rest {
            match current.get(segment) {
                Some(value) => current = value,
                None => return Value::Null,
            }
        }
        current.clone()
    }

    fn binary(&self, op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, ExpressionError> {
        match op {
            BinaryOp::Eq => Ok(Value::Bool(values_equal(&lhs, &rhs))),
            BinaryOp::Ne => Ok(Value::Bool(!values_equal(&lhs, &rhs))),
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                let ordering = match (&lhs, &rhs) {
                    (Value::Number(a), Value::Number(b)) => {
                        as_f64(a).partial_cmp(&as_f64(b))
                    }
                    (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
                    (Value::Number(_), other) | (Value::String(_), other) => {
                        return Err(self.mismatch(kind(&lhs), other))
                    }
                    (other, _) => return Err(self.mismatch("number or string", other)),
                };
                let Some(ordering) = ordering else {
                    return Ok(Value::Bool(false));
                };
                Ok(Value::Bool(match op {
                    BinaryOp::Lt => ordering.is_lt(),
                    BinaryOp::Le => ordering.is_le(),
                    BinaryOp::Gt => ordering.is_gt(),
                    _ => ordering.is_ge(),
                }))
            }
            BinaryOp::Add => match (&lhs, &rhs) {
                (Value::Number(a), Value::Number(b)) => {
                    let sum = match (a.as_i64(), b.as_i64()) {
                        (Some(x), Some(y)) => x.checked_add(y).map(Number::from),
                        _ => None,
                    };
                    let sum = sum.or_else(|| Number::from_f64(as_f64(a) + as_f64(b)));
                    Ok(sum.map(Value::Number).unwrap_or(Value::Null))
                }
                (Value::String(_), _) | (_, Value::String(_)) => {
                    Ok(Value::String(format!("{}{}", text(&lhs), text(&rhs))))
                }
                (Value::Number(_), other) => Err(self.mismatch("number", other)),
                (other, _) => Err(self.mismatch("number or string", other)),
            },
        }
    }

    fn mismatch(&self, expected: &'static str, found: &Value) -> ExpressionError {
        ExpressionError::TypeMismatch {
            expression: self.source.to_string(),
            expected,
            found: kind(found),
        }
    }
}

fn as_f64(n: &Number) -> f64 {
    n.as_f64().unwrap_or(f64::NAN)
}

fn values_equal(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => as_f64(a) == as_f64(b),
        _ => lhs == rhs,
    }
}

/// Text used when concatenating; strings are not quoted.
fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
