//! Attribute values carried by ads
//!
//! An attribute holds either a constant (string, integer, real, boolean) or
//! an unevaluated [`Expr`]. Expressions are evaluated lazily, against the ad
//! that holds them, whenever something reads the attribute.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::expr::{EvalValue, Expr};

/// Value of a single ad attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Value {
    /// Boolean constant
    Bool(bool),
    /// Integer constant
    Int(i64),
    /// Real constant
    Real(f64),
    /// String constant
    String(String),
    /// Unevaluated expression
    Expr(Expr),
}

impl Value {
    /// Get the type name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Real(_) => "Real",
            Value::String(_) => "String",
            Value::Expr(_) => "Expr",
        }
    }

    /// Constant view of this value
    ///
    /// Expressions cannot be evaluated without their ad, so they map to
    /// `EvalValue::Undefined` here; use [`crate::Ad::evaluate_attr`] instead.
    pub fn to_eval(&self) -> EvalValue {
        match self {
            Value::Bool(b) => EvalValue::Bool(*b),
            Value::Int(i) => EvalValue::Int(*i),
            Value::Real(r) => EvalValue::Real(*r),
            Value::String(s) => EvalValue::String(s.clone()),
            Value::Expr(_) => EvalValue::Undefined,
        }
    }

    /// Get as string slice if this is a string constant
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as integer if this is an integer constant
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as bool if this is a boolean constant
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Check if this value is an unevaluated expression
    pub fn is_expr(&self) -> bool {
        matches!(self, Value::Expr(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Expr(expr) => write!(f, "{}", expr),
            other => write!(f, "{}", other.to_eval()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(r: f64) -> Self {
        Value::Real(r)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Expr> for Value {
    fn from(expr: Expr) -> Self {
        Value::Expr(expr)
    }
}
