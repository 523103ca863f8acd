//! Attribute expression language
//!
//! Ads may carry unevaluated expressions, and the collector evaluates a
//! configured requirements expression against every incoming ad. This module
//! provides the small expression language both use:
//!
//! - Literals: integers, reals, double-quoted strings, `true`, `false`,
//!   `undefined`, `error`
//! - Attribute references, optionally scoped: `Name`, `MY.Name`, `TARGET.Name`
//! - Operators (loosest first): `?:`, `||`, `&&`,
//!   `== != =?= =!= is isnt`, `< <= > >=`, `+ -`, `* / %`, unary `! - +`
//!
//! Evaluation is three-valued: a reference to a missing attribute yields
//! `Undefined`, which propagates through most operators, while type
//! mismatches yield `Error`. `=?=` and `=!=` never produce `Undefined`.
//!
//! ```
//! use adcollector_core::{Ad, EvalValue, Expr};
//!
//! let expr: Expr = "Cpus >= 4 && State == \"Unclaimed\"".parse().unwrap();
//! let mut ad = Ad::new();
//! ad.insert("Cpus", 8);
//! ad.insert("State", "unclaimed");
//! assert_eq!(ad.eval(&expr), EvalValue::Bool(true));
//! ```

pub(crate) mod eval;
mod lexer;
mod parser;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Maximum nesting depth accepted by the parser
pub const MAX_PARSE_DEPTH: usize = 64;

/// Maximum depth of attribute-to-expression indirection during evaluation
pub const MAX_EVAL_DEPTH: usize = 32;

/// Error produced while parsing expression text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A character that cannot start any token
    #[error("unexpected character '{0}' at position {1}")]
    UnexpectedChar(char, usize),
    /// String literal missing its closing quote
    #[error("unterminated string starting at position {0}")]
    UnterminatedString(usize),
    /// Numeric literal that does not fit or is malformed
    #[error("invalid number '{0}' at position {1}")]
    InvalidNumber(String, usize),
    /// A token that is valid on its own but not where it appears
    #[error("unexpected {0} at position {1}")]
    UnexpectedToken(String, usize),
    /// Input ended in the middle of an expression
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    /// Nesting exceeded [`MAX_PARSE_DEPTH`]
    #[error("expression nests deeper than {0} levels")]
    TooDeep(usize),
}

/// Result of evaluating an expression
#[derive(Debug, Clone, PartialEq)]
pub enum EvalValue {
    /// Referenced attribute is missing, or an operand was undefined
    Undefined,
    /// Type mismatch or arithmetic failure
    Error,
    /// Boolean result
    Bool(bool),
    /// Integer result
    Int(i64),
    /// Real result
    Real(f64),
    /// String result
    String(String),
}

impl EvalValue {
    /// Strict identity: same type and same value, strings compared
    /// case-sensitively. `Undefined` is identical to `Undefined`.
    ///
    /// This is the comparison behind `=?=`.
    pub fn same_as(&self, other: &EvalValue) -> bool {
        match (self, other) {
            (EvalValue::Undefined, EvalValue::Undefined) => true,
            (EvalValue::Error, EvalValue::Error) => true,
            (EvalValue::Bool(a), EvalValue::Bool(b)) => a == b,
            (EvalValue::Int(a), EvalValue::Int(b)) => a == b,
            (EvalValue::Real(a), EvalValue::Real(b)) => a == b || (a.is_nan() && b.is_nan()),
            (EvalValue::String(a), EvalValue::String(b)) => a == b,
            _ => false,
        }
    }

    /// Boolean view, `None` for anything that is not a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            EvalValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Check for `Undefined`
    pub fn is_undefined(&self) -> bool {
        matches!(self, EvalValue::Undefined)
    }

    /// Check for `Error`
    pub fn is_error(&self) -> bool {
        matches!(self, EvalValue::Error)
    }

    /// Type name used in log output
    pub fn type_name(&self) -> &'static str {
        match self {
            EvalValue::Undefined => "undefined",
            EvalValue::Error => "error",
            EvalValue::Bool(_) => "boolean",
            EvalValue::Int(_) => "integer",
            EvalValue::Real(_) => "real",
            EvalValue::String(_) => "string",
        }
    }
}

impl fmt::Display for EvalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalValue::Undefined => f.write_str("undefined"),
            EvalValue::Error => f.write_str("error"),
            EvalValue::Bool(b) => write!(f, "{}", b),
            EvalValue::Int(i) => write!(f, "{}", i),
            EvalValue::Real(r) => {
                if r.is_finite() && r.fract() == 0.0 {
                    write!(f, "{:.1}", r)
                } else {
                    write!(f, "{}", r)
                }
            }
            EvalValue::String(s) => write_quoted(f, s),
        }
    }
}

/// Which ad an attribute reference is resolved against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Unscoped: the ad itself first, then the target
    Unscoped,
    /// `MY.` prefix: only the ad itself
    My,
    /// `TARGET.` prefix: only the target ad
    Target,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `!`
    Not,
    /// `-`
    Neg,
    /// `+`
    Plus,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// `||`
    Or,
    /// `&&`
    And,
    /// `==` (strings compare case-insensitively)
    Eq,
    /// `!=`
    Ne,
    /// `=?=` / `is`
    Is,
    /// `=!=` / `isnt`
    Isnt,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
}

impl BinaryOp {
    fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Is => "=?=",
            BinaryOp::Isnt => "=!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
        }
    }
}

/// Parsed expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Constant
    Literal(EvalValue),
    /// Attribute reference
    Attr {
        /// Resolution scope
        scope: Scope,
        /// Attribute name as written
        name: String,
    },
    /// Unary operation
    Unary(UnaryOp, Box<Expr>),
    /// Binary operation
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    /// `cond ? then : otherwise`
    Cond(Box<Expr>, Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Unscoped attribute reference
    pub fn attr(name: impl Into<String>) -> Self {
        Expr::Attr {
            scope: Scope::Unscoped,
            name: name.into(),
        }
    }

    fn is_atomic(&self) -> bool {
        matches!(self, Expr::Literal(_) | Expr::Attr { .. })
    }
}

impl FromStr for Expr {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens = lexer::tokenize(s)?;
        parser::Parser::new(tokens).parse()
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            c => write!(f, "{}", c)?,
        }
    }
    f.write_str("\"")
}

struct Operand<'a>(&'a Expr);

impl fmt::Display for Operand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_atomic() {
            write!(f, "{}", self.0)
        } else {
            write!(f, "({})", self.0)
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(v) => write!(f, "{}", v),
            Expr::Attr { scope, name } => match scope {
                Scope::Unscoped => f.write_str(name),
                Scope::My => write!(f, "MY.{}", name),
                Scope::Target => write!(f, "TARGET.{}", name),
            },
            Expr::Unary(op, inner) => {
                let sym = match op {
                    UnaryOp::Not => "!",
                    UnaryOp::Neg => "-",
                    UnaryOp::Plus => "+",
                };
                write!(f, "{}{}", sym, Operand(inner))
            }
            Expr::Binary(op, lhs, rhs) => {
                write!(f, "{} {} {}", Operand(lhs), op.symbol(), Operand(rhs))
            }
            Expr::Cond(c, t, e) => {
                write!(f, "{} ? {} : {}", Operand(c), Operand(t), Operand(e))
            }
        }
    }
}

impl Serialize for Expr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Expr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
