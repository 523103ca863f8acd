//! Three-valued evaluation of [`Expr`] trees against ads

use std::cmp::Ordering;

use super::{BinaryOp, EvalValue, Expr, Scope, UnaryOp, MAX_EVAL_DEPTH};
use crate::ad::Ad;
use crate::value::Value;

impl Expr {
    /// Evaluate with `my` as the ad the expression belongs to and an
    /// optional `target` ad for `TARGET.` references.
    pub fn eval(&self, my: &Ad, target: Option<&Ad>) -> EvalValue {
        Evaluator {
            my,
            target,
            depth: 0,
        }
        .eval(self)
    }
}

/// Resolve one attribute of `home`, evaluating it if it holds an expression.
///
/// `None` when the attribute is absent.
pub(crate) fn resolve_attribute(home: &Ad, other: Option<&Ad>, name: &str) -> Option<EvalValue> {
    let value = home.get(name)?;
    Some(
        Evaluator {
            my: home,
            target: other,
            depth: 0,
        }
        .value_of(value),
    )
}

struct Evaluator<'a> {
    my: &'a Ad,
    target: Option<&'a Ad>,
    depth: usize,
}

impl<'a> Evaluator<'a> {
    fn eval(&self, expr: &Expr) -> EvalValue {
        match expr {
            Expr::Literal(v) => v.clone(),
            Expr::Attr { scope, name } => self.lookup(*scope, name),
            Expr::Unary(op, inner) => unary(*op, self.eval(inner)),
            Expr::Binary(BinaryOp::Or, lhs, rhs) => self.or(lhs, rhs),
            Expr::Binary(BinaryOp::And, lhs, rhs) => self.and(lhs, rhs),
            Expr::Binary(op, lhs, rhs) => binary(*op, self.eval(lhs), self.eval(rhs)),
            Expr::Cond(cond, then, otherwise) => match self.eval(cond) {
                EvalValue::Bool(true) => self.eval(then),
                EvalValue::Bool(false) => self.eval(otherwise),
                EvalValue::Undefined => EvalValue::Undefined,
                _ => EvalValue::Error,
            },
        }
    }

    fn value_of(&self, value: &Value) -> EvalValue {
        match value {
            Value::Expr(expr) => {
                if self.depth >= MAX_EVAL_DEPTH {
                    return EvalValue::Error;
                }
                Evaluator {
                    my: self.my,
                    target: self.target,
                    depth: self.depth + 1,
                }
                .eval(expr)
            }
            other => other.to_eval(),
        }
    }

    fn lookup(&self, scope: Scope, name: &str) -> EvalValue {
        match scope {
            Scope::My => self.resolve_in(self.my, self.target, name),
            Scope::Target => match self.target {
                Some(target) => self.resolve_in(target, Some(self.my), name),
                None => EvalValue::Undefined,
            },
            Scope::Unscoped => {
                if self.my.contains(name) {
                    self.resolve_in(self.my, self.target, name)
                } else if let Some(target) = self.target {
                    self.resolve_in(target, Some(self.my), name)
                } else {
                    EvalValue::Undefined
                }
            }
        }
    }

    fn resolve_in(&self, home: &'a Ad, other: Option<&'a Ad>, name: &str) -> EvalValue {
        match home.get(name) {
            None => EvalValue::Undefined,
            Some(value) => Evaluator {
                my: home,
                target: other,
                depth: self.depth,
            }
            .value_of(value),
        }
    }

    fn or(&self, lhs: &Expr, rhs: &Expr) -> EvalValue {
        match self.eval(lhs) {
            EvalValue::Bool(true) => EvalValue::Bool(true),
            EvalValue::Bool(false) => match self.eval(rhs) {
                v @ (EvalValue::Bool(_) | EvalValue::Undefined) => v,
                _ => EvalValue::Error,
            },
            EvalValue::Undefined => match self.eval(rhs) {
                EvalValue::Bool(true) => EvalValue::Bool(true),
                EvalValue::Bool(false) | EvalValue::Undefined => EvalValue::Undefined,
                _ => EvalValue::Error,
            },
            _ => EvalValue::Error,
        }
    }

    fn and(&self, lhs: &Expr, rhs: &Expr) -> EvalValue {
        match self.eval(lhs) {
            EvalValue::Bool(false) => EvalValue::Bool(false),
            EvalValue::Bool(true) => match self.eval(rhs) {
                v @ (EvalValue::Bool(_) | EvalValue::Undefined) => v,
                _ => EvalValue::Error,
            },
            EvalValue::Undefined => match self.eval(rhs) {
                EvalValue::Bool(false) => EvalValue::Bool(false),
                EvalValue::Bool(true) | EvalValue::Undefined => EvalValue::Undefined,
                _ => EvalValue::Error,
            },
            _ => EvalValue::Error,
        }
    }
}

fn unary(op: UnaryOp, v: EvalValue) -> EvalValue {
    match (op, v) {
        (_, EvalValue::Undefined) => EvalValue::Undefined,
        (UnaryOp::Not, EvalValue::Bool(b)) => EvalValue::Bool(!b),
        (UnaryOp::Neg, EvalValue::Int(i)) => EvalValue::Int(i.wrapping_neg()),
        (UnaryOp::Neg, EvalValue::Real(r)) => EvalValue::Real(-r),
        (UnaryOp::Plus, v @ (EvalValue::Int(_) | EvalValue::Real(_))) => v,
        _ => EvalValue::Error,
    }
}

fn binary(op: BinaryOp, lhs: EvalValue, rhs: EvalValue) -> EvalValue {
    match op {
        BinaryOp::Is => EvalValue::Bool(lhs.same_as(&rhs)),
        BinaryOp::Isnt => EvalValue::Bool(!lhs.same_as(&rhs)),
        BinaryOp::Eq
        | BinaryOp::Ne
        | BinaryOp::Lt
        | BinaryOp::Le
        | BinaryOp::Gt
        | BinaryOp::Ge => compare(op, &lhs, &rhs),
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
            arithmetic(op, &lhs, &rhs)
        }
        // Short-circuit operators are handled by the evaluator
        BinaryOp::Or | BinaryOp::And => EvalValue::Error,
    }
}

fn ordering_result(op: BinaryOp, ord: Option<Ordering>) -> EvalValue {
    let Some(ord) = ord else {
        // NaN compares unequal to everything
        return EvalValue::Bool(op == BinaryOp::Ne);
    };
    EvalValue::Bool(match op {
        BinaryOp::Eq => ord == Ordering::Equal,
        BinaryOp::Ne => ord != Ordering::Equal,
        BinaryOp::Lt => ord == Ordering::Less,
        BinaryOp::Le => ord != Ordering::Greater,
        BinaryOp::Gt => ord == Ordering::Greater,
        BinaryOp::Ge => ord != Ordering::Less,
        _ => return EvalValue::Error,
    })
}

fn compare(op: BinaryOp, lhs: &EvalValue, rhs: &EvalValue) -> EvalValue {
    match (lhs, rhs) {
        (EvalValue::Error, _) | (_, EvalValue::Error) => EvalValue::Error,
        (EvalValue::Undefined, _) | (_, EvalValue::Undefined) => EvalValue::Undefined,
        (EvalValue::String(a), EvalValue::String(b)) => ordering_result(
            op,
            Some(a.to_ascii_lowercase().cmp(&b.to_ascii_lowercase())),
        ),
        (EvalValue::Bool(a), EvalValue::Bool(b)) => match op {
            BinaryOp::Eq | BinaryOp::Ne => ordering_result(op, Some(a.cmp(b))),
            _ => EvalValue::Error,
        },
        (EvalValue::Int(a), EvalValue::Int(b)) => ordering_result(op, Some(a.cmp(b))),
        (a, b) => match (as_real(a), as_real(b)) {
            (Some(x), Some(y)) => ordering_result(op, x.partial_cmp(&y)),
            _ => EvalValue::Error,
        },
    }
}

fn as_real(v: &EvalValue) -> Option<f64> {
    match v {
        EvalValue::Int(i) => Some(*i as f64),
        EvalValue::Real(r) => Some(*r),
        _ => None,
    }
}

fn arithmetic(op: BinaryOp, lhs: &EvalValue, rhs: &EvalValue) -> EvalValue {
    match (lhs, rhs) {
        (EvalValue::Error, _) | (_, EvalValue::Error) => EvalValue::Error,
        (EvalValue::Undefined, _) | (_, EvalValue::Undefined) => EvalValue::Undefined,
        (EvalValue::Int(a), EvalValue::Int(b)) => {
            let (a, b) = (*a, *b);
            match op {
                BinaryOp::Add => EvalValue::Int(a.wrapping_add(b)),
                BinaryOp::Sub => EvalValue::Int(a.wrapping_sub(b)),
                BinaryOp::Mul => EvalValue::Int(a.wrapping_mul(b)),
                BinaryOp::Div if b == 0 => EvalValue::Error,
                BinaryOp::Div => EvalValue::Int(a.wrapping_div(b)),
                BinaryOp::Mod if b == 0 => EvalValue::Error,
                BinaryOp::Mod => EvalValue::Int(a.wrapping_rem(b)),
                _ => EvalValue::Error,
            }
        }
        (a, b) => match (as_real(a), as_real(b)) {
            (Some(x), Some(y)) => match op {
                BinaryOp::Add => EvalValue::Real(x + y),
                BinaryOp::Sub => EvalValue::Real(x - y),
                BinaryOp::Mul => EvalValue::Real(x * y),
                BinaryOp::Div if y == 0.0 => EvalValue::Error,
                BinaryOp::Div => EvalValue::Real(x / y),
                BinaryOp::Mod => EvalValue::Error,
                _ => EvalValue::Error,
            },
            _ => EvalValue::Error,
        },
    }
}
