//! The ad: a self-describing attribute record
//!
//! Attribute names are case-insensitive. The spelling of the most recent
//! assignment is kept for display and serialization.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::attrs;
use crate::expr::{eval::resolve_attribute, EvalValue, Expr, ParseError};
use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
struct Attribute {
    name: String,
    value: Value,
}

/// A mapping from attribute name to [`Value`]
///
/// # Example
///
/// ```
/// use adcollector_core::Ad;
///
/// let mut ad = Ad::with_type("Machine");
/// ad.insert("Name", "slot1@node7");
/// ad.insert("Cpus", 4);
///
/// assert_eq!(ad.lookup_string("name").as_deref(), Some("slot1@node7"));
/// assert_eq!(ad.lookup_integer("CPUS"), Some(4));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, Value>", into = "BTreeMap<String, Value>")]
pub struct Ad {
    attrs: FxHashMap<String, Attribute>,
}

fn fold(name: &str) -> String {
    name.to_ascii_lowercase()
}

impl Ad {
    /// Create an empty ad
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an ad carrying only its `MyType` discriminator
    pub fn with_type(my_type: &str) -> Self {
        let mut ad = Self::new();
        ad.set_my_type(my_type);
        ad
    }

    /// Set an attribute, returning the previous value if any
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let name = name.into();
        let key = fold(&name);
        self.attrs
            .insert(
                key,
                Attribute {
                    name,
                    value: value.into(),
                },
            )
            .map(|old| old.value)
    }

    /// Parse `text` and store it as an unevaluated expression
    pub fn insert_expr(&mut self, name: impl Into<String>, text: &str) -> Result<(), ParseError> {
        let expr: Expr = text.parse()?;
        self.insert(name, expr);
        Ok(())
    }

    /// Raw value of an attribute
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attrs.get(&fold(name)).map(|a| &a.value)
    }

    /// Remove an attribute, returning its value
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.attrs.remove(&fold(name)).map(|a| a.value)
    }

    /// Check whether an attribute is present
    pub fn contains(&self, name: &str) -> bool {
        self.attrs.contains_key(&fold(name))
    }

    /// Number of attributes
    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    /// Check if the ad has no attributes
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// Iterate over `(name, value)` pairs in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.attrs.values().map(|a| (a.name.as_str(), &a.value))
    }

    /// Attribute names, sorted case-insensitively
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.attrs.values().map(|a| a.name.as_str()).collect();
        names.sort_by_key(|n| n.to_ascii_lowercase());
        names
    }

    // =========================================================================
    // Evaluation
    // =========================================================================

    /// Evaluate an attribute against this ad
    ///
    /// Returns `None` when the attribute is absent. A present attribute that
    /// evaluates to `undefined` yields `Some(EvalValue::Undefined)`.
    pub fn evaluate_attr(&self, name: &str) -> Option<EvalValue> {
        resolve_attribute(self, None, name)
    }

    /// Evaluate an attribute of this ad with `target` as `TARGET`
    pub fn evaluate_attr_against(&self, name: &str, target: &Ad) -> Option<EvalValue> {
        resolve_attribute(self, Some(target), name)
    }

    /// Evaluate an expression with this ad as `MY`
    pub fn eval(&self, expr: &Expr) -> EvalValue {
        expr.eval(self, None)
    }

    /// Evaluate an expression with this ad as `MY` and `target` as `TARGET`
    pub fn eval_against(&self, expr: &Expr, target: &Ad) -> EvalValue {
        expr.eval(self, Some(target))
    }

    /// Attribute evaluated to a string
    pub fn lookup_string(&self, name: &str) -> Option<String> {
        match self.evaluate_attr(name)? {
            EvalValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attribute evaluated to an integer
    ///
    /// Reals are truncated and booleans map to 0/1.
    pub fn lookup_integer(&self, name: &str) -> Option<i64> {
        match self.evaluate_attr(name)? {
            EvalValue::Int(i) => Some(i),
            EvalValue::Real(r) => Some(r as i64),
            EvalValue::Bool(b) => Some(i64::from(b)),
            _ => None,
        }
    }

    /// Attribute evaluated to a boolean
    ///
    /// Integers are true when non-zero.
    pub fn lookup_bool(&self, name: &str) -> Option<bool> {
        match self.evaluate_attr(name)? {
            EvalValue::Bool(b) => Some(b),
            EvalValue::Int(i) => Some(i != 0),
            _ => None,
        }
    }

    // =========================================================================
    // Well-known attributes
    // =========================================================================

    /// The `MyType` discriminator
    pub fn my_type(&self) -> Option<String> {
        self.lookup_string(attrs::MY_TYPE)
    }

    /// Overwrite the `MyType` discriminator
    pub fn set_my_type(&mut self, my_type: &str) {
        self.insert(attrs::MY_TYPE, my_type);
    }

    /// The `LastHeardFrom` timestamp, seconds since the Unix epoch
    pub fn last_heard_from(&self) -> Option<i64> {
        self.lookup_integer(attrs::LAST_HEARD_FROM)
    }

    /// Stamp `LastHeardFrom` unless the ad already carries one
    ///
    /// Ads reloaded from an offline store keep their original timestamp.
    /// Returns true if the stamp was applied.
    pub fn stamp_last_heard_from(&mut self, now: i64) -> bool {
        if self.contains(attrs::LAST_HEARD_FROM) {
            return false;
        }
        self.insert(attrs::LAST_HEARD_FROM, now);
        true
    }

    // =========================================================================
    // Cross-ad operations
    // =========================================================================

    /// Copy one attribute from `source`, keeping its spelling
    ///
    /// Returns false, leaving `self` untouched, if `source` lacks it.
    pub fn copy_attribute_from(&mut self, name: &str, source: &Ad) -> bool {
        match source.attrs.get(&fold(name)) {
            Some(attr) => {
                self.attrs.insert(fold(name), attr.clone());
                true
            }
            None => false,
        }
    }

    /// Overwrite every attribute present in `update`; attributes absent
    /// from `update` are left as they are
    pub fn merge_from(&mut self, update: &Ad) {
        for (key, attr) in &update.attrs {
            self.attrs.insert(key.clone(), attr.clone());
        }
    }
}

impl fmt::Display for Ad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for name in self.names() {
            if let Some(value) = self.get(name) {
                writeln!(f, "{} = {}", name, value)?;
            }
        }
        Ok(())
    }
}

impl<N: Into<String>, V: Into<Value>> FromIterator<(N, V)> for Ad {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut ad = Ad::new();
        for (name, value) in iter {
            ad.insert(name, value);
        }
        ad
    }
}

impl From<BTreeMap<String, Value>> for Ad {
    fn from(map: BTreeMap<String, Value>) -> Self {
        map.into_iter().collect()
    }
}

impl From<Ad> for BTreeMap<String, Value> {
    fn from(ad: Ad) -> Self {
        ad.attrs
            .into_values()
            .map(|attr| (attr.name, attr.value))
            .collect()
    }
}
