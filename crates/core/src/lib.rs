//! Core types for the ad collector
//!
//! This crate defines the data the collector stores and the vocabulary the
//! other crates share:
//! - Ad: case-insensitive attribute record
//! - Value: attribute value (constant or unevaluated expression)
//! - Expr / EvalValue: the attribute expression language
//! - AdType / AdKind: built-in and generic ad types
//! - Command: inbound command codes
//! - AdKey: per-type registry identity
//! - Clock: wall-clock seconds source
//! - Error: recoverable API errors

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ad;
pub mod ad_type;
pub mod attrs;
pub mod clock;
pub mod error;
pub mod expr;
pub mod key;
pub mod value;

pub use ad::Ad;
pub use ad_type::{AdKind, AdType, Command, WalkScope};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Error, Result};
pub use expr::{EvalValue, Expr, ParseError};
pub use key::{AdKey, KeyError};
pub use value::Value;
