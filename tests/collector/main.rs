//! End-to-end scenarios for the collector engine.

#[path = "../common/mod.rs"]
mod common;

mod admission;
mod expiration;
mod forwarding;
mod queries;
mod properties;
mod startd;
mod update_semantics;
