//! Result models and schema helpers for influx-mcp.
//!
//! This crate defines the record types produced by the query adapter and the
//! Flux column names and default windows shared by the query builders.

pub mod models;
pub mod schema;

pub use models::*;
