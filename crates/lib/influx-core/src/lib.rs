//! Core query adapter for influx-mcp.
//!
//! This crate builds Flux text from structured parameters, submits it through
//! a `QueryBackend` (the `InfluxDB` HTTP API in production), and turns the
//! returned rows into records and per-measurement summaries.

pub mod control;
pub mod flux;
pub mod store;
