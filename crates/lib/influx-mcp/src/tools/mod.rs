//! MCP tool modules.
//!
//! Tools are grouped by what they touch: Flux queries against the bucket,
//! the recent-measurements summary, and the local sensor map.

pub mod measurements;
pub mod query;
pub mod sensors;
