//! Data models for the watchlist record store.
//!
//! Field names match the JSON file consumed by the alerting job.

mod commit;
mod location;

pub use commit::*;
pub use location::*;
