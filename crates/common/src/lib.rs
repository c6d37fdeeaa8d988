//! Shared types for the overworld streaming stack.
//!
//! # Invariants
//! - Region identity is a plain value: equal fields mean the same region.

mod types;

pub use types::{Position, RegionCoord, RegionKey, RingDefinition};
