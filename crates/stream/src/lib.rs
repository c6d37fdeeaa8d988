//! Region streaming: keeps generated world regions resident around a moving player.
//!
//! # Invariants
//! - At most one registry entry per region key.
//! - At most one region is populated at a time, and at most one per tick.
//! - A region is either fully generated or not tracked; failures never escape a tick.
//! - Eviction keeps only regions within the retention radius and idle limit.
//!
//! Terrain, content and structure generation, and the ring/sector coordinate
//! system, are external collaborators reached through the traits in [`locator`].

mod config;
mod error;
mod eviction;
mod gate;
pub mod locator;
mod manager;
mod pipeline;
mod queue;
mod registry;
mod sampler;
mod stats;

pub use config::{DerivedRadii, MAX_SAMPLES_PER_TICK, StreamingConfig};
pub use error::{ConfigError, GenerationError, GeneratorError};
pub use eviction::{Eviction, EvictionReason, EvictionSweep};
pub use gate::UpdateGate;
pub use locator::{
    ConcentricRings, ContentGenerator, FeatureRemover, GenerationRequest, GenerationStage,
    InfiniteWorld, RegionLocator,
};
pub use manager::StreamingManager;
pub use pipeline::{GenerationPipeline, PopulateReport};
pub use queue::{GenerationQueue, QueuedRegion};
pub use registry::{
    Admission, CURRENT_REGION_BONUS, PRIORITY_DISTANCE_BASE, StreamingRegion, StreamingRegistry,
    region_priority,
};
pub use sampler::{CandidateSampler, Discovery};
pub use stats::{FrameTimer, GenerationOutcome, StreamingSnapshot, StreamingStats, TickReport};

pub fn crate_info() -> &'static str {
    "overworld-stream v0.1.0"
}
