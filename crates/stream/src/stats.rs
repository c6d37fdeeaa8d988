use std::collections::BTreeMap;
use std::time::Duration;

use overworld_common::RegionKey;
use serde::Serialize;

use crate::config::DerivedRadii;
use crate::eviction::Eviction;

/// Outcome of the single generation slot in one tick.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Loaded(RegionKey),
    Failed { key: RegionKey, error: String },
}

/// What one call to `StreamingManager::update` did.
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    /// The movement gate suppressed the tick.
    pub gated: bool,
    pub discovered: usize,
    pub admitted: usize,
    pub refreshed: usize,
    pub skipped_quarantined: usize,
    pub generation: Option<GenerationOutcome>,
    pub evicted: Vec<Eviction>,
    pub elapsed: Duration,
}

impl TickReport {
    pub fn gated() -> Self {
        Self {
            gated: true,
            ..Self::default()
        }
    }
}

/// Cumulative streaming counters since construction or the last reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StreamingStats {
    pub ticks: u64,
    pub gated_ticks: u64,
    pub regions_admitted: u64,
    pub regions_loaded: u64,
    pub generation_failures: u64,
    pub stale_pops: u64,
    pub regions_evicted: u64,
    pub rings_grown: u64,
}

/// Read-only view of the streaming state for tooling.
#[derive(Debug, Clone, Serialize)]
pub struct StreamingSnapshot {
    pub loaded_regions: usize,
    pub generating_regions: usize,
    pub queue_length: usize,
    pub ring_distribution: BTreeMap<u32, usize>,
    pub radii: DerivedRadii,
    pub fog_visibility_range: f32,
    pub max_generated_ring: u32,
    pub is_processing_queue: bool,
    pub stats: StreamingStats,
}

/// Rolling tick-duration history.
#[derive(Debug)]
pub struct FrameTimer {
    history: Vec<Duration>,
    capacity: usize,
    index: usize,
    filled: bool,
}

impl FrameTimer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            history: vec![Duration::ZERO; capacity],
            capacity,
            index: 0,
            filled: false,
        }
    }

    pub fn record(&mut self, dt: Duration) {
        self.history[self.index] = dt;
        self.index = (self.index + 1) % self.capacity;
        if self.index == 0 {
            self.filled = true;
        }
    }

    fn recorded(&self) -> &[Duration] {
        &self.history[..self.count()]
    }

    pub fn average(&self) -> Duration {
        let samples = self.recorded();
        if samples.is_empty() {
            return Duration::ZERO;
        }
        samples.iter().sum::<Duration>() / samples.len() as u32
    }

    pub fn max(&self) -> Duration {
        self.recorded().iter().copied().max().unwrap_or(Duration::ZERO)
    }

    pub fn count(&self) -> usize {
        if self.filled {
            self.capacity
        } else {
            self.index
        }
    }
}
