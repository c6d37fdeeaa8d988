use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Instant;

use overworld_common::{Position, RegionKey};

use crate::config::{DerivedRadii, StreamingConfig};
use crate::error::ConfigError;
use crate::eviction::{Eviction, EvictionReason, EvictionSweep};
use crate::gate::UpdateGate;
use crate::locator::{ContentGenerator, FeatureRemover, InfiniteWorld, RegionLocator};
use crate::pipeline::GenerationPipeline;
use crate::queue::GenerationQueue;
use crate::registry::{Admission, StreamingRegion, StreamingRegistry, region_priority};
use crate::sampler::CandidateSampler;
use crate::stats::{FrameTimer, GenerationOutcome, StreamingSnapshot, StreamingStats, TickReport};

const TIMER_CAPACITY: usize = 120;

/// Keeps the set of resident regions in step with a moving player.
///
/// Owns its collaborators and all streaming state; everything is mutated only
/// through [`StreamingManager::update`] and the explicit control calls below.
/// Each tick runs, in order: movement gate, sampling, admission/refresh, at
/// most one region generation, eviction.
pub struct StreamingManager<L, W, G, R> {
    config: StreamingConfig,
    fog_visibility_range: f32,
    radii: DerivedRadii,
    locator: L,
    world: W,
    generator: G,
    remover: R,
    sampler: CandidateSampler,
    registry: StreamingRegistry,
    queue: GenerationQueue,
    pipeline: GenerationPipeline,
    gate: UpdateGate,
    /// Consecutive failures per region. Only written when an attempt cap is set.
    failures: HashMap<RegionKey, u32>,
    stats: StreamingStats,
    timer: FrameTimer,
}

impl<L, W, G, R> StreamingManager<L, W, G, R>
where
    L: RegionLocator,
    W: InfiniteWorld,
    G: ContentGenerator,
    R: FeatureRemover,
{
    pub fn new(
        config: StreamingConfig,
        locator: L,
        world: W,
        generator: G,
        remover: R,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let fog_visibility_range = config.fog_visibility_range;
        Ok(Self {
            radii: config.derived_radii(fog_visibility_range),
            sampler: CandidateSampler::new(config.sampler_rings, config.sampler_angles),
            gate: UpdateGate::new(config.movement_threshold),
            fog_visibility_range,
            config,
            locator,
            world,
            generator,
            remover,
            registry: StreamingRegistry::new(),
            queue: GenerationQueue::new(),
            pipeline: GenerationPipeline::new(),
            failures: HashMap::new(),
            stats: StreamingStats::default(),
            timer: FrameTimer::new(TIMER_CAPACITY),
        })
    }

    /// Per-tick entry point. A no-op unless the player moved past the movement threshold.
    pub fn update(&mut self, player: Position, now: Instant) -> TickReport {
        if !self.gate.should_update(player) {
            self.stats.ticks += 1;
            self.stats.gated_ticks += 1;
            return TickReport::gated();
        }
        self.run_tick(player, now)
    }

    /// Run a full tick regardless of how far the player moved.
    pub fn force_update(&mut self, player: Position, now: Instant) -> TickReport {
        self.gate.force(player);
        self.run_tick(player, now)
    }

    fn run_tick(&mut self, player: Position, now: Instant) -> TickReport {
        let _span = tracing::info_span!("stream_update").entered();
        let tick_start = Instant::now();
        self.stats.ticks += 1;

        if self.world.generate_new_ring_if_needed(player) {
            self.stats.rings_grown += 1;
            tracing::info!(
                max_ring = self.world.max_generated_ring(),
                "infinite world grew a ring"
            );
        }

        let discovery = self
            .sampler
            .discover(&self.locator, player, self.radii.streaming);
        let mut report = TickReport {
            discovered: discovery.regions.len(),
            ..TickReport::default()
        };
        let mut admitted = HashSet::new();

        for (key, region) in &discovery.regions {
            if self.is_quarantined(key) {
                report.skipped_quarantined += 1;
                continue;
            }
            let center = self.locator.region_center(region);
            let priority = region_priority(center, player, discovery.is_current(key));
            match self
                .registry
                .admit_or_refresh(key.clone(), *region, priority, now)
            {
                Admission::Admitted => {
                    self.queue.enqueue(key.clone(), *region);
                    admitted.insert(key.clone());
                    report.admitted += 1;
                }
                Admission::Refreshed => report.refreshed += 1,
            }
        }
        self.stats.regions_admitted += report.admitted as u64;

        report.generation = self.process_queue();

        let sweep = EvictionSweep::new(self.radii.unload, self.config.max_idle_age());
        report.evicted = sweep.sweep(&mut self.registry, &self.locator, player, now, &admitted);
        for eviction in &report.evicted {
            self.queue.remove(&eviction.key);
            self.remover.remove_features_by_region(&eviction.region);
        }
        self.stats.regions_evicted += report.evicted.len() as u64;

        report.elapsed = tick_start.elapsed();
        self.timer.record(report.elapsed);

        tracing::trace!(
            discovered = report.discovered,
            admitted = report.admitted,
            evicted = report.evicted.len(),
            loaded = self.registry.loaded_count(),
            queued = self.queue.len(),
            "stream update complete"
        );
        report
    }

    /// Pop the best queued region and populate it, if the single slot is free.
    fn process_queue(&mut self) -> Option<GenerationOutcome> {
        if self.pipeline.is_processing() {
            return None;
        }
        let next = loop {
            let candidate = self.queue.schedule_next(&self.registry)?;
            if self.registry.contains(&candidate.key) {
                break candidate;
            }
            // Removed from the registry without going through the sweep.
            tracing::debug!(key = %candidate.key, "discarding stale queue entry");
            self.stats.stale_pops += 1;
        };

        let request = GenerationPipeline::request(&self.locator, next.key, next.region);
        let result = self
            .pipeline
            .populate(&request, &self.world, &mut self.generator)?;

        match result {
            Ok(populated) => {
                self.registry.mark_loaded(&populated.key);
                self.failures.remove(&populated.key);
                self.stats.regions_loaded += 1;
                tracing::debug!(key = %populated.key, stages = populated.stages.len(), "region loaded");
                Some(GenerationOutcome::Loaded(populated.key))
            }
            Err(err) => {
                tracing::warn!(
                    key = %err.key,
                    stage = %err.stage,
                    error = %err.source,
                    "region generation failed"
                );
                self.registry.remove(&err.key);
                self.remover.remove_features_by_region(&request.region);
                if self.config.max_generation_attempts.is_some() {
                    *self.failures.entry(err.key.clone()).or_insert(0) += 1;
                }
                self.stats.generation_failures += 1;
                Some(GenerationOutcome::Failed {
                    error: err.to_string(),
                    key: err.key,
                })
            }
        }
    }

    fn is_quarantined(&self, key: &RegionKey) -> bool {
        self.config
            .max_generation_attempts
            .is_some_and(|max| self.failure_count(key) >= max)
    }

    /// Set the fog range and recompute both dynamic radii. Non-positive or
    /// non-finite ranges are ignored.
    pub fn set_fog_visibility_range(&mut self, range: f32) {
        if !range.is_finite() || range <= 0.0 {
            tracing::warn!(range, "ignoring invalid fog visibility range");
            return;
        }
        self.fog_visibility_range = range;
        self.radii = self.config.derived_radii(range);
        tracing::debug!(
            streaming = self.radii.streaming,
            unload = self.radii.unload,
            "fog range changed"
        );
    }

    /// Evict every region, notifying the feature owner, and clear the queue,
    /// failure history, movement gate and statistics.
    pub fn reset(&mut self) -> Vec<Eviction> {
        let evicted: Vec<Eviction> = self
            .registry
            .drain()
            .into_iter()
            .map(|(key, entry)| Eviction {
                key,
                region: entry.region,
                reason: EvictionReason::Reset,
            })
            .collect();
        for eviction in &evicted {
            self.remover.remove_features_by_region(&eviction.region);
        }
        self.queue.clear();
        self.failures.clear();
        self.gate.reset();
        self.stats = StreamingStats::default();
        tracing::info!(evicted = evicted.len(), "streaming state reset");
        evicted
    }

    /// Forget failure counts so capped regions become admissible again.
    pub fn clear_failure_history(&mut self) {
        self.failures.clear();
    }

    /// Consecutive failures recorded for `key`. Always 0 without an attempt cap.
    pub fn failure_count(&self, key: &RegionKey) -> u32 {
        self.failures.get(key).copied().unwrap_or(0)
    }

    /// Number of region keys with a recorded failure. With an attempt cap,
    /// entries are kept until success, `clear_failure_history` or `reset`.
    pub fn remembered_failures(&self) -> usize {
        self.failures.len()
    }

    pub fn loaded_count(&self) -> usize {
        self.registry.loaded_count()
    }

    pub fn generating_count(&self) -> usize {
        self.registry.generating_count()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_queued(&self, key: &RegionKey) -> bool {
        self.queue.contains(key)
    }

    pub fn is_processing_queue(&self) -> bool {
        self.pipeline.is_processing()
    }

    pub fn ring_distribution(&self) -> BTreeMap<u32, usize> {
        self.registry.ring_distribution()
    }

    pub fn radii(&self) -> DerivedRadii {
        self.radii
    }

    pub fn streaming_radius(&self) -> f32 {
        self.radii.streaming
    }

    pub fn unload_radius(&self) -> f32 {
        self.radii.unload
    }

    pub fn fog_visibility_range(&self) -> f32 {
        self.fog_visibility_range
    }

    pub fn region(&self, key: &RegionKey) -> Option<&StreamingRegion> {
        self.registry.get(key)
    }

    pub fn registry(&self) -> &StreamingRegistry {
        &self.registry
    }

    pub fn config(&self) -> &StreamingConfig {
        &self.config
    }

    pub fn stats(&self) -> &StreamingStats {
        &self.stats
    }

    pub fn frame_timer(&self) -> &FrameTimer {
        &self.timer
    }

    pub fn locator(&self) -> &L {
        &self.locator
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn generator_mut(&mut self) -> &mut G {
        &mut self.generator
    }

    pub fn remover(&self) -> &R {
        &self.remover
    }

    pub fn snapshot(&self) -> StreamingSnapshot {
        StreamingSnapshot {
            loaded_regions: self.loaded_count(),
            generating_regions: self.generating_count(),
            queue_length: self.queue_len(),
            ring_distribution: self.ring_distribution(),
            radii: self.radii,
            fog_visibility_range: self.fog_visibility_range,
            max_generated_ring: self.world.max_generated_ring(),
            is_processing_queue: self.is_processing_queue(),
            stats: self.stats.clone(),
        }
    }
}
