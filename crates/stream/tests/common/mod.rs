//! Recording collaborators shared by the integration tests.
#![allow(dead_code)]

use std::cell::Cell;
use std::collections::{HashMap, HashSet};

use overworld_common::{Position, RegionCoord, RegionKey, RingDefinition};
use overworld_stream::{
    ConcentricRings, ContentGenerator, FeatureRemover, GenerationRequest, GenerationStage,
    GeneratorError, InfiniteWorld, RegionLocator, StreamingConfig, StreamingManager,
};

pub const RING_WIDTH: f32 = 100.0;

/// Locator that counts position lookups.
pub struct CountingLocator {
    pub inner: ConcentricRings,
    pub lookups: Cell<usize>,
}

impl CountingLocator {
    pub fn new(ring_width: f32) -> Self {
        Self {
            inner: ConcentricRings::new(ring_width).with_ring_definitions(vec![RingDefinition {
                ring: 0,
                structure_types: vec!["shrine".into()],
            }]),
            lookups: Cell::new(0),
        }
    }
}

impl RegionLocator for CountingLocator {
    fn region_for_position(&self, position: Position) -> Option<RegionCoord> {
        self.lookups.set(self.lookups.get() + 1);
        self.inner.region_for_position(position)
    }

    fn region_key(&self, region: &RegionCoord) -> RegionKey {
        self.inner.region_key(region)
    }

    fn region_center(&self, region: &RegionCoord) -> Position {
        self.inner.region_center(region)
    }

    fn ring_definition(&self, ring: u32) -> Option<RingDefinition> {
        self.inner.ring_definition(ring)
    }
}

#[derive(Default)]
pub struct FakeWorld {
    pub grow_calls: usize,
    pub max_ring: u32,
    /// Grow a ring whenever the player is within this many rings of the edge.
    pub grow_margin: Option<u32>,
    pub generated: HashSet<RegionCoord>,
}

impl InfiniteWorld for FakeWorld {
    fn generate_new_ring_if_needed(&mut self, position: Position) -> bool {
        self.grow_calls += 1;
        let Some(margin) = self.grow_margin else {
            return false;
        };
        let ring = (position.x.hypot(position.z) / RING_WIDTH) as u32;
        if ring + margin > self.max_ring {
            self.max_ring += 1;
            return true;
        }
        false
    }

    fn is_region_generated(&self, region: &RegionCoord) -> bool {
        self.generated.contains(region)
    }

    fn max_generated_ring(&self) -> u32 {
        self.max_ring
    }
}

#[derive(Default)]
pub struct RecordingGenerator {
    pub calls: Vec<(GenerationStage, RegionKey)>,
    /// Region key -> stage that fails for it.
    pub failures: HashMap<RegionKey, GenerationStage>,
    pub fail_everything: bool,
}

impl RecordingGenerator {
    pub fn stage_calls(&self, stage: GenerationStage) -> usize {
        self.calls.iter().filter(|(s, _)| *s == stage).count()
    }

    pub fn regions_started(&self) -> Vec<RegionKey> {
        self.calls
            .iter()
            .filter(|(s, _)| *s == GenerationStage::Terrain)
            .map(|(_, k)| k.clone())
            .collect()
    }
}

impl ContentGenerator for RecordingGenerator {
    fn generate(
        &mut self,
        stage: GenerationStage,
        request: &GenerationRequest,
    ) -> Result<(), GeneratorError> {
        self.calls.push((stage, request.key.clone()));
        if self.fail_everything || self.failures.get(&request.key) == Some(&stage) {
            return Err(GeneratorError::new(format!("{stage} exploded")));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingRemover {
    pub removed: Vec<RegionCoord>,
}

impl FeatureRemover for RecordingRemover {
    fn remove_features_by_region(&mut self, region: &RegionCoord) {
        self.removed.push(*region);
    }
}

pub type TestManager =
    StreamingManager<CountingLocator, FakeWorld, RecordingGenerator, RecordingRemover>;

pub fn manager_with(config: StreamingConfig, generator: RecordingGenerator) -> TestManager {
    StreamingManager::new(
        config,
        CountingLocator::new(RING_WIDTH),
        FakeWorld::default(),
        generator,
        RecordingRemover::default(),
    )
    .expect("valid config")
}

pub fn manager(config: StreamingConfig) -> TestManager {
    manager_with(config, RecordingGenerator::default())
}

pub fn key(ring: u32, sector: u32) -> RegionKey {
    RegionKey(format!("r{ring}:s{sector}"))
}
