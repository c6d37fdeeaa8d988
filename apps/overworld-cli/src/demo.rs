//! Synthetic collaborators for `simulate`: deterministic generators keyed by
//! seed and region, with optional injected failures.

use std::collections::HashMap;

use overworld_common::{Position, RegionCoord};
use overworld_stream::{
    ContentGenerator, FeatureRemover, GenerationRequest, GenerationStage, GeneratorError,
    InfiniteWorld,
};

/// Splitmix64: a fast, deterministic mixing step.
fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

fn region_hash(seed: u64, region: &RegionCoord, salt: u64) -> u64 {
    let mut h = splitmix64(seed ^ salt);
    h = splitmix64(h ^ u64::from(region.ring));
    splitmix64(h ^ u64::from(region.sector))
}

fn stage_salt(stage: GenerationStage) -> u64 {
    match stage {
        GenerationStage::Terrain => 1,
        GenerationStage::BaseContent => 2,
        GenerationStage::Features => 3,
        GenerationStage::Structures => 4,
    }
}

/// Ring bookkeeping: keeps `margin` rings generated beyond the player's ring.
/// Ring 0 is pre-populated at startup.
pub struct DemoWorld {
    ring_width: f32,
    margin: u32,
    max_ring: u32,
}

impl DemoWorld {
    pub fn new(ring_width: f32, margin: u32) -> Self {
        Self {
            ring_width,
            margin,
            max_ring: margin,
        }
    }
}

impl InfiniteWorld for DemoWorld {
    fn generate_new_ring_if_needed(&mut self, position: Position) -> bool {
        let ring = (position.x.hypot(position.z) / self.ring_width) as u32;
        if ring + self.margin > self.max_ring {
            self.max_ring += 1;
            return true;
        }
        false
    }

    fn is_region_generated(&self, region: &RegionCoord) -> bool {
        region.ring == 0
    }

    fn max_generated_ring(&self) -> u32 {
        self.max_ring
    }
}

/// Places a deterministic number of rocks and at most one structure per region.
pub struct DemoGenerator {
    seed: u64,
    /// Per-stage failure probability in `[0, 1]`, decided by region hash.
    fail_rate: f64,
    pub rocks: HashMap<RegionCoord, u32>,
    pub structures: HashMap<RegionCoord, String>,
    pub stage_runs: u64,
}

impl DemoGenerator {
    pub fn new(seed: u64, fail_rate: f64) -> Self {
        Self {
            seed,
            fail_rate: fail_rate.clamp(0.0, 1.0),
            rocks: HashMap::new(),
            structures: HashMap::new(),
            stage_runs: 0,
        }
    }

    pub fn rock_count(&self) -> u64 {
        self.rocks.values().map(|&n| u64::from(n)).sum()
    }

    fn should_fail(&self, stage: GenerationStage, region: &RegionCoord) -> bool {
        if self.fail_rate <= 0.0 {
            return false;
        }
        let roll = region_hash(self.seed, region, 0x0fa1 + stage_salt(stage));
        (roll as f64 / u64::MAX as f64) < self.fail_rate
    }
}

impl ContentGenerator for DemoGenerator {
    fn generate(
        &mut self,
        stage: GenerationStage,
        request: &GenerationRequest,
    ) -> Result<(), GeneratorError> {
        self.stage_runs += 1;
        if self.should_fail(stage, &request.region) {
            return Err(GeneratorError::new(format!(
                "synthetic {stage} failure at {}",
                request.region
            )));
        }
        match stage {
            GenerationStage::Terrain | GenerationStage::BaseContent => {}
            GenerationStage::Features => {
                let rocks = (region_hash(self.seed, &request.region, 0x70c5) % 12) as u32;
                self.rocks.insert(request.region, rocks);
            }
            GenerationStage::Structures => {
                let Some(ring) = &request.ring else {
                    return Ok(());
                };
                if ring.structure_types.is_empty() {
                    return Ok(());
                }
                let pick = region_hash(self.seed, &request.region, 0x57c7) as usize
                    % ring.structure_types.len();
                self.structures
                    .insert(request.region, ring.structure_types[pick].clone());
            }
        }
        Ok(())
    }
}

/// Counts release notifications. Placed content is tracked by [`DemoGenerator`]
/// and stays in its tallies.
#[derive(Default)]
pub struct DemoRemover {
    pub released: u64,
}

impl FeatureRemover for DemoRemover {
    fn remove_features_by_region(&mut self, region: &RegionCoord) {
        tracing::trace!(%region, "releasing demo content");
        self.released += 1;
    }
}
