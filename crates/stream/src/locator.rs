//! Narrow contracts for the collaborators the streaming core consumes, plus
//! `ConcentricRings`, a simple locator used by tools, benches and tests.

use std::f32::consts::TAU;
use std::fmt;

use glam::Vec2;
use overworld_common::{Position, RegionCoord, RegionKey, RingDefinition};
use serde::{Deserialize, Serialize};

use crate::error::GeneratorError;

/// Maps world positions to regions.
pub trait RegionLocator {
    /// `None` when the position lies outside generated space.
    fn region_for_position(&self, position: Position) -> Option<RegionCoord>;
    fn region_key(&self, region: &RegionCoord) -> RegionKey;
    fn region_center(&self, region: &RegionCoord) -> Position;
    fn ring_definition(&self, ring: u32) -> Option<RingDefinition>;
}

/// Ring-growth bookkeeping of the infinite world.
pub trait InfiniteWorld {
    /// Grows the world outward if `position` is near its edge. Returns true if a ring was added.
    fn generate_new_ring_if_needed(&mut self, position: Position) -> bool;
    /// True if base content for `region` was already placed by ring growth.
    fn is_region_generated(&self, region: &RegionCoord) -> bool;
    fn max_generated_ring(&self) -> u32;
}

/// Steps of region population, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GenerationStage {
    Terrain,
    BaseContent,
    Features,
    Structures,
}

impl GenerationStage {
    pub const ORDER: [GenerationStage; 4] = [
        GenerationStage::Terrain,
        GenerationStage::BaseContent,
        GenerationStage::Features,
        GenerationStage::Structures,
    ];
}

impl fmt::Display for GenerationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GenerationStage::Terrain => "terrain",
            GenerationStage::BaseContent => "base content",
            GenerationStage::Features => "features",
            GenerationStage::Structures => "structures",
        };
        f.write_str(name)
    }
}

/// Everything a generator stage needs to know about the region it populates.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub region: RegionCoord,
    pub key: RegionKey,
    pub center: Position,
    pub ring: Option<RingDefinition>,
}

/// Terrain, procedural content, rock and structure generators.
pub trait ContentGenerator {
    fn generate(
        &mut self,
        stage: GenerationStage,
        request: &GenerationRequest,
    ) -> Result<(), GeneratorError>;
}

/// Owner of placed features; told when a region's content must be released.
pub trait FeatureRemover {
    fn remove_features_by_region(&mut self, region: &RegionCoord);
}

/// Concentric-ring locator centered on the world origin. Ring `r` spans
/// `[r, r + 1) * ring_width` and is split into `4 * (r + 1)` equal angular
/// sectors, counter-clockwise from +x towards +z, so regions stay roughly
/// square at any distance.
#[derive(Debug, Clone)]
pub struct ConcentricRings {
    ring_width: f32,
    max_ring: Option<u32>,
    rings: Vec<RingDefinition>,
}

impl ConcentricRings {
    /// Create an unbounded locator with the given ring width.
    pub fn new(ring_width: f32) -> Self {
        assert!(ring_width > 0.0, "ring_width must be positive");
        Self {
            ring_width,
            max_ring: None,
            rings: Vec::new(),
        }
    }

    /// Positions beyond `max_ring` report no region.
    pub fn with_max_ring(mut self, max_ring: u32) -> Self {
        self.max_ring = Some(max_ring);
        self
    }

    /// Ring definitions by index; rings past the end reuse the last entry.
    pub fn with_ring_definitions(mut self, rings: Vec<RingDefinition>) -> Self {
        self.rings = rings;
        self
    }

    pub fn ring_width(&self) -> f32 {
        self.ring_width
    }

    pub fn sectors_in_ring(ring: u32) -> u32 {
        ring.saturating_add(1).saturating_mul(4)
    }

    fn sector_angle(ring: u32) -> f32 {
        TAU / Self::sectors_in_ring(ring) as f32
    }
}

impl RegionLocator for ConcentricRings {
    fn region_for_position(&self, position: Position) -> Option<RegionCoord> {
        let horizontal = Vec2::new(position.x, position.z);
        let distance = horizontal.length();
        if !distance.is_finite() {
            return None;
        }
        let ring = (distance / self.ring_width).floor() as u32;
        if self.max_ring.is_some_and(|max| ring > max) {
            return None;
        }
        let mut angle = horizontal.y.atan2(horizontal.x);
        if angle < 0.0 {
            angle += TAU;
        }
        let last = Self::sectors_in_ring(ring) - 1;
        let sector = ((angle / Self::sector_angle(ring)).floor() as u32).min(last);
        Some(RegionCoord::new(ring, sector))
    }

    fn region_key(&self, region: &RegionCoord) -> RegionKey {
        RegionKey(format!("r{}:s{}", region.ring, region.sector))
    }

    fn region_center(&self, region: &RegionCoord) -> Position {
        let radius = (region.ring as f32 + 0.5) * self.ring_width;
        let angle = (region.sector as f32 + 0.5) * Self::sector_angle(region.ring);
        let offset = Vec2::from_angle(angle) * radius;
        Position::new(offset.x, 0.0, offset.y)
    }

    fn ring_definition(&self, ring: u32) -> Option<RingDefinition> {
        let template = self
            .rings
            .get(ring as usize)
            .or_else(|| self.rings.last())?;
        Some(RingDefinition {
            ring,
            structure_types: template.structure_types.clone(),
        })
    }
}
