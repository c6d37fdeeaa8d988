use std::collections::HashSet;
use std::f32::consts::TAU;

use overworld_common::{Position, RegionCoord, RegionKey};

use crate::locator::RegionLocator;

/// Regions found around the player in one sampling pass.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    /// The player's own region, if the locator knows one.
    pub current: Option<(RegionKey, RegionCoord)>,
    /// Distinct regions in discovery order, the current region first.
    pub regions: Vec<(RegionKey, RegionCoord)>,
}

impl Discovery {
    pub fn is_current(&self, key: &RegionKey) -> bool {
        self.current.as_ref().is_some_and(|(current, _)| current == key)
    }
}

/// Coverage sampler: `rings` concentric circles of `angles` points each, plus
/// the player's own position.
///
/// Cost is O(rings * angles) per call regardless of region size; small regions
/// between sample points may be missed.
#[derive(Debug, Clone)]
pub struct CandidateSampler {
    rings: u32,
    angles: u32,
}

impl CandidateSampler {
    pub fn new(rings: u32, angles: u32) -> Self {
        Self {
            rings: rings.max(1),
            angles: angles.max(1),
        }
    }

    pub fn sample_count(&self) -> usize {
        (self.rings as usize)
            .saturating_mul(self.angles as usize)
            .saturating_add(1)
    }

    /// Sample positions, the player's position first.
    pub fn sample_points(&self, player: Position, radius: f32) -> Vec<Position> {
        let mut points = Vec::with_capacity(self.sample_count());
        points.push(player);
        for ring in 1..=self.rings {
            let distance = radius * ring as f32 / self.rings as f32;
            for step in 0..self.angles {
                let angle = TAU * step as f32 / self.angles as f32;
                points.push(Position::new(
                    player.x + distance * angle.cos(),
                    player.y,
                    player.z + distance * angle.sin(),
                ));
            }
        }
        points
    }

    /// Distinct regions within `radius` of the player. Samples outside generated space are dropped.
    pub fn discover<L: RegionLocator>(
        &self,
        locator: &L,
        player: Position,
        radius: f32,
    ) -> Discovery {
        let mut seen = HashSet::new();
        let mut discovery = Discovery::default();

        for (index, point) in self.sample_points(player, radius).into_iter().enumerate() {
            let Some(region) = locator.region_for_position(point) else {
                continue;
            };
            let key = locator.region_key(&region);
            if index == 0 {
                discovery.current = Some((key.clone(), region));
            }
            if seen.insert(key.clone()) {
                discovery.regions.push((key, region));
            }
        }

        tracing::trace!(
            samples = self.sample_count(),
            distinct = discovery.regions.len(),
            "sampled candidate regions"
        );
        discovery
    }
}
