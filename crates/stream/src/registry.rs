use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use overworld_common::{Position, RegionCoord, RegionKey};

/// Added to the priority of the player's own region.
pub const CURRENT_REGION_BONUS: f32 = 500.0;
/// Distance at which a non-current region's priority reaches zero.
pub const PRIORITY_DISTANCE_BASE: f32 = 1000.0;

/// Generation priority: closer is higher, the player's own region highest.
///
/// The bonus only dominates while distances stay below
/// `PRIORITY_DISTANCE_BASE + CURRENT_REGION_BONUS`.
pub fn region_priority(center: Position, player: Position, is_current: bool) -> f32 {
    let bonus = if is_current { CURRENT_REGION_BONUS } else { 0.0 };
    PRIORITY_DISTANCE_BASE - center.distance(player) + bonus
}

/// Per-region streaming state.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamingRegion {
    pub region: RegionCoord,
    pub is_loaded: bool,
    pub is_generating: bool,
    pub last_access_time: Instant,
    pub priority: f32,
}

/// Result of offering a discovered region to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// First sighting: inserted as generating and must be queued.
    Admitted,
    /// Already tracked: access time and priority refreshed.
    Refreshed,
}

/// Authoritative map from region key to streaming state. One entry per key.
#[derive(Debug, Default)]
pub struct StreamingRegistry {
    regions: HashMap<RegionKey, StreamingRegion>,
}

impl StreamingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new generating entry, or refresh `last_access_time` and
    /// `priority` of an existing one without touching its load state.
    pub fn admit_or_refresh(
        &mut self,
        key: RegionKey,
        region: RegionCoord,
        priority: f32,
        now: Instant,
    ) -> Admission {
        match self.regions.get_mut(&key) {
            Some(entry) => {
                entry.last_access_time = now;
                entry.priority = priority;
                Admission::Refreshed
            }
            None => {
                tracing::debug!(%key, priority, "admitting region");
                self.regions.insert(
                    key,
                    StreamingRegion {
                        region,
                        is_loaded: false,
                        is_generating: true,
                        last_access_time: now,
                        priority,
                    },
                );
                Admission::Admitted
            }
        }
    }

    /// Flip an entry to loaded. Returns false if it was removed meanwhile.
    pub fn mark_loaded(&mut self, key: &RegionKey) -> bool {
        match self.regions.get_mut(key) {
            Some(entry) => {
                entry.is_loaded = true;
                entry.is_generating = false;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, key: &RegionKey) -> Option<StreamingRegion> {
        self.regions.remove(key)
    }

    pub fn get(&self, key: &RegionKey) -> Option<&StreamingRegion> {
        self.regions.get(key)
    }

    pub fn contains(&self, key: &RegionKey) -> bool {
        self.regions.contains_key(key)
    }

    pub fn priority_of(&self, key: &RegionKey) -> Option<f32> {
        self.regions.get(key).map(|entry| entry.priority)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RegionKey, &StreamingRegion)> {
        self.regions.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &RegionKey> {
        self.regions.keys()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn loaded_count(&self) -> usize {
        self.regions.values().filter(|r| r.is_loaded).count()
    }

    pub fn generating_count(&self) -> usize {
        self.regions.values().filter(|r| r.is_generating).count()
    }

    /// Loaded regions per ring, in ring order.
    pub fn ring_distribution(&self) -> BTreeMap<u32, usize> {
        let mut distribution = BTreeMap::new();
        for entry in self.regions.values().filter(|r| r.is_loaded) {
            *distribution.entry(entry.region.ring).or_insert(0) += 1;
        }
        distribution
    }

    /// Remove and return every entry.
    pub fn drain(&mut self) -> Vec<(RegionKey, StreamingRegion)> {
        self.regions.drain().collect()
    }
}
