use std::cmp::Ordering;
use std::collections::HashSet;

use overworld_common::{RegionCoord, RegionKey};

use crate::registry::StreamingRegistry;

/// A region waiting for population.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedRegion {
    pub key: RegionKey,
    pub region: RegionCoord,
}

/// Priority worklist of regions awaiting generation, deduplicated by key.
///
/// Order is decided at pop time from the registry's current priorities, so it
/// follows the player between ticks.
#[derive(Debug, Default)]
pub struct GenerationQueue {
    pending: Vec<QueuedRegion>,
    members: HashSet<RegionKey>,
}

impl GenerationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the key was already queued.
    pub fn enqueue(&mut self, key: RegionKey, region: RegionCoord) -> bool {
        if !self.members.insert(key.clone()) {
            return false;
        }
        self.pending.push(QueuedRegion { key, region });
        true
    }

    /// Re-sort by current registry priority (descending) and pop the best entry.
    ///
    /// Entries without a registry record sort last.
    pub fn schedule_next(&mut self, registry: &StreamingRegistry) -> Option<QueuedRegion> {
        if self.pending.is_empty() {
            return None;
        }
        // Stable sort: equal priorities keep admission order.
        self.pending.sort_by(|a, b| {
            let pa = registry.priority_of(&a.key).unwrap_or(f32::NEG_INFINITY);
            let pb = registry.priority_of(&b.key).unwrap_or(f32::NEG_INFINITY);
            pb.partial_cmp(&pa).unwrap_or(Ordering::Equal)
        });
        let next = self.pending.remove(0);
        self.members.remove(&next.key);
        Some(next)
    }

    /// Drop a queued entry, e.g. when its region is evicted before its turn.
    pub fn remove(&mut self, key: &RegionKey) -> bool {
        if !self.members.remove(key) {
            return false;
        }
        self.pending.retain(|queued| &queued.key != key);
        true
    }

    pub fn contains(&self, key: &RegionKey) -> bool {
        self.members.contains(key)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.members.clear();
    }
}
