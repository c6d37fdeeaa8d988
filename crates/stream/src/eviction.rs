use std::collections::HashSet;
use std::time::{Duration, Instant};

use overworld_common::{Position, RegionCoord, RegionKey};
use serde::Serialize;

use crate::locator::RegionLocator;
use crate::registry::StreamingRegistry;

/// Why a region left the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EvictionReason {
    /// Beyond the retention radius.
    Distance,
    /// Not rediscovered within the idle limit.
    Idle,
    /// Population failed.
    GenerationFailed,
    /// Explicit reset of the whole registry.
    Reset,
}

/// A region removed from the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct Eviction {
    pub key: RegionKey,
    pub region: RegionCoord,
    pub reason: EvictionReason,
}

/// Retention rule: an entry survives only while within `retention_radius`
/// and rediscovered within `max_idle_age`.
#[derive(Debug, Clone, Copy)]
pub struct EvictionSweep {
    pub retention_radius: f32,
    pub max_idle_age: Duration,
}

impl EvictionSweep {
    pub fn new(retention_radius: f32, max_idle_age: Duration) -> Self {
        Self {
            retention_radius,
            max_idle_age,
        }
    }

    /// Reason to evict a region at `distance` last seen at `last_access`, if any.
    /// Distance wins when both apply.
    pub fn verdict(&self, distance: f32, last_access: Instant, now: Instant) -> Option<EvictionReason> {
        if distance > self.retention_radius {
            Some(EvictionReason::Distance)
        } else if now.saturating_duration_since(last_access) > self.max_idle_age {
            Some(EvictionReason::Idle)
        } else {
            None
        }
    }

    /// Remove every entry that fails the retention rule and return them.
    /// Keys in `admitted` entered the registry this tick and are kept until a
    /// later sweep. The caller notifies the feature owner.
    pub fn sweep<L: RegionLocator>(
        &self,
        registry: &mut StreamingRegistry,
        locator: &L,
        player: Position,
        now: Instant,
        admitted: &HashSet<RegionKey>,
    ) -> Vec<Eviction> {
        let doomed: Vec<Eviction> = registry
            .iter()
            .filter(|(key, _)| !admitted.contains(*key))
            .filter_map(|(key, entry)| {
                let distance = locator.region_center(&entry.region).distance(player);
                self.verdict(distance, entry.last_access_time, now)
                    .map(|reason| Eviction {
                        key: key.clone(),
                        region: entry.region,
                        reason,
                    })
            })
            .collect();

        for eviction in &doomed {
            tracing::debug!(key = %eviction.key, reason = ?eviction.reason, "evicting region");
            registry.remove(&eviction.key);
        }
        doomed
    }
}
