mod common;

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use common::{RecordingGenerator, key, manager_with};
use overworld_common::{Position, RegionCoord, RegionKey};
use overworld_stream::{
    EvictionReason, GenerationOutcome, GenerationQueue, GenerationStage, RegionLocator,
    StreamingConfig, StreamingRegistry,
};
use proptest::prelude::*;

fn arb_step() -> impl Strategy<Value = (f32, f32, u64)> {
    (-80.0f32..80.0, -80.0f32..80.0, 0u64..20_000)
}

fn arb_walk() -> impl Strategy<Value = Vec<(f32, f32, u64)>> {
    prop::collection::vec(arb_step(), 1..40)
}

fn failing_generator() -> RecordingGenerator {
    let mut generator = RecordingGenerator::default();
    for sector in 0..8 {
        generator
            .failures
            .insert(key(1, sector), GenerationStage::Features);
    }
    generator
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    // Every tick keeps one entry per key, generates at most one region, queues
    // only regions still waiting, and leaves only entries that satisfy the
    // retention rule.
    #[test]
    fn random_walk_preserves_streaming_invariants(
        walk in arb_walk(),
        fog in 100.0f32..800.0,
    ) {
        let config = StreamingConfig::default();
        let max_idle = config.max_idle_age();
        let mut m = manager_with(config, failing_generator());
        m.set_fog_visibility_range(fog);
        let retention = m.unload_radius();

        let t0 = Instant::now();
        let mut elapsed = Duration::ZERO;
        let mut position = Position::ZERO;

        for (dx, dz, dt) in walk {
            position += Position::new(dx, 0.0, dz);
            elapsed += Duration::from_millis(dt);
            let now = t0 + elapsed;

            let before: HashMap<RegionKey, (Instant, RegionCoord)> = m
                .registry()
                .iter()
                .map(|(k, e)| (k.clone(), (e.last_access_time, e.region)))
                .collect();
            let terrain_before = m.generator().stage_calls(GenerationStage::Terrain);

            let report = m.update(position, now);

            let terrain_after = m.generator().stage_calls(GenerationStage::Terrain);
            prop_assert!(terrain_after - terrain_before <= 1);
            prop_assert!(!m.is_processing_queue());

            let keys: HashSet<&RegionKey> = m.registry().keys().collect();
            prop_assert_eq!(keys.len(), m.registry().len());

            if report.gated {
                prop_assert_eq!(m.registry().len(), before.len());
                continue;
            }

            prop_assert_eq!(m.queue_len(), m.generating_count());

            // Regions admitted this tick are only judged by the next sweep.
            for (key, entry) in m.registry().iter() {
                if !before.contains_key(key) {
                    continue;
                }
                let distance = m.locator().region_center(&entry.region).distance(position);
                prop_assert!(distance <= retention);
                prop_assert!(now.saturating_duration_since(entry.last_access_time) <= max_idle);
            }

            for eviction in &report.evicted {
                let distance = m.locator().region_center(&eviction.region).distance(position);
                match eviction.reason {
                    EvictionReason::Distance => prop_assert!(distance > retention),
                    EvictionReason::Idle => {
                        let (last_access, _) = before[&eviction.key];
                        prop_assert!(now.saturating_duration_since(last_access) > max_idle);
                    }
                    other => prop_assert!(false, "unexpected eviction reason {:?}", other),
                }
            }

            if let Some(GenerationOutcome::Failed { key, .. }) = &report.generation {
                prop_assert!(m.region(key).is_none());
                prop_assert!(!m.is_queued(key));
            }
        }
    }

    // Without intervening admissions, pops come out in non-increasing priority.
    #[test]
    fn queue_pops_in_priority_order(priorities in prop::collection::vec(-2000.0f32..2000.0, 1..64)) {
        let mut registry = StreamingRegistry::new();
        let mut queue = GenerationQueue::new();
        let now = Instant::now();
        for (i, priority) in priorities.iter().enumerate() {
            let k = RegionKey(format!("k{i}"));
            registry.admit_or_refresh(k.clone(), RegionCoord::new(0, i as u32), *priority, now);
            queue.enqueue(k, RegionCoord::new(0, i as u32));
        }

        let mut last = f32::INFINITY;
        let mut popped = 0;
        while let Some(next) = queue.schedule_next(&registry) {
            let priority = registry.priority_of(&next.key).unwrap();
            prop_assert!(priority <= last);
            last = priority;
            popped += 1;
        }
        prop_assert_eq!(popped, priorities.len());
    }
}
