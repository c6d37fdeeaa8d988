use overworld_stream::{GenerationOutcome, StreamingSnapshot, TickReport};

/// Streaming inspector for developer tooling.
///
/// Turns snapshots and tick reports into printable summaries for debugging,
/// profiling, and development UI.
pub struct StreamingInspector;

impl StreamingInspector {
    /// Produce a summary of a streaming snapshot.
    pub fn summary(snapshot: &StreamingSnapshot) -> StreamingSummary {
        StreamingSummary {
            loaded: snapshot.loaded_regions,
            generating: snapshot.generating_regions,
            queued: snapshot.queue_length,
            streaming_radius: snapshot.radii.streaming,
            unload_radius: snapshot.radii.unload,
            fog: snapshot.fog_visibility_range,
            max_ring: snapshot.max_generated_ring,
            failures: snapshot.stats.generation_failures,
        }
    }

    /// Loaded regions per ring with a bar scaled to the busiest ring.
    pub fn ring_rows(snapshot: &StreamingSnapshot, width: usize) -> Vec<RingRow> {
        let peak = snapshot
            .ring_distribution
            .values()
            .copied()
            .max()
            .unwrap_or(0);
        snapshot
            .ring_distribution
            .iter()
            .map(|(&ring, &loaded)| RingRow {
                ring,
                loaded,
                bar: if peak == 0 {
                    String::new()
                } else {
                    "#".repeat((loaded * width).div_ceil(peak))
                },
            })
            .collect()
    }

    /// One-line description of a tick, `None` for gated ticks.
    pub fn describe_tick(report: &TickReport) -> Option<String> {
        if report.gated {
            return None;
        }
        let generation = match &report.generation {
            Some(GenerationOutcome::Loaded(key)) => format!("loaded {key}"),
            Some(GenerationOutcome::Failed { key, .. }) => format!("failed {key}"),
            None => "idle".to_string(),
        };
        Some(format!(
            "discovered={} admitted={} refreshed={} {} evicted={} ({:.2?})",
            report.discovered,
            report.admitted,
            report.refreshed,
            generation,
            report.evicted.len(),
            report.elapsed
        ))
    }
}

/// Summary of streaming state for the inspector.
#[derive(Debug, Clone)]
pub struct StreamingSummary {
    pub loaded: usize,
    pub generating: usize,
    pub queued: usize,
    pub streaming_radius: f32,
    pub unload_radius: f32,
    pub fog: f32,
    pub max_ring: u32,
    pub failures: u64,
}

impl std::fmt::Display for StreamingSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Streaming: loaded={} generating={} queued={} radii={:.1}/{:.1} fog={:.1} max_ring={} failures={}",
            self.loaded,
            self.generating,
            self.queued,
            self.streaming_radius,
            self.unload_radius,
            self.fog,
            self.max_ring,
            self.failures,
        )
    }
}

/// One ring of the loaded-region histogram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RingRow {
    pub ring: u32,
    pub loaded: usize,
    pub bar: String,
}

impl std::fmt::Display for RingRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ring {:>3} | {:>4} {}", self.ring, self.loaded, self.bar)
    }
}
