use overworld_common::{Position, RegionCoord, RegionKey};

use crate::error::GenerationError;
use crate::locator::{
    ContentGenerator, GenerationRequest, GenerationStage, InfiniteWorld, RegionLocator,
};

/// What a successful population actually ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulateReport {
    pub key: RegionKey,
    pub stages: Vec<GenerationStage>,
}

/// Runs the external generators for one region, all-or-nothing, one region at a time.
#[derive(Debug, Default)]
pub struct GenerationPipeline {
    in_flight: Option<RegionKey>,
}

impl GenerationPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a region is being populated.
    pub fn is_processing(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight(&self) -> Option<&RegionKey> {
        self.in_flight.as_ref()
    }

    /// Claim the single in-flight slot. Returns false if it is taken.
    fn begin(&mut self, key: &RegionKey) -> bool {
        if self.in_flight.is_some() {
            return false;
        }
        self.in_flight = Some(key.clone());
        true
    }

    fn finish(&mut self) {
        self.in_flight = None;
    }

    /// Build the per-region request handed to every stage.
    pub fn request<L: RegionLocator>(
        locator: &L,
        key: RegionKey,
        region: RegionCoord,
    ) -> GenerationRequest {
        let center: Position = locator.region_center(&region);
        GenerationRequest {
            ring: locator.ring_definition(region.ring),
            region,
            key,
            center,
        }
    }

    /// Run terrain, base content, features and structures in order. The first
    /// failing stage aborts the rest.
    ///
    /// Base content is skipped when the infinite world already placed it.
    /// Returns `None` if another region is already in flight.
    pub fn populate<W, G>(
        &mut self,
        request: &GenerationRequest,
        world: &W,
        generator: &mut G,
    ) -> Option<Result<PopulateReport, GenerationError>>
    where
        W: InfiniteWorld,
        G: ContentGenerator,
    {
        if !self.begin(&request.key) {
            tracing::debug!(key = %request.key, "generation already in flight");
            return None;
        }
        let result = Self::run_stages(request, world, generator);
        self.finish();
        Some(result)
    }

    fn run_stages<W, G>(
        request: &GenerationRequest,
        world: &W,
        generator: &mut G,
    ) -> Result<PopulateReport, GenerationError>
    where
        W: InfiniteWorld,
        G: ContentGenerator,
    {
        let base_already_placed = world.is_region_generated(&request.region);
        let mut stages = Vec::with_capacity(GenerationStage::ORDER.len());

        for stage in GenerationStage::ORDER {
            if stage == GenerationStage::BaseContent && base_already_placed {
                tracing::debug!(key = %request.key, "base content already generated, skipping");
                continue;
            }
            tracing::debug!(key = %request.key, %stage, "running generation stage");
            generator
                .generate(stage, request)
                .map_err(|source| GenerationError {
                    key: request.key.clone(),
                    stage,
                    source,
                })?;
            stages.push(stage);
        }

        Ok(PopulateReport {
            key: request.key.clone(),
            stages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeneratorError;
    use crate::locator::ConcentricRings;
    use std::collections::HashSet;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<GenerationStage>,
        fail_on: Option<GenerationStage>,
    }

    impl ContentGenerator for Recorder {
        fn generate(
            &mut self,
            stage: GenerationStage,
            _request: &GenerationRequest,
        ) -> Result<(), GeneratorError> {
            self.calls.push(stage);
            if self.fail_on == Some(stage) {
                return Err(GeneratorError::new("boom"));
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct Rings {
        generated: HashSet<RegionCoord>,
    }

    impl InfiniteWorld for Rings {
        fn generate_new_ring_if_needed(&mut self, _position: Position) -> bool {
            false
        }
        fn is_region_generated(&self, region: &RegionCoord) -> bool {
            self.generated.contains(region)
        }
        fn max_generated_ring(&self) -> u32 {
            0
        }
    }

    fn request(region: RegionCoord) -> GenerationRequest {
        let rings = ConcentricRings::new(100.0);
        let key = rings.region_key(&region);
        GenerationPipeline::request(&rings, key, region)
    }

    #[test]
    fn stages_run_in_order() {
        let mut pipeline = GenerationPipeline::new();
        let mut generator = Recorder::default();
        let report = pipeline
            .populate(&request(RegionCoord::new(1, 0)), &Rings::default(), &mut generator)
            .unwrap()
            .unwrap();
        assert_eq!(generator.calls, GenerationStage::ORDER);
        assert_eq!(report.stages, GenerationStage::ORDER);
        assert!(!pipeline.is_processing());
    }

    #[test]
    fn base_content_skipped_for_generated_region() {
        let region = RegionCoord::new(2, 1);
        let world = Rings {
            generated: [region].into_iter().collect(),
        };
        let mut generator = Recorder::default();
        GenerationPipeline::new()
            .populate(&request(region), &world, &mut generator)
            .unwrap()
            .unwrap();
        assert_eq!(
            generator.calls,
            [
                GenerationStage::Terrain,
                GenerationStage::Features,
                GenerationStage::Structures
            ]
        );
    }

    #[test]
    fn failure_aborts_remaining_stages() {
        let mut pipeline = GenerationPipeline::new();
        let mut generator = Recorder {
            fail_on: Some(GenerationStage::BaseContent),
            ..Recorder::default()
        };
        let err = pipeline
            .populate(&request(RegionCoord::new(1, 3)), &Rings::default(), &mut generator)
            .unwrap()
            .unwrap_err();
        assert_eq!(err.stage, GenerationStage::BaseContent);
        assert_eq!(err.key.as_str(), "r1:s3");
        assert_eq!(
            generator.calls,
            [GenerationStage::Terrain, GenerationStage::BaseContent]
        );
        assert!(!pipeline.is_processing(), "latch released after failure");
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn second_region_rejected_while_in_flight() {
        let mut pipeline = GenerationPipeline::new();
        assert!(pipeline.begin(&RegionKey::new("a")));
        assert_eq!(pipeline.in_flight().map(RegionKey::as_str), Some("a"));

        let mut generator = Recorder::default();
        let outcome = pipeline.populate(
            &request(RegionCoord::new(0, 0)),
            &Rings::default(),
            &mut generator,
        );
        assert!(outcome.is_none());
        assert!(generator.calls.is_empty());

        pipeline.finish();
        assert!(!pipeline.is_processing());
    }

    #[test]
    fn request_carries_ring_definition() {
        let rings = ConcentricRings::new(100.0).with_ring_definitions(vec![
            overworld_common::RingDefinition {
                ring: 0,
                structure_types: vec!["outpost".into()],
            },
        ]);
        let region = RegionCoord::new(3, 2);
        let req = GenerationPipeline::request(&rings, rings.region_key(&region), region);
        assert_eq!(req.ring.unwrap().structure_types, ["outpost"]);
        assert_eq!(req.center, rings.region_center(&region));
    }
}
