//! A validated simulation and the results it produces.

use serde::Serialize;
use tracing::{debug, info};

use crate::collection::ChargeCollection;
use crate::equalizer::equalize;
use crate::request::RasterSize;
use crate::tracer::{FieldLine, FieldLineTracer};
use crate::viewport::Viewport;

/// Everything needed to trace a scene. Built by [`crate::validate::validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Simulation {
    pub collection: ChargeCollection,
    pub step: f64,
    pub max_iterations: usize,
    pub viewport: Viewport,
    pub potential_map: Option<RasterSize>,
}

/// A field line tagged with the generator and seed it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TracedLine {
    pub generator: usize,
    pub index: usize,
    #[serde(flatten)]
    pub line: FieldLine,
}

/// Rank-equalized potential samples, row-major from the top-left pixel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PotentialMap {
    pub width: u32,
    pub height: u32,
    pub values: Vec<f64>,
}

impl PotentialMap {
    /// Equalized value of the pixel at `column`, `row`.
    pub fn value(&self, column: u32, row: u32) -> Option<f64> {
        if column >= self.width || row >= self.height {
            return None;
        }
        let index = row as usize * self.width as usize + column as usize;
        self.values.get(index).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub field_lines: Vec<TracedLine>,
    pub potential_map: Option<PotentialMap>,
}

impl Simulation {
    pub fn tracer(&self) -> FieldLineTracer<'_> {
        FieldLineTracer::new(&self.collection, self.step, self.max_iterations)
    }

    /// Trace one field line through every seed of every generator, in order.
    pub fn trace_field_lines(&self) -> Vec<TracedLine> {
        let tracer = self.tracer();
        let mut lines = Vec::with_capacity(self.collection.total_field_lines());
        for (generator, seeds) in self.collection.seed_generators().iter().enumerate() {
            for (index, &seed) in seeds.seeds().iter().enumerate() {
                let line = tracer.trace(seed);
                debug!(
                    generator,
                    index,
                    points = line.points.len(),
                    forward = ?line.forward,
                    backward = ?line.backward,
                    "traced field line"
                );
                lines.push(TracedLine {
                    generator,
                    index,
                    line,
                });
            }
        }
        lines
    }

    /// Sample the potential at the centre of every cell of a `size` grid over
    /// the viewport and rank-equalize the samples.
    pub fn sample_potential(&self, size: RasterSize) -> PotentialMap {
        let samples: Vec<f64> = self
            .viewport
            .sample_grid(size.width, size.height)
            .map(|p| self.collection.potential_at(p).to_f64())
            .collect();
        PotentialMap {
            width: size.width,
            height: size.height,
            values: equalize(&samples),
        }
    }

    pub fn run(&self) -> SimulationResult {
        let field_lines = self.trace_field_lines();
        let potential_map = self.potential_map.map(|size| self.sample_potential(size));

        let singular = field_lines
            .iter()
            .filter(|l| l.line.reaches_singularity())
            .count();
        info!(
            field_lines = field_lines.len(),
            singular,
            points = field_lines.iter().map(|l| l.line.points.len()).sum::<usize>(),
            potential_map = potential_map.is_some(),
            "simulation complete"
        );

        SimulationResult {
            field_lines,
            potential_map,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charge::PointCharge;
    use crate::seed::SeedGenerator;
    use crate::vector::Vector2;

    fn dipole(potential_map: Option<RasterSize>) -> Simulation {
        let mut collection = ChargeCollection::default();
        collection.push_charge(PointCharge::new(1.0, Vector2::new(0.25, 0.5)));
        collection.push_charge(PointCharge::new(-1.0, Vector2::new(0.75, 0.5)));
        collection.push_seed_generator(SeedGenerator::circle(Vector2::new(0.25, 0.5), 0.01, 4));
        collection.push_seed_generator(SeedGenerator::line_segment(
            Vector2::new(0.0, 0.9),
            Vector2::new(1.0, 0.9),
            2,
        ));
        Simulation {
            collection,
            step: 0.01,
            max_iterations: 50,
            viewport: Viewport::new(Vector2::ZERO, Vector2::new(1.0, 1.0), 100, 100),
            potential_map,
        }
    }

    #[test]
    fn traces_every_seed_in_generator_order() {
        let lines = dipole(None).trace_field_lines();
        let tags: Vec<_> = lines.iter().map(|l| (l.generator, l.index)).collect();
        assert_eq!(tags, vec![(0, 0), (0, 1), (0, 2), (0, 3), (1, 0), (1, 1)]);
        for l in &lines {
            assert!(l.line.points.len() <= 2 * 50 + 1);
        }
    }

    #[test]
    fn potential_map_is_high_near_positive_charge() {
        let simulation = dipole(None);
        let map = simulation.sample_potential(RasterSize {
            width: 4,
            height: 2,
        });
        assert_eq!(map.values.len(), 8);
        // Cell centres at x = 0.125, 0.375, 0.625, 0.875.
        let left = map.value(0, 0).unwrap();
        let right = map.value(3, 0).unwrap();
        assert!(left > right);
        assert_eq!(map.value(0, 0), map.value(0, 1));
        assert!(map.values.iter().all(|v| (0.0..=1.0).contains(v)));
        assert_eq!(map.value(4, 0), None);
    }

    #[test]
    fn run_includes_potential_map_only_when_requested() {
        assert!(dipole(None).run().potential_map.is_none());
        let result = dipole(Some(RasterSize {
            width: 3,
            height: 3,
        }))
        .run();
        assert_eq!(result.potential_map.unwrap().values.len(), 9);
        assert_eq!(result.field_lines.len(), 6);
    }

    #[test]
    fn result_serializes_in_camel_case() {
        let mut simulation = dipole(None);
        simulation.max_iterations = 0;
        let json = serde_json::to_value(simulation.run()).unwrap();
        assert!(json["potentialMap"].is_null());
        let first = &json["fieldLines"][0];
        assert_eq!(first["generator"], 0);
        assert_eq!(first["index"], 0);
        assert_eq!(first["forward"], "exhausted");
        assert_eq!(first["points"].as_array().unwrap().len(), 1);
        assert_eq!(first["seed"], first["points"][0]);
    }
}
