//! Seed generators: shapes that emit the starting points of field lines.
//!
//! Seed positions are computed once, when the generator is built. Generators
//! are immutable afterwards, so there is no cache to invalidate.

use std::f64::consts::TAU;

use crate::vector::Vector2;

/// The shape a generator distributes its seeds along.
#[derive(Debug, Clone, PartialEq)]
pub enum SeedShape {
    /// Seeds spread from `endpoint1` to `endpoint2`, both ends included.
    LineSegment {
        endpoint1: Vector2,
        endpoint2: Vector2,
    },
    /// Seeds evenly spaced around a full circle.
    Circle { center: Vector2, radius: f64 },
    /// Seeds spread over an arc, both ends included. Angles are in radians.
    Arc {
        center: Vector2,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    },
}

/// A seed shape together with the ordered seeds it emits.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedGenerator {
    shape: SeedShape,
    seeds: Vec<Vector2>,
}

impl SeedGenerator {
    pub fn new(shape: SeedShape, field_line_count: usize) -> Self {
        let seeds = (0..field_line_count)
            .map(|i| seed_position(&shape, i, field_line_count))
            .collect();
        Self { shape, seeds }
    }

    pub fn line_segment(endpoint1: Vector2, endpoint2: Vector2, field_line_count: usize) -> Self {
        Self::new(
            SeedShape::LineSegment {
                endpoint1,
                endpoint2,
            },
            field_line_count,
        )
    }

    pub fn circle(center: Vector2, radius: f64, field_line_count: usize) -> Self {
        Self::new(SeedShape::Circle { center, radius }, field_line_count)
    }

    pub fn arc(
        center: Vector2,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        field_line_count: usize,
    ) -> Self {
        Self::new(
            SeedShape::Arc {
                center,
                radius,
                start_angle,
                end_angle,
            },
            field_line_count,
        )
    }

    pub fn shape(&self) -> &SeedShape {
        &self.shape
    }

    pub fn field_line_count(&self) -> usize {
        self.seeds.len()
    }

    pub fn seeds(&self) -> &[Vector2] {
        &self.seeds
    }

    pub fn seed(&self, index: usize) -> Option<Vector2> {
        self.seeds.get(index).copied()
    }
}

/// Fraction along an open-ended span for seed `index` of `count`: a single
/// seed sits in the middle, otherwise both ends are hit.
fn span_fraction(index: usize, count: usize) -> f64 {
    if count == 1 {
        0.5
    } else {
        index as f64 / (count - 1) as f64
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn seed_position(shape: &SeedShape, index: usize, count: usize) -> Vector2 {
    match *shape {
        SeedShape::LineSegment {
            endpoint1,
            endpoint2,
        } => Vector2::lerp(endpoint1, endpoint2, span_fraction(index, count)),
        SeedShape::Circle { center, radius } => {
            // No closing duplicate: seed `count` would coincide with seed 0.
            let angle = TAU * index as f64 / count as f64;
            center + Vector2::from_polar(radius, angle)
        }
        SeedShape::Arc {
            center,
            radius,
            start_angle,
            end_angle,
        } => {
            let angle = lerp(start_angle, end_angle, span_fraction(index, count));
            center + Vector2::from_polar(radius, angle)
        }
    }
}
