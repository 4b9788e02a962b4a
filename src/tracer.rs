//! Field-line integration.
//!
//! A field line is walked from its seed in fixed-length steps along the unit
//! field direction, once downstream (`+1`) and once upstream (`-1`). Each walk
//! stops on the first of:
//!
//! - a field of exactly zero,
//! - a singular or non-finite field,
//! - a field direction that reversed relative to the previous step,
//! - the iteration cap.
//!
//! The cap bounds every walk, so tracing always terminates.

use serde::Serialize;

use crate::collection::ChargeCollection;
use crate::vector::Vector2;

/// Why a walk stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Termination {
    ZeroField,
    Singular,
    Reversal,
    Exhausted,
}

/// Direction of travel relative to the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Downstream,
    Upstream,
}

impl Direction {
    fn sign(self) -> f64 {
        match self {
            Direction::Downstream => 1.0,
            Direction::Upstream => -1.0,
        }
    }
}

/// The points visited by one walk, starting with the seed.
#[derive(Debug, Clone, PartialEq)]
pub struct Walk {
    pub points: Vec<Vector2>,
    pub termination: Termination,
}

/// A complete field line through a seed: the upstream walk reversed, then
/// the downstream walk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldLine {
    pub seed: Vector2,
    pub points: Vec<Vector2>,
    pub forward: Termination,
    pub backward: Termination,
}

/// Walks field lines through a charge collection.
#[derive(Debug, Clone, Copy)]
pub struct FieldLineTracer<'a> {
    collection: &'a ChargeCollection,
    step: f64,
    max_iterations: usize,
}

impl<'a> FieldLineTracer<'a> {
    /// `step` must be positive.
    pub fn new(collection: &'a ChargeCollection, step: f64, max_iterations: usize) -> Self {
        debug_assert!(step > 0.0, "step must be positive");
        Self {
            collection,
            step,
            max_iterations,
        }
    }

    pub fn walk(&self, seed: Vector2, direction: Direction) -> Walk {
        let mut points = vec![seed];
        let mut position = seed;
        let mut previous: Option<Vector2> = None;

        for _ in 0..self.max_iterations {
            let field = match self.collection.field_at(position).vector() {
                Some(v) => v,
                None => return Walk::stopped(points, Termination::Singular),
            };
            if field.is_zero() {
                return Walk::stopped(points, Termination::ZeroField);
            }
            if !field.is_finite() {
                return Walk::stopped(points, Termination::Singular);
            }
            let unit = field.normalize();
            if !unit.is_finite() {
                // Components too small to square: the direction is lost.
                return Walk::stopped(points, Termination::ZeroField);
            }
            if let Some(previous) = previous {
                if previous.dot(unit) < 0.0 {
                    return Walk::stopped(points, Termination::Reversal);
                }
            }

            previous = Some(unit);
            position += unit * (self.step * direction.sign());
            points.push(position);
        }

        Walk::stopped(points, Termination::Exhausted)
    }

    pub fn trace(&self, seed: Vector2) -> FieldLine {
        let forward = self.walk(seed, Direction::Downstream);
        let backward = self.walk(seed, Direction::Upstream);

        let mut points = Vec::with_capacity(forward.points.len() + backward.points.len() - 1);
        points.extend(backward.points.iter().skip(1).rev());
        points.extend(forward.points);

        FieldLine {
            seed,
            points,
            forward: forward.termination,
            backward: backward.termination,
        }
    }
}

impl FieldLine {
    /// True when either end of the line ran into a singularity.
    pub fn reaches_singularity(&self) -> bool {
        self.forward == Termination::Singular || self.backward == Termination::Singular
    }
}

impl Walk {
    fn stopped(points: Vec<Vector2>, termination: Termination) -> Self {
        Self {
            points,
            termination,
        }
    }
}
