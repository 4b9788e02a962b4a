//! Admission control for simulation requests.
//!
//! A request is checked in full before any charge, seed generator or tracer
//! is built. The first violation rejects the whole request; there is no
//! partial result.

use thiserror::Error;
use tracing::info;

use crate::charge::{ChargeSource, LineCharge, PointCharge, PolygonCharge};
use crate::collection::ChargeCollection;
use crate::request::{ChargeSpec, OutputSection, RasterSize, SeedSpec, SimulationRequest};
use crate::seed::SeedGenerator;
use crate::simulation::Simulation;
use crate::vector::Vector2;
use crate::viewport::Viewport;

/// Largest magnitude accepted for any coordinate, charge, radius or step.
pub const MAX_MAGNITUDE: f64 = 1e100;
/// Smallest length accepted for radii, steps, segments and viewport extents.
pub const MIN_LENGTH: f64 = 1e-100;
pub const MAX_CHARGES: usize = 100;
pub const MAX_SEED_GENERATORS: usize = 100;
pub const MAX_FIELD_LINES: u64 = 1000;
pub const MAX_ITERATIONS: u64 = 1_000_000;
pub const MAX_POLYGON_SIDES: u64 = 1000;
pub const MAX_RASTER_SIZE: u64 = 4000;
pub const MAX_POTENTIAL_MAP_SIZE: u64 = 1000;
/// Upper bound on field lines × iterations × charges.
pub const MAX_WORK: u64 = 1_000_000;
/// Upper bound on single-segment field or potential evaluations, counting
/// both walks of every field line and every potential-map sample.
pub const MAX_EVALUATIONS: u64 = 100_000_000;

/// Why a request was rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// The request did not decode into the expected shape
    #[error("malformed request: {0}")]
    Malformed(String),

    #[error("{field} has {count} entries, at most {max} are allowed")]
    TooMany {
        field: &'static str,
        count: usize,
        max: usize,
    },

    #[error("{field} must be a finite number")]
    NotFinite { field: String },

    #[error("{field} is {value:?}, expected {expected}")]
    OutOfRange {
        field: String,
        value: f64,
        expected: &'static str,
    },

    #[error("{field} is {value}, expected {expected}")]
    CountOutOfRange {
        field: String,
        value: u64,
        expected: &'static str,
    },

    #[error("{field}: endpoints must be at least 1e-100 apart")]
    DegenerateSegment { field: String },

    #[error("{field}: startingAngle ({start:?}) must be less than endingAngle ({end:?})")]
    EmptyArc { field: String, start: f64, end: f64 },

    #[error("output: minimum{axis} ({min:?}) must be less than maximum{axis} ({max:?})")]
    EmptyViewport { axis: char, min: f64, max: f64 },

    #[error("input.flashlights seed {total} field lines in total, at most 1000 are allowed")]
    TooManyFieldLines { total: u64 },

    /// The tracing workload would exceed [`MAX_WORK`]
    #[error(
        "workload of {field_lines} field lines x {iterations} iterations x {charges} charges exceeds 1000000"
    )]
    WorkBoundExceeded {
        field_lines: u64,
        iterations: u64,
        charges: u64,
    },

    /// Polygon expansion or the potential map would exceed [`MAX_EVALUATIONS`]
    #[error(
        "{segments} charge segments x ({steps} field-line steps + {samples} potential samples) exceeds 100000000 evaluations"
    )]
    EvaluationBoundExceeded {
        segments: u64,
        steps: u64,
        samples: u64,
    },
}

type Check = Result<(), ValidationError>;

fn finite(field: impl Fn() -> String, value: f64) -> Check {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NotFinite { field: field() })
    }
}

/// `|value| <= 1e100`.
fn bounded(field: impl Fn() -> String, value: f64) -> Check {
    finite(&field, value)?;
    if value.abs() <= MAX_MAGNITUDE {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field: field(),
            value,
            expected: "[-1e100, 1e100]",
        })
    }
}

/// `1e-100 < value <= 1e100`.
fn positive_length(field: impl Fn() -> String, value: f64) -> Check {
    finite(&field, value)?;
    if value > MIN_LENGTH && value <= MAX_MAGNITUDE {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field: field(),
            value,
            expected: "(1e-100, 1e100]",
        })
    }
}

fn point(field: impl Fn() -> String, p: Vector2) -> Check {
    bounded(|| format!("{}.x", field()), p.x)?;
    bounded(|| format!("{}.y", field()), p.y)
}

/// Endpoints closer than `MIN_LENGTH` on both axes.
fn degenerate(endpoint1: Vector2, endpoint2: Vector2) -> bool {
    (endpoint2.x - endpoint1.x).abs() < MIN_LENGTH && (endpoint2.y - endpoint1.y).abs() < MIN_LENGTH
}

fn segment(field: impl Fn() -> String, endpoint1: Vector2, endpoint2: Vector2) -> Check {
    point(|| format!("{}.endpoint1", field()), endpoint1)?;
    point(|| format!("{}.endpoint2", field()), endpoint2)?;
    if degenerate(endpoint1, endpoint2) {
        return Err(ValidationError::DegenerateSegment { field: field() });
    }
    Ok(())
}

fn count(field: impl Fn() -> String, value: u64, min: u64, max: u64, expected: &'static str) -> Check {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::CountOutOfRange {
            field: field(),
            value,
            expected,
        })
    }
}

fn check_charge(index: usize, spec: &ChargeSpec) -> Check {
    let path = || format!("input.charges[{index}]");
    match *spec {
        ChargeSpec::Point { charge, position } => {
            bounded(|| format!("{}.charge", path()), charge)?;
            point(|| format!("{}.position", path()), position)
        }
        ChargeSpec::FiniteLine {
            charge,
            endpoint1,
            endpoint2,
        } => {
            bounded(|| format!("{}.charge", path()), charge)?;
            segment(path, endpoint1, endpoint2)
        }
        ChargeSpec::RegularPolygon {
            charge,
            position,
            rotation,
            sides,
            radius,
        } => {
            bounded(|| format!("{}.charge", path()), charge)?;
            point(|| format!("{}.position", path()), position)?;
            bounded(|| format!("{}.rotation", path()), rotation)?;
            count(
                || format!("{}.sides", path()),
                u64::from(sides),
                3,
                MAX_POLYGON_SIDES,
                "[3, 1000]",
            )?;
            positive_length(|| format!("{}.radius", path()), radius)?;
            // Far from the origin a small polygon's corners can round together.
            let corners =
                PolygonCharge::corners(position, sides as usize, radius, rotation.to_radians());
            let collapsed = corners
                .iter()
                .zip(corners.iter().cycle().skip(1))
                .any(|(&a, &b)| degenerate(a, b));
            if collapsed {
                return Err(ValidationError::DegenerateSegment { field: path() });
            }
            Ok(())
        }
    }
}

fn check_seed_generator(index: usize, spec: &SeedSpec) -> Check {
    let path = || format!("input.flashlights[{index}]");
    count(
        || format!("{}.fieldLineCount", path()),
        u64::from(spec.field_line_count()),
        0,
        MAX_FIELD_LINES,
        "[0, 1000]",
    )?;
    match *spec {
        SeedSpec::LineSegment {
            endpoint1,
            endpoint2,
            ..
        } => segment(path, endpoint1, endpoint2),
        SeedSpec::Circle {
            position, radius, ..
        } => {
            point(|| format!("{}.position", path()), position)?;
            positive_length(|| format!("{}.radius", path()), radius)
        }
        SeedSpec::CircularArc {
            position,
            radius,
            starting_angle,
            ending_angle,
            ..
        } => {
            point(|| format!("{}.position", path()), position)?;
            positive_length(|| format!("{}.radius", path()), radius)?;
            finite(|| format!("{}.startingAngle", path()), starting_angle)?;
            finite(|| format!("{}.endingAngle", path()), ending_angle)?;
            if starting_angle < 0.0 {
                return Err(ValidationError::OutOfRange {
                    field: format!("{}.startingAngle", path()),
                    value: starting_angle,
                    expected: "[0, 360]",
                });
            }
            if ending_angle > 360.0 {
                return Err(ValidationError::OutOfRange {
                    field: format!("{}.endingAngle", path()),
                    value: ending_angle,
                    expected: "[0, 360]",
                });
            }
            if ending_angle - starting_angle < MIN_LENGTH {
                return Err(ValidationError::EmptyArc {
                    field: path(),
                    start: starting_angle,
                    end: ending_angle,
                });
            }
            Ok(())
        }
    }
}

fn check_output(output: &OutputSection) -> Check {
    count(
        || "output.maximumIterationsPerFieldLine".to_string(),
        output.maximum_iterations_per_field_line,
        0,
        MAX_ITERATIONS,
        "[0, 1000000]",
    )?;
    finite(|| "output.stepPerIteration".to_string(), output.step_per_iteration)?;
    if !(MIN_LENGTH..=MAX_MAGNITUDE).contains(&output.step_per_iteration) {
        return Err(ValidationError::OutOfRange {
            field: "output.stepPerIteration".to_string(),
            value: output.step_per_iteration,
            expected: "[1e-100, 1e100]",
        });
    }

    for (axis, min, max) in [
        ('X', output.minimum_x, output.maximum_x),
        ('Y', output.minimum_y, output.maximum_y),
    ] {
        bounded(|| format!("output.minimum{axis}"), min)?;
        bounded(|| format!("output.maximum{axis}"), max)?;
        if max - min < MIN_LENGTH {
            return Err(ValidationError::EmptyViewport { axis, min, max });
        }
    }

    count(
        || "output.width".to_string(),
        u64::from(output.width),
        1,
        MAX_RASTER_SIZE,
        "[1, 4000]",
    )?;
    count(
        || "output.height".to_string(),
        u64::from(output.height),
        1,
        MAX_RASTER_SIZE,
        "[1, 4000]",
    )?;
    if let Some(RasterSize { width, height }) = output.potential_map {
        count(
            || "output.potentialMap.width".to_string(),
            u64::from(width),
            1,
            MAX_POTENTIAL_MAP_SIZE,
            "[1, 1000]",
        )?;
        count(
            || "output.potentialMap.height".to_string(),
            u64::from(height),
            1,
            MAX_POTENTIAL_MAP_SIZE,
            "[1, 1000]",
        )?;
    }
    Ok(())
}

/// Number of primitive segments a charge expands into.
fn segment_count(spec: &ChargeSpec) -> u64 {
    match spec {
        ChargeSpec::Point { .. } | ChargeSpec::FiniteLine { .. } => 1,
        ChargeSpec::RegularPolygon { sides, .. } => u64::from(*sides),
    }
}

/// Check `request` against every admission rule without building anything.
pub fn check(request: &SimulationRequest) -> Check {
    let charges = &request.input.charges;
    let generators = &request.input.flashlights;

    if charges.len() > MAX_CHARGES {
        return Err(ValidationError::TooMany {
            field: "input.charges",
            count: charges.len(),
            max: MAX_CHARGES,
        });
    }
    if generators.len() > MAX_SEED_GENERATORS {
        return Err(ValidationError::TooMany {
            field: "input.flashlights",
            count: generators.len(),
            max: MAX_SEED_GENERATORS,
        });
    }

    check_output(&request.output)?;
    for (index, spec) in charges.iter().enumerate() {
        check_charge(index, spec)?;
    }
    for (index, spec) in generators.iter().enumerate() {
        check_seed_generator(index, spec)?;
    }

    let field_lines: u64 = generators
        .iter()
        .map(|g| u64::from(g.field_line_count()))
        .sum();
    if field_lines > MAX_FIELD_LINES {
        return Err(ValidationError::TooManyFieldLines { total: field_lines });
    }

    let iterations = request.output.maximum_iterations_per_field_line;
    let charge_count = charges.len() as u64;
    // Each factor is bounded, the products fit in u128.
    let work = u128::from(field_lines) * u128::from(iterations) * u128::from(charge_count);
    if work > u128::from(MAX_WORK) {
        return Err(ValidationError::WorkBoundExceeded {
            field_lines,
            iterations,
            charges: charge_count,
        });
    }

    let segments: u64 = charges.iter().map(segment_count).sum();
    let steps = 2 * field_lines * iterations;
    let samples = request
        .output
        .potential_map
        .map_or(0, |m| u64::from(m.width) * u64::from(m.height));
    let evaluations = u128::from(segments) * (u128::from(steps) + u128::from(samples));
    if evaluations > u128::from(MAX_EVALUATIONS) {
        return Err(ValidationError::EvaluationBoundExceeded {
            segments,
            steps,
            samples,
        });
    }
    Ok(())
}

fn build_charge(spec: &ChargeSpec) -> ChargeSource {
    match *spec {
        ChargeSpec::Point { charge, position } => PointCharge::new(charge, position).into(),
        ChargeSpec::FiniteLine {
            charge,
            endpoint1,
            endpoint2,
        } => LineCharge::new(charge, endpoint1, endpoint2).into(),
        ChargeSpec::RegularPolygon {
            charge,
            position,
            rotation,
            sides,
            radius,
        } => PolygonCharge::new(charge, position, sides as usize, radius, rotation.to_radians())
            .into(),
    }
}

fn build_seed_generator(spec: &SeedSpec) -> SeedGenerator {
    match *spec {
        SeedSpec::LineSegment {
            field_line_count,
            endpoint1,
            endpoint2,
        } => SeedGenerator::line_segment(endpoint1, endpoint2, field_line_count as usize),
        SeedSpec::Circle {
            field_line_count,
            position,
            radius,
        } => SeedGenerator::circle(position, radius, field_line_count as usize),
        SeedSpec::CircularArc {
            field_line_count,
            position,
            radius,
            starting_angle,
            ending_angle,
        } => SeedGenerator::arc(
            position,
            radius,
            starting_angle.to_radians(),
            ending_angle.to_radians(),
            field_line_count as usize,
        ),
    }
}

/// Validate `request` and build the simulation it describes.
pub fn validate(request: &SimulationRequest) -> Result<Simulation, ValidationError> {
    check(request)?;

    let collection = ChargeCollection::new(
        request.input.charges.iter().map(build_charge).collect(),
        request
            .input
            .flashlights
            .iter()
            .map(build_seed_generator)
            .collect(),
    );
    let output = &request.output;
    let viewport = Viewport::new(
        Vector2::new(output.minimum_x, output.minimum_y),
        Vector2::new(output.maximum_x, output.maximum_y),
        output.width,
        output.height,
    );

    info!(
        charges = collection.charges().len(),
        segments = collection.primitive_count(),
        field_lines = collection.total_field_lines(),
        iterations = output.maximum_iterations_per_field_line,
        "request admitted"
    );

    Ok(Simulation {
        collection,
        step: output.step_per_iteration,
        max_iterations: output.maximum_iterations_per_field_line as usize,
        viewport,
        potential_map: output.potential_map,
    })
}
