//! Decoded simulation request.
//!
//! These types mirror the wire shape of a request one-to-one and carry no
//! guarantees beyond "it parsed". Numeric bounds, geometric validity and the
//! workload limit are enforced by [`crate::validate`].
//!
//! Both historical key spellings are accepted (`flashlights` / `graphers`,
//! `fieldLineCount` / `numberOfFieldLines`, and so on).

use serde::Deserialize;

use crate::validate::ValidationError;
use crate::vector::Vector2;

/// Default raster edge length, in pixels.
pub const DEFAULT_RASTER_SIZE: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SimulationRequest {
    pub input: InputSection,
    pub output: OutputSection,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InputSection {
    pub charges: Vec<ChargeSpec>,
    #[serde(alias = "graphers")]
    pub flashlights: Vec<SeedSpec>,
}

/// A charge as written in a request. Angles are in degrees.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum ChargeSpec {
    #[serde(rename = "Point")]
    Point { charge: f64, position: Vector2 },
    #[serde(rename = "Finite Line")]
    FiniteLine {
        charge: f64,
        endpoint1: Vector2,
        endpoint2: Vector2,
    },
    #[serde(rename = "Regular Polygon")]
    RegularPolygon {
        charge: f64,
        position: Vector2,
        #[serde(default)]
        rotation: f64,
        sides: u32,
        radius: f64,
    },
}

/// A seed generator as written in a request. Angles are in degrees.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum SeedSpec {
    #[serde(rename = "Line Segment")]
    LineSegment {
        #[serde(alias = "numberOfFieldLines")]
        field_line_count: u32,
        endpoint1: Vector2,
        endpoint2: Vector2,
    },
    #[serde(rename = "Circle")]
    Circle {
        #[serde(alias = "numberOfFieldLines")]
        field_line_count: u32,
        position: Vector2,
        radius: f64,
    },
    #[serde(rename = "Circular Arc")]
    CircularArc {
        #[serde(alias = "numberOfFieldLines")]
        field_line_count: u32,
        position: Vector2,
        radius: f64,
        starting_angle: f64,
        ending_angle: f64,
    },
}

impl SeedSpec {
    pub fn field_line_count(&self) -> u32 {
        match self {
            SeedSpec::LineSegment {
                field_line_count, ..
            }
            | SeedSpec::Circle {
                field_line_count, ..
            }
            | SeedSpec::CircularArc {
                field_line_count, ..
            } => *field_line_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputSection {
    #[serde(alias = "fieldLineIterationLimit")]
    pub maximum_iterations_per_field_line: u64,
    #[serde(alias = "fieldLineIterationStep")]
    pub step_per_iteration: f64,
    #[serde(alias = "viewportMinimumX")]
    pub minimum_x: f64,
    #[serde(alias = "viewportMinimumY")]
    pub minimum_y: f64,
    #[serde(alias = "viewportMaximumX")]
    pub maximum_x: f64,
    #[serde(alias = "viewportMaximumY")]
    pub maximum_y: f64,
    #[serde(default = "default_raster_size")]
    pub width: u32,
    #[serde(default = "default_raster_size")]
    pub height: u32,
    #[serde(default)]
    pub potential_map: Option<RasterSize>,
}

/// Pixel dimensions of a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RasterSize {
    pub width: u32,
    pub height: u32,
}

fn default_raster_size() -> u32 {
    DEFAULT_RASTER_SIZE
}

impl SimulationRequest {
    /// Decode a JSON request body.
    pub fn from_json(body: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(body).map_err(|e| ValidationError::Malformed(e.to_string()))
    }

    /// Decode a YAML request document.
    pub fn from_yaml(body: &str) -> Result<Self, ValidationError> {
        serde_yaml::from_str(body).map_err(|e| ValidationError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIPOLE: &str = r#"{
        "input": {
            "charges": [
                {"type": "Point", "charge": 1, "position": {"x": 0.2, "y": 0.5}},
                {"type": "Finite Line", "charge": -1.5,
                 "endpoint1": {"x": 0.7, "y": 0.4}, "endpoint2": {"x": 0.9, "y": 0.6}},
                {"type": "Regular Polygon", "charge": 2, "position": {"x": 0, "y": 0},
                 "rotation": 45, "sides": 6, "radius": 0.1}
            ],
            "flashlights": [
                {"type": "Circle", "fieldLineCount": 8,
                 "position": {"x": 0.2, "y": 0.5}, "radius": 0.01},
                {"type": "Circular Arc", "numberOfFieldLines": 3,
                 "position": {"x": 0, "y": 0}, "radius": 0.2,
                 "startingAngle": 0, "endingAngle": 90}
            ]
        },
        "output": {
            "maximumIterationsPerFieldLine": 500,
            "stepPerIteration": 0.001,
            "minimumX": 0, "minimumY": 0, "maximumX": 1, "maximumY": 1
        }
    }"#;

    #[test]
    fn parses_every_charge_and_seed_kind() {
        let request = SimulationRequest::from_json(DIPOLE).unwrap();
        assert_eq!(request.input.charges.len(), 3);
        assert_eq!(
            request.input.charges[0],
            ChargeSpec::Point {
                charge: 1.0,
                position: Vector2::new(0.2, 0.5)
            }
        );
        assert!(matches!(
            request.input.charges[2],
            ChargeSpec::RegularPolygon { sides: 6, rotation, .. } if rotation == 45.0
        ));
        assert_eq!(request.input.flashlights[0].field_line_count(), 8);
        assert_eq!(request.input.flashlights[1].field_line_count(), 3);
        assert_eq!(request.output.maximum_iterations_per_field_line, 500);
    }

    #[test]
    fn raster_defaults_apply() {
        let request = SimulationRequest::from_json(DIPOLE).unwrap();
        assert_eq!(request.output.width, DEFAULT_RASTER_SIZE);
        assert_eq!(request.output.height, DEFAULT_RASTER_SIZE);
        assert_eq!(request.output.potential_map, None);
    }

    #[test]
    fn accepts_alternative_key_spellings() {
        let body = r#"{
            "input": {
                "charges": [],
                "graphers": [{"type": "Line Segment", "numberOfFieldLines": 2,
                              "endpoint1": {"x": 0, "y": 0}, "endpoint2": {"x": 1, "y": 0}}]
            },
            "output": {
                "fieldLineIterationLimit": 10,
                "fieldLineIterationStep": 0.5,
                "viewportMinimumX": -1, "viewportMinimumY": -1,
                "viewportMaximumX": 1, "viewportMaximumY": 1,
                "potentialMap": {"width": 20, "height": 10}
            }
        }"#;
        let request = SimulationRequest::from_json(body).unwrap();
        assert_eq!(request.input.flashlights.len(), 1);
        assert_eq!(request.output.step_per_iteration, 0.5);
        assert_eq!(request.output.minimum_x, -1.0);
        assert_eq!(
            request.output.potential_map,
            Some(RasterSize {
                width: 20,
                height: 10
            })
        );
    }

    #[test]
    fn parses_yaml() {
        let body = "
input:
  charges:
    - type: Point
      charge: -2
      position: {x: 1, y: 1}
  flashlights: []
output:
  maximumIterationsPerFieldLine: 0
  stepPerIteration: 1
  minimumX: 0
  minimumY: 0
  maximumX: 2
  maximumY: 2
";
        let request = SimulationRequest::from_yaml(body).unwrap();
        assert_eq!(request.input.charges.len(), 1);
        assert!(request.input.flashlights.is_empty());
    }

    #[test]
    fn structural_errors_are_malformed() {
        let unknown_type = DIPOLE.replace("\"Finite Line\"", "\"Infinite Line\"");
        assert!(matches!(
            SimulationRequest::from_json(&unknown_type),
            Err(ValidationError::Malformed(_))
        ));

        let fractional_count = DIPOLE.replace("\"fieldLineCount\": 8", "\"fieldLineCount\": 8.5");
        assert!(SimulationRequest::from_json(&fractional_count).is_err());

        let negative_iterations = DIPOLE.replace(
            "\"maximumIterationsPerFieldLine\": 500",
            "\"maximumIterationsPerFieldLine\": -1",
        );
        assert!(SimulationRequest::from_json(&negative_iterations).is_err());

        let missing_output = r#"{"input": {"charges": [], "flashlights": []}}"#;
        assert!(SimulationRequest::from_json(missing_output).is_err());

        assert!(SimulationRequest::from_json("not json").is_err());
    }
}
