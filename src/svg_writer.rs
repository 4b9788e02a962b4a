//! SVG Writer
//!
//! Renders a traced scene as a standalone SVG document: checkerboard
//! background, optional potential heat map, field lines, charges and seed
//! generators. Geometry is mapped through the simulation's [`Viewport`], so
//! the output is in raster pixels with `+y` pointing up on screen.

use std::fs;
use std::path::Path;

use askama::Template;

use crate::charge::{ChargeSource, LineCharge};
use crate::io::{IoError, IoResult, Writer};
use crate::seed::SeedShape;
use crate::simulation::{PotentialMap, Simulation, SimulationResult};
use crate::vector::Vector2;
use crate::viewport::Viewport;

pub const OUTPUT_FILE: &str = "fieldlines.svg";

const TILE_SIZE: u32 = 40;
const POINT_CHARGE_RADIUS: f64 = 15.0;
const SEED_DOT_RADIUS: f64 = 4.0;
/// Arcs are drawn as polylines with this many segments.
const ARC_SEGMENTS: usize = 64;
/// Outlines larger than this many rasters are clipped to keep numbers sane.
const MAX_OUTLINE_RASTERS: f64 = 100.0;

/// Stroke and fill colours of a charge, by sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChargePalette {
    pub stroke: &'static str,
    pub fill: &'static str,
}

impl ChargePalette {
    pub fn for_charge(charge: f64) -> Self {
        if charge > 0.0 {
            Self {
                stroke: "#ff0000",
                fill: "#ff6666",
            }
        } else if charge < 0.0 {
            Self {
                stroke: "#0000ff",
                fill: "#6666ff",
            }
        } else {
            Self {
                stroke: "#888888",
                fill: "#aaaaaa",
            }
        }
    }
}

/// Heat-map colour for an equalized value in `[0, 1]`: blue at `0` through
/// green to red at `1`.
pub fn heat_color(value: f64) -> String {
    let hue = 240.0 * (1.0 - value.clamp(0.0, 1.0));
    let (r, g, b) = hsl_to_rgb(hue, 1.0, 0.5);
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// `hue` in degrees, `saturation` and `lightness` in `[0, 1]`.
fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> (u8, u8, u8) {
    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let sector = (hue.rem_euclid(360.0)) / 60.0;
    let x = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
    let (r, g, b) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = lightness - chroma / 2.0;
    let channel = |c: f64| ((c + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    (channel(r), channel(g), channel(b))
}

fn num(v: f64) -> String {
    format!("{v:.2}")
}

fn polyline_points(viewport: &Viewport, points: impl IntoIterator<Item = Vector2>) -> String {
    points
        .into_iter()
        .map(|p| {
            let s = viewport.to_screen(p);
            format!("{},{}", num(s.x), num(s.y))
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub x: u32,
    pub y: u32,
    pub size: u32,
}

/// A horizontal run of heat-map cells sharing one colour.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatRun {
    pub x: String,
    pub y: String,
    pub width: String,
    pub height: String,
    pub fill: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    pub cx: String,
    pub cy: String,
    pub rx: String,
    pub ry: String,
    pub stroke: &'static str,
    pub fill: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub x1: String,
    pub y1: String,
    pub x2: String,
    pub y2: String,
    pub stroke: &'static str,
    pub fill: &'static str,
}

/// Everything the SVG template draws, already in raster coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: u32,
    pub height: u32,
    pub tiles: Vec<Tile>,
    pub heat_runs: Vec<HeatRun>,
    pub field_lines: Vec<String>,
    pub point_charges: Vec<Circle>,
    pub line_charges: Vec<Segment>,
    pub seed_circles: Vec<Circle>,
    pub seed_paths: Vec<String>,
    pub seed_dots: Vec<Circle>,
}

impl Scene {
    pub fn build(simulation: &Simulation, result: &SimulationResult) -> Self {
        let viewport = &simulation.viewport;
        let mut scene = Self {
            width: viewport.width(),
            height: viewport.height(),
            tiles: checkerboard(viewport.width(), viewport.height()),
            heat_runs: result
                .potential_map
                .as_ref()
                .map(|map| heat_runs(viewport, map))
                .unwrap_or_default(),
            field_lines: result
                .field_lines
                .iter()
                .map(|l| polyline_points(viewport, l.line.points.iter().copied()))
                .collect(),
            point_charges: Vec::new(),
            line_charges: Vec::new(),
            seed_circles: Vec::new(),
            seed_paths: Vec::new(),
            seed_dots: Vec::new(),
        };

        for charge in simulation.collection.charges() {
            match charge {
                ChargeSource::Point(c) => {
                    let palette = ChargePalette::for_charge(c.charge);
                    let s = viewport.to_screen(c.position);
                    scene.point_charges.push(Circle {
                        cx: num(s.x),
                        cy: num(s.y),
                        rx: num(POINT_CHARGE_RADIUS),
                        ry: num(POINT_CHARGE_RADIUS),
                        stroke: palette.stroke,
                        fill: palette.fill,
                    });
                }
                ChargeSource::Line(c) => scene.line_charges.push(segment(viewport, c)),
                ChargeSource::Polygon(c) => {
                    // Colour by the polygon's total charge, not its edges'.
                    let palette = ChargePalette::for_charge(c.charge);
                    scene.line_charges.extend(c.edges().iter().map(|edge| Segment {
                        stroke: palette.stroke,
                        fill: palette.fill,
                        ..segment(viewport, edge)
                    }));
                }
            }
        }

        let clip = MAX_OUTLINE_RASTERS * f64::from(viewport.width().max(viewport.height()));
        for generator in simulation.collection.seed_generators() {
            match *generator.shape() {
                SeedShape::LineSegment {
                    endpoint1,
                    endpoint2,
                } => scene
                    .seed_paths
                    .push(polyline_points(viewport, [endpoint1, endpoint2])),
                SeedShape::Circle { center, radius } => {
                    let s = viewport.to_screen(center);
                    let scale = viewport.scale();
                    scene.seed_circles.push(Circle {
                        cx: num(s.x),
                        cy: num(s.y),
                        rx: num((radius * scale.x).min(clip)),
                        ry: num((radius * scale.y).min(clip)),
                        stroke: "black",
                        fill: "none",
                    });
                }
                SeedShape::Arc {
                    center,
                    radius,
                    start_angle,
                    end_angle,
                } => {
                    let arc = (0..=ARC_SEGMENTS).map(|i| {
                        let t = i as f64 / ARC_SEGMENTS as f64;
                        let angle = start_angle + (end_angle - start_angle) * t;
                        center + Vector2::from_polar(radius, angle)
                    });
                    scene.seed_paths.push(polyline_points(viewport, arc));
                }
            }
            scene.seed_dots.extend(generator.seeds().iter().map(|&seed| {
                let s = viewport.to_screen(seed);
                Circle {
                    cx: num(s.x),
                    cy: num(s.y),
                    rx: num(SEED_DOT_RADIUS),
                    ry: num(SEED_DOT_RADIUS),
                    stroke: "none",
                    fill: "black",
                }
            }));
        }

        scene
    }
}

fn segment(viewport: &Viewport, charge: &LineCharge) -> Segment {
    let palette = ChargePalette::for_charge(charge.charge);
    let a = viewport.to_screen(charge.endpoint1);
    let b = viewport.to_screen(charge.endpoint2);
    Segment {
        x1: num(a.x),
        y1: num(a.y),
        x2: num(b.x),
        y2: num(b.y),
        stroke: palette.stroke,
        fill: palette.fill,
    }
}

/// Alternating background squares, starting at the top-left corner.
fn checkerboard(width: u32, height: u32) -> Vec<Tile> {
    let mut tiles = Vec::new();
    for (column, x) in (0..width).step_by(TILE_SIZE as usize).enumerate() {
        let offset = if column % 2 == 0 { 0 } else { TILE_SIZE };
        for y in (offset..height).step_by(2 * TILE_SIZE as usize) {
            tiles.push(Tile {
                x,
                y,
                size: TILE_SIZE,
            });
        }
    }
    tiles
}

/// Stretch the potential map over the raster, merging equal neighbours in a row.
fn heat_runs(viewport: &Viewport, map: &PotentialMap) -> Vec<HeatRun> {
    let cell_width = f64::from(viewport.width()) / f64::from(map.width);
    let cell_height = f64::from(viewport.height()) / f64::from(map.height);
    let mut runs = Vec::new();
    for row in 0..map.height {
        let mut column = 0;
        while column < map.width {
            let fill = heat_color(map.value(column, row).unwrap_or(0.0));
            let start = column;
            column += 1;
            while column < map.width
                && heat_color(map.value(column, row).unwrap_or(0.0)) == fill
            {
                column += 1;
            }
            runs.push(HeatRun {
                x: num(f64::from(start) * cell_width),
                y: num(f64::from(row) * cell_height),
                width: num(f64::from(column - start) * cell_width),
                height: num(cell_height),
                fill,
            });
        }
    }
    runs
}

#[derive(Template)]
#[template(path = "fieldlines.svg")]
struct SvgTemplate<'a> {
    scene: &'a Scene,
}

/// Writer for the SVG scene
#[derive(Debug, Default)]
pub struct SvgWriter;

impl SvgWriter {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, simulation: &Simulation, result: &SimulationResult) -> IoResult<String> {
        let scene = Scene::build(simulation, result);
        SvgTemplate { scene: &scene }
            .render()
            .map_err(|e| IoError::Write(e.to_string()))
    }
}

impl Writer for SvgWriter {
    fn write(
        &self,
        simulation: &Simulation,
        result: &SimulationResult,
        output: &Path,
    ) -> IoResult<()> {
        fs::create_dir_all(output)?;
        let svg = self.render(simulation, result)?;
        fs::write(output.join(OUTPUT_FILE), svg)?;
        Ok(())
    }

    fn format_id(&self) -> &str {
        "svg"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charge::{PointCharge, PolygonCharge};
    use crate::collection::ChargeCollection;
    use crate::request::RasterSize;
    use crate::seed::SeedGenerator;

    fn simulation() -> Simulation {
        let mut collection = ChargeCollection::default();
        collection.push_charge(PointCharge::new(1.0, Vector2::new(0.25, 0.5)));
        collection.push_charge(LineCharge::new(
            -1.0,
            Vector2::new(0.75, 0.25),
            Vector2::new(0.75, 0.75),
        ));
        collection.push_charge(PolygonCharge::new(0.0, Vector2::new(0.5, 0.9), 3, 0.05, 0.0));
        collection.push_seed_generator(SeedGenerator::circle(Vector2::new(0.25, 0.5), 0.05, 4));
        collection.push_seed_generator(SeedGenerator::arc(
            Vector2::new(0.25, 0.5),
            0.1,
            0.0,
            std::f64::consts::PI,
            3,
        ));
        Simulation {
            collection,
            step: 0.01,
            max_iterations: 20,
            viewport: Viewport::new(Vector2::ZERO, Vector2::new(1.0, 1.0), 200, 200),
            potential_map: Some(RasterSize {
                width: 4,
                height: 4,
            }),
        }
    }

    #[test]
    fn heat_color_spans_blue_to_red() {
        assert_eq!(heat_color(0.0), "#0000ff");
        assert_eq!(heat_color(0.5), "#00ff00");
        assert_eq!(heat_color(0.75), "#ffff00");
        assert_eq!(heat_color(1.0), "#ff0000");
        assert_eq!(heat_color(2.0), "#ff0000");
    }

    #[test]
    fn palette_follows_charge_sign() {
        assert_eq!(ChargePalette::for_charge(2.0).stroke, "#ff0000");
        assert_eq!(ChargePalette::for_charge(-2.0).fill, "#6666ff");
        assert_eq!(ChargePalette::for_charge(0.0).fill, "#aaaaaa");
    }

    #[test]
    fn checkerboard_alternates_columns() {
        let tiles = checkerboard(80, 80);
        let origins: Vec<_> = tiles.iter().map(|t| (t.x, t.y)).collect();
        assert_eq!(origins, vec![(0, 0), (40, 40)]);
    }

    #[test]
    fn scene_places_charges_in_flipped_raster_space() {
        let sim = simulation();
        let scene = Scene::build(&sim, &sim.run());
        assert_eq!(scene.point_charges.len(), 1);
        assert_eq!(scene.point_charges[0].cx, "50.00");
        assert_eq!(scene.point_charges[0].cy, "100.00");
        // One line charge plus three polygon edges.
        assert_eq!(scene.line_charges.len(), 4);
        assert_eq!(scene.line_charges[0].y1, "150.00");
        assert_eq!(scene.line_charges[0].stroke, "#0000ff");
        assert_eq!(scene.line_charges[1].stroke, "#888888");
        assert_eq!(scene.seed_circles.len(), 1);
        assert_eq!(scene.seed_circles[0].rx, "10.00");
        assert_eq!(scene.seed_paths.len(), 1);
        assert_eq!(scene.seed_dots.len(), 7);
        assert_eq!(scene.field_lines.len(), 7);
    }

    #[test]
    fn heat_runs_cover_every_row() {
        let sim = simulation();
        let result = sim.run();
        let runs = heat_runs(&sim.viewport, result.potential_map.as_ref().unwrap());
        for row in 0..4 {
            let y = num(f64::from(row) * 50.0);
            let covered: f64 = runs
                .iter()
                .filter(|r| r.y == y)
                .map(|r| r.width.parse::<f64>().unwrap())
                .sum();
            assert!((covered - 200.0).abs() < 1e-6);
        }
    }

    #[test]
    fn renders_standalone_svg() {
        let sim = simulation();
        let svg = SvgWriter::new().render(&sim, &sim.run()).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"viewBox="0 0 200 200""#));
        assert!(svg.contains("<polyline"));
        assert!(svg.contains("#fcfaf5"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn writes_into_output_directory() {
        let sim = simulation();
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested");
        SvgWriter::new().write(&sim, &sim.run(), &out).unwrap();
        let svg = fs::read_to_string(out.join(OUTPUT_FILE)).unwrap();
        assert!(svg.contains("<circle") || svg.contains("<ellipse"));
    }
}
