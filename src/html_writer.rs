//! HTML Writer
//!
//! Wraps the SVG scene in a small page with a summary of the run. This is
//! what the dev server serves and live-reloads.

use std::fs;
use std::path::Path;

use askama::Template;

use crate::io::{IoError, IoResult, Writer};
use crate::simulation::{Simulation, SimulationResult};
use crate::svg_writer::{SvgWriter, heat_color};
use crate::tracer::Termination;

/// How many walks stopped for a given reason.
#[derive(Debug, Clone, PartialEq)]
pub struct TerminationCount {
    pub reason: &'static str,
    pub count: usize,
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate<'a> {
    title: &'a str,
    svg: &'a str,
    charge_count: usize,
    segment_count: usize,
    field_line_count: usize,
    point_count: usize,
    step: String,
    max_iterations: usize,
    terminations: &'a [TerminationCount],
    /// Colour stops for the heat-map legend (None = no heat map)
    legend: Option<&'a [String]>,
}

/// Writer for the HTML page
#[derive(Debug)]
pub struct HtmlWriter {
    pub title: String,
}

impl Default for HtmlWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlWriter {
    pub fn new() -> Self {
        Self {
            title: "Electric field lines".to_string(),
        }
    }

    /// Tally both walk directions of every field line by termination reason.
    pub fn termination_counts(result: &SimulationResult) -> Vec<TerminationCount> {
        [
            (Termination::Singular, "singular"),
            (Termination::Reversal, "reversal"),
            (Termination::ZeroField, "zero-field"),
            (Termination::Exhausted, "exhausted"),
        ]
        .into_iter()
        .map(|(termination, reason)| TerminationCount {
            reason,
            count: result
                .field_lines
                .iter()
                .map(|l| {
                    usize::from(l.line.forward == termination)
                        + usize::from(l.line.backward == termination)
                })
                .sum(),
        })
        .collect()
    }

    pub fn render(&self, simulation: &Simulation, result: &SimulationResult) -> IoResult<String> {
        let svg = SvgWriter::new().render(simulation, result)?;
        let terminations = Self::termination_counts(result);
        let legend: Vec<String> = (0..=4).map(|i| heat_color(f64::from(i) / 4.0)).collect();

        let template = IndexTemplate {
            title: &self.title,
            svg: &svg,
            charge_count: simulation.collection.charges().len(),
            segment_count: simulation.collection.primitive_count(),
            field_line_count: result.field_lines.len(),
            point_count: result.field_lines.iter().map(|l| l.line.points.len()).sum(),
            step: format!("{:e}", simulation.step),
            max_iterations: simulation.max_iterations,
            terminations: &terminations,
            legend: result.potential_map.as_ref().map(|_| legend.as_slice()),
        };

        template
            .render()
            .map_err(|e| IoError::Write(e.to_string()))
    }
}

impl Writer for HtmlWriter {
    fn write(
        &self,
        simulation: &Simulation,
        result: &SimulationResult,
        output: &Path,
    ) -> IoResult<()> {
        fs::create_dir_all(output).map_err(IoError::Io)?;
        let html = self.render(simulation, result)?;
        fs::write(output.join("index.html"), html).map_err(IoError::Io)?;
        Ok(())
    }

    fn format_id(&self) -> &str {
        "html"
    }
}
