//! JSON Writer
//!
//! Writes the traced field lines and the optional potential map as
//! `fieldlines.json`.

use std::fs;
use std::path::Path;

use crate::io::{IoError, IoResult, Writer};
use crate::simulation::{Simulation, SimulationResult};

pub const OUTPUT_FILE: &str = "fieldlines.json";

#[derive(Debug)]
pub struct JsonWriter {
    /// Pretty-print the output (default: true)
    pub pretty: bool,
}

impl JsonWriter {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn render(&self, result: &SimulationResult) -> IoResult<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(result)
        } else {
            serde_json::to_string(result)
        };
        json.map_err(|e| IoError::Write(e.to_string()))
    }
}

impl Default for JsonWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl Writer for JsonWriter {
    fn write(&self, _: &Simulation, result: &SimulationResult, output: &Path) -> IoResult<()> {
        fs::create_dir_all(output)?;
        fs::write(output.join(OUTPUT_FILE), self.render(result)?)?;
        Ok(())
    }

    fn format_id(&self) -> &str {
        "json"
    }
}
