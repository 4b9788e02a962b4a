//! JSON and YAML request readers.

use std::fs;
use std::path::Path;

use crate::io::{IoError, IoResult, Reader};
use crate::request::SimulationRequest;

/// Reader for JSON request files, the same shape `POST /api/simulate` accepts
#[derive(Debug, Default)]
pub struct JsonReader;

impl JsonReader {
    pub fn new() -> Self {
        Self
    }
}

impl Reader for JsonReader {
    fn read(&self, input: &Path) -> IoResult<SimulationRequest> {
        let content = fs::read_to_string(input)?;
        serde_json::from_str(&content).map_err(|e| IoError::Parse(e.to_string()))
    }

    fn supported_extensions(&self) -> &[&str] {
        &["json"]
    }
}

/// Reader for YAML request files
#[derive(Debug, Default)]
pub struct YamlReader;

impl YamlReader {
    pub fn new() -> Self {
        Self
    }
}

impl Reader for YamlReader {
    fn read(&self, input: &Path) -> IoResult<SimulationRequest> {
        let content = fs::read_to_string(input)?;
        serde_yaml::from_str(&content).map_err(|e| IoError::Parse(e.to_string()))
    }

    fn supported_extensions(&self) -> &[&str] {
        &["yaml", "yml"]
    }
}
