//! Reader/Writer traits and format dispatch
//!
//! Readers decode a request file into a [`SimulationRequest`]; writers render
//! a finished simulation into an output directory. The [`FormatRegistry`]
//! picks a reader by file extension and a writer by format id.

use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::html_writer::HtmlWriter;
use crate::json_writer::JsonWriter;
use crate::readers::{JsonReader, YamlReader};
use crate::request::SimulationRequest;
use crate::simulation::{Simulation, SimulationResult};
use crate::svg_writer::SvgWriter;
use crate::validate::{ValidationError, validate};

/// Errors that can occur during reading or writing
#[derive(Error, Debug)]
pub enum IoError {
    /// The file format is not supported
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The file extension could not be determined
    #[error("could not determine file format from path: {0}")]
    UnknownExtension(String),

    /// An I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A parsing error occurred
    #[error("parse error: {0}")]
    Parse(String),

    /// A rendering/writing error occurred
    #[error("write error: {0}")]
    Write(String),

    /// The request parsed but was rejected
    #[error("invalid request: {0}")]
    Invalid(#[from] ValidationError),
}

/// Result type for reader/writer operations
pub type IoResult<T> = Result<T, IoError>;

/// A reader decodes a request file
pub trait Reader {
    fn read(&self, input: &Path) -> IoResult<SimulationRequest>;

    /// File extensions this reader can handle (e.g., ["yaml", "yml"])
    fn supported_extensions(&self) -> &[&str];

    /// Check if this reader can handle the given file extension
    fn supports_extension(&self, ext: &str) -> bool {
        self.supported_extensions()
            .iter()
            .any(|e| e.eq_ignore_ascii_case(ext))
    }
}

/// A writer renders a simulation and its result into an output directory
pub trait Writer {
    fn write(
        &self,
        simulation: &Simulation,
        result: &SimulationResult,
        output: &Path,
    ) -> IoResult<()>;

    /// Identifier for this output format (e.g., "svg", "json")
    fn format_id(&self) -> &str;
}

/// Registry of available readers and writers
pub struct FormatRegistry {
    readers: Vec<Box<dyn Reader>>,
    writers: Vec<Box<dyn Writer>>,
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            readers: Vec::new(),
            writers: Vec::new(),
        }
    }

    /// Create a registry with all default readers and writers registered
    ///
    /// Currently registers:
    /// - Readers: `JsonReader` (json), `YamlReader` (yaml, yml)
    /// - Writers: `SvgWriter` (svg), `JsonWriter` (json), `HtmlWriter` (html)
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_reader(Box::new(JsonReader::new()));
        registry.register_reader(Box::new(YamlReader::new()));
        registry.register_writer(Box::new(SvgWriter::new()));
        registry.register_writer(Box::new(JsonWriter::new()));
        registry.register_writer(Box::new(HtmlWriter::new()));
        registry
    }

    pub fn register_reader(&mut self, reader: Box<dyn Reader>) {
        self.readers.push(reader);
    }

    pub fn register_writer(&mut self, writer: Box<dyn Writer>) {
        self.writers.push(writer);
    }

    /// Find a reader for the given file extension
    pub fn reader_for_extension(&self, ext: &str) -> Option<&dyn Reader> {
        self.readers
            .iter()
            .find(|r| r.supports_extension(ext))
            .map(|r| r.as_ref())
    }

    /// Find a writer by format ID
    pub fn writer_for_format(&self, format_id: &str) -> Option<&dyn Writer> {
        self.writers
            .iter()
            .find(|w| w.format_id().eq_ignore_ascii_case(format_id))
            .map(|w| w.as_ref())
    }

    /// Get file extension from a path
    pub fn extension_from_path(path: &Path) -> Option<&str> {
        path.extension().and_then(|e| e.to_str())
    }

    /// Find a reader for the given path based on its extension
    pub fn reader_for_path(&self, path: &Path) -> IoResult<&dyn Reader> {
        let ext = Self::extension_from_path(path)
            .ok_or_else(|| IoError::UnknownExtension(path.display().to_string()))?;

        self.reader_for_extension(ext)
            .ok_or_else(|| IoError::UnsupportedFormat(ext.to_string()))
    }

    /// Read and validate the request at `input`.
    pub fn load(&self, input: &Path) -> IoResult<Simulation> {
        let request = self.reader_for_path(input)?.read(input)?;
        Ok(validate(&request)?)
    }

    /// Load `input`, run it, and write every requested format into `output`.
    ///
    /// All formats are resolved before any work starts, so an unknown format
    /// fails without touching the output directory.
    pub fn generate(
        &self,
        input: &Path,
        output: &Path,
        formats: &[&str],
    ) -> IoResult<SimulationResult> {
        let writers = formats
            .iter()
            .map(|f| {
                self.writer_for_format(f)
                    .ok_or_else(|| IoError::UnsupportedFormat(f.to_string()))
            })
            .collect::<IoResult<Vec<_>>>()?;

        let simulation = self.load(input)?;
        let result = simulation.run();
        for writer in writers {
            writer.write(&simulation, &result, output)?;
            info!(format = writer.format_id(), output = %output.display(), "wrote output");
        }
        Ok(result)
    }
}
