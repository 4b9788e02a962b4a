//! fieldlines - Electrostatic fields, potentials and field lines for 2D charge layouts.
//!
//! A request describes charges (points, finite lines, regular polygons) and the
//! generators that seed field lines. It is validated into a [`simulation::Simulation`],
//! which traces every field line and optionally samples a rank-equalized potential
//! raster. Readers and writers for the supported file formats live behind
//! [`io::FormatRegistry`].

pub mod charge;
pub mod collection;
pub mod equalizer;
pub mod html_writer;
pub mod io;
pub mod json_writer;
pub mod readers;
pub mod request;
pub mod seed;
pub mod simulation;
pub mod svg_writer;
pub mod tracer;
pub mod validate;
pub mod vector;
pub mod viewport;
