//! jlc2kicad: convert JLCPCB/EasyEDA library components into KiCad libraries.
//!
//! Takes the JSON component payloads the EasyEDA API serves, decodes their
//! tilde-delimited shape records, and produces KiCad footprints
//! (`.kicad_mod`), symbol library records (`.kicad_sym`) and VRML 3-D
//! models (`.wrl`).
//!
//! # Pipeline
//!
//! - [`easyeda`] — payload envelope and shape-record tokenizer
//! - [`geometry`] — unit conversion, SVG path parsing, elliptical arcs
//! - [`footprint`] — footprint document model, decoders and writer
//! - [`symbol`] — symbol document model, decoders and writer
//! - [`model3d`] — OBJ-like model parser and VRML writer
//! - [`library`] — `.kicad_sym` container with idempotent record upsert
//! - [`report`] — conversion warning/error collection
//! - [`config`] — configuration loading and validation

pub mod config;
pub mod easyeda;
pub mod error;
pub mod footprint;
pub mod geometry;
pub mod library;
pub mod model3d;
pub mod report;
pub mod symbol;
