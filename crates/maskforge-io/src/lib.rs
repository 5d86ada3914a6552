//! # Maskforge I/O
//!
//! File-backed drawing sinks and exporters: DXF (the drawing format mask
//! layouts are handed over in), GDS-II for fab tooling, JSON glyph tables
//! for outline text and JSON job files.

pub mod dxf_sink;
pub mod gds;
pub mod glyphs;
pub mod job;

use std::io;

use thiserror::Error;

use maskforge_core::{ConfigError, LayoutError, SinkError};

pub use dxf_sink::{export_dxf, read_dxf, read_dxf_from, DxfSink};
pub use gds::{export_gds, GdsBoundary, GdsError, GdsLibrary, GdsReader, GdsStructure, GdsWriter};
pub use glyphs::{load_glyph_table, parse_glyph_table};
pub use job::{JobConfig, OutputPaths};

#[derive(Error, Debug)]
pub enum IoError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("DXF error: {0}")]
    Dxf(#[from] ::dxf::DxfError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Gds(#[from] GdsError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error(transparent)]
    Layout(#[from] LayoutError),
}
