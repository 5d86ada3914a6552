//! Glyph tables stored as JSON columns.
//!
//! ```json
//! {
//!   "max_height": 700.0,
//!   "unicode_counts": [65, 66],
//!   "widths": [640.0, 600.0],
//!   "contour_coordinates": [[[[0, 0], [320, 700], [640, 0]]], [...]]
//! }
//! ```
//!
//! Row `i` of every column describes the same character.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use maskforge_core::{GlyphTable, Point};

use crate::IoError;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GlyphColumns {
    max_height: f64,
    unicode_counts: Vec<u32>,
    widths: Vec<f64>,
    contour_coordinates: Vec<Vec<Vec<[f64; 2]>>>,
}

pub fn parse_glyph_table(json: &str) -> Result<GlyphTable, IoError> {
    let columns: GlyphColumns = serde_json::from_str(json)?;
    let contours = columns
        .contour_coordinates
        .into_iter()
        .map(|glyph| {
            glyph
                .into_iter()
                .map(|contour| contour.into_iter().map(|[x, y]| Point::new(x, y)).collect())
                .collect()
        })
        .collect();
    let table = GlyphTable::from_columns(columns.max_height, &columns.unicode_counts, &columns.widths, contours)?;
    Ok(table)
}

pub fn load_glyph_table(path: &Path) -> Result<GlyphTable, IoError> {
    let json = fs::read_to_string(path)?;
    let table = parse_glyph_table(&json)?;
    log::info!("Loaded {} glyphs from {}", table.len(), path.display());
    Ok(table)
}
