//! Outline text from a table of glyph contours.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::drafter::Drafter;
use crate::error::{ConfigError, LayoutError};
use crate::geometry::{Point, Shape};

/// Horizontal advance for characters missing from the table.
pub const MISSING_GLYPH_ADVANCE: f64 = 5.0;

/// One character in glyph space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Glyph {
    pub advance: f64,
    pub contours: Vec<Vec<Point>>,
}

/// Glyph outlines keyed by character, scaled against `max_height`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlyphTable {
    max_height: f64,
    glyphs: HashMap<char, Glyph>,
}

impl GlyphTable {
    pub fn new(max_height: f64) -> Self {
        Self {
            max_height,
            glyphs: HashMap::new(),
        }
    }

    /// Build from parallel columns of code points, advances and contour lists.
    ///
    /// Code points that are not valid `char`s are skipped.
    pub fn from_columns(
        max_height: f64,
        code_points: &[u32],
        advances: &[f64],
        contours: Vec<Vec<Vec<Point>>>,
    ) -> Result<Self, ConfigError> {
        if advances.len() != code_points.len() {
            return Err(ConfigError::LengthMismatch {
                name: "widths",
                expected: code_points.len(),
                actual: advances.len(),
            });
        }
        if contours.len() != code_points.len() {
            return Err(ConfigError::LengthMismatch {
                name: "contour_coordinates",
                expected: code_points.len(),
                actual: contours.len(),
            });
        }
        let mut table = Self::new(max_height);
        for ((&code, &advance), contours) in code_points.iter().zip(advances).zip(contours) {
            match char::from_u32(code) {
                Some(c) => table.insert(c, Glyph { advance, contours }),
                None => log::warn!("Skipping invalid code point U+{:04X} in glyph table", code),
            }
        }
        Ok(table)
    }

    pub fn insert(&mut self, c: char, glyph: Glyph) {
        self.glyphs.insert(c, glyph);
    }

    pub fn get(&self, c: char) -> Option<&Glyph> {
        self.glyphs.get(&c)
    }

    pub fn max_height(&self) -> f64 {
        self.max_height
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Contours of `text` laid out from `origin` (baseline left) at `height`.
    pub fn layout(&self, origin: Point, height: f64, text: &str) -> Vec<Shape> {
        let ratio = if self.max_height > 0.0 { height / self.max_height } else { 0.0 };
        let mut cursor = origin.x;
        let mut shapes = Vec::new();
        for c in text.chars() {
            match self.get(c) {
                Some(glyph) => {
                    shapes.extend(glyph.contours.iter().filter(|c| !c.is_empty()).map(|contour| {
                        Shape::new(
                            contour
                                .iter()
                                .map(|p| Point::new(cursor + p.x * ratio, origin.y + p.y * ratio))
                                .collect(),
                        )
                    }));
                    cursor += glyph.advance * ratio;
                }
                None => {
                    log::warn!("Character '{}' (U+{:04X}) missing from glyph table", c, c as u32);
                    cursor += MISSING_GLYPH_ADVANCE;
                }
            }
        }
        shapes
    }
}

impl Drafter<'_> {
    /// Commit every glyph contour of `text` as a closed polyline.
    pub fn text(
        &mut self,
        origin: Point,
        height: f64,
        text: &str,
        glyphs: &GlyphTable,
        layer: Option<&str>,
    ) -> Result<Vec<Shape>, LayoutError> {
        let shapes = glyphs.layout(origin, height, text);
        for shape in &shapes {
            self.commit(shape, layer)?;
        }
        Ok(shapes)
    }
}
