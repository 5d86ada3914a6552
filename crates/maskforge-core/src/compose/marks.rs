use std::f64::consts::{FRAC_PI_2, PI};

use serde::{Deserialize, Serialize};

use crate::anchor::Anchor;
use crate::drafter::Drafter;
use crate::error::{ConfigError, LayoutError};
use crate::geometry::{Outline, Point, Shape};
use crate::kernel::{self, ArcSpan, Triangle};
use crate::text::GlyphTable;

/// Most crosses along one half side of the frame.
pub const MAX_CROSS_STEPS: f64 = 10_000.0;

/// Placement of the maskless alignment frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentMarkSpec {
    /// Half side of the square the crosses sit on.
    pub half_extent: f64,
    pub pitch: f64,
    pub arm_width: f64,
    pub arm_length: f64,
    pub label: String,
    pub label_origin: Point,
    pub label_height: f64,
    /// Distance of the corner triangles' apexes from the center, per axis.
    pub corner_inset: f64,
    pub corner_leg: f64,
}

impl Default for AlignmentMarkSpec {
    fn default() -> Self {
        Self {
            half_extent: 5000.0,
            pitch: 500.0,
            arm_width: 25.0,
            arm_length: 125.0,
            label: "Top-Left".to_string(),
            label_origin: Point::new(-5200.0, 5200.0),
            label_height: 1000.0,
            corner_inset: 4850.0,
            corner_leg: 300.0,
        }
    }
}

impl AlignmentMarkSpec {
    /// Check the frame size and pitch before anything is drawn.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.half_extent.is_finite() && self.half_extent >= 0.0) {
            return Err(ConfigError::OutOfRange {
                name: "half_extent",
                value: self.half_extent,
                expected: "a finite non-negative length",
            });
        }
        if !(self.pitch.is_finite() && self.pitch > 0.0) {
            return Err(ConfigError::OutOfRange {
                name: "pitch",
                value: self.pitch,
                expected: "a finite positive length",
            });
        }
        if self.half_extent / self.pitch > MAX_CROSS_STEPS {
            return Err(ConfigError::OutOfRange {
                name: "pitch",
                value: self.pitch,
                expected: "at least half_extent / 10000",
            });
        }
        Ok(())
    }

    /// Cross centers around the square, skipping the axis crossings.
    pub fn cross_centers(&self) -> Result<Vec<Point>, ConfigError> {
        self.validate()?;
        let steps = (self.half_extent / self.pitch).round() as i64;
        let e = self.half_extent;
        let centers = (-steps..=steps)
            .filter(|&i| i != 0)
            .flat_map(|i| {
                let t = i as f64 * self.pitch;
                [
                    Point::new(-e, t),
                    Point::new(e, t),
                    Point::new(t, -e),
                    Point::new(t, e),
                ]
            })
            .collect();
        Ok(centers)
    }

    /// Corner triangles, top-left first, legs pointing into the frame.
    pub fn corners(&self) -> Result<[Triangle; 4], ConfigError> {
        let (c, leg) = (self.corner_inset, (self.corner_leg, self.corner_leg));
        let corner = |x: f64, y: f64, start: f64, end: f64| {
            kernel::triangle(Point::new(x, y), leg, ArcSpan::new(start, end), Anchor::Center)
        };
        Ok([
            corner(-c, c, 1.5 * PI, 0.0)?,
            corner(-c, -c, 0.0, FRAC_PI_2)?,
            corner(c, -c, FRAC_PI_2, PI)?,
            corner(c, c, PI, 1.5 * PI)?,
        ])
    }
}

/// Everything committed by [`Drafter::alignment_mark`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentMark {
    pub crosses: Vec<Shape>,
    pub label: Vec<Shape>,
    pub corners: [Triangle; 4],
}

impl Outline for AlignmentMark {
    fn parts(&self) -> Vec<&Shape> {
        self.crosses
            .iter()
            .chain(&self.label)
            .chain(self.corners.iter().map(|c| c.shape()))
            .collect()
    }
}

impl Drafter<'_> {
    /// Cross frame, corner label and corner triangles. The label is skipped without glyphs.
    pub fn alignment_mark(
        &mut self,
        spec: &AlignmentMarkSpec,
        glyphs: Option<&GlyphTable>,
        layer: Option<&str>,
    ) -> Result<AlignmentMark, LayoutError> {
        let centers = spec.cross_centers()?;
        let corners = spec.corners()?;
        let mut crosses = Vec::new();
        for center in centers {
            let cross = kernel::cross(center, spec.arm_width, spec.arm_length);
            self.commit(&cross, layer)?;
            crosses.push(cross);
        }
        let label = match glyphs {
            Some(glyphs) => self.text(spec.label_origin, spec.label_height, &spec.label, glyphs, layer)?,
            None => {
                log::warn!("No glyph table loaded, alignment mark drawn without its label");
                Vec::new()
            }
        };
        for corner in &corners {
            self.draw(corner, layer)?;
        }
        log::info!("Alignment mark: {} crosses, {} label contours", crosses.len(), label.len());
        Ok(AlignmentMark { crosses, label, corners })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{with_document, Document};

    #[test]
    fn test_cross_centers_skip_axes() {
        let centers = AlignmentMarkSpec::default().cross_centers().unwrap();
        assert_eq!(centers.len(), 80);
        assert!(centers.iter().all(|p| p.x != 0.0 && p.y != 0.0));
        assert!(centers.contains(&Point::new(-5000.0, 5000.0)));
    }

    #[test]
    fn test_corner_legs_point_inward() {
        let corners = AlignmentMarkSpec::default().corners().unwrap();
        let top_left = &corners[0];
        assert_eq!(top_left.apex(), Point::new(-4850.0, 4850.0));
        assert!((top_left.first_leg_end().y - 4550.0).abs() < 1e-9);
        assert!((top_left.second_leg_end().x + 4550.0).abs() < 1e-9);
        let bottom_right = &corners[2];
        assert!((bottom_right.first_leg_end().y + 4550.0).abs() < 1e-9);
        assert!((bottom_right.second_leg_end().x - 4550.0).abs() < 1e-9);
    }

    #[test]
    fn test_mark_without_glyphs() {
        let mut doc = Document::new("mark");
        let mark = with_document(&mut doc, true, |d| {
            d.alignment_mark(&AlignmentMarkSpec::default(), None, Some("mark"))
        })
        .unwrap();
        assert!(mark.label.is_empty());
        assert_eq!(doc.len(), 84);
        assert_eq!(doc.polylines_on_layer("mark").count(), 84);
    }

    #[test]
    fn test_bad_pitch_is_rejected_before_drawing() {
        for pitch in [0.0, -500.0, f64::NAN, 1e-6] {
            let spec = AlignmentMarkSpec {
                pitch,
                ..AlignmentMarkSpec::default()
            };
            let mut doc = Document::new("mark");
            let result = with_document(&mut doc, true, |d| d.alignment_mark(&spec, None, None));
            assert!(
                matches!(result, Err(LayoutError::Config(ConfigError::OutOfRange { name: "pitch", .. }))),
                "pitch {} accepted",
                pitch
            );
            assert!(doc.is_empty());
        }
    }

    #[test]
    fn test_negative_extent_is_rejected() {
        let spec = AlignmentMarkSpec {
            half_extent: -1.0,
            ..AlignmentMarkSpec::default()
        };
        assert!(matches!(
            spec.cross_centers(),
            Err(ConfigError::OutOfRange { name: "half_extent", .. })
        ));
        let empty = AlignmentMarkSpec {
            half_extent: 0.0,
            ..AlignmentMarkSpec::default()
        };
        assert!(empty.cross_centers().unwrap().is_empty());
    }

    #[test]
    fn test_outline_lists_every_part() {
        let mut doc = Document::new("mark");
        let mark = with_document(&mut doc, true, |d| d.alignment_mark(&AlignmentMarkSpec::default(), None, None)).unwrap();
        assert_eq!(mark.parts().len(), 84);
    }
}
