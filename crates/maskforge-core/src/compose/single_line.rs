//! Single conductor lines: straight arrays, aligned bend loops, pad fan-out tapers.

use std::f64::consts::{FRAC_PI_2, PI};

use serde::{Deserialize, Serialize};

use crate::anchor::{Anchor, Axis};
use crate::compose::bend::Bend;
use crate::compose::lines::{LineArray, StackProfile};
use crate::drafter::Drafter;
use crate::error::{ConfigError, LayoutError};
use crate::geometry::{Outline, Point, Shape};
use crate::kernel::{self, AnnularSector, ArcSpan, Quad, TrapezoidSpec};

/// Quarter loops of a single-line coil whose outermost loop is pulled back
/// by `alignment_length` and joined to the rest by a straight bridge.
///
/// All loops sweep from `PI / 2` to `PI`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BendAligner {
    pub inner: Vec<AnnularSector>,
    pub outer: AnnularSector,
    pub bridge: Quad,
}

impl BendAligner {
    /// `origin` is the bottom-left of the outermost loop's bounding quarter.
    pub fn build(
        origin: Point,
        alignment_length: f64,
        inner_radii: &[f64],
        outer_radii: &[f64],
    ) -> Result<Self, ConfigError> {
        let (r1_last, r2_last) = match (inner_radii.last(), outer_radii.last()) {
            (Some(&r1), Some(&r2)) => (r1, r2),
            _ => return Err(ConfigError::Empty("inner_radii")),
        };
        if outer_radii.len() != inner_radii.len() {
            return Err(ConfigError::LengthMismatch {
                name: "outer_radii",
                expected: inner_radii.len(),
                actual: outer_radii.len(),
            });
        }
        let span = ArcSpan::new(FRAC_PI_2, PI);
        let shifted = origin.translate(r2_last + alignment_length, 0.0);
        let loops = inner_radii.len();
        let inner = inner_radii[..loops - 1]
            .iter()
            .zip(&outer_radii[..loops - 1])
            .map(|(&r1, &r2)| kernel::annular_sector(shifted, r1, r2, span, Anchor::Center))
            .collect::<Result<Vec<_>, _>>()?;
        let center = origin.translate(r2_last, 0.0);
        let outer = kernel::annular_sector(center, r1_last, r2_last, span, Anchor::Center)?;
        let bridge = kernel::square(
            center.translate(0.0, r1_last),
            alignment_length,
            r2_last - r1_last,
            Anchor::BottomLeft,
        )?;
        Ok(Self { inner, outer, bridge })
    }
}

impl Outline for BendAligner {
    fn parts(&self) -> Vec<&Shape> {
        self.inner
            .iter()
            .map(|s| s.shape())
            .chain([self.outer.shape(), self.bridge.shape()])
            .collect()
    }
}

/// Two trapezoids fanning a pair of pads down to single lines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SingleLineTaperSpec {
    pub height: f64,
    pub pad_width: f64,
    pub pad_gap: f64,
    pub line_width: f64,
}

/// Both tapers of a [`SingleLineTaperSpec`], origin side first.
pub fn single_line_tapers(origin: Point, spec: &SingleLineTaperSpec, axis: Axis) -> Result<[Quad; 2], ConfigError> {
    let trapezoid = TrapezoidSpec {
        top_width: spec.line_width,
        bottom_width: spec.pad_width,
        offset: 0.0,
        height: spec.height,
        axis,
    };
    let pitch = spec.pad_width + spec.pad_gap;
    let (next, anchor) = match axis {
        Axis::X => (origin.translate(pitch, 0.0), Anchor::BottomLeft),
        Axis::Y => (origin.translate(0.0, pitch), Anchor::LeftBottom),
    };
    Ok([
        kernel::trapezoid(origin, &trapezoid, anchor)?,
        kernel::trapezoid(next, &trapezoid, anchor)?,
    ])
}

impl Drafter<'_> {
    /// `count` equal lines; bottom-left of line 0 at `origin`.
    pub fn straight_single_line(
        &mut self,
        origin: Point,
        length: f64,
        width: f64,
        gap: f64,
        count: usize,
        axis: Axis,
    ) -> Result<LineArray, LayoutError> {
        let profile = StackProfile::uniform(count, width, gap)?;
        self.stack(origin, length, &profile, axis, None)
    }

    pub fn bend_aligner(
        &mut self,
        origin: Point,
        alignment_length: f64,
        inner_radii: &[f64],
        outer_radii: &[f64],
    ) -> Result<BendAligner, LayoutError> {
        let aligner = BendAligner::build(origin, alignment_length, inner_radii, outer_radii)?;
        self.draw(&aligner, None)?;
        Ok(aligner)
    }

    pub fn tapers_single_line(
        &mut self,
        origin: Point,
        spec: &SingleLineTaperSpec,
        axis: Axis,
        layer: Option<&str>,
    ) -> Result<[Quad; 2], LayoutError> {
        let tapers = single_line_tapers(origin, spec, axis)?;
        for taper in &tapers {
            self.draw(taper, layer)?;
        }
        Ok(tapers)
    }

    /// Concentric single-line rings without a core.
    pub fn bend_single_line(
        &mut self,
        center: Point,
        inner_radii: &[f64],
        outer_radii: &[f64],
        span: ArcSpan,
    ) -> Result<Bend, LayoutError> {
        self.bend_2(center, inner_radii, outer_radii, span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{with_document, Document};

    #[test]
    fn test_aligner_bridge_joins_outer_loop() {
        let aligner = BendAligner::build(Point::ORIGIN, 30.0, &[10.0, 20.0, 30.0], &[16.0, 26.0, 36.0]).unwrap();
        assert_eq!(aligner.inner.len(), 2);
        assert!((aligner.outer.center().x - 36.0).abs() < 1e-10);
        assert!((aligner.inner[0].center().x - 66.0).abs() < 1e-10);
        // Bridge spans from the outer loop's start to the shifted loops' axis.
        assert!((aligner.bridge.bottom_left().x - aligner.outer.inner_start().x).abs() < 1e-10);
        assert!((aligner.bridge.bottom_left().y - 30.0).abs() < 1e-10);
        assert!((aligner.bridge.top_right().x - 66.0).abs() < 1e-10);
        assert!((aligner.bridge.top_right().y - 36.0).abs() < 1e-10);
        assert_eq!(aligner.outline().len(), 4 * 3 + 4);
    }

    #[test]
    fn test_aligner_validates_radii() {
        assert_eq!(
            BendAligner::build(Point::ORIGIN, 1.0, &[], &[]),
            Err(ConfigError::Empty("inner_radii"))
        );
        assert!(BendAligner::build(Point::ORIGIN, 1.0, &[1.0, 2.0], &[3.0]).is_err());
    }

    #[test]
    fn test_single_line_tapers() {
        let spec = SingleLineTaperSpec {
            height: 50.0,
            pad_width: 80.0,
            pad_gap: 20.0,
            line_width: 6.0,
        };
        let [a, b] = single_line_tapers(Point::ORIGIN, &spec, Axis::X).unwrap();
        assert!((a.top_center().x - 40.0).abs() < 1e-10);
        assert!((a.top_right().x - a.top_left().x - 6.0).abs() < 1e-10);
        assert!((b.bottom_left().x - 100.0).abs() < 1e-10);

        let [c, d] = single_line_tapers(Point::ORIGIN, &spec, Axis::Y).unwrap();
        assert!(c.bottom_left().y.abs() < 1e-10);
        assert!((d.bottom_left().y - 100.0).abs() < 1e-10);
        assert!((c.bottom_right().x - 50.0).abs() < 1e-10);
    }

    #[test]
    fn test_straight_single_line_count() {
        let mut doc = Document::new("test");
        let lines = with_document(&mut doc, true, |d| {
            d.straight_single_line(Point::ORIGIN, 100.0, 6.0, 3.0, 5, Axis::Y)
        })
        .unwrap();
        assert_eq!(lines.len(), 5);
        assert!((lines.line(4).bottom_right().x - 42.0).abs() < 1e-10);
        assert_eq!(doc.len(), 5);
    }
}
