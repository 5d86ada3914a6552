//! Single-line pad groups and the DC bias pads hung below a probe pad row.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::anchor::{Anchor, Axis};
use crate::collection::ShapeCollection;
use crate::compose::lines::LineArray;
use crate::drafter::Drafter;
use crate::error::{ConfigError, LayoutError};
use crate::geometry::{Outline, Point, Shape};
use crate::kernel::{self, ArcSpan, Quad, TrapezoidSpec, Triangle};
use crate::params::DcPadParams;

/// Dimensions of a [`PadGroup`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PadGroupSpec {
    pub pad_width: f64,
    /// Height of the center pad.
    pub pad_length: f64,
    pub pad_gap: f64,
    /// Height of the shorting base.
    pub short_width: f64,
}

impl PadGroupSpec {
    /// Square pads whose base is as tall as a pad is wide.
    pub fn single_line(pad_width: f64, pad_gap: f64) -> Self {
        Self {
            pad_width,
            pad_length: pad_width,
            pad_gap,
            short_width: pad_width,
        }
    }
}

/// Three pads over a common base: the outer two touch the base, the center one floats a gap above it.
///
/// ```text
///  +--+ +--+ +--+
///  |  | |  | |  |
///  |  | +--+ |  |
///  |  |      |  |
///  +--+------+--+
///  |    base    |
///  +------------+
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PadGroup {
    pub base: Quad,
    pub left: Quad,
    pub center: Quad,
    pub right: Quad,
}

impl PadGroup {
    /// Group whose base's bottom-left corner is `origin`.
    pub fn build(origin: Point, spec: &PadGroupSpec) -> Result<Self, ConfigError> {
        let (pw, pl, pg, sw) = (spec.pad_width, spec.pad_length, spec.pad_gap, spec.short_width);
        let pitch = pw + pg;
        Ok(Self {
            base: kernel::square(origin, 3.0 * pw + 2.0 * pg, sw, Anchor::BottomLeft)?,
            left: kernel::square(origin.translate(0.0, sw), pw, pl + pg, Anchor::BottomLeft)?,
            center: kernel::square(origin.translate(pitch, sw + pg), pw, pl, Anchor::BottomLeft)?,
            right: kernel::square(origin.translate(2.0 * pitch, sw), pw, pl + pg, Anchor::BottomLeft)?,
        })
    }
}

impl Outline for PadGroup {
    fn parts(&self) -> Vec<&Shape> {
        vec![
            self.base.shape(),
            self.left.shape(),
            self.center.shape(),
            self.right.shape(),
        ]
    }
}

/// How a DC pad group connects to the probe pads above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DcPadKind {
    /// Left pad tapers one pitch left into the row; hangs under pad 2.
    OffsetLeft,
    /// Right pad tapers one pitch right into the row; hangs under pad 0.
    OffsetRight,
    /// Tucked under pad 0 with a bridge to pad 3 and a rectangular arm.
    Stub,
    /// Like `Stub` with a triangular arm.
    Wedge,
}

impl DcPadKind {
    /// Probe pads the variant reaches into.
    fn min_pads(&self) -> usize {
        match self {
            DcPadKind::OffsetLeft => 3,
            DcPadKind::OffsetRight => 1,
            DcPadKind::Stub | DcPadKind::Wedge => 4,
        }
    }
}

impl fmt::Display for DcPadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DcPadKind::OffsetLeft => "offset_left",
            DcPadKind::OffsetRight => "offset_right",
            DcPadKind::Stub => "stub",
            DcPadKind::Wedge => "wedge",
        })
    }
}

impl FromStr for DcPadKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "offset_left" | "1" => Ok(DcPadKind::OffsetLeft),
            "offset_right" | "2" => Ok(DcPadKind::OffsetRight),
            "stub" | "3" => Ok(DcPadKind::Stub),
            "wedge" | "4" => Ok(DcPadKind::Wedge),
            other => Err(ConfigError::UnknownName {
                kind: "dc pad",
                name: other.to_string(),
            }),
        }
    }
}

/// A DC bias pad group and its connectors, in commit order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcPad {
    pub kind: DcPadKind,
    pub pads: PadGroup,
    /// Offset taper from an outer pad to the probe row.
    pub taper: Option<Quad>,
    /// Riser on top of the center pad.
    pub stem: Quad,
    /// Short link down from probe pad 3.
    pub bridge: Option<Quad>,
    pub arm: Option<Quad>,
    pub wedge: Option<Triangle>,
}

impl DcPad {
    /// Lay out `kind` under `probe_pads`, a y-axis row of pads.
    pub fn build(kind: DcPadKind, probe_pads: &LineArray, params: &DcPadParams) -> Result<Self, ConfigError> {
        if probe_pads.len() < kind.min_pads() {
            return Err(ConfigError::TooShort {
                name: "probe pads",
                min: kind.min_pads(),
                actual: probe_pads.len(),
            });
        }
        let (pw, pg, tl) = (params.pad_width, params.pad_gap, params.taper_length);
        let spec = PadGroupSpec::single_line(pw, pg);
        let offset_taper = |at: Point, offset: f64| {
            let spec = TrapezoidSpec {
                top_width: pw,
                bottom_width: pw,
                offset,
                height: tl,
                axis: Axis::X,
            };
            kernel::trapezoid(at, &spec, Anchor::BottomLeft)
        };

        let hang = match kind {
            DcPadKind::OffsetLeft | DcPadKind::OffsetRight => tl + 2.0 * pw + pg,
            DcPadKind::Stub | DcPadKind::Wedge => 2.0 * pg + 2.0 * pw,
        };
        let above = match kind {
            DcPadKind::OffsetLeft => probe_pads.line(2).bottom_left(),
            _ => probe_pads.line(0).bottom_left(),
        };
        let pads = PadGroup::build(above.translate(0.0, -hang), &spec)?;
        let stem = kernel::square(pads.center.top_left(), pw, tl, Anchor::BottomLeft)?;

        let mut dc = Self {
            kind,
            taper: None,
            stem,
            bridge: None,
            arm: None,
            wedge: None,
            pads,
        };
        match kind {
            DcPadKind::OffsetLeft => {
                dc.taper = Some(offset_taper(dc.pads.left.top_left(), -(pw + pg))?);
            }
            DcPadKind::OffsetRight => {
                dc.taper = Some(offset_taper(dc.pads.right.top_left(), pw + pg)?);
            }
            DcPadKind::Stub | DcPadKind::Wedge => {
                dc.bridge = Some(kernel::square(probe_pads.line(3).bottom_left(), pw, pg, Anchor::TopLeft)?);
                let corner = dc.pads.right.top_right();
                if kind == DcPadKind::Stub {
                    dc.arm = Some(kernel::square(corner, pw + pg, pw, Anchor::TopLeft)?);
                } else {
                    dc.wedge = Some(kernel::triangle(
                        corner,
                        (pw, pw + pg),
                        ArcSpan::new(1.5 * PI, 2.0 * PI),
                        Anchor::Center,
                    )?);
                }
            }
        }
        Ok(dc)
    }

    /// Components under their collection names, in commit order.
    pub fn named_parts(&self) -> Vec<(&'static str, &dyn Outline)> {
        let mut parts: Vec<(&'static str, &dyn Outline)> = vec![("pad_single_line_0", &self.pads)];
        if let Some(taper) = &self.taper {
            parts.push(("trapezoid_0", taper));
        }
        parts.push(("square_2", &self.stem));
        if let Some(bridge) = &self.bridge {
            parts.push(("square_3", bridge));
        }
        if let Some(arm) = &self.arm {
            parts.push(("square_4", arm));
        }
        if let Some(wedge) = &self.wedge {
            parts.push(("triangle_0", wedge));
        }
        parts
    }

    pub fn record(&self, shapes: &mut ShapeCollection) {
        for (name, part) in self.named_parts() {
            shapes.insert(name, part);
        }
    }
}

impl Drafter<'_> {
    pub fn pad_single_line(&mut self, origin: Point, pad_width: f64, pad_gap: f64) -> Result<PadGroup, LayoutError> {
        self.pad_changeable_length(origin, &PadGroupSpec::single_line(pad_width, pad_gap), None)
    }

    pub fn pad_changeable_length(
        &mut self,
        origin: Point,
        spec: &PadGroupSpec,
        layer: Option<&str>,
    ) -> Result<PadGroup, LayoutError> {
        let group = PadGroup::build(origin, spec)?;
        self.draw(&group, layer)?;
        Ok(group)
    }

    pub fn dc_pad(
        &mut self,
        kind: DcPadKind,
        probe_pads: &LineArray,
        params: &DcPadParams,
    ) -> Result<DcPad, LayoutError> {
        let dc = DcPad::build(kind, probe_pads, params)?;
        for (_, part) in dc.named_parts() {
            self.draw(part, None)?;
        }
        log::debug!("Placed {} DC pad", kind);
        Ok(dc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::lines::StackProfile;
    use crate::document::{with_document, Document};

    fn probe_row(count: usize) -> LineArray {
        let profile = StackProfile::uniform(count, 80.0, 20.0).unwrap();
        LineArray::straight(Point::ORIGIN, 80.0, &profile, Axis::Y).unwrap()
    }

    #[test]
    fn test_pad_group_layout() {
        let group = PadGroup::build(Point::ORIGIN, &PadGroupSpec::single_line(50.0, 50.0)).unwrap();
        assert!((group.base.bottom_right().x - 250.0).abs() < 1e-10);
        assert!((group.left.top_left().y - 150.0).abs() < 1e-10);
        assert!((group.center.bottom_left().x - 100.0).abs() < 1e-10);
        assert!((group.center.bottom_left().y - 100.0).abs() < 1e-10);
        assert!((group.center.top_left().y - 150.0).abs() < 1e-10);
        assert!((group.right.bottom_left().x - 200.0).abs() < 1e-10);
        assert_eq!(group.outline().len(), 16);
    }

    #[test]
    fn test_changeable_length() {
        let spec = PadGroupSpec {
            pad_width: 80.0,
            pad_length: 200.0,
            pad_gap: 20.0,
            short_width: 100.0,
        };
        let group = PadGroup::build(Point::ORIGIN, &spec).unwrap();
        assert!((group.base.top_left().y - 100.0).abs() < 1e-10);
        assert!((group.center.top_left().y - 320.0).abs() < 1e-10);
        assert!((group.left.top_left().y - 320.0).abs() < 1e-10);
    }

    #[test]
    fn test_offset_left_reaches_probe_row() {
        let params = DcPadParams::default();
        let dc = DcPad::build(DcPadKind::OffsetLeft, &probe_row(3), &params).unwrap();
        let taper = dc.taper.as_ref().unwrap();
        assert!(taper.top_left().y.abs() < 1e-10);
        assert!((taper.top_left().x - 100.0).abs() < 1e-10);
        assert!((dc.pads.left.bottom_left().x - 200.0).abs() < 1e-10);
        assert!(dc.bridge.is_none());
    }

    #[test]
    fn test_stub_needs_four_pads() {
        let params = DcPadParams::default();
        assert_eq!(
            DcPad::build(DcPadKind::Stub, &probe_row(3), &params),
            Err(ConfigError::TooShort {
                name: "probe pads",
                min: 4,
                actual: 3
            })
        );
        let dc = DcPad::build(DcPadKind::Wedge, &probe_row(5), &params).unwrap();
        let wedge = dc.wedge.as_ref().unwrap();
        assert_eq!(wedge.apex(), dc.pads.right.top_right());
        assert!((wedge.first_leg_end().y - (wedge.apex().y - 80.0)).abs() < 1e-10);
    }

    #[test]
    fn test_dc_pad_records_names() {
        let mut doc = Document::new("test");
        let params = DcPadParams::default();
        let dc = with_document(&mut doc, true, |d| d.dc_pad(DcPadKind::Stub, &probe_row(5), &params)).unwrap();
        let mut shapes = ShapeCollection::new();
        dc.record(&mut shapes);
        assert_eq!(
            shapes.names().collect::<Vec<_>>(),
            vec!["pad_single_line_0", "square_2", "square_3", "square_4"]
        );
        assert_eq!(doc.len(), 4 + 3);
    }
}
