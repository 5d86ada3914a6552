//! Ground-signal-ground (coplanar waveguide) components.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::anchor::{Anchor, Axis};
use crate::compose::bend::{Bend, Cap};
use crate::compose::lines::{LineArray, StackProfile};
use crate::compose::taper::TaperArray;
use crate::drafter::Drafter;
use crate::error::{ConfigError, LayoutError};
use crate::geometry::{Outline, Point, Shape};
use crate::kernel::{self, ArcSpan, Quad};

/// Conductor widths of a coplanar line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoplanarStack {
    pub gnd_width: f64,
    pub sig_width: f64,
    pub sig_gnd_gap: f64,
}

impl CoplanarStack {
    pub fn new(gnd_width: f64, sig_width: f64, sig_gnd_gap: f64) -> Self {
        Self {
            gnd_width,
            sig_width,
            sig_gnd_gap,
        }
    }

    /// Ground, signal, ground.
    pub fn profile(&self) -> StackProfile {
        self.pin_profile(PinCount::Three)
    }

    /// Conductor profile matching a probe pin configuration.
    pub fn pin_profile(&self, pins: PinCount) -> StackProfile {
        let widths = match pins {
            PinCount::Three => vec![self.gnd_width, self.sig_width, self.gnd_width],
            PinCount::Five => vec![
                self.gnd_width,
                self.sig_width,
                self.gnd_width,
                self.sig_width,
                self.gnd_width,
            ],
        };
        let gaps = vec![self.sig_gnd_gap; widths.len() - 1];
        StackProfile::from_parts(widths, gaps)
    }

    /// Outer edge to outer edge.
    pub fn width(&self) -> f64 {
        2.0 * self.gnd_width + 2.0 * self.sig_gnd_gap + self.sig_width
    }

    /// Inner and outer radii of the signal and outer ground rings around a ground core.
    fn cored_radii(&self) -> ([f64; 2], [f64; 2]) {
        let (g, s, gap) = (self.gnd_width, self.sig_width, self.sig_gnd_gap);
        (
            [g + gap, g + gap + s + gap],
            [g + gap + s, g + gap + s + gap + g],
        )
    }
}

/// Named probe pin configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinCount {
    /// Ground-signal-ground.
    #[default]
    Three,
    /// Ground-signal-ground-signal-ground.
    Five,
}

impl PinCount {
    pub fn count(&self) -> usize {
        match self {
            PinCount::Three => 3,
            PinCount::Five => 5,
        }
    }
}

impl fmt::Display for PinCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PinCount::Three => "three",
            PinCount::Five => "five",
        })
    }
}

impl FromStr for PinCount {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "three" | "3" => Ok(PinCount::Three),
            "five" | "5" => Ok(PinCount::Five),
            other => Err(ConfigError::UnknownName {
                kind: "pin count",
                name: other.to_string(),
            }),
        }
    }
}

/// A row of equal probe pads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PadRow {
    pub length: f64,
    pub width: f64,
    pub gap: f64,
    pub pins: PinCount,
}

impl PadRow {
    pub fn profile(&self) -> StackProfile {
        StackProfile::from_parts(vec![self.width; self.pins.count()], vec![self.gap; self.pins.count() - 1])
    }
}

/// Coplanar bend variants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoplanarBend {
    /// Ground core with round rings.
    Round,
    /// Rings only, starting at `radius`.
    Open { radius: f64 },
    /// Ground core, outer ground squared off through the bisector.
    Square,
    /// Ground core, outer ground closed by a partial square.
    PartialSquare,
}

/// Shorted coplanar end: ground-signal-ground with a resistor strip on its own layer.
///
/// ```text
///  +-------------+-----+
///  |  top gnd    |     |
///  +-------------+     |
///  +--+========+=+     |  right gnd
///  |s |resistor  |     |
///  +--+========+=+     |
///  +-------------+     |
///  |  bottom gnd |     |
///  +-------------+-----+
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Termination {
    pub bottom_gnd: Quad,
    pub signal: Quad,
    pub resistor: Quad,
    pub top_gnd: Quad,
    pub right_gnd: Quad,
}

/// Dimensions of a [`Termination`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminationSpec {
    /// Signal overlap onto the resistor on the open side.
    pub overlap1: f64,
    /// Resistor overlap under the right ground.
    pub overlap2: f64,
    pub length: f64,
    pub layer: String,
}

impl Termination {
    pub fn build(origin: Point, stack: &CoplanarStack, spec: &TerminationSpec) -> Result<Self, ConfigError> {
        let (g, s, gap) = (stack.gnd_width, stack.sig_width, stack.sig_gnd_gap);
        let (ov1, ov2, tl) = (spec.overlap1, spec.overlap2, spec.length);
        let signal_origin = origin.translate(0.0, g + gap);
        Ok(Self {
            bottom_gnd: kernel::square(origin, tl + ov1, g, Anchor::BottomLeft)?,
            signal: kernel::square(signal_origin, ov1, s, Anchor::BottomLeft)?,
            resistor: kernel::square(signal_origin, tl + ov1 + ov2, s, Anchor::BottomLeft)?,
            top_gnd: kernel::square(origin.translate(0.0, g + gap + s + gap), tl + ov1, g, Anchor::BottomLeft)?,
            right_gnd: kernel::square(origin.translate(tl + ov1, 0.0), ov2, stack.width(), Anchor::BottomLeft)?,
        })
    }
}

impl Outline for Termination {
    fn parts(&self) -> Vec<&Shape> {
        vec![
            self.bottom_gnd.shape(),
            self.signal.shape(),
            self.resistor.shape(),
            self.top_gnd.shape(),
            self.right_gnd.shape(),
        ]
    }
}

impl Drafter<'_> {
    pub fn straight_coplanar(
        &mut self,
        origin: Point,
        length: f64,
        stack: &CoplanarStack,
        axis: Axis,
    ) -> Result<LineArray, LayoutError> {
        self.stack(origin, length, &stack.profile(), axis, None)
    }

    /// Termination whose resistor goes on `spec.layer`; the metal inherits the active layer.
    pub fn termination_coplanar(
        &mut self,
        origin: Point,
        stack: &CoplanarStack,
        spec: &TerminationSpec,
    ) -> Result<Termination, LayoutError> {
        let termination = Termination::build(origin, stack, spec)?;
        self.draw(&termination.bottom_gnd, None)?;
        self.draw(&termination.signal, None)?;
        self.draw(&termination.resistor, Some(&spec.layer))?;
        self.draw(&termination.top_gnd, None)?;
        self.draw(&termination.right_gnd, None)?;
        Ok(termination)
    }

    /// Row of probe pads, bottom-left corner of pad 0 at `origin`.
    pub fn probe_pads(&mut self, origin: Point, row: &PadRow, axis: Axis) -> Result<LineArray, LayoutError> {
        self.stack(origin, row.length, &row.profile(), axis, None)
    }

    /// Tapers from a probe pad row (at `origin`) to a coplanar line.
    pub fn coplanar_tapers(
        &mut self,
        origin: Point,
        height: f64,
        row: &PadRow,
        stack: &CoplanarStack,
        axis: Axis,
    ) -> Result<TaperArray, LayoutError> {
        self.tapers(origin, height, &stack.pin_profile(row.pins), &row.profile(), axis)
    }

    pub fn bend_coplanar(
        &mut self,
        kind: CoplanarBend,
        center: Point,
        stack: &CoplanarStack,
        span: ArcSpan,
    ) -> Result<Bend, LayoutError> {
        let (inner, outer) = stack.cored_radii();
        let bend = match kind {
            CoplanarBend::Round => Bend::with_core(center, stack.gnd_width, &inner, &outer, span, Cap::Round)?,
            CoplanarBend::Square => Bend::with_core(center, stack.gnd_width, &inner, &outer, span, Cap::Square)?,
            CoplanarBend::PartialSquare => {
                Bend::with_core(center, stack.gnd_width, &inner, &outer, span, Cap::PartialSquare)?
            }
            CoplanarBend::Open { radius: r } => {
                let inner = [r, r + inner[0], r + inner[1]];
                let outer = [r + stack.gnd_width, r + outer[0], r + outer[1]];
                Bend::open(center, &inner, &outer, span)?
            }
        };
        self.bend(bend, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{with_document, Document};
    use std::f64::consts::{FRAC_PI_2, PI};

    fn stack() -> CoplanarStack {
        CoplanarStack::new(50.0, 13.6, 6.0)
    }

    fn spec() -> TerminationSpec {
        TerminationSpec {
            overlap1: 20.0,
            overlap2: 20.0,
            length: 42.8,
            layer: "Ti%0_LPC_".to_string(),
        }
    }

    #[test]
    fn test_termination_geometry() {
        let t = Termination::build(Point::ORIGIN, &stack(), &spec()).unwrap();
        assert!((t.signal.bottom_right().x - 20.0).abs() < 1e-10);
        assert!((t.signal.bottom_right().y - 56.0).abs() < 1e-10);
        assert!((t.resistor.bottom_right().x - 82.8).abs() < 1e-10);
        assert!((t.right_gnd.bottom_left().x - 62.8).abs() < 1e-10);
        assert!((t.right_gnd.top_right().y - stack().width()).abs() < 1e-10);
        assert!((t.top_gnd.top_left().y - 125.6).abs() < 1e-10);
    }

    #[test]
    fn test_termination_layers() {
        let mut doc = Document::new("test");
        with_document(&mut doc, true, |d| {
            d.termination_coplanar(Point::ORIGIN, &stack(), &spec())
        })
        .unwrap();
        assert_eq!(doc.len(), 5);
        assert_eq!(doc.polylines_on_layer("Ti%0_LPC_").count(), 1);
        assert_eq!(doc.polylines_on_layer("0").count(), 4);
    }

    #[test]
    fn test_cored_bend_radii() {
        let mut doc = Document::new("test");
        let bend = with_document(&mut doc, true, |d| {
            d.bend_coplanar(CoplanarBend::Round, Point::ORIGIN, &stack(), ArcSpan::new(0.0, FRAC_PI_2))
        })
        .unwrap();
        assert_eq!(bend.rings().len(), 2);
        let outer = bend.outermost().outer_start();
        assert!((outer.x - stack().width()).abs() < 1e-10);
        assert_eq!(doc.len(), 3);
    }

    #[test]
    fn test_open_bend_radii() {
        let mut doc = Document::new("test");
        let bend = with_document(&mut doc, true, |d| {
            d.bend_coplanar(CoplanarBend::Open { radius: 10.0 }, Point::ORIGIN, &stack(), ArcSpan::new(0.0, PI))
        })
        .unwrap();
        assert!(bend.core().is_none());
        assert_eq!(bend.rings().len(), 3);
        assert!((bend.ring(0).inner_start().x - 10.0).abs() < 1e-10);
        assert!((bend.outermost().outer_start().x - (10.0 + stack().width())).abs() < 1e-10);
    }

    #[test]
    fn test_pin_profiles() {
        assert_eq!(stack().pin_profile(PinCount::Five).len(), 5);
        assert_eq!(stack().pin_profile(PinCount::Three), stack().profile());
        assert_eq!("5".parse::<PinCount>().unwrap(), PinCount::Five);
        assert!("four".parse::<PinCount>().is_err());
    }
}
