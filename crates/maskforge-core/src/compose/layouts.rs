//! Complete device layouts: probe pads routed through bends to a termination or a closed loop.
//!
//! Each layout threads a cursor through its components: every piece is placed
//! at a named corner of the piece drawn before it. The components are
//! recorded in a [`ShapeCollection`] under fixed names (`pads_0`,
//! `bend_coplanar_1`, ...) in the order they were committed.

use std::f64::consts::{FRAC_PI_2, PI};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::anchor::{Anchor, Axis};
use crate::collection::ShapeCollection;
use crate::compose::bend::Bend;
use crate::compose::coplanar::{CoplanarBend, CoplanarStack, PinCount, Termination};
use crate::compose::lines::{LineArray, StackProfile};
use crate::drafter::Drafter;
use crate::error::{ConfigError, LayoutError};
use crate::geometry::Point;
use crate::kernel::ArcSpan;
use crate::params::{CoplanarParams, LayoutParams, MagnetParams};
use crate::text::GlyphTable;

/// A coplanar layout and the components later steps attach to.
#[derive(Debug, Clone, PartialEq)]
pub struct CoplanarLayout {
    pub shapes: ShapeCollection,
    pub pads: LineArray,
    /// Straight that ends the route.
    pub last_straight: LineArray,
    pub termination: Option<Termination>,
}

/// Straight lengths around a closed loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoopLengths {
    /// Outgoing horizontal straight.
    pub bottom: f64,
    /// Vertical straight on the far side.
    pub side: f64,
    /// Returning horizontal straight.
    pub top: f64,
}

impl LoopLengths {
    /// Lengths that bring the loop back over the pads, with `extra` added to the return leg.
    pub fn closing(params: &CoplanarParams, extra: f64) -> Self {
        let p = params;
        Self {
            bottom: p.straight_length_1,
            side: p.straight_length_2,
            top: p.straight_length_1 + p.sig_gnd_gap + p.sig_width + p.sig_gnd_gap + p.gnd_width + extra,
        }
    }
}

/// Named layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LayoutKind {
    AlignmentMark,
    /// One bend into a terminated straight.
    Coplanar1,
    /// Three bends; termination level with the pads.
    Coplanar2,
    /// Five-pin loop closed back onto the pad tapers.
    Coplanar3,
    /// Five-pin loop with a widened center ground.
    Coplanar4,
    /// `Coplanar2` with magnets over the signal line and the resistor.
    Coplanar2Magnet,
}

impl LayoutKind {
    pub const ALL: [LayoutKind; 6] = [
        LayoutKind::AlignmentMark,
        LayoutKind::Coplanar1,
        LayoutKind::Coplanar2,
        LayoutKind::Coplanar3,
        LayoutKind::Coplanar4,
        LayoutKind::Coplanar2Magnet,
    ];
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LayoutKind::AlignmentMark => "alignment_mark",
            LayoutKind::Coplanar1 => "coplanar_1",
            LayoutKind::Coplanar2 => "coplanar_2",
            LayoutKind::Coplanar3 => "coplanar_3",
            LayoutKind::Coplanar4 => "coplanar_4",
            LayoutKind::Coplanar2Magnet => "coplanar_2_magnet",
        })
    }
}

impl FromStr for LayoutKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LayoutKind::ALL
            .into_iter()
            .find(|kind| kind.to_string() == s)
            .ok_or_else(|| ConfigError::UnknownName {
                kind: "layout",
                name: s.to_string(),
            })
    }
}

impl TryFrom<String> for LayoutKind {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LayoutKind> for String {
    fn from(kind: LayoutKind) -> Self {
        kind.to_string()
    }
}

fn quarter(start: f64) -> ArcSpan {
    ArcSpan::new(start, start + FRAC_PI_2)
}

impl Drafter<'_> {
    /// Pads, tapers and the first bend shared by the three-pin routes.
    fn three_pin_entry(
        &mut self,
        origin: Point,
        p: &CoplanarParams,
        shapes: &mut ShapeCollection,
    ) -> Result<(LineArray, Bend), LayoutError> {
        let stack = p.stack();
        let row = p.pad_row(PinCount::Three);
        let pads = self.probe_pads(origin, &row, Axis::Y)?;
        shapes.insert("pads_0", &pads);
        let taper_origin = pads.line(0).top_left().midpoint(&pads.line(2).top_right());
        let tapers = self.coplanar_tapers(taper_origin, p.taper_length, &row, &stack, Axis::X)?;
        shapes.insert("coplanar_tapers_0", &tapers);
        let bend = self.bend_coplanar(CoplanarBend::Round, tapers.taper(2).top_right(), &stack, quarter(FRAC_PI_2))?;
        shapes.insert("bend_coplanar_0", &bend);
        Ok((pads, bend))
    }

    /// Pads, one bend, a straight and the termination.
    pub fn coplanar_1(&mut self, origin: Point, p: &CoplanarParams) -> Result<CoplanarLayout, LayoutError> {
        let stack = p.stack();
        let mut shapes = ShapeCollection::new();
        let (pads, bend) = self.three_pin_entry(origin, p, &mut shapes)?;
        let straight = self.straight_coplanar(bend.center(), p.straight_length, &stack, Axis::X)?;
        shapes.insert("straight_coplanar_0", &straight);
        let termination = self.termination_coplanar(straight.line(0).bottom_right(), &stack, &p.termination())?;
        shapes.insert("termination_coplanar_0", &termination);
        Ok(CoplanarLayout {
            shapes,
            pads,
            last_straight: straight,
            termination: Some(termination),
        })
    }

    /// Three bends bringing the termination's signal level with the center pad.
    pub fn coplanar_2(&mut self, origin: Point, p: &CoplanarParams) -> Result<CoplanarLayout, LayoutError> {
        self.coplanar_2_with(origin, p, p.long_straight_length)
    }

    /// `coplanar_2` with an explicit final straight.
    pub fn coplanar_2_with(
        &mut self,
        origin: Point,
        p: &CoplanarParams,
        straight_length: f64,
    ) -> Result<CoplanarLayout, LayoutError> {
        let stack = p.stack();
        let mut shapes = ShapeCollection::new();
        let (pads, bend) = self.three_pin_entry(origin, p, &mut shapes)?;

        let lead = self.straight_coplanar(bend.center(), p.lead_length, &stack, Axis::X)?;
        shapes.insert("straight_coplanar_0", &lead);
        let bend = self.bend_coplanar(CoplanarBend::Round, lead.line(0).bottom_right(), &stack, quarter(0.0))?;
        shapes.insert("bend_coplanar_1", &bend);

        let drop = (p.pad_length / 2.0 + p.taper_length) - (p.gnd_width + p.sig_gnd_gap + p.sig_width / 2.0);
        let riser = self.straight_coplanar(bend.center().translate(0.0, -drop), drop, &stack, Axis::Y)?;
        shapes.insert("straight_coplanar_1", &riser);
        let bend = self.bend_coplanar(CoplanarBend::Round, riser.line(2).bottom_right(), &stack, quarter(PI))?;
        shapes.insert("bend_coplanar_2", &bend);

        let straight = self.straight_coplanar(bend.outermost().outer_end(), straight_length, &stack, Axis::X)?;
        shapes.insert("straight_coplanar_2", &straight);
        let termination = self.termination_coplanar(straight.line(0).bottom_right(), &stack, &p.termination())?;
        shapes.insert("termination_coplanar_0", &termination);
        Ok(CoplanarLayout {
            shapes,
            pads,
            last_straight: straight,
            termination: Some(termination),
        })
    }

    /// Route around the loop from the first bend's center up to the returning bend.
    ///
    /// Returns the fourth bend, whose far side points back down at the pads.
    fn loop_body(
        &mut self,
        center: Point,
        stack: &CoplanarStack,
        lengths: &LoopLengths,
        shapes: &mut ShapeCollection,
    ) -> Result<Bend, LayoutError> {
        let bottom = self.straight_coplanar(center, lengths.bottom, stack, Axis::X)?;
        shapes.insert("straight_coplanar_0", &bottom);
        let bend = self.bend_coplanar(CoplanarBend::Round, bottom.line(2).top_right(), stack, quarter(1.5 * PI))?;
        shapes.insert("bend_coplanar_1", &bend);

        let side = self.straight_coplanar(bend.center(), lengths.side, stack, Axis::Y)?;
        shapes.insert("straight_coplanar_1", &side);
        let bend = self.bend_coplanar(CoplanarBend::Round, side.line(0).top_left(), stack, quarter(0.0))?;
        shapes.insert("bend_coplanar_2", &bend);

        let top = self.straight_coplanar(bend.center().translate(-lengths.top, 0.0), lengths.top, stack, Axis::X)?;
        shapes.insert("straight_coplanar_2", &top);
        let bend = self.bend_coplanar(CoplanarBend::Round, top.line(0).bottom_left(), stack, quarter(FRAC_PI_2))?;
        shapes.insert("bend_coplanar_3", &bend);
        Ok(bend)
    }

    pub fn coplanar_3(&mut self, origin: Point, p: &CoplanarParams) -> Result<CoplanarLayout, LayoutError> {
        self.coplanar_3_with(origin, p, &LoopLengths::closing(p, 0.0))
    }

    /// Five-pin loop with explicit straight lengths, checked for closure.
    pub fn coplanar_3_with(
        &mut self,
        origin: Point,
        p: &CoplanarParams,
        lengths: &LoopLengths,
    ) -> Result<CoplanarLayout, LayoutError> {
        let stack = p.stack();
        let row = p.pad_row(PinCount::Five);
        let mut shapes = ShapeCollection::new();
        let pads = self.probe_pads(origin, &row, Axis::Y)?;
        shapes.insert("pads_0", &pads);
        let tapers = self.coplanar_tapers(pads.line(2).top_center(), p.taper_length, &row, &stack, Axis::X)?;
        shapes.insert("coplanar_tapers_0", &tapers);
        let bend = self.bend_coplanar(CoplanarBend::Square, tapers.taper(4).top_right(), &stack, quarter(FRAC_PI_2))?;
        shapes.insert("bend_coplanar_0", &bend);

        let bend = self.loop_body(bend.center(), &stack, lengths, &mut shapes)?;
        let w = stack.width();
        let down = bend.center().translate(-w, -lengths.side);
        let arm = self.straight_coplanar(down, lengths.side, &stack, Axis::Y)?;
        shapes.insert("straight_coplanar_3", &arm);

        let gnd = self.square(tapers.taper(0).top_left(), p.gnd_width, w, Anchor::BottomLeft, None)?;
        shapes.insert("square_0", &gnd);
        let sig = self.square(tapers.taper(1).top_left(), p.sig_width, w, Anchor::BottomLeft, None)?;
        shapes.insert("square_1", &sig);

        p.alignment().verify("coplanar_3", gnd.top_left(), arm.line(0).bottom_left())?;
        Ok(CoplanarLayout {
            shapes,
            pads,
            last_straight: arm,
            termination: None,
        })
    }

    pub fn coplanar_4(&mut self, origin: Point, p: &CoplanarParams) -> Result<CoplanarLayout, LayoutError> {
        self.coplanar_4_with(origin, p, &LoopLengths::closing(p, p.extra_width))
    }

    /// Five-pin loop whose center ground taper is widened by `extra_width`.
    pub fn coplanar_4_with(
        &mut self,
        origin: Point,
        p: &CoplanarParams,
        lengths: &LoopLengths,
    ) -> Result<CoplanarLayout, LayoutError> {
        let stack = p.stack();
        let row = p.pad_row(PinCount::Five);
        let (g, s, gap) = (p.gnd_width, p.sig_width, p.sig_gnd_gap);
        let mut shapes = ShapeCollection::new();
        let pads = self.probe_pads(origin, &row, Axis::Y)?;
        shapes.insert("pads_0", &pads);
        let top = StackProfile::new(vec![g, s, g + p.extra_width, s, g], vec![gap; 4])?;
        let tapers = self.tapers(pads.line(2).top_center(), p.taper_length, &top, &row.profile(), Axis::X)?;
        shapes.insert("tapers_0", &tapers);
        let bend = self.bend_coplanar(
            CoplanarBend::PartialSquare,
            tapers.taper(4).top_right(),
            &stack,
            quarter(FRAC_PI_2),
        )?;
        shapes.insert("bend_coplanar_0", &bend);

        let bend = self.loop_body(bend.center(), &stack, lengths, &mut shapes)?;
        let w = stack.width();
        let length = lengths.side + w;
        let arm = self.straight_coplanar(bend.outermost().outer_end().translate(0.0, -length), length, &stack, Axis::Y)?;
        shapes.insert("straight_coplanar_3", &arm);

        let fill = self.square(tapers.taper(2).top_right(), p.extra_width, w, Anchor::BottomRight, None)?;
        shapes.insert("square_0", &fill);

        p.alignment()
            .verify("coplanar_4", arm.line(0).top_left(), bend.outermost().outer_end())?;
        Ok(CoplanarLayout {
            shapes,
            pads,
            last_straight: arm,
            termination: None,
        })
    }

    /// `coplanar_2` on the short straight, with magnet rows over its signal line and the exposed resistor.
    pub fn coplanar_2_magnet(
        &mut self,
        origin: Point,
        p: &CoplanarParams,
        m: &MagnetParams,
    ) -> Result<CoplanarLayout, LayoutError> {
        let mut layout = self.coplanar_2_with(origin, p, p.straight_length)?;
        let lift = (p.sig_width - m.magnet_y) / 2.0;
        let signal_start = layout.last_straight.line(1).bottom_left().translate(m.offset1, lift);
        let count = m.count_in(p.straight_length, m.offset1);
        self.magnet_row("signal_magnet", signal_start, count, m, &mut layout.shapes)?;
        if let Some(termination) = &layout.termination {
            let start = termination.signal.bottom_right().translate(m.offset2, lift);
            let count = m.count_in(p.termination_length, m.offset2);
            self.magnet_row("termination_magnet", start, count, m, &mut layout.shapes)?;
        }
        Ok(layout)
    }

    fn magnet_row(
        &mut self,
        name: &str,
        start: Point,
        count: usize,
        m: &MagnetParams,
        shapes: &mut ShapeCollection,
    ) -> Result<(), LayoutError> {
        if count == 0 {
            log::warn!("No room for {} magnets, row skipped", name);
            return Ok(());
        }
        let profile = StackProfile::uniform(count, m.magnet_x, m.magnet_gap)?;
        let row = self.stack(start, m.magnet_y, &profile, Axis::Y, m.layer.as_deref())?;
        shapes.insert(name, &row);
        log::debug!("Placed {} {} magnets", count, name);
        Ok(())
    }

    /// Build `kind` and return its named components.
    pub fn layout(
        &mut self,
        kind: LayoutKind,
        params: &LayoutParams,
        glyphs: Option<&GlyphTable>,
    ) -> Result<ShapeCollection, LayoutError> {
        let origin = params.origin;
        let p = &params.coplanar;
        let layout = match kind {
            LayoutKind::AlignmentMark => {
                if params.dc_pad.is_some() {
                    log::warn!("DC pads have no probe pads to attach to in the alignment mark, ignored");
                }
                let mark = self.alignment_mark(&params.mark, glyphs, None)?;
                let mut shapes = ShapeCollection::new();
                shapes.insert("alignment_mark_0", &mark);
                return Ok(shapes);
            }
            LayoutKind::Coplanar1 => self.coplanar_1(origin, p)?,
            LayoutKind::Coplanar2 => self.coplanar_2(origin, p)?,
            LayoutKind::Coplanar3 => self.coplanar_3(origin, p)?,
            LayoutKind::Coplanar4 => self.coplanar_4(origin, p)?,
            LayoutKind::Coplanar2Magnet => self.coplanar_2_magnet(origin, p, &params.magnet)?,
        };
        let mut shapes = layout.shapes;
        if let Some(dc_kind) = params.dc_pad {
            let dc = self.dc_pad(dc_kind, &layout.pads, &params.dc)?;
            dc.record(&mut shapes);
        }
        log::info!("Built {} with {} components", kind, shapes.len());
        Ok(shapes)
    }
}
