use serde::{Deserialize, Serialize};

use crate::anchor::{Anchor, Axis};
use crate::compose::lines::StackProfile;
use crate::drafter::Drafter;
use crate::error::{ConfigError, LayoutError};
use crate::geometry::{Outline, Point, Shape};
use crate::kernel::{self, Quad, TrapezoidSpec};

/// Trapezoids joining two stacks of the same line count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaperArray {
    tapers: Vec<Quad>,
    axis: Axis,
}

impl TaperArray {
    /// Tapers from `bottom` (at `origin`) to `top` (`height` away), both centered on `origin`.
    ///
    /// With `Axis::X` the tapers run upward, with `Axis::Y` to the right.
    pub fn centered(
        origin: Point,
        height: f64,
        top: &StackProfile,
        bottom: &StackProfile,
        axis: Axis,
    ) -> Result<Self, ConfigError> {
        if top.len() != bottom.len() {
            return Err(ConfigError::LengthMismatch {
                name: "bottom widths",
                expected: top.len(),
                actual: bottom.len(),
            });
        }
        let top_start = top.centered_start();
        let bottom_start = bottom.centered_start();
        let tapers = (0..top.len())
            .map(|i| {
                let top_left = top_start + top.offset_of(i);
                let bottom_left = bottom_start + bottom.offset_of(i);
                let (top_width, bottom_width) = (top.widths()[i], bottom.widths()[i]);
                let spec = TrapezoidSpec {
                    top_width,
                    bottom_width,
                    offset: top_left - bottom_left + (top_width - bottom_width) / 2.0,
                    height,
                    axis,
                };
                match axis {
                    Axis::X => kernel::trapezoid(origin.translate(bottom_left, 0.0), &spec, Anchor::BottomLeft),
                    Axis::Y => kernel::trapezoid(origin.translate(0.0, bottom_left), &spec, Anchor::LeftBottom),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { tapers, axis })
    }

    pub fn from_tapers(tapers: Vec<Quad>, axis: Axis) -> Result<Self, ConfigError> {
        if tapers.is_empty() {
            return Err(ConfigError::Empty("tapers"));
        }
        Ok(Self { tapers, axis })
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Taper `i`. Panics when out of range.
    pub fn taper(&self, i: usize) -> &Quad {
        &self.tapers[i]
    }

    pub fn tapers(&self) -> &[Quad] {
        &self.tapers
    }

    pub fn len(&self) -> usize {
        self.tapers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tapers.is_empty()
    }

    pub fn last(&self) -> Option<&Quad> {
        self.tapers.last()
    }
}

impl Outline for TaperArray {
    fn parts(&self) -> Vec<&Shape> {
        self.tapers.iter().map(|q| q.shape()).collect()
    }
}

impl Drafter<'_> {
    pub fn tapers(
        &mut self,
        origin: Point,
        height: f64,
        top: &StackProfile,
        bottom: &StackProfile,
        axis: Axis,
    ) -> Result<TaperArray, LayoutError> {
        let tapers = TaperArray::centered(origin, height, top, bottom, axis)?;
        self.draw(&tapers, None)?;
        Ok(tapers)
    }
}
