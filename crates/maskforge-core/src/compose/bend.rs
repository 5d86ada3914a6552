use serde::{Deserialize, Serialize};

use crate::anchor::Anchor;
use crate::drafter::Drafter;
use crate::error::{ConfigError, LayoutError};
use crate::geometry::{Outline, Point, Shape};
use crate::kernel::{self, AnnularSector, ArcSpan, PartialSquareCap, Sector, SquareCap};

/// How the outermost ring of a bend is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cap {
    /// Plain arc.
    #[default]
    Round,
    /// Squared through the bisector corner.
    Square,
    /// Squared by a single corner on the end direction.
    PartialSquare,
}

/// One concentric ring of a bend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Ring {
    Annular(AnnularSector),
    Square(SquareCap),
    PartialSquare(PartialSquareCap),
}

impl Ring {
    pub fn shape(&self) -> &Shape {
        match self {
            Ring::Annular(s) => s.shape(),
            Ring::Square(s) => s.shape(),
            Ring::PartialSquare(s) => s.shape(),
        }
    }

    pub fn inner_start(&self) -> Point {
        match self {
            Ring::Annular(s) => s.inner_start(),
            Ring::Square(s) => s.inner_start(),
            Ring::PartialSquare(s) => s.inner_start(),
        }
    }

    pub fn outer_start(&self) -> Point {
        match self {
            Ring::Annular(s) => s.outer_start(),
            Ring::Square(s) => s.outer_start(),
            Ring::PartialSquare(s) => s.outer_start(),
        }
    }

    /// End of the outer boundary; the squared corner for partial caps.
    pub fn outer_end(&self) -> Point {
        match self {
            Ring::Annular(s) => s.outer_end(),
            Ring::Square(s) => s.outer_end(),
            Ring::PartialSquare(s) => s.corner(),
        }
    }

    pub fn inner_end(&self) -> Point {
        match self {
            Ring::Annular(s) => s.inner_end(),
            Ring::Square(s) => s.inner_end(),
            Ring::PartialSquare(s) => s.inner_end(),
        }
    }
}

/// Concentric arcs sharing a center and angular span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bend {
    center: Point,
    core: Option<Sector>,
    rings: Vec<Ring>,
}

impl Bend {
    /// Bend with a circular-sector core of `core_radius` inside the rings.
    ///
    /// `cap` applies to the outermost ring only.
    pub fn with_core(
        center: Point,
        core_radius: f64,
        inner_radii: &[f64],
        outer_radii: &[f64],
        span: ArcSpan,
        cap: Cap,
    ) -> Result<Self, ConfigError> {
        let core = kernel::circular_sector(center, core_radius, span, Anchor::Center)?;
        let rings = build_rings(center, inner_radii, outer_radii, span, cap)?;
        Ok(Self {
            center,
            core: Some(core),
            rings,
        })
    }

    /// Bend made only of rings, for bends that start at a nonzero radius.
    pub fn open(center: Point, inner_radii: &[f64], outer_radii: &[f64], span: ArcSpan) -> Result<Self, ConfigError> {
        let rings = build_rings(center, inner_radii, outer_radii, span, Cap::Round)?;
        Ok(Self {
            center,
            core: None,
            rings,
        })
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn core(&self) -> Option<&Sector> {
        self.core.as_ref()
    }

    /// Ring `i`, counted from the inside. Panics when out of range.
    pub fn ring(&self, i: usize) -> &Ring {
        &self.rings[i]
    }

    pub fn rings(&self) -> &[Ring] {
        &self.rings
    }

    pub fn outermost(&self) -> &Ring {
        &self.rings[self.rings.len() - 1]
    }
}

impl Outline for Bend {
    fn parts(&self) -> Vec<&Shape> {
        self.core
            .iter()
            .map(|c| c.shape())
            .chain(self.rings.iter().map(Ring::shape))
            .collect()
    }
}

fn build_rings(
    center: Point,
    inner_radii: &[f64],
    outer_radii: &[f64],
    span: ArcSpan,
    cap: Cap,
) -> Result<Vec<Ring>, ConfigError> {
    if inner_radii.is_empty() {
        return Err(ConfigError::Empty("inner_radii"));
    }
    if outer_radii.len() != inner_radii.len() {
        return Err(ConfigError::LengthMismatch {
            name: "outer_radii",
            expected: inner_radii.len(),
            actual: outer_radii.len(),
        });
    }
    let last = inner_radii.len() - 1;
    inner_radii
        .iter()
        .zip(outer_radii)
        .enumerate()
        .map(|(i, (&r1, &r2))| {
            let cap = if i == last { cap } else { Cap::Round };
            Ok(match cap {
                Cap::Round => Ring::Annular(kernel::annular_sector(center, r1, r2, span, Anchor::Center)?),
                Cap::Square => Ring::Square(kernel::square_cap(center, r1, r2, span, Anchor::Center)?),
                Cap::PartialSquare => {
                    Ring::PartialSquare(kernel::partial_square_cap(center, r1, r2, span, Anchor::Center)?)
                }
            })
        })
        .collect()
}

impl Drafter<'_> {
    pub fn bend(&mut self, bend: Bend, layer: Option<&str>) -> Result<Bend, LayoutError> {
        self.draw(&bend, layer)?;
        Ok(bend)
    }

    /// Sector core plus plain rings.
    pub fn bend_1(
        &mut self,
        center: Point,
        core_radius: f64,
        inner_radii: &[f64],
        outer_radii: &[f64],
        span: ArcSpan,
    ) -> Result<Bend, LayoutError> {
        let bend = Bend::with_core(center, core_radius, inner_radii, outer_radii, span, Cap::Round)?;
        self.bend(bend, None)
    }

    /// Rings only.
    pub fn bend_2(
        &mut self,
        center: Point,
        inner_radii: &[f64],
        outer_radii: &[f64],
        span: ArcSpan,
    ) -> Result<Bend, LayoutError> {
        let bend = Bend::open(center, inner_radii, outer_radii, span)?;
        self.bend(bend, None)
    }

    /// Sector core, outermost ring squared off through the bisector.
    pub fn bend_3(
        &mut self,
        center: Point,
        core_radius: f64,
        inner_radii: &[f64],
        outer_radii: &[f64],
        span: ArcSpan,
    ) -> Result<Bend, LayoutError> {
        let bend = Bend::with_core(center, core_radius, inner_radii, outer_radii, span, Cap::Square)?;
        self.bend(bend, None)
    }

    /// Sector core, outermost ring closed by a partial square.
    pub fn bend_4(
        &mut self,
        center: Point,
        core_radius: f64,
        inner_radii: &[f64],
        outer_radii: &[f64],
        span: ArcSpan,
    ) -> Result<Bend, LayoutError> {
        let bend = Bend::with_core(center, core_radius, inner_radii, outer_radii, span, Cap::PartialSquare)?;
        self.bend(bend, None)
    }
}
