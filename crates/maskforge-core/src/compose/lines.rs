use serde::{Deserialize, Serialize};

use crate::anchor::{Anchor, Axis};
use crate::drafter::Drafter;
use crate::error::{ConfigError, LayoutError};
use crate::geometry::{Outline, Point, Shape};
use crate::kernel::{self, Quad};

/// Cross-section of a run of parallel conductors: N widths separated by N-1 gaps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackProfile {
    widths: Vec<f64>,
    gaps: Vec<f64>,
}

impl StackProfile {
    pub fn new(widths: Vec<f64>, gaps: Vec<f64>) -> Result<Self, ConfigError> {
        if widths.is_empty() {
            return Err(ConfigError::Empty("widths"));
        }
        if gaps.len() != widths.len() - 1 {
            return Err(ConfigError::LengthMismatch {
                name: "gaps",
                expected: widths.len() - 1,
                actual: gaps.len(),
            });
        }
        Ok(Self { widths, gaps })
    }

    /// Profile whose lengths are correct by construction.
    pub(crate) fn from_parts(widths: Vec<f64>, gaps: Vec<f64>) -> Self {
        debug_assert!(!widths.is_empty() && gaps.len() + 1 == widths.len());
        Self { widths, gaps }
    }

    /// `count` lines of equal width and spacing.
    pub fn uniform(count: usize, width: f64, gap: f64) -> Result<Self, ConfigError> {
        if count == 0 {
            return Err(ConfigError::Empty("count"));
        }
        Self::new(vec![width; count], vec![gap; count - 1])
    }

    pub fn widths(&self) -> &[f64] {
        &self.widths
    }

    pub fn gaps(&self) -> &[f64] {
        &self.gaps
    }

    pub fn len(&self) -> usize {
        self.widths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }

    /// Distance from the stack's first edge to the near edge of line `i`.
    pub fn offset_of(&self, i: usize) -> f64 {
        self.widths[..i].iter().sum::<f64>() + self.gaps[..i].iter().sum::<f64>()
    }

    pub fn total_width(&self) -> f64 {
        self.widths.iter().sum::<f64>() + self.gaps.iter().sum::<f64>()
    }

    /// Offset of the first edge relative to the stack's axis of symmetry.
    ///
    /// Odd stacks are centered on the middle line, even stacks on the middle gap.
    pub fn centered_start(&self) -> f64 {
        let n = self.widths.len();
        if n % 2 == 0 {
            let center = (n - 2) / 2;
            -(self.widths[..=center].iter().sum::<f64>()
                + self.gaps[..center].iter().sum::<f64>()
                + self.gaps[center] / 2.0)
        } else {
            let center = (n - 1) / 2;
            -(self.widths[..center].iter().sum::<f64>()
                + self.gaps[..center].iter().sum::<f64>()
                + self.widths[center] / 2.0)
        }
    }
}

/// Stacked rectangles produced by [`LineArray::straight`].
///
/// Line 0 is the bottom line for `Axis::X` and the left line for `Axis::Y`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineArray {
    lines: Vec<Quad>,
    axis: Axis,
}

impl LineArray {
    /// Parallel lines of common `length` whose first line's bottom-left corner is `origin`.
    pub fn straight(origin: Point, length: f64, profile: &StackProfile, axis: Axis) -> Result<Self, ConfigError> {
        let lines = profile
            .widths()
            .iter()
            .enumerate()
            .map(|(i, &width)| {
                let across = profile.offset_of(i) + width / 2.0;
                match axis {
                    Axis::X => kernel::square(
                        origin.translate(length / 2.0, across),
                        length,
                        width,
                        Anchor::Center,
                    ),
                    Axis::Y => kernel::square(
                        origin.translate(across, length / 2.0),
                        width,
                        length,
                        Anchor::Center,
                    ),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { lines, axis })
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Line `i`. Panics when out of range.
    pub fn line(&self, i: usize) -> &Quad {
        &self.lines[i]
    }

    pub fn lines(&self) -> &[Quad] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl Outline for LineArray {
    fn parts(&self) -> Vec<&Shape> {
        self.lines.iter().map(|q| q.shape()).collect()
    }
}

impl Drafter<'_> {
    /// Draw `widths.len()` parallel lines separated by `gaps`.
    pub fn straight_lines(
        &mut self,
        origin: Point,
        length: f64,
        widths: &[f64],
        gaps: &[f64],
        axis: Axis,
        layer: Option<&str>,
    ) -> Result<LineArray, LayoutError> {
        let profile = StackProfile::new(widths.to_vec(), gaps.to_vec())?;
        self.stack(origin, length, &profile, axis, layer)
    }

    pub fn stack(
        &mut self,
        origin: Point,
        length: f64,
        profile: &StackProfile,
        axis: Axis,
        layer: Option<&str>,
    ) -> Result<LineArray, LayoutError> {
        let lines = LineArray::straight(origin, length, profile, axis)?;
        self.draw(&lines, layer)?;
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{with_document, Document};

    #[test]
    fn test_straight_lines_stack_upward() {
        let profile = StackProfile::new(vec![5.0, 5.0, 5.0], vec![2.0, 2.0]).unwrap();
        let lines = LineArray::straight(Point::ORIGIN, 10.0, &profile, Axis::X).unwrap();
        let extents: Vec<(f64, f64)> = lines
            .lines()
            .iter()
            .map(|q| (q.bottom_left().y, q.top_left().y))
            .collect();
        for ((lo, hi), (elo, ehi)) in extents.iter().zip([(0.0, 5.0), (7.0, 12.0), (14.0, 19.0)]) {
            assert!((lo - elo).abs() < 1e-10 && (hi - ehi).abs() < 1e-10);
        }
        for q in lines.lines() {
            assert!((q.bottom_right().x - q.bottom_left().x - 10.0).abs() < 1e-10);
            assert!(q.bottom_left().x.abs() < 1e-10);
        }
    }

    #[test]
    fn test_straight_lines_y_axis() {
        let profile = StackProfile::new(vec![3.0, 4.0], vec![1.0]).unwrap();
        let lines = LineArray::straight(Point::new(1.0, 1.0), 20.0, &profile, Axis::Y).unwrap();
        assert!((lines.line(1).bottom_left().x - 5.0).abs() < 1e-10);
        assert!((lines.line(1).top_right().x - 9.0).abs() < 1e-10);
        assert!((lines.line(0).top_left().y - 21.0).abs() < 1e-10);
    }

    #[test]
    fn test_profile_validation() {
        assert_eq!(
            StackProfile::new(vec![1.0, 2.0], vec![]),
            Err(ConfigError::LengthMismatch {
                name: "gaps",
                expected: 1,
                actual: 0
            })
        );
        assert_eq!(StackProfile::new(vec![], vec![]), Err(ConfigError::Empty("widths")));
        assert_eq!(StackProfile::uniform(0, 1.0, 1.0), Err(ConfigError::Empty("count")));
    }

    #[test]
    fn test_centered_start_parity() {
        let odd = StackProfile::uniform(5, 2.0, 1.0).unwrap();
        assert!((odd.centered_start() + odd.total_width() / 2.0).abs() < 1e-12);
        let even = StackProfile::uniform(4, 2.0, 1.0).unwrap();
        assert!((even.centered_start() + even.total_width() / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_wrong_gap_count_commits_nothing() {
        let mut doc = Document::new("test");
        let result = with_document(&mut doc, true, |d| {
            d.straight_lines(Point::ORIGIN, 10.0, &[1.0, 1.0, 1.0], &[1.0], Axis::X, None)
        });
        assert!(result.is_err());
        assert!(doc.is_empty());
    }
}
