//! Bulge encoding of circular arcs on polyline edges.
//!
//! A bulge is `tan(sweep / 4)` where `sweep` is the signed angle the arc
//! turns through going from one vertex to the next. Positive bulges sweep
//! counter-clockwise. This is the encoding DXF `LWPOLYLINE` vertices use.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::geometry::Point;

/// Most chords a single arc is split into.
pub const MAX_ARC_SEGMENTS: usize = 4096;

/// Bulge for an arc sweeping `sweep` radians.
pub fn bulge(sweep: f64) -> f64 {
    (sweep / 4.0).tan()
}

/// Swept angle encoded by `bulge`.
pub fn sweep(bulge: f64) -> f64 {
    4.0 * bulge.atan()
}

/// A circular arc in center form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arc {
    pub center: Point,
    pub radius: f64,
    pub start_angle: f64,
    /// Signed sweep, counter-clockwise positive.
    pub sweep: f64,
}

impl Arc {
    pub fn new(center: Point, radius: f64, start_angle: f64, end_angle: f64) -> Self {
        Self {
            center,
            radius,
            start_angle,
            sweep: end_angle - start_angle,
        }
    }

    /// Recover the arc running from `start` to `end` with the given bulge.
    ///
    /// Returns `None` for straight edges (zero bulge) and degenerate chords.
    pub fn from_bulge(start: Point, end: Point, bulge: f64) -> Option<Self> {
        let dx = end.x - start.x;
        let dy = end.y - start.y;
        let chord = dx.hypot(dy);
        if bulge.abs() < 1e-12 || chord < 1e-12 {
            return None;
        }
        // Center sits on the chord's perpendicular bisector, to the left for positive bulges.
        let f = (1.0 - bulge * bulge) / (4.0 * bulge);
        let mid = start.midpoint(&end);
        let center = Point::new(mid.x - dy * f, mid.y + dx * f);
        let radius = center.distance_to(&start);
        let start_angle = (start.y - center.y).atan2(start.x - center.x);
        Some(Self {
            center,
            radius,
            start_angle,
            sweep: sweep(bulge),
        })
    }

    pub fn end_angle(&self) -> f64 {
        self.start_angle + self.sweep
    }

    pub fn start(&self) -> Point {
        Point::polar(self.center, self.radius, self.start_angle)
    }

    pub fn end(&self) -> Point {
        Point::polar(self.center, self.radius, self.end_angle())
    }

    pub fn bulge(&self) -> f64 {
        bulge(self.sweep)
    }

    pub fn chord_length(&self) -> f64 {
        2.0 * self.radius * (self.sweep / 2.0).sin().abs()
    }

    /// Number of chords needed to keep the sagitta of each below `tolerance`,
    /// at most [`MAX_ARC_SEGMENTS`]. A tolerance that is not positive gets the cap.
    pub fn segments_for(&self, tolerance: f64) -> usize {
        if tolerance.is_nan() || tolerance <= 0.0 {
            return MAX_ARC_SEGMENTS;
        }
        if self.radius <= tolerance {
            return 1;
        }
        let step = 2.0 * (1.0 - tolerance / self.radius).acos();
        let n = (self.sweep.abs() / step).ceil();
        if n.is_nan() {
            return 1;
        }
        (n.min(MAX_ARC_SEGMENTS as f64) as usize).max(1)
    }

    /// Points along the arc after the start point, ending exactly at the end point.
    pub fn flatten(&self, segments: usize) -> Vec<Point> {
        let n = segments.max(1);
        (1..=n)
            .map(|i| {
                let t = self.start_angle + self.sweep * (i as f64) / (n as f64);
                Point::polar(self.center, self.radius, t)
            })
            .collect()
    }
}

/// Accept a chord tolerance only when it is a finite positive length.
pub fn check_tolerance(tolerance: f64) -> Result<f64, ConfigError> {
    if tolerance.is_finite() && tolerance > 0.0 {
        Ok(tolerance)
    } else {
        Err(ConfigError::OutOfRange {
            name: "arc tolerance",
            value: tolerance,
            expected: "a finite positive length",
        })
    }
}

/// Close a contour into a point ring, replacing bulged edges by chords within `tolerance`.
pub fn flatten_contour(points: &[Point], bulge_at: impl Fn(usize) -> f64, tolerance: f64) -> Vec<Point> {
    let mut ring = Vec::with_capacity(points.len());
    for (i, start) in points.iter().enumerate() {
        ring.push(*start);
        let end = points[(i + 1) % points.len()];
        if let Some(arc) = Arc::from_bulge(*start, end, bulge_at(i)) {
            let mut along = arc.flatten(arc.segments_for(tolerance));
            // The end vertex is pushed by the next iteration.
            along.pop();
            ring.extend(along);
        }
    }
    ring
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn test_bulge_values() {
        assert_eq!(bulge(0.0), 0.0);
        assert!(close(bulge(PI), 1.0));
        assert!(close(bulge(FRAC_PI_2), (PI / 8.0).tan()));
        for d in [0.1, 0.7, FRAC_PI_2, 2.5, PI] {
            assert!(close(bulge(-d), -bulge(d)));
            assert!(close(sweep(bulge(d)), d));
        }
    }

    #[test]
    fn test_arc_roundtrip_from_bulge() {
        let cases = [
            (Point::new(200.0, 200.0), 100.0, PI / 6.0, FRAC_PI_2),
            (Point::new(-3.0, 7.5), 12.5, FRAC_PI_2, PI),
            (Point::new(0.0, 0.0), 50.0, PI, PI / 6.0),
            (Point::new(10.0, -4.0), 1.0, 0.0, 1.5 * PI),
        ];
        for (center, radius, a1, a2) in cases {
            let arc = Arc::new(center, radius, a1, a2);
            let start = Point::polar(center, radius, a1);
            let end = Point::polar(center, radius, a2);
            let rebuilt = Arc::from_bulge(start, end, bulge(a2 - a1)).unwrap();
            assert!(close(rebuilt.center.x, center.x), "{:?}", rebuilt);
            assert!(close(rebuilt.center.y, center.y), "{:?}", rebuilt);
            assert!(close(rebuilt.radius, radius));
            assert!(close(rebuilt.sweep, a2 - a1));
            assert!(close(rebuilt.chord_length(), start.distance_to(&end)));
            assert!(close(rebuilt.end().x, arc.end().x));
            assert!(close(rebuilt.end().y, arc.end().y));
        }
    }

    #[test]
    fn test_straight_edge_has_no_arc() {
        assert!(Arc::from_bulge(Point::ORIGIN, Point::new(1.0, 0.0), 0.0).is_none());
    }

    #[test]
    fn test_flatten_stays_on_circle() {
        let arc = Arc::new(Point::new(1.0, 2.0), 10.0, 0.0, FRAC_PI_2);
        let n = arc.segments_for(0.01);
        assert!(n > 4);
        let pts = arc.flatten(n);
        assert_eq!(pts.len(), n);
        for p in &pts {
            assert!(close(p.distance_to(&arc.center), 10.0));
        }
        let last = pts[pts.len() - 1];
        assert!(close(last.x, 1.0) && close(last.y, 12.0));
    }

    #[test]
    fn test_flatten_contour_keeps_vertices() {
        let pts = vec![Point::ORIGIN, Point::new(10.0, 0.0), Point::new(0.0, 10.0)];
        let ring = flatten_contour(&pts, |i| if i == 1 { bulge(FRAC_PI_2) } else { 0.0 }, 0.05);
        assert_eq!(ring[0], pts[0]);
        assert_eq!(ring[1], pts[1]);
        assert_eq!(ring[ring.len() - 1], pts[2]);
        assert!(ring.len() > 3);
    }

    #[test]
    fn test_degenerate_tolerance_is_capped() {
        let arc = Arc::from_bulge(Point::ORIGIN, Point::new(20.0, 0.0), 1.0).unwrap();
        assert_eq!(arc.segments_for(0.0), MAX_ARC_SEGMENTS);
        assert_eq!(arc.segments_for(-0.5), MAX_ARC_SEGMENTS);
        assert_eq!(arc.segments_for(f64::NAN), MAX_ARC_SEGMENTS);
        assert_eq!(arc.segments_for(1e-300), MAX_ARC_SEGMENTS);
        assert_eq!(arc.flatten(arc.segments_for(0.0)).len(), MAX_ARC_SEGMENTS);
    }

    #[test]
    fn test_check_tolerance() {
        assert_eq!(check_tolerance(0.01), Ok(0.01));
        for bad in [0.0, -0.01, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                check_tolerance(bad),
                Err(ConfigError::OutOfRange { name: "arc tolerance", .. })
            ));
        }
    }
}
