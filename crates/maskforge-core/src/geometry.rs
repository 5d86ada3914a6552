use serde::{Deserialize, Serialize};

use crate::arc;

/// A 2D point in mask coordinates (micrometers).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point at `radius` from `center` in direction `angle` (radians).
    pub fn polar(center: Point, radius: f64, angle: f64) -> Self {
        Self {
            x: center.x + radius * angle.cos(),
            y: center.y + radius * angle.sin(),
        }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        self.distance_squared(other).sqrt()
    }

    pub fn distance_squared(&self, other: &Point) -> f64 {
        (self.x - other.x).powi(2) + (self.y - other.y).powi(2)
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    pub fn midpoint(&self, other: &Point) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub min: Point,
    pub max: Point,
}

impl BBox {
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    pub fn from_points(points: &[Point]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut min_x = f64::MAX;
        let mut min_y = f64::MAX;
        let mut max_x = f64::MIN;
        let mut max_y = f64::MIN;
        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self {
            min: Point::new(min_x, min_y),
            max: Point::new(max_x, max_y),
        })
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point {
        self.min.midpoint(&self.max)
    }

    pub fn contains_point(&self, p: &Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn union(&self, other: &BBox) -> Self {
        Self {
            min: Point::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }
}

/// Bulge attached to the polyline edge that starts at vertex `edge`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArcEdge {
    pub edge: usize,
    pub bulge: f64,
}

/// A closed contour: ordered vertices plus the edges drawn as circular arcs.
///
/// Vertex order is part of every primitive's contract; the typed wrappers in
/// [`crate::kernel`] name the positions so callers never index by hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    points: Vec<Point>,
    arcs: Vec<ArcEdge>,
}

impl Shape {
    pub fn new(points: Vec<Point>) -> Self {
        Self {
            points,
            arcs: Vec::new(),
        }
    }

    /// Mark edge `edge` (vertex `edge` to the next one) as an arc sweeping `sweep` radians.
    pub fn with_arc(mut self, edge: usize, sweep: f64) -> Self {
        self.arcs.push(ArcEdge {
            edge,
            bulge: arc::bulge(sweep),
        });
        self
    }

    pub fn with_bulge(mut self, edge: usize, bulge: f64) -> Self {
        self.arcs.push(ArcEdge { edge, bulge });
        self
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn arcs(&self) -> &[ArcEdge] {
        &self.arcs
    }

    /// Vertex `index`. Panics when out of range, like slice indexing.
    pub fn point(&self, index: usize) -> Point {
        self.points[index]
    }

    /// Bulge of the edge starting at `edge`, zero for straight edges.
    pub fn bulge_at(&self, edge: usize) -> f64 {
        self.arcs
            .iter()
            .find(|a| a.edge == edge)
            .map(|a| a.bulge)
            .unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn bbox(&self) -> Option<BBox> {
        BBox::from_points(&self.points)
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self {
            points: self.points.iter().map(|p| p.translate(dx, dy)).collect(),
            arcs: self.arcs.clone(),
        }
    }
}

/// Anything built from one or more committed shapes.
pub trait Outline {
    /// Component shapes in commit order.
    fn parts(&self) -> Vec<&Shape>;

    /// Concatenated vertex list of all parts, in commit order.
    fn outline(&self) -> Vec<Point> {
        self.parts()
            .into_iter()
            .flat_map(|s| s.points().iter().copied())
            .collect()
    }
}

impl Outline for Shape {
    fn parts(&self) -> Vec<&Shape> {
        vec![self]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-10);
        assert!((a.distance_squared(&b) - 25.0).abs() < 1e-10);
    }

    #[test]
    fn test_polar() {
        let p = Point::polar(Point::new(1.0, 1.0), 2.0, std::f64::consts::FRAC_PI_2);
        assert!((p.x - 1.0).abs() < 1e-12);
        assert!((p.y - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_shape_bulge_lookup() {
        let shape = Shape::new(vec![Point::ORIGIN, Point::new(1.0, 0.0), Point::new(0.0, 1.0)])
            .with_arc(1, std::f64::consts::FRAC_PI_2);
        assert_eq!(shape.len(), 3);
        assert_eq!(shape.bulge_at(0), 0.0);
        assert!((shape.bulge_at(1) - (std::f64::consts::PI / 8.0).tan()).abs() < 1e-12);
    }

    #[test]
    fn test_bbox_union() {
        let a = BBox::new(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        let b = BBox::new(Point::new(5.0, -5.0), Point::new(15.0, 5.0));
        let u = a.union(&b);
        assert_eq!(u.min, Point::new(0.0, -5.0));
        assert_eq!(u.max, Point::new(15.0, 10.0));
        assert!(u.contains_point(&Point::new(12.0, 8.0)));
    }
}
