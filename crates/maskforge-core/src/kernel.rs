//! # Geometry kernel
//!
//! Closed-form primitives. Each builder validates its anchor, resolves the
//! origin to the shape's start vertex and returns the finished contour; it
//! never touches a sink. Committing is done by [`crate::Drafter`].
//!
//! Vertex order is fixed per primitive and exposed through named accessors:
//!
//! ```text
//!  Quad (x-parallel)        AnnularSector           Sector
//!   p0 ------ p3             p3 . . p2               p0 . . . p2
//!   |          |              .       .               .     .
//!   p1 ------ p2             p0 .      .              .   .
//!                             .        .              p1
//!                            (center)  p1
//! ```

use serde::{Deserialize, Serialize};

use crate::anchor::{Anchor, Axis};
use crate::error::ConfigError;
use crate::geometry::{Outline, Point, Shape};

/// Angular extent of an arc, counter-clockwise from `start` to `end` (radians).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArcSpan {
    pub start: f64,
    pub end: f64,
}

impl ArcSpan {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn sweep(&self) -> f64 {
        self.end - self.start
    }

    pub fn bisector(&self) -> f64 {
        (self.start + self.end) / 2.0
    }
}

/// Dimensions of a trapezoid with one pair of parallel sides.
///
/// For `Axis::X` the parallel sides are horizontal: `bottom_width` runs
/// through the origin side and `top_width` lies `height` above it. For
/// `Axis::Y` they are vertical: `bottom_width` is the left side and
/// `top_width` the right side, `height` to the right. `offset` is the signed
/// displacement of the top side's center from the bottom side's center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrapezoidSpec {
    pub top_width: f64,
    pub bottom_width: f64,
    pub offset: f64,
    pub height: f64,
    pub axis: Axis,
}

/// One vertex of an arc polyline: the point `radius` away from
/// `origin + (dx, dy)` at angle `start`, with the edge to the next vertex
/// bulged by `end - start`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArcVertex {
    pub dx: f64,
    pub dy: f64,
    pub radius: f64,
    pub start: f64,
    pub end: f64,
}

macro_rules! contour_type {
    ($name:ident) => {
        impl $name {
            pub fn shape(&self) -> &Shape {
                &self.shape
            }

            pub fn points(&self) -> &[Point] {
                self.shape.points()
            }
        }

        impl Outline for $name {
            fn parts(&self) -> Vec<&Shape> {
                vec![&self.shape]
            }
        }
    };
}

/// Four-cornered contour: rectangles and trapezoids.
///
/// Vertices are top-left, bottom-left, bottom-right, top-right. For
/// Y-parallel trapezoids "left" is the origin side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    shape: Shape,
}

contour_type!(Quad);

impl Quad {
    fn from_corners(corners: [Point; 4]) -> Self {
        Self {
            shape: Shape::new(corners.to_vec()),
        }
    }

    pub fn top_left(&self) -> Point {
        self.shape.point(0)
    }

    pub fn bottom_left(&self) -> Point {
        self.shape.point(1)
    }

    pub fn bottom_right(&self) -> Point {
        self.shape.point(2)
    }

    pub fn top_right(&self) -> Point {
        self.shape.point(3)
    }

    pub fn top_center(&self) -> Point {
        self.top_left().midpoint(&self.top_right())
    }

    pub fn bottom_center(&self) -> Point {
        self.bottom_left().midpoint(&self.bottom_right())
    }
}

/// Pie slice: center, then the arc from `span.start` to `span.end`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    shape: Shape,
}

contour_type!(Sector);

impl Sector {
    pub fn center(&self) -> Point {
        self.shape.point(0)
    }

    pub fn arc_start(&self) -> Point {
        self.shape.point(1)
    }

    pub fn arc_end(&self) -> Point {
        self.shape.point(2)
    }
}

/// Ring segment between two radii.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnularSector {
    shape: Shape,
    center: Point,
}

contour_type!(AnnularSector);

impl AnnularSector {
    pub fn center(&self) -> Point {
        self.center
    }

    pub fn inner_start(&self) -> Point {
        self.shape.point(0)
    }

    pub fn outer_start(&self) -> Point {
        self.shape.point(1)
    }

    pub fn outer_end(&self) -> Point {
        self.shape.point(2)
    }

    pub fn inner_end(&self) -> Point {
        self.shape.point(3)
    }
}

/// Ring segment whose outer arc is replaced by a right-angle corner on the bisector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SquareCap {
    shape: Shape,
    center: Point,
}

contour_type!(SquareCap);

impl SquareCap {
    pub fn center(&self) -> Point {
        self.center
    }

    pub fn inner_start(&self) -> Point {
        self.shape.point(0)
    }

    pub fn outer_start(&self) -> Point {
        self.shape.point(1)
    }

    pub fn corner(&self) -> Point {
        self.shape.point(2)
    }

    pub fn outer_end(&self) -> Point {
        self.shape.point(3)
    }

    pub fn inner_end(&self) -> Point {
        self.shape.point(4)
    }
}

/// Ring segment closed by a single corner reached from the outer start
/// along the end direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartialSquareCap {
    shape: Shape,
    center: Point,
}

contour_type!(PartialSquareCap);

impl PartialSquareCap {
    pub fn center(&self) -> Point {
        self.center
    }

    pub fn inner_start(&self) -> Point {
        self.shape.point(0)
    }

    pub fn outer_start(&self) -> Point {
        self.shape.point(1)
    }

    pub fn corner(&self) -> Point {
        self.shape.point(2)
    }

    pub fn inner_end(&self) -> Point {
        self.shape.point(3)
    }
}

/// Triangle spanned by two legs from a common apex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    shape: Shape,
}

contour_type!(Triangle);

impl Triangle {
    pub fn apex(&self) -> Point {
        self.shape.point(0)
    }

    pub fn first_leg_end(&self) -> Point {
        self.shape.point(1)
    }

    pub fn second_leg_end(&self) -> Point {
        self.shape.point(2)
    }
}

fn unsupported(shape: &'static str, anchor: Anchor) -> ConfigError {
    ConfigError::UnsupportedAnchor { shape, anchor }
}

fn offset(radius: f64, angle: f64) -> Point {
    Point::polar(Point::ORIGIN, radius, angle)
}

/// Resolve the construction center of a radial shape whose vertices sit at
/// `offsets` from it.
fn radial_center(
    shape: &'static str,
    origin: Point,
    anchor: Anchor,
    offsets: &[Point],
) -> Result<Point, ConfigError> {
    match anchor {
        Anchor::Center => Ok(origin),
        Anchor::Vertex(i) if i < offsets.len() => {
            Ok(origin.translate(-offsets[i].x, -offsets[i].y))
        }
        other => Err(unsupported(shape, other)),
    }
}

fn place(center: Point, offsets: &[Point]) -> Vec<Point> {
    offsets
        .iter()
        .map(|o| center.translate(o.x, o.y))
        .collect()
}

/// Axis-aligned rectangle of `width` x `height`.
pub fn square(origin: Point, width: f64, height: f64, anchor: Anchor) -> Result<Quad, ConfigError> {
    let (x0, y0) = (origin.x, origin.y);
    let (w, h) = (width, height);
    let start = match anchor {
        Anchor::BottomLeft => Point::new(x0, y0),
        Anchor::BottomCenter => Point::new(x0 - w / 2.0, y0),
        Anchor::BottomRight => Point::new(x0 - w, y0),
        Anchor::TopLeft => Point::new(x0, y0 - h),
        Anchor::TopCenter => Point::new(x0 - w / 2.0, y0 - h),
        Anchor::TopRight => Point::new(x0 - w, y0 - h),
        Anchor::CenterLeft => Point::new(x0, y0 - h / 2.0),
        Anchor::Center => Point::new(x0 - w / 2.0, y0 - h / 2.0),
        Anchor::CenterRight => Point::new(x0 - w, y0 - h / 2.0),
        other => return Err(unsupported("square", other)),
    };
    Ok(Quad::from_corners([
        start.translate(0.0, h),
        start,
        start.translate(w, 0.0),
        start.translate(w, h),
    ]))
}

/// Trapezoid with one pair of parallel sides, see [`TrapezoidSpec`].
pub fn trapezoid(origin: Point, spec: &TrapezoidSpec, anchor: Anchor) -> Result<Quad, ConfigError> {
    let (x0, y0) = (origin.x, origin.y);
    let (w1, w2, off, h) = (spec.top_width, spec.bottom_width, spec.offset, spec.height);
    match spec.axis {
        Axis::X => {
            let start = match anchor {
                Anchor::BottomLeft => Point::new(x0, y0),
                Anchor::BottomCenter => Point::new(x0 - w2 / 2.0, y0),
                Anchor::BottomRight => Point::new(x0 - w2, y0),
                Anchor::TopLeft => Point::new(x0 - w2 / 2.0 - off + w1 / 2.0, y0 - h),
                Anchor::TopCenter => Point::new(x0 - w2 / 2.0 - off, y0 - h),
                Anchor::TopRight => Point::new(x0 - w2 / 2.0 - off - w1 / 2.0, y0 - h),
                other => return Err(unsupported("x-parallel trapezoid", other)),
            };
            let top_center = start.x + w2 / 2.0 + off;
            Ok(Quad::from_corners([
                Point::new(top_center - w1 / 2.0, start.y + h),
                start,
                start.translate(w2, 0.0),
                Point::new(top_center + w1 / 2.0, start.y + h),
            ]))
        }
        Axis::Y => {
            let start = match anchor {
                Anchor::LeftTop => Point::new(x0, y0),
                Anchor::LeftCenter => Point::new(x0, y0 + w2 / 2.0),
                Anchor::LeftBottom => Point::new(x0, y0 + w2),
                Anchor::RightTop => Point::new(x0 - h, y0 + w2 / 2.0 - off - w1 / 2.0),
                Anchor::RightCenter => Point::new(x0 - h, y0 + w2 / 2.0 - off),
                Anchor::RightBottom => Point::new(x0 - h, y0 + w2 / 2.0 - off + w1 / 2.0),
                other => return Err(unsupported("y-parallel trapezoid", other)),
            };
            let right_center = start.y - w2 / 2.0 + off;
            Ok(Quad::from_corners([
                start,
                start.translate(0.0, -w2),
                Point::new(start.x + h, right_center - w1 / 2.0),
                Point::new(start.x + h, right_center + w1 / 2.0),
            ]))
        }
    }
}

/// Full circle as two half-turn arcs between the ends of the horizontal diameter.
pub fn circle(center: Point, radius: f64) -> Shape {
    Shape::new(vec![
        center.translate(radius, 0.0),
        center.translate(-radius, 0.0),
    ])
    .with_bulge(0, 1.0)
    .with_bulge(1, 1.0)
}

pub fn circular_sector(
    origin: Point,
    radius: f64,
    span: ArcSpan,
    anchor: Anchor,
) -> Result<Sector, ConfigError> {
    let offsets = [
        Point::ORIGIN,
        offset(radius, span.start),
        offset(radius, span.end),
    ];
    let center = radial_center("circular sector", origin, anchor, &offsets)?;
    Ok(Sector {
        shape: Shape::new(place(center, &offsets)).with_arc(1, span.sweep()),
    })
}

pub fn annular_sector(
    origin: Point,
    inner_radius: f64,
    outer_radius: f64,
    span: ArcSpan,
    anchor: Anchor,
) -> Result<AnnularSector, ConfigError> {
    let offsets = [
        offset(inner_radius, span.start),
        offset(outer_radius, span.start),
        offset(outer_radius, span.end),
        offset(inner_radius, span.end),
    ];
    let center = radial_center("annular sector", origin, anchor, &offsets)?;
    let shape = Shape::new(place(center, &offsets))
        .with_arc(1, span.sweep())
        .with_arc(3, -span.sweep());
    Ok(AnnularSector { shape, center })
}

/// Annular sector with the outer arc squared off through `outer_radius * sqrt(2)` on the bisector.
pub fn square_cap(
    origin: Point,
    inner_radius: f64,
    outer_radius: f64,
    span: ArcSpan,
    anchor: Anchor,
) -> Result<SquareCap, ConfigError> {
    let offsets = [
        offset(inner_radius, span.start),
        offset(outer_radius, span.start),
        offset(outer_radius * std::f64::consts::SQRT_2, span.bisector()),
        offset(outer_radius, span.end),
        offset(inner_radius, span.end),
    ];
    let center = radial_center("square cap", origin, anchor, &offsets)?;
    let shape = Shape::new(place(center, &offsets)).with_arc(4, -span.sweep());
    Ok(SquareCap { shape, center })
}

/// Annular sector closed by a corner at `outer_start + inner_radius` along the end direction.
pub fn partial_square_cap(
    origin: Point,
    inner_radius: f64,
    outer_radius: f64,
    span: ArcSpan,
    anchor: Anchor,
) -> Result<PartialSquareCap, ConfigError> {
    let outer_start = offset(outer_radius, span.start);
    let reach = offset(inner_radius, span.end);
    let offsets = [
        offset(inner_radius, span.start),
        outer_start,
        outer_start.translate(reach.x, reach.y),
        offset(inner_radius, span.end),
    ];
    let center = radial_center("partial square cap", origin, anchor, &offsets)?;
    let shape = Shape::new(place(center, &offsets)).with_arc(3, -span.sweep());
    Ok(PartialSquareCap { shape, center })
}

/// Plus-shaped alignment fiducial centered on `center`.
pub fn cross(center: Point, arm_width: f64, arm_length: f64) -> Shape {
    let (w, l) = (arm_width / 2.0, arm_length);
    let corners = [
        (-w, l),
        (-w, w),
        (-l, w),
        (-l, -w),
        (-w, -w),
        (-w, -l),
        (w, -l),
        (w, -w),
        (l, -w),
        (l, w),
        (w, w),
        (w, l),
    ];
    Shape::new(
        corners
            .iter()
            .map(|&(dx, dy)| center.translate(dx, dy))
            .collect(),
    )
}

/// Triangle with legs of `legs.0` at `angles.start` and `legs.1` at `angles.end` from the apex.
pub fn triangle(
    origin: Point,
    legs: (f64, f64),
    angles: ArcSpan,
    anchor: Anchor,
) -> Result<Triangle, ConfigError> {
    let offsets = [
        Point::ORIGIN,
        offset(legs.0, angles.start),
        offset(legs.1, angles.end),
    ];
    let apex = radial_center("triangle", origin, anchor, &offsets)?;
    Ok(Triangle {
        shape: Shape::new(place(apex, &offsets)),
    })
}

/// Closed polyline through `points` with straight edges.
pub fn polyline(points: &[Point]) -> Result<Shape, ConfigError> {
    if points.is_empty() {
        return Err(ConfigError::Empty("points"));
    }
    Ok(Shape::new(points.to_vec()))
}

/// Closed polyline whose edges are arcs, see [`ArcVertex`].
pub fn arc_polyline(origin: Point, vertices: &[ArcVertex]) -> Result<Shape, ConfigError> {
    if vertices.is_empty() {
        return Err(ConfigError::Empty("vertices"));
    }
    let points = vertices
        .iter()
        .map(|v| Point::polar(origin.translate(v.dx, v.dy), v.radius, v.start))
        .collect();
    Ok(vertices
        .iter()
        .enumerate()
        .fold(Shape::new(points), |shape, (i, v)| {
            shape.with_arc(i, v.end - v.start)
        }))
}
