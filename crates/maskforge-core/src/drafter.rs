use crate::anchor::Anchor;
use crate::document::{DrawingSink, Polyline, PolylineHandle};
use crate::error::{LayoutError, SinkError};
use crate::geometry::{Outline, Point, Shape};
use crate::kernel::{
    self, AnnularSector, ArcSpan, ArcVertex, PartialSquareCap, Quad, Sector, SquareCap,
    TrapezoidSpec, Triangle,
};

/// Drawing context handed to every builder.
///
/// Each method computes its geometry first and only commits once all of it
/// is known to be valid, so a configuration error never leaves a partly
/// drawn component behind.
pub struct Drafter<'a> {
    sink: &'a mut dyn DrawingSink,
    committed: usize,
}

impl<'a> Drafter<'a> {
    pub fn new(sink: &'a mut dyn DrawingSink) -> Self {
        Self { sink, committed: 0 }
    }

    /// Number of polylines committed through this drafter.
    pub fn committed(&self) -> usize {
        self.committed
    }

    pub fn add_layers(&mut self, names: &[String]) -> Result<(), SinkError> {
        self.sink.add_layers(names)
    }

    pub fn commit(&mut self, shape: &Shape, layer: Option<&str>) -> Result<PolylineHandle, SinkError> {
        let handle = self.sink.commit_polyline(Polyline::from_shape(shape, layer))?;
        self.committed += 1;
        log::debug!(
            "Committed polyline #{} ({} vertices, {} arcs) on {}",
            handle.0,
            shape.len(),
            shape.arcs().len(),
            layer.unwrap_or("<active layer>")
        );
        Ok(handle)
    }

    /// Commit every part of `outline` on one layer.
    pub fn draw(&mut self, outline: &dyn Outline, layer: Option<&str>) -> Result<Vec<PolylineHandle>, SinkError> {
        outline
            .parts()
            .into_iter()
            .map(|shape| self.commit(shape, layer))
            .collect()
    }

    // ── Primitives ───────────────────────────────────────────────────

    pub fn square(
        &mut self,
        origin: Point,
        width: f64,
        height: f64,
        anchor: Anchor,
        layer: Option<&str>,
    ) -> Result<Quad, LayoutError> {
        let quad = kernel::square(origin, width, height, anchor)?;
        self.draw(&quad, layer)?;
        Ok(quad)
    }

    pub fn trapezoid(
        &mut self,
        origin: Point,
        spec: &TrapezoidSpec,
        anchor: Anchor,
        layer: Option<&str>,
    ) -> Result<Quad, LayoutError> {
        let quad = kernel::trapezoid(origin, spec, anchor)?;
        self.draw(&quad, layer)?;
        Ok(quad)
    }

    pub fn circle(&mut self, center: Point, radius: f64, layer: Option<&str>) -> Result<Shape, LayoutError> {
        let shape = kernel::circle(center, radius);
        self.commit(&shape, layer)?;
        Ok(shape)
    }

    pub fn circular_sector(
        &mut self,
        origin: Point,
        radius: f64,
        span: ArcSpan,
        anchor: Anchor,
        layer: Option<&str>,
    ) -> Result<Sector, LayoutError> {
        let sector = kernel::circular_sector(origin, radius, span, anchor)?;
        self.draw(&sector, layer)?;
        Ok(sector)
    }

    pub fn annular_sector(
        &mut self,
        origin: Point,
        radii: (f64, f64),
        span: ArcSpan,
        anchor: Anchor,
        layer: Option<&str>,
    ) -> Result<AnnularSector, LayoutError> {
        let sector = kernel::annular_sector(origin, radii.0, radii.1, span, anchor)?;
        self.draw(&sector, layer)?;
        Ok(sector)
    }

    pub fn square_cap(
        &mut self,
        origin: Point,
        radii: (f64, f64),
        span: ArcSpan,
        anchor: Anchor,
        layer: Option<&str>,
    ) -> Result<SquareCap, LayoutError> {
        let cap = kernel::square_cap(origin, radii.0, radii.1, span, anchor)?;
        self.draw(&cap, layer)?;
        Ok(cap)
    }

    pub fn partial_square_cap(
        &mut self,
        origin: Point,
        radii: (f64, f64),
        span: ArcSpan,
        anchor: Anchor,
        layer: Option<&str>,
    ) -> Result<PartialSquareCap, LayoutError> {
        let cap = kernel::partial_square_cap(origin, radii.0, radii.1, span, anchor)?;
        self.draw(&cap, layer)?;
        Ok(cap)
    }

    pub fn cross(
        &mut self,
        center: Point,
        arm_width: f64,
        arm_length: f64,
        layer: Option<&str>,
    ) -> Result<Shape, LayoutError> {
        let shape = kernel::cross(center, arm_width, arm_length);
        self.commit(&shape, layer)?;
        Ok(shape)
    }

    pub fn triangle(
        &mut self,
        origin: Point,
        legs: (f64, f64),
        angles: ArcSpan,
        anchor: Anchor,
        layer: Option<&str>,
    ) -> Result<Triangle, LayoutError> {
        let triangle = kernel::triangle(origin, legs, angles, anchor)?;
        self.draw(&triangle, layer)?;
        Ok(triangle)
    }

    pub fn polyline(&mut self, points: &[Point], layer: Option<&str>) -> Result<Shape, LayoutError> {
        let shape = kernel::polyline(points)?;
        self.commit(&shape, layer)?;
        Ok(shape)
    }

    pub fn arc_polyline(
        &mut self,
        origin: Point,
        vertices: &[ArcVertex],
        layer: Option<&str>,
    ) -> Result<Shape, LayoutError> {
        let shape = kernel::arc_polyline(origin, vertices)?;
        self.commit(&shape, layer)?;
        Ok(shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{with_document, Document};
    use crate::error::ConfigError;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_primitive_commits_once() {
        let mut doc = Document::new("test");
        let sector = with_document(&mut doc, true, |d| {
            let s = d.circular_sector(
                Point::ORIGIN,
                5.0,
                ArcSpan::new(0.0, FRAC_PI_2),
                Anchor::Center,
                Some("metal"),
            )?;
            assert_eq!(d.committed(), 1);
            Ok(s)
        })
        .unwrap();
        let drawn = &doc.polylines()[0];
        assert!(drawn.closed);
        assert_eq!(drawn.points, sector.points());
        assert_eq!(drawn.layer.as_deref(), Some("metal"));
        assert!((drawn.bulge_at(1) - sector.shape().bulge_at(1)).abs() < 1e-15);
    }

    #[test]
    fn test_bad_anchor_commits_nothing() {
        let mut doc = Document::new("test");
        let result = with_document(&mut doc, true, |d| {
            d.square(Point::ORIGIN, 1.0, 1.0, Anchor::Vertex(3), None)
        });
        assert!(matches!(
            result,
            Err(LayoutError::Config(ConfigError::UnsupportedAnchor { .. }))
        ));
        assert!(doc.is_empty());
    }
}
