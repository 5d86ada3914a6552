use serde::{Deserialize, Serialize};

use maskforge_core::{BBox, Point};

/// Maps layout coordinates (µm, y up) onto a canvas (pixels, y down).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Center X in layout coordinates.
    pub center_x: f64,
    /// Center Y in layout coordinates.
    pub center_y: f64,
    /// Pixels per layout unit.
    pub zoom: f64,
    pub canvas_width: f64,
    pub canvas_height: f64,
}

impl Viewport {
    pub fn new(canvas_width: f64, canvas_height: f64) -> Self {
        Self {
            center_x: 0.0,
            center_y: 0.0,
            zoom: 1.0,
            canvas_width,
            canvas_height,
        }
    }

    /// A canvas `canvas_width` wide with the aspect ratio of `bbox`, fitted to it.
    pub fn for_bbox(bbox: &BBox, canvas_width: f64) -> Self {
        let aspect = if bbox.width() > 0.0 { bbox.height() / bbox.width() } else { 1.0 };
        let mut viewport = Self::new(canvas_width, (canvas_width * aspect).max(1.0));
        viewport.fit_bbox(bbox);
        viewport
    }

    /// Zoom to fit a bounding box with a 5% margin on each side.
    pub fn fit_bbox(&mut self, bbox: &BBox) {
        let center = bbox.center();
        self.center_x = center.x;
        self.center_y = center.y;

        let (width, height) = (bbox.width(), bbox.height());
        let zoom_x = if width > 0.0 { self.canvas_width / width * 0.9 } else { f64::INFINITY };
        let zoom_y = if height > 0.0 { self.canvas_height / height * 0.9 } else { f64::INFINITY };
        let zoom = zoom_x.min(zoom_y);
        if zoom.is_finite() {
            self.zoom = zoom;
        }
    }

    pub fn layout_to_screen(&self, p: Point) -> (f64, f64) {
        (self.layout_to_screen_x(p.x), self.layout_to_screen_y(p.y))
    }

    pub fn layout_to_screen_x(&self, layout_x: f64) -> f64 {
        (layout_x - self.center_x) * self.zoom + self.canvas_width / 2.0
    }

    /// Screen y grows downward.
    pub fn layout_to_screen_y(&self, layout_y: f64) -> f64 {
        (self.center_y - layout_y) * self.zoom + self.canvas_height / 2.0
    }

    pub fn screen_to_layout(&self, screen_x: f64, screen_y: f64) -> Point {
        Point::new(
            (screen_x - self.canvas_width / 2.0) / self.zoom + self.center_x,
            self.center_y - (screen_y - self.canvas_height / 2.0) / self.zoom,
        )
    }

    /// Visible area in layout coordinates.
    pub fn visible_bounds(&self) -> BBox {
        let half_w = self.canvas_width / (2.0 * self.zoom);
        let half_h = self.canvas_height / (2.0 * self.zoom);
        BBox::new(
            Point::new(self.center_x - half_w, self.center_y - half_h),
            Point::new(self.center_x + half_w, self.center_y + half_h),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_keeps_margin_and_flips_y() {
        let bbox = BBox::new(Point::new(0.0, 0.0), Point::new(200.0, 100.0));
        let vp = Viewport::for_bbox(&bbox, 1000.0);
        assert!((vp.canvas_height - 500.0).abs() < 1e-9);
        assert!((vp.zoom - 4.5).abs() < 1e-9);
        let (x, y) = vp.layout_to_screen(Point::new(0.0, 100.0));
        assert!((x - 50.0).abs() < 1e-9);
        assert!((y - 25.0).abs() < 1e-9);
        let back = vp.screen_to_layout(x, y);
        assert!(back.distance_to(&Point::new(0.0, 100.0)) < 1e-9);
        assert!(vp.visible_bounds().contains_point(&Point::new(200.0, 0.0)));
    }

    #[test]
    fn test_degenerate_bbox_keeps_zoom_finite() {
        let bbox = BBox::new(Point::new(0.0, 5.0), Point::new(10.0, 5.0));
        let vp = Viewport::for_bbox(&bbox, 100.0);
        assert!(vp.zoom.is_finite());
        assert!((vp.zoom - 9.0).abs() < 1e-9);
    }
}
