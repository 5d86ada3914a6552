use serde::{Deserialize, Serialize};

use maskforge_core::{BBox, Document, LayerColor, Point};

use crate::Viewport;

/// Polylines of one layer, in layer-stack order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderLayer {
    pub name: String,
    pub color: LayerColor,
    pub opacity: f32,
    pub paths: Vec<RenderPath>,
}

/// A closed outline with one bulge per edge (0 for straight edges).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderPath {
    pub points: Vec<Point>,
    pub bulges: Vec<f64>,
}

/// Everything needed to draw a document once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderFrame {
    pub layers: Vec<RenderLayer>,
    pub viewport: Viewport,
}

impl RenderFrame {
    pub fn empty(viewport: Viewport) -> Self {
        Self {
            layers: Vec::new(),
            viewport,
        }
    }

    /// Group the visible layers' polylines. Hidden layers are left out.
    pub fn from_document(doc: &Document, canvas_width: f64) -> Self {
        let bbox = doc
            .bbox()
            .unwrap_or_else(|| BBox::new(Point::new(-1.0, -1.0), Point::new(1.0, 1.0)));
        let mut frame = Self::empty(Viewport::for_bbox(&bbox, canvas_width));

        for layer in doc.layer_stack.visible_layers() {
            let paths: Vec<RenderPath> = doc
                .polylines_on_layer(&layer.name)
                .map(|polyline| RenderPath {
                    bulges: (0..polyline.points.len()).map(|i| polyline.bulge_at(i)).collect(),
                    points: polyline.points.clone(),
                })
                .collect();
            if paths.is_empty() {
                continue;
            }
            frame.layers.push(RenderLayer {
                name: layer.name.clone(),
                color: layer.color,
                opacity: layer.opacity,
                paths,
            });
        }
        log::debug!("Render frame: {} layers, zoom {:.4}", frame.layers.len(), frame.viewport.zoom);
        frame
    }

    pub fn path_count(&self) -> usize {
        self.layers.iter().map(|l| l.paths.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maskforge_core::{with_document, Anchor};

    #[test]
    fn test_frame_groups_by_layer_and_skips_hidden() {
        let mut doc = Document::new("frame");
        with_document(&mut doc, true, |d| {
            d.square(Point::ORIGIN, 10.0, 10.0, Anchor::BottomLeft, Some("a"))?;
            d.square(Point::new(20.0, 0.0), 10.0, 10.0, Anchor::BottomLeft, Some("b"))?;
            d.circle(Point::new(50.0, 5.0), 5.0, Some("a"))?;
            Ok(())
        })
        .unwrap();
        doc.layer_stack.toggle_visibility("b");

        let frame = RenderFrame::from_document(&doc, 800.0);
        assert_eq!(frame.layers.len(), 1);
        assert_eq!(frame.layers[0].name, "a");
        assert_eq!(frame.path_count(), 2);
        assert_eq!(frame.layers[0].paths[1].bulges, vec![1.0, 1.0]);
        assert!(serde_json::to_string(&frame).is_ok());
    }
}
