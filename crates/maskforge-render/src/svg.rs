//! SVG preview: black background, each layer filled in its color, arcs kept as arcs.

use std::io;
use std::path::Path as FsPath;

use serde::{Deserialize, Serialize};
use svg::node::element::path::Data;
use svg::node::element::{Group, Path, Rectangle};
use svg::Document as SvgDocument;

use maskforge_core::arc::Arc;
use maskforge_core::Document;

use crate::render_data::{RenderFrame, RenderPath};
use crate::Viewport;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SvgOptions {
    /// Image width in pixels; the height follows the layout's aspect ratio.
    pub canvas_width: f64,
    pub background: String,
    /// Overrides each layer's own opacity when set.
    pub fill_opacity: Option<f32>,
    /// Outline width in pixels; 0 disables outlines.
    pub stroke_width: f64,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            canvas_width: 1200.0,
            background: "black".to_string(),
            fill_opacity: None,
            stroke_width: 0.0,
        }
    }
}

pub fn render_svg(doc: &Document, options: &SvgOptions) -> SvgDocument {
    let frame = RenderFrame::from_document(doc, options.canvas_width);
    render_frame(&frame, options)
}

pub fn render_frame(frame: &RenderFrame, options: &SvgOptions) -> SvgDocument {
    let vp = &frame.viewport;
    let mut image = SvgDocument::new()
        .set("viewBox", (0.0, 0.0, vp.canvas_width, vp.canvas_height))
        .set("width", vp.canvas_width)
        .set("height", vp.canvas_height)
        .add(
            Rectangle::new()
                .set("width", "100%")
                .set("height", "100%")
                .set("fill", options.background.as_str()),
        );

    for layer in &frame.layers {
        let color = layer.color.to_hex();
        let mut group = Group::new()
            .set("id", layer.name.as_str())
            .set("fill", color.as_str())
            .set("fill-opacity", options.fill_opacity.unwrap_or(layer.opacity));
        if options.stroke_width > 0.0 {
            group = group
                .set("stroke", color.as_str())
                .set("stroke-width", options.stroke_width);
        }
        for path in &layer.paths {
            if let Some(data) = path_data(path, vp) {
                group = group.add(Path::new().set("d", data));
            }
        }
        image = image.add(group);
    }
    image
}

/// Outline of `path` in screen coordinates. Bulged edges become elliptical arcs.
fn path_data(path: &RenderPath, vp: &Viewport) -> Option<Data> {
    let first = *path.points.first()?;
    let mut data = Data::new().move_to(screen(vp, first));
    let n = path.points.len();
    for i in 0..n {
        let start = path.points[i];
        let end = path.points[(i + 1) % n];
        let bulge = path.bulges.get(i).copied().unwrap_or(0.0);
        data = match Arc::from_bulge(start, end, bulge) {
            Some(arc) => {
                let (x, y) = screen(vp, end);
                let radius = (arc.radius * vp.zoom) as f32;
                let large_arc = if bulge.abs() > 1.0 { 1.0 } else { 0.0 };
                // Counter-clockwise in layout space is clockwise once y points down.
                let sweep = if bulge > 0.0 { 0.0 } else { 1.0 };
                data.elliptical_arc_to(vec![radius, radius, 0.0, large_arc, sweep, x, y])
            }
            None if i + 1 < n => data.line_to(screen(vp, end)),
            None => data,
        };
    }
    Some(data.close())
}

fn screen(vp: &Viewport, p: maskforge_core::Point) -> (f32, f32) {
    let (x, y) = vp.layout_to_screen(p);
    (x as f32, y as f32)
}

pub fn save_svg(doc: &Document, path: &FsPath, options: &SvgOptions) -> io::Result<()> {
    let image = render_svg(doc, options);
    svg::save(path, &image)?;
    log::info!("Wrote SVG preview of '{}' to {}", doc.name, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use maskforge_core::{with_document, Anchor, Point};

    fn sample() -> Document {
        let mut doc = Document::new("preview");
        with_document(&mut doc, true, |d| {
            d.square(Point::ORIGIN, 100.0, 50.0, Anchor::BottomLeft, Some("metal"))?;
            d.circle(Point::new(150.0, 25.0), 25.0, Some("via"))?;
            Ok(())
        })
        .unwrap();
        doc
    }

    #[test]
    fn test_svg_has_background_and_layer_groups() {
        let text = render_svg(&sample(), &SvgOptions::default()).to_string();
        assert!(text.contains("fill=\"black\""));
        assert!(text.contains("id=\"metal\""));
        assert!(text.contains("id=\"via\""));
        assert!(text.contains("fill-opacity=\"0.5\""));
    }

    #[test]
    fn test_arcs_are_emitted_as_arcs() {
        let text = render_svg(&sample(), &SvgOptions::default()).to_string();
        // Two half turns for the circle, none for the rectangle.
        assert_eq!(text.matches('A').count(), 2);
        assert_eq!(text.matches(|c| c == 'Z' || c == 'z').count(), 2);
    }

    #[test]
    fn test_arc_sweep_follows_bulge_sign() {
        let vp = Viewport::new(100.0, 100.0);
        let ccw = RenderPath {
            points: vec![Point::new(-10.0, 0.0), Point::new(10.0, 0.0)],
            bulges: vec![0.5, 0.0],
        };
        let d = path_data(&ccw, &vp).unwrap();
        let text = Path::new().set("d", d).to_string();
        assert!(text.contains("A"));
        // radius 20 * (1 + 0.25) / (4 * 0.5) = 12.5, small arc, sweep flag 0
        assert!(text.contains("12.5,12.5,0,0,0,"), "{}", text);

        let cw = RenderPath {
            points: ccw.points.clone(),
            bulges: vec![-2.0, 0.0],
        };
        let text = Path::new().set("d", path_data(&cw, &vp).unwrap()).to_string();
        assert!(text.contains(",0,1,1,"), "{}", text);
    }
}
