//! DXF drawing sink. Polylines become closed LWPOLYLINE entities with their
//! arc bulges carried per vertex.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use dxf::entities::{Entity, EntityType, LwPolyline};
use dxf::LwPolylineVertex;
use dxf::enums::AcadVersion;
use dxf::tables::Layer as DxfLayer;
use dxf::{Drawing, DxfError};

use maskforge_core::geometry::ArcEdge;
use maskforge_core::layer::DEFAULT_LAYER;
use maskforge_core::{Document, DrawingSink, Point, Polyline, PolylineHandle, SinkError};

use crate::IoError;

fn backend(e: DxfError) -> SinkError {
    SinkError::Backend(e.to_string().into())
}

/// A [`DrawingSink`] backed by a `dxf::Drawing`, optionally tied to a file.
///
/// With a path, `begin_document(false)` continues the drawing already on
/// disk and `end_document` writes it back.
pub struct DxfSink {
    drawing: Drawing,
    path: Option<PathBuf>,
    open: bool,
    active_layer: String,
    committed: usize,
}

impl DxfSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::in_memory()
        }
    }

    /// A sink that is never written to disk; see [`DxfSink::save_to`].
    pub fn in_memory() -> Self {
        Self {
            drawing: fresh_drawing(),
            path: None,
            open: false,
            active_layer: DEFAULT_LAYER.to_string(),
            committed: 0,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn drawing(&self) -> &Drawing {
        &self.drawing
    }

    pub fn into_drawing(self) -> Drawing {
        self.drawing
    }

    pub fn set_active_layer(&mut self, name: &str) {
        self.active_layer = name.to_string();
    }

    pub fn committed(&self) -> usize {
        self.committed
    }

    pub fn save_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<(), IoError> {
        self.drawing.save(writer)?;
        Ok(())
    }

    fn has_layer(&self, name: &str) -> bool {
        self.drawing.layers().any(|l| l.name == name)
    }

    fn ensure_layer(&mut self, name: &str) {
        if !self.has_layer(name) {
            self.drawing.add_layer(DxfLayer {
                name: name.to_string(),
                ..Default::default()
            });
        }
    }
}

fn fresh_drawing() -> Drawing {
    let mut drawing = Drawing::new();
    // LWPOLYLINE needs R14 or later
    drawing.header.version = AcadVersion::R2000;
    drawing
}

impl DrawingSink for DxfSink {
    fn begin_document(&mut self, reset: bool) -> Result<(), SinkError> {
        if self.open {
            return Err(SinkError::AlreadyOpen);
        }
        self.drawing = match &self.path {
            Some(path) if !reset && path.exists() => {
                log::info!("Continuing DXF drawing {}", path.display());
                Drawing::load_file(path).map_err(backend)?
            }
            _ => fresh_drawing(),
        };
        self.committed = self.drawing.entities().count();
        self.open = true;
        Ok(())
    }

    fn add_layers(&mut self, names: &[String]) -> Result<(), SinkError> {
        if !self.open {
            return Err(SinkError::NotOpen);
        }
        for name in names {
            self.ensure_layer(name);
        }
        Ok(())
    }

    fn commit_polyline(&mut self, polyline: Polyline) -> Result<PolylineHandle, SinkError> {
        if !self.open {
            return Err(SinkError::NotOpen);
        }
        let layer = polyline.layer.clone().unwrap_or_else(|| self.active_layer.clone());
        self.ensure_layer(&layer);

        let mut lw = LwPolyline::default();
        lw.set_is_closed(polyline.closed);
        lw.vertices = polyline
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| LwPolylineVertex {
                x: p.x,
                y: p.y,
                bulge: polyline.bulge_at(i),
                ..Default::default()
            })
            .collect();

        let mut entity = Entity::new(EntityType::LwPolyline(lw));
        entity.common.layer = layer;
        self.drawing.add_entity(entity);

        let handle = PolylineHandle(self.committed);
        self.committed += 1;
        Ok(handle)
    }

    fn end_document(&mut self) -> Result<(), SinkError> {
        if !self.open {
            return Err(SinkError::NotOpen);
        }
        self.open = false;
        if let Some(path) = &self.path {
            self.drawing.save_file(path).map_err(backend)?;
            log::info!("Saved {} polylines to {}", self.committed, path.display());
        }
        Ok(())
    }
}

/// Replay `doc` into the DXF file at `path`. Without `reset` the polylines
/// are added to whatever the file already holds.
pub fn export_dxf(doc: &Document, path: &Path, reset: bool) -> Result<(), IoError> {
    let mut sink = DxfSink::new(path);
    sink.set_active_layer(doc.active_layer());
    doc.replay_into(&mut sink, reset)?;
    Ok(())
}

/// Load the closed polylines of a DXF file into a new [`Document`].
pub fn read_dxf(path: &Path) -> Result<Document, IoError> {
    let drawing = Drawing::load_file(path)?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    document_from_drawing(&name, &drawing)
}

pub fn read_dxf_from<R: Read + ?Sized>(name: &str, reader: &mut R) -> Result<Document, IoError> {
    let drawing = Drawing::load(reader)?;
    document_from_drawing(name, &drawing)
}

fn document_from_drawing(name: &str, drawing: &Drawing) -> Result<Document, IoError> {
    let mut doc = Document::new(name);
    doc.begin_document(true)?;
    let layers: Vec<String> = drawing.layers().map(|l| l.name.clone()).collect();
    doc.add_layers(&layers)?;

    let mut skipped = 0usize;
    for entity in drawing.entities() {
        let (points, bulges, closed): (Vec<Point>, Vec<f64>, bool) = match &entity.specific {
            EntityType::LwPolyline(lw) => (
                lw.vertices.iter().map(|v| Point::new(v.x, v.y)).collect(),
                lw.vertices.iter().map(|v| v.bulge).collect(),
                lw.is_closed(),
            ),
            EntityType::Polyline(poly) => (
                poly.vertices().map(|v| Point::new(v.location.x, v.location.y)).collect(),
                poly.vertices().map(|v| v.bulge).collect(),
                poly.is_closed(),
            ),
            _ => {
                skipped += 1;
                continue;
            }
        };
        let bulges = bulges
            .into_iter()
            .enumerate()
            .filter(|(_, b)| *b != 0.0)
            .map(|(edge, bulge)| ArcEdge { edge, bulge })
            .collect();
        doc.commit_polyline(Polyline {
            points,
            closed,
            bulges,
            layer: Some(entity.common.layer.clone()),
        })?;
    }
    doc.end_document()?;
    if skipped > 0 {
        log::warn!("Skipped {} DXF entities that are not polylines", skipped);
    }
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use maskforge_core::geometry::Shape;
    use maskforge_core::{with_document, Anchor};
    use std::io::Cursor;

    #[test]
    fn test_commit_requires_open_document() {
        let mut sink = DxfSink::in_memory();
        let err = sink
            .commit_polyline(Polyline::from_shape(&Shape::new(vec![Point::ORIGIN]), None))
            .unwrap_err();
        assert!(matches!(err, SinkError::NotOpen));
        sink.begin_document(true).unwrap();
        assert!(matches!(sink.begin_document(true), Err(SinkError::AlreadyOpen)));
    }

    #[test]
    fn test_polylines_keep_layers_and_bulges() {
        let mut sink = DxfSink::in_memory();
        with_document(&mut sink, true, |d| {
            d.add_layers(&["metal".to_string()])?;
            d.square(Point::ORIGIN, 10.0, 5.0, Anchor::BottomLeft, Some("metal"))?;
            d.circle(Point::new(20.0, 0.0), 3.0, None)?;
            Ok(())
        })
        .unwrap();
        assert_eq!(sink.committed(), 2);

        let mut buffer = Vec::new();
        sink.save_to(&mut buffer).unwrap();
        let doc = read_dxf_from("roundtrip", &mut Cursor::new(buffer)).unwrap();

        assert_eq!(doc.len(), 2);
        let square = &doc.polylines()[0];
        assert_eq!(square.layer.as_deref(), Some("metal"));
        assert!(square.closed);
        assert_eq!(square.points.len(), 4);
        assert!(square.bulges.is_empty());

        let circle = &doc.polylines()[1];
        assert_eq!(circle.layer.as_deref(), Some(DEFAULT_LAYER));
        assert_eq!(circle.bulges.len(), 2);
        assert!(circle.bulges.iter().all(|a| (a.bulge.abs() - 1.0).abs() < 1e-9));
        assert!(doc.layer_stack.contains("metal"));
    }

    #[test]
    fn test_file_sink_appends_without_reset() {
        let path = std::env::temp_dir().join(format!("maskforge-dxf-{}.dxf", std::process::id()));
        let mut sink = DxfSink::new(&path);
        with_document(&mut sink, true, |d| {
            d.square(Point::ORIGIN, 1.0, 1.0, Anchor::BottomLeft, None)?;
            Ok(())
        })
        .unwrap();

        let mut again = DxfSink::new(&path);
        let quad = with_document(&mut again, false, |d| {
            Ok(d.square(Point::new(5.0, 5.0), 1.0, 1.0, Anchor::BottomLeft, None)?)
        })
        .unwrap();
        assert!((quad.bottom_left().x - 5.0).abs() < 1e-12);
        assert_eq!(read_dxf(&path).unwrap().len(), 2);

        let copy = read_dxf(&path).unwrap();
        export_dxf(&copy, &path, false).unwrap();
        assert_eq!(read_dxf(&path).unwrap().len(), 4);

        let mut fresh = DxfSink::new(&path);
        with_document(&mut fresh, true, |_| Ok(())).unwrap();
        assert!(read_dxf(&path).unwrap().is_empty());
        let _ = std::fs::remove_file(&path);
    }
}
