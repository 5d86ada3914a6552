use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, SinkError};
use crate::geometry::{ArcEdge, BBox, Point, Shape};
use crate::layer::{LayerStack, DEFAULT_LAYER};
use crate::Drafter;

/// A closed polyline as handed to a drawing sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    pub points: Vec<Point>,
    pub closed: bool,
    /// Edge bulges; edges not listed are straight.
    pub bulges: Vec<ArcEdge>,
    /// Target layer; `None` draws on the sink's active layer.
    pub layer: Option<String>,
}

impl Polyline {
    pub fn from_shape(shape: &Shape, layer: Option<&str>) -> Self {
        Self {
            points: shape.points().to_vec(),
            closed: true,
            bulges: shape.arcs().to_vec(),
            layer: layer.map(str::to_string),
        }
    }

    pub fn bulge_at(&self, edge: usize) -> f64 {
        self.bulges
            .iter()
            .find(|a| a.edge == edge)
            .map(|a| a.bulge)
            .unwrap_or(0.0)
    }
}

/// Opaque reference to a committed polyline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PolylineHandle(pub usize);

/// A destination for committed geometry.
///
/// Calls are bracketed by `begin_document` / `end_document`; committing
/// outside that bracket fails with [`SinkError::NotOpen`].
pub trait DrawingSink {
    /// Open the document. With `reset` any previously drawn content is discarded.
    fn begin_document(&mut self, reset: bool) -> Result<(), SinkError>;

    /// Register layers by name. Existing layers are left untouched.
    fn add_layers(&mut self, names: &[String]) -> Result<(), SinkError>;

    fn commit_polyline(&mut self, polyline: Polyline) -> Result<PolylineHandle, SinkError>;

    /// Flush and close the document.
    fn end_document(&mut self) -> Result<(), SinkError>;
}

/// Open `sink`, run `build` against it, and close it again even when `build` fails.
pub fn with_document<T>(
    sink: &mut dyn DrawingSink,
    reset: bool,
    build: impl FnOnce(&mut Drafter<'_>) -> Result<T, LayoutError>,
) -> Result<T, LayoutError> {
    sink.begin_document(reset)?;
    let result = {
        let mut drafter = Drafter::new(&mut *sink);
        build(&mut drafter)
    };
    let closed = sink.end_document();
    match (result, closed) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) => Err(e.into()),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(close_err)) => {
            log::error!("Failed to close document after error: {}", close_err);
            Err(e)
        }
    }
}

/// In-memory drawing: the layers and polylines committed so far.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub name: String,
    pub layer_stack: LayerStack,
    active_layer: String,
    polylines: Vec<Polyline>,
    #[serde(skip)]
    open: bool,
}

impl Document {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            layer_stack: LayerStack::with_default_layer(),
            active_layer: DEFAULT_LAYER.to_string(),
            polylines: Vec::new(),
            open: false,
        }
    }

    // ── Layers ───────────────────────────────────────────────────────

    pub fn active_layer(&self) -> &str {
        &self.active_layer
    }

    pub fn set_active_layer(&mut self, name: &str) {
        self.layer_stack.ensure(name);
        self.active_layer = name.to_string();
    }

    // ── Contents ─────────────────────────────────────────────────────

    /// Committed polylines; each carries its resolved layer name.
    pub fn polylines(&self) -> &[Polyline] {
        &self.polylines
    }

    pub fn polyline(&self, handle: PolylineHandle) -> Option<&Polyline> {
        self.polylines.get(handle.0)
    }

    pub fn polylines_on_layer<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Polyline> {
        self.polylines
            .iter()
            .filter(move |p| p.layer.as_deref() == Some(name))
    }

    pub fn len(&self) -> usize {
        self.polylines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polylines.is_empty()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn bbox(&self) -> Option<BBox> {
        self.polylines
            .iter()
            .filter_map(|p| BBox::from_points(&p.points))
            .reduce(|a, b| a.union(&b))
    }

    /// Replay every layer and polyline into another sink as one document.
    pub fn replay_into(&self, sink: &mut dyn DrawingSink, reset: bool) -> Result<(), SinkError> {
        sink.begin_document(reset)?;
        let replayed = sink
            .add_layers(&self.layer_stack.names())
            .and_then(|()| {
                self.polylines
                    .iter()
                    .try_for_each(|p| sink.commit_polyline(p.clone()).map(|_| ()))
            });
        let closed = sink.end_document();
        replayed.and(closed)
    }

    // ── Serialization ────────────────────────────────────────────────

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("untitled")
    }
}

impl DrawingSink for Document {
    fn begin_document(&mut self, reset: bool) -> Result<(), SinkError> {
        if self.open {
            return Err(SinkError::AlreadyOpen);
        }
        if reset {
            self.polylines.clear();
            self.layer_stack = LayerStack::with_default_layer();
            self.active_layer = DEFAULT_LAYER.to_string();
        }
        self.open = true;
        log::debug!("Opened document '{}' (reset={})", self.name, reset);
        Ok(())
    }

    fn add_layers(&mut self, names: &[String]) -> Result<(), SinkError> {
        if !self.open {
            return Err(SinkError::NotOpen);
        }
        for name in names {
            self.layer_stack.ensure(name);
        }
        Ok(())
    }

    fn commit_polyline(&mut self, mut polyline: Polyline) -> Result<PolylineHandle, SinkError> {
        if !self.open {
            return Err(SinkError::NotOpen);
        }
        let layer = polyline
            .layer
            .take()
            .unwrap_or_else(|| self.active_layer.clone());
        self.layer_stack.ensure(&layer);
        polyline.layer = Some(layer);
        self.polylines.push(polyline);
        Ok(PolylineHandle(self.polylines.len() - 1))
    }

    fn end_document(&mut self) -> Result<(), SinkError> {
        if !self.open {
            return Err(SinkError::NotOpen);
        }
        self.open = false;
        log::info!(
            "Closed document '{}': {} polylines on {} layers",
            self.name,
            self.polylines.len(),
            self.layer_stack.layer_count()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    fn unit_square() -> Shape {
        Shape::new(vec![
            Point::new(0.0, 1.0),
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
        ])
    }

    #[test]
    fn test_commit_requires_open_document() {
        let mut doc = Document::new("test");
        let err = doc.commit_polyline(Polyline::from_shape(&unit_square(), None));
        assert!(matches!(err, Err(SinkError::NotOpen)));
    }

    #[test]
    fn test_layer_inherits_active() {
        let mut doc = Document::new("test");
        doc.begin_document(false).unwrap();
        doc.set_active_layer("metal");
        let h = doc
            .commit_polyline(Polyline::from_shape(&unit_square(), None))
            .unwrap();
        let h2 = doc
            .commit_polyline(Polyline::from_shape(&unit_square(), Some("resistor")))
            .unwrap();
        doc.end_document().unwrap();
        assert_eq!(doc.polyline(h).unwrap().layer.as_deref(), Some("metal"));
        assert_eq!(doc.polyline(h2).unwrap().layer.as_deref(), Some("resistor"));
        assert!(doc.layer_stack.contains("resistor"));
        assert_eq!(doc.polylines_on_layer("metal").count(), 1);
    }

    #[test]
    fn test_reset_discards_previous_content() {
        let mut doc = Document::new("test");
        for reset in [false, false] {
            doc.begin_document(reset).unwrap();
            doc.commit_polyline(Polyline::from_shape(&unit_square(), None))
                .unwrap();
            doc.end_document().unwrap();
        }
        assert_eq!(doc.len(), 2);
        doc.begin_document(true).unwrap();
        doc.end_document().unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn test_with_document_closes_on_error() {
        let mut doc = Document::new("test");
        let result: Result<(), LayoutError> = with_document(&mut doc, true, |d| {
            d.commit(&unit_square(), None)?;
            Err(ConfigError::Empty("widths").into())
        });
        assert!(matches!(result, Err(LayoutError::Config(_))));
        assert!(!doc.is_open());
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_replay_into_copies_everything() {
        let mut doc = Document::new("src");
        with_document(&mut doc, true, |d| {
            d.commit(&unit_square(), Some("metal"))?;
            d.commit(&unit_square().translate(2.0, 0.0), None)?;
            Ok(())
        })
        .unwrap();
        let mut copy = Document::new("dst");
        doc.replay_into(&mut copy, true).unwrap();
        assert_eq!(copy.polylines(), doc.polylines());
        assert!(copy.layer_stack.contains("metal"));
        let bbox = copy.bbox().unwrap();
        assert!((bbox.width() - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_json_roundtrip() {
        let mut doc = Document::new("json");
        with_document(&mut doc, true, |d| {
            d.commit(&unit_square(), None)?;
            Ok(())
        })
        .unwrap();
        let restored = Document::from_json(&doc.to_json().unwrap()).unwrap();
        assert_eq!(restored.polylines(), doc.polylines());
        assert_eq!(restored.active_layer(), "0");
    }
}
