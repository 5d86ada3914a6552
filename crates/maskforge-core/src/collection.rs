use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::geometry::{BBox, Outline, Point};

/// A named entry of a [`ShapeCollection`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionEntry {
    pub name: String,
    pub points: Vec<Point>,
}

/// Insertion-ordered record of the shapes a layout drew, by name.
///
/// Each entry stores the concatenated outline of the component, so later
/// components can be anchored to `(name, index)` of earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapeCollection {
    entries: Vec<CollectionEntry>,
}

impl ShapeCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `shape` under `name`, replacing any earlier entry of that name in place.
    pub fn insert(&mut self, name: &str, shape: &dyn Outline) {
        self.insert_points(name, shape.outline());
    }

    pub fn insert_points(&mut self, name: &str, points: Vec<Point>) {
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => entry.points = points,
            None => self.entries.push(CollectionEntry {
                name: name.to_string(),
                points,
            }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&[Point]> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.points.as_slice())
    }

    /// Point `index` of entry `name`.
    pub fn anchor(&self, name: &str, index: usize) -> Option<Point> {
        self.get(name).and_then(|pts| pts.get(index).copied())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &CollectionEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn bbox(&self) -> Option<BBox> {
        self.entries
            .iter()
            .filter_map(|e| BBox::from_points(&e.points))
            .reduce(|a, b| a.union(&b))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Check that independently routed points coincide.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignmentCheck {
    /// Upper bound on the squared distance between the two points.
    pub tolerance: f64,
}

impl Default for AlignmentCheck {
    fn default() -> Self {
        Self { tolerance: 0.01 }
    }
}

impl AlignmentCheck {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    /// Squared distance between `a` and `b`, or an alignment error when it reaches the tolerance.
    pub fn verify(&self, label: &str, a: Point, b: Point) -> Result<f64, LayoutError> {
        let error = a.distance_squared(&b);
        if error < self.tolerance {
            log::debug!("{} aligned (error={:e})", label, error);
            Ok(error)
        } else {
            log::error!("{} alignment error: error={}", label, error);
            Err(LayoutError::Alignment {
                label: label.to_string(),
                error,
                tolerance: self.tolerance,
            })
        }
    }
}
