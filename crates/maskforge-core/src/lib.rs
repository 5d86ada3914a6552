//! # Maskforge Core
//!
//! Parametric photomask geometry: closed-form primitives with arc bulges,
//! compound shapes chained corner to corner, and complete device layouts
//! committed through a [`DrawingSink`].
//!
//! Nothing here performs file I/O; file-backed sinks live in `maskforge-io`.

pub mod anchor;
pub mod arc;
pub mod collection;
pub mod compose;
pub mod document;
pub mod drafter;
pub mod error;
pub mod geometry;
pub mod kernel;
pub mod layer;
pub mod params;
pub mod text;

pub use anchor::{Anchor, Axis};
pub use collection::{AlignmentCheck, ShapeCollection};
pub use compose::LayoutKind;
pub use document::{with_document, Document, DrawingSink, Polyline, PolylineHandle};
pub use drafter::Drafter;
pub use error::{ConfigError, LayoutError, SinkError};
pub use geometry::{BBox, Outline, Point, Shape};
pub use layer::{Layer, LayerColor, LayerStack};
pub use params::{CoplanarParams, DcPadParams, LayerSpec, LayoutParams, MagnetParams};
pub use text::{Glyph, GlyphTable};
