//! # Maskforge Render
//!
//! SVG previews of mask documents. A [`RenderFrame`] groups a document's
//! polylines per visible layer and fits them to a [`Viewport`]; the
//! [`svg`](crate::svg) module turns a frame into an image.

pub mod render_data;
pub mod svg;
pub mod viewport;

pub use render_data::{RenderFrame, RenderLayer, RenderPath};
pub use svg::{render_svg, save_svg, SvgOptions};
pub use viewport::Viewport;
