//! Compound shapes built by chaining kernel primitives.

pub mod bend;
pub mod coplanar;
pub mod layouts;
pub mod lines;
pub mod marks;
pub mod pads;
pub mod single_line;
pub mod taper;

pub use bend::{Bend, Cap, Ring};
pub use coplanar::{CoplanarBend, CoplanarStack, PadRow, PinCount, Termination, TerminationSpec};
pub use layouts::{CoplanarLayout, LayoutKind, LoopLengths};
pub use lines::{LineArray, StackProfile};
pub use marks::{AlignmentMark, AlignmentMarkSpec};
pub use pads::{DcPad, DcPadKind, PadGroup, PadGroupSpec};
pub use single_line::{BendAligner, SingleLineTaperSpec};
pub use taper::TaperArray;
