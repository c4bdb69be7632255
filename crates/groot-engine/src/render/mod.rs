//! Drawing boundary between the engine and its host.
//!
//! The engine never talks to a concrete graphics API. It draws through the
//! [`Canvas2d`] trait, a small immediate-mode 2D context with a transform
//! stack, and obtains that canvas from an [`OutputSurface`], which also
//! reports the container geometry used for viewport scaling.
//!
//! [`RecordingCanvas`] and [`HeadlessSurface`] are in-memory
//! implementations: they record every call, which is what tests and the
//! headless demo inspect.

pub mod canvas;
pub mod surface;

pub use canvas::{Canvas2d, CanvasError, DrawCall, RecordingCanvas};
pub use surface::{HeadlessSurface, OutputSurface};
