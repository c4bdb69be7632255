//! The host-provided output surface.

use super::canvas::{Canvas2d, RecordingCanvas};
use crate::viewport::SurfaceSize;

/// The element the engine renders into.
///
/// A browser host would back this with a `<canvas>` element and its parent
/// container; a native host with a window.
pub trait OutputSurface {
    type Canvas: Canvas2d;

    /// Obtain the 2D drawing context. `None` means the surface cannot
    /// provide one, which is fatal for engine construction.
    fn create_canvas(&mut self) -> Option<Self::Canvas>;

    /// Geometry of the containing element, if it is laid out.
    fn container_size(&self) -> Option<SurfaceSize>;

    /// Resize the backing store (the pixel buffer).
    fn set_backing_size(&mut self, width: u32, height: u32);

    /// Resize the displayed element.
    fn set_display_size(&mut self, size: SurfaceSize);
}

/// In-memory surface that hands out a [`RecordingCanvas`].
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    container: Option<SurfaceSize>,
    backing: (u32, u32),
    display: Option<SurfaceSize>,
    has_context: bool,
}

impl HeadlessSurface {
    /// A surface inside a container of the given size.
    pub fn new(container_width: f64, container_height: f64) -> Self {
        Self {
            container: Some(SurfaceSize::new(container_width, container_height)),
            backing: (0, 0),
            display: None,
            has_context: true,
        }
    }

    /// A surface that is not attached to any container yet.
    pub fn detached() -> Self {
        Self {
            container: None,
            ..Self::new(0.0, 0.0)
        }
    }

    /// A surface that refuses to provide a drawing context.
    pub fn without_context() -> Self {
        Self {
            has_context: false,
            ..Self::new(0.0, 0.0)
        }
    }

    /// Simulate the container being resized (or detached with `None`).
    pub fn set_container(&mut self, size: Option<SurfaceSize>) {
        self.container = size;
    }

    pub fn backing_size(&self) -> (u32, u32) {
        self.backing
    }

    pub fn display_size(&self) -> Option<SurfaceSize> {
        self.display
    }
}

impl OutputSurface for HeadlessSurface {
    type Canvas = RecordingCanvas;

    fn create_canvas(&mut self) -> Option<RecordingCanvas> {
        self.has_context.then(RecordingCanvas::new)
    }

    fn container_size(&self) -> Option<SurfaceSize> {
        self.container
    }

    fn set_backing_size(&mut self, width: u32, height: u32) {
        self.backing = (width, height);
    }

    fn set_display_size(&mut self, size: SurfaceSize) {
        self.display = Some(size);
    }
}
