//! Integer scaling of the fixed virtual resolution onto the output surface.
//!
//! The engine renders into a logical frame (320x180 by default) and scales
//! it up by the largest whole factor that fits the container. Keeping the
//! factor integral is what lets downstream pixel rounding stay free of
//! seams and uneven pixels.

/// Size of the element that contains the output surface, in CSS-style
/// pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSize {
    pub width: f64,
    pub height: f64,
}

impl SurfaceSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Whether both extents are positive and finite.
    pub fn is_usable(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }
}

/// Result of fitting the viewport to a container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportFit {
    /// Whole-number magnification of the virtual frame.
    pub scale: u32,
    /// Backing store size: virtual size times `scale`.
    pub backing_width: u32,
    pub backing_height: u32,
    /// Displayed size: the container size.
    pub display: SurfaceSize,
}

/// Maps the virtual resolution onto the output surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    virtual_width: u32,
    virtual_height: u32,
    scale: u32,
}

impl Viewport {
    /// A viewport for the given virtual resolution, starting at scale 1.
    pub fn new(virtual_width: u32, virtual_height: u32) -> Self {
        Self {
            virtual_width,
            virtual_height,
            scale: 1,
        }
    }

    pub fn virtual_width(&self) -> u32 {
        self.virtual_width
    }

    pub fn virtual_height(&self) -> u32 {
        self.virtual_height
    }

    /// Current whole-number scale factor (at least 1).
    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// `(width, height)` of the backing store at the current scale.
    pub fn backing_size(&self) -> (u32, u32) {
        (
            self.virtual_width * self.scale,
            self.virtual_height * self.scale,
        )
    }

    /// `floor(min(w / vw, h / vh))`, never below 1.
    pub fn scale_for(&self, container: SurfaceSize) -> u32 {
        let sx = container.width / self.virtual_width as f64;
        let sy = container.height / self.virtual_height as f64;
        (sx.min(sy).floor() as u32).max(1)
    }

    /// Recompute the scale for `container`.
    ///
    /// Returns `None` and leaves the viewport untouched when no usable
    /// container geometry is available.
    pub fn fit(&mut self, container: Option<SurfaceSize>) -> Option<ViewportFit> {
        let container = container.filter(SurfaceSize::is_usable)?;
        self.scale = self.scale_for(container);
        let (backing_width, backing_height) = self.backing_size();
        Some(ViewportFit {
            scale: self.scale,
            backing_width,
            backing_height,
            display: container,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
