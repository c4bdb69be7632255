//! The 2D drawing context used by the render system.

use groot_ecs::components::{Color, Rect, ResourceId};

/// Failure reported by a drawing backend.
#[derive(Debug, thiserror::Error)]
pub enum CanvasError {
    /// The backend could not draw the given resource.
    #[error("failed to draw '{resource}': {reason}")]
    Draw { resource: ResourceId, reason: String },
}

/// Immediate-mode 2D context with a save/restore transform stack.
///
/// Modeled on the HTML canvas API: transforms compose onto the current
/// matrix, `save`/`restore` push and pop it.
pub trait Canvas2d {
    /// Replace the current matrix with a uniform scale (identity times
    /// `scale`). Called whenever the viewport scale changes.
    fn set_base_scale(&mut self, scale: f64);

    /// Enable or disable filtering when images are scaled.
    fn set_image_smoothing(&mut self, enabled: bool);

    /// Clear a rectangle in the current coordinate space.
    fn clear_rect(&mut self, area: Rect);

    fn save(&mut self);

    fn restore(&mut self);

    fn translate(&mut self, x: f64, y: f64);

    fn rotate(&mut self, radians: f64);

    fn scale(&mut self, sx: f64, sy: f64);

    /// Draw `source` (or the whole image when `None`) of `image` into `dest`.
    fn draw_image(
        &mut self,
        image: &ResourceId,
        source: Option<Rect>,
        dest: Rect,
        tint: Color,
    ) -> Result<(), CanvasError>;
}

/// One recorded canvas call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    SetBaseScale(f64),
    SetImageSmoothing(bool),
    ClearRect(Rect),
    Save,
    Restore,
    Translate(f64, f64),
    Rotate(f64),
    Scale(f64, f64),
    DrawImage {
        image: ResourceId,
        source: Option<Rect>,
        dest: Rect,
        tint: Color,
    },
}

/// A [`Canvas2d`] that records calls instead of drawing.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    calls: Vec<DrawCall>,
    image_smoothing: bool,
    base_scale: f64,
    /// Images whose draws are rejected, for exercising error paths.
    failing: Vec<ResourceId>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self {
            image_smoothing: true,
            base_scale: 1.0,
            ..Self::default()
        }
    }

    /// Make every draw of `image` fail with [`CanvasError::Draw`].
    pub fn fail_draws_of(&mut self, image: impl Into<ResourceId>) {
        self.failing.push(image.into());
    }

    /// Every call recorded so far.
    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    /// Only the image draws, in order.
    pub fn draws(&self) -> Vec<&DrawCall> {
        self.calls
            .iter()
            .filter(|call| matches!(call, DrawCall::DrawImage { .. }))
            .collect()
    }

    /// Forget recorded calls (state such as smoothing is kept).
    pub fn take_calls(&mut self) -> Vec<DrawCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn image_smoothing(&self) -> bool {
        self.image_smoothing
    }

    pub fn base_scale(&self) -> f64 {
        self.base_scale
    }
}

impl Canvas2d for RecordingCanvas {
    fn set_base_scale(&mut self, scale: f64) {
        self.base_scale = scale;
        self.calls.push(DrawCall::SetBaseScale(scale));
    }

    fn set_image_smoothing(&mut self, enabled: bool) {
        self.image_smoothing = enabled;
        self.calls.push(DrawCall::SetImageSmoothing(enabled));
    }

    fn clear_rect(&mut self, area: Rect) {
        self.calls.push(DrawCall::ClearRect(area));
    }

    fn save(&mut self) {
        self.calls.push(DrawCall::Save);
    }

    fn restore(&mut self) {
        self.calls.push(DrawCall::Restore);
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.calls.push(DrawCall::Translate(x, y));
    }

    fn rotate(&mut self, radians: f64) {
        self.calls.push(DrawCall::Rotate(radians));
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.calls.push(DrawCall::Scale(sx, sy));
    }

    fn draw_image(
        &mut self,
        image: &ResourceId,
        source: Option<Rect>,
        dest: Rect,
        tint: Color,
    ) -> Result<(), CanvasError> {
        if self.failing.contains(image) {
            return Err(CanvasError::Draw {
                resource: image.clone(),
                reason: "rejected by recording canvas".to_owned(),
            });
        }
        self.calls.push(DrawCall::DrawImage {
            image: image.clone(),
            source,
            dest,
            tint,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_calls_in_order() {
        let mut canvas = RecordingCanvas::new();
        canvas.save();
        canvas.translate(1.0, 2.0);
        canvas.restore();
        assert_eq!(
            canvas.calls(),
            &[DrawCall::Save, DrawCall::Translate(1.0, 2.0), DrawCall::Restore]
        );
        assert_eq!(canvas.take_calls().len(), 3);
        assert!(canvas.calls().is_empty());
    }

    #[test]
    fn failing_image_is_reported_and_not_recorded() {
        let mut canvas = RecordingCanvas::new();
        canvas.fail_draws_of("broken.png");
        let err = canvas
            .draw_image(
                &ResourceId::new("broken.png"),
                None,
                Rect::new(0.0, 0.0, 1.0, 1.0),
                Color::WHITE,
            )
            .unwrap_err();
        assert!(err.to_string().contains("broken.png"));
        assert!(canvas.draws().is_empty());
    }
}
