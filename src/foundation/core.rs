use crate::foundation::error::{FramemarkError, FramemarkResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// Pixel dimensions of a drawing surface or decoded image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Reject zero-area sizes; `what` names the surface in the error.
    pub fn ensure_non_empty(self, what: &str) -> FramemarkResult<Self> {
        if self.is_empty() {
            return Err(FramemarkError::validation(format!(
                "{what} must have non-zero width and height (got {}x{})",
                self.width, self.height
            )));
        }
        Ok(self)
    }

    /// Per-axis factors that map coordinates in `self` onto `target`.
    pub fn scale_to(self, target: SurfaceSize) -> (f64, f64) {
        (
            f64::from(target.width) / f64::from(self.width),
            f64::from(target.height) / f64::from(self.height),
        )
    }

    pub(crate) fn as_u16(self) -> FramemarkResult<(u16, u16)> {
        let w: u16 = self
            .width
            .try_into()
            .map_err(|_| FramemarkError::render("surface width exceeds u16"))?;
        let h: u16 = self
            .height
            .try_into()
            .map_err(|_| FramemarkError::render("surface height exceeds u16"))?;
        Ok((w, h))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
