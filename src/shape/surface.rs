use crate::foundation::core::{BezPath, SurfaceSize};
use crate::foundation::error::FramemarkResult;
use crate::render::cpu::{CpuCanvas, FrameRGBA};
use crate::shape::model::ShapeColor;

/// Stroke parameters for one draw call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeStyle {
    pub color: ShapeColor,
    /// Width in the pixels of the surface being drawn on.
    pub width: f64,
}

impl StrokeStyle {
    pub fn new(color: ShapeColor, width: f64) -> Self {
        Self { color, width }
    }
}

/// Anything shapes can be stroked onto.
///
/// Surfaces support only whole-surface clears; removing one stroke means clearing and replaying.
pub trait DrawSurface {
    /// Surface dimensions in pixels.
    fn size(&self) -> SurfaceSize;
    /// Drop everything drawn so far.
    fn clear(&mut self);
    /// Stroke an open or closed path.
    fn stroke_path(&mut self, path: &BezPath, style: StrokeStyle);
}

#[derive(Clone, Debug)]
pub(crate) struct StrokeOp {
    pub(crate) path: BezPath,
    pub(crate) style: StrokeStyle,
}

/// Transparent overlay that keeps its strokes as a display list and rasterizes on demand.
#[derive(Clone, Debug)]
pub struct OverlaySurface {
    size: SurfaceSize,
    ops: Vec<StrokeOp>,
}

impl OverlaySurface {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            size,
            ops: Vec::new(),
        }
    }

    /// Number of strokes currently on the surface.
    pub fn stroke_count(&self) -> usize {
        self.ops.len()
    }

    /// True when nothing has been drawn since the last clear.
    pub fn is_blank(&self) -> bool {
        self.ops.is_empty()
    }

    /// Rasterize the overlay onto a transparent premultiplied RGBA8 frame.
    pub fn rasterize(&self) -> FramemarkResult<FrameRGBA> {
        let mut canvas = CpuCanvas::new(self.size)?;
        for op in &self.ops {
            canvas.stroke(&op.path, op.style);
        }
        Ok(canvas.finish())
    }
}

impl DrawSurface for OverlaySurface {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn clear(&mut self) {
        self.ops.clear();
    }

    fn stroke_path(&mut self, path: &BezPath, style: StrokeStyle) {
        self.ops.push(StrokeOp {
            path: path.clone(),
            style,
        });
    }
}

/// One call observed by a [`RecordingSurface`].
#[derive(Clone, Debug, PartialEq)]
pub enum SurfaceCall {
    /// `clear()`.
    Clear,
    /// `stroke_path()` with the stroked path's element count and style.
    Stroke {
        /// Number of path elements.
        elements: usize,
        /// Style used.
        style: StrokeStyle,
    },
}

/// Surface that only records calls; used to observe render order.
#[derive(Clone, Debug)]
pub struct RecordingSurface {
    size: SurfaceSize,
    calls: Vec<SurfaceCall>,
}

impl RecordingSurface {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            size,
            calls: Vec::new(),
        }
    }

    pub fn calls(&self) -> &[SurfaceCall] {
        &self.calls
    }

    /// Strokes drawn since the most recent clear.
    pub fn visible_strokes(&self) -> usize {
        self.calls
            .iter()
            .rev()
            .take_while(|c| **c != SurfaceCall::Clear)
            .count()
    }
}

impl DrawSurface for RecordingSurface {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn clear(&mut self) {
        self.calls.push(SurfaceCall::Clear);
    }

    fn stroke_path(&mut self, path: &BezPath, style: StrokeStyle) {
        self.calls.push(SurfaceCall::Stroke {
            elements: path.elements().len(),
            style,
        });
    }
}

#[cfg(test)]
#[path = "../../tests/unit/shape/surface.rs"]
mod tests;
