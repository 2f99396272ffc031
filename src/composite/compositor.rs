use std::sync::Arc;

use crate::canvas::history::DrawHistory;
use crate::composite::codec::{EncodedImage, PreparedImage, decode_image, encode_jpeg};
use crate::foundation::core::{Affine, SurfaceSize};
use crate::foundation::error::{FramemarkError, FramemarkResult};
use crate::media::reference::MediaRef;
use crate::media::resolver::{MediaResolver, ResolveOpts};
use crate::render::cpu::{CpuCanvas, FrameRGBA};
use crate::shape::surface::StrokeStyle;

/// Compositing parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ComposeOptions {
    /// Stroke width in native pixels, applied as-is.
    pub stroke_width: f64,
    pub jpeg_quality: u8,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            stroke_width: 6.0,
            jpeg_quality: 90,
        }
    }
}

/// Burns a display-space overlay into its source raster at native resolution.
pub struct Compositor {
    resolver: Arc<dyn MediaResolver>,
    opts: ComposeOptions,
}

impl Compositor {
    pub fn new(resolver: Arc<dyn MediaResolver>, opts: ComposeOptions) -> Self {
        Self { resolver, opts }
    }

    pub fn options(&self) -> ComposeOptions {
        self.opts
    }

    /// Compose `history` (captured on a `display`-sized surface) onto `original` drawn at
    /// `native` size, and encode the result as JPEG.
    #[tracing::instrument(skip(self, history, display, native), fields(shapes = history.len()))]
    pub fn compose(
        &self,
        original: &MediaRef,
        history: &DrawHistory,
        display: SurfaceSize,
        native: SurfaceSize,
    ) -> FramemarkResult<EncodedImage> {
        display.ensure_non_empty("display surface")?;
        native.ensure_non_empty("native surface")?;
        let image = self.load_source(original)?;
        let frame = self.render(&image, history, display, native)?;
        encode_jpeg(&frame, self.opts.jpeg_quality)
    }

    /// [`Compositor::compose`] at the decoded image's own dimensions.
    #[tracing::instrument(skip(self, history, display), fields(shapes = history.len()))]
    pub fn compose_native(
        &self,
        original: &MediaRef,
        history: &DrawHistory,
        display: SurfaceSize,
    ) -> FramemarkResult<EncodedImage> {
        display.ensure_non_empty("display surface")?;
        let image = self.load_source(original)?;
        let native = image.size().ensure_non_empty("source image")?;
        let frame = self.render(&image, history, display, native)?;
        encode_jpeg(&frame, self.opts.jpeg_quality)
    }

    /// Rasterize without encoding.
    pub fn render(
        &self,
        image: &PreparedImage,
        history: &DrawHistory,
        display: SurfaceSize,
        native: SurfaceSize,
    ) -> FramemarkResult<FrameRGBA> {
        let (sx, sy) = display.ensure_non_empty("display surface")?.scale_to(native);
        let (ix, iy) = image.size().ensure_non_empty("source image")?.scale_to(native);

        let mut canvas = CpuCanvas::new(native)?;
        canvas.draw_image(image, Affine::scale_non_uniform(ix, iy))?;
        for shape in history.scaled(sx, sy).iter() {
            canvas.stroke(
                &shape.to_path(),
                StrokeStyle::new(shape.color(), self.opts.stroke_width),
            );
        }
        tracing::debug!(sx, sy, width = native.width, height = native.height, "composited");
        Ok(canvas.finish())
    }

    fn load_source(&self, original: &MediaRef) -> FramemarkResult<PreparedImage> {
        let url = self
            .resolver
            .resolve(original, ResolveOpts::same_origin())
            .map_err(|e| FramemarkError::same_origin(format!("resolve {original}: {e}")))?;
        if !url.is_same_origin_safe() {
            return Err(FramemarkError::same_origin(format!(
                "{original} only resolves to a cross-origin URL"
            )));
        }
        let bytes = self
            .resolver
            .fetch(&url)
            .map_err(|e| FramemarkError::same_origin(format!("load {original}: {e}")))?;
        decode_image(&bytes)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composite/compositor.rs"]
mod tests;
