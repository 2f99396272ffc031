use std::sync::Arc;

use crate::{
    composite::codec::PreparedImage,
    foundation::core::{Affine, BezPath, SurfaceSize},
    foundation::error::{FramemarkError, FramemarkResult},
    shape::surface::StrokeStyle,
};

/// Row-major RGBA8 pixels.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// RGBA at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// True when every pixel is fully transparent.
    pub fn is_transparent(&self) -> bool {
        self.data.chunks_exact(4).all(|px| px[3] == 0)
    }
}

/// One-shot vello_cpu render target: queue draws, then `finish` into pixels.
pub(crate) struct CpuCanvas {
    width: u16,
    height: u16,
    ctx: vello_cpu::RenderContext,
}

impl CpuCanvas {
    pub(crate) fn new(size: SurfaceSize) -> FramemarkResult<Self> {
        let (width, height) = size.ensure_non_empty("render surface")?.as_u16()?;
        Ok(Self {
            width,
            height,
            ctx: vello_cpu::RenderContext::new(width, height),
        })
    }

    /// Fill the image's own rect through `transform`.
    pub(crate) fn draw_image(
        &mut self,
        image: &PreparedImage,
        transform: Affine,
    ) -> FramemarkResult<()> {
        let pixmap =
            image_premul_bytes_to_pixmap(image.rgba8_premul.as_slice(), image.width, image.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };

        self.ctx
            .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_transform(affine_to_cpu(transform));
        self.ctx.set_paint(paint);
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(image.width),
            f64::from(image.height),
        ));
        Ok(())
    }

    pub(crate) fn stroke(&mut self, path: &BezPath, style: StrokeStyle) {
        let [r, g, b, a] = style.color.rgba8();
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx
            .set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
        self.ctx.set_stroke(
            vello_cpu::kurbo::Stroke::new(style.width)
                .with_caps(vello_cpu::kurbo::Cap::Round)
                .with_join(vello_cpu::kurbo::Join::Round),
        );
        self.ctx.stroke_path(&bezpath_to_cpu(path));
    }

    /// Rasterize everything queued so far into premultiplied RGBA8.
    pub(crate) fn finish(mut self) -> FrameRGBA {
        let mut pixmap = vello_cpu::Pixmap::new(self.width, self.height);
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut pixmap);
        FrameRGBA {
            width: u32::from(self.width),
            height: u32::from(self.height),
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        }
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: kurbo::Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> FramemarkResult<vello_cpu::Pixmap> {
    let (w, h) = SurfaceSize::new(width, height).as_u16()?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(FramemarkError::render(
            "prepared image byte length mismatch",
        ));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
