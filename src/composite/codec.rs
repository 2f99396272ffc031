use std::sync::Arc;

use anyhow::Context;
use base64::Engine as _;

use crate::foundation::core::SurfaceSize;
use crate::foundation::error::{FramemarkError, FramemarkResult};
use crate::render::cpu::FrameRGBA;

pub const JPEG_MIME: &str = "image/jpeg";

/// Decoded raster, premultiplied RGBA8, shared cheaply between draws.
#[derive(Clone, Debug)]
pub struct PreparedImage {
    pub width: u32,
    pub height: u32,
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl PreparedImage {
    pub fn size(&self) -> SurfaceSize {
        SurfaceSize::new(self.width, self.height)
    }
}

/// Encoded bytes of a composite, with the dimensions they were rendered at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub mime: &'static str,
}

impl EncodedImage {
    /// `data:<mime>;base64,<payload>`, the form the upload endpoint and local fallback expect.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime,
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

/// Split a base64 data URL into its mime type and decoded bytes.
pub fn decode_data_url(url: &str) -> FramemarkResult<(String, Vec<u8>)> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| FramemarkError::validation("not a data URL"))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| FramemarkError::validation("data URL has no payload"))?;
    let mime = meta
        .strip_suffix(";base64")
        .ok_or_else(|| FramemarkError::validation("only base64 data URLs are supported"))?;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .context("decode data URL payload")?;
    Ok((mime.to_owned(), bytes))
}

pub fn decode_image(bytes: &[u8]) -> FramemarkResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// Encode a rendered frame as baseline JPEG. Transparency is flattened onto black.
pub fn encode_jpeg(frame: &FrameRGBA, quality: u8) -> FramemarkResult<EncodedImage> {
    if !(1..=100).contains(&quality) {
        return Err(FramemarkError::validation(format!(
            "jpeg quality must be in 1..=100 (got {quality})"
        )));
    }
    let expected = frame.width as usize * frame.height as usize * 4;
    if frame.data.len() != expected {
        return Err(FramemarkError::render("frame byte length mismatch"));
    }

    // Premultiplied RGB already is the colour composited over black.
    let mut rgb = Vec::with_capacity(frame.width as usize * frame.height as usize * 3);
    if frame.premultiplied {
        for px in frame.data.chunks_exact(4) {
            rgb.extend_from_slice(&px[..3]);
        }
    } else {
        for px in frame.data.chunks_exact(4) {
            let a = u16::from(px[3]);
            rgb.extend(px[..3].iter().map(|&c| ((u16::from(c) * a + 127) / 255) as u8));
        }
    }

    let mut bytes = Vec::new();
    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut bytes, quality);
    encoder
        .encode(&rgb, frame.width, frame.height, image::ExtendedColorType::Rgb8)
        .map_err(|e| FramemarkError::render(format!("jpeg encode failed: {e}")))?;

    Ok(EncodedImage {
        bytes,
        width: frame.width,
        height: frame.height,
        mime: JPEG_MIME,
    })
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[..3].fill(0);
            continue;
        }
        for c in &mut px[..3] {
            *c = ((*c as u16 * a + 127) / 255) as u8;
        }
    }
}
