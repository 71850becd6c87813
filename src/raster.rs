use crate::foundation::error::{XflError, XflResult};
use crate::render::document::Document;

const MAX_DIM: u32 = 16_384;

/// Rasterized frame, premultiplied RGBA8, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height * 4` bytes.
    pub data: Vec<u8>,
}

impl RasterImage {
    /// Pixels with straight (non-premultiplied) alpha, as image encoders expect them.
    pub fn to_straight_rgba(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        for px in out.chunks_exact_mut(4) {
            let a = u16::from(px[3]);
            if a == 0 || a == 255 {
                continue;
            }
            for c in &mut px[..3] {
                *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        out
    }
}

/// Parse SVG text with `usvg`.
pub fn parse_svg(svg: &str) -> XflResult<usvg::Tree> {
    let opts = usvg::Options::default();
    usvg::Tree::from_str(svg, &opts)
        .map_err(|e| XflError::Other(anyhow::anyhow!("parse svg tree: {e}")))
}

/// Rasterize a document into a `width` x `height` pixmap, stretching its viewBox to fit.
#[tracing::instrument(skip(doc))]
pub fn rasterize(doc: &Document, width: u32, height: u32) -> XflResult<RasterImage> {
    if width == 0 || height == 0 || width > MAX_DIM || height > MAX_DIM {
        return Err(XflError::project(format!(
            "raster size out of range: {width}x{height} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }
    let tree = parse_svg(&doc.to_svg_string())?;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| XflError::project("failed to allocate pixmap"))?;
    let size = tree.size();
    let sx = (width as f32) / size.width();
    let sy = (height as f32) / size.height();
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(sx, sy),
        &mut pixmap.as_mut(),
    );

    Ok(RasterImage {
        width,
        height,
        data: pixmap.take(),
    })
}

#[cfg(test)]
#[path = "../tests/unit/raster.rs"]
mod tests;
