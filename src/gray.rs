//! Whole-document grayscale transform.
//!
//! A reduced second pass over the *assembled output* of the primary pass:
//! re-decode it, re-render each page, convert every pixel to
//! luminance-preserving gray, re-encode and reassemble. The original source
//! document is never touched here; the pass sees only the output bytes.
//!
//! The render scale is capped at 2 rather than the primary pass's 2.5 since
//! the input is already compressed raster content.

use log::debug;

use crate::assemble::OutputBuilder;
use crate::encode::encode_jpeg;
use crate::error::CompressError;
use crate::pipeline::CancelToken;
use crate::raster::{PageRasterizer, RasterSurface, SourceDocument};

/// ITU-R BT.601 luma.
pub(crate) fn luma601(r: u8, g: u8, b: u8) -> u8 {
    (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32).round() as u8
}

/// Replace each pixel's color channels with its luma. Alpha is untouched.
pub(crate) fn desaturate(surface: &mut RasterSurface) {
    for px in surface.pixels.chunks_exact_mut(4) {
        let gray = luma601(px[0], px[1], px[2]);
        px[0] = gray;
        px[1] = gray;
        px[2] = gray;
    }
}

/// Re-render `output` page by page in gray and reassemble it. Page count and
/// per-page geometry are preserved.
pub fn to_grayscale<R: PageRasterizer>(
    rasterizer: &R,
    output: &[u8],
    dpi: u32,
    quality: f32,
    cancel: &CancelToken,
) -> Result<Vec<u8>, CompressError> {
    let scale = (dpi as f32 / 72.0).min(2.0);
    debug!("grayscale pass over {} bytes at scale {scale}", output.len());

    let doc = rasterizer.open(output)?;
    let page_count = doc.page_count();
    let mut builder = OutputBuilder::begin();

    for i in 0..page_count {
        if cancel.is_cancelled() {
            return Err(CompressError::Cancelled);
        }
        let geometry = doc.geometry(i)?;
        let mut surface = doc.rasterize(i, scale)?;
        desaturate(&mut surface);
        let image = encode_jpeg(&surface, quality)?;
        drop(surface);
        builder.append_page(&image, geometry)?;
    }

    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn luma_of_primaries() {
        assert_eq!(luma601(255, 0, 0), 76);
        assert_eq!(luma601(0, 255, 0), 150);
        assert_eq!(luma601(0, 0, 255), 29);
        assert_eq!(luma601(255, 255, 255), 255);
        assert_eq!(luma601(0, 0, 0), 0);
    }

    #[test]
    fn desaturate_equalizes_channels_and_keeps_alpha() {
        let mut surface = RasterSurface {
            width: 2,
            height: 1,
            pixels: vec![255, 0, 0, 200, 10, 200, 30, 255],
        };
        desaturate(&mut surface);
        for px in surface.pixels.chunks_exact(4) {
            assert_eq!(px[0], px[1]);
            assert_eq!(px[1], px[2]);
        }
        assert_eq!(surface.pixels[3], 200);
        assert_eq!(surface.pixels[7], 255);
    }
}
