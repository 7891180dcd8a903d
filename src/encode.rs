//! Lossy JPEG encoding of rasterized pages.
//!
//! Encoding is deterministic: the same surface and quality always produce
//! byte-identical output, which keeps size statistics reproducible.

use crate::error::CompressError;
use crate::raster::RasterSurface;

/// A compressed page image ready for assembly.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Map a quality fraction in (0, 1] to the encoder's 1-100 scale.
pub(crate) fn quality_to_percent(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Encode a surface as baseline JPEG with 4:2:0 chroma subsampling.
/// `quality` is a fraction in (0, 1].
pub fn encode_jpeg(surface: &RasterSurface, quality: f32) -> Result<EncodedImage, CompressError> {
    let rgb = surface.to_rgb();

    let mut jpeg_bytes = Vec::new();
    let mut encoder = jpeg_encoder::Encoder::new(&mut jpeg_bytes, quality_to_percent(quality));
    encoder.set_sampling_factor(jpeg_encoder::SamplingFactor::R_4_2_0);
    encoder
        .encode(
            &rgb,
            surface.width as u16,
            surface.height as u16,
            jpeg_encoder::ColorType::Rgb,
        )
        .map_err(|e| CompressError::Encode(e.to_string()))?;

    Ok(EncodedImage {
        data: jpeg_bytes,
        width: surface.width,
        height: surface.height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(width: u32, height: u32) -> RasterSurface {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                let v = if (x + y) % 2 == 0 { 230 } else { 40 };
                pixels.extend_from_slice(&[v, v / 2, 255 - v, 255]);
            }
        }
        RasterSurface {
            width,
            height,
            pixels,
        }
    }

    #[test]
    fn identical_input_yields_identical_bytes() {
        let surface = checker(16, 16);
        let a = encode_jpeg(&surface, 0.75).unwrap();
        let b = encode_jpeg(&surface, 0.75).unwrap();
        assert_eq!(a.data, b.data);
    }

    #[test]
    fn different_quality_changes_output() {
        let surface = checker(16, 16);
        let high = encode_jpeg(&surface, 1.0).unwrap();
        let low = encode_jpeg(&surface, 0.1).unwrap();
        assert_ne!(high.data, low.data);
    }

    #[test]
    fn keeps_surface_dimensions() {
        let surface = checker(10, 14);
        let img = encode_jpeg(&surface, 0.5).unwrap();
        assert_eq!((img.width, img.height), (10, 14));
    }

    #[test]
    fn quality_fraction_maps_to_percent() {
        assert_eq!(quality_to_percent(0.75), 75);
        assert_eq!(quality_to_percent(1.0), 100);
        assert_eq!(quality_to_percent(0.004), 1);
    }
}
