//! Page rasterization.
//!
//! [`PageRasterizer`] is the seam between the pipeline and the PDF renderer:
//! it opens a document from bytes and hands back a [`SourceDocument`] that can
//! report page geometry at scale 1 and render any page to an RGBA surface at
//! an arbitrary scale. The production implementation binds pdfium at runtime;
//! tests substitute a synthetic rasterizer.

use log::debug;
use pdfium_render::prelude::*;

use crate::error::CompressError;

/// Page size in points (1/72 inch), captured at scale 1 before any raster
/// scale is applied. Output pages are always created with this geometry,
/// never with the pixel dimensions of the rendered surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
}

/// An ephemeral RGBA pixel buffer for exactly one rendered page. Owned by the
/// per-page processing step and dropped immediately after encoding.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA, `width * height * 4` bytes.
    pub pixels: Vec<u8>,
}

impl RasterSurface {
    /// Strip the alpha channel, yielding packed RGB rows for JPEG encoding.
    pub fn to_rgb(&self) -> Vec<u8> {
        let mut rgb = Vec::with_capacity(self.pixels.len() / 4 * 3);
        for px in self.pixels.chunks_exact(4) {
            rgb.push(px[0]);
            rgb.push(px[1]);
            rgb.push(px[2]);
        }
        rgb
    }
}

/// A decoded source document held open for the duration of one run.
pub trait SourceDocument {
    fn page_count(&self) -> usize;

    /// Geometry of `page` (zero-based) at scale 1.
    fn geometry(&self, page: usize) -> Result<PageGeometry, CompressError>;

    /// Render `page` (zero-based) at `scale`, producing a surface whose pixel
    /// dimensions equal the scaled viewport. `scale` must be positive.
    fn rasterize(&self, page: usize, scale: f32) -> Result<RasterSurface, CompressError>;
}

/// Decodes documents from bytes. The returned handle borrows both the
/// rasterizer and the input bytes, so it cannot outlive either.
pub trait PageRasterizer {
    type Doc<'a>: SourceDocument
    where
        Self: 'a;

    fn open<'a>(&'a self, bytes: &'a [u8]) -> Result<Self::Doc<'a>, CompressError>;
}

/// Production rasterizer backed by the pdfium library.
pub struct PdfiumRasterizer {
    pdfium: Pdfium,
}

impl PdfiumRasterizer {
    /// Bind to the system pdfium library. Binding failure is reported as a
    /// decode failure since no document can be opened without it.
    pub fn new() -> Result<Self, CompressError> {
        let bindings = Pdfium::bind_to_system_library()
            .map_err(|e| CompressError::Decode(format!("pdfium bind failed: {e}")))?;
        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }
}

impl PageRasterizer for PdfiumRasterizer {
    type Doc<'a>
        = PdfiumDocument<'a>
    where
        Self: 'a;

    fn open<'a>(&'a self, bytes: &'a [u8]) -> Result<PdfiumDocument<'a>, CompressError> {
        let doc = self
            .pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(|e| CompressError::Decode(e.to_string()))?;
        debug!("opened document, {} pages", doc.pages().len());
        Ok(PdfiumDocument { doc })
    }
}

pub struct PdfiumDocument<'a> {
    doc: PdfDocument<'a>,
}

impl PdfiumDocument<'_> {
    fn page(&self, page: usize) -> Result<PdfPage<'_>, CompressError> {
        self.doc
            .pages()
            .get(page as u16)
            .map_err(|e| CompressError::Render {
                page: page + 1,
                message: format!("page access failed: {e}"),
            })
    }
}

impl SourceDocument for PdfiumDocument<'_> {
    fn page_count(&self) -> usize {
        self.doc.pages().len() as usize
    }

    fn geometry(&self, page: usize) -> Result<PageGeometry, CompressError> {
        let p = self.page(page)?;
        Ok(PageGeometry {
            width: p.width().value,
            height: p.height().value,
        })
    }

    fn rasterize(&self, page: usize, scale: f32) -> Result<RasterSurface, CompressError> {
        let p = self.page(page)?;
        let width = ((p.width().value * scale).round() as i32).max(1);
        let height = ((p.height().value * scale).round() as i32).max(1);

        let bitmap = p
            .render_with_config(
                &PdfRenderConfig::new()
                    .set_target_width(width)
                    .set_target_height(height),
            )
            .map_err(|e| CompressError::Render {
                page: page + 1,
                message: e.to_string(),
            })?;

        let rgba = bitmap.as_image().to_rgba8();
        let (w, h) = rgba.dimensions();
        debug!("rasterized page {} at scale {scale} -> {w}x{h}", page + 1);
        Ok(RasterSurface {
            width: w,
            height: h,
            pixels: rgba.into_raw(),
        })
    }
}
