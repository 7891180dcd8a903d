//! Compression orchestration.
//!
//! Sequences rasterize -> encode -> assemble across all pages of the input,
//! applies the optional grayscale second pass, and computes size statistics.
//! Settings are a by-value snapshot: edits made while a run is in flight
//! cannot leak into it. The decoded source handle lives in a narrower scope
//! than the grayscale pass, so the second pass can only ever see the
//! assembled output, and every temporary (source handle, per-page surface)
//! is released on each exit path by ownership alone.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, warn};

use crate::assemble::OutputBuilder;
use crate::encode::encode_jpeg;
use crate::error::CompressError;
use crate::gray::to_grayscale;
use crate::raster::{PageRasterizer, SourceDocument};

/// Color handling for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    #[default]
    NoChange,
    Gray,
}

/// Settings for one compression run, snapshotted when the run starts.
#[derive(Debug, Clone, Copy)]
pub struct CompressionSettings {
    /// Target render density, clamped to [72, 300].
    pub dpi: u32,
    /// JPEG quality percentage, clamped to an effective [10, 100].
    pub image_quality: u8,
    pub color: ColorMode,
}

impl Default for CompressionSettings {
    fn default() -> Self {
        Self {
            dpi: 144,
            image_quality: 75,
            color: ColorMode::NoChange,
        }
    }
}

/// Outcome of a successful run. Immutable once created; dropped wholesale
/// when the workflow erases or restarts.
#[derive(Debug, Clone)]
pub struct CompressionResult {
    pub bytes: Vec<u8>,
    pub original_size: usize,
    pub new_size: usize,
    pub percentage_saved: f64,
    pub file_name: String,
}

/// Best-effort cancellation flag, checked between page iterations.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Defensive clamps applied even though the UI layer validates too.
/// Returns (dpi, quality fraction, render scale).
pub(crate) fn clamp_settings(settings: &CompressionSettings) -> (u32, f32, f32) {
    let dpi = settings.dpi.clamp(72, 300);
    let quality = (settings.image_quality as f32 / 100.0).clamp(0.1, 1.0);
    let scale = (dpi as f32 / 72.0).min(2.5);
    (dpi, quality, scale)
}

pub(crate) fn percentage_saved(original_size: usize, new_size: usize) -> f64 {
    if original_size > 0 {
        (1.0 - new_size as f64 / original_size as f64) * 100.0
    } else {
        0.0
    }
}

/// `<name without .pdf>-compressed.pdf`, with a fallback for empty names.
pub(crate) fn suggested_file_name(name: &str) -> String {
    let name = if name.is_empty() { "document" } else { name };
    let stem = name
        .len()
        .checked_sub(4)
        .and_then(|cut| name.get(cut..).map(|tail| (cut, tail)))
        .filter(|(_, tail)| tail.eq_ignore_ascii_case(".pdf"))
        .map(|(cut, _)| &name[..cut])
        .unwrap_or(name);
    format!("{stem}-compressed.pdf")
}

/// Run one compression over `input`. Progress strings are advisory and may
/// arrive zero or more times before the terminal result.
pub fn compress<R: PageRasterizer>(
    rasterizer: &R,
    file_name: &str,
    input: &[u8],
    settings: CompressionSettings,
    progress: &mut dyn FnMut(&str),
    cancel: &CancelToken,
) -> Result<CompressionResult, CompressError> {
    progress("Initializing…");
    let (dpi, quality, scale) = clamp_settings(&settings);
    let original_size = input.len();
    debug!("run start: dpi={dpi} quality={quality} scale={scale} input={original_size} bytes");

    progress("Loading PDF…");
    let raw = {
        let doc = rasterizer.open(input)?;
        let page_count = doc.page_count();
        if page_count == 0 {
            return Err(CompressError::Decode("document has no pages".to_string()));
        }

        let mut builder = OutputBuilder::begin();
        for i in 0..page_count {
            if cancel.is_cancelled() {
                warn!("cancelled before page {}", i + 1);
                return Err(CompressError::Cancelled);
            }
            progress(&format!("Compressing page {}/{}…", i + 1, page_count));

            // Geometry first, at scale 1: it sizes the output page.
            let geometry = doc.geometry(i)?;
            let surface = doc.rasterize(i, scale)?;
            let image = encode_jpeg(&surface, quality)?;
            drop(surface);
            builder.append_page(&image, geometry)?;
        }

        progress("Finalizing…");
        builder.finish()?
        // Source handle is dropped here, before any grayscale work.
    };

    let bytes = if settings.color == ColorMode::Gray {
        progress("Applying grayscale…");
        match to_grayscale(rasterizer, &raw, dpi, quality, cancel) {
            Ok(gray) => gray,
            Err(CompressError::Cancelled) => return Err(CompressError::Cancelled),
            Err(e) => {
                return Err(CompressError::ColorTransform {
                    source: Box::new(e),
                })
            }
        }
    } else {
        raw
    };

    let new_size = bytes.len();
    debug!("run done: {original_size} -> {new_size} bytes");
    Ok(CompressionResult {
        percentage_saved: percentage_saved(original_size, new_size),
        bytes,
        original_size,
        new_size,
        file_name: suggested_file_name(file_name),
    })
}
