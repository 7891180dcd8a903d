//! WebAssembly bindings for the PDF Page Recompressor

use wasm_bindgen::prelude::*;

use crate::pipeline::{self, CancelToken, ColorMode, CompressionSettings};
use crate::raster::PdfiumRasterizer;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Recompress a PDF by re-rasterizing every page.
///
/// # Arguments
/// * `pdf_bytes` - The input PDF file as a byte array
/// * `file_name` - Original file name, used to derive the output name
/// * `dpi` - Target render density 72-300 (default: 144)
/// * `quality` - JPEG quality 1-100 (default: 75)
/// * `gray` - Convert the output to grayscale (default: false)
/// * `on_progress` - Optional callback receiving status strings
///
/// # Returns
/// A `CompressResultJs` with the new PDF and size statistics, or throws
#[wasm_bindgen]
pub fn compress_pdf(
    pdf_bytes: &[u8],
    file_name: Option<String>,
    dpi: Option<u32>,
    quality: Option<u8>,
    gray: Option<bool>,
    on_progress: Option<js_sys::Function>,
) -> Result<CompressResultJs, JsError> {
    let settings = CompressionSettings {
        dpi: dpi.unwrap_or(144),
        image_quality: quality.unwrap_or(75),
        color: if gray.unwrap_or(false) {
            ColorMode::Gray
        } else {
            ColorMode::NoChange
        },
    };

    let rasterizer = PdfiumRasterizer::new().map_err(|e| JsError::new(&e.user_message()))?;

    let mut progress = |msg: &str| {
        if let Some(cb) = &on_progress {
            let _ = cb.call1(&JsValue::NULL, &JsValue::from_str(msg));
        }
    };

    let result = pipeline::compress(
        &rasterizer,
        file_name.as_deref().unwrap_or(""),
        pdf_bytes,
        settings,
        &mut progress,
        &CancelToken::new(),
    )
    .map_err(|e| JsError::new(&e.user_message()))?;

    Ok(CompressResultJs {
        pdf_bytes: result.bytes,
        original_size: result.original_size,
        new_size: result.new_size,
        percentage_saved: result.percentage_saved,
        file_name: result.file_name,
    })
}

/// Result of a compression run with size statistics
#[wasm_bindgen]
pub struct CompressResultJs {
    pdf_bytes: Vec<u8>,
    original_size: usize,
    new_size: usize,
    percentage_saved: f64,
    file_name: String,
}

#[wasm_bindgen]
impl CompressResultJs {
    /// Get the recompressed PDF bytes
    #[wasm_bindgen(getter)]
    pub fn pdf_bytes(&self) -> Vec<u8> {
        self.pdf_bytes.clone()
    }

    /// Get the input size in bytes
    #[wasm_bindgen(getter)]
    pub fn original_size(&self) -> usize {
        self.original_size
    }

    /// Get the output size in bytes
    #[wasm_bindgen(getter)]
    pub fn new_size(&self) -> usize {
        self.new_size
    }

    /// Get the size reduction as a percentage of the original size
    #[wasm_bindgen(getter)]
    pub fn percentage_saved(&self) -> f64 {
        self.percentage_saved
    }

    /// Get the suggested download name
    #[wasm_bindgen(getter)]
    pub fn file_name(&self) -> String {
        self.file_name.clone()
    }
}
