//! PDF Page Recompressor Library
//!
//! Shrinks a PDF by re-rasterizing every page at a reduced resolution,
//! re-encoding each page as a lossy JPEG, and reassembling a new document
//! page by page with the original page geometry preserved. Shared between
//! the CLI and WASM targets.
//!
//! The pipeline is
//! rasterize ([`raster`]) -> encode ([`encode`]) -> assemble ([`assemble`]),
//! sequenced by the [`pipeline`] orchestrator with an optional grayscale
//! second pass ([`gray`]), and driven from the guided upload/configure/result
//! flow in [`workflow`].

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub mod assemble;
pub mod encode;
pub mod error;
pub mod gray;
pub mod pipeline;
pub mod raster;
pub mod workflow;

pub use assemble::OutputBuilder;
pub use encode::{encode_jpeg, EncodedImage};
pub use error::CompressError;
pub use gray::to_grayscale;
pub use pipeline::{
    compress, CancelToken, ColorMode, CompressionResult, CompressionSettings,
};
pub use raster::{
    PageGeometry, PageRasterizer, PdfiumRasterizer, RasterSurface, SourceDocument,
};
pub use workflow::{FileEntry, Locator, Route, Workflow, WorkflowState};

#[cfg(not(target_arch = "wasm32"))]
pub mod file_ops {
    use std::fs;
    use std::path::Path;

    use crate::error::CompressError;
    use crate::pipeline::{self, CancelToken, CompressionResult, CompressionSettings};
    use crate::raster::PdfiumRasterizer;

    /// Compress a PDF from one file path to another.
    pub fn compress_pdf_file(
        input_path: &Path,
        output_path: &Path,
        settings: CompressionSettings,
        progress: &mut dyn FnMut(&str),
    ) -> Result<CompressionResult, CompressError> {
        let input = fs::read(input_path)
            .map_err(|e| CompressError::Decode(format!("{input_path:?}: {e}")))?;

        let rasterizer = PdfiumRasterizer::new()?;
        let name = input_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let result = pipeline::compress(
            &rasterizer,
            &name,
            &input,
            settings,
            progress,
            &CancelToken::new(),
        )?;

        fs::write(output_path, &result.bytes)
            .map_err(|e| CompressError::Assembly(format!("{output_path:?}: {e}")))?;
        Ok(result)
    }
}
