//! Error taxonomy for the recompression pipeline.
//!
//! Every stage failure is fatal to the run: a partially assembled output is
//! never surfaced. The orchestrator reduces whichever variant fires to a
//! single user-facing string via [`CompressError::user_message`].

use thiserror::Error;

/// Failure of a single compression run, tagged by pipeline stage.
#[derive(Debug, Error)]
pub enum CompressError {
    /// The input document could not be decoded at all.
    #[error("failed to load PDF: {0}")]
    Decode(String),

    /// A specific page failed to rasterize. Aborts the remaining pages.
    #[error("failed to render page {page}: {message}")]
    Render { page: usize, message: String },

    /// JPEG encoding of a rasterized page failed.
    #[error("failed to encode page image: {0}")]
    Encode(String),

    /// The output builder violated one of its invariants.
    #[error("failed to assemble output document: {0}")]
    Assembly(String),

    /// The grayscale second pass failed. The non-gray intermediate is
    /// discarded and the run as a whole is reported failed.
    #[error("grayscale pass failed")]
    ColorTransform {
        #[source]
        source: Box<CompressError>,
    },

    /// The caller cancelled the run between page iterations.
    #[error("compression cancelled")]
    Cancelled,
}

impl CompressError {
    fn stage_message(&self) -> String {
        self.to_string()
    }

    /// Collapse the error into the one string shown to the user: the stage
    /// message with the underlying cause appended when one exists, or a
    /// generic fallback if somehow neither carries text.
    pub fn user_message(&self) -> String {
        let stage = self.stage_message();
        let cause = match self {
            CompressError::ColorTransform { source } => Some(source.user_message()),
            _ => None,
        };
        match cause {
            Some(cause) if !cause.is_empty() => {
                if stage.is_empty() {
                    format!("Compression failed: {cause}")
                } else {
                    format!("{stage}: {cause}")
                }
            }
            _ if !stage.is_empty() => stage,
            _ => "Compression failed. Please try again.".to_string(),
        }
    }
}
