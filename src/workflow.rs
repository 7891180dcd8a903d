//! Three-step guided workflow: Upload -> Configure -> Result.
//!
//! The state machine is independent of any rendering layer. Its only contract
//! with the outside world is the [`Locator`] trait for the addressable
//! location, and the invariant that state and location never disagree: being
//! on the compress location with zero files always redirects home.

use log::debug;

use crate::error::CompressError;
use crate::pipeline::{self, CancelToken, CompressionResult, CompressionSettings};
use crate::raster::PageRasterizer;

/// One attached input file. Only the declared media type gates acceptance.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl FileEntry {
    pub fn new(
        name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    pub fn is_pdf(&self) -> bool {
        self.media_type == "application/pdf"
    }
}

#[derive(Debug)]
pub enum WorkflowState {
    /// No files held.
    Upload,
    /// At least one file attached, no result yet.
    Configure { files: Vec<FileEntry> },
    /// One completed result for the current file set. The files are kept so
    /// that erasing the result returns to Configure with them.
    Result {
        files: Vec<FileEntry>,
        outcome: CompressionResult,
    },
}

impl WorkflowState {
    pub fn file_count(&self) -> usize {
        match self {
            WorkflowState::Upload => 0,
            WorkflowState::Configure { files } | WorkflowState::Result { files, .. } => {
                files.len()
            }
        }
    }
}

/// Externally addressable locations the workflow can sit at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Compress,
}

/// The addressable-location collaborator (a router, in a UI host).
pub trait Locator {
    fn current(&self) -> Route;
    fn replace(&mut self, route: Route);
}

pub struct Workflow<L: Locator> {
    state: WorkflowState,
    locator: L,
    error: Option<String>,
}

impl<L: Locator> Workflow<L> {
    pub fn new(locator: L) -> Self {
        let mut workflow = Self {
            state: WorkflowState::Upload,
            locator,
            error: None,
        };
        workflow.sync_route();
        workflow
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn route(&self) -> Route {
        self.locator.current()
    }

    /// The synthesized message of the most recent failed run, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Attach files. Non-PDF entries are dropped silently; if nothing
    /// matches, the state does not change. A matching selection discards any
    /// held result and lands in Configure.
    pub fn select_files(&mut self, candidates: Vec<FileEntry>) {
        let mut selected: Vec<FileEntry> =
            candidates.into_iter().filter(FileEntry::is_pdf).collect();
        if selected.is_empty() {
            return;
        }
        debug!("attached {} file(s)", selected.len());

        self.state = match std::mem::replace(&mut self.state, WorkflowState::Upload) {
            WorkflowState::Upload => WorkflowState::Configure { files: selected },
            WorkflowState::Configure { mut files } => {
                files.append(&mut selected);
                WorkflowState::Configure { files }
            }
            WorkflowState::Result { mut files, .. } => {
                files.append(&mut selected);
                WorkflowState::Configure { files }
            }
        };
        self.error = None;
        self.locator.replace(Route::Compress);
        self.sync_route();
    }

    /// Remove the file at `index` while configuring. Removing the last file
    /// falls back to Upload via the route-sync guard.
    pub fn remove_file(&mut self, index: usize) {
        if let WorkflowState::Configure { files } = &mut self.state {
            if index < files.len() {
                files.remove(index);
            }
            if files.is_empty() {
                self.state = WorkflowState::Upload;
            }
        }
        self.sync_route();
    }

    /// Run compression over the first attached file with a snapshot of
    /// `settings`. Success moves to Result; failure stays in Configure and
    /// surfaces one error message alongside the file list.
    pub fn compress<R: PageRasterizer>(
        &mut self,
        rasterizer: &R,
        settings: CompressionSettings,
        progress: &mut dyn FnMut(&str),
        cancel: &CancelToken,
    ) {
        self.error = None;

        let run: Result<CompressionResult, CompressError> = match &self.state {
            WorkflowState::Configure { files } if !files.is_empty() => {
                // Only the first file is compressed; the rest just ride along.
                let first = &files[0];
                pipeline::compress(
                    rasterizer,
                    &first.name,
                    &first.bytes,
                    settings,
                    progress,
                    cancel,
                )
            }
            _ => return,
        };

        match run {
            Ok(outcome) => {
                self.state = match std::mem::replace(&mut self.state, WorkflowState::Upload) {
                    WorkflowState::Configure { files } => WorkflowState::Result { files, outcome },
                    other => other,
                };
            }
            Err(e) => {
                self.error = Some(e.user_message());
            }
        }
        self.sync_route();
    }

    /// Discard the result but keep the files.
    pub fn erase(&mut self) {
        self.state = match std::mem::replace(&mut self.state, WorkflowState::Upload) {
            WorkflowState::Result { files, .. } => WorkflowState::Configure { files },
            other => other,
        };
        self.sync_route();
    }

    /// Discard files and any result unconditionally.
    pub fn restart(&mut self) {
        self.state = WorkflowState::Upload;
        self.error = None;
        self.locator.replace(Route::Home);
        self.sync_route();
    }

    /// Route-sync guard: the compress location with zero files deterministically
    /// redirects home. Re-run after every transition and on external
    /// navigation events.
    pub fn sync_route(&mut self) {
        if self.locator.current() == Route::Compress && self.state.file_count() == 0 {
            self.locator.replace(Route::Home);
        }
    }
}
