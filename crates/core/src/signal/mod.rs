//! Filesystem signalling between the control plane and the worker.
//!
//! Every piece of shared state is its own small file so a crash while
//! writing one never corrupts another. Readers treat a missing file as the
//! default state.

mod files;
mod marker;

pub use files::{
    PendingQuestion, SignalFiles, SignalSnapshot, LAST_URL_FILE, LAUNCH_ERROR_FILE,
    OCR_ANSWER_FILE, PAUSE_FILE, QUESTION_FILE,
};
pub use marker::MarkerFile;

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignalError {
    #[error("Failed to write marker {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove marker {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SignalError {
    pub(crate) fn write(path: &Path, source: std::io::Error) -> Self {
        Self::Write {
            path: path.to_path_buf(),
            source,
        }
    }
}
