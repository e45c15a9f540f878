//! The set of marker files shared between the control plane and the worker.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::marker::MarkerFile;
use super::SignalError;
use crate::settings::SAVE_TEMP_PREFIX;

/// Present while the worker should stay idle
pub const PAUSE_FILE: &str = "MAXBOT_INT28_IDLE.txt";
/// Most recent URL the worker visited
pub const LAST_URL_FILE: &str = "MAXBOT_LAST_URL.txt";
/// Question the worker needs the operator to answer
pub const QUESTION_FILE: &str = "MAXBOT_QUESTION.txt";
/// Answer handed to the worker for the current CAPTCHA
pub const OCR_ANSWER_FILE: &str = "MAXBOT_ONLINE_ANSWER.txt";
/// Why the last worker launch failed
pub const LAUNCH_ERROR_FILE: &str = "MAXBOT_LAUNCH_ERROR.txt";

/// Result of reading the pending-question record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PendingQuestion {
    pub exists: bool,
    pub text: String,
}

/// Point-in-time view of every status marker
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SignalSnapshot {
    pub paused: bool,
    pub last_url: String,
    pub question: PendingQuestion,
    pub launch_error: Option<String>,
}

/// Typed access to the marker files in the application root.
#[derive(Debug, Clone)]
pub struct SignalFiles {
    root: PathBuf,
    pause: MarkerFile,
    last_url: MarkerFile,
    question: MarkerFile,
    ocr_answer: MarkerFile,
    launch_error: MarkerFile,
}

impl SignalFiles {
    pub fn new(app_root: &Path) -> Self {
        let marker = |name: &str| MarkerFile::new(app_root.join(name));
        Self {
            root: app_root.to_path_buf(),
            pause: marker(PAUSE_FILE),
            last_url: marker(LAST_URL_FILE),
            question: marker(QUESTION_FILE),
            ocr_answer: marker(OCR_ANSWER_FILE),
            launch_error: marker(LAUNCH_ERROR_FILE),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn pause_marker(&self) -> &MarkerFile {
        &self.pause
    }

    pub fn last_url_marker(&self) -> &MarkerFile {
        &self.last_url
    }

    pub fn question_marker(&self) -> &MarkerFile {
        &self.question
    }

    pub fn ocr_answer_marker(&self) -> &MarkerFile {
        &self.ocr_answer
    }

    pub fn is_paused(&self) -> bool {
        self.pause.exists()
    }

    /// Create the pause marker. No-op if already paused.
    pub fn mark_paused(&self) -> Result<(), SignalError> {
        self.pause.touch()
    }

    /// Remove the pause marker. No-op if not paused.
    pub fn clear_paused(&self) -> Result<(), SignalError> {
        self.pause.clear().map(|_| ())
    }

    /// Last URL written by the worker; empty when it has not written one.
    pub fn read_last_url(&self) -> String {
        self.last_url.read().unwrap_or_default()
    }

    /// Existence and content are read separately, so a concurrent write can
    /// briefly show `exists` with empty text.
    pub fn read_pending_question(&self) -> PendingQuestion {
        let text = self.question.read().unwrap_or_default();
        PendingQuestion {
            exists: self.question.exists(),
            text,
        }
    }

    /// Record a failed worker launch, timestamped.
    pub fn record_launch_failure(&self, message: &str) -> Result<(), SignalError> {
        self.launch_error
            .write(&format!("{} {}", Utc::now().to_rfc3339(), message))
    }

    pub fn clear_launch_failure(&self) -> Result<(), SignalError> {
        self.launch_error.clear().map(|_| ())
    }

    pub fn read_launch_failure(&self) -> Option<String> {
        self.launch_error.read().filter(|s| !s.is_empty())
    }

    pub fn snapshot(&self) -> SignalSnapshot {
        SignalSnapshot {
            paused: self.is_paused(),
            last_url: self.read_last_url(),
            question: self.read_pending_question(),
            launch_error: self.read_launch_failure(),
        }
    }

    /// Delete files that only make sense within one run: the OCR answer and
    /// temp files left behind by an interrupted settings save. Only called
    /// at startup. Returns the number of files removed.
    pub fn clean_transient_files(&self) -> usize {
        let mut removed = 0;

        match self.ocr_answer.clear() {
            Ok(true) => removed += 1,
            Ok(false) => {}
            Err(e) => warn!(error = %e, "failed to remove OCR answer file"),
        }

        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(root = %self.root.display(), error = %e, "cannot scan app root for temp files");
                return removed;
            }
        };
        for entry in entries.flatten() {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if !(name.starts_with(SAVE_TEMP_PREFIX) && name.ends_with(".tmp")) {
                continue;
            }
            match fs::remove_file(entry.path()) {
                Ok(()) => {
                    debug!(file = %name, "removed stale temp file");
                    removed += 1;
                }
                Err(e) => warn!(file = %name, error = %e, "failed to remove stale temp file"),
            }
        }

        if removed > 0 {
            info!(removed, "cleaned transient files");
        }
        removed
    }
}
