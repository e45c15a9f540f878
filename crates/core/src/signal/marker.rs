//! Single-purpose sentinel file.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::SignalError;

/// One marker file. Missing files are a normal state: `read` returns `None`
/// and `clear` succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerFile {
    path: PathBuf,
}

impl MarkerFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Trimmed content, or `None` when the file is missing or unreadable.
    pub fn read(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Some(content.trim().to_string()),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to read marker file");
                None
            }
        }
    }

    /// Overwrite the marker with `content`.
    pub fn write(&self, content: &str) -> Result<(), SignalError> {
        fs::write(&self.path, content).map_err(|e| SignalError::write(&self.path, e))
    }

    /// Create the marker if it does not exist. Existing content is left alone.
    pub fn touch(&self) -> Result<(), SignalError> {
        if self.exists() {
            return Ok(());
        }
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map(|_| ())
            .map_err(|e| SignalError::write(&self.path, e))
    }

    /// Remove the marker. Returns whether a file was actually removed.
    pub fn clear(&self) -> Result<bool, SignalError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(SignalError::Remove {
                path: self.path.clone(),
                source: e,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_marker_reads_as_absent() {
        let temp = TempDir::new().unwrap();
        let marker = MarkerFile::new(temp.path().join("missing.txt"));
        assert!(!marker.exists());
        assert_eq!(marker.read(), None);
    }

    #[test]
    fn test_write_then_read_trims() {
        let temp = TempDir::new().unwrap();
        let marker = MarkerFile::new(temp.path().join("m.txt"));
        marker.write("  https://tixcraft.com/ticket/area\n").unwrap();
        assert_eq!(marker.read().as_deref(), Some("https://tixcraft.com/ticket/area"));
    }

    #[test]
    fn test_touch_is_idempotent_and_keeps_content() {
        let temp = TempDir::new().unwrap();
        let marker = MarkerFile::new(temp.path().join("m.txt"));
        marker.touch().unwrap();
        assert!(marker.exists());
        marker.write("kept").unwrap();
        marker.touch().unwrap();
        assert_eq!(marker.read().as_deref(), Some("kept"));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let marker = MarkerFile::new(temp.path().join("m.txt"));
        marker.touch().unwrap();
        assert!(marker.clear().unwrap());
        assert!(!marker.clear().unwrap());
        assert!(!marker.exists());
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let temp = TempDir::new().unwrap();
        let marker = MarkerFile::new(temp.path().join("nope").join("m.txt"));
        assert!(matches!(marker.write("x"), Err(SignalError::Write { .. })));
    }
}
