//! Optional CAPTCHA solving capability.
//!
//! The control plane only needs `solve(image) -> text`. When no solver is
//! available the capability is reported as disabled instead of failing.

mod external;

pub use external::ExternalOcrSolver;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::CaptchaConfig;

#[derive(Debug, Error)]
pub enum CaptchaError {
    #[error("Image is empty")]
    EmptyImage,

    #[error("Failed to run OCR command '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("OCR command exited with {code:?}: {stderr}")]
    CommandFailed { code: Option<i32>, stderr: String },

    #[error("OCR command did not finish within {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

#[async_trait]
pub trait CaptchaSolver: Send + Sync {
    /// Turn a CAPTCHA image into its text.
    async fn solve(&self, image: &[u8]) -> Result<String, CaptchaError>;

    /// Name of this solver implementation
    fn name(&self) -> &str;
}

/// Build the configured solver, or `None` (with a warning) when the
/// capability is unavailable.
pub fn create_solver(config: &CaptchaConfig) -> Option<Arc<dyn CaptchaSolver>> {
    let Some(command) = config.command.as_deref().filter(|c| !c.trim().is_empty()) else {
        warn!("No OCR command configured, CAPTCHA auto-solve disabled");
        return None;
    };

    match resolve_program(command) {
        Some(program) => {
            info!(program = %program.display(), "OCR CAPTCHA solver enabled");
            let timeout = Duration::from_millis(config.timeout_ms);
            Some(Arc::new(
                ExternalOcrSolver::new(program, config.args.clone()).with_timeout(timeout),
            ))
        }
        None => {
            warn!(command, "OCR command not found, CAPTCHA auto-solve disabled");
            None
        }
    }
}

/// Locate an executable either by explicit path or on `PATH`.
fn resolve_program(command: &str) -> Option<PathBuf> {
    let candidate = Path::new(command);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }

    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(command))
        .find(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_command_disables_capability() {
        assert!(create_solver(&CaptchaConfig::default()).is_none());
    }

    #[test]
    fn test_blank_command_disables_capability() {
        let config = CaptchaConfig {
            command: Some("   ".to_string()),
            args: vec![],
            ..Default::default()
        };
        assert!(create_solver(&config).is_none());
    }

    #[test]
    fn test_missing_command_disables_capability() {
        let config = CaptchaConfig {
            command: Some("/no/such/ocr-binary".to_string()),
            args: vec![],
            ..Default::default()
        };
        assert!(create_solver(&config).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_command_found_on_path() {
        let config = CaptchaConfig {
            command: Some("cat".to_string()),
            args: vec![],
            ..Default::default()
        };
        let solver = create_solver(&config).unwrap();
        assert_eq!(solver.name(), "external");
    }
}
