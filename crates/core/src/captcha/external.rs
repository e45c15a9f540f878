//! OCR through an external command: image bytes on stdin, answer on stdout.
//!
//! Each invocation is bounded by a timeout; the child is killed when it
//! runs over.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};
use tracing::warn;

use super::{CaptchaError, CaptchaSolver};

pub const DEFAULT_OCR_TIMEOUT: Duration = Duration::from_secs(10);

pub struct ExternalOcrSolver {
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
}

impl ExternalOcrSolver {
    pub fn new(program: PathBuf, args: Vec<String>) -> Self {
        Self {
            program,
            args,
            timeout: DEFAULT_OCR_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn spawn_error(&self, source: std::io::Error) -> CaptchaError {
        CaptchaError::Spawn {
            command: self.program.display().to_string(),
            source,
        }
    }
}

#[async_trait]
impl CaptchaSolver for ExternalOcrSolver {
    async fn solve(&self, image: &[u8]) -> Result<String, CaptchaError> {
        if image.is_empty() {
            return Err(CaptchaError::EmptyImage);
        }

        // Dropping the child on timeout kills it
        let child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let output = match tokio::time::timeout(self.timeout, feed_and_collect(child, image)).await
        {
            Ok(result) => result.map_err(|e| self.spawn_error(e))?,
            Err(_) => {
                let timeout_ms = self.timeout.as_millis() as u64;
                warn!(
                    program = %self.program.display(),
                    timeout_ms,
                    "OCR command timed out, killed"
                );
                return Err(CaptchaError::Timeout { timeout_ms });
            }
        };

        if !output.status.success() {
            return Err(CaptchaError::CommandFailed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn name(&self) -> &str {
        "external"
    }
}

async fn feed_and_collect(mut child: Child, image: &[u8]) -> std::io::Result<Output> {
    if let Some(mut stdin) = child.stdin.take() {
        // A command that exits without reading is judged by its exit status
        match stdin.write_all(image).await {
            Err(e) if e.kind() != std::io::ErrorKind::BrokenPipe => return Err(e),
            _ => {}
        }
    }
    child.wait_with_output().await
}
