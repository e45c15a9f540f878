//! Types for the worker lifecycle.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::oneshot;

/// Errors that can occur while starting the worker.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// The worker process could not be spawned.
    #[error("failed to spawn worker '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The launcher refused the request.
    #[error("worker launch rejected: {0}")]
    Rejected(String),
}

/// Lifecycle state as seen by the control plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    Stopped,
    Running,
    Paused,
}

impl WorkerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Running => "running",
            Self::Paused => "paused",
        }
    }
}

/// Everything needed to start one worker run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    pub program: String,
    /// Arguments placed before `--input <settings_path>`
    pub args: Vec<String>,
    pub settings_path: PathBuf,
    pub working_dir: PathBuf,
}

impl LaunchRequest {
    /// Full argument list passed to the worker program.
    pub fn command_args(&self) -> Vec<String> {
        let mut args = self.args.clone();
        args.push("--input".to_string());
        args.push(self.settings_path.display().to_string());
        args
    }
}

/// How a worker run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerExit {
    /// Exit code, if the process exited normally.
    pub code: Option<i32>,
    pub success: bool,
}

/// A started worker. The exit notification is optional to observe.
#[derive(Debug)]
pub struct WorkerHandle {
    pub pid: Option<u32>,
    pub exited: oneshot::Receiver<WorkerExit>,
    /// Sending on this asks the launcher to terminate the worker. Dropping
    /// it leaves the worker running.
    pub stop: oneshot::Sender<()>,
}

/// What a run command did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Launched { pid: Option<u32> },
    AlreadyRunning,
    Failed { reason: String },
}
