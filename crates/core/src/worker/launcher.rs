//! Starting the worker as an independent OS process.

use std::process::{ExitStatus, Stdio};
use std::time::Duration;

#[cfg(unix)]
use nix::errno::Errno;
#[cfg(unix)]
use nix::sys::signal::{killpg, Signal};
#[cfg(unix)]
use nix::unistd::Pid;
use tokio::process::{Child, Command};
use tokio::sync::oneshot;
#[cfg(unix)]
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::types::{LaunchRequest, WorkerError, WorkerExit, WorkerHandle};

/// Something that can start the automation worker.
pub trait WorkerLauncher: Send + Sync {
    /// Returns the name of this launcher implementation.
    fn name(&self) -> &str;

    /// Start the worker without waiting for it. Must be called from within
    /// a tokio runtime.
    fn launch(&self, request: &LaunchRequest) -> Result<WorkerHandle, WorkerError>;
}

/// Grace period between SIGTERM and SIGKILL when stopping the worker
pub const DEFAULT_STOP_GRACE: Duration = Duration::from_secs(5);

/// Spawns the worker as a child process in its own process group.
///
/// A stop request terminates the whole group with SIGTERM, then SIGKILL once
/// the grace period runs out.
#[derive(Debug)]
pub struct ProcessLauncher {
    stop_grace: Duration,
}

impl Default for ProcessLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessLauncher {
    pub fn new() -> Self {
        Self::with_stop_grace(DEFAULT_STOP_GRACE)
    }

    pub fn with_stop_grace(stop_grace: Duration) -> Self {
        Self { stop_grace }
    }
}

impl WorkerLauncher for ProcessLauncher {
    fn name(&self) -> &str {
        "process"
    }

    fn launch(&self, request: &LaunchRequest) -> Result<WorkerHandle, WorkerError> {
        let mut command = Command::new(&request.program);
        command
            .args(request.command_args())
            .current_dir(&request.working_dir)
            .stdin(Stdio::null())
            .kill_on_drop(false);

        // Own process group: terminal signals go to the control plane, which
        // then stops the worker group itself
        #[cfg(unix)]
        command.process_group(0);

        let mut child = command.spawn().map_err(|e| WorkerError::Spawn {
            program: request.program.clone(),
            source: e,
        })?;
        let pid = child.id();
        debug!(?pid, program = %request.program, "worker process spawned");

        let (exit_tx, exit_rx) = oneshot::channel();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let stop_grace = self.stop_grace;

        tokio::spawn(async move {
            let stop_requested = async {
                if stop_rx.await.is_err() {
                    std::future::pending::<()>().await;
                }
            };

            let status = tokio::select! {
                status = child.wait() => status,
                _ = stop_requested => terminate(&mut child, pid, stop_grace).await,
            };

            let exit = match status {
                Ok(status) => WorkerExit {
                    code: status.code(),
                    success: status.success(),
                },
                Err(e) => {
                    warn!(?pid, error = %e, "failed to wait for worker process");
                    WorkerExit {
                        code: None,
                        success: false,
                    }
                }
            };
            let _ = exit_tx.send(exit);
        });

        Ok(WorkerHandle {
            pid,
            exited: exit_rx,
            stop: stop_tx,
        })
    }
}

/// SIGTERM the worker's process group, then SIGKILL after `grace`.
async fn terminate(
    child: &mut Child,
    pid: Option<u32>,
    grace: Duration,
) -> std::io::Result<ExitStatus> {
    info!(?pid, "terminating worker process group");

    #[cfg(unix)]
    if let Some(pid) = pid {
        signal_group(pid, Signal::SIGTERM);
        match timeout(grace, child.wait()).await {
            Ok(status) => return status,
            Err(_) => {
                warn!(pid, grace_ms = grace.as_millis() as u64, "worker ignored SIGTERM, killing");
                signal_group(pid, Signal::SIGKILL);
            }
        }
    }

    #[cfg(not(unix))]
    let _ = (pid, grace);

    if let Err(e) = child.start_kill() {
        debug!(error = %e, "worker already gone");
    }
    child.wait().await
}

#[cfg(unix)]
fn signal_group(pid: u32, signal: Signal) {
    let Ok(raw) = i32::try_from(pid) else {
        return;
    };
    match killpg(Pid::from_raw(raw), signal) {
        Ok(()) => debug!(pid, ?signal, "signal sent to worker group"),
        Err(Errno::ESRCH) => debug!(pid, "worker group already gone"),
        Err(e) => warn!(pid, ?signal, error = %e, "failed to signal worker group"),
    }
}
