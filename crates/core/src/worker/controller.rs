//! Worker lifecycle controller.
//!
//! Run launches the worker in the background and returns immediately.
//! Pause and resume only touch the pause marker; the worker notices on its
//! own polling cadence and nothing is interrupted forcibly. Only `stop`,
//! used at shutdown, terminates a running worker.

use std::sync::{Arc, Mutex};

use tokio::sync::{oneshot, watch};
use tracing::{info, warn};

use super::launcher::WorkerLauncher;
use super::types::{LaunchRequest, RunOutcome, WorkerState};
use crate::signal::{SignalError, SignalFiles};

pub struct WorkerController {
    signals: SignalFiles,
    launcher: Arc<dyn WorkerLauncher>,
    request: LaunchRequest,
    running: Arc<watch::Sender<bool>>,
    stop: Mutex<Option<oneshot::Sender<()>>>,
}

impl WorkerController {
    pub fn new(
        signals: SignalFiles,
        launcher: Arc<dyn WorkerLauncher>,
        request: LaunchRequest,
    ) -> Self {
        let (running, _) = watch::channel(false);
        Self {
            signals,
            launcher,
            request,
            running: Arc::new(running),
            stop: Mutex::new(None),
        }
    }

    pub fn signals(&self) -> &SignalFiles {
        &self.signals
    }

    pub fn launch_request(&self) -> &LaunchRequest {
        &self.request
    }

    /// Current lifecycle state. A launched worker counts as paused while the
    /// pause marker exists.
    pub fn state(&self) -> WorkerState {
        if !*self.running.borrow() {
            WorkerState::Stopped
        } else if self.signals.is_paused() {
            WorkerState::Paused
        } else {
            WorkerState::Running
        }
    }

    /// Start the worker (fire-and-forget).
    ///
    /// A launch failure is logged and written to the launch-error marker but
    /// is not returned as an error; callers report success either way.
    pub fn run(&self) -> RunOutcome {
        let claimed = self.running.send_if_modified(|running| {
            if *running {
                false
            } else {
                *running = true;
                true
            }
        });
        if !claimed {
            warn!("Worker already running, ignoring run request");
            return RunOutcome::AlreadyRunning;
        }

        match self.launcher.launch(&self.request) {
            Ok(handle) => {
                let pid = handle.pid;
                info!(?pid, launcher = self.launcher.name(), "Worker launched");
                if let Err(e) = self.signals.clear_launch_failure() {
                    warn!(error = %e, "failed to clear launch-error marker");
                }
                *lock(&self.stop) = Some(handle.stop);

                let running = Arc::clone(&self.running);
                let exited = handle.exited;
                tokio::spawn(async move {
                    match exited.await {
                        Ok(exit) if exit.success => info!(?pid, "Worker exited"),
                        Ok(exit) => warn!(?pid, code = ?exit.code, "Worker exited with failure"),
                        Err(_) => warn!(?pid, "Worker exit status unavailable"),
                    }
                    running.send_replace(false);
                });

                RunOutcome::Launched { pid }
            }
            Err(e) => {
                self.running.send_replace(false);
                let reason = e.to_string();
                warn!(error = %reason, "Worker launch failed");
                if let Err(marker_err) = self.signals.record_launch_failure(&reason) {
                    warn!(error = %marker_err, "failed to write launch-error marker");
                }
                RunOutcome::Failed { reason }
            }
        }
    }

    /// Ask the worker to idle by creating the pause marker.
    pub fn pause(&self) -> Result<(), SignalError> {
        self.signals.mark_paused()?;
        info!("Pause marker set");
        Ok(())
    }

    /// Let the worker continue by removing the pause marker.
    pub fn resume(&self) -> Result<(), SignalError> {
        self.signals.clear_paused()?;
        info!("Pause marker cleared");
        Ok(())
    }

    /// Terminate a running worker and wait until its exit is observed.
    /// No-op when nothing is running.
    pub async fn stop(&self) {
        let Some(stop) = lock(&self.stop).take() else {
            return;
        };
        let mut running = self.running.subscribe();
        if !*running.borrow() {
            return;
        }

        info!("Stopping worker");
        if stop.send(()).is_err() {
            warn!("Worker launcher no longer accepts stop requests");
            return;
        }
        let _ = running.wait_for(|running| !*running).await;
        info!("Worker stopped");
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockWorkerLauncher;
    use crate::worker::WorkerExit;
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::TempDir;

    fn controller(temp: &TempDir, launcher: Arc<MockWorkerLauncher>) -> WorkerController {
        let request = LaunchRequest {
            program: "worker".to_string(),
            args: vec![],
            settings_path: temp.path().join("settings.json"),
            working_dir: PathBuf::from(temp.path()),
        };
        WorkerController::new(SignalFiles::new(temp.path()), launcher, request)
    }

    async fn wait_for_state(controller: &WorkerController, expected: WorkerState) {
        for _ in 0..50 {
            if controller.state() == expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("state never became {:?}", expected);
    }

    #[tokio::test]
    async fn test_stopped_running_paused_cycle() {
        let temp = TempDir::new().unwrap();
        let launcher = Arc::new(MockWorkerLauncher::new());
        let controller = controller(&temp, Arc::clone(&launcher));

        assert_eq!(controller.state(), WorkerState::Stopped);

        let outcome = controller.run();
        assert!(matches!(outcome, RunOutcome::Launched { .. }));
        assert_eq!(controller.state(), WorkerState::Running);

        controller.pause().unwrap();
        assert_eq!(controller.state(), WorkerState::Paused);

        controller.resume().unwrap();
        assert_eq!(controller.state(), WorkerState::Running);

        launcher.finish_all(WorkerExit {
            code: Some(0),
            success: true,
        });
        wait_for_state(&controller, WorkerState::Stopped).await;
    }

    #[tokio::test]
    async fn test_second_run_while_running_is_ignored() {
        let temp = TempDir::new().unwrap();
        let launcher = Arc::new(MockWorkerLauncher::new());
        let controller = controller(&temp, Arc::clone(&launcher));

        controller.run();
        assert_eq!(controller.run(), RunOutcome::AlreadyRunning);
        assert_eq!(launcher.launch_count(), 1);
    }

    #[tokio::test]
    async fn test_launch_failure_is_recorded_not_raised() {
        let temp = TempDir::new().unwrap();
        let launcher = Arc::new(MockWorkerLauncher::new());
        launcher.fail_next("spawn refused");
        let controller = controller(&temp, Arc::clone(&launcher));

        let outcome = controller.run();
        assert!(matches!(outcome, RunOutcome::Failed { .. }));
        assert_eq!(controller.state(), WorkerState::Stopped);
        let recorded = controller.signals().read_launch_failure().unwrap();
        assert!(recorded.contains("spawn refused"));

        // A later successful launch clears the marker
        assert!(matches!(controller.run(), RunOutcome::Launched { .. }));
        assert!(controller.signals().read_launch_failure().is_none());
    }

    #[tokio::test]
    async fn test_pause_and_resume_are_idempotent() {
        let temp = TempDir::new().unwrap();
        let controller = controller(&temp, Arc::new(MockWorkerLauncher::new()));

        controller.pause().unwrap();
        controller.pause().unwrap();
        assert!(controller.signals().is_paused());

        controller.resume().unwrap();
        controller.resume().unwrap();
        assert!(!controller.signals().is_paused());
    }

    #[tokio::test]
    async fn test_stop_terminates_running_worker() {
        let temp = TempDir::new().unwrap();
        let launcher = Arc::new(MockWorkerLauncher::new());
        let controller = controller(&temp, Arc::clone(&launcher));

        controller.run();
        assert_eq!(controller.state(), WorkerState::Running);

        tokio::time::timeout(Duration::from_secs(1), controller.stop())
            .await
            .expect("stop did not complete");
        assert_eq!(controller.state(), WorkerState::Stopped);
        assert_eq!(launcher.stop_count(), 1);

        // Nothing left to stop
        controller.stop().await;
        assert_eq!(launcher.stop_count(), 1);
    }

    #[tokio::test]
    async fn test_stop_without_worker_is_noop() {
        let temp = TempDir::new().unwrap();
        let launcher = Arc::new(MockWorkerLauncher::new());
        let controller = controller(&temp, Arc::clone(&launcher));

        controller.stop().await;
        assert_eq!(launcher.stop_count(), 0);
    }
}
