//! Mock worker launcher for testing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;

use crate::worker::{LaunchRequest, WorkerError, WorkerExit, WorkerHandle, WorkerLauncher};

/// Mock implementation of the WorkerLauncher trait.
///
/// - Records every launch request
/// - Can be told to fail the next launch
/// - Keeps launched "workers" alive until `finish_all` is called or the
///   worker is stopped through its handle
#[derive(Debug, Default)]
pub struct MockWorkerLauncher {
    launches: Mutex<Vec<LaunchRequest>>,
    running: Arc<Mutex<Vec<oneshot::Sender<WorkerExit>>>>,
    next_error: Mutex<Option<String>>,
    next_pid: Mutex<u32>,
    stops: Arc<AtomicUsize>,
}

impl MockWorkerLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next launch fail with the given reason.
    pub fn fail_next(&self, reason: &str) {
        *lock(&self.next_error) = Some(reason.to_string());
    }

    /// Number of successful launches.
    pub fn launch_count(&self) -> usize {
        lock(&self.launches).len()
    }

    pub fn recorded_launches(&self) -> Vec<LaunchRequest> {
        lock(&self.launches).clone()
    }

    /// Number of stop requests received.
    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    /// Simulate every launched worker exiting.
    pub fn finish_all(&self, exit: WorkerExit) {
        for tx in lock(&self.running).drain(..) {
            let _ = tx.send(exit.clone());
        }
    }
}

impl WorkerLauncher for MockWorkerLauncher {
    fn name(&self) -> &str {
        "mock"
    }

    fn launch(&self, request: &LaunchRequest) -> Result<WorkerHandle, WorkerError> {
        if let Some(reason) = lock(&self.next_error).take() {
            return Err(WorkerError::Rejected(reason));
        }

        lock(&self.launches).push(request.clone());

        let (tx, rx) = oneshot::channel();
        lock(&self.running).push(tx);

        // A stop request ends every mock worker, as if killed by a signal
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let running = Arc::clone(&self.running);
        let stops = Arc::clone(&self.stops);
        tokio::spawn(async move {
            if stop_rx.await.is_ok() {
                stops.fetch_add(1, Ordering::SeqCst);
                for tx in lock(&running).drain(..) {
                    let _ = tx.send(WorkerExit {
                        code: None,
                        success: false,
                    });
                }
            }
        });

        let mut next_pid = lock(&self.next_pid);
        *next_pid += 1;

        Ok(WorkerHandle {
            pid: Some(10_000 + *next_pid),
            exited: rx,
            stop: stop_tx,
        })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn request() -> LaunchRequest {
        LaunchRequest {
            program: "worker".to_string(),
            args: vec![],
            settings_path: PathBuf::from("settings.json"),
            working_dir: PathBuf::from("."),
        }
    }

    #[tokio::test]
    async fn test_records_and_finishes() {
        let launcher = MockWorkerLauncher::new();
        let handle = launcher.launch(&request()).unwrap();
        assert_eq!(launcher.launch_count(), 1);
        assert_eq!(launcher.recorded_launches()[0].program, "worker");

        launcher.finish_all(WorkerExit {
            code: Some(3),
            success: false,
        });
        let exit = handle.exited.await.unwrap();
        assert_eq!(exit.code, Some(3));
    }

    #[tokio::test]
    async fn test_stop_ends_worker() {
        let launcher = MockWorkerLauncher::new();
        let handle = launcher.launch(&request()).unwrap();

        handle.stop.send(()).unwrap();
        let exit = handle.exited.await.unwrap();
        assert!(!exit.success);
        assert_eq!(launcher.stop_count(), 1);
    }

    #[tokio::test]
    async fn test_fail_next_only_fails_once() {
        let launcher = MockWorkerLauncher::new();
        launcher.fail_next("nope");
        assert!(matches!(launcher.launch(&request()), Err(WorkerError::Rejected(_))));
        tokio_test::assert_ok!(launcher.launch(&request()));
        assert_eq!(launcher.launch_count(), 1);
    }
}
