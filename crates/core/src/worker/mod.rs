//! Lifecycle of the external automation worker: Stopped, Running, Paused.

mod controller;
mod launcher;
mod types;

pub use controller::WorkerController;
pub use launcher::{ProcessLauncher, WorkerLauncher};
pub use types::{
    LaunchRequest, RunOutcome, WorkerError, WorkerExit, WorkerHandle, WorkerState,
};
