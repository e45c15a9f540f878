//! Testing utilities and mock implementations.
//!
//! Mocks for the two external collaborators of the control plane, so the
//! HTTP surface can be exercised without a real worker or OCR engine.
//!
//! # Example
//!
//! ```rust,ignore
//! use tixctl_core::testing::{MockCaptchaSolver, MockWorkerLauncher};
//!
//! let launcher = MockWorkerLauncher::new();
//! launcher.fail_next("no such program");
//!
//! let solver = MockCaptchaSolver::answering("x7k2");
//! ```

mod mock_launcher;
mod mock_solver;

pub use mock_launcher::MockWorkerLauncher;
pub use mock_solver::MockCaptchaSolver;
