//! Common test utilities for driving the control plane in-process.
//!
//! The fixture builds the real router over a temporary application root,
//! with mock collaborators standing in for the worker process and the OCR
//! command.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use tixctl_core::config::DEFAULT_CONSOLE_URL;
use tixctl_core::testing::{MockCaptchaSolver, MockWorkerLauncher};
use tixctl_core::{
    CaptchaSolver, LaunchRequest, SettingsStore, SignalFiles, WorkerController,
};
use tixctl_server::{create_router, AppState};

/// Test fixture for endpoint tests with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_pause() {
///     let fixture = TestFixture::new();
///     let response = fixture.get("/pause").await;
///     assert_eq!(response.body["pause"], true);
/// }
/// ```
pub struct TestFixture {
    pub router: Router,
    /// Mock launcher - inspect and fail worker launches
    pub launcher: Arc<MockWorkerLauncher>,
    /// Mock solver, present when the fixture was built with one
    pub solver: Option<Arc<MockCaptchaSolver>>,
    /// Application root holding the settings document and markers
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestFixture {
    /// Fixture without a CAPTCHA solver.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Fixture with the given mock solver wired in.
    pub fn with_solver(solver: MockCaptchaSolver) -> Self {
        Self::build(Some(Arc::new(solver)))
    }

    fn build(solver: Option<Arc<MockCaptchaSolver>>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();

        let settings = Arc::new(SettingsStore::new(root));
        let launcher = Arc::new(MockWorkerLauncher::new());
        let request = LaunchRequest {
            program: "tixcraft-worker".to_string(),
            args: vec![],
            settings_path: settings.path().to_path_buf(),
            working_dir: root.to_path_buf(),
        };
        let controller = Arc::new(WorkerController::new(
            SignalFiles::new(root),
            Arc::clone(&launcher) as Arc<dyn tixctl_core::WorkerLauncher>,
            request,
        ));

        let state = Arc::new(AppState::new(
            settings,
            controller,
            solver
                .as_ref()
                .map(|s| Arc::clone(s) as Arc<dyn CaptchaSolver>),
            DEFAULT_CONSOLE_URL.to_string(),
        ));

        Self {
            router: create_router(state),
            launcher,
            solver,
            temp_dir,
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path of a file inside the application root.
    pub fn file(&self, name: &str) -> PathBuf {
        self.root().join(name)
    }

    pub fn signals(&self) -> SignalFiles {
        SignalFiles::new(self.root())
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, Body::empty()).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        let bytes = serde_json::to_vec(&body).unwrap();
        self.request("POST", path, Body::from(bytes)).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        self.request("POST", path, Body::from(body.to_string())).await
    }

    pub async fn options(&self, path: &str) -> TestResponse {
        self.request("OPTIONS", path, Body::empty()).await
    }

    async fn request(&self, method: &str, path: &str, body: Body) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .body(body)
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
