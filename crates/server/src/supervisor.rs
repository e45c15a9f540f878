//! Process supervisor.
//!
//! Owns startup order and shutdown: the HTTP server and the housekeeping
//! task run as independent tokio tasks, and the main loop polls a
//! cancellation token until some component requests shutdown.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use tixctl_core::settings::server_port;
use tixctl_core::{
    create_solver, ControlConfig, LaunchRequest, ProcessLauncher, SettingsStore, SignalFiles,
    WorkerController, WorkerLauncher,
};

use crate::api::create_router;
use crate::housekeeping::Housekeeper;
use crate::state::AppState;

pub struct Supervisor {
    config: ControlConfig,
    shutdown: CancellationToken,
    launcher: Arc<dyn WorkerLauncher>,
}

impl Supervisor {
    pub fn new(config: ControlConfig) -> Self {
        let stop_grace = Duration::from_millis(config.worker.stop_grace_ms);
        Self::with_launcher(config, Arc::new(ProcessLauncher::with_stop_grace(stop_grace)))
    }

    /// Supervisor with a custom worker launcher (used by tests).
    pub fn with_launcher(config: ControlConfig, launcher: Arc<dyn WorkerLauncher>) -> Self {
        Self {
            config,
            shutdown: CancellationToken::new(),
            launcher,
        }
    }

    /// Token that stops the whole process tree when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub async fn run(self) -> Result<()> {
        let app_root = &self.config.app_root;
        std::fs::create_dir_all(app_root)
            .with_context(|| format!("Failed to create app root {:?}", app_root))?;

        let settings = Arc::new(SettingsStore::new(app_root));
        let store = Arc::clone(&settings);
        let (settings_path, document) = tokio::task::spawn_blocking(move || store.load())
            .await
            .context("Settings load task failed")?
            .context("Failed to load settings document")?;
        info!("Settings document at {:?}", settings_path);

        let port = server_port(&document);
        let signals = SignalFiles::new(app_root);

        let request = LaunchRequest {
            program: self.config.worker.program.clone(),
            args: self.config.worker.args.clone(),
            settings_path: settings_path.clone(),
            working_dir: app_root.clone(),
        };
        let controller = Arc::new(WorkerController::new(
            signals.clone(),
            Arc::clone(&self.launcher),
            request,
        ));
        info!("Using worker launcher: {}", self.launcher.name());

        let solver = create_solver(&self.config.captcha);

        let state = Arc::new(AppState::new(
            settings,
            Arc::clone(&controller),
            solver,
            self.config.remote_url.clone(),
        ));
        let app = create_router(state);

        let addr = SocketAddr::new(self.config.host, port);
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind to {}", addr))?;
        info!("Control panel listening on http://{}", addr);

        if self.config.open_console {
            open_console(&self.config.remote_url);
        }

        let housekeeper = Housekeeper::new(
            signals.clone(),
            settings_path,
            Duration::from_millis(self.config.supervisor.housekeeping_interval_ms),
        );
        let housekeeping = tokio::spawn(housekeeper.run(self.shutdown.clone()));

        let server_token = self.shutdown.clone();
        let server: JoinHandle<std::io::Result<()>> = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move { server_token.cancelled().await })
                .await
        });

        let removed = signals.clean_transient_files();
        if removed > 0 {
            info!("Removed {} transient files", removed);
        }

        self.wait_for_shutdown(&server).await;
        self.shutdown.cancel();
        controller.stop().await;

        let server_result = server.await;
        if let Err(e) = housekeeping.await {
            warn!("Housekeeping task failed: {}", e);
        }

        match server_result {
            Ok(Ok(())) => {
                info!("Control panel stopped");
                Ok(())
            }
            Ok(Err(e)) => Err(e).context("HTTP server error"),
            Err(e) => Err(e).context("HTTP server task failed"),
        }
    }

    async fn wait_for_shutdown(&self, server: &JoinHandle<std::io::Result<()>>) {
        let mut poll = tokio::time::interval(Duration::from_millis(
            self.config.supervisor.shutdown_poll_ms,
        ));

        loop {
            poll.tick().await;
            if self.shutdown.is_cancelled() {
                info!("Shutdown requested");
                break;
            }
            if server.is_finished() {
                error!("HTTP server exited unexpectedly");
                break;
            }
        }
    }
}

/// Platform command that opens a URL in the default browser
fn opener_command(url: &str) -> (&'static str, Vec<String>) {
    if cfg!(target_os = "macos") {
        ("open", vec![url.to_string()])
    } else if cfg!(windows) {
        (
            "cmd",
            vec!["/C".to_string(), "start".to_string(), String::new(), url.to_string()],
        )
    } else {
        ("xdg-open", vec![url.to_string()])
    }
}

fn open_console(url: &str) {
    let (program, args) = opener_command(url);
    match tokio::process::Command::new(program)
        .args(&args)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
    {
        Ok(_) => info!("Opening control console at {}", url),
        Err(e) => warn!("Could not open control console at {}: {}", url, e),
    }
}
