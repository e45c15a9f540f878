use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Process-level configuration for the control plane.
///
/// This is distinct from the operator-facing settings document: it decides
/// where the shared directory lives and how the worker is launched, and is
/// never edited through the HTTP surface.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ControlConfig {
    /// Directory holding the settings document and every marker file
    #[serde(default = "default_app_root")]
    pub app_root: PathBuf,
    /// Address the HTTP server binds to. The port comes from the settings document.
    #[serde(default = "default_host")]
    pub host: IpAddr,
    /// Hosted control console; injected into `/load` responses
    #[serde(default = "default_remote_url")]
    pub remote_url: String,
    /// Open the console in a browser once the server is listening
    #[serde(default)]
    pub open_console: bool,
    #[serde(default)]
    pub worker: WorkerConfig,
    #[serde(default)]
    pub captcha: CaptchaConfig,
    #[serde(default)]
    pub supervisor: SupervisorConfig,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            app_root: default_app_root(),
            host: default_host(),
            remote_url: default_remote_url(),
            open_console: false,
            worker: WorkerConfig::default(),
            captcha: CaptchaConfig::default(),
            supervisor: SupervisorConfig::default(),
        }
    }
}

fn default_app_root() -> PathBuf {
    PathBuf::from(".")
}

/// Hosted console the operator uses to drive this control plane
pub const DEFAULT_CONSOLE_URL: &str = "https://concet-tix.vercel.app/";

fn default_remote_url() -> String {
    DEFAULT_CONSOLE_URL.to_string()
}

fn default_host() -> IpAddr {
    IpAddr::V4(std::net::Ipv4Addr::LOCALHOST)
}

/// How the automation worker process is started
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkerConfig {
    #[serde(default = "default_worker_program")]
    pub program: String,
    /// Extra arguments placed before `--input <settings path>`
    #[serde(default)]
    pub args: Vec<String>,
    /// Time a stopping worker gets between SIGTERM and SIGKILL (milliseconds)
    #[serde(default = "default_stop_grace")]
    pub stop_grace_ms: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            program: default_worker_program(),
            args: Vec::new(),
            stop_grace_ms: default_stop_grace(),
        }
    }
}

fn default_worker_program() -> String {
    "tixcraft-worker".to_string()
}

fn default_stop_grace() -> u64 {
    5000
}

/// External OCR command backing the CAPTCHA capability.
/// Leaving `command` unset disables the capability.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CaptchaConfig {
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
    /// Upper bound on one OCR invocation (milliseconds)
    #[serde(default = "default_captcha_timeout")]
    pub timeout_ms: u64,
}

impl Default for CaptchaConfig {
    fn default() -> Self {
        Self {
            command: None,
            args: Vec::new(),
            timeout_ms: default_captcha_timeout(),
        }
    }
}

fn default_captcha_timeout() -> u64 {
    10_000
}

/// Timing of the supervisor loops
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SupervisorConfig {
    /// How often the main loop checks for a shutdown request (milliseconds)
    #[serde(default = "default_shutdown_poll")]
    pub shutdown_poll_ms: u64,
    /// How often the housekeeping task inspects the marker files (milliseconds)
    #[serde(default = "default_housekeeping_interval")]
    pub housekeeping_interval_ms: u64,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            shutdown_poll_ms: default_shutdown_poll(),
            housekeeping_interval_ms: default_housekeeping_interval(),
        }
    }
}

fn default_shutdown_poll() -> u64 {
    400
}

fn default_housekeeping_interval() -> u64 {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ControlConfig::default();
        assert_eq!(config.app_root, PathBuf::from("."));
        assert_eq!(config.host.to_string(), "127.0.0.1");
        assert_eq!(config.remote_url, "https://concet-tix.vercel.app/");
        assert!(!config.open_console);
        assert_eq!(config.worker.program, "tixcraft-worker");
        assert_eq!(config.worker.stop_grace_ms, 5000);
        assert!(config.captcha.command.is_none());
        assert_eq!(config.captcha.timeout_ms, 10_000);
        assert_eq!(config.supervisor.shutdown_poll_ms, 400);
        assert_eq!(config.supervisor.housekeeping_interval_ms, 1000);
    }

    #[test]
    fn test_deserialize_empty_uses_defaults() {
        let config: ControlConfig = toml::from_str("").unwrap();
        assert_eq!(config.worker.program, "tixcraft-worker");
        assert!(config.worker.args.is_empty());
    }

    #[test]
    fn test_deserialize_full() {
        let toml = r#"
app_root = "/srv/bot"
host = "0.0.0.0"
remote_url = "https://console.example/"
open_console = true

[worker]
program = "python3"
args = ["nodriver_tixcraft.py"]
stop_grace_ms = 1500

[captcha]
command = "ocr-cli"
args = ["--beta"]
timeout_ms = 3000

[supervisor]
shutdown_poll_ms = 100
housekeeping_interval_ms = 250
"#;
        let config: ControlConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.app_root, PathBuf::from("/srv/bot"));
        assert_eq!(config.host.to_string(), "0.0.0.0");
        assert_eq!(config.remote_url, "https://console.example/");
        assert!(config.open_console);
        assert_eq!(config.worker.stop_grace_ms, 1500);
        assert_eq!(config.worker.program, "python3");
        assert_eq!(config.worker.args, vec!["nodriver_tixcraft.py"]);
        assert_eq!(config.captcha.command.as_deref(), Some("ocr-cli"));
        assert_eq!(config.captcha.timeout_ms, 3000);
        assert_eq!(config.supervisor.shutdown_poll_ms, 100);
        assert_eq!(config.supervisor.housekeeping_interval_ms, 250);
    }
}
