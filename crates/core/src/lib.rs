pub mod captcha;
pub mod config;
pub mod settings;
pub mod signal;
pub mod testing;
pub mod worker;

pub use captcha::{create_solver, CaptchaError, CaptchaSolver, ExternalOcrSolver};
pub use config::{
    load_config, load_config_from_str, validate_config, CaptchaConfig, ConfigError,
    ControlConfig, SupervisorConfig, WorkerConfig,
};
pub use settings::{SettingsError, SettingsStore};
pub use signal::{PendingQuestion, SignalError, SignalFiles, SignalSnapshot};
pub use worker::{
    LaunchRequest, ProcessLauncher, RunOutcome, WorkerController, WorkerError, WorkerLauncher,
    WorkerState,
};
