use super::{types::ControlConfig, ConfigError};

/// Validate control configuration
/// Currently validates:
/// - Supervisor intervals are not 0
/// - Worker program is set
/// - OCR timeout is not 0
pub fn validate_config(config: &ControlConfig) -> Result<(), ConfigError> {
    if config.supervisor.shutdown_poll_ms == 0 {
        return Err(ConfigError::ValidationError(
            "supervisor.shutdown_poll_ms cannot be 0".to_string(),
        ));
    }

    if config.supervisor.housekeeping_interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "supervisor.housekeeping_interval_ms cannot be 0".to_string(),
        ));
    }

    if config.worker.program.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "worker.program cannot be empty".to_string(),
        ));
    }

    if config.captcha.timeout_ms == 0 {
        return Err(ConfigError::ValidationError(
            "captcha.timeout_ms cannot be 0".to_string(),
        ));
    }

    Ok(())
}
