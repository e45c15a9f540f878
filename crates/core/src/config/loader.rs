use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

use super::{types::ControlConfig, ConfigError};

/// Environment variable naming the control configuration file
pub const CONFIG_ENV_VAR: &str = "TIXCTL_CONFIG";

/// Control configuration file used when `TIXCTL_CONFIG` is not set
pub const DEFAULT_CONFIG_FILE: &str = "tixctl.toml";

/// Load control configuration: compiled defaults, then the TOML file (if it
/// exists), then `TIXCTL_` environment variables. Nested keys use `__`,
/// e.g. `TIXCTL_WORKER__PROGRAM`.
pub fn load_config(path: &Path) -> Result<ControlConfig, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(ControlConfig::default()));

    if path.exists() {
        figment = figment.merge(Toml::file(path));
    } else {
        tracing::debug!(path = %path.display(), "control config file not found, using defaults");
    }

    figment
        .merge(Env::prefixed("TIXCTL_").ignore(&["config", "log_format"]).split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<ControlConfig, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[worker]
program = "worker-bin"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.worker.program, "worker-bin");
    }

    #[test]
    fn test_load_config_from_str_invalid_host() {
        let result = load_config_from_str(r#"host = "not-an-ip""#);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_config_missing_file_uses_defaults() {
        let config = load_config(Path::new("/nonexistent/tixctl.toml")).unwrap();
        assert_eq!(config.supervisor.shutdown_poll_ms, 400);
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
app_root = "/tmp/bot"

[supervisor]
shutdown_poll_ms = 50
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.app_root.to_str().unwrap(), "/tmp/bot");
        assert_eq!(config.supervisor.shutdown_poll_ms, 50);
        assert_eq!(config.supervisor.housekeeping_interval_ms, 1000);
    }
}
