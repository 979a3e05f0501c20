//! Configuration loading from disk.

use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::PoolmonConfig;
use crate::config::validation::ValidationError;

/// Why the effective configuration could not be built.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] io::Error),

    #[error("cannot parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse a TOML config file without validating it.
///
/// Command-line overrides are applied on top of the result before
/// validation runs, so validation is left to the caller.
pub fn read_config(path: &Path) -> Result<PoolmonConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::validation::validate_config;
    use std::io::Write;

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[scan]\nssl_ports = [993, 995]\ninterval_secs = 10\n\n[director]\nsocket = \"/tmp/director-admin\""
        )
        .unwrap();

        let config = read_config(file.path()).unwrap();
        assert_eq!(config.scan.ports, vec![110, 143]);
        assert_eq!(config.scan.ssl_ports, vec![993, 995]);
        assert_eq!(config.scan.interval_secs, 10);
        assert_eq!(config.scan.timeout_secs, 5);
        assert_eq!(config.director.socket, Path::new("/tmp/director-admin"));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn file_values_are_not_validated_on_read() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[scan]\ntimeout_secs = 0").unwrap();

        let config = read_config(file.path()).unwrap();
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::ZeroDuration("scan timeout")])
        );
    }

    #[test]
    fn syntax_error_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[scan\nports = 110").unwrap();
        assert!(matches!(read_config(file.path()), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = read_config(Path::new("/nonexistent/poolmon.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn validation_errors_are_listed() {
        let err = ConfigError::Validation(vec![
            ValidationError::NoPorts,
            ValidationError::ZeroDuration("scan interval"),
        ]);
        assert_eq!(
            err.to_string(),
            "invalid configuration: no plain ports configured, scan interval must be greater than zero"
        );
    }
}
