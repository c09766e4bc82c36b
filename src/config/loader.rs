//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use crate::config::env::VariableSource;
use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::secrets::SecretError;

/// Error type for configuration loading and bootstrap.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("{0} environment variable is required")]
    MissingVariable(&'static str),

    #[error("invalid value {value:?} for environment variable {key}")]
    InvalidVariable { key: &'static str, value: String },

    #[error("a secret repository is required outside the local environment")]
    MissingSecretRepository,

    #[error("failed to fetch secret '{name}' (project: {project}, secret: {secret}, version: latest): {source}")]
    Secret {
        name: &'static str,
        project: String,
        secret: String,
        #[source]
        source: SecretError,
    },
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: ServiceConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

impl ServiceConfig {
    /// Build the effective configuration: file (or defaults), then environment
    /// overrides, then validation.
    pub fn load(path: Option<&Path>, vars: &dyn VariableSource) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => load_config(path)?,
            None => ServiceConfig::default(),
        };
        config.apply_env(vars)?;
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }

    /// Apply environment overrides.
    pub fn apply_env(&mut self, vars: &dyn VariableSource) -> Result<(), ConfigError> {
        if let Some(port) = vars.var("PORT") {
            self.listener.port = port.parse().map_err(|_| ConfigError::InvalidVariable {
                key: "PORT",
                value: port.clone(),
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[listener]\nport = 9191\n\n[shutdown]\ntimeout_secs = 3").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.listener.port, 9191);
        assert_eq!(config.shutdown.timeout_secs, 3);
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config(Path::new("/nonexistent/shop-api.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_load_config_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[listener\nport = ").unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_config_reports_all_validation_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[shutdown]\ntimeout_secs = 0\n\n[timeouts]\nrequest_secs = 0"
        )
        .unwrap();

        match load_config(file.path()).unwrap_err() {
            ConfigError::Validation(errors) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_port_env_override() {
        let config = ServiceConfig::load(None, &vars(&[("PORT", "3000")])).unwrap();
        assert_eq!(config.listener.port, 3000);
    }

    #[test]
    fn test_empty_port_keeps_default() {
        let config = ServiceConfig::load(None, &vars(&[("PORT", "")])).unwrap();
        assert_eq!(config.listener.port, 8080);
    }

    #[test]
    fn test_invalid_port_env() {
        let err = ServiceConfig::load(None, &vars(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidVariable { key: "PORT", .. }
        ));
    }
}
