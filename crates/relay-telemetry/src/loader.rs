//! Layered loading of [`LogConfig`].
//!
//! Layers are applied in order, later ones overriding earlier ones:
//! 1. Default values (or a preset)
//! 2. A configuration file (TOML or JSON, chosen by extension)
//! 3. Environment variables under a prefix
//!
//! Recognised environment variables, for prefix `RELAY`:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `RELAY_LOG_LEVEL` | `level` |
//! | `RELAY_LOG_JSON` | `json_format` |
//! | `RELAY_LOG_ENABLED` | `enabled` |
//! | `RELAY_LOG_SPAN_EVENTS` | `span_events` |
//! | `RELAY_SERVICE_NAME` | `service_name` |

use std::env;
use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::logging::{create_env_filter, LogConfig};

/// Configuration loader with layered approach.
///
/// # Example
///
/// ```no_run
/// use relay_telemetry::ConfigLoader;
///
/// # fn main() -> Result<(), relay_telemetry::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_file("relay.toml")?
///     .with_env_prefix("RELAY")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config: LogConfig,
    env_prefix: Option<String>,
}

impl ConfigLoader {
    /// Create a loader starting from [`LogConfig::default`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the development preset.
    ///
    /// ```
    /// use relay_telemetry::ConfigLoader;
    ///
    /// let config = ConfigLoader::new().with_development().load().unwrap();
    /// assert!(!config.json_format);
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = LogConfig::development();
        self
    }

    /// Start from the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = LogConfig::production();
        self
    }

    /// Load configuration from a `.toml` or `.json` file.
    ///
    /// Fields missing from the file take their default values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file does not exist, cannot be read, has
    /// an unsupported extension, or does not parse.
    pub fn with_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.display().to_string()))?;

        self.with_string(&content, &format)
    }

    /// Load configuration from a file if it exists.
    ///
    /// # Errors
    ///
    /// Same as [`with_file`](Self::with_file) when the file is present.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string in the given format ("toml" or "json").
    ///
    /// ```
    /// use relay_telemetry::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string("level = \"debug\"\njson_format = false", "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.level, "debug");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the format is unknown or parsing fails.
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };
        Ok(self)
    }

    /// Set the environment variable prefix for overrides.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Apply environment overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EnvParse`] for malformed environment values and
    /// [`ConfigError::InvalidValue`] if the final level does not parse as a
    /// filter directive.
    pub fn load(mut self) -> Result<LogConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix, env::vars())?;
        }

        create_env_filter(&self.config.level)
            .map_err(|e| ConfigError::invalid_value("level", e.to_string()))?;

        Ok(self.config)
    }

    fn apply_env_overrides<I>(&mut self, prefix: &str, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            let Some(field) = key.strip_prefix(prefix).and_then(|k| k.strip_prefix('_')) else {
                continue;
            };

            match field {
                "LOG_LEVEL" => self.config.level = value,
                "LOG_JSON" => self.config.json_format = parse_bool(&key, &value)?,
                "LOG_ENABLED" => self.config.enabled = parse_bool(&key, &value)?,
                "LOG_SPAN_EVENTS" => self.config.span_events = parse_bool(&key, &value)?,
                "SERVICE_NAME" => self.config.service_name = value,
                _ => {}
            }
        }
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::env_parse(key, "expected boolean")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_loader_defaults() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config, LogConfig::default());
    }

    #[test]
    fn test_loader_with_production() {
        let config = ConfigLoader::new().with_production().load().unwrap();
        assert!(config.json_format);
    }

    #[test]
    fn test_loader_with_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "level = \"warn\"\nthread_ids = true").unwrap();

        let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();
        assert_eq!(config.level, "warn");
        assert!(config.thread_ids);
        assert!(config.json_format);
    }

    #[test]
    fn test_loader_with_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"json_format": false, "service_name": "edge"}}"#).unwrap();

        let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();
        assert!(!config.json_format);
        assert_eq!(config.service_name, "edge");
    }

    #[test]
    fn test_loader_missing_file() {
        let err = ConfigLoader::new().with_file("/nonexistent/relay.toml").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn test_loader_optional_missing_file() {
        let config = ConfigLoader::new()
            .with_optional_file("/nonexistent/relay.toml")
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(config, LogConfig::default());
    }

    #[test]
    fn test_loader_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        let err = ConfigLoader::new().with_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_loader_rejects_unknown_fields() {
        let err = ConfigLoader::new()
            .with_string(r#"{"colour": true}"#, "json")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_env_overrides() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_overrides(
                "RELAY",
                vars(&[
                    ("RELAY_LOG_LEVEL", "trace"),
                    ("RELAY_LOG_JSON", "off"),
                    ("RELAY_LOG_SPAN_EVENTS", "1"),
                    ("RELAY_SERVICE_NAME", "gateway"),
                    ("RELAYED_LOG_LEVEL", "error"),
                    ("OTHER_LOG_LEVEL", "error"),
                ]),
            )
            .unwrap();

        assert_eq!(loader.config.level, "trace");
        assert!(!loader.config.json_format);
        assert!(loader.config.span_events);
        assert_eq!(loader.config.service_name, "gateway");
    }

    #[test]
    fn test_env_invalid_bool() {
        let mut loader = ConfigLoader::new();
        let err = loader
            .apply_env_overrides("RELAY", vars(&[("RELAY_LOG_ENABLED", "maybe")]))
            .unwrap_err();

        match err {
            ConfigError::EnvParse { var, .. } => assert_eq!(var, "RELAY_LOG_ENABLED"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_env_prefix_from_process_environment() {
        std::env::set_var("RELAY_LOADER_TEST_LOG_LEVEL", "debug");

        let config = ConfigLoader::new()
            .with_env_prefix("relay_loader_test")
            .load()
            .unwrap();

        std::env::remove_var("RELAY_LOADER_TEST_LOG_LEVEL");
        assert_eq!(config.level, "debug");
    }

    #[test]
    fn test_load_rejects_invalid_level() {
        let err = ConfigLoader::new()
            .with_string("level = \"relay=shouting\"", "toml")
            .unwrap()
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
