//! Configuration management for medreminder.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::medication::DoseTime;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration directory name.
const CONFIG_DIR_NAME: &str = "medreminder";

/// Prefix for environment variable overrides.
const ENV_PREFIX: &str = "MEDREMINDER_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `MEDREMINDER_`, sections split on `__`)
/// 2. TOML config file at `~/.config/medreminder/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Registry configuration.
    pub registry: RegistryConfig,
    /// Display configuration.
    pub display: DisplayConfig,
}

/// How the session registry is populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Start each session with the demo medications.
    pub seed_samples: bool,
    /// JSON file of medication drafts to import at startup.
    pub import_path: Option<PathBuf>,
}

/// Clock style for printed dose times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeFormat {
    /// `20:00`
    #[default]
    #[serde(rename = "24h")]
    TwentyFourHour,
    /// `8:00 PM`
    #[serde(rename = "12h")]
    TwelveHour,
}

impl TimeFormat {
    /// Render a dose time in this style.
    #[must_use]
    pub fn render(self, time: DoseTime) -> String {
        match self {
            Self::TwentyFourHour => time.to_string(),
            Self::TwelveHour => time.to_12h_string(),
        }
    }
}

/// Display-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Clock style for dose times.
    pub time_format: TimeFormat,
    /// Print medication instructions alongside reminders.
    pub show_instructions: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            seed_samples: true,
            import_path: None,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            time_format: TimeFormat::default(),
            show_instructions: true,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file that must exist.
    ///
    /// Unlike [`Config::load_from`], a missing file is an error rather than
    /// a fall-back to defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigNotFound`] if `path` is not a file, or any
    /// loading or validation error.
    pub fn check_file(path: PathBuf) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::ConfigNotFound { path });
        }
        Self::load_from(Some(path))
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if let Some(path) = &self.registry.import_path {
            if path.as_os_str().is_empty() {
                return Err(Error::ConfigValidation {
                    message: "registry.import_path must not be empty".to_string(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp_config(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "medreminder_config_{}_{name}.toml",
            std::process::id()
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.registry.seed_samples);
        assert!(config.registry.import_path.is_none());
        assert_eq!(config.display.time_format, TimeFormat::TwentyFourHour);
        assert!(config.display.show_instructions);
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_import_path() {
        let mut config = Config::default();
        config.registry.import_path = Some(PathBuf::new());

        let result = config.validate();
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("import_path"));
    }

    #[test]
    fn test_time_format_render() {
        let time = DoseTime::from_hm(20, 0).unwrap();
        assert_eq!(TimeFormat::TwentyFourHour.render(time), "20:00");
        assert_eq!(TimeFormat::TwelveHour.render(time), "8:00 PM");
    }

    #[test]
    fn test_time_format_serde_names() {
        assert_eq!(
            serde_json::to_string(&TimeFormat::TwelveHour).unwrap(),
            "\"12h\""
        );
        let parsed: TimeFormat = serde_json::from_str("\"24h\"").unwrap();
        assert_eq!(parsed, TimeFormat::TwentyFourHour);
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("medreminder"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        // Loading from a nonexistent path should work (uses defaults)
        let result = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml")));
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), Config::default());
    }

    #[test]
    fn test_check_file_missing() {
        let path = PathBuf::from("/nonexistent/medreminder/config.toml");
        let err = Config::check_file(path.clone()).unwrap_err();

        assert!(matches!(err, Error::ConfigNotFound { path: ref p } if *p == path));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_check_file_existing() {
        let path = write_temp_config("check", "[display]\nshow_instructions = false\n");

        let config = Config::check_file(path.clone()).unwrap();
        assert!(!config.display.show_instructions);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_from_toml_file() {
        let path = write_temp_config(
            "load",
            r#"
[registry]
seed_samples = false
import_path = "/tmp/meds.json"

[display]
time_format = "12h"
"#,
        );

        let config = Config::load_from(Some(path.clone())).unwrap();
        assert!(!config.registry.seed_samples);
        assert_eq!(
            config.registry.import_path,
            Some(PathBuf::from("/tmp/meds.json"))
        );
        assert_eq!(config.display.time_format, TimeFormat::TwelveHour);
        assert!(config.display.show_instructions);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_rejects_bad_time_format() {
        let path = write_temp_config("bad", "[display]\ntime_format = \"36h\"\n");

        let result = Config::load_from(Some(path.clone()));
        assert!(matches!(result, Err(Error::ConfigLoad(_))));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_config_clone() {
        let config = Config::default();
        let cloned = config.clone();
        assert_eq!(config, cloned);
    }

    #[test]
    fn test_registry_config_deserialize() {
        let json = r#"{"seed_samples": false}"#;
        let registry: RegistryConfig = serde_json::from_str(json).unwrap();
        assert!(!registry.seed_samples);
        assert!(registry.import_path.is_none());
    }

    #[test]
    fn test_display_config_serialize() {
        let display = DisplayConfig::default();
        let json = serde_json::to_string(&display).unwrap();
        assert!(json.contains("time_format"));
        assert!(json.contains("24h"));
    }
}
