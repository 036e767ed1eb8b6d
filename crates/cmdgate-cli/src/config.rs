//! Configuration management for the CLI
//!
//! This module handles loading configuration from:
//! - Default values
//! - Configuration files (YAML/JSON/TOML)
//! - The `CMDGATE_CONFIG` environment variable or `--config`

use crate::error::{Error, Result};
use cmdgate_core::{AdditionalWriteBack, GateOptions};
use cmdgate_schemas::SchemaValidator;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// File name of the project-local config written by `config init`
pub const PROJECT_CONFIG_FILE: &str = ".cmdgate.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Gate behaviour
    pub validation: ValidationConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingSettings,

    /// Path settings
    pub paths: PathConfig,
}

/// Validation gate configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Accept integers where a schema expects only a string
    pub cast_integer_to_string: bool,

    /// Write additional parameters back using the last declared parameter's filters
    pub legacy_additional_write_back: bool,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format
    pub format: String,

    /// Use colored output by default
    pub color: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level used when no `-v` flag is given
    pub level: Option<String>,

    /// Log format (compact, full, json)
    pub format: Option<String>,

    /// Log file path
    pub file: Option<PathBuf>,

    /// Per-module levels, e.g. `cmdgate_core = "debug"`
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub modules: BTreeMap<String, String>,
}

/// Path configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Directory searched for description names
    pub descriptions_dir: PathBuf,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            cast_integer_to_string: true,
            legacy_additional_write_back: false,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "human".to_string(),
            color: true,
        }
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            descriptions_dir: config_dir.join("cmdgate").join("descriptions"),
        }
    }
}

/// Config file syntax, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigSyntax {
    Yaml,
    Json,
    Toml,
}

impl ConfigSyntax {
    fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            _ => Err(Error::InvalidFormat {
                path: path.to_path_buf(),
                expected: "a .yaml, .yml, .json or .toml config file".to_string(),
            }),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let syntax = ConfigSyntax::from_path(path)?;
        let content = std::fs::read_to_string(path)?;

        let config = match syntax {
            ConfigSyntax::Yaml => serde_yaml::from_str(&content)?,
            ConfigSyntax::Json => serde_json::from_str(&content)?,
            ConfigSyntax::Toml => toml::from_str(&content)?,
        };

        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        for path in Self::default_config_paths() {
            if path.exists() {
                match Self::from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        eprintln!("Warning: Failed to load config from {}: {}", path.display(), e);
                    }
                }
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        if let Some(path) = file {
            Self::from_file(path)
        } else {
            Self::load()
        }
    }

    /// Path of the per-user config file
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("cmdgate").join("config.toml"))
    }

    /// Get default configuration file paths to check
    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // Current directory
        for extension in ["yaml", "yml", "json", "toml"] {
            paths.push(PathBuf::from(format!(".cmdgate.{}", extension)));
        }

        // User config directory
        if let Some(config_dir) = dirs::config_dir() {
            let cmdgate_dir = config_dir.join("cmdgate");
            for extension in ["yaml", "json", "toml"] {
                paths.push(cmdgate_dir.join(format!("config.{}", extension)));
            }
        }

        // Home directory
        if let Some(home_dir) = dirs::home_dir() {
            for extension in ["yaml", "json", "toml"] {
                paths.push(home_dir.join(format!(".cmdgate.{}", extension)));
            }
        }

        paths
    }

    /// Schema validator configured from the `validation` section
    pub fn validator(&self) -> SchemaValidator {
        SchemaValidator::new(self.validation.cast_integer_to_string)
    }

    /// Gate options, with the command-line override applied
    pub fn gate_options(&self, legacy_write_back: bool) -> GateOptions {
        let policy = if legacy_write_back || self.validation.legacy_additional_write_back {
            AdditionalWriteBack::LegacyLastDeclared
        } else {
            AdditionalWriteBack::OwnFilters
        };
        GateOptions::new().additional_write_back(policy)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = match ConfigSyntax::from_path(path)? {
            ConfigSyntax::Yaml => serde_yaml::to_string(self)?,
            ConfigSyntax::Json => serde_json::to_string_pretty(self)?,
            ConfigSyntax::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Builder for creating configurations programmatically
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new config builder
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Set the directory searched for description names
    pub fn descriptions_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.paths.descriptions_dir = dir.into();
        self
    }

    /// Toggle integer-to-string casting
    pub fn cast_integer_to_string(mut self, cast: bool) -> Self {
        self.config.validation.cast_integer_to_string = cast;
        self
    }

    /// Toggle the legacy write-back policy for additional parameters
    pub fn legacy_additional_write_back(mut self, legacy: bool) -> Self {
        self.config.validation.legacy_additional_write_back = legacy;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.validation.cast_integer_to_string);
        assert!(!config.validation.legacy_additional_write_back);
        assert_eq!(config.output.format, "human");
        assert!(config.paths.descriptions_dir.ends_with("cmdgate/descriptions"));
    }

    #[test]
    fn test_partial_files_keep_defaults() {
        let dir = TempDir::new().unwrap();

        let yaml = dir.path().join("cmdgate.yaml");
        std::fs::write(&yaml, "validation:\n  cast_integer_to_string: false\n").unwrap();
        let config = Config::from_file(&yaml).unwrap();
        assert!(!config.validation.cast_integer_to_string);
        assert_eq!(config.output.format, "human");

        let toml_path = dir.path().join("cmdgate.toml");
        std::fs::write(&toml_path, "[paths]\ndescriptions_dir = \"/srv/descriptions\"\n").unwrap();
        let config = Config::from_file(&toml_path).unwrap();
        assert_eq!(config.paths.descriptions_dir, PathBuf::from("/srv/descriptions"));
        assert!(config.validation.cast_integer_to_string);

        let json = dir.path().join("cmdgate.json");
        std::fs::write(&json, r#"{"logging": {"level": "debug", "modules": {"cmdgate_core": "trace"}}}"#).unwrap();
        let config = Config::from_file(&json).unwrap();
        assert_eq!(config.logging.level.as_deref(), Some("debug"));
        assert_eq!(config.logging.modules["cmdgate_core"], "trace");
    }

    #[test]
    fn test_unsupported_and_missing_files() {
        let dir = TempDir::new().unwrap();
        let ini = dir.path().join("cmdgate.ini");
        std::fs::write(&ini, "x=1").unwrap();
        assert!(matches!(Config::from_file(&ini), Err(Error::InvalidFormat { .. })));

        let missing = dir.path().join("absent.yaml");
        assert!(matches!(
            Config::load_with_file(Some(&missing)),
            Err(Error::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_save_round_trip_for_each_syntax() {
        let dir = TempDir::new().unwrap();
        let config = ConfigBuilder::new()
            .descriptions_dir("/tmp/descriptions")
            .cast_integer_to_string(false)
            .legacy_additional_write_back(true)
            .build();

        for name in ["nested/config.toml", "config.yaml", "config.json"] {
            let path = dir.path().join(name);
            config.save(&path).unwrap();
            assert_eq!(Config::from_file(&path).unwrap(), config, "{}", name);
        }
    }

    #[test]
    fn test_gate_options_policy() {
        let config = Config::default();
        assert_eq!(
            config.gate_options(false).additional_write_back,
            AdditionalWriteBack::OwnFilters
        );
        assert_eq!(
            config.gate_options(true).additional_write_back,
            AdditionalWriteBack::LegacyLastDeclared
        );

        let legacy = ConfigBuilder::new().legacy_additional_write_back(true).build();
        assert_eq!(
            legacy.gate_options(false).additional_write_back,
            AdditionalWriteBack::LegacyLastDeclared
        );
        assert!(!ConfigBuilder::new()
            .cast_integer_to_string(false)
            .build()
            .validator()
            .casts_integer_to_string());
    }
}
