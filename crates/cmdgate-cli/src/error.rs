//! Error types and handling for the CLI
//!
//! This module provides error types and utilities for handling
//! various failure modes in the CLI application.

use cmdgate_schemas::{DescriptionError, LoaderError};
use std::io;
use std::path::PathBuf;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for CLI operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error (file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error from the validation gate or an executor
    #[error("{0}")]
    Core(#[from] cmdgate_core::Error),

    /// A description could not be loaded or queried
    #[error("{0}")]
    Description(#[from] DescriptionError),

    /// A parameter file could not be read or parsed
    #[error("{0}")]
    Loader(#[from] LoaderError),

    /// The command failed validation; the individual messages were already printed
    #[error("Validation failed with {count} error(s)")]
    ValidationFailed { count: usize },

    /// File not found
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Neither a file nor a known description name
    #[error("Description '{name}' not found (looked in {})", searched.display())]
    DescriptionNotFound { name: String, searched: PathBuf },

    /// Invalid file format
    #[error("Invalid file format for {}: expected {}", path.display(), expected)]
    InvalidFormat { path: PathBuf, expected: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid argument combination
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML parse error
    #[error("TOML error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// Generic error with context
    #[error("{message}")]
    Other { message: String },
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an invalid arguments error
    pub fn invalid_args(message: impl Into<String>) -> Self {
        Self::InvalidArgs(message.into())
    }

    /// Create a generic error with message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io(_) => 1,
            Self::ValidationFailed { .. } => 2,
            Self::Core(e) if e.is_validation() => 2,
            Self::Core(_) => 3,
            Self::Description(_) => 3,
            Self::FileNotFound { .. } => 4,
            Self::DescriptionNotFound { .. } => 4,
            Self::InvalidFormat { .. } | Self::Loader(_) => 5,
            Self::Config(_) => 6,
            Self::InvalidArgs(_) => 7,
            Self::Json(_) => 12,
            Self::Yaml(_) => 13,
            Self::TomlDe(_) | Self::TomlSer(_) => 14,
            Self::Other { .. } => 99,
        }
    }

    /// Check if this error should display usage help
    pub fn should_show_help(&self) -> bool {
        matches!(self, Self::InvalidArgs(_))
    }
}

/// Format an error for display to the user
pub fn format_error(error: &Error, use_color: bool) -> String {
    if use_color {
        use colored::Colorize;
        format!("{} {}", "Error:".red().bold(), error)
    } else {
        format!("Error: {}", error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmdgate_core::Command;

    #[test]
    fn test_exit_codes() {
        let validation = cmdgate_core::Error::command_validation(
            vec!["[Bucket] is required".to_string()],
            &Command::new("PutObject"),
        );
        assert_eq!(Error::from(validation).exit_code(), 2);
        assert_eq!(Error::ValidationFailed { count: 3 }.exit_code(), 2);

        let unknown = DescriptionError::unknown_operation("Nope");
        assert_eq!(Error::from(unknown).exit_code(), 3);
        assert_eq!(Error::config("bad").exit_code(), 6);
    }

    #[test]
    fn test_format_error_without_color() {
        let error = Error::FileNotFound {
            path: PathBuf::from("missing.yaml"),
        };
        assert_eq!(format_error(&error, false), "Error: File not found: missing.yaml");
    }

    #[test]
    fn test_help_only_for_argument_errors() {
        assert!(Error::invalid_args("missing '='").should_show_help());
        assert!(!Error::other("boom").should_show_help());
    }
}
