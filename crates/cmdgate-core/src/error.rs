//! Error types for the cmdgate core library
//!
//! The gate originates exactly one error of its own, [`Error::CommandValidation`],
//! carrying every message collected during the pass. Description lookups
//! propagate unchanged and inner handlers report through [`Error::Execution`].

use crate::command::Command;
use cmdgate_schemas::DescriptionError;
use thiserror::Error;

/// Main error type for cmdgate operations
#[derive(Error, Debug)]
pub enum Error {
    /// The command names an operation the description cannot provide
    #[error(transparent)]
    UnknownOperation(#[from] DescriptionError),

    /// One or more parameters failed validation
    #[error("{message}")]
    CommandValidation {
        message: String,
        errors: Vec<String>,
        /// The command as it stood when validation stopped
        command: Box<Command>,
    },

    /// An inner handler failed
    #[error("Execution failed: {message}")]
    Execution {
        message: String,
        #[source]
        source: anyhow::Error,
    },

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Prefix of every aggregated validation message
pub const VALIDATION_MESSAGE_PREFIX: &str = "Validation errors: ";

impl Error {
    /// Build the aggregated validation failure
    pub fn command_validation(errors: Vec<String>, command: &Command) -> Self {
        Self::CommandValidation {
            message: format!("{}{}", VALIDATION_MESSAGE_PREFIX, errors.join("\n")),
            errors,
            command: Box::new(command.clone()),
        }
    }

    /// Wrap a failure raised by an inner handler
    pub fn execution(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Execution {
            message: message.into(),
            source: source.into(),
        }
    }

    /// The individual validation messages, if this is a validation failure
    pub fn validation_errors(&self) -> Option<&[String]> {
        match self {
            Self::CommandValidation { errors, .. } => Some(errors),
            _ => None,
        }
    }

    /// Snapshot of the command attached to a validation failure
    pub fn command(&self) -> Option<&Command> {
        match self {
            Self::CommandValidation { command, .. } => Some(command),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::CommandValidation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message() {
        let command = Command::new("PutObject");
        let err = Error::command_validation(
            vec!["[Bucket] is a required string".to_string(), "[Key] is required".to_string()],
            &command,
        );
        assert_eq!(
            err.to_string(),
            "Validation errors: [Bucket] is a required string\n[Key] is required"
        );
        assert_eq!(err.validation_errors().map(<[String]>::len), Some(2));
        assert_eq!(err.command().map(Command::name), Some("PutObject"));
        assert!(err.is_validation());
    }

    #[test]
    fn test_unknown_operation_is_transparent() {
        let err: Error = DescriptionError::unknown_operation("Nope").into();
        assert_eq!(err.to_string(), "Command was not found matching Nope");
        assert!(err.validation_errors().is_none());
    }

    #[test]
    fn test_execution_error() {
        let err = Error::execution("transport unavailable", anyhow::anyhow!("connection refused"));
        assert_eq!(err.to_string(), "Execution failed: transport unavailable");
        assert!(std::error::Error::source(&err).is_some());
    }
}
