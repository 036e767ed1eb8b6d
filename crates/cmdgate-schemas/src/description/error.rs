//! Errors raised while building or querying a service description
//!
//! Copyright (c) 2025 Cmdgate Team
//! Licensed under the Apache-2.0 license

use crate::loader::LoaderError;
use thiserror::Error;

/// Result type for description operations
pub type DescriptionResult<T> = Result<T, DescriptionError>;

#[derive(Error, Debug)]
pub enum DescriptionError {
    /// No operation is registered under the requested name
    #[error("Command was not found matching {name}")]
    UnknownOperation { name: String },

    /// An operation entry is malformed or its `extends` chain is broken
    #[error("Invalid operation '{name}': {message}")]
    InvalidOperation { name: String, message: String },

    /// A `$ref` could not be resolved
    #[error("Cannot resolve reference '{reference}': {message}")]
    Reference { reference: String, message: String },

    /// A document fragment does not have the expected shape
    #[error("Failed to parse {context}: {message}")]
    Parse { context: String, message: String },

    /// The description file could not be loaded
    #[error(transparent)]
    Loader(#[from] LoaderError),
}

impl DescriptionError {
    pub fn unknown_operation(name: impl Into<String>) -> Self {
        Self::UnknownOperation { name: name.into() }
    }

    pub fn invalid_operation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn reference(reference: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Reference {
            reference: reference.into(),
            message: message.into(),
        }
    }

    pub fn parse(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            context: context.into(),
            message: message.into(),
        }
    }
}
