//! Cmdgate Core - schema-driven command validation in front of an executor
//!
//! This crate provides the command model and the pre-flight gate that keeps
//! invalid commands away from the transport.
//!
//! # Main Components
//!
//! - **Command**: an operation name plus ordered, mutable parameter values
//! - **Handler chain**: the [`Handler`] and [`Middleware`] traits and a
//!   [`HandlerStack`] that composes them
//! - **ValidationGate**: filters, validates and defaults every parameter,
//!   then either delegates or fails with one aggregated error
//!
//! # Example
//!
//! ```
//! use cmdgate_core::{Command, HandlerStack, Result, ValidationGate};
//! use cmdgate_schemas::Description;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let description = Description::from_value(&json!({
//!     "operations": {
//!         "ListObjects": {
//!             "parameters": {
//!                 "Bucket": {"type": "string", "required": true},
//!                 "MaxKeys": {"type": "integer", "default": 1000}
//!             }
//!         }
//!     }
//! }))
//! .unwrap();
//!
//! let mut stack = HandlerStack::new(|command: &mut Command| -> Result<usize> { Ok(command.len()) });
//! stack.push_validation(ValidationGate::new(Arc::new(description), None));
//! let handler = stack.resolve();
//!
//! let mut command = Command::new("ListObjects").with("Bucket", "photos");
//! assert_eq!(handler(&mut command).unwrap(), 2);
//! assert_eq!(command["MaxKeys"], json!(1000));
//! ```

pub mod command;
pub mod error;
pub mod gate;
pub mod handler;

// Re-export main types for convenience
pub use command::Command;
pub use error::{Error, Result, VALIDATION_MESSAGE_PREFIX};
pub use gate::{AdditionalWriteBack, GateOptions, ValidatedHandler, ValidationGate};
pub use handler::{DynHandler, Handler, HandlerStack, Middleware};
