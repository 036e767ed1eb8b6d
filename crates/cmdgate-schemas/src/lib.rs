//! Cmdgate Schemas - parameter schemas, filters and service descriptions
//!
//! This crate holds everything the validation gate consults about a command
//! before it runs:
//! - **ParameterSchema**: one parameter's type, default, constraints, filters
//!   and nested member schemas
//! - **Filters and formats**: named value normalizers applied before validation
//! - **SchemaValidator**: recursive validation with aggregated, path-labelled
//!   messages
//! - **Description**: operations and models loaded from YAML or JSON documents
//!
//! ## Quick Start
//!
//! ```rust
//! use cmdgate_schemas::{Description, SchemaValidator};
//! use serde_json::json;
//!
//! let description = Description::from_value(&json!({
//!     "operations": {
//!         "GetObject": {
//!             "parameters": {
//!                 "Bucket": {"type": "string", "required": true}
//!             }
//!         }
//!     }
//! }))
//! .unwrap();
//!
//! let operation = description.get_operation("GetObject").unwrap();
//! let bucket = operation.param("Bucket").unwrap();
//! let result = SchemaValidator::default().validate(bucket, "Bucket", None);
//! assert_eq!(result.errors, vec!["[Bucket] is a required string"]);
//! ```
//!
//! Copyright (c) 2025 Cmdgate Team
//! Licensed under the Apache-2.0 license

pub mod description;
pub mod filters;
pub mod format;
pub mod loader;
pub mod parameter;
pub mod validator;
pub mod value;

// Re-export commonly used types for convenience
pub use description::{
    Description, DescriptionBuilder, DescriptionError, DescriptionResult, Operation, OperationBuilder,
};
pub use filters::{FilterError, FilterRegistry, FilterSpec};
pub use format::SchemaFormat;
pub use loader::{DocumentParser, Format, LoaderError, LoaderResult};
pub use parameter::{AdditionalProperties, ParamType, ParameterSchema};
pub use validator::{SchemaValidator, Validation};
pub use value::is_truthy;
