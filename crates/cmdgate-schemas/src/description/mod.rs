//! Service descriptions
//!
//! A [`Description`] maps operation names to [`Operation`]s and holds the
//! reusable models that parameters may reference with `$ref`. Descriptions
//! are built once, from a document or with [`DescriptionBuilder`], and are
//! read-only afterwards.
//!
//! Document form:
//!
//! ```yaml
//! name: storage
//! apiVersion: "2024-01-01"
//! operations:
//!   PutObject:
//!     summary: Upload an object
//!     parameters:
//!       Bucket: { type: string, required: true }
//!       Key: { $ref: ObjectKey }
//!     additionalParameters: { type: string }
//! models:
//!   ObjectKey: { type: string, minLength: 1 }
//! ```
//!
//! Copyright (c) 2025 Cmdgate Team
//! Licensed under the Apache-2.0 license

pub mod error;
pub mod operation;
mod resolver;

pub use error::{DescriptionError, DescriptionResult};
pub use operation::{Operation, OperationBuilder};
pub use resolver::MAX_REFERENCE_DEPTH;

use crate::loader::DocumentParser;
use crate::parameter::ParameterSchema;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Registry of operations and models
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Description {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_version: Option<String>,
    operations: BTreeMap<String, Operation>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    models: BTreeMap<String, ParameterSchema>,
}

impl Description {
    /// Build a description from its document form
    pub fn from_value(document: &Value) -> DescriptionResult<Self> {
        resolver::build_description(document)
    }

    /// Load a description from a YAML or JSON file
    pub fn from_file(path: impl AsRef<Path>) -> DescriptionResult<Self> {
        let path = path.as_ref();
        let document = DocumentParser::new().parse_file(path)?;
        let description = Self::from_value(&document)?;
        info!(
            path = %path.display(),
            operations = description.operations.len(),
            models = description.models.len(),
            "loaded service description"
        );
        Ok(description)
    }

    /// Look up an operation by name
    pub fn get_operation(&self, name: &str) -> DescriptionResult<&Operation> {
        self.operations
            .get(name)
            .ok_or_else(|| DescriptionError::unknown_operation(name))
    }

    pub fn has_operation(&self, name: &str) -> bool {
        self.operations.contains_key(name)
    }

    /// All operations, sorted by name
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.operations.values()
    }

    pub fn models(&self) -> &BTreeMap<String, ParameterSchema> {
        &self.models
    }

    pub fn model(&self, name: &str) -> Option<&ParameterSchema> {
        self.models.get(name)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn api_version(&self) -> Option<&str> {
        self.api_version.as_deref()
    }
}

/// Builder for [`Description`]
#[derive(Debug, Clone, Default)]
pub struct DescriptionBuilder {
    description: Description,
}

impl DescriptionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.description.name = Some(name.into());
        self
    }

    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.description.api_version = Some(version.into());
        self
    }

    /// Register an operation, replacing one with the same name
    pub fn operation(mut self, operation: Operation) -> Self {
        self.description
            .operations
            .insert(operation.name().to_string(), operation);
        self
    }

    pub fn model(mut self, model: ParameterSchema) -> Self {
        self.description.models.insert(model.name().to_string(), model);
        self
    }

    pub fn build(self) -> Description {
        self.description
    }
}
