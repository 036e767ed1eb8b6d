//! Operations and their builder
//!
//! Copyright (c) 2025 Cmdgate Team
//! Licensed under the Apache-2.0 license

use crate::parameter::ParameterSchema;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// A named operation: its declared parameters, in declaration order, and the
/// optional schema every undeclared parameter must satisfy
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    deprecated: bool,
    #[serde(rename = "parameters", serialize_with = "serialize_params")]
    params: Vec<(String, ParameterSchema)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    additional_parameters: Option<ParameterSchema>,
}

impl Operation {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecated
    }

    /// Declared parameters in declaration order
    pub fn params(&self) -> &[(String, ParameterSchema)] {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&ParameterSchema> {
        self.params
            .iter()
            .find(|(declared, _)| declared == name)
            .map(|(_, schema)| schema)
    }

    pub fn has_param(&self, name: &str) -> bool {
        self.param(name).is_some()
    }

    /// Schema for undeclared parameters. `None` means they pass through unchecked.
    pub fn additional_parameters(&self) -> Option<&ParameterSchema> {
        self.additional_parameters.as_ref()
    }
}

fn serialize_params<S>(params: &[(String, ParameterSchema)], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(params.len()))?;
    for (name, schema) in params {
        map.serialize_entry(name, schema)?;
    }
    map.end()
}

/// Builder for [`Operation`]
#[derive(Debug, Clone)]
pub struct OperationBuilder {
    operation: Operation,
}

impl OperationBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            operation: Operation {
                name: name.into(),
                summary: None,
                deprecated: false,
                params: Vec::new(),
                additional_parameters: None,
            },
        }
    }

    /// Start from a parent operation's parameters and additional-parameter schema
    pub fn extending(name: impl Into<String>, parent: &Operation) -> Self {
        let mut builder = Self::new(name);
        builder.operation.summary = parent.summary.clone();
        builder.operation.params = parent.params.clone();
        builder.operation.additional_parameters = parent.additional_parameters.clone();
        builder
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.operation.summary = Some(summary.into());
        self
    }

    pub fn deprecated(mut self, deprecated: bool) -> Self {
        self.operation.deprecated = deprecated;
        self
    }

    /// Declare a parameter under the schema's name, replacing an existing
    /// declaration in place
    pub fn param(mut self, schema: ParameterSchema) -> Self {
        let name = schema.name().to_string();
        match self.operation.params.iter_mut().find(|(declared, _)| *declared == name) {
            Some(slot) => slot.1 = schema,
            None => self.operation.params.push((name, schema)),
        }
        self
    }

    pub fn additional_parameters(mut self, schema: ParameterSchema) -> Self {
        self.operation.additional_parameters = Some(schema);
        self
    }

    /// Reject nothing: undeclared parameters pass through unchecked
    pub fn without_additional_parameters(mut self) -> Self {
        self.operation.additional_parameters = None;
        self
    }

    pub fn build(self) -> Operation {
        self.operation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::ParamType;

    #[test]
    fn test_builder_keeps_declaration_order() {
        let op = OperationBuilder::new("PutObject")
            .summary("Upload an object")
            .param(ParameterSchema::new("Bucket").required(true))
            .param(ParameterSchema::new("Key").required(true))
            .param(ParameterSchema::new("Body"))
            .build();

        let names: Vec<&str> = op.params().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["Bucket", "Key", "Body"]);
        assert!(op.has_param("Key"));
        assert!(!op.has_param("Acl"));
        assert!(op.additional_parameters().is_none());
    }

    #[test]
    fn test_redeclared_param_replaces_in_place() {
        let op = OperationBuilder::new("Op")
            .param(ParameterSchema::new("A"))
            .param(ParameterSchema::new("B"))
            .param(ParameterSchema::new("A").with_type(ParamType::Integer))
            .build();

        assert_eq!(op.params().len(), 2);
        assert_eq!(op.params()[0].0, "A");
        assert_eq!(op.param("A").unwrap().types(), &[ParamType::Integer]);
    }

    #[test]
    fn test_extending_copies_parent() {
        let parent = OperationBuilder::new("Base")
            .summary("base")
            .param(ParameterSchema::new("Region"))
            .additional_parameters(ParameterSchema::new("").with_type(ParamType::String))
            .deprecated(true)
            .build();
        let child = OperationBuilder::extending("Child", &parent).build();

        assert_eq!(child.name(), "Child");
        assert_eq!(child.summary(), Some("base"));
        assert!(child.has_param("Region"));
        assert!(child.additional_parameters().is_some());
        assert!(!child.is_deprecated());
    }

    #[test]
    fn test_serialize_as_document() {
        let op = OperationBuilder::new("List")
            .param(ParameterSchema::new("Limit").with_type(ParamType::Integer))
            .build();
        let value = serde_json::to_value(&op).unwrap();
        assert_eq!(value["parameters"]["Limit"]["type"], serde_json::json!(["integer"]));
        assert!(value.get("additionalParameters").is_none());
    }
}
