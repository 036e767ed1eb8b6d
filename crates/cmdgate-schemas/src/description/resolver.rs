//! Builds a [`Description`] from its document form
//!
//! Resolves `extends` chains between operations and `$ref` links from
//! parameters to models before handing the fragments to serde.
//!
//! Copyright (c) 2025 Cmdgate Team
//! Licensed under the Apache-2.0 license

use super::error::{DescriptionError, DescriptionResult};
use super::operation::{Operation, OperationBuilder};
use super::{Description, DescriptionBuilder};
use crate::parameter::ParameterSchema;
use serde_json::{Map, Value};
use tracing::trace;

/// Maximum nesting of `$ref` expansions before a reference is considered circular
pub const MAX_REFERENCE_DEPTH: usize = 10;

const REF_KEY: &str = "$ref";

struct DocumentResolver<'a> {
    operations: &'a Map<String, Value>,
    models: &'a Map<String, Value>,
}

pub(crate) fn build_description(document: &Value) -> DescriptionResult<Description> {
    let root = document
        .as_object()
        .ok_or_else(|| DescriptionError::parse("description", "document must be an object"))?;

    let empty = Map::new();
    let resolver = DocumentResolver {
        operations: section(root, "operations")?.unwrap_or(&empty),
        models: section(root, "models")?.unwrap_or(&empty),
    };

    let mut builder = DescriptionBuilder::new();
    if let Some(name) = root.get("name").and_then(Value::as_str) {
        builder = builder.name(name);
    }
    if let Some(version) = root.get("apiVersion").and_then(Value::as_str) {
        builder = builder.api_version(version);
    }

    for (name, raw) in resolver.models {
        let context = format!("model '{}'", name);
        builder = builder.model(resolver.parse_schema(name, raw, &context)?);
    }
    for name in resolver.operations.keys() {
        builder = builder.operation(resolver.resolve_operation(name, &mut Vec::new())?);
    }

    Ok(builder.build())
}

impl DocumentResolver<'_> {
    fn resolve_operation(&self, name: &str, chain: &mut Vec<String>) -> DescriptionResult<Operation> {
        let raw = self
            .operations
            .get(name)
            .and_then(Value::as_object)
            .ok_or_else(|| DescriptionError::invalid_operation(name, "operation must be an object"))?;

        chain.push(name.to_string());
        let mut builder = match raw.get("extends") {
            None | Some(Value::Null) => OperationBuilder::new(name),
            Some(Value::String(parent)) => {
                if chain.contains(parent) {
                    return Err(DescriptionError::invalid_operation(
                        name,
                        format!("circular extends chain: {} -> {}", chain.join(" -> "), parent),
                    ));
                }
                if !self.operations.contains_key(parent) {
                    return Err(DescriptionError::invalid_operation(
                        name,
                        format!("extends unknown operation '{}'", parent),
                    ));
                }
                trace!(operation = name, parent = parent.as_str(), "inheriting parameters");
                OperationBuilder::extending(name, &self.resolve_operation(parent, chain)?)
            }
            Some(_) => {
                return Err(DescriptionError::invalid_operation(
                    name,
                    "extends must name another operation",
                ))
            }
        };
        chain.pop();

        if let Some(summary) = raw.get("summary").and_then(Value::as_str) {
            builder = builder.summary(summary);
        }
        builder = builder.deprecated(raw.get("deprecated").and_then(Value::as_bool).unwrap_or(false));

        match raw.get("parameters") {
            None | Some(Value::Null) => {}
            Some(Value::Object(params)) => {
                for (param, schema) in params {
                    let context = format!("parameter '{}' of operation '{}'", param, name);
                    builder = builder.param(self.parse_schema(param, schema, &context)?);
                }
            }
            Some(_) => {
                return Err(DescriptionError::invalid_operation(
                    name,
                    "parameters must be a map of names to schemas",
                ))
            }
        }

        match raw.get("additionalParameters") {
            None => {}
            Some(Value::Null | Value::Bool(false)) => builder = builder.without_additional_parameters(),
            Some(Value::Bool(true)) => builder = builder.additional_parameters(ParameterSchema::new("")),
            Some(schema @ Value::Object(_)) => {
                let context = format!("additional parameters of operation '{}'", name);
                builder = builder.additional_parameters(self.parse_schema("", schema, &context)?);
            }
            Some(_) => {
                return Err(DescriptionError::invalid_operation(
                    name,
                    "additionalParameters must be a schema or a boolean",
                ))
            }
        }

        Ok(builder.build())
    }

    fn parse_schema(&self, name: &str, raw: &Value, context: &str) -> DescriptionResult<ParameterSchema> {
        let resolved = self.resolve_refs(raw, 0)?;
        ParameterSchema::from_value(name, resolved).map_err(|e| DescriptionError::parse(context, e.to_string()))
    }

    /// Replace every `{"$ref": "Model", ...}` with the model's schema, sibling keys winning
    fn resolve_refs(&self, value: &Value, depth: usize) -> DescriptionResult<Value> {
        match value {
            Value::Object(map) => {
                let mut resolved = match map.get(REF_KEY) {
                    None => Map::new(),
                    Some(Value::String(reference)) => self.expand_model(reference, depth)?,
                    Some(other) => {
                        return Err(DescriptionError::reference(
                            other.to_string(),
                            "reference must be a model name",
                        ))
                    }
                };
                for (key, child) in map {
                    if key != REF_KEY {
                        resolved.insert(key.clone(), self.resolve_refs(child, depth)?);
                    }
                }
                Ok(Value::Object(resolved))
            }
            Value::Array(items) => items
                .iter()
                .map(|item| self.resolve_refs(item, depth))
                .collect::<DescriptionResult<Vec<_>>>()
                .map(Value::Array),
            other => Ok(other.clone()),
        }
    }

    fn expand_model(&self, reference: &str, depth: usize) -> DescriptionResult<Map<String, Value>> {
        if depth >= MAX_REFERENCE_DEPTH {
            return Err(DescriptionError::reference(
                reference,
                format!(
                    "exceeded the maximum reference depth of {}; the reference is probably circular",
                    MAX_REFERENCE_DEPTH
                ),
            ));
        }
        let model = self
            .models
            .get(reference)
            .ok_or_else(|| DescriptionError::reference(reference, "no model with this name"))?;
        match self.resolve_refs(model, depth + 1)? {
            Value::Object(map) => Ok(map),
            _ => Err(DescriptionError::reference(reference, "model must be an object")),
        }
    }
}

fn section<'v>(root: &'v Map<String, Value>, key: &str) -> DescriptionResult<Option<&'v Map<String, Value>>> {
    match root.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(DescriptionError::parse(
            "description",
            format!("'{}' must be a map", key),
        )),
    }
}
