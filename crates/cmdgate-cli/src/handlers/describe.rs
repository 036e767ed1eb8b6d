//! Describe command handler

use super::utils::load_description;
use crate::cli::{DescribeArgs, OutputFormat};
use crate::config::Config;
use crate::error::Result;
use crate::output::{format_value_compact, OutputWriter};
use cmdgate_schemas::{Description, Operation, ParameterSchema};
use serde::Serialize;
use tracing::instrument;

/// One row of the operation listing
#[derive(Debug, Serialize)]
struct OperationEntry<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<&'a str>,
    deprecated: bool,
    parameters: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DescriptionListing<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_version: Option<&'a str>,
    operations: Vec<OperationEntry<'a>>,
}

impl<'a> DescriptionListing<'a> {
    fn new(description: &'a Description) -> Self {
        Self {
            name: description.name(),
            api_version: description.api_version(),
            operations: description
                .operations()
                .map(|operation| OperationEntry {
                    name: operation.name(),
                    summary: operation.summary(),
                    deprecated: operation.is_deprecated(),
                    parameters: operation.params().len(),
                })
                .collect(),
        }
    }
}

/// Handle the describe command
#[instrument(skip(config, output), fields(description = %args.description))]
pub fn handle_describe(args: DescribeArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let description = load_description(&args.description, config)?;

    match args.operation.as_deref() {
        Some(name) => describe_operation(description.get_operation(name)?, output),
        None => describe_operations(&description, output),
    }
}

fn describe_operations(description: &Description, output: &mut OutputWriter) -> Result<()> {
    let listing = DescriptionListing::new(description);
    if output.format() != OutputFormat::Human {
        return output.data(&listing);
    }

    let title = match (listing.name, listing.api_version) {
        (Some(name), Some(version)) => format!("{} ({})", name, version),
        (Some(name), None) => name.to_string(),
        _ => "Operations".to_string(),
    };
    output.section(&title)?;

    let rows = listing
        .operations
        .iter()
        .map(|entry| {
            let mut summary = entry.summary.unwrap_or_default().to_string();
            if entry.deprecated {
                summary = format!("(deprecated) {}", summary).trim_end().to_string();
            }
            vec![entry.name.to_string(), entry.parameters.to_string(), summary]
        })
        .collect();
    output.table(&["Operation", "Parameters", "Summary"], rows)
}

fn describe_operation(operation: &Operation, output: &mut OutputWriter) -> Result<()> {
    if output.format() != OutputFormat::Human {
        return output.data(operation);
    }

    output.section(operation.name())?;
    if let Some(summary) = operation.summary() {
        output.info(summary)?;
    }
    if operation.is_deprecated() {
        output.warning("This operation is deprecated")?;
    }

    let rows = operation
        .params()
        .iter()
        .map(|(name, schema)| parameter_row(name, schema))
        .collect();
    output.table(&["Parameter", "Type", "Required", "Default", "Description"], rows)?;

    match operation.additional_parameters() {
        Some(schema) if schema.types().is_empty() => output.info("Additional parameters: any"),
        Some(schema) => output.info(&format!("Additional parameters: {}", schema.type_label())),
        None => output.info("Additional parameters: not allowed"),
    }
}

fn parameter_row(name: &str, schema: &ParameterSchema) -> Vec<String> {
    let type_label = if schema.types().is_empty() {
        "any".to_string()
    } else {
        schema.type_label()
    };
    let required = if schema.is_required() { "yes" } else { "no" };
    let default = schema.default().map(format_value_compact).unwrap_or_default();

    vec![
        name.to_string(),
        type_label,
        required.to_string(),
        default,
        schema.description().unwrap_or_default().to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn description() -> Description {
        Description::from_value(&json!({
            "name": "storage",
            "apiVersion": "2006-03-01",
            "operations": {
                "ListObjects": {
                    "summary": "List the objects in a bucket",
                    "parameters": {
                        "Bucket": {"type": "string", "required": true, "description": "Bucket name"},
                        "MaxKeys": {"type": "integer", "default": 1000}
                    }
                },
                "ListObjectsV1": {
                    "extends": "ListObjects",
                    "deprecated": true
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_listing_is_sorted_and_counts_parameters() {
        let description = description();
        let listing = DescriptionListing::new(&description);

        assert_eq!(listing.name, Some("storage"));
        let names: Vec<&str> = listing.operations.iter().map(|entry| entry.name).collect();
        assert_eq!(names, vec!["ListObjects", "ListObjectsV1"]);
        assert_eq!(listing.operations[1].parameters, 2);
        assert!(listing.operations[1].deprecated);

        let value = serde_json::to_value(&listing).unwrap();
        assert_eq!(value["apiVersion"], json!("2006-03-01"));
    }

    #[test]
    fn test_parameter_rows() {
        let description = description();
        let operation = description.get_operation("ListObjects").unwrap();
        let rows: Vec<Vec<String>> = operation
            .params()
            .iter()
            .map(|(name, schema)| parameter_row(name, schema))
            .collect();

        assert_eq!(rows[0], vec!["Bucket", "string", "yes", "", "Bucket name"]);
        assert_eq!(rows[1], vec!["MaxKeys", "integer", "no", "1000", ""]);
    }
}
