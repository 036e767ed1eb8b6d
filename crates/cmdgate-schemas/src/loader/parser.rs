//! Document parsing for YAML and JSON description files
//!
//! Copyright (c) 2025 Cmdgate Team
//! Licensed under the Apache-2.0 license

use crate::loader::error::{LoaderError, LoaderResult};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Supported file formats for description documents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// YAML format (.yaml, .yml)
    Yaml,
    /// JSON format (.json)
    Json,
}

impl Format {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> LoaderResult<Self> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .as_deref()
        {
            Some("yaml" | "yml") => Ok(Format::Yaml),
            Some("json") => Ok(Format::Json),
            _ => Err(LoaderError::unsupported_format(path.to_path_buf())),
        }
    }

    /// File extensions recognized for this format
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Format::Yaml => &["yaml", "yml"],
            Format::Json => &["json"],
        }
    }
}

/// Parser turning description files into JSON values
#[derive(Debug, Default)]
pub struct DocumentParser;

impl DocumentParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a file, detecting format from its extension
    pub fn parse_file(&self, path: &Path) -> LoaderResult<Value> {
        let format = Format::from_path(path)?;
        let content = std::fs::read_to_string(path)
            .map_err(|e| LoaderError::io_error(path.to_path_buf(), e))?;

        debug!(path = %path.display(), ?format, "parsing description document");
        let value = self.parse_content(&content, format, path)?;
        if !value.is_object() {
            return Err(LoaderError::validation_error(
                path.to_path_buf(),
                "document must be an object at the root level",
            ));
        }
        Ok(value)
    }

    /// Parse content with an explicit format. `path` is used for error context only.
    pub fn parse_content(&self, content: &str, format: Format, path: &Path) -> LoaderResult<Value> {
        match format {
            Format::Yaml => {
                // YAML is converted to a JSON value so later stages see one shape
                let yaml_value: serde_yaml::Value = serde_yaml::from_str(content)
                    .map_err(|e| LoaderError::yaml_parse_error(path.to_path_buf(), e))?;
                serde_json::to_value(yaml_value)
                    .map_err(|e| LoaderError::json_parse_error(path.to_path_buf(), e))
            }
            Format::Json => serde_json::from_str(content)
                .map_err(|e| LoaderError::json_parse_error(path.to_path_buf(), e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_format_detection() {
        assert_eq!(Format::from_path(Path::new("a.yaml")).unwrap(), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("a.YML")).unwrap(), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("a.json")).unwrap(), Format::Json);
        assert!(Format::from_path(Path::new("a.txt")).is_err());
        assert!(Format::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn test_yaml_keeps_key_order() {
        let parser = DocumentParser::new();
        let value = parser
            .parse_content("zeta: 1\nalpha: 2\n", Format::Yaml, Path::new("inline.yaml"))
            .unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_parse_file() -> LoaderResult<()> {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        writeln!(file, r#"{{"name": "svc", "operations": {{}}}}"#).unwrap();

        let value = DocumentParser::new().parse_file(file.path())?;
        assert_eq!(value["name"], "svc");
        Ok(())
    }

    #[test]
    fn test_root_must_be_object() {
        let mut file = Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "- a\n- b").unwrap();

        let err = DocumentParser::new().parse_file(file.path()).unwrap_err();
        assert!(matches!(err, LoaderError::ValidationError { .. }));
    }

    #[test]
    fn test_invalid_json_reports_path() {
        let err = DocumentParser::new()
            .parse_content("{", Format::Json, Path::new("broken.json"))
            .unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }
}
