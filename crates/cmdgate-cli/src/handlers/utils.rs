//! Shared utilities for command handlers

use crate::config::Config;
use crate::error::{Error, Result};
use cmdgate_schemas::{Description, DocumentParser, Format};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Find the description file named by a `<DESCRIPTION>` argument.
///
/// An existing path wins. A bare name is looked up in the configured
/// descriptions directory under every supported extension.
pub fn resolve_description(reference: &str, config: &Config) -> Result<PathBuf> {
    let direct = Path::new(reference);
    if direct.is_file() {
        return Ok(direct.to_path_buf());
    }

    let looks_like_path = direct.extension().is_some() || direct.components().count() > 1;
    if looks_like_path {
        return Err(Error::FileNotFound {
            path: direct.to_path_buf(),
        });
    }

    let dir = &config.paths.descriptions_dir;
    [Format::Yaml, Format::Json]
        .iter()
        .flat_map(|format| format.extensions())
        .map(|extension| dir.join(format!("{}.{}", reference, extension)))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| Error::DescriptionNotFound {
            name: reference.to_string(),
            searched: dir.clone(),
        })
}

/// Resolve and load a description
pub fn load_description(reference: &str, config: &Config) -> Result<Description> {
    let path = resolve_description(reference, config)?;
    debug!(path = %path.display(), "resolved description");
    Ok(Description::from_file(&path)?)
}

/// Read a JSON or YAML parameter object from disk
pub fn load_params_file(path: &Path) -> Result<Map<String, Value>> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    match DocumentParser::new().parse_file(path)? {
        Value::Object(params) => Ok(params),
        _ => Err(Error::InvalidFormat {
            path: path.to_path_buf(),
            expected: "a parameter object".to_string(),
        }),
    }
}

/// Split a `key=value` argument.
///
/// The value is read as JSON when it parses, so `-p MaxKeys=10` yields a
/// number and `-p Tags='["a"]'` an array. Anything else stays a string.
pub fn parse_param(pair: &str) -> Result<(String, Value)> {
    let (key, raw) = pair
        .split_once('=')
        .ok_or_else(|| Error::invalid_args(format!("expected KEY=VALUE, got '{}'", pair)))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(Error::invalid_args(format!("missing parameter name in '{}'", pair)));
    }

    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigBuilder;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_parse_param_values() {
        assert_eq!(parse_param("Bucket=photos").unwrap(), ("Bucket".to_string(), json!("photos")));
        assert_eq!(parse_param("MaxKeys=10").unwrap().1, json!(10));
        assert_eq!(parse_param("Versioned=true").unwrap().1, json!(true));
        assert_eq!(parse_param("Tags=[\"a\",\"b\"]").unwrap().1, json!(["a", "b"]));
        assert_eq!(parse_param("Prefix=").unwrap().1, json!(""));
        assert_eq!(parse_param("Query=a=b").unwrap().1, json!("a=b"));
        assert_eq!(parse_param("Zip=\"02134\"").unwrap().1, json!("02134"));
    }

    #[test]
    fn test_parse_param_rejects_malformed_pairs() {
        assert!(matches!(parse_param("Bucket"), Err(Error::InvalidArgs(_))));
        assert!(matches!(parse_param(" =x"), Err(Error::InvalidArgs(_))));
    }

    #[test]
    fn test_resolve_by_name_and_path() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("storage.yml");
        std::fs::write(&file, "operations: {}\n").unwrap();
        let config = ConfigBuilder::new().descriptions_dir(dir.path()).build();

        assert_eq!(resolve_description("storage", &config).unwrap(), file);
        assert_eq!(
            resolve_description(file.to_str().unwrap(), &config).unwrap(),
            file
        );
        assert!(matches!(
            resolve_description("queue", &config),
            Err(Error::DescriptionNotFound { .. })
        ));
        assert!(matches!(
            resolve_description("missing/queue.yaml", &config),
            Err(Error::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_params_file_must_hold_an_object() {
        let dir = TempDir::new().unwrap();

        let good = dir.path().join("params.yaml");
        std::fs::write(&good, "Bucket: photos\nMaxKeys: 5\n").unwrap();
        let params = load_params_file(&good).unwrap();
        assert_eq!(params.get("MaxKeys"), Some(&json!(5)));

        let list = dir.path().join("params.json");
        std::fs::write(&list, "[1, 2]").unwrap();
        assert!(load_params_file(&list).is_err());

        assert!(matches!(
            load_params_file(&dir.path().join("absent.json")),
            Err(Error::FileNotFound { .. })
        ));
    }
}
