//! Loading descriptions from files and validating against the result

use cmdgate_schemas::{Description, DescriptionError, LoaderError, SchemaValidator};
use serde_json::json;
use std::io::Write;
use tempfile::{Builder, NamedTempFile};

const STORAGE_YAML: &str = r#"
name: storage
apiVersion: "2024-01-01"
operations:
  CreateBucket:
    summary: Create a bucket
    parameters:
      Bucket:
        type: string
        required: true
        pattern: "/^[a-z0-9.-]{3,63}$/"
      Acl:
        type: string
        enum: [private, public-read]
        default: private
      Tags:
        $ref: TagSet
models:
  TagSet:
    type: array
    maxItems: 2
    items:
      type: object
      properties:
        Key: { type: string, required: true }
        Value: { type: string }
      additionalProperties: false
"#;

fn write_temp(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_yaml_description() {
    let file = write_temp(".yaml", STORAGE_YAML);
    let description = Description::from_file(file.path()).unwrap();

    assert_eq!(description.name(), Some("storage"));
    let op = description.get_operation("CreateBucket").unwrap();
    let names: Vec<&str> = op.params().iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["Bucket", "Acl", "Tags"]);
    assert_eq!(op.param("Tags").unwrap().max_items(), Some(2));
}

#[test]
fn test_load_json_description() {
    let document = json!({
        "operations": {
            "Ping": {"parameters": {"Count": {"type": "integer", "minimum": 1}}}
        }
    });
    let file = write_temp(".json", &document.to_string());
    let description = Description::from_file(file.path()).unwrap();
    assert!(description.has_operation("Ping"));
}

#[test]
fn test_missing_file_is_loader_error() {
    let err = Description::from_file("/definitely/not/here.yaml").unwrap_err();
    match err {
        DescriptionError::Loader(inner) => assert!(inner.is_not_found()),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_unsupported_extension() {
    let file = write_temp(".txt", "{}");
    let err = Description::from_file(file.path()).unwrap_err();
    assert!(matches!(err, DescriptionError::Loader(LoaderError::UnsupportedFormat { .. })));
}

#[test]
fn test_validate_against_loaded_schemas() {
    let file = write_temp(".yaml", STORAGE_YAML);
    let description = Description::from_file(file.path()).unwrap();
    let op = description.get_operation("CreateBucket").unwrap();
    let validator = SchemaValidator::default();

    let bucket = validator.validate(op.param("Bucket").unwrap(), "Bucket", Some(&json!("My Bucket")));
    assert_eq!(
        bucket.errors,
        vec!["[Bucket] must match the following regular expression: /^[a-z0-9.-]{3,63}$/"]
    );

    let acl = validator.validate(op.param("Acl").unwrap(), "Acl", None);
    assert!(acl.is_valid());
    assert_eq!(acl.value, Some(json!("private")));

    let tags = validator.validate(
        op.param("Tags").unwrap(),
        "Tags",
        Some(&json!([{"Key": "env"}, {"Value": "x", "Color": "red"}, {"Key": "team"}])),
    );
    assert_eq!(
        tags.errors,
        vec![
            "[Tags][1][Key] is a required string",
            "[Tags][1][Color] is not an allowed property",
            "[Tags] must contain 2 or fewer elements",
        ]
    );
}
