//! Parameter schema definitions
//!
//! A [`ParameterSchema`] is the contract for one named command parameter:
//! its accepted types, whether it is required, its default, the filters or
//! format used to normalize it, and the nested schemas used for objects and
//! arrays. Schemas are immutable once a description has been built.
//!
//! Copyright (c) 2025 Cmdgate Team
//! Licensed under the Apache-2.0 license

use crate::filters::{coerce_bool, FilterError, FilterRegistry, FilterSpec};
use crate::format::SchemaFormat;
use crate::value::{is_integer, is_numeric, is_truthy};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Type names accepted in the `type` attribute of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Integer,
    Number,
    Numeric,
    Boolean,
    Object,
    Array,
    Null,
    Any,
}

impl ParamType {
    /// Whether a JSON value satisfies this type
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => is_integer(value),
            Self::Number | Self::Numeric => is_numeric(value),
            Self::Boolean => value.is_boolean(),
            Self::Object => value.is_object(),
            Self::Array => value.is_array(),
            Self::Null => !is_truthy(Some(value)),
            Self::Any => true,
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Numeric => "numeric",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
            Self::Null => "null",
            Self::Any => "any",
        };
        f.write_str(name)
    }
}

/// Policy for object members that are not listed in `properties`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    /// `true` accepts anything, `false` rejects every undeclared member
    Allowed(bool),
    /// Undeclared members must satisfy this schema
    Schema(Box<ParameterSchema>),
}

impl Default for AdditionalProperties {
    fn default() -> Self {
        Self::Allowed(true)
    }
}

impl AdditionalProperties {
    fn is_default(&self) -> bool {
        matches!(self, Self::Allowed(true))
    }
}

/// Schema describing one command parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSchema {
    #[serde(skip)]
    name: String,
    #[serde(
        rename = "type",
        default,
        deserialize_with = "deserialize_types",
        skip_serializing_if = "Vec::is_empty"
    )]
    types: Vec<ParamType>,
    #[serde(default, skip_serializing_if = "is_false")]
    required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default: Option<Value>,
    #[serde(rename = "static", default, skip_serializing_if = "is_false")]
    is_static: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    allowed_values: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    minimum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    maximum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    min_items: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_items: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    format: Option<SchemaFormat>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    filters: Vec<FilterSpec>,
    #[serde(
        default,
        deserialize_with = "deserialize_properties",
        serialize_with = "serialize_properties",
        skip_serializing_if = "Vec::is_empty"
    )]
    properties: Vec<ParameterSchema>,
    #[serde(default, skip_serializing_if = "AdditionalProperties::is_default")]
    additional_properties: AdditionalProperties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    items: Option<Box<ParameterSchema>>,
}

impl Default for ParameterSchema {
    fn default() -> Self {
        Self::new("")
    }
}

impl ParameterSchema {
    /// Create an unconstrained schema for the named parameter
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            types: Vec::new(),
            required: false,
            default: None,
            is_static: false,
            description: None,
            allowed_values: None,
            pattern: None,
            min_length: None,
            max_length: None,
            minimum: None,
            maximum: None,
            min_items: None,
            max_items: None,
            format: None,
            filters: Vec::new(),
            properties: Vec::new(),
            additional_properties: AdditionalProperties::default(),
            items: None,
        }
    }

    /// Parse a schema from its document form and give it a name
    pub fn from_value(name: impl Into<String>, value: Value) -> Result<Self, serde_json::Error> {
        let schema: ParameterSchema = serde_json::from_value(value)?;
        Ok(schema.with_name(name))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_type(mut self, param_type: ParamType) -> Self {
        if !self.types.contains(&param_type) {
            self.types.push(param_type);
        }
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Force the parameter to always take its default
    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_enum(mut self, values: Vec<Value>) -> Self {
        self.allowed_values = Some(values);
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn with_length(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.min_length = min;
        self.max_length = max;
        self
    }

    pub fn with_range(mut self, minimum: Option<f64>, maximum: Option<f64>) -> Self {
        self.minimum = minimum;
        self.maximum = maximum;
        self
    }

    pub fn with_item_count(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.min_items = min;
        self.max_items = max;
        self
    }

    pub fn with_format(mut self, format: SchemaFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_filter(mut self, filter: impl Into<FilterSpec>) -> Self {
        self.filters.push(filter.into());
        self
    }

    /// Add (or replace) a named object member
    pub fn with_property(mut self, property: ParameterSchema) -> Self {
        match self.properties.iter_mut().find(|p| p.name == property.name) {
            Some(existing) => *existing = property,
            None => self.properties.push(property),
        }
        self
    }

    pub fn with_additional_properties(mut self, policy: AdditionalProperties) -> Self {
        self.additional_properties = policy;
        self
    }

    pub fn with_items(mut self, items: ParameterSchema) -> Self {
        self.items = Some(Box::new(items));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn types(&self) -> &[ParamType] {
        &self.types
    }

    /// Declared types joined with `or`, as used in messages
    pub fn type_label(&self) -> String {
        self.types
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" or ")
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn allowed_values(&self) -> Option<&[Value]> {
        self.allowed_values.as_deref()
    }

    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }

    pub fn min_length(&self) -> Option<usize> {
        self.min_length
    }

    pub fn max_length(&self) -> Option<usize> {
        self.max_length
    }

    pub fn minimum(&self) -> Option<f64> {
        self.minimum
    }

    pub fn maximum(&self) -> Option<f64> {
        self.maximum
    }

    pub fn min_items(&self) -> Option<usize> {
        self.min_items
    }

    pub fn max_items(&self) -> Option<usize> {
        self.max_items
    }

    pub fn format(&self) -> Option<SchemaFormat> {
        self.format
    }

    pub fn filters(&self) -> &[FilterSpec] {
        &self.filters
    }

    pub fn properties(&self) -> &[ParameterSchema] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&ParameterSchema> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn additional_properties(&self) -> &AdditionalProperties {
        &self.additional_properties
    }

    pub fn items(&self) -> Option<&ParameterSchema> {
        self.items.as_deref()
    }

    /// The value the parameter takes before validation.
    ///
    /// Static parameters always take their default; an absent or `null`
    /// value is replaced by the default when one is declared.
    pub fn value_or_default(&self, value: Option<Value>) -> Option<Value> {
        if self.is_static {
            return self.default.clone();
        }
        match value {
            None | Some(Value::Null) if self.default.is_some() => self.default.clone(),
            other => other,
        }
    }

    /// Normalize a value with the built-in filter registry
    pub fn filter(&self, value: &Value) -> Result<Value, FilterError> {
        self.filter_with(value, FilterRegistry::shared())
    }

    /// Normalize a value.
    ///
    /// A declared format replaces filtering entirely. Otherwise a
    /// boolean-only parameter coerces non-boolean input first, then every
    /// filter runs in declaration order.
    pub fn filter_with(&self, value: &Value, registry: &FilterRegistry) -> Result<Value, FilterError> {
        if let Some(format) = self.format {
            return format.apply(value);
        }

        let mut filtered = value.clone();
        if self.types == [ParamType::Boolean] && !filtered.is_boolean() {
            filtered = Value::Bool(coerce_bool(&filtered));
        }
        for spec in &self.filters {
            filtered = registry.apply(spec, &filtered)?;
        }
        Ok(filtered)
    }
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

fn deserialize_types<'de, D>(deserializer: D) -> Result<Vec<ParamType>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(ParamType),
        Many(Vec<ParamType>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(t) => vec![t],
        OneOrMany::Many(ts) => ts,
    })
}

/// Deserialize an ordered `name -> schema` map, naming each schema after its key
pub(crate) fn deserialize_properties<'de, D>(deserializer: D) -> Result<Vec<ParameterSchema>, D::Error>
where
    D: Deserializer<'de>,
{
    struct NamedSchemas;

    impl<'de> Visitor<'de> for NamedSchemas {
        type Value = Vec<ParameterSchema>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of parameter names to schemas")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut schemas = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((name, schema)) = map.next_entry::<String, ParameterSchema>()? {
                schemas.push(schema.with_name(name));
            }
            Ok(schemas)
        }
    }

    deserializer.deserialize_map(NamedSchemas)
}

pub(crate) fn serialize_properties<S>(properties: &[ParameterSchema], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(properties.len()))?;
    for property in properties {
        map.serialize_entry(property.name(), property)?;
    }
    map.end()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_document_form() {
        let schema = ParameterSchema::from_value(
            "Bucket",
            json!({
                "type": ["string", "null"],
                "required": true,
                "minLength": 3,
                "filters": ["trim", {"method": "join", "args": ["@value", "-"]}],
                "location": "uri"
            }),
        )
        .unwrap();

        assert_eq!(schema.name(), "Bucket");
        assert_eq!(schema.types(), &[ParamType::String, ParamType::Null]);
        assert_eq!(schema.type_label(), "string or null");
        assert!(schema.is_required());
        assert_eq!(schema.min_length(), Some(3));
        assert_eq!(schema.filters().len(), 2);
    }

    #[test]
    fn test_nested_properties_keep_order_and_names() {
        let schema = ParameterSchema::from_value(
            "Config",
            json!({
                "type": "object",
                "properties": {
                    "zeta": {"type": "string"},
                    "alpha": {"type": "integer", "default": 1}
                },
                "additionalProperties": false,
                "items": null
            }),
        )
        .unwrap();

        let names: Vec<&str> = schema.properties().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        assert_eq!(schema.additional_properties(), &AdditionalProperties::Allowed(false));
        assert_eq!(schema.property("alpha").and_then(|p| p.default()), Some(&json!(1)));
    }

    #[test]
    fn test_additional_properties_schema() {
        let schema = ParameterSchema::from_value(
            "Tags",
            json!({"type": "object", "additionalProperties": {"type": "string"}}),
        )
        .unwrap();

        match schema.additional_properties() {
            AdditionalProperties::Schema(inner) => assert_eq!(inner.types(), &[ParamType::String]),
            other => panic!("unexpected policy: {:?}", other),
        }
    }

    #[test]
    fn test_value_or_default() {
        let schema = ParameterSchema::new("limit").with_default(json!(10));
        assert_eq!(schema.value_or_default(None), Some(json!(10)));
        assert_eq!(schema.value_or_default(Some(Value::Null)), Some(json!(10)));
        assert_eq!(schema.value_or_default(Some(json!(3))), Some(json!(3)));

        let fixed = ParameterSchema::new("version").with_default(json!("v2")).with_static(true);
        assert_eq!(fixed.value_or_default(Some(json!("v1"))), Some(json!("v2")));

        let bare = ParameterSchema::new("bare");
        assert_eq!(bare.value_or_default(None), None);
    }

    #[test]
    fn test_filter_chain_runs_in_order() {
        let schema = ParameterSchema::new("name")
            .with_filter("trim")
            .with_filter("strtoupper");
        assert_eq!(schema.filter(&json!("  abc ")).unwrap(), json!("ABC"));
    }

    #[test]
    fn test_format_supersedes_filters() {
        let schema = ParameterSchema::new("since")
            .with_format(SchemaFormat::Date)
            .with_filter("strtoupper");
        assert_eq!(schema.filter(&json!(0)).unwrap(), json!("1970-01-01"));
    }

    #[test]
    fn test_boolean_coercion() {
        let schema = ParameterSchema::new("flag").with_type(ParamType::Boolean);
        assert_eq!(schema.filter(&json!("yes")).unwrap(), json!(true));
        assert_eq!(schema.filter(&json!("nope")).unwrap(), json!(false));
    }

    #[test]
    fn test_serialize_round_trip() {
        let schema = ParameterSchema::new("Filter")
            .with_type(ParamType::Object)
            .with_property(ParameterSchema::new("Key").with_type(ParamType::String).required(true));
        let value = serde_json::to_value(&schema).unwrap();
        assert_eq!(value["properties"]["Key"]["required"], json!(true));
        assert!(value.get("additionalProperties").is_none());

        let parsed = ParameterSchema::from_value("Filter", value).unwrap();
        assert_eq!(parsed, schema);
    }
}
