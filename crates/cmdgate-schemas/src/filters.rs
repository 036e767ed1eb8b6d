//! Named value filters applied to parameters before validation
//!
//! A filter is referenced from a parameter schema either by name (`"trim"`)
//! or as a call spec (`{"method": "join", "args": ["@value", ","]}`) where the
//! literal `@value` argument is replaced with the value being filtered.
//!
//! Copyright (c) 2025 Cmdgate Team
//! Licensed under the Apache-2.0 license

use crate::value::{as_f64, display_value, type_name};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};
use thiserror::Error;

/// Placeholder replaced with the filtered value in call-style filter args
pub const VALUE_PLACEHOLDER: &str = "@value";

/// Errors raised while filtering or formatting a value
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    /// No filter registered under this name
    #[error("Unknown filter '{name}'")]
    UnknownFilter { name: String },

    /// A filter received an argument it cannot work with
    #[error("Filter '{filter}' failed: {message}")]
    InvalidArgument { filter: String, message: String },

    /// A format could not be applied to the value
    #[error("Cannot apply format '{format}' to {value}: {message}")]
    Format {
        format: String,
        value: String,
        message: String,
    },
}

impl FilterError {
    pub fn invalid_argument(filter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            filter: filter.into(),
            message: message.into(),
        }
    }
}

/// A filter reference as written in a description document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterSpec {
    /// Bare filter name, called with the value as its only argument
    Name(String),
    /// Filter name with explicit arguments
    Call {
        method: String,
        #[serde(default = "placeholder_args")]
        args: Vec<Value>,
    },
}

fn placeholder_args() -> Vec<Value> {
    vec![Value::String(VALUE_PLACEHOLDER.to_string())]
}

impl FilterSpec {
    /// Create a call-style spec
    pub fn call(method: impl Into<String>, args: Vec<Value>) -> Self {
        Self::Call {
            method: method.into(),
            args,
        }
    }

    /// Name of the filter to invoke
    pub fn method(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Call { method, .. } => method,
        }
    }

    /// Arguments with every `@value` placeholder substituted
    pub fn resolve_args(&self, value: &Value) -> Vec<Value> {
        match self {
            Self::Name(_) => vec![value.clone()],
            Self::Call { args, .. } => args
                .iter()
                .map(|arg| match arg {
                    Value::String(s) if s == VALUE_PLACEHOLDER => value.clone(),
                    other => other.clone(),
                })
                .collect(),
        }
    }
}

impl From<&str> for FilterSpec {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.method())
    }
}

/// A filter implementation: receives the resolved arguments, returns the new value
pub type FilterFn = Arc<dyn Fn(&[Value]) -> Result<Value, FilterError> + Send + Sync>;

/// Registry of filters addressable by name
#[derive(Clone)]
pub struct FilterRegistry {
    filters: HashMap<String, FilterFn>,
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterRegistry")
            .field("filters", &self.names())
            .finish()
    }
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl FilterRegistry {
    /// Registry without any filters
    pub fn empty() -> Self {
        Self {
            filters: HashMap::new(),
        }
    }

    /// Registry preloaded with the built-in filters
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register("trim", |args| map_string("trim", args, |s| s.trim().to_string()));
        registry.register("lowercase", |args| map_string("lowercase", args, |s| s.to_lowercase()));
        registry.register("strtolower", |args| map_string("strtolower", args, |s| s.to_lowercase()));
        registry.register("uppercase", |args| map_string("uppercase", args, |s| s.to_uppercase()));
        registry.register("strtoupper", |args| map_string("strtoupper", args, |s| s.to_uppercase()));
        registry.register("ucfirst", |args| map_string("ucfirst", args, ucfirst));
        registry.register("to_string", to_string);
        registry.register("to_integer", to_integer);
        registry.register("to_number", to_number);
        registry.register("to_boolean", |args| Ok(Value::Bool(coerce_bool(first_arg("to_boolean", args)?))));
        registry.register("json_encode", |args| Ok(Value::String(first_arg("json_encode", args)?.to_string())));
        registry.register("join", join);
        registry.register("split", split);
        registry
    }

    /// Process-wide registry holding only the built-ins
    pub fn shared() -> &'static FilterRegistry {
        static SHARED: OnceLock<FilterRegistry> = OnceLock::new();
        SHARED.get_or_init(FilterRegistry::with_builtins)
    }

    /// Register (or replace) a filter
    pub fn register<F>(&mut self, name: impl Into<String>, filter: F) -> &mut Self
    where
        F: Fn(&[Value]) -> Result<Value, FilterError> + Send + Sync + 'static,
    {
        self.filters.insert(name.into(), Arc::new(filter));
        self
    }

    /// Whether a filter with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    /// Registered filter names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.filters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Apply a single filter spec to a value
    pub fn apply(&self, spec: &FilterSpec, value: &Value) -> Result<Value, FilterError> {
        let filter = self
            .filters
            .get(spec.method())
            .ok_or_else(|| FilterError::UnknownFilter {
                name: spec.method().to_string(),
            })?;
        filter(&spec.resolve_args(value))
    }
}

/// Loose boolean coercion: `"true"`, `"1"`, `"yes"`, `"on"` and non-zero numbers are true
pub fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "yes" | "on"
        ),
        _ => false,
    }
}

fn first_arg<'a>(filter: &str, args: &'a [Value]) -> Result<&'a Value, FilterError> {
    args.first()
        .ok_or_else(|| FilterError::invalid_argument(filter, "missing value argument"))
}

fn string_arg<'a>(filter: &str, args: &'a [Value], index: usize) -> Result<&'a str, FilterError> {
    match args.get(index) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(FilterError::invalid_argument(
            filter,
            format!("argument {} must be a string, got {}", index, type_name(other)),
        )),
        None => Err(FilterError::invalid_argument(
            filter,
            format!("missing argument {}", index),
        )),
    }
}

fn map_string(filter: &str, args: &[Value], f: impl Fn(&str) -> String) -> Result<Value, FilterError> {
    match first_arg(filter, args)? {
        Value::String(s) => Ok(Value::String(f(s))),
        Value::Array(_) | Value::Object(_) => Err(FilterError::invalid_argument(
            filter,
            "expected a scalar value",
        )),
        other => Ok(Value::String(f(&display_value(other)))),
    }
}

fn ucfirst(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn to_string(args: &[Value]) -> Result<Value, FilterError> {
    match first_arg("to_string", args)? {
        Value::Array(_) | Value::Object(_) => Err(FilterError::invalid_argument(
            "to_string",
            "expected a scalar value",
        )),
        other => Ok(Value::String(display_value(other))),
    }
}

fn to_integer(args: &[Value]) -> Result<Value, FilterError> {
    let value = first_arg("to_integer", args)?;
    match value {
        Value::Bool(b) => Ok(Value::from(*b as i64)),
        other => as_f64(other)
            .map(|f| Value::from(f.trunc() as i64))
            .ok_or_else(|| {
                FilterError::invalid_argument(
                    "to_integer",
                    format!("cannot convert {} to an integer", type_name(other)),
                )
            }),
    }
}

fn to_number(args: &[Value]) -> Result<Value, FilterError> {
    let value = first_arg("to_number", args)?;
    if let Value::Number(_) = value {
        return Ok(value.clone());
    }
    let parsed = as_f64(value).ok_or_else(|| {
        FilterError::invalid_argument(
            "to_number",
            format!("cannot convert {} to a number", type_name(value)),
        )
    })?;
    if parsed.fract() == 0.0 && parsed.abs() < i64::MAX as f64 {
        Ok(Value::from(parsed as i64))
    } else {
        serde_json::Number::from_f64(parsed)
            .map(Value::Number)
            .ok_or_else(|| FilterError::invalid_argument("to_number", "value is not finite"))
    }
}

fn join(args: &[Value]) -> Result<Value, FilterError> {
    let separator = match args.get(1) {
        None => ",",
        Some(_) => string_arg("join", args, 1)?,
    };
    match first_arg("join", args)? {
        Value::Array(items) => Ok(Value::String(
            items.iter().map(display_value).collect::<Vec<_>>().join(separator),
        )),
        other => Ok(Value::String(display_value(other))),
    }
}

fn split(args: &[Value]) -> Result<Value, FilterError> {
    let input = string_arg("split", args, 0)?;
    let separator = match args.get(1) {
        None => ",",
        Some(_) => string_arg("split", args, 1)?,
    };
    if separator.is_empty() {
        return Err(FilterError::invalid_argument("split", "separator cannot be empty"));
    }
    Ok(Value::Array(
        input
            .split(separator)
            .map(|part| Value::String(part.to_string()))
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builtin_string_filters() {
        let registry = FilterRegistry::with_builtins();
        assert_eq!(registry.apply(&"trim".into(), &json!("  hi  ")).unwrap(), json!("hi"));
        assert_eq!(registry.apply(&"strtoupper".into(), &json!("abc")).unwrap(), json!("ABC"));
        assert_eq!(registry.apply(&"lowercase".into(), &json!("ABC")).unwrap(), json!("abc"));
        assert_eq!(registry.apply(&"ucfirst".into(), &json!("éclair")).unwrap(), json!("Éclair"));
        assert_eq!(registry.apply(&"uppercase".into(), &json!(12)).unwrap(), json!("12"));
    }

    #[test]
    fn test_call_spec_substitutes_placeholder() {
        let registry = FilterRegistry::with_builtins();
        let spec = FilterSpec::call("join", vec![json!("@value"), json!("|")]);
        assert_eq!(registry.apply(&spec, &json!(["a", 1, true])).unwrap(), json!("a|1|true"));

        let spec: FilterSpec = serde_json::from_value(json!({"method": "split"})).unwrap();
        assert_eq!(registry.apply(&spec, &json!("x,y")).unwrap(), json!(["x", "y"]));
    }

    #[test]
    fn test_numeric_filters() {
        let registry = FilterRegistry::with_builtins();
        assert_eq!(registry.apply(&"to_integer".into(), &json!("42.9")).unwrap(), json!(42));
        assert_eq!(registry.apply(&"to_integer".into(), &json!(true)).unwrap(), json!(1));
        assert_eq!(registry.apply(&"to_number".into(), &json!("2.5")).unwrap(), json!(2.5));
        assert_eq!(registry.apply(&"to_number".into(), &json!("7")).unwrap(), json!(7));
        assert!(registry.apply(&"to_number".into(), &json!("seven")).is_err());
    }

    #[test]
    fn test_unknown_filter() {
        let registry = FilterRegistry::empty();
        let err = registry.apply(&"trim".into(), &json!("x")).unwrap_err();
        assert_eq!(err, FilterError::UnknownFilter { name: "trim".to_string() });
    }

    #[test]
    fn test_custom_filter_registration() {
        let mut registry = FilterRegistry::with_builtins();
        registry.register("double", |args| {
            let n = args.first().and_then(Value::as_i64).unwrap_or_default();
            Ok(json!(n * 2))
        });
        assert!(registry.contains("double"));
        assert_eq!(registry.apply(&"double".into(), &json!(21)).unwrap(), json!(42));
    }

    #[test]
    fn test_coerce_bool() {
        assert!(coerce_bool(&json!("Yes")));
        assert!(coerce_bool(&json!("1")));
        assert!(!coerce_bool(&json!("off")));
        assert!(!coerce_bool(&json!("banana")));
        assert!(coerce_bool(&json!(2)));
    }
}
