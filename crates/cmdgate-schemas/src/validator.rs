//! Recursive schema validator
//!
//! [`SchemaValidator`] checks a value against a [`ParameterSchema`], filling
//! in defaults along the way, and reports every problem it finds as a
//! human-readable message keyed by a bracketed path such as
//! `[Config][Tags][0]`. Results are returned per call, so one validator can be
//! shared freely between threads.
//!
//! Copyright (c) 2025 Cmdgate Team
//! Licensed under the Apache-2.0 license

use crate::parameter::{AdditionalProperties, ParamType, ParameterSchema};
use crate::value::{as_f64, display_value, format_bound, is_integer};
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use tracing::warn;

/// Outcome of validating one value
#[derive(Debug, Clone, PartialEq)]
pub struct Validation {
    /// The value after defaults and integer-to-string casting were applied
    pub value: Option<Value>,
    /// Every message produced while walking the value
    pub errors: Vec<String>,
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validates values against parameter schemas
#[derive(Debug)]
pub struct SchemaValidator {
    cast_integer_to_string: bool,
    patterns: Mutex<HashMap<String, Option<Regex>>>,
}

impl Default for SchemaValidator {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Clone for SchemaValidator {
    fn clone(&self) -> Self {
        Self::new(self.cast_integer_to_string)
    }
}

impl SchemaValidator {
    /// Create a validator.
    ///
    /// With `cast_integer_to_string` set, an integer given for a `string`
    /// parameter is converted instead of being rejected.
    pub fn new(cast_integer_to_string: bool) -> Self {
        Self {
            cast_integer_to_string,
            patterns: Mutex::new(HashMap::new()),
        }
    }

    pub fn casts_integer_to_string(&self) -> bool {
        self.cast_integer_to_string
    }

    /// Validate `value` against `schema`, reporting problems under `name`
    pub fn validate(&self, schema: &ParameterSchema, name: &str, value: Option<&Value>) -> Validation {
        let mut value = value.cloned();
        let mut errors = Vec::new();
        self.process(schema, &mut value, &format!("[{}]", name), &mut errors);
        Validation { value, errors }
    }

    fn process(
        &self,
        schema: &ParameterSchema,
        value: &mut Option<Value>,
        path: &str,
        errors: &mut Vec<String>,
    ) {
        *value = schema.value_or_default(value.take());

        if schema.is_static() || (is_absent(value) && !schema.is_required()) {
            return;
        }

        let types = schema.types();
        if types == [ParamType::Object] {
            if let Some(Value::Array(_)) = value {
                errors.push(format!(
                    "{} must be an array of properties. Got a numerically indexed array.",
                    path
                ));
                return;
            }

            let temporary = is_absent(value);
            if temporary {
                *value = Some(Value::Object(Map::new()));
            }
            let mut emptied = false;
            if let Some(Value::Object(map)) = value.as_mut() {
                self.process_members(schema, map, path, errors);
                emptied = temporary && map.is_empty();
            }
            if emptied {
                *value = None;
            }
        } else if types.contains(&ParamType::Array) {
            if let (Some(item_schema), Some(Value::Array(items))) = (schema.items(), value.as_mut()) {
                for (index, item) in items.iter_mut().enumerate() {
                    let mut slot = Some(std::mem::take(item));
                    self.process(item_schema, &mut slot, &format!("{}[{}]", path, index), errors);
                    *item = slot.unwrap_or(Value::Null);
                }
            }
        }

        if schema.is_required() && is_absent(value) && types != [ParamType::Null] {
            let mut message = if types.is_empty() {
                format!("{} is required", path)
            } else {
                format!("{} is a required {}", path, schema.type_label())
            };
            if let Some(description) = schema.description() {
                message.push_str(": ");
                message.push_str(description);
            }
            errors.push(message);
            return;
        }

        if types.is_empty() {
            return;
        }

        let null = Value::Null;
        let current = value.as_ref().unwrap_or(&null);
        let Some(matched) = types.iter().copied().find(|t| t.matches(current)) else {
            if self.cast_integer_to_string && types == [ParamType::String] && is_integer(current) {
                let cast = Value::String(current.to_string());
                *value = Some(cast);
            } else {
                errors.push(format!("{} must be of type {}", path, schema.type_label()));
            }
            return;
        };

        match (matched, current) {
            (ParamType::String, Value::String(s)) => self.check_string(schema, s, path, errors),
            (ParamType::Array, Value::Array(items)) => check_item_count(schema, items.len(), path, errors),
            (ParamType::Integer | ParamType::Number | ParamType::Numeric, number) => {
                if let Some(n) = as_f64(number) {
                    check_range(schema, n, path, errors);
                }
            }
            _ => {}
        }
    }

    fn process_members(
        &self,
        schema: &ParameterSchema,
        map: &mut Map<String, Value>,
        path: &str,
        errors: &mut Vec<String>,
    ) {
        for property in schema.properties() {
            let name = property.name();
            let mut slot = map.get(name).filter(|v| !v.is_null()).cloned();
            self.process(property, &mut slot, &format!("{}[{}]", path, name), errors);
            if let Some(v) = slot {
                map.insert(name.to_string(), v);
            }
        }

        let additional = schema.additional_properties();
        if matches!(additional, AdditionalProperties::Allowed(true)) {
            return;
        }

        let undeclared: Vec<String> = map
            .keys()
            .filter(|key| schema.property(key).is_none())
            .cloned()
            .collect();
        for key in undeclared {
            match additional {
                AdditionalProperties::Schema(inner) => {
                    let mut slot = map.get(&key).cloned();
                    self.process(inner, &mut slot, &format!("{}[{}]", path, key), errors);
                    if let Some(v) = slot {
                        map.insert(key, v);
                    }
                }
                AdditionalProperties::Allowed(_) => {
                    errors.push(format!("{}[{}] is not an allowed property", path, key));
                }
            }
        }
    }

    fn check_string(&self, schema: &ParameterSchema, s: &str, path: &str, errors: &mut Vec<String>) {
        if let Some(allowed) = schema.allowed_values() {
            if !allowed.is_empty() && !allowed.iter().any(|a| display_value(a) == s) {
                let quoted: Vec<String> = allowed
                    .iter()
                    .map(|a| format!("\"{}\"", add_slashes(&display_value(a))))
                    .collect();
                errors.push(format!("{} must be one of {}", path, quoted.join(" or ")));
            }
        }

        if let Some(pattern) = schema.pattern() {
            if !self.pattern_matches(pattern, s) {
                errors.push(format!(
                    "{} must match the following regular expression: {}",
                    path, pattern
                ));
            }
        }

        let length = s.chars().count();
        if let Some(min) = schema.min_length() {
            if length < min {
                errors.push(format!("{} length must be greater than or equal to {}", path, min));
            }
        }
        if let Some(max) = schema.max_length() {
            if length > max {
                errors.push(format!("{} length must be less than or equal to {}", path, max));
            }
        }
    }

    /// Match against a cached compiled pattern. Invalid patterns never match.
    fn pattern_matches(&self, pattern: &str, input: &str) -> bool {
        let compiled = {
            let mut cache = self.patterns.lock().unwrap_or_else(PoisonError::into_inner);
            cache
                .entry(pattern.to_string())
                .or_insert_with(|| match Regex::new(&translate_pattern(pattern)) {
                    Ok(re) => Some(re),
                    Err(e) => {
                        warn!(pattern, error = %e, "invalid parameter pattern");
                        None
                    }
                })
                .clone()
        };
        compiled.map(|re| re.is_match(input)).unwrap_or(false)
    }
}

fn is_absent(value: &Option<Value>) -> bool {
    matches!(value, None | Some(Value::Null))
}

fn check_item_count(schema: &ParameterSchema, count: usize, path: &str, errors: &mut Vec<String>) {
    if let Some(min) = schema.min_items() {
        if count < min {
            errors.push(format!("{} must contain {} or more elements", path, min));
        }
    }
    if let Some(max) = schema.max_items() {
        if count > max {
            errors.push(format!("{} must contain {} or fewer elements", path, max));
        }
    }
}

fn check_range(schema: &ParameterSchema, n: f64, path: &str, errors: &mut Vec<String>) {
    if let Some(min) = schema.minimum() {
        if n < min {
            errors.push(format!("{} must be greater than or equal to {}", path, format_bound(min)));
        }
    }
    if let Some(max) = schema.maximum() {
        if n > max {
            errors.push(format!("{} must be less than or equal to {}", path, format_bound(max)));
        }
    }
}

fn add_slashes(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

const PATTERN_DELIMITERS: [char; 6] = ['/', '#', '~', '@', '%', '!'];

/// Accept delimited patterns such as `/^[a-z]+$/i` as well as bare ones
fn translate_pattern(pattern: &str) -> String {
    let Some(delimiter) = pattern.chars().next() else {
        return String::new();
    };
    if !PATTERN_DELIMITERS.contains(&delimiter) {
        return pattern.to_string();
    }
    let Some(end) = pattern.rfind(delimiter).filter(|&end| end > 0) else {
        return pattern.to_string();
    };
    let body = &pattern[delimiter.len_utf8()..end];
    let modifiers = &pattern[end + delimiter.len_utf8()..];
    if !modifiers.chars().all(|c| c.is_ascii_alphabetic()) {
        return pattern.to_string();
    }

    let flags: String = modifiers.chars().filter(|c| matches!(c, 'i' | 'm' | 's' | 'x')).collect();
    if flags.is_empty() {
        body.to_string()
    } else {
        format!("(?{}){}", flags, body)
    }
}
