//! Commands: a named operation plus its parameter values
//!
//! Parameters keep insertion order, so enumeration during validation follows
//! the order in which the caller set them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::ops::Index;

/// A mutable bag of named parameter values addressed to one operation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Command {
    name: String,
    #[serde(default)]
    params: Map<String, Value>,
}

static NULL: Value = Value::Null;

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Map::new(),
        }
    }

    pub fn with_params(name: impl Into<String>, params: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    /// Builder-style `set`
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Operation name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    /// Set a parameter, returning the previous value. Existing keys keep their position.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.params.insert(key.into(), value.into())
    }

    /// Whether the key is present, even with a `null` value
    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// Whether the key holds a non-null value
    pub fn has_value(&self, key: &str) -> bool {
        self.params.get(key).is_some_and(|v| !v.is_null())
    }

    /// Remove a parameter, keeping the order of the rest
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.params.shift_remove(key)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Name/value pairs in insertion order
    pub fn iter(&self) -> serde_json::map::Iter<'_> {
        self.params.iter()
    }

    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    /// Copy of every name/value pair
    pub fn to_map(&self) -> Map<String, Value> {
        self.params.clone()
    }

    pub fn into_params(self) -> Map<String, Value> {
        self.params
    }
}

impl Index<&str> for Command {
    type Output = Value;

    /// Absent parameters read as `null`
    fn index(&self, key: &str) -> &Value {
        self.params.get(key).unwrap_or(&NULL)
    }
}

impl<'a> IntoIterator for &'a Command {
    type Item = (&'a String, &'a Value);
    type IntoIter = serde_json::map::Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_set_contains() {
        let mut command = Command::new("GetObject").with("Bucket", "photos");
        assert_eq!(command.name(), "GetObject");
        assert_eq!(command.get("Bucket"), Some(&json!("photos")));
        assert!(command.contains("Bucket"));
        assert!(!command.contains("Key"));

        assert_eq!(command.set("Bucket", "videos"), Some(json!("photos")));
        assert_eq!(command["Bucket"], json!("videos"));
        assert_eq!(command["Missing"], Value::Null);
    }

    #[test]
    fn test_null_is_present_but_valueless() {
        let command = Command::new("Op").with("Marker", Value::Null);
        assert!(command.contains("Marker"));
        assert!(!command.has_value("Marker"));
    }

    #[test]
    fn test_insertion_order_survives_updates_and_removal() {
        let mut command = Command::new("Op").with("c", 1).with("a", 2).with("b", 3);
        command.set("c", 10);
        command.remove("a");
        let keys: Vec<&String> = command.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["c", "b"]);
        assert_eq!(command.len(), 2);
    }

    #[test]
    fn test_serde_round_trip() {
        let command = Command::new("Op").with("Limit", 5);
        let value = serde_json::to_value(&command).unwrap();
        assert_eq!(value, json!({"name": "Op", "params": {"Limit": 5}}));

        let parsed: Command = serde_json::from_value(json!({"name": "Op"})).unwrap();
        assert!(parsed.is_empty());
    }
}
