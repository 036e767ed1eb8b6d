//! Output formats a parameter can declare
//!
//! A format converts an incoming value (Unix timestamp or date string) into
//! the canonical textual form expected downstream. When a schema declares a
//! format, it replaces the schema's filters during filtering.
//!
//! Copyright (c) 2025 Cmdgate Team
//! Licensed under the Apache-2.0 license

use crate::filters::{coerce_bool, FilterError};
use crate::value::display_value;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Supported parameter formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchemaFormat {
    /// `2024-01-31T12:00:00Z`
    DateTime,
    /// `Wed, 31 Jan 2024 12:00:00 GMT`
    DateTimeHttp,
    /// `2024-01-31`
    Date,
    /// `12:00:00`
    Time,
    /// Unix seconds as an integer
    Timestamp,
    /// `"true"` or `"false"`
    BooleanString,
}

impl fmt::Display for SchemaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::DateTime => "date-time",
            Self::DateTimeHttp => "date-time-http",
            Self::Date => "date",
            Self::Time => "time",
            Self::Timestamp => "timestamp",
            Self::BooleanString => "boolean-string",
        };
        f.write_str(name)
    }
}

impl SchemaFormat {
    /// Convert a value into this format
    pub fn apply(&self, value: &Value) -> Result<Value, FilterError> {
        let render = |pattern: &str| -> Result<Value, FilterError> {
            Ok(Value::String(self.parse_instant(value)?.format(pattern).to_string()))
        };

        match self {
            Self::BooleanString => Ok(Value::String(coerce_bool(value).to_string())),
            Self::DateTime => render("%Y-%m-%dT%H:%M:%SZ"),
            Self::DateTimeHttp => render("%a, %d %b %Y %H:%M:%S GMT"),
            Self::Date => render("%Y-%m-%d"),
            Self::Time => render("%H:%M:%S"),
            Self::Timestamp => Ok(Value::from(self.parse_instant(value)?.timestamp())),
        }
    }

    fn parse_instant(&self, value: &Value) -> Result<DateTime<Utc>, FilterError> {
        let parsed = match value {
            Value::Number(n) => n.as_i64().and_then(|secs| DateTime::from_timestamp(secs, 0)),
            Value::String(s) => parse_date_string(s.trim()),
            _ => None,
        };

        parsed.ok_or_else(|| FilterError::Format {
            format: self.to_string(),
            value: display_value(value),
            message: "expected a Unix timestamp or a date string".to_string(),
        })
    }
}

fn parse_date_string(input: &str) -> Option<DateTime<Utc>> {
    if let Ok(secs) = input.parse::<i64>() {
        return DateTime::from_timestamp(secs, 0);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(input) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}
