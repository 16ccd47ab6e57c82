// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Value type system for node properties
//!
//! Mirrors the property types of a hierarchical content repository:
//! - Scalar types: String, Long, Double, Boolean, Null
//! - Temporal types: Date
//! - Identity types: Reference (uuid of another node)
//! - Multi-valued properties: Array

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Value types for node properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    String(String),
    Long(i64),
    Double(f64),
    Boolean(bool),
    Date(DateTime<Utc>),
    Reference(String), // uuid of the referenced node
    Array(Vec<Value>), // multi-valued property
    Null,
}

impl Value {
    /// Extract as string if possible
    pub fn as_string(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            Value::Reference(uuid) => Some(uuid),
            _ => None,
        }
    }

    /// Extract as integer if possible
    pub fn as_long(&self) -> Option<i64> {
        match self {
            Value::Long(n) => Some(*n),
            Value::Double(n) if n.fract() == 0.0 => Some(*n as i64),
            _ => None,
        }
    }

    /// Extract as floating point number if possible (from Long or Double)
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Long(n) => Some(*n as f64),
            Value::Double(n) => Some(*n),
            _ => None,
        }
    }

    /// Extract as boolean if possible
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Extract as datetime if possible
    pub fn as_date(&self) -> Option<&DateTime<Utc>> {
        match self {
            Value::Date(dt) => Some(dt),
            _ => None,
        }
    }

    /// Extract as array if possible
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Check if value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if this is a multi-valued property
    pub fn is_multiple(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// Single values of this property: the elements of an array, or the value itself
    pub fn values(&self) -> Vec<&Value> {
        match self {
            Value::Array(arr) => arr.iter().collect(),
            Value::Null => Vec::new(),
            other => vec![other],
        }
    }

    /// Get the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "String",
            Value::Long(_) => "Long",
            Value::Double(_) => "Double",
            Value::Boolean(_) => "Boolean",
            Value::Date(_) => "Date",
            Value::Reference(_) => "Reference",
            Value::Array(_) => "Array",
            Value::Null => "Null",
        }
    }

    /// Compare two single values
    ///
    /// Long and Double compare numerically, References compare with
    /// Strings by their uuid. Values of unrelated types are not comparable.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Long(a), Value::Long(b)) => Some(a.cmp(b)),
            (Value::Long(_) | Value::Double(_), Value::Long(_) | Value::Double(_)) => {
                let a = self.as_double()?;
                let b = other.as_double()?;
                a.partial_cmp(&b)
            }
            (
                Value::String(a) | Value::Reference(a),
                Value::String(b) | Value::Reference(b),
            ) => Some(a.cmp(b)),
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::String(b)) => parse_date(b).map(|b| a.cmp(&b)),
            (Value::String(a), Value::Date(b)) => parse_date(a).map(|a| a.cmp(b)),
            _ => None,
        }
    }

    /// Total order used for sorting
    ///
    /// Values of different types order by type: Null, Boolean, numbers,
    /// Date, String and Reference, then Array. Numbers order by magnitude
    /// with NaN after every other number.
    pub fn sort_order(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Long(a), Value::Long(b)) => a.cmp(b),
            (Value::Long(_) | Value::Double(_), Value::Long(_) | Value::Double(_)) => {
                let a = normalize_nan(self.as_double().unwrap_or(f64::NAN));
                let b = normalize_nan(other.as_double().unwrap_or(f64::NAN));
                // a Double sits before a Long of the same magnitude
                a.total_cmp(&b)
                    .then_with(|| self.variant_rank().cmp(&other.variant_rank()))
                    .then_with(|| match (self, other) {
                        (Value::Long(a), Value::Long(b)) => a.cmp(b),
                        _ => Ordering::Equal,
                    })
            }
            (
                Value::String(a) | Value::Reference(a),
                Value::String(b) | Value::Reference(b),
            ) => a
                .cmp(b)
                .then_with(|| self.variant_rank().cmp(&other.variant_rank())),
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            (Value::Array(a), Value::Array(b)) => a
                .iter()
                .zip(b)
                .map(|(x, y)| x.sort_order(y))
                .find(|order| *order != Ordering::Equal)
                .unwrap_or_else(|| a.len().cmp(&b.len())),
            _ => self.type_rank().cmp(&other.type_rank()),
        }
    }

    fn type_rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Boolean(_) => 1,
            Value::Long(_) | Value::Double(_) => 2,
            Value::Date(_) => 3,
            Value::String(_) | Value::Reference(_) => 4,
            Value::Array(_) => 5,
        }
    }

    /// Tie-break between the two variants sharing a type rank
    fn variant_rank(&self) -> u8 {
        match self {
            Value::Double(_) | Value::String(_) => 0,
            _ => 1,
        }
    }

    /// Build a value from a JSON value
    ///
    /// Objects of the form `{"$date": "..."}` and `{"$ref": "..."}` become
    /// typed Date and Reference values; other objects are stored as their
    /// JSON text.
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Long(i),
                None => Value::Double(n.as_f64().unwrap_or(0.0)),
            },
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => {
                Value::Array(items.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => {
                if let Some(date) = map.get("$date").and_then(|v| v.as_str()) {
                    if let Some(dt) = parse_date(date) {
                        return Value::Date(dt);
                    }
                }
                if let Some(uuid) = map.get("$ref").and_then(|v| v.as_str()) {
                    return Value::Reference(uuid.to_string());
                }
                Value::String(json.to_string())
            }
        }
    }

    /// Convert to a plain JSON value
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Long(n) => serde_json::json!(n),
            Value::Double(n) => serde_json::json!(n),
            Value::String(s) | Value::Reference(s) => serde_json::Value::String(s.clone()),
            Value::Date(dt) => serde_json::Value::String(dt.to_rfc3339()),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(|v| v.to_json()).collect())
            }
        }
    }
}

/// Every NaN takes the same position, after positive infinity
fn normalize_nan(value: f64) -> f64 {
    if value.is_nan() {
        f64::NAN
    } else {
        value
    }
}

fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Long(n) => write!(f, "{}", n),
            Value::Double(n) => write!(f, "{}", n),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Date(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%SZ")),
            Value::Reference(uuid) => write!(f, "REF({})", uuid),
            Value::Array(arr) => {
                write!(f, "[")?;
                for (i, item) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Null => write!(f, "null"),
        }
    }
}

/// Convert from Rust primitive types to Value
impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Long(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Long(n as i64)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Double(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Value::Date(dt)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(vec: Vec<T>) -> Self {
        Value::Array(vec.into_iter().map(Into::into).collect())
    }
}
