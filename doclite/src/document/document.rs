// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Documents: locale-specific projections of nodes

use crate::node::Value;
use serde::Serialize;
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;

/// A hydrated document
pub trait Document: Any + fmt::Debug + Send + Sync {
    fn uuid(&self) -> &str;

    fn path(&self) -> &str;

    /// Locale the document was hydrated for
    fn locale(&self) -> Option<&str>;

    /// Type discriminator of the source node
    fn document_type(&self) -> &str;

    fn as_any(&self) -> &dyn Any;

    /// JSON view used for display and export
    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "uuid": self.uuid(),
            "path": self.path(),
            "type": self.document_type(),
            "locale": self.locale(),
        })
    }
}

impl dyn Document {
    /// Downcast to a concrete document type
    pub fn downcast_ref<T: Document>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn is<T: Document>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

/// Document carrying the locale-resolved property view of its node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenericDocument {
    pub uuid: String,
    pub path: String,
    pub document_type: String,
    pub locale: Option<String>,
    pub properties: BTreeMap<String, Value>,
}

impl GenericDocument {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// String property shortcut
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_string)
    }
}

impl Document for GenericDocument {
    fn uuid(&self) -> &str {
        &self.uuid
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    fn document_type(&self) -> &str {
        &self.document_type
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn to_json(&self) -> serde_json::Value {
        let properties: serde_json::Map<String, serde_json::Value> = self
            .properties
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect();
        serde_json::json!({
            "uuid": self.uuid,
            "path": self.path,
            "type": self.document_type,
            "locale": self.locale,
            "properties": properties,
        })
    }
}

/// Document whose content was deserialized into a user type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hydrated<T> {
    pub uuid: String,
    pub path: String,
    pub document_type: String,
    pub locale: Option<String>,
    pub content: T,
}

impl<T> Document for Hydrated<T>
where
    T: Serialize + fmt::Debug + Send + Sync + 'static,
{
    fn uuid(&self) -> &str {
        &self.uuid
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    fn document_type(&self) -> &str {
        &self.document_type
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
