// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Node data structure and error types
//!
//! Defines the Node stored in the hierarchical content tree along with
//! the error type for tree operations.

use crate::node::path;
use crate::node::value::Value;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use thiserror::Error;

/// Node type every node implicitly has
pub const NT_BASE: &str = "nt:base";
/// Default primary type for content nodes
pub const NT_UNSTRUCTURED: &str = "nt:unstructured";
/// Primary type of the root node
pub const REP_ROOT: &str = "rep:root";

/// Error types for node tree operations
#[derive(Error, Debug)]
pub enum NodeError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Node already exists: {0}")]
    NodeAlreadyExists(String),

    #[error("Parent node not found for {0}")]
    ParentNotFound(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("The root node cannot be {0}")]
    RootNode(String),
}

/// Content node with identity, position in the tree, node types and properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub uuid: String,
    pub path: String,
    pub primary_type: String,
    pub mixins: Vec<String>,
    pub properties: HashMap<String, Value>,
}

impl Node {
    /// Create a new unstructured node at the given path with a fresh uuid
    pub fn new(path: impl Into<String>) -> Self {
        Self::with_uuid(path, uuid::Uuid::new_v4().to_string())
    }

    /// Create a new unstructured node with a known uuid
    pub fn with_uuid(path: impl Into<String>, uuid: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            path: path.into(),
            primary_type: NT_UNSTRUCTURED.to_string(),
            mixins: Vec::new(),
            properties: HashMap::new(),
        }
    }

    /// Builder-style mixin assignment
    pub fn with_mixin(mut self, mixin: impl Into<String>) -> Self {
        self.add_mixin(mixin.into());
        self
    }

    /// Builder-style property assignment
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_property(key.into(), value.into());
        self
    }

    /// Last segment of the node path
    pub fn name(&self) -> &str {
        path::name(&self.path)
    }

    /// Path of the parent node, `None` for the root
    pub fn parent_path(&self) -> Option<&str> {
        path::parent(&self.path)
    }

    /// Depth below the root
    pub fn depth(&self) -> usize {
        path::depth(&self.path)
    }

    /// Add a mixin type to this node
    pub fn add_mixin(&mut self, mixin: String) {
        if !self.mixins.contains(&mixin) {
            self.mixins.push(mixin);
        }
    }

    /// Check if node has a specific mixin
    pub fn has_mixin(&self, mixin: &str) -> bool {
        self.mixins.iter().any(|m| m == mixin)
    }

    /// Check if node is of the given type (primary type, mixin, or nt:base)
    pub fn is_node_type(&self, node_type: &str) -> bool {
        node_type == NT_BASE || self.primary_type == node_type || self.has_mixin(node_type)
    }

    /// The type used to decide what a node hydrates into: its first mixin,
    /// or the primary type when it has none
    pub fn type_discriminator(&self) -> &str {
        self.mixins
            .first()
            .map(|m| m.as_str())
            .unwrap_or(&self.primary_type)
    }

    /// Set a property value
    pub fn set_property(&mut self, key: String, value: Value) {
        self.properties.insert(key, value);
    }

    /// Get a stored property value
    pub fn get_property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Remove a property
    pub fn remove_property(&mut self, key: &str) -> Option<Value> {
        self.properties.remove(key)
    }

    /// Check if node has a specific property
    pub fn has_property(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    /// Resolve a property by name, including the virtual `jcr:*` properties
    /// derived from the node's identity and types
    pub fn property_value(&self, key: &str) -> Option<Cow<'_, Value>> {
        match key {
            "jcr:uuid" => Some(Cow::Owned(Value::String(self.uuid.clone()))),
            "jcr:path" => Some(Cow::Owned(Value::String(self.path.clone()))),
            "jcr:name" => Some(Cow::Owned(Value::String(self.name().to_string()))),
            "jcr:primaryType" => Some(Cow::Owned(Value::String(self.primary_type.clone()))),
            "jcr:mixinTypes" => Some(Cow::Owned(Value::Array(
                self.mixins.iter().map(|m| Value::String(m.clone())).collect(),
            ))),
            _ => self.properties.get(key).map(Cow::Borrowed),
        }
    }
}
