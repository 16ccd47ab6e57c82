// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Native query result rows

use crate::node::{Node, Value};
use crate::store::error::{StoreError, StoreResult};
use std::collections::HashMap;
use std::sync::Arc;

/// Which nodes a row refers to
#[derive(Debug, Clone, PartialEq)]
pub enum RowShape {
    /// Single-selector query: one node per row
    SingleNode(Arc<Node>),
    /// Joined query: one node per selector name
    MultiSelector(HashMap<String, Arc<Node>>),
}

/// A single result row
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub shape: RowShape,
    /// Selected column values (e.g., "page.title" -> "Home")
    pub values: HashMap<String, Value>,
    /// Full-text relevance score, 0 when the query has no CONTAINS constraint
    pub score: f64,
}

impl Row {
    /// Create a row over a single node
    pub fn single(node: Arc<Node>) -> Self {
        Self {
            shape: RowShape::SingleNode(node),
            values: HashMap::new(),
            score: 0.0,
        }
    }

    /// Create a row over several named selectors
    pub fn multi(nodes: HashMap<String, Arc<Node>>) -> Self {
        Self {
            shape: RowShape::MultiSelector(nodes),
            values: HashMap::new(),
            score: 0.0,
        }
    }

    pub fn with_value(mut self, column: impl Into<String>, value: Value) -> Self {
        self.values.insert(column.into(), value);
        self
    }

    /// Node for the given selector.
    ///
    /// Single-node rows return their node whatever the selector. Joined rows
    /// need a known selector, or must hold exactly one node.
    pub fn node(&self, selector: Option<&str>) -> StoreResult<&Arc<Node>> {
        match (&self.shape, selector) {
            (RowShape::SingleNode(node), _) => Ok(node),
            (RowShape::MultiSelector(nodes), Some(name)) => nodes
                .get(name)
                .ok_or_else(|| StoreError::UnknownSelector(name.to_string())),
            (RowShape::MultiSelector(nodes), None) => {
                let mut iter = nodes.values();
                match (iter.next(), iter.next()) {
                    (Some(node), None) => Ok(node),
                    _ => Err(StoreError::AmbiguousSelector(nodes.len())),
                }
            }
        }
    }

    /// All nodes of the row, keyed by selector (`None` for single-node rows)
    pub fn nodes(&self) -> Vec<(Option<&str>, &Arc<Node>)> {
        match &self.shape {
            RowShape::SingleNode(node) => vec![(None, node)],
            RowShape::MultiSelector(nodes) => {
                let mut entries: Vec<_> = nodes
                    .iter()
                    .map(|(name, node)| (Some(name.as_str()), node))
                    .collect();
                entries.sort_by(|a, b| a.0.cmp(&b.0));
                entries
            }
        }
    }

    /// Get a column value
    pub fn get_value(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }
}
