// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Native query contract
//!
//! The document layer only talks to the store through these two traits, so
//! any query backend that produces node rows can feed it.

use crate::node::{Node, Value};
use crate::store::error::StoreResult;
use crate::store::row::Row;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Bound parameters by variable name
pub type Parameters = HashMap<String, Value>;

/// A prepared query over the node store
pub trait NativeQuery: fmt::Debug + Send {
    /// Statement text as given to the store
    fn statement(&self) -> &str;

    /// Query language identifier
    fn language(&self) -> &str;

    fn set_limit(&mut self, limit: usize);

    fn set_offset(&mut self, offset: usize);

    fn limit(&self) -> Option<usize>;

    fn offset(&self) -> Option<usize>;

    /// Bind a value to a `$variable` of the statement
    fn bind_value(&mut self, name: &str, value: Value) -> StoreResult<()>;

    /// Variables the statement declares
    fn variable_names(&self) -> Vec<String>;

    /// Execute with the current bindings and pagination
    fn execute(&self) -> StoreResult<Box<dyn NativeResult>>;
}

/// Result handle of an executed native query
pub trait NativeResult: fmt::Debug + Send {
    /// Selector names in declaration order
    fn selector_names(&self) -> Vec<String>;

    /// Selected column names
    fn column_names(&self) -> Vec<String>;

    /// Result rows in store order
    fn rows(&mut self) -> StoreResult<Vec<Row>>;

    /// Nodes of the first selector, one per row
    fn nodes(&mut self) -> StoreResult<Vec<Arc<Node>>> {
        let selector = self.selector_names().into_iter().next();
        self.rows()?
            .iter()
            .map(|row| row.node(selector.as_deref()).cloned())
            .collect()
    }
}
