// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Native query doubles for document layer unit tests

use crate::node::{Node, Value};
use crate::store::{NativeQuery, NativeResult, Row, StoreError, StoreResult};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Counts row fetches across clones
#[derive(Debug, Clone, Default)]
pub struct FetchCounter(Arc<AtomicUsize>);

impl FetchCounter {
    pub fn fetches(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

fn nodes(count: usize) -> Vec<Arc<Node>> {
    (0..count)
        .map(|i| Arc::new(Node::with_uuid(format!("/node{}", i), format!("node{}", i))))
        .collect()
}

#[derive(Debug)]
pub struct FakeResult {
    rows: StoreResult<Vec<Arc<Node>>>,
    counter: FetchCounter,
}

impl FakeResult {
    pub fn with_nodes(count: usize, counter: FetchCounter) -> Self {
        Self {
            rows: Ok(nodes(count)),
            counter,
        }
    }

    pub fn failing(counter: FetchCounter) -> Self {
        Self {
            rows: Err(StoreError::InvalidQuery("store unavailable".to_string())),
            counter,
        }
    }
}

impl NativeResult for FakeResult {
    fn selector_names(&self) -> Vec<String> {
        vec!["node".to_string()]
    }

    fn column_names(&self) -> Vec<String> {
        Vec::new()
    }

    fn rows(&mut self) -> StoreResult<Vec<Row>> {
        self.counter.record();
        match &self.rows {
            Ok(nodes) => Ok(nodes.iter().cloned().map(Row::single).collect()),
            Err(e) => Err(StoreError::InvalidQuery(e.to_string())),
        }
    }
}

/// Records every call made on it
#[derive(Debug)]
pub struct FakeQuery {
    nodes: usize,
    counter: FetchCounter,
    log: Arc<Mutex<Vec<String>>>,
    limit: Option<usize>,
    offset: Option<usize>,
}

impl FakeQuery {
    pub fn new(nodes: usize, counter: FetchCounter) -> Self {
        Self {
            nodes,
            counter,
            log: Arc::new(Mutex::new(Vec::new())),
            limit: None,
            offset: None,
        }
    }

    pub fn log(&self) -> Arc<Mutex<Vec<String>>> {
        self.log.clone()
    }
}

impl NativeQuery for FakeQuery {
    fn statement(&self) -> &str {
        "fake"
    }

    fn language(&self) -> &str {
        "fake"
    }

    fn set_limit(&mut self, limit: usize) {
        self.log.lock().push(format!("limit {}", limit));
        self.limit = Some(limit);
    }

    fn set_offset(&mut self, offset: usize) {
        self.log.lock().push(format!("offset {}", offset));
        self.offset = Some(offset);
    }

    fn limit(&self) -> Option<usize> {
        self.limit
    }

    fn offset(&self) -> Option<usize> {
        self.offset
    }

    fn bind_value(&mut self, name: &str, _value: Value) -> StoreResult<()> {
        self.log.lock().push(format!("bind {}", name));
        Ok(())
    }

    fn variable_names(&self) -> Vec<String> {
        Vec::new()
    }

    fn execute(&self) -> StoreResult<Box<dyn NativeResult>> {
        self.log.lock().push("execute".to_string());
        let rows = nodes(self.nodes)
            .into_iter()
            .skip(self.offset.unwrap_or(0))
            .take(self.limit.unwrap_or(usize::MAX))
            .collect();
        Ok(Box::new(FakeResult {
            rows: Ok(rows),
            counter: self.counter.clone(),
        }))
    }
}
