// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Document queries

use crate::document::collection::ResultCollection;
use crate::document::error::{DocumentError, DocumentResult};
use crate::document::events::{EventDispatcher, QueryExecuteEvent};
use crate::store::{NativeQuery, NativeResult, Parameters};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// How query results are returned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HydrationMode {
    /// Rows are hydrated into documents
    #[default]
    Document,
    /// The native result is returned as is
    RawNode,
}

impl FromStr for HydrationMode {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "document" => Ok(HydrationMode::Document),
            "raw-node" | "raw_node" | "node" => Ok(HydrationMode::RawNode),
            _ => Err(DocumentError::InvalidHydrationMode(s.to_string())),
        }
    }
}

impl fmt::Display for HydrationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HydrationMode::Document => write!(f, "document"),
            HydrationMode::RawNode => write!(f, "raw-node"),
        }
    }
}

/// Result of `Query::execute`
#[derive(Debug)]
pub enum QueryOutput {
    Raw(Box<dyn NativeResult>),
    Documents(ResultCollection),
}

impl QueryOutput {
    pub fn into_documents(self) -> Option<ResultCollection> {
        match self {
            QueryOutput::Documents(collection) => Some(collection),
            QueryOutput::Raw(_) => None,
        }
    }

    pub fn into_raw(self) -> Option<Box<dyn NativeResult>> {
        match self {
            QueryOutput::Raw(result) => Some(result),
            QueryOutput::Documents(_) => None,
        }
    }
}

/// A native query plus locale, selector and pagination settings
#[derive(Debug)]
pub struct Query {
    native: Box<dyn NativeQuery>,
    dispatcher: Arc<EventDispatcher>,
    locale: Option<String>,
    primary_selector: Option<String>,
    max_results: Option<usize>,
    first_result: Option<usize>,
    memoize_documents: bool,
}

impl Query {
    pub fn new(native: Box<dyn NativeQuery>, dispatcher: Arc<EventDispatcher>) -> Self {
        Self {
            native,
            dispatcher,
            locale: None,
            primary_selector: None,
            max_results: None,
            first_result: None,
            memoize_documents: true,
        }
    }

    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    pub fn set_locale(&mut self, locale: Option<String>) {
        self.locale = locale;
    }

    pub fn primary_selector(&self) -> Option<&str> {
        self.primary_selector.as_deref()
    }

    /// Selector whose node each row hydrates, for joined queries
    pub fn set_primary_selector(&mut self, selector: Option<String>) {
        self.primary_selector = selector;
    }

    pub fn max_results(&self) -> Option<usize> {
        self.max_results
    }

    pub fn set_max_results(&mut self, max_results: Option<usize>) {
        self.max_results = max_results;
    }

    pub fn first_result(&self) -> Option<usize> {
        self.first_result
    }

    pub fn set_first_result(&mut self, first_result: Option<usize>) {
        self.first_result = first_result;
    }

    /// Whether collections keep hydrated documents per row (on by default)
    pub fn set_memoize_documents(&mut self, memoize: bool) {
        self.memoize_documents = memoize;
    }

    pub fn native_query(&self) -> &dyn NativeQuery {
        self.native.as_ref()
    }

    pub fn native_query_mut(&mut self) -> &mut dyn NativeQuery {
        self.native.as_mut()
    }

    pub fn dispatcher(&self) -> &Arc<EventDispatcher> {
        &self.dispatcher
    }

    /// Bind parameters, apply pagination and execute.
    ///
    /// Pagination and bindings stay on the native query after the call.
    pub fn execute(
        &mut self,
        parameters: &Parameters,
        mode: HydrationMode,
    ) -> DocumentResult<QueryOutput> {
        if let Some(max_results) = self.max_results {
            self.native.set_limit(max_results);
        }
        if let Some(first_result) = self.first_result {
            self.native.set_offset(first_result);
        }
        for (name, value) in parameters {
            self.native.bind_value(name, value.clone())?;
        }

        let result = self.native.execute()?;

        match mode {
            HydrationMode::RawNode => Ok(QueryOutput::Raw(result)),
            HydrationMode::Document => {
                self.dispatcher
                    .dispatch_query_execute(&QueryExecuteEvent::new(self, result.as_ref()));

                Ok(QueryOutput::Documents(ResultCollection::new(
                    result,
                    self.dispatcher.clone(),
                    self.locale.clone(),
                    self.primary_selector.clone(),
                    self.memoize_documents,
                )))
            }
        }
    }

    /// Execute in document mode
    pub fn execute_documents(&mut self, parameters: &Parameters) -> DocumentResult<ResultCollection> {
        match self.execute(parameters, HydrationMode::Document)? {
            QueryOutput::Documents(collection) => Ok(collection),
            QueryOutput::Raw(_) => Err(DocumentError::InvalidHydrationMode(
                HydrationMode::RawNode.to_string(),
            )),
        }
    }

    /// Execute in raw-node mode
    pub fn execute_raw(&mut self, parameters: &Parameters) -> DocumentResult<Box<dyn NativeResult>> {
        match self.execute(parameters, HydrationMode::RawNode)? {
            QueryOutput::Raw(result) => Ok(result),
            QueryOutput::Documents(_) => Err(DocumentError::InvalidHydrationMode(
                HydrationMode::Document.to_string(),
            )),
        }
    }
}
