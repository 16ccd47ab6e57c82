// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Document manager
//!
//! Entry point tying a node repository to an event dispatcher. Queries
//! created here carry the configured default locale and memoization.

use crate::config::DocumentManagerConfig;
use crate::document::document::Document;
use crate::document::error::{DocumentError, DocumentResult};
use crate::document::events::EventDispatcher;
use crate::document::query::Query;
use crate::node::NodeError;
use crate::store::{NodeRepository, StoreError};
use std::sync::Arc;

#[derive(Debug)]
pub struct DocumentManager {
    repository: Arc<NodeRepository>,
    dispatcher: Arc<EventDispatcher>,
    config: DocumentManagerConfig,
}

impl DocumentManager {
    pub fn new(
        repository: Arc<NodeRepository>,
        dispatcher: Arc<EventDispatcher>,
        config: DocumentManagerConfig,
    ) -> DocumentResult<Self> {
        config.validate()?;
        Ok(Self {
            repository,
            dispatcher,
            config,
        })
    }

    /// Open the configured storage and build a manager on it
    pub fn from_config(
        config: DocumentManagerConfig,
        dispatcher: Arc<EventDispatcher>,
    ) -> DocumentResult<Self> {
        config.validate()?;
        let repository = config.storage.open_repository()?;
        Self::new(Arc::new(repository), dispatcher, config)
    }

    pub fn repository(&self) -> &Arc<NodeRepository> {
        &self.repository
    }

    pub fn dispatcher(&self) -> &Arc<EventDispatcher> {
        &self.dispatcher
    }

    pub fn config(&self) -> &DocumentManagerConfig {
        &self.config
    }

    fn resolve_locale(&self, locale: Option<&str>) -> String {
        locale.unwrap_or(&self.config.default_locale).to_string()
    }

    /// Create a document query for a statement
    pub fn create_query(
        &self,
        statement: &str,
        locale: Option<&str>,
        primary_selector: Option<&str>,
    ) -> DocumentResult<Query> {
        let native = self.repository.create_query(statement)?;
        let mut query = Query::new(Box::new(native), self.dispatcher.clone());
        query.set_locale(Some(self.resolve_locale(locale)));
        query.set_primary_selector(primary_selector.map(str::to_string));
        query.set_memoize_documents(self.config.memoize_documents);
        Ok(query)
    }

    /// Hydrate the node with the given uuid or absolute path
    pub fn find(&self, identifier: &str, locale: Option<&str>) -> DocumentResult<Arc<dyn Document>> {
        let node = match self.repository.node(identifier) {
            Ok(node) => node,
            Err(StoreError::Node(NodeError::NodeNotFound(_))) => {
                return Err(DocumentError::NodeNotFound(identifier.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        let locale = self.resolve_locale(locale);
        self.dispatcher.hydrate(node, Some(&locale))
    }
}
