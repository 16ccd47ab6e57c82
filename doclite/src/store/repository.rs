// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Node repository
//!
//! Thread-safe facade over the node tree and its optional persistent
//! storage. The tree is always fully loaded in memory; `save` writes it
//! back through the configured storage driver.

use crate::node::{path, Node, NodeError, Value};
use crate::store::data_adapter::DataAdapter;
use crate::store::error::StoreResult;
use crate::store::node_tree::NodeTree;
use crate::store::persistent::{create_storage_driver, DynStorageDriver, StorageType};
use crate::store::query::StoreQuery;
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;

/// Hierarchical node store
pub struct NodeRepository {
    tree: Arc<RwLock<NodeTree>>,
    driver: Option<Box<DynStorageDriver>>,
    data_adapter: DataAdapter,
}

impl std::fmt::Debug for NodeRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRepository")
            .field("nodes", &self.len())
            .field("storage", &self.storage_type())
            .finish()
    }
}

impl NodeRepository {
    /// Create a repository that lives only in memory
    pub fn in_memory() -> Self {
        Self {
            tree: Arc::new(RwLock::new(NodeTree::new())),
            driver: None,
            data_adapter: DataAdapter::new(),
        }
    }

    /// Open a persistent repository, loading every stored node
    pub fn open<P: AsRef<Path>>(storage_type: StorageType, path: P) -> StoreResult<Self> {
        let driver = create_storage_driver(storage_type, path.as_ref())?;
        let data_adapter = DataAdapter::new();
        let tree = data_adapter.load_tree(driver.as_ref())?;

        log::info!(
            "Opened {} repository at {} with {} nodes",
            storage_type,
            path.as_ref().display(),
            tree.len()
        );

        Ok(Self {
            tree: Arc::new(RwLock::new(tree)),
            driver: Some(driver),
            data_adapter,
        })
    }

    /// Storage backend, `None` for a purely in-memory repository
    pub fn storage_type(&self) -> Option<StorageType> {
        self.driver.as_ref().map(|driver| driver.storage_type())
    }

    /// Shared handle to the node tree
    pub fn tree(&self) -> Arc<RwLock<NodeTree>> {
        self.tree.clone()
    }

    pub fn root(&self) -> Arc<Node> {
        self.tree.read().root().clone()
    }

    /// Add a node below an existing parent
    pub fn add_node(&self, node: Node) -> StoreResult<Arc<Node>> {
        let node = self.tree.write().add_node(node)?;
        log::debug!("Added node {} ({})", node.path, node.uuid);
        Ok(node)
    }

    /// Add a node, creating missing ancestors as `nt:unstructured` nodes
    pub fn add_node_with_ancestors(&self, node: Node) -> StoreResult<Arc<Node>> {
        let mut ancestors = Vec::new();
        let mut current = path::parent(&node.path);
        while let Some(parent) = current {
            ancestors.push(parent.to_string());
            current = path::parent(parent);
        }

        let mut tree = self.tree.write();
        for ancestor in ancestors.into_iter().rev() {
            if tree.get_by_path(&ancestor).is_none() {
                tree.add_node(Node::new(ancestor))?;
            }
        }
        Ok(tree.add_node(node)?)
    }

    pub fn node_by_uuid(&self, uuid: &str) -> Option<Arc<Node>> {
        self.tree.read().get_by_uuid(uuid).cloned()
    }

    pub fn node_by_path(&self, node_path: &str) -> Option<Arc<Node>> {
        let normalized = path::normalize(node_path).ok()?;
        self.tree.read().get_by_path(&normalized).cloned()
    }

    /// Look up a node by absolute path or uuid
    pub fn node(&self, identifier: &str) -> StoreResult<Arc<Node>> {
        let found = if identifier.starts_with('/') {
            self.node_by_path(identifier)
        } else {
            self.node_by_uuid(identifier)
        };
        Ok(found.ok_or_else(|| NodeError::NodeNotFound(identifier.to_string()))?)
    }

    /// Direct children of a node, in insertion order
    pub fn children(&self, identifier: &str) -> StoreResult<Vec<Arc<Node>>> {
        let node = self.node(identifier)?;
        Ok(self.tree.read().children(&node.uuid))
    }

    pub fn set_property(&self, identifier: &str, key: &str, value: Value) -> StoreResult<()> {
        let node = self.node(identifier)?;
        self.tree.write().set_property(&node.uuid, key, value)?;
        Ok(())
    }

    pub fn remove_property(&self, identifier: &str, key: &str) -> StoreResult<Option<Value>> {
        let node = self.node(identifier)?;
        Ok(self.tree.write().remove_property(&node.uuid, key)?)
    }

    pub fn add_mixin(&self, identifier: &str, mixin: &str) -> StoreResult<()> {
        let node = self.node(identifier)?;
        self.tree.write().add_mixin(&node.uuid, mixin)?;
        Ok(())
    }

    /// Remove a node and its subtree, returning how many nodes were removed
    pub fn remove_node(&self, identifier: &str) -> StoreResult<usize> {
        let node = self.node(identifier)?;
        let removed = self.tree.write().remove_node(&node.uuid)?;
        log::debug!("Removed {} nodes below {}", removed.len(), node.path);
        Ok(removed.len())
    }

    /// Write the tree to persistent storage; a no-op in memory
    pub fn save(&self) -> StoreResult<()> {
        match &self.driver {
            Some(driver) => {
                let tree = self.tree.read();
                self.data_adapter.save_tree(driver.as_ref(), &tree)
            }
            None => Ok(()),
        }
    }

    /// Number of nodes, including the root
    pub fn len(&self) -> usize {
        self.tree.read().len()
    }

    /// Check if the repository holds nothing but the root
    pub fn is_empty(&self) -> bool {
        self.tree.read().is_empty()
    }

    /// Prepare a query over this repository
    pub fn create_query(&self, statement: &str) -> StoreResult<StoreQuery> {
        StoreQuery::new(statement, self.tree.clone())
    }
}
