// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Data adapter for node storage - handles serialization and data organization
//!
//! Bridges the in-memory NodeTree and the key-value storage drivers. Nodes
//! are written with bincode into the `nodes` tree, keyed by their position
//! in document order so that parents always load before their children.

use crate::node::{Node, Value};
use crate::store::error::StoreResult;
use crate::store::node_tree::NodeTree;
use crate::store::persistent::{DynStorageDriver, StorageTree};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const NODES_TREE: &str = "nodes";
const METADATA_TREE: &str = "metadata";

/// Serializable node structure for storage
#[derive(Serialize, Deserialize, Debug)]
struct SerializableNode {
    uuid: String,
    path: String,
    primary_type: String,
    mixins: Vec<String>,
    properties: HashMap<String, Value>,
}

impl From<&Node> for SerializableNode {
    fn from(node: &Node) -> Self {
        Self {
            uuid: node.uuid.clone(),
            path: node.path.clone(),
            primary_type: node.primary_type.clone(),
            mixins: node.mixins.clone(),
            properties: node.properties.clone(),
        }
    }
}

impl From<SerializableNode> for Node {
    fn from(stored: SerializableNode) -> Self {
        Node {
            uuid: stored.uuid,
            path: stored.path,
            primary_type: stored.primary_type,
            mixins: stored.mixins,
            properties: stored.properties,
        }
    }
}

/// Data adapter that handles serialization and organization of node data
#[derive(Debug, Default)]
pub struct DataAdapter;

impl DataAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Storage key of the node at `position` in document order
    fn sequence_key(position: usize) -> [u8; 8] {
        (position as u64).to_be_bytes()
    }

    /// Load the node tree persisted in the driver, or an empty tree when
    /// nothing was saved yet
    pub fn load_tree(&self, driver: &DynStorageDriver) -> StoreResult<NodeTree> {
        let nodes_tree = driver.open_tree(NODES_TREE)?;
        if nodes_tree.is_empty()? {
            return Ok(NodeTree::new());
        }
        let expected = driver
            .open_tree(METADATA_TREE)?
            .get(b"node_count")?
            .and_then(|bytes| <[u8; 8]>::try_from(bytes.as_slice()).ok())
            .map(u64::from_be_bytes);

        let mut stored = Vec::new();
        for entry in nodes_tree.iter()? {
            let (_, data) = entry?;
            let node: SerializableNode = bincode::deserialize(&data)?;
            stored.push(Node::from(node));
        }

        let mut nodes = stored.into_iter();
        let mut tree = match nodes.next() {
            Some(root) if root.path == crate::node::path::ROOT => NodeTree::with_root(root),
            Some(first) => {
                log::warn!(
                    "Stored node tree does not start with the root node ({}), creating a new root",
                    first.path
                );
                let mut tree = NodeTree::new();
                tree.add_node(first)?;
                tree
            }
            None => return Ok(NodeTree::new()),
        };

        for node in nodes {
            tree.add_node(node)?;
        }

        if let Some(expected) = expected {
            if expected != tree.len() as u64 {
                log::warn!(
                    "Storage metadata records {} nodes but {} were loaded",
                    expected,
                    tree.len()
                );
            }
        }
        log::debug!("Loaded {} nodes from storage", tree.len());
        Ok(tree)
    }

    /// Replace the persisted node tree with the given one
    pub fn save_tree(&self, driver: &DynStorageDriver, tree: &NodeTree) -> StoreResult<()> {
        let nodes_tree = driver.open_tree(NODES_TREE)?;
        let metadata_tree = driver.open_tree(METADATA_TREE)?;

        let mut records = Vec::with_capacity(tree.len());
        for (position, node) in tree.document_order().iter().enumerate() {
            let data = bincode::serialize(&SerializableNode::from(node.as_ref()))?;
            records.push((Self::sequence_key(position), data));
        }

        let entries: Vec<(&[u8], &[u8])> = records
            .iter()
            .map(|(key, data)| (key.as_slice(), data.as_slice()))
            .collect();

        nodes_tree.replace_all(&entries)?;
        metadata_tree.insert(b"node_count", &(records.len() as u64).to_be_bytes())?;

        nodes_tree.flush()?;
        driver.flush()?;

        log::debug!("Saved {} nodes to {} storage", records.len(), driver.storage_type());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::persistent::memory::MemoryStorageDriver;

    #[test]
    fn test_save_and_load_preserves_order_and_identity() {
        let driver = MemoryStorageDriver::new();
        let adapter = DataAdapter::new();

        let mut tree = NodeTree::new();
        tree.add_node(Node::with_uuid("/cmf", "cmf")).unwrap();
        tree.add_node(Node::with_uuid("/cmf/b", "b").with_property("title", "B"))
            .unwrap();
        tree.add_node(Node::with_uuid("/cmf/a", "a").with_mixin("sulu:page"))
            .unwrap();

        adapter.save_tree(&driver, &tree).unwrap();
        let loaded = adapter.load_tree(&driver).unwrap();

        assert_eq!(loaded.root().uuid, tree.root().uuid);
        let paths: Vec<String> = loaded
            .document_order()
            .iter()
            .map(|n| n.path.clone())
            .collect();
        assert_eq!(paths, vec!["/", "/cmf", "/cmf/b", "/cmf/a"]);
        assert!(loaded.get_by_uuid("a").unwrap().has_mixin("sulu:page"));
        assert_eq!(
            loaded.get_by_uuid("b").unwrap().get_property("title"),
            Some(&Value::from("B"))
        );
    }

    #[cfg(feature = "sled-backend")]
    #[test]
    fn test_saving_a_smaller_tree_leaves_no_stale_records() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let driver = crate::store::persistent::create_storage_driver(
            crate::store::StorageType::Sled,
            temp_dir.path(),
        )
        .unwrap();
        let adapter = DataAdapter::new();

        let mut tree = NodeTree::new();
        tree.add_node(Node::with_uuid("/cmf", "cmf")).unwrap();
        tree.add_node(Node::with_uuid("/cmf/a", "a")).unwrap();
        tree.add_node(Node::with_uuid("/cmf/b", "b")).unwrap();
        adapter.save_tree(driver.as_ref(), &tree).unwrap();

        tree.remove_node("b").unwrap();
        tree.remove_node("a").unwrap();
        adapter.save_tree(driver.as_ref(), &tree).unwrap();

        let loaded = adapter.load_tree(driver.as_ref()).unwrap();
        assert_eq!(loaded.len(), tree.len());
        assert!(loaded.get_by_uuid("a").is_none());
        assert!(loaded.get_by_uuid("cmf").is_some());
    }

    #[test]
    fn test_load_empty_storage_yields_root_only() {
        let driver = MemoryStorageDriver::new();
        let tree = DataAdapter::new().load_tree(&driver).unwrap();
        assert!(tree.is_empty());
    }
}
