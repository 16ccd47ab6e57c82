// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! In-memory node tree
//!
//! Keeps every node indexed by uuid and by path, plus ordered child lists
//! for document-order traversal. Nodes are shared as `Arc<Node>` so query
//! rows can hold them without copying; updates are copy-on-write.

use crate::node::{path, Node, NodeError, Value, REP_ROOT};
use std::collections::HashMap;
use std::sync::Arc;

/// In-memory node tree with path and child indices
#[derive(Debug, Clone)]
pub struct NodeTree {
    /// All nodes indexed by uuid
    nodes: HashMap<String, Arc<Node>>,

    /// Index: path -> uuid
    paths: HashMap<String, String>,

    /// Ordered child lists: parent uuid -> child uuids
    children: HashMap<String, Vec<String>>,

    root_uuid: String,
}

impl Default for NodeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeTree {
    /// Create a tree holding only a fresh root node
    pub fn new() -> Self {
        let mut root = Node::new(path::ROOT);
        root.primary_type = REP_ROOT.to_string();
        Self::with_root(root)
    }

    /// Create a tree from a known root node (used when loading from storage)
    pub fn with_root(mut root: Node) -> Self {
        root.path = path::ROOT.to_string();
        let root_uuid = root.uuid.clone();

        let mut nodes = HashMap::new();
        let mut paths = HashMap::new();
        let mut children = HashMap::new();
        paths.insert(root.path.clone(), root_uuid.clone());
        children.insert(root_uuid.clone(), Vec::new());
        nodes.insert(root_uuid.clone(), Arc::new(root));

        Self {
            nodes,
            paths,
            children,
            root_uuid,
        }
    }

    /// The root node
    pub fn root(&self) -> &Arc<Node> {
        &self.nodes[&self.root_uuid]
    }

    /// Add a node below an existing parent
    pub fn add_node(&mut self, node: Node) -> Result<Arc<Node>, NodeError> {
        path::validate(&node.path)?;

        if node.path == path::ROOT {
            return Err(NodeError::RootNode("added twice".to_string()));
        }
        if self.nodes.contains_key(&node.uuid) {
            return Err(NodeError::NodeAlreadyExists(node.uuid));
        }
        if self.paths.contains_key(&node.path) {
            return Err(NodeError::NodeAlreadyExists(node.path));
        }

        let parent_uuid = node
            .parent_path()
            .and_then(|parent| self.paths.get(parent))
            .cloned()
            .ok_or_else(|| NodeError::ParentNotFound(node.path.clone()))?;

        self.children
            .entry(parent_uuid)
            .or_default()
            .push(node.uuid.clone());
        self.children.insert(node.uuid.clone(), Vec::new());
        self.paths.insert(node.path.clone(), node.uuid.clone());

        let node = Arc::new(node);
        self.nodes.insert(node.uuid.clone(), node.clone());

        Ok(node)
    }

    /// Get a node by uuid
    pub fn get_by_uuid(&self, uuid: &str) -> Option<&Arc<Node>> {
        self.nodes.get(uuid)
    }

    /// Get a node by absolute path
    pub fn get_by_path(&self, node_path: &str) -> Option<&Arc<Node>> {
        self.paths.get(node_path).and_then(|uuid| self.nodes.get(uuid))
    }

    /// Direct children of a node, in insertion order
    pub fn children(&self, uuid: &str) -> Vec<Arc<Node>> {
        self.children
            .get(uuid)
            .map(|ids| ids.iter().filter_map(|id| self.nodes.get(id)).cloned().collect())
            .unwrap_or_default()
    }

    /// Set a property on a node
    pub fn set_property(&mut self, uuid: &str, key: &str, value: Value) -> Result<(), NodeError> {
        let node = self
            .nodes
            .get_mut(uuid)
            .ok_or_else(|| NodeError::NodeNotFound(uuid.to_string()))?;
        Arc::make_mut(node).set_property(key.to_string(), value);
        Ok(())
    }

    /// Remove a property from a node, returning the old value
    pub fn remove_property(&mut self, uuid: &str, key: &str) -> Result<Option<Value>, NodeError> {
        let node = self
            .nodes
            .get_mut(uuid)
            .ok_or_else(|| NodeError::NodeNotFound(uuid.to_string()))?;
        Ok(Arc::make_mut(node).remove_property(key))
    }

    /// Add a mixin type to a node
    pub fn add_mixin(&mut self, uuid: &str, mixin: &str) -> Result<(), NodeError> {
        let node = self
            .nodes
            .get_mut(uuid)
            .ok_or_else(|| NodeError::NodeNotFound(uuid.to_string()))?;
        Arc::make_mut(node).add_mixin(mixin.to_string());
        Ok(())
    }

    /// Remove a node and its whole subtree, returning the removed nodes
    pub fn remove_node(&mut self, uuid: &str) -> Result<Vec<Arc<Node>>, NodeError> {
        if uuid == self.root_uuid {
            return Err(NodeError::RootNode("removed".to_string()));
        }
        let node = self
            .nodes
            .get(uuid)
            .cloned()
            .ok_or_else(|| NodeError::NodeNotFound(uuid.to_string()))?;

        if let Some(parent_uuid) = node
            .parent_path()
            .and_then(|parent| self.paths.get(parent))
            .cloned()
        {
            if let Some(siblings) = self.children.get_mut(&parent_uuid) {
                siblings.retain(|id| id != uuid);
            }
        }

        let mut removed = Vec::new();
        let mut stack = vec![uuid.to_string()];
        while let Some(current) = stack.pop() {
            if let Some(child_ids) = self.children.remove(&current) {
                stack.extend(child_ids);
            }
            if let Some(node) = self.nodes.remove(&current) {
                self.paths.remove(&node.path);
                removed.push(node);
            }
        }

        Ok(removed)
    }

    /// All nodes, depth-first in child order starting at the root
    pub fn document_order(&self) -> Vec<Arc<Node>> {
        let mut ordered = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root_uuid.clone()];

        while let Some(uuid) = stack.pop() {
            if let Some(node) = self.nodes.get(&uuid) {
                ordered.push(node.clone());
            }
            if let Some(child_ids) = self.children.get(&uuid) {
                stack.extend(child_ids.iter().rev().cloned());
            }
        }

        ordered
    }

    /// Number of nodes including the root
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree holds nothing but the root
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with_pages() -> NodeTree {
        let mut tree = NodeTree::new();
        tree.add_node(Node::with_uuid("/cmf", "cmf")).unwrap();
        tree.add_node(Node::with_uuid("/cmf/a", "a")).unwrap();
        tree.add_node(Node::with_uuid("/cmf/b", "b")).unwrap();
        tree.add_node(Node::with_uuid("/cmf/a/a1", "a1")).unwrap();
        tree
    }

    #[test]
    fn test_add_requires_parent() {
        let mut tree = NodeTree::new();
        let result = tree.add_node(Node::new("/missing/child"));
        assert!(matches!(result, Err(NodeError::ParentNotFound(_))));
    }

    #[test]
    fn test_duplicate_path_and_uuid_rejected() {
        let mut tree = tree_with_pages();
        assert!(matches!(
            tree.add_node(Node::new("/cmf/a")),
            Err(NodeError::NodeAlreadyExists(_))
        ));
        assert!(matches!(
            tree.add_node(Node::with_uuid("/cmf/c", "a")),
            Err(NodeError::NodeAlreadyExists(_))
        ));
    }

    #[test]
    fn test_document_order_is_depth_first() {
        let tree = tree_with_pages();
        let paths: Vec<String> = tree
            .document_order()
            .iter()
            .map(|n| n.path.clone())
            .collect();
        assert_eq!(paths, vec!["/", "/cmf", "/cmf/a", "/cmf/a/a1", "/cmf/b"]);
    }

    #[test]
    fn test_remove_subtree() {
        let mut tree = tree_with_pages();
        let removed = tree.remove_node("a").unwrap();
        assert_eq!(removed.len(), 2);
        assert!(tree.get_by_path("/cmf/a/a1").is_none());
        assert_eq!(tree.children("cmf").len(), 1);
        let root_uuid = tree.root().uuid.clone();
        assert!(matches!(
            tree.remove_node(&root_uuid),
            Err(NodeError::RootNode(_))
        ));
    }

    #[test]
    fn test_updates_are_copy_on_write() {
        let mut tree = tree_with_pages();
        let before = tree.get_by_uuid("a").unwrap().clone();
        tree.set_property("a", "title", Value::from("A")).unwrap();

        assert!(before.get_property("title").is_none());
        assert_eq!(
            tree.get_by_path("/cmf/a").unwrap().get_property("title"),
            Some(&Value::from("A"))
        );
    }
}
