// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! JSON fixture import
//!
//! A fixture file lists nodes to create:
//!
//! ```json
//! { "nodes": [
//!     { "path": "/cmf/home", "uuid": "home", "mixins": ["sulu:page"],
//!       "properties": { "i18n:en-title": "Home", "published": { "$date": "2024-01-01T00:00:00Z" } } }
//! ] }
//! ```
//!
//! Nodes are inserted parents first; missing ancestors are created as
//! unstructured nodes.

use crate::node::{path, Node, Value};
use crate::store::{NodeRepository, StoreError};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("Failed to read fixture: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed fixture: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Fixture import failed: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Deserialize)]
struct FixtureFile {
    #[serde(default)]
    nodes: Vec<FixtureNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FixtureNode {
    path: String,
    uuid: Option<String>,
    primary_type: Option<String>,
    #[serde(default)]
    mixins: Vec<String>,
    #[serde(default)]
    properties: HashMap<String, serde_json::Value>,
}

impl FixtureNode {
    fn into_node(self) -> Node {
        let mut node = match self.uuid {
            Some(uuid) => Node::with_uuid(self.path, uuid),
            None => Node::new(self.path),
        };
        if let Some(primary_type) = self.primary_type {
            node.primary_type = primary_type;
        }
        for mixin in self.mixins {
            node.add_mixin(mixin);
        }
        for (key, value) in &self.properties {
            node.set_property(key.clone(), Value::from_json(value));
        }
        node
    }
}

/// Import fixture JSON into a repository and save it; returns the number
/// of fixture nodes created
pub fn import_json(repository: &NodeRepository, json: &str) -> Result<usize, FixtureError> {
    let mut fixture: FixtureFile = serde_json::from_str(json)?;
    fixture.nodes.sort_by_key(|node| path::depth(&node.path));

    let count = fixture.nodes.len();
    for entry in fixture.nodes {
        repository.add_node_with_ancestors(entry.into_node())?;
    }
    repository.save()?;

    log::info!("Imported {} fixture nodes", count);
    Ok(count)
}

/// Import a fixture file
pub fn import_file<P: AsRef<Path>>(
    repository: &NodeRepository,
    path: P,
) -> Result<usize, FixtureError> {
    let json = std::fs::read_to_string(path)?;
    import_json(repository, &json)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "nodes": [
            { "path": "/cmf/news/first", "uuid": "first", "mixins": ["sulu:page"],
              "properties": { "i18n:en-title": "First", "published": { "$date": "2024-03-01T10:00:00Z" },
                              "parent": { "$ref": "news" } } },
            { "path": "/cmf/news", "uuid": "news", "primaryType": "sulu:home" }
        ]
    }"#;

    #[test]
    fn test_import_orders_parents_first() {
        let repository = NodeRepository::in_memory();
        assert_eq!(import_json(&repository, FIXTURE).unwrap(), 2);

        let news = repository.node("news").unwrap();
        assert_eq!(news.primary_type, "sulu:home");
        assert_eq!(news.path, "/cmf/news");

        let first = repository.node("/cmf/news/first").unwrap();
        assert_eq!(first.uuid, "first");
        assert!(first.has_mixin("sulu:page"));
        assert!(first.get_property("published").unwrap().as_date().is_some());
        assert_eq!(
            first.get_property("parent"),
            Some(&Value::Reference("news".to_string()))
        );
        assert!(repository.node_by_path("/cmf").is_some());
    }

    #[test]
    fn test_listed_parent_keeps_its_identity() {
        let repository = NodeRepository::in_memory();
        import_json(
            &repository,
            r#"{"nodes": [{"path": "/a/b"}, {"path": "/a", "uuid": "a", "mixins": ["sulu:page"]}]}"#,
        )
        .unwrap();
        assert_eq!(repository.node("/a").unwrap().uuid, "a");
        assert_eq!(repository.children("a").unwrap().len(), 1);

        // importing the same nodes twice collides
        assert!(matches!(
            import_json(&repository, r#"{"nodes": [{"path": "/a"}]}"#),
            Err(FixtureError::Store(_))
        ));
    }

    #[test]
    fn test_malformed_fixture() {
        let repository = NodeRepository::in_memory();
        assert!(matches!(
            import_json(&repository, "{\"nodes\": 3}"),
            Err(FixtureError::Json(_))
        ));
        assert!(matches!(
            import_file(&repository, "/nonexistent/fixture.json"),
            Err(FixtureError::Io(_))
        ));
    }
}
