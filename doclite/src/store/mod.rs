// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Hierarchical node store
//!
//! Holds the node tree, persists it through pluggable storage drivers and
//! answers native queries. The document layer sits on top of the
//! `NativeQuery`/`NativeResult` traits defined here.

pub mod data_adapter;
pub mod error;
pub mod native;
pub mod node_tree;
pub mod persistent;
pub mod query;
pub mod repository;
pub mod row;

pub use error::{StoreError, StoreResult};
pub use native::{NativeQuery, NativeResult, Parameters};
pub use node_tree::NodeTree;
pub use persistent::StorageType;
pub use query::{StoreQuery, StoreQueryResult};
pub use repository::NodeRepository;
pub use row::{Row, RowShape};
