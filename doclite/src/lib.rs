// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! DocLite - locale-aware document mapping over a hierarchical node store
//!
//! Content lives as nodes in a tree addressed by path and uuid. Queries
//! written in JCR-SQL2 select rows of nodes; the document layer turns the
//! rows into typed documents for one locale, lazily and on demand.
//!
//! # Features
//!
//! - **Node Store**: Hierarchical node tree with in-memory or Sled storage
//! - **JCR-SQL2**: Selectors, joins, constraints, full-text search and ordering
//! - **Hydration Events**: Pluggable, prioritized hydrators per node type
//! - **Result Collections**: Lazy, memoizing document cursors
//!
//! # Usage
//!
//! ```bash
//! # Load fixtures
//! doclite import --path ./content fixtures.json
//!
//! # Query documents in a locale
//! doclite query --path ./content --locale de "SELECT * FROM [sulu:page]"
//! ```

pub mod config;
pub mod document;
pub mod fixtures;
pub mod node;
pub mod sql2;
pub mod store;

pub use config::{DocumentManagerConfig, StorageConfig};
pub use document::{
    Document, DocumentError, DocumentManager, DocumentResult, EventDispatcher, GenericDocument,
    GenericHydrator, HydrationMode, Query, QueryOutput, ResultCollection,
};
pub use node::{Node, Value, NT_BASE};
pub use store::{NativeQuery, NativeResult, NodeRepository, Parameters, StorageType};

/// DocLite version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// DocLite crate name
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
