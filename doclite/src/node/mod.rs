// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Content node model
//!
//! This module provides:
//! - Value type system for node properties
//! - The Node structure with path, uuid, node types and properties
//! - Absolute path helpers

pub mod path;
pub mod types;
pub mod value;

pub use types::{Node, NodeError, NT_BASE, NT_UNSTRUCTURED, REP_ROOT};
pub use value::Value;
