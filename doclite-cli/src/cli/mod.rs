// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! CLI module for DocLite
//!
//! Provides fixture import, document queries and single document lookup
//! against a node repository on disk.

pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{Cli, Commands};
pub use handlers::{handle_find, handle_import, handle_query, load_config, QueryOptions};
