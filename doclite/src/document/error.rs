// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Document layer error types

use crate::store::StoreError;
use thiserror::Error;

/// Errors raised by queries, result collections and hydration
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Invalid hydration mode '{0}', expected 'document' or 'raw-node'")]
    InvalidHydrationMode(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("No hydrator produced a document for {path} (type {node_type}, locale {locale:?})")]
    HydrationContractViolation {
        path: String,
        node_type: String,
        locale: Option<String>,
    },

    #[error("Cursor position {0} is out of range")]
    CursorOutOfRange(usize),

    #[error("Document not found: {0}")]
    NodeNotFound(String),

    #[error("Hydration error: {0}")]
    Hydration(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for DocumentError {
    fn from(e: serde_json::Error) -> Self {
        DocumentError::Hydration(e.to_string())
    }
}

/// Result type for document operations
pub type DocumentResult<T> = Result<T, DocumentError>;
