// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Node store error types

use crate::node::NodeError;
use crate::sql2::ParserError;
use crate::store::persistent::StorageDriverError;
use thiserror::Error;

/// Errors raised by the node store and its native queries
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Node error: {0}")]
    Node(#[from] NodeError),

    #[error("Storage driver error: {0}")]
    Driver(#[from] StorageDriverError),

    #[error("Syntax error: {0}")]
    Syntax(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Unknown selector: {0}")]
    UnknownSelector(String),

    #[error("Row has {0} selectors, a selector name is required")]
    AmbiguousSelector(usize),

    #[error("Query does not declare variable ${0}")]
    UnknownVariable(String),

    #[error("Variable ${0} is not bound")]
    UnboundVariable(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<bincode::Error> for StoreError {
    fn from(e: bincode::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

impl From<ParserError> for StoreError {
    fn from(e: ParserError) -> Self {
        match e {
            ParserError::Invalid(message) => StoreError::InvalidQuery(message),
            other => StoreError::Syntax(other.to_string()),
        }
    }
}

/// Result type for node store operations
pub type StoreResult<T> = Result<T, StoreError>;
