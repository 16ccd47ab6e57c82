// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Query language for the node store
//!
//! A subset of JCR-SQL2: SELECT over node-type selectors with inner joins,
//! property comparisons, path constraints, full-text CONTAINS and ORDER BY.

pub mod ast;
pub mod lexer;
pub mod parser;

pub use ast::Statement;
pub use parser::{parse_statement, ParserError};

/// Language identifier reported by native queries
pub const LANGUAGE: &str = "JCR-SQL2";
