// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Command-line arguments

use clap::{Parser, Subcommand, ValueEnum};
use doclite::{HydrationMode, StorageType};
use std::path::PathBuf;

/// DocLite command line interface
#[derive(Parser, Debug)]
#[command(name = "doclite")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<log::Level>,

    /// JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import a JSON fixture file into a repository
    Import {
        /// Fixture file
        file: PathBuf,

        /// Repository directory
        #[arg(short, long)]
        path: PathBuf,

        /// Storage backend (sled or memory)
        #[arg(long, default_value = "sled")]
        storage: StorageType,
    },

    /// Run a JCR-SQL2 query
    Query {
        /// The statement to execute
        statement: String,

        /// Repository directory
        #[arg(short, long)]
        path: PathBuf,

        /// Locale to hydrate documents in
        #[arg(short, long)]
        locale: Option<String>,

        /// Selector whose node each row hydrates
        #[arg(short, long)]
        selector: Option<String>,

        /// Maximum number of rows
        #[arg(long)]
        limit: Option<usize>,

        /// Rows to skip
        #[arg(long)]
        offset: Option<usize>,

        /// Hydration mode (document or raw-node)
        #[arg(short, long, default_value = "document")]
        mode: HydrationMode,

        /// Bind a variable, as name=value; JSON values are typed
        #[arg(long = "param", value_name = "NAME=VALUE")]
        params: Vec<String>,

        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Hydrate a single node by uuid or absolute path
    Find {
        identifier: String,

        /// Repository directory
        #[arg(short, long)]
        path: PathBuf,

        #[arg(short, long)]
        locale: Option<String>,

        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Show version information
    Version,
}
