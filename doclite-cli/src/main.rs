// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! DocLite CLI entry point

use clap::Parser;
use colored::Colorize;

mod cli;
use cli::{Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        log::LevelFilter::Debug
    } else if let Some(level) = cli.log_level {
        level.to_level_filter()
    } else {
        // RUST_LOG can still raise it
        log::LevelFilter::Warn
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    let config = cli::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Version => {
            println!("{} {}", "DocLite".bold().green(), doclite::VERSION);
            println!("Locale-aware documents over a hierarchical node store");
            Ok(())
        }

        Commands::Import {
            file,
            path,
            storage,
        } => cli::handle_import(config, path, storage, file),

        Commands::Query {
            statement,
            path,
            locale,
            selector,
            limit,
            offset,
            mode,
            params,
            format,
        } => cli::handle_query(
            config,
            path,
            cli::QueryOptions {
                statement,
                locale,
                selector,
                limit,
                offset,
                mode,
                params,
                format,
            },
        ),

        Commands::Find {
            identifier,
            path,
            locale,
            format,
        } => cli::handle_find(config, path, identifier, locale, format),
    }
}
