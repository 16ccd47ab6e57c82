// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! CLI command handlers for DocLite

use colored::Colorize;
use doclite::document::GenericHydrator;
use doclite::fixtures;
use doclite::{
    DocumentManager, DocumentManagerConfig, EventDispatcher, HydrationMode, Parameters,
    QueryOutput, StorageType, Value, NT_BASE,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::commands::OutputFormat;
use super::output::ResultFormatter;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Arguments of the query command
#[derive(Debug)]
pub struct QueryOptions {
    pub statement: String,
    pub locale: Option<String>,
    pub selector: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub mode: HydrationMode,
    pub params: Vec<String>,
    pub format: OutputFormat,
}

/// Load the configuration file, or the defaults without one
pub fn load_config(path: Option<&Path>) -> CliResult<DocumentManagerConfig> {
    match path {
        Some(path) => {
            let config = DocumentManagerConfig::from_file(path)?;
            log::debug!("Loaded configuration from {}", path.display());
            Ok(config)
        }
        None => Ok(DocumentManagerConfig::default()),
    }
}

/// Point the configuration at a repository directory
fn with_storage(
    mut config: DocumentManagerConfig,
    path: PathBuf,
    storage: Option<StorageType>,
) -> DocumentManagerConfig {
    config.storage.storage_type = match storage {
        Some(storage_type) => storage_type,
        // a directory on disk implies sled unless configured otherwise
        None if config.storage.storage_type == StorageType::Memory => StorageType::Sled,
        None => config.storage.storage_type,
    };
    config.storage.path = Some(path);
    config
}

/// Every node hydrates into a generic document
fn dispatcher() -> Arc<EventDispatcher> {
    Arc::new(
        EventDispatcher::builder()
            .register_hydrator(Arc::new(GenericHydrator::new([NT_BASE])), 0)
            .build(),
    )
}

fn open_manager(config: DocumentManagerConfig, path: PathBuf) -> CliResult<DocumentManager> {
    if !path.exists() {
        return Err(format!(
            "Repository not found at {:?}. Import fixtures with 'doclite import' first.",
            path
        )
        .into());
    }
    Ok(DocumentManager::from_config(
        with_storage(config, path, None),
        dispatcher(),
    )?)
}

fn check_locale(config: &DocumentManagerConfig, locale: Option<&str>) {
    if let Some(locale) = locale {
        if !config.has_locale(locale) {
            log::warn!(
                "Locale '{}' is not configured (configured: {:?})",
                locale,
                config.locales
            );
        }
    }
}

/// Parse `name=value`; values that parse as JSON keep their type
pub fn parse_parameter(text: &str) -> CliResult<(String, Value)> {
    let (name, raw) = text
        .split_once('=')
        .ok_or_else(|| format!("Parameter '{}' is not of the form name=value", text))?;
    let name = name.trim().trim_start_matches('$');
    if name.is_empty() {
        return Err(format!("Parameter '{}' has no name", text).into());
    }
    let value = match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(json) => Value::from_json(&json),
        Err(_) => Value::String(raw.to_string()),
    };
    Ok((name.to_string(), value))
}

/// Handle the import command
pub fn handle_import(
    config: DocumentManagerConfig,
    path: PathBuf,
    storage: StorageType,
    file: PathBuf,
) -> CliResult<()> {
    let config = with_storage(config, path.clone(), Some(storage));
    config.validate()?;

    std::fs::create_dir_all(&path)?;
    let repository = config.storage.open_repository()?;
    let count = fixtures::import_file(&repository, &file)?;

    println!(
        "{}",
        format!("Imported {} nodes from {:?} into {:?}", count, file, path).green()
    );
    if storage == StorageType::Memory {
        println!("{}", "Memory storage does not outlive this command".yellow());
    }
    Ok(())
}

/// Handle the query command
pub fn handle_query(
    config: DocumentManagerConfig,
    path: PathBuf,
    options: QueryOptions,
) -> CliResult<()> {
    let manager = open_manager(config, path)?;
    check_locale(manager.config(), options.locale.as_deref());

    let parameters: Parameters = options
        .params
        .iter()
        .map(|p| parse_parameter(p))
        .collect::<CliResult<_>>()?;

    let mut query = manager.create_query(
        &options.statement,
        options.locale.as_deref(),
        options.selector.as_deref(),
    )?;
    query.set_max_results(options.limit);
    query.set_first_result(options.offset);

    match query.execute(&parameters, options.mode) {
        Ok(QueryOutput::Raw(mut result)) => {
            let columns = result.column_names();
            let rows = result.rows()?;
            println!("{}", ResultFormatter::format_rows(&rows, &columns, options.format));
            Ok(())
        }
        Ok(QueryOutput::Documents(mut collection)) => {
            let documents = collection.to_vec()?;
            println!(
                "{}",
                ResultFormatter::format_documents(&documents, options.format)
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", format!("Error: {}", e).red());
            Err(e.into())
        }
    }
}

/// Handle the find command
pub fn handle_find(
    config: DocumentManagerConfig,
    path: PathBuf,
    identifier: String,
    locale: Option<String>,
    format: OutputFormat,
) -> CliResult<()> {
    let manager = open_manager(config, path)?;
    check_locale(manager.config(), locale.as_deref());

    let document = manager.find(&identifier, locale.as_deref())?;
    println!("{}", ResultFormatter::format_documents(&[document], format));
    Ok(())
}
