// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Document manager configuration

use crate::document::{DocumentError, DocumentResult};
use crate::store::{NodeRepository, StorageType, StoreResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for the document manager
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentManagerConfig {
    /// Locale used when a query or lookup names none
    pub default_locale: String,

    /// Locales content is maintained in
    pub locales: Vec<String>,

    /// Keep hydrated documents per row inside a result collection
    pub memoize_documents: bool,

    /// Node store backend
    pub storage: StorageConfig,
}

/// Node store backend configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    pub storage_type: StorageType,

    /// Database directory; required for sled
    pub path: Option<PathBuf>,
}

impl Default for DocumentManagerConfig {
    fn default() -> Self {
        Self {
            default_locale: "en".to_string(),
            locales: vec!["en".to_string()],
            memoize_documents: true,
            storage: StorageConfig::default(),
        }
    }
}

impl DocumentManagerConfig {
    /// Parse a JSON configuration; missing fields take their defaults
    pub fn from_json(json: &str) -> DocumentResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| DocumentError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> DocumentResult<Self> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            DocumentError::Config(format!("{}: {}", path.as_ref().display(), e))
        })?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> DocumentResult<()> {
        if self.locales.is_empty() {
            return Err(DocumentError::Config("no locales configured".to_string()));
        }
        if let Some(locale) = self
            .locales
            .iter()
            .find(|l| l.is_empty() || l.contains('-'))
        {
            return Err(DocumentError::Config(format!(
                "invalid locale '{}': locales may not be empty or contain '-' (use '{}')",
                locale,
                locale.replace('-', "_")
            )));
        }
        if !self.locales.contains(&self.default_locale) {
            return Err(DocumentError::Config(format!(
                "default locale '{}' is not one of {:?}",
                self.default_locale, self.locales
            )));
        }
        if self.storage.storage_type == StorageType::Sled && self.storage.path.is_none() {
            return Err(DocumentError::Config(
                "sled storage needs a path".to_string(),
            ));
        }
        Ok(())
    }

    pub fn has_locale(&self, locale: &str) -> bool {
        self.locales.iter().any(|l| l == locale)
    }
}

impl StorageConfig {
    /// Open the configured repository; without a path it lives in memory
    pub fn open_repository(&self) -> StoreResult<NodeRepository> {
        match &self.path {
            Some(path) => NodeRepository::open(self.storage_type, path),
            None => Ok(NodeRepository::in_memory()),
        }
    }
}
