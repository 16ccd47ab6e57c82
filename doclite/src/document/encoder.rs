// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Property name encoding
//!
//! Localized content is stored as `i18n:{locale}-{name}` properties and
//! system data as `sulu:{name}`; plain names are shared by all locales.

use crate::node::{Node, Value};
use std::collections::{BTreeMap, BTreeSet};

const LOCALIZED_PREFIX: &str = "i18n";
const SYSTEM_PREFIX: &str = "sulu";

/// Encodes and decodes stored property names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyEncoder {
    localized_prefix: String,
    system_prefix: String,
}

impl Default for PropertyEncoder {
    fn default() -> Self {
        Self::new(LOCALIZED_PREFIX, SYSTEM_PREFIX)
    }
}

impl PropertyEncoder {
    pub fn new(localized_prefix: impl Into<String>, system_prefix: impl Into<String>) -> Self {
        Self {
            localized_prefix: localized_prefix.into(),
            system_prefix: system_prefix.into(),
        }
    }

    /// Stored name of a localized property
    pub fn localized_name(&self, name: &str, locale: &str) -> String {
        format!("{}:{}-{}", self.localized_prefix, locale, name)
    }

    /// Stored name of a system property
    pub fn system_name(&self, name: &str) -> String {
        format!("{}:{}", self.system_prefix, name)
    }

    /// Split a localized property name into `(locale, name)`
    pub fn decode_localized<'a>(&self, key: &'a str) -> Option<(&'a str, &'a str)> {
        let rest = key
            .strip_prefix(self.localized_prefix.as_str())?
            .strip_prefix(':')?;
        let (locale, name) = rest.split_once('-')?;
        if locale.is_empty() || name.is_empty() {
            return None;
        }
        Some((locale, name))
    }

    /// Name of a localized property stored for exactly this locale
    pub fn localized_property<'a>(&self, key: &'a str, locale: &str) -> Option<&'a str> {
        key.strip_prefix(self.localized_prefix.as_str())?
            .strip_prefix(':')?
            .strip_prefix(locale)?
            .strip_prefix('-')
            .filter(|name| !name.is_empty())
    }

    /// Name of a system property without its prefix
    pub fn decode_system<'a>(&self, key: &'a str) -> Option<&'a str> {
        key.strip_prefix(self.system_prefix.as_str())?
            .strip_prefix(':')
            .filter(|name| !name.is_empty())
    }

    /// Properties of a node as seen in one locale: the shared plain
    /// properties, overlaid with the localized ones of that locale.
    /// Namespaced properties (system, `jcr:` and other locales) are left out.
    pub fn localized_view(&self, node: &Node, locale: Option<&str>) -> BTreeMap<String, Value> {
        let mut view: BTreeMap<String, Value> = node
            .properties
            .iter()
            .filter(|(key, _)| !key.contains(':'))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        if let Some(locale) = locale {
            for (key, value) in &node.properties {
                if let Some(name) = self.localized_property(key, locale) {
                    view.insert(name.to_string(), value.clone());
                }
            }
        }

        view
    }

    /// Locales the node has localized content for, sorted
    pub fn available_locales(&self, node: &Node) -> Vec<String> {
        node.properties
            .keys()
            .filter_map(|key| self.decode_localized(key))
            .map(|(locale, _)| locale.to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
