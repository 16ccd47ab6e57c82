// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Storage driver traits
//!
//! All storage drivers implement these traits so the repository can
//! persist its node tree without knowing the backend.

use super::types::{StorageResult, StorageType};
use std::path::Path;

/// Boxed key-value iterator returned by tree scans
pub type EntryIter<'a> = Box<dyn Iterator<Item = StorageResult<(Vec<u8>, Vec<u8>)>> + 'a>;

/// A named collection of key-value pairs within a storage driver
pub trait StorageTree: Send + Sync {
    /// Insert a key-value pair
    fn insert(&self, key: &[u8], value: &[u8]) -> StorageResult<()>;

    /// Get a value by key
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>>;

    /// Check if the tree is empty
    fn is_empty(&self) -> StorageResult<bool>;

    /// Iterate over all key-value pairs in key order
    fn iter(&self) -> StorageResult<EntryIter<'_>>;

    /// Replace the whole content of the tree in one atomic write
    ///
    /// Either every entry is stored and every other key removed, or the
    /// tree keeps its previous content.
    fn replace_all(&self, entries: &[(&[u8], &[u8])]) -> StorageResult<()>;

    /// Flush any pending writes to disk
    fn flush(&self) -> StorageResult<()>;
}

/// Main storage driver trait
pub trait StorageDriver: Send + Sync {
    /// Type of tree used by this driver
    type Tree: StorageTree;

    /// Open or create a storage driver at the given path
    fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self>
    where
        Self: Sized;

    /// Open or create a named tree
    fn open_tree(&self, name: &str) -> StorageResult<Self::Tree>;

    /// Flush all pending writes to disk
    fn flush(&self) -> StorageResult<()>;

    /// Get storage type
    fn storage_type(&self) -> StorageType;
}

/// Driver handle shared by the repository
pub type DynStorageDriver = dyn StorageDriver<Tree = Box<dyn StorageTree>>;

// Lets Box<dyn StorageTree> be used wherever a tree is expected
impl StorageTree for Box<dyn StorageTree> {
    fn insert(&self, key: &[u8], value: &[u8]) -> StorageResult<()> {
        (**self).insert(key, value)
    }

    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn is_empty(&self) -> StorageResult<bool> {
        (**self).is_empty()
    }

    fn iter(&self) -> StorageResult<EntryIter<'_>> {
        (**self).iter()
    }

    fn replace_all(&self, entries: &[(&[u8], &[u8])]) -> StorageResult<()> {
        (**self).replace_all(entries)
    }

    fn flush(&self) -> StorageResult<()> {
        (**self).flush()
    }
}
