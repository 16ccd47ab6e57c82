// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Sled storage driver implementation

use super::traits::{EntryIter, StorageDriver, StorageTree};
use super::types::{StorageDriverError, StorageResult, StorageType};
use std::collections::HashSet;
use std::path::Path;

/// Sled driver implementation
pub struct SledDriver {
    db: sled::Db,
}

/// Sled tree wrapper that implements StorageTree trait
pub struct SledTree {
    tree: sled::Tree,
}

fn backend_error(e: sled::Error) -> StorageDriverError {
    StorageDriverError::BackendSpecific(e.to_string())
}

impl StorageTree for SledTree {
    fn insert(&self, key: &[u8], value: &[u8]) -> StorageResult<()> {
        self.tree.insert(key, value).map_err(backend_error)?;
        Ok(())
    }

    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        self.tree
            .get(key)
            .map_err(backend_error)
            .map(|opt| opt.map(|v| v.to_vec()))
    }

    fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.tree.is_empty())
    }

    fn iter(&self) -> StorageResult<EntryIter<'_>> {
        let iter = self.tree.iter().map(|result| {
            result
                .map(|(k, v)| (k.to_vec(), v.to_vec()))
                .map_err(backend_error)
        });
        Ok(Box::new(iter))
    }

    fn replace_all(&self, entries: &[(&[u8], &[u8])]) -> StorageResult<()> {
        let keep: HashSet<&[u8]> = entries.iter().map(|(key, _)| *key).collect();
        let mut batch = sled::Batch::default();
        for key in self.tree.iter().keys() {
            let key = key.map_err(backend_error)?;
            if !keep.contains(&*key) {
                batch.remove(key);
            }
        }
        for (key, value) in entries {
            batch.insert(*key, *value);
        }
        self.tree.apply_batch(batch).map_err(backend_error)
    }

    fn flush(&self) -> StorageResult<()> {
        self.tree.flush().map_err(backend_error)?;
        Ok(())
    }
}

impl StorageDriver for SledDriver {
    type Tree = Box<dyn StorageTree>;

    fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        let db = sled::open(path).map_err(backend_error)?;
        Ok(SledDriver { db })
    }

    fn open_tree(&self, name: &str) -> StorageResult<Self::Tree> {
        let tree = self.db.open_tree(name).map_err(backend_error)?;
        Ok(Box::new(SledTree { tree }) as Box<dyn StorageTree>)
    }

    fn flush(&self) -> StorageResult<()> {
        self.db.flush().map_err(backend_error)?;
        Ok(())
    }

    fn storage_type(&self) -> StorageType {
        StorageType::Sled
    }
}
