// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Persistent storage backends
//!
//! Trait-based abstractions for key-value storage, so the node tree can be
//! persisted by different backends interchangeably.
//!
//! # Architecture
//!
//! ```text
//! NodeRepository (node tree)
//!     ↓
//! DataAdapter (bincode records)
//!     ↓
//! StorageDriver (key-value abstraction)
//!     ↓
//! Concrete Implementations (Sled, Memory)
//! ```

pub mod factory;
pub mod traits;
pub mod types;

pub mod memory;
#[cfg(feature = "sled-backend")]
pub mod sled;

pub use factory::create_storage_driver;
pub use traits::{DynStorageDriver, StorageDriver, StorageTree};
pub use types::{StorageDriverError, StorageResult, StorageType};
