// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Document layer
//!
//! This module provides:
//! - `Query`: a native query plus locale, primary selector and pagination
//! - `ResultCollection`: a lazily hydrating cursor over query rows
//! - Hydration events, hydrators and the event dispatcher
//! - `DocumentManager`, the entry point over a node repository

pub mod collection;
#[allow(clippy::module_inception)]
pub mod document;
pub mod encoder;
pub mod error;
pub mod events;
pub mod hydrate;
pub mod manager;
pub mod query;

#[cfg(test)]
mod testing;

pub use collection::{Documents, ResultCollection};
pub use document::{Document, GenericDocument, Hydrated};
pub use encoder::PropertyEncoder;
pub use error::{DocumentError, DocumentResult};
pub use events::{DocumentSubscriber, EventDispatcher, EventDispatcherBuilder, QueryExecuteEvent};
pub use hydrate::{FnHydrator, GenericHydrator, HydrateEvent, Hydrator, SerdeHydrator};
pub use manager::DocumentManager;
pub use query::{HydrationMode, Query, QueryOutput};
