// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Lazily hydrating result collection
//!
//! Rows are fetched from the native result on first use and kept for the
//! lifetime of the collection. Documents are hydrated on access; with
//! memoization on, each row is hydrated at most once.

use crate::document::document::Document;
use crate::document::error::{DocumentError, DocumentResult};
use crate::document::events::EventDispatcher;
use crate::store::{NativeResult, Row};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Cursor over the documents of an executed query
pub struct ResultCollection {
    result: Box<dyn NativeResult>,
    dispatcher: Arc<EventDispatcher>,
    locale: Option<String>,
    primary_selector: Option<String>,
    rows: Option<Vec<Row>>,
    position: usize,
    documents: Option<HashMap<usize, Arc<dyn Document>>>,
}

impl fmt::Debug for ResultCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultCollection")
            .field("locale", &self.locale)
            .field("primary_selector", &self.primary_selector)
            .field("rows", &self.rows.as_ref().map(Vec::len))
            .field("position", &self.position)
            .finish()
    }
}

impl ResultCollection {
    pub fn new(
        result: Box<dyn NativeResult>,
        dispatcher: Arc<EventDispatcher>,
        locale: Option<String>,
        primary_selector: Option<String>,
        memoize_documents: bool,
    ) -> Self {
        Self {
            result,
            dispatcher,
            locale,
            primary_selector,
            rows: None,
            position: 0,
            documents: memoize_documents.then(HashMap::new),
        }
    }

    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    pub fn primary_selector(&self) -> Option<&str> {
        self.primary_selector.as_deref()
    }

    /// Fetch the rows once
    fn initialize(&mut self) -> DocumentResult<&[Row]> {
        if self.rows.is_none() {
            let rows = self.result.rows()?;
            log::debug!("Result collection fetched {} rows", rows.len());
            self.rows = Some(rows);
        }
        Ok(self.rows.as_deref().unwrap_or_default())
    }

    /// Underlying rows
    pub fn rows(&mut self) -> DocumentResult<&[Row]> {
        self.initialize()
    }

    pub fn rewind(&mut self) -> DocumentResult<()> {
        self.initialize()?;
        self.position = 0;
        Ok(())
    }

    pub fn valid(&mut self) -> DocumentResult<bool> {
        let position = self.position;
        Ok(position < self.initialize()?.len())
    }

    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> DocumentResult<()> {
        self.initialize()?;
        self.position += 1;
        Ok(())
    }

    pub fn key(&mut self) -> DocumentResult<usize> {
        self.initialize()?;
        Ok(self.position)
    }

    /// Number of rows (not of distinct documents)
    pub fn count(&mut self) -> DocumentResult<usize> {
        Ok(self.initialize()?.len())
    }

    /// Document of the row under the cursor
    pub fn current(&mut self) -> DocumentResult<Arc<dyn Document>> {
        let position = self.position;
        let node = {
            let selector = self.primary_selector.clone();
            let rows = self.initialize()?;
            let row = rows
                .get(position)
                .ok_or(DocumentError::CursorOutOfRange(position))?;
            row.node(selector.as_deref())?.clone()
        };

        if let Some(document) = self
            .documents
            .as_ref()
            .and_then(|documents| documents.get(&position))
        {
            return Ok(document.clone());
        }

        let document = self.dispatcher.hydrate(node, self.locale.as_deref())?;
        if let Some(documents) = self.documents.as_mut() {
            documents.insert(position, document.clone());
        }
        Ok(document)
    }

    /// Hydrate every row, in order
    pub fn to_vec(&mut self) -> DocumentResult<Vec<Arc<dyn Document>>> {
        self.iter().collect()
    }

    /// Iterate over all documents from the first row
    pub fn iter(&mut self) -> Documents<'_> {
        Documents {
            collection: self,
            started: false,
            done: false,
        }
    }
}

/// Iterator over the documents of a `ResultCollection`
pub struct Documents<'a> {
    collection: &'a mut ResultCollection,
    started: bool,
    done: bool,
}

impl<'a> Documents<'a> {
    fn step(&mut self) -> DocumentResult<Option<Arc<dyn Document>>> {
        if self.started {
            self.collection.next()?;
        } else {
            self.collection.rewind()?;
            self.started = true;
        }
        if !self.collection.valid()? {
            return Ok(None);
        }
        self.collection.current().map(Some)
    }
}

impl<'a> Iterator for Documents<'a> {
    type Item = DocumentResult<Arc<dyn Document>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.step() {
            Ok(Some(document)) => Some(Ok(document)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::hydrate::{GenericHydrator, HydrateEvent, Hydrator};
    use crate::document::testing::{FakeResult, FetchCounter};
    use crate::node::Node;
    use crate::store::StoreError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingHydrator {
        calls: AtomicUsize,
        inner: GenericHydrator,
    }

    impl Hydrator for CountingHydrator {
        fn name(&self) -> &str {
            "counting"
        }

        fn supports(&self, node: &Node) -> bool {
            self.inner.supports(node)
        }

        fn hydrate(&self, event: &mut HydrateEvent) -> DocumentResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.hydrate(event)
        }
    }

    fn collection(rows: usize, memoize: bool) -> (ResultCollection, FetchCounter, Arc<CountingHydrator>) {
        let counter = FetchCounter::default();
        let hydrator = Arc::new(CountingHydrator {
            calls: AtomicUsize::new(0),
            inner: GenericHydrator::new(["nt:unstructured"]),
        });
        let dispatcher = Arc::new(
            EventDispatcher::builder()
                .register_hydrator(hydrator.clone(), 0)
                .build(),
        );
        let result = FakeResult::with_nodes(rows, counter.clone());
        (
            ResultCollection::new(
                Box::new(result),
                dispatcher,
                Some("en".to_string()),
                None,
                memoize,
            ),
            counter,
            hydrator,
        )
    }

    #[test]
    fn test_rows_are_fetched_lazily_and_once() {
        let (mut collection, counter, _) = collection(3, true);
        assert_eq!(counter.fetches(), 0);

        assert_eq!(collection.count().unwrap(), 3);
        assert_eq!(collection.count().unwrap(), 3);
        assert_eq!(counter.fetches(), 1);
    }

    #[test]
    fn test_iteration_contract() {
        let (mut collection, counter, _) = collection(2, true);

        collection.rewind().unwrap();
        assert!(collection.valid().unwrap());
        assert_eq!(collection.key().unwrap(), 0);
        assert_eq!(collection.current().unwrap().path(), "/node0");

        collection.next().unwrap();
        assert_eq!(collection.key().unwrap(), 1);
        assert_eq!(collection.current().unwrap().path(), "/node1");

        collection.next().unwrap();
        assert!(!collection.valid().unwrap());
        assert!(matches!(
            collection.current(),
            Err(DocumentError::CursorOutOfRange(2))
        ));

        collection.rewind().unwrap();
        assert_eq!(collection.current().unwrap().path(), "/node0");
        assert_eq!(counter.fetches(), 1);
    }

    #[test]
    fn test_memoized_documents_hydrate_once_per_row() {
        let (mut collection, _, hydrator) = collection(2, true);
        let first = collection.current().unwrap();
        let again = collection.current().unwrap();
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(hydrator.calls.load(Ordering::SeqCst), 1);

        collection.to_vec().unwrap();
        assert_eq!(hydrator.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_without_memoization_every_access_hydrates() {
        let (mut collection, _, hydrator) = collection(1, false);
        let first = collection.current().unwrap();
        let again = collection.current().unwrap();
        assert!(!Arc::ptr_eq(&first, &again));
        assert_eq!(first.uuid(), again.uuid());
        assert_eq!(hydrator.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_to_vec_preserves_row_order() {
        let (mut collection, counter, _) = collection(4, true);
        collection.next().unwrap();

        let paths: Vec<String> = collection
            .to_vec()
            .unwrap()
            .iter()
            .map(|d| d.path().to_string())
            .collect();
        assert_eq!(paths, vec!["/node0", "/node1", "/node2", "/node3"]);
        assert!(collection.iter().all(|d| d.unwrap().locale() == Some("en")));
        assert_eq!(counter.fetches(), 1);
    }

    #[test]
    fn test_fetch_failure_propagates() {
        let counter = FetchCounter::default();
        let result = FakeResult::failing(counter.clone());
        let mut collection = ResultCollection::new(
            Box::new(result),
            Arc::new(EventDispatcher::default()),
            None,
            None,
            true,
        );

        assert!(matches!(
            collection.count(),
            Err(DocumentError::Store(StoreError::InvalidQuery(_)))
        ));
        assert!(collection.to_vec().is_err());
    }
}
