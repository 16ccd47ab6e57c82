// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Event dispatch for query execution and hydration
//!
//! The dispatcher holds an ordered list of hydrators, frozen when it is
//! built. Hydrators run by priority (higher first, ties in registration
//! order) and the first one that sets a document ends the dispatch.
//! Subscribers only observe events.

use crate::document::document::Document;
use crate::document::error::DocumentResult;
use crate::document::hydrate::{FnHydrator, HydrateEvent, Hydrator};
use crate::document::query::Query;
use crate::node::Node;
use crate::store::NativeResult;
use std::fmt;
use std::sync::Arc;

/// Raised once a query executed in document mode
pub struct QueryExecuteEvent<'a> {
    query: &'a Query,
    result: &'a dyn NativeResult,
}

impl<'a> QueryExecuteEvent<'a> {
    pub fn new(query: &'a Query, result: &'a dyn NativeResult) -> Self {
        Self { query, result }
    }

    pub fn query(&self) -> &Query {
        self.query
    }

    pub fn native_result(&self) -> &dyn NativeResult {
        self.result
    }
}

/// Observer of document events
pub trait DocumentSubscriber: Send + Sync {
    fn on_query_execute(&self, _event: &QueryExecuteEvent<'_>) {}

    /// Called after the hydrators ran, whether or not one set a document
    fn on_hydrate(&self, _event: &HydrateEvent) {}
}

struct Registration {
    priority: i32,
    hydrator: Arc<dyn Hydrator>,
}

/// Dispatches hydrate and query events
pub struct EventDispatcher {
    hydrators: Vec<Registration>,
    subscribers: Vec<Arc<dyn DocumentSubscriber>>,
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("hydrators", &self.hydrator_names())
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl EventDispatcher {
    pub fn builder() -> EventDispatcherBuilder {
        EventDispatcherBuilder::default()
    }

    /// Hydrator names in dispatch order
    pub fn hydrator_names(&self) -> Vec<&str> {
        self.hydrators.iter().map(|r| r.hydrator.name()).collect()
    }

    /// Run the hydrators on an event until one sets a document
    pub fn dispatch_hydrate(&self, event: &mut HydrateEvent) -> DocumentResult<()> {
        for registration in &self.hydrators {
            let hydrator = &registration.hydrator;
            if !hydrator.supports(event.node()) {
                continue;
            }
            hydrator.hydrate(event)?;
            if event.has_document() {
                log::debug!(
                    "Hydrated {} with '{}' (priority {})",
                    event.node().path,
                    hydrator.name(),
                    registration.priority
                );
                break;
            }
        }

        for subscriber in &self.subscribers {
            subscriber.on_hydrate(event);
        }
        Ok(())
    }

    /// Hydrate a node for a locale
    pub fn hydrate(&self, node: Arc<Node>, locale: Option<&str>) -> DocumentResult<Arc<dyn Document>> {
        let mut event = HydrateEvent::new(node, locale.map(str::to_string));
        self.dispatch_hydrate(&mut event)?;
        event.into_document()
    }

    pub fn dispatch_query_execute(&self, event: &QueryExecuteEvent<'_>) {
        for subscriber in &self.subscribers {
            subscriber.on_query_execute(event);
        }
    }
}

/// Collects registrations before freezing them into an `EventDispatcher`
#[derive(Default)]
pub struct EventDispatcherBuilder {
    hydrators: Vec<Registration>,
    subscribers: Vec<Arc<dyn DocumentSubscriber>>,
}

impl EventDispatcherBuilder {
    /// Register a predicate and a document factory with priority 0
    pub fn register<P, F, D>(self, predicate: P, factory: F) -> Self
    where
        P: Fn(&Node) -> bool + Send + Sync + 'static,
        F: Fn(&Node, Option<&str>) -> DocumentResult<D> + Send + Sync + 'static,
        D: Document,
    {
        self.register_with_priority(0, predicate, factory)
    }

    pub fn register_with_priority<P, F, D>(self, priority: i32, predicate: P, factory: F) -> Self
    where
        P: Fn(&Node) -> bool + Send + Sync + 'static,
        F: Fn(&Node, Option<&str>) -> DocumentResult<D> + Send + Sync + 'static,
        D: Document,
    {
        let name = format!("hydrator#{}", self.hydrators.len());
        self.register_hydrator(Arc::new(FnHydrator::new(name, predicate, factory)), priority)
    }

    /// Register a factory for every node of a type, priority 0
    pub fn register_type<F, D>(self, node_type: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&Node, Option<&str>) -> DocumentResult<D> + Send + Sync + 'static,
        D: Document,
    {
        let node_type = node_type.into();
        let name = node_type.clone();
        self.register_hydrator(
            Arc::new(FnHydrator::new(
                name,
                move |node: &Node| node.is_node_type(&node_type),
                factory,
            )),
            0,
        )
    }

    pub fn register_hydrator(mut self, hydrator: Arc<dyn Hydrator>, priority: i32) -> Self {
        self.hydrators.push(Registration { priority, hydrator });
        self
    }

    pub fn subscribe(mut self, subscriber: Arc<dyn DocumentSubscriber>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    pub fn build(mut self) -> EventDispatcher {
        // Stable sort keeps registration order among equal priorities
        self.hydrators.sort_by(|a, b| b.priority.cmp(&a.priority));
        EventDispatcher {
            hydrators: self.hydrators,
            subscribers: self.subscribers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::document::GenericDocument;
    use crate::document::error::DocumentError;
    use crate::document::hydrate::GenericHydrator;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn tagged(tag: &'static str) -> impl Fn(&Node, Option<&str>) -> DocumentResult<GenericDocument> {
        move |node: &Node, locale: Option<&str>| {
            Ok(GenericDocument {
                uuid: node.uuid.clone(),
                path: node.path.clone(),
                document_type: tag.to_string(),
                locale: locale.map(str::to_string),
                properties: BTreeMap::new(),
            })
        }
    }

    fn page() -> Arc<Node> {
        Arc::new(Node::with_uuid("/cmf/home", "home").with_mixin("sulu:page"))
    }

    #[test]
    fn test_first_match_wins_in_registration_order() {
        let dispatcher = EventDispatcher::builder()
            .register_type("sulu:page", tagged("first"))
            .register_type("sulu:page", tagged("second"))
            .build();

        let document = dispatcher.hydrate(page(), Some("en")).unwrap();
        assert_eq!(document.document_type(), "first");
    }

    #[test]
    fn test_priority_overrides_registration_order() {
        let dispatcher = EventDispatcher::builder()
            .register_type("sulu:page", tagged("low"))
            .register_with_priority(10, |n: &Node| n.has_mixin("sulu:page"), tagged("high"))
            .build();

        assert_eq!(dispatcher.hydrator_names(), vec!["hydrator#1", "sulu:page"]);
        let document = dispatcher.hydrate(page(), None).unwrap();
        assert_eq!(document.document_type(), "high");
    }

    #[test]
    fn test_unsupported_node_is_a_contract_violation() {
        let dispatcher = EventDispatcher::builder()
            .register_hydrator(Arc::new(GenericHydrator::new(["sulu:snippet"])), 0)
            .build();

        assert!(matches!(
            dispatcher.hydrate(page(), Some("en")),
            Err(DocumentError::HydrationContractViolation { .. })
        ));
    }

    #[derive(Default)]
    struct Counter {
        hydrations: AtomicUsize,
    }

    impl DocumentSubscriber for Counter {
        fn on_hydrate(&self, _event: &HydrateEvent) {
            self.hydrations.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_subscribers_observe_hydration() {
        let counter = Arc::new(Counter::default());
        let dispatcher = EventDispatcher::builder()
            .register_type("sulu:page", tagged("page"))
            .subscribe(counter.clone())
            .build();

        dispatcher.hydrate(page(), None).unwrap();
        dispatcher.hydrate(page(), None).unwrap();
        assert_eq!(counter.hydrations.load(Ordering::SeqCst), 2);
    }
}
