// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Hydration: turning a node plus locale into a document

use crate::document::document::{Document, GenericDocument, Hydrated};
use crate::document::encoder::PropertyEncoder;
use crate::document::error::{DocumentError, DocumentResult};
use crate::node::Node;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Event carrying a node to hydrate; hydrators set the document on it
pub struct HydrateEvent {
    node: Arc<Node>,
    locale: Option<String>,
    document: Option<Arc<dyn Document>>,
}

impl HydrateEvent {
    pub fn new(node: Arc<Node>, locale: Option<String>) -> Self {
        Self {
            node,
            locale,
            document: None,
        }
    }

    pub fn node(&self) -> &Arc<Node> {
        &self.node
    }

    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    pub fn set_document(&mut self, document: Arc<dyn Document>) {
        self.document = Some(document);
    }

    pub fn document(&self) -> Option<&Arc<dyn Document>> {
        self.document.as_ref()
    }

    pub fn has_document(&self) -> bool {
        self.document.is_some()
    }

    /// The hydrated document; fails when no hydrator set one
    pub fn into_document(self) -> DocumentResult<Arc<dyn Document>> {
        let HydrateEvent {
            node,
            locale,
            document,
        } = self;
        document.ok_or_else(|| DocumentError::HydrationContractViolation {
            path: node.path.clone(),
            node_type: node.type_discriminator().to_string(),
            locale,
        })
    }
}

impl fmt::Debug for HydrateEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HydrateEvent")
            .field("path", &self.node.path)
            .field("locale", &self.locale)
            .field("has_document", &self.has_document())
            .finish()
    }
}

/// Builds documents for the nodes it supports
pub trait Hydrator: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    fn supports(&self, node: &Node) -> bool;

    /// Set a document on the event
    fn hydrate(&self, event: &mut HydrateEvent) -> DocumentResult<()>;
}

type Predicate = Box<dyn Fn(&Node) -> bool + Send + Sync>;
type Factory = Box<dyn Fn(&Node, Option<&str>) -> DocumentResult<Arc<dyn Document>> + Send + Sync>;

/// Hydrator made of a predicate and a factory function
pub struct FnHydrator {
    name: String,
    predicate: Predicate,
    factory: Factory,
}

impl FnHydrator {
    pub fn new<P, F, D>(name: impl Into<String>, predicate: P, factory: F) -> Self
    where
        P: Fn(&Node) -> bool + Send + Sync + 'static,
        F: Fn(&Node, Option<&str>) -> DocumentResult<D> + Send + Sync + 'static,
        D: Document,
    {
        Self {
            name: name.into(),
            predicate: Box::new(predicate),
            factory: Box::new(move |node: &Node, locale: Option<&str>| {
                factory(node, locale).map(|document| Arc::new(document) as Arc<dyn Document>)
            }),
        }
    }
}

impl Hydrator for FnHydrator {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports(&self, node: &Node) -> bool {
        (self.predicate)(node)
    }

    fn hydrate(&self, event: &mut HydrateEvent) -> DocumentResult<()> {
        let document = (self.factory)(event.node(), event.locale())?;
        event.set_document(document);
        Ok(())
    }
}

/// Hydrates nodes of the given types into `GenericDocument`s
#[derive(Debug, Clone)]
pub struct GenericHydrator {
    node_types: Vec<String>,
    encoder: PropertyEncoder,
}

impl GenericHydrator {
    pub fn new<I, S>(node_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            node_types: node_types.into_iter().map(Into::into).collect(),
            encoder: PropertyEncoder::default(),
        }
    }

    pub fn with_encoder(mut self, encoder: PropertyEncoder) -> Self {
        self.encoder = encoder;
        self
    }

    /// Build the document for a node directly
    pub fn document(&self, node: &Node, locale: Option<&str>) -> GenericDocument {
        GenericDocument {
            uuid: node.uuid.clone(),
            path: node.path.clone(),
            document_type: node.type_discriminator().to_string(),
            locale: locale.map(str::to_string),
            properties: self.encoder.localized_view(node, locale),
        }
    }
}

impl Hydrator for GenericHydrator {
    fn name(&self) -> &str {
        "generic"
    }

    fn supports(&self, node: &Node) -> bool {
        self.node_types.iter().any(|t| node.is_node_type(t))
    }

    fn hydrate(&self, event: &mut HydrateEvent) -> DocumentResult<()> {
        let document = self.document(event.node(), event.locale());
        event.set_document(Arc::new(document));
        Ok(())
    }
}

/// Hydrates nodes of one type into `Hydrated<T>`, deserializing the
/// localized property view into `T`
pub struct SerdeHydrator<T> {
    node_type: String,
    name: String,
    encoder: PropertyEncoder,
    marker: PhantomData<fn() -> T>,
}

impl<T> SerdeHydrator<T> {
    pub fn new(node_type: impl Into<String>) -> Self {
        let node_type = node_type.into();
        Self {
            name: format!("serde({})", node_type),
            node_type,
            encoder: PropertyEncoder::default(),
            marker: PhantomData,
        }
    }

    pub fn with_encoder(mut self, encoder: PropertyEncoder) -> Self {
        self.encoder = encoder;
        self
    }
}

impl<T> Hydrator for SerdeHydrator<T>
where
    T: DeserializeOwned + Serialize + fmt::Debug + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn supports(&self, node: &Node) -> bool {
        node.is_node_type(&self.node_type)
    }

    fn hydrate(&self, event: &mut HydrateEvent) -> DocumentResult<()> {
        let node = event.node();
        let view: serde_json::Map<String, serde_json::Value> = self
            .encoder
            .localized_view(node, event.locale())
            .into_iter()
            .map(|(name, value)| (name, value.to_json()))
            .collect();

        let content: T = serde_json::from_value(serde_json::Value::Object(view)).map_err(|e| {
            DocumentError::Hydration(format!("{} as {}: {}", node.path, self.node_type, e))
        })?;

        let document = Hydrated {
            uuid: node.uuid.clone(),
            path: node.path.clone(),
            document_type: self.node_type.clone(),
            locale: event.locale().map(str::to_string),
            content,
        };
        event.set_document(Arc::new(document));
        Ok(())
    }
}
