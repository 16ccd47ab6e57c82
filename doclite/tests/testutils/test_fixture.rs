//! Test fixture for DocLite integration tests
//!
//! Uses only the public crate API.

use doclite::document::{DocumentSubscriber, SerdeHydrator};
use doclite::fixtures;
use doclite::{
    DocumentManager, DocumentManagerConfig, EventDispatcher, NodeRepository, StorageType,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Node type every fixture page carries
pub const PAGE: &str = "sulu:page";

/// Fixture tree:
///
/// ```text
/// /cmf
///   home            en, de   weight 10
///   about           en, de   weight 5
///   news            en       weight 7
///     launch        en, de   weight 3
///   contact         de       weight 1
///   blog            en       weight 2
///   snippets
///     footer        (sulu:snippet)
/// ```
pub const PAGES: &str = r#"{
    "nodes": [
        { "path": "/cmf/home", "uuid": "home", "mixins": ["sulu:page"],
          "properties": { "i18n:en-title": "Home", "i18n:de-title": "Startseite",
                          "locales": ["en", "de"], "weight": 10 } },
        { "path": "/cmf/about", "uuid": "about", "mixins": ["sulu:page"],
          "properties": { "i18n:en-title": "About us", "i18n:de-title": "Über uns",
                          "locales": ["en", "de"], "weight": 5 } },
        { "path": "/cmf/news", "uuid": "news", "mixins": ["sulu:page"],
          "properties": { "i18n:en-title": "News", "locales": ["en"], "weight": 7 } },
        { "path": "/cmf/news/launch", "uuid": "launch", "mixins": ["sulu:page"],
          "properties": { "i18n:en-title": "We launched", "i18n:de-title": "Wir sind online",
                          "locales": ["en", "de"], "weight": 3,
                          "published": { "$date": "2024-05-01T09:00:00Z" } } },
        { "path": "/cmf/contact", "uuid": "contact", "mixins": ["sulu:page"],
          "properties": { "i18n:de-title": "Kontakt", "locales": ["de"], "weight": 1 } },
        { "path": "/cmf/blog", "uuid": "blog", "mixins": ["sulu:page"],
          "properties": { "i18n:en-title": "Blog", "locales": ["en"], "weight": 2 } },
        { "path": "/cmf/snippets/footer", "uuid": "footer", "mixins": ["sulu:snippet"],
          "properties": { "i18n:en-title": "Footer" } }
    ]
}"#;

/// Typed content of a fixture page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub weight: i64,
}

/// Test fixture with an isolated repository and document manager
pub struct TestFixture {
    manager: DocumentManager,
    db_path: Option<PathBuf>,
    _temp_dir: Option<tempfile::TempDir>,
}

impl TestFixture {
    /// In-memory fixture with the default page hydrator
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        Self::with_dispatcher(Self::dispatcher(Vec::new()))
    }

    /// In-memory fixture whose dispatcher also notifies the subscriber
    pub fn with_subscriber(
        subscriber: Arc<dyn DocumentSubscriber>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        Self::with_dispatcher(Self::dispatcher(vec![subscriber]))
    }

    /// In-memory fixture with a caller-built dispatcher
    pub fn with_dispatcher(
        dispatcher: EventDispatcher,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let repository = NodeRepository::in_memory();
        fixtures::import_json(&repository, PAGES)?;

        let manager = DocumentManager::new(
            Arc::new(repository),
            Arc::new(dispatcher),
            Self::config(),
        )?;
        Ok(Self {
            manager,
            db_path: None,
            _temp_dir: None,
        })
    }

    /// Sled-backed fixture in a temporary directory
    pub fn sled() -> Result<Self, Box<dyn std::error::Error>> {
        let temp_dir = tempfile::tempdir()?;
        let db_path = temp_dir.path().join("doclite_test");

        let repository = NodeRepository::open(StorageType::Sled, &db_path)?;
        fixtures::import_json(&repository, PAGES)?;

        let manager = DocumentManager::new(
            Arc::new(repository),
            Arc::new(Self::dispatcher(Vec::new())),
            Self::config(),
        )?;
        Ok(Self {
            manager,
            db_path: Some(db_path),
            _temp_dir: Some(temp_dir),
        })
    }

    pub fn config() -> DocumentManagerConfig {
        DocumentManagerConfig {
            locales: vec!["en".to_string(), "de".to_string()],
            ..Default::default()
        }
    }

    /// Dispatcher hydrating pages into `Hydrated<Page>`
    pub fn dispatcher(subscribers: Vec<Arc<dyn DocumentSubscriber>>) -> EventDispatcher {
        let mut builder = EventDispatcher::builder()
            .register_hydrator(Arc::new(SerdeHydrator::<Page>::new(PAGE)), 0);
        for subscriber in subscribers {
            builder = builder.subscribe(subscriber);
        }
        builder.build()
    }

    pub fn manager(&self) -> &DocumentManager {
        &self.manager
    }

    pub fn repository(&self) -> &Arc<NodeRepository> {
        self.manager.repository()
    }

    /// Database directory of a sled fixture
    pub fn db_path(&self) -> Option<&PathBuf> {
        self.db_path.as_ref()
    }

    /// Close the manager, keeping the temporary directory alive
    pub fn close(self) -> (Option<PathBuf>, Option<tempfile::TempDir>) {
        (self.db_path, self._temp_dir)
    }
}
