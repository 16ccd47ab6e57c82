//! Sled-backed repository tests
//!
//! Content imported into a sled repository survives reopening and answers
//! the same document queries.

#[path = "testutils/mod.rs"]
mod testutils;

use doclite::document::Hydrated;
use doclite::{
    DocumentError, DocumentManager, DocumentManagerConfig, NodeRepository, Parameters,
    StorageConfig, StorageType, Value,
};
use std::sync::Arc;
use testutils::test_fixture::{Page, TestFixture};

#[test]
fn test_content_survives_reopen() {
    let fixture = TestFixture::sled().expect("Failed to create sled fixture");
    assert_eq!(fixture.repository().storage_type(), Some(StorageType::Sled));
    let before = fixture.repository().len();

    fixture
        .repository()
        .set_property("about", "i18n:en-title", Value::from("About DocLite"))
        .unwrap();
    fixture.repository().save().unwrap();

    let (db_path, _temp_dir) = fixture.close();
    let db_path = db_path.expect("sled fixture has a path");

    let repository = NodeRepository::open(StorageType::Sled, &db_path).unwrap();
    assert_eq!(repository.len(), before);

    let manager = DocumentManager::new(
        Arc::new(repository),
        Arc::new(TestFixture::dispatcher(Vec::new())),
        TestFixture::config(),
    )
    .unwrap();

    let document = manager.find("/cmf/about", None).unwrap();
    let page = document.downcast_ref::<Hydrated<Page>>().unwrap();
    assert_eq!(page.content.title.as_deref(), Some("About DocLite"));

    let mut query = manager
        .create_query("SELECT * FROM [sulu:page] ORDER BY [weight] DESC", Some("de"), None)
        .unwrap();
    let uuids: Vec<String> = query
        .execute_documents(&Parameters::new())
        .unwrap()
        .iter()
        .map(|d| d.map(|d| d.uuid().to_string()))
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(uuids, vec!["home", "news", "about", "launch", "blog", "contact"]);
}

#[test]
fn test_document_order_survives_reopen() {
    let fixture = TestFixture::sled().expect("Failed to create sled fixture");
    let (db_path, _temp_dir) = fixture.close();

    let repository = NodeRepository::open(StorageType::Sled, db_path.unwrap()).unwrap();
    let children: Vec<String> = repository
        .children("/cmf")
        .unwrap()
        .iter()
        .map(|node| node.name().to_string())
        .collect();
    assert_eq!(children, vec!["home", "about", "news", "contact", "blog", "snippets"]);
}

#[test]
fn test_manager_from_config() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = DocumentManagerConfig {
        storage: StorageConfig {
            storage_type: StorageType::Sled,
            path: Some(temp_dir.path().join("configured")),
        },
        ..TestFixture::config()
    };

    let manager =
        DocumentManager::from_config(config, Arc::new(TestFixture::dispatcher(Vec::new())))
            .unwrap();
    assert!(manager.repository().is_empty());
    assert!(matches!(
        manager.find("home", None),
        Err(DocumentError::NodeNotFound(_))
    ));
}
