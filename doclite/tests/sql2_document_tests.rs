//! JCR-SQL2 queries through the document layer
//!
//! Constraints, full-text search, joins and primary selectors against the
//! fixture page tree.

#[path = "testutils/mod.rs"]
mod testutils;

use doclite::document::{GenericDocument, GenericHydrator, Hydrated};
use doclite::{DocumentError, EventDispatcher, Parameters, Value};
use std::sync::Arc;
use testutils::test_fixture::{Page, TestFixture};

fn uuids(fixture: &TestFixture, statement: &str, selector: Option<&str>) -> Vec<String> {
    let mut query = fixture
        .manager()
        .create_query(statement, None, selector)
        .expect("valid statement");
    query
        .execute_documents(&Parameters::new())
        .unwrap()
        .iter()
        .map(|d| d.map(|d| d.uuid().to_string()))
        .collect::<Result<_, _>>()
        .unwrap()
}

#[test]
fn test_constraints() {
    let fixture = TestFixture::new().expect("Failed to create test fixture");

    assert_eq!(
        uuids(&fixture, "SELECT * FROM [sulu:page] WHERE [weight] > 4 AND [weight] < 10", None),
        vec!["about", "news"]
    );
    assert_eq!(
        uuids(
            &fixture,
            "SELECT * FROM [sulu:page] AS p WHERE ISDESCENDANTNODE(p, '/cmf/news')",
            None
        ),
        vec!["launch"]
    );
    assert_eq!(
        uuids(&fixture, "SELECT * FROM [sulu:page] WHERE [i18n:en-title] IS NULL", None),
        vec!["contact"]
    );
    assert_eq!(
        uuids(
            &fixture,
            "SELECT * FROM [sulu:page] WHERE [published] > CAST('2024-01-01T00:00:00Z' AS DATE)",
            None
        ),
        vec!["launch"]
    );
    assert_eq!(
        uuids(
            &fixture,
            "SELECT * FROM [sulu:page] WHERE NOT [locales] = 'en' OR NAME() = 'home'",
            None
        ),
        vec!["home", "contact"]
    );
}

#[test]
fn test_full_text_search() {
    let fixture = TestFixture::new().expect("Failed to create test fixture");
    assert_eq!(
        uuids(
            &fixture,
            "SELECT * FROM [sulu:page] AS p WHERE CONTAINS(p.*, 'online')",
            None
        ),
        vec!["launch"]
    );
}

#[test]
fn test_join_with_primary_selector() {
    let fixture = TestFixture::new().expect("Failed to create test fixture");
    let statement = "SELECT * FROM [sulu:page] AS parent \
                     INNER JOIN [sulu:page] AS child ON ISCHILDNODE(child, parent)";

    assert_eq!(uuids(&fixture, statement, Some("parent")), vec!["news"]);
    assert_eq!(uuids(&fixture, statement, Some("child")), vec!["launch"]);

    let mut query = fixture.manager().create_query(statement, None, None).unwrap();
    let mut collection = query.execute_documents(&Parameters::new()).unwrap();
    assert_eq!(collection.count().unwrap(), 1);
    assert!(matches!(collection.current(), Err(DocumentError::Store(_))));

    let mut query = fixture
        .manager()
        .create_query(statement, None, Some("sibling"))
        .unwrap();
    let mut collection = query.execute_documents(&Parameters::new()).unwrap();
    assert!(matches!(collection.current(), Err(DocumentError::Store(_))));
}

#[test]
fn test_join_rows_keep_every_selector() {
    let fixture = TestFixture::new().expect("Failed to create test fixture");
    let mut query = fixture
        .manager()
        .create_query(
            "SELECT parent.[weight] AS parentWeight, child.[weight] FROM [sulu:page] AS parent \
             INNER JOIN [sulu:page] AS child ON ISCHILDNODE(child, parent)",
            None,
            Some("child"),
        )
        .unwrap();

    let mut raw = query.execute_raw(&Parameters::new()).unwrap();
    assert_eq!(raw.column_names(), vec!["parentWeight", "child.weight"]);
    let rows = raw.rows().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].node(Some("parent")).unwrap().uuid, "news");
    assert_eq!(rows[0].get_value("parentWeight"), Some(&Value::Long(7)));
    assert_eq!(rows[0].get_value("child.weight"), Some(&Value::Long(3)));
}

#[test]
fn test_locale_resolution() {
    let fixture = TestFixture::new().expect("Failed to create test fixture");
    let statement = "SELECT * FROM [sulu:page] WHERE NAME() = 'about'";

    for (locale, title) in [("en", "About us"), ("de", "Über uns")] {
        let mut query = fixture
            .manager()
            .create_query(statement, Some(locale), None)
            .unwrap();
        let document = query
            .execute_documents(&Parameters::new())
            .unwrap()
            .current()
            .unwrap();
        let page = document.downcast_ref::<Hydrated<Page>>().unwrap();
        assert_eq!(page.content.title.as_deref(), Some(title));
        assert_eq!(page.locale.as_deref(), Some(locale));
    }
}

#[test]
fn test_higher_priority_hydrator_wins() {
    let dispatcher = EventDispatcher::builder()
        .register_hydrator(Arc::new(GenericHydrator::new(["sulu:snippet"])), 0)
        .register_hydrator(Arc::new(GenericHydrator::new(["nt:base"])), -10)
        .register_hydrator(
            Arc::new(doclite::document::SerdeHydrator::<Page>::new("sulu:page")),
            10,
        )
        .build();
    let fixture = TestFixture::with_dispatcher(dispatcher).expect("Failed to create test fixture");

    let mut query = fixture
        .manager()
        .create_query("SELECT * FROM [nt:base] WHERE ISDESCENDANTNODE('/cmf')", None, None)
        .unwrap();
    let documents = query
        .execute_documents(&Parameters::new())
        .unwrap()
        .to_vec()
        .unwrap();

    let typed = documents
        .iter()
        .filter(|d| d.is::<Hydrated<Page>>())
        .count();
    let generic: Vec<&GenericDocument> = documents
        .iter()
        .filter_map(|d| d.downcast_ref::<GenericDocument>())
        .collect();

    assert_eq!(typed, 6);
    // the snippets folder falls through to the catch-all
    assert_eq!(generic.len(), 2);
    assert_eq!(generic[1].get_str("title"), Some("Footer"));
}
