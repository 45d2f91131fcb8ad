//! Integration tests for the template store public API.

use doc_composer::model::{Inheritance, MergeStrategy, Template};
use doc_composer::store::{DirectoryStore, HttpStore, MemoryStore, TemplateStore};
use doc_composer::{ComposeError, Composer, Settings};
use httpmock::prelude::*;
use serde_json::json;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

#[test]
fn stores_are_interchangeable_behind_the_trait() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("a.yml"), "id: a\nname: A\n").unwrap();

    let stores: Vec<Box<dyn TemplateStore>> = vec![
        Box::new(MemoryStore::with_templates([Template::new("a", "A")])),
        Box::new(DirectoryStore::open(temp.path()).unwrap()),
    ];

    for store in &stores {
        assert_eq!(store.get_by_id("a").unwrap().name, "A");
        assert!(matches!(
            store.get_by_id("b"),
            Err(ComposeError::NotFound { .. })
        ));
    }
}

#[test]
fn shared_store_behind_arc() {
    let store = Arc::new(MemoryStore::with_templates([Template::new("a", "A")]));
    let composer = Composer::new(Arc::clone(&store));

    assert_eq!(composer.resolve_by_id("a").unwrap().name, "A");
}

#[test]
fn http_store_resolves_remote_chain() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/templates/base");
        then.status(200).json_body(json!({
            "id": "base",
            "name": "Base",
            "content": { "html": "<main>{{content}}</main>" }
        }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/templates/invoice");
        then.status(200).json_body(json!({
            "id": "invoice",
            "name": "Invoice",
            "type": "invoice",
            "content": { "html": "<table/>" },
            "inheritance": { "parent_id": "base", "merge_strategy": "merge" }
        }));
    });

    let store = HttpStore::with_settings(server.url("/templates"), &Settings::default()).unwrap();
    let composer = Composer::new(store);

    let resolved = composer.resolve_by_id("invoice").unwrap();

    assert_eq!(resolved.content.html, "<main><table/></main>");
    assert_eq!(
        resolved.inheritance,
        Some(Inheritance::new("base", MergeStrategy::Merge))
    );
}

#[test]
fn http_store_rejects_unknown_strategy() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/templates/odd");
        then.status(200).json_body(json!({
            "id": "odd",
            "inheritance": { "parent_id": "base", "merge_strategy": "blend" }
        }));
    });

    let store = HttpStore::with_settings(server.url("/templates"), &Settings::default()).unwrap();
    let err = store.get_by_id("odd").unwrap_err();

    assert!(matches!(err, ComposeError::UnknownStrategy { value, .. } if value == "blend"));
}

#[test]
fn settings_file_drives_composer() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("composer.yml");
    fs::write(&path, "content_placeholder: \"<!-- body -->\"\n").unwrap();
    let settings = Settings::load(&path).unwrap();

    let mut parent = Template::new("parent", "Parent");
    parent.content.html = "<div><!-- body --></div>".into();
    let mut child = Template::new("child", "Child");
    child.content.html = "<p/>".into();
    child.inheritance = Some(Inheritance::new("parent", MergeStrategy::Merge));

    let composer =
        Composer::with_settings(MemoryStore::with_templates([parent, child]), settings).unwrap();

    assert_eq!(
        composer.resolve_by_id("child").unwrap().content.html,
        "<div><p/></div>"
    );
}
