//! Integration tests for new-content detection across catalog loads.
//!
//! Each test uses its own in-memory store, so the fingerprint and name
//! snapshot written by one load are what the next load diffs against.

use chrono::{TimeZone, Utc};
use foxweb::app::App;
use foxweb::catalog::{detect_new_content, Catalog, Category};
use foxweb::config::Config;
use foxweb::notifications::NotificationKind;
use foxweb::preferences::PreferenceManager;
use foxweb::storage::{keys, LocalStore};
use pretty_assertions::assert_eq;
use std::path::Path;

const FIRST: &str = r#"{
    "programas": [
        {"name": "A", "info": "first", "enlace": "https://example.com/a"},
        {"name": "B", "info": "second", "enlace": "https://example.com/b"}
    ]
}"#;

const SECOND: &str = r#"{
    "programas": [
        {"name": "A", "info": "first", "enlace": "https://example.com/a"},
        {"name": "B", "info": "second", "enlace": "https://example.com/b"},
        {"name": "C", "info": "third", "enlace": "https://example.com/c"}
    ]
}"#;

async fn test_store() -> LocalStore {
    LocalStore::open(":memory:").await.unwrap()
}

fn catalog(json: &str) -> Catalog {
    Catalog::from_json(json).unwrap()
}

#[tokio::test]
async fn test_first_load_records_baseline_without_changes() {
    let store = test_store().await;
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

    let changes = detect_new_content(&store, &catalog(FIRST), now).await.unwrap();

    assert!(changes.is_empty());
    assert!(store.get_item(keys::CATALOG_FINGERPRINT).await.unwrap().is_some());
    assert!(store.get_item(keys::CATALOG_NAMES).await.unwrap().is_some());
}

#[tokio::test]
async fn test_added_item_is_reported_once() {
    let store = test_store().await;
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

    detect_new_content(&store, &catalog(FIRST), now).await.unwrap();
    let changes = detect_new_content(&store, &catalog(SECOND), now).await.unwrap();

    assert_eq!(changes.total(), 1);
    assert_eq!(
        changes.added.get(&Category::Programs),
        Some(&vec!["C".to_string()])
    );

    // Same catalog again: the new snapshot already includes C
    let again = detect_new_content(&store, &catalog(SECOND), now).await.unwrap();
    assert!(again.is_empty());
}

#[tokio::test]
async fn test_removed_items_are_not_reported() {
    let store = test_store().await;
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

    detect_new_content(&store, &catalog(SECOND), now).await.unwrap();
    let changes = detect_new_content(&store, &catalog(FIRST), now).await.unwrap();

    assert!(changes.is_empty());
}

#[tokio::test]
async fn test_new_day_with_same_items_reports_nothing() {
    let store = test_store().await;
    let monday = Utc.with_ymd_and_hms(2024, 5, 6, 9, 0, 0).unwrap();
    let tuesday = Utc.with_ymd_and_hms(2024, 5, 7, 9, 0, 0).unwrap();

    detect_new_content(&store, &catalog(FIRST), monday).await.unwrap();
    let changes = detect_new_content(&store, &catalog(FIRST), tuesday).await.unwrap();

    assert!(changes.is_empty());
}

#[tokio::test]
async fn test_next_session_notifies_about_added_item() {
    let store = test_store().await;
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let dir = std::env::temp_dir().join("foxweb-it-new-content");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("catalog.json");

    async fn start(store: &LocalStore, path: &Path, now: chrono::DateTime<Utc>) -> App {
        let prefs = PreferenceManager::from_config(&Config::default());
        let mut app = App::new(store.clone(), prefs, path.to_path_buf());
        app.load_session(None, now).await;
        app
    }

    std::fs::write(&path, FIRST).unwrap();
    let first = start(&store, &path, now).await;
    assert!(first.load_error.is_none());
    // The two seeded notices only
    assert_eq!(first.notifications.len(), 2);

    std::fs::write(&path, SECOND).unwrap();
    let second = start(&store, &path, now).await;
    assert_eq!(second.notifications.len(), 3);

    let newest = &second.notifications.entries()[0];
    assert_eq!(newest.kind, NotificationKind::Info);
    assert_eq!(newest.title, "New content available!");
    assert_eq!(newest.message, "1 new program added: C. Take a look!");
    assert_eq!(
        second.toast.as_ref().map(|t| t.kind),
        Some(NotificationKind::Success)
    );

    // A third run over the same file has nothing new to report
    let third = start(&store, &path, now).await;
    assert_eq!(third.notifications.len(), 3);
}
