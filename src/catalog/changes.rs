//! New-content detection between catalog loads.
//!
//! Each load computes a fingerprint (per-category counts plus the current
//! date). When it differs from the stored one, the item names are diffed
//! against the snapshot cached by the previous load.
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use super::types::{Catalog, Category};
use crate::storage::{keys, LocalStore, StoreError};

/// Number of new item names quoted in a notification message.
const MAX_NAMED_ITEMS: usize = 5;

/// Fingerprint of a catalog on a given day.
pub fn fingerprint(catalog: &Catalog, date: NaiveDate) -> String {
    let mut payload = serde_json::Map::new();
    for (category, count) in catalog.counts() {
        payload.insert(category.key().to_string(), serde_json::Value::from(count));
    }
    payload.insert(
        "timestamp".to_string(),
        serde_json::Value::from(date.format("%Y-%m-%d").to_string()),
    );
    STANDARD.encode(serde_json::Value::Object(payload).to_string())
}

/// Item names per category, cached so the next load can diff against them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameSnapshot {
    #[serde(flatten)]
    pub names: BTreeMap<Category, Vec<String>>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl NameSnapshot {
    pub fn capture(catalog: &Catalog, now: DateTime<Utc>) -> Self {
        Self {
            names: catalog.names(),
            timestamp: Some(now),
        }
    }
}

/// Names added per category since the previous snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentChanges {
    pub added: BTreeMap<Category, Vec<String>>,
}

impl ContentChanges {
    /// Diff `catalog` against a previous snapshot.
    ///
    /// Without a snapshot nothing counts as new. Categories absent from the
    /// snapshot are skipped.
    pub fn between(previous: Option<&NameSnapshot>, catalog: &Catalog) -> Self {
        let Some(previous) = previous else {
            return Self::default();
        };

        let mut added = BTreeMap::new();
        for category in Category::ALL {
            let Some(old_names) = previous.names.get(&category) else {
                continue;
            };
            let old: HashSet<&str> = old_names.iter().map(String::as_str).collect();
            let new_items: Vec<String> = catalog
                .items(category)
                .iter()
                .filter(|item| !old.contains(item.name.as_str()))
                .map(|item| item.name.clone())
                .collect();
            if !new_items.is_empty() {
                tracing::debug!(category = %category, count = new_items.len(), "New catalog items");
                added.insert(category, new_items);
            }
        }

        Self { added }
    }

    pub fn total(&self) -> usize {
        self.added.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn title(&self) -> &'static str {
        if self.total() == 1 {
            "New content available!"
        } else {
            "New content is available!"
        }
    }

    /// Notification body naming the per-category counts and the first few names.
    pub fn message(&self) -> String {
        let counts: Vec<String> = self
            .added
            .iter()
            .map(|(category, names)| format!("{} {}", names.len(), category.noun(names.len())))
            .collect();

        let names: Vec<&str> = self
            .added
            .values()
            .flatten()
            .map(String::as_str)
            .take(MAX_NAMED_ITEMS)
            .collect();
        let remaining = self.total().saturating_sub(names.len());

        let mut listed = names.join(", ");
        if remaining > 0 {
            listed.push_str(&format!(" and {} more", remaining));
        }

        if self.total() == 1 {
            format!("1 new {} added: {}. Take a look!", counts_noun(&self.added), listed)
        } else {
            format!("Added {}: {}.", counts.join(", "), listed)
        }
    }

    /// Short toast text for the status bar.
    pub fn toast(&self) -> String {
        match self.total() {
            1 => "1 new item was added!".to_string(),
            n => format!("{} new items were added!", n),
        }
    }
}

fn counts_noun(added: &BTreeMap<Category, Vec<String>>) -> &'static str {
    added
        .keys()
        .next()
        .map(|category| category.noun(1))
        .unwrap_or("item")
}

/// Compare the catalog with what the previous session saw and update the
/// stored fingerprint and name snapshot.
///
/// On the very first load both values are stored and no changes are
/// reported, so the following load has something to diff against.
///
/// # Errors
///
/// Returns `StoreError` if the store cannot be read or written.
pub async fn detect_new_content(
    store: &LocalStore,
    catalog: &Catalog,
    now: DateTime<Utc>,
) -> Result<ContentChanges, StoreError> {
    let current = fingerprint(catalog, now.date_naive());
    let saved = store.get_item(keys::CATALOG_FINGERPRINT).await?;

    let changes = match saved {
        None => {
            tracing::info!("First catalog load, storing fingerprint");
            ContentChanges::default()
        }
        Some(saved) if saved == current => {
            tracing::debug!("Catalog unchanged since last load");
            return Ok(ContentChanges::default());
        }
        Some(_) => {
            let previous: Option<NameSnapshot> = store.get_json(keys::CATALOG_NAMES).await?;
            let changes = ContentChanges::between(previous.as_ref(), catalog);
            tracing::info!(new_items = changes.total(), "Catalog fingerprint changed");
            changes
        }
    };

    store.set_item(keys::CATALOG_FINGERPRINT, &current).await?;
    store
        .set_json(keys::CATALOG_NAMES, &NameSnapshot::capture(catalog, now))
        .await?;

    Ok(changes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogItem;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn item(name: &str) -> CatalogItem {
        CatalogItem {
            name: name.to_string(),
            info: String::new(),
            icon: String::new(),
            badges: vec![],
            enlace: Some(format!("https://example.com/{}", name)),
            modal: None,
        }
    }

    fn catalog(programs: &[&str], games: &[&str]) -> Catalog {
        Catalog {
            programas: programs.iter().map(|n| item(n)).collect(),
            juegos: games.iter().map(|n| item(n)).collect(),
            ..Catalog::default()
        }
    }

    #[test]
    fn test_fingerprint_encodes_counts_and_date() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let fp = fingerprint(&catalog(&["A", "B"], &[]), date);
        let decoded = String::from_utf8(STANDARD.decode(fp).unwrap()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&decoded).unwrap();

        assert_eq!(value["programas"], 2);
        assert_eq!(value["juegos"], 0);
        assert_eq!(value["timestamp"], "2024-05-01");
    }

    #[test]
    fn test_fingerprint_changes_with_counts() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_ne!(
            fingerprint(&catalog(&["A"], &[]), date),
            fingerprint(&catalog(&["A", "B"], &[]), date)
        );
    }

    #[test]
    fn test_between_without_snapshot_is_empty() {
        let changes = ContentChanges::between(None, &catalog(&["A"], &[]));
        assert!(changes.is_empty());
    }

    #[test]
    fn test_between_reports_only_new_names() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let old = NameSnapshot::capture(&catalog(&["A", "B"], &["G"]), now);
        let changes = ContentChanges::between(Some(&old), &catalog(&["A", "B", "C"], &["G"]));

        assert_eq!(changes.total(), 1);
        assert_eq!(
            changes.added.get(&Category::Programs),
            Some(&vec!["C".to_string()])
        );
        assert_eq!(changes.title(), "New content available!");
        assert_eq!(changes.message(), "1 new program added: C. Take a look!");
    }

    #[test]
    fn test_message_lists_counts_and_truncates_names() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let old = NameSnapshot::capture(&catalog(&[], &[]), now);
        let changes = ContentChanges::between(
            Some(&old),
            &catalog(&["P1", "P2", "P3", "P4"], &["G1", "G2"]),
        );

        assert_eq!(changes.total(), 6);
        assert_eq!(
            changes.message(),
            "Added 4 programs, 2 games: P1, P2, P3, P4, G1 and 1 more."
        );
        assert_eq!(changes.toast(), "6 new items were added!");
    }

    #[test]
    fn test_snapshot_serializes_with_category_keys() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let snapshot = NameSnapshot::capture(&catalog(&["A"], &[]), now);
        let value = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(value["programas"][0], "A");
        assert!(value["timestamp"].is_string());

        let back: NameSnapshot = serde_json::from_value(value).unwrap();
        assert_eq!(back, snapshot);
    }

    #[tokio::test]
    async fn test_first_load_stores_fingerprint_and_snapshot() {
        let store = LocalStore::open(":memory:").await.unwrap();
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        let changes = detect_new_content(&store, &catalog(&["A"], &[]), now)
            .await
            .unwrap();

        assert!(changes.is_empty());
        assert!(store.get_item(keys::CATALOG_FINGERPRINT).await.unwrap().is_some());
        let snapshot: Option<NameSnapshot> = store.get_json(keys::CATALOG_NAMES).await.unwrap();
        assert!(snapshot.is_some());
    }

    #[tokio::test]
    async fn test_same_day_unchanged_catalog_reports_nothing() {
        let store = LocalStore::open(":memory:").await.unwrap();
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let cat = catalog(&["A"], &[]);

        detect_new_content(&store, &cat, now).await.unwrap();
        let changes = detect_new_content(&store, &cat, now).await.unwrap();
        assert!(changes.is_empty());
    }

    #[tokio::test]
    async fn test_next_day_without_additions_reports_nothing() {
        let store = LocalStore::open(":memory:").await.unwrap();
        let day1 = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let day2 = Utc.with_ymd_and_hms(2024, 5, 2, 12, 0, 0).unwrap();
        let cat = catalog(&["A"], &[]);

        detect_new_content(&store, &cat, day1).await.unwrap();
        let changes = detect_new_content(&store, &cat, day2).await.unwrap();
        assert!(changes.is_empty());
    }
}
