//! Text search and type filtering over the cards of one category.
//!
//! Every card keeps lower-cased copies of its searchable text so a filter
//! pass is a single linear scan with no allocation per card.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::{Catalog, CatalogItem, Category};

/// Normalize raw search input: trimmed and lower-cased.
pub fn normalize_term(raw: &str) -> String {
    raw.trim().to_lowercase()
}

// ============================================================================
// Item Type
// ============================================================================

/// Coarse item classification used by the type filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Portable,
    Light,
    #[serde(rename = "opensource")]
    OpenSource,
    Free,
    Standard,
}

impl ItemType {
    /// Classify an item from its name and badges.
    ///
    /// Priority: portable (badge or name), light, open source, free, standard.
    pub fn classify(item: &CatalogItem) -> Self {
        let name = item.name.to_lowercase();
        let badges = item.badges.join(" ").to_lowercase();

        if badges.contains("portable") || name.contains("portable") {
            Self::Portable
        } else if badges.contains("ligero") || badges.contains("light") {
            Self::Light
        } else if badges.contains("open source") {
            Self::OpenSource
        } else if badges.contains("gratuito") || badges.contains("free") {
            Self::Free
        } else {
            Self::Standard
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Portable => "Portable",
            Self::Light => "Light",
            Self::OpenSource => "Open Source",
            Self::Free => "Free",
            Self::Standard => "Standard",
        }
    }
}

// ============================================================================
// Type Filter
// ============================================================================

/// Type filter applied together with the search term.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeFilter {
    #[default]
    All,
    Only(ItemType),
}

impl TypeFilter {
    const CYCLE: [TypeFilter; 6] = [
        TypeFilter::All,
        TypeFilter::Only(ItemType::Portable),
        TypeFilter::Only(ItemType::Light),
        TypeFilter::Only(ItemType::OpenSource),
        TypeFilter::Only(ItemType::Free),
        TypeFilter::Only(ItemType::Standard),
    ];

    pub fn matches(self, item_type: ItemType) -> bool {
        match self {
            Self::All => true,
            Self::Only(t) => t == item_type,
        }
    }

    /// Next filter in cycle order, wrapping back to `All`.
    pub fn next(self) -> Self {
        let pos = Self::CYCLE.iter().position(|f| *f == self).unwrap_or(0);
        Self::CYCLE[(pos + 1) % Self::CYCLE.len()]
    }
}

impl fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("All"),
            Self::Only(t) => f.write_str(t.label()),
        }
    }
}

// ============================================================================
// Card Grid
// ============================================================================

#[derive(Debug, Clone)]
struct CardEntry {
    title: String,
    description: String,
    badges: Vec<String>,
    item_type: ItemType,
    visible: bool,
}

impl CardEntry {
    fn matches_term(&self, term: &str) -> bool {
        term.is_empty()
            || self.title.contains(term)
            || self.description.contains(term)
            || self.badges.iter().any(|b| b.contains(term))
    }
}

/// Search index and visibility state for the cards of one category.
#[derive(Debug, Clone)]
pub struct CardGrid {
    category: Category,
    entries: Vec<CardEntry>,
    no_results: bool,
}

impl CardGrid {
    pub fn build(category: Category, items: &[CatalogItem]) -> Self {
        let entries = items
            .iter()
            .map(|item| CardEntry {
                title: item.name.to_lowercase(),
                description: item.info.to_lowercase(),
                badges: item.badges.iter().map(|b| b.to_lowercase()).collect(),
                item_type: ItemType::classify(item),
                visible: true,
            })
            .collect();

        Self {
            category,
            entries,
            no_results: false,
        }
    }

    /// One grid per category, in tab order.
    pub fn build_all(catalog: &Catalog) -> Vec<CardGrid> {
        Category::ALL
            .iter()
            .map(|c| Self::build(*c, catalog.items(*c)))
            .collect()
    }

    /// Re-evaluate visibility for a normalized term and filter.
    ///
    /// Returns the number of visible cards.
    pub fn apply(&mut self, term: &str, filter: TypeFilter) -> usize {
        let mut visible = 0;
        for entry in &mut self.entries {
            entry.visible = entry.matches_term(term) && filter.matches(entry.item_type);
            if entry.visible {
                visible += 1;
            }
        }
        self.no_results = visible == 0 && !term.is_empty();
        tracing::debug!(
            category = %self.category,
            term = %term,
            filter = %filter,
            visible,
            "Applied search"
        );
        visible
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_visible(&self, index: usize) -> bool {
        self.entries.get(index).is_some_and(|e| e.visible)
    }

    pub fn item_type(&self, index: usize) -> Option<ItemType> {
        self.entries.get(index).map(|e| e.item_type)
    }

    /// Indices of visible cards, in catalog order.
    pub fn visible_indices(&self) -> Vec<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.visible)
            .map(|(i, _)| i)
            .collect()
    }

    /// True when a non-empty term matched nothing.
    pub fn no_results(&self) -> bool {
        self.no_results
    }
}
