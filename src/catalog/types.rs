use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Category
// ============================================================================

/// The fixed set of catalog sections, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "programas")]
    Programs,
    #[serde(rename = "sistemas")]
    Systems,
    #[serde(rename = "juegos")]
    Games,
    #[serde(rename = "extras")]
    Extras,
    #[serde(rename = "apks")]
    Apks,
}

impl Category {
    /// All categories in tab order.
    pub const ALL: [Category; 5] = [
        Category::Programs,
        Category::Systems,
        Category::Games,
        Category::Extras,
        Category::Apks,
    ];

    /// Key of this category in the catalog file and in item ids.
    pub fn key(self) -> &'static str {
        match self {
            Self::Programs => "programas",
            Self::Systems => "sistemas",
            Self::Games => "juegos",
            Self::Extras => "extras",
            Self::Apks => "apks",
        }
    }

    /// Tab label.
    pub fn name(self) -> &'static str {
        match self {
            Self::Programs => "Programs",
            Self::Systems => "Systems",
            Self::Games => "Games",
            Self::Extras => "Extras",
            Self::Apks => "APKs",
        }
    }

    /// Route segment used in URLs (`#Programas`).
    pub fn tab_id(self) -> &'static str {
        match self {
            Self::Programs => "Programas",
            Self::Systems => "Sistemas",
            Self::Games => "Juegos",
            Self::Extras => "Extras",
            Self::Apks => "APKs",
        }
    }

    pub fn heading(self) -> &'static str {
        match self {
            Self::Programs => "Essential Programs",
            Self::Systems => "Systems and Recovery",
            Self::Games => "Classic and Lightweight Games",
            Self::Extras => "Extras and Utilities",
            Self::Apks => "APKs for Android",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Programs => "Core software, optimized, with long-lived links",
            Self::Systems => "Linux distributions, rescue tools and maintenance utilities",
            Self::Games => "Timeless titles that run on any machine",
            Self::Extras => "Drivers, customization and specialized tools for your PC",
            Self::Apks => "Useful apps, games and lightweight alternatives for your phone",
        }
    }

    /// Note shown below the cards of some sections.
    pub fn footer(self) -> Option<&'static str> {
        match self {
            Self::Programs => None,
            Self::Systems => Some(
                "Some ISOs need a bootable USB created with tools like Rufus or BalenaEtcher.",
            ),
            Self::Games => Some("Password for compressed archives in this section: foxorange224"),
            Self::Extras => Some(
                "Drivers are OS specific. Make sure to download the right version (32-bit or 64-bit).",
            ),
            Self::Apks => Some(
                "Enable \"Install unknown apps\" in your Android settings to install APKs.",
            ),
        }
    }

    /// Singular and plural nouns for notification messages.
    pub fn noun(self, count: usize) -> &'static str {
        match (self, count == 1) {
            (Self::Programs, true) => "program",
            (Self::Programs, false) => "programs",
            (Self::Systems, true) => "system",
            (Self::Systems, false) => "systems",
            (Self::Games, true) => "game",
            (Self::Games, false) => "games",
            (Self::Extras, true) => "extra",
            (Self::Extras, false) => "extras",
            (Self::Apks, true) => "APK",
            (Self::Apks, false) => "APKs",
        }
    }

    /// Position in tab order (0-based).
    pub fn index(self) -> usize {
        Self::ALL.iter().position(|c| *c == self).unwrap_or(0)
    }

    /// Next tab, wrapping around.
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Previous tab, wrapping around.
    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Parse a category from its key, tab label or route segment (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.into_iter().find(|c| {
            c.key().eq_ignore_ascii_case(s)
                || c.name().eq_ignore_ascii_case(s)
                || c.tab_id().eq_ignore_ascii_case(s)
        })
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Item Identity
// ============================================================================

/// Session-scoped item identifier, rendered as `<category key>_<index>`.
///
/// Index based: only meaningful for the catalog load it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId {
    pub category: Category,
    pub index: usize,
}

impl ItemId {
    pub fn new(category: Category, index: usize) -> Self {
        Self { category, index }
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.category.key(), self.index)
    }
}

impl FromStr for ItemId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (category, index) = s
            .rsplit_once('_')
            .ok_or_else(|| format!("Malformed item id: {}", s))?;
        let category =
            Category::parse(category).ok_or_else(|| format!("Unknown category in id: {}", s))?;
        let index = index
            .parse::<usize>()
            .map_err(|_| format!("Bad index in id: {}", s))?;
        Ok(Self { category, index })
    }
}

impl TryFrom<String> for ItemId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> Self {
        id.to_string()
    }
}

// ============================================================================
// Catalog Entries
// ============================================================================

/// Values the catalog uses to mean "no link" / "no modal".
const SENTINELS: [&str; 4] = ["none", "null", "#", ""];

fn sentinel_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.and_then(|v| {
        let trimmed = v.trim();
        if SENTINELS.iter().any(|s| s.eq_ignore_ascii_case(trimmed)) {
            None
        } else {
            Some(trimmed.to_string())
        }
    }))
}

/// One downloadable entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub name: String,
    #[serde(default)]
    pub info: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub badges: Vec<String>,
    #[serde(default, deserialize_with = "sentinel_as_none")]
    pub enlace: Option<String>,
    #[serde(default, deserialize_with = "sentinel_as_none")]
    pub modal: Option<String>,
}

/// What activating an item does. A modal wins over a direct link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemAction {
    Modal(String),
    Link(String),
    Unavailable,
}

impl CatalogItem {
    pub fn action(&self) -> ItemAction {
        if let Some(modal) = &self.modal {
            ItemAction::Modal(modal.clone())
        } else if let Some(link) = &self.enlace {
            ItemAction::Link(link.clone())
        } else {
            ItemAction::Unavailable
        }
    }

    /// Direct link that may be copied, absent when the item opens a modal.
    pub fn copyable_link(&self) -> Option<&str> {
        match self.modal {
            Some(_) => None,
            None => self.enlace.as_deref(),
        }
    }
}

/// A button inside a download modal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModalButton {
    #[serde(alias = "texto")]
    pub label: String,
    #[serde(alias = "enlace")]
    pub url: String,
    #[serde(default, alias = "icono")]
    pub icon: String,
    #[serde(default, alias = "color")]
    pub variant: String,
}

/// Multi-link download dialog referenced by `CatalogItem::modal`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModalSpec {
    #[serde(alias = "titulo")]
    pub title: String,
    #[serde(default, alias = "descripcion")]
    pub description: String,
    #[serde(default, alias = "icono")]
    pub icon: String,
    #[serde(default, alias = "botones")]
    pub buttons: Vec<ModalButton>,
    #[serde(default, alias = "nota")]
    pub note: Option<String>,
}

// ============================================================================
// Catalog
// ============================================================================

/// The read-only catalog, grouped by category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub programas: Vec<CatalogItem>,
    #[serde(default)]
    pub sistemas: Vec<CatalogItem>,
    #[serde(default)]
    pub juegos: Vec<CatalogItem>,
    #[serde(default)]
    pub extras: Vec<CatalogItem>,
    #[serde(default)]
    pub apks: Vec<CatalogItem>,
    #[serde(default, alias = "modales")]
    pub modals: BTreeMap<String, ModalSpec>,
}

impl Catalog {
    /// Items of one category, in catalog order.
    pub fn items(&self, category: Category) -> &[CatalogItem] {
        match category {
            Category::Programs => &self.programas,
            Category::Systems => &self.sistemas,
            Category::Games => &self.juegos,
            Category::Extras => &self.extras,
            Category::Apks => &self.apks,
        }
    }

    /// Resolve an id to its item. Stale ids resolve to `None`.
    pub fn resolve(&self, id: ItemId) -> Option<&CatalogItem> {
        self.items(id.category).get(id.index)
    }

    pub fn modal(&self, id: &str) -> Option<&ModalSpec> {
        self.modals.get(id)
    }

    /// Item count of one category.
    pub fn count(&self, category: Category) -> usize {
        self.items(category).len()
    }

    /// Item counts per category, in tab order.
    pub fn counts(&self) -> BTreeMap<Category, usize> {
        Category::ALL.iter().map(|c| (*c, self.count(*c))).collect()
    }

    /// Item count across all categories.
    pub fn total(&self) -> usize {
        Category::ALL.iter().map(|c| self.count(*c)).sum()
    }

    /// Item names per category.
    pub fn names(&self) -> BTreeMap<Category, Vec<String>> {
        Category::ALL
            .iter()
            .map(|c| (*c, self.items(*c).iter().map(|i| i.name.clone()).collect()))
            .collect()
    }
}
