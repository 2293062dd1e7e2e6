//! Page model: everything the UI draws, computed from `App` without side effects.
//!
//! `build_page` is the only bridge from session state to presentation; the
//! `ui` module paints a `PageView` and never reads the catalog directly.
use crate::app::App;
use crate::catalog::{Category, ItemAction, ItemId};
use crate::search::{ItemType, TypeFilter};
use crate::theme::ThemeVariant;

/// One entry of the tab bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabView {
    pub category: Category,
    pub label: &'static str,
    pub count: usize,
    pub active: bool,
}

/// One rendered card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub id: ItemId,
    pub title: String,
    pub icon: String,
    pub main_badge: Option<String>,
    pub extra_badges: Vec<String>,
    pub description: String,
    pub favorite: bool,
    pub action: ItemAction,
    /// True only for direct links; modal items have nothing to copy.
    pub copyable: bool,
    pub item_type: ItemType,
    pub selected: bool,
}

/// Empty-state or no-results block shown in place of cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub hint: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView {
    pub tabs: Vec<TabView>,
    /// Items across every category.
    pub total: usize,
    pub active: Category,
    pub heading: &'static str,
    pub description: &'static str,
    pub cards: Vec<CardView>,
    /// Set when the active category has no items at all.
    pub empty_state: Option<Notice>,
    /// Set when a search term hides every card.
    pub no_results: Option<Notice>,
    pub footer: Option<&'static str>,
    /// Unread notification count; `None` hides the badge.
    pub unread_badge: Option<usize>,
    pub search: String,
    pub search_mode: bool,
    pub filter: TypeFilter,
    pub theme: ThemeVariant,
    pub url: String,
}

/// Build the page for the active tab.
pub fn build_page(app: &App) -> PageView {
    let active = app.current_category();

    let tabs = app
        .catalog
        .counts()
        .into_iter()
        .map(|(category, count)| TabView {
            category,
            label: category.name(),
            count,
            active: category == active,
        })
        .collect();

    let items = app.catalog.items(active);
    let grid = app.current_grid();

    let cards = app
        .visible_cards()
        .into_iter()
        .enumerate()
        .filter_map(|(position, index)| {
            let item = items.get(index)?;
            let id = ItemId::new(active, index);
            let mut badges = item.badges.iter().cloned();
            Some(CardView {
                id,
                title: item.name.clone(),
                icon: item.icon.clone(),
                main_badge: badges.next(),
                extra_badges: badges.collect(),
                description: item.info.clone(),
                favorite: app.favorites.contains(id),
                action: item.action(),
                copyable: item.copyable_link().is_some(),
                item_type: grid
                    .and_then(|g| g.item_type(index))
                    .unwrap_or(ItemType::Standard),
                selected: position == app.selected,
            })
        })
        .collect();

    let empty_state = items.is_empty().then(|| Notice {
        title: "No content available".to_string(),
        hint: format!("More {} coming soon.", active.noun(2)),
    });

    let no_results = grid.filter(|g| g.no_results()).map(|_| Notice {
        title: format!("No results for \"{}\"", app.search_term),
        hint: "Try different search terms".to_string(),
    });

    let unread = app.notifications.unread_count();

    PageView {
        tabs,
        total: app.catalog.total(),
        active,
        heading: active.heading(),
        description: active.description(),
        cards,
        empty_state,
        no_results,
        footer: active.footer(),
        unread_badge: (unread > 0).then_some(unread),
        search: app.search_input.clone(),
        search_mode: app.search_mode,
        filter: app.filter,
        theme: app.theme_variant,
        url: app.router.url().to_string(),
    }
}
