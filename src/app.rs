use crate::catalog::{detect_new_content, Catalog, CatalogItem, Category, ItemAction, ItemId, ModalSpec};
use crate::favorites::Favorites;
use crate::keybindings::KeybindingRegistry;
use crate::notifications::{NotificationKind, Notifications};
use crate::preferences::PreferenceManager;
use crate::router::{resolve_initial, Navigation, Router};
use crate::search::{normalize_term, CardGrid, TypeFilter};
use crate::storage::{keys, LocalStore};
use crate::suggestion::{issue_url, SuggestionError, SuggestionFields, SuggestionLog};
use crate::theme::{StyleMap, ThemeVariant};
use crate::util::MAX_SEARCH_QUERY_LENGTH;
use chrono::{DateTime, Utc};
use ratatui::style::Style;
use std::borrow::Cow;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::Instant;

/// How many recently opened items the state snapshot keeps.
pub const MAX_RECENT_ITEMS: usize = 10;

/// Delay before the first-visit welcome toast.
pub const WELCOME_DELAY: Duration = Duration::from_secs(1);

/// Delay between a successful suggestion and opening its issue page.
pub const ISSUE_OPEN_DELAY: Duration = Duration::from_secs(1);

// ============================================================================
// State Snapshot
// ============================================================================

/// Serializable snapshot of the session, saved under `foxweb_state`.
///
/// Tabs, themes and item ids are stored as strings so a snapshot written by
/// a build with more variants still loads; unknown values are skipped.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppStateSnapshot {
    /// Catalog key of the active tab.
    pub current_tab: String,
    /// Normalized search term.
    pub search: String,
    pub filter: TypeFilter,
    /// Theme key ("dark" or "light").
    pub theme: String,
    /// Most recently opened items, newest first.
    pub recent_items: Vec<String>,
    pub last_saved: Option<DateTime<Utc>>,
}

// ============================================================================
// Toasts
// ============================================================================

/// Short-lived message shown in the status bar.
#[derive(Debug, Clone)]
pub struct Toast {
    pub kind: NotificationKind,
    pub message: Cow<'static, str>,
    pub shown_at: Instant,
}

// ============================================================================
// Overlays
// ============================================================================

/// Fields of the suggestion form, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Description,
    Category,
    Link,
    Website,
    Email,
}

impl FormField {
    pub const ORDER: [FormField; 6] = [
        FormField::Name,
        FormField::Description,
        FormField::Category,
        FormField::Link,
        FormField::Website,
        FormField::Email,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Description => "Description",
            Self::Category => "Category",
            Self::Link => "Download link",
            Self::Website => "Website",
            Self::Email => "Email",
        }
    }

    pub fn required(self) -> bool {
        !matches!(self, Self::Website | Self::Email)
    }

    fn position(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        Self::ORDER[(self.position() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

/// In-progress suggestion form.
#[derive(Debug, Clone)]
pub struct SuggestForm {
    pub fields: SuggestionFields,
    pub focus: FormField,
}

impl SuggestForm {
    /// Empty form with the category preselected.
    pub fn new(category: Option<Category>) -> Self {
        Self {
            fields: SuggestionFields {
                category,
                ..SuggestionFields::default()
            },
            focus: FormField::Name,
        }
    }

    /// Text buffer of the focused field. `None` on the category picker.
    pub fn input_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            FormField::Name => Some(&mut self.fields.name),
            FormField::Description => Some(&mut self.fields.description),
            FormField::Category => None,
            FormField::Link => Some(&mut self.fields.link),
            FormField::Website => Some(&mut self.fields.website),
            FormField::Email => Some(&mut self.fields.email),
        }
    }

    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.fields.name,
            FormField::Description => &self.fields.description,
            FormField::Category => self.fields.category.map(Category::name).unwrap_or(""),
            FormField::Link => &self.fields.link,
            FormField::Website => &self.fields.website,
            FormField::Email => &self.fields.email,
        }
    }

    /// Step the category picker; unset starts at Programs.
    pub fn cycle_category(&mut self, forward: bool) {
        self.fields.category = Some(match (self.fields.category, forward) {
            (None, _) => Category::Programs,
            (Some(c), true) => c.next(),
            (Some(c), false) => c.prev(),
        });
    }
}

/// Overlay drawn on top of the card grid. Captures all input while open.
#[derive(Debug, Clone)]
pub enum Overlay {
    /// Download dialog of a modal item; `selected` is the focused button.
    Modal { id: String, selected: usize },
    Notifications { scroll: usize },
    Suggest(SuggestForm),
    /// Shown after a successful submission, until dismissed.
    Submitted { name: String, issue_url: String },
    Help { scroll: usize },
    /// "Go to route" prompt; takes a URL, hash or path.
    RoutePrompt { input: String },
}

/// Events from background tasks
pub enum AppEvent {
    /// First-visit greeting is due.
    ShowWelcome,
    /// The delay after a suggestion elapsed; open its issue page.
    OpenIssue { url: String },
    /// The reachability check saw the network come or go.
    Connectivity { online: bool },
    /// A background task panicked.
    TaskPanicked { task: &'static str, error: String },
}

// ============================================================================
// Application State
// ============================================================================

/// The session controller. Owns every piece of state; UI handlers get `&mut App`.
pub struct App {
    pub store: LocalStore,
    pub prefs: PreferenceManager,
    pub catalog_path: PathBuf,

    // Theme
    pub theme_variant: ThemeVariant,
    pub theme: StyleMap,
    pub keybindings: KeybindingRegistry,

    // Catalog
    pub catalog: Catalog,
    /// Set when the catalog failed to load; the UI shows the error screen.
    pub load_error: Option<String>,
    /// One grid per category, in tab order.
    pub grids: Vec<CardGrid>,

    // Routing and search
    pub router: Router,
    /// Normalized term currently applied to the grids.
    pub search_term: String,
    /// Raw text in the search bar.
    pub search_input: String,
    pub search_mode: bool,
    pub search_debounce: Option<Instant>,
    pub pending_search: Option<String>,
    pub filter: TypeFilter,

    // Session data
    pub favorites: Favorites,
    pub notifications: Notifications,
    pub suggestions: SuggestionLog,
    pub recent_items: Vec<ItemId>,
    pub first_visit: bool,

    // Status flags
    /// True while the catalog file is being read.
    pub loading: bool,
    /// Set by the connectivity monitor; download links need the network.
    pub offline: bool,

    // UI state
    /// Position of the selection among the visible cards.
    pub selected: usize,
    pub overlay: Option<Overlay>,
    pub toast: Option<Toast>,
    pub needs_redraw: bool,
}

impl App {
    pub fn new(store: LocalStore, prefs: PreferenceManager, catalog_path: PathBuf) -> Self {
        let theme_variant = prefs.theme_variant();
        let router = Router::new(Category::Programs, prefs.route_mode());

        Self {
            store,
            prefs,
            catalog_path,
            theme_variant,
            theme: StyleMap::new(theme_variant),
            keybindings: KeybindingRegistry::new(),
            catalog: Catalog::default(),
            load_error: None,
            grids: Vec::new(),
            router,
            search_term: String::new(),
            search_input: String::new(),
            search_mode: false,
            search_debounce: None,
            pending_search: None,
            filter: TypeFilter::All,
            favorites: Favorites::default(),
            notifications: Notifications::default(),
            suggestions: SuggestionLog::default(),
            recent_items: Vec::new(),
            first_visit: false,
            loading: true,
            offline: false,
            selected: 0,
            overlay: None,
            toast: None,
            needs_redraw: true,
        }
    }

    /// Resolve a semantic role name to its `Style`.
    pub fn style(&self, role: &str) -> Style {
        self.theme.resolve(role)
    }

    // ========================================================================
    // Session Loading
    // ========================================================================

    /// Restore persisted state and load the catalog.
    ///
    /// `initial_url` (from `--route`) wins over the persisted tab. Store
    /// failures are logged and the session continues with in-memory defaults.
    pub async fn load_session(&mut self, initial_url: Option<&str>, now: DateTime<Utc>) {
        self.favorites = match Favorites::load(&self.store).await {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load favorites");
                Favorites::default()
            }
        };
        self.notifications = match Notifications::load(&self.store, now).await {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load notifications");
                Notifications::from_entries(Notifications::defaults(now))
            }
        };
        self.suggestions = match SuggestionLog::load(&self.store).await {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load suggestions");
                SuggestionLog::default()
            }
        };

        let snapshot = match self.store.get_json::<AppStateSnapshot>(keys::APP_STATE).await {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load state snapshot");
                None
            }
        };
        let persisted_tab = snapshot
            .as_ref()
            .and_then(|s| Category::parse(&s.current_tab));
        self.router = Router::new(
            resolve_initial(initial_url, persisted_tab),
            self.prefs.route_mode(),
        );
        if let Some(snapshot) = snapshot {
            self.restore(snapshot);
        }

        match self.store.get_item(keys::FIRST_VISIT).await {
            Ok(None) => {
                self.first_visit = true;
                if let Err(e) = self.store.set_item(keys::FIRST_VISIT, "true").await {
                    tracing::warn!(error = %e, "Failed to persist first-visit flag");
                }
            }
            Ok(Some(_)) => {}
            Err(e) => tracing::warn!(error = %e, "Failed to read first-visit flag"),
        }

        self.reload_catalog(now).await;
    }

    /// Apply a snapshot: search, filter and recent items. The tab is
    /// handled by the router and the theme by the preference layer.
    pub fn restore(&mut self, snapshot: AppStateSnapshot) {
        self.search_term = normalize_term(&snapshot.search);
        self.search_input = self.search_term.clone();
        self.filter = snapshot.filter;
        self.recent_items = snapshot
            .recent_items
            .iter()
            .filter_map(|s| s.parse().ok())
            .take(MAX_RECENT_ITEMS)
            .collect();
    }

    /// Capture the current session as a snapshot.
    pub fn snapshot(&self, now: DateTime<Utc>) -> AppStateSnapshot {
        AppStateSnapshot {
            current_tab: self.router.current().key().to_string(),
            search: self.search_term.clone(),
            filter: self.filter,
            theme: self.theme_variant.key().to_string(),
            recent_items: self.recent_items.iter().map(ToString::to_string).collect(),
            last_saved: Some(now),
        }
    }

    /// Persist the snapshot. Best effort: failures are only logged.
    pub async fn save_state(&self) {
        let snapshot = self.snapshot(Utc::now());
        if let Err(e) = self.store.set_json(keys::APP_STATE, &snapshot).await {
            tracing::warn!(error = %e, "Failed to save state snapshot");
        }
    }

    /// (Re)load the catalog file, rebuild the grids and check for new content.
    ///
    /// Returns false when loading failed; `load_error` then holds the message.
    pub async fn reload_catalog(&mut self, now: DateTime<Utc>) -> bool {
        self.loading = true;
        let loaded = Catalog::load(&self.catalog_path);
        self.loading = false;
        let catalog = match loaded {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(path = %self.catalog_path.display(), error = %e, "Failed to load catalog");
                self.load_error = Some(e.to_string());
                self.needs_redraw = true;
                return false;
            }
        };

        tracing::info!(total = catalog.total(), "Catalog loaded");
        self.grids = CardGrid::build_all(&catalog);
        self.catalog = catalog;
        self.load_error = None;
        self.apply_search();
        self.clamp_selection();
        self.needs_redraw = true;

        match detect_new_content(&self.store, &self.catalog, now).await {
            Ok(changes) if !changes.is_empty() => {
                self.notifications
                    .push(NotificationKind::Info, changes.title(), changes.message(), now);
                self.save_notifications().await;
                self.toast(NotificationKind::Success, changes.toast());
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "New-content check failed"),
        }

        true
    }

    /// Record a connectivity change from the reachability check.
    ///
    /// Toasts only on an actual transition. Returns true if the flag changed.
    pub fn set_connectivity(&mut self, online: bool) -> bool {
        if self.offline != online {
            return false;
        }
        self.offline = !online;
        tracing::info!(online, "Connectivity changed");
        if online {
            self.toast(NotificationKind::Success, "Connection restored");
        } else {
            self.toast(
                NotificationKind::Warning,
                "You are offline. Download links will not open until the connection returns.",
            );
        }
        true
    }

    // ========================================================================
    // Theme
    // ========================================================================

    /// Switch to a different theme variant at runtime.
    pub fn set_theme(&mut self, variant: ThemeVariant) {
        self.theme_variant = variant;
        self.theme = StyleMap::new(variant);
        self.needs_redraw = true;
    }

    /// Toggle Dark/Light and persist the choice.
    ///
    /// Returns the name of the new theme for status display.
    pub async fn cycle_theme(&mut self) -> &'static str {
        let next = self.theme_variant.next();
        self.set_theme(next);
        if let Err(e) = self.prefs.set(&self.store, "theme", next.key()).await {
            tracing::warn!(error = %e, "Failed to persist theme");
        }
        self.save_state().await;
        next.name()
    }

    // ========================================================================
    // Tabs and Selection
    // ========================================================================

    pub fn current_category(&self) -> Category {
        self.router.current()
    }

    pub fn current_grid(&self) -> Option<&CardGrid> {
        self.grids.get(self.current_category().index())
    }

    /// Catalog indices of the visible cards on the active tab.
    pub fn visible_cards(&self) -> Vec<usize> {
        self.current_grid()
            .map(CardGrid::visible_indices)
            .unwrap_or_default()
    }

    pub fn selected_id(&self) -> Option<ItemId> {
        let index = *self.visible_cards().get(self.selected)?;
        Some(ItemId::new(self.current_category(), index))
    }

    pub fn selected_item(&self) -> Option<&CatalogItem> {
        self.catalog.resolve(self.selected_id()?)
    }

    pub fn nav_down(&mut self) {
        let len = self.visible_cards().len();
        if len > 0 && self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn nav_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Keep the selection inside the visible cards.
    pub fn clamp_selection(&mut self) {
        let len = self.visible_cards().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    /// Navigate to a tab. On a switch the search is re-applied and the
    /// state snapshot saved.
    pub async fn open_tab(&mut self, category: Category) -> Navigation {
        let nav = self.router.open_tab(category);
        self.after_navigation(nav).await;
        nav
    }

    pub async fn next_tab(&mut self) -> Navigation {
        self.open_tab(self.current_category().next()).await
    }

    pub async fn prev_tab(&mut self) -> Navigation {
        self.open_tab(self.current_category().prev()).await
    }

    /// Navigate from an externally supplied URL, hash or path.
    pub async fn handle_url_change(&mut self, url: &str) -> Navigation {
        let nav = self.router.handle_url_change(url);
        self.after_navigation(nav).await;
        nav
    }

    async fn after_navigation(&mut self, nav: Navigation) {
        if let Navigation::Switched { .. } = nav {
            self.selected = 0;
            self.apply_search();
            self.save_state().await;
        }
    }

    // ========================================================================
    // Search and Filter
    // ========================================================================

    /// Re-filter the active tab. Other tabs are filtered when opened.
    pub fn apply_search(&mut self) -> usize {
        let index = self.current_category().index();
        let (term, filter) = (self.search_term.as_str(), self.filter);
        self.grids
            .get_mut(index)
            .map(|grid| grid.apply(term, filter))
            .unwrap_or(0)
    }

    /// Record a keystroke in the search bar and restart the debounce timer.
    pub fn queue_search(&mut self, input: String) {
        self.search_input = input;
        self.search_debounce = Some(Instant::now());
        self.pending_search = Some(self.search_input.clone());
    }

    /// True once the debounce delay has passed since the last keystroke.
    pub fn search_due(&self) -> bool {
        self.search_debounce
            .is_some_and(|t| t.elapsed() >= self.prefs.search_debounce())
    }

    /// Run the pending search now. Over-long terms are rejected with a toast.
    pub async fn commit_search(&mut self) {
        self.search_debounce = None;
        let raw = self
            .pending_search
            .take()
            .unwrap_or_else(|| self.search_input.clone());

        if raw.chars().count() > MAX_SEARCH_QUERY_LENGTH {
            self.toast(
                NotificationKind::Warning,
                format!("Search term too long (max {} characters)", MAX_SEARCH_QUERY_LENGTH),
            );
            return;
        }

        let term = normalize_term(&raw);
        if term == self.search_term {
            return;
        }
        self.search_term = term;
        self.selected = 0;
        self.apply_search();
        self.save_state().await;
    }

    /// Clear the search bar and show every card again.
    pub async fn clear_search(&mut self) {
        self.search_mode = false;
        self.search_input.clear();
        self.search_debounce = None;
        self.pending_search = None;
        if self.search_term.is_empty() {
            return;
        }
        self.search_term.clear();
        self.apply_search();
        self.clamp_selection();
        self.save_state().await;
    }

    pub async fn cycle_filter(&mut self) -> TypeFilter {
        self.filter = self.filter.next();
        self.selected = 0;
        self.apply_search();
        self.save_state().await;
        self.filter
    }

    // ========================================================================
    // Items
    // ========================================================================

    /// Toggle the selected card's favorite state. Returns the new state.
    pub async fn toggle_favorite(&mut self) -> Option<bool> {
        let id = self.selected_id()?;
        let added = self.favorites.toggle(id);
        if let Err(e) = self.favorites.save(&self.store).await {
            tracing::warn!(error = %e, "Failed to save favorites");
        }
        if added {
            self.toast(NotificationKind::Success, "Added to favorites");
        } else {
            self.toast(NotificationKind::Info, "Removed from favorites");
        }
        Some(added)
    }

    /// Activate the selected card.
    ///
    /// Modal items open the modal overlay; linked items return their URL
    /// for the caller to open. Either way the item is recorded as recent.
    pub async fn activate_selected(&mut self) -> Option<String> {
        let id = self.selected_id()?;
        let action = self.catalog.resolve(id)?.action();

        match action {
            ItemAction::Modal(modal_id) => {
                if self.catalog.modal(&modal_id).is_none() {
                    tracing::warn!(item = %id, modal = %modal_id, "Item references unknown modal");
                    self.toast(NotificationKind::Error, "Download details are missing");
                    return None;
                }
                self.overlay = Some(Overlay::Modal {
                    id: modal_id,
                    selected: 0,
                });
                self.record_recent(id).await;
                None
            }
            ItemAction::Link(url) => {
                self.record_recent(id).await;
                Some(url)
            }
            ItemAction::Unavailable => {
                self.toast(NotificationKind::Warning, "Download not available yet");
                None
            }
        }
    }

    async fn record_recent(&mut self, id: ItemId) {
        self.recent_items.retain(|r| *r != id);
        self.recent_items.insert(0, id);
        self.recent_items.truncate(MAX_RECENT_ITEMS);
        self.save_state().await;
    }

    /// Modal currently shown, if any.
    pub fn open_modal(&self) -> Option<(&ModalSpec, usize)> {
        match &self.overlay {
            Some(Overlay::Modal { id, selected }) => Some((self.catalog.modal(id)?, *selected)),
            _ => None,
        }
    }

    /// URL of the focused modal button.
    pub fn modal_button_url(&self) -> Option<String> {
        let (modal, selected) = self.open_modal()?;
        modal.buttons.get(selected).map(|b| b.url.clone())
    }

    /// Move the modal button focus one step, wrapping around.
    pub fn move_modal_selection(&mut self, forward: bool) {
        let count = self.open_modal().map(|(m, _)| m.buttons.len()).unwrap_or(0);
        if let Some(Overlay::Modal { selected, .. }) = &mut self.overlay {
            if count > 0 {
                *selected = if forward {
                    (*selected + 1) % count
                } else {
                    (*selected + count - 1) % count
                };
            }
        }
    }

    // ========================================================================
    // Notifications
    // ========================================================================

    /// Open the notification panel and mark every entry read.
    pub async fn show_notifications(&mut self) {
        self.overlay = Some(Overlay::Notifications { scroll: 0 });
        if self.notifications.mark_all_read() > 0 {
            self.save_notifications().await;
        }
    }

    pub async fn clear_notifications(&mut self) {
        self.notifications.clear();
        self.save_notifications().await;
        self.toast(NotificationKind::Info, "Notifications cleared");
    }

    async fn save_notifications(&self) {
        if let Err(e) = self.notifications.save(&self.store).await {
            tracing::warn!(error = %e, "Failed to save notifications");
        }
    }

    // ========================================================================
    // Suggestions
    // ========================================================================

    /// Open an empty suggestion form for the active tab.
    pub fn open_suggest_form(&mut self) {
        let category = self.load_error.is_none().then(|| self.current_category());
        self.overlay = Some(Overlay::Suggest(SuggestForm::new(category)));
    }

    /// Validate and record the open form.
    ///
    /// On success the form is replaced by the confirmation panel and the
    /// issue URL is returned. On failure a toast explains why and nothing
    /// is persisted.
    ///
    /// # Errors
    ///
    /// Returns the `SuggestionError` that rejected the form.
    pub async fn submit_suggestion(&mut self, now: DateTime<Utc>) -> Result<String, SuggestionError> {
        let Some(Overlay::Suggest(form)) = &self.overlay else {
            return Err(SuggestionError::MissingField("form"));
        };
        let fields = form.fields.clone();

        let prepared = self.suggestions.prepare(&fields, now).and_then(|s| {
            let url = issue_url(self.prefs.issue_repo(), &s)?;
            Ok((s, String::from(url)))
        });
        let (suggestion, url) = match prepared {
            Ok(p) => p,
            Err(e) => {
                self.toast(NotificationKind::Error, e.to_string());
                return Err(e);
            }
        };

        self.suggestions.record(suggestion.clone());
        if let Err(e) = self.suggestions.save(&self.store).await {
            tracing::warn!(error = %e, "Failed to save suggestions");
        }

        self.overlay = Some(Overlay::Submitted {
            name: suggestion.name.clone(),
            issue_url: url.clone(),
        });
        self.toast(NotificationKind::Success, "Suggestion recorded, opening issue form");
        Ok(url)
    }

    // ========================================================================
    // Toasts
    // ========================================================================

    /// Show an info toast.
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.toast(NotificationKind::Info, msg);
    }

    pub fn toast(&mut self, kind: NotificationKind, msg: impl Into<Cow<'static, str>>) {
        self.toast = Some(Toast {
            kind,
            message: msg.into(),
            shown_at: Instant::now(),
        });
        self.needs_redraw = true;
    }

    /// Clear the toast if it outlived the configured duration.
    /// Returns true if a toast was actually cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        let ttl = self.prefs.toast_duration();
        if self.toast.as_ref().is_some_and(|t| t.shown_at.elapsed() >= ttl) {
            self.toast = None;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use pretty_assertions::assert_eq;
    use std::path::Path;
    use tokio::time;

    const CATALOG: &str = r##"{
        "programas": [
            {"name": "7-Zip", "info": "File archiver", "icon": "fa-file-zipper",
             "badges": ["Gratuito", "Open Source"], "enlace": "https://www.7-zip.org/a/7z.exe"},
            {"name": "VLC Portable", "info": "Media player", "icon": "fa-play",
             "badges": ["Portable"], "enlace": "none"},
            {"name": "Office", "info": "Suite", "icon": "fa-file",
             "badges": ["Premium"], "modal": "office"}
        ],
        "juegos": [
            {"name": "Celeste", "info": "Platformer", "icon": "fa-gamepad",
             "badges": [], "enlace": "https://mega.nz/file/abc"}
        ],
        "modales": {
            "office": {"titulo": "Office", "descripcion": "Pick an edition",
                       "botones": [{"texto": "2021", "enlace": "https://example.com/2021"},
                                   {"texto": "365", "enlace": "https://example.com/365"}]}
        }
    }"##;

    fn write_catalog(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(name);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("catalog.json");
        std::fs::write(&path, content).unwrap();
        path
    }

    async fn test_app(name: &str) -> App {
        let store = LocalStore::open(":memory:").await.unwrap();
        let prefs = PreferenceManager::from_config(&Config::default());
        App::new(store, prefs, write_catalog(name, CATALOG))
    }

    async fn loaded_app(name: &str) -> App {
        let mut app = test_app(name).await;
        app.load_session(None, Utc::now()).await;
        app
    }

    #[tokio::test]
    async fn test_first_session_defaults() {
        let app = loaded_app("foxweb_app_test_defaults").await;
        assert!(app.load_error.is_none());
        assert!(app.first_visit);
        assert_eq!(app.current_category(), Category::Programs);
        assert_eq!(app.visible_cards(), vec![0, 1, 2]);
        assert_eq!(app.notifications.unread_count(), 2);
        // First load stores the fingerprint only, no new-content notice
        assert!(app.toast.is_none());
    }

    #[tokio::test]
    async fn test_second_session_is_not_first_visit() {
        let mut app = loaded_app("foxweb_app_test_second").await;
        app.load_session(None, Utc::now()).await;
        assert!(!app.first_visit);
    }

    #[tokio::test]
    async fn test_missing_catalog_sets_load_error() {
        let store = LocalStore::open(":memory:").await.unwrap();
        let prefs = PreferenceManager::from_config(&Config::default());
        let mut app = App::new(store, prefs, Path::new("/tmp/foxweb_no_such_catalog.json").into());
        app.load_session(None, Utc::now()).await;

        assert!(app.load_error.is_some());
        assert!(app.visible_cards().is_empty());
        assert!(app.selected_id().is_none());
    }

    #[tokio::test]
    async fn test_initial_url_wins_over_persisted_tab() {
        let mut app = test_app("foxweb_app_test_url").await;
        app.load_session(Some("#Juegos"), Utc::now()).await;
        assert_eq!(app.current_category(), Category::Games);
    }

    #[tokio::test]
    async fn test_nav_stays_in_bounds() {
        let mut app = loaded_app("foxweb_app_test_nav").await;
        app.nav_up();
        assert_eq!(app.selected, 0);
        for _ in 0..10 {
            app.nav_down();
        }
        assert_eq!(app.selected, 2);
    }

    #[tokio::test]
    async fn test_tab_switch_reapplies_search_and_persists() {
        let mut app = loaded_app("foxweb_app_test_tab").await;
        app.queue_search("cel".to_string());
        app.commit_search().await;
        assert!(app.visible_cards().is_empty());

        let nav = app.open_tab(Category::Games).await;
        assert_eq!(
            nav,
            Navigation::Switched {
                from: Category::Programs,
                to: Category::Games
            }
        );
        assert_eq!(app.visible_cards(), vec![0]);

        let saved: AppStateSnapshot = app.store.get_json(keys::APP_STATE).await.unwrap().unwrap();
        assert_eq!(saved.current_tab, "juegos");
        assert_eq!(saved.search, "cel");
    }

    #[tokio::test]
    async fn test_same_tab_is_unchanged() {
        let mut app = loaded_app("foxweb_app_test_same_tab").await;
        assert_eq!(app.open_tab(Category::Programs).await, Navigation::Unchanged);
    }

    #[tokio::test]
    async fn test_search_matches_badges() {
        let mut app = loaded_app("foxweb_app_test_badges").await;
        app.queue_search("  OPEN source ".to_string());
        app.commit_search().await;
        assert_eq!(app.search_term, "open source");
        assert_eq!(app.visible_cards(), vec![0]);
    }

    #[tokio::test]
    async fn test_too_long_search_rejected() {
        let mut app = loaded_app("foxweb_app_test_long").await;
        app.queue_search("x".repeat(MAX_SEARCH_QUERY_LENGTH + 1));
        app.commit_search().await;
        assert_eq!(app.search_term, "");
        assert!(matches!(
            app.toast.as_ref().map(|t| t.kind),
            Some(NotificationKind::Warning)
        ));
    }

    #[tokio::test]
    async fn test_clear_search_restores_all_cards() {
        let mut app = loaded_app("foxweb_app_test_clear").await;
        app.queue_search("zzz".to_string());
        app.commit_search().await;
        assert!(app.current_grid().unwrap().no_results());

        app.clear_search().await;
        assert_eq!(app.visible_cards().len(), 3);
        assert!(!app.current_grid().unwrap().no_results());
    }

    #[tokio::test]
    async fn test_search_debounce_elapses() {
        let mut app = loaded_app("foxweb_app_test_debounce").await;
        time::pause();
        app.queue_search("7".to_string());
        assert!(!app.search_due());

        time::advance(Duration::from_millis(200)).await;
        assert!(!app.search_due());
        // A new keystroke restarts the timer
        app.queue_search("7-".to_string());
        time::advance(Duration::from_millis(200)).await;
        assert!(!app.search_due());

        time::advance(Duration::from_millis(150)).await;
        assert!(app.search_due());
    }

    #[tokio::test]
    async fn test_filter_cycle_filters_by_type() {
        let mut app = loaded_app("foxweb_app_test_filter").await;
        assert_eq!(
            app.cycle_filter().await,
            TypeFilter::Only(crate::search::ItemType::Portable)
        );
        assert_eq!(app.visible_cards(), vec![1]);
    }

    #[tokio::test]
    async fn test_toggle_favorite_twice_restores() {
        let mut app = loaded_app("foxweb_app_test_fav").await;
        assert_eq!(app.toggle_favorite().await, Some(true));
        let id = app.selected_id().unwrap();
        assert!(app.favorites.contains(id));
        assert_eq!(Favorites::load(&app.store).await.unwrap().len(), 1);

        assert_eq!(app.toggle_favorite().await, Some(false));
        assert!(Favorites::load(&app.store).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_activate_link_records_recent() {
        let mut app = loaded_app("foxweb_app_test_link").await;
        let url = app.activate_selected().await;
        assert_eq!(url.as_deref(), Some("https://www.7-zip.org/a/7z.exe"));
        assert_eq!(app.recent_items, vec![ItemId::new(Category::Programs, 0)]);
    }

    #[tokio::test]
    async fn test_activate_unavailable_shows_toast() {
        let mut app = loaded_app("foxweb_app_test_unavailable").await;
        app.nav_down();
        assert!(app.activate_selected().await.is_none());
        assert!(app.overlay.is_none());
        assert!(app.recent_items.is_empty());
        assert!(app.toast.is_some());
    }

    #[tokio::test]
    async fn test_activate_modal_opens_overlay() {
        let mut app = loaded_app("foxweb_app_test_modal").await;
        app.selected = 2;
        assert!(app.activate_selected().await.is_none());
        assert_eq!(app.modal_button_url().as_deref(), Some("https://example.com/2021"));

        app.move_modal_selection(true);
        assert_eq!(app.modal_button_url().as_deref(), Some("https://example.com/365"));
        app.move_modal_selection(true);
        assert_eq!(app.modal_button_url().as_deref(), Some("https://example.com/2021"));
        app.move_modal_selection(false);
        assert_eq!(app.modal_button_url().as_deref(), Some("https://example.com/365"));
    }

    #[tokio::test]
    async fn test_recent_items_capped_and_deduplicated() {
        let mut app = loaded_app("foxweb_app_test_recent").await;
        for i in 0..15 {
            app.record_recent(ItemId::new(Category::Games, i)).await;
        }
        app.record_recent(ItemId::new(Category::Games, 14)).await;
        assert_eq!(app.recent_items.len(), MAX_RECENT_ITEMS);
        assert_eq!(app.recent_items[0], ItemId::new(Category::Games, 14));
        assert_eq!(app.recent_items[1], ItemId::new(Category::Games, 13));
    }

    #[tokio::test]
    async fn test_show_notifications_marks_read() {
        let mut app = loaded_app("foxweb_app_test_notif").await;
        app.show_notifications().await;
        assert_eq!(app.notifications.unread_count(), 0);

        let reloaded = Notifications::load(&app.store, Utc::now()).await.unwrap();
        assert_eq!(reloaded.unread_count(), 0);
        assert_eq!(reloaded.len(), 2);
    }

    #[tokio::test]
    async fn test_cycle_theme_persists() {
        let mut app = loaded_app("foxweb_app_test_theme").await;
        assert_eq!(app.cycle_theme().await, ThemeVariant::Light.name());
        assert_eq!(
            app.store.get_item(keys::THEME).await.unwrap().as_deref(),
            Some("light")
        );
        let saved: AppStateSnapshot = app.store.get_json(keys::APP_STATE).await.unwrap().unwrap();
        assert_eq!(saved.theme, "light");
    }

    #[tokio::test]
    async fn test_submit_invalid_suggestion_persists_nothing() {
        let mut app = loaded_app("foxweb_app_test_suggest_bad").await;
        app.open_suggest_form();
        let err = app.submit_suggestion(Utc::now()).await.unwrap_err();
        assert_eq!(err, SuggestionError::MissingField("name"));
        assert!(matches!(app.overlay, Some(Overlay::Suggest(_))));
        assert!(SuggestionLog::load(&app.store).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_valid_suggestion() {
        let mut app = loaded_app("foxweb_app_test_suggest_ok").await;
        app.open_suggest_form();
        if let Some(Overlay::Suggest(form)) = &mut app.overlay {
            form.fields.name = "Krita".to_string();
            form.fields.description = "Painting".to_string();
            form.fields.link = "https://github.com/KDE/krita".to_string();
        }

        let url = app.submit_suggestion(Utc::now()).await.unwrap();
        assert!(url.starts_with(
            "https://github.com/foxorange224/foxorange224.github.io/issues/new?"
        ));
        assert!(url.contains("labels=sugerencia"));
        assert!(matches!(app.overlay, Some(Overlay::Submitted { .. })));
        assert_eq!(SuggestionLog::load(&app.store).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_bad_issue_repo_records_nothing() {
        let store = LocalStore::open(":memory:").await.unwrap();
        let config = Config {
            issue_repo: "not a repo".to_string(),
            ..Config::default()
        };
        let prefs = PreferenceManager::from_config(&config);
        let catalog = write_catalog("foxweb_app_test_suggest_repo", CATALOG);
        let mut app = App::new(store, prefs, catalog);
        app.load_session(None, Utc::now()).await;

        app.open_suggest_form();
        if let Some(Overlay::Suggest(form)) = &mut app.overlay {
            form.fields.name = "Krita".to_string();
            form.fields.description = "Painting".to_string();
            form.fields.link = "https://github.com/KDE/krita".to_string();
        }

        let err = app.submit_suggestion(Utc::now()).await.unwrap_err();
        assert_eq!(err, SuggestionError::InvalidRepo("not a repo".to_string()));
        assert!(app.suggestions.is_empty());
        assert!(app.store.get_item(keys::SUGGESTIONS).await.unwrap().is_none());
        assert!(matches!(app.overlay, Some(Overlay::Suggest(_))));
        assert_eq!(app.toast.as_ref().map(|t| t.kind), Some(NotificationKind::Error));
    }

    #[tokio::test]
    async fn test_loading_flag_cleared_after_load() {
        let app = test_app("foxweb_app_test_loading").await;
        assert!(app.loading);

        let app = loaded_app("foxweb_app_test_loading").await;
        assert!(!app.loading);

        let mut broken = test_app("foxweb_app_test_loading_missing").await;
        broken.catalog_path = PathBuf::from("/nonexistent/foxweb/catalog.json");
        assert!(!broken.reload_catalog(Utc::now()).await);
        assert!(!broken.loading);
        assert!(broken.load_error.is_some());
    }

    #[tokio::test]
    async fn test_connectivity_toasts_only_on_change() {
        let mut app = loaded_app("foxweb_app_test_connectivity").await;
        app.toast = None;

        assert!(!app.set_connectivity(true));
        assert!(app.toast.is_none());

        assert!(app.set_connectivity(false));
        assert!(app.offline);
        assert_eq!(app.toast.as_ref().map(|t| t.kind), Some(NotificationKind::Warning));

        assert!(!app.set_connectivity(false));

        assert!(app.set_connectivity(true));
        assert!(!app.offline);
        let toast = app.toast.as_ref().unwrap();
        assert_eq!(toast.kind, NotificationKind::Success);
        assert_eq!(toast.message, "Connection restored");
    }

    #[test]
    fn test_form_field_cycle() {
        assert_eq!(FormField::Name.next(), FormField::Description);
        assert_eq!(FormField::Email.next(), FormField::Name);
        assert_eq!(FormField::Name.prev(), FormField::Email);
        assert!(FormField::Link.required());
        assert!(!FormField::Website.required());
    }

    #[test]
    fn test_form_category_picker() {
        let mut form = SuggestForm::new(None);
        form.focus = FormField::Category;
        assert!(form.input_mut().is_none());
        form.cycle_category(true);
        assert_eq!(form.fields.category, Some(Category::Programs));
        form.cycle_category(false);
        assert_eq!(form.fields.category, Some(Category::Apks));
        assert_eq!(form.value(FormField::Category), "APKs");
    }

    #[tokio::test]
    async fn test_toast_expires_after_configured_duration() {
        let mut app = test_app("foxweb_app_test_toast").await;
        time::pause();
        app.set_status("Test message");

        time::advance(Duration::from_secs(2)).await;
        assert!(!app.clear_expired_status());
        assert!(app.toast.is_some());

        time::advance(Duration::from_secs(2)).await;
        assert!(app.clear_expired_status());
        assert!(app.toast.is_none());
    }

    #[tokio::test]
    async fn test_snapshot_round_trip() {
        let mut app = loaded_app("foxweb_app_test_snapshot").await;
        app.filter = TypeFilter::Only(crate::search::ItemType::Free);
        app.search_term = "zip".to_string();
        app.recent_items = vec![ItemId::new(Category::Extras, 3)];

        let json = serde_json::to_string(&app.snapshot(Utc::now())).unwrap();
        let restored: AppStateSnapshot = serde_json::from_str(&json).unwrap();

        let mut other = test_app("foxweb_app_test_snapshot_other").await;
        other.restore(restored);
        assert_eq!(other.search_term, "zip");
        assert_eq!(other.filter, app.filter);
        assert_eq!(other.recent_items, app.recent_items);
    }

    #[test]
    fn test_snapshot_forward_compatible() {
        let json = r#"{"current_tab": "peliculas", "recent_items": ["bogus", "juegos_2"], "extra": 1}"#;
        let snapshot: AppStateSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(Category::parse(&snapshot.current_tab), None);
        assert_eq!(snapshot.filter, TypeFilter::All);
        assert_eq!(snapshot.recent_items.len(), 2);
    }
}
