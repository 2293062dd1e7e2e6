//! Tab routing: URL parsing, the active tab and the navigation lock.
//!
//! The active tab is mirrored into a page URL (`#Juegos` in hash mode,
//! `/juegos` in path mode) so a session can be started on, or moved to, a
//! tab by URL. Programmatic navigation takes a short lock during which
//! further navigation and external URL changes are ignored.
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;

use crate::catalog::Category;

/// Base address the tab routes are written against.
pub const BASE_URL: &str = "https://foxorange224.github.io/";

/// How long the navigation lock is held after a tab switch.
pub const LOCK_DURATION: Duration = Duration::from_millis(100);

/// How the active tab is written into the URL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteMode {
    #[default]
    Hash,
    Path,
}

// ============================================================================
// Route Parsing
// ============================================================================

/// Category named by the hash fragment, if any.
fn from_hash(url: &str) -> Option<Category> {
    let (_, fragment) = url.split_once('#')?;
    Category::parse(fragment.trim_matches('/'))
}

/// Category named by the last path segment, if any.
fn from_path(url: &str) -> Option<Category> {
    let without_fragment = url.split('#').next().unwrap_or("");
    let without_query = without_fragment.split('?').next().unwrap_or("");
    let path = match url::Url::parse(without_query) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => without_query.to_string(),
    };
    let segment = path.rsplit('/').find(|s| !s.is_empty())?;
    Category::parse(segment)
}

/// Parse a route from a full URL, a `#Fragment` or a `/path`.
///
/// The hash fragment wins over the path.
pub fn parse_route(url: &str) -> Option<Category> {
    from_hash(url).or_else(|| from_path(url))
}

/// Pick the tab to start on: the URL first, then the persisted tab,
/// then Programs.
pub fn resolve_initial(url: Option<&str>, persisted: Option<Category>) -> Category {
    url.and_then(parse_route)
        .or(persisted)
        .unwrap_or(Category::Programs)
}

/// Build the URL for a category in the given mode.
pub fn route_url(category: Category, mode: RouteMode) -> String {
    match mode {
        RouteMode::Hash => format!("{}#{}", BASE_URL, category.tab_id()),
        RouteMode::Path => format!("{}{}", BASE_URL, category.key()),
    }
}

// ============================================================================
// Router
// ============================================================================

/// Outcome of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Already on the requested tab.
    Unchanged,
    /// A previous navigation still holds the lock.
    Locked,
    /// The requested route is not a known tab.
    Invalid,
    Switched { from: Category, to: Category },
}

#[derive(Debug, Clone)]
pub struct Router {
    current: Category,
    mode: RouteMode,
    url: String,
    locked_until: Option<Instant>,
}

impl Router {
    pub fn new(initial: Category, mode: RouteMode) -> Self {
        Self {
            current: initial,
            mode,
            url: route_url(initial, mode),
            locked_until: None,
        }
    }

    pub fn current(&self) -> Category {
        self.current
    }

    /// The URL mirroring the active tab.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_locked(&self) -> bool {
        self.locked_until
            .is_some_and(|until| Instant::now() < until)
    }

    /// Switch to `to`, rewrite the URL and take the navigation lock.
    pub fn open_tab(&mut self, to: Category) -> Navigation {
        if to == self.current {
            return Navigation::Unchanged;
        }
        if self.is_locked() {
            tracing::debug!(to = %to, "Navigation ignored while locked");
            return Navigation::Locked;
        }

        let from = self.current;
        self.current = to;
        self.url = route_url(to, self.mode);
        self.locked_until = Some(Instant::now() + LOCK_DURATION);
        tracing::debug!(from = %from, to = %to, url = %self.url, "Switched tab");

        Navigation::Switched { from, to }
    }

    /// React to a URL change coming from outside the app.
    pub fn handle_url_change(&mut self, url: &str) -> Navigation {
        if self.is_locked() {
            tracing::debug!(url = %url, "URL change ignored while locked");
            return Navigation::Locked;
        }
        match parse_route(url) {
            Some(category) => self.open_tab(category),
            None => {
                tracing::debug!(url = %url, "URL does not name a tab");
                Navigation::Invalid
            }
        }
    }
}
