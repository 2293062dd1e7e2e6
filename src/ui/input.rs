//! Input handling for the TUI.
//!
//! Keys are routed to the open overlay first, then to the search bar or
//! the error screen, then to the card grid. Text fields receive plain
//! characters directly so typing never triggers a shortcut.

use crate::app::{App, AppEvent, FormField, Overlay, ISSUE_OPEN_DELAY};
use crate::catalog::Category;
use crate::keybindings::{Action as KbAction, Context as KbContext};
use crate::notifications::NotificationKind;
use crate::router::Navigation;
use crate::util::MAX_SEARCH_QUERY_LENGTH;
use anyhow::Result;
use chrono::Utc;
use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;

use super::helpers::{copy_to_clipboard, open_url, spawn_delayed};
use super::Action;

/// Maximum length of a suggestion form field or route prompt.
const MAX_FIELD_LENGTH: usize = 512;

/// A plain character meant for a text field (no Ctrl/Alt chord).
fn typed_char(code: KeyCode, modifiers: KeyModifiers) -> Option<char> {
    match code {
        KeyCode::Char(c) if !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
            Some(c)
        }
        _ => None,
    }
}

/// Main input dispatch function.
pub(super) async fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    match app.overlay {
        Some(Overlay::Help { .. }) => return Ok(handle_help_input(app, code)),
        Some(Overlay::RoutePrompt { .. }) => {
            handle_route_prompt_input(app, code, modifiers).await;
            return Ok(Action::Continue);
        }
        Some(Overlay::Suggest(_)) => {
            handle_suggest_input(app, code, modifiers, event_tx).await;
            return Ok(Action::Continue);
        }
        Some(Overlay::Submitted { .. }) => {
            if matches!(code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
                app.overlay = None;
            }
            return Ok(Action::Continue);
        }
        Some(Overlay::Modal { .. }) => return Ok(handle_modal_input(app, code, modifiers)),
        Some(Overlay::Notifications { .. }) => {
            return Ok(handle_notifications_input(app, code, modifiers).await)
        }
        None => {}
    }

    if app.search_mode {
        return Ok(handle_search_input(app, code, modifiers).await);
    }

    if app.load_error.is_some() {
        return Ok(handle_error_screen_input(app, code, modifiers).await);
    }

    handle_browse_input(app, code, modifiers).await
}

/// Handle input while the help overlay is visible.
fn handle_help_input(app: &mut App, code: KeyCode) -> Action {
    let Some(Overlay::Help { scroll }) = &mut app.overlay else {
        return Action::Continue;
    };
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => app.overlay = None,
        KeyCode::Char('j') | KeyCode::Down => *scroll = scroll.saturating_add(1),
        KeyCode::Char('k') | KeyCode::Up => *scroll = scroll.saturating_sub(1),
        _ => {}
    }
    Action::Continue
}

/// Handle input on the card grid.
async fn handle_browse_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
) -> Result<Action> {
    match app.keybindings.action_for_key(code, modifiers, KbContext::Global) {
        Some(KbAction::Quit) => return Ok(Action::Quit),
        Some(KbAction::NavDown) => app.nav_down(),
        Some(KbAction::NavUp) => app.nav_up(),
        Some(KbAction::NextTab) => {
            let nav = app.next_tab().await;
            report_navigation(app, nav);
        }
        Some(KbAction::PrevTab) => {
            let nav = app.prev_tab().await;
            report_navigation(app, nav);
        }
        Some(KbAction::GoToTab(i)) => {
            if let Some(&category) = Category::ALL.get(i) {
                let nav = app.open_tab(category).await;
                report_navigation(app, nav);
            }
        }
        Some(KbAction::Back) => {
            if !app.search_term.is_empty() {
                app.clear_search().await;
            }
        }
        Some(KbAction::Select) => {
            if let Some(url) = app.activate_selected().await {
                open_url(app, &url);
            }
        }
        Some(KbAction::ToggleFavorite) => {
            app.toggle_favorite().await;
        }
        Some(KbAction::CopyLink) => copy_selected_link(app),
        Some(KbAction::EnterSearch) => {
            app.search_mode = true;
            app.search_input = app.search_term.clone();
        }
        Some(KbAction::CycleFilter) => {
            let filter = app.cycle_filter().await;
            app.set_status(format!("Filter: {}", filter));
        }
        Some(KbAction::CycleTheme) => {
            let name = app.cycle_theme().await;
            app.set_status(format!("Theme: {}", name));
        }
        Some(KbAction::ShowNotifications) => app.show_notifications().await,
        Some(KbAction::Suggest) => app.open_suggest_form(),
        Some(KbAction::GoToRoute) => {
            app.overlay = Some(Overlay::RoutePrompt {
                input: String::new(),
            });
        }
        Some(KbAction::ShowHelp) => app.overlay = Some(Overlay::Help { scroll: 0 }),
        _ => {}
    }
    Ok(Action::Continue)
}

fn report_navigation(app: &mut App, nav: Navigation) {
    if let Navigation::Switched { to, .. } = nav {
        tracing::debug!(tab = %to, url = %app.router.url(), "Tab opened");
    }
}

fn copy_selected_link(app: &mut App) {
    let Some(link) = app.selected_item().and_then(|i| i.copyable_link()).map(String::from) else {
        app.toast(NotificationKind::Warning, "No direct link to copy");
        return;
    };
    match copy_to_clipboard(&link) {
        Ok(()) => app.toast(NotificationKind::Success, "Link copied to clipboard"),
        Err(e) => {
            tracing::warn!(error = %e, "Clipboard copy failed");
            app.toast(NotificationKind::Error, "Could not copy the link");
        }
    }
}

/// Handle input in the search bar. Every edit restarts the debounce timer.
async fn handle_search_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Action {
    if let Some(c) = typed_char(code, modifiers) {
        if app.search_input.chars().count() >= MAX_SEARCH_QUERY_LENGTH {
            app.toast(
                NotificationKind::Warning,
                format!("Search term at max length ({} chars)", MAX_SEARCH_QUERY_LENGTH),
            );
            return Action::Continue;
        }
        let mut input = app.search_input.clone();
        input.push(c);
        app.queue_search(input);
        return Action::Continue;
    }

    if code == KeyCode::Backspace {
        let mut input = app.search_input.clone();
        input.pop();
        app.queue_search(input);
        return Action::Continue;
    }

    match app.keybindings.action_for_key(code, modifiers, KbContext::Search) {
        Some(KbAction::ExitSearch) => app.clear_search().await,
        Some(KbAction::CommitSearch) => {
            // Explicit run wins over the pending debounce
            app.commit_search().await;
            app.search_mode = false;
        }
        Some(KbAction::Quit) => return Action::Quit,
        _ => {}
    }
    Action::Continue
}

/// Handle input on the full-screen catalog error.
async fn handle_error_screen_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
) -> Action {
    match app.keybindings.action_for_key(code, modifiers, KbContext::ErrorScreen) {
        Some(KbAction::Quit) => return Action::Quit,
        Some(KbAction::Retry) => {
            if app.reload_catalog(Utc::now()).await {
                app.toast(NotificationKind::Success, "Catalog reloaded");
            } else {
                app.toast(NotificationKind::Error, "Catalog still unavailable");
            }
        }
        Some(KbAction::Suggest) => app.open_suggest_form(),
        Some(KbAction::ShowHelp) => app.overlay = Some(Overlay::Help { scroll: 0 }),
        _ => {}
    }
    Action::Continue
}

/// Handle input in the download dialog.
fn handle_modal_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Action {
    match app.keybindings.action_for_key(code, modifiers, KbContext::Modal) {
        Some(KbAction::Back) => app.overlay = None,
        Some(KbAction::NavDown) | Some(KbAction::NextTab) => app.move_modal_selection(true),
        Some(KbAction::NavUp) | Some(KbAction::PrevTab) => app.move_modal_selection(false),
        Some(KbAction::Select) => {
            if let Some(url) = app.modal_button_url() {
                open_url(app, &url);
            }
        }
        Some(KbAction::CopyLink) => {
            if let Some(url) = app.modal_button_url() {
                match copy_to_clipboard(&url) {
                    Ok(()) => app.toast(NotificationKind::Success, "Link copied to clipboard"),
                    Err(e) => {
                        tracing::warn!(error = %e, "Clipboard copy failed");
                        app.toast(NotificationKind::Error, "Could not copy the link");
                    }
                }
            }
        }
        Some(KbAction::Quit) => return Action::Quit,
        _ => {}
    }
    Action::Continue
}

/// Handle input in the notification center.
async fn handle_notifications_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
) -> Action {
    match app.keybindings.action_for_key(code, modifiers, KbContext::Notifications) {
        Some(KbAction::Back) => app.overlay = None,
        Some(KbAction::ClearNotifications) => app.clear_notifications().await,
        Some(KbAction::NavDown) => {
            let len = app.notifications.len();
            if let Some(Overlay::Notifications { scroll }) = &mut app.overlay {
                if *scroll + 1 < len {
                    *scroll += 1;
                }
            }
        }
        Some(KbAction::NavUp) => {
            if let Some(Overlay::Notifications { scroll }) = &mut app.overlay {
                *scroll = scroll.saturating_sub(1);
            }
        }
        Some(KbAction::Quit) => return Action::Quit,
        _ => {}
    }
    Action::Continue
}

/// Handle input in the suggestion form.
async fn handle_suggest_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    let Some(Overlay::Suggest(form)) = &mut app.overlay else {
        return;
    };

    if form.focus == FormField::Category {
        match code {
            KeyCode::Left | KeyCode::Char('h') => {
                form.cycle_category(false);
                return;
            }
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => {
                form.cycle_category(true);
                return;
            }
            _ => {}
        }
    } else if let Some(c) = typed_char(code, modifiers) {
        if let Some(buffer) = form.input_mut() {
            if buffer.chars().count() < MAX_FIELD_LENGTH {
                buffer.push(c);
            }
        }
        return;
    } else if code == KeyCode::Backspace {
        if let Some(buffer) = form.input_mut() {
            buffer.pop();
        }
        return;
    }

    match app.keybindings.action_for_key(code, modifiers, KbContext::SuggestForm) {
        Some(KbAction::Back) => app.overlay = None,
        Some(KbAction::NextField) => {
            if let Some(Overlay::Suggest(form)) = &mut app.overlay {
                form.focus = form.focus.next();
            }
        }
        Some(KbAction::PrevField) => {
            if let Some(Overlay::Suggest(form)) = &mut app.overlay {
                form.focus = form.focus.prev();
            }
        }
        Some(KbAction::Select) => {
            if let Ok(url) = app.submit_suggestion(Utc::now()).await {
                spawn_delayed("open_issue", ISSUE_OPEN_DELAY, AppEvent::OpenIssue { url }, event_tx);
            }
        }
        _ => {}
    }
}

/// Handle input in the "go to route" prompt.
async fn handle_route_prompt_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    let Some(Overlay::RoutePrompt { input }) = &mut app.overlay else {
        return;
    };

    if let Some(c) = typed_char(code, modifiers) {
        if input.chars().count() < MAX_FIELD_LENGTH {
            input.push(c);
        }
        return;
    }

    match code {
        KeyCode::Backspace => {
            input.pop();
        }
        KeyCode::Esc => app.overlay = None,
        KeyCode::Enter => {
            let url = input.trim().to_string();
            app.overlay = None;
            match app.handle_url_change(&url).await {
                Navigation::Switched { to, .. } => app.set_status(format!("Opened {}", to)),
                Navigation::Unchanged => {}
                Navigation::Locked => app.set_status("Navigation in progress, try again"),
                Navigation::Invalid => app.toast(
                    NotificationKind::Warning,
                    format!("\"{}\" does not name a tab", url),
                ),
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::preferences::PreferenceManager;
    use crate::storage::LocalStore;
    use pretty_assertions::assert_eq;

    const CATALOG: &str = r#"{
        "programas": [{"name": "Blender", "info": "3D suite", "badges": ["Free"], "enlace": "none"}],
        "juegos": [{"name": "Quake", "info": "Shooter", "badges": [], "enlace": "none"}]
    }"#;

    async fn input_app(name: &str) -> App {
        let dir = std::env::temp_dir().join(name);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("catalog.json");
        std::fs::write(&path, CATALOG).unwrap();

        let store = LocalStore::open(":memory:").await.unwrap();
        let mut app = App::new(store, PreferenceManager::from_config(&Config::default()), path);
        app.load_session(None, Utc::now()).await;
        app
    }

    async fn press(app: &mut App, code: KeyCode) -> Action {
        let (tx, _rx) = mpsc::channel(4);
        handle_input(app, code, KeyModifiers::NONE, &tx).await.unwrap()
    }

    #[tokio::test]
    async fn test_typing_in_search_does_not_trigger_shortcuts() {
        let mut app = input_app("foxweb_input_test_search").await;
        press(&mut app, KeyCode::Char('/')).await;
        assert!(app.search_mode);

        // 'q', 't' and 'n' are global shortcuts outside the search bar
        for c in ['q', 't', 'n'] {
            assert!(matches!(press(&mut app, KeyCode::Char(c)).await, Action::Continue));
        }
        assert_eq!(app.search_input, "qtn");
        assert!(app.overlay.is_none());
        assert_eq!(app.pending_search.as_deref(), Some("qtn"));
    }

    #[tokio::test]
    async fn test_enter_commits_search_immediately() {
        let mut app = input_app("foxweb_input_test_commit").await;
        press(&mut app, KeyCode::Char('/')).await;
        for c in "BLEND".chars() {
            press(&mut app, KeyCode::Char(c)).await;
        }
        press(&mut app, KeyCode::Enter).await;

        assert!(!app.search_mode);
        assert!(app.search_debounce.is_none());
        assert_eq!(app.search_term, "blend");
        assert_eq!(app.visible_cards(), vec![0]);
    }

    #[tokio::test]
    async fn test_digit_jumps_to_tab() {
        let mut app = input_app("foxweb_input_test_digit").await;
        press(&mut app, KeyCode::Char('3')).await;
        assert_eq!(app.current_category(), Category::Games);
    }

    #[tokio::test]
    async fn test_quit_key() {
        let mut app = input_app("foxweb_input_test_quit").await;
        assert!(matches!(press(&mut app, KeyCode::Char('q')).await, Action::Quit));
    }

    #[tokio::test]
    async fn test_suggest_form_typing_and_field_cycle() {
        let mut app = input_app("foxweb_input_test_form").await;
        press(&mut app, KeyCode::Char('+')).await;
        for c in "qt".chars() {
            press(&mut app, KeyCode::Char(c)).await;
        }
        press(&mut app, KeyCode::Tab).await;
        press(&mut app, KeyCode::Char('x')).await;
        press(&mut app, KeyCode::Tab).await;
        press(&mut app, KeyCode::Right).await;

        let Some(Overlay::Suggest(form)) = &app.overlay else {
            panic!("form should stay open");
        };
        assert_eq!(form.fields.name, "qt");
        assert_eq!(form.fields.description, "x");
        assert_eq!(form.focus, FormField::Category);
        assert_eq!(form.fields.category, Some(Category::Systems));
    }

    #[tokio::test]
    async fn test_invalid_form_submit_keeps_form_open() {
        let mut app = input_app("foxweb_input_test_form_invalid").await;
        press(&mut app, KeyCode::Char('+')).await;
        press(&mut app, KeyCode::Enter).await;
        assert!(matches!(app.overlay, Some(Overlay::Suggest(_))));
        assert!(matches!(
            app.toast.as_ref().map(|t| t.kind),
            Some(NotificationKind::Error)
        ));
    }

    #[tokio::test]
    async fn test_route_prompt_navigates() {
        let mut app = input_app("foxweb_input_test_route").await;
        press(&mut app, KeyCode::Char('g')).await;
        for c in "/juegos".chars() {
            press(&mut app, KeyCode::Char(c)).await;
        }
        press(&mut app, KeyCode::Enter).await;
        assert!(app.overlay.is_none());
        assert_eq!(app.current_category(), Category::Games);
    }

    #[tokio::test]
    async fn test_notifications_panel_open_and_close() {
        let mut app = input_app("foxweb_input_test_notifications").await;
        press(&mut app, KeyCode::Char('n')).await;
        assert!(matches!(app.overlay, Some(Overlay::Notifications { .. })));
        assert_eq!(app.notifications.unread_count(), 0);
        press(&mut app, KeyCode::Char('n')).await;
        assert!(app.overlay.is_none());
    }
}
