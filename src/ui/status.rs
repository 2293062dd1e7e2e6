use crate::app::{App, Overlay};
use crate::notifications::NotificationKind;
use ratatui::{layout::Rect, widgets::Paragraph, Frame};
use std::borrow::Cow;

/// Render the status bar: the active toast, or key hints for the current mode.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    // Guard against zero-width/height areas
    if area.width < 1 || area.height < 1 {
        return;
    }

    if let Some(toast) = &app.toast {
        let role = match toast.kind {
            NotificationKind::Info => "toast_info",
            NotificationKind::Success => "toast_success",
            NotificationKind::Warning => "toast_warning",
            NotificationKind::Error => "toast_error",
        };
        f.render_widget(
            Paragraph::new(toast.message.as_ref()).style(app.style(role)),
            area,
        );
        return;
    }

    let role = if app.offline { "toast_warning" } else { "status_bar" };
    f.render_widget(Paragraph::new(status_line(app)).style(app.style(role)), area);
}

/// Key hints for the current mode, flagged when the network is down.
fn status_line(app: &App) -> Cow<'_, str> {
    let hints: Cow<'_, str> = match &app.overlay {
        Some(Overlay::Modal { .. }) => Cow::Borrowed("[j/k]choose [Enter]open [y]copy [Esc]close"),
        Some(Overlay::Notifications { .. }) => Cow::Borrowed("[j/k]scroll [c]lear all [Esc]close"),
        Some(Overlay::Suggest(_)) => Cow::Borrowed("[Tab]next field [Enter]submit [Esc]cancel"),
        Some(Overlay::Help { .. }) => Cow::Borrowed("[j/k]scroll [?/Esc]close"),
        Some(Overlay::Submitted { .. }) | Some(Overlay::RoutePrompt { .. }) => {
            Cow::Borrowed("[Enter]confirm [Esc]close")
        }
        None if app.loading => Cow::Borrowed("Loading catalog..."),
        None if app.load_error.is_some() => Cow::Borrowed("[r]etry [s]uggest [q]uit"),
        None if app.search_mode => Cow::Borrowed("Type to search | ESC clear | ENTER search now"),
        None => Cow::Owned(format!(
            "[1-5]tabs [/]search [f]ilter [s]favorite [y]copy [n]otifications [t]heme: {} [+]suggest [?]help [q]uit",
            app.theme_variant.name()
        )),
    };

    if app.offline {
        Cow::Owned(format!("[offline] {}", hints))
    } else {
        hints
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::preferences::PreferenceManager;
    use crate::storage::LocalStore;
    use std::path::PathBuf;

    async fn test_app() -> App {
        let store = LocalStore::open(":memory:").await.unwrap();
        let prefs = PreferenceManager::from_config(&Config::default());
        App::new(store, prefs, PathBuf::from("/nonexistent/catalog.json"))
    }

    #[tokio::test]
    async fn test_loading_and_offline_flags_in_status_line() {
        let mut app = test_app().await;
        assert_eq!(status_line(&app), "Loading catalog...");

        app.loading = false;
        assert!(status_line(&app).starts_with("[1-5]tabs"));

        app.offline = true;
        assert!(status_line(&app).starts_with("[offline] [1-5]tabs"));
    }
}
