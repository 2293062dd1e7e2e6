//! Notification center overlay.

use crate::app::App;
use crate::notifications::{relative_time, NotificationKind};
use crate::util::sanitize_line;
use chrono::Utc;
use ratatui::{
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem},
    Frame,
};

use super::render::centered;

fn kind_icon(kind: NotificationKind) -> &'static str {
    match kind {
        NotificationKind::Info => "ℹ",
        NotificationKind::Success => "✔",
        NotificationKind::Warning => "⚠",
        NotificationKind::Error => "✖",
    }
}

/// Render the notification list, newest first, starting at `scroll`.
pub fn render(f: &mut Frame, app: &App, scroll: usize) {
    let overlay = centered(f.area(), 72, 24);
    if overlay.width < 24 || overlay.height < 6 {
        return;
    }

    let now = Utc::now();
    let items: Vec<ListItem> = if app.notifications.is_empty() {
        vec![ListItem::new(Line::styled("No notifications", app.style("empty_state")))]
    } else {
        app.notifications
            .entries()
            .iter()
            .skip(scroll)
            .map(|n| {
                let title_style = if n.read {
                    app.style("notification_read")
                } else {
                    app.style("notification_unread")
                };
                ListItem::new(vec![
                    Line::from(vec![
                        Span::styled(format!("{} ", kind_icon(n.kind)), title_style),
                        Span::styled(sanitize_line(&n.title).into_owned(), title_style),
                        Span::styled(
                            format!("  {}", relative_time(n.created_at, now)),
                            app.style("notification_time"),
                        ),
                    ]),
                    Line::styled(
                        format!("  {}", sanitize_line(&n.message)),
                        app.style("card_description"),
                    ),
                    Line::from(""),
                ])
            })
            .collect()
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(app.style("panel_border_focused"))
            .title(format!(" Notifications ({}) ", app.notifications.len())),
    );

    f.render_widget(Clear, overlay);
    f.render_widget(list, overlay);
}
