//! Render functions for the TUI.
//!
//! Draws the error screen or the card page, then the open overlay on top.

use crate::app::{App, FormField, Overlay, SuggestForm};
use crate::util::sanitize_line;
use crate::view::build_page;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::{error_screen, help, notifications, page, status};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 60;
pub(super) const MIN_HEIGHT: u16 = 16;

/// Main render dispatch function.
pub(super) fn render(f: &mut Frame, app: &App) {
    let area = f.area();

    // Guard against zero-width/height to prevent panics
    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    match &app.load_error {
        Some(error) => error_screen::render(f, app, error, chunks[0]),
        None => page::render(f, app, &build_page(app), chunks[0]),
    }
    status::render(f, app, chunks[1]);

    match &app.overlay {
        Some(Overlay::Help { scroll }) => help::render(f, app, *scroll),
        Some(Overlay::Notifications { scroll }) => notifications::render(f, app, *scroll),
        Some(Overlay::Modal { .. }) => render_modal_overlay(f, app),
        Some(Overlay::Suggest(form)) => render_suggest_overlay(f, app, form),
        Some(Overlay::Submitted { name, issue_url }) => {
            render_submitted_overlay(f, app, name, issue_url)
        }
        Some(Overlay::RoutePrompt { input }) => render_route_prompt(f, app, input),
        None => {}
    }
}

/// Centered rectangle at most `width` x `height`, inside a 2-cell margin.
pub(super) fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(4));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn overlay_block<'a>(app: &App, title: &'a str) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(app.style("panel_border_focused"))
        .title(title)
}

/// Render the download dialog of a modal item.
fn render_modal_overlay(f: &mut Frame, app: &App) {
    let Some((modal, selected)) = app.open_modal() else {
        return;
    };
    let overlay = centered(f.area(), 64, 14 + modal.buttons.len() as u16);
    if overlay.width < 20 || overlay.height < 6 {
        return;
    }

    let mut lines = vec![
        Line::styled(sanitize_line(&modal.title).into_owned(), app.style("modal_title")),
        Line::from(""),
    ];
    if !modal.description.is_empty() {
        lines.push(Line::from(sanitize_line(&modal.description).into_owned()));
        lines.push(Line::from(""));
    }

    if modal.buttons.is_empty() {
        lines.push(Line::styled("No downloads listed", app.style("card_unavailable")));
    }
    for (i, button) in modal.buttons.iter().enumerate() {
        let (marker, style) = if i == selected {
            ("▶ ", app.style("modal_button_selected"))
        } else {
            ("  ", app.style("modal_button"))
        };
        lines.push(Line::from(vec![
            Span::raw(marker),
            Span::styled(sanitize_line(&button.label).into_owned(), style),
        ]));
    }

    if let Some(note) = &modal.note {
        lines.push(Line::from(""));
        lines.push(Line::styled(sanitize_line(note).into_owned(), app.style("footer_note")));
    }
    lines.push(Line::from(""));
    lines.push(Line::styled(
        "(Enter) Open  (y) Copy link  (Esc) Close",
        app.style("subheading"),
    ));

    f.render_widget(Clear, overlay);
    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(overlay_block(app, " Download ")),
        overlay,
    );
}

/// Render the suggestion form.
fn render_suggest_overlay(f: &mut Frame, app: &App, form: &SuggestForm) {
    let overlay = centered(f.area(), 70, 18);
    if overlay.width < 30 || overlay.height < 10 {
        return;
    }

    let value_width = overlay.width.saturating_sub(20) as usize;
    let mut lines = vec![
        Line::from("Suggest a program, game or system for the catalog."),
        Line::from(""),
    ];
    for field in FormField::ORDER {
        let focused = field == form.focus;
        let label = format!(
            "{:>14}{} ",
            field.label(),
            if field.required() { "*" } else { " " }
        );
        let value = form.value(field);
        let shown = match (field, focused) {
            (FormField::Category, true) => format!("◀ {} ▶", if value.is_empty() { "choose" } else { value }),
            (_, true) => format!("{}_", tail_to_width(value, value_width)),
            _ => tail_to_width(value, value_width).to_string(),
        };
        let value_style = if focused {
            app.style("form_field_focused")
        } else {
            app.style("card_description")
        };
        lines.push(Line::from(vec![
            Span::styled(label, app.style("form_label")),
            Span::styled(shown, value_style),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::styled(
        "(Tab) Next field  (Enter) Submit  (Esc) Cancel",
        app.style("subheading"),
    ));

    f.render_widget(Clear, overlay);
    f.render_widget(
        Paragraph::new(lines).block(overlay_block(app, " Suggest a download ")),
        overlay,
    );
}

/// End of `s` that fits in `width` columns, so the cursor stays visible.
fn tail_to_width(s: &str, width: usize) -> &str {
    let mut start = s.len();
    let mut used = 0;
    for (i, c) in s.char_indices().rev() {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        start = i;
    }
    &s[start..]
}

/// Render the confirmation shown after a suggestion was recorded.
fn render_submitted_overlay(f: &mut Frame, app: &App, name: &str, issue_url: &str) {
    let overlay = centered(f.area(), 64, 10);
    if overlay.width < 20 || overlay.height < 6 {
        return;
    }

    let lines = vec![
        Line::styled("Thanks for your suggestion!", app.style("modal_title")),
        Line::from(""),
        Line::from(format!("\"{}\" was saved.", sanitize_line(name))),
        Line::from("The issue form opens in your browser to send it:"),
        Line::styled(issue_url.to_string(), app.style("footer_note")),
        Line::from(""),
        Line::styled("(Enter/Esc) Close", app.style("subheading")),
    ];

    f.render_widget(Clear, overlay);
    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(overlay_block(app, " Suggestion sent ")),
        overlay,
    );
}

/// Render the "go to route" prompt.
fn render_route_prompt(f: &mut Frame, app: &App, input: &str) {
    let overlay = centered(f.area(), 60, 7);
    if overlay.width < 20 || overlay.height < 5 {
        return;
    }

    let text = format!(
        "URL, #Hash or /path:\n\n> {}_\n\n(Enter) Go  (Esc) Cancel",
        tail_to_width(input, overlay.width.saturating_sub(6) as usize)
    );

    f.render_widget(Clear, overlay);
    f.render_widget(
        Paragraph::new(text).block(overlay_block(app, " Go to route ")),
        overlay,
    );
}
