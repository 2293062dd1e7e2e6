//! Card page: tab bar, category header, search bar, card list and footer.

use crate::app::App;
use crate::catalog::ItemAction;
use crate::search::TypeFilter;
use crate::util::{sanitize_line, truncate_to_width};
use crate::view::{CardView, Notice, PageView};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame,
};

/// Render the whole card page into `area`.
pub fn render(f: &mut Frame, app: &App, page: &PageView, area: Rect) {
    let footer_height = u16::from(page.footer.is_some());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(footer_height),
        ])
        .split(area);

    render_tabs(f, app, page, chunks[0]);
    render_header(f, app, page, chunks[1]);
    render_search_bar(f, app, page, chunks[2]);

    if let Some(notice) = page.empty_state.as_ref().or(page.no_results.as_ref()) {
        render_notice(f, app, notice, chunks[3]);
    } else {
        render_cards(f, app, page, chunks[3]);
    }

    if let Some(footer) = page.footer {
        f.render_widget(
            Paragraph::new(footer).style(app.style("footer_note")),
            chunks[4],
        );
    }
}

fn render_tabs(f: &mut Frame, app: &App, page: &PageView, area: Rect) {
    let titles: Vec<Line> = page
        .tabs
        .iter()
        .enumerate()
        .map(|(i, tab)| {
            Line::from(vec![
                Span::raw(format!("{} {}", i + 1, tab.label)),
                Span::styled(format!(" ({})", tab.count), app.style("tab_count")),
            ])
        })
        .collect();
    let selected = page.tabs.iter().position(|t| t.active).unwrap_or(0);

    let mut title = vec![
        Span::raw(" FoxWeb "),
        Span::styled(format!("{} downloads ", page.total), app.style("tab_count")),
    ];
    if let Some(n) = page.unread_badge {
        title.push(Span::styled(format!(" {} new ", n), app.style("unread_badge")));
    }
    let title = Line::from(title);

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.style("tab_inactive"))
        .highlight_style(app.style("tab_active"))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.style("panel_border"))
                .title(title)
                .title_bottom(Line::from(format!(" {} ", page.url)).right_aligned()),
        );
    f.render_widget(tabs, area);
}

fn render_header(f: &mut Frame, app: &App, page: &PageView, area: Rect) {
    let lines = vec![
        Line::styled(page.heading, app.style("heading")),
        Line::styled(page.description, app.style("subheading")),
    ];
    f.render_widget(Paragraph::new(lines), area);
}

fn render_search_bar(f: &mut Frame, app: &App, page: &PageView, area: Rect) {
    let filter = match page.filter {
        TypeFilter::All => Span::raw(""),
        other => Span::styled(format!("  [filter: {}]", other), app.style("search_active")),
    };

    let line = if page.search_mode {
        Line::from(vec![
            Span::styled("Search: ", app.style("search_active")),
            Span::raw(format!("{}_", page.search)),
            filter,
        ])
    } else if !page.search.is_empty() {
        Line::from(vec![
            Span::styled("Search: ", app.style("search_bar")),
            Span::raw(page.search.clone()),
            Span::styled("  (Esc to clear)", app.style("search_bar")),
            filter,
        ])
    } else {
        Line::from(vec![
            Span::styled("/ to search, f to filter by type", app.style("search_bar")),
            filter,
        ])
    };
    f.render_widget(Paragraph::new(line), area);
}

fn render_notice(f: &mut Frame, app: &App, notice: &Notice, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::styled(notice.title.clone(), app.style("empty_state").add_modifier(Modifier::BOLD)),
        Line::styled(notice.hint.clone(), app.style("empty_state")),
    ];
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.style("panel_border")),
        );
    f.render_widget(paragraph, area);
}

fn render_cards(f: &mut Frame, app: &App, page: &PageView, area: Rect) {
    let width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = page.cards.iter().map(|card| card_item(app, card, width)).collect();

    let list = List::new(items)
        .highlight_style(app.style("card_selected"))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.style("panel_border_focused"))
                .title(format!(" {} shown ", page.cards.len())),
        );

    let mut state = ListState::default().with_selected(page.cards.iter().position(|c| c.selected));
    f.render_stateful_widget(list, area, &mut state);
}

/// Two lines per card: title with badges, then the description.
fn card_item<'a>(app: &App, card: &'a CardView, width: usize) -> ListItem<'a> {
    let mut title_spans = Vec::new();
    if card.favorite {
        title_spans.push(Span::styled("★ ", app.style("favorite")));
    }

    let title_style = match card.action {
        ItemAction::Unavailable => app.style("card_unavailable"),
        _ => app.style("card_title"),
    };
    title_spans.push(Span::styled(sanitize_line(&card.title).into_owned(), title_style));

    if let Some(badge) = &card.main_badge {
        title_spans.push(Span::raw(" "));
        title_spans.push(Span::styled(format!("[{}]", badge), app.style("badge_main")));
    }
    for badge in &card.extra_badges {
        title_spans.push(Span::raw(" "));
        title_spans.push(Span::styled(format!("[{}]", badge), app.style("badge_extra")));
    }

    let hint = match &card.action {
        ItemAction::Modal(_) => " ⋯",
        ItemAction::Link(_) => "",
        ItemAction::Unavailable => " (unavailable)",
    };
    title_spans.push(Span::styled(hint, app.style("card_unavailable")));

    let description = sanitize_line(&card.description);
    let description = truncate_to_width(&description, width).into_owned();

    ListItem::new(vec![
        Line::from(title_spans),
        Line::styled(format!("  {}", description), app.style("card_description")),
    ])
}
