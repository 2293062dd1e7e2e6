//! Full-screen state shown when the catalog cannot be loaded.

use crate::app::App;
use crate::util::sanitize_line;
use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::Line,
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub fn render(f: &mut Frame, app: &App, error: &str, area: Rect) {
    let style = app.style("error_screen");
    let lines = vec![
        Line::from(""),
        Line::styled("Error loading content", style.add_modifier(Modifier::BOLD)),
        Line::from(""),
        Line::styled(sanitize_line(error).into_owned(), style),
        Line::from(""),
        Line::from(format!("Catalog file: {}", app.catalog_path.display())),
        Line::from(""),
        Line::styled("(r) Retry   (s) Report the problem   (q) Quit", app.style("subheading")),
    ];

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(style)
                .title(" FoxWeb "),
        );
    f.render_widget(paragraph, area);
}
