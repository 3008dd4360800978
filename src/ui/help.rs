//! Keybinding help overlay.
//!
//! Lists the live bindings, config overrides included, one section per
//! context. `help_scroll_offset` scrolls the body.

use crate::app::App;
use crate::keybindings::Context;
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::render::centered;

const SECTIONS: [(Context, &str); 4] = [
    (Context::Global, "General"),
    (Context::Catalog, "Catalog"),
    (Context::Content, "Content Tabs"),
    (Context::Search, "Search"),
];

const KEY_COLUMN: usize = 14;

/// Body lines of the overlay: a heading per context, then `key  action`.
fn help_lines(app: &App) -> Vec<Line<'static>> {
    let bindings = app.keybindings.all_bindings();
    let mut lines = Vec::new();

    for (context, heading) in SECTIONS {
        let mut section = bindings
            .iter()
            .filter(|(c, ..)| *c == context)
            .map(|(_, key, _, description)| {
                Line::from(vec![
                    Span::styled(
                        format!("  {:<width$}", key, width = KEY_COLUMN),
                        Style::default().fg(Color::Cyan),
                    ),
                    Span::raw(*description),
                ])
            })
            .peekable();
        if section.peek().is_none() {
            continue;
        }
        if !lines.is_empty() {
            lines.push(Line::default());
        }
        lines.push(Line::from(Span::styled(
            heading,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )));
        lines.extend(section);
    }
    lines
}

/// Render the help overlay on top of the current screen.
pub fn render(f: &mut Frame, app: &App) {
    let area = f.area();
    let overlay = centered(area, 60, area.height.saturating_sub(4));
    if overlay.width < 20 || overlay.height < 6 {
        return;
    }

    let lines = help_lines(app);
    let visible = overlay.height.saturating_sub(2) as usize;
    let max_scroll = lines.len().saturating_sub(visible);
    let scroll = app.help_scroll_offset.min(max_scroll);

    let title = if max_scroll > 0 {
        format!(" Help {}/{} (j/k scroll, Esc close) ", scroll + 1, max_scroll + 1)
    } else {
        " Help (Esc close) ".to_string()
    };

    f.render_widget(Clear, overlay);
    f.render_widget(
        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan))
                    .title(title),
            )
            .scroll((scroll.min(u16::MAX as usize) as u16, 0)),
        overlay,
    );
}
