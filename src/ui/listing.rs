use crate::app::{App, Focus, Listing, Section};
use crate::util::{sanitize_title, truncate_to_width};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use super::render::spinner;

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

fn placeholder<'a>(text: impl Into<Line<'a>>) -> Vec<ListItem<'a>> {
    vec![ListItem::new(text.into().style(Style::default().fg(Color::DarkGray)))]
}

/// Render the main listing panel (batches, subjects, chapters or content).
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Listing;
    // 2 for borders, 2 for the highlight symbol
    let width = area.width.saturating_sub(4) as usize;

    let (items, count): (Vec<ListItem>, Option<usize>) = match &app.listing {
        Section::Hidden => (Vec::new(), None),
        Section::Loading => (placeholder(format!("{} Loading...", spinner(app))), None),
        Section::Unavailable => (placeholder("Could not load this list. Press r to retry."), None),
        Section::Ready(listing) if listing.is_empty() => (placeholder("Nothing here"), Some(0)),
        Section::Ready(Listing::Nodes(nodes)) => (
            nodes
                .iter()
                .map(|node| {
                    let name = sanitize_title(&node.name);
                    ListItem::new(truncate_to_width(&name, width).into_owned())
                })
                .collect(),
            Some(nodes.len()),
        ),
        Section::Ready(Listing::Media(items)) => (
            items
                .iter()
                .map(|item| {
                    let title = sanitize_title(&item.title);
                    let marker = if crate::media::is_external_link(&item.url) {
                        Span::styled("↗ ", Style::default().fg(Color::Yellow))
                    } else {
                        Span::styled("▶ ", Style::default().fg(Color::Green))
                    };
                    ListItem::new(Line::from(vec![
                        marker,
                        Span::raw(truncate_to_width(&title, width.saturating_sub(2)).into_owned()),
                    ]))
                })
                .collect(),
            Some(items.len()),
        ),
    };

    let title = match count {
        Some(n) => format!(" {} ({}) ", app.screen.title(), n),
        None => format!(" {} ", app.screen.title()),
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style(focused))
                .title(title),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if count.is_some_and(|n| n > 0) {
        state.select(Some(app.selected));
    }
    f.render_stateful_widget(list, area, &mut state);
}

/// Render the panel of today's live classes for the current batch.
pub fn render_today(f: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::TodayClasses;
    let width = area.width.saturating_sub(4) as usize;

    let items: Vec<ListItem> = match &app.today_classes {
        Section::Hidden => Vec::new(),
        Section::Loading => placeholder(format!("{} Loading...", spinner(app))),
        Section::Unavailable => placeholder("Unavailable"),
        Section::Ready(items) if items.is_empty() => placeholder("No classes today"),
        Section::Ready(items) => items
            .iter()
            .map(|item| {
                let title = sanitize_title(&item.title);
                ListItem::new(truncate_to_width(&title, width).into_owned())
            })
            .collect(),
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style(focused))
                .title(" Today's Classes "),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if focused {
        state.select(Some(app.today_selected));
    }
    f.render_stateful_widget(list, area, &mut state);
}
