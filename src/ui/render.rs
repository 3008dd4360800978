//! Render functions for the TUI.
//!
//! Lays out the current screen, then draws any overlay on top.

use crate::app::{App, Section};
use crate::nav::{ScreenState, Tab};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap},
    Frame,
};

use super::loop_runner::SPINNER_FRAMES;
use super::{help, listing, status};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 50;
pub(super) const MIN_HEIGHT: u16 = 10;

const SPINNER: [char; SPINNER_FRAMES] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

pub(super) fn spinner(app: &App) -> char {
    SPINNER[app.spinner_frame % SPINNER_FRAMES]
}

/// Main render dispatch function.
pub(super) fn render(f: &mut Frame, app: &App) {
    let area = f.area();

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

    render_screen(f, app, area);

    if let Some(overlay) = &app.resolving {
        render_resolving_overlay(f, app, &overlay.title);
    }

    if let Some(message) = &app.alert {
        render_alert_overlay(f, message);
    }

    if app.show_help {
        help::render(f, app);
    }
}

/// Header row (tab bar or search prompt), body, status bar.
fn render_screen(f: &mut Frame, app: &App, area: Rect) {
    let header_height = match &app.screen {
        ScreenState::Content { .. } => 3,
        ScreenState::Root { filter } if app.search_mode || !filter.is_empty() => 3,
        _ => 0,
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(header_height),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    match &app.screen {
        ScreenState::Content { tab, .. } => render_tab_bar(f, *tab, chunks[0]),
        ScreenState::Root { .. } if header_height > 0 => render_search_prompt(f, app, chunks[0]),
        _ => {}
    }

    if matches!(app.screen, ScreenState::Subjects { .. })
        && !matches!(app.today_classes, Section::Hidden)
    {
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[1]);
        listing::render(f, app, body[0]);
        listing::render_today(f, app, body[1]);
    } else {
        listing::render(f, app, chunks[1]);
    }

    status::render(f, app, chunks[2]);
}

fn render_tab_bar(f: &mut Frame, active: Tab, area: Rect) {
    let titles: Vec<Line> = Tab::ALL
        .iter()
        .enumerate()
        .map(|(i, tab)| Line::from(format!("{} {}", i + 1, tab.label())))
        .collect();

    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL))
        .select(active.index())
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )
        .divider("|");

    f.render_widget(tabs, area);
}

fn render_search_prompt(f: &mut Frame, app: &App, area: Rect) {
    let cursor = if app.search_mode { "_" } else { "" };
    let border = if app.search_mode {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let prompt = Paragraph::new(Line::from(vec![
        Span::styled("/ ", Style::default().fg(Color::Yellow)),
        Span::raw(format!("{}{}", app.search_input, cursor)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(" Filter "),
    );
    f.render_widget(prompt, area);
}

/// Centered box of at most `width` x `height` cells.
pub(super) fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(4));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn render_resolving_overlay(f: &mut Frame, app: &App, title: &str) {
    let overlay = centered(f.area(), 50, 5);
    if overlay.width < 10 || overlay.height < 3 {
        return;
    }
    f.render_widget(Clear, overlay);

    let text = format!(
        "{} Loading video...\n{}",
        spinner(app),
        crate::util::truncate_to_width(
            &crate::util::sanitize_title(title),
            overlay.width.saturating_sub(4) as usize
        )
    );
    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .alignment(Alignment::Center);
    f.render_widget(paragraph, overlay);
}

fn render_alert_overlay(f: &mut Frame, message: &str) {
    let overlay = centered(f.area(), 44, 7);
    if overlay.width < 10 || overlay.height < 5 {
        return;
    }
    f.render_widget(Clear, overlay);

    let paragraph = Paragraph::new(format!("{}\n\n(any key) Dismiss", message))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(" Error "),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, overlay);
}
