use crate::app::App;
use crate::nav::ScreenState;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};
use std::borrow::Cow;

/// Breadcrumb of the navigation path, oldest screen first.
fn breadcrumb(app: &App) -> String {
    app.stack
        .iter()
        .chain(std::iter::once(&app.screen))
        .map(ScreenState::crumb)
        .collect::<Vec<_>>()
        .join(" > ")
}

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(msg.as_ref())
    } else if let (true, Some(url)) = (app.print_player_url, &app.last_player_url) {
        Cow::Owned(format!("Player: {}", url))
    } else if app.search_mode {
        Cow::Borrowed("Type to filter | ESC cancel | ENTER confirm")
    } else {
        match app.screen {
            ScreenState::Content { .. } => {
                Cow::Borrowed("[1-4/h/l]tab [Enter]play [Esc]back [r]eload [?]help [q]uit")
            }
            ScreenState::Subjects { .. } => {
                Cow::Borrowed("[Enter]open [Tab]today [Esc]back [r]eload [?]help [q]uit")
            }
            ScreenState::Root { .. } => {
                Cow::Borrowed("[Enter]open [/]search [r]eload [?]help [q]uit")
            }
            ScreenState::Chapters { .. } => {
                Cow::Borrowed("[Enter]open [Esc]back [r]eload [?]help [q]uit")
            }
        }
    };

    let style = Style::default().bg(Color::DarkGray).fg(Color::White);

    let crumb = breadcrumb(app);
    let crumb_width = (crate::util::display_width(&crumb) as u16 + 2).min(area.width / 3);
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(crumb_width)])
        .split(area);

    f.render_widget(Paragraph::new(text).style(style), chunks[0]);
    let crumb = crate::util::truncate_to_width(&crumb, crumb_width.saturating_sub(1) as usize);
    f.render_widget(
        Paragraph::new(crumb.into_owned())
            .style(style.fg(Color::Cyan))
            .alignment(ratatui::layout::Alignment::Right),
        chunks[1],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{CatalogClient, ClientOptions};

    fn test_app() -> App {
        let client = CatalogClient::new("http://127.0.0.1:9", ClientOptions::default()).unwrap();
        App::new(client, "https://player.test/p.html")
    }

    #[tokio::test]
    async fn test_breadcrumb_follows_stack() {
        let mut app = test_app();
        app.stack.push(ScreenState::root());
        app.screen = ScreenState::Subjects {
            batch_url: "/b?batchId=x".to_string(),
            title: "Arjuna".to_string(),
        };
        assert_eq!(breadcrumb(&app), "Batches > Arjuna");
    }
}
