//! Input handling for the TUI.
//!
//! Overlays capture keys first (alert, help, resolving), then the search
//! prompt, then the context of the current screen.

use crate::app::{App, AppEvent, Effect};
use crate::keybindings::{Action as KbAction, Context as KbContext};
use crate::nav::ScreenState;
use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;

use super::helpers::{run_effect, spawn_load};
use super::Action;

/// Keybinding context for the current screen.
fn screen_context(screen: &ScreenState) -> KbContext {
    match screen {
        ScreenState::Content { .. } => KbContext::Content,
        _ => KbContext::Catalog,
    }
}

/// Main input dispatch function.
pub(super) fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    // Any key dismisses the alert
    if app.alert.is_some() {
        app.alert = None;
        return Action::Continue;
    }

    if app.show_help {
        handle_help_input(app, code);
        return Action::Continue;
    }

    // The resolving overlay is modal: only quitting gets through.
    if app.is_resolving() {
        return match app
            .keybindings
            .action_for_key(code, modifiers, KbContext::Global)
        {
            Some(KbAction::Quit) => Action::Quit,
            _ => Action::Continue,
        };
    }

    if app.search_mode {
        return handle_search_input(app, code, modifiers);
    }

    let context = screen_context(&app.screen);
    let Some(action) = app.keybindings.action_for_key(code, modifiers, context) else {
        return Action::Continue;
    };

    let load = match action {
        KbAction::Quit => return Action::Quit,
        KbAction::NavDown => {
            app.nav_down();
            None
        }
        KbAction::NavUp => {
            app.nav_up();
            None
        }
        KbAction::CycleFocus => {
            app.cycle_focus();
            None
        }
        KbAction::Select => {
            if let Some(effect) = app.select() {
                run_effect(app, effect, event_tx);
            }
            None
        }
        KbAction::Back => app.go_back(),
        KbAction::Reload => app.reload(),
        KbAction::EnterSearch => {
            if !app.enter_search() {
                app.set_status("Search is only available on the batch list");
            }
            None
        }
        KbAction::NextTab => app.next_tab(),
        KbAction::PrevTab => app.prev_tab(),
        KbAction::GotoTab(tab) => app.switch_tab(tab),
        KbAction::ShowHelp => {
            app.show_help = true;
            app.help_scroll_offset = 0;
            None
        }
        KbAction::ExitSearch | KbAction::CommitSearch => None,
    };

    if let Some(request) = load {
        run_effect(app, Effect::Load(request), event_tx);
    }
    Action::Continue
}

/// Handle input while the help overlay is visible.
///
/// Captures all keys: j/k/Up/Down scroll, Esc/q/? dismiss.
fn handle_help_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
            app.show_help = false;
            app.help_scroll_offset = 0;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_sub(1);
        }
        _ => {}
    }
}

/// Handle input in search mode. Printable keys edit the filter and every
/// keystroke re-filters the cached batch list.
fn handle_search_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Action {
    match app
        .keybindings
        .action_for_key(code, modifiers, KbContext::Search)
    {
        Some(KbAction::ExitSearch) => app.cancel_search(),
        Some(KbAction::CommitSearch) => app.commit_search(),
        _ => match code {
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                return Action::Quit;
            }
            KeyCode::Backspace => app.pop_search_char(),
            KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
                app.push_search_char(c);
            }
            _ => {}
        },
    }
    Action::Continue
}

/// Render the first screen and start its fetch.
pub(super) fn start(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    if let Some(request) = app.start() {
        spawn_load(app, request, event_tx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{CatalogClient, CatalogNode, ClientOptions};
    use crate::app::{Listing, LoadOutcome, Section};

    fn test_app() -> App {
        let client = CatalogClient::new("http://127.0.0.1:9", ClientOptions::default()).unwrap();
        let mut app = App::new(client, "https://player.test/p.html");
        let req = app.start().unwrap();
        app.apply_load(
            req.generation,
            LoadOutcome {
                listing: Ok(Listing::Nodes(vec![
                    CatalogNode {
                        name: "Alpha".to_string(),
                        url: "/a?batchId=a".to_string(),
                        image: None,
                    },
                    CatalogNode {
                        name: "Beta".to_string(),
                        url: "/b?batchId=b".to_string(),
                        image: None,
                    },
                ])),
                today_classes: None,
            },
        );
        app
    }

    fn key(app: &mut App, tx: &mpsc::Sender<AppEvent>, code: KeyCode) -> Action {
        handle_input(app, code, KeyModifiers::NONE, tx)
    }

    #[tokio::test]
    async fn test_quit_key() {
        let (tx, _rx) = mpsc::channel(8);
        let mut app = test_app();
        assert!(matches!(key(&mut app, &tx, KeyCode::Char('q')), Action::Quit));
    }

    #[tokio::test]
    async fn test_search_typing_filters_and_q_is_text() {
        let (tx, _rx) = mpsc::channel(8);
        let mut app = test_app();
        key(&mut app, &tx, KeyCode::Char('/'));
        assert!(app.search_mode);

        assert!(matches!(key(&mut app, &tx, KeyCode::Char('b')), Action::Continue));
        assert!(matches!(key(&mut app, &tx, KeyCode::Char('q')), Action::Continue));
        assert_eq!(app.search_input, "bq");
        key(&mut app, &tx, KeyCode::Backspace);
        assert_eq!(app.listing.ready().map(Listing::len), Some(1));

        key(&mut app, &tx, KeyCode::Enter);
        assert!(!app.search_mode);
        assert_eq!(app.current_filter(), "b");
    }

    #[tokio::test]
    async fn test_alert_swallows_next_key() {
        let (tx, _rx) = mpsc::channel(8);
        let mut app = test_app();
        app.alert = Some("Failed to load video.".to_string());
        assert!(matches!(key(&mut app, &tx, KeyCode::Char('q')), Action::Continue));
        assert!(app.alert.is_none());
    }

    #[tokio::test]
    async fn test_resolving_overlay_blocks_navigation() {
        let (tx, _rx) = mpsc::channel(8);
        let mut app = test_app();
        app.resolving = Some(crate::app::ResolvingOverlay {
            title: "Lecture".to_string(),
        });
        key(&mut app, &tx, KeyCode::Char('j'));
        assert_eq!(app.selected, 0);
        key(&mut app, &tx, KeyCode::Enter);
        assert!(app.stack.is_empty());
    }

    #[tokio::test]
    async fn test_help_toggle() {
        let (tx, _rx) = mpsc::channel(8);
        let mut app = test_app();
        key(&mut app, &tx, KeyCode::Char('?'));
        assert!(app.show_help);
        key(&mut app, &tx, KeyCode::Esc);
        assert!(!app.show_help);
    }

    #[tokio::test]
    async fn test_select_spawns_listing_task() {
        let (tx, _rx) = mpsc::channel(8);
        let mut app = test_app();
        key(&mut app, &tx, KeyCode::Enter);
        assert_eq!(app.stack.depth(), 1);
        assert!(app.load_handle.is_some());
        assert_eq!(app.listing, Section::Loading);
    }
}
