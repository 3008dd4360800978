//! Keybinding registry: maps actions to key events with config overrides.
//!
//! Bindings are data, not match arms, so users can remap keys from
//! config.toml and the help overlay can list what is actually bound.
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;

use crate::nav::Tab;

// ============================================================================
// Action Enum
// ============================================================================

/// All user-facing actions that can be triggered by keybindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    NavDown,
    NavUp,
    Select,
    Back,
    Reload,
    CycleFocus,
    EnterSearch,
    ExitSearch,
    CommitSearch,
    NextTab,
    PrevTab,
    /// Jump straight to a content tab.
    GotoTab(Tab),
    ShowHelp,
}

impl Action {
    /// Human-readable description for the help screen.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Quit => "Quit application",
            Self::NavDown => "Navigate down",
            Self::NavUp => "Navigate up",
            Self::Select => "Open / play selected item",
            Self::Back => "Go back one screen",
            Self::Reload => "Reload current screen",
            Self::CycleFocus => "Switch between listing and today's classes",
            Self::EnterSearch => "Filter batches",
            Self::ExitSearch => "Clear filter",
            Self::CommitSearch => "Keep filter",
            Self::NextTab => "Next tab",
            Self::PrevTab => "Previous tab",
            Self::GotoTab(Tab::Lectures) => "Lectures tab",
            Self::GotoTab(Tab::Notes) => "Notes tab",
            Self::GotoTab(Tab::DppNotes) => "DPP Notes tab",
            Self::GotoTab(Tab::DppLecture) => "DPP Lecture tab",
            Self::ShowHelp => "Show help",
        }
    }
}

// ============================================================================
// Context Enum
// ============================================================================

/// Dispatch context that determines which bindings are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Global,
    /// Batch, subject and chapter listings.
    Catalog,
    /// Chapter content with the tab bar.
    Content,
    Search,
}

// ============================================================================
// Key Specification
// ============================================================================

/// A key event: code + modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }
}

/// Parse a key string from config into a KeySpec.
///
/// Supported formats:
/// - Single char: "q", "j", "/"
/// - Named keys: "Enter", "Esc", "Tab", "Up", "Down", "Backspace"
/// - Modifier combos: "Ctrl+c"
/// - Function keys: "F1" through "F12"
fn parse_key_string(s: &str) -> Option<KeySpec> {
    let s = s.trim();

    if let Some(rest) = s.strip_prefix("Ctrl+") {
        let mut chars = rest.trim().chars();
        return match (chars.next(), chars.next()) {
            (Some(c), None) => Some(KeySpec::ctrl(c)),
            _ => None,
        };
    }

    match s.to_lowercase().as_str() {
        "enter" | "return" => return Some(KeySpec::plain(KeyCode::Enter)),
        "esc" | "escape" => return Some(KeySpec::plain(KeyCode::Esc)),
        "tab" => return Some(KeySpec::plain(KeyCode::Tab)),
        "up" => return Some(KeySpec::plain(KeyCode::Up)),
        "down" => return Some(KeySpec::plain(KeyCode::Down)),
        "left" => return Some(KeySpec::plain(KeyCode::Left)),
        "right" => return Some(KeySpec::plain(KeyCode::Right)),
        "backspace" => return Some(KeySpec::plain(KeyCode::Backspace)),
        "space" => return Some(KeySpec::plain(KeyCode::Char(' '))),
        _ => {}
    }

    if let Some(n) = s.strip_prefix(['F', 'f']).and_then(|n| n.parse::<u8>().ok()) {
        if (1..=12).contains(&n) {
            return Some(KeySpec::plain(KeyCode::F(n)));
        }
    }

    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(KeySpec::plain(KeyCode::Char(c))),
        _ => None,
    }
}

/// Format a KeySpec as a human-readable string for the help screen.
fn format_key(key: &KeySpec) -> String {
    let modifier = if key.modifiers.contains(KeyModifiers::CONTROL) {
        "Ctrl+"
    } else {
        ""
    };

    let key_name = match key.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        _ => "?".to_string(),
    };

    format!("{}{}", modifier, key_name)
}

// ============================================================================
// Keybinding Registry
// ============================================================================

/// Registry of keybindings, supporting default bindings and config overrides.
///
/// The same key can map to different actions in different contexts; lookups
/// try the specific context first and fall back to Global.
pub struct KeybindingRegistry {
    lookup: HashMap<(Context, KeySpec), Action>,
    /// All bindings in registration order, for the help screen.
    bindings: Vec<(Context, KeySpec, Action)>,
}

impl KeybindingRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            lookup: HashMap::new(),
            bindings: Vec::new(),
        };
        registry.register_defaults();
        registry
    }

    fn bind(&mut self, context: Context, key: KeySpec, action: Action) {
        self.lookup.insert((context, key), action);
        self.bindings.push((context, key, action));
    }

    fn register_defaults(&mut self) {
        use KeyCode::{Backspace, Char, Down, Enter, Esc, Left, Right, Up};

        // === Global ===
        self.bind(Context::Global, KeySpec::plain(Char('q')), Action::Quit);
        self.bind(Context::Global, KeySpec::ctrl('c'), Action::Quit);
        self.bind(Context::Global, KeySpec::plain(Char('j')), Action::NavDown);
        self.bind(Context::Global, KeySpec::plain(Down), Action::NavDown);
        self.bind(Context::Global, KeySpec::plain(Char('k')), Action::NavUp);
        self.bind(Context::Global, KeySpec::plain(Up), Action::NavUp);
        self.bind(Context::Global, KeySpec::plain(Enter), Action::Select);
        self.bind(Context::Global, KeySpec::plain(Esc), Action::Back);
        self.bind(Context::Global, KeySpec::plain(Backspace), Action::Back);
        self.bind(Context::Global, KeySpec::plain(Char('r')), Action::Reload);
        self.bind(Context::Global, KeySpec::plain(KeyCode::Tab), Action::CycleFocus);
        self.bind(Context::Global, KeySpec::plain(Char('?')), Action::ShowHelp);

        // === Catalog listings ===
        self.bind(
            Context::Catalog,
            KeySpec::plain(Char('/')),
            Action::EnterSearch,
        );

        // === Content tabs ===
        self.bind(Context::Content, KeySpec::plain(Char('l')), Action::NextTab);
        self.bind(Context::Content, KeySpec::plain(Right), Action::NextTab);
        self.bind(Context::Content, KeySpec::plain(Char('h')), Action::PrevTab);
        self.bind(Context::Content, KeySpec::plain(Left), Action::PrevTab);
        for (n, tab) in ('1'..='4').zip(Tab::ALL) {
            self.bind(Context::Content, KeySpec::plain(Char(n)), Action::GotoTab(tab));
        }

        // === Search prompt ===
        self.bind(Context::Search, KeySpec::plain(Esc), Action::ExitSearch);
        self.bind(Context::Search, KeySpec::plain(Enter), Action::CommitSearch);
    }

    /// Apply user overrides from the config keybindings map.
    ///
    /// Keys in the map are action names (e.g., "quit", "nav_down").
    /// Values are key strings (e.g., "q", "Ctrl+d", "F5").
    ///
    /// Returns a list of warnings for unrecognized action names or unparseable keys.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, String>) -> Vec<String> {
        let mut warnings = Vec::new();

        for (action_name, key_str) in overrides {
            let Some(action) = parse_action_name(action_name) else {
                warnings.push(format!("Unknown action '{}', ignoring", action_name));
                continue;
            };

            let Some(key) = parse_key_string(key_str) else {
                warnings.push(format!(
                    "Cannot parse key '{}' for action '{}', ignoring",
                    key_str, action_name
                ));
                continue;
            };

            let mut contexts: Vec<Context> = Vec::new();
            for (ctx, _, a) in &self.bindings {
                if *a == action && !contexts.contains(ctx) {
                    contexts.push(*ctx);
                }
            }

            self.lookup.retain(|_, a| *a != action);
            self.bindings.retain(|(_, _, a)| *a != action);

            for ctx in contexts {
                self.bind(ctx, key, action);
            }

            tracing::info!(action = %action_name, key = %key_str, "Applied keybinding override");
        }

        warnings
    }

    /// Look up the action for a given key in a given context.
    ///
    /// Tries the specific context first, then falls back to Global.
    pub fn action_for_key(
        &self,
        code: KeyCode,
        modifiers: KeyModifiers,
        context: Context,
    ) -> Option<Action> {
        let key = KeySpec::new(code, modifiers);

        if let Some(&action) = self.lookup.get(&(context, key)) {
            return Some(action);
        }

        if context != Context::Global {
            return self.lookup.get(&(Context::Global, key)).copied();
        }

        None
    }

    /// All bindings as (context, key display string, action, description).
    pub fn all_bindings(&self) -> Vec<(Context, String, Action, &'static str)> {
        self.bindings
            .iter()
            .map(|(ctx, key, action)| (*ctx, format_key(key), *action, action.describe()))
            .collect()
    }
}

impl Default for KeybindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse an action name string (from config) into an Action.
fn parse_action_name(name: &str) -> Option<Action> {
    match name.to_lowercase().as_str() {
        "quit" => Some(Action::Quit),
        "nav_down" | "navdown" | "down" => Some(Action::NavDown),
        "nav_up" | "navup" | "up" => Some(Action::NavUp),
        "select" | "enter" | "open" => Some(Action::Select),
        "back" => Some(Action::Back),
        "reload" | "refresh" => Some(Action::Reload),
        "cycle_focus" | "cyclefocus" | "focus" => Some(Action::CycleFocus),
        "enter_search" | "entersearch" | "search" => Some(Action::EnterSearch),
        "exit_search" | "exitsearch" => Some(Action::ExitSearch),
        "commit_search" | "commitsearch" => Some(Action::CommitSearch),
        "next_tab" | "nexttab" => Some(Action::NextTab),
        "prev_tab" | "prevtab" => Some(Action::PrevTab),
        "tab_lectures" | "lectures" => Some(Action::GotoTab(Tab::Lectures)),
        "tab_notes" | "notes" => Some(Action::GotoTab(Tab::Notes)),
        "tab_dpp_notes" | "dpp_notes" => Some(Action::GotoTab(Tab::DppNotes)),
        "tab_dpp_lecture" | "dpp_lecture" => Some(Action::GotoTab(Tab::DppLecture)),
        "show_help" | "showhelp" | "help" => Some(Action::ShowHelp),
        _ => None,
    }
}
