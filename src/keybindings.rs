//! Keybinding registry: maps actions to key events with config overrides.
//!
//! Bindings are data, not match arms, so users can remap them from
//! config.toml. The same key may mean different things in different contexts.
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;

// ============================================================================
// Action Enum
// ============================================================================

/// All user-facing actions that can be triggered by keybindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    NavDown,
    NavUp,
    NextTab,
    PrevTab,
    /// Jump to the tab at this 0-based position.
    GoToTab(usize),
    Back,
    Select,
    ToggleFavorite,
    CopyLink,
    EnterSearch,
    ExitSearch,
    CommitSearch,
    CycleFilter,
    CycleTheme,
    ShowNotifications,
    ClearNotifications,
    Suggest,
    NextField,
    PrevField,
    GoToRoute,
    Retry,
    ShowHelp,
}

impl Action {
    /// Human-readable description for the help screen.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Quit => "Quit application",
            Self::NavDown => "Navigate down",
            Self::NavUp => "Navigate up",
            Self::NextTab => "Next tab",
            Self::PrevTab => "Previous tab",
            Self::GoToTab(_) => "Jump to tab",
            Self::Back => "Close / dismiss",
            Self::Select => "Open download / activate",
            Self::ToggleFavorite => "Toggle favorite",
            Self::CopyLink => "Copy download link",
            Self::EnterSearch => "Search",
            Self::ExitSearch => "Clear search",
            Self::CommitSearch => "Run search now",
            Self::CycleFilter => "Cycle type filter",
            Self::CycleTheme => "Toggle light/dark theme",
            Self::ShowNotifications => "Notifications",
            Self::ClearNotifications => "Clear notifications",
            Self::Suggest => "Suggest a download",
            Self::NextField => "Next field",
            Self::PrevField => "Previous field",
            Self::GoToRoute => "Go to URL / route",
            Self::Retry => "Reload catalog",
            Self::ShowHelp => "Show help",
        }
    }
}

// ============================================================================
// Context Enum
// ============================================================================

/// Dispatch context: determines which bindings are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Global,
    Search,
    Modal,
    Notifications,
    SuggestForm,
    ErrorScreen,
}

impl Context {
    pub fn label(self) -> &'static str {
        match self {
            Self::Global => "Browse",
            Self::Search => "Search",
            Self::Modal => "Download dialog",
            Self::Notifications => "Notifications",
            Self::SuggestForm => "Suggestion form",
            Self::ErrorScreen => "Error screen",
        }
    }
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

    pub const fn ch(c: char) -> Self {
        Self::plain(KeyCode::Char(c))
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }
}

/// Parse a key string from config into a KeySpec.
///
/// Supported formats:
/// - Single char: "q", "j", "/"
/// - Named keys: "Enter", "Esc", "Tab", "Up", "Down", "Left", "Right", "Backspace"
/// - Modifier combos: "Ctrl+k"
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
        "space" => return Some(KeySpec::ch(' ')),
        _ => {}
    }

    if let Some(n) = s.strip_prefix(['F', 'f']).and_then(|n| n.parse::<u8>().ok()) {
        if (1..=12).contains(&n) {
            return Some(KeySpec::plain(KeyCode::F(n)));
        }
    }

    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(KeySpec::ch(c)),
        _ => None,
    }
}

/// Format a KeySpec for the help screen.
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
        KeyCode::BackTab => "Shift+Tab".to_string(),
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
/// Lookup tries the specific context first and falls back to Global.
pub struct KeybindingRegistry {
    lookup: HashMap<(Context, KeySpec), Action>,
    /// All bindings, in registration order, for the help screen
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
        use Context::*;

        // === Browse ===
        self.bind(Global, KeySpec::ch('q'), Action::Quit);
        self.bind(Global, KeySpec::ctrl('c'), Action::Quit);

        self.bind(Global, KeySpec::ch('j'), Action::NavDown);
        self.bind(Global, KeySpec::plain(KeyCode::Down), Action::NavDown);
        self.bind(Global, KeySpec::ch('k'), Action::NavUp);
        self.bind(Global, KeySpec::plain(KeyCode::Up), Action::NavUp);

        // Tabs
        self.bind(Global, KeySpec::ch('l'), Action::NextTab);
        self.bind(Global, KeySpec::plain(KeyCode::Right), Action::NextTab);
        self.bind(Global, KeySpec::plain(KeyCode::Tab), Action::NextTab);
        self.bind(Global, KeySpec::ch('h'), Action::PrevTab);
        self.bind(Global, KeySpec::plain(KeyCode::Left), Action::PrevTab);
        self.bind(Global, KeySpec::plain(KeyCode::BackTab), Action::PrevTab);
        for (i, c) in ['1', '2', '3', '4', '5'].into_iter().enumerate() {
            self.bind(Global, KeySpec::ch(c), Action::GoToTab(i));
            self.bind(Global, KeySpec::ctrl(c), Action::GoToTab(i));
        }

        self.bind(Global, KeySpec::plain(KeyCode::Esc), Action::Back);
        self.bind(Global, KeySpec::plain(KeyCode::Enter), Action::Select);
        self.bind(Global, KeySpec::ch('o'), Action::Select);
        self.bind(Global, KeySpec::ch('s'), Action::ToggleFavorite);
        self.bind(Global, KeySpec::ch('y'), Action::CopyLink);

        self.bind(Global, KeySpec::ch('/'), Action::EnterSearch);
        self.bind(Global, KeySpec::ctrl('k'), Action::EnterSearch);
        self.bind(Global, KeySpec::ch('f'), Action::CycleFilter);
        self.bind(Global, KeySpec::ch('t'), Action::CycleTheme);
        self.bind(Global, KeySpec::ch('n'), Action::ShowNotifications);
        self.bind(Global, KeySpec::ch('+'), Action::Suggest);
        self.bind(Global, KeySpec::ctrl('n'), Action::Suggest);
        self.bind(Global, KeySpec::ch('g'), Action::GoToRoute);
        self.bind(Global, KeySpec::ch('?'), Action::ShowHelp);

        // === Search input ===
        self.bind(Search, KeySpec::plain(KeyCode::Esc), Action::ExitSearch);
        self.bind(Search, KeySpec::plain(KeyCode::Enter), Action::CommitSearch);

        // === Download dialog ===
        self.bind(Modal, KeySpec::plain(KeyCode::Esc), Action::Back);
        self.bind(Modal, KeySpec::ch('q'), Action::Back);
        self.bind(Modal, KeySpec::plain(KeyCode::Enter), Action::Select);
        self.bind(Modal, KeySpec::ch('y'), Action::CopyLink);

        // === Notification center ===
        self.bind(Notifications, KeySpec::plain(KeyCode::Esc), Action::Back);
        self.bind(Notifications, KeySpec::ch('n'), Action::Back);
        self.bind(Notifications, KeySpec::ch('c'), Action::ClearNotifications);

        // === Suggestion form ===
        self.bind(SuggestForm, KeySpec::plain(KeyCode::Esc), Action::Back);
        self.bind(SuggestForm, KeySpec::plain(KeyCode::Tab), Action::NextField);
        self.bind(SuggestForm, KeySpec::plain(KeyCode::Down), Action::NextField);
        self.bind(SuggestForm, KeySpec::plain(KeyCode::BackTab), Action::PrevField);
        self.bind(SuggestForm, KeySpec::plain(KeyCode::Up), Action::PrevField);
        self.bind(SuggestForm, KeySpec::plain(KeyCode::Enter), Action::Select);

        // === Catalog error screen ===
        self.bind(ErrorScreen, KeySpec::ch('r'), Action::Retry);
        self.bind(ErrorScreen, KeySpec::ch('s'), Action::Suggest);
    }

    /// Apply user overrides from config keybindings map.
    ///
    /// Keys in the map are action names (e.g., "quit", "favorite").
    /// Values are key strings (e.g., "q", "Ctrl+k", "F5").
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

            let mut contexts: Vec<Context> = self
                .bindings
                .iter()
                .filter(|(_, _, a)| *a == action)
                .map(|(c, _, _)| *c)
                .collect();
            contexts.dedup();

            self.lookup.retain(|_, a| *a != action);
            self.bindings.retain(|(_, _, a)| *a != action);

            for ctx in contexts {
                self.bind(ctx, key, action);
            }

            tracing::info!(
                action = %action_name,
                key = %key_str,
                "Applied keybinding override"
            );
        }

        warnings
    }

    /// Look up the action for a key in a context, falling back to Global.
    pub fn action_for_key(
        &self,
        code: KeyCode,
        modifiers: KeyModifiers,
        context: Context,
    ) -> Option<Action> {
        // Shifted characters arrive with SHIFT set; the char already carries it
        let modifiers = match code {
            KeyCode::Char(_) | KeyCode::BackTab => modifiers.difference(KeyModifiers::SHIFT),
            _ => modifiers,
        };
        let key = KeySpec::new(code, modifiers);

        if let Some(&action) = self.lookup.get(&(context, key)) {
            return Some(action);
        }

        if context != Context::Global {
            if let Some(&action) = self.lookup.get(&(Context::Global, key)) {
                return Some(action);
            }
        }

        None
    }

    /// Bindings for the help screen as (context, key, description) rows.
    pub fn all_bindings(&self) -> Vec<(Context, String, &'static str)> {
        self.bindings
            .iter()
            .map(|(ctx, key, action)| (*ctx, format_key(key), action.describe()))
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
        "nav_down" | "down" => Some(Action::NavDown),
        "nav_up" | "up" => Some(Action::NavUp),
        "next_tab" => Some(Action::NextTab),
        "prev_tab" => Some(Action::PrevTab),
        "back" => Some(Action::Back),
        "select" | "open" => Some(Action::Select),
        "toggle_favorite" | "favorite" => Some(Action::ToggleFavorite),
        "copy_link" | "copy" => Some(Action::CopyLink),
        "enter_search" | "search" => Some(Action::EnterSearch),
        "exit_search" => Some(Action::ExitSearch),
        "commit_search" => Some(Action::CommitSearch),
        "cycle_filter" | "filter" => Some(Action::CycleFilter),
        "cycle_theme" | "theme" => Some(Action::CycleTheme),
        "show_notifications" | "notifications" => Some(Action::ShowNotifications),
        "clear_notifications" => Some(Action::ClearNotifications),
        "suggest" => Some(Action::Suggest),
        "go_to_route" | "goto" => Some(Action::GoToRoute),
        "retry" => Some(Action::Retry),
        "show_help" | "help" => Some(Action::ShowHelp),
        other => other
            .strip_prefix("tab_")
            .and_then(|n| n.parse::<usize>().ok())
            .filter(|n| (1..=5).contains(n))
            .map(|n| Action::GoToTab(n - 1)),
    }
}

// ============================================================================
// Tests
// ============================================================================
