//! Theme system for the TUI.
//!
//! Semantic color roles map to ratatui `Style` values. `ThemeVariant`
//! selects the Dark or Light palette, and `StyleMap` resolves role names to
//! concrete styles.

use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Theme Variant
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeVariant {
    #[default]
    Dark,
    Light,
}

impl ThemeVariant {
    /// Parse a variant name (case-insensitive).
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    pub fn palette(self) -> ColorPalette {
        match self {
            Self::Dark => ColorPalette::dark(),
            Self::Light => ColorPalette::light(),
        }
    }

    /// Dark → Light → Dark.
    pub fn next(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    /// Name stored under the theme key.
    pub fn key(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Dark => "Dark",
            Self::Light => "Light",
        }
    }
}

// ============================================================================
// Color Palette
// ============================================================================

/// Every semantic UI role mapped to a `Style`.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    // -- Tabs --
    pub tab_active: Style,
    pub tab_inactive: Style,
    pub tab_count: Style,

    // -- Cards --
    pub card_title: Style,
    pub card_selected: Style,
    pub card_description: Style,
    pub card_unavailable: Style,
    pub badge_main: Style,
    pub badge_extra: Style,
    pub favorite: Style,

    // -- Page --
    pub heading: Style,
    pub subheading: Style,
    pub footer_note: Style,
    pub empty_state: Style,
    pub search_bar: Style,
    pub search_active: Style,

    // -- Notifications --
    pub notification_unread: Style,
    pub notification_read: Style,
    pub notification_time: Style,
    pub unread_badge: Style,

    // -- Toasts --
    pub toast_info: Style,
    pub toast_success: Style,
    pub toast_warning: Style,
    pub toast_error: Style,

    // -- Overlays --
    pub modal_title: Style,
    pub modal_button: Style,
    pub modal_button_selected: Style,
    pub form_label: Style,
    pub form_field_focused: Style,

    // -- Chrome --
    pub status_bar: Style,
    pub panel_border: Style,
    pub panel_border_focused: Style,
    pub error_screen: Style,
}

impl ColorPalette {
    fn dark() -> Self {
        let orange = Color::Rgb(255, 140, 0);
        Self {
            tab_active: Style::default()
                .fg(Color::Black)
                .bg(orange)
                .add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            tab_count: Style::default().fg(Color::DarkGray),

            card_title: Style::default().add_modifier(Modifier::BOLD),
            card_selected: Style::default().bg(Color::DarkGray).fg(Color::White),
            card_description: Style::default().fg(Color::Gray),
            card_unavailable: Style::default().fg(Color::DarkGray),
            badge_main: Style::default().fg(Color::Black).bg(orange),
            badge_extra: Style::default().fg(Color::Cyan),
            favorite: Style::default().fg(Color::Yellow),

            heading: Style::default().fg(orange).add_modifier(Modifier::BOLD),
            subheading: Style::default().fg(Color::Gray),
            footer_note: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::ITALIC),
            empty_state: Style::default().fg(Color::DarkGray),
            search_bar: Style::default().fg(Color::Gray),
            search_active: Style::default().fg(orange),

            notification_unread: Style::default().add_modifier(Modifier::BOLD),
            notification_read: Style::default().fg(Color::Gray),
            notification_time: Style::default().fg(Color::DarkGray),
            unread_badge: Style::default()
                .fg(Color::White)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD),

            toast_info: Style::default().fg(Color::Black).bg(Color::Cyan),
            toast_success: Style::default().fg(Color::Black).bg(Color::Green),
            toast_warning: Style::default().fg(Color::Black).bg(Color::Yellow),
            toast_error: Style::default().fg(Color::White).bg(Color::Red),

            modal_title: Style::default().fg(orange).add_modifier(Modifier::BOLD),
            modal_button: Style::default().fg(Color::Cyan),
            modal_button_selected: Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            form_label: Style::default().fg(Color::Gray),
            form_field_focused: Style::default().fg(orange),

            status_bar: Style::default().bg(Color::DarkGray).fg(Color::White),
            panel_border: Style::default(),
            panel_border_focused: Style::default().fg(orange),
            error_screen: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        }
    }

    fn light() -> Self {
        let accent = Color::Rgb(204, 85, 0);
        Self {
            tab_active: Style::default()
                .fg(Color::White)
                .bg(accent)
                .add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Black),
            tab_count: Style::default().fg(Color::DarkGray),

            card_title: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            card_selected: Style::default().bg(Color::Blue).fg(Color::White),
            card_description: Style::default().fg(Color::DarkGray),
            card_unavailable: Style::default().fg(Color::Gray),
            badge_main: Style::default().fg(Color::White).bg(accent),
            badge_extra: Style::default().fg(Color::Blue),
            favorite: Style::default().fg(Color::Magenta),

            heading: Style::default().fg(accent).add_modifier(Modifier::BOLD),
            subheading: Style::default().fg(Color::DarkGray),
            footer_note: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::ITALIC),
            empty_state: Style::default().fg(Color::Gray),
            search_bar: Style::default().fg(Color::DarkGray),
            search_active: Style::default().fg(accent),

            notification_unread: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            notification_read: Style::default().fg(Color::DarkGray),
            notification_time: Style::default().fg(Color::Gray),
            unread_badge: Style::default()
                .fg(Color::White)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD),

            toast_info: Style::default().fg(Color::White).bg(Color::Blue),
            toast_success: Style::default().fg(Color::White).bg(Color::Green),
            toast_warning: Style::default().fg(Color::Black).bg(Color::Yellow),
            toast_error: Style::default().fg(Color::White).bg(Color::Red),

            modal_title: Style::default().fg(accent).add_modifier(Modifier::BOLD),
            modal_button: Style::default().fg(Color::Blue),
            modal_button_selected: Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            form_label: Style::default().fg(Color::DarkGray),
            form_field_focused: Style::default().fg(accent),

            status_bar: Style::default().bg(Color::White).fg(Color::Black),
            panel_border: Style::default().fg(Color::DarkGray),
            panel_border_focused: Style::default().fg(accent),
            error_screen: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        }
    }

    /// Every role with its name, in declaration order.
    fn roles(&self) -> [(&'static str, Style); 33] {
        [
            ("tab_active", self.tab_active),
            ("tab_inactive", self.tab_inactive),
            ("tab_count", self.tab_count),
            ("card_title", self.card_title),
            ("card_selected", self.card_selected),
            ("card_description", self.card_description),
            ("card_unavailable", self.card_unavailable),
            ("badge_main", self.badge_main),
            ("badge_extra", self.badge_extra),
            ("favorite", self.favorite),
            ("heading", self.heading),
            ("subheading", self.subheading),
            ("footer_note", self.footer_note),
            ("empty_state", self.empty_state),
            ("search_bar", self.search_bar),
            ("search_active", self.search_active),
            ("notification_unread", self.notification_unread),
            ("notification_read", self.notification_read),
            ("notification_time", self.notification_time),
            ("unread_badge", self.unread_badge),
            ("toast_info", self.toast_info),
            ("toast_success", self.toast_success),
            ("toast_warning", self.toast_warning),
            ("toast_error", self.toast_error),
            ("modal_title", self.modal_title),
            ("modal_button", self.modal_button),
            ("modal_button_selected", self.modal_button_selected),
            ("form_label", self.form_label),
            ("form_field_focused", self.form_field_focused),
            ("status_bar", self.status_bar),
            ("panel_border", self.panel_border),
            ("panel_border_focused", self.panel_border_focused),
            ("error_screen", self.error_screen),
        ]
    }
}

// ============================================================================
// Style Map
// ============================================================================

/// String-keyed style lookup used by the render code.
#[derive(Debug, Clone)]
pub struct StyleMap {
    variant: ThemeVariant,
    map: HashMap<&'static str, Style>,
}

impl StyleMap {
    pub fn new(variant: ThemeVariant) -> Self {
        Self::from_palette(variant, &variant.palette())
    }

    pub fn from_palette(variant: ThemeVariant, palette: &ColorPalette) -> Self {
        Self {
            variant,
            map: palette.roles().into_iter().collect(),
        }
    }

    pub fn variant(&self) -> ThemeVariant {
        self.variant
    }

    /// Resolve a role name to its `Style`. Unknown roles get `Style::default()`.
    pub fn resolve(&self, role: &str) -> Style {
        self.map.get(role).copied().unwrap_or_default()
    }
}

// ============================================================================
// Tests
// ============================================================================
