//! FoxWeb: a terminal download directory.
//!
//! The library holds the session model (catalog, search, routing,
//! favorites, notifications, suggestions, theme) and the ratatui front end.
//! `main.rs` only wires configuration, the local store and the event loop.

pub mod app;
pub mod catalog;
pub mod config;
pub mod favorites;
pub mod keybindings;
pub mod notifications;
pub mod preferences;
pub mod router;
pub mod search;
pub mod storage;
pub mod suggestion;
pub mod theme;
pub mod ui;
pub mod util;
pub mod view;
