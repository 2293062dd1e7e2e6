//! Terminal User Interface module.
//!
//! This module provides the TUI for FoxWeb, including:
//! - Main event loop (`run`)
//! - Input handling for the card grid, search bar and overlays
//! - Rendering of the page model built by `crate::view`
//! - Background task event processing
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `events` - Background task event processing
//! - `render` - Render dispatch and dialog overlays
//! - `helpers` - Task spawning, browser and clipboard helpers
//! - `page` - Tabs, header, search bar and card list
//! - `notifications` - Notification center overlay
//! - `error_screen` - Catalog load failure screen
//! - `help` - Keybinding help overlay
//! - `status` - Status bar widget

mod error_screen;
mod events;
mod help;
mod helpers;
mod input;
mod loop_runner;
mod notifications;
mod page;
mod render;
mod status;

// Re-export the public API
pub use loop_runner::{run, Action};
