//! Terminal User Interface module.
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `events` - Background task result processing
//! - `helpers` - Task spawning and player hand-off
//! - `render` - Screen layout and overlays
//! - `listing` - Listing and today's classes panels
//! - `status` - Status bar widget
//! - `help` - Keybinding help overlay

mod events;
mod help;
mod helpers;
mod input;
mod listing;
mod loop_runner;
mod render;
mod status;

pub use loop_runner::{run, Action};
