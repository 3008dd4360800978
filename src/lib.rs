//! Terminal client for a course catalog: browse batches, subjects and
//! chapters, then resolve lectures into a playable player URL.

pub mod api;
pub mod app;
pub mod config;
pub mod keybindings;
pub mod media;
pub mod nav;
pub mod ui;
pub mod util;
