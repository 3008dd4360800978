//! Catalog navigation primitives.
//!
//! - [`ScreenState`] - a reconstructible screen value
//! - [`NavigationStack`] - back-navigation history of screens
//! - [`resolve_tab_path`] - chapter path derivation for content tabs
//! - [`filter_batches`] - substring filter for the batch list

mod filter;
mod screen;
mod stack;
mod tabs;

pub use filter::{filter_batches, normalize_filter};
pub use screen::ScreenState;
pub use stack::{NavigationStack, MAX_DEPTH};
pub use tabs::{chapter_id_from_url, resolve_tab_path, Tab};

/// Chapter anchor for the content tabs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChapterContext {
    pub chapter_id: String,
}

impl ChapterContext {
    /// Build from a chapter listing URL (its `chapterId` query parameter).
    pub fn from_url(url: &str) -> Self {
        Self {
            chapter_id: chapter_id_from_url(url),
        }
    }

    /// Path sent as `chapterId` for `tab`.
    pub fn tab_path(&self, tab: Tab) -> String {
        resolve_tab_path(&self.chapter_id, tab)
    }
}
