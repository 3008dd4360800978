use super::ScreenState;

/// Deepest stack the catalog hierarchy can produce: root, subject, chapter,
/// content tab.
pub const MAX_DEPTH: usize = 4;

/// Back-navigation history.
///
/// Holds the screens the user drilled down from, most recent last. Screens
/// are plain values, so the history can be inspected and compared.
#[derive(Debug, Clone, Default)]
pub struct NavigationStack {
    frames: Vec<ScreenState>,
}

impl NavigationStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember `screen` as the place to return to.
    pub fn push(&mut self, screen: ScreenState) {
        self.frames.push(screen);
        if self.frames.len() > MAX_DEPTH {
            // Only a push on a same-screen transition can get here.
            tracing::warn!(
                depth = self.frames.len(),
                max = MAX_DEPTH,
                "Navigation stack deeper than catalog hierarchy"
            );
        }
    }

    /// Take the most recent screen, or `None` when already at the root.
    pub fn pop(&mut self) -> Option<ScreenState> {
        self.frames.pop()
    }

    pub fn peek(&self) -> Option<&ScreenState> {
        self.frames.last()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Frames from the bottom of the stack to the top.
    pub fn iter(&self) -> impl Iterator<Item = &ScreenState> {
        self.frames.iter()
    }
}
