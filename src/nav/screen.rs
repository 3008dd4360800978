use super::Tab;

/// A reconstructible screen of the catalog browser.
///
/// Each variant carries everything needed to render that screen again, so
/// a value pushed on the navigation stack restores the screen exactly when
/// popped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenState {
    /// Batch list, narrowed by the lowercase search filter.
    Root { filter: String },
    /// Subjects of a batch, plus that batch's live classes for today.
    Subjects { batch_url: String, title: String },
    /// Chapters of a subject.
    Chapters { subject_url: String, title: String },
    /// One content tab of a chapter.
    Content {
        tab: Tab,
        chapter_id: String,
        title: String,
    },
}

impl ScreenState {
    pub fn root() -> Self {
        ScreenState::Root {
            filter: String::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self, ScreenState::Root { .. })
    }

    /// Panel title for the listing.
    pub fn title(&self) -> String {
        match self {
            ScreenState::Root { filter } if filter.is_empty() => "Batches".to_string(),
            ScreenState::Root { filter } => format!("Batches matching \"{}\"", filter),
            ScreenState::Subjects { title, .. } => format!("Subjects - {}", title),
            ScreenState::Chapters { title, .. } => format!("Chapters - {}", title),
            ScreenState::Content { tab, title, .. } => format!("{} - {}", tab, title),
        }
    }

    /// Breadcrumb label used by the status line.
    pub fn crumb(&self) -> &str {
        match self {
            ScreenState::Root { .. } => "Batches",
            ScreenState::Subjects { title, .. }
            | ScreenState::Chapters { title, .. }
            | ScreenState::Content { title, .. } => title,
        }
    }
}

impl Default for ScreenState {
    fn default() -> Self {
        Self::root()
    }
}
