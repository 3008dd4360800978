//! Content tab routing.
//!
//! A chapter's lecture listing is addressed by a path-shaped chapter id that
//! ends in `/videos`. The other tabs of the same chapter live next to it and
//! are derived by swapping that trailing segment.

use std::fmt;

/// Trailing segment every lecture chapter id carries.
const LECTURE_SUFFIX: &str = "/videos";

/// Content tab shown for a chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    #[default]
    Lectures,
    Notes,
    DppNotes,
    DppLecture,
}

impl Tab {
    /// All tabs in display order.
    pub const ALL: [Tab; 4] = [Tab::Lectures, Tab::Notes, Tab::DppNotes, Tab::DppLecture];

    /// Trailing path segment for this tab's chapter path.
    pub fn suffix(self) -> &'static str {
        match self {
            Tab::Lectures => LECTURE_SUFFIX,
            Tab::Notes => "/notes",
            Tab::DppNotes => "/DppNotes",
            Tab::DppLecture => "/DppVideos",
        }
    }

    /// API endpoint that lists this tab's items.
    pub fn endpoint(self) -> &'static str {
        match self {
            Tab::Lectures => "/api/pw/lectures",
            Tab::Notes => "/api/pw/notes",
            Tab::DppNotes => "/api/pw/dppnotes",
            Tab::DppLecture => "/api/pw/dpplecture",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tab::Lectures => "Lectures",
            Tab::Notes => "Notes",
            Tab::DppNotes => "DPP Notes",
            Tab::DppLecture => "DPP Lectures",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Tab::Lectures => 0,
            Tab::Notes => 1,
            Tab::DppNotes => 2,
            Tab::DppLecture => 3,
        }
    }

    pub fn next(self) -> Tab {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Tab {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Derive the chapter path for `tab` from the lecture chapter id.
///
/// Only a trailing `/videos` is replaced; any other `videos` in the id is
/// left alone. An id without the suffix gets the tab suffix appended.
///
/// ```
/// use coursenav::nav::{resolve_tab_path, Tab};
///
/// assert_eq!(resolve_tab_path("abc/videos", Tab::Notes), "abc/notes");
/// assert_eq!(resolve_tab_path("abc/videos", Tab::DppLecture), "abc/DppVideos");
/// assert_eq!(resolve_tab_path("abc/videos", Tab::Lectures), "abc/videos");
/// ```
pub fn resolve_tab_path(chapter_id: &str, tab: Tab) -> String {
    let stem = chapter_id
        .strip_suffix(LECTURE_SUFFIX)
        .unwrap_or(chapter_id);
    format!("{}{}", stem, tab.suffix())
}

/// Extract the `chapterId` query parameter from a chapter listing URL.
///
/// Returns an empty string when the URL has no query or no such parameter.
pub fn chapter_id_from_url(url: &str) -> String {
    let Some((_, query)) = url.split_once('?') else {
        return String::new();
    };
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "chapterId")
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default()
}
