use crate::api::{batch_id_from_url, ApiError, CatalogClient, CatalogNode, MediaItem};
use crate::keybindings::KeybindingRegistry;
use crate::media::{player_url, MediaResolver, PlaybackDescriptor, ResolveError};
use crate::nav::{filter_batches, normalize_filter, ChapterContext, NavigationStack, ScreenState, Tab};
use crate::util::MAX_SEARCH_QUERY_LENGTH;
use std::borrow::Cow;
use std::sync::Arc;
use tokio::time::Instant;

// ============================================================================
// Listing State
// ============================================================================

/// Rows of the main listing panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    /// Batches, subjects or chapters.
    Nodes(Vec<CatalogNode>),
    /// Lectures, notes or DPP items of a chapter.
    Media(Vec<MediaItem>),
}

impl Listing {
    pub fn len(&self) -> usize {
        match self {
            Listing::Nodes(nodes) => nodes.len(),
            Listing::Media(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Load state of one panel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Section<T> {
    /// Not shown on this screen.
    #[default]
    Hidden,
    Loading,
    Ready(T),
    /// The request failed; the panel shows a placeholder.
    Unavailable,
}

impl<T> Section<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Section::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Section::Loading)
    }
}

/// Which panel has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Listing,
    /// Today's live classes, shown beside the subjects of a batch.
    TodayClasses,
}

/// Modal overlay shown while a media item resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvingOverlay {
    pub title: String,
}

// ============================================================================
// Background Requests
// ============================================================================

/// What a screen needs fetched before it can show its listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadTarget {
    Batches,
    /// Subjects plus the batch's classes for today.
    Subjects { batch_url: String },
    Chapters { subject_url: String },
    Content { tab: Tab, chapter_id: String },
}

/// A listing fetch tagged with the screen generation that asked for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub generation: u64,
    pub target: LoadTarget,
}

/// Result of executing a [`LoadTarget`].
#[derive(Debug)]
pub struct LoadOutcome {
    pub listing: Result<Listing, ApiError>,
    /// Only set for [`LoadTarget::Subjects`]. `None` inside means the batch
    /// URL carries no usable batch id.
    pub today_classes: Option<Option<Result<Vec<MediaItem>, ApiError>>>,
}

impl LoadTarget {
    /// Run the fetch against `client`.
    pub async fn execute(&self, client: &CatalogClient) -> LoadOutcome {
        match self {
            LoadTarget::Batches => LoadOutcome {
                listing: client.list_batches().await.map(Listing::Nodes),
                today_classes: None,
            },
            LoadTarget::Subjects { batch_url } => {
                let today = async {
                    match batch_id_from_url(batch_url) {
                        Some(batch_id) => Some(client.list_today_classes(&batch_id).await),
                        None => {
                            tracing::debug!(batch_url = %batch_url, "No batch id, skipping today's classes");
                            None
                        }
                    }
                };
                let (subjects, today) = tokio::join!(client.list_subjects(batch_url), today);
                LoadOutcome {
                    listing: subjects.map(Listing::Nodes),
                    today_classes: Some(today),
                }
            }
            LoadTarget::Chapters { subject_url } => LoadOutcome {
                listing: client.list_chapters(subject_url).await.map(Listing::Nodes),
                today_classes: None,
            },
            LoadTarget::Content { tab, chapter_id } => LoadOutcome {
                listing: client.list_content(*tab, chapter_id).await.map(Listing::Media),
                today_classes: None,
            },
        }
    }
}

/// A media resolution tagged with its generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveRequest {
    pub generation: u64,
    pub url: String,
}

/// Work a user action asks the shell to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Load(LoadRequest),
    Resolve(ResolveRequest),
}

/// Events from background tasks
pub enum AppEvent {
    /// A screen's listing (and, for subjects, today's classes) arrived.
    ListingLoaded {
        generation: u64,
        outcome: LoadOutcome,
    },
    /// A media item finished resolving, successfully or not.
    MediaResolved {
        generation: u64,
        result: Result<PlaybackDescriptor, ResolveError>,
    },
    /// A listing task panicked before reporting back.
    TaskPanicked {
        task: &'static str,
        generation: u64,
        error: String,
    },
}

// ============================================================================
// Application State
// ============================================================================

/// Central application state
pub struct App {
    pub client: CatalogClient,
    pub resolver: MediaResolver,
    pub keybindings: KeybindingRegistry,

    /// Companion page that plays live and DRM streams.
    pub player_page: String,
    /// Show the handoff URL instead of launching the browser.
    pub print_player_url: bool,

    // Navigation
    pub screen: ScreenState,
    pub stack: NavigationStack,
    /// Set while a chapter's content tabs are shown.
    pub chapter: Option<ChapterContext>,

    // Data
    /// Full batch list, fetched once and filtered locally.
    pub all_batches: Option<Arc<Vec<CatalogNode>>>,
    pub listing: Section<Listing>,
    pub today_classes: Section<Vec<MediaItem>>,

    // UI State
    pub focus: Focus,
    pub selected: usize,
    pub today_selected: usize,

    // Search
    pub search_mode: bool,
    pub search_input: String,

    // Overlays
    pub resolving: Option<ResolvingOverlay>,
    /// Blocking message dismissed by any key.
    pub alert: Option<String>,
    pub show_help: bool,
    pub help_scroll_offset: usize,

    pub status_message: Option<(Cow<'static, str>, Instant)>,

    /// Last handoff URL, kept for `--print-player-url`.
    pub last_player_url: Option<String>,

    /// Dirty flag to skip unnecessary frame renders
    pub needs_redraw: bool,

    /// Bumped on every screen render. Listing events carrying an older value
    /// belong to a screen the user already left and are dropped.
    pub load_generation: u64,
    pub load_handle: Option<tokio::task::JoinHandle<()>>,

    /// Bumped on every resolution so a late answer cannot reopen the player
    /// for an item the user moved past.
    pub resolve_generation: u64,
    pub resolve_handle: Option<tokio::task::JoinHandle<()>>,

    /// Current frame of the loading spinner animation.
    pub spinner_frame: usize,
}

impl App {
    pub fn new(client: CatalogClient, player_page: impl Into<String>) -> Self {
        Self {
            resolver: MediaResolver::new(client.clone()),
            client,
            keybindings: KeybindingRegistry::new(),
            player_page: player_page.into(),
            print_player_url: false,
            screen: ScreenState::root(),
            stack: NavigationStack::new(),
            chapter: None,
            all_batches: None,
            listing: Section::Hidden,
            today_classes: Section::Hidden,
            focus: Focus::Listing,
            selected: 0,
            today_selected: 0,
            search_mode: false,
            search_input: String::new(),
            resolving: None,
            alert: None,
            show_help: false,
            help_scroll_offset: 0,
            status_message: None,
            last_player_url: None,
            needs_redraw: true,
            load_generation: 0,
            load_handle: None,
            resolve_generation: 0,
            resolve_handle: None,
            spinner_frame: 0,
        }
    }

    /// Render the initial batch list.
    pub fn start(&mut self) -> Option<LoadRequest> {
        self.render_screen(ScreenState::root())
    }

    // ------------------------------------------------------------------------
    // Screen transitions
    // ------------------------------------------------------------------------

    /// Make `screen` current and say what it needs fetched.
    ///
    /// Every call starts a new load generation and aborts the previous
    /// listing task. The batch list is served from cache when present.
    pub fn render_screen(&mut self, screen: ScreenState) -> Option<LoadRequest> {
        if let Some(handle) = self.load_handle.take() {
            handle.abort();
            tracing::debug!("Aborted previous listing task");
        }
        self.load_generation = self.load_generation.wrapping_add(1);
        let generation = self.load_generation;

        self.selected = 0;
        self.today_selected = 0;
        self.focus = Focus::Listing;
        self.today_classes = Section::Hidden;
        self.needs_redraw = true;

        if !matches!(screen, ScreenState::Content { .. }) {
            self.chapter = None;
        }
        if !screen.is_root() {
            self.search_mode = false;
        }

        tracing::debug!(screen = ?screen, generation, depth = self.stack.depth(), "Render screen");
        self.screen = screen;

        let target = match &self.screen {
            ScreenState::Root { filter } => {
                self.search_input = filter.clone();
                if let Some(all) = &self.all_batches {
                    self.listing = Section::Ready(Listing::Nodes(filter_batches(all, filter)));
                    return None;
                }
                LoadTarget::Batches
            }
            ScreenState::Subjects { batch_url, .. } => {
                self.today_classes = Section::Loading;
                LoadTarget::Subjects {
                    batch_url: batch_url.clone(),
                }
            }
            ScreenState::Chapters { subject_url, .. } => LoadTarget::Chapters {
                subject_url: subject_url.clone(),
            },
            ScreenState::Content {
                tab, chapter_id, ..
            } => LoadTarget::Content {
                tab: *tab,
                chapter_id: chapter_id.clone(),
            },
        };

        self.listing = Section::Loading;
        Some(LoadRequest { generation, target })
    }

    /// Act on the highlighted row: drill into a catalog node or resolve a
    /// media item.
    pub fn select(&mut self) -> Option<Effect> {
        if self.focus == Focus::TodayClasses {
            let item = self
                .today_classes
                .ready()
                .and_then(|items| items.get(self.today_selected))
                .cloned()?;
            return Some(Effect::Resolve(self.begin_resolve(&item)));
        }

        match self.listing.ready()? {
            Listing::Media(items) => {
                let item = items.get(self.selected)?.clone();
                Some(Effect::Resolve(self.begin_resolve(&item)))
            }
            Listing::Nodes(nodes) => {
                let node = nodes.get(self.selected)?.clone();
                let next = match &self.screen {
                    ScreenState::Root { .. } => ScreenState::Subjects {
                        batch_url: node.url,
                        title: node.name,
                    },
                    ScreenState::Subjects { .. } => ScreenState::Chapters {
                        subject_url: node.url,
                        title: node.name,
                    },
                    ScreenState::Chapters { .. } => {
                        let chapter = ChapterContext::from_url(&node.url);
                        if chapter.chapter_id.is_empty() {
                            tracing::warn!(url = %node.url, "Chapter URL has no chapterId");
                        }
                        let screen = ScreenState::Content {
                            tab: Tab::default(),
                            chapter_id: chapter.chapter_id.clone(),
                            title: node.name,
                        };
                        self.chapter = Some(chapter);
                        screen
                    }
                    ScreenState::Content { .. } => return None,
                };

                self.stack.push(self.screen.clone());
                self.render_screen(next).map(Effect::Load)
            }
        }
    }

    /// Pop one screen and render it. No-op at the root.
    pub fn go_back(&mut self) -> Option<LoadRequest> {
        match self.stack.pop() {
            Some(previous) => self.render_screen(previous),
            None => {
                tracing::debug!("Back at root, nothing to pop");
                None
            }
        }
    }

    /// Show another tab of the current chapter. Only valid on a content
    /// screen; never touches the navigation stack.
    pub fn switch_tab(&mut self, tab: Tab) -> Option<LoadRequest> {
        let ScreenState::Content {
            tab: current,
            chapter_id,
            title,
        } = &self.screen
        else {
            return None;
        };
        if *current == tab {
            return None;
        }

        let chapter_id = self
            .chapter
            .as_ref()
            .map(|c| c.chapter_id.clone())
            .unwrap_or_else(|| chapter_id.clone());
        let next = ScreenState::Content {
            tab,
            chapter_id,
            title: title.clone(),
        };
        self.render_screen(next)
    }

    pub fn next_tab(&mut self) -> Option<LoadRequest> {
        match &self.screen {
            ScreenState::Content { tab, .. } => self.switch_tab(tab.next()),
            _ => None,
        }
    }

    pub fn prev_tab(&mut self) -> Option<LoadRequest> {
        match &self.screen {
            ScreenState::Content { tab, .. } => self.switch_tab(tab.prev()),
            _ => None,
        }
    }

    /// Re-render the current screen. On the root this refetches batches.
    pub fn reload(&mut self) -> Option<LoadRequest> {
        if self.screen.is_root() {
            self.all_batches = None;
        }
        self.render_screen(self.screen.clone())
    }

    /// Apply a finished listing fetch. Returns `false` for stale results.
    pub fn apply_load(&mut self, generation: u64, outcome: LoadOutcome) -> bool {
        if generation != self.load_generation {
            tracing::debug!(
                expected = self.load_generation,
                got = generation,
                "Ignoring stale listing (generation mismatch)"
            );
            return false;
        }
        self.load_handle = None;
        self.needs_redraw = true;

        match outcome.listing {
            Ok(Listing::Nodes(nodes)) if self.screen.is_root() => {
                let all = Arc::new(nodes);
                let filter = self.current_filter().to_string();
                self.listing = Section::Ready(Listing::Nodes(filter_batches(&all, &filter)));
                tracing::info!(count = all.len(), "Loaded batches");
                self.all_batches = Some(all);
            }
            Ok(listing) => {
                tracing::debug!(count = listing.len(), screen = self.screen.crumb(), "Loaded listing");
                self.listing = Section::Ready(listing);
            }
            Err(e) => {
                tracing::warn!(error = %e, screen = self.screen.crumb(), "Failed to load listing");
                self.listing = Section::Unavailable;
            }
        }

        if let Some(today) = outcome.today_classes {
            self.today_classes = match today {
                Some(Ok(items)) => Section::Ready(items),
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "Failed to load today's classes");
                    Section::Unavailable
                }
                None => Section::Hidden,
            };
        }
        self.clamp_selections();
        true
    }

    // ------------------------------------------------------------------------
    // Media resolution
    // ------------------------------------------------------------------------

    /// Raise the resolving overlay and start a new resolve generation.
    pub fn begin_resolve(&mut self, item: &MediaItem) -> ResolveRequest {
        if let Some(handle) = self.resolve_handle.take() {
            handle.abort();
        }
        self.resolve_generation = self.resolve_generation.wrapping_add(1);
        self.resolving = Some(ResolvingOverlay {
            title: item.title.clone(),
        });
        self.alert = None;
        self.needs_redraw = true;
        tracing::info!(title = %item.title, generation = self.resolve_generation, "Resolving media");
        ResolveRequest {
            generation: self.resolve_generation,
            url: item.url.clone(),
        }
    }

    /// Apply a finished resolution.
    ///
    /// The overlay is cleared before the result is looked at. On success the
    /// player URL to hand off is returned; on failure an alert is raised.
    pub fn apply_resolved(
        &mut self,
        generation: u64,
        result: Result<PlaybackDescriptor, ResolveError>,
    ) -> Option<String> {
        if generation != self.resolve_generation {
            tracing::debug!(
                expected = self.resolve_generation,
                got = generation,
                "Ignoring stale media resolution"
            );
            return None;
        }
        self.resolving = None;
        self.resolve_handle = None;
        self.needs_redraw = true;

        match result {
            Ok(descriptor) => {
                let url = player_url(&self.player_page, &descriptor);
                tracing::debug!(descriptor = ?descriptor, "Handing off to player");
                self.last_player_url = Some(url.clone());
                Some(url)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Media resolution failed");
                self.alert = Some(e.user_message().to_string());
                None
            }
        }
    }

    /// Mark the panels of the current screen unavailable after its listing
    /// task panicked. Returns `false` for a panic from a superseded task.
    pub fn apply_listing_panic(&mut self, generation: u64) -> bool {
        if generation != self.load_generation {
            tracing::debug!(
                expected = self.load_generation,
                got = generation,
                "Ignoring panic from superseded listing task"
            );
            return false;
        }
        self.load_handle = None;
        if self.listing.is_loading() {
            self.listing = Section::Unavailable;
        }
        if self.today_classes.is_loading() {
            self.today_classes = Section::Unavailable;
        }
        self.needs_redraw = true;
        true
    }

    pub fn is_resolving(&self) -> bool {
        self.resolving.is_some()
    }

    // ------------------------------------------------------------------------
    // Search
    // ------------------------------------------------------------------------

    /// Filter text of the root screen, empty elsewhere.
    pub fn current_filter(&self) -> &str {
        match &self.screen {
            ScreenState::Root { filter } => filter,
            _ => "",
        }
    }

    /// Start editing the batch filter. Only the root screen can be searched.
    pub fn enter_search(&mut self) -> bool {
        if !self.screen.is_root() {
            return false;
        }
        self.search_mode = true;
        self.focus = Focus::Listing;
        true
    }

    pub fn push_search_char(&mut self, c: char) {
        if self.search_input.chars().count() >= MAX_SEARCH_QUERY_LENGTH {
            self.set_status(format!(
                "Search query at max length ({} chars)",
                MAX_SEARCH_QUERY_LENGTH
            ));
            return;
        }
        self.search_input.push(c);
        self.apply_filter();
    }

    pub fn pop_search_char(&mut self) {
        self.search_input.pop();
        self.apply_filter();
    }

    /// Leave input mode, keeping the filter.
    pub fn commit_search(&mut self) {
        self.search_mode = false;
    }

    /// Leave input mode and clear the filter.
    pub fn cancel_search(&mut self) {
        self.search_mode = false;
        self.search_input.clear();
        self.apply_filter();
    }

    fn apply_filter(&mut self) {
        let ScreenState::Root { filter } = &mut self.screen else {
            return;
        };
        *filter = normalize_filter(&self.search_input);
        if let Some(all) = &self.all_batches {
            self.listing = Section::Ready(Listing::Nodes(filter_batches(all, filter.as_str())));
        }
        self.selected = 0;
        self.needs_redraw = true;
    }

    // ------------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------------

    fn focused_len(&self) -> usize {
        match self.focus {
            Focus::Listing => self.listing.ready().map_or(0, Listing::len),
            Focus::TodayClasses => self.today_classes.ready().map_or(0, Vec::len),
        }
    }

    fn focused_index(&mut self) -> &mut usize {
        match self.focus {
            Focus::Listing => &mut self.selected,
            Focus::TodayClasses => &mut self.today_selected,
        }
    }

    pub fn nav_up(&mut self) {
        let idx = self.focused_index();
        *idx = idx.saturating_sub(1);
    }

    pub fn nav_down(&mut self) {
        let len = self.focused_len();
        if len == 0 {
            return;
        }
        let idx = self.focused_index();
        *idx = idx.saturating_add(1).min(len - 1);
    }

    /// Toggle focus between the listing and today's classes when the latter
    /// has rows.
    pub fn cycle_focus(&mut self) {
        let has_today = self
            .today_classes
            .ready()
            .is_some_and(|items| !items.is_empty());
        self.focus = match self.focus {
            Focus::Listing if has_today => Focus::TodayClasses,
            _ => Focus::Listing,
        };
    }

    pub fn clamp_selections(&mut self) {
        let listing_len = self.listing.ready().map_or(0, Listing::len);
        self.selected = self.selected.min(listing_len.saturating_sub(1));
        let today_len = self.today_classes.ready().map_or(0, Vec::len);
        self.today_selected = self.today_selected.min(today_len.saturating_sub(1));
        if today_len == 0 {
            self.focus = Focus::Listing;
        }
    }

    // ------------------------------------------------------------------------
    // Status
    // ------------------------------------------------------------------------

    /// Set status message (will auto-expire after 3 seconds)
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Clear status message if expired (older than 3 seconds)
    /// Returns true if a message was actually cleared
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed().as_secs() >= 3 {
                self.status_message = None;
                return true;
            }
        }
        false
    }
}

/// Abort in-flight tasks so none outlive the event loop.
impl Drop for App {
    fn drop(&mut self) {
        if let Some(handle) = self.load_handle.take() {
            handle.abort();
        }
        if let Some(handle) = self.resolve_handle.take() {
            handle.abort();
        }
    }
}
