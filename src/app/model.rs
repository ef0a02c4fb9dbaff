//! Application model types: `App`, `View` and the per-view result lists.

use std::time::{Duration, Instant};

use crate::catalog::{RequestId, Track};
use crate::playback::PlaybackSnapshot;

/// The list shown in the main area.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Trending,
    Search,
    Playlist,
}

impl View {
    /// Cycle `Trending -> Search -> Playlist -> Trending`.
    pub fn next(self) -> Self {
        match self {
            Self::Trending => Self::Search,
            Self::Search => Self::Playlist,
            Self::Playlist => Self::Trending,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Trending => "trending",
            Self::Search => "search",
            Self::Playlist => "playlist",
        }
    }

    fn slot(self) -> usize {
        match self {
            Self::Trending => 0,
            Self::Search => 1,
            Self::Playlist => 2,
        }
    }
}

/// Tracks fetched for one view, plus the request currently in flight.
///
/// Only the reply to the most recent request is accepted.
#[derive(Debug, Default)]
pub struct ResultList {
    pub tracks: Vec<Track>,
    pub error: Option<String>,
    pending: Option<RequestId>,
}

impl ResultList {
    pub fn begin(&mut self, id: RequestId) {
        self.pending = Some(id);
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Apply a reply. Returns false, changing nothing, when `id` is not the
    /// latest request.
    pub fn accept(&mut self, id: RequestId, result: Result<Vec<Track>, String>) -> bool {
        if self.pending != Some(id) {
            return false;
        }
        self.pending = None;
        match result {
            Ok(tracks) => {
                self.tracks = tracks;
                self.error = None;
            }
            Err(message) => self.error = Some(message),
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailsState {
    Loading,
    Loaded(Box<Track>),
    Failed(String),
}

/// The details popup for one track.
#[derive(Debug, Clone)]
pub struct DetailsPane {
    pub track: Track,
    pub state: DetailsState,
    pub request: RequestId,
}

#[derive(Debug, Clone)]
struct Toast {
    text: String,
    expires_at: Instant,
}

/// The main application model.
pub struct App {
    pub view: View,
    pub trending: ResultList,
    pub search: ResultList,
    /// Last submitted search.
    pub search_query: String,
    /// Search text being typed, `Some` while the input line is open.
    pub input: Option<String>,
    pub details: Option<DetailsPane>,
    pub playback: PlaybackSnapshot,

    selected: [usize; 3],
    toast: Option<Toast>,
}

impl App {
    pub fn new() -> Self {
        Self {
            view: View::Trending,
            trending: ResultList::default(),
            search: ResultList::default(),
            search_query: String::new(),
            input: None,
            details: None,
            playback: PlaybackSnapshot::default(),
            selected: [0; 3],
            toast: None,
        }
    }

    /// Tracks listed by the active view.
    pub fn visible_tracks(&self) -> &[Track] {
        match self.view {
            View::Trending => &self.trending.tracks,
            View::Search => &self.search.tracks,
            View::Playlist => &self.playback.playlist,
        }
    }

    /// Fetch state of the active view; the playlist is never loading.
    pub fn visible_list(&self) -> Option<&ResultList> {
        match self.view {
            View::Trending => Some(&self.trending),
            View::Search => Some(&self.search),
            View::Playlist => None,
        }
    }

    pub fn selected(&self) -> usize {
        self.selected[self.view.slot()]
    }

    pub fn selected_track(&self) -> Option<&Track> {
        self.visible_tracks().get(self.selected())
    }

    pub fn set_selected(&mut self, idx: usize) {
        let len = self.visible_tracks().len();
        self.selected[self.view.slot()] = if len == 0 { 0 } else { idx.min(len - 1) };
    }

    /// Move selection to the next track. Wraps around to the first one.
    pub fn next(&mut self) {
        let len = self.visible_tracks().len();
        if len > 0 {
            let slot = self.view.slot();
            self.selected[slot] = (self.selected[slot] + 1) % len;
        }
    }

    /// Move selection to the previous track. Wraps around to the last one.
    pub fn prev(&mut self) {
        let len = self.visible_tracks().len();
        if len > 0 {
            let slot = self.view.slot();
            self.selected[slot] = (self.selected[slot] + len - 1) % len;
        }
    }

    pub fn cycle_view(&mut self) {
        self.view = self.view.next();
        self.clamp_selection();
    }

    pub fn show_view(&mut self, view: View) {
        self.view = view;
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let current = self.selected();
        self.set_selected(current);
    }

    /// What `enter` should play: the selected track and, from search
    /// results, the whole result list as the new playlist.
    pub fn play_request(&self) -> Option<(Track, Option<Vec<Track>>)> {
        let track = self.selected_track()?.clone();
        let list = match self.view {
            View::Search => Some(self.search.tracks.clone()),
            View::Trending | View::Playlist => None,
        };
        Some((track, list))
    }

    pub fn set_playback(&mut self, snapshot: PlaybackSnapshot) {
        self.playback = snapshot;
        if self.view == View::Playlist {
            self.clamp_selection();
        }
    }

    /// Replace the trending list if `id` is the latest trending request.
    pub fn accept_trending(&mut self, id: RequestId, result: Result<Vec<Track>, String>) -> bool {
        let accepted = self.trending.accept(id, result);
        if accepted {
            self.selected[View::Trending.slot()] = 0;
        }
        accepted
    }

    /// Replace the search results if `id` is the latest search.
    pub fn accept_search(&mut self, id: RequestId, result: Result<Vec<Track>, String>) -> bool {
        let accepted = self.search.accept(id, result);
        if accepted {
            self.selected[View::Search.slot()] = 0;
        }
        accepted
    }

    pub fn is_typing(&self) -> bool {
        self.input.is_some()
    }

    /// Open the search line, prefilled with the last query.
    pub fn begin_input(&mut self) {
        self.input = Some(self.search_query.clone());
    }

    pub fn push_input_char(&mut self, c: char) {
        if let Some(input) = self.input.as_mut() {
            input.push(c);
        }
    }

    pub fn pop_input_char(&mut self) {
        if let Some(input) = self.input.as_mut() {
            input.pop();
        }
    }

    pub fn cancel_input(&mut self) {
        self.input = None;
    }

    /// Close the search line. Returns the query to run, if it has any text,
    /// and switches to the Search view.
    pub fn submit_input(&mut self) -> Option<String> {
        let input = self.input.take()?;
        let query = input.trim();
        if query.is_empty() {
            return None;
        }
        self.search_query = query.to_string();
        self.show_view(View::Search);
        Some(self.search_query.clone())
    }

    pub fn open_details(&mut self, track: Track, request: RequestId) {
        self.details = Some(DetailsPane {
            track,
            state: DetailsState::Loading,
            request,
        });
    }

    pub fn close_details(&mut self) {
        self.details = None;
    }

    /// Fill the details popup if it is still waiting for `id`.
    pub fn accept_details(&mut self, id: RequestId, result: Result<Track, String>) -> bool {
        let Some(pane) = self.details.as_mut().filter(|p| p.request == id) else {
            return false;
        };
        pane.state = match result {
            Ok(track) => DetailsState::Loaded(Box::new(track)),
            Err(message) => DetailsState::Failed(message),
        };
        true
    }

    pub fn show_toast(&mut self, text: impl Into<String>, now: Instant, ttl: Duration) {
        self.toast = Some(Toast {
            text: text.into(),
            expires_at: now + ttl,
        });
    }

    /// The status message, if it has not expired at `now`.
    pub fn toast(&self, now: Instant) -> Option<&str> {
        self.toast
            .as_ref()
            .filter(|t| now < t.expires_at)
            .map(|t| t.text.as_str())
    }

    pub fn expire_toast(&mut self, now: Instant) {
        if self.toast.as_ref().is_some_and(|t| now >= t.expires_at) {
            self.toast = None;
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
