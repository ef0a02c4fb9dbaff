use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::policy::{self, Direction};
use crate::catalog::Track;
use crate::config::AdvanceMode;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum TransportState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Read-only view of the playback state handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlaybackSnapshot {
    pub current_track: Option<Track>,
    pub is_playing: bool,
    pub playlist: Vec<Track>,
    pub current_index: usize,
    pub transport: TransportState,
}

/// The operations the presentation layer may invoke.
///
/// None of them fail: calls that make no sense in the current state are
/// ignored.
pub trait MusicControls {
    /// Make `track` current and start it. A non-empty `track_list` replaces
    /// the playlist.
    fn play_track(&mut self, track: Track, track_list: Option<Vec<Track>>);
    fn resume_playback(&mut self);
    fn pause_track(&mut self);
    fn next_track(&mut self);
    fn previous_track(&mut self);
    fn add_to_playlist(&mut self, track: Track);
    fn snapshot(&self) -> PlaybackSnapshot;
}

/// Owns the current track, the playlist and the transport state.
///
/// Whenever a current track is set and the playlist is non-empty,
/// `playlist[current_index]` has the current track's id.
pub struct PlaybackController<R = StdRng> {
    current: Option<Track>,
    playlist: Vec<Track>,
    index: usize,
    transport: TransportState,
    mode: AdvanceMode,
    rng: R,
}

impl PlaybackController<StdRng> {
    pub fn new(mode: AdvanceMode) -> Self {
        Self::with_rng(mode, StdRng::from_os_rng())
    }
}

impl<R: Rng> PlaybackController<R> {
    pub fn with_rng(mode: AdvanceMode, rng: R) -> Self {
        Self {
            current: None,
            playlist: Vec::new(),
            index: 0,
            transport: TransportState::Stopped,
            mode,
            rng,
        }
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current.as_ref()
    }

    pub fn playlist(&self) -> &[Track] {
        &self.playlist
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn transport(&self) -> TransportState {
        self.transport
    }

    pub fn is_playing(&self) -> bool {
        self.transport == TransportState::Playing
    }

    /// Replace the playlist wholesale, keeping the current track reachable.
    ///
    /// If the current track is missing from `tracks` it is put in front.
    pub fn set_playlist(&mut self, tracks: Vec<Track>) {
        self.playlist = tracks;
        self.index = 0;
        let Some(current) = &self.current else {
            return;
        };
        match position_of(&self.playlist, &current.id) {
            Some(i) => self.index = i,
            None => self.playlist.insert(0, current.clone()),
        }
    }

    /// Drop the current track. The playlist is kept.
    pub fn stop(&mut self) {
        if self.current.take().is_some() {
            log::info!("playback: stopped");
        }
        self.transport = TransportState::Stopped;
    }

    fn advance(&mut self, direction: Direction) {
        if self.current.is_none() || self.playlist.is_empty() {
            return;
        }
        let Some(next) = policy::pick(&self.playlist, self.index, direction, self.mode, &mut self.rng) else {
            log::debug!("playback: nothing to move to ({direction:?})");
            return;
        };

        let track = self.playlist[next].clone();
        log::info!("playback: {direction:?} -> {} [{next}]", track.display());
        self.index = next;
        self.current = Some(track);
        self.transport = TransportState::Playing;
    }
}

fn position_of(playlist: &[Track], id: &str) -> Option<usize> {
    playlist.iter().position(|t| t.id == id)
}

impl<R: Rng> MusicControls for PlaybackController<R> {
    fn play_track(&mut self, track: Track, track_list: Option<Vec<Track>>) {
        match track_list {
            Some(list) if !list.is_empty() => {
                self.current = Some(track.clone());
                self.set_playlist(list);
            }
            _ if self.playlist.is_empty() => {
                self.playlist = vec![track.clone()];
                self.index = 0;
            }
            _ => match position_of(&self.playlist, &track.id) {
                Some(i) => self.index = i,
                None => {
                    self.playlist.push(track.clone());
                    self.index = self.playlist.len() - 1;
                }
            },
        }

        if self.playlist.get(self.index).is_none_or(|t| t.id != track.id) {
            self.playlist.insert(0, track.clone());
            self.index = 0;
        }

        log::info!("playback: play {} [{}]", track.display(), self.index);
        self.current = Some(track);
        self.transport = TransportState::Playing;
    }

    fn resume_playback(&mut self) {
        if self.current.is_some() {
            self.transport = TransportState::Playing;
        }
    }

    fn pause_track(&mut self) {
        if self.current.is_some() {
            self.transport = TransportState::Paused;
        }
    }

    fn next_track(&mut self) {
        self.advance(Direction::Forward);
    }

    fn previous_track(&mut self) {
        self.advance(Direction::Backward);
    }

    fn add_to_playlist(&mut self, track: Track) {
        log::debug!("playback: queued {}", track.display());
        self.playlist.push(track);
    }

    fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            current_track: self.current.clone(),
            is_playing: self.is_playing(),
            playlist: self.playlist.clone(),
            current_index: self.index,
            transport: self.transport,
        }
    }
}
