use std::collections::HashSet;
use std::time::Instant;

use crate::config::ErrorPolicy;
use crate::player::{AdapterEvent, PlayerAdapter, WidgetErrorCode, WidgetState};
use crate::playback::{MusicControls, PlaybackSnapshot, TransportState};
use crate::sync::Synchronizer;

/// Upper bound on load/react rounds within one dispatch. Each round either
/// loads a session or reacts to its events; a skip chain through failing
/// tracks is cut off here and continues on the next dispatch.
const MAX_ROUNDS: usize = 4;

/// Keeps the adapter session and the synchronizer in line with the
/// controller, and feeds widget events back into it.
pub struct SessionDriver {
    adapter: PlayerAdapter,
    sync: Synchronizer,
    on_error: ErrorPolicy,
    /// Transport last pushed to the ready widget.
    applied: Option<TransportState>,
    /// Tracks that failed since something last played fine.
    failed: HashSet<String>,
}

/// Identity of "what is playing" for detecting whether an advance moved.
fn position(snapshot: &PlaybackSnapshot) -> (Option<String>, usize) {
    (
        snapshot.current_track.as_ref().map(|t| t.id.clone()),
        snapshot.current_index,
    )
}

impl SessionDriver {
    pub fn new(adapter: PlayerAdapter, sync: Synchronizer, on_error: ErrorPolicy) -> Self {
        Self {
            adapter,
            sync,
            on_error,
            applied: None,
            failed: HashSet::new(),
        }
    }

    pub fn sync(&self) -> &Synchronizer {
        &self.sync
    }

    pub fn backend_name(&self) -> &'static str {
        self.adapter.backend_name()
    }

    pub fn is_ready(&self) -> bool {
        self.adapter.is_ready()
    }

    /// One dispatch: load or drop the session to match the current track,
    /// react to widget events, push the transport state and sample progress.
    ///
    /// Returns status messages for the user.
    pub fn drive<C: MusicControls>(&mut self, controls: &mut C, now: Instant) -> Vec<String> {
        let mut notices = Vec::new();

        for _ in 0..MAX_ROUNDS {
            let loaded = self.ensure_session(controls, &mut notices);
            let moved = self.handle_events(controls, &mut notices);
            if !loaded && !moved {
                break;
            }
        }

        let snapshot = controls.snapshot();
        self.apply_transport(snapshot.transport);
        self.sync.reconcile(snapshot.is_playing, self.adapter.is_ready(), now);
        if let Some(progress) = self.sync.tick(now, &self.adapter) {
            log::trace!("session: {:.1}/{:.1}s", progress.current, progress.duration);
        }

        notices
    }

    /// Returns true when a session was created or torn down.
    fn ensure_session<C: MusicControls>(&mut self, controls: &mut C, notices: &mut Vec<String>) -> bool {
        let snapshot = controls.snapshot();
        let Some(track) = snapshot.current_track else {
            if self.adapter.loaded_track_id().is_none() {
                return false;
            }
            self.adapter.unload();
            self.sync.teardown();
            self.applied = None;
            return true;
        };

        // A failed track stays down until the user asks for it again, which
        // is the only way it can be current and playing.
        let failed = self.failed.contains(&track.id);
        if failed && snapshot.transport != TransportState::Playing {
            return false;
        }
        if !failed && self.adapter.loaded_track_id() == Some(track.id.as_str()) {
            return false;
        }

        self.failed.remove(&track.id);
        self.sync.teardown();
        self.applied = None;
        if let Err(e) = self.adapter.load(&track.id) {
            log::warn!("session: could not load {}: {e}", track.id);
            self.recover(controls, &track.id, &track.display(), e.code(), notices);
        }
        true
    }

    /// Returns true when the controller moved to another track.
    fn handle_events<C: MusicControls>(&mut self, controls: &mut C, notices: &mut Vec<String>) -> bool {
        for event in self.adapter.poll_events() {
            match event {
                AdapterEvent::Ready { duration } => {
                    self.failed.clear();
                    self.applied = None;
                    self.sync.on_ready(duration, &mut self.adapter);
                }
                AdapterEvent::StateChanged(WidgetState::Ended) => {
                    let before = position(&controls.snapshot());
                    controls.next_track();
                    if position(&controls.snapshot()) == before {
                        controls.pause_track();
                    }
                    // Playing again after the end needs a fresh play command.
                    self.applied = None;
                    // The rest of this batch belongs to the finished session.
                    return true;
                }
                AdapterEvent::StateChanged(state) => {
                    log::trace!("session: widget is {state:?}");
                }
                AdapterEvent::Error(code) => {
                    let Some(track) = controls.snapshot().current_track else {
                        continue;
                    };
                    self.recover(controls, &track.id, &track.display(), code, notices);
                    self.applied = None;
                    return true;
                }
            }
        }
        false
    }

    /// Apply the error policy after `track_id` failed.
    fn recover<C: MusicControls>(
        &mut self,
        controls: &mut C,
        track_id: &str,
        title: &str,
        code: WidgetErrorCode,
        notices: &mut Vec<String>,
    ) {
        self.failed.insert(track_id.to_string());

        if self.on_error == ErrorPolicy::Skip {
            let before = position(&controls.snapshot());
            controls.next_track();
            let after = controls.snapshot();
            let landed_on = after.current_track.as_ref().map(|t| t.id.as_str());
            if position(&after) != before && landed_on.is_some_and(|id| !self.failed.contains(id)) {
                log::info!("session: skipping {track_id} ({code})");
                notices.push(format!("Skipped {title}: {code}"));
                return;
            }
        }

        controls.pause_track();
        notices.push(format!("Cannot play {title}: {code}"));
    }

    fn apply_transport(&mut self, transport: TransportState) {
        if !self.adapter.is_ready() || self.applied == Some(transport) {
            return;
        }
        match transport {
            TransportState::Playing => self.adapter.play(),
            TransportState::Paused => self.adapter.pause(),
            TransportState::Stopped => {}
        }
        self.applied = Some(transport);
    }

    pub fn set_volume(&mut self, volume: u8) {
        self.sync.set_volume(volume, &mut self.adapter);
    }

    /// Step the volume by `delta` percent, saturating at 0 and 100.
    pub fn change_volume(&mut self, delta: i16) {
        let volume = (i16::from(self.sync.volume()) + delta).clamp(0, 100) as u8;
        self.set_volume(volume);
    }

    pub fn toggle_mute(&mut self) {
        self.sync.toggle_mute(&mut self.adapter);
    }

    pub fn seek_fraction(&mut self, fraction: f64) {
        self.sync.seek_fraction(fraction, &mut self.adapter);
    }

    pub fn seek_by(&mut self, delta_seconds: f64) {
        self.sync.seek_by(delta_seconds, &mut self.adapter);
    }

    /// Release the widget.
    pub fn shutdown(&mut self) {
        self.adapter.unload();
        self.sync.teardown();
        self.applied = None;
    }
}
