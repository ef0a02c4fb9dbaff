use std::sync::mpsc::{self, Receiver, Sender};

use super::widget::{
    PlayerError, Widget, WidgetBackend, WidgetErrorCode, WidgetEvent, WidgetEventSink, WidgetState,
};

/// What the adapter reports to its owner.
#[derive(Debug, Clone, PartialEq)]
pub enum AdapterEvent {
    Ready { duration: f64 },
    StateChanged(WidgetState),
    Error(WidgetErrorCode),
}

struct Session {
    id: u64,
    track_id: String,
    widget: Box<dyn Widget>,
    ready: bool,
}

/// Bridge between the playback model and exactly one live widget.
///
/// The adapter owns the widget; nothing else may call widget operations.
/// It never advances the playlist itself: whoever owns it must react to
/// `StateChanged(Ended)`.
pub struct PlayerAdapter {
    backend: Box<dyn WidgetBackend>,
    session: Option<Session>,
    last_session_id: u64,
    events_tx: Sender<(u64, WidgetEvent)>,
    events_rx: Receiver<(u64, WidgetEvent)>,
}

impl PlayerAdapter {
    pub fn new(backend: Box<dyn WidgetBackend>) -> Self {
        let (events_tx, events_rx) = mpsc::channel();
        Self {
            backend,
            session: None,
            last_session_id: 0,
            events_tx,
            events_rx,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Replace the current widget with a fresh one bound to `track_id`.
    ///
    /// The previous widget is destroyed before the new one is created.
    pub fn load(&mut self, track_id: &str) -> Result<(), PlayerError> {
        self.unload();

        self.last_session_id += 1;
        let id = self.last_session_id;
        let sink = WidgetEventSink::new(id, self.events_tx.clone());

        log::info!("player: loading {track_id} via {} (session {id})", self.backend.name());
        let widget = self.backend.create(track_id, sink)?;
        self.session = Some(Session {
            id,
            track_id: track_id.to_string(),
            widget,
            ready: false,
        });
        Ok(())
    }

    /// Destroy the current widget, if any.
    pub fn unload(&mut self) {
        if let Some(mut session) = self.session.take() {
            log::debug!("player: destroying session {} ({})", session.id, session.track_id);
            session.widget.destroy();
        }
    }

    pub fn loaded_track_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.track_id.as_str())
    }

    pub fn is_ready(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.ready)
    }

    fn ready_widget(&mut self) -> Option<&mut Box<dyn Widget>> {
        self.session
            .as_mut()
            .filter(|s| s.ready)
            .map(|s| &mut s.widget)
    }

    pub fn play(&mut self) {
        if let Some(widget) = self.ready_widget() {
            widget.play_video();
        }
    }

    pub fn pause(&mut self) {
        if let Some(widget) = self.ready_widget() {
            widget.pause_video();
        }
    }

    pub fn seek(&mut self, seconds: f64) {
        if let Some(widget) = self.ready_widget() {
            widget.seek_to(seconds);
        }
    }

    pub fn set_volume(&mut self, percent: u8) {
        if let Some(widget) = self.ready_widget() {
            widget.set_volume(percent.min(100));
        }
    }

    pub fn current_time(&self) -> f64 {
        match &self.session {
            Some(s) if s.ready => s.widget.current_time(),
            _ => 0.0,
        }
    }

    pub fn duration(&self) -> f64 {
        match &self.session {
            Some(s) if s.ready => s.widget.duration(),
            _ => 0.0,
        }
    }

    pub fn state(&self) -> WidgetState {
        self.session
            .as_ref()
            .map(|s| s.widget.player_state())
            .unwrap_or_default()
    }

    /// Drain the events raised by the current widget since the last call.
    ///
    /// Events from destroyed widgets are discarded.
    pub fn poll_events(&mut self) -> Vec<AdapterEvent> {
        let mut out = Vec::new();

        while let Ok((session_id, event)) = self.events_rx.try_recv() {
            let Some(session) = self.session.as_mut() else {
                continue;
            };
            if session_id != session.id {
                log::trace!("player: dropping {event:?} from stale session {session_id}");
                continue;
            }

            match event {
                WidgetEvent::Ready => {
                    session.ready = true;
                    let duration = session.widget.duration();
                    log::debug!("player: {} ready, duration {duration:.1}s", session.track_id);
                    out.push(AdapterEvent::Ready { duration });
                }
                WidgetEvent::StateChange(state) => {
                    log::debug!("player: {} state {state:?} ({})", session.track_id, state.code());
                    out.push(AdapterEvent::StateChanged(state));
                }
                WidgetEvent::Error(code) => {
                    log::warn!("player: {} reported {code}", session.track_id);
                    out.push(AdapterEvent::Error(code));
                }
            }
        }

        out
    }
}

impl Drop for PlayerAdapter {
    fn drop(&mut self) {
        self.unload();
    }
}
