//! A simulated widget.
//!
//! Reports ready as soon as it is created, with a fixed duration. Playback
//! position only moves while playing: driven by `FakeControl::advance` on the
//! manual clock, or by wall time with `FakeBackend::realtime`. Every command
//! is recorded so callers can check what reached the widget.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use super::widget::{
    PlayerError, Widget, WidgetBackend, WidgetErrorCode, WidgetEvent, WidgetEventSink, WidgetState,
};

/// A command as received by a fake widget.
#[derive(Debug, Clone, PartialEq)]
pub enum FakeCall {
    Create(String),
    Play,
    Pause,
    Seek(f64),
    Volume(u8),
    Destroy(String),
}

#[derive(Debug, Default)]
struct FakeState {
    calls: Vec<FakeCall>,
    sinks: Vec<WidgetEventSink>,
    live: usize,
    state: WidgetState,
    position: f64,
    duration: f64,
    playing_since: Option<Instant>,
    volume: Option<u8>,
    fail_next_load: Option<WidgetErrorCode>,
}

impl FakeState {
    fn latest_sink(&self) -> Option<&WidgetEventSink> {
        self.sinks.last()
    }

    fn end(&mut self) {
        self.position = self.duration;
        self.playing_since = None;
        self.state = WidgetState::Ended;
        if let Some(sink) = self.latest_sink() {
            sink.emit(WidgetEvent::StateChange(WidgetState::Ended));
        }
    }
}

/// Test and simulation handle onto every widget a `FakeBackend` creates.
#[derive(Debug, Clone, Default)]
pub struct FakeControl {
    inner: Arc<Mutex<FakeState>>,
}

impl FakeControl {
    fn lock(&self) -> MutexGuard<'_, FakeState> {
        // A panic while holding the lock only happens in a failing test.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn calls(&self) -> Vec<FakeCall> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Widgets created and not yet destroyed.
    pub fn live_widgets(&self) -> usize {
        self.lock().live
    }

    /// Last volume pushed to any widget.
    pub fn volume(&self) -> Option<u8> {
        self.lock().volume
    }

    pub fn state(&self) -> WidgetState {
        self.lock().state
    }

    /// Move the playback position forward while playing; ends the track when
    /// the duration is reached.
    pub fn advance(&self, seconds: f64) {
        let mut s = self.lock();
        if s.state != WidgetState::Playing {
            return;
        }
        s.position = (s.position + seconds).min(s.duration);
        if s.position >= s.duration {
            s.end();
        }
    }

    /// Jump to the end of the current video.
    pub fn finish(&self) {
        self.lock().end();
    }

    /// Make the current widget report a platform error code.
    pub fn fail(&self, code: i32) {
        let s = self.lock();
        if let Some(sink) = s.latest_sink() {
            sink.emit(WidgetEvent::Error(WidgetErrorCode::from_code(code)));
        }
    }

    /// Make the next widget construction fail with a platform error code.
    pub fn fail_next_load(&self, code: i32) {
        self.lock().fail_next_load = Some(WidgetErrorCode::from_code(code));
    }

    /// Emit an event through the sink of the `nth` widget ever created.
    pub fn emit_from(&self, nth: usize, event: WidgetEvent) {
        let s = self.lock();
        if let Some(sink) = s.sinks.get(nth) {
            sink.emit(event);
        }
    }
}

pub struct FakeBackend {
    duration: f64,
    realtime: bool,
    control: FakeControl,
}

impl FakeBackend {
    /// Widgets whose clock only moves through `FakeControl::advance`.
    pub fn new(duration_secs: f64) -> Self {
        Self {
            duration: duration_secs,
            realtime: false,
            control: FakeControl::default(),
        }
    }

    /// Widgets whose clock follows wall time while playing.
    pub fn realtime(duration_secs: f64) -> Self {
        Self {
            realtime: true,
            ..Self::new(duration_secs)
        }
    }

    pub fn control(&self) -> FakeControl {
        self.control.clone()
    }
}

impl WidgetBackend for FakeBackend {
    fn name(&self) -> &'static str {
        "simulated"
    }

    fn create(&mut self, video_id: &str, events: WidgetEventSink) -> Result<Box<dyn Widget>, PlayerError> {
        {
            let mut s = self.control.lock();
            s.calls.push(FakeCall::Create(video_id.to_string()));
            if let Some(code) = s.fail_next_load.take() {
                return Err(PlayerError::Widget(code));
            }

            s.sinks.push(events.clone());
            s.live += 1;
            s.state = WidgetState::Unstarted;
            s.position = 0.0;
            s.duration = self.duration;
            s.playing_since = None;
        }

        events.emit(WidgetEvent::Ready);

        Ok(Box::new(FakeWidget {
            video_id: video_id.to_string(),
            control: self.control.clone(),
            events,
            duration: self.duration,
            realtime: self.realtime,
            destroyed: false,
        }))
    }
}

struct FakeWidget {
    video_id: String,
    control: FakeControl,
    events: WidgetEventSink,
    duration: f64,
    realtime: bool,
    destroyed: bool,
}

impl FakeWidget {
    fn position(&self, s: &FakeState) -> f64 {
        let mut position = s.position;
        if self.realtime {
            if let Some(since) = s.playing_since {
                position += since.elapsed().as_secs_f64();
            }
        }
        position.min(self.duration)
    }
}

impl Widget for FakeWidget {
    fn play_video(&mut self) {
        if self.destroyed {
            return;
        }
        let mut s = self.control.lock();
        s.calls.push(FakeCall::Play);
        if s.state == WidgetState::Playing {
            return;
        }
        if s.state == WidgetState::Ended {
            s.position = 0.0;
        }
        s.state = WidgetState::Playing;
        s.playing_since = Some(Instant::now());
        self.events.emit(WidgetEvent::StateChange(WidgetState::Playing));
    }

    fn pause_video(&mut self) {
        if self.destroyed {
            return;
        }
        let mut s = self.control.lock();
        s.calls.push(FakeCall::Pause);
        if s.state != WidgetState::Playing {
            return;
        }
        s.position = self.position(&s);
        s.playing_since = None;
        s.state = WidgetState::Paused;
        self.events.emit(WidgetEvent::StateChange(WidgetState::Paused));
    }

    fn seek_to(&mut self, seconds: f64) {
        if self.destroyed {
            return;
        }
        let mut s = self.control.lock();
        s.calls.push(FakeCall::Seek(seconds));
        s.position = seconds.clamp(0.0, self.duration);
        if s.playing_since.is_some() {
            s.playing_since = Some(Instant::now());
        }
    }

    fn set_volume(&mut self, percent: u8) {
        if self.destroyed {
            return;
        }
        let mut s = self.control.lock();
        s.calls.push(FakeCall::Volume(percent));
        s.volume = Some(percent);
    }

    fn current_time(&self) -> f64 {
        if self.destroyed {
            return 0.0;
        }
        let mut s = self.control.lock();
        let position = self.position(&s);
        if s.state == WidgetState::Playing && position >= self.duration {
            s.end();
        }
        position
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn player_state(&self) -> WidgetState {
        if self.destroyed {
            return WidgetState::Unstarted;
        }
        self.control.lock().state
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        let mut s = self.control.lock();
        s.calls.push(FakeCall::Destroy(self.video_id.clone()));
        s.live = s.live.saturating_sub(1);
        s.playing_since = None;
    }
}
