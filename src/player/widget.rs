//! The control surface every embeddable player widget must provide.
//!
//! A widget is constructed for exactly one video id and reports its
//! lifecycle through the `WidgetEventSink` it was created with. Anything
//! that can play a video id (an embedded web player, an external media
//! player on the session bus, a simulation) plugs in by implementing
//! `Widget` and `WidgetBackend`.

use std::fmt;
use std::sync::mpsc::Sender;

/// Player states as numbered by the embedded-player platform.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum WidgetState {
    #[default]
    Unstarted,
    Ended,
    Playing,
    Paused,
    Buffering,
    Cued,
}

impl WidgetState {
    pub fn code(self) -> i32 {
        match self {
            Self::Unstarted => -1,
            Self::Ended => 0,
            Self::Playing => 1,
            Self::Paused => 2,
            Self::Buffering => 3,
            Self::Cued => 5,
        }
    }
}

/// Error codes a widget can report.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WidgetErrorCode {
    /// 2: the video id is malformed.
    InvalidParameter,
    /// 5: the player could not play the stream.
    PlaybackFailed,
    /// 100: removed or private.
    NotFound,
    /// 101 / 150: the owner disallows embedded playback.
    EmbeddingNotAllowed(i32),
    /// The backend itself could not be reached.
    Unavailable,
}

impl WidgetErrorCode {
    pub fn from_code(code: i32) -> Self {
        match code {
            2 => Self::InvalidParameter,
            5 => Self::PlaybackFailed,
            100 => Self::NotFound,
            101 | 150 => Self::EmbeddingNotAllowed(code),
            _ => Self::Unavailable,
        }
    }
}

impl fmt::Display for WidgetErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter => write!(f, "invalid video id"),
            Self::PlaybackFailed => write!(f, "playback failed"),
            Self::NotFound => write!(f, "video not found"),
            Self::EmbeddingNotAllowed(_) => write!(f, "playback not allowed here"),
            Self::Unavailable => write!(f, "player unavailable"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    #[error("player backend unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Dbus(#[from] zbus::Error),
    #[error("{0}")]
    Widget(WidgetErrorCode),
}

impl PlayerError {
    /// The widget-level code the rest of the app reacts to.
    pub fn code(&self) -> WidgetErrorCode {
        match self {
            Self::Widget(code) => *code,
            Self::Unavailable(_) | Self::Dbus(_) => WidgetErrorCode::Unavailable,
        }
    }
}

/// Lifecycle notifications raised by a widget.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetEvent {
    /// The widget accepts commands and knows its duration.
    Ready,
    StateChange(WidgetState),
    Error(WidgetErrorCode),
}

/// Callback handle given to a widget at construction.
///
/// Events are tagged with the session that created the widget so the
/// adapter can drop anything a destroyed widget still manages to emit.
#[derive(Debug, Clone)]
pub struct WidgetEventSink {
    session: u64,
    tx: Sender<(u64, WidgetEvent)>,
}

impl WidgetEventSink {
    pub(crate) fn new(session: u64, tx: Sender<(u64, WidgetEvent)>) -> Self {
        Self { session, tx }
    }

    pub fn emit(&self, event: WidgetEvent) {
        // The adapter may already be gone during shutdown.
        let _ = self.tx.send((self.session, event));
    }
}

/// One live player instance bound to a single video id.
pub trait Widget {
    fn play_video(&mut self);
    fn pause_video(&mut self);
    /// Seek to an absolute position in seconds. Range checks are up to the widget.
    fn seek_to(&mut self, seconds: f64);
    /// Volume in percent, 0..=100.
    fn set_volume(&mut self, percent: u8);
    fn current_time(&self) -> f64;
    /// Seconds, or 0 while unknown.
    fn duration(&self) -> f64;
    fn player_state(&self) -> WidgetState;
    /// Release the underlying player. No events are emitted afterwards.
    fn destroy(&mut self);
}

/// Constructs widgets for video ids.
pub trait WidgetBackend {
    fn name(&self) -> &'static str;
    fn create(&mut self, video_id: &str, events: WidgetEventSink) -> Result<Box<dyn Widget>, PlayerError>;
}
