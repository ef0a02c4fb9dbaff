//! Production widget: an external media player driven over MPRIS.
//!
//! The player named by `bus_name` (for example mpv with its MPRIS plugin,
//! which resolves video pages through yt-dlp) is told to open the video's
//! watch URL. A per-widget thread owns the D-Bus connection: it forwards
//! queued commands and samples `PlaybackStatus`, `Position` and the track
//! length, turning changes into widget events. Samples taken before the
//! player has switched to the requested URI are not reported.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use async_io::{Timer, block_on};
use zbus::proxy::CacheProperties;
use zbus::{Connection, Proxy};
use zvariant::{ObjectPath, OwnedObjectPath, OwnedValue};

use super::widget::{
    PlayerError, Widget, WidgetBackend, WidgetErrorCode, WidgetEvent, WidgetEventSink, WidgetState,
};

const MPRIS_PATH: &str = "/org/mpris/MediaPlayer2";
const PLAYER_IFACE: &str = "org.mpris.MediaPlayer2.Player";

pub struct MprisBackend {
    bus_name: String,
    watch_url_base: String,
    sample_every: Duration,
}

impl MprisBackend {
    pub fn new(bus_name: impl Into<String>, watch_url_base: impl Into<String>, sample_every: Duration) -> Self {
        Self {
            bus_name: bus_name.into(),
            watch_url_base: watch_url_base.into(),
            sample_every,
        }
    }
}

impl WidgetBackend for MprisBackend {
    fn name(&self) -> &'static str {
        "mpris"
    }

    fn create(&mut self, video_id: &str, events: WidgetEventSink) -> Result<Box<dyn Widget>, PlayerError> {
        if video_id.trim().is_empty() {
            return Err(PlayerError::Widget(WidgetErrorCode::InvalidParameter));
        }

        let uri = format!("{}{}", self.watch_url_base, video_id);
        let (tx, rx) = mpsc::channel::<MprisCmd>();
        let sampled = Arc::new(Mutex::new(Sampled::default()));

        let bus_name = self.bus_name.clone();
        let sample_every = self.sample_every;
        let sampled_for_thread = sampled.clone();
        let join = std::thread::Builder::new()
            .name("muse-mpris".to_string())
            .spawn(move || {
                block_on(drive_player(bus_name, uri, rx, sampled_for_thread, events, sample_every));
            })
            .map_err(|e| PlayerError::Unavailable(e.to_string()))?;

        Ok(Box::new(MprisWidget {
            tx,
            sampled,
            join: Some(join),
        }))
    }
}

#[derive(Debug)]
enum MprisCmd {
    Play,
    Pause,
    Seek(f64),
    Volume(u8),
    Quit,
}

impl MprisCmd {
    /// Player method for commands that take no arguments.
    fn method(&self) -> Option<&'static str> {
        match self {
            Self::Play => Some("Play"),
            Self::Pause => Some("Pause"),
            // Releasing the widget stops the player as well.
            Self::Quit => Some("Stop"),
            Self::Seek(_) | Self::Volume(_) => None,
        }
    }
}

#[derive(Debug, Default)]
struct Sampled {
    position: f64,
    length: f64,
    state: WidgetState,
}

struct MprisWidget {
    tx: Sender<MprisCmd>,
    sampled: Arc<Mutex<Sampled>>,
    join: Option<JoinHandle<()>>,
}

impl MprisWidget {
    fn send(&self, cmd: MprisCmd) {
        if self.tx.send(cmd).is_err() {
            log::debug!("mpris: widget thread already stopped");
        }
    }
}

impl Widget for MprisWidget {
    fn play_video(&mut self) {
        self.send(MprisCmd::Play);
    }

    fn pause_video(&mut self) {
        self.send(MprisCmd::Pause);
    }

    fn seek_to(&mut self, seconds: f64) {
        self.send(MprisCmd::Seek(seconds));
    }

    fn set_volume(&mut self, percent: u8) {
        self.send(MprisCmd::Volume(percent));
    }

    fn current_time(&self) -> f64 {
        self.sampled.lock().map(|s| s.position).unwrap_or(0.0)
    }

    fn duration(&self) -> f64 {
        self.sampled.lock().map(|s| s.length).unwrap_or(0.0)
    }

    fn player_state(&self) -> WidgetState {
        self.sampled.lock().map(|s| s.state).unwrap_or_default()
    }

    fn destroy(&mut self) {
        let _ = self.tx.send(MprisCmd::Quit);
        if let Some(handle) = self.join.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MprisWidget {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Map an MPRIS `PlaybackStatus` onto widget states. `Stopped` after the
/// video was ready means the player reached the end.
fn map_status(status: &str, ready: bool) -> WidgetState {
    match status {
        "Playing" => WidgetState::Playing,
        "Paused" => WidgetState::Paused,
        "Stopped" if ready => WidgetState::Ended,
        _ => WidgetState::Unstarted,
    }
}

fn micros_to_secs(micros: i64) -> f64 {
    micros.max(0) as f64 / 1_000_000.0
}

fn metadata_length(metadata: &HashMap<String, OwnedValue>) -> Option<i64> {
    let value = metadata.get("mpris:length")?;
    value
        .downcast_ref::<i64>()
        .ok()
        .or_else(|| value.downcast_ref::<u64>().ok().map(|v| v as i64))
}

fn metadata_track_id(metadata: &HashMap<String, OwnedValue>) -> Option<OwnedObjectPath> {
    let path = metadata.get("mpris:trackid")?.downcast_ref::<ObjectPath>().ok()?;
    Some(OwnedObjectPath::from(path.into_owned()))
}

fn metadata_url(metadata: &HashMap<String, OwnedValue>) -> Option<String> {
    metadata.get("xesam:url")?.downcast_ref::<String>().ok()
}

/// Whether `metadata` describes the video we asked for rather than
/// whatever the player held before `OpenUri`. Players that do not report
/// a URL are judged by a change of track id.
fn describes_requested(
    metadata: &HashMap<String, OwnedValue>,
    uri: &str,
    previous_track_id: Option<&OwnedObjectPath>,
) -> bool {
    match metadata_url(metadata) {
        Some(url) => url == uri,
        None => metadata_track_id(metadata).is_some_and(|id| Some(&id) != previous_track_id),
    }
}

/// Properties are read fresh on every sample: `Position` never announces
/// its changes, so a cached value would stay frozen.
async fn player_proxy(connection: &Connection, bus_name: &str) -> zbus::Result<Proxy<'static>> {
    zbus::proxy::Builder::<Proxy<'static>>::new(connection)
        .destination(bus_name.to_owned())?
        .path(MPRIS_PATH)?
        .interface(PLAYER_IFACE)?
        .cache_properties(CacheProperties::No)
        .build()
        .await
}

async fn drive_player(
    bus_name: String,
    uri: String,
    rx: Receiver<MprisCmd>,
    sampled: Arc<Mutex<Sampled>>,
    events: WidgetEventSink,
    sample_every: Duration,
) {
    let connection = match Connection::session().await {
        Ok(c) => c,
        Err(e) => {
            log::error!("mpris: failed to connect to session bus: {e}");
            events.emit(WidgetEvent::Error(WidgetErrorCode::Unavailable));
            return;
        }
    };

    let player = match player_proxy(&connection, &bus_name).await {
        Ok(p) => p,
        Err(e) => {
            log::error!("mpris: no player at {bus_name}: {e}");
            events.emit(WidgetEvent::Error(WidgetErrorCode::Unavailable));
            return;
        }
    };

    let previous_track_id = player
        .get_property::<HashMap<String, OwnedValue>>("Metadata")
        .await
        .ok()
        .as_ref()
        .and_then(metadata_track_id);

    if let Err(e) = player.call::<_, _, ()>("OpenUri", &(uri.as_str(),)).await {
        log::error!("mpris: {bus_name} refused {uri}: {e}");
        events.emit(WidgetEvent::Error(WidgetErrorCode::PlaybackFailed));
        return;
    }
    log::info!("mpris: {bus_name} opening {uri}");

    let mut ready = false;
    let mut last_state = WidgetState::Unstarted;
    let mut track_id: Option<OwnedObjectPath> = None;

    loop {
        while let Ok(cmd) = rx.try_recv() {
            let result = match &cmd {
                MprisCmd::Seek(seconds) => match &track_id {
                    Some(id) => {
                        let micros = (seconds.max(0.0) * 1_000_000.0) as i64;
                        player.call::<_, _, ()>("SetPosition", &(id.clone(), micros)).await
                    }
                    None => Ok(()),
                },
                MprisCmd::Volume(percent) => player
                    .set_property("Volume", f64::from(*percent) / 100.0)
                    .await
                    .map_err(zbus::Error::from),
                other => match other.method() {
                    Some(method) => player.call::<_, _, ()>(method, &()).await,
                    None => Ok(()),
                },
            };
            if let Err(e) = result {
                log::warn!("mpris: {cmd:?} failed: {e}");
            }
            if matches!(cmd, MprisCmd::Quit) {
                log::debug!("mpris: releasing {bus_name}");
                return;
            }
        }

        let status = player.get_property::<String>("PlaybackStatus").await;
        let position = player.get_property::<i64>("Position").await;
        let metadata = player.get_property::<HashMap<String, OwnedValue>>("Metadata").await;

        let Ok(status) = status else {
            log::warn!("mpris: {bus_name} went away");
            events.emit(WidgetEvent::Error(WidgetErrorCode::Unavailable));
            return;
        };

        let metadata = metadata
            .ok()
            .filter(|m| describes_requested(m, &uri, previous_track_id.as_ref()));
        let Some(metadata) = metadata else {
            log::trace!("mpris: {bus_name} has not switched to {uri} yet");
            Timer::after(sample_every).await;
            continue;
        };

        let length = metadata_length(&metadata).map(micros_to_secs).unwrap_or(0.0);
        if let Some(id) = metadata_track_id(&metadata) {
            track_id = Some(id);
        }

        if !ready && length > 0.0 {
            ready = true;
        }
        // Only a track we saw start can have ended.
        let state = map_status(&status, ready && last_state != WidgetState::Unstarted);

        if let Ok(mut s) = sampled.lock() {
            s.position = position.map(micros_to_secs).unwrap_or(s.position);
            s.length = length;
            s.state = state;
        }

        // Ready goes out after the sample so the duration is already readable.
        if ready && last_state == WidgetState::Unstarted && state != WidgetState::Unstarted {
            events.emit(WidgetEvent::Ready);
        }
        if state != last_state {
            events.emit(WidgetEvent::StateChange(state));
            last_state = state;
        }

        Timer::after(sample_every).await;
    }
}
