use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/muse/config.toml` or `~/.config/muse/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `MUSE__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub catalog: CatalogSettings,
    pub player: PlayerSettings,
    pub playback: PlaybackSettings,
    pub ui: UiSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Root of the catalog proxy API, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout (milliseconds).
    pub timeout_ms: u64,
    pub search_max_results: u32,
    pub trending_max_results: u32,
    /// When set, the Trending view lists this video category instead of the
    /// overall chart (`10` is Music on the platform).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trending_category: Option<String>,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            timeout_ms: 10_000,
            search_max_results: 10,
            trending_max_results: 20,
            trending_category: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// Which widget implementation plays videos.
    pub backend: BackendSetting,
    /// Bus name of the MPRIS player driven by the `mpris` backend.
    pub mpris_bus_name: String,
    /// Prefix joined with a video id to form the URI handed to the player.
    pub watch_url_base: String,
    /// How often the `mpris` backend samples the player (milliseconds).
    pub mpris_sample_ms: u64,
    /// Length of every video played by the `simulated` backend (seconds).
    pub simulated_duration_secs: u64,
    /// Progress polling period (milliseconds).
    pub poll_interval_ms: u64,
    /// Volume at startup, 0..=100.
    pub initial_volume: u8,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            backend: BackendSetting::Simulated,
            mpris_bus_name: "org.mpris.MediaPlayer2.mpv".to_string(),
            watch_url_base: "https://www.youtube.com/watch?v=".to_string(),
            mpris_sample_ms: 250,
            simulated_duration_secs: 210,
            poll_interval_ms: 1000,
            initial_volume: 100,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendSetting {
    #[serde(alias = "fake", alias = "sim")]
    Simulated,
    #[serde(alias = "dbus", alias = "mpv")]
    Mpris,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// How `next` / `previous` pick the following track.
    pub advance: AdvanceMode,
    /// What to do when the player reports an error.
    pub on_error: ErrorPolicy,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdvanceMode {
    /// Prefer a random track by the same artist, then any other track.
    #[default]
    #[serde(alias = "random", alias = "same-artist", alias = "same_artist")]
    Discovery,
    /// Step through the playlist in order and stop at either end.
    #[serde(alias = "in-order", alias = "in_order", alias = "linear")]
    Sequential,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorPolicy {
    /// Move on to the next track.
    #[default]
    #[serde(alias = "next")]
    Skip,
    /// Pause and leave the failed track selected.
    #[serde(alias = "pause")]
    Stop,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
    /// Number of seconds to scrub when pressing `H` / `L`.
    pub scrub_seconds: u64,
    /// Volume change per `+` / `-` press.
    pub volume_step: u8,
    /// How long status messages stay on screen (milliseconds).
    pub toast_ms: u64,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ muse: find it, play it ~ ".to_string(),
            scrub_seconds: 5,
            volume_step: 5,
            toast_ms: 3000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log file; defaults to `$XDG_STATE_HOME/muse/muse.log`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// Filter used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file: None,
            level: "info".to_string(),
        }
    }
}
