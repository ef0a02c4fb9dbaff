use std::path::Path;

use crate::config::{self, Settings};

/// Settings to run with, plus a warning when the loaded ones were unusable.
///
/// A bad config never stops startup; muse falls back to the defaults.
pub fn settings_or_default(
    loaded: Result<Settings, ::config::ConfigError>,
    source: Option<&Path>,
) -> (Settings, Option<String>) {
    let source = source
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "environment".to_string());

    match loaded.map_err(|e| e.to_string()).and_then(|s| s.validate().map(|()| s)) {
        Ok(settings) => (settings, None),
        Err(reason) => (
            Settings::default(),
            Some(format!("ignoring config from {source} ({reason}); using defaults")),
        ),
    }
}

pub fn load_settings() -> Settings {
    let path = config::resolve_config_path();
    let (settings, warning) = settings_or_default(Settings::load(), path.as_deref());
    if let Some(warning) = warning {
        // The logger is configured from these settings, so this goes to stderr.
        eprintln!("muse: {warning}");
    }
    settings
}
