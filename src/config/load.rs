use std::{env, path::PathBuf};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` tries environment variables first (prefix `MUSE__`), then an
/// optional config file and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("MUSE")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.catalog.base_url.trim().is_empty() {
            return Err("catalog.base_url must not be empty".to_string());
        }
        if self.player.poll_interval_ms == 0 {
            return Err("player.poll_interval_ms must be >= 1".to_string());
        }
        if self.player.mpris_sample_ms == 0 {
            return Err("player.mpris_sample_ms must be >= 1".to_string());
        }
        if self.player.simulated_duration_secs == 0 {
            return Err("player.simulated_duration_secs must be >= 1".to_string());
        }
        if self.player.initial_volume > 100 {
            return Err("player.initial_volume must be <= 100".to_string());
        }
        Ok(())
    }

    /// The defaults rendered as a config file.
    pub fn default_toml() -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(&Settings::default())
    }
}

/// Resolve the config path from `MUSE_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("MUSE_CONFIG_PATH") {
        let p = PathBuf::from(p);
        return Some(p);
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/muse/config.toml`
/// or `~/.config/muse/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else if let Some(home) = env::var_os("HOME") {
        Some(PathBuf::from(home).join(".config"))
    } else {
        None
    };

    config_home.map(|d| d.join("muse").join("config.toml"))
}

/// Compute the default log file under `$XDG_STATE_HOME/muse/muse.log`
/// or `~/.local/state/muse/muse.log`.
pub fn default_log_path() -> Option<PathBuf> {
    let state_home = if let Some(xdg) = env::var_os("XDG_STATE_HOME") {
        Some(PathBuf::from(xdg))
    } else if let Some(home) = env::var_os("HOME") {
        Some(PathBuf::from(home).join(".local").join("state"))
    } else {
        None
    };

    state_home.map(|d| d.join("muse").join("muse.log"))
}
