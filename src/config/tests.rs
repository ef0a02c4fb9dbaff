use super::load::{default_config_path, default_log_path, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap()
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_muse_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("MUSE_CONFIG_PATH", "/tmp/muse-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/muse-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("muse")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("muse")
            .join("config.toml")
    );
}

#[test]
fn default_log_path_uses_state_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_STATE_HOME", "/tmp/xdg-state");
    assert_eq!(
        default_log_path().unwrap(),
        std::path::PathBuf::from("/tmp/xdg-state").join("muse").join("muse.log")
    );

    let _g2 = EnvGuard::remove("XDG_STATE_HOME");
    let _g3 = EnvGuard::set("HOME", "/tmp/home-dir");
    assert_eq!(
        default_log_path().unwrap(),
        std::path::PathBuf::from("/tmp/home-dir/.local/state/muse/muse.log")
    );
}

#[test]
fn settings_load_from_config_file_and_parse_enum_aliases() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[catalog]
base_url = "https://muse.example/api"
timeout_ms = 2500
search_max_results = 25
trending_category = "10"

[player]
backend = "mpv"
mpris_bus_name = "org.mpris.MediaPlayer2.vlc"
poll_interval_ms = 500
initial_volume = 40

[playback]
advance = "in-order"
on_error = "pause"

[ui]
header_text = "hello"
scrub_seconds = 9
volume_step = 10

[logging]
file = "/tmp/muse.log"
level = "debug"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("MUSE_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("MUSE__CATALOG__BASE_URL");

    let s = Settings::load().unwrap();
    assert_eq!(s.catalog.base_url, "https://muse.example/api");
    assert_eq!(s.catalog.timeout_ms, 2500);
    assert_eq!(s.catalog.search_max_results, 25);
    assert_eq!(s.catalog.trending_max_results, 20);
    assert_eq!(s.catalog.trending_category.as_deref(), Some("10"));
    assert_eq!(s.player.backend, BackendSetting::Mpris);
    assert_eq!(s.player.mpris_bus_name, "org.mpris.MediaPlayer2.vlc");
    assert_eq!(s.player.poll_interval_ms, 500);
    assert_eq!(s.player.initial_volume, 40);
    assert_eq!(s.player.simulated_duration_secs, 210);
    assert_eq!(s.playback.advance, AdvanceMode::Sequential);
    assert_eq!(s.playback.on_error, ErrorPolicy::Stop);
    assert_eq!(s.ui.header_text, "hello");
    assert_eq!(s.ui.scrub_seconds, 9);
    assert_eq!(s.ui.volume_step, 10);
    assert_eq!(s.ui.toast_ms, 3000);
    assert_eq!(s.logging.file, Some(std::path::PathBuf::from("/tmp/muse.log")));
    assert_eq!(s.logging.level, "debug");
    assert!(s.validate().is_ok());
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[catalog]
base_url = "https://from-file.example/api"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("MUSE_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("MUSE__CATALOG__BASE_URL", "https://from-env.example/api");

    let s = Settings::load().unwrap();
    assert_eq!(s.catalog.base_url, "https://from-env.example/api");
}

#[test]
fn missing_config_file_yields_defaults() {
    let _lock = env_lock();
    let dir = tempfile::tempdir().unwrap();
    let _g1 = EnvGuard::set(
        "MUSE_CONFIG_PATH",
        dir.path().join("absent.toml").to_str().unwrap(),
    );

    let s = Settings::load().unwrap();
    assert_eq!(s.catalog.base_url, "http://localhost:5000/api");
    assert_eq!(s.player.backend, BackendSetting::Simulated);
    assert_eq!(s.playback.advance, AdvanceMode::Discovery);
    assert_eq!(s.playback.on_error, ErrorPolicy::Skip);
}

#[test]
fn validate_rejects_unusable_values() {
    let mut s = Settings::default();
    assert!(s.validate().is_ok());

    s.player.poll_interval_ms = 0;
    assert!(s.validate().unwrap_err().contains("poll_interval_ms"));

    let mut s = Settings::default();
    s.player.initial_volume = 101;
    assert!(s.validate().unwrap_err().contains("initial_volume"));

    let mut s = Settings::default();
    s.catalog.base_url = "  ".to_string();
    assert!(s.validate().unwrap_err().contains("base_url"));

    let mut s = Settings::default();
    s.player.simulated_duration_secs = 0;
    assert!(s.validate().is_err());
}

#[test]
fn default_toml_parses_back_to_defaults() {
    let text = Settings::default_toml().unwrap();
    assert!(text.contains("[catalog]"));
    assert!(text.contains("backend = \"simulated\""));
    assert!(!text.contains("trending_category"));

    let parsed: Settings = toml::from_str(&text).unwrap();
    assert_eq!(parsed.player.poll_interval_ms, 1000);
    assert_eq!(parsed.playback.advance, AdvanceMode::Discovery);
}
