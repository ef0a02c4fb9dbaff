use std::time::Duration;

use crate::app::App;
use crate::catalog::{CatalogClient, CatalogError, CatalogWorker, FetchLimits};
use crate::config::{self, BackendSetting};
use crate::player::{FakeBackend, MprisBackend, PlayerAdapter, WidgetBackend};
use crate::sync::Synchronizer;

use super::session::SessionDriver;

/// The widget backend selected by `player.backend`.
pub fn build_backend(settings: &config::PlayerSettings) -> Box<dyn WidgetBackend> {
    match settings.backend {
        BackendSetting::Simulated => Box::new(FakeBackend::realtime(settings.simulated_duration_secs as f64)),
        BackendSetting::Mpris => Box::new(MprisBackend::new(
            settings.mpris_bus_name.clone(),
            settings.watch_url_base.clone(),
            Duration::from_millis(settings.mpris_sample_ms),
        )),
    }
}

pub fn build_driver(settings: &config::Settings) -> SessionDriver {
    let adapter = PlayerAdapter::new(build_backend(&settings.player));
    log::info!("player backend: {}", adapter.backend_name());
    let sync = Synchronizer::new(
        Duration::from_millis(settings.player.poll_interval_ms),
        settings.player.initial_volume,
    );
    SessionDriver::new(adapter, sync, settings.playback.on_error)
}

pub fn spawn_catalog(settings: &config::CatalogSettings) -> Result<CatalogWorker, CatalogError> {
    let client = CatalogClient::new(settings)?;
    log::info!("catalog: {}", settings.base_url);
    Ok(CatalogWorker::spawn(
        client,
        FetchLimits {
            search: settings.search_max_results,
            trending: settings.trending_max_results,
        },
    ))
}

/// Ask for the trending list and, when given, an initial search. The app
/// stays on the Trending view either way.
pub fn request_initial_feeds(app: &mut App, catalog: &mut CatalogWorker, initial_query: Option<&str>) {
    let id = catalog.trending();
    app.trending.begin(id);

    if let Some(query) = initial_query.map(str::trim).filter(|q| !q.is_empty()) {
        app.search_query = query.to_string();
        let id = catalog.search(query);
        app.search.begin(id);
    }
}
