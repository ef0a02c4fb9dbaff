use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, View};
use crate::catalog::{CatalogReply, CatalogWorker};
use crate::config;
use crate::playback::{MusicControls, TransportState};
use crate::ui;

use super::session::SessionDriver;

/// State tracked by the runtime event loop across iterations.
#[derive(Debug, Default)]
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
}

/// Main terminal event loop: drains catalog replies, keeps the player
/// session in step with the controller, draws, and handles input. Returns
/// `Ok(())` when shutdown is requested.
pub fn run<C: MusicControls>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    controls: &mut C,
    driver: &mut SessionDriver,
    catalog: &mut CatalogWorker,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    let toast_ttl = Duration::from_millis(settings.ui.toast_ms);

    loop {
        let now = Instant::now();

        while let Some(reply) = catalog.try_recv() {
            handle_catalog_reply(reply, app);
        }

        for notice in driver.drive(controls, now) {
            app.show_toast(notice, now, toast_ttl);
        }
        app.set_playback(controls.snapshot());
        app.expire_toast(now);

        terminal.draw(|f| ui::draw(f, app, driver, &settings.ui, now))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, controls, driver, catalog, state, Instant::now()) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Route a finished catalog request into the app model.
///
/// Failures are logged in full and shown as a generic line.
pub fn handle_catalog_reply(reply: CatalogReply, app: &mut App) {
    let (kind, id, accepted) = match reply {
        CatalogReply::Trending { id, result } => {
            let result = result.map_err(|e| {
                log::warn!("trending request {id} failed: {e}");
                "Failed to load trending songs".to_string()
            });
            ("trending", id, app.accept_trending(id, result))
        }
        CatalogReply::Search { id, result } => {
            let result = result.map_err(|e| {
                log::warn!("search request {id} failed: {e}");
                "Failed to search for songs".to_string()
            });
            ("search", id, app.accept_search(id, result))
        }
        CatalogReply::Details { id, result } => {
            let result = result.map_err(|e| {
                log::warn!("details request {id} failed: {e}");
                "Failed to load video details".to_string()
            });
            ("details", id, app.accept_details(id, result))
        }
    };
    if !accepted {
        log::debug!("dropping stale {kind} reply {id}");
    }
}

fn play_selected<C: MusicControls>(app: &App, controls: &mut C) {
    if let Some((track, list)) = app.play_request() {
        controls.play_track(track, list);
    }
}

/// Handle one key press. Returns true when the user asked to quit.
#[allow(clippy::too_many_arguments)]
pub fn handle_key_event<C: MusicControls>(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    controls: &mut C,
    driver: &mut SessionDriver,
    catalog: &mut CatalogWorker,
    state: &mut EventLoopState,
    now: Instant,
) -> bool {
    if app.is_typing() {
        state.pending_gg = false;
        match key.code {
            KeyCode::Esc => app.cancel_input(),
            KeyCode::Backspace => app.pop_input_char(),
            KeyCode::Enter => {
                if let Some(query) = app.submit_input() {
                    let id = catalog.search(&query);
                    app.search.begin(id);
                }
            }
            KeyCode::Char(c) => {
                if !c.is_control() {
                    app.push_input_char(c);
                }
            }
            _ => {}
        }
        return false;
    }

    if key.code != KeyCode::Char('g') {
        state.pending_gg = false;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('/') => app.begin_input(),
        KeyCode::Tab => app.cycle_view(),
        KeyCode::Esc => app.close_details(),
        KeyCode::Char('t') => {
            let id = catalog.trending();
            app.trending.begin(id);
            app.show_view(View::Trending);
        }
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                app.set_selected(0);
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => app.set_selected(usize::MAX),
        KeyCode::Char('j') | KeyCode::Down => app.next(),
        KeyCode::Char('k') | KeyCode::Up => app.prev(),
        KeyCode::Enter => play_selected(app, controls),
        KeyCode::Char('a') => {
            if let Some(track) = app.selected_track().cloned() {
                let text = format!("Added {} to playlist", track.display());
                controls.add_to_playlist(track);
                app.show_toast(text, now, Duration::from_millis(settings.ui.toast_ms));
            }
        }
        KeyCode::Char('p') | KeyCode::Char(' ') => match controls.snapshot().transport {
            TransportState::Playing => controls.pause_track(),
            TransportState::Paused => controls.resume_playback(),
            TransportState::Stopped => play_selected(app, controls),
        },
        KeyCode::Char('l') => controls.next_track(),
        KeyCode::Char('h') => controls.previous_track(),
        KeyCode::Char('L') => driver.seek_by(settings.ui.scrub_seconds as f64),
        KeyCode::Char('H') => driver.seek_by(-(settings.ui.scrub_seconds as f64)),
        KeyCode::Char('+') | KeyCode::Char('=') => driver.change_volume(i16::from(settings.ui.volume_step)),
        KeyCode::Char('-') => driver.change_volume(-i16::from(settings.ui.volume_step)),
        KeyCode::Char('m') => driver.toggle_mute(),
        KeyCode::Char(c @ '0'..='9') => {
            let tenth = f64::from(c as u8 - b'0');
            driver.seek_fraction(tenth / 10.0);
        }
        KeyCode::Char('K') => {
            if app.details.is_some() {
                app.close_details();
            } else if let Some(track) = app.selected_track().cloned() {
                let id = catalog.details(&track.id);
                app.open_details(track, id);
            }
        }
        _ => {}
    }

    false
}
