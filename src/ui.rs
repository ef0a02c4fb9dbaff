//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use std::collections::BTreeMap;
use std::sync::LazyLock;
use std::time::{Duration, Instant};

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, Padding, Paragraph, Wrap},
};

use crate::app::{App, DetailsState, View};
use crate::catalog::Track;
use crate::config::UiSettings;
use crate::playback::TransportState;
use crate::runtime::SessionDriver;

static CONTROLS_MAP: LazyLock<BTreeMap<String, String>> = LazyLock::new(|| {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    map.insert("j/k".to_string(), "up/down".to_string());
    map.insert("gg/G".to_string(), "top/bottom".to_string());
    map.insert("tab".to_string(), "view".to_string());
    map.insert("enter".to_string(), "play".to_string());
    map.insert("a".to_string(), "add to playlist".to_string());
    map.insert("space/p".to_string(), "play/pause".to_string());
    map.insert("h/l".to_string(), "prev/next".to_string());
    // H/L is filled dynamically from config.
    map.insert("0-9".to_string(), "seek".to_string());
    map.insert("+/-".to_string(), "volume".to_string());
    map.insert("m".to_string(), "mute".to_string());
    map.insert("/".to_string(), "search".to_string());
    map.insert("t".to_string(), "trending".to_string());
    map.insert("K".to_string(), "details".to_string());
    map.insert("q".to_string(), "quit".to_string());
    map
});

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(scrub_seconds: u64) -> String {
    // Keep the rendered order stable and human-friendly.
    let order = [
        "j/k", "tab", "enter", "a", "space/p", "h/l", "H/L", "0-9", "+/-", "m", "/", "t", "K", "gg/G", "q",
    ];
    order
        .iter()
        .filter_map(|k| {
            if *k == "H/L" {
                Some(format!("[H/L] scrub -/+{}s", scrub_seconds))
            } else {
                CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format seconds as `M:SS`.
fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let secs = seconds as u64;
    format!("{}:{:02}", secs / 60, secs % 60)
}

fn format_duration(d: Option<Duration>) -> String {
    d.map(|d| format_time(d.as_secs_f64())).unwrap_or_default()
}

/// Group digits of a counter, `1234567` -> `1,234,567`.
fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    // Keep the popup smaller and avoid covering the entire UI.
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn status_text(app: &App, driver: &SessionDriver, now: Instant) -> String {
    let mut parts: Vec<String> = Vec::new();

    let snapshot = &app.playback;
    match &snapshot.current_track {
        Some(track) => {
            let state = match snapshot.transport {
                TransportState::Playing => "Playing",
                TransportState::Paused => "Paused",
                TransportState::Stopped => "Stopped",
            };
            parts.push(format!("{state}: {}", track.display()));
            if !snapshot.playlist.is_empty() {
                parts.push(format!("#{} of {}", snapshot.current_index + 1, snapshot.playlist.len()));
            }
        }
        None => parts.push("Stopped".to_string()),
    }

    let sync = driver.sync();
    if sync.muted() {
        parts.push("Vol: muted".to_string());
    } else {
        parts.push(format!("Vol: {}%", sync.volume()));
    }
    parts.push(format!("Player: {}", driver.backend_name()));

    if let Some(toast) = app.toast(now) {
        parts.push(toast.to_string());
    }

    parts.join(" • ")
}

fn list_title(app: &App) -> String {
    let name = match app.view {
        View::Search if !app.search_query.is_empty() => format!("search: {}", app.search_query),
        View::Playlist => format!("playlist ({})", app.playback.playlist.len()),
        view => view.title().to_string(),
    };
    if app.visible_list().is_some_and(|l| l.is_loading()) {
        format!(" {name} (loading…) ")
    } else {
        format!(" {name} ")
    }
}

fn list_item(app: &App, index: usize, track: &Track) -> ListItem<'static> {
    let marker = match app.view {
        View::Playlist if app.playback.current_track.is_some() && app.playback.current_index == index => "♪ ",
        _ => "  ",
    };
    let duration = format_duration(track.duration);
    if duration.is_empty() {
        ListItem::new(format!("{marker}{}", track.display()))
    } else {
        ListItem::new(format!("{marker}{} [{duration}]", track.display()))
    }
}

fn details_text(app: &App) -> Option<String> {
    let pane = app.details.as_ref()?;
    let text = match &pane.state {
        DetailsState::Loading => format!("Title: {}\nLoading details…", pane.track.title),
        DetailsState::Failed(message) => format!("Title: {}\n{message}", pane.track.title),
        DetailsState::Loaded(track) => {
            let mut lines = vec![
                format!("Title: {}", track.title),
                format!("Channel: {}", track.channel_title),
            ];
            if let Some(d) = track.duration {
                lines.push(format!("Duration: {}", format_time(d.as_secs_f64())));
            }
            if let Some(v) = track.view_count {
                lines.push(format!("Views: {}", format_count(v)));
            }
            if let Some(l) = track.like_count {
                lines.push(format!("Likes: {}", format_count(l)));
            }
            if let Some(p) = &track.published_at {
                lines.push(format!("Published: {p}"));
            }
            lines.push(format!("Id: {}", track.id));
            if let Some(desc) = track.description.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
                lines.push(String::new());
                lines.push(desc.to_string());
            }
            lines.join("\n")
        }
    };
    Some(text)
}

/// Render the entire UI into the provided `frame`.
pub fn draw(frame: &mut Frame, app: &App, driver: &SessionDriver, ui_settings: &UiSettings, now: Instant) {
    let input_height = if app.is_typing() { 3 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(input_height),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" muse ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Status box
    let status_par = Paragraph::new(status_text(app, driver, now))
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status_par, chunks[1]);

    // Progress
    let sync = driver.sync();
    let label = format!(
        "{} / {} (-{})",
        format_time(sync.elapsed()),
        format_time(sync.duration()),
        format_time((sync.duration() - sync.elapsed()).max(0.0))
    );
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" progress "))
        .gauge_style(Style::default().add_modifier(Modifier::BOLD))
        .ratio(sync.ratio())
        .label(label);
    frame.render_widget(gauge, chunks[2]);

    // Main list
    {
        let tracks = app.visible_tracks();
        let error = app.visible_list().and_then(|l| l.error.as_deref());
        let block = Block::default().borders(Borders::ALL).title(list_title(app));

        if tracks.is_empty() {
            let text = match (error, app.view) {
                (Some(e), _) => e.to_string(),
                (None, View::Search) if app.search_query.is_empty() => "Press / to search".to_string(),
                (None, View::Playlist) => "Playlist is empty; press a to add the selected track".to_string(),
                (None, _) => "Nothing here yet".to_string(),
            };
            frame.render_widget(Paragraph::new(text).block(block), chunks[3]);
        } else {
            // Center the selected item when possible by creating a visible window.
            // Important: only build ListItems for the visible window (avoid allocating the entire list).
            let total = tracks.len();
            let list_height = chunks[3].height.saturating_sub(2) as usize;
            let sel_pos = app.selected().min(total - 1);
            let (start, end, selected_pos_in_visible) = if total <= list_height || list_height == 0 {
                (0, total, sel_pos)
            } else {
                let half = list_height / 2;
                let mut start = sel_pos.saturating_sub(half);
                if start + list_height > total {
                    start = total - list_height;
                }
                (start, start + list_height, sel_pos - start)
            };

            let mut visible_items: Vec<ListItem> = Vec::with_capacity(end - start);
            for (offset, track) in tracks[start..end].iter().enumerate() {
                visible_items.push(list_item(app, start + offset, track));
            }
            let block = match error {
                Some(e) => block.title_bottom(format!(" {e} ")),
                None => block,
            };

            let list = List::new(visible_items)
                .block(block)
                .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
                .highlight_symbol("> ");
            let mut state = ratatui::widgets::ListState::default();
            state.select(Some(selected_pos_in_visible));
            frame.render_stateful_widget(list, chunks[3], &mut state);
        }
    }

    // Overlay details popup (keeps list visible under it)
    if let Some(text) = details_text(app) {
        let popup_area = centered_rect_sized(76, 14, chunks[3]);
        frame.render_widget(Clear, popup_area);
        let details = Paragraph::new(text)
            .block(
                Block::default()
                    .padding(Padding {
                        left: 1,
                        right: 0,
                        top: 0,
                        bottom: 0,
                    })
                    .borders(Borders::ALL)
                    .title(" details (K closes) "),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(details, popup_area);
    }

    if let Some(input) = &app.input {
        let input_par = Paragraph::new(format!("{input}_"))
            .block(Block::default().borders(Borders::ALL).title(" search (enter runs, esc cancels) "));
        frame.render_widget(input_par, chunks[4]);
    }

    let footer = Paragraph::new(controls_text(ui_settings.scrub_seconds))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(footer, chunks[5]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_formatting() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(65.9), "1:05");
        assert_eq!(format_time(3723.0), "62:03");
        assert_eq!(format_time(f64::NAN), "0:00");
        assert_eq!(format_duration(None), "");
    }

    #[test]
    fn counts_are_grouped() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1_800_000_000), "1,800,000,000");
    }

    #[test]
    fn controls_text_includes_scrub_seconds() {
        let text = controls_text(7);
        assert!(text.contains("[H/L] scrub -/+7s"));
        assert!(text.starts_with("[j/k] up/down"));
        assert!(text.ends_with("[q] quit"));
    }
}
