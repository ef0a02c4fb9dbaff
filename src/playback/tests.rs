use super::*;
use crate::catalog::Track;
use crate::config::AdvanceMode;
use pretty_assertions::assert_eq;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// A track whose artist identity comes from its channel.
fn t(id: &str, channel: &str) -> Track {
    Track::new(id, format!("Song {id}"), channel)
}

fn controller(seed: u64) -> PlaybackController<StdRng> {
    PlaybackController::with_rng(AdvanceMode::Discovery, StdRng::seed_from_u64(seed))
}

fn sequential() -> PlaybackController<StdRng> {
    PlaybackController::with_rng(AdvanceMode::Sequential, StdRng::seed_from_u64(0))
}

fn ids(tracks: &[Track]) -> Vec<&str> {
    tracks.iter().map(|t| t.id.as_str()).collect()
}

fn current_id<R: rand::Rng>(c: &PlaybackController<R>) -> Option<&str> {
    c.current_track().map(|t| t.id.as_str())
}

fn assert_invariants<R: rand::Rng>(c: &PlaybackController<R>) {
    match c.current_track() {
        Some(current) => {
            assert_ne!(c.transport(), TransportState::Stopped);
            if !c.playlist().is_empty() {
                assert_eq!(c.playlist()[c.current_index()].id, current.id);
            }
        }
        None => assert_eq!(c.transport(), TransportState::Stopped),
    }
}

#[test]
fn starts_stopped_and_empty() {
    let c = controller(1);
    assert_eq!(c.snapshot(), PlaybackSnapshot::default());
    assert_invariants(&c);
}

#[test]
fn play_track_with_list_points_at_the_track() {
    let mut c = controller(1);
    let list = vec![t("a", "x"), t("b", "x"), t("t", "x"), t("c", "x")];

    c.play_track(t("t", "x"), Some(list));

    let s = c.snapshot();
    assert_eq!(s.current_track.map(|t| t.id), Some("t".to_string()));
    assert_eq!(s.current_index, 2);
    assert!(s.is_playing);
    assert_eq!(ids(&s.playlist), vec!["a", "b", "t", "c"]);
}

#[test]
fn play_track_without_list_seeds_an_empty_playlist() {
    let mut c = controller(1);
    c.play_track(t("a", "x"), None);
    assert_eq!(ids(c.playlist()), vec!["a"]);
    assert_eq!(c.current_index(), 0);
    assert_invariants(&c);
}

#[test]
fn play_track_with_empty_list_is_treated_as_no_list() {
    let mut c = controller(1);
    c.play_track(t("a", "x"), Some(Vec::new()));
    assert_eq!(ids(c.playlist()), vec!["a"]);
    assert_invariants(&c);
}

#[test]
fn play_track_finds_existing_entry_without_touching_playlist() {
    let mut c = controller(1);
    c.play_track(t("a", "x"), Some(vec![t("a", "x"), t("b", "y"), t("c", "z")]));

    c.play_track(t("c", "z"), None);

    assert_eq!(ids(c.playlist()), vec!["a", "b", "c"]);
    assert_eq!(c.current_index(), 2);
    assert_invariants(&c);
}

#[test]
fn play_track_outside_playlist_appends_it() {
    let mut c = controller(1);
    c.play_track(t("a", "x"), Some(vec![t("a", "x"), t("b", "y")]));

    c.play_track(t("z", "q"), None);

    assert_eq!(ids(c.playlist()), vec!["a", "b", "z"]);
    assert_eq!(c.current_index(), 2);
    assert_eq!(current_id(&c), Some("z"));
    assert_invariants(&c);
}

#[test]
fn play_track_with_list_lacking_the_track_puts_it_first() {
    let mut c = controller(1);
    c.play_track(t("z", "q"), Some(vec![t("a", "x"), t("b", "y")]));

    assert_eq!(ids(c.playlist()), vec!["z", "a", "b"]);
    assert_eq!(c.current_index(), 0);
    assert_invariants(&c);
}

#[test]
fn add_then_play_uses_the_existing_entry() {
    // add_to_playlist fills the empty playlist first, so play_track takes the
    // "already in the playlist" branch rather than seeding a second copy.
    let mut c = controller(1);
    c.add_to_playlist(t("x", "a"));
    assert_eq!(c.transport(), TransportState::Stopped);

    c.play_track(t("x", "a"), None);

    assert_eq!(ids(c.playlist()), vec!["x"]);
    assert_eq!(c.current_index(), 0);
    assert_invariants(&c);
}

#[test]
fn add_to_playlist_keeps_position() {
    let mut c = controller(1);
    c.play_track(t("a", "x"), Some(vec![t("a", "x"), t("b", "y")]));
    c.add_to_playlist(t("a", "x"));

    assert_eq!(ids(c.playlist()), vec!["a", "b", "a"]);
    assert_eq!(c.current_index(), 0);
    assert_eq!(current_id(&c), Some("a"));
}

#[test]
fn pause_is_idempotent_and_resume_restores_playing() {
    let mut c = controller(1);
    c.play_track(t("a", "x"), None);

    c.pause_track();
    c.pause_track();
    assert_eq!(c.transport(), TransportState::Paused);
    assert!(!c.snapshot().is_playing);

    c.resume_playback();
    assert_eq!(c.transport(), TransportState::Playing);
    assert_eq!(current_id(&c), Some("a"));
}

#[test]
fn pause_and_resume_without_a_track_do_nothing() {
    let mut c = controller(1);
    c.pause_track();
    c.resume_playback();
    c.next_track();
    c.previous_track();
    assert_eq!(c.snapshot(), PlaybackSnapshot::default());
}

#[test]
fn next_with_single_track_playlist_changes_nothing() {
    let mut c = controller(1);
    c.play_track(t("t", "x"), None);
    c.pause_track();
    let before = c.snapshot();

    c.next_track();
    c.previous_track();

    assert_eq!(c.snapshot(), before);
}

#[test]
fn next_prefers_same_artist() {
    for seed in 0..100 {
        let mut c = controller(seed);
        c.play_track(t("t", "X"), Some(vec![t("t", "X"), t("a", "X"), t("b", "Y")]));

        c.next_track();

        assert_eq!(current_id(&c), Some("a"), "seed {seed}");
        assert_eq!(c.current_index(), 1);
        assert_invariants(&c);
    }
}

#[test]
fn previous_uses_the_same_policy() {
    for seed in 0..100 {
        let mut c = controller(seed);
        c.play_track(t("a", "X"), Some(vec![t("b", "Y"), t("t", "X"), t("a", "X")]));

        c.previous_track();

        assert_eq!(current_id(&c), Some("t"), "seed {seed}");
    }
}

#[test]
fn next_falls_back_to_any_other_track() {
    for seed in 0..100 {
        let mut c = controller(seed);
        c.play_track(t("t", "X"), Some(vec![t("t", "X"), t("b", "Y")]));

        c.next_track();

        assert_eq!(current_id(&c), Some("b"), "seed {seed}");
        assert_eq!(c.transport(), TransportState::Playing);
    }
}

#[test]
fn explicit_artist_overrides_channel_for_matching() {
    for seed in 0..50 {
        let mut c = controller(seed);
        let list = vec![
            t("t", "Label VEVO").with_artist("Artist"),
            t("a", "Other Channel").with_artist("Artist"),
            t("b", "Label VEVO"),
        ];
        c.play_track(list[0].clone(), Some(list));

        c.next_track();

        assert_eq!(current_id(&c), Some("a"), "seed {seed}");
    }
}

#[test]
fn duplicates_of_the_current_track_are_not_candidates() {
    for seed in 0..50 {
        let mut c = controller(seed);
        c.play_track(t("t", "X"), Some(vec![t("t", "X"), t("t", "X"), t("b", "Y")]));

        c.next_track();

        assert_eq!(current_id(&c), Some("b"), "seed {seed}");
    }
}

#[test]
fn playlist_of_one_distinct_track_steps_sequentially() {
    let mut c = controller(1);
    c.play_track(t("t", "X"), Some(vec![t("t", "X"), t("t", "X")]));
    assert_eq!(c.current_index(), 0);

    c.next_track();
    assert_eq!(c.current_index(), 1);

    c.next_track();
    assert_eq!(c.current_index(), 1);

    c.previous_track();
    assert_eq!(c.current_index(), 0);
    assert_invariants(&c);
}

#[test]
fn next_resumes_a_paused_transport() {
    let mut c = controller(3);
    c.play_track(t("t", "X"), Some(vec![t("t", "X"), t("b", "Y")]));
    c.pause_track();

    c.next_track();

    assert_eq!(c.transport(), TransportState::Playing);
}

#[test]
fn sequential_mode_steps_and_stops_at_the_ends() {
    let mut c = sequential();
    let list = vec![t("a", "X"), t("b", "X"), t("c", "Y")];
    c.play_track(t("a", "X"), Some(list));

    c.previous_track();
    assert_eq!(current_id(&c), Some("a"));

    c.next_track();
    c.next_track();
    assert_eq!(current_id(&c), Some("c"));

    c.next_track();
    assert_eq!(current_id(&c), Some("c"));
    assert_eq!(c.current_index(), 2);

    c.previous_track();
    assert_eq!(current_id(&c), Some("b"));
    assert_invariants(&c);
}

#[test]
fn set_playlist_relocates_the_current_track() {
    let mut c = controller(1);
    c.play_track(t("b", "X"), Some(vec![t("a", "X"), t("b", "X")]));

    c.set_playlist(vec![t("c", "Y"), t("d", "Y"), t("b", "X")]);
    assert_eq!(c.current_index(), 2);

    c.set_playlist(vec![t("e", "Z")]);
    assert_eq!(ids(c.playlist()), vec!["b", "e"]);
    assert_eq!(c.current_index(), 0);
    assert_invariants(&c);
}

#[test]
fn set_playlist_without_current_track() {
    let mut c = controller(1);
    c.set_playlist(vec![t("a", "X"), t("b", "Y")]);
    assert_eq!(ids(c.playlist()), vec!["a", "b"]);
    assert_eq!(c.current_index(), 0);
    assert_eq!(c.transport(), TransportState::Stopped);
}

#[test]
fn stop_clears_the_current_track_but_keeps_the_playlist() {
    let mut c = controller(1);
    c.play_track(t("a", "X"), Some(vec![t("a", "X"), t("b", "Y")]));

    c.stop();

    assert_eq!(c.current_track(), None);
    assert_eq!(c.transport(), TransportState::Stopped);
    assert_eq!(ids(c.playlist()), vec!["a", "b"]);
    assert_invariants(&c);

    c.next_track();
    assert_eq!(c.current_track(), None);
}

#[test]
fn invariant_holds_across_mixed_operations() {
    for seed in 0..20 {
        let mut c = controller(seed);
        let list = vec![t("a", "X"), t("b", "X"), t("c", "Y"), t("d", "Z")];

        c.play_track(t("c", "Y"), Some(list));
        assert_invariants(&c);
        c.next_track();
        assert_invariants(&c);
        c.add_to_playlist(t("e", "Y"));
        assert_invariants(&c);
        c.previous_track();
        assert_invariants(&c);
        c.play_track(t("f", "W"), None);
        assert_invariants(&c);
        c.pause_track();
        assert_invariants(&c);
        c.next_track();
        assert_invariants(&c);
        c.set_playlist(vec![t("g", "V")]);
        assert_invariants(&c);
        c.stop();
        assert_invariants(&c);
    }
}
