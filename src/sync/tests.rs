use super::*;
use crate::player::{FakeBackend, FakeCall, FakeControl, PlayerAdapter};
use pretty_assertions::assert_eq;
use std::time::{Duration, Instant};

const SECOND: Duration = Duration::from_secs(1);

fn ready_adapter(duration: f64) -> (PlayerAdapter, FakeControl) {
    let backend = FakeBackend::new(duration);
    let control = backend.control();
    let mut adapter = PlayerAdapter::new(Box::new(backend));
    adapter.load("a").unwrap();
    adapter.poll_events();
    control.clear_calls();
    (adapter, control)
}

#[test]
fn repeating_task_fires_once_per_period() {
    let t0 = Instant::now();
    let mut task = RepeatingTask::start(SECOND, t0);

    assert!(!task.poll(t0));
    assert!(!task.poll(t0 + Duration::from_millis(999)));
    assert!(task.poll(t0 + SECOND));
    assert!(!task.poll(t0 + Duration::from_millis(1500)));
    assert!(task.poll(t0 + 2 * SECOND));
}

#[test]
fn repeating_task_collapses_missed_periods() {
    let t0 = Instant::now();
    let mut task = RepeatingTask::start(SECOND, t0);

    assert!(task.poll(t0 + 5 * SECOND));
    assert!(!task.poll(t0 + Duration::from_millis(5500)));
    assert_eq!(task.next_due(), t0 + 6 * SECOND);
}

#[test]
fn polls_only_while_playing_and_ready() {
    let (mut adapter, control) = ready_adapter(100.0);
    let mut sync = Synchronizer::new(SECOND, 100);
    let t0 = Instant::now();

    sync.reconcile(false, true, t0);
    assert!(!sync.is_polling());
    assert_eq!(sync.tick(t0 + SECOND, &adapter), None);

    adapter.play();
    sync.reconcile(true, true, t0);
    assert!(sync.is_polling());
    control.advance(1.0);
    assert_eq!(
        sync.tick(t0 + SECOND, &adapter),
        Some(Progress {
            current: 1.0,
            duration: 100.0
        })
    );

    sync.reconcile(false, true, t0 + SECOND);
    assert!(!sync.is_polling());
    assert_eq!(sync.tick(t0 + 3 * SECOND, &adapter), None);
}

#[test]
fn reconcile_restarts_the_timer_on_change_only() {
    let (adapter, _control) = ready_adapter(100.0);
    let mut sync = Synchronizer::new(SECOND, 100);
    let t0 = Instant::now();

    sync.reconcile(true, true, t0);
    // Same inputs later do not push the deadline back.
    sync.reconcile(true, true, t0 + Duration::from_millis(900));
    assert!(sync.tick(t0 + SECOND, &adapter).is_some());

    // Session torn down and a new one ready: fresh period from that moment.
    sync.reconcile(true, false, t0 + 2 * SECOND);
    sync.reconcile(true, true, t0 + Duration::from_millis(2500));
    assert_eq!(sync.tick(t0 + 3 * SECOND, &adapter), None);
    assert!(sync.tick(t0 + Duration::from_millis(3500), &adapter).is_some());
}

#[test]
fn unknown_duration_keeps_the_last_good_value() {
    let (mut adapter, _control) = ready_adapter(100.0);
    let mut sync = Synchronizer::new(SECOND, 100);
    let t0 = Instant::now();
    sync.on_ready(100.0, &mut adapter);
    adapter.unload();

    sync.reconcile(true, true, t0);
    let sample = sync.tick(t0 + SECOND, &adapter).unwrap();
    assert_eq!(sample.current, 0.0);
    assert_eq!(sample.duration, 100.0);
}

#[test]
fn volume_zero_mutes_and_positive_unmutes() {
    let (mut adapter, control) = ready_adapter(100.0);
    let mut sync = Synchronizer::new(SECOND, 80);

    sync.set_volume(0, &mut adapter);
    assert!(sync.muted());
    assert_eq!(control.volume(), Some(0));

    sync.set_volume(35, &mut adapter);
    assert!(!sync.muted());
    assert_eq!(sync.volume(), 35);
    assert_eq!(control.volume(), Some(35));
}

#[test]
fn toggle_mute_pushes_zero_then_restores() {
    let (mut adapter, control) = ready_adapter(100.0);
    let mut sync = Synchronizer::new(SECOND, 60);

    sync.toggle_mute(&mut adapter);
    assert!(sync.muted());
    sync.toggle_mute(&mut adapter);
    assert!(!sync.muted());

    assert_eq!(control.calls(), vec![FakeCall::Volume(0), FakeCall::Volume(60)]);
}

#[test]
fn ready_session_receives_the_current_volume() {
    let (mut adapter, control) = ready_adapter(100.0);
    let mut sync = Synchronizer::new(SECOND, 100);
    sync.set_volume(0, &mut adapter);
    control.clear_calls();

    adapter.load("b").unwrap();
    for event in adapter.poll_events() {
        if let crate::player::AdapterEvent::Ready { duration } = event {
            sync.on_ready(duration, &mut adapter);
        }
    }

    assert_eq!(
        control.calls(),
        vec![
            FakeCall::Destroy("a".to_string()),
            FakeCall::Create("b".to_string()),
            FakeCall::Volume(0),
        ]
    );
    assert_eq!(sync.duration(), 100.0);
}

#[test]
fn seek_fraction_is_optimistic_and_clamped() {
    let (mut adapter, control) = ready_adapter(200.0);
    let mut sync = Synchronizer::new(SECOND, 100);
    sync.on_ready(200.0, &mut adapter);
    control.clear_calls();

    sync.seek_fraction(0.25, &mut adapter);
    assert_eq!(sync.elapsed(), 50.0);
    assert_eq!(sync.ratio(), 0.25);

    sync.seek_fraction(1.7, &mut adapter);
    assert_eq!(sync.elapsed(), 200.0);

    sync.seek_fraction(-0.3, &mut adapter);
    assert_eq!(sync.elapsed(), 0.0);

    assert_eq!(
        control.calls(),
        vec![FakeCall::Seek(50.0), FakeCall::Seek(200.0), FakeCall::Seek(0.0)]
    );
}

#[test]
fn seeking_without_a_duration_does_nothing() {
    let (mut adapter, control) = ready_adapter(200.0);
    let mut sync = Synchronizer::new(SECOND, 100);

    sync.seek_fraction(0.5, &mut adapter);
    sync.seek_by(5.0, &mut adapter);

    assert_eq!(sync.elapsed(), 0.0);
    assert!(control.calls().is_empty());
}

#[test]
fn seek_by_scrubs_within_bounds() {
    let (mut adapter, _control) = ready_adapter(30.0);
    let mut sync = Synchronizer::new(SECOND, 100);
    sync.on_ready(30.0, &mut adapter);

    sync.seek_by(5.0, &mut adapter);
    assert_eq!(sync.elapsed(), 5.0);
    sync.seek_by(-10.0, &mut adapter);
    assert_eq!(sync.elapsed(), 0.0);
    sync.seek_by(100.0, &mut adapter);
    assert_eq!(sync.elapsed(), 30.0);
}

#[test]
fn teardown_cancels_polling_and_resets_progress() {
    let (mut adapter, _control) = ready_adapter(30.0);
    let mut sync = Synchronizer::new(SECOND, 100);
    let t0 = Instant::now();
    sync.on_ready(30.0, &mut adapter);
    sync.reconcile(true, true, t0);
    sync.seek_by(10.0, &mut adapter);

    sync.teardown();

    assert!(!sync.is_polling());
    assert_eq!(sync.elapsed(), 0.0);
    assert_eq!(sync.duration(), 0.0);
    assert_eq!(sync.tick(t0 + 5 * SECOND, &adapter), None);

    // Polling resumes once reconcile sees playing+ready again.
    sync.reconcile(true, true, t0 + 5 * SECOND);
    assert!(sync.is_polling());
}
