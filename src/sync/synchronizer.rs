use std::time::{Duration, Instant};

use super::task::RepeatingTask;
use crate::player::PlayerAdapter;

/// One progress sample, in seconds.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Progress {
    pub current: f64,
    pub duration: f64,
}

pub struct Synchronizer {
    period: Duration,
    task: Option<RepeatingTask>,
    /// `(playing, ready)` as of the last reconcile.
    polling_inputs: (bool, bool),
    elapsed: f64,
    duration: f64,
    volume: u8,
    muted: bool,
}

impl Synchronizer {
    pub fn new(period: Duration, volume: u8) -> Self {
        let volume = volume.min(100);
        Self {
            period,
            task: None,
            polling_inputs: (false, false),
            elapsed: 0.0,
            duration: 0.0,
            volume,
            muted: volume == 0,
        }
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn muted(&self) -> bool {
        self.muted
    }

    pub fn is_polling(&self) -> bool {
        self.task.is_some()
    }

    /// Elapsed share of the track in `0.0..=1.0`.
    pub fn ratio(&self) -> f64 {
        if self.duration > 0.0 {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Restart or cancel polling when playing/ready changes.
    ///
    /// Any change drops the running task; a new one is started only while
    /// both hold.
    pub fn reconcile(&mut self, playing: bool, ready: bool, now: Instant) {
        if (playing, ready) == self.polling_inputs {
            return;
        }
        self.polling_inputs = (playing, ready);
        self.task = None;
        if playing && ready {
            log::trace!("sync: polling every {:?}", self.period);
            self.task = Some(RepeatingTask::start(self.period, now));
        }
    }

    /// Sample the adapter if the poll period has elapsed.
    pub fn tick(&mut self, now: Instant, adapter: &PlayerAdapter) -> Option<Progress> {
        let task = self.task.as_mut()?;
        if !task.poll(now) {
            return None;
        }

        self.elapsed = adapter.current_time();
        let duration = adapter.duration();
        if duration.is_finite() && duration > 0.0 {
            self.duration = duration;
        }
        Some(Progress {
            current: self.elapsed,
            duration: self.duration,
        })
    }

    /// A new session became ready: take its duration and push the volume.
    pub fn on_ready(&mut self, duration: f64, adapter: &mut PlayerAdapter) {
        self.elapsed = 0.0;
        if duration.is_finite() && duration > 0.0 {
            self.duration = duration;
        }
        self.push_volume(adapter);
    }

    pub fn set_volume(&mut self, volume: u8, adapter: &mut PlayerAdapter) {
        self.volume = volume.min(100);
        self.muted = self.volume == 0;
        self.push_volume(adapter);
    }

    pub fn toggle_mute(&mut self, adapter: &mut PlayerAdapter) {
        self.muted = !self.muted;
        self.push_volume(adapter);
    }

    fn push_volume(&self, adapter: &mut PlayerAdapter) {
        adapter.set_volume(if self.muted { 0 } else { self.volume });
    }

    /// Seek to a share of the track, e.g. a click on the progress bar.
    ///
    /// The local position moves at once; the next poll confirms it.
    pub fn seek_fraction(&mut self, fraction: f64, adapter: &mut PlayerAdapter) {
        if self.duration <= 0.0 {
            return;
        }
        let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
        self.seek_to(fraction * self.duration, adapter);
    }

    /// Scrub relative to the current position.
    pub fn seek_by(&mut self, delta_seconds: f64, adapter: &mut PlayerAdapter) {
        if self.duration <= 0.0 {
            return;
        }
        let target = (self.elapsed + delta_seconds).clamp(0.0, self.duration);
        self.seek_to(target, adapter);
    }

    fn seek_to(&mut self, seconds: f64, adapter: &mut PlayerAdapter) {
        log::debug!("sync: seek to {seconds:.1}s");
        adapter.seek(seconds);
        self.elapsed = seconds;
    }

    /// Stop polling and forget the session's position.
    pub fn teardown(&mut self) {
        self.task = None;
        self.polling_inputs = (false, false);
        self.elapsed = 0.0;
        self.duration = 0.0;
    }
}
