//! Best-effort frame pacing.
//!
//! The stream carries no timestamps, so each picture is simply held back until one frame
//! interval has passed since the previous one was shown. Drift is bounded per step and
//! never corrected across frames.

use std::cell::Cell;
use std::time::{Duration, Instant};

/// Source of monotonic time. Assumed never to go backwards.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Clock that only moves when told to. Sleeping advances it by the slept duration.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    elapsed: Cell<Duration>,
    slept: Cell<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed: Cell::new(Duration::ZERO),
            slept: Cell::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, duration: Duration) {
        self.elapsed.set(self.elapsed.get() + duration);
    }

    /// Total time spent in `sleep`.
    pub fn slept(&self) -> Duration {
        self.slept.get()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed.get()
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
        self.slept.set(self.slept.get() + duration);
    }
}

pub fn frame_interval(fps: u32) -> Duration {
    Duration::from_secs(1) / fps.max(1)
}

/// Time left until the next picture is due. Zero for the first picture and whenever the
/// interval has already passed.
pub fn compute_wait(last_display: Option<Instant>, now: Instant, fps: u32) -> Duration {
    match last_display {
        None => Duration::ZERO,
        Some(last) => frame_interval(fps).saturating_sub(now.saturating_duration_since(last)),
    }
}

/// Blocks until the next picture is due and returns the new display time, read after the
/// wait.
pub fn wait_for_next_frame<C: Clock>(clock: &C, last_display: Option<Instant>, fps: u32) -> Instant {
    pace(clock, last_display, fps).0
}

fn pace<C: Clock>(clock: &C, last_display: Option<Instant>, fps: u32) -> (Instant, Duration) {
    let wait = compute_wait(last_display, clock.now(), fps);
    if !wait.is_zero() {
        clock.sleep(wait);
    }
    (clock.now(), wait)
}

pub struct Pacer<C = MonotonicClock> {
    clock: C,
    fps: u32,
    enabled: bool,
    last_display: Option<Instant>,
}

impl Pacer<MonotonicClock> {
    pub fn new(fps: u32) -> Self {
        Self::with_clock(MonotonicClock, fps)
    }
}

impl<C: Clock> Pacer<C> {
    pub fn with_clock(clock: C, fps: u32) -> Self {
        Self {
            clock,
            fps,
            enabled: true,
            last_display: None,
        }
    }

    /// A disabled pacer never sleeps.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn last_display(&self) -> Option<Instant> {
        self.last_display
    }

    /// Waits for the next slot and records it. Returns how long it slept.
    pub fn wait(&mut self) -> Duration {
        if !self.enabled {
            self.last_display = Some(self.clock.now());
            return Duration::ZERO;
        }
        let (shown, wait) = pace(&self.clock, self.last_display, self.fps);
        self.last_display = Some(shown);
        wait
    }
}

#[cfg(test)]
#[path = "pacer_test.rs"]
mod pacer_test;
