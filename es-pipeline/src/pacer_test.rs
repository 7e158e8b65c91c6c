use std::time::Duration;

use super::{Clock, ManualClock, Pacer, compute_wait, frame_interval, wait_for_next_frame};

const TOLERANCE: Duration = Duration::from_micros(50);

fn close(a: Duration, b: Duration) -> bool {
    a.abs_diff(b) <= TOLERANCE
}

#[test]
fn test_first_frame_never_waits() {
    let clock = ManualClock::new();
    assert_eq!(compute_wait(None, clock.now(), 30), Duration::ZERO);

    let shown = wait_for_next_frame(&clock, None, 30);
    assert_eq!(shown, clock.now());
    assert_eq!(clock.slept(), Duration::ZERO);
}

#[test]
fn test_on_schedule_waits_nothing() {
    let clock = ManualClock::new();
    let last = clock.now();
    clock.advance(Duration::from_secs(1) / 30);
    assert!(close(compute_wait(Some(last), clock.now(), 30), Duration::ZERO));
}

#[test]
fn test_early_frame_waits_the_remainder() {
    let clock = ManualClock::new();
    let last = clock.now();
    clock.advance(Duration::from_secs(1) / 60);

    let wait = compute_wait(Some(last), clock.now(), 30);
    assert!(close(wait, Duration::from_secs(1) / 60), "wait was {:?}", wait);

    let shown = wait_for_next_frame(&clock, Some(last), 30);
    assert!(close(clock.slept(), Duration::from_secs(1) / 60));
    // display time is read after the wait
    assert!(close(shown - last, frame_interval(30)));
}

#[test]
fn test_late_frame_never_waits_negative() {
    let clock = ManualClock::new();
    let last = clock.now();
    clock.advance(Duration::from_millis(500));
    assert_eq!(compute_wait(Some(last), clock.now(), 30), Duration::ZERO);

    wait_for_next_frame(&clock, Some(last), 30);
    assert_eq!(clock.slept(), Duration::ZERO);
}

#[test]
fn test_pacer_tracks_display_time() {
    let clock = ManualClock::new();
    let mut pacer = Pacer::with_clock(&clock, 30);

    assert_eq!(pacer.wait(), Duration::ZERO);
    assert_eq!(pacer.last_display(), Some(clock.now()));

    // decode took 10ms, the rest of the interval is slept away
    clock.advance(Duration::from_millis(10));
    let wait = pacer.wait();
    assert!(close(wait, frame_interval(30) - Duration::from_millis(10)));
    assert!(close(clock.slept(), wait));
    assert_eq!(pacer.last_display(), Some(clock.now()));

    // decode overran the interval
    clock.advance(Duration::from_millis(40));
    assert_eq!(pacer.wait(), Duration::ZERO);
}

#[test]
fn test_disabled_pacer() {
    let clock = ManualClock::new();
    let mut pacer = Pacer::with_clock(&clock, 30);
    pacer.set_enabled(false);
    pacer.wait();
    clock.advance(Duration::from_millis(1));
    assert_eq!(pacer.wait(), Duration::ZERO);
    assert_eq!(clock.slept(), Duration::ZERO);
}

#[test]
fn test_frame_interval() {
    assert_eq!(frame_interval(25), Duration::from_millis(40));
    assert!(close(frame_interval(30), Duration::from_nanos(33_333_333)));
}
