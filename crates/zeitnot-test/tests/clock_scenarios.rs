//! End-to-end scenarios driven through the deterministic bench

use std::time::Duration;

use zeitnot_clock::watchdog::ZERO_GUARD;
use zeitnot_core::{ClockError, ClockTime, Color, EventKind, TimeControl};
use zeitnot_test::{scenarios, ClockBench};

#[test]
fn delayed_start_five_minute_game() {
    let bench = scenarios::blitz();

    // Neither opening ply consumes time, however long it takes
    bench.advance(Duration::from_secs(30));
    bench.engine.tap();
    assert!(!bench.engine.is_started());
    assert_eq!(bench.engine.remaining(Color::Black).as_secs_f64(), 300.0);

    bench.advance(Duration::from_secs(45));
    bench.engine.tap();
    assert!(bench.engine.is_started());
    assert_eq!(bench.engine.moving_color(), Color::White);

    // From ply 2 on, the mover's time runs
    bench.tap_after(Duration::from_secs(10));
    assert_eq!(bench.engine.remaining(Color::White).as_secs_f64(), 290.0);
    assert_eq!(bench.engine.remaining(Color::Black).as_secs_f64(), 300.0);
}

#[test]
fn increment_credited_on_tap() {
    let bench = scenarios::bullet();
    bench.open();

    bench.tap_after(Duration::from_secs(3));
    // 60 - 3 + 5
    assert_eq!(bench.engine.remaining(Color::White).as_secs_f64(), 62.0);
}

#[test]
fn flag_falls_within_guard_and_only_once() {
    let bench = scenarios::blitz();
    bench.open();

    bench.engine.set_remaining(Color::White, ClockTime::from_millis(500));

    // Wake is due at expiration + guard, never strictly before
    bench.advance(Duration::from_millis(500));
    assert!(bench.recorder.zeros().is_empty());

    bench.advance(ZERO_GUARD);
    assert_eq!(bench.recorder.zeros(), vec![Color::White]);

    // Expired time does not re-fire
    bench.advance(Duration::from_secs(120));
    assert_eq!(bench.recorder.zeros(), vec![Color::White]);
    assert_eq!(bench.scheduler.pending_count(), 0);
}

#[test]
fn pause_freezes_and_resume_continues() {
    let bench = scenarios::blitz();
    bench.open();
    bench.advance(Duration::from_secs(10));

    bench.engine.pause();
    let frozen = bench.engine.remaining(Color::White);
    assert_eq!(frozen.as_secs_f64(), 290.0);
    assert_eq!(bench.scheduler.pending_count(), 0);

    bench.advance(Duration::from_secs(60));
    assert_eq!(bench.engine.remaining(Color::White), frozen);

    bench.engine.resume();
    bench.advance(Duration::from_secs(1));
    assert_eq!(bench.engine.remaining(Color::White).as_secs_f64(), 289.0);
}

#[test]
fn pause_resume_pause_loses_nothing() {
    let bench = scenarios::classical();
    bench.open();
    bench.advance(Duration::from_secs(7));

    for _ in 0..5 {
        bench.engine.pause();
        bench.engine.resume();
    }
    bench.engine.pause();

    assert_eq!(bench.engine.remaining(Color::White).as_secs_f64(), 5393.0);
}

#[test]
fn undo_inverts_recorded_plies() {
    let bench = scenarios::bullet();
    bench.open();
    bench.tap_after(Duration::from_secs(2)); // white
    bench.tap_after(Duration::from_secs(4)); // black

    let white_before = bench.engine.remaining(Color::White);
    let black_before = bench.engine.remaining(Color::Black);
    let mover_before = bench.engine.moving_color();
    let ply_before = bench.engine.ply();

    bench.tap_after(Duration::from_secs(1));
    bench.tap_after(Duration::from_secs(6));
    bench.engine.undo_plies(2).unwrap();

    assert_eq!(bench.engine.ply(), ply_before);
    assert_eq!(bench.engine.moving_color(), mover_before);
    assert_eq!(bench.engine.remaining(Color::White), white_before);
    assert_eq!(bench.engine.remaining(Color::Black), black_before);
}

#[test]
fn undo_past_history_is_rejected_atomically() {
    let bench = scenarios::blitz();
    bench.open();
    bench.tap_after(Duration::from_secs(5));

    let err = bench.engine.undo_plies(10).unwrap_err();
    assert_eq!(
        err,
        ClockError::InvalidUndo {
            requested: 10,
            available: 3
        }
    );

    // Nothing moved
    assert_eq!(bench.engine.ply(), 3);
    assert_eq!(bench.engine.remaining(Color::White).as_secs_f64(), 295.0);
}

#[test]
fn undo_restores_a_fallen_flag() {
    let bench = ClockBench::new(TimeControl::new(3.0, 0.0).unwrap());
    bench.open();

    bench.advance(Duration::from_secs(3) + ZERO_GUARD);
    assert_eq!(bench.recorder.zeros(), vec![Color::White]);

    // Rewinding the losing ply re-arms the watchdog
    bench.engine.tap();
    bench.engine.undo_plies(1).unwrap();
    assert_eq!(bench.scheduler.pending_count(), 1);

    bench.advance(Duration::from_secs(3) + ZERO_GUARD);
    assert_eq!(bench.recorder.zeros(), vec![Color::White, Color::White]);
}

#[test]
fn end_silences_the_clock() {
    let bench = scenarios::bullet();
    bench.open();
    bench.engine.end();
    bench.recorder.clear();

    bench.engine.tap();
    bench.engine.resume();
    bench.engine.set_remaining(Color::Black, ClockTime::from_secs(1));
    bench.advance(Duration::from_secs(300));

    assert!(bench.recorder.events().is_empty());
    assert_eq!(bench.scheduler.pending_count(), 0);
}

#[test]
fn event_stream_shape_for_an_opening() {
    let bench = scenarios::blitz();
    bench.engine.tap();
    assert_eq!(bench.recorder.count(EventKind::Player), 1);
    assert_eq!(bench.recorder.count(EventKind::Time), 0);

    bench.engine.tap();
    assert_eq!(bench.recorder.count(EventKind::Player), 2);
    assert_eq!(bench.recorder.count(EventKind::Time), 1);
}
