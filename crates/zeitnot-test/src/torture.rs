//! Seeded random-walk torture driver
//!
//! Applies long random sequences of clock operations and checks the
//! invariants that must hold after every step, whatever the history:
//! - at most one watchdog wake is ever pending
//! - a paused clock is completely frozen
//! - series never shrink below one entry; ply stays consistent
//! - an infeasible undo is rejected without mutating anything

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use zeitnot_core::{ClockTime, Color, TimeControl};

use crate::bench::ClockBench;

/// Torture run parameters
#[derive(Clone, Copy, Debug)]
pub struct TortureConfig {
    pub steps: u32,
    pub seed: u64,
    pub control: TimeControl,
}

impl Default for TortureConfig {
    fn default() -> Self {
        TortureConfig {
            steps: 2_000,
            seed: 0xD1CE,
            control: TimeControl::new(300.0, 2.0).expect("valid control"),
        }
    }
}

/// Counters from a completed torture run
#[derive(Clone, Copy, Debug, Default)]
pub struct TortureReport {
    pub steps: u32,
    pub taps: u32,
    pub pauses: u32,
    pub resumes: u32,
    pub undos: u32,
    pub rejected_undos: u32,
    pub overrides: u32,
    pub zero_events: usize,
}

fn series_len(bench: &ClockBench, color: Color) -> usize {
    let mut len = 0;
    while bench.engine.remaining_at(color, len).is_some() {
        len += 1;
    }
    len
}

fn check_invariants(bench: &ClockBench) {
    assert!(
        bench.scheduler.pending_count() <= 1,
        "more than one watchdog wake pending"
    );

    let white = series_len(bench, Color::White);
    let black = series_len(bench, Color::Black);
    assert!(white >= 1 && black >= 1, "series dropped below length 1");
    assert_eq!(bench.engine.ply(), white + black - 2, "ply out of sync");

    if bench.engine.is_paused() {
        let before = (
            bench.engine.remaining(Color::White),
            bench.engine.remaining(Color::Black),
        );
        bench.advance(Duration::from_secs(1));
        let after = (
            bench.engine.remaining(Color::White),
            bench.engine.remaining(Color::Black),
        );
        assert_eq!(before, after, "paused clock consumed time");
    }
}

/// Run a random walk over the engine API, checking invariants at every step.
pub fn run(config: TortureConfig) -> TortureReport {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let bench = ClockBench::new(config.control);
    let mut report = TortureReport {
        steps: config.steps,
        ..TortureReport::default()
    };

    for _ in 0..config.steps {
        match rng.gen_range(0..100u32) {
            0..=39 => {
                let think = Duration::from_millis(rng.gen_range(0..15_000));
                bench.tap_after(think);
                report.taps += 1;
            }
            40..=54 => {
                bench.engine.pause();
                report.pauses += 1;
            }
            55..=69 => {
                bench.engine.resume();
                report.resumes += 1;
            }
            70..=79 => {
                let n = rng.gen_range(1..=3usize);
                let ply_before = bench.engine.ply();
                match bench.engine.undo_plies(n) {
                    Ok(()) => report.undos += 1,
                    Err(_) => {
                        report.rejected_undos += 1;
                        assert_eq!(bench.engine.ply(), ply_before, "failed undo mutated state");
                    }
                }
            }
            80..=89 => {
                let color = if rng.gen_bool(0.5) {
                    Color::White
                } else {
                    Color::Black
                };
                let value = ClockTime::from_millis(rng.gen_range(0..300_000));
                bench.engine.set_remaining(color, value);
                report.overrides += 1;
            }
            _ => {
                bench.advance(Duration::from_millis(rng.gen_range(0..30_000)));
            }
        }

        check_invariants(&bench);
    }

    report.zero_events = bench.recorder.zeros().len();
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_torture_run() {
        let report = run(TortureConfig::default());
        println!("torture: {report:?}");
        assert_eq!(report.steps, 2_000);
        assert!(report.taps > 0);
    }

    #[test]
    fn test_torture_across_seeds() {
        for seed in [1, 7, 42, 0xBEEF] {
            let report = run(TortureConfig {
                steps: 500,
                seed,
                ..TortureConfig::default()
            });
            println!("seed {seed}: {report:?}");
        }
    }

    #[test]
    fn test_torture_bullet_control() {
        // Short allocations make flags fall constantly mid-walk
        let report = run(TortureConfig {
            steps: 1_000,
            seed: 3,
            control: TimeControl::new(10.0, 1.0).expect("valid control"),
        });
        println!("bullet torture: {report:?}");
    }
}
