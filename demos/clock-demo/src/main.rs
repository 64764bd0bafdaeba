//! Interactive two-player clock in the terminal
//!
//! Commands:
//! - `tap` (or empty line): complete the current ply
//! - `pause` / `resume`
//! - `undo <n>`: rewind n plies
//! - `set <w|b> <seconds>`: override remaining time
//! - `time`: print both clocks
//! - `quit`
//!
//! Usage: clock-demo [minutes] [increment-seconds]

use std::error::Error;

use tokio::io::{stdin, AsyncBufReadExt, BufReader};
use tokio::task::LocalSet;

use zeitnot_clock::ClockEngine;
use zeitnot_core::{ClockEvent, ClockTime, Color, TimeControl};
use zeitnot_runtime::{init_tracing, spawn_engine};

fn parse_control() -> Result<TimeControl, Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let minutes: u32 = match args.next() {
        Some(m) => m.parse()?,
        None => 5,
    };
    let increment: f64 = match args.next() {
        Some(i) => i.parse()?,
        None => 0.0,
    };
    Ok(TimeControl::fischer(minutes, increment)?)
}

fn print_clocks(engine: &ClockEngine) {
    let mover = engine.moving_color();
    for color in [Color::White, Color::Black] {
        let marker = if color == mover { ">" } else { " " };
        println!("{marker} {color}: {:?}", engine.remaining(color));
    }
}

async fn run(engine: ClockEngine) -> Result<(), Box<dyn Error>> {
    let mut lines = BufReader::new(stdin()).lines();

    print_clocks(&engine);
    while let Some(line) = lines.next_line().await? {
        let mut words = line.split_whitespace();
        match words.next().unwrap_or("tap") {
            "tap" => engine.tap(),
            "pause" => engine.pause(),
            "resume" => engine.resume(),
            "undo" => {
                let n: usize = words.next().and_then(|w| w.parse().ok()).unwrap_or(1);
                if let Err(e) = engine.undo_plies(n) {
                    println!("{e}");
                }
            }
            "set" => {
                let color = match words.next() {
                    Some("w") => Color::White,
                    Some("b") => Color::Black,
                    _ => {
                        println!("set <w|b> <seconds>");
                        continue;
                    }
                };
                let secs: f64 = words.next().and_then(|w| w.parse().ok()).unwrap_or(0.0);
                engine.set_remaining(color, ClockTime::from_secs_f64(secs));
            }
            "time" => {}
            "quit" | "end" => {
                engine.end();
                break;
            }
            other => println!("Unknown command: {other}"),
        }
        if engine.is_ended() {
            break;
        }
        print_clocks(&engine);
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();

    let control = parse_control()?;
    println!("Zeitnot clock demo - {}", control.display_text());
    println!("Commands: tap pause resume undo set time quit");
    println!();

    let local = LocalSet::new();
    local
        .run_until(async move {
            let engine = spawn_engine(control);
            engine.subscribe(|event| {
                if let ClockEvent::ZeroReached(color) = event {
                    println!("*** {color} flag has fallen ***");
                }
            });
            run(engine).await
        })
        .await
}
