use std::io::{self, Write};

use crate::engine::{EventOutcome, MatchEngine, ToggleOutcome};
use crate::pad::display_token;
use crate::runtime::{DrumEvent, DrumEventSource, Runner, Ticker};
use crate::sheet::Judgement;

/// How a headless run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadlessEnd {
    Completed { accuracy: u32 },
    InputClosed,
}

/// One printable line per processed hit.
pub fn describe(raw: &str, outcome: &EventOutcome, total: usize) -> String {
    let token = display_token(raw);
    match outcome {
        EventOutcome::Unmatched(_) => format!("· {token}"),
        EventOutcome::Matched {
            judgement: Judgement::Correct,
            step,
            ..
        } => format!("✓ {token}  [{}/{total}]", step + 1),
        EventOutcome::Matched { step, expected, .. } => {
            format!("✗ {token} (expected {expected})  [{}/{total}]", step + 1)
        }
    }
}

pub fn summary(engine: &MatchEngine) -> String {
    let snap = engine.snapshot();
    let (done, total) = snap.progress();
    if engine.session().is_complete() {
        format!(
            "complete: {}/{} correct, accuracy {}%",
            snap.stats.correct, total, snap.stats.accuracy
        )
    } else {
        format!(
            "stopped: {done}/{total} steps, {} correct, {} wrong, accuracy {}%",
            snap.stats.correct, snap.stats.wrong, snap.stats.accuracy
        )
    }
}

/// Start the loaded sheet and judge hits from the runner until the sheet is
/// finished or the input goes away.
pub fn run_headless<E, T, W>(
    runner: &Runner<E, T>,
    engine: &mut MatchEngine,
    out: &mut W,
) -> io::Result<HeadlessEnd>
where
    E: DrumEventSource,
    T: Ticker,
    W: Write,
{
    if let ToggleOutcome::Warning(w) = engine.toggle_running() {
        writeln!(out, "warning: {w}")?;
    }

    let total = engine.session().sheet.len();
    loop {
        match runner.poll() {
            Some(DrumEvent::Hit(raw)) => {
                let outcome = engine.process_event(&raw);
                writeln!(out, "{}", describe(&raw, &outcome, total))?;
                if let Some(accuracy) = outcome.completed() {
                    writeln!(out, "{}", summary(engine))?;
                    return Ok(HeadlessEnd::Completed { accuracy });
                }
            }
            Some(DrumEvent::Disconnected) | None => {
                writeln!(out, "{}", summary(engine))?;
                return Ok(HeadlessEnd::InputClosed);
            }
            Some(DrumEvent::Tick | DrumEvent::Key(_) | DrumEvent::Resize) => {}
        }
    }
}
