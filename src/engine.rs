use std::fmt;

use log::{debug, info, warn};

use crate::audio::{AudioSink, SilentAudio};
use crate::history::{HistoryEntry, HistoryFeed, HitJudgement, DEFAULT_HISTORY_CAPACITY};
use crate::pad::{display_token, normalize, PadId};
use crate::session::{EngineState, Session};
use crate::sheet::{Judgement, SheetStep, SheetToken};
use crate::stats::Stats;

/// Why a control request was refused. The engine is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlWarning {
    EmptySheet,
    AlreadyComplete,
}

impl fmt::Display for ControlWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlWarning::EmptySheet => f.write_str("load a sheet first"),
            ControlWarning::AlreadyComplete => f.write_str("sheet is complete, reset to play again"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Started,
    Paused,
    Warning(ControlWarning),
}

/// Result of feeding one raw token to the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    /// Nothing was running; the hit is only sounded and logged.
    Unmatched(Option<PadId>),
    /// The hit was judged against the step at `step`.
    Matched {
        judgement: Judgement,
        struck: Option<PadId>,
        step: usize,
        expected: SheetToken,
        /// Final accuracy when this hit finished the sheet.
        completed: Option<u32>,
    },
}

impl EventOutcome {
    pub fn struck(&self) -> Option<PadId> {
        match self {
            EventOutcome::Unmatched(pad) => *pad,
            EventOutcome::Matched { struck, .. } => *struck,
        }
    }

    pub fn hit_judgement(&self) -> HitJudgement {
        match self {
            EventOutcome::Matched {
                judgement: Judgement::Correct,
                ..
            } => HitJudgement::Correct,
            EventOutcome::Matched { .. } => HitJudgement::Wrong,
            EventOutcome::Unmatched(_) => HitJudgement::Neutral,
        }
    }

    pub fn completed(&self) -> Option<u32> {
        match self {
            EventOutcome::Matched { completed, .. } => *completed,
            EventOutcome::Unmatched(_) => None,
        }
    }
}

/// Read-only view of the session handed to observers.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSnapshot {
    pub steps: Vec<SheetStep>,
    pub cursor: usize,
    pub is_running: bool,
    pub state: EngineState,
    pub stats: Stats,
}

impl EngineSnapshot {
    pub fn progress(&self) -> (usize, usize) {
        crate::stats::progress(self.cursor, self.steps.len())
    }
}

/// Matches incoming hits against the loaded sheet.
///
/// The engine is the single owner of the session and the hit feed. Every
/// mutation goes through `&mut self`, so whoever drives it (the event loop)
/// is the only writer.
pub struct MatchEngine {
    session: Session,
    history: HistoryFeed,
    audio: Box<dyn AudioSink>,
}

impl MatchEngine {
    pub fn new(audio: Box<dyn AudioSink>, history_capacity: usize) -> Self {
        Self {
            session: Session::default(),
            history: HistoryFeed::new(history_capacity),
            audio,
        }
    }

    pub fn silent() -> Self {
        Self::new(Box::new(SilentAudio), DEFAULT_HISTORY_CAPACITY)
    }

    /// Replace the sheet. Unknown tokens become steps that can never be hit
    /// correctly.
    pub fn load_sheet<S: AsRef<str>>(&mut self, tokens: &[S]) {
        let parsed: Vec<SheetToken> = tokens
            .iter()
            .map(|t| t.as_ref())
            .filter(|t| !t.trim().is_empty())
            .map(SheetToken::parse)
            .collect();

        let unmatchable = parsed.iter().filter(|t| t.pad().is_none()).count();
        if unmatchable > 0 {
            warn!("sheet has {unmatchable} unrecognized step(s); they can't be matched");
        }

        self.session = Session::with_sheet(parsed);
        info!(
            "loaded sheet ({} steps): {}",
            self.session.sheet.len(),
            self.sheet_tokens().join(" ")
        );
    }

    pub fn load_sheet_text(&mut self, text: &str) {
        let tokens = crate::sheet::tokenize(text);
        self.load_sheet(&tokens);
    }

    pub fn toggle_running(&mut self) -> ToggleOutcome {
        let outcome = match self.session.state() {
            _ if self.session.sheet.is_empty() => ToggleOutcome::Warning(ControlWarning::EmptySheet),
            EngineState::Complete => ToggleOutcome::Warning(ControlWarning::AlreadyComplete),
            EngineState::Running => {
                self.session.is_running = false;
                ToggleOutcome::Paused
            }
            EngineState::Idle => {
                self.session.is_running = true;
                ToggleOutcome::Started
            }
        };

        match outcome {
            ToggleOutcome::Started => info!("matching started: {}", self.sheet_tokens().join(" ")),
            ToggleOutcome::Paused => info!("matching paused at step {}", self.session.cursor),
            ToggleOutcome::Warning(w) => warn!("{w}"),
        }
        outcome
    }

    pub fn reset(&mut self) {
        self.session.rewind();
        info!("sheet reset");
    }

    pub fn process_event(&mut self, raw: &str) -> EventOutcome {
        let struck = normalize(raw);
        if struck.is_none() {
            warn!("unknown token: '{}'", raw.trim());
        }

        let outcome = if self.session.state() != EngineState::Running {
            EventOutcome::Unmatched(struck)
        } else {
            let step = self.session.cursor;
            let expected = self.session.sheet[step].expected.clone();
            let judgement = self.session.judge_current(expected.matches(struck));

            match judgement {
                Judgement::Correct => debug!("step {step}: correct ({expected})"),
                _ => debug!(
                    "step {step}: wrong, got {} expected {expected}",
                    display_token(raw)
                ),
            }

            let completed = if self.session.is_complete() {
                let accuracy = self.session.stats().accuracy;
                info!("sheet complete, accuracy {accuracy}%");
                Some(accuracy)
            } else {
                None
            };

            EventOutcome::Matched {
                judgement,
                struck,
                step,
                expected,
                completed,
            }
        };

        if let Some(pad) = struck {
            self.audio.play(pad);
        }
        self.history
            .append(HistoryEntry::new(display_token(raw), outcome.hit_judgement()));

        outcome
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            steps: self.session.sheet.clone(),
            cursor: self.session.cursor,
            is_running: self.session.is_running,
            state: self.session.state(),
            stats: self.session.stats(),
        }
    }

    pub fn history_snapshot(&self) -> Vec<HistoryEntry> {
        self.history.snapshot()
    }

    pub fn history(&self) -> &HistoryFeed {
        &self.history
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> EngineState {
        self.session.state()
    }

    pub fn stats(&self) -> Stats {
        self.session.stats()
    }

    pub fn sheet_tokens(&self) -> Vec<String> {
        self.session
            .sheet
            .iter()
            .map(|step| step.expected.to_string())
            .collect()
    }
}

impl Default for MatchEngine {
    fn default() -> Self {
        Self::silent()
    }
}

impl fmt::Debug for MatchEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchEngine")
            .field("session", &self.session)
            .field("history", &self.history)
            .finish_non_exhaustive()
    }
}
