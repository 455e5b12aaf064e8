use crate::sheet::{Judgement, SheetStep, SheetToken};
use crate::stats::Stats;

/// Coarse state of a session, derived from the sheet, cursor and run flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum EngineState {
    Idle,
    Running,
    Complete,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub sheet: Vec<SheetStep>,
    pub cursor: usize,
    pub is_running: bool,
    pub attempts: usize,
    pub correct: usize,
    pub wrong: usize,
}

impl Session {
    pub fn with_sheet(tokens: Vec<SheetToken>) -> Self {
        Self {
            sheet: tokens.into_iter().map(SheetStep::new).collect(),
            ..Self::default()
        }
    }

    pub fn state(&self) -> EngineState {
        if self.sheet.is_empty() {
            EngineState::Idle
        } else if self.cursor >= self.sheet.len() {
            EngineState::Complete
        } else if self.is_running {
            EngineState::Running
        } else {
            EngineState::Idle
        }
    }

    pub fn is_complete(&self) -> bool {
        self.state() == EngineState::Complete
    }

    pub fn expected(&self) -> Option<&SheetToken> {
        self.sheet.get(self.cursor).map(|step| &step.expected)
    }

    pub fn stats(&self) -> Stats {
        Stats::from_counts(self.correct, self.wrong)
    }

    /// Rewind to the first step and clear every judgement. The sheet itself
    /// is left alone.
    pub fn rewind(&mut self) {
        self.cursor = 0;
        self.attempts = 0;
        self.correct = 0;
        self.wrong = 0;
        self.is_running = false;
        for step in &mut self.sheet {
            step.judgement = Judgement::Pending;
        }
    }

    /// Record the verdict for the step under the cursor and advance.
    /// Callers must only do this while running.
    pub(crate) fn judge_current(&mut self, correct: bool) -> Judgement {
        let judgement = if correct {
            self.correct += 1;
            Judgement::Correct
        } else {
            self.wrong += 1;
            Judgement::Wrong
        };
        self.attempts += 1;
        if let Some(step) = self.sheet.get_mut(self.cursor) {
            step.judgement = judgement;
        }
        self.cursor += 1;
        if self.cursor >= self.sheet.len() {
            self.is_running = false;
        }
        judgement
    }
}
