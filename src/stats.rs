/// Colour band for the accuracy readout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum AccuracyBand {
    Neutral,
    Low,
    Medium,
    High,
}

/// Running totals for a session, derived from the engine's counters and
/// recomputed whenever they change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    pub attempts: usize,
    pub correct: usize,
    pub wrong: usize,
    pub accuracy: u32,
}

impl Stats {
    pub fn from_counts(correct: usize, wrong: usize) -> Self {
        let attempts = correct + wrong;
        Self {
            attempts,
            correct,
            wrong,
            accuracy: accuracy(correct, attempts),
        }
    }

    pub fn band(&self) -> AccuracyBand {
        band(self.accuracy, self.attempts)
    }
}

/// Whole-percent accuracy, ties rounded to even (1/8 is 12%). Zero when
/// nothing has been attempted.
pub fn accuracy(correct: usize, attempts: usize) -> u32 {
    if attempts == 0 {
        return 0;
    }
    ((correct as f64 / attempts as f64) * 100.0).round_ties_even() as u32
}

pub fn band(accuracy: u32, attempts: usize) -> AccuracyBand {
    if attempts == 0 {
        AccuracyBand::Neutral
    } else if accuracy >= 90 {
        AccuracyBand::High
    } else if accuracy >= 70 {
        AccuracyBand::Medium
    } else {
        AccuracyBand::Low
    }
}

/// Progress through a sheet as `(done, total)`.
pub fn progress(cursor: usize, len: usize) -> (usize, usize) {
    (cursor.min(len), len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy_rounding() {
        assert_eq!(accuracy(2, 3), 67);
        assert_eq!(accuracy(1, 3), 33);
        assert_eq!(accuracy(1, 2), 50);
        assert_eq!(accuracy(1, 8), 12);
        assert_eq!(accuracy(3, 8), 38);
        assert_eq!(accuracy(5, 8), 62);
        assert_eq!(accuracy(5, 5), 100);
    }

    #[test]
    fn test_accuracy_no_attempts() {
        assert_eq!(accuracy(0, 0), 0);
        assert_eq!(Stats::default().accuracy, 0);
    }

    #[test]
    fn test_band_edges() {
        assert_eq!(band(0, 0), AccuracyBand::Neutral);
        assert_eq!(band(100, 0), AccuracyBand::Neutral);
        assert_eq!(band(90, 10), AccuracyBand::High);
        assert_eq!(band(89, 10), AccuracyBand::Medium);
        assert_eq!(band(70, 10), AccuracyBand::Medium);
        assert_eq!(band(69, 10), AccuracyBand::Low);
        assert_eq!(band(0, 1), AccuracyBand::Low);
    }

    #[test]
    fn test_stats_from_counts() {
        let stats = Stats::from_counts(2, 1);
        assert_eq!(stats.attempts, 3);
        assert_eq!(stats.accuracy, 67);
        assert_eq!(stats.band(), AccuracyBand::Low);
        assert_eq!(stats.attempts, stats.correct + stats.wrong);
    }

    #[test]
    fn test_progress_clamps() {
        assert_eq!(progress(2, 5), (2, 5));
        assert_eq!(progress(7, 5), (5, 5));
        assert_eq!(progress(0, 0), (0, 0));
    }
}
