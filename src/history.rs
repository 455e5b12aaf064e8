use chrono::{DateTime, Local};
use std::collections::VecDeque;

pub const DEFAULT_HISTORY_CAPACITY: usize = 20;

/// How a hit was judged, from the feed's point of view. Hits that arrive
/// while no sheet is running are `Neutral`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum HitJudgement {
    Correct,
    Wrong,
    Neutral,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub display_token: String,
    pub judgement: HitJudgement,
    pub timestamp: DateTime<Local>,
}

impl HistoryEntry {
    pub fn new(display_token: impl Into<String>, judgement: HitJudgement) -> Self {
        Self {
            display_token: display_token.into(),
            judgement,
            timestamp: Local::now(),
        }
    }

    pub fn clock(&self) -> String {
        self.timestamp.format("%H:%M:%S").to_string()
    }
}

/// Fixed-capacity feed of recent hits. Stored oldest first; the oldest entry
/// is dropped once capacity is exceeded.
#[derive(Debug, Clone)]
pub struct HistoryFeed {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl HistoryFeed {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn append(&mut self, entry: HistoryEntry) {
        self.entries.push_back(entry);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn snapshot(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }

    /// Newest first, the way the feed is usually displayed.
    pub fn iter_recent(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter().rev()
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for HistoryFeed {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_new_is_empty() {
        let feed = HistoryFeed::default();
        assert!(feed.is_empty());
        assert_eq!(feed.capacity(), 20);
        assert!(feed.latest().is_none());
    }

    #[test]
    fn test_feed_keeps_last_twenty_of_twenty_five() {
        let mut feed = HistoryFeed::new(20);
        for i in 0..25 {
            feed.append(HistoryEntry::new(i.to_string(), HitJudgement::Neutral));
        }

        let tokens: Vec<String> = feed
            .snapshot()
            .into_iter()
            .map(|e| e.display_token)
            .collect();
        let expected: Vec<String> = (5..25).map(|i| i.to_string()).collect();
        assert_eq!(feed.len(), 20);
        assert_eq!(tokens, expected);
    }

    #[test]
    fn test_iter_recent_is_newest_first() {
        let mut feed = HistoryFeed::new(3);
        feed.append(HistoryEntry::new("RH", HitJudgement::Correct));
        feed.append(HistoryEntry::new("LH", HitJudgement::Wrong));
        feed.append(HistoryEntry::new("RF", HitJudgement::Neutral));

        let recent: Vec<&str> = feed.iter_recent().map(|e| e.display_token.as_str()).collect();
        assert_eq!(recent, vec!["RF", "LH", "RH"]);
        assert_eq!(feed.latest().unwrap().judgement, HitJudgement::Neutral);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut feed = HistoryFeed::new(0);
        feed.append(HistoryEntry::new("RH", HitJudgement::Correct));
        feed.append(HistoryEntry::new("LH", HitJudgement::Correct));
        assert_eq!(feed.len(), 1);
        assert_eq!(feed.latest().unwrap().display_token, "LH");
    }

    #[test]
    fn test_clock_format() {
        let entry = HistoryEntry::new("RH", HitJudgement::Correct);
        let clock = entry.clock();
        assert_eq!(clock.len(), 8);
        assert_eq!(clock.matches(':').count(), 2);
    }

    #[test]
    fn test_judgement_display() {
        assert_eq!(HitJudgement::Correct.to_string(), "correct");
        assert_eq!(HitJudgement::Neutral.to_string(), "neutral");
    }
}
