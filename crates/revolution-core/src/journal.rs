//! Bounded narrative journal.

use std::collections::VecDeque;

use revolution_types::JournalLine;

/// Journal lines, oldest first, capped at a fixed length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Journal {
    lines: VecDeque<JournalLine>,
    cap: usize,
}

impl Journal {
    /// An empty journal holding at most `cap` lines.
    pub fn new(cap: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            cap: cap.max(1),
        }
    }

    /// Append a line, evicting the oldest past the cap.
    pub fn push(&mut self, turn: u64, text: impl Into<String>) -> JournalLine {
        let line = JournalLine {
            turn,
            text: text.into(),
        };
        self.lines.push_back(line.clone());
        while self.lines.len() > self.cap {
            self.lines.pop_front();
        }
        line
    }

    /// The last `n` lines, oldest first.
    pub fn recent(&self, n: usize) -> Vec<JournalLine> {
        let skip = self.lines.len().saturating_sub(n);
        self.lines.iter().skip(skip).cloned().collect()
    }

    /// Copy of every line.
    pub fn lines(&self) -> Vec<JournalLine> {
        self.lines.iter().cloned().collect()
    }

    /// Replace the contents, keeping the newest lines that fit.
    pub fn restore(&mut self, lines: &[JournalLine]) {
        let skip = lines.len().saturating_sub(self.cap);
        self.lines = lines.iter().skip(skip).cloned().collect();
    }

    /// Drop every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Number of lines held.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the journal is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oldest_lines_are_evicted() {
        let mut journal = Journal::new(3);
        for turn in 0..5 {
            journal.push(turn, format!("line {turn}"));
        }
        let turns: Vec<u64> = journal.lines().iter().map(|l| l.turn).collect();
        assert_eq!(turns, [2, 3, 4]);
    }

    #[test]
    fn recent_is_oldest_first() {
        let mut journal = Journal::new(10);
        journal.push(1, "a");
        journal.push(2, "b");
        journal.push(3, "c");
        let texts: Vec<String> = journal.recent(2).into_iter().map(|l| l.text).collect();
        assert_eq!(texts, ["b", "c"]);
        assert_eq!(journal.recent(50).len(), 3);
    }

    #[test]
    fn restore_truncates_to_cap() {
        let mut journal = Journal::new(2);
        let lines: Vec<JournalLine> = (0..4)
            .map(|turn| JournalLine {
                turn,
                text: String::new(),
            })
            .collect();
        journal.restore(&lines);
        assert_eq!(journal.len(), 2);
        assert_eq!(journal.lines().first().map(|l| l.turn), Some(2));
    }
}
