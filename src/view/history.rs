//! Bounded, most-recent-first history of text analyses.

use crate::models::{HistoryEntry, TextAnalysis};
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    limit: usize,
}

impl History {
    /// A limit of zero is raised to one.
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            entries: VecDeque::with_capacity(limit),
            limit,
        }
    }

    /// Prepend an entry for `analysis`, evicting the oldest beyond the limit.
    pub fn record(&mut self, analysis: TextAnalysis) -> &HistoryEntry {
        self.entries.push_front(HistoryEntry::new(analysis));
        self.entries.truncate(self.limit);
        &self.entries[0]
    }

    #[cfg(test)]
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    /// Entries, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}
