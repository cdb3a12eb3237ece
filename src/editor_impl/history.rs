/*
 *   Copyright (c) 2024 R3BL LLC
 *   All rights reserved.
 *
 *   Licensed under the Apache License, Version 2.0 (the "License");
 *   you may not use this file except in compliance with the License.
 *   You may obtain a copy of the License at
 *
 *   http://www.apache.org/licenses/LICENSE-2.0
 *
 *   Unless required by applicable law or agreed to in writing, software
 *   distributed under the License is distributed on an "AS IS" BASIS,
 *   WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *   See the License for the specific language governing permissions and
 *   limitations under the License.
 */

use std::collections::VecDeque;

use crate::MAX_HISTORY_ENTRIES;

/// Bounded, most-recent-first log of submitted lines.
///
/// Index 0 is the newest entry. Recording a line beyond [`MAX_HISTORY_ENTRIES`] evicts
/// the oldest. The store itself is never mutated by recall or search; only successful
/// line submission (with echo enabled) appends to it.
#[derive(Debug)]
pub struct History {
    entries: VecDeque<String>,
    max_size: usize,
}

impl Default for History {
    fn default() -> Self {
        Self {
            entries: VecDeque::default(),
            max_size: MAX_HISTORY_ENTRIES,
        }
    }
}

impl History {
    pub fn new() -> Self { Self::default() }

    #[cfg(test)]
    pub fn with_max_size(max_size: usize) -> Self {
        Self {
            entries: VecDeque::default(),
            max_size,
        }
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Entry at distance `index` from the newest (0 = most recent).
    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    /// Newest-first iteration.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Record a submitted line as the newest entry, evicting the oldest entry once the
    /// bound is exceeded.
    pub fn record(&mut self, line: String) {
        self.entries.push_front(line);
        if self.entries.len() > self.max_size {
            let evicted = self.entries.pop_back();
            tracing::debug!(?evicted, "history bound reached, oldest entry evicted");
        }
    }

    /// Replace the whole store from an oldest-first list, keeping at most the newest
    /// `max_size` entries. Used when loading persisted history.
    pub fn replace_all_from_oldest(&mut self, lines_oldest_first: Vec<String>) {
        self.entries.clear();
        for line in lines_oldest_first {
            self.entries.push_front(line);
        }
        self.entries.truncate(self.max_size);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_record_is_newest_first() {
        let mut history = History::new();
        history.record("one".into());
        history.record("two".into());
        assert_eq!(history.get(0), Some("two"));
        assert_eq!(history.get(1), Some("one"));
    }

    #[test]
    fn test_bound_evicts_oldest() {
        let mut history = History::new();
        for n in 1..=(MAX_HISTORY_ENTRIES + 1) {
            history.record(format!("cmd {n}"));
        }
        assert_eq!(history.len(), MAX_HISTORY_ENTRIES);
        // The oldest entry is gone; the newest 20 remain in order.
        assert_eq!(history.get(0), Some("cmd 21"));
        assert_eq!(
            history.get(MAX_HISTORY_ENTRIES - 1),
            Some("cmd 2"),
            "cmd 1 must have been evicted"
        );
    }

    #[test]
    fn test_replace_all_from_oldest() {
        let mut history = History::with_max_size(2);
        history.replace_all_from_oldest(vec!["a".into(), "b".into(), "c".into()]);
        assert_eq!(history.len(), 2);
        assert_eq!(history.get(0), Some("c"));
        assert_eq!(history.get(1), Some("b"));
    }
}
