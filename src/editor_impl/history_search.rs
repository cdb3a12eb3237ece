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

use crate::History;

/// State of an in-flight incremental history search.
///
/// Exists only while the editor is in search mode; any action outside the search action
/// set destroys it (after the matched line is committed as the live line).
///
/// Direction convention: a *backward* search walks from the newest entry toward older
/// ones (history index increasing); a *forward* search walks toward newer entries
/// (index decreasing). Matching is substring containment of `query` in the entry.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchState {
    forward: bool,
    query: String,
    match_index: Option<usize>,
    failed: bool,
}

impl SearchState {
    pub fn new(forward: bool) -> Self {
        Self {
            forward,
            query: String::new(),
            match_index: None,
            failed: false,
        }
    }

    pub fn forward(&self) -> bool { self.forward }

    pub fn query(&self) -> &str { &self.query }

    pub fn match_index(&self) -> Option<usize> { self.match_index }

    /// True when the last query edit or repeat found no entry containing the query.
    /// The query keeps growing on a failed search; the match and the live line stay
    /// where they were, so the user can correct or broaden the query.
    pub fn failed(&self) -> bool { self.failed }

    /// Grow the query by one character and re-scan, starting at the current match
    /// (inclusive, since the current match may still contain the longer query) or at
    /// the newest entry when nothing has matched yet.
    ///
    /// Returns the new match index when the match moved or was established.
    pub fn push_query_char(&mut self, c: char, history: &History) -> Option<usize> {
        self.query.push(c);
        self.apply_scan(scan(
            history,
            &self.query,
            self.match_index,
            self.forward,
            true,
        ))
    }

    /// Shrink the query from the tail and re-run a full scan from the newest entry,
    /// since shortening a query can only reveal matches at an earlier scan position.
    pub fn pop_query_char(&mut self, history: &History) -> Option<usize> {
        if self.query.pop().is_none() {
            return None;
        }
        self.apply_scan(scan(history, &self.query, None, false, true))
    }

    /// Repeat the search. Same direction: advance past the current match before
    /// scanning, so the next distinct entry is found. Opposite direction: flip the
    /// stored direction and step the other way from the current position.
    pub fn repeat(&mut self, forward: bool, history: &History) -> Option<usize> {
        self.forward = forward;
        let result = match self.match_index {
            Some(_) => {
                scan(history, &self.query, self.match_index, self.forward, false)
            }
            None => scan(history, &self.query, None, self.forward, true),
        };
        self.apply_scan(result)
    }

    fn apply_scan(&mut self, result: Option<usize>) -> Option<usize> {
        match result {
            Some(index) => {
                self.failed = false;
                let moved = self.match_index != Some(index);
                self.match_index = Some(index);
                tracing::debug!(query = %self.query, index, "history search matched");
                moved.then_some(index)
            }
            None => {
                self.failed = true;
                tracing::debug!(query = %self.query, "history search found no match");
                None
            }
        }
    }
}

/// Scan the history for the first entry containing `query`, starting at `start` (the
/// newest entry when `None`), moving toward older entries on a backward search and
/// toward newer ones on a forward search. `inclusive` controls whether the starting
/// entry itself is tested; a repeat in the same direction scans exclusively, so
/// entries are never revisited within a single directional run.
fn scan(
    history: &History,
    query: &str,
    start: Option<usize>,
    forward: bool,
    inclusive: bool,
) -> Option<usize> {
    if history.is_empty() {
        return None;
    }

    let mut index = match (start, inclusive) {
        (None, _) => Some(0),
        (Some(i), true) => Some(i),
        (Some(i), false) => step(i, forward, history.len()),
    };

    while let Some(i) = index {
        match history.get(i) {
            Some(entry) if entry.contains(query) => return Some(i),
            Some(_) => index = step(i, forward, history.len()),
            None => return None,
        }
    }
    None
}

/// One step older (backward) or newer (forward); `None` at either bound.
fn step(index: usize, forward: bool, len: usize) -> Option<usize> {
    if forward {
        index.checked_sub(1)
    } else {
        let next = index + 1;
        (next < len).then_some(next)
    }
}
