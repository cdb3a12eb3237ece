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

use crate::{CompletionProvider, CompletionStyle, EditBuffer};

/// One autocomplete session: the candidate list for the token that was under the
/// cursor when the session started, and the cycling position within it.
///
/// Candidates, the original token, and the surrounding line text are computed once on
/// entry and cached; cycling only moves `cursor` and re-splices the line. Any action
/// outside forward/backward completion discards the session, so the next completion
/// recomputes from scratch.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionSession {
    candidates: Vec<String>,
    cursor: usize,
    forward: bool,
    original_token: String,
    token_start: usize,
    prefix: String,
    tail: String,
}

impl CompletionSession {
    /// Enter autocomplete at the current cursor position. Identifies the token under
    /// the insertion point by word extent, asks the provider for candidates, and
    /// splices the first candidate (last, for a backward entry) over the token.
    ///
    /// Returns `None` (leaving the buffer untouched) when the provider has no
    /// candidates for the token. A candidate list containing a malformed (empty)
    /// entry is treated as empty.
    pub fn try_start(
        buffer: &mut EditBuffer,
        provider: &dyn CompletionProvider,
        style: CompletionStyle,
        forward: bool,
    ) -> Option<Self> {
        let insert_pos = buffer.insert_pos();
        let token_start = buffer.token_start(insert_pos);
        let original_token = buffer.slice(token_start, insert_pos);

        let candidates = provider.request_candidates(&original_token, style);
        if candidates.is_empty() || candidates.iter().any(String::is_empty) {
            return None;
        }

        let prefix = buffer.slice(0, token_start);
        let tail = buffer.slice(insert_pos, buffer.grapheme_count());
        let cursor = if forward { 0 } else { candidates.len() - 1 };

        tracing::debug!(
            token = %original_token,
            count = candidates.len(),
            "autocomplete session started"
        );

        let session = Self {
            candidates,
            cursor,
            forward,
            original_token,
            token_start,
            prefix,
            tail,
        };
        session.apply(buffer);
        Some(session)
    }

    /// Advance to the next candidate in the given direction, wrapping modulo the
    /// candidate count. Reversing direction consumes the step: the first action in
    /// the opposite direction flips the cycling direction and re-splices the current
    /// candidate without moving, so cycling forward `k` times and then backward `k`
    /// times lands back on the candidate shown after the first forward step.
    pub fn cycle(&mut self, buffer: &mut EditBuffer, forward: bool) {
        if self.forward == forward {
            let len = self.candidates.len();
            self.cursor = if forward {
                (self.cursor + 1) % len
            } else {
                (self.cursor + len - 1) % len
            };
        } else {
            self.forward = forward;
        }
        self.apply(buffer);
    }

    pub fn candidates(&self) -> &[String] { &self.candidates }

    pub fn cursor(&self) -> usize { self.cursor }

    pub fn original_token(&self) -> &str { &self.original_token }

    pub fn token_start(&self) -> usize { self.token_start }

    fn apply(&self, buffer: &mut EditBuffer) {
        buffer.splice(&self.prefix, &self.candidates[self.cursor], &self.tail);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    struct FixedCandidates(Vec<&'static str>);

    impl CompletionProvider for FixedCandidates {
        fn request_candidates(
            &self,
            _partial_token: &str,
            _style: CompletionStyle,
        ) -> Vec<String> {
            self.0.iter().map(ToString::to_string).collect()
        }
    }

    fn buffer_with(text: &str) -> EditBuffer {
        let mut buffer = EditBuffer::new();
        for c in text.chars() {
            buffer.insert_char(c);
        }
        buffer
    }

    #[test]
    fn test_start_splices_first_candidate_over_token() {
        let mut buffer = buffer_with("get re");
        let provider = FixedCandidates(vec!["remote", "reset", "rebase"]);
        let session = CompletionSession::try_start(
            &mut buffer,
            &provider,
            CompletionStyle::Unix,
            true,
        )
        .unwrap();

        assert_eq!(buffer.as_str(), "get remote");
        assert_eq!(buffer.insert_pos(), 10);
        assert_eq!(session.original_token(), "re");
        assert_eq!(session.token_start(), 4);
    }

    #[test]
    fn test_backward_entry_starts_at_last_candidate() {
        let mut buffer = buffer_with("re");
        let provider = FixedCandidates(vec!["remote", "reset", "rebase"]);
        CompletionSession::try_start(
            &mut buffer,
            &provider,
            CompletionStyle::Unix,
            false,
        )
        .unwrap();
        assert_eq!(buffer.as_str(), "rebase");
    }

    #[test]
    fn test_cycle_wraps_forward() {
        let mut buffer = buffer_with("re");
        let provider = FixedCandidates(vec!["remote", "reset"]);
        let mut session = CompletionSession::try_start(
            &mut buffer,
            &provider,
            CompletionStyle::Unix,
            true,
        )
        .unwrap();

        session.cycle(&mut buffer, true);
        assert_eq!(buffer.as_str(), "reset");
        session.cycle(&mut buffer, true);
        assert_eq!(buffer.as_str(), "remote");
    }

    #[test]
    fn test_forward_k_then_backward_k_returns_to_first_state() {
        let mut buffer = buffer_with("re");
        let provider = FixedCandidates(vec!["remote", "reset", "rebase"]);
        let mut session = CompletionSession::try_start(
            &mut buffer,
            &provider,
            CompletionStyle::Unix,
            true,
        )
        .unwrap();
        let after_first_forward = buffer.as_str().to_string();

        let k = 5;
        for _ in 1..k {
            session.cycle(&mut buffer, true);
        }
        for _ in 0..k {
            session.cycle(&mut buffer, false);
        }
        assert_eq!(buffer.as_str(), after_first_forward);
    }

    #[test]
    fn test_empty_candidate_list_is_noop() {
        let mut buffer = buffer_with("re");
        let provider = FixedCandidates(vec![]);
        let session = CompletionSession::try_start(
            &mut buffer,
            &provider,
            CompletionStyle::Unix,
            true,
        );
        assert!(session.is_none());
        assert_eq!(buffer.as_str(), "re");
    }

    #[test]
    fn test_malformed_candidate_list_is_treated_as_empty() {
        let mut buffer = buffer_with("re");
        let provider = FixedCandidates(vec!["remote", ""]);
        let session = CompletionSession::try_start(
            &mut buffer,
            &provider,
            CompletionStyle::Unix,
            true,
        );
        assert!(session.is_none());
        assert_eq!(buffer.as_str(), "re");
    }

    #[test]
    fn test_tail_after_cursor_is_preserved_across_cycles() {
        let mut buffer = buffer_with("re -v");
        buffer.set_cursor(2);
        let provider = FixedCandidates(vec!["remote", "reset"]);
        let mut session = CompletionSession::try_start(
            &mut buffer,
            &provider,
            CompletionStyle::Unix,
            true,
        )
        .unwrap();
        assert_eq!(buffer.as_str(), "remote -v");

        session.cycle(&mut buffer, true);
        assert_eq!(buffer.as_str(), "reset -v");
        assert_eq!(buffer.insert_pos(), 5);
    }
}
