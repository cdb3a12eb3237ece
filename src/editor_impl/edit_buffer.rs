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

use unicode_segmentation::UnicodeSegmentation;

/// The in-progress line being edited, plus the insertion point.
///
/// All positions are indices of extended grapheme clusters, not bytes, so cursor
/// arithmetic stays correct for multi-byte and combining input. The invariant
/// `0 <= insert_pos <= grapheme_count` holds after every operation; every operation is
/// total (out-of-range arguments clamp or no-op).
#[derive(Debug, Default, Clone, PartialEq)]
pub struct EditBuffer {
    /// Unicode line.
    line: String,

    /// Index of grapheme in line where the next character is inserted. Corresponds to
    /// the cursor on screen.
    insert_pos: usize,
}

impl EditBuffer {
    pub fn new() -> Self { Self::default() }

    pub fn as_str(&self) -> &str { &self.line }

    pub fn is_empty(&self) -> bool { self.line.is_empty() }

    pub fn insert_pos(&self) -> usize { self.insert_pos }

    pub fn grapheme_count(&self) -> usize { self.line.graphemes(true).count() }

    /// Byte offset of the grapheme cluster at `index`; `line.len()` when `index` is at
    /// or past the end.
    fn byte_offset(&self, index: usize) -> usize {
        self.line
            .grapheme_indices(true)
            .nth(index)
            .map_or(self.line.len(), |(offset, _)| offset)
    }

    fn grapheme_at(&self, index: usize) -> Option<&str> {
        self.line.graphemes(true).nth(index)
    }

    /// Insert `c` at the insertion point and advance the cursor. A combining mark that
    /// merges into the preceding cluster leaves the cursor on the merged cluster
    /// instead of advancing past it.
    pub fn insert_char(&mut self, c: char) {
        let offset = self.byte_offset(self.insert_pos);
        self.line.insert(offset, c);
        let end = offset + c.len_utf8();
        self.insert_pos = self.line[..end].graphemes(true).count();
    }

    /// Move the cursor by `delta` graphemes, clamped to `[0, grapheme_count]`.
    pub fn move_cursor(&mut self, delta: isize) {
        let count = self.grapheme_count();
        if delta >= 0 {
            self.insert_pos = usize::min(self.insert_pos + delta as usize, count);
        } else {
            self.insert_pos = self.insert_pos.saturating_sub(delta.unsigned_abs());
        }
    }

    /// Place the cursor at `pos`, clamped to the end of the line.
    pub fn set_cursor(&mut self, pos: usize) {
        self.insert_pos = usize::min(pos, self.grapheme_count());
    }

    pub fn move_cursor_to_start(&mut self) { self.insert_pos = 0; }

    pub fn move_cursor_to_end(&mut self) { self.insert_pos = self.grapheme_count(); }

    /// Remove the grapheme range `[start, end)` and reposition the cursor to `start`.
    /// Silently a no-op when `start >= end` or either bound is out of range.
    pub fn delete_range(&mut self, start: usize, end: usize) {
        let count = self.grapheme_count();
        if start >= end || end > count {
            return;
        }
        let byte_start = self.byte_offset(start);
        let byte_end = self.byte_offset(end);
        self.line.replace_range(byte_start..byte_end, "");
        self.insert_pos = start;
    }

    pub fn clear(&mut self) {
        self.line.clear();
        self.insert_pos = 0;
    }

    /// Replace the whole line, cursor at the end. Used by history recall and search.
    pub fn set_text(&mut self, text: &str) {
        self.line.clear();
        self.line.push_str(text);
        self.insert_pos = self.grapheme_count();
    }

    /// Take the line out, leaving the buffer empty with the cursor at 0.
    pub fn take_text(&mut self) -> String {
        self.insert_pos = 0;
        std::mem::take(&mut self.line)
    }

    /// Rebuild the line as `prefix + middle + tail` with the cursor at the end of
    /// `middle`. Used by autocomplete to splice a candidate over the current token.
    pub fn splice(&mut self, prefix: &str, middle: &str, tail: &str) {
        self.line.clear();
        self.line.push_str(prefix);
        self.line.push_str(middle);
        self.line.push_str(tail);
        self.insert_pos =
            prefix.graphemes(true).count() + middle.graphemes(true).count();
    }

    /// Copy of the grapheme range `[start, end)`, bounds clamped.
    pub fn slice(&self, start: usize, end: usize) -> String {
        let count = self.grapheme_count();
        let start = usize::min(start, count);
        let end = usize::min(end, count);
        if start >= end {
            return String::new();
        }
        self.line[self.byte_offset(start)..self.byte_offset(end)].to_string()
    }

    /// Word boundary scan. Moving forward: skip the remainder of the current word
    /// (non-space run), then any run of spaces, landing on the first non-space
    /// grapheme or the end of the line. Moving backward is the mirror: skip spaces,
    /// then skip the preceding non-space run, landing on the start of that word.
    pub fn find_word_boundary(&self, from: usize, forward: bool) -> usize {
        let count = self.grapheme_count();
        let mut pos = usize::min(from, count);
        if forward {
            while pos < count && !self.is_space_at(pos) {
                pos += 1;
            }
            while pos < count && self.is_space_at(pos) {
                pos += 1;
            }
        } else {
            while pos > 0 && self.is_space_at(pos - 1) {
                pos -= 1;
            }
            while pos > 0 && !self.is_space_at(pos - 1) {
                pos -= 1;
            }
        }
        pos
    }

    /// Start of the word containing (or immediately preceding) `pos`. The token under
    /// the cursor for autocomplete purposes is `[token_start(pos), pos)`.
    pub fn token_start(&self, pos: usize) -> usize {
        let mut start = usize::min(pos, self.grapheme_count());
        while start > 0 && !self.is_space_at(start - 1) {
            start -= 1;
        }
        start
    }

    fn is_space_at(&self, index: usize) -> bool {
        self.grapheme_at(index)
            .is_some_and(|g| g.chars().all(char::is_whitespace))
    }
}
