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

use std::{collections::VecDeque, sync::Arc};

use strum_macros::Display;

use crate::{CompletionProvider, CompletionSession, CompletionStyle, EditBuffer,
            History, SearchState};

/// A discrete editing action, produced by the host's keystroke interpretation and fed
/// to [`EditorModel::perform_action`]. Plain printable characters do not arrive as
/// actions; they go through [`EditorModel::add_input_char`].
#[derive(Debug, Clone, PartialEq, Display)]
pub enum EditorAction {
    CursorLeft,
    CursorRight,
    CursorHome,
    CursorEnd,
    WordLeft,
    WordRight,
    DeleteCharLeft,
    DeleteCharRight,
    DeleteWordLeft,
    DeleteWordRight,
    ClearLine,
    HistoryUp,
    HistoryDown,
    HistoryOldest,
    HistoryNewest,
    SearchHistoryBackward,
    SearchHistoryForward,
    CompleteForward,
    CompleteBackward,
    /// Bulk insertion; the payload is fed through the model one character at a time,
    /// so embedded line terminators complete lines exactly as typed input would.
    Paste(String),
}

/// The four mutually exclusive interpretations of incoming input. Mode-specific state
/// lives only in its own variant, so exiting a mode and committing its result is an
/// exhaustive transition rather than a flag check.
#[derive(Debug, Default)]
enum EditorMode {
    #[default]
    Normal,
    /// Walking previously submitted lines. `snapshot` is the in-progress line captured
    /// on the first history keypress; `index == None` means the walk is back at the
    /// snapshot.
    HistoryActive {
        snapshot: String,
        index: Option<usize>,
    },
    SearchActive(SearchState),
    AutocompleteActive(CompletionSession),
}

/// One step of history recall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecallMove {
    Older,
    Newer,
    Oldest,
    Newest,
}

/// The line editor model: receives characters and discrete editing actions, mutates
/// its internal state, and raises redraw/newline flags for the driver to act on.
///
/// See the crate docs for the overall control flow. Every operation is total: empty
/// history, out-of-range cursors, and empty candidate lists all clamp or no-op, and
/// the only distinguishable failure (an incremental search without a match) is
/// surfaced via [`Self::search_failed`] rather than an error.
pub struct EditorModel {
    buffer: EditBuffer,
    history: History,
    mode: EditorMode,

    /// Completed-but-unconsumed lines. Multiple terminators can arrive before the
    /// consumer polls (a pasted burst); each drain pops exactly one.
    pending_lines: VecDeque<String>,

    /// When false, edits never raise a content redraw and submitted lines are never
    /// recorded in the history (secret entry).
    echo_enabled: bool,

    completion_style: CompletionStyle,
    completion_provider: Option<Arc<dyn CompletionProvider>>,

    redraw_needed: bool,
    newline_needed: bool,

    /// Viewport width from the most recent action, for the driver's wrapping math.
    last_viewport_width: u16,
}

impl Default for EditorModel {
    fn default() -> Self {
        Self {
            buffer: EditBuffer::new(),
            history: History::new(),
            mode: EditorMode::Normal,
            pending_lines: VecDeque::new(),
            echo_enabled: true,
            completion_style: CompletionStyle::default(),
            completion_provider: None,
            redraw_needed: false,
            newline_needed: false,
            last_viewport_width: 0,
        }
    }
}

impl EditorModel {
    pub fn new() -> Self { Self::default() }

    // Configuration. Set once or occasionally, not mid-edit.

    pub fn set_echo_enabled(&mut self, echo_enabled: bool) {
        self.echo_enabled = echo_enabled;
    }

    pub fn echo_enabled(&self) -> bool { self.echo_enabled }

    pub fn set_autocomplete_style(&mut self, style: CompletionStyle) {
        self.completion_style = style;
    }

    pub fn autocomplete_style(&self) -> CompletionStyle { self.completion_style }

    /// Supply the syntax-aware completion provider consulted when an autocomplete
    /// session starts. Without one, completion actions are no-ops.
    pub fn set_autocomplete_syntax(&mut self, provider: Arc<dyn CompletionProvider>) {
        self.completion_provider = Some(provider);
    }

    // State inspection for the driver.

    pub fn line(&self) -> &str { self.buffer.as_str() }

    pub fn insert_pos(&self) -> usize { self.buffer.insert_pos() }

    pub fn history(&self) -> &History { &self.history }

    pub fn last_viewport_width(&self) -> u16 { self.last_viewport_width }

    /// Query of the active incremental search, if one is in progress.
    pub fn search_query(&self) -> Option<&str> {
        match &self.mode {
            EditorMode::SearchActive(state) => Some(state.query()),
            _ => None,
        }
    }

    /// True while an active search's query has no matching history entry.
    pub fn search_failed(&self) -> bool {
        matches!(&self.mode, EditorMode::SearchActive(state) if state.failed())
    }

    // Redraw / newline flags. Set by mutating operations; cleared by the driver once
    // it has acted on them, never by the model.

    pub fn needs_redraw(&self) -> bool { self.redraw_needed }

    pub fn clear_redraw_needed(&mut self) { self.redraw_needed = false; }

    pub fn needs_newline_before_output(&self) -> bool { self.newline_needed }

    pub fn clear_newline_needed(&mut self) { self.newline_needed = false; }

    // Input.

    /// Feed one character. A line terminator (`\n` or `\r`) completes the current
    /// line instead of being inserted; while a search is active, a plain character
    /// extends the search query; otherwise the character enters the edit buffer
    /// (leaving whatever special mode was active, with its result committed).
    pub fn add_input_char(&mut self, c: char) {
        if c == '\n' || c == '\r' {
            self.complete_current_line();
            return;
        }

        if let EditorMode::SearchActive(state) = &mut self.mode {
            if let Some(index) = state.push_query_char(c, &self.history) {
                if let Some(entry) = self.history.get(index) {
                    let entry = entry.to_string();
                    self.buffer.set_text(&entry);
                }
            }
            self.mark_dirty();
            return;
        }

        self.leave_special_mode();
        self.buffer.insert_char(c);
        self.mark_dirty();
    }

    /// Perform a discrete editing action. `viewport_width` is recorded for the
    /// driver's redraw helpers (line wrapping); it never influences editing logic.
    pub fn perform_action(&mut self, action: EditorAction, viewport_width: u16) {
        self.last_viewport_width = viewport_width;
        match action {
            EditorAction::CursorLeft => self.plain_edit(|b| b.move_cursor(-1)),
            EditorAction::CursorRight => self.plain_edit(|b| b.move_cursor(1)),
            EditorAction::CursorHome => self.plain_edit(EditBuffer::move_cursor_to_start),
            EditorAction::CursorEnd => self.plain_edit(EditBuffer::move_cursor_to_end),
            EditorAction::WordLeft => self.plain_edit(|b| {
                let boundary = b.find_word_boundary(b.insert_pos(), false);
                b.set_cursor(boundary);
            }),
            EditorAction::WordRight => self.plain_edit(|b| {
                let boundary = b.find_word_boundary(b.insert_pos(), true);
                b.set_cursor(boundary);
            }),
            EditorAction::DeleteCharLeft => self.delete_char_left(),
            EditorAction::DeleteCharRight => self.plain_edit(|b| {
                let pos = b.insert_pos();
                b.delete_range(pos, pos + 1);
            }),
            EditorAction::DeleteWordLeft => self.plain_edit(|b| {
                let boundary = b.find_word_boundary(b.insert_pos(), false);
                b.delete_range(boundary, b.insert_pos());
            }),
            EditorAction::DeleteWordRight => self.plain_edit(|b| {
                let boundary = b.find_word_boundary(b.insert_pos(), true);
                b.delete_range(b.insert_pos(), boundary);
            }),
            EditorAction::ClearLine => self.plain_edit(EditBuffer::clear),
            EditorAction::HistoryUp => self.recall(RecallMove::Older),
            EditorAction::HistoryDown => self.recall(RecallMove::Newer),
            EditorAction::HistoryOldest => self.recall(RecallMove::Oldest),
            EditorAction::HistoryNewest => self.recall(RecallMove::Newest),
            EditorAction::SearchHistoryBackward => self.search(false),
            EditorAction::SearchHistoryForward => self.search(true),
            EditorAction::CompleteForward => self.autocomplete(true),
            EditorAction::CompleteBackward => self.autocomplete(false),
            EditorAction::Paste(text) => {
                self.leave_special_mode();
                for c in text.chars() {
                    self.add_input_char(c);
                }
            }
        }
    }

    // Output.

    /// True when at least one completed line is waiting to be drained.
    pub fn is_line_ready(&self) -> bool { !self.pending_lines.is_empty() }

    pub fn pending_newlines(&self) -> usize { self.pending_lines.len() }

    /// Drain one completed line, performing the submission bookkeeping: with echo
    /// enabled, a non-empty line is recorded as the newest history entry (evicting
    /// the oldest past the bound). With echo disabled the line is returned to the
    /// caller but never recorded. Returns `None` when no line is ready.
    pub fn check_for_completed_input_line(&mut self) -> Option<String> {
        let line = self.pending_lines.pop_front()?;
        if self.echo_enabled && !line.is_empty() {
            self.history.record(line.clone());
        }
        tracing::debug!(
            pending = self.pending_lines.len(),
            "completed input line drained"
        );
        Some(line)
    }

    /// Record a line in the history without going through line submission. Used for
    /// persisted history and host-injected entries.
    pub fn record_history_entry(&mut self, entry: String) {
        if !entry.is_empty() {
            self.history.record(entry);
        }
    }

    /// Replace the history from an oldest-first list (the persistence format).
    pub fn load_history_oldest_first(&mut self, lines: Vec<String>) {
        self.history.replace_all_from_oldest(lines);
    }

    // Internal.

    /// A line terminator arrived: commit whatever mode is active, sever the current
    /// line into the pending queue, and flag the driver. The line text is preserved
    /// per terminator, so a multi-newline burst completes one line each.
    fn complete_current_line(&mut self) {
        self.leave_special_mode();
        let line = self.buffer.take_text();
        self.pending_lines.push_back(line);
        self.newline_needed = true;
        self.redraw_needed = true;
        tracing::debug!(pending = self.pending_lines.len(), "line completed");
    }

    /// Exit any special mode, committing its result as the live line. Recall and
    /// search have already written their selection into the buffer; autocomplete has
    /// already spliced its candidate. Dropping the mode state is the commit.
    fn leave_special_mode(&mut self) {
        let mode = std::mem::take(&mut self.mode);
        match mode {
            EditorMode::Normal => {}
            EditorMode::HistoryActive { .. } => {
                tracing::debug!("history recall committed");
            }
            EditorMode::SearchActive(_) => {
                tracing::debug!("history search committed");
            }
            EditorMode::AutocompleteActive(_) => {
                tracing::debug!("autocomplete session discarded");
            }
        }
    }

    /// An edit-buffer action: leaves any special mode, then mutates the buffer.
    fn plain_edit(&mut self, op: impl FnOnce(&mut EditBuffer)) {
        self.leave_special_mode();
        op(&mut self.buffer);
        self.mark_dirty();
    }

    /// Backspace doubles as "delete last search character" while a search is active.
    fn delete_char_left(&mut self) {
        if let EditorMode::SearchActive(state) = &mut self.mode {
            if let Some(index) = state.pop_query_char(&self.history) {
                if let Some(entry) = self.history.get(index) {
                    let entry = entry.to_string();
                    self.buffer.set_text(&entry);
                }
            }
            self.mark_dirty();
            return;
        }
        self.plain_edit(|b| {
            let pos = b.insert_pos();
            if pos > 0 {
                b.delete_range(pos - 1, pos);
            }
        });
    }

    fn recall(&mut self, step: RecallMove) {
        if self.history.is_empty() {
            return;
        }

        // First history keypress snapshots the in-progress line so navigating back
        // past the newest entry can restore it.
        if !matches!(self.mode, EditorMode::HistoryActive { .. }) {
            self.leave_special_mode();
            self.mode = EditorMode::HistoryActive {
                snapshot: self.buffer.as_str().to_string(),
                index: None,
            };
        }

        let EditorMode::HistoryActive { snapshot, index } = &mut self.mode else {
            return;
        };

        let newest = 0;
        let oldest = self.history.len() - 1;
        *index = match (step, *index) {
            (RecallMove::Older, None) => Some(newest),
            (RecallMove::Older, Some(i)) => Some(usize::min(i + 1, oldest)),
            (RecallMove::Newer, None) => None,
            (RecallMove::Newer, Some(0)) => None,
            (RecallMove::Newer, Some(i)) => Some(i - 1),
            (RecallMove::Oldest, _) => Some(oldest),
            (RecallMove::Newest, _) => Some(newest),
        };

        let text = match *index {
            Some(i) => self.history.get(i).unwrap_or_default().to_string(),
            None => snapshot.clone(),
        };
        self.buffer.set_text(&text);
        self.mark_dirty();
    }

    fn search(&mut self, forward: bool) {
        match &mut self.mode {
            EditorMode::SearchActive(state) => {
                if let Some(index) = state.repeat(forward, &self.history) {
                    if let Some(entry) = self.history.get(index) {
                        let entry = entry.to_string();
                        self.buffer.set_text(&entry);
                    }
                }
            }
            _ => {
                self.leave_special_mode();
                self.mode = EditorMode::SearchActive(SearchState::new(forward));
            }
        }
        self.mark_dirty();
    }

    fn autocomplete(&mut self, forward: bool) {
        if let EditorMode::AutocompleteActive(session) = &mut self.mode {
            session.cycle(&mut self.buffer, forward);
            self.mark_dirty();
            return;
        }

        self.leave_special_mode();
        let Some(provider) = self.completion_provider.clone() else {
            return;
        };
        if let Some(session) = CompletionSession::try_start(
            &mut self.buffer,
            provider.as_ref(),
            self.completion_style,
            forward,
        ) {
            self.mode = EditorMode::AutocompleteActive(session);
            self.mark_dirty();
        }
    }

    /// Content changed. With echo disabled nothing is ever exposed for redraw; the
    /// newline flag (prompt bookkeeping) is raised elsewhere regardless.
    fn mark_dirty(&mut self) {
        if self.echo_enabled {
            self.redraw_needed = true;
        }
    }
}
