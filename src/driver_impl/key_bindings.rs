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

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::EditorAction;

/// What a terminal event means for the editor. The driver feeds [`KeyIntent::Insert`]
/// to [`crate::EditorModel::add_input_char`] and [`KeyIntent::Edit`] to
/// [`crate::EditorModel::perform_action`]; the session-level intents (interrupt, end
/// of input, resize) never reach the model.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyIntent {
    Insert(char),
    Edit(EditorAction),
    Interrupt,
    EndOfInput,
    Resize(u16, u16),
    Ignored,
}

/// Translate one `crossterm` event into a [`KeyIntent`].
///
/// Key-release and repeat events are ignored; only presses edit. The bindings follow
/// the usual readline conventions (Ctrl-R/Ctrl-S incremental search, Tab/Shift-Tab
/// completion cycling, Ctrl-W word erase). With the `emacs` feature (on by default),
/// Ctrl-A and Ctrl-E jump to the start/end of the line.
pub fn interpret_event(event: Event) -> KeyIntent {
    match event {
        // Control keys.
        Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            ..
        }) => match code {
            // End of transmission (CTRL-D).
            KeyCode::Char('d') => KeyIntent::EndOfInput,
            // End of text (CTRL-C).
            KeyCode::Char('c') => KeyIntent::Interrupt,
            KeyCode::Char('u') => KeyIntent::Edit(EditorAction::ClearLine),
            KeyCode::Char('w') => KeyIntent::Edit(EditorAction::DeleteWordLeft),
            KeyCode::Char('r') => KeyIntent::Edit(EditorAction::SearchHistoryBackward),
            KeyCode::Char('s') => KeyIntent::Edit(EditorAction::SearchHistoryForward),
            #[cfg(feature = "emacs")]
            KeyCode::Char('a') => KeyIntent::Edit(EditorAction::CursorHome),
            #[cfg(feature = "emacs")]
            KeyCode::Char('e') => KeyIntent::Edit(EditorAction::CursorEnd),
            KeyCode::Left => KeyIntent::Edit(EditorAction::WordLeft),
            KeyCode::Right => KeyIntent::Edit(EditorAction::WordRight),
            _ => KeyIntent::Ignored,
        },

        // Other modifiers (None, Shift, Control+Alt) must all be considered because
        // Control+Alt is how several international layouts reach special symbols.
        Event::Key(KeyEvent {
            code,
            modifiers: _,
            kind: KeyEventKind::Press,
            ..
        }) => match code {
            KeyCode::Enter => KeyIntent::Insert('\n'),
            KeyCode::Backspace => KeyIntent::Edit(EditorAction::DeleteCharLeft),
            KeyCode::Delete => KeyIntent::Edit(EditorAction::DeleteCharRight),
            KeyCode::Left => KeyIntent::Edit(EditorAction::CursorLeft),
            KeyCode::Right => KeyIntent::Edit(EditorAction::CursorRight),
            KeyCode::Home => KeyIntent::Edit(EditorAction::CursorHome),
            KeyCode::End => KeyIntent::Edit(EditorAction::CursorEnd),
            KeyCode::Up => KeyIntent::Edit(EditorAction::HistoryUp),
            KeyCode::Down => KeyIntent::Edit(EditorAction::HistoryDown),
            KeyCode::PageUp => KeyIntent::Edit(EditorAction::HistoryOldest),
            KeyCode::PageDown => KeyIntent::Edit(EditorAction::HistoryNewest),
            KeyCode::Tab => KeyIntent::Edit(EditorAction::CompleteForward),
            KeyCode::BackTab => KeyIntent::Edit(EditorAction::CompleteBackward),
            KeyCode::Char(c) => KeyIntent::Insert(c),
            _ => KeyIntent::Ignored,
        },

        // Bracketed paste arrives as one event; the model splits it back into
        // characters so embedded newlines complete lines.
        Event::Paste(text) => KeyIntent::Edit(EditorAction::Paste(text)),

        Event::Resize(columns, rows) => KeyIntent::Resize(columns, rows),

        _ => KeyIntent::Ignored,
    }
}
