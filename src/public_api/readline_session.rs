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

use std::{io::{self, Write},
          sync::Arc};

use crossterm::{event::EventStream, terminal, tty::IsTty};
use futures_util::StreamExt;
use miette::IntoDiagnostic as _;
use thiserror::Error;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use crate::{interpret_event, CrosstermEventResult, EditorAction, EditorModel,
            KeyIntent, LineRenderer, PinnedInputStream, SafeRawTerminal, StdMutex};

/// The reference console driver: an async read loop around [`EditorModel`].
///
/// It reads `crossterm` events from a dependency-injected input stream, translates
/// them through [`interpret_event`], feeds the model, and acts on the model's
/// redraw/newline flags by repainting on a dependency-injected writer. Both resources
/// can be mocked (an event vector stream, a buffer writer), so driver and model are
/// testable end to end without a terminal.
///
/// # Inputs and dependency injection
///
/// 1. [`PinnedInputStream`] - an async stream of events, typically
///    [`crossterm::event::EventStream`]. Supply your own for testing.
/// 2. [`SafeRawTerminal`] - anything `dyn std::io::Write + Send`, typically
///    [`std::io::Stdout`]. Supply your own for testing.
///
/// # When to terminate the session
///
/// There is no `close()`. Drop the session and the terminal comes out of raw mode
/// (when [`ReadlineSession::try_new`] put it there).
pub struct ReadlineSession {
    /// Raw terminal implementation, you can supply this via dependency injection.
    pub safe_raw_terminal: SafeRawTerminal,

    /// Stream of events.
    pub pinned_input_stream: PinnedInputStream<CrosstermEventResult>,

    /// The line editing engine this session drives.
    pub model: EditorModel,

    pub prompt: String,

    renderer: LineRenderer,

    /// Use to send history updates from other tasks.
    history_sender: UnboundedSender<String>,
    /// Use to receive history updates.
    history_receiver: UnboundedReceiver<String>,

    /// Whether this session put the terminal into raw mode (and must undo it).
    raw_mode_enabled: bool,
}

/// Error returned from [`ReadlineSession::read_line_event`]. Such errors generally
/// require specific procedures to recover from.
#[derive(Debug, Error)]
pub enum ReadlineSessionError {
    /// An internal I/O error occurred.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// The input stream ended; no more events will arrive.
    #[error("input event stream closed")]
    Closed,
}

/// Events emitted by [`ReadlineSession::read_line_event`].
#[derive(Debug, PartialEq, Clone)]
pub enum SessionEvent {
    /// The user entered a line of text.
    Line(String),

    /// The user pressed Ctrl-D.
    Eof,

    /// The user pressed Ctrl-C. The in-progress line has been cleared.
    Interrupted,

    /// The terminal was resized; the prompt has been repainted.
    Resized,
}

/// What woke the read loop up.
enum LoopWake {
    Input(Option<CrosstermEventResult>),
    HistoryEntry(Option<String>),
}

impl Drop for ReadlineSession {
    fn drop(&mut self) {
        if self.raw_mode_enabled {
            _ = terminal::disable_raw_mode();
        }
    }
}

impl ReadlineSession {
    /// Create a session over injected resources and paint the initial prompt. Does
    /// not touch terminal modes; use [`Self::try_new`] for the real-terminal path.
    pub fn new(
        prompt: String,
        safe_raw_terminal: SafeRawTerminal,
        /* move */ pinned_input_stream: PinnedInputStream<CrosstermEventResult>,
        term_size: (u16, u16),
    ) -> Result<Self, ReadlineSessionError> {
        let (history_sender, history_receiver) =
            tokio::sync::mpsc::unbounded_channel::<String>();

        let mut session = Self {
            safe_raw_terminal,
            pinned_input_stream,
            model: EditorModel::new(),
            prompt,
            renderer: LineRenderer::new(term_size),
            history_sender,
            history_receiver,
            raw_mode_enabled: false,
        };

        session.repaint()?;
        Ok(session)
    }

    /// Create a session on the real terminal: `stdout` as the writer, the crossterm
    /// event stream as input, raw mode enabled (undone on drop).
    ///
    /// Returns `Ok(None)` when the terminal is not fully interactive (stdin or
    /// stdout piped), in which case no session is created and the terminal is left
    /// alone.
    pub fn try_new(prompt: impl AsRef<str>) -> miette::Result<Option<Self>> {
        if !io::stdin().is_tty() || !io::stdout().is_tty() {
            return Ok(None);
        }

        let term_size = terminal::size().into_diagnostic()?;
        terminal::enable_raw_mode().into_diagnostic()?;

        let safe_raw_terminal: SafeRawTerminal =
            Arc::new(StdMutex::new(io::stdout()));
        let pinned_input_stream: PinnedInputStream<CrosstermEventResult> =
            Box::pin(EventStream::new());

        let mut session = Self::new(
            prompt.as_ref().to_string(),
            safe_raw_terminal,
            pinned_input_stream,
            term_size,
        )
        .into_diagnostic()?;
        session.raw_mode_enabled = true;
        Ok(Some(session))
    }

    /// Sender end for cross-task history additions; entries arrive at the model the
    /// next time [`Self::read_line_event`] is polled.
    pub fn history_entry_sender(&self) -> UnboundedSender<String> {
        self.history_sender.clone()
    }

    /// Add a line to the input history directly.
    pub fn add_history_entry(&mut self, entry: String) {
        self.model.record_history_entry(entry);
    }

    /// Change the prompt and repaint.
    pub fn update_prompt(&mut self, prompt: &str) -> Result<(), ReadlineSessionError> {
        self.prompt.clear();
        self.prompt.push_str(prompt);
        self.repaint()?;
        Ok(())
    }

    /// Run the read loop until the user completes a line, interrupts, ends input, or
    /// resizes the terminal. Call repeatedly; pending lines from a pasted burst are
    /// drained one per call.
    pub async fn read_line_event(
        &mut self,
    ) -> Result<SessionEvent, ReadlineSessionError> {
        loop {
            // A previous event may have completed more than one line (pasted burst).
            if let Some(line) = self.drain_and_repaint()? {
                return Ok(SessionEvent::Line(line));
            }

            let wake = tokio::select! {
                // This branch is cancel safe: if the future is dropped, the item
                // stays in the pinned input stream and no state is modified.
                maybe_event = self.pinned_input_stream.next() => {
                    LoopWake::Input(maybe_event)
                },

                // This branch is cancel safe because recv is cancel safe.
                maybe_entry = self.history_receiver.recv() => {
                    LoopWake::HistoryEntry(maybe_entry)
                },
            };

            match wake {
                LoopWake::Input(None) => return Err(ReadlineSessionError::Closed),
                LoopWake::Input(Some(Err(error))) => return Err(error.into()),
                LoopWake::Input(Some(Ok(event))) => {
                    if let Some(session_event) =
                        self.apply_intent(interpret_event(event))?
                    {
                        return Ok(session_event);
                    }
                }
                LoopWake::HistoryEntry(maybe_entry) => {
                    if let Some(entry) = maybe_entry {
                        self.model.record_history_entry(entry);
                    }
                }
            }
        }
    }

    /// Feed one interpreted keystroke to the model, then act on the model's flags.
    /// Returns a session event when the keystroke ends this `read_line_event` call.
    fn apply_intent(
        &mut self,
        intent: KeyIntent,
    ) -> Result<Option<SessionEvent>, ReadlineSessionError> {
        match intent {
            KeyIntent::Insert(c) => self.model.add_input_char(c),
            KeyIntent::Edit(action) => {
                let width = self.renderer.term_size.0;
                self.model.perform_action(action, width);
            }
            KeyIntent::Interrupt => {
                let width = self.renderer.term_size.0;
                self.model.perform_action(EditorAction::ClearLine, width);
                self.model.clear_redraw_needed();
                self.write_newline()?;
                self.repaint()?;
                return Ok(Some(SessionEvent::Interrupted));
            }
            KeyIntent::EndOfInput => {
                self.write_newline()?;
                return Ok(Some(SessionEvent::Eof));
            }
            KeyIntent::Resize(columns, rows) => {
                self.renderer.term_size = (columns, rows);
                self.repaint()?;
                return Ok(Some(SessionEvent::Resized));
            }
            KeyIntent::Ignored => {}
        }

        Ok(self.drain_and_repaint()?.map(SessionEvent::Line))
    }

    /// Act on the model's flags: emit a pending newline, drain one completed line,
    /// repaint when the model asked for it.
    fn drain_and_repaint(&mut self) -> Result<Option<String>, ReadlineSessionError> {
        if self.model.needs_newline_before_output() {
            self.write_newline()?;
            self.model.clear_newline_needed();
        }

        let completed = self.model.check_for_completed_input_line();

        if self.model.needs_redraw() {
            self.repaint()?;
            self.model.clear_redraw_needed();
        }

        Ok(completed)
    }

    fn repaint(&mut self) -> Result<(), ReadlineSessionError> {
        let term = &mut *self.safe_raw_terminal.lock().unwrap();
        self.renderer.clear_and_render(term, &self.model, &self.prompt)?;
        term.flush()?;
        Ok(())
    }

    fn write_newline(&mut self) -> Result<(), ReadlineSessionError> {
        let term = &mut *self.safe_raw_terminal.lock().unwrap();
        write!(term, "\r\n")?;
        term.flush()?;
        self.renderer.reset();
        Ok(())
    }
}

#[cfg(test)]
pub mod my_fixtures {
    use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};

    use crate::CrosstermEventResult;

    pub(super) fn keypress(code: KeyCode) -> CrosstermEventResult {
        Ok(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    pub(super) fn ctrl(c: char) -> CrosstermEventResult {
        Ok(Event::Key(KeyEvent::new(
            KeyCode::Char(c),
            KeyModifiers::CONTROL,
        )))
    }

    pub(super) fn typed(text: &str) -> Vec<CrosstermEventResult> {
        text.chars().map(|c| keypress(KeyCode::Char(c))).collect()
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyCode;
    use pretty_assertions::assert_eq;

    use super::{my_fixtures::{ctrl, keypress, typed}, *};
    use crate::test_fixtures::{gen_input_stream, StdoutMock};

    fn session_over(
        events: Vec<CrosstermEventResult>,
    ) -> (ReadlineSession, StdoutMock) {
        let stdout_mock = StdoutMock::default();
        let session = ReadlineSession::new(
            "> ".into(),
            Arc::new(StdMutex::new(stdout_mock.clone())),
            gen_input_stream(events),
            (100, 100),
        )
        .unwrap();
        (session, stdout_mock)
    }

    #[tokio::test]
    async fn test_typed_line_is_returned_on_enter() {
        let mut events = typed("abc");
        events.push(keypress(KeyCode::Enter));
        let (mut session, stdout_mock) = session_over(events);

        let event = session.read_line_event().await.unwrap();
        assert_eq!(event, SessionEvent::Line("abc".into()));
        assert_eq!(session.model.line(), "");

        let output = stdout_mock.get_copy_of_buffer_as_string_strip_ansi();
        assert!(output.contains("> abc"));
    }

    #[tokio::test]
    async fn test_ctrl_d_is_eof() {
        let (mut session, _stdout_mock) = session_over(vec![ctrl('d')]);
        let event = session.read_line_event().await.unwrap();
        assert_eq!(event, SessionEvent::Eof);
    }

    #[tokio::test]
    async fn test_ctrl_c_clears_line_and_interrupts() {
        let mut events = typed("doomed");
        events.push(ctrl('c'));
        let (mut session, _stdout_mock) = session_over(events);

        let event = session.read_line_event().await.unwrap();
        assert_eq!(event, SessionEvent::Interrupted);
        assert_eq!(session.model.line(), "");
    }

    #[tokio::test]
    async fn test_closed_input_stream_errors() {
        let (mut session, _stdout_mock) = session_over(vec![]);
        let result = session.read_line_event().await;
        assert!(matches!(result, Err(ReadlineSessionError::Closed)));
    }

    #[tokio::test]
    async fn test_up_arrow_recalls_injected_history() {
        let (mut session, _stdout_mock) = session_over(vec![
            keypress(KeyCode::Up),
            keypress(KeyCode::Enter),
        ]);
        session.add_history_entry("prior command".into());

        let event = session.read_line_event().await.unwrap();
        assert_eq!(event, SessionEvent::Line("prior command".into()));
    }

    #[tokio::test]
    async fn test_pasted_burst_drains_one_line_per_call() {
        let (mut session, _stdout_mock) = session_over(vec![
            Ok(crossterm::event::Event::Paste("a\nb\n".into())),
        ]);

        let first = session.read_line_event().await.unwrap();
        assert_eq!(first, SessionEvent::Line("a".into()));
        let second = session.read_line_event().await.unwrap();
        assert_eq!(second, SessionEvent::Line("b".into()));
    }

    #[tokio::test]
    async fn test_echo_off_never_paints_content() {
        let mut events = typed("s3cret");
        events.push(keypress(KeyCode::Enter));
        let (mut session, stdout_mock) = session_over(events);
        session.model.set_echo_enabled(false);

        let event = session.read_line_event().await.unwrap();
        assert_eq!(event, SessionEvent::Line("s3cret".into()));
        assert_eq!(session.model.history().len(), 0);

        let output = stdout_mock.get_copy_of_buffer_as_string_strip_ansi();
        assert!(!output.contains("s3cret"));
    }
}
