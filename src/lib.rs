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

//! The `readline_engine` library is a terminal-independent line editing engine. It turns
//! a stream of keystrokes into an edited text line, with cursor and word navigation, a
//! bounded command history, incremental history search, and autocomplete cycling driven
//! by a pluggable completion provider.
//!
//! The heart of the crate is [`EditorModel`]: a pure, synchronous state machine. It
//! performs no I/O, holds no lock, and never blocks. The host (a terminal driver, a test
//! harness, an embedded REPL) feeds it characters via [`EditorModel::add_input_char`]
//! and discrete editing actions via [`EditorModel::perform_action`], then polls it:
//!
//! 1. [`EditorModel::check_for_completed_input_line`] drains one submitted line at a
//!    time (multiple newlines can arrive in a single burst, e.g. from a paste).
//! 2. [`EditorModel::needs_redraw`] and [`EditorModel::needs_newline_before_output`]
//!    tell the driver when to repaint; the driver clears them once it has acted.
//!
//! The model is intrinsically single-writer, single-reader state tied to one interactive
//! session. Hosts that need multiple sessions instantiate one model per session.
//!
//! # Modes
//!
//! Incoming characters and actions are interpreted through four mutually exclusive
//! modes, represented as a tagged enum so that "exit mode X, commit its result" is an
//! exhaustive, compiler-checked transition:
//!
//! - **Normal** - characters insert at the cursor.
//! - **History recall** - up/down (and oldest/newest jumps) walk previously submitted
//!   lines; the in-progress line is snapshotted on the first step and restored when
//!   navigating back past the newest entry.
//! - **Incremental search** - characters extend a query that is matched by substring
//!   containment against the history, scanning backward or forward; repeating the
//!   search advances past the current match.
//! - **Autocomplete** - cycles through candidates for the token under the cursor,
//!   supplied once per session by a [`CompletionProvider`].
//!
//! When echo is disabled (secret entry), the buffer still updates but no content is
//! ever exposed for redraw, and submitted lines are never recorded in the history.
//!
//! # Reference driver
//!
//! The model on its own paints nothing. [`ReadlineSession`] is a batteries-included
//! async driver in the style of an event-stream readline: it reads `crossterm` events
//! from a dependency-injected input stream, translates them via
//! [`driver_impl::key_bindings`], and repaints the prompt and line on a
//! dependency-injected writer whenever the model raises its redraw flag. Both
//! resources can be mocked, so the whole stack is testable end to end.
//!
//! ```no_run
//! async fn repl() -> miette::Result<()> {
//!     use miette::IntoDiagnostic;
//!     use readline_engine::{ReadlineSession, SessionEvent};
//!     let Some(mut session) = ReadlineSession::try_new("> ")? else {
//!         return Err(miette::miette!("terminal is not interactive"));
//!     };
//!     loop {
//!         match session.read_line_event().await.into_diagnostic()? {
//!             SessionEvent::Line(line) => println!("got: {line}"),
//!             SessionEvent::Eof | SessionEvent::Interrupted => break,
//!             SessionEvent::Resized => {}
//!         }
//!     }
//!     Ok(())
//! }
//! ```

// Attach sources.
pub mod driver_impl;
pub mod editor_impl;
pub mod public_api;

#[cfg(test)]
pub mod test_fixtures;

// Re-export the public API.
pub use driver_impl::*;
pub use editor_impl::*;
pub use public_api::*;

// Type aliases.
use std::{io::Error, pin::Pin, sync::Arc};

use crossterm::event::Event;
use futures_core::Stream;

pub type StdMutex<T> = std::sync::Mutex<T>;

pub type SendRawTerminal = dyn std::io::Write + Send;
pub type SafeRawTerminal = Arc<StdMutex<SendRawTerminal>>;

pub type CrosstermEventResult = Result<Event, Error>;
pub type PinnedInputStream<T> = Pin<Box<dyn Stream<Item = T> + Send>>;

// Constants.

/// Upper bound on the number of remembered history entries. Submitting a line beyond
/// this bound evicts the oldest entry.
pub const MAX_HISTORY_ENTRIES: usize = 20;

pub const CHANNEL_CAPACITY: usize = 1_000;
