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

use std::io::{self, Write};

use crossterm::{cursor,
                terminal::{Clear, ClearType::*},
                QueueableCommand};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::EditorModel;

/// Paints the prompt and the model's line, wrapping on the viewport width and placing
/// the terminal cursor on the model's insertion point.
///
/// The renderer is the part of the driver that acts on the model's redraw flag; it
/// keeps only display bookkeeping (where the last paint left the cursor), never
/// editing state.
#[derive(Debug)]
pub struct LineRenderer {
    pub term_size: (u16, u16),

    /// Display column (in cells, prompt included) the cursor was left on by the last
    /// paint. Needed to find the start of the painted area when the line wraps.
    last_column: u16,
}

impl LineRenderer {
    pub fn new(term_size: (u16, u16)) -> Self {
        Self {
            term_size,
            last_column: 0,
        }
    }

    /// Number of rows the first `pos` cells wrap into.
    fn line_height(&self, pos: u16) -> u16 {
        let width = u16::max(self.term_size.0, 1);
        pos / width
    }

    /// Move from a position on the painted line to its start.
    fn move_to_beginning(&self, term: &mut dyn Write, from: u16) -> io::Result<()> {
        let move_up = self.line_height(from.saturating_sub(1));
        term.queue(cursor::MoveToColumn(0))?;
        if move_up != 0 {
            term.queue(cursor::MoveUp(move_up))?;
        }
        Ok(())
    }

    /// Move from the start of the painted line to some position.
    fn move_from_beginning(&self, term: &mut dyn Write, to: u16) -> io::Result<()> {
        let width = u16::max(self.term_size.0, 1);
        let line_height = self.line_height(to.saturating_sub(1));
        let line_remaining_len = to % width;
        if line_height != 0 {
            term.queue(cursor::MoveDown(line_height))?;
        }
        if line_remaining_len != 0 {
            term.queue(cursor::MoveRight(line_remaining_len))?;
        }
        Ok(())
    }

    /// Erase the previously painted prompt/line and repaint from the model.
    pub fn clear_and_render(
        &mut self,
        term: &mut dyn Write,
        model: &EditorModel,
        prompt: &str,
    ) -> io::Result<()> {
        self.move_to_beginning(term, self.last_column)?;
        term.queue(Clear(FromCursorDown))?;

        let (content, cursor_cells) = display_content(model);
        write!(term, "{prompt}{content}")?;

        let prompt_cells = UnicodeWidthStr::width(prompt) as u16;
        let total = prompt_cells + UnicodeWidthStr::width(content.as_str()) as u16;
        let target = prompt_cells + cursor_cells;
        self.move_to_beginning(term, total)?;
        self.move_from_beginning(term, target)?;
        self.last_column = target;
        Ok(())
    }

    /// Forget the painted area, e.g. after the driver emitted a newline. The next
    /// paint starts on a fresh row.
    pub fn reset(&mut self) { self.last_column = 0; }
}

/// What to paint after the prompt, and the display width (in cells) from the start of
/// that content to the model's insertion point.
///
/// With echo disabled, content is never exposed: the prompt alone is painted. While a
/// search is active, the query is shown readline-style in front of the matched line,
/// with the cursor parked at the end.
fn display_content(model: &EditorModel) -> (String, u16) {
    if !model.echo_enabled() {
        return (String::new(), 0);
    }

    if let Some(query) = model.search_query() {
        let marker = if model.search_failed() {
            "failed i-search"
        } else {
            "i-search"
        };
        let content = format!("({marker})`{query}': {}", model.line());
        let cells = UnicodeWidthStr::width(content.as_str()) as u16;
        return (content, cells);
    }

    let cells = model
        .line()
        .graphemes(true)
        .take(model.insert_pos())
        .map(UnicodeWidthStr::width)
        .sum::<usize>() as u16;
    (model.line().to_string(), cells)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{test_fixtures::StdoutMock, EditorAction};

    fn model_with(text: &str) -> EditorModel {
        let mut model = EditorModel::new();
        for c in text.chars() {
            model.add_input_char(c);
        }
        model
    }

    #[test]
    fn test_paints_prompt_and_line() {
        let mut renderer = LineRenderer::new((80, 24));
        let mut stdout_mock = StdoutMock::default();
        let model = model_with("hello");

        renderer.clear_and_render(&mut stdout_mock, &model, "> ").unwrap();
        let output = stdout_mock.get_copy_of_buffer_as_string_strip_ansi();
        assert_eq!(output, "> hello");
    }

    #[test]
    fn test_echo_off_paints_prompt_only() {
        let mut renderer = LineRenderer::new((80, 24));
        let mut stdout_mock = StdoutMock::default();
        let mut model = EditorModel::new();
        model.set_echo_enabled(false);
        for c in "secret".chars() {
            model.add_input_char(c);
        }

        renderer.clear_and_render(&mut stdout_mock, &model, "pw: ").unwrap();
        let output = stdout_mock.get_copy_of_buffer_as_string_strip_ansi();
        assert_eq!(output, "pw: ");
    }

    #[test]
    fn test_search_mode_shows_query() {
        let mut renderer = LineRenderer::new((80, 24));
        let mut stdout_mock = StdoutMock::default();
        let mut model = model_with("grep foo\n");
        model.check_for_completed_input_line();
        model.perform_action(EditorAction::SearchHistoryBackward, 80);
        model.add_input_char('g');

        renderer.clear_and_render(&mut stdout_mock, &model, "> ").unwrap();
        let output = stdout_mock.get_copy_of_buffer_as_string_strip_ansi();
        assert_eq!(output, "> (i-search)`g': grep foo");
    }

    #[test]
    fn test_wide_graphemes_count_display_cells() {
        let (_, cells) = {
            let mut model = model_with("日本");
            model.perform_action(EditorAction::CursorEnd, 80);
            display_content(&model)
        };
        assert_eq!(cells, 4, "two double-width graphemes");
    }
}
