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

use strum_macros::Display;

/// How the completion candidate list is shaped by the provider: `Unix` matches the
/// case-sensitive, shortest-common-prefix feel of Unix shells, `Windows` the
/// case-insensitive cycling of `cmd.exe`. The style only influences how the provider
/// orders and filters candidates; the cycling logic in the editor is identical for
/// both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum CompletionStyle {
    Unix,
    Windows,
}

impl Default for CompletionStyle {
    /// Matches the platform the process runs on.
    fn default() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Unix
        }
    }
}

/// The external, syntax-aware completion engine consulted when an autocomplete session
/// starts. Implementations encapsulate whatever syntax description the host has
/// (command grammar, file system, both); the editor only ever sees the ordered
/// candidate list.
///
/// Each candidate is a full replacement string for the token under the cursor. The
/// list is requested once per session and cached; returning an empty list makes the
/// completion action a no-op.
pub trait CompletionProvider: Send + Sync {
    fn request_candidates(
        &self,
        partial_token: &str,
        style: CompletionStyle,
    ) -> Vec<String>;
}

/// A ready-made provider over a fixed set of command words.
///
/// Good enough for a REPL with a known verb set, and a reference for richer
/// providers: `Unix` style keeps case-sensitive prefix matches in sorted order,
/// `Windows` style matches case-insensitively and preserves each word's stored
/// casing.
#[derive(Debug, Default, Clone)]
pub struct CommandSetCompleter {
    words: Vec<String>,
}

impl CommandSetCompleter {
    pub fn new(words: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let mut words: Vec<String> = words.into_iter().map(Into::into).collect();
        words.sort();
        Self { words }
    }
}

impl CompletionProvider for CommandSetCompleter {
    fn request_candidates(
        &self,
        partial_token: &str,
        style: CompletionStyle,
    ) -> Vec<String> {
        match style {
            CompletionStyle::Unix => self
                .words
                .iter()
                .filter(|word| word.starts_with(partial_token))
                .cloned()
                .collect(),
            CompletionStyle::Windows => {
                let lowered = partial_token.to_lowercase();
                self.words
                    .iter()
                    .filter(|word| word.to_lowercase().starts_with(&lowered))
                    .cloned()
                    .collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn completer() -> CommandSetCompleter {
        CommandSetCompleter::new(["Get", "get", "put", "quit"])
    }

    #[test]
    fn test_unix_style_is_case_sensitive() {
        let candidates = completer().request_candidates("g", CompletionStyle::Unix);
        assert_eq!(candidates, vec!["get".to_string()]);
    }

    #[test]
    fn test_windows_style_is_case_insensitive() {
        let candidates = completer().request_candidates("g", CompletionStyle::Windows);
        assert_eq!(candidates, vec!["Get".to_string(), "get".to_string()]);
    }

    #[test]
    fn test_empty_token_offers_every_word() {
        let candidates = completer().request_candidates("", CompletionStyle::Unix);
        assert_eq!(candidates.len(), 4);
    }

    #[test]
    fn test_no_match_yields_empty_list() {
        let candidates = completer().request_candidates("zz", CompletionStyle::Unix);
        assert!(candidates.is_empty());
    }
}
