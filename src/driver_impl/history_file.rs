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

//! History persistence across process restarts: a plain UTF-8 text file, one entry
//! per line, oldest first, capped at [`MAX_HISTORY_ENTRIES`]. The editor core never
//! touches the file system; the host loads at startup and saves at shutdown.

use std::{fs, io, path::Path};

use crate::{History, MAX_HISTORY_ENTRIES};

/// Load the persisted history, oldest first. A missing file is an empty history, not
/// an error. When the file holds more than the bound, only the newest entries are
/// kept.
pub fn load_history(path: impl AsRef<Path>) -> io::Result<Vec<String>> {
    let path = path.as_ref();
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(?path, "no history file, starting empty");
            return Ok(Vec::new());
        }
        Err(error) => return Err(error),
    };

    let lines: Vec<String> = contents
        .lines()
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect();

    let skip = lines.len().saturating_sub(MAX_HISTORY_ENTRIES);
    let lines: Vec<String> = lines.into_iter().skip(skip).collect();

    tracing::debug!(?path, count = lines.len(), "history loaded");
    Ok(lines)
}

/// Write the history out, oldest first, one entry per line.
pub fn save_history(path: impl AsRef<Path>, history: &History) -> io::Result<()> {
    let path = path.as_ref();
    let mut contents = String::new();
    for entry in history.iter().collect::<Vec<_>>().into_iter().rev() {
        contents.push_str(entry);
        contents.push('\n');
    }
    fs::write(path, contents)?;
    tracing::debug!(?path, count = history.len(), "history saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_history(dir.path().join("absent")).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_round_trip_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history");

        let mut history = History::new();
        history.record("first".into());
        history.record("second".into());
        save_history(&path, &history).unwrap();

        let loaded = load_history(&path).unwrap();
        assert_eq!(loaded, vec!["first".to_string(), "second".to_string()]);

        // Feeding the loaded list back restores newest-first order in the store.
        let mut restored = History::new();
        restored.replace_all_from_oldest(loaded);
        assert_eq!(restored.get(0), Some("second"));
    }

    #[test]
    fn test_load_caps_at_bound_keeping_newest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history");

        let mut contents = String::new();
        for n in 1..=(MAX_HISTORY_ENTRIES + 5) {
            contents.push_str(&format!("cmd {n}\n"));
        }
        fs::write(&path, contents).unwrap();

        let loaded = load_history(&path).unwrap();
        assert_eq!(loaded.len(), MAX_HISTORY_ENTRIES);
        assert_eq!(loaded.first().map(String::as_str), Some("cmd 6"));
        assert_eq!(loaded.last().map(String::as_str), Some("cmd 25"));
    }
}
