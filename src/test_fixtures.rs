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

//! Reusable fixtures so driver and model can be tested end to end: a mock for the
//! output side (terminal writer) and a generator for the input side (event stream).

use std::{io::{Result, Write},
          sync::Arc};

use async_stream::stream;

use crate::{PinnedInputStream, StdMutex};

/// You can safely clone this struct, since it only contains an
/// `Arc<StdMutex<Vec<u8>>>`. The inner `buffer` will not be cloned, just the [Arc]
/// will be cloned.
#[derive(Clone, Default)]
pub struct StdoutMock {
    pub buffer: Arc<StdMutex<Vec<u8>>>,
}

impl StdoutMock {
    pub fn get_copy_of_buffer(&self) -> Vec<u8> {
        self.buffer.lock().unwrap().clone()
    }

    pub fn get_copy_of_buffer_as_string(&self) -> String {
        let buffer_data = self.buffer.lock().unwrap();
        String::from_utf8(buffer_data.to_vec()).expect("utf8")
    }

    pub fn get_copy_of_buffer_as_string_strip_ansi(&self) -> String {
        let buffer_data = self.buffer.lock().unwrap();
        let buffer_data = strip_ansi_escapes::strip(buffer_data.to_vec());
        String::from_utf8(buffer_data).expect("utf8")
    }
}

impl Write for StdoutMock {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<()> { Ok(()) }
}

/// Turn a `Vec<T>` into a pinned stream of `T`, for driving the session with a
/// scripted sequence of events.
pub fn gen_input_stream<T>(generator_vec: Vec<T>) -> PinnedInputStream<T>
where
    T: Send + Sync + 'static,
{
    let it = stream! {
        for item in generator_vec {
            yield item;
        }
    };
    Box::pin(it)
}

#[cfg(test)]
mod tests {
    use futures_util::StreamExt;
    use pretty_assertions::assert_eq;

    use super::*;

    #[tokio::test]
    async fn test_gen_input_stream() {
        let mut input_stream = gen_input_stream(vec![1, 2, 3]);
        for expected in 1..=3 {
            assert_eq!(input_stream.next().await, Some(expected));
        }
        assert_eq!(input_stream.next().await, None);
    }

    #[test]
    fn test_stdout_mock_shares_buffer_across_clones() {
        let mut stdout_mock = StdoutMock::default();
        let stdout_mock_clone = stdout_mock.clone();

        stdout_mock.write_all(b"hello world").unwrap();
        stdout_mock.flush().unwrap();

        assert_eq!(stdout_mock.get_copy_of_buffer_as_string(), "hello world");
        assert_eq!(
            stdout_mock_clone.get_copy_of_buffer_as_string(),
            "hello world"
        );
    }
}
