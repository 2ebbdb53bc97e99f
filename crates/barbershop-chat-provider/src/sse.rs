//! Server-sent event decoding for streamed chat completions.
//!
//! The stream is a sequence of `data: {json}` lines ending with
//! `data: [DONE]`. Chunks may split a line (or a UTF-8 sequence) anywhere, so
//! bytes are buffered until a newline arrives. Lines that are not data lines,
//! or whose JSON does not parse, are skipped without aborting the stream.

use std::fmt::Display;

use futures::{Stream, StreamExt};
use serde_json::Value;

use crate::error::{ProviderError, Result};

const DATA_PREFIX: &str = "data:";
const DONE_SENTINEL: &str = "[DONE]";

/// What a single line contributed.
#[derive(Debug, PartialEq, Eq)]
enum LineEvent {
    Delta(String),
    Done,
    Skip,
}

/// Incremental decoder that assembles streamed text deltas.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    text: String,
    done: bool,
}

impl SseDecoder {
    /// Create an empty decoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk of bytes. Returns `true` once the sentinel was seen.
    pub fn feed(&mut self, chunk: &[u8]) -> bool {
        if self.done {
            return true;
        }

        self.buffer.extend_from_slice(chunk);
        while let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            if self.consume_line(&line) {
                self.done = true;
                self.buffer.clear();
                break;
            }
        }
        self.done
    }

    /// Whether the terminal sentinel has been seen.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.done
    }

    /// Flush any unterminated last line and return the assembled text.
    #[must_use]
    pub fn finish(mut self) -> String {
        if !self.done && !self.buffer.is_empty() {
            let line = std::mem::take(&mut self.buffer);
            self.consume_line(&line);
        }
        self.text
    }

    fn consume_line(&mut self, line: &[u8]) -> bool {
        match parse_line(&String::from_utf8_lossy(line)) {
            LineEvent::Delta(delta) => {
                self.text.push_str(&delta);
                false
            }
            LineEvent::Done => true,
            LineEvent::Skip => false,
        }
    }
}

fn parse_line(line: &str) -> LineEvent {
    let Some(data) = line.trim().strip_prefix(DATA_PREFIX) else {
        return LineEvent::Skip;
    };
    let data = data.trim_start();
    if data == DONE_SENTINEL {
        return LineEvent::Done;
    }

    let Ok(event) = serde_json::from_str::<Value>(data) else {
        tracing::debug!(line = %data, "Skipping malformed stream line");
        return LineEvent::Skip;
    };

    event["choices"]
        .get(0)
        .and_then(|choice| choice["delta"]["content"].as_str())
        .filter(|delta| !delta.is_empty())
        .map_or(LineEvent::Skip, |delta| LineEvent::Delta(delta.to_string()))
}

/// Read a byte stream to the end (or to the sentinel) and return the text.
///
/// # Errors
///
/// Returns [`ProviderError::Transport`] if reading a chunk fails.
pub async fn collect_text<S, B, E>(stream: S) -> Result<String>
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
{
    let mut stream = std::pin::pin!(stream);
    let mut decoder = SseDecoder::new();

    while let Some(chunk) = stream.next().await {
        let bytes =
            chunk.map_err(|e| ProviderError::Transport(format!("stream read error: {e}")))?;
        if decoder.feed(bytes.as_ref()) {
            break;
        }
    }

    Ok(decoder.finish())
}
