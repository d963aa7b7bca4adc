//! Incremental decoder for `text/event-stream` bodies.
//!
//! Network reads split events (and UTF-8 sequences) at arbitrary byte
//! offsets, so bytes are buffered until a full line is available. A complete
//! line that is not valid UTF-8 is a stream error.

use crate::error::{ChecklistError, Result};

/// Collects `data:` payloads from a server-sent-events byte stream.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    data_lines: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed bytes; returns the payloads of every event completed by them.
    pub fn push(&mut self, bytes: &[u8]) -> Result<Vec<String>> {
        self.buffer.extend_from_slice(bytes);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(payload) = self.process_line(decode_line(&line)?) {
                events.push(payload);
            }
        }
        Ok(events)
    }

    /// Flush at end of stream. A final event without its blank-line
    /// terminator is still delivered.
    pub fn finish(&mut self) -> Result<Option<String>> {
        let rest = std::mem::take(&mut self.buffer);
        if !rest.is_empty() {
            if let Some(payload) = self.process_line(decode_line(&rest)?) {
                return Ok(Some(payload));
            }
        }
        Ok(self.dispatch())
    }

    fn process_line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        // event, id and retry carry nothing we use
        if field == "data" {
            self.data_lines.push(value.to_string());
        }
        None
    }

    fn dispatch(&mut self) -> Option<String> {
        if self.data_lines.is_empty() {
            return None;
        }
        let payload = self.data_lines.join("\n");
        self.data_lines.clear();
        Some(payload)
    }
}

fn decode_line(line: &[u8]) -> Result<&str> {
    let line = std::str::from_utf8(line).map_err(|e| {
        ChecklistError::StreamError(format!("Event stream line is not valid UTF-8: {}", e))
    })?;
    Ok(line.trim_end_matches(['\n', '\r']))
}
