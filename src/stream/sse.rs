use anyhow::Result;
use futures::{Stream, StreamExt};
use std::collections::VecDeque;

/// Incremental decoder for `text/event-stream` bodies.
///
/// Only `data` fields matter here; multi-line data is joined with `\n` and
/// a blank line dispatches the event. Comments and other fields are skipped.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk; returns the payloads of every event it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            let line = String::from_utf8_lossy(&line);
            if let Some(event) = self.feed_line(&line) {
                events.push(event);
            }
        }
        events
    }

    fn feed_line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            if self.data.is_empty() {
                return None;
            }
            let payload = self.data.join("\n");
            self.data.clear();
            return Some(payload);
        }

        // Comment / keep-alive
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        if field == "data" {
            self.data.push(value.to_string());
        }
        None
    }
}

/// Turn a byte stream into a stream of event payloads.
///
/// A read error is yielded once and ends the stream. An event left
/// unterminated at end of body is discarded.
pub fn decode_events<S, B, E>(bytes: S) -> impl Stream<Item = Result<String>> + Send
where
    S: Stream<Item = std::result::Result<B, E>> + Send + Unpin + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: std::error::Error + Send + Sync + 'static,
{
    let state = (bytes, SseDecoder::new(), VecDeque::new(), false);

    futures::stream::unfold(state, |(mut bytes, mut decoder, mut ready, mut done)| async move {
        loop {
            if let Some(payload) = ready.pop_front() {
                return Some((Ok(payload), (bytes, decoder, ready, done)));
            }
            if done {
                return None;
            }
            match bytes.next().await {
                Some(Ok(chunk)) => ready.extend(decoder.push(chunk.as_ref())),
                Some(Err(e)) => {
                    done = true;
                    let err = anyhow::Error::new(e).context("Event stream read failed");
                    return Some((Err(err), (bytes, decoder, ready, done)));
                }
                None => done = true,
            }
        }
    })
}
