//! Framing adapter that turns a byte stream into SSE `data:` records.
//!
//! Used on both sides of the relay: the provider bindings read vendor event
//! streams through it, and the stream reader client decodes the relay's own
//! output with it. Records split across transport chunks are reassembled
//! before parsing.

use futures_util::{Stream, StreamExt};
use memchr::memmem;
use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

use crate::types::streaming::DONE_SENTINEL;
use crate::Error;

/// One decoded `data:` record from an event stream.
#[derive(Debug, Clone, PartialEq)]
pub struct SseRecord {
    /// Payload with the `data:` prefix stripped; multi-line records are
    /// joined with newlines.
    pub data: String,
}

impl SseRecord {
    pub fn new(data: impl Into<String>) -> Self {
        Self { data: data.into() }
    }

    /// Whether this record is the end-of-stream sentinel rather than data.
    pub fn is_done(&self) -> bool {
        self.data.trim() == DONE_SENTINEL
    }
}

/// Adapter that parses SSE records out of a byte stream, buffering bytes
/// until a full `\n\n`-terminated record is available.
pub struct SseDecoder<S> {
    inner: S,
    /// Raw bytes carried over from previous chunks.
    buffer: Vec<u8>,
    /// Records parsed but not yet yielded.
    records: VecDeque<SseRecord>,
}

/// Upper bound on buffered bytes for a single record.
const MAX_RECORD_BYTES: usize = 1_000_000;

impl<S> SseDecoder<S> {
    pub fn new(stream: S) -> Self {
        Self {
            inner: stream,
            buffer: Vec::new(),
            records: VecDeque::new(),
        }
    }

    /// Extract every complete record from the buffer, leaving any trailing
    /// partial record in place.
    fn drain_buffer(&mut self) -> Result<(), Error> {
        let separator = b"\n\n";
        let finder = memmem::Finder::new(separator);
        let mut start = 0;

        while let Some(pos) = finder.find(&self.buffer[start..]) {
            let record_end = start + pos;
            let record_bytes = &self.buffer[start..record_end];

            let record_text = std::str::from_utf8(record_bytes)
                .map_err(|e| Error::streaming(format!("Invalid UTF-8 in event stream: {e}")))?;

            if let Some(record) = parse_record(record_text) {
                self.records.push_back(record);
            }

            start = record_end + separator.len();
        }

        if start > 0 {
            self.buffer.drain(..start);
        }

        Ok(())
    }
}

/// Parse one record's text, collecting its `data:` lines. Comment lines and
/// unknown fields are ignored; a record without data yields nothing.
fn parse_record(record_text: &str) -> Option<SseRecord> {
    let mut data_lines = Vec::new();

    for line in record_text.lines() {
        let line = line.trim_end();

        if line.is_empty() || line.starts_with(':') {
            continue;
        }

        if let Some(mut value) = line.strip_prefix("data:") {
            if let Some(stripped) = value.strip_prefix(' ') {
                value = stripped;
            }
            data_lines.push(value.to_string());
        }
    }

    if data_lines.is_empty() {
        return None;
    }

    Some(SseRecord::new(data_lines.join("\n")))
}

impl<S, E> Stream for SseDecoder<S>
where
    S: Stream<Item = Result<bytes::Bytes, E>> + Unpin,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    type Item = Result<SseRecord, Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if let Some(record) = self.records.pop_front() {
                return Poll::Ready(Some(Ok(record)));
            }

            let chunk = match ready!(self.inner.poll_next_unpin(cx)) {
                Some(Ok(chunk)) => chunk,
                Some(Err(e)) => {
                    return Poll::Ready(Some(Err(Error::streaming(format!(
                        "Transport error: {}",
                        e.into()
                    )))));
                }
                None => {
                    // Some vendors end the stream without a final separator;
                    // parse whatever is left as a last record.
                    if !self.buffer.is_empty() {
                        let leftover = std::mem::take(&mut self.buffer);
                        if let Ok(text) = std::str::from_utf8(&leftover) {
                            if let Some(record) = parse_record(text.trim()) {
                                return Poll::Ready(Some(Ok(record)));
                            }
                        }
                    }
                    return Poll::Ready(None);
                }
            };

            self.buffer.extend_from_slice(&chunk);

            if self.buffer.len() > MAX_RECORD_BYTES {
                self.buffer.clear();
                return Poll::Ready(Some(Err(Error::streaming(
                    "event record exceeded maximum size",
                ))));
            }

            if let Err(e) = self.drain_buffer() {
                return Poll::Ready(Some(Err(e)));
            }
        }
    }
}

/// Extension trait to decode byte streams as SSE records.
pub trait SseDecoderExt: Stream {
    fn sse_records(self) -> SseDecoder<Self>
    where
        Self: Sized,
    {
        SseDecoder::new(self)
    }
}

impl<S: Stream> SseDecoderExt for S {}
