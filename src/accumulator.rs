//! Reassembly of streamed fragments into a complete message.

use crate::types::StreamEvent;

/// Accumulates stream events into a finished assistant reply.
///
/// Content fragments are appended in arrival order — pure append, no
/// reordering, no deduplication. The first terminal event freezes the
/// accumulator; anything after it is ignored.
#[derive(Debug, Default)]
pub struct MessageAccumulator {
    text: String,
    elapsed_ms: Option<u64>,
    error: Option<String>,
    finished: bool,
}

impl MessageAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event into the accumulation.
    pub fn apply(&mut self, event: &StreamEvent) {
        if self.finished {
            return;
        }

        match event {
            StreamEvent::Content { content, .. } => self.text.push_str(content),
            StreamEvent::Done { elapsed_ms, .. } => {
                self.elapsed_ms = Some(*elapsed_ms);
                self.finished = true;
            }
            StreamEvent::Error { error, .. } => {
                self.error = Some(error.clone());
                self.finished = true;
            }
        }
    }

    /// Text accumulated so far.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Total stream time, once Done has been seen.
    pub fn elapsed_ms(&self) -> Option<u64> {
        self.elapsed_ms
    }

    /// The failure message, if the stream ended with an error.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether a terminal event has been seen.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}
