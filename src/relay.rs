//! Server-side stream relay.
//!
//! Drives one provider's chunk stream and normalizes it into an ordered
//! `StreamEvent` sequence: zero or more Content events followed by exactly
//! one terminal event (Done on clean exhaustion, Error on any failure).

use futures_util::{Stream, StreamExt};
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use std::time::Instant;

use crate::provider::ChunkStream;
use crate::registry::ProviderRegistry;
use crate::types::{ModelChat, ProviderKind, StreamEvent};
use crate::Error;

/// Validate the request, resolve the provider, and open its chunk stream.
/// Client-input and registry failures surface here, before any event is
/// produced.
pub async fn open_relay(
    registry: &ProviderRegistry,
    request: &ModelChat,
) -> Result<EventRelay, Error> {
    request.validate_stream()?;
    let client = registry.resolve(request.provider)?;
    let chunks = client.stream_chat(request).await?;
    Ok(EventRelay::new(request.provider, chunks))
}

enum RelayState {
    Streaming,
    Finished,
}

/// Event stream for one (provider, request) pair.
///
/// Fragments are forwarded as they arrive, without coalescing. Dropping the
/// relay drops the provider stream, so a caller disconnect stops consumption
/// and releases the underlying transport.
pub struct EventRelay {
    provider: ProviderKind,
    chunks: ChunkStream,
    started: Instant,
    state: RelayState,
}

impl EventRelay {
    pub fn new(provider: ProviderKind, chunks: ChunkStream) -> Self {
        Self {
            provider,
            chunks,
            started: Instant::now(),
            state: RelayState::Streaming,
        }
    }

    pub fn provider(&self) -> ProviderKind {
        self.provider
    }
}

impl Stream for EventRelay {
    type Item = StreamEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if matches!(self.state, RelayState::Finished) {
            return Poll::Ready(None);
        }

        match ready!(self.chunks.poll_next_unpin(cx)) {
            Some(Ok(chunk)) => Poll::Ready(Some(StreamEvent::content(self.provider, chunk.content))),
            Some(Err(e)) => {
                // Terminal: no Done follows an error, and the provider
                // stream is not polled again.
                self.state = RelayState::Finished;
                Poll::Ready(Some(StreamEvent::error(self.provider, e.to_string())))
            }
            None => {
                self.state = RelayState::Finished;
                let elapsed_ms = self.started.elapsed().as_millis() as u64;
                Poll::Ready(Some(StreamEvent::done(self.provider, elapsed_ms)))
            }
        }
    }
}
