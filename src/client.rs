//! Client-side incremental reader for relay streams.

use futures_util::StreamExt;
use reqwest::Client;
use tracing::warn;

use crate::sse::SseDecoderExt;
use crate::types::{ModelChat, StreamEvent};
use crate::Error;

/// Consumes a relay stream over HTTP and dispatches each parsed event to a
/// callback, synchronously and in arrival order.
pub struct StreamClient {
    http: Client,
    base_url: String,
}

impl StreamClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Open the stream request and dispatch every event until the transport
    /// completes.
    ///
    /// Returns `Err` only when the connection itself cannot be established
    /// (network failure or non-success status before any event). Failures
    /// after that point surface as an Error event through `on_event`, and
    /// the call still returns `Ok`. Malformed records are logged and
    /// skipped; the sentinel record is recognized and never dispatched.
    pub async fn consume<F>(&self, request: &ModelChat, mut on_event: F) -> Result<(), Error>
    where
        F: FnMut(StreamEvent),
    {
        let response = self
            .http
            .post(format!("{}/api/chat-stream", self.base_url))
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::streaming(format!(
                "stream request failed with status {status}: {body}"
            )));
        }

        let mut records = response.bytes_stream().sse_records();

        while let Some(record) = records.next().await {
            match record {
                Ok(record) => {
                    if record.is_done() {
                        continue;
                    }
                    match serde_json::from_str::<StreamEvent>(&record.data) {
                        Ok(event) => on_event(event),
                        Err(e) => {
                            warn!(error = %e, data = %record.data, "skipping malformed stream record");
                        }
                    }
                }
                Err(e) => {
                    // The response was already open, so a transport failure
                    // here is a partial failure of the stream, not of the
                    // call.
                    on_event(StreamEvent::error(request.provider, e.to_string()));
                    return Ok(());
                }
            }
        }

        Ok(())
    }
}
