//! A streaming fan-out relay over multiple LLM chat providers.
//!
//! This library normalizes heterogeneous provider APIs (OpenAI, Gemini,
//! DeepSeek) behind one capability trait, fans out batch requests
//! concurrently, relays streamed responses as a single SSE protocol, and
//! reconstructs messages from that protocol on the client side.

pub mod accumulator;
pub mod batch;
pub mod catalog;
pub mod client;
pub mod error;
pub mod provider;
pub mod providers;
pub mod registry;
pub mod relay;
pub mod server;
pub mod session;
pub mod sse;
pub mod types;

// Re-export core types for easy usage
pub use accumulator::MessageAccumulator;
pub use client::StreamClient;
pub use error::Error;
pub use provider::{ChatProvider, ChunkStream, StreamChunk};
pub use providers::*;
pub use registry::{ProviderRegistry, ProviderSettings};
pub use relay::{open_relay, EventRelay};
pub use session::{ChatSession, TranscriptMessage};
pub use types::*;
