//! Seam between the controller and the chat endpoint.

use async_trait::async_trait;

use super::reply::{ChatRequest, RawReply};

/// Delivers one chat request and hands back the raw HTTP reply.
///
/// Implementations return `Ok` for every response the server produced,
/// whatever its status; `Err` is reserved for requests that never got a
/// response (connection refused, reset, unreadable body).
#[async_trait]
pub trait ChatTransport: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn send(&self, request: &ChatRequest) -> Result<RawReply, Self::Error>;
}
