//! HTTP client for the chat endpoint.

mod error;

pub use error::{ClientError, Result};

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use crate::widget::{ChatRequest, ChatTransport, RawReply};

/// Path of the chat endpoint relative to the server root.
pub const CHAT_PATH: &str = "/api/chat/";

/// HTTP transport for the chat widget.
///
/// Sends one `POST` per request with a JSON body. There is no timeout and
/// no retry.
///
/// # Example
///
/// ```rust,no_run
/// use helpmate::client::ChatClient;
/// use helpmate::widget::{ChatRequest, ChatTransport};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ChatClient::from_base_url("http://127.0.0.1:8000")?;
/// let reply = client
///     .send(&ChatRequest { message: "help".into() })
///     .await?;
/// println!("{} {}", reply.status, reply.body);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ChatClient {
    endpoint: Url,
    http: reqwest::Client,
}

impl ChatClient {
    /// Create a client posting to the given endpoint URL.
    pub fn new(endpoint: impl AsRef<str>) -> Result<Self> {
        Ok(Self {
            endpoint: Url::parse(endpoint.as_ref())?,
            http: reqwest::Client::new(),
        })
    }

    /// Create a client for the chat endpoint of the server at `base_url`.
    pub fn from_base_url(base_url: impl AsRef<str>) -> Result<Self> {
        let base = Url::parse(base_url.as_ref())?;
        Ok(Self {
            endpoint: base.join(CHAT_PATH)?,
            http: reqwest::Client::new(),
        })
    }

    /// Get the endpoint URL.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ChatTransport for ChatClient {
    type Error = ClientError;

    async fn send(&self, request: &ChatRequest) -> Result<RawReply> {
        tracing::debug!(endpoint = %self.endpoint, "Sending chat request");

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response.text().await?;

        tracing::debug!(status, content_type = %content_type, body_length = body.len(), "Chat reply received");

        Ok(RawReply {
            status,
            content_type,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_from_base_url() {
        let client = ChatClient::from_base_url("http://localhost:8000").unwrap();
        assert_eq!(client.endpoint().as_str(), "http://localhost:8000/api/chat/");

        let client = ChatClient::from_base_url("http://localhost:8000/ignored/path").unwrap();
        assert_eq!(client.endpoint().as_str(), "http://localhost:8000/api/chat/");
    }

    #[test]
    fn test_invalid_url() {
        assert!(matches!(
            ChatClient::new("not a url"),
            Err(ClientError::InvalidUrl(_))
        ));
    }
}
