//! Decoding chat endpoint replies into a closed set of shapes.
//!
//! The endpoint may answer with a JSON string, a JSON object or plain text,
//! and failures may carry JSON or text. [`Exchange::decode`] sorts a
//! [`RawReply`] into one of these shapes once, at the boundary, and
//! [`Exchange::render`] turns each shape into bubble text.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Characters of a non-JSON error body shown to the user.
pub const SERVER_ERROR_PREVIEW_CHARS: usize = 300;

/// Placeholder for a success body without a usable `response`.
pub const NO_RESPONSE: &str = "No response";

/// Request body for the chat endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// An HTTP response as handed back by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReply {
    pub status: u16,
    /// Value of the `Content-Type` header, empty when absent.
    pub content_type: String,
    pub body: String,
}

impl RawReply {
    pub fn new(status: u16, content_type: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: content_type.into(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_json(&self) -> bool {
        self.content_type.contains("application/json")
    }
}

/// Decoded body of a successful reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyPayload {
    /// `{"response": "..."}`; empty when the member is missing or null.
    Text(String),
    /// `{"response": {...}}`, pairs in wire order.
    Fields(Vec<(String, String)>),
    /// A non-JSON body.
    Plain(String),
}

/// Decoded body of a non-2xx reply.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerFailure {
    Json(Value),
    Text(String),
}

/// Outcome of one request/response pair that reached the server.
#[derive(Debug, Clone, PartialEq)]
pub enum Exchange {
    Reply(ReplyPayload),
    Failure { status: u16, body: ServerFailure },
}

/// Failures that prevent an [`Exchange`] from being produced.
#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("{0}")]
    Transport(String),
    #[error("{0}")]
    Parse(#[from] serde_json::Error),
}

impl Exchange {
    /// Sort a raw reply into its shape.
    ///
    /// Fails only when the content type promises JSON and the body is not.
    pub fn decode(raw: RawReply) -> Result<Self, ExchangeError> {
        if !raw.is_success() {
            let body = if raw.is_json() {
                ServerFailure::Json(serde_json::from_str(&raw.body)?)
            } else {
                ServerFailure::Text(raw.body)
            };
            return Ok(Self::Failure {
                status: raw.status,
                body,
            });
        }

        if !raw.is_json() {
            return Ok(Self::Reply(ReplyPayload::Plain(raw.body)));
        }

        let value: Value = serde_json::from_str(&raw.body)?;
        let payload = match value.get("response") {
            Some(Value::Object(map)) => ReplyPayload::Fields(
                map.iter()
                    .map(|(k, v)| (k.clone(), value_text(v)))
                    .collect(),
            ),
            Some(Value::Array(items)) => ReplyPayload::Fields(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, v)| (i.to_string(), value_text(v)))
                    .collect(),
            ),
            Some(Value::Null) | None => ReplyPayload::Text(String::new()),
            Some(other) => ReplyPayload::Text(value_text(other)),
        };
        Ok(Self::Reply(payload))
    }

    /// Bubble text for this exchange.
    pub fn render(&self) -> String {
        match self {
            Self::Reply(ReplyPayload::Text(text)) if text.is_empty() => NO_RESPONSE.to_string(),
            Self::Reply(ReplyPayload::Text(text) | ReplyPayload::Plain(text)) => text.clone(),
            Self::Reply(ReplyPayload::Fields(fields)) => fields
                .iter()
                .map(|(k, v)| format!("{k}: {v}\n"))
                .collect::<String>()
                .trim_end()
                .to_string(),
            Self::Failure {
                body: ServerFailure::Json(value),
                ..
            } => {
                let detail = match value.get("error") {
                    Some(e) if is_truthy(e) => value_text(e),
                    _ => value.to_string(),
                };
                format!("Error: {detail}")
            }
            Self::Failure {
                body: ServerFailure::Text(text),
                ..
            } => {
                let preview: String = text.chars().take(SERVER_ERROR_PREVIEW_CHARS).collect();
                format!("Server error: {preview}")
            }
        }
    }
}

/// Strings verbatim, anything else as its JSON text.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// JavaScript truthiness, which decides whether an `error` member is shown.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Bubble text for an exchange that never produced a reply.
pub fn render_error(error: &ExchangeError) -> String {
    format!("Network or parsing error: {error}")
}
