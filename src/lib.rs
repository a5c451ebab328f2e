//! HelpMate
//!
//! A small chat assistant: a rule-based agent behind a JSON endpoint, and a
//! chat widget that talks to it.
//!
//! # Architecture
//!
//! - **Server**: Axum HTTP server exposing `POST /api/chat/`
//! - **Agent**: intent detection plus math, algebra, weather and FAQ tools
//! - **Widget**: UI-independent controller driving one chat conversation
//! - **Client**: reqwest transport the widget uses to reach the server
//!
//! # Modules
//!
//! - [`agent`]: the responder
//! - [`widget`]: controller, views and reply decoding
//! - [`client`]: HTTP transport
//! - [`config`]: layered configuration

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::unused_async)]

pub mod agent;
pub mod client;
pub mod config;
pub mod server;
pub mod widget;

use crate::agent::Agent;
use crate::config::AppConfig;
use std::sync::Arc;

/// Application state shared across all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Responder answering chat messages.
    pub agent: Arc<Agent>,
    /// Application configuration.
    pub config: Arc<AppConfig>,
}
