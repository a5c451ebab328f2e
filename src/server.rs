use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use crate::AppState;
use crate::agent::{Agent, FaqStore};
use crate::client::CHAT_PATH;
use crate::config::AppConfig;

/// Used in place of a timeout when `request_timeout_secs` is zero.
const TIMEOUT_DISABLED: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    let agent = Agent::new(FaqStore::load(&config.agent.faq_path));
    info!(
        name: "agent.ready",
        faq_path = %config.agent.faq_path,
        faq_count = agent.faq_count(),
        "Agent ready"
    );

    let state = AppState {
        agent: Arc::new(agent),
        config: Arc::clone(&config),
    };
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        "Server started"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

/// Build the application router with its middleware stack.
pub fn build_router(state: AppState) -> Router {
    let timeout_duration = match state.config.server.request_timeout_secs {
        0 => TIMEOUT_DISABLED,
        secs => Duration::from_secs(secs),
    };

    Router::new()
        .route(CHAT_PATH, post(api_chat).fallback(post_only))
        .layer(DefaultBodyLimit::max(state.config.server.body_limit_bytes))
        .layer(axum::middleware::from_fn(
            move |req: Request, next: Next| async move {
                match tokio::time::timeout(timeout_duration, next.run(req)).await {
                    Ok(res) => res,
                    Err(_) => (
                        StatusCode::REQUEST_TIMEOUT,
                        Json(json!({ "error": "Request timed out" })),
                    )
                        .into_response(),
                }
            },
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ─────────────────────────────────────────────────────────────────────────────
// API Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Request body for the chat API. A missing message counts as empty.
#[derive(Debug, Deserialize)]
struct ChatBody {
    #[serde(default)]
    message: String,
}

/// POST /api/chat/ - Answer one message.
async fn api_chat(State(state): State<AppState>, body: Bytes) -> Response {
    let request_id = Uuid::new_v4();

    let req: ChatBody = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(e) => {
            tracing::warn!(%request_id, error = %e, "Malformed chat request");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error",
                    "details": e.to_string(),
                })),
            )
                .into_response();
        }
    };

    let message = req.message.trim();
    if message.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Empty message" })),
        )
            .into_response();
    }

    tracing::info!(
        %request_id,
        message_length = message.len(),
        "Received chat request"
    );

    let reply = state.agent.respond(message);
    Json(json!({ "response": reply.to_json() })).into_response()
}

/// Any other method on the chat route.
async fn post_only() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "POST only" })),
    )
}
