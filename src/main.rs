//! HelpMate
//!
//! Entry point: `serve` runs the chat API, `chat` runs the terminal widget.

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use helpmate::client::ChatClient;
use helpmate::config::{AppConfig, Command};
use helpmate::server;
use helpmate::widget::{ChatWidgetController, TerminalView, run_repl};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present)
    let _ = dotenv();

    let config = AppConfig::load().context("Failed to load configuration")?;

    // The terminal chat shares stdout with the conversation, so keep it quiet.
    let default_level = match config.command {
        Command::Serve => "info",
        Command::Chat { .. } => "warn",
    };
    init_tracing(&config.logging.format, default_level)?;

    match config.command {
        Command::Serve => server::start_server(Arc::new(config)).await,
        Command::Chat { .. } => run_chat(&config).await,
    }
}

/// Initialize tracing (M-LOG-STRUCTURED)
fn init_tracing(format: &str, default_level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.parse()?)
        .from_env_lossy();

    if format.eq_ignore_ascii_case("json") {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .with(filter)
            .init();
    }
    Ok(())
}

async fn run_chat(config: &AppConfig) -> anyhow::Result<()> {
    let client = ChatClient::new(&config.client.endpoint)
        .with_context(|| format!("Invalid chat endpoint {}", config.client.endpoint))?;

    info!(
        name: "chat.started",
        endpoint = %client.endpoint(),
        "Chat session started"
    );
    println!("HelpMate: Type 'help' for examples, ':quit' to leave.");

    let mut controller = ChatWidgetController::new(client, TerminalView::new(std::io::stdout()));
    run_repl(&mut controller, BufReader::new(tokio::io::stdin())).await?;
    Ok(())
}
