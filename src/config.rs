use clap::{Parser, Subcommand};
use config::{Config, Environment, File};
use serde::Deserialize;

/// Default endpoint the `chat` command talks to.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/api/chat/";

#[derive(Parser, Debug)]
#[command(author, version, about = "HelpMate chat assistant", long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Address to bind
    #[arg(long)]
    pub host: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the chat API server (default)
    Serve,
    /// Chat with a running server from the terminal
    Chat {
        /// Chat endpoint URL
        #[arg(long, env = "HELPMATE_ENDPOINT")]
        endpoint: Option<String>,
    },
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub agent: AgentConfig,
    pub client: ClientConfig,
    pub logging: LoggingConfig,
    /// Subcommand selected on the command line.
    #[serde(skip, default = "default_command")]
    pub command: Command,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    /// Zero disables the timeout middleware.
    pub request_timeout_secs: u64,
    pub body_limit_bytes: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AgentConfig {
    pub faq_path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    pub endpoint: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// `text` or `json`.
    pub format: String,
}

fn default_command() -> Command {
    Command::Serve
}

impl AppConfig {
    /// Load from the process arguments. Help, version and usage errors are
    /// printed by clap, which then exits.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::from_cli(Cli::parse())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Self::from_cli(cli)
    }

    pub fn from_cli(cli: Cli) -> Result<Self, config::ConfigError> {
        let mut builder = Config::builder()
            .set_default("server.port", 8000)?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.request_timeout_secs", 30)?
            .set_default("server.body_limit_bytes", 64 * 1024)?
            .set_default("agent.faq_path", "data/faqs.json")?
            .set_default("client.endpoint", DEFAULT_ENDPOINT)?
            .set_default("logging.format", "text")?;

        // An explicit file must exist; the implicit ./helpmate.{yaml,toml,json} may not.
        builder = match &cli.config {
            Some(path) => builder.add_source(File::with_name(path)),
            None => builder.add_source(File::with_name("helpmate").required(false)),
        };

        // HELPMATE_SERVER__PORT=9000
        builder = builder.add_source(
            Environment::with_prefix("HELPMATE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // Flags (and their clap env fallbacks) win over everything else.
        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", port)?;
        }
        if let Some(host) = cli.host {
            builder = builder.set_override("server.host", host)?;
        }
        if let Some(Command::Chat {
            endpoint: Some(endpoint),
        }) = &cli.command
        {
            builder = builder.set_override("client.endpoint", endpoint.as_str())?;
        }

        let mut config: Self = builder.build()?.try_deserialize()?;
        config.command = cli.command.unwrap_or(Command::Serve);
        Ok(config)
    }
}
