use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::types::Language;

#[derive(Parser, Debug, Clone)]
#[command(name = "sqlchat", about = "Ask questions in natural language, get SQL and answers")]
pub struct Cli {
    #[command(flatten)]
    pub config: Config,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP API (default)
    Serve,
    /// Interactive terminal chat against the HTTP API
    Chat(ChatArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ChatArgs {
    /// Base URL of a running API server
    #[arg(long, env = "SQLCHAT_API_URL", default_value = "http://localhost:8000")]
    pub api_url: String,

    /// Question and answer language (en or ko)
    #[arg(long, default_value = "en")]
    pub language: Language,
}

/// Settings shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct Config {
    /// Server database connection string (postgresql://...)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Local embedded database file, used outside deployment
    #[arg(long, env = "SQLITE_PATH", default_value = "spider_demo.db")]
    pub sqlite_path: PathBuf,

    /// Connect timeout for the server database, in seconds
    #[arg(long, env = "DB_CONNECT_TIMEOUT", default_value_t = 10)]
    pub connect_timeout_secs: u64,

    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    #[arg(long, env = "GEMINI_MODEL", default_value = "gemini-2.5-flash")]
    pub gemini_model: String,

    /// Model for result explanations; falls back to `gemini_model`
    #[arg(long, env = "GEMINI_EXPLANATION_MODEL")]
    pub gemini_explanation_model: Option<String>,

    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8000")]
    pub listen_addr: SocketAddr,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,

    #[command(flatten)]
    pub deployment: DeploymentIndicators,
}

impl Config {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Platform markers that identify a hosted deployment.
#[derive(Args, Debug, Clone, Default)]
pub struct DeploymentIndicators {
    #[arg(long, env = "STREAMLIT_SHARING", hide = true)]
    pub streamlit_sharing: Option<String>,

    #[arg(long, env = "RAILWAY_ENVIRONMENT", hide = true)]
    pub railway_environment: Option<String>,

    #[arg(long, env = "HEROKU", hide = true)]
    pub heroku: Option<String>,

    #[arg(long, env = "RENDER", hide = true)]
    pub render: Option<String>,
}

impl DeploymentIndicators {
    pub fn any_set(&self) -> bool {
        fn present(v: &Option<String>) -> bool {
            v.as_deref().is_some_and(|s| !s.is_empty())
        }

        self.streamlit_sharing.as_deref() == Some("true")
            || present(&self.railway_environment)
            || present(&self.heroku)
            || present(&self.render)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentMode {
    Local,
    Deployed,
}

impl DeploymentMode {
    /// Decided once at start-up. The working directory check catches hosted
    /// checkouts that set none of the platform markers.
    pub fn detect(indicators: &DeploymentIndicators, cwd: &Path) -> Self {
        let cwd_hint = cwd.to_string_lossy().to_lowercase().contains("streamlit");
        if indicators.any_set() || cwd_hint {
            DeploymentMode::Deployed
        } else {
            DeploymentMode::Local
        }
    }

    pub fn is_deployed(self) -> bool {
        self == DeploymentMode::Deployed
    }
}
