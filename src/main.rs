use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use sqlchat::config::{Cli, Command, Config, DeploymentMode};
use sqlchat::llm::GeminiProvider;
use sqlchat::{chat, gateway, logging, ConnectionResolver, Orchestrator};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(&cli.config.log_level)?;

    let mode = DeploymentMode::detect(&cli.config.deployment, &std::env::current_dir()?);
    info!("deployment mode: {:?}", mode);
    let orchestrator = build_orchestrator(&cli.config, mode);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&cli.config, orchestrator).await,
        Command::Chat(args) => chat::terminal::run(&args.api_url, args.language, &orchestrator).await,
    }
}

fn build_orchestrator(config: &Config, mode: DeploymentMode) -> Orchestrator {
    let resolver = ConnectionResolver::from_config(config, mode);
    let llm = GeminiProvider::new(config.gemini_api_key.clone(), &config.gemini_model);
    let orchestrator = Orchestrator::new(resolver, Arc::new(llm));
    match &config.gemini_explanation_model {
        Some(model) => {
            let explainer = GeminiProvider::new(config.gemini_api_key.clone(), model);
            orchestrator.with_explainer(Arc::new(explainer))
        }
        None => orchestrator,
    }
}

async fn serve(config: &Config, orchestrator: Orchestrator) -> anyhow::Result<()> {
    let app = gateway::router(Arc::new(orchestrator));
    let listener = TcpListener::bind(config.listen_addr).await?;
    info!("Server started on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
