// ABOUTME: Entry point for groqchat — a terminal chat client with conversation memory.
// ABOUTME: Parses CLI args, loads config and secrets, installs logging, and launches the app.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use groqchat::app::App;
use groqchat::chat::create_client;
use groqchat::config::Config;
use groqchat::session::Configuration;

#[derive(Parser)]
#[command(name = "groqchat")]
#[command(about = "Chat with Groq-hosted models from the terminal")]
#[command(version)]
struct Cli {
    /// Model to use (e.g. llama-3.1-8b-instant)
    #[arg(short, long)]
    model: Option<String>,

    /// Sampling temperature, 0.0 to 1.0
    #[arg(short, long)]
    temperature: Option<f32>,

    /// Maximum tokens to generate per reply
    #[arg(long)]
    max_tokens: Option<u32>,

    /// System prompt sent ahead of every request
    #[arg(short, long)]
    system_prompt: Option<String>,

    /// Run a single prompt, print the reply, and exit
    #[arg(short, long)]
    prompt: Option<String>,

    /// File the /export command writes to
    #[arg(long)]
    export: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load local .env if present, then the user's secrets file.
    let _ = dotenvy::dotenv();
    let _ = dotenvy::from_path(Config::secrets_env_path());

    if let Err(e) = init_logging() {
        eprintln!("Warning: failed to initialize logging: {}", e);
    }

    let mut config = Config::load()?;
    if let Some(model) = cli.model {
        config.llm.model = model;
    }
    if let Some(temperature) = cli.temperature {
        config.llm.temperature = temperature;
    }
    if let Some(max_tokens) = cli.max_tokens {
        config.llm.max_tokens = max_tokens;
    }
    if let Some(system_prompt) = cli.system_prompt {
        config.llm.system_prompt = system_prompt;
    }
    if let Some(export) = cli.export {
        config.ui.export_path = export;
    }

    let session_config = Configuration::from(&config.llm);
    session_config.validate()?;

    // A missing credential stops here, before any session starts.
    let client = create_client(&config.llm)?;
    tracing::info!(model = %session_config.model_id, "starting groqchat");

    let app = App::new(session_config, config.ui, client);
    match cli.prompt {
        Some(prompt) => app.run_single_prompt(&prompt).await,
        None => app.run().await,
    }
}

/// Send tracing output to a log file; the TUI owns the terminal.
fn init_logging() -> anyhow::Result<()> {
    let path = Config::log_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .init();
    Ok(())
}
