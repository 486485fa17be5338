use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use charla_core::{
    config::{self, Config},
    ConversationManager, ConversationSettings, MemoryStore, OllamaClient, Role, SamplingParams,
};

mod app;
mod handler;
mod tui;
mod ui;

use app::App;

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "llama3.2:latest";

#[derive(Parser)]
#[command(name = "charla")]
#[command(about = "Terminal chat for locally hosted language models")]
struct Cli {
    /// Base URL of the Ollama-compatible server
    #[arg(long)]
    url: Option<String>,
    /// Model to query
    #[arg(short, long)]
    model: Option<String>,
    /// Path of the saved-memory file
    #[arg(long)]
    memory: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a single question and print the reply
    Ask {
        /// Your question
        question: String,
    },
    /// List models available on the server
    Models,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = init_logging()?;

    let config = Config::load().unwrap_or_else(|err| {
        warn!(error = %err, "could not read config, using defaults");
        Config::default()
    });

    let base_url = cli
        .url
        .clone()
        .or_else(|| config.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let model = cli
        .model
        .clone()
        .or_else(|| config.model.clone())
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());
    let gateway = OllamaClient::new(&base_url, &model);

    let memory_path = match cli.memory.clone().or_else(|| config.memory_path.clone()) {
        Some(path) => path,
        None => config::default_memory_path()?,
    };
    let store = MemoryStore::new(memory_path);
    let manager = ConversationManager::new(store, conversation_settings(&config));

    match cli.command {
        Some(Commands::Ask { question }) => ask_once(manager, &gateway, &question).await,
        Some(Commands::Models) => list_models(&gateway).await,
        None => run_tui(App::new(manager, gateway)).await,
    }
}

/// Log to a file so output never corrupts the TUI
fn init_logging() -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let log_dir = config::app_dir()?;
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::never(&log_dir, "charla.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(guard)
}

fn conversation_settings(config: &Config) -> ConversationSettings {
    let defaults = ConversationSettings::default();
    ConversationSettings {
        context_window: config.context_window.unwrap_or(defaults.context_window),
        sampling: SamplingParams {
            temperature: config.temperature.unwrap_or(defaults.sampling.temperature),
            top_k: config.top_k.unwrap_or(defaults.sampling.top_k),
            max_tokens: config.max_tokens.unwrap_or(defaults.sampling.max_tokens),
        },
    }
}

/// One sequential exchange on stdout, no terminal UI
async fn ask_once(
    mut manager: ConversationManager,
    gateway: &OllamaClient,
    question: &str,
) -> Result<()> {
    manager.record(Role::User, question, false);
    let reply = manager.generate_reply(gateway, question).await;
    println!("{reply}");
    Ok(())
}

async fn list_models(gateway: &OllamaClient) -> Result<()> {
    match gateway.list_models().await {
        Ok(models) if models.is_empty() => {
            println!("No models found. Pull one with: ollama pull llama3.2");
        }
        Ok(models) => {
            for model in models {
                println!("{model}");
            }
        }
        Err(err) => {
            eprintln!("Error listing models: {err}");
        }
    }
    Ok(())
}

async fn run_tui(mut app: App) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        // A finished model call is folded in before waiting on input; the
        // tick event wakes this loop even when the user is idle.
        if app.reply_task.as_ref().is_some_and(|task| task.is_finished()) {
            if let Some(task) = app.reply_task.take() {
                app.finish_reply(task.await);
            }
            continue;
        }

        if let Some(event) = events.next().await {
            handler::handle_event(&mut app, event);
        }
    }

    tui::restore()?;
    Ok(())
}
