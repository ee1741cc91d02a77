use std::path::PathBuf;
use std::process::ExitCode;
use anyhow::Result;
use clap::{Parser, Subcommand};
use docsdesk_core::chat::{answer_message, FAILURE_MESSAGE};
use docsdesk_core::{BackendClient, Config, ConfigOverrides, ContextOutcome};

mod app;
mod handler;
mod input;
mod logging;
mod markdown;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "docsdesk", version)]
#[command(about = "Ask questions against a documentation QA backend and feed it new context")]
struct Cli {
    /// Base URL of the QA backend
    #[arg(long, env = "DOCSDESK_BACKEND_URL", global = true)]
    backend_url: Option<String>,
    /// Base URL that reference anchors are appended to
    #[arg(long, env = "DOCSDESK_REFERENCE_URL", global = true)]
    reference_url: Option<String>,
    /// Request timeout in seconds (no timeout by default)
    #[arg(long, global = true)]
    timeout: Option<u64>,
    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Where to write logs
    #[arg(long, env = "DOCSDESK_LOG_FILE", global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a single question and print the answer
    Ask {
        /// Your question
        question: String,
    },
    /// Ask the backend to ingest its context data
    Ingest,
    /// Print the effective configuration
    Config {
        /// Write it to the config file
        #[arg(long)]
        save: bool,
    },
}

impl Cli {
    fn load_config(&self) -> Result<Config> {
        let config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };

        Ok(config.with_overrides(ConfigOverrides {
            backend_url: self.backend_url.clone(),
            reference_base_url: self.reference_url.clone(),
            request_timeout_secs: self.timeout,
        }))
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = cli.load_config()?;

    match logging::init(cli.log_file.clone()) {
        Ok(path) => tracing::info!(log = %path.display(), backend = %config.backend_url, "docsdesk starting"),
        Err(err) => eprintln!("warning: logging disabled: {err:#}"),
    }

    match cli.command {
        None => {
            run_tui(config).await?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Ask { question }) => ask_once(&config, &question).await,
        Some(Commands::Ingest) => ingest_once(&config).await,
        Some(Commands::Config { save }) => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            if save {
                let path = match &cli.config {
                    Some(path) => {
                        config.save_to(path)?;
                        path.clone()
                    }
                    None => config.save()?,
                };
                println!("Saved to {}", path.display());
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run_tui(config: Config) -> Result<()> {
    let mut app = App::new(config)?;

    let mut terminal = tui::init()?;
    tui::install_panic_hook();
    let mut events = EventHandler::new();

    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    app.shutdown();
    tui::restore()?;
    tracing::info!("docsdesk exiting");

    result
}

async fn run_loop(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    loop {
        app.collect_finished().await;

        terminal.draw(|frame| ui::render(app, frame))?;

        if app.should_quit {
            return Ok(());
        }

        match events.next().await {
            Some(event) => handler::handle_event(app, event),
            None => return Ok(()),
        }
    }
}

async fn ask_once(config: &Config, question: &str) -> Result<ExitCode> {
    if question.trim().is_empty() {
        eprintln!("Question is empty");
        return Ok(ExitCode::FAILURE);
    }

    let client = BackendClient::from_config(config)?;
    match client.ask(question).await {
        Ok(response) => {
            let message = answer_message(response);
            println!("{}", message.text);
            if let Some(anchor) = message.reference_anchor() {
                println!("\nReference: {}", config.reference_url(anchor));
            }
            if let Some(score) = message.display_score() {
                println!("Score - {score}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            tracing::error!(error = %err, "get-answer failed");
            eprintln!("{FAILURE_MESSAGE}\n{err}");
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn ingest_once(config: &Config) -> Result<ExitCode> {
    let client = BackendClient::from_config(config)?;
    let result = client.ingest().await;
    if let Err(err) = &result {
        tracing::error!(error = %err, "ingest-data failed");
    }

    match ContextOutcome::from_result(result) {
        ContextOutcome::Success(text) => {
            println!("{text}");
            Ok(ExitCode::SUCCESS)
        }
        ContextOutcome::Failure(text) => {
            eprintln!("{text}");
            Ok(ExitCode::FAILURE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};
    use tempfile::TempDir;

    #[test]
    fn test_cli_flags_override_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"backend_url": "http://file:8000", "request_timeout_secs": 5}"#).unwrap();

        let cli = Cli::parse_from([
            "docsdesk",
            "--config",
            path.to_str().unwrap(),
            "--backend-url",
            "http://flag:9000",
            "ask",
            "hi",
        ]);
        let config = cli.load_config().unwrap();

        assert_eq!(config.backend_url, "http://flag:9000");
        assert_eq!(config.request_timeout_secs, Some(5));
        assert!(matches!(cli.command, Some(Commands::Ask { ref question }) if question == "hi"));
    }

    #[tokio::test]
    async fn test_ask_once_sends_question_unchanged() {
        let seen: Arc<Mutex<Option<String>>> = Arc::default();
        let router = Router::new()
            .route(
                "/get-answer",
                post(
                    |State(seen): State<Arc<Mutex<Option<String>>>>, Json(body): Json<Value>| async move {
                        *seen.lock().unwrap() = body["query"].as_str().map(str::to_string);
                        (StatusCode::CREATED, Json(json!({ "answer": "ok" })))
                    },
                ),
            )
            .with_state(seen.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let config = Config::new().with_overrides(ConfigOverrides {
            backend_url: Some(format!("http://{addr}")),
            ..Default::default()
        });
        ask_once(&config, "  padded question \n").await.unwrap();

        assert_eq!(seen.lock().unwrap().as_deref(), Some("  padded question \n"));
    }

    #[test]
    fn test_no_subcommand_runs_tui() {
        let cli = Cli::parse_from(["docsdesk", "--timeout", "10"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.timeout, Some(10));
    }

    #[test]
    fn test_config_save_flag() {
        let cli = Cli::parse_from(["docsdesk", "config", "--save"]);
        assert!(matches!(cli.command, Some(Commands::Config { save: true })));
    }
}
