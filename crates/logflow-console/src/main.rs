//! `logflow` - operator console for the LogFlow SRE backend.
//!
//! `logflow run` opens the interactive dashboard. The remaining
//! subcommands are one-shot operations against the same backend: submit a
//! log, ask the AI a question, or print the fleet summary.

mod app;
mod config;
mod console;
mod sources;
mod views;

use std::path::PathBuf;

use anyhow::Context;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use logflow_client::{ApiClient, Attachment};
use logflow_core::{LogDraft, LogLevel};

use crate::config::ConsoleConfig;

#[derive(Debug, Parser)]
#[command(name = "logflow", about = "Operator console for the LogFlow backend")]
struct Cli {
    /// Backend base URL (overrides the config file).
    #[arg(long)]
    base_url: Option<String>,

    /// Path to a config file (default: <config dir>/logflow/config.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Open the interactive dashboard (default).
    Run,
    /// Submit a single log record.
    Ingest {
        #[arg(long)]
        service: String,
        #[arg(long, default_value = "INFO")]
        level: String,
        #[arg(long)]
        message: String,
    },
    /// Ask the AI assistant a question, optionally with a screenshot.
    Ask {
        question: String,
        /// Image file to attach (png/jpeg/gif/webp).
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Print the fleet-wide AI summary.
    Summary,
}

fn parse_level(raw: &str) -> anyhow::Result<LogLevel> {
    match raw.to_ascii_uppercase().as_str() {
        "ERROR" => Ok(LogLevel::Error),
        "WARN" | "WARNING" => Ok(LogLevel::Warn),
        "INFO" => Ok(LogLevel::Info),
        "DEBUG" => Ok(LogLevel::Debug),
        other => anyhow::bail!("unknown level '{other}', expected ERROR/WARN/INFO/DEBUG"),
    }
}

fn mime_for(path: &PathBuf) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

fn load_attachment(path: &PathBuf) -> anyhow::Result<Attachment> {
    let bytes =
        std::fs::read(path).with_context(|| format!("reading image {}", path.display()))?;
    Ok(Attachment {
        image_data: BASE64.encode(bytes),
        mime_type: mime_for(path).to_string(),
    })
}

/// The dashboard owns the terminal, so interactive runs log to a file
/// under the config directory instead of stdout.
fn init_tracing(interactive: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if interactive {
        let log_path = ConsoleConfig::default_path()
            .and_then(|p| p.parent().map(|d| d.join("console.log")));
        if let Some(path) = log_path {
            if let Some(dir) = path.parent() {
                let _ = std::fs::create_dir_all(dir);
            }
            if let Ok(file) = std::fs::File::create(&path) {
                tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_ansi(false)
                    .with_writer(std::sync::Mutex::new(file))
                    .init();
            }
        }
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Run);
    init_tracing(matches!(command, Command::Run));

    let mut config = ConsoleConfig::load(cli.config.as_deref())?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    let client = ApiClient::new(config.base_url.clone(), config.request_timeout())?;

    match command {
        Command::Run => console::run(client, config).await,
        Command::Ingest {
            service,
            level,
            message,
        } => {
            let draft = LogDraft {
                service,
                level: parse_level(&level)?,
                message,
                timestamp: None,
            };
            let ack = client.ingest(&draft).await?;
            match ack.id {
                Some(id) => println!("stored log #{id} ({})", ack.status),
                None => println!("stored log ({})", ack.status),
            }
            Ok(())
        }
        Command::Ask { question, image } => {
            let attachment = image.as_ref().map(load_attachment).transpose()?;
            let answer = client.ask(&question, attachment.as_ref()).await?;
            println!("{}", answer.answer);
            if let Some(range) = answer.time_range {
                println!("\n(time range analyzed: {range})");
            }
            Ok(())
        }
        Command::Summary => {
            let report = client.fetch_summary().await?;
            println!("{}", report.summary);
            if report.total_logs > 0 {
                println!(
                    "\n{} logs | {} errors | {} warnings | {} info",
                    report.total_logs, report.error_count, report.warning_count, report.info_count
                );
            }
            Ok(())
        }
    }
}
