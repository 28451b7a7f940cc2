//! Terminal host for the WebChat widget.
//!
//! Renders the conversation on stdout and turns each stdin line into a
//! submission.  Logs go to stderr.
//!
//! Usage:
//!   wc-chat --api-base https://assist.example.com
//!
//! Commands typed at the prompt:
//!   /close  close the connection (no automatic reconnect)
//!   /open   reopen the connection
//!   /quit   exit
//!
//! Env vars:
//!   WC_CONFIG  config file path (default: webchat.toml)
//!   RUST_LOG   log filter (default: warn)

mod surface;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use wc_client::{ClientError, ProtocolMode, UiCommand, WidgetClientBuilder};
use wc_domain::config::WidgetConfig;

use crate::surface::TerminalSurface;

/// Chat with a WebChat assistant from the terminal.
#[derive(Debug, Parser)]
#[command(name = "wc-chat", version, about)]
struct Cli {
    /// Config file (TOML).  Falls back to `WC_CONFIG`, then `webchat.toml`.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the API origin (e.g. `https://assist.example.com`).
    #[arg(long)]
    api_base: Option<String>,
    /// Use this session id instead of the stored one.
    #[arg(long)]
    session_id: Option<String>,
    /// Wire dialect: `structured` or `raw`.
    #[arg(long)]
    protocol: Option<ProtocolMode>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let client = WidgetClientBuilder::from_config(&config)
        .build(TerminalSurface::new())
        .context("building widget client")?;

    eprintln!(
        "session {}  |  /close, /open, /quit",
        client.controller().session_id()
    );

    let (tx, rx) = mpsc::channel::<UiCommand>(32);
    let shutdown = CancellationToken::new();
    let handle = client.spawn(rx, shutdown.clone());

    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    tx.send(UiCommand::OpenPanel).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("reading stdin")?,
            _ = shutdown.cancelled() => break,
        };
        let Some(line) = line else { break };

        let command = match line.trim() {
            "/quit" | "/exit" => break,
            "/close" => UiCommand::ClosePanel,
            "/open" => UiCommand::OpenPanel,
            _ => UiCommand::Submit(line),
        };
        if tx.send(command).await.is_err() {
            break;
        }
    }

    drop(tx);
    match handle.await.context("widget task panicked")? {
        Ok(()) | Err(ClientError::Shutdown) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Load the config file, then apply command-line overrides.
fn load_config(cli: &Cli) -> anyhow::Result<WidgetConfig> {
    let path = cli.config.clone().unwrap_or_else(|| {
        std::env::var("WC_CONFIG")
            .unwrap_or_else(|_| "webchat.toml".into())
            .into()
    });

    let mut config = WidgetConfig::load(&path)
        .with_context(|| format!("loading {}", path.display()))?;

    if let Some(base) = &cli.api_base {
        config.api_base = base.clone();
    }
    if let Some(id) = &cli.session_id {
        config.session_id = Some(id.clone());
    }
    if let Some(mode) = cli.protocol {
        config.protocol_mode = mode;
    }

    tracing::info!(
        path = %path.display(),
        api_base = %config.api_base,
        mode = %config.protocol_mode,
        "config loaded"
    );
    Ok(config)
}
