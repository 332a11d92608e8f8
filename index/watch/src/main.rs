//! Fear & Greed Watcher - Headless Index Monitor
//!
//! Keeps the index in sync on a timer and logs one summary line per
//! completed refresh. Useful on a server or in a tmux pane.
//!
//! # Usage
//!
//! ```bash
//! # Watch the default service (http://127.0.0.1:5000) every 5 minutes
//! feargreed-watch
//!
//! # Custom service and interval
//! feargreed-watch --api-url http://index.internal:5000 --interval-secs 60
//!
//! # One reading as JSON, non-zero exit on failure
//! feargreed-watch --once --json
//!
//! # Verbose logging
//! RUST_LOG=debug feargreed-watch
//! ```
//!
//! # Signals
//!
//! - `SIGTERM` / `SIGINT`: stop the schedule and exit

mod reporter;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{info, warn};

use feargreed_core::{
    default_config_path, load_config_from_path, ClientState, ConfigOverrides, HttpBackend,
    IndexClient, Locale, Presentation, RefreshOutcome,
};

/// Fear & Greed Watcher - headless index monitor
#[derive(Parser, Debug)]
#[command(name = "feargreed-watch")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Base URL of the index service
    #[arg(short = 'u', long, env = "FEAR_GREED_API_URL", value_name = "URL")]
    api_url: Option<String>,

    /// Configuration file path
    #[arg(short = 'c', long, env = "FEAR_GREED_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Seconds between scheduled refreshes
    #[arg(short = 'i', long, value_name = "SECS")]
    interval_secs: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(short = 't', long, value_name = "SECS")]
    timeout_secs: Option<u64>,

    /// Discard responses that resolve after a newer one was applied
    #[arg(long)]
    drop_stale: bool,

    /// Label language (en, ko)
    #[arg(long, value_name = "LOCALE")]
    locale: Option<Locale>,

    /// Fetch once, print the result and exit
    #[arg(long)]
    once: bool,

    /// Print readings as JSON
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "FEAR_GREED_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            base_url: self.api_url.clone(),
            refresh_interval: self.interval_secs.map(Duration::from_secs),
            request_timeout: self.timeout_secs.map(Duration::from_secs),
            drop_stale_responses: self.drop_stale.then_some(true),
            locale: self.locale,
        }
    }
}

/// Initialize logging with the specified level
///
/// Logs go to stderr so `--json` output on stdout stays parseable.
fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "feargreed_watch={level},feargreed_core={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config_path = args.config.clone().or_else(default_config_path);
    let mut config =
        load_config_from_path(config_path).context("Failed to load configuration")?;
    args.overrides()
        .apply(&mut config)
        .context("Invalid command-line option")?;

    info!(
        base_url = %config.base_url,
        interval_secs = config.refresh_interval.as_secs(),
        timeout_secs = config.request_timeout.as_secs(),
        source = %config.source(),
        config_file = ?config.config_file_path,
        "Configuration loaded"
    );

    let locale = config.locale;
    let backend = HttpBackend::from_config(&config).context("Failed to build HTTP client")?;
    let client = IndexClient::new(backend, config);

    if args.once {
        run_once(&client, locale, args.json).await
    } else {
        run_watch(&client, locale, args.json).await
    }
}

/// Single refresh; the exit status reflects its outcome
async fn run_once(client: &IndexClient<HttpBackend>, locale: Locale, json: bool) -> Result<()> {
    let outcome = client.refresh().await;
    let state = client.state();

    if json {
        let value = reporter::snapshot_json(state.presentation(), locale);
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{}", reporter::summary_line(state.presentation(), locale));
    }

    match outcome {
        RefreshOutcome::Failed(error) => Err(anyhow::Error::new(error).context("Index refresh failed")),
        RefreshOutcome::Updated | RefreshOutcome::Discarded => Ok(()),
    }
}

/// Run the schedule until SIGINT/SIGTERM
async fn run_watch(client: &IndexClient<HttpBackend>, locale: Locale, json: bool) -> Result<()> {
    let mut sigterm = signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to install SIGINT handler")?;

    let mut updates = client.subscribe();
    let mut last_reported = None;

    client.start();

    loop {
        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down");
                break;
            }
            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down");
                break;
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                if let Some(at) = reporter::settled_attempt(&state, last_reported) {
                    last_reported = Some(at);
                    report(&state, locale, json)?;
                }
            }
        }
    }

    client.stop();
    info!("Watcher stopped");
    Ok(())
}

fn report(state: &ClientState, locale: Locale, json: bool) -> Result<()> {
    let presentation = state.presentation();

    if json {
        let value = reporter::snapshot_json(presentation, locale);
        println!("{}", serde_json::to_string(&value)?);
        return Ok(());
    }

    let summary = reporter::summary_line(presentation, locale);
    match presentation {
        Presentation::Snapshot { stale: None, .. } => info!(%summary, "Index reading"),
        Presentation::Snapshot { stale: Some(_), .. } => warn!(%summary, "Showing stale index reading"),
        Presentation::FullError(_) => warn!(%summary, "No index reading available"),
        Presentation::Loading => {}
    }
    Ok(())
}
