//! Fear & Greed TUI Entry Point
//!
//! Launches the terminal dashboard.
//!
//! Usage:
//!   feargreed-tui [OPTIONS]
//!
//! Options:
//!   --api-url <URL>     Index service base URL (env FEAR_GREED_API_URL)
//!   --config <FILE>     Configuration file
//!   --locale <LOCALE>   Label language: en, ko
//!
//! Logging goes to stderr and is off unless `RUST_LOG` is set.

use std::io;
use std::panic;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use feargreed_core::{
    default_config_path, load_config_from_path, ConfigOverrides, HttpBackend, IndexClient, Locale,
};
use feargreed_tui::App;

/// Fear & Greed TUI - terminal dashboard for the Fear & Greed index
#[derive(Parser, Debug)]
#[command(name = "feargreed-tui")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Base URL of the index service
    #[arg(short = 'u', long, env = "FEAR_GREED_API_URL", value_name = "URL")]
    api_url: Option<String>,

    /// Configuration file path
    #[arg(short = 'c', long, env = "FEAR_GREED_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Label language (en, ko)
    #[arg(long, value_name = "LOCALE")]
    locale: Option<Locale>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Log to stderr only on request; it would draw over the alternate screen
    if std::env::var_os("RUST_LOG").is_some() {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(io::stderr)
                    .with_target(false),
            )
            .with(tracing_subscriber::EnvFilter::from_default_env())
            .init();
    }

    let mut config = load_config_from_path(args.config.or_else(default_config_path))
        .context("Failed to load configuration")?;
    ConfigOverrides {
        base_url: args.api_url,
        locale: args.locale,
        ..ConfigOverrides::default()
    }
    .apply(&mut config)
    .context("Invalid command-line option")?;

    // Check if we have a TTY before attempting initialization
    use std::io::IsTerminal;

    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("Error: feargreed-tui requires a terminal (TTY)");
        eprintln!();
        eprintln!("For non-interactive use, run the headless watcher instead:");
        eprintln!("  feargreed-watch --once --json");
        std::process::exit(1);
    }

    let locale = config.locale;
    let backend = HttpBackend::from_config(&config).context("Failed to build HTTP client")?;
    let client = IndexClient::new(backend, config);

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Restore terminal before printing panic
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Run the app
    let mut app = App::new(client, locale);
    let result = app.run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Propagate any errors
    result
}
