//! Pastel Chat Entry Point
//!
//! Launches the terminal chat surface.
//!
//! # Usage
//!
//! ```bash
//! # Defaults (backend at http://localhost:8000/chat, assets in ./public)
//! pastel-chat
//!
//! # Another backend, no avatar
//! pastel-chat --endpoint http://10.0.0.2:8000/chat --no-avatar
//!
//! # Verbose logging (written to the log file, never the terminal)
//! RUST_LOG=debug pastel-chat
//! ```

use std::fs;
use std::io::{self, IsTerminal};
use std::panic;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::EnvFilter;

use pastel_conductor::{default_config_path, load_config_unvalidated, ConfigOverrides};
use pastel_tui::{App, ConductorClient};

/// Default log filter when `RUST_LOG` is unset
const DEFAULT_LOG_FILTER: &str = "pastel_tui=info,pastel_conductor=info";

/// Pastel Chat - chat with an expressive avatar in your terminal
#[derive(Parser, Debug)]
#[command(name = "pastel-chat")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Chat endpoint URL
    #[arg(short = 'e', long, value_name = "URL")]
    endpoint: Option<String>,

    /// Avatar asset directory
    #[arg(short = 'a', long, value_name = "DIR")]
    assets: Option<PathBuf>,

    /// Run without the avatar
    #[arg(long)]
    no_avatar: bool,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            endpoint: self.endpoint.clone(),
            asset_root: self.assets.clone(),
            no_avatar: self.no_avatar,
        }
    }
}

/// Log file location: state dir, falling back to the cache dir
fn log_file_path() -> Option<PathBuf> {
    dirs::state_dir()
        .or_else(dirs::cache_dir)
        .map(|dir| dir.join("pastel-chat").join("pastel-chat.log"))
}

/// Send logs to a file so the alternate screen stays clean
fn init_logging() -> Option<PathBuf> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let path = log_file_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok()?;
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .ok()?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .init();

    Some(path)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_path = init_logging();

    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("Error: pastel-chat requires a terminal (TTY)");
        std::process::exit(1);
    }

    // Resolve configuration before touching the terminal so errors print normally.
    // Validation runs once, after CLI overrides are layered on.
    let config_path = args.config.clone().or_else(default_config_path);
    let mut config =
        load_config_unvalidated(config_path).context("Failed to load configuration")?;
    args.overrides()
        .apply(&mut config)
        .context("Invalid configuration")?;

    tracing::info!(
        source = %config.source(),
        log = ?log_path,
        "Configuration resolved"
    );

    let client = ConductorClient::from_config(&config)?;

    // Restore the terminal before printing a panic
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut app = App::new(client);
    let result = app.run(&mut terminal).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Chat surface exited with an error");
    }
    result
}
