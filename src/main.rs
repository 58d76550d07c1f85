use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use std::io::stdout;
use std::path::{Path, PathBuf};

use norther::config::{self, Settings};
use norther::core::clock::{Clock, SystemClock};
use norther::core::notify::{Notifier, StdoutNotifier};
use norther::core::points::format_timestamp;
use norther::core::storage::JsonFileStore;
use norther::desktop::{Desktop, PLUS_REQUIREMENT_TEXT, PLUS_STATUS};
use norther::ui::{run_desktop, ModalQueue, Term};
use norther::{SessionManager, UnlockOutcome};

#[derive(Parser)]
#[command(name = "norther")]
#[command(about = "Norther OS — Directional Points terminal", long_about = None)]
struct Cli {
    /// Directory holding storage.json, settings.json and the log
    /// (default: platform data dir + /norther)
    #[arg(long, value_name = "DIR", env = "NORTHER_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print balance and Directional+ status
    Status,
    /// Award points by hand
    Earn {
        #[arg(value_name = "AMOUNT")]
        amount: u64,
    },
    /// Try to unlock Directional+
    Unlock,
    /// Check whether a theme may be applied
    Theme {
        #[arg(value_name = "ID")]
        id: String,
    },
}

// ── Terminal setup / teardown ─────────────────────────────────────────────────

fn init_terminal() -> Result<Term> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(ratatui::Terminal::new(backend)?)
}

fn restore_terminal(terminal: &mut Term) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

// ── Logging ───────────────────────────────────────────────────────────────────

fn init_logging(data_dir: &Path) -> Result<()> {
    // The TUI owns stdout, so logs go to a file. RUST_LOG overrides the level.
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("creating {}", data_dir.display()))?;
    let path = config::log_file(data_dir);
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false)
        .init();
    Ok(())
}

// ── Session ───────────────────────────────────────────────────────────────────

fn start_session<N: Notifier>(
    data_dir: &Path,
    settings: &Settings,
    notifier: N,
) -> Result<SessionManager<JsonFileStore, N, SystemClock>> {
    let store = JsonFileStore::open(config::storage_file(data_dir));
    let mut manager = SessionManager::start(store, notifier, SystemClock, Desktop::norther())?;
    manager.set_theme(&settings.theme);
    Ok(manager)
}

fn run_tui(data_dir: &Path, settings: &Settings) -> Result<()> {
    let mut terminal = init_terminal()?;

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| -> Result<()> {
        let mut manager = start_session(data_dir, settings, ModalQueue::default())?;
        run_desktop(&mut terminal, &mut manager, settings)
    }));

    // Always restore terminal
    restore_terminal(&mut terminal).ok();

    match result {
        Ok(inner) => inner,
        Err(_) => {
            tracing::error!("desktop loop panicked");
            eprintln!("Norther OS crashed. Check {}", config::log_file(data_dir).display());
            Ok(())
        }
    }
}

fn print_status<C: Clock>(manager: &SessionManager<JsonFileStore, StdoutNotifier, C>) {
    let state = manager.state();
    let desktop = manager.desktop();
    println!("Directional Points: {}", state.balance);
    println!("Status:             {}", desktop.text(PLUS_STATUS).unwrap_or_default());
    println!("                    {}", desktop.text(PLUS_REQUIREMENT_TEXT).unwrap_or_default());
    match &state.last_daily {
        Some(at) => println!("Last daily bonus:   {}", format_timestamp(at)),
        None => println!("Last daily bonus:   never"),
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    let data_dir = cli.data_dir.unwrap_or_else(config::default_data_dir);
    init_logging(&data_dir)?;

    let settings = config::load_settings(&data_dir);
    tracing::info!(data_dir = %data_dir.display(), ?settings, "starting Norther OS");

    let Some(command) = cli.command else {
        return run_tui(&data_dir, &settings);
    };

    let mut manager = start_session(&data_dir, &settings, StdoutNotifier)?;
    match command {
        Commands::Status => print_status(&manager),
        Commands::Earn { amount } => {
            if amount == 0 {
                println!("Nothing to add.");
            }
            manager.dev_earn_points(amount)?;
            println!("Balance: {}", manager.state().balance);
        }
        Commands::Unlock => {
            if manager.attempt_unlock_plus()? == UnlockOutcome::Unlocked {
                tracing::info!("unlocked from the command line");
            }
        }
        Commands::Theme { id } => {
            if manager.set_theme(&id) {
                println!("Theme '{id}' applied.");
            }
        }
    }
    Ok(())
}
