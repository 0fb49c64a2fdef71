//! catalog-scroll — page through a music catalogue from the terminal.
//!
//! ## Architecture overview
//!
//! ```text
//!                 PageRequest                 LoadMsg
//! ┌──────────┐  ───────────►  ┌───────────┐  ───────────►  ┌──────────┐
//! │  app.rs  │                │ loader.rs │                │  app.rs  │
//! │ session  │                │  (tokio)  │                │  apply   │
//! └──────────┘                └───────────┘                └──────────┘
//!      ▲                            │                            │
//!      │ handle_key_event()         │ fetch_page()               │ draw()
//! ┌──────────┐                ┌───────────┐                ┌──────────┐
//! │ input.rs │                │ source/   │                │  ui.rs   │
//! └──────────┘                └───────────┘                └──────────┘
//! ```
//!
//! * **`session`** — the Idle/Loading/Exhausted state machine: cursor,
//!   in-flight guard, and generation tokens that void stale responses.
//! * **`proximity`** — the near-bottom check run on every scroll event.
//! * **`source/`** — the `PaginatedFetcher` trait, filters, item shapes, and
//!   the HTTP fetcher.
//! * **`render`** — item-to-fragment mapping and the container contract.
//! * **`loader`** — spawns fetches on the runtime and reports back over a
//!   channel.
//! * **`app`** — owns page state (session, fragments, search form, scroll).
//! * **`ui`** — pure rendering: reads `App` state and draws widgets.
//! * **`input`** — maps key events to `App` mutations.
//! * **`cli`** — command-line options.
//! * **`main`** — wires everything together: parse args, set up logging, the
//!   runtime, and the terminal, and run the event loop.

mod app;
mod cli;
mod input;
mod loader;
mod proximity;
mod render;
mod session;
mod source;
mod ui;

use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use reqwest::Url;
use tracing_subscriber::EnvFilter;

use app::App;
use cli::Cli;
use loader::Loader;
use source::HttpFetcher;

// ---------------------------------------------------------------------------
// RAII terminal guard — idiomatic cleanup even on panic
// ---------------------------------------------------------------------------

/// Manages terminal raw-mode and alternate-screen lifetime via [`Drop`].
///
/// Constructing this struct enters raw mode + alternate screen.  When the
/// value is dropped (normally or during stack unwinding) it restores the
/// terminal.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Install a panic hook that restores the terminal before printing the
/// panic message.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
}

/// Send logs to `path`; the terminal belongs to the UI, so without a log
/// file nothing is installed.
fn init_logging(path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("invalid base URL '{raw}'"))?;
    if url.cannot_be_a_base() {
        bail!("base URL '{raw}' cannot have paths appended");
    }
    Ok(url)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    // -- configure the fetcher -----------------------------------------------
    let base_url = parse_base_url(&cli.base_url)?;
    let fetcher = HttpFetcher::new(base_url, Duration::from_secs(cli.timeout))
        .context("cannot build HTTP client")?;
    tracing::info!(base_url = %fetcher.base_url(), "starting");

    // -- start the runtime that fetches run on -------------------------------
    let runtime = tokio::runtime::Runtime::new().context("cannot start async runtime")?;
    let (loader, mut rx) = Loader::new(fetcher, runtime.handle().clone());

    let mut app = App::new(cli.page());
    if let Some(request) = app.start() {
        loader.dispatch(request);
    }

    // -- terminal setup (RAII — Drop restores on exit or panic) --------------
    install_panic_hook();
    let mut guard = TerminalGuard::new()?;

    // -- main event loop -----------------------------------------------------
    // Runs at ~10 fps (100 ms tick).  Each iteration:
    //   1. Apply finished fetches (which may ask for the next page).
    //   2. Render the UI (and run any fill check waiting on the viewport size).
    //   3. Poll for keyboard input (non-blocking, up to tick_rate).
    let tick_rate = Duration::from_millis(100);

    loop {
        // 1. Process load results
        while let Ok(msg) = rx.try_recv() {
            if let Some(request) = app.handle_load(msg) {
                loader.dispatch(request);
            }
        }

        // 2. Render, then fill a viewport measured for the first time
        guard.terminal.draw(|f| ui::draw(&mut app, f))?;
        if let Some(request) = app.after_draw() {
            loader.dispatch(request);
        }

        // 3. Handle input
        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if let Some(request) = input::handle_key_event(&mut app, key) {
                    loader.dispatch(request);
                }
            }
        }

        if app.quit {
            break;
        }
    }

    // `guard` is dropped here, restoring the terminal.
    tracing::info!("exiting");
    Ok(())
}
