//! hacker-stories — a searchable story list for the terminal.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌──────────┐  Action   ┌──────────┐  draw()  ┌──────────┐
//! │ fetch.rs │ ────────► │  app.rs  │ ───────► │  ui.rs   │
//! │  (task)  │ (channel) │ (state)  │          │ (render) │
//! └──────────┘           └──────────┘          └──────────┘
//!                          ▲      │
//!        handle_key_event()│      │ set()
//!                   ┌──────────┐ ┌────────────┐
//!                   │ input.rs │ │ persist.rs │
//!                   └──────────┘ └────────────┘
//! ```
//!
//! * **`source/`** — the `StorySource` trait, the `Story` type and the stub
//!   source.
//! * **`store`** — the collection state machine: `Action`s in, state out.
//! * **`fetch`** — runs one fetch attempt and turns its outcome into actions.
//! * **`persist`** — key-value storage and the `PersistedValue` wrapper that
//!   remembers the search term.
//! * **`filter`** — the case-insensitive title search.
//! * **`app`** — owns the store, the search term and the selection.
//! * **`ui`** — pure rendering: reads `App` state and draws widgets.
//! * **`input`** / **`event`** — keyboard handling and the event pump.
//! * **`main`** — wires everything together: parse args, load config, set up
//!   the terminal, and run the event loop.

mod app;
mod cli;
mod config;
mod event;
mod fetch;
mod filter;
mod input;
mod logging;
mod persist;
mod source;
mod store;
mod ui;

use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;

use app::App;
use cli::Cli;
use config::Config;
use event::{Event, EventHandler};
use fetch::{FetchOrchestrator, FetchSettings};
use persist::{FileStore, KeyValueStore, MemoryStore, PersistedValue};
use source::{sample_stories, StorySource, StubSource};
use store::Action;

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

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

fn build_source(config: &Config) -> Result<Arc<dyn StorySource>> {
    let fetch = &config.fetch;
    let stub = match &fetch.stories_file {
        Some(path) => StubSource::from_file(path, fetch.delay())
            .with_context(|| format!("Failed to load stories from {}", path.display()))?,
        None => StubSource::new("samples", sample_stories(), fetch.delay()),
    };
    let stub = if fetch.simulate_failure {
        stub.failing()
    } else {
        stub
    };
    Ok(Arc::new(stub))
}

fn build_search(config: &Config) -> PersistedValue<String> {
    let store: Arc<dyn KeyValueStore> = if config.storage.persist {
        let file_store = FileStore::new(config.state_path());
        log::info!("Remembering search term in {}", file_store.path().display());
        Arc::new(file_store)
    } else {
        Arc::new(MemoryStore::new())
    };
    PersistedValue::new(store, config.storage.search_key.clone(), String::new())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // -- arguments and configuration -----------------------------------------
    let cli = Cli::parse();
    let (mut config, config_warnings) = Config::load(cli.config.as_ref())?;
    config.apply_cli(&cli);
    config.validate()?;

    // Shown on the normal screen once the UI exits, and kept in the log.
    for warning in &config_warnings {
        eprintln!("Warning: {}", warning);
    }
    logging::initialize(&config.log_path(), config.log.level()?);
    log::info!("Starting hacker-stories {}", env!("CARGO_PKG_VERSION"));
    for warning in &config_warnings {
        log::warn!("{}", warning);
    }

    let source = build_source(&config)?;
    let search = build_search(&config);

    install_panic_hook();

    // -- first fetch ---------------------------------------------------------
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let orchestrator = FetchOrchestrator::new(
        source,
        FetchSettings {
            timeout: config.fetch.timeout(),
        },
    );
    orchestrator.start(action_tx.clone());

    // -- terminal setup (RAII — Drop restores on exit or panic) --------------
    let mut guard = TerminalGuard::new()?;
    let mut events = EventHandler::new(config.ui.tick_rate());
    let mut app = App::new(search);

    // -- main event loop -----------------------------------------------------
    // Each iteration renders, then waits for either a store action or a
    // terminal event.  A refresh request starts a new fetch attempt.
    loop {
        guard.terminal.draw(|f| ui::draw(&mut app, f))?;

        tokio::select! {
            Some(action) = action_rx.recv() => {
                app.dispatch(action);
                while let Ok(action) = action_rx.try_recv() {
                    app.dispatch(action);
                }
            }
            event = events.next() => match event? {
                Event::Key(key) => input::handle_key_event(&mut app, key),
                Event::Resize | Event::Tick => {}
            },
        }

        if app.take_refresh_request() {
            orchestrator.start(action_tx.clone());
        }

        if app.quit {
            break;
        }
    }

    log::info!("Exiting");
    // `guard` is dropped here, restoring the terminal.
    Ok(())
}
