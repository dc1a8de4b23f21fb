//! livescroll-feed — an infinitely scrolling post feed for the terminal.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌──────────┐ Completion ┌──────────┐  draw()  ┌──────────┐
//! │ fetch.rs │ ─────────► │  app.rs  │ ───────► │  ui.rs   │
//! │ (tokio)  │  (channel) │ (state)  │          │ (render) │
//! └──────────┘            └──────────┘          └──────────┘
//!      ▲                    │      ▲
//!      │    PageRequest     │      │ handle_key_event()
//!      └────────────────────┘ ┌──────────┐
//!                             │ input.rs │
//!                             └──────────┘
//! ```
//!
//! * **`source/`** — the `PageSource` trait, the HTTP and in-memory sources.
//! * **`loader`** — the pagination state machine (`Idle`/`Loading`/`Exhausted`).
//! * **`sentinel`** — detects the last post scrolling into view.
//! * **`fetch`** — runs page fetches on a tokio runtime.
//! * **`app`** — owns the loader plus UI state (selection, status, viewport).
//! * **`ui`** — pure rendering: reads `App` state and draws widgets.
//! * **`input`** — maps key events to `App` mutations.
//! * **`config`** / **`logging`** — command line and log file setup.
//! * **`main`** — wires everything together and runs the event loop.

mod app;
mod config;
mod error;
mod fetch;
mod input;
mod loader;
mod logging;
mod sentinel;
mod source;
mod ui;

use std::io;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::info;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use app::App;
use config::Args;
use fetch::Dispatcher;

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
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let args = Args::parse();
    logging::initialize(&args.log_file, args.log_level);
    install_panic_hook();

    // -- page source and fetch runtime ---------------------------------------
    let source = args.page_source()?;
    let (mut dispatcher, rx) = Dispatcher::new(source)?;
    info!(
        "starting feed from {} ({} posts per page)",
        dispatcher.source_name(),
        args.page_size
    );

    // -- terminal setup (RAII — Drop restores on exit or panic) --------------
    let mut guard = TerminalGuard::new()?;
    let mut app = App::new(dispatcher.source_name());
    app.start();

    // -- main event loop -----------------------------------------------------
    // Runs at ~10 fps (100 ms tick).  Each iteration:
    //   1. Apply finished fetches.
    //   2. Render, then report the visible window to the sentinel.
    //   3. Dispatch whatever page the app asked for.
    //   4. Poll for keyboard input (non-blocking, up to tick_rate).
    let tick_rate = Duration::from_millis(100);

    loop {
        while let Ok(completion) = rx.try_recv() {
            app.apply(completion);
        }

        guard.terminal.draw(|f| ui::draw(&mut app, f))?;
        app.after_draw();

        if let Some(request) = app.take_request() {
            dispatcher.dispatch(request);
        }

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                input::handle_key_event(&mut app, key);
            }
        }

        if app.quit {
            break;
        }
    }

    info!("exiting with {} posts loaded", app.loader.items().len());
    // `dispatcher` is dropped before `app`, aborting any fetch still running.
    drop(dispatcher);
    Ok(())
}
