mod app;
mod chart;
mod handler;
mod tui;
mod ui;

use std::fs::{self, OpenOptions};
use std::sync::Arc;

use anyhow::{Context, Result};
use thaytu_core::Config;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::app::App;
use crate::tui::EventHandler;

/// Log to a file; the terminal belongs to the UI
fn init_logging() -> Result<()> {
    let path = Config::log_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Arc::new(file))
                .with_ansi(false)
                .with_target(false),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    init_logging()?;
    tracing::info!(server = %config.server_url(), "starting");

    let (session_tx, session_rx) = mpsc::unbounded_channel();
    let mut app = App::new(&config, session_tx)?;

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new(session_rx);

    app.session.check_health();

    let result = run(&mut app, &mut terminal, &mut events).await;

    tui::restore()?;
    if let Err(ref e) = result {
        tracing::error!(error = %e, "exiting with error");
    }
    result
}

async fn run(app: &mut App, terminal: &mut tui::Tui, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        let Some(event) = events.next().await else {
            break;
        };
        handler::handle_event(app, event)?;
    }
    Ok(())
}
