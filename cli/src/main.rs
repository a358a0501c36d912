mod cli;
mod console;
mod render;

use std::time::Duration;

use clap::Parser;
use common::logger::init_logger;
use stream::{SampleWindow, SessionHandle, WsTransport, spawn_session};
use tokio::sync::watch;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{info, warn};

use crate::cli::Cli;
use crate::render::{render_json, render_text};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logger("emg-stream", cli.log_format());

    let config = cli.to_stream_config();
    let (session, task) = spawn_session(WsTransport::from_config(&config), &config)?;

    info!(
        session = %session.id(),
        endpoint = %config.endpoint,
        capacity = config.window_capacity,
        "emg-stream started (t = toggle, s = stats, q = quit)"
    );

    if cli.connect {
        session.toggle().await?;
    }

    let renderer = tokio::spawn(render_loop(
        session.clone(),
        cli.refresh_interval(),
        cli.json,
        config.window_capacity,
    ));

    let lines = console::spawn_stdin_reader();
    let exit = console::run_console(&session, lines, ctrl_c()).await;
    info!(?exit, "Shutting down");

    if let Err(e) = session.shutdown().await {
        warn!(error = %e, "Session already stopped");
    }
    task.await?;
    renderer.abort();

    info!(counters = ?session.counters(), "emg-stream stopped");
    Ok(())
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Ctrl-C handler unavailable; quit with `q`");
        std::future::pending::<()>().await;
    }
    info!("Ctrl-C received");
}

/// Redraw on every tick where the state or the window changed.
async fn render_loop(session: SessionHandle, every: Duration, json: bool, capacity: usize) {
    let mut state = session.subscribe_state();
    let mut window: watch::Receiver<SampleWindow> = session.subscribe_window();
    drop(session);

    let mut tick = interval(every);
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tick.tick().await;

        // Err: the session task is gone
        let Ok(window_changed) = window.has_changed() else {
            break;
        };
        let state_changed = state.has_changed().unwrap_or(false);
        if !window_changed && !state_changed {
            continue;
        }

        let current = *state.borrow_and_update();
        let snap = window.borrow_and_update().snapshot();

        if json {
            println!("{}", render_json(current, &snap));
        } else {
            println!("{}", render_text(current, &snap, capacity));
        }
    }
}
