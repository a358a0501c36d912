//! Keyboard commands for a running session.
//!
//! stdin is read on a plain OS thread and forwarded line by line over an
//! `mpsc` channel. The thread is never joined: a read parked on an idle
//! terminal must not hold up process exit.

use std::future::Future;
use std::io::{self, BufRead};
use std::thread;

use stream::SessionHandle;
use tokio::sync::mpsc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Toggle,
    Stats,
    Quit,
}

impl Command {
    /// `t` or an empty line toggles, `s` prints counters, `q` quits.
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            "" | "t" => Some(Command::Toggle),
            "s" => Some(Command::Stats),
            "q" => Some(Command::Quit),
            _ => None,
        }
    }
}

/// Why the console stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Quit,
    Stopped,
    SessionClosed,
}

pub fn spawn_stdin_reader() -> mpsc::Receiver<io::Result<String>> {
    let (tx, rx) = mpsc::channel(16);

    let spawned = thread::Builder::new()
        .name("stdin-reader".into())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let failed = line.is_err();
                if tx.blocking_send(line).is_err() || failed {
                    break;
                }
            }
        });

    if let Err(e) = spawned {
        warn!(error = %e, "Could not start stdin reader; keyboard commands disabled");
    }

    rx
}

/// Apply commands from `lines` until `q`, until `stop` resolves, or until
/// the session goes away. A closed or failing stdin only disables commands;
/// the console then waits for `stop`.
pub async fn run_console(
    session: &SessionHandle,
    mut lines: mpsc::Receiver<io::Result<String>>,
    stop: impl Future<Output = ()>,
) -> Exit {
    tokio::pin!(stop);
    let mut stdin_open = true;

    loop {
        tokio::select! {
            _ = &mut stop => return Exit::Stopped,
            line = lines.recv(), if stdin_open => match line {
                Some(Ok(line)) => match Command::parse(&line) {
                    Some(Command::Toggle) => {
                        if session.toggle().await.is_err() {
                            return Exit::SessionClosed;
                        }
                    }
                    Some(Command::Stats) => match serde_json::to_string(&session.counters()) {
                        Ok(json) => println!("{json}"),
                        Err(e) => warn!(error = %e, "Could not encode counters"),
                    },
                    Some(Command::Quit) => return Exit::Quit,
                    None => warn!(
                        command = line.trim(),
                        "Unknown command (t = toggle, s = stats, q = quit)"
                    ),
                },
                Some(Err(e)) => {
                    warn!(error = %e, "Reading stdin failed; keyboard commands disabled");
                    stdin_open = false;
                }
                None => {
                    debug!("stdin closed; streaming until Ctrl-C");
                    stdin_open = false;
                }
            },
        }
    }
}
