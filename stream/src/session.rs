//! Stream session
//!
//! One tokio task owns one [`StreamConnection`] and is the only place its
//! state changes. Consumer commands and transport events are applied one at a
//! time, in the order the task receives them. State and window are shared
//! through latest-value `watch` channels, so a renderer only ever sees a
//! complete window.
//!
//! Data flow:
//! Consumer → SessionHandle → session task ← transport events
//!                                 ↓
//!                watch<ConnectionState>, watch<SampleWindow>

use common::logger::{SessionId, session_span};
use corelib::ConnectionState;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info};

use crate::config::StreamConfig;
use crate::connection::StreamConnection;
use crate::counters::{CountersSnapshot, StreamCounters};
use crate::error::StreamError;
use crate::transport::{Transport, TransportEvent};
use crate::window::{SampleWindow, WindowSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Toggle,
    Shutdown,
}

/// Consumer side of a running session. Cheap to clone.
///
/// The session stops when `shutdown` is called or when the last handle is
/// dropped; either way the live connection is closed.
#[derive(Clone)]
pub struct SessionHandle {
    id: SessionId,
    commands: mpsc::Sender<Command>,
    state: watch::Receiver<ConnectionState>,
    window: watch::Receiver<SampleWindow>,
    counters: StreamCounters,
}

impl SessionHandle {
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Queue a toggle. Returns once the session has accepted it, not once
    /// the connection has opened.
    pub async fn toggle(&self) -> Result<(), StreamError> {
        self.send(Command::Toggle).await
    }

    pub async fn shutdown(&self) -> Result<(), StreamError> {
        self.send(Command::Shutdown).await
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn snapshot(&self) -> WindowSnapshot {
        self.window.borrow().snapshot()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    /// Changes after every append. Take a snapshot out of the borrow rather
    /// than holding it across an await.
    pub fn subscribe_window(&self) -> watch::Receiver<SampleWindow> {
        self.window.clone()
    }

    pub fn counters(&self) -> CountersSnapshot {
        self.counters.snapshot()
    }

    async fn send(&self, cmd: Command) -> Result<(), StreamError> {
        self.commands
            .send(cmd)
            .await
            .map_err(|_| StreamError::SessionClosed)
    }
}

/// Start a session task for `transport`. Must be called inside a tokio
/// runtime. The session starts `Disconnected`.
pub fn spawn_session<T: Transport>(
    transport: T,
    config: &StreamConfig,
) -> Result<(SessionHandle, JoinHandle<()>), StreamError> {
    config.validate()?;

    let id = SessionId::new();
    let counters = StreamCounters::default();

    let (cmd_tx, cmd_rx) = mpsc::channel(config.command_queue_capacity);
    let (event_tx, event_rx) = mpsc::channel(config.event_queue_capacity);
    let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);

    let connection = StreamConnection::new(
        transport,
        event_tx,
        config.window_capacity,
        counters.clone(),
    );
    let window_rx = connection.subscribe_window();

    let span = session_span(&id);
    let task = tokio::spawn(run_session(connection, cmd_rx, event_rx, state_tx).instrument(span));

    let handle = SessionHandle {
        id,
        commands: cmd_tx,
        state: state_rx,
        window: window_rx,
        counters,
    };

    Ok((handle, task))
}

async fn run_session<T: Transport>(
    mut connection: StreamConnection<T>,
    mut commands: mpsc::Receiver<Command>,
    mut events: mpsc::Receiver<TransportEvent>,
    state_tx: watch::Sender<ConnectionState>,
) {
    info!("Stream session started");

    loop {
        tokio::select! {
            biased;

            cmd = commands.recv() => match cmd {
                Some(Command::Toggle) => {
                    let outcome = connection.toggle();
                    debug!(?outcome, "Toggle applied");
                }
                Some(Command::Shutdown) => break,
                None => {
                    debug!("All session handles dropped");
                    break;
                }
            },
            Some(event) = events.recv() => {
                connection.handle_event(event);
            }
        }

        publish_state(&state_tx, connection.state());
    }

    connection.shutdown();
    publish_state(&state_tx, connection.state());

    info!("Stream session stopped");
}

fn publish_state(tx: &watch::Sender<ConnectionState>, state: ConnectionState) {
    tx.send_if_modified(|current| {
        if *current == state {
            return false;
        }
        *current = state;
        true
    });
}
