//! StreamConnection
//!
//! Explicit state machine for the single logical connection to the sample
//! source. Responsibilities:
//!   • open and close transport attempts on `toggle()`
//!   • tag every attempt with a fresh [`ConnectionToken`]
//!   • drop events whose token is not the current one
//!   • decode frames and append them to the [`SampleWindow`]
//!   • close whatever is still open when dropped
//!
//! All methods are synchronous and never block; the owner feeds transport
//! events in with [`StreamConnection::handle_event`].
//!
//! The window is kept inside a `watch` sender and modified in place, so an
//! append costs the same at any capacity. Readers copy a [`WindowSnapshot`]
//! only when they render.

use corelib::{ConnectionState, ConnectionToken};
use tokio::sync::mpsc::Sender;
use tokio::sync::watch;
use tracing::{debug, info, instrument, trace, warn};

use crate::counters::{StreamCounters, incr};
use crate::decoder::decode_frame;
use crate::transport::{
    CloseCause, Transport, TransportEvent, TransportEventKind, TransportHandle,
};
use crate::window::{SampleWindow, WindowSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// A new attempt was started with this token.
    Connecting(ConnectionToken),

    /// An attempt that had not opened yet was abandoned.
    Cancelled,

    /// The open connection was released.
    Disconnected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// Event belonged to a superseded attempt; nothing changed.
    Stale,
    Opened,
    Appended,
    /// Frame could not be decoded and was discarded.
    Dropped,
    Closed,
    /// Current attempt, but nothing to do (e.g. a repeated open).
    Ignored,
}

pub struct StreamConnection<T: Transport> {
    transport: T,
    events: Sender<TransportEvent>,

    state: ConnectionState,
    current_token: Option<ConnectionToken>,
    last_token: Option<ConnectionToken>,
    handle: Option<T::Handle>,

    // sole writer; receivers only ever borrow it read-only
    window: watch::Sender<SampleWindow>,
    counters: StreamCounters,
}

impl<T: Transport> StreamConnection<T> {
    /// `events` is handed to every attempt the transport opens; the owner
    /// reads the other end and passes each event to `handle_event`.
    pub fn new(
        transport: T,
        events: Sender<TransportEvent>,
        window_capacity: usize,
        counters: StreamCounters,
    ) -> Self {
        Self {
            transport,
            events,
            state: ConnectionState::Disconnected,
            current_token: None,
            last_token: None,
            handle: None,
            window: watch::Sender::new(SampleWindow::with_capacity(window_capacity)),
            counters,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn current_token(&self) -> Option<ConnectionToken> {
        self.current_token
    }

    pub fn snapshot(&self) -> WindowSnapshot {
        self.window.borrow().snapshot()
    }

    /// Notified after every append. Hold the borrow only long enough to
    /// read or take a snapshot: the connection waits on it to append.
    pub fn subscribe_window(&self) -> watch::Receiver<SampleWindow> {
        self.window.subscribe()
    }

    pub fn counters(&self) -> &StreamCounters {
        &self.counters
    }

    /// Connect when disconnected, otherwise disconnect.
    ///
    /// Leaving `Connecting` or `Connected` is immediate: the token is retired
    /// first, so whatever the old attempt still reports is stale.
    #[instrument(skip(self), fields(state = %self.state))]
    pub fn toggle(&mut self) -> ToggleOutcome {
        match self.state {
            ConnectionState::Disconnected => {
                let token = self.next_token();
                incr(&self.counters.attempts);

                let handle = self.transport.open(token, self.events.clone());
                self.handle = Some(handle);
                self.current_token = Some(token);
                self.state = ConnectionState::Connecting;

                info!(%token, "Connection attempt started");
                ToggleOutcome::Connecting(token)
            }
            ConnectionState::Connecting => {
                self.release("attempt cancelled");
                ToggleOutcome::Cancelled
            }
            ConnectionState::Connected => {
                self.release("disconnect requested");
                ToggleOutcome::Disconnected
            }
        }
    }

    /// Apply one transport event. Events from superseded attempts are no-ops.
    pub fn handle_event(&mut self, event: TransportEvent) -> EventOutcome {
        let TransportEvent { token, kind } = event;

        if self.current_token != Some(token) {
            incr(&self.counters.stale_events);
            debug!(
                %token,
                current = ?self.current_token,
                kind = kind.label(),
                "Ignoring event from superseded connection"
            );
            return EventOutcome::Stale;
        }

        match kind {
            TransportEventKind::Opened => {
                if self.state != ConnectionState::Connecting {
                    debug!(%token, state = %self.state, "Duplicate open ignored");
                    return EventOutcome::Ignored;
                }
                self.state = ConnectionState::Connected;
                incr(&self.counters.opened);
                info!(%token, "Connected to sample source");
                EventOutcome::Opened
            }
            TransportEventKind::Frame(raw) => self.ingest(&raw),
            TransportEventKind::Closed(cause) => {
                incr(&self.counters.closed);
                self.current_token = None;
                self.handle = None;
                self.state = ConnectionState::Disconnected;

                match &cause {
                    CloseCause::Error(e) => {
                        warn!(%token, error = %e, "Disconnected from sample source")
                    }
                    _ => info!(%token, %cause, "Disconnected from sample source"),
                }
                EventOutcome::Closed
            }
        }
    }

    /// Close any live attempt. Also runs on drop.
    pub fn shutdown(&mut self) {
        if self.current_token.is_some() || self.handle.is_some() {
            self.release("shutdown");
        }
    }

    fn ingest(&mut self, raw: &str) -> EventOutcome {
        incr(&self.counters.frames_received);

        match decode_frame(raw) {
            Ok(record) => {
                let mut evicted = false;
                let mut len = 0;
                self.window.send_modify(|w| {
                    evicted = w.append(record).is_some();
                    len = w.len();
                });

                if evicted {
                    incr(&self.counters.evictions);
                }
                incr(&self.counters.samples_appended);
                trace!(len, "Sample appended");
                EventOutcome::Appended
            }
            Err(e) => {
                incr(&self.counters.decode_failures);
                warn!(error = %e, raw = %raw, "Dropping undecodable frame");
                EventOutcome::Dropped
            }
        }
    }

    fn next_token(&mut self) -> ConnectionToken {
        let token = self
            .last_token
            .map_or(ConnectionToken::FIRST, ConnectionToken::next);
        self.last_token = Some(token);
        token
    }

    fn release(&mut self, reason: &'static str) {
        let token = self.current_token.take();
        if let Some(mut handle) = self.handle.take() {
            handle.close();
        }
        self.state = ConnectionState::Disconnected;
        info!(?token, reason, "Connection released");
    }
}

impl<T: Transport> Drop for StreamConnection<T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
