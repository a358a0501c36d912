pub mod ws;

use std::fmt;

use corelib::ConnectionToken;
use tokio::sync::mpsc::Sender;

pub use ws::{WsHandle, WsTransport};

/// Why a connection ended. Only used for diagnostics: every cause leads to
/// `Disconnected`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseCause {
    Local,
    Remote,
    Error(String),
}

impl fmt::Display for CloseCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloseCause::Local => f.write_str("closed locally"),
            CloseCause::Remote => f.write_str("closed by remote"),
            CloseCause::Error(e) => write!(f, "transport error: {e}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEventKind {
    Opened,
    Frame(String),
    Closed(CloseCause),
}

impl TransportEventKind {
    pub fn label(&self) -> &'static str {
        match self {
            TransportEventKind::Opened => "opened",
            TransportEventKind::Frame(_) => "frame",
            TransportEventKind::Closed(_) => "closed",
        }
    }
}

/// Something a connection attempt reported, tagged with the attempt's token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportEvent {
    pub token: ConnectionToken,
    pub kind: TransportEventKind,
}

impl TransportEvent {
    pub fn opened(token: ConnectionToken) -> Self {
        Self {
            token,
            kind: TransportEventKind::Opened,
        }
    }

    pub fn frame(token: ConnectionToken, raw: impl Into<String>) -> Self {
        Self {
            token,
            kind: TransportEventKind::Frame(raw.into()),
        }
    }

    pub fn closed(token: ConnectionToken, cause: CloseCause) -> Self {
        Self {
            token,
            kind: TransportEventKind::Closed(cause),
        }
    }
}

/// Opens receive-only connections to the sample source.
///
/// `open` must not block. Progress is reported through `events`: at most
/// one `Opened`, any number of `Frame`s, then exactly one `Closed`, all
/// tagged with `token`. A failed attempt reports `Closed` without `Opened`.
pub trait Transport: Send + 'static {
    type Handle: TransportHandle;

    fn open(&mut self, token: ConnectionToken, events: Sender<TransportEvent>) -> Self::Handle;
}

/// Owner's grip on one live attempt.
pub trait TransportHandle: Send + 'static {
    /// Request a close. Idempotent; a no-op once the attempt has ended.
    fn close(&mut self);
}
