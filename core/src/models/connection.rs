use std::fmt;

use serde::Serialize;

/// Lifecycle of the single logical connection to the sample source.
///
/// Exactly one value holds at any instant. Consumers read it to decide what
/// the connect button should offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    #[default]
    Disconnected,

    /// An attempt is in flight; the transport has not confirmed the open yet.
    Connecting,

    Connected,
}

impl ConnectionState {
    pub fn is_connected(self) -> bool {
        matches!(self, ConnectionState::Connected)
    }

    pub fn is_transitioning(self) -> bool {
        matches!(self, ConnectionState::Connecting)
    }

    /// Label for the control that invokes `toggle()` in this state.
    pub fn toggle_label(self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "Connect",
            ConnectionState::Connecting => "Cancel",
            ConnectionState::Connected => "Disconnect",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
        };
        f.write_str(s)
    }
}

/// Identity of one connection attempt.
///
/// Tokens handed out by a connection are strictly increasing, so an event
/// tagged with an older token belongs to a superseded attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ConnectionToken(u64);

impl ConnectionToken {
    pub const FIRST: ConnectionToken = ConnectionToken(1);

    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }

    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for ConnectionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
