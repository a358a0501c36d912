//! Streaming-ingestion pipeline for live multi-channel samples.
//!
//! Data flow:
//! Transport → StreamConnection (token check, decode) → SampleWindow → snapshots for renderers
//!
//! A session task owns exactly one [`StreamConnection`] and applies consumer
//! commands and transport events to it one at a time.

pub mod config;
pub mod connection;
pub mod counters;
pub mod decoder;
pub mod error;
pub mod session;
pub mod transport;
pub mod window;

pub use config::StreamConfig;
pub use connection::{EventOutcome, StreamConnection, ToggleOutcome};
pub use counters::{CountersSnapshot, StreamCounters};
pub use decoder::{DecodeError, decode_frame};
pub use error::StreamError;
pub use session::{SessionHandle, spawn_session};
pub use transport::{
    CloseCause, Transport, TransportEvent, TransportEventKind, TransportHandle, WsTransport,
};
pub use window::{ChannelSummary, SampleWindow, WindowSnapshot};
