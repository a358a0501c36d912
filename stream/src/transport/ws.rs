use std::time::Duration;

use common::logger::connection_span;
use corelib::ConnectionToken;
use futures::{SinkExt, StreamExt};
use tokio::sync::{mpsc::Sender, oneshot};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{Instrument, debug, info, trace, warn};

use super::{CloseCause, Transport, TransportEvent, TransportHandle};
use crate::config::StreamConfig;

/// WebSocket implementation of [`Transport`].
///
/// Each `open` spawns one task that owns the socket for that attempt. The
/// task never sends application messages; it only forwards what it reads.
pub struct WsTransport {
    endpoint: String,
    connect_timeout: Duration,
}

impl WsTransport {
    pub fn new(endpoint: impl Into<String>, connect_timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            connect_timeout,
        }
    }

    pub fn from_config(config: &StreamConfig) -> Self {
        Self::new(config.endpoint.clone(), config.connect_timeout)
    }
}

impl Transport for WsTransport {
    type Handle = WsHandle;

    fn open(&mut self, token: ConnectionToken, events: Sender<TransportEvent>) -> WsHandle {
        let (close_tx, close_rx) = oneshot::channel();
        let span = connection_span(token, &self.endpoint);

        tokio::spawn(
            run_socket(
                self.endpoint.clone(),
                self.connect_timeout,
                token,
                events,
                close_rx,
            )
            .instrument(span),
        );

        WsHandle {
            close_tx: Some(close_tx),
        }
    }
}

/// Handle to one WebSocket attempt. Dropping it requests a close; the
/// socket task then reports `Closed` on its own.
pub struct WsHandle {
    close_tx: Option<oneshot::Sender<()>>,
}

impl TransportHandle for WsHandle {
    fn close(&mut self) {
        if let Some(tx) = self.close_tx.take() {
            // Err means the task already ended on its own.
            let _ = tx.send(());
        }
    }
}

impl Drop for WsHandle {
    fn drop(&mut self) {
        self.close();
    }
}

/// Owns the socket for one attempt until it closes, then reports `Closed`.
///
/// The close request is honoured both while connecting and while reading.
async fn run_socket(
    endpoint: String,
    connect_timeout: Duration,
    token: ConnectionToken,
    events: Sender<TransportEvent>,
    mut close_rx: oneshot::Receiver<()>,
) {
    debug!("Attempting connection to sample source");

    let connect = tokio::time::timeout(connect_timeout, connect_async(endpoint.as_str()));
    let ws = tokio::select! {
        _ = &mut close_rx => {
            debug!("Connection attempt cancelled before open");
            emit(&events, TransportEvent::closed(token, CloseCause::Local)).await;
            return;
        }
        res = connect => match res {
            Ok(Ok((ws, _response))) => ws,
            Ok(Err(e)) => {
                warn!(error = %e, "WebSocket connection failed");
                let cause = CloseCause::Error(e.to_string());
                emit(&events, TransportEvent::closed(token, cause)).await;
                return;
            }
            Err(_) => {
                warn!(timeout = ?connect_timeout, "WebSocket connection timed out");
                let cause =
                    CloseCause::Error(format!("connect timed out after {connect_timeout:?}"));
                emit(&events, TransportEvent::closed(token, cause)).await;
                return;
            }
        }
    };

    info!("WebSocket connection established");
    if !emit(&events, TransportEvent::opened(token)).await {
        return;
    }

    let (mut write, mut read) = ws.split();

    let cause = loop {
        tokio::select! {
            _ = &mut close_rx => {
                if let Err(e) = write.send(Message::Close(None)).await {
                    debug!(error = ?e, "Close frame not delivered");
                }
                break CloseCause::Local;
            }
            msg = read.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    trace!(raw = %text.as_str(), "Received frame");
                    if !emit(&events, TransportEvent::frame(token, text.as_str())).await {
                        return;
                    }
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => {
                    debug!("Received keep-alive message");
                }
                Some(Ok(Message::Close(frame))) => {
                    debug!(?frame, "Close frame received");
                    break CloseCause::Remote;
                }
                Some(Ok(other)) => {
                    debug!(msg_type = ?other, "Ignoring non-text WebSocket message");
                }
                Some(Err(e)) => {
                    warn!(error = %e, "WebSocket stream error encountered");
                    break CloseCause::Error(e.to_string());
                }
                None => break CloseCause::Remote,
            }
        }
    };

    info!(%cause, "WebSocket connection closed");
    emit(&events, TransportEvent::closed(token, cause)).await;
}

/// Returns false once nobody is listening any more.
async fn emit(events: &Sender<TransportEvent>, event: TransportEvent) -> bool {
    if events.send(event).await.is_err() {
        debug!("Event receiver dropped; connection task shutting down");
        return false;
    }
    true
}
