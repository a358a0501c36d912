#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use corelib::ConnectionToken;
use stream::{Transport, TransportEvent, TransportHandle};
use tokio::sync::mpsc::Sender;

#[derive(Default)]
struct MockState {
    opened: Vec<ConnectionToken>,
    closed: Vec<ConnectionToken>,
    senders: HashMap<ConnectionToken, Sender<TransportEvent>>,
}

/// Records every open/close and keeps each attempt's event sender so tests
/// can play the remote end.
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockState>>,
    auto_open: bool,
}

impl MockTransport {
    /// Every attempt reports `Opened` immediately.
    pub fn auto_open() -> Self {
        Self {
            auto_open: true,
            ..Self::default()
        }
    }

    pub fn opened(&self) -> Vec<ConnectionToken> {
        self.inner.lock().unwrap().opened.clone()
    }

    pub fn closed(&self) -> Vec<ConnectionToken> {
        self.inner.lock().unwrap().closed.clone()
    }

    pub fn sender(&self, token: ConnectionToken) -> Sender<TransportEvent> {
        self.inner
            .lock()
            .unwrap()
            .senders
            .get(&token)
            .cloned()
            .expect("no attempt opened with this token")
    }
}

impl Transport for MockTransport {
    type Handle = MockHandle;

    fn open(&mut self, token: ConnectionToken, events: Sender<TransportEvent>) -> MockHandle {
        if self.auto_open {
            events
                .try_send(TransportEvent::opened(token))
                .expect("event queue full");
        }

        let mut state = self.inner.lock().unwrap();
        state.opened.push(token);
        state.senders.insert(token, events);

        MockHandle {
            token,
            inner: Arc::clone(&self.inner),
            closed: false,
        }
    }
}

pub struct MockHandle {
    token: ConnectionToken,
    inner: Arc<Mutex<MockState>>,
    closed: bool,
}

impl TransportHandle for MockHandle {
    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.inner.lock().unwrap().closed.push(self.token);
        }
    }
}
